pub mod auth;
pub mod error;
pub mod grpc_service;
pub mod http_routes;
pub mod response;

pub mod proto {
    pub mod wallet {
        tonic::include_proto!("wallet");
    }
    pub mod notifications {
        tonic::include_proto!("notifications");
    }
}
