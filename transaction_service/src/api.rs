pub mod error;
pub mod http_routes;
pub mod notification_grpc_service;
pub mod response;

pub mod proto {
    pub mod wallet {
        tonic::include_proto!("wallet");
    }
    pub mod notifications {
        tonic::include_proto!("notifications");
    }
}
