pub mod fake_settlement_gateway;
pub mod grpc_settlement_gateway;
