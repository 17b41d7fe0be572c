pub mod admin_login;
pub mod auth_types;
pub mod get_user_wallets;
pub mod get_wallet;
pub mod idempotency;
pub mod initiate_deposit;
pub mod login;
pub mod logout;
pub mod mark_deposit_failed;
pub mod refresh;
pub mod settle_deposit;
pub mod signup;
pub mod tenant_admin;
pub mod transaction_query;
pub mod transfer;
pub mod withdraw;
