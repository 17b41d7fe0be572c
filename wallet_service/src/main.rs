use std::env;
use std::sync::Arc;

use common::events::InMemoryEventBus;
use common::jwt::JwtManager;
use dotenvy::dotenv;
use sqlx::postgres::PgPoolOptions;
use tracing::info;
use tracing_subscriber::FmtSubscriber;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use wallet_service::api::grpc_service::WalletGrpcService;
use wallet_service::api::http_routes::{routes, AppState};
use wallet_service::api::proto::wallet::wallet_service_server::WalletServiceServer;
use wallet_service::domain::cache::SessionStore;
use wallet_service::domain::repository::{ProviderRepository, TenantNotifier};
use wallet_service::infrastructure::cache::provider_cache::RedisProviderCache;
use wallet_service::infrastructure::cache::session_store::RedisSessionStore;
use wallet_service::infrastructure::persistence::idempotency_repository::PostgresIdempotencyRepository;
use wallet_service::infrastructure::persistence::ledger_repository::PostgresLedgerRepository;
use wallet_service::infrastructure::persistence::provider_repository::{
    CachedProviderRepository, PostgresProviderRepository,
};
use wallet_service::infrastructure::persistence::tenant_repository::PostgresTenantRepository;
use wallet_service::infrastructure::persistence::transaction_repository::PostgresTransactionRepository;
use wallet_service::infrastructure::persistence::user_repository::PostgresUserRepository;
use wallet_service::infrastructure::persistence::wallet_repository::PostgresWalletRepository;
use wallet_service::infrastructure::persistence::wallet_type_repository::PostgresWalletTypeRepository;
use wallet_service::infrastructure::tenant_notifier::GrpcTenantNotifier;
use wallet_service::jobs::provider_metrics::{spawn_daily_reset_loop, spawn_decay_loop, ProviderMetricsJob};
use wallet_service::use_cases::admin_login::AdminLoginUseCase;
use wallet_service::use_cases::get_user_wallets::GetWalletsUseCase;
use wallet_service::use_cases::get_wallet::GetWalletUseCase;
use wallet_service::use_cases::initiate_deposit::InitiateDepositUseCase;
use wallet_service::use_cases::login::LoginUseCase;
use wallet_service::use_cases::logout::LogoutUseCase;
use wallet_service::use_cases::mark_deposit_failed::MarkDepositFailedUseCase;
use wallet_service::use_cases::refresh::RefreshUseCase;
use wallet_service::use_cases::settle_deposit::SettleDepositUseCase;
use wallet_service::use_cases::signup::SignupUseCase;
use wallet_service::use_cases::tenant_admin::{CreateTenantUseCase, GetTenantUseCase};
use wallet_service::use_cases::transaction_query::{GetTransactionUseCase, ListTransactionsUseCase};
use wallet_service::use_cases::transfer::TransferUseCase;
use wallet_service::use_cases::withdraw::WithdrawUseCase;

#[derive(OpenApi)]
#[openapi(
    paths(),
    components(schemas(wallet_service::api::response::ApiResponse<serde_json::Value>))
)]
struct ApiDoc;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenv().ok();

    let subscriber = FmtSubscriber::builder()
        .with_max_level(tracing::Level::INFO)
        .finish();
    tracing::subscriber::set_global_default(subscriber).expect("setting default subscriber failed");

    info!("Starting Wallet Service...");

    let database_url = env::var("DATABASE_URL").expect("DATABASE_URL must be set");
    let pool = PgPoolOptions::new()
        .max_connections(10)
        .connect(&database_url)
        .await?;
    info!("Connected to Database");

    let redis_url = env::var("REDIS_URL").unwrap_or_else(|_| "redis://127.0.0.1/".to_string());
    let redis_client = redis::Client::open(redis_url)?;

    let jwt = Arc::new(JwtManager::new(
        env::var("JWT_ACCESS_SECRET").expect("JWT_ACCESS_SECRET must be set"),
        env::var("JWT_REFRESH_SECRET").expect("JWT_REFRESH_SECRET must be set"),
    ));
    let event_bus = Arc::new(InMemoryEventBus::new(1024));
    let http_client = reqwest::Client::builder()
        .timeout(std::time::Duration::from_secs(60))
        .build()?;
    let transaction_service_addr = env::var("TRANSACTION_SERVICE_GRPC_ADDR")
        .unwrap_or_else(|_| "http://127.0.0.1:50052".to_string());
    let tenant_notifier: Arc<dyn TenantNotifier> = Arc::new(GrpcTenantNotifier::new(transaction_service_addr));

    let user_repo = Arc::new(PostgresUserRepository::new(pool.clone()));
    let wallet_repo = Arc::new(PostgresWalletRepository::new(pool.clone()));
    let wallet_type_repo = Arc::new(PostgresWalletTypeRepository::new(pool.clone()));
    let tenant_repo = Arc::new(PostgresTenantRepository::new(pool.clone()));
    let transaction_repo = Arc::new(PostgresTransactionRepository::new(pool.clone()));
    let ledger_repo = Arc::new(PostgresLedgerRepository::new(pool.clone()));
    let idempotency_repo = Arc::new(PostgresIdempotencyRepository::new(pool.clone()));
    let provider_repo: Arc<dyn ProviderRepository> = Arc::new(CachedProviderRepository::new(
        PostgresProviderRepository::new(pool.clone()),
        Arc::new(RedisProviderCache::new(redis_client.clone())),
    ));

    let session_store: Arc<dyn SessionStore> = Arc::new(RedisSessionStore::new(redis_client.clone()));

    let login = LoginUseCase::new(user_repo.clone(), session_store.clone(), jwt.clone());
    let admin_login = AdminLoginUseCase::new(user_repo.clone(), session_store.clone(), jwt.clone());
    let signup = SignupUseCase::new(user_repo.clone(), wallet_repo.clone(), wallet_type_repo.clone());
    let refresh = RefreshUseCase::new(user_repo.clone(), session_store.clone(), jwt.clone());
    let logout = LogoutUseCase::new(session_store.clone());

    let get_wallet = GetWalletUseCase::new(wallet_repo.clone());
    let get_wallets = GetWalletsUseCase::new(wallet_repo.clone());
    let initiate_deposit = InitiateDepositUseCase::new(
        wallet_repo.clone(),
        provider_repo.clone(),
        ledger_repo.clone(),
        http_client.clone(),
    );
    let withdraw = WithdrawUseCase::new(wallet_repo.clone(), ledger_repo.clone());
    let transfer = TransferUseCase::new(wallet_repo.clone(), user_repo.clone(), ledger_repo.clone());

    let get_transaction = GetTransactionUseCase::new(transaction_repo.clone(), wallet_repo.clone());
    let list_transactions = ListTransactionsUseCase::new(transaction_repo.clone(), wallet_repo.clone());

    let create_tenant = CreateTenantUseCase::new(tenant_repo.clone());
    let get_tenant = GetTenantUseCase::new(tenant_repo.clone());

    let settle_deposit =
        SettleDepositUseCase::new(ledger_repo.clone(), event_bus.clone(), tenant_notifier.clone());
    let mark_deposit_failed =
        MarkDepositFailedUseCase::new(ledger_repo.clone(), event_bus.clone(), tenant_notifier);

    let metrics_job = Arc::new(ProviderMetricsJob::new(provider_repo.clone()));
    spawn_decay_loop(metrics_job.clone());
    spawn_daily_reset_loop(metrics_job);

    let grpc_host = env::var("GRPC_HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
    let grpc_port = env::var("GRPC_PORT").unwrap_or_else(|_| "50051".to_string());
    let grpc_addr = format!("{grpc_host}:{grpc_port}").parse()?;

    let grpc_service = WalletGrpcService::new(settle_deposit, mark_deposit_failed);
    info!("gRPC Server listening on {}", grpc_addr);

    tokio::spawn(async move {
        if let Err(e) = tonic::transport::Server::builder()
            .add_service(WalletServiceServer::new(grpc_service))
            .serve(grpc_addr)
            .await
        {
            tracing::error!("gRPC server error: {}", e);
        }
    });

    let app_state = Arc::new(AppState {
        jwt,
        session_store,
        idempotency_repo,
        user_repo,
        login,
        admin_login,
        signup,
        refresh,
        logout,
        get_wallet,
        get_wallets,
        initiate_deposit,
        withdraw,
        transfer,
        get_transaction,
        list_transactions,
        create_tenant,
        get_tenant,
    });

    let app = routes(app_state)
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()));

    let host = env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
    let port = env::var("PORT").unwrap_or_else(|_| "3000".to_string());
    let addr = format!("{host}:{port}");

    info!("HTTP Server listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
