use std::collections::HashMap;
use std::env;
use std::sync::Arc;

use common::events::InMemoryEventBus;
use common::gateway::{FlutterwaveConfig, GatewayAdapter, PaystackConfig};
use dotenvy::dotenv;
use sqlx::postgres::PgPoolOptions;
use tracing::{info, warn};
use tracing_subscriber::FmtSubscriber;
use transaction_service::{
    api::http_routes::{routes, AppState},
    api::notification_grpc_service::TenantNotificationGrpcService,
    api::proto::notifications::tenant_notification_service_server::TenantNotificationServiceServer,
    domain::gateways::SettlementGateway,
    infrastructure::{
        gateway_registry::GatewayRegistry,
        gateways::{
            fake_settlement_gateway::FakeSettlementGateway,
            grpc_settlement_gateway::GrpcSettlementGateway,
        },
        persistence::{
            provider_lookup_repository::PostgresProviderLookupRepository,
            tenant_lookup_repository::PostgresTenantLookupRepository,
            webhook_event_repository::PostgresWebhookEventRepository,
        },
    },
    jobs::{
        reconciliation_consumer::{self, ReconciliationConsumer},
        retry_outbound_webhook::{spawn_retry_loop, RetryOutboundWebhookJob},
    },
    use_cases::{
        emit_tenant_webhook::EmitTenantWebhookUseCase, handle_webhook::HandleWebhookUseCase,
        reconcile::ReconcileUseCase,
    },
};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

#[derive(OpenApi)]
#[openapi(components(schemas(
    transaction_service::api::response::ApiResponse<serde_json::Value>
)))]
struct ApiDoc;

/// This crate's own copy of C4's adapter config (§4.9): only provider codes
/// with a complete `<CODE>_*` env trio are registered, since verification
/// here never touches the `providers` table's `config` column.
fn build_gateway_registry(client: reqwest::Client) -> GatewayRegistry {
    let mut adapters = HashMap::new();

    if let (Ok(base_url), Ok(secret_key), Ok(webhook_secret)) = (
        env::var("PAYSTACK_BASE_URL"),
        env::var("PAYSTACK_SECRET_KEY"),
        env::var("PAYSTACK_WEBHOOK_SECRET"),
    ) {
        adapters.insert(
            "paystack".to_string(),
            GatewayAdapter::paystack(
                PaystackConfig {
                    base_url,
                    secret_key,
                    webhook_secret,
                },
                client.clone(),
            ),
        );
    } else {
        warn!("PAYSTACK_* env vars incomplete, paystack webhooks will be rejected");
    }

    if let (Ok(base_url), Ok(secret_key), Ok(webhook_secret)) = (
        env::var("FLUTTERWAVE_BASE_URL"),
        env::var("FLUTTERWAVE_SECRET_KEY"),
        env::var("FLUTTERWAVE_WEBHOOK_SECRET"),
    ) {
        adapters.insert(
            "flutterwave".to_string(),
            GatewayAdapter::flutterwave(
                FlutterwaveConfig {
                    base_url,
                    secret_key,
                    webhook_secret,
                },
                client,
            ),
        );
    } else {
        warn!("FLUTTERWAVE_* env vars incomplete, flutterwave webhooks will be rejected");
    }

    GatewayRegistry::new(adapters)
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // 1. Cargar variables de entorno
    dotenv().ok();

    // 2. Configurar Logging/Tracing
    let subscriber = FmtSubscriber::builder()
        .with_max_level(tracing::Level::INFO)
        .finish();
    tracing::subscriber::set_global_default(subscriber).expect("setting default subscriber failed");

    info!("Starting Transaction Service...");

    // 3. Configurar Conexión a Base de Datos
    let database_url = env::var("DATABASE_URL").expect("DATABASE_URL must be set");
    let pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(&database_url)
        .await?;

    info!("Connected to Database");

    // 4. Instanciar Dependencias (Infraestructura)
    let http_client = reqwest::Client::builder()
        .timeout(std::time::Duration::from_secs(60))
        .build()?;
    let event_bus = Arc::new(InMemoryEventBus::new(1024));
    let gateways = Arc::new(build_gateway_registry(http_client.clone()));

    let webhook_repo = Arc::new(PostgresWebhookEventRepository::new(pool.clone()));
    let provider_lookup = Arc::new(PostgresProviderLookupRepository::new(pool.clone()));
    let tenant_lookup = Arc::new(PostgresTenantLookupRepository::new(pool.clone()));

    let wallet_grpc_addr = env::var("WALLET_SERVICE_GRPC_ADDR")
        .unwrap_or_else(|_| "http://127.0.0.1:50051".to_string());
    let settlement_gateway: Arc<dyn SettlementGateway> =
        if env::var("USE_FAKE_SETTLEMENT_GATEWAY").is_ok() {
            warn!("USE_FAKE_SETTLEMENT_GATEWAY set, deposits will not actually settle");
            Arc::new(FakeSettlementGateway::new())
        } else {
            Arc::new(GrpcSettlementGateway::new(wallet_grpc_addr))
        };

    // 5. Instanciar Casos de Uso
    let handle_webhook = HandleWebhookUseCase::new(
        webhook_repo.clone(),
        provider_lookup,
        gateways.clone(),
        event_bus.clone(),
    );
    let reconcile = Arc::new(ReconcileUseCase::new(gateways.clone(), settlement_gateway));
    let emit_tenant_webhook = Arc::new(EmitTenantWebhookUseCase::new(
        tenant_lookup,
        webhook_repo.clone(),
        http_client,
    ));

    // 6. Configurar Estado de la App Axum
    let app_state = Arc::new(AppState { handle_webhook });

    // 7. Configurar Rutas y Servidor
    let app = routes(app_state)
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()));

    let host = env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
    let port = env::var("PORT").unwrap_or_else(|_| "3000".to_string());
    let addr = format!("{}:{}", host, port);

    // 8. Iniciar Background Jobs (Procesos en Segundo Plano)
    for provider_code in ["paystack", "flutterwave"] {
        if gateways.get(provider_code).is_none() {
            continue;
        }
        reconciliation_consumer::spawn(ReconciliationConsumer::new(
            provider_code.to_string(),
            event_bus.clone(),
            reconcile.clone(),
        ));
    }
    info!("Reconciliation consumers started");

    let retry_job = Arc::new(RetryOutboundWebhookJob::new(webhook_repo, emit_tenant_webhook.clone()));
    spawn_retry_loop(retry_job);

    let grpc_host = env::var("GRPC_HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
    let grpc_port = env::var("GRPC_PORT").unwrap_or_else(|_| "50052".to_string());
    let grpc_addr = format!("{grpc_host}:{grpc_port}").parse()?;

    let notification_service = TenantNotificationGrpcService::new(emit_tenant_webhook);
    info!("gRPC Server listening on {}", grpc_addr);

    tokio::spawn(async move {
        if let Err(e) = tonic::transport::Server::builder()
            .add_service(TenantNotificationServiceServer::new(notification_service))
            .serve(grpc_addr)
            .await
        {
            tracing::error!("gRPC server error: {}", e);
        }
    });

    info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
