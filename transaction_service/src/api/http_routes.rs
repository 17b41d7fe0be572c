use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    routing::post,
    Router,
};

use crate::api::error::ApiError;
use crate::use_cases::handle_webhook::HandleWebhookUseCase;

pub struct AppState {
    pub handle_webhook: HandleWebhookUseCase,
}

pub fn routes(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/webhook/{provider}", post(handle_webhook))
        .with_state(state)
}

/// Name of the header each gateway signs its callback with (§4.7 step 1).
fn signature_header_name(provider_code: &str) -> &'static str {
    match provider_code {
        "flutterwave" => "verif-hash",
        _ => "x-paystack-signature",
    }
}

// POST /webhook/{provider}
async fn handle_webhook(
    State(state): State<Arc<AppState>>,
    Path(provider): Path<String>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<StatusCode, ApiError> {
    let signature = headers
        .get(signature_header_name(&provider))
        .and_then(|v| v.to_str().ok())
        .unwrap_or("");

    state
        .handle_webhook
        .execute(&provider, signature, &body)
        .await?;

    Ok(StatusCode::OK)
}
