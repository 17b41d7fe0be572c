use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use common::jwt::JwtManager;
use common::role::Role;
use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::Value;

use crate::api::auth::{require_role, AuthenticatedUser};
use crate::api::error::ApiError;
use crate::api::response::ApiResponse;
use crate::domain::cache::SessionStore;
use crate::domain::error::AuthError;
use crate::domain::repository::{IdempotencyRepository, UserRepository};
use crate::domain::types::{TenantId, TransactionId, TransactionStatus, WalletId};
use crate::use_cases::admin_login::AdminLoginUseCase;
use crate::use_cases::get_user_wallets::GetWalletsUseCase;
use crate::use_cases::get_wallet::GetWalletUseCase;
use crate::use_cases::idempotency::call_idempotently;
use crate::use_cases::initiate_deposit::InitiateDepositUseCase;
use crate::use_cases::login::LoginUseCase;
use crate::use_cases::logout::LogoutUseCase;
use crate::use_cases::refresh::RefreshUseCase;
use crate::use_cases::signup::SignupUseCase;
use crate::use_cases::tenant_admin::{CreateTenantUseCase, GetTenantUseCase};
use crate::use_cases::transaction_query::{GetTransactionUseCase, ListTransactionsUseCase};
use crate::use_cases::transfer::TransferUseCase;
use crate::use_cases::withdraw::WithdrawUseCase;

/// Everything an HTTP handler needs: the use cases (each already holding its
/// own repositories/adapters) plus the few collaborators the API layer
/// itself touches directly — session verification, idempotency bookkeeping,
/// and a raw user lookup for the gateway email field.
pub struct AppState {
    pub jwt: Arc<JwtManager>,
    pub session_store: Arc<dyn SessionStore>,
    pub idempotency_repo: Arc<dyn IdempotencyRepository>,
    pub user_repo: Arc<dyn UserRepository>,

    pub login: LoginUseCase,
    pub admin_login: AdminLoginUseCase,
    pub signup: SignupUseCase,
    pub refresh: RefreshUseCase,
    pub logout: LogoutUseCase,

    pub get_wallet: GetWalletUseCase,
    pub get_wallets: GetWalletsUseCase,
    pub initiate_deposit: InitiateDepositUseCase,
    pub withdraw: WithdrawUseCase,
    pub transfer: TransferUseCase,

    pub get_transaction: GetTransactionUseCase,
    pub list_transactions: ListTransactionsUseCase,

    pub create_tenant: CreateTenantUseCase,
    pub get_tenant: GetTenantUseCase,
}

pub fn routes(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/auth/signup", post(signup))
        .route("/auth/login", post(login))
        .route("/auth/admin", post(admin_login))
        .route("/auth/logout", post(logout))
        .route("/auth/refresh", post(refresh))
        .route("/wallet", get(list_wallets))
        .route("/wallet/:id", get(get_wallet))
        .route("/wallet/initiate_deposit", post(initiate_deposit))
        .route("/wallet/withdraw", post(withdraw))
        .route("/wallet/transfer", post(transfer))
        .route("/transactions/:id", get(get_transaction))
        .route("/transactions", get(list_transactions))
        .route("/tenant", post(create_tenant))
        .route("/tenant/:id", get(get_tenant))
        .with_state(state)
}

fn idempotency_key(headers: &axum::http::HeaderMap) -> Result<String, ApiError> {
    headers
        .get("Idempotency-Key")
        .and_then(|v| v.to_str().ok())
        .filter(|v| !v.is_empty())
        .map(str::to_string)
        .ok_or_else(|| crate::domain::error::IdempotencyError::MissingKey.into())
}

#[derive(Debug, Deserialize)]
pub struct SignupRequest {
    pub email: String,
    pub phone: Option<String>,
    pub password: String,
}

async fn signup(
    State(state): State<Arc<AppState>>,
    AuthenticatedUser(principal): AuthenticatedUser,
    Json(body): Json<SignupRequest>,
) -> Result<(StatusCode, Json<ApiResponse<serde_json::Value>>), ApiError> {
    require_role(&principal, &[Role::TenantAdmin])?;

    let user = state
        .signup
        .execute(principal.tenant_id, body.email, body.phone, body.password)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(serde_json::to_value(user).unwrap())),
    ))
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub tenant_id: TenantId,
    pub email: String,
    pub password: String,
}

async fn login(
    State(state): State<Arc<AppState>>,
    headers: axum::http::HeaderMap,
    Json(body): Json<LoginRequest>,
) -> Result<Json<ApiResponse<serde_json::Value>>, ApiError> {
    let user_agent = headers
        .get(axum::http::header::USER_AGENT)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);

    let tokens = state
        .login
        .execute(body.tenant_id, body.email, body.password, user_agent, None)
        .await?;

    Ok(Json(ApiResponse::success(serde_json::json!({
        "access_token": tokens.access_token,
        "refresh_token": tokens.refresh_token,
        "user": tokens.user,
    }))))
}

#[derive(Debug, Deserialize)]
pub struct AdminLoginRequest {
    pub email: String,
    pub password: String,
}

async fn admin_login(
    State(state): State<Arc<AppState>>,
    Json(body): Json<AdminLoginRequest>,
) -> Result<Json<ApiResponse<serde_json::Value>>, ApiError> {
    let tokens = state.admin_login.execute(body.email, body.password).await?;

    Ok(Json(ApiResponse::success(serde_json::json!({
        "access_token": tokens.access_token,
        "refresh_token": tokens.refresh_token,
        "user": tokens.user,
    }))))
}

async fn logout(
    State(state): State<Arc<AppState>>,
    AuthenticatedUser(principal): AuthenticatedUser,
) -> Result<Json<ApiResponse<()>>, ApiError> {
    state.logout.execute(&principal).await?;
    Ok(Json(ApiResponse::success(())))
}

#[derive(Debug, Deserialize)]
pub struct RefreshRequest {
    pub refresh_token: String,
}

async fn refresh(
    State(state): State<Arc<AppState>>,
    Json(body): Json<RefreshRequest>,
) -> Result<Json<ApiResponse<serde_json::Value>>, ApiError> {
    let tokens = state.refresh.execute(&body.refresh_token).await?;

    Ok(Json(ApiResponse::success(serde_json::json!({
        "access_token": tokens.access_token,
        "refresh_token": tokens.refresh_token,
        "user": tokens.user,
    }))))
}

async fn list_wallets(
    State(state): State<Arc<AppState>>,
    AuthenticatedUser(principal): AuthenticatedUser,
) -> Result<Json<ApiResponse<serde_json::Value>>, ApiError> {
    let wallets = state.get_wallets.execute(principal.user_id).await?;
    Ok(Json(ApiResponse::success(serde_json::to_value(wallets).unwrap())))
}

async fn get_wallet(
    State(state): State<Arc<AppState>>,
    AuthenticatedUser(principal): AuthenticatedUser,
    Path(wallet_id): Path<WalletId>,
) -> Result<Json<ApiResponse<serde_json::Value>>, ApiError> {
    let wallet = state.get_wallet.execute(wallet_id).await?;
    if principal.role == Role::User && wallet.user_id != principal.user_id {
        return Err(AuthError::Forbidden(principal.role.to_string()).into());
    }
    Ok(Json(ApiResponse::success(serde_json::to_value(wallet).unwrap())))
}

#[derive(Debug, Deserialize)]
pub struct InitiateDepositRequest {
    pub currency: String,
    pub amount: Decimal,
    pub channel: String,
    #[serde(default)]
    pub metadata: Value,
}

async fn initiate_deposit(
    State(state): State<Arc<AppState>>,
    AuthenticatedUser(principal): AuthenticatedUser,
    headers: axum::http::HeaderMap,
    Json(body): Json<InitiateDepositRequest>,
) -> Result<Json<ApiResponse<serde_json::Value>>, ApiError> {
    require_role(&principal, &[Role::User])?;
    let key = idempotency_key(&headers)?;

    let user = state
        .user_repo
        .find_by_id(principal.user_id)
        .await
        .map_err(|e| crate::domain::error::AuthError::Internal(e.to_string()))?
        .ok_or(AuthError::InvalidToken)?;

    let request_body = serde_json::to_value(&body).unwrap();
    let state_for_handler = state.clone();
    let result = call_idempotently(
        &state.idempotency_repo,
        principal.tenant_id,
        principal.user_id,
        &key,
        "/wallet/initiate_deposit",
        &request_body,
        move || async move {
            state_for_handler
                .initiate_deposit
                .execute(
                    principal.tenant_id,
                    principal.user_id,
                    &user.email,
                    &body.currency,
                    body.amount,
                    &body.channel,
                    body.metadata,
                )
                .await
                .map(|r| {
                    serde_json::json!({
                        "authorization_url": r.authorization_url,
                        "reference": r.reference,
                        "provider": r.provider_code,
                        "provider_id": r.provider_id,
                    })
                })
        },
    )
    .await?;

    Ok(Json(ApiResponse::success(result)))
}

#[derive(Debug, Deserialize)]
pub struct WithdrawRequest {
    pub wallet_id: WalletId,
    pub amount: Decimal,
    #[serde(default)]
    pub metadata: Value,
}

async fn withdraw(
    State(state): State<Arc<AppState>>,
    AuthenticatedUser(principal): AuthenticatedUser,
    headers: axum::http::HeaderMap,
    Json(body): Json<WithdrawRequest>,
) -> Result<Json<ApiResponse<serde_json::Value>>, ApiError> {
    require_role(&principal, &[Role::User])?;
    let key = idempotency_key(&headers)?;

    let request_body = serde_json::to_value(&body).unwrap();
    let state_for_handler = state.clone();
    let transaction = call_idempotently(
        &state.idempotency_repo,
        principal.tenant_id,
        principal.user_id,
        &key,
        "/wallet/withdraw",
        &request_body,
        move || async move {
            state_for_handler
                .withdraw
                .execute(
                    principal.tenant_id,
                    principal.user_id,
                    body.wallet_id,
                    body.amount,
                    body.metadata,
                )
                .await
        },
    )
    .await?;

    Ok(Json(ApiResponse::success(transaction)))
}

#[derive(Debug, Deserialize)]
pub struct TransferRequest {
    pub from_wallet_id: WalletId,
    pub to_wallet_id: WalletId,
    pub amount: Decimal,
    #[serde(default)]
    pub metadata: Value,
}

async fn transfer(
    State(state): State<Arc<AppState>>,
    AuthenticatedUser(principal): AuthenticatedUser,
    headers: axum::http::HeaderMap,
    Json(body): Json<TransferRequest>,
) -> Result<Json<ApiResponse<serde_json::Value>>, ApiError> {
    require_role(&principal, &[Role::User])?;
    let key = idempotency_key(&headers)?;

    let request_body = serde_json::to_value(&body).unwrap();
    let state_for_handler = state.clone();
    let transaction = call_idempotently(
        &state.idempotency_repo,
        principal.tenant_id,
        principal.user_id,
        &key,
        "/wallet/transfer",
        &request_body,
        move || async move {
            state_for_handler
                .transfer
                .execute(
                    principal.tenant_id,
                    principal.user_id,
                    body.from_wallet_id,
                    body.to_wallet_id,
                    body.amount,
                    body.metadata,
                )
                .await
        },
    )
    .await?;

    Ok(Json(ApiResponse::success(transaction)))
}

async fn get_transaction(
    State(state): State<Arc<AppState>>,
    AuthenticatedUser(principal): AuthenticatedUser,
    Path(id): Path<TransactionId>,
) -> Result<Json<ApiResponse<serde_json::Value>>, ApiError> {
    let transaction = state
        .get_transaction
        .execute(id, principal.user_id, principal.role)
        .await?;
    Ok(Json(ApiResponse::success(serde_json::to_value(transaction).unwrap())))
}

#[derive(Debug, Deserialize)]
pub struct ListTransactionsQuery {
    pub status: Option<TransactionStatus>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

async fn list_transactions(
    State(state): State<Arc<AppState>>,
    AuthenticatedUser(principal): AuthenticatedUser,
    Query(query): Query<ListTransactionsQuery>,
) -> Result<Json<ApiResponse<serde_json::Value>>, ApiError> {
    let transactions = state
        .list_transactions
        .execute(
            principal.tenant_id,
            principal.user_id,
            principal.role,
            query.status,
            query.limit.unwrap_or(50).clamp(1, 200),
            query.offset.unwrap_or(0).max(0),
        )
        .await?;
    Ok(Json(ApiResponse::success(serde_json::to_value(transactions).unwrap())))
}

#[derive(Debug, Deserialize)]
pub struct CreateTenantRequest {
    pub name: String,
    pub slug: String,
    pub webhook_url: Option<String>,
}

async fn create_tenant(
    AuthenticatedUser(principal): AuthenticatedUser,
    State(state): State<Arc<AppState>>,
    Json(body): Json<CreateTenantRequest>,
) -> Result<(StatusCode, Json<ApiResponse<serde_json::Value>>), ApiError> {
    require_role(&principal, &[Role::PlatformAdmin, Role::TenantAdmin])?;

    let tenant = state
        .create_tenant
        .execute(body.name, body.slug, body.webhook_url)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(serde_json::to_value(tenant).unwrap())),
    ))
}

async fn get_tenant(
    AuthenticatedUser(principal): AuthenticatedUser,
    State(state): State<Arc<AppState>>,
    Path(id): Path<TenantId>,
) -> Result<Json<ApiResponse<serde_json::Value>>, ApiError> {
    require_role(&principal, &[Role::PlatformAdmin, Role::TenantAdmin])?;

    let tenant = state.get_tenant.execute(id).await?;
    Ok(Json(ApiResponse::success(serde_json::to_value(tenant).unwrap())))
}
