use std::future::Future;
use std::sync::Arc;

use common::webhook_sig::sha256_hex;
use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;

use crate::domain::error::{IdempotencyError, IdempotentCallError};
use crate::domain::repository::IdempotencyRepository;
use crate::domain::types::{TenantId, UserId};

/// C2, strict policy: a write endpoint under `/wallet/*` replays its cached
/// response byte-for-byte on a (tenant, key, endpoint) repeat, and rejects
/// the same key reused against a different request body.
pub async fn call_idempotently<F, Fut, T, E>(
    idempotency_repo: &Arc<dyn IdempotencyRepository>,
    tenant_id: TenantId,
    user_id: UserId,
    key: &str,
    endpoint: &str,
    request_body: &Value,
    handler: F,
) -> Result<T, IdempotentCallError<E>>
where
    F: FnOnce() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    T: Serialize + DeserializeOwned,
    E: std::fmt::Debug,
{
    let request_hash = sha256_hex(request_body.to_string().as_bytes());

    if let Some(existing) = idempotency_repo.find(tenant_id, key, endpoint).await? {
        if existing.request_hash != request_hash {
            return Err(IdempotencyError::Conflict(
                "idempotency key reused with a different request body".into(),
            )
            .into());
        }
        let cached = serde_json::from_value(existing.response_body)
            .map_err(|e| IdempotencyError::Repository(e.to_string()))?;
        return Ok(cached);
    }

    let result = handler().await.map_err(IdempotentCallError::Handler)?;

    let response_body =
        serde_json::to_value(&result).map_err(|e| IdempotencyError::Repository(e.to_string()))?;
    idempotency_repo
        .create(
            tenant_id,
            user_id,
            key.to_string(),
            endpoint.to_string(),
            request_hash,
            response_body,
            200,
        )
        .await?;

    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::IdempotencyKey;
    use crate::domain::repository::MockIdempotencyRepository;
    use crate::domain::types::IdempotencyKeyId;
    use serde::Deserialize;

    #[derive(Debug, Serialize, Deserialize, PartialEq)]
    struct Payload {
        value: i32,
    }

    #[tokio::test]
    async fn first_call_invokes_handler_and_persists() {
        let mut repo = MockIdempotencyRepository::new();
        repo.expect_find().times(1).returning(|_, _, _| Ok(None));
        repo.expect_create().times(1).returning(|_, _, _, _, _, _, _| Ok(IdempotencyKeyId::new()));

        let repo: Arc<dyn IdempotencyRepository> = Arc::new(repo);
        let result: Result<Payload, IdempotentCallError<std::convert::Infallible>> =
            call_idempotently(
                &repo,
                TenantId::new(),
                UserId::new(),
                "key-1",
                "/wallet/withdraw",
                &serde_json::json!({"amount": 10}),
                || async { Ok(Payload { value: 42 }) },
            )
            .await;

        assert_eq!(result.unwrap(), Payload { value: 42 });
    }

    #[tokio::test]
    async fn replay_with_same_body_returns_cached_response() {
        let tenant_id = TenantId::new();
        let body = serde_json::json!({"amount": 10});
        let request_hash = sha256_hex(body.to_string().as_bytes());

        let mut repo = MockIdempotencyRepository::new();
        repo.expect_find().times(1).returning(move |tid, _, _| {
            Ok(Some(IdempotencyKey {
                id: IdempotencyKeyId::new(),
                tenant_id: tid,
                user_id: UserId::new(),
                key: "key-1".into(),
                endpoint: "/wallet/withdraw".into(),
                request_hash: request_hash.clone(),
                response_body: serde_json::to_value(Payload { value: 42 }).unwrap(),
                status_code: 200,
                created_at: chrono::Utc::now(),
            }))
        });

        let repo: Arc<dyn IdempotencyRepository> = Arc::new(repo);
        let mut calls = 0;
        let result: Result<Payload, IdempotentCallError<std::convert::Infallible>> =
            call_idempotently(&repo, tenant_id, UserId::new(), "key-1", "/wallet/withdraw", &body, || {
                calls += 1;
                async { Ok(Payload { value: 99 }) }
            })
            .await;

        assert_eq!(result.unwrap(), Payload { value: 42 });
        assert_eq!(calls, 0);
    }

    #[tokio::test]
    async fn replay_with_different_body_is_a_conflict() {
        let mut repo = MockIdempotencyRepository::new();
        repo.expect_find().times(1).returning(|tid, _, _| {
            Ok(Some(IdempotencyKey {
                id: IdempotencyKeyId::new(),
                tenant_id: tid,
                user_id: UserId::new(),
                key: "key-1".into(),
                endpoint: "/wallet/withdraw".into(),
                request_hash: "different-hash".into(),
                response_body: serde_json::to_value(Payload { value: 42 }).unwrap(),
                status_code: 200,
                created_at: chrono::Utc::now(),
            }))
        });

        let repo: Arc<dyn IdempotencyRepository> = Arc::new(repo);
        let result: Result<Payload, IdempotentCallError<std::convert::Infallible>> =
            call_idempotently(
                &repo,
                TenantId::new(),
                UserId::new(),
                "key-1",
                "/wallet/withdraw",
                &serde_json::json!({"amount": 20}),
                || async { Ok(Payload { value: 42 }) },
            )
            .await;

        assert!(matches!(
            result,
            Err(IdempotentCallError::Idempotency(IdempotencyError::Conflict(_)))
        ));
    }
}
