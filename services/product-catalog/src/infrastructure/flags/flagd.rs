//! flagd HTTP 评估客户端
//!
//! 走 flagd 的 Connect/JSON 接口 `flagd.evaluation.v1.Service/ResolveBoolean`

use std::time::Duration;

use astro_errors::{AppError, AppResult};
use astro_ports::{EvaluationContext, FeatureFlagPort};
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use tracing::debug;

const RESOLVE_BOOLEAN_PATH: &str = "/flagd.evaluation.v1.Service/ResolveBoolean";

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ResolveRequest<'a> {
    flag_key: &'a str,
    context: &'a EvaluationContext,
}

#[derive(Deserialize)]
struct ResolveBooleanResponse {
    value: bool,
    #[serde(default)]
    reason: Option<String>,
    #[serde(default)]
    variant: Option<String>,
}

/// flagd 开关提供方
pub struct FlagdFeatureFlags {
    client: Client,
    endpoint: String,
}

impl FlagdFeatureFlags {
    /// 创建客户端，`base_url` 形如 `http://flagd:8013`
    pub fn new(base_url: &str, timeout: Duration) -> AppResult<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .connect_timeout(timeout)
            .build()
            .map_err(|e| AppError::internal(format!("failed to build flagd client: {}", e)))?;

        Ok(Self {
            client,
            endpoint: format!("{}{}", base_url.trim_end_matches('/'), RESOLVE_BOOLEAN_PATH),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl FeatureFlagPort for FlagdFeatureFlags {
    async fn boolean_value(
        &self,
        flag: &str,
        default: bool,
        ctx: &EvaluationContext,
    ) -> AppResult<bool> {
        let response = self
            .client
            .post(&self.endpoint)
            .json(&ResolveRequest {
                flag_key: flag,
                context: ctx,
            })
            .send()
            .await
            .map_err(|e| AppError::external_service(format!("flagd request failed: {}", e)))?;

        if response.status() == StatusCode::NOT_FOUND {
            debug!(flag, "Flag not defined in flagd, using default");
            return Ok(default);
        }

        let response = response
            .error_for_status()
            .map_err(|e| AppError::external_service(format!("flagd returned error: {}", e)))?;

        let body: ResolveBooleanResponse = response
            .json()
            .await
            .map_err(|e| AppError::external_service(format!("invalid flagd response: {}", e)))?;

        debug!(
            flag,
            value = body.value,
            reason = body.reason.as_deref().unwrap_or(""),
            variant = body.variant.as_deref().unwrap_or(""),
            "Flag evaluated"
        );
        Ok(body.value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{Json, Router, http::StatusCode as AxumStatus, routing::post};
    use serde_json::{Value, json};
    use tokio::net::TcpListener;

    async fn spawn_flagd(router: Router) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        format!("http://{}", addr)
    }

    fn client(base: &str) -> FlagdFeatureFlags {
        FlagdFeatureFlags::new(base, Duration::from_millis(500)).unwrap()
    }

    #[test]
    fn test_endpoint_joins_base_url() {
        let flags = client("http://flagd:8013/");
        assert_eq!(
            flags.endpoint(),
            "http://flagd:8013/flagd.evaluation.v1.Service/ResolveBoolean"
        );
    }

    #[tokio::test]
    async fn test_resolves_value_and_sends_context() {
        let router = Router::new().route(
            RESOLVE_BOOLEAN_PATH,
            post(|Json(body): Json<Value>| async move {
                let enabled = body["flagKey"] == "productCatalogFailure"
                    && body["context"]["targetingKey"] == "OLJCESPC7Z";
                Json(json!({ "value": enabled, "reason": "TARGETING_MATCH", "variant": "on" }))
            }),
        );
        let base = spawn_flagd(router).await;

        let ctx = EvaluationContext::new().with_targeting_key("OLJCESPC7Z");
        let value = client(&base)
            .boolean_value("productCatalogFailure", false, &ctx)
            .await
            .unwrap();
        assert!(value);
    }

    #[tokio::test]
    async fn test_unknown_flag_returns_default() {
        let router = Router::new().route(
            RESOLVE_BOOLEAN_PATH,
            post(|| async { (AxumStatus::NOT_FOUND, Json(json!({ "code": "not_found" }))) }),
        );
        let base = spawn_flagd(router).await;

        let value = client(&base)
            .boolean_value("missing", true, &EvaluationContext::new())
            .await
            .unwrap();
        assert!(value);
    }

    #[tokio::test]
    async fn test_server_error_is_reported() {
        let router = Router::new().route(
            RESOLVE_BOOLEAN_PATH,
            post(|| async { AxumStatus::INTERNAL_SERVER_ERROR }),
        );
        let base = spawn_flagd(router).await;

        let err = client(&base)
            .boolean_value("productCatalogFailure", false, &EvaluationContext::new())
            .await
            .unwrap_err();
        assert_eq!(err.grpc_code(), tonic::Code::Internal);
    }

    #[tokio::test]
    async fn test_unreachable_flagd_is_reported() {
        let err = client("http://127.0.0.1:1")
            .boolean_value("productCatalogFailure", false, &EvaluationContext::new())
            .await
            .unwrap_err();
        assert!(!err.is_not_found());
    }
}
