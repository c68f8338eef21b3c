//! 批处理翻译：多条请求合并为一次远程调用。
//!
//! 批内 `id` 需由调用方保证唯一，这里不做去重；`duplicate_ids` 供调用方提前检查。

use std::collections::HashSet;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{error, info};

use super::backend::{ApiEndpoints, TranslationBackend};
use super::error::BatchFailure;
use super::transport::{HttpTransport, Transport};
use crate::base_system::context::Config;

pub const TRANSLATE_ACTION: &str = "TranslateToChinese";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TranslationRequest {
    pub action: String,
    pub id: String,
    pub params: TranslationParams,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TranslationParams {
    pub text: String,
    pub source_lang: String,
    pub target_lang: String,
}

impl TranslationRequest {
    pub fn to_chinese(id: impl Into<String>, text: impl Into<String>, source_lang: &str) -> Self {
        Self {
            action: TRANSLATE_ACTION.to_string(),
            id: id.into(),
            params: TranslationParams {
                text: text.into(),
                source_lang: source_lang.to_string(),
                target_lang: "zh".to_string(),
            },
        }
    }
}

/// 返回批内重复出现的 id（每个只列一次，按首次重复的顺序）。
pub fn duplicate_ids(requests: &[TranslationRequest]) -> Vec<&str> {
    let mut seen = HashSet::new();
    let mut reported = HashSet::new();
    let mut dups = Vec::new();
    for req in requests {
        let id = req.id.as_str();
        if !seen.insert(id) && reported.insert(id) {
            dups.push(id);
        }
    }
    dups
}

pub struct BatchOrchestrator<T: Transport = HttpTransport> {
    transport: T,
    endpoint: String,
    timeout: Duration,
}

impl BatchOrchestrator {
    pub fn from_config(cfg: &Config, api_key: &str) -> anyhow::Result<Self> {
        Ok(Self::new(
            HttpTransport::new(api_key)?,
            ApiEndpoints::from_config(cfg).batch,
            cfg.batch_timeout(),
        ))
    }
}

impl<T: Transport> BatchOrchestrator<T> {
    pub fn new(transport: T, endpoint: impl Into<String>, timeout: Duration) -> Self {
        Self {
            transport,
            endpoint: endpoint.into(),
            timeout,
        }
    }

    pub fn build_payload(
        requests: &[TranslationRequest],
        backend: &TranslationBackend,
    ) -> Result<Value, BatchFailure> {
        let batch = serde_json::to_value(requests)
            .map_err(|e| BatchFailure::InvalidResponse(e.to_string()))?;
        Ok(backend.batch_payload(batch))
    }

    /// 一次性提交整批请求，不做单项重试。成功时返回服务端原始 JSON。
    pub fn submit_batch(
        &self,
        requests: &[TranslationRequest],
        backend: &TranslationBackend,
    ) -> Result<Value, BatchFailure> {
        let payload = Self::build_payload(requests, backend)?;
        info!(
            "正在发送批处理请求（{} 条，模型: {}）...",
            requests.len(),
            backend.model_name()
        );

        let reply = self
            .transport
            .post_json(&self.endpoint, &payload, self.timeout)
            .map_err(BatchFailure::from)?;

        if !reply.is_success() {
            error!("请求失败，状态码: {}", reply.status);
            error!("响应内容: {}", reply.body);
            return Err(BatchFailure::Status {
                status: reply.status,
                body: reply.body,
            });
        }

        let value: Value = serde_json::from_str(&reply.body)
            .map_err(|e| BatchFailure::InvalidResponse(e.to_string()))?;
        info!("批处理请求发送成功");
        Ok(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::translate::error::TranslateError;
    use crate::translate::transport::ScriptedTransport;
    use serde_json::json;

    fn sample_requests() -> Vec<TranslationRequest> {
        vec![TranslationRequest::to_chinese("c1", "これはテストです。", "ja")]
    }

    fn orchestrator(
        replies: Vec<Result<crate::translate::transport::HttpReply, TranslateError>>,
    ) -> BatchOrchestrator<ScriptedTransport> {
        BatchOrchestrator::new(
            ScriptedTransport::new(replies),
            "http://batch.test/translate",
            Duration::from_secs(300),
        )
    }

    #[test]
    fn request_serializes_to_wire_shape() {
        let value = serde_json::to_value(&sample_requests()[0]).unwrap();
        assert_eq!(
            value,
            json!({
                "action": "TranslateToChinese",
                "id": "c1",
                "params": {
                    "text": "これはテストです。",
                    "source_lang": "ja",
                    "target_lang": "zh"
                }
            })
        );
    }

    #[test]
    fn mt_plus_payload_embeds_batch_without_messages() {
        let requests = sample_requests();
        let payload =
            BatchOrchestrator::<ScriptedTransport>::build_payload(&requests, &TranslationBackend::MtPlus)
                .unwrap();

        assert_eq!(payload["model"], "qwen-mt-plus");
        assert_eq!(payload["parameters"]["batch"], serde_json::to_value(&requests).unwrap());
        assert_eq!(payload["parameters"]["source_lang"], "auto");
        assert_eq!(payload["parameters"]["target_lang"], "Chinese");
        assert!(payload["input"].get("messages").is_none());
    }

    #[test]
    fn successful_submit_returns_raw_json() {
        let o = orchestrator(vec![ScriptedTransport::ok(
            200,
            r#"{"output":{"results":[{"id":"c1","text":"这是测试。"}]}}"#,
        )]);
        let result = o
            .submit_batch(&sample_requests(), &TranslationBackend::MtPlus)
            .unwrap();

        assert_eq!(result["output"]["results"][0]["id"], "c1");
        let calls = o.transport.calls.borrow();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].0, "http://batch.test/translate");
        assert_eq!(calls[0].2, Duration::from_secs(300));
    }

    #[test]
    fn non_success_status_is_reported_not_retried() {
        let o = orchestrator(vec![
            ScriptedTransport::ok(400, r#"{"code":"InvalidParameter"}"#),
            ScriptedTransport::ok(200, "{}"),
        ]);
        let err = o
            .submit_batch(&sample_requests(), &TranslationBackend::MtPlus)
            .unwrap_err();

        assert_eq!(
            err,
            BatchFailure::Status {
                status: 400,
                body: r#"{"code":"InvalidParameter"}"#.to_string()
            }
        );
        assert_eq!(o.transport.call_count(), 1);
    }

    #[test]
    fn transport_error_becomes_tagged_failure() {
        let o = orchestrator(vec![Err(TranslateError::Transport("timed out".to_string()))]);
        let err = o
            .submit_batch(&sample_requests(), &TranslationBackend::MtPlus)
            .unwrap_err();
        assert!(matches!(err, BatchFailure::Transport(msg) if msg.contains("timed out")));
    }

    #[test]
    fn non_json_success_body_is_invalid_response() {
        let o = orchestrator(vec![ScriptedTransport::ok(200, "<html>oops</html>")]);
        let err = o
            .submit_batch(&sample_requests(), &TranslationBackend::MtPlus)
            .unwrap_err();
        assert!(matches!(err, BatchFailure::InvalidResponse(_)));
    }

    #[test]
    fn from_config_uses_configured_batch_endpoint() {
        let cfg = Config {
            batch_endpoint: "  https://batch.example.test/translate  ".to_string(),
            batch_timeout: 120,
            ..Config::default()
        };
        let o = BatchOrchestrator::from_config(&cfg, "sk-test").unwrap();
        assert_eq!(o.endpoint, "https://batch.example.test/translate");
        assert_eq!(o.timeout, Duration::from_secs(120));
    }

    #[test]
    fn duplicate_ids_are_listed_once() {
        let reqs = vec![
            TranslationRequest::to_chinese("a", "x", "ja"),
            TranslationRequest::to_chinese("b", "x", "ja"),
            TranslationRequest::to_chinese("a", "x", "ja"),
            TranslationRequest::to_chinese("a", "x", "ja"),
        ];
        assert_eq!(duplicate_ids(&reqs), vec!["a"]);
        assert!(duplicate_ids(&reqs[..2]).is_empty());
    }
}
