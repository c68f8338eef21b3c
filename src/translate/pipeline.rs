//! 章节级翻译流程。未配置密钥时整体降级为原文透传。

use tracing::warn;

use super::backend::TranslationBackend;
use super::client::{TranslationClient, TranslationOutcome};
use super::transport::{HttpTransport, Transport};
use crate::base_system::context::Config;
use crate::base_system::retry::{Sleeper, ThreadSleeper};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessedChapter {
    pub title: String,
    pub outcome: TranslationOutcome,
}

impl ProcessedChapter {
    pub fn text(&self) -> &str {
        self.outcome.text()
    }
}

pub struct TranslationPipeline<T: Transport = HttpTransport, S: Sleeper = ThreadSleeper> {
    client: Option<TranslationClient<T, S>>,
}

impl TranslationPipeline {
    /// `api_key` 为 `None` 时不进行翻译。
    pub fn from_config(cfg: &Config, api_key: Option<&str>) -> anyhow::Result<Self> {
        match api_key {
            Some(key) => Ok(Self::new(TranslationClient::from_config(cfg, key)?)),
            None => Ok(Self::disabled()),
        }
    }
}

impl<T: Transport, S: Sleeper> TranslationPipeline<T, S> {
    pub fn new(client: TranslationClient<T, S>) -> Self {
        Self {
            client: Some(client),
        }
    }

    pub fn disabled() -> Self {
        Self { client: None }
    }

    pub fn is_enabled(&self) -> bool {
        self.client.is_some()
    }

    pub fn process_chapter(
        &self,
        title: &str,
        raw_text: &str,
        backend: &TranslationBackend,
    ) -> ProcessedChapter {
        let outcome = match &self.client {
            Some(client) => client.translate(raw_text, backend),
            None => TranslationOutcome::Disabled(raw_text.to_string()),
        };
        if let TranslationOutcome::ExhaustedFallback(_) = outcome {
            warn!("章节「{}」翻译失败，保留原文", title);
        }
        ProcessedChapter {
            title: title.to_string(),
            outcome,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::base_system::retry::{RecordingSleeper, RetryPolicy};
    use crate::translate::backend::ApiEndpoints;
    use crate::translate::client::TranslatorSettings;
    use crate::translate::transport::ScriptedTransport;

    fn pipeline(
        transport: ScriptedTransport,
    ) -> TranslationPipeline<ScriptedTransport, RecordingSleeper> {
        let settings = TranslatorSettings {
            endpoints: ApiEndpoints {
                chat: "http://chat.test".to_string(),
                generation: "http://gen.test".to_string(),
                batch: "http://batch.test".to_string(),
            },
            timeout: Duration::from_secs(60),
            retry: RetryPolicy::fixed(3, Duration::ZERO),
            max_chars: 4000,
        };
        TranslationPipeline::new(TranslationClient::new(
            transport,
            RecordingSleeper::default(),
            settings,
        ))
    }

    #[test]
    fn title_is_kept_and_text_translated() {
        let p = pipeline(ScriptedTransport::new(vec![ScriptedTransport::ok(
            200,
            r#"{"choices":[{"message":{"content":"第一话 开端"}}]}"#,
        )]));
        let out = p.process_chapter("第1話　始まり", "始まりの物語です", &TranslationBackend::MtPlus);

        assert_eq!(out.title, "第1話　始まり");
        assert_eq!(out.text(), "第一话 开端");
        assert!(out.outcome.is_translated());
    }

    #[test]
    fn failures_never_escape_the_pipeline() {
        let p = pipeline(ScriptedTransport::default());
        let out = p.process_chapter("t", "ひらがな", &TranslationBackend::MtPlus);
        assert_eq!(
            out.outcome,
            TranslationOutcome::ExhaustedFallback("ひらがな".to_string())
        );
    }

    #[test]
    fn disabled_pipeline_passes_text_through() {
        let p: TranslationPipeline<ScriptedTransport, RecordingSleeper> =
            TranslationPipeline::disabled();
        assert!(!p.is_enabled());
        let out = p.process_chapter("t", "これは", &TranslationBackend::MtPlus);
        assert_eq!(out.outcome, TranslationOutcome::Disabled("これは".to_string()));
    }
}
