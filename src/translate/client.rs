//! 单段文本翻译：语言判定 → 截断 → 带重试的远程调用，失败时返回原文。

use std::time::Duration;

use tracing::{debug, info, warn};

use super::backend::{ApiEndpoints, TranslationBackend};
use super::chunker::truncate;
use super::language::classify;
use super::transport::{HttpTransport, Transport};
use crate::base_system::context::Config;
use crate::base_system::retry::{RetryOutcome, RetryPolicy, Sleeper, ThreadSleeper, retry_fixed};

const PREVIEW_CHARS: usize = 1000;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranslatorSettings {
    pub endpoints: ApiEndpoints,
    pub timeout: Duration,
    pub retry: RetryPolicy,
    pub max_chars: usize,
}

impl TranslatorSettings {
    pub fn from_config(cfg: &Config) -> Self {
        Self {
            endpoints: ApiEndpoints::from_config(cfg),
            timeout: cfg.translate_timeout(),
            retry: RetryPolicy::fixed(cfg.translate_max_attempts, cfg.retry_delay()),
            max_chars: cfg.max_chunk_chars,
        }
    }
}

/// 翻译结果。除 `Translated` 外，携带的都是未翻译（可能已截断）的原文。
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TranslationOutcome {
    Translated(String),
    /// 已是中文或为空，未发出请求
    Skipped(String),
    /// 所有尝试均失败
    ExhaustedFallback(String),
    /// 未配置密钥
    Disabled(String),
}

impl TranslationOutcome {
    pub fn text(&self) -> &str {
        match self {
            TranslationOutcome::Translated(s)
            | TranslationOutcome::Skipped(s)
            | TranslationOutcome::ExhaustedFallback(s)
            | TranslationOutcome::Disabled(s) => s,
        }
    }

    pub fn is_translated(&self) -> bool {
        matches!(self, TranslationOutcome::Translated(_))
    }
}

pub struct TranslationClient<T: Transport = HttpTransport, S: Sleeper = ThreadSleeper> {
    transport: T,
    sleeper: S,
    settings: TranslatorSettings,
}

impl TranslationClient {
    pub fn from_config(cfg: &Config, api_key: &str) -> anyhow::Result<Self> {
        Ok(Self::new(
            HttpTransport::new(api_key)?,
            ThreadSleeper,
            TranslatorSettings::from_config(cfg),
        ))
    }
}

impl<T: Transport, S: Sleeper> TranslationClient<T, S> {
    pub fn new(transport: T, sleeper: S, settings: TranslatorSettings) -> Self {
        Self {
            transport,
            sleeper,
            settings,
        }
    }

    pub fn translate(&self, text: &str, backend: &TranslationBackend) -> TranslationOutcome {
        if text.is_empty() {
            return TranslationOutcome::Skipped(String::new());
        }

        let profile = classify(text);
        info!(
            "语言检测结果 - 中文: {}, 日文: {}, 可能是日文: {}",
            profile.has_chinese, profile.has_japanese, profile.likely_japanese
        );
        if !profile.needs_translation() {
            info!("内容已为中文，无需翻译");
            return TranslationOutcome::Skipped(text.to_string());
        }

        info!("开始翻译（模型: {}）...", backend.model_name());
        let max_chars = self.settings.max_chars;
        let char_count = text.chars().count();
        if char_count > max_chars {
            info!(
                "文本长度 {} 超过限制，将按换行符截断到 {} 字符以内",
                char_count, max_chars
            );
        }
        let text = truncate(text, max_chars);
        debug!("待翻译文本示例: {}", preview(&text, PREVIEW_CHARS));

        let url = backend.single_endpoint(&self.settings.endpoints);
        let payload = backend.single_payload(&text);
        let outcome = retry_fixed(&self.settings.retry, &self.sleeper, |attempt| {
            debug!("第{}次翻译请求", attempt);
            let reply = self
                .transport
                .post_json(url, &payload, self.settings.timeout)?;
            backend.parse_single(&reply)
        });

        match outcome {
            RetryOutcome::Succeeded { value, attempts } => {
                info!("翻译完成（第{}次尝试）", attempts);
                TranslationOutcome::Translated(value)
            }
            RetryOutcome::Exhausted {
                last_error,
                attempts,
            } => {
                warn!("{}次尝试都失败了，返回原文（最后一次错误: {}）", attempts, last_error);
                TranslationOutcome::ExhaustedFallback(text)
            }
        }
    }
}

fn preview(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => format!("{}...", &text[..idx]),
        None => text.to_string(),
    }
}
