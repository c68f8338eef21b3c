//! 翻译后端：按模型区分请求体构造与响应解析。
//!
//! - `qwen-mt-plus`：OpenAI 兼容的对话补全接口，附带 `translation_options`；
//! - 其他模型：提示词生成接口，在提示词中说明翻译要求。

use serde_json::{Value, json};

use super::error::TranslateError;
use super::transport::HttpReply;
use crate::base_system::context::Config;

pub const MT_PLUS_MODEL: &str = "qwen-mt-plus";

const SOURCE_LANG_AUTO: &str = "auto";
const TARGET_LANG_CHINESE: &str = "Chinese";

const GENERATION_PROMPT_PREFIX: &str = "请将以下日文小说内容翻译成中文，保持原文的语气和风格：\n\n";

const BATCH_SYSTEM_INSTRUCTION: &str =
    "你是一个专业的日文小说翻译者，请将以下日文小说内容翻译成中文，保持原文的语气和风格。";

/// 各后端使用的接口地址。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiEndpoints {
    pub chat: String,
    pub generation: String,
    pub batch: String,
}

impl ApiEndpoints {
    pub fn from_config(cfg: &Config) -> Self {
        Self {
            chat: cfg.chat_endpoint.trim().to_string(),
            generation: cfg.generation_endpoint.trim().to_string(),
            batch: cfg.batch_endpoint.trim().to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TranslationBackend {
    MtPlus,
    Generation { model: String },
}

impl TranslationBackend {
    pub fn from_model(model: &str) -> Self {
        let model = model.trim();
        if model == MT_PLUS_MODEL {
            TranslationBackend::MtPlus
        } else {
            TranslationBackend::Generation {
                model: model.to_string(),
            }
        }
    }

    pub fn model_name(&self) -> &str {
        match self {
            TranslationBackend::MtPlus => MT_PLUS_MODEL,
            TranslationBackend::Generation { model } => model,
        }
    }

    pub fn single_endpoint<'a>(&self, endpoints: &'a ApiEndpoints) -> &'a str {
        match self {
            TranslationBackend::MtPlus => &endpoints.chat,
            TranslationBackend::Generation { .. } => &endpoints.generation,
        }
    }

    pub fn single_payload(&self, text: &str) -> Value {
        match self {
            TranslationBackend::MtPlus => json!({
                "model": MT_PLUS_MODEL,
                "messages": [
                    { "role": "user", "content": text }
                ],
                "translation_options": {
                    "source_lang": SOURCE_LANG_AUTO,
                    "target_lang": TARGET_LANG_CHINESE,
                },
            }),
            TranslationBackend::Generation { model } => json!({
                "model": model,
                "input": {
                    "prompt": format!("{GENERATION_PROMPT_PREFIX}{text}"),
                },
            }),
        }
    }

    /// 解析单条翻译响应。非 2xx、非 JSON、译文缺失或为空都返回错误。
    pub fn parse_single(&self, reply: &HttpReply) -> Result<String, TranslateError> {
        if !reply.is_success() {
            return Err(TranslateError::Status {
                status: reply.status,
                body: reply.body.clone(),
            });
        }

        let value: Value = serde_json::from_str(&reply.body)
            .map_err(|e| TranslateError::Decode(e.to_string()))?;
        let pointer = match self {
            TranslationBackend::MtPlus => "/choices/0/message/content",
            TranslationBackend::Generation { .. } => "/output/text",
        };

        value
            .pointer(pointer)
            .and_then(Value::as_str)
            .filter(|s| !s.trim().is_empty())
            .map(str::to_string)
            .ok_or(TranslateError::EmptyResult)
    }

    /// 批处理请求体：`parameters.batch` 为请求数组本身。
    pub fn batch_payload(&self, batch: Value) -> Value {
        match self {
            TranslationBackend::MtPlus => json!({
                "model": MT_PLUS_MODEL,
                "input": {},
                "parameters": {
                    "batch": batch,
                    "source_lang": SOURCE_LANG_AUTO,
                    "target_lang": TARGET_LANG_CHINESE,
                },
            }),
            TranslationBackend::Generation { model } => json!({
                "model": model,
                "input": {
                    "messages": [
                        { "role": "system", "content": BATCH_SYSTEM_INSTRUCTION }
                    ],
                },
                "parameters": {
                    "batch": batch,
                },
            }),
        }
    }
}
