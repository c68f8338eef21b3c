//! 全局配置结构（Config）与默认值。
//!
//! 该模块同时提供生成 `config.yml` 的字段元信息。

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::config::{ConfigSpec, FieldMeta};

pub const DEFAULT_MODEL: &str = "qwen-mt-plus";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    // 翻译配置
    #[serde(default = "default_model")]
    pub model: String,
    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,
    #[serde(default = "default_chat_endpoint")]
    pub chat_endpoint: String,
    #[serde(default = "default_generation_endpoint")]
    pub generation_endpoint: String,
    #[serde(default = "default_batch_endpoint")]
    pub batch_endpoint: String,
    #[serde(default = "default_translate_timeout")]
    pub translate_timeout: u64,
    #[serde(default = "default_batch_timeout")]
    pub batch_timeout: u64,
    #[serde(default = "default_translate_max_attempts")]
    pub translate_max_attempts: u32,
    #[serde(default = "default_translate_retry_delay")]
    pub translate_retry_delay: u64,
    #[serde(default = "default_max_chunk_chars")]
    pub max_chunk_chars: usize,

    // 网络配置
    #[serde(default = "default_chapter_delay")]
    pub chapter_delay: u64,
    #[serde(default = "default_request_timeout")]
    pub request_timeout: u64,
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    // 路径配置
    #[serde(default)]
    pub save_path: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            model: default_model(),
            api_key_env: default_api_key_env(),
            chat_endpoint: default_chat_endpoint(),
            generation_endpoint: default_generation_endpoint(),
            batch_endpoint: default_batch_endpoint(),
            translate_timeout: default_translate_timeout(),
            batch_timeout: default_batch_timeout(),
            translate_max_attempts: default_translate_max_attempts(),
            translate_retry_delay: default_translate_retry_delay(),
            max_chunk_chars: default_max_chunk_chars(),
            chapter_delay: default_chapter_delay(),
            request_timeout: default_request_timeout(),
            user_agent: default_user_agent(),
            save_path: String::new(),
        }
    }
}

impl ConfigSpec for Config {
    const FILE_NAME: &'static str = "config.yml";

    fn fields() -> &'static [FieldMeta] {
        static FIELDS: [FieldMeta; 14] = [
            FieldMeta {
                name: "model",
                description: "翻译模型（qwen-mt-plus 使用翻译专用接口，其余模型走提示词生成接口）",
            },
            FieldMeta {
                name: "api_key_env",
                description: "保存 API 密钥的环境变量名",
            },
            FieldMeta {
                name: "chat_endpoint",
                description: "qwen-mt-plus 的对话补全接口地址",
            },
            FieldMeta {
                name: "generation_endpoint",
                description: "提示词生成接口地址（非 qwen-mt-plus 模型）",
            },
            FieldMeta {
                name: "batch_endpoint",
                description: "批处理翻译接口地址",
            },
            FieldMeta {
                name: "translate_timeout",
                description: "单次翻译请求超时时间（秒）",
            },
            FieldMeta {
                name: "batch_timeout",
                description: "批处理请求超时时间（秒）",
            },
            FieldMeta {
                name: "translate_max_attempts",
                description: "单段文本最多尝试翻译的次数",
            },
            FieldMeta {
                name: "translate_retry_delay",
                description: "翻译失败后等待多久再重试（秒）",
            },
            FieldMeta {
                name: "max_chunk_chars",
                description: "单次翻译的最大字符数，超出部分按换行截断",
            },
            FieldMeta {
                name: "chapter_delay",
                description: "章节之间的间隔时间（秒），避免请求过于频繁",
            },
            FieldMeta {
                name: "request_timeout",
                description: "网页请求超时时间（秒）",
            },
            FieldMeta {
                name: "user_agent",
                description: "抓取网页时使用的 User-Agent",
            },
            FieldMeta {
                name: "save_path",
                description: "保存路径（留空为当前目录）",
            },
        ];
        &FIELDS
    }
}

impl Config {
    pub fn default_save_dir(&self) -> PathBuf {
        if self.save_path.trim().is_empty() {
            PathBuf::from(".")
        } else {
            PathBuf::from(&self.save_path)
        }
    }

    pub fn translate_timeout(&self) -> Duration {
        Duration::from_secs(self.translate_timeout.max(1))
    }

    pub fn batch_timeout(&self) -> Duration {
        Duration::from_secs(self.batch_timeout.max(1))
    }

    pub fn retry_delay(&self) -> Duration {
        Duration::from_secs(self.translate_retry_delay)
    }

    pub fn chapter_delay(&self) -> Duration {
        Duration::from_secs(self.chapter_delay)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout.max(1))
    }

    /// 从环境变量读取 API 密钥；空字符串视为未设置。
    pub fn api_key(&self) -> Option<String> {
        std::env::var(&self.api_key_env)
            .ok()
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
    }
}

pub fn safe_fs_name(name: &str, replacement: &str, max_len: usize) -> String {
    let mut cleaned: String = name
        .chars()
        .map(|ch| match ch {
            ':' => '：',
            '"' => '＂',
            '<' => '《',
            '>' => '》',
            '/' | '\\' => '、',
            '|' => '｜',
            '?' => '？',
            '*' => '＊',
            c if (c as u32) < 32 => replacement.chars().next().unwrap_or('_'),
            _ => ch,
        })
        .collect();

    while cleaned.ends_with(' ') || cleaned.ends_with('.') {
        cleaned.pop();
    }

    if cleaned.is_empty() {
        cleaned.push_str("unnamed");
    }

    const RESERVED: [&str; 22] = [
        "CON", "PRN", "AUX", "NUL", "COM1", "COM2", "COM3", "COM4", "COM5", "COM6", "COM7", "COM8",
        "COM9", "LPT1", "LPT2", "LPT3", "LPT4", "LPT5", "LPT6", "LPT7", "LPT8", "LPT9",
    ];
    if RESERVED.contains(&cleaned.to_uppercase().as_str()) {
        cleaned = format!("_{}", cleaned);
    }

    if cleaned.len() > max_len {
        // 避免在多字节 UTF-8 字符中间截断
        let mut end = max_len;
        while end > 0 && !cleaned.is_char_boundary(end) {
            end -= 1;
        }
        cleaned.truncate(end);
        while cleaned.ends_with(' ') || cleaned.ends_with('.') {
            cleaned.pop();
        }
        if cleaned.is_empty() {
            cleaned.push_str("unnamed");
        }
    }

    cleaned
}

fn default_model() -> String {
    DEFAULT_MODEL.to_string()
}

fn default_api_key_env() -> String {
    "DASHSCOPE_API_KEY".to_string()
}

fn default_chat_endpoint() -> String {
    "https://dashscope.aliyuncs.com/compatible-mode/v1/chat/completions".to_string()
}

fn default_generation_endpoint() -> String {
    "https://dashscope.aliyuncs.com/api/v1/services/aigc/text-generation/generation".to_string()
}

fn default_batch_endpoint() -> String {
    "https://dashscope.aliyuncs.com/api/v1/services/translateto/chinese".to_string()
}

fn default_translate_timeout() -> u64 {
    60
}

fn default_batch_timeout() -> u64 {
    300
}

fn default_translate_max_attempts() -> u32 {
    3
}

fn default_translate_retry_delay() -> u64 {
    5
}

fn default_max_chunk_chars() -> usize {
    4000
}

fn default_chapter_delay() -> u64 {
    2
}

fn default_request_timeout() -> u64 {
    15
}

fn default_user_agent() -> String {
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36".to_string()
}
