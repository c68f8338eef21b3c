use thiserror::Error;

/// 单次翻译调用失败的原因。重试层把以下每种情况都视为一次失败的尝试。
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TranslateError {
    #[error("请求出错: {0}")]
    Transport(String),
    #[error("状态码异常: {status}, 响应内容: {body}")]
    Status { status: u16, body: String },
    #[error("翻译结果为空")]
    EmptyResult,
    #[error("响应解析失败: {0}")]
    Decode(String),
}

/// 批处理提交的失败报告，由调用方决定后续处理。
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BatchFailure {
    #[error("请求失败，状态码: {status}")]
    Status { status: u16, body: String },
    #[error("发送请求时出错: {0}")]
    Transport(String),
    #[error("响应不是合法的 JSON: {0}")]
    InvalidResponse(String),
}

impl From<TranslateError> for BatchFailure {
    fn from(err: TranslateError) -> Self {
        match err {
            TranslateError::Status { status, body } => BatchFailure::Status { status, body },
            TranslateError::Decode(msg) => BatchFailure::InvalidResponse(msg),
            other => BatchFailure::Transport(other.to_string()),
        }
    }
}
