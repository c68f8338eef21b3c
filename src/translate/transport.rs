//! 访问翻译服务的 HTTP 传输层。

use std::time::Duration;

use anyhow::{Context, Result};
use reqwest::blocking::Client;
use reqwest::header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE, HeaderMap, HeaderValue};
use serde_json::Value;
use tracing::debug;

use super::error::TranslateError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpReply {
    pub status: u16,
    pub body: String,
}

impl HttpReply {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// 发送一个 JSON 请求并取回状态码与原始响应体。
///
/// 只有连接/超时/读取失败才返回错误；非 2xx 状态由调用方判断。
pub trait Transport {
    fn post_json(
        &self,
        url: &str,
        payload: &Value,
        timeout: Duration,
    ) -> Result<HttpReply, TranslateError>;
}

pub struct HttpTransport {
    client: Client,
}

impl HttpTransport {
    pub fn new(api_key: &str) -> Result<Self> {
        let mut auth = HeaderValue::from_str(&format!("Bearer {}", api_key.trim()))
            .context("API 密钥包含非法字符")?;
        auth.set_sensitive(true);

        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, auth);
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        let client = Client::builder()
            .default_headers(headers)
            .connect_timeout(Duration::from_secs(10))
            .build()
            .context("初始化 HTTP 客户端失败")?;
        Ok(Self { client })
    }
}

impl Transport for HttpTransport {
    fn post_json(
        &self,
        url: &str,
        payload: &Value,
        timeout: Duration,
    ) -> Result<HttpReply, TranslateError> {
        debug!("POST {} (timeout {:?})", url, timeout);
        let resp = self
            .client
            .post(url)
            .timeout(timeout)
            .json(payload)
            .send()
            .map_err(|e| TranslateError::Transport(e.to_string()))?;
        let status = resp.status().as_u16();
        let body = resp
            .text()
            .map_err(|e| TranslateError::Transport(e.to_string()))?;
        debug!("响应状态: {}, 长度: {}", status, body.len());
        Ok(HttpReply { status, body })
    }
}

/// 按顺序返回预设响应并记录每次请求的测试替身。
#[cfg(test)]
#[derive(Default)]
pub(crate) struct ScriptedTransport {
    replies: std::cell::RefCell<std::collections::VecDeque<Result<HttpReply, TranslateError>>>,
    pub(crate) calls: std::cell::RefCell<Vec<(String, Value, Duration)>>,
}

#[cfg(test)]
impl ScriptedTransport {
    pub(crate) fn new(replies: Vec<Result<HttpReply, TranslateError>>) -> Self {
        Self {
            replies: std::cell::RefCell::new(replies.into()),
            calls: Default::default(),
        }
    }

    pub(crate) fn ok(status: u16, body: &str) -> Result<HttpReply, TranslateError> {
        Ok(HttpReply {
            status,
            body: body.to_string(),
        })
    }

    pub(crate) fn call_count(&self) -> usize {
        self.calls.borrow().len()
    }
}

#[cfg(test)]
impl Transport for ScriptedTransport {
    fn post_json(
        &self,
        url: &str,
        payload: &Value,
        timeout: Duration,
    ) -> Result<HttpReply, TranslateError> {
        self.calls
            .borrow_mut()
            .push((url.to_string(), payload.clone(), timeout));
        self.replies
            .borrow_mut()
            .pop_front()
            .unwrap_or_else(|| Err(TranslateError::Transport("connection refused".to_string())))
    }
}
