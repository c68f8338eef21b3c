//! 翻译模块入口。
//!
//! 子模块：
//! - `language`  — 中日文判定
//! - `chunker`   — 按字符预算截断
//! - `backend`   — 各模型的请求体与响应解析
//! - `transport` — HTTP 传输
//! - `client`    — 单段翻译（重试 + 失败回退原文）
//! - `batch`     — 批处理请求
//! - `pipeline`  — 章节级流程

pub mod backend;
pub mod batch;
pub mod chunker;
pub mod client;
pub mod error;
pub mod language;
pub mod pipeline;
pub mod transport;
