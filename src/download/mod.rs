//! 下载流程模块入口。
//!
//! 子模块：
//! - `models`       — 数据模型（ChapterRange / UrlKind / DownloadRequest 等）
//! - `plan`         — URL 类型判断、章节范围与默认文件名
//! - `progress`     — 进度条与结果统计
//! - `downloader`   — 下载主流程编排
//! - `batch_files`  — 批处理请求文件的生成与提交

pub mod batch_files;
pub mod downloader;
pub mod models;
pub mod plan;
pub(crate) mod progress;
