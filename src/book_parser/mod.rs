//! 解析与导出模块入口。
//!
//! 负责从站点页面中取出书名/章节链接/正文，并将结果导出为 txt。

pub(crate) mod html_utils;
pub mod parser;
pub mod txt_export;
