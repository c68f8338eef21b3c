//! 下载流程使用的数据模型。

use std::path::PathBuf;

/// 用户指定的章节范围（1 起始，闭区间；缺省一端表示不限）。
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ChapterRange {
    pub start: Option<usize>,
    pub end: Option<usize>,
}

impl ChapterRange {
    pub fn is_unbounded(&self) -> bool {
        self.start.is_none() && self.end.is_none()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UrlKind {
    /// 单章页面，附带推断出的目录页地址
    Chapter { catalog_url: String },
    Catalog,
}

#[derive(Debug, Clone)]
pub struct DownloadRequest {
    pub url: String,
    pub output: Option<PathBuf>,
    pub range: Option<String>,
    pub model: String,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DownloadSummary {
    pub downloaded: usize,
    pub failed: usize,
    pub translated: usize,
    pub untranslated: usize,
}
