//! 下载计划：URL 类型判断、章节范围解析与默认文件名。

use time::OffsetDateTime;
use time::macros::format_description;
use url::Url;

use super::models::{ChapterRange, UrlKind};
use crate::base_system::context::safe_fs_name;

/// 解析 `"1-10"`、`"5-"`、`"-20"`、`"5"` 形式的章节范围；格式错误返回 `None`。
pub fn parse_chapter_range(input: &str) -> Option<ChapterRange> {
    let input = input.trim();
    if input.is_empty() {
        return Some(ChapterRange::default());
    }

    let parse_bound = |s: &str| -> Result<Option<usize>, std::num::ParseIntError> {
        let s = s.trim();
        if s.is_empty() {
            Ok(None)
        } else {
            s.parse::<usize>().map(Some)
        }
    };

    let parts: Vec<&str> = input.split('-').collect();
    match parts.as_slice() {
        [single] => {
            let n = single.trim().parse::<usize>().ok()?;
            Some(ChapterRange {
                start: Some(n),
                end: Some(n),
            })
        }
        [start, end] => Some(ChapterRange {
            start: parse_bound(start).ok()?,
            end: parse_bound(end).ok()?,
        }),
        _ => None,
    }
}

/// 按范围截取章节，返回截取结果与起始下标（0 起始）。
pub fn apply_range<T>(mut items: Vec<T>, range: ChapterRange) -> (Vec<T>, usize) {
    let len = items.len();
    let start = range.start.map(|s| s.saturating_sub(1)).unwrap_or(0);
    let end = range.end.unwrap_or(len).min(len);
    if start >= end {
        return (Vec::new(), start);
    }
    items.truncate(end);
    (items.split_off(start), start)
}

/// 路径至少两段且最后一段为纯数字时视为章节页，否则视为目录页。
pub fn detect_url_kind(url: &str) -> UrlKind {
    let Ok(parsed) = Url::parse(url.trim()) else {
        return UrlKind::Catalog;
    };
    let path = parsed.path();
    let segments: Vec<&str> = path.trim_matches('/').split('/').collect();
    let is_chapter = segments.len() >= 2
        && segments
            .last()
            .is_some_and(|s| !s.is_empty() && s.chars().all(|c| c.is_ascii_digit()));
    if !is_chapter {
        return UrlKind::Catalog;
    }

    let parent = if path.ends_with('/') { "../" } else { "./" };
    match parsed.join(parent) {
        Ok(catalog) => UrlKind::Chapter {
            catalog_url: catalog.to_string(),
        },
        Err(_) => UrlKind::Catalog,
    }
}

/// 书名（缺省为当前时间）加范围后缀，如 `书名_第1到第10章.txt`。
pub fn default_filename(novel_title: Option<&str>, range: ChapterRange) -> String {
    let mut name = match novel_title.map(str::trim).filter(|t| !t.is_empty()) {
        Some(title) => safe_fs_name(title, "_", 120),
        None => timestamp_stem(),
    };

    match (range.start, range.end) {
        (Some(start), Some(end)) => name.push_str(&format!("_第{}到第{}章", start, end)),
        (Some(start), None) => name.push_str(&format!("_从第{}章开始", start)),
        (None, Some(end)) => name.push_str(&format!("_到第{}章结束", end)),
        (None, None) => {}
    }

    name + ".txt"
}

fn timestamp_stem() -> String {
    let now = OffsetDateTime::now_local().unwrap_or_else(|_| OffsetDateTime::now_utc());
    now.format(format_description!(
        "[year][month][day]_[hour][minute][second]"
    ))
    .unwrap_or_else(|_| "novel".to_string())
}
