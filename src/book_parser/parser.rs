//! 小说站点页面解析：目录页（书名、章节链接）与章节页（标题、正文）。

use regex::Regex;
use std::sync::OnceLock;
use url::Url;

use super::html_utils::{
    class_block_regex, element_text, element_text_trimmed, id_block_regex, paragraphs,
};

pub const UNKNOWN_CHAPTER_TITLE: &str = "未知章节";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChapterLink {
    pub title: String,
    pub url: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChapterPage {
    pub title: String,
    pub content: String,
}

fn re_novel_title() -> &'static Regex {
    static R: OnceLock<Regex> = OnceLock::new();
    R.get_or_init(|| class_block_regex(&["h1", "h2", "p", "div", "span"], "p-novel__title"))
}

fn re_novel_text() -> &'static Regex {
    static R: OnceLock<Regex> = OnceLock::new();
    R.get_or_init(|| class_block_regex(&["div"], "p-novel__text"))
}

fn re_honbun() -> &'static Regex {
    static R: OnceLock<Regex> = OnceLock::new();
    R.get_or_init(|| id_block_regex("div", "novel_honbun"))
}

fn re_eplist_sublist() -> &'static Regex {
    static R: OnceLock<Regex> = OnceLock::new();
    R.get_or_init(|| class_block_regex(&["div", "dd", "li"], "p-eplist__sublist"))
}

fn re_anchor() -> &'static Regex {
    static R: OnceLock<Regex> = OnceLock::new();
    R.get_or_init(|| {
        Regex::new(r#"(?is)<a\b[^>]*\bhref\s*=\s*["']([^"']*)["'][^>]*>(.*?)</a\s*>"#)
            .expect("compile re_anchor")
    })
}

pub struct ContentParser;

impl ContentParser {
    /// 书名：`.p-novel__title` 的文本。
    pub fn parse_novel_title(html: &str) -> Option<String> {
        re_novel_title()
            .captures(html)
            .and_then(|cap| cap.get(1))
            .map(|m| element_text_trimmed(m.as_str()))
            .filter(|s| !s.is_empty())
    }

    /// 章节链接：`.p-eplist__sublist` 中的 `<a>`，`href` 以目录页地址为基准补全。
    pub fn parse_chapter_links(html: &str, catalog_url: &str) -> Vec<ChapterLink> {
        let base = Url::parse(catalog_url).ok();
        let mut links = Vec::new();
        for block in re_eplist_sublist().captures_iter(html) {
            let Some(inner) = block.get(1) else {
                continue;
            };
            for anchor in re_anchor().captures_iter(inner.as_str()) {
                let href = html_href(&anchor[1]);
                if href.is_empty() {
                    continue;
                }
                let Some(url) = resolve_url(base.as_ref(), &href) else {
                    continue;
                };
                links.push(ChapterLink {
                    title: element_text_trimmed(&anchor[2]),
                    url,
                });
            }
        }
        links
    }

    /// 章节页：标题取 `.p-novel__title`（缺省为「未知章节」），
    /// 正文依次尝试 `.p-novel__text p`、`#novel_honbun p`、页面内所有 `<p>`。
    pub fn parse_chapter(html: &str) -> ChapterPage {
        let title =
            Self::parse_novel_title(html).unwrap_or_else(|| UNKNOWN_CHAPTER_TITLE.to_string());

        let mut content = join_paragraphs(
            re_novel_text()
                .captures_iter(html)
                .filter_map(|cap| cap.get(1))
                .flat_map(|m| paragraphs(m.as_str())),
        );

        if content.is_empty() {
            content = join_paragraphs(
                re_honbun()
                    .captures_iter(html)
                    .filter_map(|cap| cap.get(1))
                    .flat_map(|m| paragraphs(m.as_str())),
            );
        }

        if content.is_empty() {
            content = join_paragraphs(paragraphs(html).into_iter());
        }

        ChapterPage { title, content }
    }
}

fn join_paragraphs<'a>(paras: impl Iterator<Item = &'a str>) -> String {
    paras.map(element_text).collect::<Vec<_>>().join("\n")
}

fn html_href(raw: &str) -> String {
    super::html_utils::unescape_entities(raw.trim()).into_owned()
}

fn resolve_url(base: Option<&Url>, href: &str) -> Option<String> {
    match base {
        Some(base) => base.join(href).ok().map(String::from),
        None => Url::parse(href).ok().map(String::from),
    }
}
