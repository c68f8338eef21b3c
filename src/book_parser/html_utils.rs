//! HTML 文本处理工具：去标签、实体解码、按类名/ID 截取元素内容。

use regex::Regex;
use std::borrow::Cow;
use std::sync::OnceLock;

fn re_all_tags() -> &'static Regex {
    static R: OnceLock<Regex> = OnceLock::new();
    R.get_or_init(|| Regex::new(r"(?is)<[^>]+>").expect("compile re_all_tags"))
}

fn re_ruby_annotation() -> &'static Regex {
    static R: OnceLock<Regex> = OnceLock::new();
    R.get_or_init(|| Regex::new(r"(?is)<rp>.*?</rp>").expect("compile re_ruby_annotation"))
}

fn re_entity() -> &'static Regex {
    static R: OnceLock<Regex> = OnceLock::new();
    R.get_or_init(|| {
        Regex::new(r"&(#[xX][0-9a-fA-F]{1,6}|#[0-9]{1,7}|[a-zA-Z]{2,8});").expect("compile re_entity")
    })
}

fn re_paragraph() -> &'static Regex {
    static R: OnceLock<Regex> = OnceLock::new();
    R.get_or_init(|| Regex::new(r"(?is)<p\b[^>]*>(.*?)</p>").expect("compile re_paragraph"))
}

// ── 实体解码 ────────────────────────────────────────────────────

pub(crate) fn unescape_entities(s: &str) -> Cow<'_, str> {
    if !s.contains('&') {
        return Cow::Borrowed(s);
    }
    re_entity().replace_all(s, |caps: &regex::Captures| {
        let name = &caps[1];
        let decoded = if let Some(hex) = name.strip_prefix("#x").or_else(|| name.strip_prefix("#X")) {
            u32::from_str_radix(hex, 16).ok().and_then(char::from_u32)
        } else if let Some(dec) = name.strip_prefix('#') {
            dec.parse::<u32>().ok().and_then(char::from_u32)
        } else {
            match name {
                "amp" => Some('&'),
                "lt" => Some('<'),
                "gt" => Some('>'),
                "quot" => Some('"'),
                "apos" => Some('\''),
                "nbsp" => Some('\u{a0}'),
                "hellip" => Some('…'),
                "mdash" => Some('—'),
                "ndash" => Some('–'),
                _ => None,
            }
        };
        decoded
            .map(String::from)
            .unwrap_or_else(|| caps[0].to_string())
    })
}

// ── 文本提取 ────────────────────────────────────────────────────

/// 对应 DOM 的 `get_text()`：去掉全部标签（含 ruby 注音括号，`<br>` 不产生换行），解码实体。
pub(crate) fn element_text(html: &str) -> String {
    let without_rp = re_ruby_annotation().replace_all(html, "");
    let stripped = re_all_tags().replace_all(&without_rp, "");
    unescape_entities(&stripped).into_owned()
}

/// 对应 `get_text(strip=True)`：去掉首尾空白。
pub(crate) fn element_text_trimmed(html: &str) -> String {
    element_text(html).trim().to_string()
}

/// 取出所有 `<p>` 元素的内部 HTML。
pub(crate) fn paragraphs(html: &str) -> Vec<&str> {
    re_paragraph()
        .captures_iter(html)
        .filter_map(|cap| cap.get(1).map(|m| m.as_str()))
        .collect()
}

// ── 元素定位 ────────────────────────────────────────────────────

/// 构造匹配 `<tag ... class="... {class} ...">inner</tag>` 的正则，捕获组 1 为内部 HTML。
///
/// 正则无法处理同名标签嵌套，内部出现同名闭合标签时会提前结束。
pub(crate) fn class_block_regex(tags: &[&str], class: &str) -> Regex {
    let alt = tags.join("|");
    let pattern = format!(
        r#"(?is)<(?:{alt})\b[^>]*\bclass\s*=\s*["'][^"']*\b{cls}\b[^"']*["'][^>]*>(.*?)</(?:{alt})\s*>"#,
        alt = alt,
        cls = regex::escape(class),
    );
    Regex::new(&pattern).expect("class block pattern is built from literals")
}

pub(crate) fn id_block_regex(tag: &str, id: &str) -> Regex {
    let pattern = format!(
        r#"(?is)<{tag}\b[^>]*\bid\s*=\s*["']{id}["'][^>]*>(.*?)</{tag}\s*>"#,
        tag = regex::escape(tag),
        id = regex::escape(id),
    );
    Regex::new(&pattern).expect("id block pattern is built from literals")
}
