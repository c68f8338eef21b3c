//! 基于 Unicode 区间的中日文判定。

/// 汉字占中日文字符总数的比例低于该值时判定为日文。
pub const CHINESE_RATIO_THRESHOLD: f64 = 0.7;

/// 日文文本中常见的括号类标点。
pub const JAPANESE_PUNCTUATION: [char; 10] =
    ['「', '」', '『', '』', '（', '）', '｛', '｝', '［', '］'];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LanguageProfile {
    pub has_chinese: bool,
    pub has_japanese: bool,
    pub likely_japanese: bool,
}

impl LanguageProfile {
    /// 含汉字且没有日文特征的文本视为中文，无需翻译。
    pub fn needs_translation(&self) -> bool {
        !(self.has_chinese && !self.likely_japanese)
    }
}

pub fn is_cjk_ideograph(ch: char) -> bool {
    ('\u{4e00}'..='\u{9fff}').contains(&ch)
}

pub fn is_hiragana(ch: char) -> bool {
    ('\u{3040}'..='\u{309f}').contains(&ch)
}

pub fn is_katakana(ch: char) -> bool {
    ('\u{30a0}'..='\u{30ff}').contains(&ch)
}

pub fn classify(text: &str) -> LanguageProfile {
    let mut chinese = 0usize;
    let mut hiragana = 0usize;
    let mut katakana = 0usize;
    let mut japanese_punct = false;

    for ch in text.chars() {
        if is_cjk_ideograph(ch) {
            chinese += 1;
        } else if is_hiragana(ch) {
            hiragana += 1;
        } else if is_katakana(ch) {
            katakana += 1;
        } else if JAPANESE_PUNCTUATION.contains(&ch) {
            japanese_punct = true;
        }
    }

    let has_japanese = hiragana + katakana > 0;
    let total = chinese + hiragana + katakana;
    let low_chinese_ratio =
        total > 0 && (chinese as f64) / (total as f64) < CHINESE_RATIO_THRESHOLD;

    LanguageProfile {
        has_chinese: chinese > 0,
        has_japanese,
        likely_japanese: has_japanese || japanese_punct || katakana > 0 || low_chinese_ratio,
    }
}
