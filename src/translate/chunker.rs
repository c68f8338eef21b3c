//! 按换行截断超长文本，保证单次请求不超过字符预算。

/// 长度（按字符计）不超过 `max_chars` 时原样返回；否则逐行累加，
/// 在第一行放不下的位置停止，并去掉结尾的一个换行。
///
/// 首行本身就超出预算时结果为空串。
pub fn truncate(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }

    let mut out = String::new();
    let mut used = 0usize;
    for line in text.split('\n') {
        let len = line.chars().count();
        if used + len + 1 > max_chars {
            break;
        }
        out.push_str(line);
        out.push('\n');
        used += len + 1;
    }
    if out.ends_with('\n') {
        out.pop();
    }
    out
}
