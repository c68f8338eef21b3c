//! 将章节写入单个 txt 文件。

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::Path;

use anyhow::{Context, Result};
use tracing::info;

use crate::translate::pipeline::ProcessedChapter;

const CHAPTER_SEPARATOR_WIDTH: usize = 50;

pub fn render_txt(chapters: &[ProcessedChapter]) -> String {
    let separator = format!("\n{}\n\n", "=".repeat(CHAPTER_SEPARATOR_WIDTH));
    let mut out = String::new();
    for (i, chapter) in chapters.iter().enumerate() {
        if i > 0 {
            out.push_str(&separator);
        }
        out.push_str(&chapter.title);
        out.push_str("\n\n");
        out.push_str(chapter.text());
        out.push('\n');
    }
    out
}

pub fn save_to_txt(chapters: &[ProcessedChapter], path: &Path) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("创建目录失败: {}", parent.display()))?;
    }
    let file =
        File::create(path).with_context(|| format!("无法写入文件: {}", path.display()))?;
    let mut writer = BufWriter::new(file);
    writer.write_all(render_txt(chapters).as_bytes())?;
    writer.flush()?;
    info!("小说已保存到 {}", path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::translate::client::TranslationOutcome;

    fn chapter(title: &str, text: &str) -> ProcessedChapter {
        ProcessedChapter {
            title: title.to_string(),
            outcome: TranslationOutcome::Translated(text.to_string()),
        }
    }

    #[test]
    fn chapters_are_separated_by_rule() {
        let rendered = render_txt(&[chapter("第一章", "正文一"), chapter("第二章", "正文二")]);
        let rule = "=".repeat(50);
        assert_eq!(
            rendered,
            format!("第一章\n\n正文一\n\n{rule}\n\n第二章\n\n正文二\n")
        );
    }

    #[test]
    fn writes_file_creating_parent_dirs() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out").join("book.txt");
        save_to_txt(&[chapter("序", "本文")], &path).unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "序\n\n本文\n");
    }
}
