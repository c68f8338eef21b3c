//! 章节处理进度条。

use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};

use super::models::DownloadSummary;
use crate::translate::client::TranslationOutcome;

pub(crate) struct ProgressReporter {
    pub(crate) summary: DownloadSummary,
    bar: ProgressBar,
}

impl ProgressReporter {
    pub(crate) fn new(total: usize, prefix: &'static str) -> Self {
        let bar = ProgressBar::with_draw_target(Some(total as u64), ProgressDrawTarget::stderr());
        let style = ProgressStyle::with_template(
            "{prefix} [{elapsed_precise}] {wide_bar} {pos}/{len} ({eta}) {msg}",
        )
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("##-");
        bar.set_style(style);
        bar.set_prefix(prefix);
        Self {
            summary: DownloadSummary::default(),
            bar,
        }
    }

    /// 不绘制任何内容，用于测试。
    #[cfg(test)]
    pub(crate) fn hidden(total: usize) -> Self {
        Self {
            summary: DownloadSummary::default(),
            bar: ProgressBar::with_draw_target(Some(total as u64), ProgressDrawTarget::hidden()),
        }
    }

    pub(crate) fn set_current(&self, title: &str) {
        self.bar.set_message(title.to_string());
    }

    pub(crate) fn record_chapter(&mut self, outcome: &TranslationOutcome) {
        self.summary.downloaded += 1;
        if outcome.is_translated() {
            self.summary.translated += 1;
        } else if matches!(outcome, TranslationOutcome::ExhaustedFallback(_)) {
            self.summary.untranslated += 1;
        }
        self.bar.inc(1);
    }

    pub(crate) fn record_failure(&mut self) {
        self.summary.failed += 1;
        self.bar.inc(1);
    }

    pub(crate) fn finish(self) -> DownloadSummary {
        self.bar.finish_and_clear();
        self.summary
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tallies_outcomes() {
        let mut reporter = ProgressReporter::hidden(4);
        reporter.record_chapter(&TranslationOutcome::Translated("a".into()));
        reporter.record_chapter(&TranslationOutcome::Skipped("b".into()));
        reporter.record_chapter(&TranslationOutcome::ExhaustedFallback("c".into()));
        reporter.record_failure();

        let summary = reporter.finish();
        assert_eq!(
            summary,
            DownloadSummary {
                downloaded: 3,
                failed: 1,
                translated: 1,
                untranslated: 1,
            }
        );
    }
}
