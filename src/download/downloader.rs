//! 下载主流程：抓取章节 → 逐章翻译 → 汇总写入 txt。
//!
//! 章节严格按顺序处理，每章成功后固定等待 `chapter_delay`，避免请求过于频繁。

use std::path::PathBuf;

use anyhow::{Context, Result};
use tracing::{error, info, warn};

use super::models::{ChapterRange, DownloadRequest, UrlKind};
use super::plan::{apply_range, default_filename, detect_url_kind, parse_chapter_range};
use super::progress::ProgressReporter;
use crate::base_system::context::Config;
use crate::base_system::retry::{Sleeper, ThreadSleeper};
use crate::book_parser::parser::{ChapterLink, ChapterPage};
use crate::book_parser::txt_export::save_to_txt;
use crate::network_parser::network::{NovelWebConfig, NovelWebNetwork};
use crate::translate::backend::TranslationBackend;
use crate::translate::pipeline::{ProcessedChapter, TranslationPipeline};
use crate::translate::transport::Transport;

/// 章节数据来源；生产环境为站点抓取。
pub(crate) trait ChapterSource {
    fn novel_title(&self, catalog_url: &str) -> Option<String>;
    fn chapter_links(&self, catalog_url: &str) -> Vec<ChapterLink>;
    fn chapter(&self, chapter_url: &str) -> Option<ChapterPage>;
}

impl ChapterSource for NovelWebNetwork {
    fn novel_title(&self, catalog_url: &str) -> Option<String> {
        self.fetch_novel_title(catalog_url)
    }

    fn chapter_links(&self, catalog_url: &str) -> Vec<ChapterLink> {
        self.fetch_chapter_links(catalog_url)
    }

    fn chapter(&self, chapter_url: &str) -> Option<ChapterPage> {
        self.fetch_chapter(chapter_url)
    }
}

pub fn run_download(
    config: &Config,
    request: &DownloadRequest,
    api_key: Option<&str>,
) -> Result<Option<PathBuf>> {
    let network = NovelWebNetwork::new(NovelWebConfig::from_config(config))
        .context("初始化网页客户端失败")?;
    let pipeline =
        TranslationPipeline::from_config(config, api_key).context("初始化翻译客户端失败")?;
    download_with(config, request, &network, &pipeline, &ThreadSleeper)
}

pub(crate) fn download_with<Src, T, S>(
    config: &Config,
    request: &DownloadRequest,
    source: &Src,
    pipeline: &TranslationPipeline<T, S>,
    pacer: &dyn Sleeper,
) -> Result<Option<PathBuf>>
where
    Src: ChapterSource,
    T: Transport,
    S: Sleeper,
{
    let backend = TranslationBackend::from_model(&request.model);
    if !pipeline.is_enabled() {
        info!("未启用翻译，章节将以原文保存");
    }
    let range = match request.range.as_deref() {
        None => ChapterRange::default(),
        Some(raw) => parse_chapter_range(raw).unwrap_or_else(|| {
            warn!("无效的章节范围格式: {}，将下载所有章节", raw);
            ChapterRange::default()
        }),
    };

    match detect_url_kind(&request.url) {
        UrlKind::Chapter { catalog_url } => {
            info!("检测到章节页URL，直接下载该章节...");
            download_single(config, request, source, pipeline, &backend, &catalog_url)
        }
        UrlKind::Catalog => {
            info!("检测到目录页URL，正在提取所有章节链接...");
            download_catalog(config, request, source, pipeline, &backend, range, pacer)
        }
    }
}

fn download_single<Src, T, S>(
    config: &Config,
    request: &DownloadRequest,
    source: &Src,
    pipeline: &TranslationPipeline<T, S>,
    backend: &TranslationBackend,
    catalog_url: &str,
) -> Result<Option<PathBuf>>
where
    Src: ChapterSource,
    T: Transport,
    S: Sleeper,
{
    let Some(page) = source.chapter(&request.url).filter(|p| !p.content.is_empty()) else {
        error!("无法提取章节内容");
        return Ok(None);
    };

    let chapter = pipeline.process_chapter(&page.title, &page.content, backend);
    let output = match &request.output {
        Some(path) => path.clone(),
        None => {
            let novel_title = source.novel_title(catalog_url);
            config
                .default_save_dir()
                .join(default_filename(novel_title.as_deref(), ChapterRange::default()))
        }
    };

    save_to_txt(std::slice::from_ref(&chapter), &output)?;
    Ok(Some(output))
}

fn download_catalog<Src, T, S>(
    config: &Config,
    request: &DownloadRequest,
    source: &Src,
    pipeline: &TranslationPipeline<T, S>,
    backend: &TranslationBackend,
    range: ChapterRange,
    pacer: &dyn Sleeper,
) -> Result<Option<PathBuf>>
where
    Src: ChapterSource,
    T: Transport,
    S: Sleeper,
{
    let links = source.chapter_links(&request.url);
    if links.is_empty() {
        warn!("未找到章节链接");
        return Ok(None);
    }
    let found = links.len();

    let (links, offset) = apply_range(links, range);
    if links.is_empty() {
        warn!("指定的章节范围无效（共 {} 章）", found);
        return Ok(None);
    }
    if range.is_unbounded() {
        info!("找到 {} 个章节，开始下载...", found);
    } else {
        info!(
            "根据指定范围，将下载第 {} 到第 {} 章",
            offset + 1,
            offset + links.len()
        );
    }

    let mut reporter = ProgressReporter::new(links.len(), "章节下载");
    let mut chapters: Vec<ProcessedChapter> = Vec::with_capacity(links.len());

    for (i, link) in links.iter().enumerate() {
        let number = offset + i + 1;
        info!("正在下载第 {} 章: {}", number, link.title);
        reporter.set_current(&link.title);

        match source.chapter(&link.url).filter(|p| !p.content.is_empty()) {
            Some(page) => {
                let chapter = pipeline.process_chapter(&page.title, &page.content, backend);
                reporter.record_chapter(&chapter.outcome);
                chapters.push(chapter);
                pacer.sleep(config.chapter_delay());
            }
            None => {
                warn!("无法下载章节: {}", link.title);
                reporter.record_failure();
            }
        }
    }

    let summary = reporter.finish();
    info!(
        "下载完成：成功 {} 章，失败 {} 章，翻译 {} 章，翻译失败保留原文 {} 章",
        summary.downloaded, summary.failed, summary.translated, summary.untranslated
    );

    if chapters.is_empty() {
        error!("没有成功下载任何章节");
        return Ok(None);
    }

    let output = match &request.output {
        Some(path) => path.clone(),
        None => {
            let novel_title = source.novel_title(&request.url);
            config
                .default_save_dir()
                .join(default_filename(novel_title.as_deref(), range))
        }
    };
    save_to_txt(&chapters, &output)?;
    Ok(Some(output))
}

#[cfg(test)]
pub(crate) mod tests {
    use std::collections::HashMap;
    use std::fs;
    use std::time::Duration;

    use super::*;
    use crate::base_system::retry::{RecordingSleeper, RetryPolicy};
    use crate::translate::backend::ApiEndpoints;
    use crate::translate::client::{TranslationClient, TranslatorSettings};
    use crate::translate::transport::ScriptedTransport;

    pub(crate) const CATALOG_URL: &str = "https://ncode.syosetu.com/n0001aa/";

    #[derive(Default)]
    pub(crate) struct FakeSource {
        pub(crate) title: Option<String>,
        pub(crate) links: Vec<ChapterLink>,
        pub(crate) pages: HashMap<String, ChapterPage>,
    }

    impl FakeSource {
        pub(crate) fn with_chapters(chapters: &[(&str, &str)]) -> Self {
            let mut source = FakeSource {
                title: Some("テスト小説".to_string()),
                ..Default::default()
            };
            for (i, (title, content)) in chapters.iter().enumerate() {
                let url = format!("{CATALOG_URL}{}/", i + 1);
                source.links.push(ChapterLink {
                    title: title.to_string(),
                    url: url.clone(),
                });
                if !content.is_empty() {
                    source.pages.insert(
                        url,
                        ChapterPage {
                            title: title.to_string(),
                            content: content.to_string(),
                        },
                    );
                }
            }
            source
        }
    }

    impl ChapterSource for FakeSource {
        fn novel_title(&self, _catalog_url: &str) -> Option<String> {
            self.title.clone()
        }

        fn chapter_links(&self, _catalog_url: &str) -> Vec<ChapterLink> {
            self.links.clone()
        }

        fn chapter(&self, chapter_url: &str) -> Option<ChapterPage> {
            self.pages.get(chapter_url).cloned()
        }
    }

    fn config_in(dir: &std::path::Path) -> Config {
        Config {
            save_path: dir.display().to_string(),
            ..Config::default()
        }
    }

    fn request(url: &str, range: Option<&str>) -> DownloadRequest {
        DownloadRequest {
            url: url.to_string(),
            output: None,
            range: range.map(str::to_string),
            model: "qwen-mt-plus".to_string(),
        }
    }

    fn disabled() -> TranslationPipeline<ScriptedTransport, RecordingSleeper> {
        TranslationPipeline::disabled()
    }

    #[test]
    fn catalog_download_skips_failed_chapters_and_paces_successes() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = config_in(dir.path());
        let source = FakeSource::with_chapters(&[("一", "本文一"), ("二", ""), ("三", "本文三")]);
        let pacer = RecordingSleeper::default();

        let path = download_with(&cfg, &request(CATALOG_URL, None), &source, &disabled(), &pacer)
            .unwrap()
            .unwrap();

        assert_eq!(path, dir.path().join("テスト小説.txt"));
        let written = fs::read_to_string(&path).unwrap();
        assert!(written.starts_with("一\n\n本文一\n"));
        assert!(written.ends_with("三\n\n本文三\n"));
        assert!(!written.contains("二\n\n"));
        assert_eq!(*pacer.slept.borrow(), vec![Duration::from_secs(2); 2]);
    }

    #[test]
    fn range_limits_chapters_and_names_file() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = config_in(dir.path());
        let source =
            FakeSource::with_chapters(&[("一", "文一"), ("二", "文二"), ("三", "文三"), ("四", "文四")]);
        let pacer = RecordingSleeper::default();

        let path =
            download_with(&cfg, &request(CATALOG_URL, Some("2-3")), &source, &disabled(), &pacer)
                .unwrap()
                .unwrap();

        assert_eq!(path, dir.path().join("テスト小説_第2到第3章.txt"));
        let written = fs::read_to_string(&path).unwrap();
        assert!(written.starts_with("二\n\n文二\n"));
        assert!(written.contains("三\n\n文三\n"));
        assert!(!written.contains("文一") && !written.contains("文四"));
    }

    #[test]
    fn out_of_range_or_empty_catalog_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = config_in(dir.path());
        let pacer = RecordingSleeper::default();

        let source = FakeSource::with_chapters(&[("一", "文一")]);
        let result =
            download_with(&cfg, &request(CATALOG_URL, Some("5-9")), &source, &disabled(), &pacer)
                .unwrap();
        assert!(result.is_none());

        let empty = FakeSource::default();
        let result =
            download_with(&cfg, &request(CATALOG_URL, None), &empty, &disabled(), &pacer).unwrap();
        assert!(result.is_none());
        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[test]
    fn single_chapter_url_is_translated_and_named_after_catalog() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = config_in(dir.path());
        let source = FakeSource::with_chapters(&[("第1話", "これはテストです")]);
        let transport = ScriptedTransport::new(vec![ScriptedTransport::ok(
            200,
            r#"{"choices":[{"message":{"content":"这是测试"}}]}"#,
        )]);
        let settings = TranslatorSettings {
            endpoints: ApiEndpoints::from_config(&cfg),
            timeout: Duration::from_secs(60),
            retry: RetryPolicy::fixed(3, Duration::ZERO),
            max_chars: 4000,
        };
        let pipeline = TranslationPipeline::new(TranslationClient::new(
            transport,
            RecordingSleeper::default(),
            settings,
        ));
        let pacer = RecordingSleeper::default();

        let url = format!("{CATALOG_URL}1/");
        let path = download_with(&cfg, &request(&url, None), &source, &pipeline, &pacer)
            .unwrap()
            .unwrap();

        assert_eq!(path, dir.path().join("テスト小説.txt"));
        assert_eq!(fs::read_to_string(&path).unwrap(), "第1話\n\n这是测试\n");
        assert!(pacer.slept.borrow().is_empty());
    }

    #[test]
    fn explicit_output_path_is_used_verbatim() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = config_in(dir.path());
        let source = FakeSource::with_chapters(&[("一", "这是中文")]);
        let pacer = RecordingSleeper::default();
        let out = dir.path().join("custom.txt");
        let mut req = request(CATALOG_URL, Some("bogus"));
        req.output = Some(out.clone());

        let path = download_with(&cfg, &req, &source, &disabled(), &pacer).unwrap().unwrap();
        assert_eq!(path, out);
        assert_eq!(fs::read_to_string(&out).unwrap(), "一\n\n这是中文\n");
    }
}
