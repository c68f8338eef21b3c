//! 小说站点网页抓取。请求失败只记录日志并返回 `None`，由上层决定跳过。

use std::time::Duration;

use reqwest::blocking::Client;
use reqwest::header::{ACCEPT, ACCEPT_LANGUAGE, HeaderMap, HeaderValue, USER_AGENT};
use tracing::{debug, error, info};

use crate::base_system::context::Config;
use crate::book_parser::parser::{ChapterLink, ChapterPage, ContentParser};

#[derive(Debug, Clone)]
pub(crate) struct NovelWebConfig {
    pub request_timeout: Duration,
    pub user_agent: String,
}

impl NovelWebConfig {
    pub(crate) fn from_config(cfg: &Config) -> Self {
        Self {
            request_timeout: cfg.request_timeout(),
            user_agent: cfg.user_agent.clone(),
        }
    }
}

pub(crate) struct NovelWebNetwork {
    client: Client,
    config: NovelWebConfig,
}

impl NovelWebNetwork {
    pub(crate) fn new(config: NovelWebConfig) -> anyhow::Result<Self> {
        let client = Client::builder().timeout(config.request_timeout).build()?;
        Ok(Self { client, config })
    }

    fn get_headers(&self) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(
            ACCEPT,
            HeaderValue::from_static(
                "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8",
            ),
        );
        headers.insert(ACCEPT_LANGUAGE, HeaderValue::from_static("ja,zh;q=0.8,en;q=0.5"));
        headers.insert(
            USER_AGENT,
            HeaderValue::from_str(&self.config.user_agent)
                .unwrap_or(HeaderValue::from_static("Mozilla/5.0")),
        );
        headers
    }

    pub(crate) fn get_page(&self, url: &str) -> Option<String> {
        debug!("获取网页: {}", url);
        let resp = match self.client.get(url).headers(self.get_headers()).send() {
            Ok(r) => r,
            Err(e) => {
                error!("获取页面内容失败: {}", e);
                return None;
            }
        };
        let resp = match resp.error_for_status() {
            Ok(r) => r,
            Err(e) => {
                error!("获取页面内容失败: {}", e);
                return None;
            }
        };
        match resp.text() {
            Ok(text) => Some(text),
            Err(e) => {
                error!("读取页面内容失败: {}", e);
                None
            }
        }
    }

    pub(crate) fn fetch_novel_title(&self, catalog_url: &str) -> Option<String> {
        let html = self.get_page(catalog_url)?;
        ContentParser::parse_novel_title(&html)
    }

    pub(crate) fn fetch_chapter_links(&self, catalog_url: &str) -> Vec<ChapterLink> {
        let Some(html) = self.get_page(catalog_url) else {
            return Vec::new();
        };
        ContentParser::parse_chapter_links(&html, catalog_url)
    }

    pub(crate) fn fetch_chapter(&self, chapter_url: &str) -> Option<ChapterPage> {
        let html = self.get_page(chapter_url)?;
        let page = ContentParser::parse_chapter(&html);
        info!("提取到章节内容，长度: {} 字符", page.content.chars().count());
        Some(page)
    }
}
