//! 批处理文件工具：从目录页生成请求文件、提交请求文件、生成示例文件。

use std::fs;
use std::path::Path;

use anyhow::{Context, Result, anyhow, bail};
use serde::Serialize;
use tracing::{info, warn};

use super::downloader::ChapterSource;
use crate::base_system::context::Config;
use crate::network_parser::network::{NovelWebConfig, NovelWebNetwork};
use crate::translate::backend::TranslationBackend;
use crate::translate::batch::{BatchOrchestrator, TranslationRequest, duplicate_ids};
use crate::translate::transport::Transport;

pub const DEFAULT_SOURCE_LANG: &str = "ja";

/// 抓取目录页全部章节并写出批处理请求文件，返回写入的请求数。
pub fn generate_batch_requests(config: &Config, catalog_url: &str, output: &Path) -> Result<usize> {
    let network = NovelWebNetwork::new(NovelWebConfig::from_config(config))
        .context("初始化网页客户端失败")?;
    let requests = collect_batch_requests(&network, catalog_url);
    if requests.is_empty() {
        bail!("未能生成任何批处理请求");
    }
    write_json_pretty(output, &requests)?;
    info!("批处理请求文件已生成: {}", output.display());
    Ok(requests.len())
}

/// id 按目录中的位置编号（`chapter_{n}`），内容为空的章节跳过但不重新编号。
pub(crate) fn collect_batch_requests<Src: ChapterSource>(
    source: &Src,
    catalog_url: &str,
) -> Vec<TranslationRequest> {
    let links = source.chapter_links(catalog_url);
    if links.is_empty() {
        warn!("未找到章节链接");
        return Vec::new();
    }
    info!("找到 {} 个章节", links.len());

    let mut requests = Vec::with_capacity(links.len());
    for (i, link) in links.iter().enumerate() {
        let number = i + 1;
        info!("正在处理第 {} 章: {}", number, link.title);
        match source.chapter(&link.url).filter(|p| !p.content.is_empty()) {
            Some(page) => requests.push(TranslationRequest::to_chinese(
                format!("chapter_{number}"),
                page.content,
                DEFAULT_SOURCE_LANG,
            )),
            None => warn!("第 {} 章内容为空，已跳过", number),
        }
    }
    requests
}

pub fn read_batch_file(path: &Path) -> Result<Vec<TranslationRequest>> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("读取批处理文件失败: {}", path.display()))?;
    serde_json::from_str(&raw).with_context(|| format!("批处理文件格式错误: {}", path.display()))
}

/// 提交请求文件，成功时把服务端响应写入 `output`。
pub fn send_batch_request(
    config: &Config,
    batch_file: &Path,
    output: &Path,
    model: &str,
    api_key: Option<&str>,
) -> Result<()> {
    let Some(api_key) = api_key else {
        bail!("未设置{}环境变量，无法发送批处理请求", config.api_key_env);
    };
    let orchestrator =
        BatchOrchestrator::from_config(config, api_key).context("初始化批处理客户端失败")?;
    send_with(&orchestrator, batch_file, output, model)
}

pub(crate) fn send_with<T: Transport>(
    orchestrator: &BatchOrchestrator<T>,
    batch_file: &Path,
    output: &Path,
    model: &str,
) -> Result<()> {
    let requests = read_batch_file(batch_file)?;
    info!("读取到 {} 个请求", requests.len());
    let dups = duplicate_ids(&requests);
    if !dups.is_empty() {
        warn!("批处理文件中存在重复 id: {}", dups.join(", "));
    }

    let backend = TranslationBackend::from_model(model);
    match orchestrator.submit_batch(&requests, &backend) {
        Ok(response) => {
            write_json_pretty(output, &response)?;
            info!("批处理请求成功，响应已保存到: {}", output.display());
            Ok(())
        }
        Err(failure) => Err(anyhow!(failure).context("批处理请求失败")),
    }
}

pub fn sample_requests() -> Vec<TranslationRequest> {
    vec![
        TranslationRequest::to_chinese(
            "test_chapter_1",
            "これはテスト用の日本語テキストです。翻訳機能をテストしています。",
            DEFAULT_SOURCE_LANG,
        ),
        TranslationRequest::to_chinese(
            "test_chapter_2",
            "もう一つのテストテキストです。バッチ処理の動作を確認しています。",
            DEFAULT_SOURCE_LANG,
        ),
    ]
}

pub fn create_sample_batch(output: &Path) -> Result<()> {
    write_json_pretty(output, &sample_requests())?;
    info!("示例批处理请求文件已生成: {}", output.display());
    Ok(())
}

/// 美化输出，非 ASCII 字符原样保留。
fn write_json_pretty<V: Serialize + ?Sized>(path: &Path, value: &V) -> Result<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent)
            .with_context(|| format!("创建目录失败: {}", parent.display()))?;
    }
    let text = serde_json::to_string_pretty(value)?;
    fs::write(path, text).with_context(|| format!("写入文件失败: {}", path.display()))
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use serde_json::json;

    use super::*;
    use crate::download::downloader::tests::{CATALOG_URL, FakeSource};
    use crate::translate::transport::ScriptedTransport;

    #[test]
    fn collects_requests_by_catalog_position() {
        let source = FakeSource::with_chapters(&[("一", "本文一"), ("二", ""), ("三", "本文三")]);
        let requests = collect_batch_requests(&source, CATALOG_URL);

        let ids: Vec<&str> = requests.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["chapter_1", "chapter_3"]);
        assert_eq!(requests[1].params.text, "本文三");
        assert_eq!(requests[1].params.source_lang, "ja");
        assert_eq!(requests[1].params.target_lang, "zh");
    }

    #[test]
    fn sample_file_keeps_japanese_unescaped() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("sample.json");
        create_sample_batch(&path).unwrap();

        let raw = fs::read_to_string(&path).unwrap();
        assert!(raw.contains("これはテスト用"));
        assert!(raw.contains("\"action\": \"TranslateToChinese\""));
        assert_eq!(read_batch_file(&path).unwrap(), sample_requests());
    }

    #[test]
    fn successful_batch_writes_response() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("in.json");
        let output = dir.path().join("out.json");
        create_sample_batch(&input).unwrap();

        let transport = ScriptedTransport::new(vec![ScriptedTransport::ok(
            200,
            r#"{"output":{"results":["测试一","测试二"]}}"#,
        )]);
        let orchestrator =
            BatchOrchestrator::new(transport, "https://example.test/batch", Duration::from_secs(300));

        send_with(&orchestrator, &input, &output, "qwen-mt-plus").unwrap();

        let written: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(&output).unwrap()).unwrap();
        assert_eq!(written, json!({"output": {"results": ["测试一", "测试二"]}}));
    }

    #[test]
    fn failed_batch_leaves_no_response_file() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("in.json");
        let output = dir.path().join("out.json");
        create_sample_batch(&input).unwrap();

        let transport = ScriptedTransport::new(vec![ScriptedTransport::ok(401, "unauthorized")]);
        let orchestrator =
            BatchOrchestrator::new(transport, "https://example.test/batch", Duration::from_secs(300));

        assert!(send_with(&orchestrator, &input, &output, "qwen-mt-plus").is_err());
        assert!(!output.exists());
    }

    #[test]
    fn missing_credential_refuses_to_send() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("in.json");
        create_sample_batch(&input).unwrap();
        let output = dir.path().join("out.json");

        let err = send_batch_request(&Config::default(), &input, &output, "qwen-mt-plus", None)
            .unwrap_err();
        assert!(err.to_string().contains("DASHSCOPE_API_KEY"));
    }
}
