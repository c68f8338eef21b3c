//! 日文网络小说下载器：抓取章节，按需翻译为中文后导出 txt。
//!
//! 代码结构（读代码入口）：
//! - `base_system`：配置/日志/重试等基础设施
//! - `network_parser`：站点页面抓取
//! - `book_parser`：页面解析与 txt 导出
//! - `translate`：语言判定、截断、单段翻译与批处理请求
//! - `download`：下载流程编排与批处理文件工具

use std::path::{Path, PathBuf};

use anyhow::{Result, anyhow};
use clap::{Parser, Subcommand};
use tracing::{info, warn};

mod base_system;
mod book_parser;
mod download;
mod network_parser;
mod translate;

use base_system::config::load_or_create;
use base_system::context::Config;
use base_system::logging::{LogOptions, LogSystem};
use download::batch_files::{create_sample_batch, generate_batch_requests, send_batch_request};
use download::downloader::run_download;
use download::models::DownloadRequest;

const VERSION: &str = env!("CARGO_PKG_VERSION");

#[derive(Debug, Parser)]
#[command(name = "novel-translate-downloader")]
#[command(about = "下载日文网络小说并翻译为中文")]
struct Cli {
    /// 启用调试日志输出
    #[arg(long, default_value_t = false, global = true)]
    debug: bool,

    /// 显示版本信息后退出
    #[arg(long, default_value_t = false)]
    version: bool,

    /// 数据目录路径（用于存放 config.yml 和 logs 等文件）
    #[arg(long, global = true)]
    data_dir: Option<String>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// 下载小说（目录页或单章页）
    Download {
        /// 小说目录页或章节页 URL
        url: String,
        /// 输出文件路径（默认按书名生成）
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// 章节范围，如 1-10、5-、-20
        #[arg(short, long)]
        range: Option<String>,
        /// 翻译模型（覆盖配置文件）
        #[arg(short, long)]
        model: Option<String>,
    },
    /// 从目录页生成批处理请求文件
    GenBatch {
        /// 小说目录页 URL
        url: String,
        #[arg(short, long, default_value = "batch_requests.json")]
        output: PathBuf,
    },
    /// 提交批处理请求文件
    SendBatch {
        batch_file: PathBuf,
        #[arg(short, long, default_value = "batch_response.json")]
        output: PathBuf,
        #[arg(short, long)]
        model: Option<String>,
    },
    /// 生成示例批处理请求文件
    SampleBatch {
        #[arg(short, long, default_value = "test_batch_requests.json")]
        output: PathBuf,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    if cli.version {
        println!("Novel Translate Downloader v{}", VERSION);
        return Ok(());
    }
    let Some(command) = cli.command else {
        return Err(anyhow!("缺少子命令，使用 --help 查看用法"));
    };

    let data_dir = cli.data_dir.as_deref().map(Path::new);
    let log = init_logging(cli.debug, data_dir)?;
    log.add_exit_hook(|| info!("程序退出"));

    let config = load_or_create::<Config>(data_dir).map_err(|e| anyhow!(e.to_string()))?;
    info!("当前版本: v{}", VERSION);

    match command {
        Command::Download {
            url,
            output,
            range,
            model,
        } => {
            let api_key = config.api_key();
            if api_key.is_none() {
                warn!("警告: 未设置{}环境变量，将不会进行翻译", config.api_key_env);
            }
            let request = DownloadRequest {
                url,
                output,
                range,
                model: model.unwrap_or_else(|| config.model.clone()),
            };
            info!("使用翻译模型: {}", request.model);
            if let Some(path) = run_download(&config, &request, api_key.as_deref())? {
                info!("完成: {}", path.display());
            }
        }
        Command::GenBatch { url, output } => {
            let count = generate_batch_requests(&config, &url, &output)?;
            info!("共生成 {} 个批处理请求", count);
        }
        Command::SendBatch {
            batch_file,
            output,
            model,
        } => {
            let model = model.unwrap_or_else(|| config.model.clone());
            send_batch_request(&config, &batch_file, &output, &model, config.api_key().as_deref())?;
        }
        Command::SampleBatch { output } => create_sample_batch(&output)?,
    }

    Ok(())
}

fn init_logging(debug: bool, base_dir: Option<&Path>) -> Result<LogSystem> {
    let opts = LogOptions {
        debug,
        use_color: true,
        archive_on_exit: true,
        console: true,
    };
    LogSystem::init_with_base(opts, base_dir).map_err(|e| anyhow!(e))
}
