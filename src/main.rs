use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use seo_refiner::config::Config;
use seo_refiner::models::KeywordSet;
use seo_refiner::orchestrator::App;
use seo_refiner::scoring::score_only;
use seo_refiner::services::{CorpusSource, JsonResultStore};
use seo_refiner::utils::logging::{init_log_file, init_logger};

#[derive(Parser)]
#[command(name = "seo_refiner")]
#[command(about = "生成、评分并迭代优化产品 SEO 文案", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// 批量处理产品文件夹中的所有产品（默认）
    Run,
    /// 只对一段现有文案评分，不调用任何生成后端
    Score {
        /// 待评分的文案文件
        #[arg(long)]
        text_file: PathBuf,
        /// 关键词，逗号分隔
        #[arg(long, value_delimiter = ',')]
        keywords: Vec<String>,
        /// 作为唯一性参照的结果文件（JSON）
        #[arg(long)]
        corpus: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // 加载配置
    let config = Config::from_env();

    match cli.command.unwrap_or(Command::Run) {
        Command::Run => run(config).await,
        Command::Score {
            text_file,
            keywords,
            corpus,
        } => score(config, text_file, keywords, corpus).await,
    }
}

async fn run(config: Config) -> Result<()> {
    init_log_file(&config.output_log_file)?;
    init_logger(config.verbose_logging, Some(&config.output_log_file))?;

    config.validate().context("配置校验失败")?;

    // 初始化并运行应用
    App::initialize(config).await?.run().await?;

    Ok(())
}

async fn score(
    config: Config,
    text_file: PathBuf,
    keywords: Vec<String>,
    corpus: Option<PathBuf>,
) -> Result<()> {
    init_logger(config.verbose_logging, None)?;

    let text = tokio::fs::read_to_string(&text_file)
        .await
        .with_context(|| format!("无法读取文案文件: {}", text_file.display()))?;
    let keywords: KeywordSet = keywords.iter().collect();
    let corpus = match corpus {
        Some(path) => JsonResultStore::new(path).load_corpus().await?,
        None => Vec::new(),
    };

    match score_only(&config.scoring, &text, &keywords, &corpus) {
        Ok(breakdown) => {
            println!("{}", serde_json::to_string_pretty(&breakdown)?);
            Ok(())
        }
        Err(failure) => {
            println!("{}", serde_json::to_string_pretty(&failure)?);
            Err(failure.into())
        }
    }
}
