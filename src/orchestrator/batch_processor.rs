//! 批量产品处理器 - 编排层
//!
//! ## 职责
//!
//! 本模块是整个应用的入口，负责批量产品的处理和资源管理。
//!
//! ## 核心功能
//!
//! 1. **应用初始化**：选择生成后端、构建评分器和能力实现
//! 2. **批量加载**：扫描所有产品 TOML 文件，补全预先提取的关键词
//! 3. **并发控制**：使用 Semaphore 限制并发数量
//! 4. **分批处理**：每批完成后保存结果，再开始下一批
//! 5. **失败兜底**：生成失败的产品写入 warn.txt
//! 6. **全局统计**：成功 / 失败数量以及平均、最高、最低得分
//!
//! ## 设计特点
//!
//! - **顶层编排**：不处理单个产品的细节，委托 `RefinementOrchestrator`
//! - **唯一写者**：只有本模块写结果文件，流程层只读语料

use anyhow::{Context, Result};
use std::sync::Arc;
use tokio::sync::Semaphore;
use tracing::{error, info, warn};

use crate::config::{Config, LlmBackend};
use crate::error::ErrorResult;
use crate::models::{load_all_products, KeywordIndex, ProductContext, ResultRecord};
use crate::scoring::SeoScorer;
use crate::services::{
    CorpusSource, Copywriter, JsonResultStore, LlmService, OllamaService, PromptStrategy,
    TextCompletion, TfIdfKeywordExtractor, WarnWriter,
};
use crate::utils::logging::{
    log_batch_complete, log_batch_start, log_products_loaded, log_startup, print_final_stats,
};
use crate::workflow::{Capabilities, ProductCtx, RefinementOrchestrator};

/// 应用主结构
pub struct App {
    config: Config,
    orchestrator: Arc<RefinementOrchestrator>,
    store: JsonResultStore,
    warn_writer: WarnWriter,
}

impl App {
    /// 初始化应用
    pub async fn initialize(config: Config) -> Result<Self> {
        log_startup(&config);

        let backend: Arc<dyn TextCompletion> = match config.llm_backend {
            LlmBackend::OpenAi => {
                info!("🤖 使用 OpenAI 兼容接口，模型: {}", config.llm_model_name);
                Arc::new(LlmService::new(&config))
            }
            LlmBackend::Ollama => {
                info!("🤖 使用 Ollama，模型: {}", config.ollama_model_name);
                Arc::new(OllamaService::new(&config))
            }
        };

        let store = JsonResultStore::new(&config.results_file);

        // 用历史文案拟合 IDF，读不到就不拟合
        let history = match store.load_corpus().await {
            Ok(history) => history,
            Err(e) => {
                warn!("⚠️ 历史文案读取失败，关键词提取不使用 IDF: {}", e);
                Vec::new()
            }
        };
        let extractor = TfIdfKeywordExtractor::new(config.refinement.keyword_limit).fit(&history);

        let (min_words, max_words) = (
            config.scoring.ideal_min_words,
            config.scoring.ideal_max_words,
        );
        let primary = Arc::new(
            Copywriter::new(backend.clone(), PromptStrategy::FeatureFocused)
                .with_word_band(min_words, max_words),
        );
        let alternate = Arc::new(
            Copywriter::new(backend, PromptStrategy::AudienceFocused)
                .with_word_band(min_words, max_words),
        );

        let capabilities = Capabilities {
            primary: primary.clone(),
            alternate,
            improver: primary,
            extractor: Arc::new(extractor),
            corpus: Arc::new(store.clone()),
        };

        Self::with_capabilities(config, capabilities)
    }

    /// 使用给定的能力实现创建应用（结果仍写入配置中的文件）
    pub fn with_capabilities(config: Config, capabilities: Capabilities) -> Result<Self> {
        let scorer = SeoScorer::new(config.scoring.clone()).context("评分配置非法")?;
        let orchestrator =
            RefinementOrchestrator::new(scorer, capabilities, config.refinement.clone());

        Ok(Self {
            store: JsonResultStore::new(&config.results_file),
            warn_writer: WarnWriter::with_path(&config.warn_file),
            orchestrator: Arc::new(orchestrator),
            config,
        })
    }

    /// 运行应用主逻辑
    pub async fn run(&self) -> Result<RunStats> {
        let mut products = self.load_products().await?;

        if products.is_empty() {
            warn!("⚠️ 没有找到待处理的产品，程序结束");
            return Ok(RunStats::default());
        }

        self.attach_indexed_keywords(&mut products).await;

        log_products_loaded(products.len(), self.config.max_concurrent_products);

        let stats = self.process_all_products(products).await?;

        print_final_stats(
            stats.success,
            stats.failed,
            &stats.scores,
            &self.config.output_log_file,
        );

        Ok(stats)
    }

    /// 加载产品
    async fn load_products(&self) -> Result<Vec<ProductContext>> {
        info!("\n📁 正在扫描待处理的产品...");
        load_all_products(&self.config.product_folder).await
    }

    /// 没有提供关键词的产品，用预先提取的关键词索引补全
    async fn attach_indexed_keywords(&self, products: &mut [ProductContext]) {
        let index = match KeywordIndex::load(
            &self.config.keyword_index_file,
            self.config.refinement.keyword_limit,
        )
        .await
        {
            Ok(index) => index,
            Err(e) => {
                warn!("⚠️ {}，跳过关键词索引", e);
                return;
            }
        };
        if index.is_empty() {
            return;
        }
        info!("🔑 已加载关键词索引: {} 个产品", index.len());

        for product in products.iter_mut().filter(|p| p.keywords.is_empty()) {
            let keywords = index.lookup(&product.name);
            if !keywords.is_empty() {
                product.keywords = keywords;
            }
        }
    }

    /// 处理所有产品
    async fn process_all_products(&self, products: Vec<ProductContext>) -> Result<RunStats> {
        let batch_size = self.config.max_concurrent_products.max(1);
        let semaphore = Arc::new(Semaphore::new(batch_size));
        let total = products.len();
        let total_batches = total.div_ceil(batch_size);
        let mut stats = RunStats {
            total,
            ..Default::default()
        };

        for (batch_idx, batch) in products.chunks(batch_size).enumerate() {
            let batch_start = batch_idx * batch_size;
            let batch_num = batch_idx + 1;

            log_batch_start(
                batch_num,
                total_batches,
                batch_start + 1,
                batch_start + batch.len(),
                total,
            );

            let outcome = self
                .process_batch(batch, batch_start, semaphore.clone())
                .await?;

            // 每批结束后统一保存，避免并发写文件
            if !outcome.records.is_empty() {
                self.store
                    .save_records(&outcome.records)
                    .await
                    .context("保存结果失败")?;
            }
            for failure in &outcome.failures {
                if let Err(e) = self.warn_writer.write(failure) {
                    error!("写入 warn.txt 失败: {:#}", e);
                }
            }

            let batch_success = outcome.records.len();
            log_batch_complete(batch_num, batch_success, batch.len());

            stats.success += batch_success;
            stats.failed += batch.len() - batch_success;
            stats
                .scores
                .extend(outcome.records.iter().map(|r| r.seo_score));
        }

        Ok(stats)
    }

    /// 处理单个批次
    async fn process_batch(
        &self,
        batch: &[ProductContext],
        batch_start: usize,
        semaphore: Arc<Semaphore>,
    ) -> Result<BatchOutcome> {
        let mut handles = Vec::new();

        for (idx, product) in batch.iter().enumerate() {
            let product_index = batch_start + idx + 1;
            let permit = semaphore.clone().acquire_owned().await?;
            let orchestrator = self.orchestrator.clone();
            let product = product.clone();

            let handle = tokio::spawn(async move {
                let _permit = permit;
                let ctx = ProductCtx::new(product_index, product.name.clone());
                orchestrator.run(&product, &ctx).await
            });
            handles.push((product_index, handle));
        }

        let mut outcome = BatchOutcome::default();
        for (product_index, handle) in handles {
            match handle.await {
                Ok(Ok(record)) => outcome.records.push(record),
                Ok(Err(failure)) => {
                    error!("[产品 {}] ❌ {}", product_index, failure);
                    outcome.failures.push(failure);
                }
                Err(e) => {
                    error!("[产品 {}] 任务执行失败: {}", product_index, e);
                }
            }
        }

        Ok(outcome)
    }
}

/// 处理统计
#[derive(Debug, Default, Clone, PartialEq)]
pub struct RunStats {
    pub total: usize,
    pub success: usize,
    pub failed: usize,
    /// 成功产品的最终得分
    pub scores: Vec<f64>,
}

/// 批次处理结果
#[derive(Debug, Default)]
struct BatchOutcome {
    records: Vec<ResultRecord>,
    failures: Vec<ErrorResult>,
}
