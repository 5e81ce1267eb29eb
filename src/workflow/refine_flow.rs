//! 文案优化流程 - 流程层
//!
//! 核心职责：定义"一个产品"的完整处理流程
//!
//! 流程顺序：
//! 1. 推导关键词（提供的 → 提取的 → 产品特征）
//! 2. 读取语料（失败则使用空语料）
//! 3. 并发生成候选 A / B → 评分 → 选择
//! 4. 迭代改写，直到轮数用完、提升不足或改写失败

use futures::future::join;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::config::RefinementConfig;
use crate::error::{ErrorResult, GenerationError};
use crate::models::{
    select_candidate, Candidate, KeywordSet, ProductContext, ResultRecord, StopReason,
};
use crate::scoring::SeoScorer;
use crate::services::{CorpusSource, DescriptionGenerator, DescriptionImprover, KeywordExtractor};
use crate::utils::logging::truncate_text;
use crate::workflow::refine_ctx::{ProductCtx, RefinementSession};

/// 流程依赖的外部能力
///
/// 两个生成槽位（primary / alternate）分别产出候选 A / B。
#[derive(Clone)]
pub struct Capabilities {
    pub primary: Arc<dyn DescriptionGenerator>,
    pub alternate: Arc<dyn DescriptionGenerator>,
    pub improver: Arc<dyn DescriptionImprover>,
    pub extractor: Arc<dyn KeywordExtractor>,
    pub corpus: Arc<dyn CorpusSource>,
}

/// 文案优化流程
///
/// - 编排单个产品的完整处理流程
/// - 决定何时生成、何时评分、何时停止改写
/// - 只依赖业务能力（services）和评分器
/// - 不写文件，结果由编排层统一保存
pub struct RefinementOrchestrator {
    scorer: SeoScorer,
    capabilities: Capabilities,
    config: RefinementConfig,
}

impl RefinementOrchestrator {
    pub fn new(scorer: SeoScorer, capabilities: Capabilities, config: RefinementConfig) -> Self {
        Self {
            scorer,
            capabilities,
            config,
        }
    }

    pub fn scorer(&self) -> &SeoScorer {
        &self.scorer
    }

    /// 处理单个产品
    pub async fn process(&self, product: &ProductContext) -> Result<ResultRecord, ErrorResult> {
        self.run(product, &ProductCtx::new(0, product.name.clone()))
            .await
    }

    /// 处理单个产品（带批量上下文，用于日志）
    ///
    /// 要么返回完整结果，要么返回 `GENERATION_FAILED`，没有部分结果。
    pub async fn run(
        &self,
        product: &ProductContext,
        ctx: &ProductCtx,
    ) -> Result<ResultRecord, ErrorResult> {
        // ========== 步骤 1: 关键词 ==========
        let keywords = self.derive_keywords(product, ctx);
        info!("{} 🔑 使用关键词: {}", ctx, keywords);

        // ========== 步骤 2: 语料 ==========
        let corpus = match self.capabilities.corpus.load_corpus().await {
            Ok(corpus) => corpus,
            Err(e) => {
                warn!("{} ⚠️ 语料库不可用，使用空语料: {}", ctx, e);
                Vec::new()
            }
        };
        debug!("{} 语料库共 {} 篇", ctx, corpus.len());

        // 生成时使用推导出的关键词
        let working = product.clone().with_keywords(keywords.clone());

        // ========== 步骤 3: 并发生成候选 A / B ==========
        info!("{} ✍️ 正在生成候选文案 A / B...", ctx);
        let (text_a, text_b) = join(
            self.generate_candidate(self.capabilities.primary.as_ref(), &working, "A"),
            self.generate_candidate(self.capabilities.alternate.as_ref(), &working, "B"),
        )
        .await;

        let text_a = text_a.map_err(|e| self.generation_failed(ctx, product, "A", &e))?;
        let text_b = text_b.map_err(|e| self.generation_failed(ctx, product, "B", &e))?;

        // ========== 步骤 4: 评分与选择 ==========
        let candidate_a = Candidate::new(
            text_a.clone(),
            self.scorer.score(&text_a, &keywords, &corpus),
        );
        let candidate_b = Candidate::new(
            text_b.clone(),
            self.scorer.score(&text_b, &keywords, &corpus),
        );

        let (selected_version, selected) = select_candidate(&candidate_a, &candidate_b);
        info!(
            "{} 📊 A: {:.2} | B: {:.2} → 选择 {}",
            ctx,
            candidate_a.overall(),
            candidate_b.overall(),
            selected_version
        );

        // ========== 步骤 5: 迭代改写 ==========
        let mut session = RefinementSession::new(selected.clone(), &self.config);
        let stop_reason = self
            .refine(&mut session, &working, &keywords, &corpus, ctx)
            .await;
        let (best, refinement) = session.finish(stop_reason);

        info!(
            "{} ✓ 完成: 最终得分 {:.2} (改写 {}/{} 轮被采纳, 结束原因: {:?})",
            ctx,
            best.overall(),
            refinement.rounds_accepted,
            refinement.rounds_attempted,
            refinement.stop_reason
        );

        Ok(ResultRecord {
            product_name: product.name.clone(),
            features: product.features.clone(),
            target_audience: product.target_audience.clone(),
            used_keywords: keywords,
            description_a: candidate_a.text,
            score_a: candidate_a.score.overall_score,
            detailed_scores_a: candidate_a.score,
            description_b: candidate_b.text,
            score_b: candidate_b.score.overall_score,
            detailed_scores_b: candidate_b.score,
            selected_version,
            generated_description: best.text,
            seo_score: best.score.overall_score,
            detailed_seo_scores: best.score,
            refinement,
            generated_at: chrono::Utc::now(),
        })
    }

    /// 关键词推导：提供的 → 提取的 → 前 N 个产品特征
    fn derive_keywords(&self, product: &ProductContext, ctx: &ProductCtx) -> KeywordSet {
        if !product.keywords.is_empty() {
            return product.keywords.clone();
        }

        match self.capabilities.extractor.extract(&product.feature_text()) {
            Ok(extracted) if !extracted.is_empty() => {
                return extracted.truncated(self.config.keyword_limit);
            }
            Ok(_) => debug!("{} 未提取到关键词，回退到产品特征", ctx),
            Err(e) => warn!("{} ⚠️ 关键词提取失败，回退到产品特征: {}", ctx, e),
        }

        product
            .features
            .iter()
            .take(self.config.keyword_limit)
            .collect()
    }

    /// 改写循环，返回结束原因
    async fn refine(
        &self,
        session: &mut RefinementSession,
        product: &ProductContext,
        keywords: &KeywordSet,
        corpus: &[String],
        ctx: &ProductCtx,
    ) -> StopReason {
        if session.is_disabled() {
            return StopReason::Disabled;
        }

        loop {
            if !session.has_budget() {
                return StopReason::BudgetExhausted;
            }
            let round = session.start_round();

            let improved = self
                .with_timeout(
                    "improve",
                    self.capabilities
                        .improver
                        .improve(product, &session.best().text, &session.best().score),
                )
                .await;

            let text = match improved {
                Ok(text) => text,
                Err(e) => {
                    warn!("{} ⚠️ 第 {} 轮改写失败，保留当前最优: {}", ctx, round, e);
                    return StopReason::ImproveFailed;
                }
            };

            let score = self.scorer.score(&text, keywords, corpus);
            let previous = session.best().overall();
            if session.offer(Candidate::new(text, score)) {
                info!(
                    "{} 🔁 第 {} 轮改写被采纳: {:.2} → {:.2}",
                    ctx, round, previous, score.overall_score
                );
            } else {
                info!(
                    "{} 第 {} 轮提升不足 ({:.2} → {:.2})，停止改写",
                    ctx, round, previous, score.overall_score
                );
                return StopReason::Plateau;
            }
        }
    }

    /// 生成一份候选文案，空白文本视为失败
    async fn generate_candidate(
        &self,
        generator: &dyn DescriptionGenerator,
        product: &ProductContext,
        slot: &str,
    ) -> Result<String, GenerationError> {
        debug!("候选 {} 使用策略: {}", slot, generator.strategy_name());
        let text = self
            .with_timeout("generate", generator.generate(product))
            .await?;
        debug!("候选 {}: {}", slot, truncate_text(&text, 80));
        Ok(text)
    }

    /// 给单次外部调用加超时，并把空白结果转换为错误
    async fn with_timeout<F>(&self, stage: &str, call: F) -> Result<String, GenerationError>
    where
        F: Future<Output = Result<String, GenerationError>>,
    {
        let limit = Duration::from_secs(self.config.generation_timeout_secs);
        let text = match tokio::time::timeout(limit, call).await {
            Ok(result) => result?,
            Err(_) => {
                return Err(GenerationError::Timeout {
                    stage: stage.to_string(),
                    timeout_secs: self.config.generation_timeout_secs,
                })
            }
        };

        let text = text.trim().to_string();
        if text.is_empty() {
            return Err(GenerationError::BlankOutput {
                stage: stage.to_string(),
            });
        }
        Ok(text)
    }

    fn generation_failed(
        &self,
        ctx: &ProductCtx,
        product: &ProductContext,
        slot: &str,
        err: &GenerationError,
    ) -> ErrorResult {
        warn!("{} ❌ 候选 {} 生成失败: {}", ctx, slot, err);
        ErrorResult::generation_failed(product.name.clone(), err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{CorpusError, ErrorStatus, ExtractionError};
    use crate::models::{CandidateVersion, ScoreBreakdown};
    use crate::services::EmptyCorpus;
    use async_trait::async_trait;
    use std::collections::VecDeque;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    /// "The lamp is bright." 重复 n 次：每多一次重复，长度分 +4，其余分项不变
    fn repeated(n: usize) -> String {
        vec!["The lamp is bright."; n].join(" ")
    }

    enum Reply {
        Text(String),
        Fail,
        Hang,
    }

    struct MockGenerator {
        reply: Reply,
        calls: AtomicUsize,
    }

    impl MockGenerator {
        fn text(text: impl Into<String>) -> Arc<Self> {
            Arc::new(Self {
                reply: Reply::Text(text.into()),
                calls: AtomicUsize::new(0),
            })
        }

        fn failing() -> Arc<Self> {
            Arc::new(Self {
                reply: Reply::Fail,
                calls: AtomicUsize::new(0),
            })
        }

        fn hanging() -> Arc<Self> {
            Arc::new(Self {
                reply: Reply::Hang,
                calls: AtomicUsize::new(0),
            })
        }
    }

    #[async_trait]
    impl DescriptionGenerator for MockGenerator {
        fn strategy_name(&self) -> &str {
            "mock"
        }

        async fn generate(&self, _product: &ProductContext) -> Result<String, GenerationError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            match &self.reply {
                Reply::Text(text) => Ok(text.clone()),
                Reply::Fail => Err(GenerationError::EmptyContent {
                    model: "mock".to_string(),
                }),
                Reply::Hang => {
                    tokio::time::sleep(Duration::from_secs(30)).await;
                    Ok(repeated(1))
                }
            }
        }
    }

    /// 按顺序返回预设结果，用完后一直返回最后一个
    struct ScriptedImprover {
        replies: Mutex<VecDeque<Option<String>>>,
        calls: AtomicUsize,
        seen_keywords: Mutex<Vec<KeywordSet>>,
    }

    impl ScriptedImprover {
        fn new(replies: Vec<Option<String>>) -> Arc<Self> {
            Arc::new(Self {
                replies: Mutex::new(replies.into()),
                calls: AtomicUsize::new(0),
                seen_keywords: Mutex::new(Vec::new()),
            })
        }
    }

    #[async_trait]
    impl DescriptionImprover for ScriptedImprover {
        async fn improve(
            &self,
            product: &ProductContext,
            text: &str,
            _current_score: &ScoreBreakdown,
        ) -> Result<String, GenerationError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.seen_keywords.lock().unwrap().push(product.keywords.clone());
            let mut replies = self.replies.lock().unwrap();
            let reply = if replies.len() > 1 {
                replies.pop_front().flatten()
            } else {
                replies.front().cloned().flatten()
            };
            match reply {
                Some(improved) => Ok(improved),
                None => Err(GenerationError::api_failed(
                    "mock",
                    "mock",
                    std::io::Error::other(format!("cannot improve: {}", text.len())),
                )),
            }
        }
    }

    struct FixedExtractor(Result<Vec<&'static str>, ()>);

    impl KeywordExtractor for FixedExtractor {
        fn extract(&self, _feature_text: &str) -> Result<KeywordSet, ExtractionError> {
            match &self.0 {
                Ok(words) => Ok(words.iter().collect()),
                Err(()) => Err(ExtractionError::NoUsableTerms),
            }
        }
    }

    struct BrokenCorpus;

    #[async_trait]
    impl CorpusSource for BrokenCorpus {
        async fn load_corpus(&self) -> Result<Vec<String>, CorpusError> {
            Err(CorpusError::Unavailable {
                path: "corpus.json".to_string(),
                source: Box::new(std::io::Error::other("disk gone")),
            })
        }
    }

    struct Fixture {
        primary: Arc<MockGenerator>,
        alternate: Arc<MockGenerator>,
        improver: Arc<ScriptedImprover>,
        extractor: Arc<dyn KeywordExtractor>,
        corpus: Arc<dyn CorpusSource>,
        config: RefinementConfig,
    }

    impl Fixture {
        fn new(
            a: Arc<MockGenerator>,
            b: Arc<MockGenerator>,
            improver: Arc<ScriptedImprover>,
        ) -> Self {
            Self {
                primary: a,
                alternate: b,
                improver,
                extractor: Arc::new(FixedExtractor(Err(()))),
                corpus: Arc::new(EmptyCorpus),
                config: RefinementConfig {
                    generation_timeout_secs: 1,
                    ..Default::default()
                },
            }
        }

        fn orchestrator(&self) -> RefinementOrchestrator {
            RefinementOrchestrator::new(
                SeoScorer::default(),
                Capabilities {
                    primary: self.primary.clone(),
                    alternate: self.alternate.clone(),
                    improver: self.improver.clone(),
                    extractor: self.extractor.clone(),
                    corpus: self.corpus.clone(),
                },
                self.config.clone(),
            )
        }
    }

    fn lamp() -> ProductContext {
        ProductContext::new("Aurora Lamp")
            .with_features(["dimmable LED", "USB port"])
            .with_keywords(["lamp"].into_iter().collect())
    }

    #[tokio::test]
    async fn higher_scoring_candidate_is_selected() {
        let fixture = Fixture::new(
            MockGenerator::text(repeated(3)),
            MockGenerator::text(repeated(5)),
            ScriptedImprover::new(vec![None]),
        );

        let record = fixture.orchestrator().process(&lamp()).await.unwrap();

        assert!(record.score_b > record.score_a);
        assert_eq!(record.selected_version, CandidateVersion::B);
        assert_eq!(record.description_b, repeated(5));
        assert_eq!(record.generated_description, repeated(5));
        assert_eq!(record.seo_score, record.score_b);
    }

    #[tokio::test]
    async fn tie_selects_candidate_a() {
        let fixture = Fixture::new(
            MockGenerator::text(repeated(4)),
            MockGenerator::text(repeated(4)),
            ScriptedImprover::new(vec![None]),
        );

        let record = fixture.orchestrator().process(&lamp()).await.unwrap();

        assert_eq!(record.score_a, record.score_b);
        assert_eq!(record.selected_version, CandidateVersion::A);
    }

    #[tokio::test]
    async fn loop_stops_when_budget_is_exhausted() {
        let fixture = Fixture::new(
            MockGenerator::text(repeated(5)),
            MockGenerator::text(repeated(3)),
            ScriptedImprover::new(vec![
                Some(repeated(7)),
                Some(repeated(9)),
                Some(repeated(11)),
                Some(repeated(13)),
            ]),
        );

        let record = fixture.orchestrator().process(&lamp()).await.unwrap();

        assert_eq!(fixture.improver.calls.load(Ordering::SeqCst), 3);
        assert_eq!(record.refinement.rounds_attempted, 3);
        assert_eq!(record.refinement.rounds_accepted, 3);
        assert_eq!(record.refinement.stop_reason, StopReason::BudgetExhausted);
        assert_eq!(record.generated_description, repeated(11));
        assert!(record.seo_score > record.score_a);
    }

    #[tokio::test]
    async fn loop_stops_early_on_plateau() {
        let fixture = Fixture::new(
            MockGenerator::text(repeated(5)),
            MockGenerator::text(repeated(3)),
            ScriptedImprover::new(vec![Some(repeated(5))]),
        );

        let record = fixture.orchestrator().process(&lamp()).await.unwrap();

        assert_eq!(fixture.improver.calls.load(Ordering::SeqCst), 1);
        assert_eq!(record.refinement.rounds_accepted, 0);
        assert_eq!(record.refinement.stop_reason, StopReason::Plateau);
        assert_eq!(record.seo_score, record.score_a);
    }

    #[tokio::test]
    async fn improve_failure_keeps_best_so_far() {
        let fixture = Fixture::new(
            MockGenerator::text(repeated(5)),
            MockGenerator::text(repeated(3)),
            ScriptedImprover::new(vec![Some(repeated(7)), None]),
        );

        let record = fixture.orchestrator().process(&lamp()).await.unwrap();

        assert_eq!(fixture.improver.calls.load(Ordering::SeqCst), 2);
        assert_eq!(record.refinement.rounds_attempted, 2);
        assert_eq!(record.refinement.rounds_accepted, 1);
        assert_eq!(record.refinement.stop_reason, StopReason::ImproveFailed);
        assert_eq!(record.generated_description, repeated(7));
    }

    #[tokio::test]
    async fn zero_iterations_disables_the_loop() {
        let mut fixture = Fixture::new(
            MockGenerator::text(repeated(5)),
            MockGenerator::text(repeated(3)),
            ScriptedImprover::new(vec![Some(repeated(9))]),
        );
        fixture.config.max_iterations = 0;

        let record = fixture.orchestrator().process(&lamp()).await.unwrap();

        assert_eq!(fixture.improver.calls.load(Ordering::SeqCst), 0);
        assert_eq!(record.refinement.stop_reason, StopReason::Disabled);
        assert_eq!(record.generated_description, repeated(5));
    }

    #[tokio::test]
    async fn primary_failure_never_calls_improve() {
        let fixture = Fixture::new(
            MockGenerator::failing(),
            MockGenerator::text(repeated(5)),
            ScriptedImprover::new(vec![Some(repeated(9))]),
        );

        let err = fixture.orchestrator().process(&lamp()).await.unwrap_err();

        assert_eq!(err.status, ErrorStatus::GenerationFailed);
        assert_eq!(err.product_name, "Aurora Lamp");
        assert_eq!(fixture.improver.calls.load(Ordering::SeqCst), 0);
        assert_eq!(fixture.alternate.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn blank_candidate_is_a_generation_failure() {
        let fixture = Fixture::new(
            MockGenerator::text(repeated(5)),
            MockGenerator::text("   \n "),
            ScriptedImprover::new(vec![Some(repeated(9))]),
        );

        let err = fixture.orchestrator().process(&lamp()).await.unwrap_err();

        assert_eq!(err.status, ErrorStatus::GenerationFailed);
        assert!(err.message.contains("generate 返回空白文本"));
        assert!(!err.message.contains("模型"));
        assert_eq!(fixture.improver.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn slow_generation_times_out() {
        let fixture = Fixture::new(
            MockGenerator::hanging(),
            MockGenerator::text(repeated(5)),
            ScriptedImprover::new(vec![Some(repeated(9))]),
        );

        let err = fixture.orchestrator().process(&lamp()).await.unwrap_err();

        assert_eq!(err.status, ErrorStatus::GenerationFailed);
        assert!(err.message.contains("generate"));
    }

    #[tokio::test]
    async fn keywords_fall_back_to_features() {
        let fixture = Fixture::new(
            MockGenerator::text(repeated(5)),
            MockGenerator::text(repeated(3)),
            ScriptedImprover::new(vec![Some(repeated(5))]),
        );
        let product = ProductContext::new("Aurora Lamp").with_features([
            "one", "two", "three", "four", "five", "six",
        ]);

        let record = fixture.orchestrator().process(&product).await.unwrap();

        assert_eq!(record.used_keywords.as_slice(), ["one", "two", "three", "four", "five"]);
        // 改写时同样使用推导出的关键词
        assert_eq!(fixture.improver.seen_keywords.lock().unwrap()[0], record.used_keywords);
    }

    #[tokio::test]
    async fn extracted_keywords_are_used_when_none_supplied() {
        let mut fixture = Fixture::new(
            MockGenerator::text(repeated(5)),
            MockGenerator::text(repeated(3)),
            ScriptedImprover::new(vec![Some(repeated(5))]),
        );
        fixture.extractor = Arc::new(FixedExtractor(Ok(vec!["led lamp", "usb"])));
        let product = ProductContext::new("Aurora Lamp").with_features(["LED lamp", "USB"]);

        let record = fixture.orchestrator().process(&product).await.unwrap();

        assert_eq!(record.used_keywords.as_slice(), ["led lamp", "usb"]);
    }

    #[tokio::test]
    async fn empty_product_still_produces_a_record() {
        let fixture = Fixture::new(
            MockGenerator::text(repeated(5)),
            MockGenerator::text(repeated(3)),
            ScriptedImprover::new(vec![Some(repeated(5))]),
        );

        let record = fixture
            .orchestrator()
            .process(&ProductContext::new(""))
            .await
            .unwrap();

        assert!(record.used_keywords.is_empty());
        assert_eq!(record.detailed_seo_scores.keyword_score, 0.0);
    }

    #[tokio::test]
    async fn corpus_failure_is_absorbed() {
        let mut fixture = Fixture::new(
            MockGenerator::text(repeated(5)),
            MockGenerator::text(repeated(3)),
            ScriptedImprover::new(vec![Some(repeated(5))]),
        );
        fixture.corpus = Arc::new(BrokenCorpus);

        let record = fixture.orchestrator().process(&lamp()).await.unwrap();

        assert_eq!(record.detailed_scores_a.uniqueness_score, 100.0);
    }
}
