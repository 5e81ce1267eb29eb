//! 文案撰写服务 - 业务能力层
//!
//! 把"产品信息 + 策略"转成提示词，交给文本补全后端。
//! 两种策略对应编排器的两个候选槽位（A / B）。

use async_trait::async_trait;
use std::sync::Arc;
use tracing::debug;

use crate::error::GenerationError;
use crate::models::{ProductContext, ScoreBreakdown};
use crate::services::capabilities::{DescriptionGenerator, DescriptionImprover, TextCompletion};

const SYSTEM_MESSAGE: &str = "You are an experienced e-commerce copywriter. \
    You write unique, SEO-friendly product descriptions that read naturally. \
    Reply with the description only, without any additional text or explanations.";

/// 提示词策略
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PromptStrategy {
    /// 以产品特征为主线
    FeatureFocused,
    /// 以目标人群的使用场景为主线
    AudienceFocused,
}

impl PromptStrategy {
    pub fn name(self) -> &'static str {
        match self {
            PromptStrategy::FeatureFocused => "feature-focused",
            PromptStrategy::AudienceFocused => "audience-focused",
        }
    }

    fn angle(self) -> &'static str {
        match self {
            PromptStrategy::FeatureFocused => {
                "Lead with the most distinctive features \
                 and explain the concrete benefit of each one."
            }
            PromptStrategy::AudienceFocused => {
                "Open with the target audience's everyday situation, \
                 then show how the product fits into it."
            }
        }
    }
}

/// 文案撰写服务
pub struct Copywriter {
    backend: Arc<dyn TextCompletion>,
    strategy: PromptStrategy,
    min_words: usize,
    max_words: usize,
}

impl Copywriter {
    pub fn new(backend: Arc<dyn TextCompletion>, strategy: PromptStrategy) -> Self {
        Self {
            backend,
            strategy,
            min_words: 100,
            max_words: 150,
        }
    }

    /// 提示词中要求的字数区间，与评分器理想区间保持一致
    pub fn with_word_band(mut self, min_words: usize, max_words: usize) -> Self {
        self.min_words = min_words;
        self.max_words = max_words;
        self
    }

    fn product_block(product: &ProductContext) -> String {
        let audience = if product.target_audience.trim().is_empty() {
            "general shoppers"
        } else {
            product.target_audience.trim()
        };
        let keywords = if product.keywords.is_empty() {
            "(none)".to_string()
        } else {
            product.keywords.to_string()
        };
        format!(
            "Product Name: {}\nProduct Features: {}\nTarget Audience: {}\nKeywords to include: {}",
            product.name,
            product.feature_text(),
            audience,
            keywords
        )
    }

    fn build_generate_prompt(&self, product: &ProductContext) -> String {
        format!(
            r#"Generate a unique, SEO-friendly product description for the following product.
The description should be engaging, informative, and include the provided keywords naturally.
{}
Use two or three short paragraphs and a short bulleted list of key features.
Keep the description between {}-{} words.

{}"#,
            self.strategy.angle(),
            self.min_words,
            self.max_words,
            Self::product_block(product)
        )
    }

    fn build_improve_prompt(
        &self,
        product: &ProductContext,
        text: &str,
        current_score: &ScoreBreakdown,
    ) -> String {
        let (weakest, weakest_score) = current_score.weakest_dimension();
        format!(
            r#"Improve the product description below for SEO while keeping every factual claim.
Current SEO score: {:.1}/100. Weakest area: {} ({:.1}/100).
Scores by area: keyword {:.1}, readability {:.1}, length {:.1}, structure {:.1}, uniqueness {:.1}.
Use every keyword naturally, keep sentences plain, use short paragraphs with a bulleted list,
and keep the description between {}-{} words.

{}

Current description:
"""
{}
""""#,
            current_score.overall_score,
            weakest,
            weakest_score,
            current_score.keyword_score,
            current_score.readability_score,
            current_score.length_score,
            current_score.structure_score,
            current_score.uniqueness_score,
            self.min_words,
            self.max_words,
            Self::product_block(product),
            text
        )
    }
}

#[async_trait]
impl DescriptionGenerator for Copywriter {
    fn strategy_name(&self) -> &str {
        self.strategy.name()
    }

    async fn generate(&self, product: &ProductContext) -> Result<String, GenerationError> {
        debug!(
            "生成文案: 产品 {} | 策略 {} | 后端 {}",
            product.name,
            self.strategy.name(),
            self.backend.backend_name()
        );
        let prompt = self.build_generate_prompt(product);
        self.backend.complete(&prompt, Some(SYSTEM_MESSAGE)).await
    }
}

#[async_trait]
impl DescriptionImprover for Copywriter {
    async fn improve(
        &self,
        product: &ProductContext,
        text: &str,
        current_score: &ScoreBreakdown,
    ) -> Result<String, GenerationError> {
        debug!("改写文案: 产品 {} | 当前总分 {}", product.name, current_score.overall_score);
        let prompt = self.build_improve_prompt(product, text, current_score);
        self.backend.complete(&prompt, Some(SYSTEM_MESSAGE)).await
    }
}
