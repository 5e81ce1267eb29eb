//! 外部能力接口
//!
//! 编排器只依赖这些 trait，具体实现（LLM、TF-IDF、JSON 文件）可替换。

use async_trait::async_trait;

use crate::error::{CorpusError, ExtractionError, GenerationError};
use crate::models::{KeywordSet, ProductContext, ScoreBreakdown};

/// 文本补全后端（OpenAI 兼容 / Ollama）
#[async_trait]
pub trait TextCompletion: Send + Sync {
    /// 后端名称，仅用于日志
    fn backend_name(&self) -> &str;

    async fn complete(
        &self,
        user_message: &str,
        system_message: Option<&str>,
    ) -> Result<String, GenerationError>;
}

/// 生成一份初始文案
#[async_trait]
pub trait DescriptionGenerator: Send + Sync {
    /// 策略名称，仅用于日志
    fn strategy_name(&self) -> &str;

    async fn generate(&self, product: &ProductContext) -> Result<String, GenerationError>;
}

/// 在现有文案基础上改写
///
/// `current_score` 是当前文案的评分，实现可以据此针对弱项改写。
#[async_trait]
pub trait DescriptionImprover: Send + Sync {
    async fn improve(
        &self,
        product: &ProductContext,
        text: &str,
        current_score: &ScoreBreakdown,
    ) -> Result<String, GenerationError>;
}

/// 从特征文本中提取关键词（尽力而为）
pub trait KeywordExtractor: Send + Sync {
    fn extract(&self, feature_text: &str) -> Result<KeywordSet, ExtractionError>;
}

/// 读取历史文案语料（尽力而为）
#[async_trait]
pub trait CorpusSource: Send + Sync {
    async fn load_corpus(&self) -> Result<Vec<String>, CorpusError>;
}

/// 没有语料库时使用
#[derive(Debug, Default, Clone, Copy)]
pub struct EmptyCorpus;

#[async_trait]
impl CorpusSource for EmptyCorpus {
    async fn load_corpus(&self) -> Result<Vec<String>, CorpusError> {
        Ok(Vec::new())
    }
}
