//! 评分层
//!
//! - `seo_scorer` - 五维 SEO 评分
//! - `text_stats` - 分词 / 分句 / 音节

pub mod seo_scorer;
pub mod text_stats;

pub use seo_scorer::SeoScorer;

use crate::config::ScoringConfig;
use crate::error::ErrorResult;
use crate::models::{KeywordSet, ScoreBreakdown};

/// 独立评分入口，与生成 / 改写流程无关
///
/// 只有配置非法时才会返回错误结果。
pub fn score_only(
    config: &ScoringConfig,
    text: &str,
    keywords: &KeywordSet,
    corpus: &[String],
) -> Result<ScoreBreakdown, ErrorResult> {
    let scorer = SeoScorer::new(config.clone()).map_err(|e| ErrorResult::invalid_config(&e))?;
    Ok(scorer.score(text, keywords, corpus))
}
