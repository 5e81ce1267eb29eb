use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::keywords::KeywordSet;
use crate::models::score::{CandidateVersion, ScoreBreakdown};

/// 改写循环结束原因
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StopReason {
    /// 未配置改写轮数
    Disabled,
    /// 用完了轮数预算
    BudgetExhausted,
    /// 某一轮提升不足阈值
    Plateau,
    /// 改写调用失败，保留当前最优
    ImproveFailed,
}

/// 改写过程摘要
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RefinementSummary {
    pub rounds_attempted: usize,
    pub rounds_accepted: usize,
    pub stop_reason: StopReason,
    /// 每一轮改写后的总分（无论是否被采纳）
    #[serde(default)]
    pub round_scores: Vec<f64>,
}

/// 最终结果记录，构造后不可变
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResultRecord {
    pub product_name: String,
    pub features: Vec<String>,
    pub target_audience: String,
    pub used_keywords: KeywordSet,
    #[serde(rename = "description_A")]
    pub description_a: String,
    #[serde(rename = "score_A")]
    pub score_a: f64,
    #[serde(rename = "detailed_scores_A")]
    pub detailed_scores_a: ScoreBreakdown,
    #[serde(rename = "description_B")]
    pub description_b: String,
    #[serde(rename = "score_B")]
    pub score_b: f64,
    #[serde(rename = "detailed_scores_B")]
    pub detailed_scores_b: ScoreBreakdown,
    pub selected_version: CandidateVersion,
    pub generated_description: String,
    pub seo_score: f64,
    pub detailed_seo_scores: ScoreBreakdown,
    pub refinement: RefinementSummary,
    pub generated_at: DateTime<Utc>,
}
