//! 产品处理上下文
//!
//! 封装"我正在处理第几个产品"以及单个产品的改写会话状态

use std::fmt::Display;

use crate::config::RefinementConfig;
use crate::models::{Candidate, RefinementSummary, StopReason};

/// 比较分数时的浮点容差，分数本身保留两位小数
const SCORE_EPSILON: f64 = 1e-9;

/// 产品处理上下文（仅用于日志）
#[derive(Debug, Clone)]
pub struct ProductCtx {
    /// 产品在本次批量中的序号（从 1 开始，0 表示单独处理）
    pub product_index: usize,

    pub product_name: String,
}

impl ProductCtx {
    pub fn new(product_index: usize, product_name: impl Into<String>) -> Self {
        Self {
            product_index,
            product_name: product_name.into(),
        }
    }
}

impl Display for ProductCtx {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.product_index == 0 {
            write!(f, "[产品: {}]", self.product_name)
        } else {
            write!(f, "[产品 {}: {}]", self.product_index, self.product_name)
        }
    }
}

/// 单个产品的改写会话
///
/// 持有当前最优候选，最优分数只增不减。
#[derive(Debug)]
pub struct RefinementSession {
    best: Candidate,
    max_iterations: usize,
    min_improvement: f64,
    rounds_attempted: usize,
    rounds_accepted: usize,
    round_scores: Vec<f64>,
}

impl RefinementSession {
    pub fn new(initial: Candidate, config: &RefinementConfig) -> Self {
        Self {
            best: initial,
            max_iterations: config.max_iterations,
            min_improvement: config.min_improvement,
            rounds_attempted: 0,
            rounds_accepted: 0,
            round_scores: Vec::new(),
        }
    }

    pub fn best(&self) -> &Candidate {
        &self.best
    }

    pub fn is_disabled(&self) -> bool {
        self.max_iterations == 0
    }

    pub fn has_budget(&self) -> bool {
        self.rounds_attempted < self.max_iterations
    }

    /// 开始新一轮，返回轮次编号（从 1 开始）
    pub fn start_round(&mut self) -> usize {
        self.rounds_attempted += 1;
        self.rounds_attempted
    }

    /// 提交本轮改写结果，提升达到阈值则替换当前最优
    ///
    /// 分数下降的候选永远不会被接受，与阈值配置无关。
    pub fn offer(&mut self, candidate: Candidate) -> bool {
        self.round_scores.push(candidate.overall());
        let gain = candidate.overall() - self.best.overall();
        if gain >= 0.0 && gain + SCORE_EPSILON >= self.min_improvement {
            self.best = candidate;
            self.rounds_accepted += 1;
            true
        } else {
            false
        }
    }

    pub fn finish(self, stop_reason: StopReason) -> (Candidate, RefinementSummary) {
        let summary = RefinementSummary {
            rounds_attempted: self.rounds_attempted,
            rounds_accepted: self.rounds_accepted,
            stop_reason,
            round_scores: self.round_scores,
        };
        (self.best, summary)
    }
}
