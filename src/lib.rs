//! # SEO Refiner
//!
//! 一个为电商产品生成、评分并迭代优化 SEO 文案的 Rust 应用程序
//!
//! ## 架构设计
//!
//! 本系统采用分层架构：
//!
//! ### ① 评分层（Scoring）
//! - `scoring/` - 纯函数评分器，不做任何 I/O
//! - `SeoScorer` - 关键词 / 可读性 / 长度 / 结构 / 唯一性 五维评分
//!
//! ### ② 业务能力层（Services）
//! - `services/` - 描述"我能做什么"，只处理单个产品
//! - `LlmService` / `OllamaService` - 文本补全后端
//! - `Copywriter` - 两种提示词策略的生成 / 改写能力
//! - `TfIdfKeywordExtractor` - 关键词提取能力
//! - `JsonResultStore` - 结果保存 + 语料读取能力
//! - `WarnWriter` - 写 warn.txt 能力
//!
//! ### ③ 流程层（Workflow）
//! - `workflow/` - 定义"一个产品"的完整处理流程
//! - `ProductCtx` - 上下文封装（序号 + 产品名）
//! - `RefinementOrchestrator` - 关键词 → 语料 → 候选 A/B → 选择 → 迭代改写
//!
//! ### ④ 编排层（Orchestration）
//! - `orchestrator/batch_processor` - 批量产品处理器，管理并发、保存和统计
//!
//! ## 模块结构

pub mod config;
pub mod error;

pub mod models;
pub mod orchestrator;
pub mod scoring;
pub mod services;
pub mod utils;
pub mod workflow;

// 重新导出常用类型
pub use config::{Config, RefinementConfig, ScoringConfig};
pub use error::{ErrorResult, ErrorStatus};
pub use models::{KeywordSet, ProductContext, ResultRecord, ScoreBreakdown};
pub use orchestrator::{App, RunStats};
pub use scoring::{score_only, SeoScorer};
pub use workflow::{Capabilities, ProductCtx, RefinementOrchestrator};
