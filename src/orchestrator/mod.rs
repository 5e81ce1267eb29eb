//! 编排层（Orchestration Layer）
//!
//! ## 职责
//!
//! 本层负责批量处理和流程调度，是整个系统的"指挥中心"。
//!
//! ### `batch_processor` - 批量产品处理器
//! - 管理应用生命周期（初始化、运行）
//! - 批量加载产品（Vec<ProductContext>）
//! - 控制并发数量（Semaphore）
//! - 唯一写结果文件和 warn.txt 的地方
//! - 输出全局统计信息
//!
//! ## 层次关系
//!
//! ```text
//! batch_processor (处理 Vec<ProductContext>)
//!     ↓
//! workflow::RefinementOrchestrator (处理单个产品)
//!     ↓
//! services (能力层：生成 / 改写 / 关键词 / 语料)  +  scoring (SeoScorer)
//! ```
//!
//! ## 设计原则
//!
//! 1. **向下依赖**：编排层 → workflow → services / scoring
//! 2. **无业务逻辑**：只做调度、保存和统计，不做评分或选择

pub mod batch_processor;

pub use batch_processor::{App, RunStats};
