pub mod refine_ctx;
pub mod refine_flow;

pub use refine_ctx::{ProductCtx, RefinementSession};
pub use refine_flow::{Capabilities, RefinementOrchestrator};
