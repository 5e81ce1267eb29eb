pub mod capabilities;
pub mod copywriter;
pub mod keyword_extractor;
pub mod llm_service;
pub mod ollama_service;
pub mod result_store;
pub mod warn_writer;

pub use capabilities::{
    CorpusSource, DescriptionGenerator, DescriptionImprover, EmptyCorpus, KeywordExtractor,
    TextCompletion,
};
pub use copywriter::{Copywriter, PromptStrategy};
pub use keyword_extractor::TfIdfKeywordExtractor;
pub use llm_service::LlmService;
pub use ollama_service::OllamaService;
pub use result_store::JsonResultStore;
pub use warn_writer::WarnWriter;
