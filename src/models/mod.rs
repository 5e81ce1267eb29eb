pub mod keywords;
pub mod loaders;
pub mod product;
pub mod record;
pub mod score;

pub use keywords::KeywordSet;
pub use loaders::{load_all_products, load_toml_to_product_file, KeywordIndex};
pub use product::{ProductContext, ProductFile};
pub use record::{RefinementSummary, ResultRecord, StopReason};
pub use score::{select_candidate, Candidate, CandidateVersion, ScoreBreakdown};
