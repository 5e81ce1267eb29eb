pub mod keyword_index;
pub mod toml_loader;

pub use keyword_index::KeywordIndex;
pub use toml_loader::{load_all_products, load_toml_to_product_file};
