// exported modules
pub mod atcoder;
pub mod error;
pub mod model;

// re-exports
pub use atcoder::AtCoderClient;
pub use error::*;
pub use model::*;
pub use util::parse_url;

// internal modules
mod util;
