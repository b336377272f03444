pub mod compiler;
pub mod error;
pub mod judge;
pub mod language;
pub mod result;
pub mod runner;
pub mod summary;
pub mod testcase;

pub use error::*;
pub use judge::*;
pub use language::*;
pub use result::*;
pub use runner::*;
pub use summary::*;
pub use testcase::*;
