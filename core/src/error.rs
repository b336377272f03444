#[allow(unused_imports)]
pub(crate) use anyhow::{anyhow, bail, ensure, Context as _};
pub use anyhow::{Error, Result};
