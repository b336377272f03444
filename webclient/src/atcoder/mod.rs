pub mod client;
pub mod urls;
mod helper;

pub use client::*;
pub use helper::{repair_html, scrape_samples, scrape_title};
pub use urls::*;
