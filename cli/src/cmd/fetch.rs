use std::path::PathBuf;

use acsb_core::{action, print_success};

use super::{GlobalArgs, SubcmdResult};

#[derive(Debug, clap::Args)]
pub struct Args {
    /// e.g. https://atcoder.jp/contests/abc300/tasks/abc300_a
    #[arg()] // positional argument
    pub problem_url: String,

    /// Directory to save the page in
    #[arg(short, long, default_value = "./")]
    pub dir: PathBuf,
}

pub async fn exec(args: &Args, _: &GlobalArgs) -> SubcmdResult {
    let url = acsb_webclient::parse_url(&args.problem_url)?;

    let saved = action::fetch_problem_page(&url, &args.dir).await?;
    print_success!("Successfully saved {}", saved.to_string_lossy());
    Ok(())
}
