use std::path::PathBuf;

use acsb_core::{action, config::Config, report};
use anyhow::{bail, ensure};

use super::{GlobalArgs, SubcmdResult};
use crate::util;

#[derive(Debug, clap::Args)]
pub struct Args {
    /// Source files or patterns like `*.cpp` (default: pick from the current dir)
    #[arg()] // positional arguments
    pub files: Vec<String>,

    /// Saved problem page (default: the `*.html` in the current dir)
    #[arg(short, long)]
    pub problem: Option<PathBuf>,

    /// Time limit per sample in milliseconds
    #[arg(short, long)]
    pub time_limit: Option<u64>,

    /// Print a plain-text report of failed samples
    #[arg(long)]
    pub report: bool,
}

pub async fn exec(args: &Args, _global_args: &GlobalArgs) -> SubcmdResult {
    let cur_dir = util::current_dir();
    let mut cfg = Config::load_or_default(&cur_dir)?;
    if let Some(ms) = args.time_limit {
        cfg.test.time_limit_ms = ms;
    }

    let problem_html = match &args.problem {
        Some(path) => path.clone(),
        None => {
            let pages = action::find_problem_html(&cur_dir)?;
            ensure!(
                !pages.is_empty(),
                "No problem page (*.html) in the current dir; run `acsb fetch <url>` first"
            );
            util::pick_one("Which problem page?", pages)?
        }
    };
    let testcases = action::load_testcases_from_html(&problem_html)?;
    ensure!(
        !testcases.is_empty(),
        "No samples found in {:?}",
        problem_html
    );

    let files = util::select_source_files(&args.files, &cur_dir)?;

    let mut num_failed = 0;
    for file in &files {
        let (info, results) = action::do_test(file, testcases.clone(), &cfg.test).await?;
        if !info.summary().is_accepted() {
            num_failed += 1;
        }
        if args.report && !info.summary().is_accepted() {
            println!("\n{}", report::failure_report(&info, &results));
        }
        println!();
    }

    if num_failed > 0 {
        bail!("{} of {} files did not pass", num_failed, files.len());
    }
    Ok(())
}
