use std::io;

use acsb_core::{
    config::Config,
    testing::{Language, Toolchain},
};
use colored::Colorize as _;
use serde::Serialize;
use strum::IntoEnumIterator as _;

use super::{GlobalArgs, SubcmdResult};
use crate::util;

#[derive(Debug, clap::Args)]
pub struct Args {
    #[arg(short, long)]
    pub json: bool,
}

#[derive(Debug, Serialize)]
struct LangEntry {
    name: String,
    extension: &'static str,
    compile: Option<Vec<String>>,
    run: Vec<String>,
}

impl LangEntry {
    fn new(lang: Language, toolchain: &Toolchain) -> Self {
        Self {
            name: lang.to_string(),
            extension: lang.extension(),
            compile: toolchain.compile_template().map(|t| t.tokens().to_vec()),
            run: toolchain.run_template().tokens().to_vec(),
        }
    }
}

pub fn exec(args: &Args, _: &GlobalArgs) -> SubcmdResult {
    let cfg = Config::load_or_default(util::current_dir())?;

    let entries: Vec<_> = Language::iter()
        .map(|lang| (lang, cfg.test.toolchain_for(lang)))
        .collect();

    if args.json {
        let entries: Vec<_> = entries
            .iter()
            .map(|(lang, toolchain)| LangEntry::new(*lang, toolchain))
            .collect();
        serde_json::to_writer_pretty(io::stdout(), &entries)?;
        println!();
        return Ok(());
    }

    for (lang, toolchain) in entries {
        println!(
            "{} {}",
            format!("{:<11}", lang.to_string()).bold(),
            format!("*.{}", lang.extension()).dimmed()
        );
        if let Some(compile) = toolchain.compile_template() {
            println!("  compile: {}", compile);
        }
        println!("  run:     {}", toolchain.run_template());
    }
    Ok(())
}
