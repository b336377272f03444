use std::{
    collections::HashSet,
    path::{Path, PathBuf},
    process::exit,
};

use acsb_core::testing::Language;
use anyhow::{bail, Context as _};
use dialoguer::{theme::ColorfulTheme, Select};

pub fn current_dir() -> PathBuf {
    std::env::current_dir().unwrap_or_else(|e| {
        eprintln!("Failed to get current dir: {}", e);
        exit(1);
    })
}

pub fn dedup<T>(mut v: Vec<T>) -> Vec<T>
where
    T: std::hash::Hash + Eq + Clone,
{
    let mut set = HashSet::new();
    v.retain(|x| set.insert(x.clone()));
    v
}

fn is_glob(s: &str) -> bool {
    s.contains(['*', '?', '['])
}

fn has_supported_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .and_then(Language::from_extension)
        .is_some()
}

/// Files directly under `dir` whose extension has a registered language, sorted.
pub fn source_candidates(dir: impl AsRef<Path>) -> anyhow::Result<Vec<PathBuf>> {
    let dir = dir.as_ref();
    let mut found = Vec::new();
    for entry in std::fs::read_dir(dir).with_context(|| format!("Cannot read dir {:?}", dir))? {
        let path = entry?.path();
        if path.is_file() && has_supported_extension(&path) {
            found.push(path);
        }
    }
    found.sort();
    Ok(found)
}

/// Expands `*` or `*.cpp` style patterns; other args are taken as-is.
pub fn expand_source_args(args: &[String]) -> anyhow::Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for arg in args {
        if !is_glob(arg) {
            files.push(PathBuf::from(arg));
            continue;
        }
        let mut matched: Vec<_> = glob::glob(arg)
            .with_context(|| format!("Invalid pattern '{}'", arg))?
            .filter_map(Result::ok)
            .filter(|path| path.is_file() && has_supported_extension(path))
            .collect();
        if matched.is_empty() {
            log::warn!("No source file matched '{}'", arg);
        }
        matched.sort();
        files.append(&mut matched);
    }
    Ok(dedup(files))
}

/// Returns the only item, or asks the user when there are several.
pub fn pick_one(prompt: &str, mut items: Vec<PathBuf>) -> anyhow::Result<PathBuf> {
    match items.len() {
        0 => bail!("Nothing to choose for: {}", prompt),
        1 => return Ok(items.remove(0)),
        _ => {}
    }
    let names: Vec<_> = items.iter().map(|p| p.to_string_lossy()).collect();
    let picked = Select::with_theme(&ColorfulTheme::default())
        .with_prompt(prompt)
        .items(&names)
        .default(0)
        .interact_opt()
        .context("Failed to read selection")?;
    match picked {
        Some(i) => Ok(items.swap_remove(i)),
        None => bail!("Cancelled"),
    }
}

/// Explicit args (with globs) if given, otherwise the sole candidate in `dir`
/// or the one picked interactively.
pub fn select_source_files(args: &[String], dir: impl AsRef<Path>) -> anyhow::Result<Vec<PathBuf>> {
    if !args.is_empty() {
        let files = expand_source_args(args)?;
        if files.is_empty() {
            bail!("No source file matched {:?}", args);
        }
        return Ok(files);
    }
    let candidates = self::source_candidates(&dir)?;
    if candidates.is_empty() {
        bail!(
            "No source file found in {:?}",
            dir.as_ref().to_string_lossy()
        );
    }
    Ok(vec![self::pick_one("Which file to test?", candidates)?])
}
