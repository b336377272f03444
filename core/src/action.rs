use std::path::{Path, PathBuf};

use acsb_webclient::{atcoder, AtCoderClient, Url};

use crate::config::{Config, TestConfig};
use crate::error::*;
use crate::render;
use crate::testing::{self, Judge, LabeledTestCase, LabeledTestCaseResult, TestInformation};

pub fn init_config(dir: impl AsRef<Path>) -> Result<PathBuf> {
    let path = dir.as_ref().join(Config::FILENAME);
    ensure!(!path.exists(), "{:?} already exists", path);
    std::fs::write(&path, Config::example_toml())
        .with_context(|| format!("Failed to write {:?}", path))?;
    Ok(path)
}

/// Saved problem pages (`*.html`) directly under `dir`, sorted by name.
pub fn find_problem_html(dir: impl AsRef<Path>) -> Result<Vec<PathBuf>> {
    let dir = dir.as_ref();
    let mut found = Vec::new();
    for entry in std::fs::read_dir(dir).with_context(|| format!("Cannot read dir {:?}", dir))? {
        let path = entry?.path();
        if path.is_file() && path.extension().map_or(false, |e| e == "html") {
            found.push(path);
        }
    }
    found.sort();
    Ok(found)
}

pub fn load_testcases_from_html(path: impl AsRef<Path>) -> Result<Vec<LabeledTestCase>> {
    let path = path.as_ref();
    let html =
        std::fs::read_to_string(path).with_context(|| format!("Cannot read {:?}", path))?;
    let samples = atcoder::scrape_samples(&html);
    log::debug!("Scraped {} samples from {:?}", samples.len(), path);
    Ok(testing::label_samples(samples))
}

/// Downloads the problem page at `url` into `dir` as `<task id>.html`.
pub async fn fetch_problem_page(url: &Url, dir: impl AsRef<Path>) -> Result<PathBuf> {
    let cli = AtCoderClient::new().context("Failed to build HTTP client")?;
    ensure!(cli.is_problem_url(url), "Not an AtCoder problem url: {}", url);

    let page = cli
        .fetch_problem_page(url)
        .await
        .with_context(|| format!("Failed to fetch {}", url))?;
    if let Some(title) = &page.title {
        log::info!("Fetched '{}'", title);
    }

    let path = dir.as_ref().join(format!("{}.html", page.task_id));
    tokio::fs::write(&path, &page.html)
        .await
        .with_context(|| format!("Failed to save {:?}", path))?;
    Ok(path)
}

/// Judges `program_file` against `testcases`, printing results as they come.
pub async fn do_test(
    program_file: impl AsRef<Path>,
    testcases: Vec<LabeledTestCase>,
    cfg: &TestConfig,
) -> Result<(TestInformation, Vec<LabeledTestCaseResult>)> {
    let program_file = program_file.as_ref();
    ensure!(program_file.is_file(), "No such file: {:?}", program_file);

    let mut judge = Judge::with_config(program_file, testcases, cfg)
        .with_context(|| format!("Cannot test {:?}", program_file))?;
    let results = render::render_judge(&mut judge).await?;
    Ok((judge.info().clone(), results))
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::testing::ResultStatus;

    struct TempDir(PathBuf);

    impl TempDir {
        fn new(name: &str) -> Self {
            let path = std::env::temp_dir().join(format!("acsb-action-{}-{}", name, std::process::id()));
            let _ = std::fs::remove_dir_all(&path);
            std::fs::create_dir_all(&path).unwrap();
            Self(path)
        }
    }

    impl Drop for TempDir {
        fn drop(&mut self) {
            let _ = std::fs::remove_dir_all(&self.0);
        }
    }

    const PAGE: &str = r#"<div id="task-statement"><span class="lang-en">
        <div class="part"><section><h3>Sample Input 1</h3><pre>1 2</pre></section></div>
        <div class="part"><section><h3>Sample Output 1</h3><pre>3</pre></section></div>
        <div class="part"><section><h3>Sample Input 2</h3><pre>5 5</pre></section></div>
        <div class="part"><section><h3>Sample Output 2</h3><pre>10</pre></section></div>
    </span></div>"#;

    #[test]
    fn init_writes_example_once() {
        let dir = TempDir::new("init");
        let path = init_config(&dir.0).unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), Config::example_toml());
        assert!(init_config(&dir.0).is_err());
    }

    #[test]
    fn html_files_are_found_and_sorted() {
        let dir = TempDir::new("find");
        std::fs::write(dir.0.join("abc300_b.html"), "").unwrap();
        std::fs::write(dir.0.join("abc300_a.html"), "").unwrap();
        std::fs::write(dir.0.join("main.py"), "").unwrap();

        let found = find_problem_html(&dir.0).unwrap();
        assert_eq!(
            found,
            vec![dir.0.join("abc300_a.html"), dir.0.join("abc300_b.html")]
        );
    }

    #[test]
    fn testcases_are_labeled() {
        let dir = TempDir::new("load");
        let html = dir.0.join("abc300_a.html");
        std::fs::write(&html, PAGE).unwrap();

        let testcases = load_testcases_from_html(&html).unwrap();
        assert_eq!(
            testcases,
            vec![
                LabeledTestCase::new("Sample 1", "1 2\n", "3\n"),
                LabeledTestCase::new("Sample 2", "5 5\n", "10\n"),
            ]
        );
    }

    #[tokio::test]
    async fn test_with_configured_toolchain() {
        let dir = TempDir::new("do-test");
        let src = dir.0.join("main.rb");
        std::fs::write(&src, "read a b\necho $((a + b))\n").unwrap();
        let cfg = Config::from_toml(
            r##"
            [test]
            warmup = false
            [test.toolchain.rb]
            run = ["sh", "#{source}"]
            "##,
        )
        .unwrap();

        let testcases = load_testcases_from_html({
            let html = dir.0.join("p.html");
            std::fs::write(&html, PAGE).unwrap();
            html
        })
        .unwrap();
        let (info, results) = do_test(&src, testcases, &cfg.test).await.unwrap();
        assert_eq!(results.len(), 2);
        assert_eq!(info.summary(), ResultStatus::Accepted);
    }

    #[tokio::test]
    async fn missing_source_is_an_error() {
        let cfg = TestConfig::default();
        let testcases = vec![LabeledTestCase::new("Sample 1", "", "")];
        assert!(do_test("no-such-main.py", testcases, &cfg).await.is_err());
    }
}
