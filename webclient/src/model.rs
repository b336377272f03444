pub use reqwest::Url;

/// One "Sample Input N" / "Sample Output N" pair, `ord` starting from 1.
#[derive(Debug, PartialEq, Eq, Clone)]
pub struct SampleTestcase {
    pub ord: u32,
    pub input: String,
    pub output: String,
}

/// A downloaded problem statement page.
#[derive(Debug, PartialEq, Eq, Clone)]
pub struct ProblemPage {
    pub url: Url,
    /// e.g. `abc300_a`
    pub task_id: String,
    pub title: Option<String>,
    pub html: String,
}
