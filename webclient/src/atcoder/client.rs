use std::time::Duration;

use crate::{error::*, model::*, util};

use super::{helper, urls};

const USER_AGENT: &str = concat!("acsb/", env!("CARGO_PKG_VERSION"));

pub struct AtCoderClient {
    http: reqwest::Client,
}

impl AtCoderClient {
    pub fn new() -> Result<Self> {
        let http = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .gzip(true)
            .timeout(Duration::from_secs(30))
            .build()?;
        Ok(Self { http })
    }

    pub fn is_problem_url(&self, url: &Url) -> bool {
        urls::is_problem_url(url)
    }

    pub fn extract_task_id(&self, url: &Url) -> Result<String> {
        urls::extract_task_id(url)
    }

    /// Downloads a problem page once (no retries) with its image links made absolute.
    pub async fn fetch_problem_page(&self, url: &Url) -> Result<ProblemPage> {
        let task_id = urls::extract_task_id(url)?;
        let html = util::fetch_text(&self.http, url.clone()).await?;
        let html = helper::repair_html(&html);
        Ok(ProblemPage {
            url: url.to_owned(),
            task_id,
            title: helper::scrape_title(&html),
            html,
        })
    }
}
