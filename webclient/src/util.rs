use reqwest::{Client, StatusCode};
use scraper::Selector;
use url::Url;

use crate::error::*;

pub fn parse_url(url: impl AsRef<str>) -> Result<Url> {
    match Url::parse(url.as_ref()) {
        Ok(url) => Ok(url),
        Err(e) => Err(Error::InvalidSyntaxUrl {
            url: url.as_ref().to_owned(),
            source: e,
        }),
    }
}

pub fn selector_must_parsed(sel: &'static str) -> Selector {
    Selector::parse(sel).expect("Failed to parse  `&'static str`  selector")
}

/// Single GET; anything but `200 OK` is an error.
pub async fn fetch_text(c: &Client, url: Url) -> Result<String> {
    let url_str = url.to_string();
    log::debug!("GET {}", url_str);
    let resp = c.get(url).send().await?;

    let status = resp.status();
    if status != StatusCode::OK {
        return Err(Error::UnexpectedResponseCode {
            got: status,
            expected: StatusCode::OK,
            requested_url: url_str,
        });
    }
    Ok(resp.text().await?)
}
