use ::lazy_regex::{lazy_regex, Lazy, Regex};

use crate::{error::*, Url};

pub(super) static RE_PROBLEM_URL_PATH: Lazy<Regex> =
    lazy_regex!(r"^/contests/([0-9A-Za-z_-]+)/tasks/(([0-9A-Za-z_-]+)_([[:alnum:]]+))/?$");

pub const DOMAIN: &str = "atcoder.jp";

pub fn is_atcoder(url: &Url) -> bool {
    url.scheme() == "https" && url.domain() == Some(DOMAIN)
}

pub fn is_problem_url(url: &Url) -> bool {
    is_atcoder(url) && RE_PROBLEM_URL_PATH.is_match(url.path())
}

/// `https://atcoder.jp/contests/abc300/tasks/abc300_a` => `abc300_a`
pub fn extract_task_id(url: &Url) -> Result<String> {
    if !is_atcoder(url) {
        return Err(Error::NotProblemUrl(url.to_owned()));
    }
    let Some(caps) = RE_PROBLEM_URL_PATH.captures(url.path()) else {
        return Err(Error::NotProblemUrl(url.to_owned()))
    };
    Ok(caps[2].to_owned())
}
