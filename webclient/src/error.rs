use reqwest::StatusCode;
use url::Url;

pub type Result<T> = ::std::result::Result<T, Error>;

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("Failed to parse as URL '{url}'")]
    InvalidSyntaxUrl {
        url: String,

        #[source]
        source: url::ParseError,
    },

    #[error("Not an AtCoder problem URL '{0}'")]
    NotProblemUrl(Url),

    #[error("Unexpected response code '{got}' (expected '{expected}') while requesting to {requested_url}")]
    UnexpectedResponseCode {
        got: StatusCode,
        expected: StatusCode,
        requested_url: String,
    },

    #[error("Http error: {0}")]
    Http(#[from] reqwest::Error),
}
