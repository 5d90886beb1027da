// GitHub API HTTP client.
// Handles default headers, timeouts, rate limit tracking and response classification.

use std::sync::Mutex;

use reqwest::{
    Client, Response, StatusCode, Url,
    header::{ACCEPT, HeaderMap, HeaderValue, USER_AGENT},
};

use crate::config::Config;
use crate::error::{MutualsError, Result};

use super::types::RateLimit;

pub const GITHUB_API_BASE: &str = "https://api.github.com";
const GITHUB_API_VERSION: &str = "2022-11-28";

/// Unauthenticated GitHub API client with rate limit tracking.
pub struct GitHubClient {
    client: Client,
    base_url: String,
    rate_limit: Mutex<RateLimit>,
}

impl GitHubClient {
    /// Create a client from the session configuration.
    pub fn new(config: &Config) -> Result<Self> {
        let mut headers = HeaderMap::new();

        headers.insert(
            ACCEPT,
            HeaderValue::from_static("application/vnd.github+json"),
        );
        headers.insert(
            "X-GitHub-Api-Version",
            HeaderValue::from_static(GITHUB_API_VERSION),
        );
        headers.insert(
            USER_AGENT,
            HeaderValue::from_static(concat!("mutuals/", env!("CARGO_PKG_VERSION"))),
        );

        let client = Client::builder()
            .default_headers(headers)
            .timeout(config.timeout)
            .build()
            .map_err(MutualsError::Api)?;

        Ok(Self {
            client,
            base_url: config.api_url.trim_end_matches('/').to_string(),
            rate_limit: Mutex::new(RateLimit::default()),
        })
    }

    /// Rate limit reported by the most recent response.
    pub fn rate_limit(&self) -> RateLimit {
        self.rate_limit
            .lock()
            .map(|r| r.clone())
            .unwrap_or_default()
    }

    /// Make a GET request with query parameters.
    pub async fn get_with_params<T: serde::Serialize + ?Sized>(
        &self,
        endpoint: &str,
        params: &T,
    ) -> Result<Response> {
        let url = format!("{}{}", self.base_url, endpoint);
        let response = self
            .client
            .get(&url)
            .query(params)
            .send()
            .await
            .map_err(classify_send_error)?;

        let rate = self.update_rate_limit(&response);
        check_response(response, &rate).await
    }

    /// Update rate limit from response headers, returning what this response reported.
    fn update_rate_limit(&self, response: &Response) -> RateLimit {
        let headers = response.headers();
        let mut rate = self.rate_limit();

        if let Some(limit) = header_u64(headers, "x-ratelimit-limit") {
            rate.limit = limit;
        }
        if let Some(remaining) = header_u64(headers, "x-ratelimit-remaining") {
            rate.remaining = remaining;
        }
        if let Some(reset) = header_u64(headers, "x-ratelimit-reset") {
            rate.reset = reset;
        }

        if let Ok(mut shared) = self.rate_limit.lock() {
            *shared = rate.clone();
        }
        rate
    }
}

fn header_u64(headers: &HeaderMap, name: &str) -> Option<u64> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.parse().ok())
}

/// Map a failed send into the error taxonomy.
fn classify_send_error(err: reqwest::Error) -> MutualsError {
    if err.is_timeout() || err.is_connect() || err.is_request() || err.is_body() {
        MutualsError::Transient(err.to_string())
    } else {
        MutualsError::Api(err)
    }
}

/// Check response status and convert errors.
async fn check_response(response: Response, rate: &RateLimit) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let url = response.url().to_string();
    let err = classify_status(status, rate, &url);
    if let MutualsError::Other(msg) = err {
        let body = response.text().await.unwrap_or_default();
        return Err(MutualsError::Other(format!("{msg}: {body}")));
    }
    Err(err)
}

/// Classify a non-success status into the error taxonomy.
pub fn classify_status(status: StatusCode, rate: &RateLimit, url: &str) -> MutualsError {
    match status {
        StatusCode::NOT_FOUND => MutualsError::NotFound(url.to_string()),
        StatusCode::TOO_MANY_REQUESTS => MutualsError::RateLimited {
            reset_at: format_reset(rate.reset),
        },
        StatusCode::FORBIDDEN if rate.remaining == 0 && rate.limit > 0 => {
            MutualsError::RateLimited {
                reset_at: format_reset(rate.reset),
            }
        }
        StatusCode::FORBIDDEN => MutualsError::Other("Forbidden".to_string()),
        status if status.is_server_error() => {
            MutualsError::Transient(format!("HTTP {} from {}", status, url))
        }
        status => MutualsError::Other(format!("HTTP {}", status)),
    }
}

fn format_reset(reset: u64) -> String {
    chrono::DateTime::from_timestamp(reset as i64, 0)
        .filter(|_| reset > 0)
        .map(|dt| dt.format("%H:%M:%S UTC").to_string())
        .unwrap_or_else(|| "unknown".to_string())
}

/// Page numbers advertised by a `Link` header.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LinkPagination {
    /// A `rel="next"` link was present, whether or not its page could be read.
    pub has_next: bool,
    pub next: Option<u32>,
    pub last: Option<u32>,
}

/// Parse a GitHub `Link` header such as
/// `<https://api.github.com/user/1/followers?page=2>; rel="next", <...?page=7>; rel="last"`.
///
/// Relative targets are resolved against `base`, the URL of the response.
pub fn parse_link_header(value: &str, base: &Url) -> LinkPagination {
    let mut links = LinkPagination::default();

    for part in value.split(',') {
        let mut segments = part.split(';');
        let Some(target) = segments.next() else {
            continue;
        };
        let target = target.trim().trim_start_matches('<').trim_end_matches('>');
        let page = base.join(target).ok().and_then(|url| {
            url.query_pairs()
                .find(|(k, _)| k == "page")
                .and_then(|(_, v)| v.parse::<u32>().ok())
        });

        for param in segments {
            let param = param.trim();
            let Some(rel) = param.strip_prefix("rel=") else {
                continue;
            };
            for name in rel.trim_matches('"').split_whitespace() {
                match name {
                    "next" => {
                        links.has_next = true;
                        links.next = page;
                    }
                    "last" => links.last = page,
                    _ => {}
                }
            }
        }
    }

    links
}
