//! HTTP client for the Register of Wills estate search.

use std::future::Future;
use std::time::Duration;

use rand::Rng;
use url::Url;

use crate::{form::FormPayload, user_agent::get_user_agent, Error};

/// Production host serving the estate search.
pub const DEFAULT_BASE_URL: &str = "https://registers.maryland.gov";

const SEARCH_PATH: &str = "/RowNetWeb/Estates/frmEstateSearch2.aspx";
const RESULTS_BASE_PATH: &str = "/RowNetWeb/Estates/";

/// URL layout of the estate search site relative to a base host.
///
/// One URL serves both the bare form (GET) and every search/pager POST;
/// result links are relative to the `Estates/` directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoints {
    base_url: String,
}

impl Default for Endpoints {
    fn default() -> Self {
        Self::new(DEFAULT_BASE_URL)
    }
}

impl Endpoints {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// The search form endpoint.
    pub fn search_url(&self) -> String {
        format!("{}{}", self.base_url, SEARCH_PATH)
    }

    /// Base against which result-row links are resolved.
    pub fn results_base(&self) -> Result<Url, Error> {
        let raw = format!("{}{}", self.base_url, RESULTS_BASE_PATH);
        Url::parse(&raw).map_err(|e| {
            tracing::error!("Invalid results base URL {}: {}", raw, e);
            Error::InvalidUrl(raw)
        })
    }
}

/// Transport settings.
#[derive(Debug, Clone)]
pub struct ClientOptions {
    /// Per-request timeout.
    pub timeout: Duration,
    /// Retries after the first attempt for retryable failures.
    pub max_retries: usize,
    /// Base delay of the exponential backoff between retries.
    pub retry_base_delay: Duration,
    /// Upper bound for a single backoff delay.
    pub retry_max_delay: Duration,
    /// Skip TLS certificate verification. The site has served incomplete
    /// certificate chains in the past.
    pub accept_invalid_certs: bool,
}

impl Default for ClientOptions {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(30),
            max_retries: 2,
            retry_base_delay: Duration::from_millis(1000),
            retry_max_delay: Duration::from_secs(30),
            accept_invalid_certs: false,
        }
    }
}

impl ClientOptions {
    fn delay_for_attempt(&self, attempt: usize) -> Duration {
        let shift = (attempt.saturating_sub(1)).min(30) as u32;
        let exp = 1u64 << shift;
        let base_ms = self.retry_base_delay.as_millis() as u64;
        let max_ms = self.retry_max_delay.as_millis() as u64;
        let delay = base_ms.saturating_mul(exp).min(max_ms);
        let jitter = rand::thread_rng().gen_range(0.8..1.2);
        Duration::from_millis((delay as f64 * jitter) as u64)
    }
}

/// HTTP client for the estate search site.
///
/// Sends browser-like headers with a randomized desktop user agent. No cookie
/// jar is kept: session state travels in the hidden form fields only.
pub struct Client {
    http: reqwest::Client,
    endpoints: Endpoints,
    options: ClientOptions,
}

impl Client {
    /// Creates a client pointing at the production site with default options.
    pub fn new() -> Result<Self, Error> {
        Self::with_options(DEFAULT_BASE_URL, ClientOptions::default())
    }

    /// Creates a client with a custom base URL. Used for testing with wiremock.
    pub fn with_base_url(base_url: &str) -> Result<Self, Error> {
        Self::with_options(base_url, ClientOptions::default())
    }

    pub fn with_options(base_url: &str, options: ClientOptions) -> Result<Self, Error> {
        if options.accept_invalid_certs {
            tracing::warn!("TLS certificate verification is disabled");
        }
        let http = reqwest::Client::builder()
            .user_agent(get_user_agent())
            .timeout(options.timeout)
            .danger_accept_invalid_certs(options.accept_invalid_certs)
            .build()
            .map_err(|e| {
                tracing::error!("Failed to build HTTP client: {}", e);
                Error::RequestFailed
            })?;
        Ok(Self {
            http,
            endpoints: Endpoints::new(base_url),
            options,
        })
    }

    pub fn endpoints(&self) -> &Endpoints {
        &self.endpoints
    }

    /// GETs a page and returns its HTML.
    pub async fn get_html(&self, url: &str) -> Result<String, Error> {
        self.with_retry(url, || self.execute(self.request(reqwest::Method::GET, url)))
            .await
    }

    /// POSTs a urlencoded form and returns the HTML response.
    pub async fn post_form(&self, url: &str, form: &FormPayload) -> Result<String, Error> {
        self.with_retry(url, || {
            self.execute(
                self.request(reqwest::Method::POST, url)
                    .header("content-type", "application/x-www-form-urlencoded")
                    .body(form.to_urlencoded()),
            )
        })
        .await
    }

    fn request(&self, method: reqwest::Method, url: &str) -> reqwest::RequestBuilder {
        self.http
            .request(method, url)
            .header(
                "accept",
                "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8",
            )
            .header("accept-language", "en-US,en;q=0.5")
            .header("cache-control", "max-age=0")
            .header("upgrade-insecure-requests", "1")
            .header("referer", self.endpoints.base_url())
    }

    async fn execute(&self, request: reqwest::RequestBuilder) -> Result<String, Error> {
        let resp = request.send().await.map_err(|e| {
            tracing::error!("Failed to get resource: {}", e);
            Error::RequestFailed
        })?;

        let status = resp.status();
        let body = resp.text().await.map_err(|e| {
            tracing::error!("Failed to read response body: {}", e);
            Error::RequestFailed
        })?;

        if !status.is_success() {
            let snippet = truncate_body(&body);
            tracing::error!("Request failed with status {}: {}", status, snippet);
            return Err(Error::HttpStatus {
                status: status.as_u16(),
                body: snippet,
            });
        }

        Ok(body)
    }

    async fn with_retry<F, Fut>(&self, label: &str, mut f: F) -> Result<String, Error>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<String, Error>>,
    {
        let mut attempt = 0usize;
        loop {
            match f().await {
                Ok(body) => return Ok(body),
                Err(err) => {
                    attempt += 1;
                    if attempt > self.options.max_retries || !err.is_retryable() {
                        return Err(err);
                    }
                    let delay = self.options.delay_for_attempt(attempt);
                    tracing::warn!(
                        "{} request failed (attempt {}/{}), retrying in {:.1}s",
                        label,
                        attempt,
                        self.options.max_retries,
                        delay.as_secs_f64()
                    );
                    tokio::time::sleep(delay).await;
                }
            }
        }
    }
}

fn truncate_body(body: &str) -> String {
    const MAX: usize = 2000;
    if body.len() <= MAX {
        body.to_string()
    } else {
        let mut end = MAX;
        while !body.is_char_boundary(end) {
            end -= 1;
        }
        format!("{}...[truncated]", &body[..end])
    }
}
