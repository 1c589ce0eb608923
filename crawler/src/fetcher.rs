use rand::Rng;
use reqwest::{header, redirect::Policy, Client, StatusCode};
use std::time::Duration;
use tokio::time::sleep;

// Crawled sites block obvious bots; present a plain browser.
const BROWSER_UA: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) \
     AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

#[derive(Debug, Clone)]
pub struct FetchConfig {
    pub timeout: Duration,
    /// Attempts per URL. A 404 short-circuits without consuming retries.
    pub retries: u32,
    /// Delay before attempt `n` is `backoff_base^n + jitter` seconds.
    pub backoff_base: f64,
    /// Upper bound of the uniform jitter, in seconds.
    pub max_jitter: f64,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(10),
            retries: 3,
            backoff_base: 1.5,
            max_jitter: 0.5,
        }
    }
}

/// Stateless HTTP fetcher. TLS verification is disabled on purpose: the
/// target sites are external and broken certificates must not stall a
/// crawl run.
pub struct Fetcher {
    client: Client,
    config: FetchConfig,
}

impl Fetcher {
    pub fn new(config: FetchConfig) -> anyhow::Result<Self> {
        let client = Client::builder()
            .user_agent(BROWSER_UA)
            .timeout(config.timeout)
            .redirect(Policy::limited(5))
            .danger_accept_invalid_certs(true)
            .build()?;
        Ok(Self { client, config })
    }

    /// One GET with retries. Returns the body only for an HTTP 200 whose
    /// declared content type is HTML. A 404 is a definitive absence; any
    /// other status or transport error burns one attempt. Exhausting
    /// attempts yields `None`, which the frontier treats as a fetch failure
    /// rather than anything crawl-fatal.
    pub async fn fetch(&self, url: &str) -> Option<String> {
        for attempt in 0..self.config.retries {
            if attempt > 0 {
                self.backoff(attempt).await;
            }
            match self.client.get(url).send().await {
                Ok(resp) => {
                    let status = resp.status();
                    if status == StatusCode::NOT_FOUND {
                        tracing::debug!(%url, "404, not retrying");
                        return None;
                    }
                    if status == StatusCode::OK && is_html(resp.headers()) {
                        match resp.text().await {
                            Ok(body) => return Some(body),
                            Err(err) => {
                                tracing::debug!(%url, %err, "body read failed");
                            }
                        }
                    } else {
                        tracing::debug!(%url, %status, "unusable response");
                    }
                }
                Err(err) => {
                    tracing::debug!(%url, %err, "request error");
                }
            }
        }
        tracing::debug!(%url, retries = self.config.retries, "giving up");
        None
    }

    async fn backoff(&self, attempt: u32) {
        let jitter = if self.config.max_jitter > 0.0 {
            rand::thread_rng().gen_range(0.0..self.config.max_jitter)
        } else {
            0.0
        };
        let secs = self.config.backoff_base.powi(attempt as i32) + jitter;
        sleep(Duration::from_secs_f64(secs)).await;
    }
}

fn is_html(headers: &header::HeaderMap) -> bool {
    headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(|v| v.to_ascii_lowercase().contains("text/html"))
        .unwrap_or(false)
}
