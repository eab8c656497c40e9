//! [`RebrickableClient`]: paced, retrying access to the Rebrickable REST API.

use std::{
  sync::Arc,
  time::{Duration, Instant},
};

use futures::{Stream, TryStreamExt as _, stream};
use reqwest::{
  Client, Response, StatusCode,
  header::{AUTHORIZATION, RETRY_AFTER},
};
use serde_json::Value;
use tokio::sync::Mutex;

use crate::{Error, Result, model::Page, retry::RetryPolicy};

const USER_AGENT: &str = concat!("brickyard/", env!("CARGO_PKG_VERSION"));

/// Connection settings for the Rebrickable API.
#[derive(Debug, Clone)]
pub struct RebrickableConfig {
  /// e.g. `https://rebrickable.com/api/v3/lego`
  pub base_url:     String,
  pub api_key:      String,
  pub timeout:      Duration,
  /// Minimum spacing between consecutive requests.
  pub min_interval: Duration,
  pub retry:        RetryPolicy,
}

// ─── Pacing ──────────────────────────────────────────────────────────────────

/// Enforces a minimum interval between requests.
struct RateLimiter {
  last_request: Mutex<Option<Instant>>,
  min_interval: Duration,
}

impl RateLimiter {
  fn new(min_interval: Duration) -> Self {
    Self { last_request: Mutex::new(None), min_interval }
  }

  async fn wait(&self) {
    let mut last = self.last_request.lock().await;
    if let Some(last_time) = *last {
      let elapsed = last_time.elapsed();
      if elapsed < self.min_interval {
        let wait_time = self.min_interval - elapsed;
        tracing::trace!(?wait_time, "pacing request");
        tokio::time::sleep(wait_time).await;
      }
    }
    *last = Some(Instant::now());
  }
}

// ─── Client ──────────────────────────────────────────────────────────────────

/// Async client for the Rebrickable catalog.
///
/// Cheap to clone; clones share the HTTP pool and the pacing state.
#[derive(Clone)]
pub struct RebrickableClient {
  http:    Client,
  config:  Arc<RebrickableConfig>,
  limiter: Arc<RateLimiter>,
}

/// Where the next page of a paginated listing comes from.
enum Cursor {
  First,
  Next(String),
}

impl RebrickableClient {
  pub fn new(config: RebrickableConfig) -> Result<Self> {
    let http = Client::builder()
      .user_agent(USER_AGENT)
      .timeout(config.timeout)
      .build()?;
    let limiter = Arc::new(RateLimiter::new(config.min_interval));
    Ok(Self { http, config: Arc::new(config), limiter })
  }

  /// Resolve `endpoint` against the base URL. Absolute URLs (pagination
  /// links) are used as-is.
  fn url(&self, endpoint: &str) -> String {
    if endpoint.starts_with("http://") || endpoint.starts_with("https://") {
      return endpoint.to_owned();
    }
    format!(
      "{}/{}",
      self.config.base_url.trim_end_matches('/'),
      endpoint.trim_start_matches('/')
    )
  }

  /// `GET endpoint?query` and return the decoded JSON body.
  ///
  /// A rate-limit response is waited out once (`Retry-After`, else the
  /// policy default); 502/503/504 and connect/timeout failures back off
  /// exponentially. No request is sent more than `max_attempts` times.
  pub async fn fetch(&self, endpoint: &str, query: &[(&str, String)]) -> Result<Value> {
    let url = self.url(endpoint);
    let policy = &self.config.retry;
    let mut rate_limited = false;
    let mut attempt = 0;

    loop {
      attempt += 1;
      self.limiter.wait().await;

      let sent = self
        .http
        .get(&url)
        .header(AUTHORIZATION, format!("key {}", self.config.api_key))
        .query(query)
        .send()
        .await;

      let (last, delay) = match sent {
        Ok(resp) if resp.status().is_success() => return decode_body(&url, resp).await,
        Ok(resp) => match resp.status() {
          StatusCode::NOT_FOUND => return Err(Error::NotFound(url)),
          StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
            return Err(Error::Unauthorized(resp.status().as_u16()));
          }
          StatusCode::TOO_MANY_REQUESTS if !rate_limited => {
            rate_limited = true;
            let wait = retry_after(&resp).unwrap_or(policy.rate_limit_delay);
            ("HTTP 429".to_owned(), policy.backoff_for_attempt(attempt, Some(wait)))
          }
          StatusCode::TOO_MANY_REQUESTS => {
            return Err(Error::RetriesExhausted {
              url,
              attempts: attempt,
              last: "HTTP 429 after waiting out Retry-After".to_owned(),
            });
          }
          StatusCode::BAD_GATEWAY
          | StatusCode::SERVICE_UNAVAILABLE
          | StatusCode::GATEWAY_TIMEOUT => (
            format!("HTTP {}", resp.status().as_u16()),
            policy.backoff_for_attempt(attempt, None),
          ),
          status => {
            let body = resp.text().await.unwrap_or_default();
            return Err(Error::Remote { url, status: status.as_u16(), body });
          }
        },
        Err(e) if e.is_timeout() || e.is_connect() => {
          (e.to_string(), policy.backoff_for_attempt(attempt, None))
        }
        Err(e) => return Err(Error::Http(e)),
      };

      if attempt >= policy.max_attempts {
        return Err(Error::RetriesExhausted { url, attempts: attempt, last });
      }
      tracing::warn!(%url, attempt, ?delay, reason = %last, "transient failure, retrying");
      tokio::time::sleep(delay).await;
    }
  }

  /// Every item of a paginated listing, following `next` links until the
  /// envelope has none. Pages are fetched lazily as the stream is polled.
  pub fn fetch_all<'a>(
    &'a self,
    endpoint: &'a str,
    query: &'a [(&'a str, String)],
  ) -> impl Stream<Item = Result<Value>> + Send + 'a {
    stream::try_unfold(Some(Cursor::First), move |cursor| async move {
      let body = match cursor {
        None => return Ok(None),
        Some(Cursor::First) => self.fetch(endpoint, query).await?,
        Some(Cursor::Next(url)) => self.fetch(&url, &[]).await?,
      };
      let page: Page = serde_json::from_value(body).map_err(|e| Error::Decode {
        url:    self.url(endpoint),
        reason: e.to_string(),
      })?;
      let items: Vec<Result<Value>> = page.results.into_iter().map(Ok).collect();
      Ok::<_, Error>(Some((stream::iter(items), page.next.map(Cursor::Next))))
    })
    .try_flatten()
  }
}

async fn decode_body(url: &str, resp: Response) -> Result<Value> {
  let text = resp.text().await?;
  serde_json::from_str(&text).map_err(|e| Error::Decode {
    url:    url.to_owned(),
    reason: e.to_string(),
  })
}

/// `Retry-After` in its delta-seconds form.
fn retry_after(resp: &Response) -> Option<Duration> {
  resp
    .headers()
    .get(RETRY_AFTER)?
    .to_str()
    .ok()?
    .trim()
    .parse::<u64>()
    .ok()
    .map(Duration::from_secs)
}
