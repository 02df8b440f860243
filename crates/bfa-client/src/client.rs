/*
 *
 *
 *
 *
 * MIT License
 * Copyright (c) 2025. Dwight J. Browne
 * dwight[-at-]dwightjbrowne[-dot-]com
 *
 *
 * Permission is hereby granted, free of charge, to any person obtaining a copy
 * of this software and associated documentation files (the "Software"), to deal
 * in the Software without restriction, including without limitation the rights
 * to use, copy, modify, merge, publish, distribute, sublicense, and/or sell
 * copies of the Software, and to permit persons to whom the Software is
 * furnished to do so, subject to the following conditions:
 *
 * The above copyright notice and this permission notice shall be included in all
 * copies or substantial portions of the Software.
 *
 * THE SOFTWARE IS PROVIDED "AS IS", WITHOUT WARRANTY OF ANY KIND, EXPRESS OR
 * IMPLIED, INCLUDING BUT NOT LIMITED TO THE WARRANTIES OF MERCHANTABILITY,
 * FITNESS FOR A PARTICULAR PURPOSE AND NONINFRINGEMENT. IN NO EVENT SHALL THE
 * AUTHORS OR COPYRIGHT HOLDERS BE LIABLE FOR ANY CLAIM, DAMAGES OR OTHER
 * LIABILITY, WHETHER IN AN ACTION OF CONTRACT, TORT OR OTHERWISE, ARISING FROM,
 * OUT OF OR IN CONNECTION WITH THE SOFTWARE OR THE USE OR OTHER DEALINGS IN THE
 * SOFTWARE.
 */

use bfa_core::{Config, Error, Result};
use reqwest::Client;
use std::time::Duration;
use tracing::{debug, warn};
use url::Url;

/// Shared HTTP transport for probes, listings, archive reads, and metadata.
///
/// One connection pool serves every request in the process; the pool is
/// read-only after construction. Per-call deadlines are applied at request
/// time (HEAD probes and archive GETs use different deadlines).
pub struct HttpClient {
  http: Client,
  pub(crate) archive_base_url: String,
  pub(crate) listing_base_url: String,
  pub(crate) exchange_info_url: String,
  pub(crate) head_timeout: Duration,
  pub(crate) archive_timeout: Duration,
}

impl HttpClient {
  /// Create the shared client and pre-warm the bucket host's name resolution.
  ///
  /// The pre-warm is a cold-start optimization only; resolution failure is
  /// logged and never aborts construction.
  pub async fn new(config: &Config) -> Result<Self> {
    let http = Client::builder()
      .user_agent("bfa/0.1")
      .build()
      .map_err(|e| Error::Config(format!("Failed to create HTTP client: {e}")))?;

    prewarm_dns(&config.archive_base_url).await;

    Ok(Self {
      http,
      archive_base_url: config.archive_base_url.clone(),
      listing_base_url: config.listing_base_url.clone(),
      exchange_info_url: config.exchange_info_url.clone(),
      head_timeout: Duration::from_secs(config.head_timeout_secs),
      archive_timeout: Duration::from_secs(config.archive_timeout_secs),
    })
  }

  pub(crate) fn http(&self) -> &Client {
    &self.http
  }

  /// Map a transport failure into the probe error taxonomy.
  pub(crate) fn transport_error(url: &str, err: reqwest::Error) -> Error {
    if err.is_timeout() {
      Error::Timeout { url: url.to_string() }
    } else {
      Error::Network { url: url.to_string(), message: err.to_string() }
    }
  }
}

async fn prewarm_dns(base_url: &str) {
  let Ok(url) = Url::parse(base_url) else {
    warn!("DNS pre-warm skipped: unparseable base URL {base_url}");
    return;
  };
  let Some(host) = url.host_str() else {
    warn!("DNS pre-warm skipped: no host in {base_url}");
    return;
  };
  let host = host.to_string();

  match tokio::net::lookup_host((host.clone(), 443)).await {
    Ok(mut addrs) => {
      debug!(host, resolved = ?addrs.next(), "DNS pre-warm complete");
    }
    Err(e) => {
      warn!(host, "DNS pre-warm failed: {e}");
    }
  }
}

impl std::fmt::Debug for HttpClient {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("HttpClient")
      .field("archive_base_url", &self.archive_base_url)
      .field("listing_base_url", &self.listing_base_url)
      .field("head_timeout", &self.head_timeout)
      .field("archive_timeout", &self.archive_timeout)
      .finish()
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[tokio::test]
  async fn test_client_creation_uses_config_timeouts() {
    let config = Config::default_with_root(std::path::Path::new("/tmp/bfa"));
    let client = HttpClient::new(&config).await.unwrap();
    assert_eq!(client.head_timeout, Duration::from_secs(10));
    assert_eq!(client.archive_timeout, Duration::from_secs(60));
    assert_eq!(client.archive_base_url, bfa_core::ARCHIVE_BASE_URL);
  }

  #[tokio::test]
  async fn test_prewarm_failure_does_not_abort_construction() {
    let mut config = Config::default_with_root(std::path::Path::new("/tmp/bfa"));
    config.archive_base_url = "https://resolves.nowhere.invalid".to_string();
    assert!(HttpClient::new(&config).await.is_ok());
  }
}
