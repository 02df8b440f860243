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

//! Availability probe: one HEAD per (symbol, date) archive cell.

use crate::client::HttpClient;
use bfa_core::{Error, Result, Symbol};
use chrono::{DateTime, NaiveDate, Utc};
use reqwest::header::{CONTENT_LENGTH, LAST_MODIFIED};
use tracing::debug;

/// What a probe observed for one archive cell.
///
/// `Available` always carries a size, so the availability invariant
/// (available ⇔ size present ∧ status 200) holds by construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProbeOutcome {
  Available { file_size_bytes: u64, last_modified: String },
  Missing,
}

/// One completed probe observation, ready for upsert.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProbeRecord {
  pub symbol: Symbol,
  pub date: NaiveDate,
  pub url: String,
  pub status_code: u16,
  pub outcome: ProbeOutcome,
  pub probe_timestamp: DateTime<Utc>,
}

impl ProbeRecord {
  pub fn is_available(&self) -> bool {
    matches!(self.outcome, ProbeOutcome::Available { .. })
  }
}

/// Deterministic archive URL for a (symbol, date, interval) cell:
/// `<base>/data/futures/um/daily/klines/<SYM>/<interval>/<SYM>-<interval>-YYYY-MM-DD.zip`
pub fn archive_url(base: &str, symbol: &Symbol, date: NaiveDate, interval: &str) -> String {
  format!(
    "{base}/data/futures/um/daily/klines/{symbol}/{interval}/{symbol}-{interval}-{date}.zip",
    date = date.format("%Y-%m-%d")
  )
}

impl HttpClient {
  /// HEAD one archive cell. 200 and 404 are the two semantic outcomes; any
  /// other status or transport failure is an error. No retries here: the
  /// next scheduled run's overlapping lookback is the retry.
  pub async fn probe(&self, symbol: &Symbol, date: NaiveDate) -> Result<ProbeRecord> {
    let url = archive_url(&self.archive_base_url, symbol, date, "1m");

    let response = self
      .http()
      .head(&url)
      .timeout(self.head_timeout)
      .send()
      .await
      .map_err(|e| HttpClient::transport_error(&url, e))?;

    let status = response.status().as_u16();
    let probe_timestamp = Utc::now();

    let outcome = match status {
      200 => {
        let file_size_bytes = header_str(response.headers(), CONTENT_LENGTH)
          .and_then(|raw| raw.parse::<u64>().ok())
          .ok_or_else(|| Error::Archive {
            url: url.clone(),
            message: "200 response without a parseable Content-Length".to_string(),
          })?;
        let last_modified =
          header_str(response.headers(), LAST_MODIFIED).unwrap_or_default().to_string();
        ProbeOutcome::Available { file_size_bytes, last_modified }
      }
      404 => ProbeOutcome::Missing,
      _ => return Err(Error::UnexpectedStatus { url, status }),
    };

    debug!(symbol = %symbol, %date, status, "probe complete");

    Ok(ProbeRecord { symbol: symbol.clone(), date, url, status_code: status, outcome, probe_timestamp })
  }
}

fn header_str<'a>(
  headers: &'a reqwest::header::HeaderMap,
  name: reqwest::header::HeaderName,
) -> Option<&'a str> {
  headers.get(name).and_then(|value| value.to_str().ok())
}
