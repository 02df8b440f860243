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

//! Bulk prefix listing: one round-trip per page instead of one HEAD per day.
//!
//! A historical backfill over N dates x M symbols costs N*M HEAD round-trips;
//! one listing per symbol costs M. The bucket speaks the S3 listing protocol
//! (`ListBucketResult` XML with marker pagination).

use crate::client::HttpClient;
use crate::endpoints::probe::archive_url;
use bfa_core::{Error, Result, Symbol};
use chrono::{DateTime, NaiveDate};
use serde::Deserialize;
use tracing::debug;
use url::Url;

/// One dated archive object under a symbol's daily-1m prefix.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListedArchive {
  pub date: NaiveDate,
  pub size: u64,
  /// RFC 7231 rendering, matching what a HEAD probe would have recorded.
  pub last_modified: String,
  pub url: String,
}

#[derive(Debug, Deserialize)]
struct ListBucketResult {
  #[serde(rename = "IsTruncated", default)]
  is_truncated: bool,
  #[serde(rename = "NextMarker")]
  next_marker: Option<String>,
  #[serde(rename = "Contents", default)]
  contents: Vec<ObjectEntry>,
}

#[derive(Debug, Deserialize)]
struct ObjectEntry {
  #[serde(rename = "Key")]
  key: String,
  #[serde(rename = "Size")]
  size: u64,
  #[serde(rename = "LastModified")]
  last_modified: String,
}

impl HttpClient {
  /// Enumerate every dated archive under a symbol's daily-1m prefix.
  ///
  /// Pagination is handled here; callers see one consolidated sequence,
  /// sorted ascending by date. An empty sequence is a valid result (newly
  /// listed symbol); failure to enumerate is an error.
  pub async fn list_prefix(&self, symbol: &Symbol) -> Result<Vec<ListedArchive>> {
    let prefix = format!("data/futures/um/daily/klines/{symbol}/1m/");
    let mut marker: Option<String> = None;
    let mut archives = Vec::new();
    let mut pages = 0usize;

    loop {
      let page_url = self.listing_page_url(&prefix, marker.as_deref())?;
      let body = self.fetch_listing_page(&prefix, &page_url).await?;
      let page: ListBucketResult = quick_xml::de::from_str(&body)
        .map_err(|e| Error::Listing { prefix: prefix.clone(), message: e.to_string() })?;
      pages += 1;

      let last_key = page.contents.last().map(|entry| entry.key.clone());
      for entry in &page.contents {
        if let Some(archive) = self.listed_archive(symbol, entry) {
          archives.push(archive);
        }
      }

      if page.is_truncated {
        // V1 listings echo NextMarker only when a delimiter is set; fall
        // back to the last key of the page.
        marker = page.next_marker.or(last_key);
        if marker.is_none() {
          return Err(Error::Listing {
            prefix,
            message: "truncated listing without a continuation marker".to_string(),
          });
        }
      } else {
        break;
      }
    }

    archives.sort_by_key(|archive| archive.date);
    debug!(symbol = %symbol, pages, archives = archives.len(), "prefix listing complete");
    Ok(archives)
  }

  fn listing_page_url(&self, prefix: &str, marker: Option<&str>) -> Result<String> {
    let mut url = Url::parse(&self.listing_base_url)
      .map_err(|e| Error::Config(format!("Invalid listing base URL: {e}")))?;
    {
      let mut query = url.query_pairs_mut();
      query.append_pair("delimiter", "/");
      query.append_pair("prefix", prefix);
      if let Some(marker) = marker {
        query.append_pair("marker", marker);
      }
    }
    Ok(url.into())
  }

  async fn fetch_listing_page(&self, prefix: &str, page_url: &str) -> Result<String> {
    let response = self
      .http()
      .get(page_url)
      .timeout(self.archive_timeout)
      .send()
      .await
      .map_err(|e| HttpClient::transport_error(page_url, e))?;

    let status = response.status();
    if !status.is_success() {
      return Err(Error::UnexpectedStatus { url: page_url.to_string(), status: status.as_u16() });
    }

    response
      .text()
      .await
      .map_err(|e| Error::Listing { prefix: prefix.to_string(), message: e.to_string() })
  }

  fn listed_archive(&self, symbol: &Symbol, entry: &ObjectEntry) -> Option<ListedArchive> {
    let date = date_from_key(&entry.key, symbol)?;
    Some(ListedArchive {
      date,
      size: entry.size,
      last_modified: rfc7231_from_iso(&entry.last_modified),
      url: archive_url(&self.archive_base_url, symbol, date, "1m"),
    })
  }
}

/// Extract the date from an object key of the form
/// `.../<SYM>-1m-YYYY-MM-DD.zip`. Checksum sidecars and stray objects yield
/// `None`.
fn date_from_key(key: &str, symbol: &Symbol) -> Option<NaiveDate> {
  let file_name = key.rsplit('/').next()?;
  let stem = file_name.strip_suffix(".zip")?;
  let date_part = stem.strip_prefix(&format!("{symbol}-1m-"))?;
  NaiveDate::parse_from_str(date_part, "%Y-%m-%d").ok()
}

/// Re-render the listing's ISO-8601 `LastModified` as RFC 7231, the form a
/// HEAD probe records. Unparseable values pass through untouched.
fn rfc7231_from_iso(iso: &str) -> String {
  match DateTime::parse_from_rfc3339(iso) {
    Ok(instant) => instant.naive_utc().format("%a, %d %b %Y %H:%M:%S GMT").to_string(),
    Err(_) => iso.to_string(),
  }
}
