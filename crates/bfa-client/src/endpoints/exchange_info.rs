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

//! Live contract discovery against the venue metadata endpoint.
//!
//! The endpoint is subject to geographic blocking; a 451 maps to
//! [`bfa_core::Error::GeoBlocked`] so callers can skip, not fail.

use crate::client::HttpClient;
use bfa_core::{Error, Result, Symbol};
use serde::Deserialize;
use std::collections::BTreeSet;
use tracing::{info, warn};

/// The live set of tradable USDT-margined perpetual identifiers.
pub type LiveSymbols = BTreeSet<Symbol>;

#[derive(Debug, Deserialize)]
struct ExchangeInfo {
  #[serde(default)]
  symbols: Vec<ContractInfo>,
}

#[derive(Debug, Deserialize)]
struct ContractInfo {
  symbol: String,
  #[serde(rename = "contractType", default)]
  contract_type: String,
  #[serde(rename = "quoteAsset", default)]
  quote_asset: String,
}

impl HttpClient {
  /// Fetch the currently tradable USDT-margined perpetual contracts.
  pub async fn fetch_live_symbols(&self) -> Result<LiveSymbols> {
    let url = self.exchange_info_url.clone();

    let response = self
      .http()
      .get(&url)
      .timeout(self.head_timeout)
      .send()
      .await
      .map_err(|e| HttpClient::transport_error(&url, e))?;

    let status = response.status().as_u16();
    if status == 451 {
      return Err(Error::GeoBlocked { url });
    }
    if status != 200 {
      return Err(Error::UnexpectedStatus { url, status });
    }

    let info: ExchangeInfo = response
      .json()
      .await
      .map_err(|e| Error::Network { url: url.clone(), message: e.to_string() })?;

    let live = perpetual_usdt_symbols(info);
    info!(symbols = live.len(), "live contract discovery complete");
    Ok(live)
  }
}

fn perpetual_usdt_symbols(info: ExchangeInfo) -> LiveSymbols {
  let mut live = BTreeSet::new();
  for contract in info.symbols {
    if contract.contract_type != "PERPETUAL" || contract.quote_asset != bfa_core::QUOTE_ASSET {
      continue;
    }
    match Symbol::parse(&contract.symbol) {
      Ok(symbol) => {
        live.insert(symbol);
      }
      Err(_) => {
        warn!(symbol = %contract.symbol, "skipping contract with out-of-shape identifier");
      }
    }
  }
  live
}

#[cfg(test)]
mod tests {
  use super::*;

  const PAYLOAD: &str = r#"{
    "timezone": "UTC",
    "symbols": [
      {"symbol": "BTCUSDT", "contractType": "PERPETUAL", "quoteAsset": "USDT", "status": "TRADING"},
      {"symbol": "ETHUSDT", "contractType": "PERPETUAL", "quoteAsset": "USDT", "status": "TRADING"},
      {"symbol": "BTCUSDT_240927", "contractType": "CURRENT_QUARTER", "quoteAsset": "USDT", "status": "TRADING"},
      {"symbol": "ETHBTC", "contractType": "PERPETUAL", "quoteAsset": "BTC", "status": "TRADING"},
      {"symbol": "BTCUSD_PERP", "contractType": "PERPETUAL", "quoteAsset": "USD", "status": "TRADING"}
    ]
  }"#;

  #[test]
  fn test_filter_keeps_only_usdt_perpetuals() {
    let info: ExchangeInfo = serde_json::from_str(PAYLOAD).unwrap();
    let live = perpetual_usdt_symbols(info);
    let names: Vec<&str> = live.iter().map(|s| s.as_str()).collect();
    assert_eq!(names, vec!["BTCUSDT", "ETHUSDT"]);
  }

  #[test]
  fn test_filter_skips_out_of_shape_identifiers() {
    let payload = r#"{
      "symbols": [
        {"symbol": "btc_usdt", "contractType": "PERPETUAL", "quoteAsset": "USDT"},
        {"symbol": "SOLUSDT", "contractType": "PERPETUAL", "quoteAsset": "USDT"}
      ]
    }"#;
    let info: ExchangeInfo = serde_json::from_str(payload).unwrap();
    let live = perpetual_usdt_symbols(info);
    assert_eq!(live.len(), 1);
    assert_eq!(live.iter().next().unwrap().as_str(), "SOLUSDT");
  }

  #[test]
  fn test_empty_payload_yields_empty_set() {
    let info: ExchangeInfo = serde_json::from_str("{}").unwrap();
    assert!(perpetual_usdt_symbols(info).is_empty());
  }
}
