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

//! # bfa-client
//!
//! HTTP surface against the public archive bucket and the venue metadata
//! endpoint. All calls share one pooled client ([`HttpClient`]); every
//! operation is a stateless function of its inputs:
//!
//! - [`HttpClient::probe`] - HEAD one (symbol, date) archive cell
//! - [`HttpClient::list_prefix`] - enumerate a symbol's dated archives
//! - [`HttpClient::fetch_daily_klines`] - pull and parse one daily kline archive
//! - [`HttpClient::fetch_live_symbols`] - live tradable-contract discovery

pub mod client;
pub mod endpoints;

pub use client::HttpClient;
pub use endpoints::exchange_info::LiveSymbols;
pub use endpoints::klines::DailyKlines;
pub use endpoints::listing::ListedArchive;
pub use endpoints::probe::{archive_url, ProbeOutcome, ProbeRecord};
