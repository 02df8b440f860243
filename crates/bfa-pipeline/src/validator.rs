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

//! Validation: continuity, completeness, and the live cross-check.
//!
//! Findings are accumulated and surfaced with the run's publication metadata;
//! they never abort a run. They represent expected publication lag, not
//! corruption.

use crate::error::PipelineResult;
use bfa_client::LiveSymbols;
use bfa_core::Symbol;
use bfa_store::AvailabilityStore;
use chrono::{Days, NaiveDate};
use std::collections::BTreeSet;
use std::fmt;
use tracing::info;

const MAX_LISTED_GAP_DATES: usize = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckKind {
  Continuity,
  Completeness,
  CrossCheck,
}

impl fmt::Display for CheckKind {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      CheckKind::Continuity => write!(f, "continuity"),
      CheckKind::Completeness => write!(f, "completeness"),
      CheckKind::CrossCheck => write!(f, "cross-check"),
    }
  }
}

/// One non-fatal observation about the published data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Finding {
  pub check: CheckKind,
  pub message: String,
}

impl fmt::Display for Finding {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "[{}] {}", self.check, self.message)
  }
}

/// Accumulated findings for one run.
#[derive(Debug, Default)]
pub struct ValidationReport {
  pub findings: Vec<Finding>,
}

impl ValidationReport {
  pub fn is_clean(&self) -> bool {
    self.findings.is_empty()
  }

  pub fn extend(&mut self, findings: Vec<Finding>) {
    self.findings.extend(findings);
  }
}

/// Continuity: dates between the stored minimum and maximum must be
/// contiguous. Every missing day in between is a finding.
pub fn check_continuity(dates: &[NaiveDate]) -> Vec<Finding> {
  let (Some(first), Some(last)) = (dates.first(), dates.last()) else {
    return Vec::new();
  };

  let present: BTreeSet<NaiveDate> = dates.iter().copied().collect();
  let mut missing = Vec::new();
  let mut day = *first;
  while day < *last {
    if !present.contains(&day) {
      missing.push(day);
    }
    day = day.checked_add_days(Days::new(1)).expect("date axis stays in range");
  }

  if missing.is_empty() {
    return Vec::new();
  }

  let listed: Vec<String> =
    missing.iter().take(MAX_LISTED_GAP_DATES).map(|d| d.to_string()).collect();
  let suffix =
    if missing.len() > MAX_LISTED_GAP_DATES { format!(" (+{} more)", missing.len() - MAX_LISTED_GAP_DATES) } else { String::new() };
  vec![Finding {
    check: CheckKind::Continuity,
    message: format!("{} missing date(s) in range: {}{}", missing.len(), listed.join(", "), suffix),
  }]
}

/// Completeness: per-date row counts must lie inside the configured band.
pub fn check_completeness(counts: &[(NaiveDate, u64)], min: u64, max: u64) -> Vec<Finding> {
  counts
    .iter()
    .filter(|(_, count)| *count < min || *count > max)
    .map(|(date, count)| Finding {
      check: CheckKind::Completeness,
      message: format!("{date}: {count} symbols outside expected band [{min}, {max}]"),
    })
    .collect()
}

/// Cross-check: the latest date's available set against the live metadata
/// set. An unreachable or geo-blocked endpoint skips the check with an
/// explanatory finding, never a failure.
pub fn check_cross_check(
  latest_date: Option<NaiveDate>,
  available: &BTreeSet<Symbol>,
  live: Result<&BTreeSet<Symbol>, &bfa_core::Error>,
  min_ratio: f64,
) -> Vec<Finding> {
  let Some(latest_date) = latest_date else {
    return Vec::new();
  };

  let live = match live {
    Ok(live) => live,
    Err(error) => {
      return vec![Finding {
        check: CheckKind::CrossCheck,
        message: format!("skipped: live metadata unavailable ({error})"),
      }];
    }
  };

  if live.is_empty() {
    return vec![Finding {
      check: CheckKind::CrossCheck,
      message: "skipped: live metadata returned no contracts".to_string(),
    }];
  }

  let matched = live.intersection(available).count();
  let ratio = matched as f64 / live.len() as f64;
  info!(%latest_date, matched, live = live.len(), ratio, "cross-check complete");

  if ratio > min_ratio {
    return Vec::new();
  }

  vec![Finding {
    check: CheckKind::CrossCheck,
    message: format!(
      "{latest_date}: only {matched}/{} live contracts available ({:.1}% < {:.0}%)",
      live.len(),
      ratio * 100.0,
      min_ratio * 100.0
    ),
  }]
}

/// Run all three checks against a store. Findings accumulate; nothing here
/// can abort a run short of the store itself failing to answer.
pub fn run_checks(
  store: &AvailabilityStore,
  live: Result<&LiveSymbols, &bfa_core::Error>,
  completeness_min: u64,
  completeness_max: u64,
) -> PipelineResult<ValidationReport> {
  let mut report = ValidationReport::default();
  report.extend(check_continuity(&store.distinct_dates()?));
  report.extend(check_completeness(
    &store.daily_row_counts()?,
    completeness_min,
    completeness_max,
  ));

  let latest = store.latest_date()?;
  let available = match latest {
    Some(date) => store.available_symbols_on(date)?,
    None => BTreeSet::new(),
  };
  report.extend(check_cross_check(latest, &available, live, bfa_core::CROSS_CHECK_MIN_RATIO));

  for finding in &report.findings {
    info!(finding = %finding, "validator finding");
  }
  Ok(report)
}

#[cfg(test)]
mod tests {
  use super::*;

  fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
  }

  fn set(names: &[&str]) -> BTreeSet<Symbol> {
    names.iter().map(|name| Symbol::parse(name).unwrap()).collect()
  }

  #[test]
  fn test_continuity_empty_store_is_clean() {
    assert!(check_continuity(&[]).is_empty());
  }

  #[test]
  fn test_continuity_contiguous_range_is_clean() {
    let dates = vec![date(2024, 6, 1), date(2024, 6, 2), date(2024, 6, 3)];
    assert!(check_continuity(&dates).is_empty());
  }

  #[test]
  fn test_continuity_reports_missing_middle_day() {
    let dates = vec![date(2024, 6, 1), date(2024, 6, 3)];
    let findings = check_continuity(&dates);
    assert_eq!(findings.len(), 1);
    assert_eq!(findings[0].check, CheckKind::Continuity);
    assert!(findings[0].message.contains("2024-06-02"));
  }

  #[test]
  fn test_continuity_caps_listed_dates() {
    let dates = vec![date(2024, 1, 1), date(2024, 3, 1)];
    let findings = check_continuity(&dates);
    assert_eq!(findings.len(), 1);
    assert!(findings[0].message.contains("more)"));
  }

  #[test]
  fn test_completeness_in_band_is_clean() {
    let counts = vec![(date(2024, 6, 1), 350u64)];
    assert!(check_completeness(&counts, 100, 700).is_empty());
  }

  #[test]
  fn test_completeness_flags_both_sides_of_band() {
    let counts = vec![(date(2024, 6, 1), 12u64), (date(2024, 6, 2), 900u64)];
    let findings = check_completeness(&counts, 100, 700);
    assert_eq!(findings.len(), 2);
    assert!(findings[0].message.contains("12 symbols"));
    assert!(findings[1].message.contains("900 symbols"));
  }

  #[test]
  fn test_cross_check_high_match_is_clean() {
    let available = set(&["BTCUSDT", "ETHUSDT", "SOLUSDT"]);
    let live = set(&["BTCUSDT", "ETHUSDT", "SOLUSDT"]);
    let findings =
      check_cross_check(Some(date(2024, 6, 1)), &available, Ok(&live), 0.95);
    assert!(findings.is_empty());
  }

  #[test]
  fn test_cross_check_low_match_is_a_finding() {
    let available = set(&["BTCUSDT"]);
    let live = set(&["BTCUSDT", "ETHUSDT", "SOLUSDT"]);
    let findings =
      check_cross_check(Some(date(2024, 6, 1)), &available, Ok(&live), 0.95);
    assert_eq!(findings.len(), 1);
    assert!(findings[0].message.contains("1/3"));
  }

  #[test]
  fn test_cross_check_geo_blocked_is_skipped_not_failed() {
    let available = set(&["BTCUSDT"]);
    let error = bfa_core::Error::GeoBlocked { url: "https://fapi".to_string() };
    let findings =
      check_cross_check(Some(date(2024, 6, 1)), &available, Err(&error), 0.95);
    assert_eq!(findings.len(), 1);
    assert!(findings[0].message.starts_with("skipped"));
    assert!(findings[0].message.contains("451"));
  }

  #[test]
  fn test_cross_check_empty_store_is_clean() {
    let findings = check_cross_check(None, &BTreeSet::new(), Ok(&set(&["BTCUSDT"])), 0.95);
    assert!(findings.is_empty());
  }

  #[test]
  fn test_report_accumulates() {
    let mut report = ValidationReport::default();
    assert!(report.is_clean());
    report.extend(vec![Finding { check: CheckKind::Continuity, message: "x".to_string() }]);
    assert!(!report.is_clean());
    assert_eq!(report.findings.len(), 1);
  }

  #[test]
  fn test_finding_display() {
    let finding = Finding {
      check: CheckKind::Completeness,
      message: "2024-06-01: 12 symbols outside expected band [100, 700]".to_string(),
    };
    assert_eq!(
      finding.to_string(),
      "[completeness] 2024-06-01: 12 symbols outside expected band [100, 700]"
    );
  }
}
