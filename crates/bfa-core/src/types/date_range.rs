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

use crate::error::{Error, Result};
use chrono::{Days, NaiveDate};

/// An inclusive range of UTC calendar dates, validated pre-flight:
/// `start <= end` and `start` not before the launch date.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
  start: NaiveDate,
  end: NaiveDate,
}

impl DateRange {
  pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self> {
    if start > end {
      return Err(Error::InvalidDateRange { start, end });
    }
    let launch = crate::futures_launch_date();
    if start < launch {
      return Err(Error::BeforeLaunch { date: start, launch });
    }
    Ok(DateRange { start, end })
  }

  /// The rolling window `[today - lookback, today - 1]` re-probed on every
  /// scheduled run. The window is clamped to the launch date so short
  /// histories near launch stay valid.
  pub fn rolling_window(today: NaiveDate, lookback_days: u32) -> Result<Self> {
    let end = today
      .checked_sub_days(Days::new(1))
      .ok_or(Error::InvalidDateRange { start: today, end: today })?;
    let start = today
      .checked_sub_days(Days::new(u64::from(lookback_days)))
      .ok_or(Error::InvalidDateRange { start: today, end: today })?;
    let start = start.max(crate::futures_launch_date());
    DateRange::new(start, end)
  }

  pub fn start(&self) -> NaiveDate {
    self.start
  }

  pub fn end(&self) -> NaiveDate {
    self.end
  }

  pub fn num_days(&self) -> u32 {
    (self.end - self.start).num_days() as u32 + 1
  }

  pub fn iter(&self) -> impl Iterator<Item = NaiveDate> {
    let end = self.end;
    std::iter::successors(Some(self.start), move |day| {
      day.checked_add_days(Days::new(1)).filter(|next| *next <= end)
    })
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
  }

  #[test]
  fn test_new_accepts_single_day() {
    let range = DateRange::new(date(2024, 6, 1), date(2024, 6, 1)).unwrap();
    assert_eq!(range.num_days(), 1);
  }

  #[test]
  fn test_new_rejects_inverted_range() {
    let result = DateRange::new(date(2024, 6, 2), date(2024, 6, 1));
    assert!(matches!(result, Err(Error::InvalidDateRange { .. })));
  }

  #[test]
  fn test_new_accepts_launch_date() {
    let launch = crate::futures_launch_date();
    assert!(DateRange::new(launch, launch).is_ok());
  }

  #[test]
  fn test_new_rejects_before_launch() {
    let result = DateRange::new(date(2019, 9, 7), date(2024, 6, 1));
    assert!(matches!(result, Err(Error::BeforeLaunch { .. })));
  }

  #[test]
  fn test_iter_is_contiguous_ascending() {
    let range = DateRange::new(date(2024, 5, 30), date(2024, 6, 2)).unwrap();
    let days: Vec<NaiveDate> = range.iter().collect();
    assert_eq!(
      days,
      vec![date(2024, 5, 30), date(2024, 5, 31), date(2024, 6, 1), date(2024, 6, 2)]
    );
  }

  #[test]
  fn test_rolling_window_default_shape() {
    let range = DateRange::rolling_window(date(2024, 6, 21), 20).unwrap();
    assert_eq!(range.start(), date(2024, 6, 1));
    assert_eq!(range.end(), date(2024, 6, 20));
    assert_eq!(range.num_days(), 20);
  }

  #[test]
  fn test_rolling_window_clamps_to_launch() {
    let range = DateRange::rolling_window(date(2019, 9, 10), 20).unwrap();
    assert_eq!(range.start(), crate::futures_launch_date());
    assert_eq!(range.end(), date(2019, 9, 9));
  }
}
