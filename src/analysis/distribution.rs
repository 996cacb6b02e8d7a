// ABOUTME: Buckets daily records into ten fixed-width in-range percentage bands
// ABOUTME: Produces the band-to-day-count mapping consumed by distribution charts
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Glucocheck

use std::collections::BTreeMap;
use std::fmt::{self, Display, Formatter};

use crate::models::DailyRecord;

/// One of ten fixed in-range percentage bands
///
/// Bands are half-open, `[0, 10)` through `[80, 90)`, except the last:
/// `[90, 100]` is closed on both ends because the percentage domain is
/// inclusive at 100.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum RangeBand {
    /// `[0, 10)` percent in range
    P0To10,
    /// `[10, 20)` percent in range
    P10To20,
    /// `[20, 30)` percent in range
    P20To30,
    /// `[30, 40)` percent in range
    P30To40,
    /// `[40, 50)` percent in range
    P40To50,
    /// `[50, 60)` percent in range
    P50To60,
    /// `[60, 70)` percent in range
    P60To70,
    /// `[70, 80)` percent in range
    P70To80,
    /// `[80, 90)` percent in range
    P80To90,
    /// `[90, 100]` percent in range
    P90To100,
}

impl RangeBand {
    /// All bands in ascending order
    pub const ALL: [Self; 10] = [
        Self::P0To10,
        Self::P10To20,
        Self::P20To30,
        Self::P30To40,
        Self::P40To50,
        Self::P50To60,
        Self::P60To70,
        Self::P70To80,
        Self::P80To90,
        Self::P90To100,
    ];

    /// The band a percentage falls into
    ///
    /// The caller guarantees `percentage` is in `[0, 100]`; the daily
    /// aggregator cannot produce anything else. Out-of-domain input is a
    /// logic error and trips the debug assertion rather than being
    /// silently misfiled.
    #[must_use]
    pub fn for_percentage(percentage: f64) -> Self {
        debug_assert!(
            (0.0..=100.0).contains(&percentage),
            "in-range percentage out of domain: {percentage}"
        );
        match percentage {
            p if p < 10.0 => Self::P0To10,
            p if p < 20.0 => Self::P10To20,
            p if p < 30.0 => Self::P20To30,
            p if p < 40.0 => Self::P30To40,
            p if p < 50.0 => Self::P40To50,
            p if p < 60.0 => Self::P50To60,
            p if p < 70.0 => Self::P60To70,
            p if p < 80.0 => Self::P70To80,
            p if p < 90.0 => Self::P80To90,
            _ => Self::P90To100,
        }
    }

    /// Inclusive lower and upper percentage labels of the band
    #[must_use]
    pub const fn bounds(self) -> (u8, u8) {
        match self {
            Self::P0To10 => (0, 10),
            Self::P10To20 => (10, 20),
            Self::P20To30 => (20, 30),
            Self::P30To40 => (30, 40),
            Self::P40To50 => (40, 50),
            Self::P50To60 => (50, 60),
            Self::P60To70 => (60, 70),
            Self::P70To80 => (70, 80),
            Self::P80To90 => (80, 90),
            Self::P90To100 => (90, 100),
        }
    }
}

impl Display for RangeBand {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let (low, high) = self.bounds();
        write!(f, "{low}-{high}%")
    }
}

/// Count days per in-range percentage band
///
/// Every band is present in the output, zero-count bands included, so the
/// presentation layer can render relative widths without special-casing
/// gaps. The counts always sum to the number of input records.
#[must_use]
pub fn bucketize(records: &[DailyRecord]) -> BTreeMap<RangeBand, usize> {
    let mut bands: BTreeMap<RangeBand, usize> =
        RangeBand::ALL.iter().map(|band| (*band, 0)).collect();
    for record in records {
        let band = RangeBand::for_percentage(record.in_range_percentage);
        if let Some(count) = bands.get_mut(&band) {
            *count += 1;
        }
    }
    bands
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn band_edges() {
        assert_eq!(RangeBand::for_percentage(0.0), RangeBand::P0To10);
        assert_eq!(RangeBand::for_percentage(9.999), RangeBand::P0To10);
        assert_eq!(RangeBand::for_percentage(10.0), RangeBand::P10To20);
        assert_eq!(RangeBand::for_percentage(89.999), RangeBand::P80To90);
        assert_eq!(RangeBand::for_percentage(90.0), RangeBand::P90To100);
        assert_eq!(RangeBand::for_percentage(100.0), RangeBand::P90To100);
    }

    #[test]
    #[should_panic(expected = "out of domain")]
    #[cfg(debug_assertions)]
    fn out_of_domain_percentage_fails_loudly() {
        let _ = RangeBand::for_percentage(100.5);
    }

    #[test]
    fn display_labels() {
        assert_eq!(RangeBand::P0To10.to_string(), "0-10%");
        assert_eq!(RangeBand::P90To100.to_string(), "90-100%");
    }
}
