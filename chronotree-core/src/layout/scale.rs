//! Time Axis
//!
//! The year extent of a tree and the linear scale that turns years into
//! horizontal pixel positions.

use serde::Serialize;

/// Extent used when no node carries a year.
pub const DEFAULT_YEAR_EXTENT: YearExtent = YearExtent {
    start: 1940,
    end: 2026,
};

/// Years between axis ticks unless a caller asks otherwise.
pub const DEFAULT_TICK_STEP: i32 = 5;

/// Years added before the earliest node.
const LEAD_YEARS: i32 = 5;

/// Years added after the latest node.
const TRAIL_YEARS: i32 = 2;

/// Inclusive range of years covered by the time axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct YearExtent {
    pub start: i32,
    pub end: i32,
}

impl YearExtent {
    /// Compute the padded extent of a set of years.
    ///
    /// The earliest year gets five years of lead so the root never touches
    /// the axis edge; the latest gets two years of room.
    pub fn from_years(years: impl IntoIterator<Item = i32>) -> Self {
        let mut bounds: Option<(i32, i32)> = None;
        for year in years {
            bounds = Some(match bounds {
                Some((lo, hi)) => (lo.min(year), hi.max(year)),
                None => (year, year),
            });
        }

        match bounds {
            Some((lo, hi)) => Self {
                start: lo.saturating_sub(LEAD_YEARS),
                end: hi.saturating_add(TRAIL_YEARS),
            },
            None => DEFAULT_YEAR_EXTENT,
        }
    }

    /// Number of years spanned.
    pub fn span(&self) -> i32 {
        self.end.saturating_sub(self.start)
    }

    /// Check if a year lies inside the extent.
    pub fn contains(&self, year: i32) -> bool {
        (self.start..=self.end).contains(&year)
    }

    /// The extent as `[start, end]`.
    pub fn as_array(&self) -> [i32; 2] {
        [self.start, self.end]
    }
}

/// Linear mapping from a year domain onto a pixel range.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TimeScale {
    domain: (f64, f64),
    range: (f64, f64),
}

impl TimeScale {
    /// Map `extent` onto `[range_start, range_end]`.
    pub fn new(extent: YearExtent, range_start: f64, range_end: f64) -> Self {
        Self {
            domain: (f64::from(extent.start), f64::from(extent.end)),
            range: (range_start, range_end),
        }
    }

    /// Position of a (possibly fractional) year.
    ///
    /// A degenerate domain maps everything to the middle of the range.
    pub fn apply(&self, year: f64) -> f64 {
        let (d0, d1) = self.domain;
        let (r0, r1) = self.range;
        let t = if d1 == d0 { 0.5 } else { (year - d0) / (d1 - d0) };
        r0 + t * (r1 - r0)
    }

    /// Position of a whole year.
    pub fn year(&self, year: i32) -> f64 {
        self.apply(f64::from(year))
    }

    /// The (fractional) year at a position.
    pub fn invert(&self, x: f64) -> f64 {
        let (d0, d1) = self.domain;
        let (r0, r1) = self.range;
        let t = if r1 == r0 { 0.5 } else { (x - r0) / (r1 - r0) };
        d0 + t * (d1 - d0)
    }

    /// The pixel range `(start, end)`.
    pub fn range(&self) -> (f64, f64) {
        self.range
    }
}

/// One labelled mark on the time axis.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TimelineTick {
    pub year: i32,
    pub x: f64,
}

/// Ticks at every multiple of `step` inside `extent`.
///
/// Ticks use the same scale as nodes, so they are pixel-aligned with them.
/// A non-positive step yields no ticks.
pub fn timeline_ticks(extent: YearExtent, scale: &TimeScale, step: i32) -> Vec<TimelineTick> {
    if step <= 0 {
        return Vec::new();
    }
    let first = extent.start.div_euclid(step) * step;
    let first = if first < extent.start {
        match first.checked_add(step) {
            Some(next) => next,
            None => return Vec::new(),
        }
    } else {
        first
    };

    (first..=extent.end)
        .step_by(step as usize)
        .map(|year| TimelineTick {
            year,
            x: scale.year(year),
        })
        .collect()
}
