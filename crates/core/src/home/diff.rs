//! Field-level home position diff
//!
//! Each field is rendered at a fixed precision and compared character by
//! character, so a UI can highlight from the first differing digit.

use alloc::format;
use alloc::string::String;

use super::HomePosition;

/// Decimal places used for latitude and longitude (1e-7 degree resolution).
pub const LAT_LON_DECIMALS: usize = 7;
/// Decimal places used for altitude.
pub const ALT_DECIMALS: usize = 2;

/// One compared field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldDiff {
    /// Planned value text, empty when no home is planned
    pub planned: String,
    pub candidate: String,
    /// Index of the first differing character, `None` when identical
    pub divergence: Option<usize>,
}

impl FieldDiff {
    pub fn new(planned: String, candidate: String) -> Self {
        let divergence = divergence_index(&planned, &candidate);
        Self {
            planned,
            candidate,
            divergence,
        }
    }

    pub fn is_changed(&self) -> bool {
        self.divergence.is_some()
    }
}

/// Per-field comparison of planned and candidate home.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HomeDiff {
    pub lat: FieldDiff,
    pub lon: FieldDiff,
    pub alt: FieldDiff,
}

impl HomeDiff {
    pub fn compute(planned: Option<&HomePosition>, candidate: &HomePosition) -> Self {
        let text = |f: fn(&HomePosition) -> String| planned.map(f).unwrap_or_default();
        Self {
            lat: FieldDiff::new(text(format_lat), format_lat(candidate)),
            lon: FieldDiff::new(text(format_lon), format_lon(candidate)),
            alt: FieldDiff::new(text(format_alt), format_alt(candidate)),
        }
    }

    pub fn is_identical(&self) -> bool {
        !self.lat.is_changed() && !self.lon.is_changed() && !self.alt.is_changed()
    }
}

/// Index of the first character at which `a` and `b` differ.
///
/// When one string is a prefix of the other the divergence is at the end of
/// the shorter one.
pub fn divergence_index(a: &str, b: &str) -> Option<usize> {
    let mut a_chars = a.chars();
    let mut b_chars = b.chars();
    let mut index = 0;
    loop {
        match (a_chars.next(), b_chars.next()) {
            (None, None) => return None,
            (Some(x), Some(y)) if x == y => index += 1,
            _ => return Some(index),
        }
    }
}

/// Render scaled degrees (1e-7) exactly, without float rounding.
pub fn format_scaled_degrees(value: i32) -> String {
    let sign = if value < 0 { "-" } else { "" };
    let abs = value.unsigned_abs();
    format!("{}{}.{:07}", sign, abs / 10_000_000, abs % 10_000_000)
}

fn format_lat(home: &HomePosition) -> String {
    format_scaled_degrees(home.lat)
}

fn format_lon(home: &HomePosition) -> String {
    format_scaled_degrees(home.lon)
}

fn format_alt(home: &HomePosition) -> String {
    format!("{:.*}", ALT_DECIMALS, home.alt)
}
