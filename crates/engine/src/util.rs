//! Internal helpers for model validation and conversion.
//!
//! These utilities are **not** part of the public API.

use crate::MoneyCents;

/// Trim optional free text, mapping blank input to `None`.
pub(crate) fn normalize_optional_text(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(ToString::to_string)
}

/// Stored caps are nullable; both `NULL` and `0` mean "no limit configured".
pub(crate) fn cap_from_column(value: Option<i64>) -> Option<MoneyCents> {
    value.map(MoneyCents::new)
}

pub(crate) fn cap_to_column(value: Option<MoneyCents>) -> Option<i64> {
    value.map(MoneyCents::cents)
}
