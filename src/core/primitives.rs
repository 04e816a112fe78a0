use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;

use crate::error::{AnnotError, AnnotResult};

pub const SECONDS_PER_DAY: f64 = 86_400.0;

pub fn decimal_to_f64(value: Decimal, field_name: &str) -> AnnotResult<f64> {
    value.to_f64().ok_or_else(|| {
        AnnotError::InvalidData(format!("{field_name} cannot be represented as f64"))
    })
}

/// Converts a UTC timestamp to fractional days since the Unix epoch.
#[must_use]
pub fn datetime_to_epoch_days(time: DateTime<Utc>) -> f64 {
    time.timestamp_millis() as f64 / 1000.0 / SECONDS_PER_DAY
}
