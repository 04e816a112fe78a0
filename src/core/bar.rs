use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::core::ScenePoint;
use crate::core::primitives::{datetime_to_epoch_days, decimal_to_f64};
use crate::error::{AnnotError, AnnotResult};

/// One plotted price bar: a scene X position plus its OHLC prices.
///
/// Prices are stored in domain units; scene Y for any of the four price
/// points is obtained through [`price_to_scene_y`].
///
/// [`price_to_scene_y`]: crate::core::price_to_scene_y
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PriceBar {
    pub x: f64,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
}

impl PriceBar {
    /// Builds a validated price bar from raw floating values.
    ///
    /// Invariants:
    /// - all values are finite
    /// - `low <= high`
    /// - `open` and `close` are within `[low, high]`
    pub fn new(x: f64, open: f64, high: f64, low: f64, close: f64) -> AnnotResult<Self> {
        if !x.is_finite()
            || !open.is_finite()
            || !high.is_finite()
            || !low.is_finite()
            || !close.is_finite()
        {
            return Err(AnnotError::InvalidData(
                "price bar values must be finite".to_owned(),
            ));
        }

        if low > high {
            return Err(AnnotError::InvalidData(
                "price bar low must be <= high".to_owned(),
            ));
        }

        if open < low || open > high || close < low || close > high {
            return Err(AnnotError::InvalidData(
                "price bar open/close must be within low/high range".to_owned(),
            ));
        }

        Ok(Self {
            x,
            open,
            high,
            low,
            close,
        })
    }

    /// Converts strongly-typed temporal/decimal input into a validated bar.
    ///
    /// The timestamp maps to scene X as fractional days since the Unix epoch.
    pub fn from_decimal_time(
        time: DateTime<Utc>,
        open: Decimal,
        high: Decimal,
        low: Decimal,
        close: Decimal,
    ) -> AnnotResult<Self> {
        Self::new(
            datetime_to_epoch_days(time),
            decimal_to_f64(open, "open")?,
            decimal_to_f64(high, "high")?,
            decimal_to_f64(low, "low")?,
            decimal_to_f64(close, "close")?,
        )
    }

    /// Midpoint of the bar's traded range.
    #[must_use]
    pub fn midpoint(self) -> f64 {
        (self.high + self.low) / 2.0
    }

    #[must_use]
    pub fn has_higher_high_than(self, other: PriceBar) -> bool {
        self.high > other.high
    }

    #[must_use]
    pub fn has_lower_low_than(self, other: PriceBar) -> bool {
        self.low < other.low
    }

    /// The bar's four characteristic scene points in open, high, low, close
    /// evaluation order.
    #[must_use]
    pub fn ohlc_scene_points(self) -> [ScenePoint; 4] {
        [
            ScenePoint::new(self.x, crate::core::price_to_scene_y(self.open)),
            ScenePoint::new(self.x, crate::core::price_to_scene_y(self.high)),
            ScenePoint::new(self.x, crate::core::price_to_scene_y(self.low)),
            ScenePoint::new(self.x, crate::core::price_to_scene_y(self.close)),
        ]
    }
}
