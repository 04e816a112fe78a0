use chrono::offset::Offset;
use chrono::{DateTime, FixedOffset, Utc};
use serde::{Deserialize, Serialize};

use crate::core::primitives::SECONDS_PER_DAY;
use crate::error::{AnnotError, AnnotResult};

/// Bidirectional scene-X / timestamp conversion seam.
///
/// The mapper delegates time conversion to this trait so hosts can plug in
/// their own calendar backend (for example an ephemeris-driven one). The
/// crate ships [`EpochDayOracle`].
///
/// Oracles are stateless conversion strategies, so the trait requires
/// `Send + Sync`; bulk recompute may read the mapper from worker threads.
pub trait TimeOracle: Send + Sync {
    fn scene_x_to_timestamp(
        &self,
        x: f64,
        timezone: FixedOffset,
    ) -> AnnotResult<DateTime<FixedOffset>>;

    fn timestamp_to_scene_x(&self, time: DateTime<FixedOffset>) -> f64;
}

/// Default time oracle: scene X is fractional days since the Unix epoch.
///
/// Conversion is instant-based, so the configured timezone only changes how
/// the resulting timestamp is expressed, never which instant it names.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EpochDayOracle;

impl TimeOracle for EpochDayOracle {
    fn scene_x_to_timestamp(
        &self,
        x: f64,
        timezone: FixedOffset,
    ) -> AnnotResult<DateTime<FixedOffset>> {
        if !x.is_finite() {
            return Err(AnnotError::InvalidData(
                "scene x must be finite".to_owned(),
            ));
        }

        let millis = (x * SECONDS_PER_DAY * 1000.0).round();
        if millis < i64::MIN as f64 || millis > i64::MAX as f64 {
            return Err(AnnotError::InvalidData(format!(
                "scene x {x} is outside the representable time range"
            )));
        }

        DateTime::<Utc>::from_timestamp_millis(millis as i64)
            .map(|time| time.with_timezone(&timezone))
            .ok_or_else(|| {
                AnnotError::InvalidData(format!(
                    "scene x {x} is outside the representable time range"
                ))
            })
    }

    fn timestamp_to_scene_x(&self, time: DateTime<FixedOffset>) -> f64 {
        time.timestamp_millis() as f64 / 1000.0 / SECONDS_PER_DAY
    }
}

/// Pure scene/domain coordinate transform.
///
/// X conversion goes through the configured [`TimeOracle`]; Y conversion is
/// price negation with signed-zero normalization. The mapper carries no
/// state beyond the oracle and the timezone.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SceneMapper<O = EpochDayOracle> {
    oracle: O,
    timezone: FixedOffset,
}

impl SceneMapper<EpochDayOracle> {
    #[must_use]
    pub fn new(timezone: FixedOffset) -> Self {
        Self {
            oracle: EpochDayOracle,
            timezone,
        }
    }

    #[must_use]
    pub fn utc() -> Self {
        Self::new(Utc.fix())
    }
}

impl<O: TimeOracle> SceneMapper<O> {
    #[must_use]
    pub fn with_oracle(oracle: O, timezone: FixedOffset) -> Self {
        Self { oracle, timezone }
    }

    #[must_use]
    pub fn timezone(&self) -> FixedOffset {
        self.timezone
    }

    pub fn scene_x_to_timestamp(&self, x: f64) -> AnnotResult<DateTime<FixedOffset>> {
        self.oracle.scene_x_to_timestamp(x, self.timezone)
    }

    #[must_use]
    pub fn timestamp_to_scene_x(&self, time: DateTime<FixedOffset>) -> f64 {
        self.oracle.timestamp_to_scene_x(time)
    }
}

/// Scene Y for a price. `price == 0.0` maps to `0.0`, never `-0.0`.
#[must_use]
pub fn price_to_scene_y(price: f64) -> f64 {
    if price == 0.0 { 0.0 } else { -price }
}

/// Price for a scene Y. `y == 0.0` maps to `0.0`, never `-0.0`.
#[must_use]
pub fn scene_y_to_price(y: f64) -> f64 {
    if y == 0.0 { 0.0 } else { -y }
}
