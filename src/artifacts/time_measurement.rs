use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::core::{PriceBarIndex, SceneMapper, SceneRect, ScenePoint, TimeOracle, price_to_scene_y};

/// Measures the horizontal extent between two chart positions in bars,
/// calendar days, and weeks.
///
/// Unlike [`BarCountArtifact`], endpoints keep sub-day X precision.
///
/// [`BarCountArtifact`]: crate::artifacts::BarCountArtifact
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimeMeasurementArtifact {
    pub name: String,
    pub read_only: bool,
    start: ScenePoint,
    end: ScenePoint,
    num_price_bars: usize,
    num_calendar_days: f64,
    num_weeks: f64,
    bars_label: String,
    calendar_days_label: String,
    weeks_label: String,
    draw_guide_lines: bool,
}

impl TimeMeasurementArtifact {
    #[must_use]
    pub fn new(name: impl Into<String>, point: ScenePoint) -> Self {
        Self {
            name: name.into(),
            read_only: false,
            start: point,
            end: point,
            num_price_bars: 0,
            num_calendar_days: 0.0,
            num_weeks: 0.0,
            bars_label: "0 Bars".to_owned(),
            calendar_days_label: "0.00 CD".to_owned(),
            weeks_label: "0.00 Weeks".to_owned(),
            draw_guide_lines: true,
        }
    }

    #[must_use]
    pub fn start_point(&self) -> ScenePoint {
        self.start
    }

    #[must_use]
    pub fn end_point(&self) -> ScenePoint {
        self.end
    }

    pub fn set_start_point(&mut self, point: ScenePoint) {
        self.start = point;
    }

    pub fn set_end_point(&mut self, point: ScenePoint) {
        self.end = point;
    }

    #[must_use]
    pub fn num_price_bars(&self) -> usize {
        self.num_price_bars
    }

    #[must_use]
    pub fn num_calendar_days(&self) -> f64 {
        self.num_calendar_days
    }

    #[must_use]
    pub fn num_weeks(&self) -> f64 {
        self.num_weeks
    }

    #[must_use]
    pub fn bars_label(&self) -> &str {
        &self.bars_label
    }

    #[must_use]
    pub fn calendar_days_label(&self) -> &str {
        &self.calendar_days_label
    }

    #[must_use]
    pub fn weeks_label(&self) -> &str {
        &self.weeks_label
    }

    #[must_use]
    pub fn draw_guide_lines(&self) -> bool {
        self.draw_guide_lines
    }

    /// Toggles the vertical guide lines at the two endpoints.
    ///
    /// A display hint for the renderer, but it widens [`scene_bounds`]
    /// to the plotted high/low extremes while enabled.
    ///
    /// [`scene_bounds`]: Self::scene_bounds
    pub fn set_draw_guide_lines(&mut self, draw: bool) {
        self.draw_guide_lines = draw;
    }

    /// Recomputes the cached bar count and time measurements.
    ///
    /// The bar count uses the same between-points rule as the bar counter.
    /// Calendar days are measured through the mapper as whole days plus a
    /// fractional-seconds remainder; weeks are calendar days over seven.
    pub fn recalculate<O: TimeOracle>(
        &mut self,
        index: &dyn PriceBarIndex,
        mapper: &SceneMapper<O>,
    ) {
        self.num_price_bars = if self.start.x == self.end.x {
            0
        } else {
            index.count_bars_between(self.start.x, self.end.x)
        };

        self.num_calendar_days = match (
            mapper.scene_x_to_timestamp(self.start.x),
            mapper.scene_x_to_timestamp(self.end.x),
        ) {
            (Ok(start_ts), Ok(end_ts)) => {
                let elapsed = end_ts.signed_duration_since(start_ts);
                elapsed.num_days() as f64
                    + (elapsed.num_milliseconds() - elapsed.num_days() * 86_400_000) as f64
                        / 86_400_000.0
            }
            _ => 0.0,
        };
        self.num_weeks = self.num_calendar_days / 7.0;

        self.bars_label = format!("{} Bars", self.num_price_bars);
        self.calendar_days_label = format!("{:.2} CD", self.num_calendar_days);
        self.weeks_label = format!("{:.2} Weeks", self.num_weeks);
        trace!(
            name = %self.name,
            bars = self.num_price_bars,
            calendar_days = self.num_calendar_days,
            "recalculated time measurement"
        );
    }

    /// Swaps the endpoints when `start.x > end.x`, then recomputes the
    /// cached measurements unconditionally.
    pub fn normalize_start_and_end(&mut self, index: &dyn PriceBarIndex) {
        if self.start.x > self.end.x {
            std::mem::swap(&mut self.start, &mut self.end);
        }
        self.num_price_bars = if self.start.x == self.end.x {
            0
        } else {
            index.count_bars_between(self.start.x, self.end.x)
        };
        self.bars_label = format!("{} Bars", self.num_price_bars);
    }

    pub fn translate(&mut self, dx: f64, dy: f64) {
        self.start = self.start.translated(dx, dy);
        self.end = self.end.translated(dx, dy);
    }

    /// Bounding rectangle in scene coordinates.
    ///
    /// While guide lines are shown, or while the artifact is selected, the
    /// box stretches vertically to the plotted highest-high and lowest-low
    /// so the guides stay inside the host's repaint region.
    #[must_use]
    pub fn scene_bounds(&self, index: &dyn PriceBarIndex, selected: bool) -> SceneRect {
        let mut bounds = SceneRect::from_corners(self.start, self.end);
        if !(self.draw_guide_lines || selected) {
            return bounds;
        }

        if let Some(highest) = index.highest_bar() {
            bounds = bounds.including(ScenePoint::new(self.start.x, price_to_scene_y(highest.high)));
        }
        if let Some(lowest) = index.lowest_bar() {
            bounds = bounds.including(ScenePoint::new(self.start.x, price_to_scene_y(lowest.low)));
        }
        bounds
    }
}
