use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::core::{PriceBarIndex, SceneRect, ScenePoint};

/// Counts the price bars spanned between two chart positions.
///
/// Endpoint X values snap to the nearest integer scene unit
/// (half-away-from-zero), so the counter always anchors on whole bar slots.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BarCountArtifact {
    pub name: String,
    pub read_only: bool,
    start: ScenePoint,
    end: ScenePoint,
    bar_count: usize,
    label_text: String,
    label_anchor: ScenePoint,
}

impl BarCountArtifact {
    /// Creates a counter collapsed onto a single snapped point.
    #[must_use]
    pub fn new(name: impl Into<String>, point: ScenePoint) -> Self {
        let snapped = snap_x(point);
        let mut artifact = Self {
            name: name.into(),
            read_only: false,
            start: snapped,
            end: snapped,
            bar_count: 0,
            label_text: "0".to_owned(),
            label_anchor: snapped,
        };
        artifact.refresh_label_anchor();
        artifact
    }

    #[must_use]
    pub fn start_point(&self) -> ScenePoint {
        self.start
    }

    #[must_use]
    pub fn end_point(&self) -> ScenePoint {
        self.end
    }

    #[must_use]
    pub fn bar_count(&self) -> usize {
        self.bar_count
    }

    #[must_use]
    pub fn label_text(&self) -> &str {
        &self.label_text
    }

    #[must_use]
    pub fn label_anchor(&self) -> ScenePoint {
        self.label_anchor
    }

    /// Sets the start point, snapping X to the nearest whole scene unit.
    ///
    /// Callers holding a live index should follow up with [`recalculate`].
    ///
    /// [`recalculate`]: Self::recalculate
    pub fn set_start_point(&mut self, point: ScenePoint) {
        self.start = snap_x(point);
        self.refresh_label_anchor();
    }

    /// Sets the end point, snapping X to the nearest whole scene unit.
    pub fn set_end_point(&mut self, point: ScenePoint) {
        self.end = snap_x(point);
        self.refresh_label_anchor();
    }

    /// Recomputes the cached bar count from the index.
    ///
    /// A degenerate span (`start.x == end.x`) counts zero bars; an empty
    /// index degrades to zero as well.
    pub fn recalculate(&mut self, index: &dyn PriceBarIndex) -> usize {
        self.bar_count = if self.start.x == self.end.x {
            0
        } else {
            index.count_bars_between(self.start.x, self.end.x)
        };
        self.label_text = format!("{}", self.bar_count);
        trace!(name = %self.name, bar_count = self.bar_count, "recalculated bar count");
        self.bar_count
    }

    /// Swaps the endpoints when `start.x > end.x`, then refreshes the label
    /// anchor and count unconditionally so positional changes applied
    /// outside this call stay consistent.
    pub fn normalize_start_and_end(&mut self, index: &dyn PriceBarIndex) {
        if self.start.x > self.end.x {
            std::mem::swap(&mut self.start, &mut self.end);
        }
        self.refresh_label_anchor();
        self.recalculate(index);
    }

    pub fn translate(&mut self, dx: f64, dy: f64) {
        self.start = self.start.translated(dx, dy);
        self.end = self.end.translated(dx, dy);
        self.refresh_label_anchor();
    }

    #[must_use]
    pub fn scene_bounds(&self) -> SceneRect {
        SceneRect::from_corners(self.start, self.end)
    }

    fn refresh_label_anchor(&mut self) {
        self.label_anchor = ScenePoint::new(
            (self.start.x + self.end.x) / 2.0,
            (self.start.y + self.end.y) / 2.0,
        );
    }
}

fn snap_x(point: ScenePoint) -> ScenePoint {
    ScenePoint::new(point.x.round(), point.y)
}
