use std::cmp::Ordering;

use ordered_float::OrderedFloat;
use serde::{Deserialize, Serialize};
use tracing::{trace, warn};

use crate::core::{PriceBar, ScenePoint};

/// Read-only query surface over the set of currently plotted price bars.
///
/// The artifact layer only ever consumes this trait; hosts may back it with
/// their own scene collections. [`BarCollection`] is the shipped
/// implementation.
pub trait PriceBarIndex {
    /// The bar with the greatest high. Ties keep the first encountered bar.
    fn highest_bar(&self) -> Option<PriceBar>;

    /// The bar with the smallest low. Ties keep the first encountered bar.
    fn lowest_bar(&self) -> Option<PriceBar>;

    /// Counts bars whose X lies in `(min(a, b), max(a, b)]`.
    ///
    /// Half-open on the left, closed on the right, so the result is
    /// independent of argument order and the starting bar itself is not
    /// counted.
    fn count_bars_between(&self, a: f64, b: f64) -> usize;

    /// Scene X of the bar nearest to `x`, or `None` when no bars exist.
    fn nearest_bar_x(&self, x: f64) -> Option<f64>;

    /// Across all bars' open/high/low/close scene points, the single point
    /// closest to `query` by Euclidean distance.
    ///
    /// Ties keep the first bar in iteration order, then the earliest point
    /// in open, high, low, close evaluation order.
    fn closest_ohlc_scene_point(&self, query: ScenePoint) -> Option<ScenePoint>;

    fn is_empty(&self) -> bool;
}

/// Insertion-ordered bar storage with canonicalizing ingestion.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BarCollection {
    bars: Vec<PriceBar>,
}

impl BarCollection {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces stored bars with a canonicalized copy of `bars`:
    /// non-finite entries are dropped, remaining bars are stably sorted by
    /// X, and same-X duplicates keep the latest sample.
    pub fn set_bars(&mut self, bars: Vec<PriceBar>) {
        self.bars = canonicalize_bars(bars);
        trace!(count = self.bars.len(), "set price bars");
    }

    pub fn append_bar(&mut self, bar: PriceBar) {
        self.bars.push(bar);
        trace!(count = self.bars.len(), "append price bar");
    }

    pub fn clear(&mut self) {
        self.bars.clear();
    }

    #[must_use]
    pub fn bars(&self) -> &[PriceBar] {
        &self.bars
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.bars.len()
    }
}

impl PriceBarIndex for BarCollection {
    fn highest_bar(&self) -> Option<PriceBar> {
        let mut best: Option<PriceBar> = None;
        for bar in self.bars.iter().copied() {
            match best {
                Some(current) if !bar.has_higher_high_than(current) => {}
                _ => best = Some(bar),
            }
        }
        best
    }

    fn lowest_bar(&self) -> Option<PriceBar> {
        let mut best: Option<PriceBar> = None;
        for bar in self.bars.iter().copied() {
            match best {
                Some(current) if !bar.has_lower_low_than(current) => {}
                _ => best = Some(bar),
            }
        }
        best
    }

    fn count_bars_between(&self, a: f64, b: f64) -> usize {
        let (min_x, max_x) = if a <= b { (a, b) } else { (b, a) };
        self.bars
            .iter()
            .filter(|bar| bar.x > min_x && bar.x <= max_x)
            .count()
    }

    fn nearest_bar_x(&self, x: f64) -> Option<f64> {
        let mut best: Option<(OrderedFloat<f64>, f64)> = None;
        for bar in &self.bars {
            let dist = OrderedFloat((bar.x - x).abs());
            match best {
                Some((current, _)) if current <= dist => {}
                _ => best = Some((dist, bar.x)),
            }
        }
        best.map(|(_, bar_x)| bar_x)
    }

    fn closest_ohlc_scene_point(&self, query: ScenePoint) -> Option<ScenePoint> {
        let mut best: Option<(OrderedFloat<f64>, ScenePoint)> = None;
        for bar in &self.bars {
            for point in bar.ohlc_scene_points() {
                let dist = OrderedFloat(point.distance_to(query));
                match best {
                    Some((current, _)) if current <= dist => {}
                    _ => best = Some((dist, point)),
                }
            }
        }
        best.map(|(_, point)| point)
    }

    fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }
}

fn canonicalize_bars(mut bars: Vec<PriceBar>) -> Vec<PriceBar> {
    let original_len = bars.len();
    bars.retain(|bar| bar.x.is_finite());
    bars.sort_by(|a, b| a.x.total_cmp(&b.x));

    let mut deduped: Vec<PriceBar> = Vec::with_capacity(bars.len());
    let mut duplicate_count = 0_usize;
    for bar in bars {
        if let Some(last) = deduped.last_mut() {
            if bar.x.total_cmp(&last.x) == Ordering::Equal {
                *last = bar;
                duplicate_count += 1;
                continue;
            }
        }
        deduped.push(bar);
    }

    let filtered_count = original_len.saturating_sub(deduped.len() + duplicate_count);
    if filtered_count > 0 || duplicate_count > 0 {
        warn!(
            filtered_count,
            duplicate_count,
            canonical_count = deduped.len(),
            "canonicalized bars on set_bars"
        );
    }
    deduped
}
