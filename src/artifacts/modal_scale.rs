use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::core::{Color, SceneMapper, SceneRect, ScenePoint, TimeOracle, scene_y_to_price};
use crate::error::{AnnotError, AnnotResult};

/// One interval of a modal scale: a fractional or decimal ratio placed along
/// the scale's span, individually toggleable for display.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MusicalRatio {
    pub ratio: f64,
    pub numerator: Option<u32>,
    pub denominator: Option<u32>,
    pub enabled: bool,
}

impl MusicalRatio {
    pub fn from_fraction(numerator: u32, denominator: u32) -> AnnotResult<Self> {
        if denominator == 0 {
            return Err(AnnotError::InvalidData(
                "musical ratio denominator must be non-zero".to_owned(),
            ));
        }
        Ok(Self {
            ratio: f64::from(numerator) / f64::from(denominator),
            numerator: Some(numerator),
            denominator: Some(denominator),
            enabled: true,
        })
    }

    #[must_use]
    pub fn from_float(ratio: f64) -> Self {
        Self {
            ratio,
            numerator: None,
            denominator: None,
            enabled: true,
        }
    }

    /// `"{num}/{den}"` when both fraction parts are present, the float ratio
    /// otherwise.
    #[must_use]
    pub fn fraction_text(&self) -> String {
        match (self.numerator, self.denominator) {
            (Some(numerator), Some(denominator)) => format!("{numerator}/{denominator}"),
            _ => format!("{}", self.ratio),
        }
    }
}

/// Display strings and scene position derived for one enabled ratio.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RatioLabel {
    pub fraction_text: String,
    pub price_text: String,
    pub timestamp_text: String,
    pub point: ScenePoint,
}

/// A musical-ratio scale drawn along an arbitrary start→end segment.
///
/// Ratio ordering is significant: rotation reorders the entries to change
/// which interval anchors the scale, and the `reversed` flag flips both the
/// traversal direction and the roles of the two rotation operations without
/// touching storage order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModalScaleArtifact {
    pub name: String,
    pub read_only: bool,
    start: ScenePoint,
    end: ScenePoint,
    musical_ratios: Vec<MusicalRatio>,
    reversed: bool,
    pub bar_height: f64,
    pub font_size: f64,
    pub bar_color: Color,
    pub text_color: Color,
    labels: Vec<Option<RatioLabel>>,
}

impl ModalScaleArtifact {
    #[must_use]
    pub fn new(name: impl Into<String>, point: ScenePoint) -> Self {
        Self::with_ratios(name, point, default_ratios())
    }

    #[must_use]
    pub fn with_ratios(
        name: impl Into<String>,
        point: ScenePoint,
        musical_ratios: Vec<MusicalRatio>,
    ) -> Self {
        let labels = vec![None; musical_ratios.len()];
        Self {
            name: name.into(),
            read_only: false,
            start: point,
            end: point,
            musical_ratios,
            reversed: false,
            bar_height: 0.2,
            font_size: 8.0,
            bar_color: Color::rgb(0.0, 0.0, 0.0),
            text_color: Color::rgb(0.0, 0.0, 0.0),
            labels,
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
    pub fn musical_ratios(&self) -> &[MusicalRatio] {
        &self.musical_ratios
    }

    pub fn set_musical_ratios(&mut self, musical_ratios: Vec<MusicalRatio>) {
        self.labels = vec![None; musical_ratios.len()];
        self.musical_ratios = musical_ratios;
    }

    pub fn set_ratio_enabled(&mut self, index: usize, enabled: bool) -> AnnotResult<()> {
        let ratio = self.musical_ratios.get_mut(index).ok_or_else(|| {
            AnnotError::InvalidData(format!("musical ratio index {index} out of range"))
        })?;
        ratio.enabled = enabled;
        Ok(())
    }

    #[must_use]
    pub fn reversed(&self) -> bool {
        self.reversed
    }

    /// Labels derived by the last [`refresh`], parallel to the ratio list.
    /// Disabled ratios hold `None`.
    ///
    /// [`refresh`]: Self::refresh
    #[must_use]
    pub fn labels(&self) -> &[Option<RatioLabel>] {
        &self.labels
    }

    /// Scene position of the ratio at `index` along the start→end segment.
    ///
    /// X interpolates linearly by the ratio's fractional position in
    /// traversal order; Y follows the line connecting the two endpoints, so
    /// the scale need not be horizontal. Reversal flips traversal order.
    pub fn xy_for_ratio(&self, index: usize) -> AnnotResult<ScenePoint> {
        let len = self.musical_ratios.len();
        if index >= len {
            return Err(AnnotError::InvalidData(format!(
                "musical ratio index {index} out of range"
            )));
        }

        let traversal_index = if self.reversed { len - 1 - index } else { index };
        let t = if len > 1 {
            traversal_index as f64 / (len - 1) as f64
        } else {
            0.0
        };

        Ok(ScenePoint::new(
            self.start.x + t * (self.end.x - self.start.x),
            self.start.y + t * (self.end.y - self.start.y),
        ))
    }

    /// Rebuilds the per-ratio display labels.
    ///
    /// Enabled ratios get fraction, price, and timestamp text at their scene
    /// position; disabled ratios are hidden entirely.
    pub fn refresh<O: TimeOracle>(&mut self, mapper: &SceneMapper<O>) {
        let mut labels = Vec::with_capacity(self.musical_ratios.len());
        for (index, ratio) in self.musical_ratios.iter().enumerate() {
            if !ratio.enabled {
                labels.push(None);
                continue;
            }

            let point = match self.xy_for_ratio(index) {
                Ok(point) => point,
                Err(_) => {
                    labels.push(None);
                    continue;
                }
            };
            let timestamp_text = mapper
                .scene_x_to_timestamp(point.x)
                .map(|time| time.format("%Y-%m-%d %H:%M").to_string())
                .unwrap_or_default();

            labels.push(Some(RatioLabel {
                fraction_text: ratio.fraction_text(),
                price_text: format!("{:.2}", scene_y_to_price(point.y)),
                timestamp_text,
                point,
            }));
        }
        self.labels = labels;
    }

    /// Rotates the scale one step "down".
    ///
    /// Not reversed: the last entry moves to the front, repeating until the
    /// front entry is enabled. Reversed: behaves as [`rotate_up`] would when
    /// not reversed.
    ///
    /// [`rotate_up`]: Self::rotate_up
    pub fn rotate_down(&mut self) {
        if self.reversed {
            self.rotate_first_to_back();
        } else {
            self.rotate_last_to_front();
        }
    }

    /// Rotates the scale one step "up"; the mirror of [`rotate_down`].
    ///
    /// [`rotate_down`]: Self::rotate_down
    pub fn rotate_up(&mut self) {
        if self.reversed {
            self.rotate_last_to_front();
        } else {
            self.rotate_first_to_back();
        }
    }

    /// Toggles reversal. Storage order is untouched; only rotation roles and
    /// traversal order change.
    pub fn reverse(&mut self) {
        self.reversed = !self.reversed;
        debug!(name = %self.name, reversed = self.reversed, "reversed modal scale");
    }

    /// Swaps the endpoints when `start.x > end.x`. Label positions derive
    /// from the endpoints at the next [`refresh`].
    ///
    /// [`refresh`]: Self::refresh
    pub fn normalize_start_and_end(&mut self) {
        if self.start.x > self.end.x {
            std::mem::swap(&mut self.start, &mut self.end);
        }
    }

    pub fn translate(&mut self, dx: f64, dy: f64) {
        self.start = self.start.translated(dx, dy);
        self.end = self.end.translated(dx, dy);
    }

    #[must_use]
    pub fn scene_bounds(&self) -> SceneRect {
        SceneRect::from_corners(self.start, self.end)
    }

    fn has_enabled_ratio(&self) -> bool {
        self.musical_ratios.iter().any(|ratio| ratio.enabled)
    }

    fn rotate_last_to_front(&mut self) {
        let len = self.musical_ratios.len();
        if len == 0 || !self.has_enabled_ratio() {
            warn!(name = %self.name, "rotate skipped: no enabled musical ratios");
            return;
        }

        self.musical_ratios.rotate_right(1);
        // Bounded by len as a backstop even though an enabled entry exists.
        let mut steps = 0;
        while !self.musical_ratios[0].enabled && steps < len {
            self.musical_ratios.rotate_right(1);
            steps += 1;
        }
    }

    fn rotate_first_to_back(&mut self) {
        let len = self.musical_ratios.len();
        if len == 0 || !self.has_enabled_ratio() {
            warn!(name = %self.name, "rotate skipped: no enabled musical ratios");
            return;
        }

        self.musical_ratios.rotate_left(1);
        let mut steps = 0;
        while !self.musical_ratios[0].enabled && steps < len {
            self.musical_ratios.rotate_left(1);
            steps += 1;
        }
    }
}

/// Just-intonation major scale spanning one octave, the default ratio set.
#[must_use]
pub fn default_ratios() -> Vec<MusicalRatio> {
    [
        (1, 1),
        (9, 8),
        (5, 4),
        (4, 3),
        (3, 2),
        (5, 3),
        (15, 8),
        (2, 1),
    ]
    .into_iter()
    .map(|(numerator, denominator)| MusicalRatio {
        ratio: f64::from(numerator) / f64::from(denominator),
        numerator: Some(numerator),
        denominator: Some(denominator),
        enabled: true,
    })
    .collect()
}
