use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::core::{SceneMapper, ScenePoint, TimeOracle, scene_y_to_price};

/// Callout describing the price and time at a chart point.
///
/// `info_point` is the described chart location; `position` anchors the text
/// box, which the user may drag independently. Five flags select which
/// derived lines appear, composed in a fixed order by [`refresh`].
///
/// [`refresh`]: Self::refresh
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceTimeInfoArtifact {
    pub name: String,
    pub read_only: bool,
    pub info_point: ScenePoint,
    pub position: ScenePoint,
    pub show_timestamp: bool,
    pub show_price: bool,
    pub show_sqrt_price: bool,
    pub show_elapsed_since_birth: bool,
    pub show_sqrt_elapsed: bool,
    /// Scene X of the optional natal reference; elapsed lines are omitted
    /// entirely without it.
    pub birth_x: Option<f64>,
    info_text: String,
}

impl PriceTimeInfoArtifact {
    #[must_use]
    pub fn new(name: impl Into<String>, info_point: ScenePoint) -> Self {
        Self {
            name: name.into(),
            read_only: false,
            info_point,
            position: info_point,
            show_timestamp: true,
            show_price: true,
            show_sqrt_price: false,
            show_elapsed_since_birth: false,
            show_sqrt_elapsed: false,
            birth_x: None,
            info_text: String::new(),
        }
    }

    /// The multi-line callout text composed by the last [`refresh`].
    ///
    /// [`refresh`]: Self::refresh
    #[must_use]
    pub fn info_text(&self) -> &str {
        &self.info_text
    }

    /// Elapsed time between the natal reference and the info point, in
    /// scene days. `None` without a birth reference.
    #[must_use]
    pub fn elapsed_days(&self) -> Option<f64> {
        self.birth_x.map(|birth_x| self.info_point.x - birth_x)
    }

    /// Recomposes the callout text.
    ///
    /// Lines are checked in fixed order: timestamp, price, sqrt(price),
    /// elapsed days, sqrt(elapsed days). Square-root lines are omitted when
    /// their operand is negative.
    pub fn refresh<O: TimeOracle>(&mut self, mapper: &SceneMapper<O>) {
        let mut lines: SmallVec<[String; 5]> = SmallVec::new();
        let price = scene_y_to_price(self.info_point.y);

        if self.show_timestamp {
            if let Ok(time) = mapper.scene_x_to_timestamp(self.info_point.x) {
                lines.push(format!("t={}", time.format("%Y-%m-%d %H:%M")));
            }
        }
        if self.show_price {
            lines.push(format!("p={price:.2}"));
        }
        if self.show_sqrt_price && price >= 0.0 {
            lines.push(format!("sqrt(p)={:.2}", price.sqrt()));
        }
        if let Some(elapsed) = self.elapsed_days() {
            if self.show_elapsed_since_birth {
                lines.push(format!("elapsed={elapsed:.2} CD"));
            }
            if self.show_sqrt_elapsed && elapsed >= 0.0 {
                lines.push(format!("sqrt(elapsed)={:.2}", elapsed.sqrt()));
            }
        }

        self.info_text = lines.join("\n");
    }

    pub fn translate(&mut self, dx: f64, dy: f64) {
        self.info_point = self.info_point.translated(dx, dy);
        self.position = self.position.translated(dx, dy);
    }
}
