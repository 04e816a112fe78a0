mod engine;
mod events;

pub use engine::AnnotationEngine;
pub use events::{AnnotationEvent, AnnotationObserver};

use serde::{Deserialize, Serialize};

use crate::core::{Color, FontSpec};
use crate::error::{AnnotError, AnnotResult};
use crate::interaction::ArtifactDefaults;

/// Engine configuration.
///
/// Every knob the original scattered through global settings reads lives
/// here explicitly, validated once at engine construction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnnotationEngineConfig {
    /// Seconds east of UTC for timestamp display.
    pub timezone_offset_seconds: i32,
    pub default_color: Color,
    pub default_text_color: Color,
    pub default_font: FontSpec,
    pub pen_width: f64,
    pub modal_scale_bar_height: f64,
    pub text_x_scale: f64,
    pub text_y_scale: f64,
    /// Initial snap-mode setting for the price/time info tool.
    pub snap_enabled_default: bool,
    /// Fraction of a ranged artifact's span, from each end, that grabs an
    /// edge instead of the body.
    pub edge_band_ratio: f64,
    /// Scene-space distance within which a pointer press hits an artifact.
    pub hit_tolerance: f64,
}

impl Default for AnnotationEngineConfig {
    fn default() -> Self {
        Self {
            timezone_offset_seconds: 0,
            default_color: Color::rgb(0.0, 0.0, 0.0),
            default_text_color: Color::rgb(0.0, 0.0, 0.0),
            default_font: FontSpec::new("Sans", 10.0),
            pen_width: 1.0,
            modal_scale_bar_height: 0.2,
            text_x_scale: 1.0,
            text_y_scale: 1.0,
            snap_enabled_default: true,
            edge_band_ratio: 0.2,
            hit_tolerance: 1.0,
        }
    }
}

impl AnnotationEngineConfig {
    pub fn validate(&self) -> AnnotResult<()> {
        self.default_color.validate()?;
        self.default_text_color.validate()?;
        self.default_font.validate()?;

        for (value, name) in [
            (self.pen_width, "pen_width"),
            (self.modal_scale_bar_height, "modal_scale_bar_height"),
            (self.text_x_scale, "text_x_scale"),
            (self.text_y_scale, "text_y_scale"),
            (self.hit_tolerance, "hit_tolerance"),
        ] {
            if !value.is_finite() || value <= 0.0 {
                return Err(AnnotError::InvalidData(format!(
                    "config `{name}` must be finite and > 0"
                )));
            }
        }

        if !self.edge_band_ratio.is_finite() || !(0.0..=0.5).contains(&self.edge_band_ratio) {
            return Err(AnnotError::InvalidData(
                "config `edge_band_ratio` must be finite and in [0, 0.5]".to_owned(),
            ));
        }

        Ok(())
    }

    pub(crate) fn artifact_defaults(&self) -> ArtifactDefaults {
        ArtifactDefaults {
            color: self.default_color,
            text_color: self.default_text_color,
            font: self.default_font.clone(),
            modal_scale_bar_height: self.modal_scale_bar_height,
            text_x_scale: self.text_x_scale,
            text_y_scale: self.text_y_scale,
        }
    }
}
