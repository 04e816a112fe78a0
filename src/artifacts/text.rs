use serde::{Deserialize, Serialize};

use crate::core::{Color, FontSpec, ScenePoint};
use crate::error::{AnnotError, AnnotResult};

/// Free-floating text placed at a scene position.
///
/// Pure data with no recompute dependency on the price index.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextArtifact {
    pub name: String,
    pub read_only: bool,
    pub position: ScenePoint,
    pub text: String,
    pub font: FontSpec,
    pub color: Color,
    pub x_scale: f64,
    pub y_scale: f64,
}

impl TextArtifact {
    #[must_use]
    pub fn new(name: impl Into<String>, position: ScenePoint, text: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            read_only: false,
            position,
            text: text.into(),
            font: FontSpec::new("Sans", 10.0),
            color: Color::rgb(0.0, 0.0, 0.0),
            x_scale: 1.0,
            y_scale: 1.0,
        }
    }

    pub fn validate(&self) -> AnnotResult<()> {
        self.font.validate()?;
        self.color.validate()?;
        if !self.x_scale.is_finite()
            || !self.y_scale.is_finite()
            || self.x_scale <= 0.0
            || self.y_scale <= 0.0
        {
            return Err(AnnotError::InvalidData(
                "text scale factors must be finite and > 0".to_owned(),
            ));
        }
        Ok(())
    }
}
