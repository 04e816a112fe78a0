use serde::{Deserialize, Serialize};

use crate::error::{AnnotError, AnnotResult};

/// Point in scene coordinates.
///
/// One X unit is one calendar day. Y is negated price, so lower prices sit
/// lower on screen once the host applies its usual top-left pixel origin.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
pub struct ScenePoint {
    pub x: f64,
    pub y: f64,
}

impl ScenePoint {
    #[must_use]
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    #[must_use]
    pub fn is_finite(self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }

    #[must_use]
    pub fn distance_to(self, other: ScenePoint) -> f64 {
        ((self.x - other.x).powi(2) + (self.y - other.y).powi(2)).sqrt()
    }

    #[must_use]
    pub fn translated(self, dx: f64, dy: f64) -> Self {
        Self::new(self.x + dx, self.y + dy)
    }
}

/// Axis-aligned rectangle in scene coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SceneRect {
    pub min: ScenePoint,
    pub max: ScenePoint,
}

impl SceneRect {
    /// Builds a rectangle from two arbitrary corners.
    #[must_use]
    pub fn from_corners(a: ScenePoint, b: ScenePoint) -> Self {
        Self {
            min: ScenePoint::new(a.x.min(b.x), a.y.min(b.y)),
            max: ScenePoint::new(a.x.max(b.x), a.y.max(b.y)),
        }
    }

    /// Grows the rectangle to include `point`.
    #[must_use]
    pub fn including(self, point: ScenePoint) -> Self {
        Self {
            min: ScenePoint::new(self.min.x.min(point.x), self.min.y.min(point.y)),
            max: ScenePoint::new(self.max.x.max(point.x), self.max.y.max(point.y)),
        }
    }

    #[must_use]
    pub fn contains(self, point: ScenePoint) -> bool {
        point.x >= self.min.x && point.x <= self.max.x && point.y >= self.min.y && point.y <= self.max.y
    }
}

/// RGBA color in normalized 0..=1 channel values.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Color {
    pub red: f64,
    pub green: f64,
    pub blue: f64,
    pub alpha: f64,
}

impl Color {
    #[must_use]
    pub const fn rgba(red: f64, green: f64, blue: f64, alpha: f64) -> Self {
        Self {
            red,
            green,
            blue,
            alpha,
        }
    }

    #[must_use]
    pub const fn rgb(red: f64, green: f64, blue: f64) -> Self {
        Self::rgba(red, green, blue, 1.0)
    }

    pub fn validate(self) -> AnnotResult<()> {
        for (channel, value) in [
            ("red", self.red),
            ("green", self.green),
            ("blue", self.blue),
            ("alpha", self.alpha),
        ] {
            if !value.is_finite() || !(0.0..=1.0).contains(&value) {
                return Err(AnnotError::InvalidData(format!(
                    "color channel `{channel}` must be finite and in [0, 1]"
                )));
            }
        }
        Ok(())
    }
}

/// Font description handed to the host renderer as plain data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FontSpec {
    pub family: String,
    pub point_size: f64,
}

impl FontSpec {
    #[must_use]
    pub fn new(family: impl Into<String>, point_size: f64) -> Self {
        Self {
            family: family.into(),
            point_size,
        }
    }

    pub fn validate(&self) -> AnnotResult<()> {
        if !self.point_size.is_finite() || self.point_size <= 0.0 {
            return Err(AnnotError::InvalidData(
                "font point size must be finite and > 0".to_owned(),
            ));
        }
        Ok(())
    }
}
