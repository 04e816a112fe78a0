//! User-placed chart annotations and their recompute rules.
//!
//! Each artifact is plain serializable data: geometry in scene coordinates
//! plus cached derived values (counts, measurements, label strings). Derived
//! fields are never authoritative; they are recomputed from the endpoints
//! and the current [`PriceBarIndex`] on demand.

pub mod bar_count;
pub mod modal_scale;
pub mod price_time_info;
pub mod text;
pub mod time_measurement;

use serde::{Deserialize, Serialize};

use crate::core::{PriceBarIndex, SceneMapper, ScenePoint, TimeOracle};
use crate::error::{AnnotError, AnnotResult};

pub use bar_count::BarCountArtifact;
pub use modal_scale::{ModalScaleArtifact, MusicalRatio, RatioLabel};
pub use price_time_info::PriceTimeInfoArtifact;
pub use text::TextArtifact;
pub use time_measurement::TimeMeasurementArtifact;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ArtifactKind {
    BarCount,
    TimeMeasurement,
    ModalScale,
    Text,
    PriceTimeInfo,
}

impl ArtifactKind {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            ArtifactKind::BarCount => "bar_count",
            ArtifactKind::TimeMeasurement => "time_measurement",
            ArtifactKind::ModalScale => "modal_scale",
            ArtifactKind::Text => "text",
            ArtifactKind::PriceTimeInfo => "price_time_info",
        }
    }
}

/// A user-placed chart annotation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Artifact {
    BarCount(BarCountArtifact),
    TimeMeasurement(TimeMeasurementArtifact),
    ModalScale(ModalScaleArtifact),
    Text(TextArtifact),
    PriceTimeInfo(PriceTimeInfoArtifact),
}

macro_rules! kind_accessor {
    ($ref_name:ident, $mut_name:ident, $variant:ident, $ty:ty, $kind:expr) => {
        pub fn $ref_name(&self) -> AnnotResult<&$ty> {
            match self {
                Artifact::$variant(inner) => Ok(inner),
                other => Err(AnnotError::ArtifactKindMismatch {
                    expected: $kind.as_str(),
                    actual: other.kind().as_str(),
                }),
            }
        }

        pub fn $mut_name(&mut self) -> AnnotResult<&mut $ty> {
            match self {
                Artifact::$variant(inner) => Ok(inner),
                other => Err(AnnotError::ArtifactKindMismatch {
                    expected: $kind.as_str(),
                    actual: other.kind().as_str(),
                }),
            }
        }
    };
}

impl Artifact {
    #[must_use]
    pub fn kind(&self) -> ArtifactKind {
        match self {
            Artifact::BarCount(_) => ArtifactKind::BarCount,
            Artifact::TimeMeasurement(_) => ArtifactKind::TimeMeasurement,
            Artifact::ModalScale(_) => ArtifactKind::ModalScale,
            Artifact::Text(_) => ArtifactKind::Text,
            Artifact::PriceTimeInfo(_) => ArtifactKind::PriceTimeInfo,
        }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            Artifact::BarCount(inner) => &inner.name,
            Artifact::TimeMeasurement(inner) => &inner.name,
            Artifact::ModalScale(inner) => &inner.name,
            Artifact::Text(inner) => &inner.name,
            Artifact::PriceTimeInfo(inner) => &inner.name,
        }
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        let name = name.into();
        match self {
            Artifact::BarCount(inner) => inner.name = name,
            Artifact::TimeMeasurement(inner) => inner.name = name,
            Artifact::ModalScale(inner) => inner.name = name,
            Artifact::Text(inner) => inner.name = name,
            Artifact::PriceTimeInfo(inner) => inner.name = name,
        }
    }

    #[must_use]
    pub fn read_only(&self) -> bool {
        match self {
            Artifact::BarCount(inner) => inner.read_only,
            Artifact::TimeMeasurement(inner) => inner.read_only,
            Artifact::ModalScale(inner) => inner.read_only,
            Artifact::Text(inner) => inner.read_only,
            Artifact::PriceTimeInfo(inner) => inner.read_only,
        }
    }

    /// Anchor position: the start point for ranged artifacts, the stored
    /// position otherwise.
    #[must_use]
    pub fn position(&self) -> ScenePoint {
        match self {
            Artifact::BarCount(inner) => inner.start_point(),
            Artifact::TimeMeasurement(inner) => inner.start_point(),
            Artifact::ModalScale(inner) => inner.start_point(),
            Artifact::Text(inner) => inner.position,
            Artifact::PriceTimeInfo(inner) => inner.position,
        }
    }

    /// Start/end pair for ranged artifacts, `None` otherwise.
    #[must_use]
    pub fn range(&self) -> Option<(ScenePoint, ScenePoint)> {
        match self {
            Artifact::BarCount(inner) => Some((inner.start_point(), inner.end_point())),
            Artifact::TimeMeasurement(inner) => Some((inner.start_point(), inner.end_point())),
            Artifact::ModalScale(inner) => Some((inner.start_point(), inner.end_point())),
            Artifact::Text(_) | Artifact::PriceTimeInfo(_) => None,
        }
    }

    /// Moves the whole artifact by a scene-space delta.
    pub fn translate(&mut self, dx: f64, dy: f64) {
        match self {
            Artifact::BarCount(inner) => inner.translate(dx, dy),
            Artifact::TimeMeasurement(inner) => inner.translate(dx, dy),
            Artifact::ModalScale(inner) => inner.translate(dx, dy),
            Artifact::Text(inner) => inner.position = inner.position.translated(dx, dy),
            Artifact::PriceTimeInfo(inner) => inner.translate(dx, dy),
        }
    }

    /// Recomputes every cached derived value from the current index.
    ///
    /// Safe on an empty index: derived values degrade to zero/blank.
    pub fn recalculate<O: TimeOracle>(
        &mut self,
        index: &dyn PriceBarIndex,
        mapper: &SceneMapper<O>,
    ) {
        match self {
            Artifact::BarCount(inner) => {
                inner.recalculate(index);
            }
            Artifact::TimeMeasurement(inner) => inner.recalculate(index, mapper),
            Artifact::ModalScale(inner) => inner.refresh(mapper),
            Artifact::Text(_) => {}
            Artifact::PriceTimeInfo(inner) => inner.refresh(mapper),
        }
    }

    /// Restores `start.x <= end.x` for ranged artifacts and refreshes the
    /// derived values that depend on endpoint order. No-op for point
    /// artifacts.
    pub fn normalize_start_and_end(&mut self, index: &dyn PriceBarIndex) {
        match self {
            Artifact::BarCount(inner) => inner.normalize_start_and_end(index),
            Artifact::TimeMeasurement(inner) => inner.normalize_start_and_end(index),
            Artifact::ModalScale(inner) => inner.normalize_start_and_end(),
            Artifact::Text(_) | Artifact::PriceTimeInfo(_) => {}
        }
    }

    kind_accessor!(
        as_bar_count,
        as_bar_count_mut,
        BarCount,
        BarCountArtifact,
        ArtifactKind::BarCount
    );
    kind_accessor!(
        as_time_measurement,
        as_time_measurement_mut,
        TimeMeasurement,
        TimeMeasurementArtifact,
        ArtifactKind::TimeMeasurement
    );
    kind_accessor!(
        as_modal_scale,
        as_modal_scale_mut,
        ModalScale,
        ModalScaleArtifact,
        ArtifactKind::ModalScale
    );
    kind_accessor!(as_text, as_text_mut, Text, TextArtifact, ArtifactKind::Text);
    kind_accessor!(
        as_price_time_info,
        as_price_time_info_mut,
        PriceTimeInfo,
        PriceTimeInfoArtifact,
        ArtifactKind::PriceTimeInfo
    );
}
