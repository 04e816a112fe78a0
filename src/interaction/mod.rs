//! Tool-mode state machine for interactive artifact creation and editing.
//!
//! The controller interprets pointer-down/move/up sequences into artifact
//! mutations. It owns only interaction state; artifacts live in the host's
//! store, and a provisional artifact under construction is held inside the
//! state machine until committed, so cancellation never leaves a partial
//! artifact behind.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::artifacts::{
    Artifact, BarCountArtifact, ModalScaleArtifact, PriceTimeInfoArtifact, TextArtifact,
    TimeMeasurementArtifact,
};
use crate::core::{Color, FontSpec, PriceBarIndex, SceneMapper, ScenePoint, TimeOracle};

/// Insertion-ordered artifact storage keyed by internal name.
pub type ArtifactStore = IndexMap<String, Artifact>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum ToolMode {
    /// Hit-test existing artifacts for edge/body drags.
    #[default]
    Select,
    BarCount,
    TimeMeasurement,
    ModalScale,
    Text,
    PriceTimeInfo,
}

impl ToolMode {
    /// Tools that build an artifact from a two-click sequence.
    #[must_use]
    pub fn is_two_click(self) -> bool {
        matches!(
            self,
            ToolMode::BarCount
                | ToolMode::TimeMeasurement
                | ToolMode::ModalScale
                | ToolMode::PriceTimeInfo
        )
    }
}

/// Which end of a ranged artifact a drag is adjusting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RangeEdge {
    Start,
    End,
}

/// Interaction state. The provisional artifact in `AwaitingSecondClick` is
/// not yet part of any store.
#[derive(Debug, Clone, Default)]
pub enum ToolState {
    #[default]
    Idle,
    AwaitingSecondClick {
        artifact: Artifact,
    },
    DraggingEdge {
        name: String,
        edge: RangeEdge,
    },
    DraggingBody {
        name: String,
        last: ScenePoint,
    },
}

/// What a pointer event amounted to, for the host's notification channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ToolAction {
    None,
    /// A provisional artifact was committed into the store.
    Created { name: String },
    /// An existing artifact finished an edit (drag ended, endpoints
    /// normalized).
    Changed { name: String },
    /// An incomplete creation was discarded.
    Cancelled,
}

/// Style defaults stamped onto newly created artifacts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArtifactDefaults {
    pub color: Color,
    pub text_color: Color,
    pub font: FontSpec,
    pub modal_scale_bar_height: f64,
    pub text_x_scale: f64,
    pub text_y_scale: f64,
}

impl Default for ArtifactDefaults {
    fn default() -> Self {
        Self {
            color: Color::rgb(0.0, 0.0, 0.0),
            text_color: Color::rgb(0.0, 0.0, 0.0),
            font: FontSpec::new("Sans", 10.0),
            modal_scale_bar_height: 0.2,
            text_x_scale: 1.0,
            text_y_scale: 1.0,
        }
    }
}

/// Finite-state controller translating pointer events into artifact
/// creation and edits.
#[derive(Debug)]
pub struct ToolController {
    tool: ToolMode,
    state: ToolState,
    snap_enabled: bool,
    edge_band_ratio: f64,
    hit_tolerance: f64,
    defaults: ArtifactDefaults,
    next_serial: u64,
}

impl ToolController {
    #[must_use]
    pub fn new(defaults: ArtifactDefaults, edge_band_ratio: f64, hit_tolerance: f64) -> Self {
        Self {
            tool: ToolMode::default(),
            state: ToolState::default(),
            snap_enabled: true,
            edge_band_ratio,
            hit_tolerance,
            defaults,
            next_serial: 0,
        }
    }

    #[must_use]
    pub fn tool(&self) -> ToolMode {
        self.tool
    }

    /// Switches tools, discarding any in-progress creation or drag.
    pub fn set_tool(&mut self, tool: ToolMode) {
        if !matches!(self.state, ToolState::Idle) {
            debug!(?tool, "tool switch discarded in-progress interaction");
        }
        self.state = ToolState::Idle;
        self.tool = tool;
    }

    #[must_use]
    pub fn snap_enabled(&self) -> bool {
        self.snap_enabled
    }

    pub fn set_snap_enabled(&mut self, enabled: bool) {
        self.snap_enabled = enabled;
    }

    #[must_use]
    pub fn is_interacting(&self) -> bool {
        !matches!(self.state, ToolState::Idle)
    }

    /// The artifact under construction, for live-preview rendering.
    #[must_use]
    pub fn provisional(&self) -> Option<&Artifact> {
        match &self.state {
            ToolState::AwaitingSecondClick { artifact } => Some(artifact),
            _ => None,
        }
    }

    pub fn pointer_down<O: TimeOracle>(
        &mut self,
        point: ScenePoint,
        artifacts: &mut ArtifactStore,
        index: &dyn PriceBarIndex,
        mapper: &SceneMapper<O>,
    ) -> ToolAction {
        let point = self.effective_point(point, index);

        match self.tool {
            ToolMode::Select => self.begin_drag(point, artifacts),
            ToolMode::Text => {
                let mut name = self.generate_name("text");
                while artifacts.contains_key(&name) {
                    name = self.generate_name("text");
                }
                let mut text = TextArtifact::new(name.clone(), point, "");
                text.font = self.defaults.font.clone();
                text.color = self.defaults.text_color;
                text.x_scale = self.defaults.text_x_scale;
                text.y_scale = self.defaults.text_y_scale;
                artifacts.insert(name.clone(), Artifact::Text(text));
                debug!(%name, "created text artifact");
                ToolAction::Created { name }
            }
            ToolMode::BarCount
            | ToolMode::TimeMeasurement
            | ToolMode::ModalScale
            | ToolMode::PriceTimeInfo => match std::mem::take(&mut self.state) {
                ToolState::Idle => {
                    let mut artifact = self.new_provisional(point);
                    artifact.recalculate(index, mapper);
                    trace!(tool = ?self.tool, "started two-click creation");
                    self.state = ToolState::AwaitingSecondClick { artifact };
                    ToolAction::None
                }
                ToolState::AwaitingSecondClick { mut artifact } => {
                    set_second_point(&mut artifact, point);
                    artifact.normalize_start_and_end(index);
                    artifact.recalculate(index, mapper);
                    while artifacts.contains_key(artifact.name()) {
                        let fresh = self.generate_name(artifact.kind().as_str());
                        artifact.set_name(fresh);
                    }
                    let name = artifact.name().to_owned();
                    artifacts.insert(name.clone(), artifact);
                    debug!(%name, "committed two-click creation");
                    ToolAction::Created { name }
                }
                dragging => {
                    // A stray press mid-drag keeps the drag alive.
                    self.state = dragging;
                    ToolAction::None
                }
            },
        }
    }

    pub fn pointer_move<O: TimeOracle>(
        &mut self,
        point: ScenePoint,
        artifacts: &mut ArtifactStore,
        index: &dyn PriceBarIndex,
        mapper: &SceneMapper<O>,
    ) -> ToolAction {
        let point = self.effective_point(point, index);

        match &mut self.state {
            ToolState::Idle => ToolAction::None,
            ToolState::AwaitingSecondClick { artifact } => {
                set_second_point(artifact, point);
                artifact.recalculate(index, mapper);
                ToolAction::None
            }
            ToolState::DraggingEdge { name, edge } => {
                let edge = *edge;
                if let Some(artifact) = artifacts.get_mut(name.as_str()) {
                    set_edge_point(artifact, edge, point);
                    artifact.recalculate(index, mapper);
                }
                ToolAction::None
            }
            ToolState::DraggingBody { name, last } => {
                let delta = (point.x - last.x, point.y - last.y);
                *last = point;
                let name = name.clone();
                if let Some(artifact) = artifacts.get_mut(name.as_str()) {
                    artifact.translate(delta.0, delta.1);
                    artifact.recalculate(index, mapper);
                }
                ToolAction::None
            }
        }
    }

    /// Ends any drag: endpoints are normalized, derived values recomputed,
    /// and a change is reported.
    pub fn pointer_up<O: TimeOracle>(
        &mut self,
        artifacts: &mut ArtifactStore,
        index: &dyn PriceBarIndex,
        mapper: &SceneMapper<O>,
    ) -> ToolAction {
        match std::mem::take(&mut self.state) {
            ToolState::DraggingEdge { name, .. } | ToolState::DraggingBody { name, .. } => {
                if let Some(artifact) = artifacts.get_mut(name.as_str()) {
                    artifact.normalize_start_and_end(index);
                    artifact.recalculate(index, mapper);
                }
                debug!(%name, "drag finished");
                ToolAction::Changed { name }
            }
            awaiting @ ToolState::AwaitingSecondClick { .. } => {
                // Two-click tools commit on the second press, not on release.
                self.state = awaiting;
                ToolAction::None
            }
            ToolState::Idle => ToolAction::None,
        }
    }

    /// Escape or right-click: discards a provisional artifact, or finalizes
    /// an active drag exactly like pointer-up.
    pub fn cancel<O: TimeOracle>(
        &mut self,
        artifacts: &mut ArtifactStore,
        index: &dyn PriceBarIndex,
        mapper: &SceneMapper<O>,
    ) -> ToolAction {
        match std::mem::take(&mut self.state) {
            ToolState::AwaitingSecondClick { artifact } => {
                debug!(name = %artifact.name(), "discarded provisional artifact");
                ToolAction::Cancelled
            }
            dragging @ (ToolState::DraggingEdge { .. } | ToolState::DraggingBody { .. }) => {
                self.state = dragging;
                self.pointer_up(artifacts, index, mapper)
            }
            ToolState::Idle => ToolAction::None,
        }
    }

    fn begin_drag(&mut self, point: ScenePoint, artifacts: &ArtifactStore) -> ToolAction {
        for (name, artifact) in artifacts.iter().rev() {
            if artifact.read_only() {
                continue;
            }

            if let Some((start, end)) = artifact.range() {
                if distance_to_segment(point, start, end) > self.hit_tolerance {
                    continue;
                }

                let band = (end.x - start.x).abs() * self.edge_band_ratio;
                self.state = if (point.x - start.x).abs() <= band {
                    ToolState::DraggingEdge {
                        name: name.clone(),
                        edge: RangeEdge::Start,
                    }
                } else if (point.x - end.x).abs() <= band {
                    ToolState::DraggingEdge {
                        name: name.clone(),
                        edge: RangeEdge::End,
                    }
                } else {
                    ToolState::DraggingBody {
                        name: name.clone(),
                        last: point,
                    }
                };
                trace!(%name, state = ?self.state, "drag started");
                return ToolAction::None;
            }

            if point.distance_to(artifact.position()) <= self.hit_tolerance {
                self.state = ToolState::DraggingBody {
                    name: name.clone(),
                    last: point,
                };
                trace!(%name, "body drag started");
                return ToolAction::None;
            }
        }
        ToolAction::None
    }

    fn new_provisional(&mut self, point: ScenePoint) -> Artifact {
        match self.tool {
            ToolMode::BarCount => Artifact::BarCount(BarCountArtifact::new(
                self.generate_name("bar_count"),
                point,
            )),
            ToolMode::TimeMeasurement => Artifact::TimeMeasurement(TimeMeasurementArtifact::new(
                self.generate_name("time_measurement"),
                point,
            )),
            ToolMode::ModalScale => {
                let mut scale =
                    ModalScaleArtifact::new(self.generate_name("modal_scale"), point);
                scale.bar_height = self.defaults.modal_scale_bar_height;
                scale.font_size = self.defaults.font.point_size;
                scale.bar_color = self.defaults.color;
                scale.text_color = self.defaults.text_color;
                Artifact::ModalScale(scale)
            }
            ToolMode::PriceTimeInfo => Artifact::PriceTimeInfo(PriceTimeInfoArtifact::new(
                self.generate_name("price_time_info"),
                point,
            )),
            ToolMode::Select | ToolMode::Text => {
                unreachable!("only two-click tools build provisional artifacts")
            }
        }
    }

    /// Snap mode applies to the price/time info tool only: the raw pointer
    /// position is replaced by the closest plotted OHLC scene point.
    fn effective_point(&self, point: ScenePoint, index: &dyn PriceBarIndex) -> ScenePoint {
        if self.tool == ToolMode::PriceTimeInfo && self.snap_enabled {
            index.closest_ohlc_scene_point(point).unwrap_or(point)
        } else {
            point
        }
    }

    fn generate_name(&mut self, prefix: &str) -> String {
        self.next_serial += 1;
        format!("{prefix}_{}", self.next_serial)
    }
}

/// Routes a second-click or live-preview position to the right field: the
/// end point for ranged artifacts, the text-box anchor for the callout.
fn set_second_point(artifact: &mut Artifact, point: ScenePoint) {
    match artifact {
        Artifact::BarCount(inner) => inner.set_end_point(point),
        Artifact::TimeMeasurement(inner) => inner.set_end_point(point),
        Artifact::ModalScale(inner) => inner.set_end_point(point),
        Artifact::PriceTimeInfo(inner) => inner.position = point,
        Artifact::Text(_) => {}
    }
}

fn set_edge_point(artifact: &mut Artifact, edge: RangeEdge, point: ScenePoint) {
    match (artifact, edge) {
        (Artifact::BarCount(inner), RangeEdge::Start) => inner.set_start_point(point),
        (Artifact::BarCount(inner), RangeEdge::End) => inner.set_end_point(point),
        (Artifact::TimeMeasurement(inner), RangeEdge::Start) => inner.set_start_point(point),
        (Artifact::TimeMeasurement(inner), RangeEdge::End) => inner.set_end_point(point),
        (Artifact::ModalScale(inner), RangeEdge::Start) => inner.set_start_point(point),
        (Artifact::ModalScale(inner), RangeEdge::End) => inner.set_end_point(point),
        (Artifact::Text(_) | Artifact::PriceTimeInfo(_), _) => {}
    }
}

fn distance_to_segment(point: ScenePoint, a: ScenePoint, b: ScenePoint) -> f64 {
    let ab_x = b.x - a.x;
    let ab_y = b.y - a.y;
    let len_sq = ab_x * ab_x + ab_y * ab_y;
    if len_sq == 0.0 {
        return point.distance_to(a);
    }

    let t = (((point.x - a.x) * ab_x + (point.y - a.y) * ab_y) / len_sq).clamp(0.0, 1.0);
    point.distance_to(ScenePoint::new(a.x + t * ab_x, a.y + t * ab_y))
}
