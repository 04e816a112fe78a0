use chrono::{DateTime, FixedOffset};
use tracing::debug;

use crate::artifacts::{Artifact, ArtifactKind};
use crate::core::{BarCollection, EpochDayOracle, PriceBar, SceneMapper, ScenePoint, TimeOracle};
use crate::error::{AnnotError, AnnotResult};
use crate::interaction::{ArtifactStore, ToolAction, ToolController, ToolMode};

use super::{AnnotationEngineConfig, AnnotationEvent, AnnotationObserver};

/// Main orchestration facade consumed by host applications.
///
/// `AnnotationEngine` coordinates the coordinate mapper, the plotted bar
/// collection, the artifact store, and the tool state machine, and fans
/// change notifications out to registered observers.
pub struct AnnotationEngine<O: TimeOracle = EpochDayOracle> {
    config: AnnotationEngineConfig,
    mapper: SceneMapper<O>,
    bars: BarCollection,
    artifacts: ArtifactStore,
    controller: ToolController,
    observers: Vec<Box<dyn AnnotationObserver>>,
}

impl AnnotationEngine<EpochDayOracle> {
    pub fn new(config: AnnotationEngineConfig) -> AnnotResult<Self> {
        Self::with_oracle(config, EpochDayOracle)
    }
}

impl<O: TimeOracle> AnnotationEngine<O> {
    pub fn with_oracle(config: AnnotationEngineConfig, oracle: O) -> AnnotResult<Self> {
        config.validate()?;

        let timezone = FixedOffset::east_opt(config.timezone_offset_seconds).ok_or_else(|| {
            AnnotError::InvalidData(format!(
                "timezone offset {} seconds is out of range",
                config.timezone_offset_seconds
            ))
        })?;

        let mut controller = ToolController::new(
            config.artifact_defaults(),
            config.edge_band_ratio,
            config.hit_tolerance,
        );
        controller.set_snap_enabled(config.snap_enabled_default);

        Ok(Self {
            mapper: SceneMapper::with_oracle(oracle, timezone),
            bars: BarCollection::new(),
            artifacts: ArtifactStore::new(),
            controller,
            observers: Vec::new(),
            config,
        })
    }

    #[must_use]
    pub fn config(&self) -> &AnnotationEngineConfig {
        &self.config
    }

    #[must_use]
    pub fn mapper(&self) -> &SceneMapper<O> {
        &self.mapper
    }

    #[must_use]
    pub fn bars(&self) -> &BarCollection {
        &self.bars
    }

    /// Replaces the plotted bars and recomputes every artifact against the
    /// new index.
    pub fn set_bars(&mut self, bars: Vec<PriceBar>) {
        self.bars.set_bars(bars);
        self.recalculate_all();
        self.emit(&AnnotationEvent::BarsUpdated {
            bars_len: self.bars.len(),
        });
    }

    pub fn append_bar(&mut self, bar: PriceBar) {
        self.bars.append_bar(bar);
        self.recalculate_all();
        self.emit(&AnnotationEvent::BarsUpdated {
            bars_len: self.bars.len(),
        });
    }

    // ---- artifact CRUD ----

    /// Adds a host-built artifact. Empty names get a generated one; the
    /// final name is returned. Duplicate names are rejected.
    pub fn add_artifact(&mut self, mut artifact: Artifact) -> AnnotResult<String> {
        if artifact.name().is_empty() {
            let prefix = artifact.kind().as_str();
            let mut serial = self.artifacts.len() + 1;
            while self.artifacts.contains_key(&format!("{prefix}_{serial}")) {
                serial += 1;
            }
            artifact.set_name(format!("{prefix}_{serial}"));
        }

        let name = artifact.name().to_owned();
        if self.artifacts.contains_key(&name) {
            return Err(AnnotError::InvalidData(format!(
                "artifact name `{name}` already exists"
            )));
        }

        artifact.recalculate(&self.bars, &self.mapper);
        self.artifacts.insert(name.clone(), artifact);
        debug!(%name, "added artifact");
        self.emit(&AnnotationEvent::ArtifactCreated { name: name.clone() });
        Ok(name)
    }

    pub fn artifact(&self, name: &str) -> AnnotResult<&Artifact> {
        self.artifacts
            .get(name)
            .ok_or_else(|| AnnotError::UnknownArtifact(name.to_owned()))
    }

    pub fn artifact_mut(&mut self, name: &str) -> AnnotResult<&mut Artifact> {
        self.artifacts
            .get_mut(name)
            .ok_or_else(|| AnnotError::UnknownArtifact(name.to_owned()))
    }

    /// Replaces an existing artifact's state wholesale, then recomputes it.
    pub fn set_artifact(&mut self, name: &str, mut artifact: Artifact) -> AnnotResult<()> {
        if !self.artifacts.contains_key(name) {
            return Err(AnnotError::UnknownArtifact(name.to_owned()));
        }

        artifact.set_name(name);
        artifact.recalculate(&self.bars, &self.mapper);
        self.artifacts.insert(name.to_owned(), artifact);
        self.emit(&AnnotationEvent::ArtifactChanged {
            name: name.to_owned(),
        });
        Ok(())
    }

    pub fn remove_artifact(&mut self, name: &str) -> AnnotResult<Artifact> {
        let artifact = self
            .artifacts
            .shift_remove(name)
            .ok_or_else(|| AnnotError::UnknownArtifact(name.to_owned()))?;
        debug!(%name, "removed artifact");
        self.emit(&AnnotationEvent::ArtifactRemoved {
            name: name.to_owned(),
        });
        Ok(artifact)
    }

    pub fn artifacts(&self) -> impl Iterator<Item = (&str, &Artifact)> {
        self.artifacts
            .iter()
            .map(|(name, artifact)| (name.as_str(), artifact))
    }

    #[must_use]
    pub fn artifacts_of_kind(&self, kind: ArtifactKind) -> Vec<&Artifact> {
        self.artifacts
            .values()
            .filter(|artifact| artifact.kind() == kind)
            .collect()
    }

    #[must_use]
    pub fn artifact_count(&self) -> usize {
        self.artifacts.len()
    }

    // ---- recompute ----

    /// Recomputes every artifact's derived values against the current index.
    ///
    /// Call after bulk artifact load: recompute at construction time may
    /// have run against an empty index. Per-artifact recompute is
    /// independent and order-insensitive, so the optional parallel path maps
    /// artifacts across threads while the index stays read-only.
    pub fn recalculate_all(&mut self) {
        let bars = &self.bars;
        let mapper = &self.mapper;
        let artifacts = &mut self.artifacts;

        #[cfg(feature = "parallel-recompute")]
        {
            use rayon::prelude::*;

            artifacts
                .values_mut()
                .par_bridge()
                .for_each(|artifact| artifact.recalculate(bars, mapper));
        }

        #[cfg(not(feature = "parallel-recompute"))]
        for artifact in artifacts.values_mut() {
            artifact.recalculate(bars, mapper);
        }
    }

    // ---- tool state machine ----

    #[must_use]
    pub fn tool(&self) -> ToolMode {
        self.controller.tool()
    }

    pub fn set_tool(&mut self, tool: ToolMode) {
        self.controller.set_tool(tool);
    }

    #[must_use]
    pub fn snap_enabled(&self) -> bool {
        self.controller.snap_enabled()
    }

    pub fn set_snap_enabled(&mut self, enabled: bool) {
        self.controller.set_snap_enabled(enabled);
    }

    /// The artifact currently under two-click construction, if any.
    #[must_use]
    pub fn provisional_artifact(&self) -> Option<&Artifact> {
        self.controller.provisional()
    }

    pub fn pointer_down(&mut self, point: ScenePoint) -> ToolAction {
        let action =
            self.controller
                .pointer_down(point, &mut self.artifacts, &self.bars, &self.mapper);
        self.dispatch(&action);
        action
    }

    pub fn pointer_move(&mut self, point: ScenePoint) -> ToolAction {
        let action =
            self.controller
                .pointer_move(point, &mut self.artifacts, &self.bars, &self.mapper);
        self.dispatch(&action);
        action
    }

    pub fn pointer_up(&mut self) -> ToolAction {
        let action = self
            .controller
            .pointer_up(&mut self.artifacts, &self.bars, &self.mapper);
        self.dispatch(&action);
        action
    }

    /// Escape or right-click.
    pub fn cancel_interaction(&mut self) -> ToolAction {
        let action = self
            .controller
            .cancel(&mut self.artifacts, &self.bars, &self.mapper);
        self.dispatch(&action);
        action
    }

    // ---- time helpers ----

    /// Scene X for a birth timestamp, for wiring price/time info callouts.
    #[must_use]
    pub fn scene_x_for_timestamp(&self, time: DateTime<FixedOffset>) -> f64 {
        self.mapper.timestamp_to_scene_x(time)
    }

    // ---- persistence ----

    /// Serializes the artifact list as JSON, insertion order preserved.
    pub fn artifacts_json(&self) -> AnnotResult<String> {
        Ok(serde_json::to_string_pretty(&self.artifacts)?)
    }

    /// Replaces the artifact list from a JSON snapshot and recomputes every
    /// artifact against the live index.
    pub fn load_artifacts_json(&mut self, json: &str) -> AnnotResult<usize> {
        let artifacts: ArtifactStore = serde_json::from_str(json)?;
        self.artifacts = artifacts;
        self.recalculate_all();
        let count = self.artifacts.len();
        debug!(count, "loaded artifacts from snapshot");
        self.emit(&AnnotationEvent::ArtifactsLoaded { count });
        Ok(count)
    }

    // ---- observers ----

    pub fn add_observer(&mut self, observer: Box<dyn AnnotationObserver>) {
        self.observers.push(observer);
    }

    pub fn remove_observer(&mut self, id: &str) -> bool {
        let before = self.observers.len();
        self.observers.retain(|observer| observer.id() != id);
        before != self.observers.len()
    }

    fn dispatch(&mut self, action: &ToolAction) {
        let event = match action {
            ToolAction::None => return,
            ToolAction::Created { name } => AnnotationEvent::ArtifactCreated { name: name.clone() },
            ToolAction::Changed { name } => AnnotationEvent::ArtifactChanged { name: name.clone() },
            ToolAction::Cancelled => AnnotationEvent::CreationCancelled,
        };
        self.emit(&event);
    }

    fn emit(&mut self, event: &AnnotationEvent) {
        for observer in &mut self.observers {
            observer.on_event(event);
        }
    }
}
