// src/scatter/controller.rs
//! Scatter controller: owns the configuration, the seeded stream and the
//! instancing target, and repopulates the target from scratch on every change.

use bevy::prelude::*;

use super::core::{
    validate_instance_count, AreaDimensions, InstancingTarget, MeshSource, RandomStream,
    ScatterConfig, ScatterConfigError, ScatterHost, ScatterSeed,
};
use super::rng::SeededStream;
use super::sampler::sample_transform;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ScatterState {
    /// No target bound yet.
    Uninitialized,
    /// Target bound, sized and filled.
    Ready,
}

/// How the mesh source fared during a rebuild.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MeshResolution {
    Resolved,
    /// No source configured.
    Unset,
    /// A source was configured but the host could not resolve it.
    Unresolved,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RebuildOutcome {
    /// Host not ready; nothing touched.
    Skipped,
    Built { instances: u32, mesh: MeshResolution },
}

/// Staged configuration changes applied with a single rebuild.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ScatterEdit {
    pub mesh_source: Option<MeshSource>,
    pub instance_count: Option<i64>,
    pub area: Option<(f32, f32)>,
    pub seed: Option<ScatterSeed>,
}

impl ScatterEdit {
    pub fn mesh_source(mut self, source: impl Into<MeshSource>) -> Self {
        self.mesh_source = Some(source.into());
        self
    }
    pub fn instance_count(mut self, count: i64) -> Self {
        self.instance_count = Some(count);
        self
    }
    pub fn area(mut self, width: f32, depth: f32) -> Self {
        self.area = Some((width, depth));
        self
    }
    pub fn seed(mut self, seed: i64) -> Self {
        self.seed = Some(ScatterSeed(seed));
        self
    }
}

pub struct ScatterController<T, S = SeededStream> {
    config: ScatterConfig,
    stream: S,
    target: Option<T>,
}

impl<T: InstancingTarget> ScatterController<T> {
    pub fn new() -> Self { Self::with_stream(SeededStream::default()) }
}

impl<T: InstancingTarget> Default for ScatterController<T> {
    fn default() -> Self { Self::new() }
}

impl<T: InstancingTarget, S: RandomStream> ScatterController<T, S> {
    pub fn with_stream(stream: S) -> Self {
        Self { config: ScatterConfig::default(), stream, target: None }
    }

    pub fn config(&self) -> &ScatterConfig { &self.config }

    pub fn state(&self) -> ScatterState {
        if self.target.is_some() { ScatterState::Ready } else { ScatterState::Uninitialized }
    }

    pub fn stream(&self) -> &S { &self.stream }

    pub fn target(&self) -> Option<&T> { self.target.as_ref() }
    pub fn target_mut(&mut self) -> Option<&mut T> { self.target.as_mut() }

    // ---------- Setters: validate, assign on success, always rebuild ----------

    pub fn set_mesh_source<H>(&mut self, source: impl Into<MeshSource>, host: &mut H) -> RebuildOutcome
    where
        H: ScatterHost<Target = T>,
    {
        self.config.mesh_source = source.into();
        self.rebuild(host)
    }

    pub fn set_instance_count<H>(&mut self, count: i64, host: &mut H) -> Result<RebuildOutcome, ScatterConfigError>
    where
        H: ScatterHost<Target = T>,
    {
        let checked = validate_instance_count(count);
        if let Ok(n) = checked {
            self.config.instance_count = n;
        }
        let outcome = self.rebuild(host);
        checked.map(|_| outcome)
    }

    pub fn set_area_dimensions<H>(
        &mut self,
        width: f32,
        depth: f32,
        host: &mut H,
    ) -> Result<RebuildOutcome, ScatterConfigError>
    where
        H: ScatterHost<Target = T>,
    {
        let checked = AreaDimensions::new(width, depth);
        if let Ok(area) = checked {
            self.config.area = area;
        }
        let outcome = self.rebuild(host);
        checked.map(|_| outcome)
    }

    pub fn set_seed<H>(&mut self, seed: i64, host: &mut H) -> RebuildOutcome
    where
        H: ScatterHost<Target = T>,
    {
        self.config.seed = ScatterSeed(seed);
        self.rebuild(host)
    }

    /// Apply several changes with one rebuild. Any invalid field rejects the
    /// whole edit and nothing is rebuilt.
    pub fn apply<H>(&mut self, edit: ScatterEdit, host: &mut H) -> Result<RebuildOutcome, ScatterConfigError>
    where
        H: ScatterHost<Target = T>,
    {
        let count = edit.instance_count.map(validate_instance_count).transpose()?;
        let area = edit.area.map(|(w, d)| AreaDimensions::new(w, d)).transpose()?;

        if let Some(source) = edit.mesh_source { self.config.mesh_source = source; }
        if let Some(n) = count { self.config.instance_count = n; }
        if let Some(area) = area { self.config.area = area; }
        if let Some(seed) = edit.seed { self.config.seed = seed; }

        Ok(self.rebuild(host))
    }

    // ---------- Rebuild ----------

    /// Recompute the whole instance buffer from the current configuration.
    /// Safe to call at any time; a host that is not ready turns this into a no-op.
    pub fn rebuild<H>(&mut self, host: &mut H) -> RebuildOutcome
    where
        H: ScatterHost<Target = T>,
    {
        if !host.is_ready() {
            debug!("Scatter: host not ready, skipping rebuild");
            return RebuildOutcome::Skipped;
        }

        self.stream.set_seed(self.config.seed);

        let target = self.target.get_or_insert_with(|| host.create_target());

        let source = &self.config.mesh_source;
        let (resolved, resolution) = if source.is_empty() {
            (None, MeshResolution::Unset)
        } else {
            match host.resolve_mesh(source) {
                Some(r) => (Some(r), MeshResolution::Resolved),
                None => {
                    warn!("Scatter: could not resolve mesh '{}'; instances will have no mesh", source.as_str());
                    (None, MeshResolution::Unresolved)
                }
            }
        };
        let (mesh, material) = match resolved {
            Some(r) => (Some(r.mesh), Some(r.material)),
            None => (None, None),
        };

        // Zero first so the mesh swap never sees a stale, non-empty buffer.
        target.set_instance_count(0);
        target.set_mesh(mesh);
        target.set_material(material);

        let count = self.config.instance_count;
        target.set_instance_count(count as usize);

        let AreaDimensions { width, depth } = self.config.area;
        for i in 0..count as usize {
            target.set_instance_transform(i, sample_transform(&mut self.stream, width, depth));
        }

        debug!(
            "Scatter: rebuilt {} instances (seed={}, area={}x{})",
            count, self.config.seed.0, width, depth
        );

        RebuildOutcome::Built { instances: count, mesh: resolution }
    }
}
