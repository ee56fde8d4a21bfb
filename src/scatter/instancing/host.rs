// src/scatter/instancing/host.rs
//! The ECS world as a `ScatterHost`: spawns the instancing child entity and
//! resolves glTF mesh sources through the `AssetServer`.

use std::path::Path;

use bevy::asset::AssetPath;
use bevy::ecs::system::SystemParam;
use bevy::gltf::GltfAssetLabel;
use bevy::prelude::*;

use crate::scatter::core::{MeshSource, ResolvedMesh, ScatterHost};

use super::components::{BatchStats, InstanceBatch, ScatterInstances, SourceMesh};

/// Everything a controller needs from the world to rebuild.
/// Ready only once an `AssetServer` exists.
#[derive(SystemParam)]
pub struct ScatterEnv<'w, 's> {
    commands: Commands<'w, 's>,
    assets: Option<Res<'w, AssetServer>>,
}

impl<'w, 's> ScatterEnv<'w, 's> {
    /// Host view for the controller living on `owner`.
    pub fn host(&mut self, owner: Entity) -> BevyScatterHost<'_, 'w, 's> {
        BevyScatterHost {
            commands: &mut self.commands,
            assets: self.assets.as_deref(),
            owner,
        }
    }

    pub fn commands(&mut self) -> &mut Commands<'w, 's> { &mut self.commands }

    pub fn asset_server(&self) -> Option<&AssetServer> { self.assets.as_deref() }
}

pub struct BevyScatterHost<'a, 'w, 's> {
    commands: &'a mut Commands<'w, 's>,
    assets: Option<&'a AssetServer>,
    owner: Entity,
}

impl ScatterHost for BevyScatterHost<'_, '_, '_> {
    type Target = InstanceBatch;

    fn is_ready(&self) -> bool { self.assets.is_some() }

    fn create_target(&mut self) -> InstanceBatch {
        let entity = self
            .commands
            .spawn((
                Name::new("Scatter Instances"),
                ScatterInstances { owner: self.owner },
                BatchStats::default(),
                Transform::default(),
                Visibility::Visible,
                ChildOf(self.owner),
            ))
            .id();
        debug!("Scatter: spawned instance target {:?} under {:?}", entity, self.owner);
        InstanceBatch::new(entity)
    }

    fn resolve_mesh(
        &mut self,
        source: &MeshSource,
    ) -> Option<ResolvedMesh<SourceMesh, Handle<StandardMaterial>>> {
        let assets = self.assets?;
        let gltf = GltfSource::parse(source.as_str())?;
        Some(ResolvedMesh {
            mesh: SourceMesh {
                primitive: assets.load(gltf.mesh_path()),
                file: assets.load(gltf.path.clone()),
            },
            material: assets.load(gltf.material_path()),
        })
    }
}

// ---------- glTF source paths ----------

/// A glTF file plus the primitive to scatter. Written as `path.glb` (first
/// primitive of the first mesh) or `path.glb#Mesh{m}/Primitive{p}`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GltfSource {
    pub path: String,
    pub mesh: usize,
    pub primitive: usize,
}

impl GltfSource {
    pub fn parse(source: &str) -> Option<Self> {
        let source = source.trim();
        let (path, label) = match source.split_once('#') {
            Some((path, label)) => (path, Some(label)),
            None => (source, None),
        };

        let ext = Path::new(path).extension()?.to_str()?.to_ascii_lowercase();
        if ext != "gltf" && ext != "glb" {
            return None;
        }

        let (mesh, primitive) = match label {
            None => (0, 0),
            Some(label) => parse_primitive_label(label)?,
        };
        Some(Self { path: path.to_string(), mesh, primitive })
    }

    pub fn mesh_path(&self) -> AssetPath<'static> {
        GltfAssetLabel::Primitive { mesh: self.mesh, primitive: self.primitive }
            .from_asset(self.path.clone())
    }

    /// Always the file's first material slot.
    pub fn material_path(&self) -> AssetPath<'static> {
        GltfAssetLabel::Material { index: 0, is_scale_inverted: false }.from_asset(self.path.clone())
    }
}

fn parse_primitive_label(label: &str) -> Option<(usize, usize)> {
    let rest = label.strip_prefix("Mesh")?;
    match rest.split_once("/Primitive") {
        Some((m, p)) => Some((m.parse().ok()?, p.parse().ok()?)),
        None => Some((rest.parse().ok()?, 0)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_path_uses_first_primitive() {
        let s = GltfSource::parse("models/rock.glb").unwrap();
        assert_eq!(s, GltfSource { path: "models/rock.glb".into(), mesh: 0, primitive: 0 });
    }

    #[test]
    fn explicit_labels() {
        assert_eq!(GltfSource::parse("a.gltf#Mesh2/Primitive1").map(|s| (s.mesh, s.primitive)), Some((2, 1)));
        assert_eq!(GltfSource::parse("a.GLB#Mesh3").map(|s| (s.mesh, s.primitive)), Some((3, 0)));
    }

    #[test]
    fn rejects_unsupported_sources() {
        assert_eq!(GltfSource::parse("models/rock.obj"), None);
        assert_eq!(GltfSource::parse("models/rock"), None);
        assert_eq!(GltfSource::parse("a.glb#Scene0"), None);
        assert_eq!(GltfSource::parse("a.glb#MeshX/Primitive0"), None);
    }

    #[test]
    fn labelled_asset_paths() {
        let s = GltfSource::parse("trees/pine.glb#Mesh1/Primitive0").unwrap();
        assert_eq!(s.mesh_path().to_string(), "trees/pine.glb#Mesh1/Primitive0");
        assert_eq!(s.material_path().to_string(), "trees/pine.glb#Material0");
    }
}
