use bevy::gltf::Gltf;
use bevy::prelude::*;

use crate::scatter::controller::ScatterController;
use crate::scatter::core::InstancingTarget;

/// The scatter controller, attached to the entity that owns the scattered instances.
#[derive(Component, Default, Deref, DerefMut)]
pub struct ScatterInstancer(pub ScatterController<InstanceBatch>);

/// Marker on the child entity that renders a scatter's instances.
#[derive(Component, Clone, Copy, Debug)]
pub struct ScatterInstances {
    pub owner: Entity,
}

/// A glTF primitive plus a strong handle on its file. The file's load state is
/// what reports parse errors and missing labels.
#[derive(Clone, Debug)]
pub struct SourceMesh {
    pub primitive: Handle<Mesh>,
    pub file: Handle<Gltf>,
}

/// Instance buffer for one scatter; baked into the `entity`'s mesh when dirty.
#[derive(Debug)]
pub struct InstanceBatch {
    /// Child entity that draws the merged mesh.
    pub entity: Entity,
    /// The shared source mesh to duplicate.
    pub mesh: Option<SourceMesh>,
    /// The material to apply to the merged mesh.
    pub material: Option<Handle<StandardMaterial>>,
    /// Instance transforms, local to the owning entity.
    pub instances: Vec<Transform>,
    /// True when anything changed since the last bake.
    pub dirty: bool,
    /// How many instances were baked into the last merged mesh.
    pub last_built_count: usize,
}

impl InstanceBatch {
    pub fn new(entity: Entity) -> Self {
        Self {
            entity,
            mesh: None,
            material: None,
            instances: Vec::new(),
            dirty: true,
            last_built_count: 0,
        }
    }

    #[inline]
    pub fn mark_dirty(&mut self) { self.dirty = true; }

    pub fn clear_build_flags(&mut self, count: usize) {
        self.dirty = false;
        self.last_built_count = count;
    }
}

impl InstancingTarget for InstanceBatch {
    type Mesh = SourceMesh;
    type Material = Handle<StandardMaterial>;

    fn set_instance_count(&mut self, count: usize) {
        self.instances.resize(count, Transform::IDENTITY);
        self.mark_dirty();
    }

    fn set_mesh(&mut self, mesh: Option<SourceMesh>) {
        self.mesh = mesh;
        self.mark_dirty();
    }

    fn set_material(&mut self, material: Option<Handle<StandardMaterial>>) {
        self.material = material;
        self.mark_dirty();
    }

    fn set_instance_transform(&mut self, index: usize, transform: Transform) {
        if let Some(slot) = self.instances.get_mut(index) {
            *slot = transform;
            self.mark_dirty();
        }
    }
}

#[derive(Component, Default, Debug)]
pub struct BatchStats {
    pub instance_count: u32,
    pub merged_vertex_count: u32,
}
