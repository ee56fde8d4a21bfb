// src/scatter/instancing/systems.rs

use bevy::asset::LoadState;
use bevy::prelude::*;
use bevy::render::mesh::{Indices, PrimitiveTopology, VertexAttributeValues};

use crate::scatter::controller::{RebuildOutcome, ScatterState};

use super::components::{BatchStats, InstanceBatch, ScatterInstancer};
use super::host::ScatterEnv;
use super::resources::ScatterInstancingConfig;

/// First rebuild for controllers that are not bound yet. Keeps retrying while
/// the host is not ready.
pub fn initialize_new_scatters(
    mut env: ScatterEnv,
    mut q_scatters: Query<(Entity, &mut ScatterInstancer)>,
) {
    for (entity, mut scatter) in q_scatters.iter_mut() {
        if scatter.state() == ScatterState::Ready { continue; }

        if let RebuildOutcome::Built { instances, mesh } = scatter.rebuild(&mut env.host(entity)) {
            info!("Scatter {:?}: initialized with {} instances (mesh {:?})", entity, instances, mesh);
        }
    }
}

/// Merge the source mesh once per dirty batch, with a small per-frame budget.
pub fn bake_dirty_batches(
    mut commands: Commands,
    mut q_scatters: Query<&mut ScatterInstancer>,
    mut q_stats: Query<&mut BatchStats>,
    cfg: Res<ScatterInstancingConfig>,
    assets: Res<AssetServer>,
    mut meshes: ResMut<Assets<Mesh>>,
) {
    let mut baked_this_frame = 0usize;

    for mut scatter in q_scatters.iter_mut() {
        if baked_this_frame >= cfg.max_bakes_per_frame { break; }
        // Read first so clean scatters are not flagged as changed.
        if !scatter.target().is_some_and(|b| b.dirty) { continue; }
        let Some(batch) = scatter.target_mut() else { continue };

        let Some(source) = batch.mesh.clone() else {
            // Meshless scatter: keep the entity, draw nothing.
            settle_meshless(&mut commands, &mut q_stats, batch);
            continue;
        };

        let status = source_status(
            SourceLoad::of(assets.get_load_state(source.primitive.id()).as_ref()),
            SourceLoad::of(assets.get_load_state(source.file.id()).as_ref()),
            meshes.contains(source.primitive.id()),
        );
        match status {
            SourceStatus::Pending => continue,
            SourceStatus::Unresolvable => {
                warn!(
                    "Scatter: source mesh {:?} could not be loaded; drawing no instances",
                    source.primitive.path()
                );
                settle_meshless(&mut commands, &mut q_stats, batch);
                continue;
            }
            SourceStatus::Available => {}
        }

        let merged = meshes
            .get(source.primitive.id())
            .and_then(|src_mesh| merge_mesh_instances(src_mesh, &batch.instances));
        let Some(merged) = merged else {
            warn!("Scatter: source mesh is not a Float32x3 triangle list; drawing no instances");
            settle_meshless(&mut commands, &mut q_stats, batch);
            continue;
        };

        let vertex_count = merged.count_vertices();
        let merged_handle = meshes.add(merged);
        let material = batch.material.clone().unwrap_or_default();

        commands.entity(batch.entity).insert((
            Mesh3d(merged_handle),
            MeshMaterial3d(material),
            Visibility::Visible,
        ));

        if let Ok(mut stats) = q_stats.get_mut(batch.entity) {
            stats.instance_count = batch.instances.len() as u32;
            stats.merged_vertex_count = vertex_count as u32;
        }

        debug!(
            "Scatter: baked {} instances into {} vertices",
            batch.instances.len(),
            vertex_count
        );
        let built = batch.instances.len();
        batch.clear_build_flags(built);
        baked_this_frame += 1;
    }
}

/// Drop whatever was drawn before and mark the batch clean with nothing baked.
fn settle_meshless(
    commands: &mut Commands,
    q_stats: &mut Query<&mut BatchStats>,
    batch: &mut InstanceBatch,
) {
    commands.entity(batch.entity).remove::<(Mesh3d, MeshMaterial3d<StandardMaterial>)>();
    if let Ok(mut stats) = q_stats.get_mut(batch.entity) {
        stats.instance_count = batch.instances.len() as u32;
        stats.merged_vertex_count = 0;
    }
    batch.clear_build_flags(0);
}

/// Coarse load state of one handle.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SourceLoad {
    /// Not tracked by the server (e.g. added directly to `Assets`) or in flight.
    Pending,
    Loaded,
    Failed,
}

impl SourceLoad {
    pub fn of(state: Option<&LoadState>) -> Self {
        match state {
            Some(LoadState::Loaded) => SourceLoad::Loaded,
            Some(LoadState::Failed(_)) => SourceLoad::Failed,
            _ => SourceLoad::Pending,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SourceStatus {
    Pending,
    Available,
    Unresolvable,
}

/// Decide whether a batch's source mesh can be baked yet.
///
/// Bevy reports parse errors and missing labels only on the file handle, and
/// a loaded file inserts all of its primitives at once, so a loaded file
/// without the primitive means the label does not exist.
pub fn source_status(primitive: SourceLoad, file: SourceLoad, mesh_present: bool) -> SourceStatus {
    if mesh_present {
        return SourceStatus::Available;
    }
    match (primitive, file) {
        (SourceLoad::Failed, _) | (_, SourceLoad::Failed) => SourceStatus::Unresolvable,
        (_, SourceLoad::Loaded) => SourceStatus::Unresolvable,
        _ => SourceStatus::Pending,
    }
}

/// Duplicate `src` once per instance transform into a single triangle list.
/// Positions are transformed, normals follow the inverse-transpose (rotation
/// times inverse scale), UVs and indices are copied with a per-instance offset.
pub fn merge_mesh_instances(src: &Mesh, instances: &[Transform]) -> Option<Mesh> {
    if src.primitive_topology() != PrimitiveTopology::TriangleList {
        return None;
    }

    let positions: &Vec<[f32; 3]> = match src.attribute(Mesh::ATTRIBUTE_POSITION)? {
        VertexAttributeValues::Float32x3(v) => v,
        _ => return None,
    };

    let normals: Option<&Vec<[f32; 3]>> = src
        .attribute(Mesh::ATTRIBUTE_NORMAL)
        .and_then(|vals| match vals {
            VertexAttributeValues::Float32x3(v) => Some(v),
            _ => None,
        });

    let uvs: Option<&Vec<[f32; 2]>> = src
        .attribute(Mesh::ATTRIBUTE_UV_0)
        .and_then(|vals| match vals {
            VertexAttributeValues::Float32x2(v) => Some(v),
            _ => None,
        });

    let src_indices: Option<Vec<u32>> = match src.indices() {
        Some(Indices::U32(v)) => Some(v.clone()),
        Some(Indices::U16(v)) => Some(v.iter().map(|&x| x as u32).collect()),
        None => None,
    };

    let src_vtx = positions.len();
    let inst_n = instances.len();

    let mut out_positions = Vec::with_capacity(src_vtx * inst_n);
    let mut out_normals: Option<Vec<[f32; 3]>> = normals.map(|_| Vec::with_capacity(src_vtx * inst_n));
    let mut out_uvs: Option<Vec<[f32; 2]>> = uvs.map(|_| Vec::with_capacity(src_vtx * inst_n));
    let mut out_indices: Vec<u32> =
        Vec::with_capacity(src_indices.as_ref().map(|ix| ix.len()).unwrap_or(0) * inst_n);

    for (inst_id, t) in instances.iter().enumerate() {
        let trs = t.compute_matrix();
        let inv_scale = t.scale.recip();

        for (i, p) in positions.iter().enumerate() {
            out_positions.push(trs.transform_point3(Vec3::from_array(*p)).to_array());

            if let (Some(src_n), Some(dst_n)) = (normals, out_normals.as_mut()) {
                let n = t.rotation * (Vec3::from_array(src_n[i]) * inv_scale);
                dst_n.push(n.normalize_or_zero().to_array());
            }
            if let (Some(src_uv), Some(dst_uv)) = (uvs, out_uvs.as_mut()) {
                dst_uv.push(src_uv[i]);
            }
        }

        if let Some(ix) = &src_indices {
            let base = (inst_id * src_vtx) as u32;
            out_indices.extend(ix.iter().map(|&i| i + base));
        }
    }

    let mut mesh = Mesh::new(PrimitiveTopology::TriangleList, Default::default());
    mesh.insert_attribute(Mesh::ATTRIBUTE_POSITION, out_positions);
    if let Some(n) = out_normals { mesh.insert_attribute(Mesh::ATTRIBUTE_NORMAL, n); }
    if let Some(uv) = out_uvs { mesh.insert_attribute(Mesh::ATTRIBUTE_UV_0, uv); }
    if src_indices.is_some() { mesh.insert_indices(Indices::U32(out_indices)); }
    Some(mesh)
}

#[cfg(test)]
mod tests {
    use super::*;
    use bevy::asset::AssetPlugin;

    use crate::scatter::core::InstancingTarget;
    use crate::scatter::instancing::components::{ScatterInstances, SourceMesh};

    fn triangle() -> Mesh {
        Mesh::new(PrimitiveTopology::TriangleList, Default::default())
            .with_inserted_attribute(
                Mesh::ATTRIBUTE_POSITION,
                vec![[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]],
            )
            .with_inserted_attribute(Mesh::ATTRIBUTE_NORMAL, vec![[0.0, 0.0, 1.0]; 3])
            .with_inserted_attribute(Mesh::ATTRIBUTE_UV_0, vec![[0.0, 0.0], [1.0, 0.0], [0.0, 1.0]])
            .with_inserted_indices(Indices::U16(vec![0, 1, 2]))
    }

    #[test]
    fn merge_duplicates_per_instance() {
        let instances = [
            Transform::from_xyz(10.0, 0.0, 0.0),
            Transform::from_xyz(0.0, 0.0, -4.0).with_scale(Vec3::splat(2.0)),
        ];
        let merged = merge_mesh_instances(&triangle(), &instances).unwrap();
        assert_eq!(merged.count_vertices(), 6);

        let Some(VertexAttributeValues::Float32x3(pos)) = merged.attribute(Mesh::ATTRIBUTE_POSITION) else {
            panic!("positions missing");
        };
        assert_eq!(pos[1], [11.0, 0.0, 0.0]);
        assert_eq!(pos[4], [2.0, 0.0, -4.0]);

        let Some(Indices::U32(ix)) = merged.indices() else { panic!("indices missing") };
        assert_eq!(ix, &vec![0, 1, 2, 3, 4, 5]);
    }

    #[test]
    fn merge_keeps_normals_unit_length() {
        let instances = [Transform::from_scale(Vec3::new(0.5, 1.0, 1.5)).with_rotation(Quat::from_rotation_y(1.0))];
        let merged = merge_mesh_instances(&triangle(), &instances).unwrap();
        let Some(VertexAttributeValues::Float32x3(normals)) = merged.attribute(Mesh::ATTRIBUTE_NORMAL) else {
            panic!("normals missing");
        };
        for n in normals {
            assert!((Vec3::from_array(*n).length() - 1.0).abs() < 1e-5);
        }
    }

    #[test]
    fn merge_rejects_other_topologies() {
        let lines = Mesh::new(PrimitiveTopology::LineList, Default::default())
            .with_inserted_attribute(Mesh::ATTRIBUTE_POSITION, vec![[0.0, 0.0, 0.0], [1.0, 0.0, 0.0]]);
        assert!(merge_mesh_instances(&lines, &[Transform::IDENTITY]).is_none());
    }

    #[test]
    fn headless_world_without_assets_stays_uninitialized() {
        let mut app = App::new();
        app.add_plugins(MinimalPlugins)
            .add_systems(Update, initialize_new_scatters);
        let e = app.world_mut().spawn(ScatterInstancer::default()).id();

        app.update();

        let scatter = app.world().get::<ScatterInstancer>(e).unwrap();
        assert_eq!(scatter.state(), ScatterState::Uninitialized);
    }

    #[test]
    fn first_update_binds_a_child_target() {
        let mut app = App::new();
        app.add_plugins((MinimalPlugins, AssetPlugin::default()))
            .add_systems(Update, initialize_new_scatters);
        let owner = app.world_mut().spawn(ScatterInstancer::default()).id();

        app.update();

        let scatter = app.world().get::<ScatterInstancer>(owner).unwrap();
        assert_eq!(scatter.state(), ScatterState::Ready);
        let batch = scatter.target().unwrap();
        assert_eq!(batch.instances.len(), 50);
        assert!(batch.mesh.is_none());

        let target = batch.entity;
        assert_eq!(app.world().get::<ScatterInstances>(target).map(|m| m.owner), Some(owner));
        assert_eq!(app.world().get::<ChildOf>(target).map(|c| c.parent()), Some(owner));
    }

    #[test]
    fn source_status_table() {
        use SourceLoad::*;
        assert_eq!(source_status(Pending, Pending, true), SourceStatus::Available);
        assert_eq!(source_status(Pending, Pending, false), SourceStatus::Pending);
        assert_eq!(source_status(Failed, Pending, false), SourceStatus::Unresolvable);
        // Parse errors only fail the file handle.
        assert_eq!(source_status(Pending, Failed, false), SourceStatus::Unresolvable);
        // File loaded, primitive label absent.
        assert_eq!(source_status(Pending, Loaded, false), SourceStatus::Unresolvable);
    }

    fn bake_app() -> App {
        let mut app = App::new();
        app.add_plugins((MinimalPlugins, AssetPlugin::default()))
            .init_asset::<Mesh>()
            .init_resource::<ScatterInstancingConfig>()
            .add_systems(Update, (initialize_new_scatters, bake_dirty_batches).chain());
        app
    }

    fn set_source(app: &mut App, owner: Entity, mesh: Mesh) -> Entity {
        let primitive = app.world_mut().resource_mut::<Assets<Mesh>>().add(mesh);
        let mut scatter = app.world_mut().get_mut::<ScatterInstancer>(owner).unwrap();
        let batch = scatter.target_mut().unwrap();
        batch.set_mesh(Some(SourceMesh { primitive, file: Handle::default() }));
        batch.entity
    }

    #[test]
    fn dirty_batch_bakes_into_child_mesh() {
        let mut app = bake_app();
        let owner = app.world_mut().spawn(ScatterInstancer::default()).id();
        app.update();

        let target = set_source(&mut app, owner, triangle());
        app.update();

        assert!(app.world().get::<Mesh3d>(target).is_some());
        assert!(app.world().get::<MeshMaterial3d<StandardMaterial>>(target).is_some());
        let stats = app.world().get::<BatchStats>(target).unwrap();
        assert_eq!(stats.instance_count, 50);
        assert_eq!(stats.merged_vertex_count, 150);

        let scatter = app.world().get::<ScatterInstancer>(owner).unwrap();
        let batch = scatter.target().unwrap();
        assert!(!batch.dirty);
        assert_eq!(batch.last_built_count, 50);
    }

    #[test]
    fn unmergeable_source_clears_previous_mesh() {
        let mut app = bake_app();
        let owner = app.world_mut().spawn(ScatterInstancer::default()).id();
        app.update();
        let target = set_source(&mut app, owner, triangle());
        app.update();
        assert!(app.world().get::<Mesh3d>(target).is_some());

        let lines = Mesh::new(PrimitiveTopology::LineList, Default::default())
            .with_inserted_attribute(Mesh::ATTRIBUTE_POSITION, vec![[0.0, 0.0, 0.0], [1.0, 0.0, 0.0]]);
        set_source(&mut app, owner, lines);
        app.update();

        assert!(app.world().get::<Mesh3d>(target).is_none());
        assert_eq!(app.world().get::<BatchStats>(target).unwrap().merged_vertex_count, 0);
        let scatter = app.world().get::<ScatterInstancer>(owner).unwrap();
        assert!(!scatter.target().unwrap().dirty);
    }

    #[test]
    fn clean_scatters_are_not_marked_changed() {
        let mut app = bake_app();
        let owner = app.world_mut().spawn(ScatterInstancer::default()).id();
        app.update();
        app.update();

        let changed_at = |app: &App| {
            app.world().entity(owner).get_ref::<ScatterInstancer>().unwrap().last_changed()
        };
        let before = changed_at(&app);
        app.update();
        assert_eq!(changed_at(&app), before);
    }
}
