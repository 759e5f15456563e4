//! Client-side terrain rendering
//!
//! The ground is one square grid built once from the shared height field.

use bevy::asset::RenderAssetUsages;
use bevy::mesh::{Indices, VertexAttributeValues};
use bevy::prelude::*;
use bevy::render::render_resource::PrimitiveTopology;

use shared::Locomotion;

/// Marker component for the ground mesh entity
#[derive(Component)]
pub struct Ground;

/// Plugin for terrain rendering
pub struct TerrainPlugin;

impl Plugin for TerrainPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(Startup, spawn_ground);
    }
}

fn spawn_ground(
    core: Res<Locomotion>,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
    mut commands: Commands,
) {
    let terrain_settings = &core.settings().terrain;
    let mesh_data = core
        .terrain()
        .generator
        .generate_ground_mesh(terrain_settings.size, terrain_settings.segments);
    let vertex_count = mesh_data.positions.len();

    let mut mesh = Mesh::new(
        PrimitiveTopology::TriangleList,
        RenderAssetUsages::default(),
    );
    mesh.insert_attribute(
        Mesh::ATTRIBUTE_POSITION,
        VertexAttributeValues::Float32x3(mesh_data.positions),
    );
    mesh.insert_attribute(
        Mesh::ATTRIBUTE_NORMAL,
        VertexAttributeValues::Float32x3(mesh_data.normals),
    );
    mesh.insert_attribute(
        Mesh::ATTRIBUTE_UV_0,
        VertexAttributeValues::Float32x2(mesh_data.uvs),
    );
    mesh.insert_indices(Indices::U32(mesh_data.indices));

    let material = materials.add(StandardMaterial {
        base_color: Color::srgb(0.23, 0.42, 0.2),
        perceptual_roughness: 0.95,
        metallic: 0.0,
        ..default()
    });

    commands.spawn((
        Ground,
        Mesh3d(meshes.add(mesh)),
        MeshMaterial3d(material),
        Transform::default(),
    ));

    info!(
        "Spawned ground: {}m square, {} vertices",
        terrain_settings.size, vertex_count
    );
}
