//! Tree rendering
//!
//! Placement and trunk colliders come from `shared::props`; this only builds meshes.

use bevy::prelude::*;

use crate::Forest;

/// Marker on each spawned tree root
#[derive(Component)]
pub struct TreeProp;

/// Plugin for vegetation visuals
pub struct PropsPlugin;

impl Plugin for PropsPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(Startup, spawn_trees);
    }
}

fn spawn_trees(
    forest: Res<Forest>,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
    mut commands: Commands,
) {
    let bark = materials.add(StandardMaterial {
        base_color: Color::srgb(0.36, 0.25, 0.16),
        perceptual_roughness: 1.0,
        ..default()
    });
    let leaves = materials.add(StandardMaterial {
        base_color: Color::srgb(0.16, 0.4, 0.18),
        perceptual_roughness: 0.9,
        ..default()
    });
    // Unit sphere scaled per cluster
    let blob = meshes.add(Sphere::new(1.0).mesh().uv(16, 12));

    for tree in forest.0.iter() {
        let trunk = meshes.add(ConicalFrustum {
            radius_top: tree.trunk_top_radius,
            radius_bottom: tree.trunk_bottom_radius,
            height: tree.trunk_height,
        });

        commands
            .spawn((
                TreeProp,
                Transform::from_translation(tree.position)
                    .with_rotation(Quat::from_rotation_y(tree.yaw)),
                Visibility::default(),
            ))
            .with_children(|parent| {
                parent.spawn((
                    Mesh3d(trunk),
                    MeshMaterial3d(bark.clone()),
                    Transform::from_xyz(0.0, tree.trunk_height * 0.5, 0.0),
                ));
                for cluster in &tree.canopy {
                    parent.spawn((
                        Mesh3d(blob.clone()),
                        MeshMaterial3d(leaves.clone()),
                        Transform::from_translation(
                            Vec3::new(0.0, tree.trunk_height, 0.0) + cluster.offset,
                        )
                        .with_scale(Vec3::splat(cluster.radius)),
                    ));
                }
            });
    }

    info!("Spawned {} tree visuals", forest.0.len());
}
