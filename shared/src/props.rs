//! Deterministic tree placement and the trunk obstacles it produces.
//!
//! The client turns `TreeSpawn`s into meshes; the integrator collides against
//! the `ObstacleField` built from the same spawns.

use bevy::prelude::*;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::settings::{TerrainSettings, VegetationSettings};
use crate::terrain::TerrainGenerator;

/// Trunk collider radius relative to the trunk's bottom radius.
pub const TRUNK_COLLIDER_PADDING: f32 = 1.05;

/// A static vertical cylinder in world XZ.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Obstacle {
    pub center: Vec2,
    pub radius: f32,
}

impl Obstacle {
    pub fn new(x: f32, z: f32, radius: f32) -> Self {
        Self {
            center: Vec2::new(x, z),
            radius,
        }
    }
}

/// All static cylinders, fixed after world generation.
#[derive(Debug, Clone, Default)]
pub struct ObstacleField {
    obstacles: Vec<Obstacle>,
}

impl ObstacleField {
    pub fn new(obstacles: Vec<Obstacle>) -> Self {
        Self { obstacles }
    }

    pub fn from_trees(trees: &[TreeSpawn]) -> Self {
        Self::new(trees.iter().map(TreeSpawn::obstacle).collect())
    }

    pub fn as_slice(&self) -> &[Obstacle] {
        &self.obstacles
    }

    pub fn len(&self) -> usize {
        self.obstacles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.obstacles.is_empty()
    }
}

/// One leafy blob of a canopy, relative to the trunk top.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CanopyCluster {
    pub offset: Vec3,
    pub radius: f32,
}

/// A single tree spawn (deterministic from vegetation seed + terrain).
#[derive(Debug, Clone, PartialEq)]
pub struct TreeSpawn {
    /// Trunk base on the terrain surface
    pub position: Vec3,
    pub yaw: f32,
    pub trunk_height: f32,
    pub trunk_bottom_radius: f32,
    pub trunk_top_radius: f32,
    pub canopy: Vec<CanopyCluster>,
}

impl TreeSpawn {
    pub fn obstacle(&self) -> Obstacle {
        Obstacle::new(
            self.position.x,
            self.position.z,
            self.trunk_bottom_radius * TRUNK_COLLIDER_PADDING,
        )
    }
}

fn canopy_clusters(rng: &mut StdRng, trunk_height: f32) -> Vec<CanopyCluster> {
    let count = rng.gen_range(5..=6);
    let base_radius = 1.2 + trunk_height * 0.18;
    (0..count)
        .map(|i| {
            let angle = i as f32 / count as f32 * std::f32::consts::TAU + rng.gen_range(-0.3..0.3);
            let spread = rng.gen_range(0.4..1.0) * base_radius * 0.6;
            CanopyCluster {
                offset: Vec3::new(
                    angle.cos() * spread,
                    rng.gen_range(-0.3..0.9),
                    angle.sin() * spread,
                ),
                radius: base_radius * rng.gen_range(0.7..1.05),
            }
        })
        .collect()
}

/// Scatter trees uniformly over the terrain, skipping steep ground.
///
/// Stops after `tree_count` trees or `max_tries` candidates, whichever comes first.
pub fn scatter_trees(
    terrain: &TerrainGenerator,
    terrain_settings: &TerrainSettings,
    vegetation: &VegetationSettings,
) -> Vec<TreeSpawn> {
    let mut rng = StdRng::seed_from_u64(vegetation.seed);
    let half_extent = terrain_settings.size * 0.49;
    let mut trees = Vec::with_capacity(vegetation.tree_count as usize);
    let mut tries = 0;

    while trees.len() < vegetation.tree_count as usize && tries < vegetation.max_tries {
        tries += 1;
        let x = rng.gen_range(-half_extent..=half_extent);
        let z = rng.gen_range(-half_extent..=half_extent);

        if terrain.normal_at(x, z).y < vegetation.slope_min_normal_y {
            continue;
        }

        let trunk_height = rng.gen_range(4.0..=6.8);
        let trunk_bottom_radius = rng.gen_range(0.28..=0.4);
        let trunk_top_radius = rng.gen_range(0.12..=0.2);
        let yaw = rng.gen_range(0.0..std::f32::consts::TAU);
        let canopy = canopy_clusters(&mut rng, trunk_height);

        trees.push(TreeSpawn {
            position: Vec3::new(x, terrain.height_at(x, z), z),
            yaw,
            trunk_height,
            trunk_bottom_radius,
            trunk_top_radius,
            canopy,
        });
    }

    info!(
        "Placed {} trees in {} attempts (seed {})",
        trees.len(),
        tries,
        vegetation.seed
    );
    trees
}

#[cfg(test)]
mod tests {
    use super::*;

    fn flat() -> TerrainSettings {
        TerrainSettings {
            height: 0.0,
            ..default()
        }
    }

    #[test]
    fn same_seed_same_forest() {
        let settings = TerrainSettings::default();
        let terrain = TerrainGenerator::new(&settings);
        let vegetation = VegetationSettings {
            tree_count: 20,
            ..default()
        };
        let a = scatter_trees(&terrain, &settings, &vegetation);
        let b = scatter_trees(&terrain, &settings, &vegetation);
        assert_eq!(a, b);
    }

    #[test]
    fn flat_ground_places_every_tree() {
        let settings = flat();
        let terrain = TerrainGenerator::new(&settings);
        let vegetation = VegetationSettings::default();
        let trees = scatter_trees(&terrain, &settings, &vegetation);
        assert_eq!(trees.len(), vegetation.tree_count as usize);

        let limit = settings.size * 0.49;
        for tree in &trees {
            assert!(tree.position.x.abs() <= limit && tree.position.z.abs() <= limit);
            assert_eq!(tree.position.y, 0.0);
            assert!((4.0..=6.8).contains(&tree.trunk_height));
            assert!((0.28..=0.4).contains(&tree.trunk_bottom_radius));
            assert!((0.12..=0.2).contains(&tree.trunk_top_radius));
            assert!((5..=6).contains(&tree.canopy.len()));
        }
    }

    #[test]
    fn impossible_slope_limit_places_nothing() {
        let settings = flat();
        let terrain = TerrainGenerator::new(&settings);
        let vegetation = VegetationSettings {
            slope_min_normal_y: 1.5,
            max_tries: 50,
            ..default()
        };
        assert!(scatter_trees(&terrain, &settings, &vegetation).is_empty());
    }

    #[test]
    fn steep_spots_are_rejected() {
        let settings = TerrainSettings {
            height: 400.0,
            scale: 0.05,
            ..default()
        };
        let terrain = TerrainGenerator::new(&settings);
        let vegetation = VegetationSettings {
            tree_count: 30,
            ..default()
        };
        for tree in scatter_trees(&terrain, &settings, &vegetation) {
            let normal = terrain.normal_at(tree.position.x, tree.position.z);
            assert!(normal.y >= vegetation.slope_min_normal_y);
        }
    }

    #[test]
    fn obstacle_uses_padded_bottom_radius() {
        let tree = TreeSpawn {
            position: Vec3::new(3.0, 1.0, -4.0),
            yaw: 0.0,
            trunk_height: 5.0,
            trunk_bottom_radius: 0.3,
            trunk_top_radius: 0.15,
            canopy: Vec::new(),
        };
        let field = ObstacleField::from_trees(&[tree]);
        assert_eq!(field.len(), 1);
        let obstacle = field.as_slice()[0];
        assert_eq!(obstacle.center, Vec2::new(3.0, -4.0));
        assert!((obstacle.radius - 0.315).abs() < 1e-6);
    }
}
