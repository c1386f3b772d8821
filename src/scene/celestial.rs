//! The large sphere and the cubes orbiting it, both placed once at startup.

use cgmath::{InnerSpace, Vector3};

use crate::data_structures::collider::BoxCollider;
use crate::data_structures::instance::{Instance, InstanceRaw};
use crate::data_structures::mesh::Mesh;

pub const SPHERE_CENTER: Vector3<f32> = Vector3::new(0.0, 0.0, -500.0);
pub const SPHERE_RADIUS: f32 = 20.0;
/// Distance of the cube shell from the sphere centre.
pub const ORBIT_RADIUS: f32 = 200.0;
pub const CUBE_HALF_EXTENT: f32 = 0.5;
/// The camera counts as a sphere of this radius against the large sphere.
pub const CAMERA_RADIUS: f32 = 1.0;

/// One orbiting cube per vertex of the cached sphere mesh.
pub fn cube_centers() -> impl Iterator<Item = Vector3<f32>> {
    Mesh::sphere()
        .vertices
        .iter()
        .map(|v| Vector3::from(v.position) * ORBIT_RADIUS + SPHERE_CENTER)
}

pub fn cube_count() -> usize {
    Mesh::sphere().vertex_count()
}

/// Instance slots that never change: the sphere first, then every cube.
pub fn fixed_instances() -> Vec<InstanceRaw> {
    std::iter::once(Instance::uniform(SPHERE_CENTER, SPHERE_RADIUS).to_raw())
        .chain(cube_centers().map(|c| Instance::uniform(c, CUBE_HALF_EXTENT).to_raw()))
        .collect()
}

#[derive(Debug)]
pub struct Celestial {
    pub sphere_bounds: BoxCollider,
    pub cubes: Vec<BoxCollider>,
}

impl Celestial {
    pub fn new() -> Self {
        Self {
            sphere_bounds: BoxCollider::around(SPHERE_CENTER, SPHERE_RADIUS),
            cubes: cube_centers()
                .map(|c| BoxCollider::around(c, CUBE_HALF_EXTENT))
                .collect(),
        }
    }
}

impl Default for Celestial {
    fn default() -> Self {
        Self::new()
    }
}

/// Moves a camera sphere at `position` out of the large sphere along the line through
/// both centres. `None` when they are already apart.
pub fn sphere_push(position: Vector3<f32>) -> Option<Vector3<f32>> {
    let offset = position - SPHERE_CENTER;
    let distance = offset.magnitude();
    let depth = SPHERE_RADIUS + CAMERA_RADIUS - distance;
    if depth <= 0.0 {
        return None;
    }
    // no line through coincident centres, leave towards the start position
    let direction = if distance > 0.0 {
        offset / distance
    } else {
        Vector3::unit_z()
    };
    Some(direction * depth)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn one_slot_for_the_sphere_and_one_per_cube() {
        let instances = fixed_instances();
        assert_eq!(instances.len(), 1 + cube_count());
        assert_eq!(instances[0].translation(), SPHERE_CENTER);
        assert_eq!(instances[0].model[0][0], SPHERE_RADIUS);
        assert_eq!(instances[1].model[2][2], CUBE_HALF_EXTENT);
    }

    #[test]
    fn cubes_form_a_shell_around_the_sphere() {
        for center in cube_centers() {
            let r = (center - SPHERE_CENTER).magnitude();
            assert!((r - ORBIT_RADIUS).abs() < 1e-2);
        }
    }

    #[test]
    fn push_from_the_centre_is_the_full_radius_sum() {
        let push = sphere_push(SPHERE_CENTER).unwrap();
        assert!((push.magnitude() - (SPHERE_RADIUS + CAMERA_RADIUS)).abs() < 1e-6);
    }

    #[test]
    fn push_runs_along_the_centre_line() {
        let position = SPHERE_CENTER + Vector3::new(0.0, 15.0, 0.0);
        let push = sphere_push(position).unwrap();
        assert!((push - Vector3::new(0.0, 6.0, 0.0)).magnitude() < 1e-4);
        assert!(sphere_push(SPHERE_CENTER + Vector3::new(0.0, 0.0, 21.0)).is_none());
        assert!(sphere_push(SPHERE_CENTER + Vector3::new(30.0, 0.0, 0.0)).is_none());
    }
}
