//! Procedural geometry: the hand-authored unit cube and the subdivided unit sphere.
//!
//! Both meshes are process-lifetime singletons. The cube is a table, the sphere is
//! built on first access from closed-form angular subdivision and cached afterwards
//! (see [`Mesh::sphere`]). Every sphere vertex lies on the unit sphere, so its position
//! doubles as its normal.

use std::f32::consts::FRAC_PI_4;
use std::sync::LazyLock;

use anyhow::ensure;

/// Subdivision used by the cached [`Mesh::sphere`].
pub const SPHERE_SUBDIVISIONS: usize = 10;

/// One interleaved vertex as it is uploaded to the GPU.
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct Vertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
    pub tex_coords: [f32; 2],
}

impl Vertex {
    const fn new(position: [f32; 3], normal: [f32; 3], tex_coords: [f32; 2]) -> Self {
        Self {
            position,
            normal,
            tex_coords,
        }
    }

    /// A vertex on the unit sphere: the direction is both position and normal.
    fn on_unit_sphere(direction: [f32; 3], tex_coords: [f32; 2]) -> Self {
        Self::new(direction, direction, tex_coords)
    }
}

/// Immutable triangle geometry with 16-bit indices.
#[derive(Clone, Debug)]
pub struct Mesh {
    pub vertices: Vec<Vertex>,
    pub indices: Vec<u16>,
}

static CUBE: LazyLock<Mesh> = LazyLock::new(build_cube);
static SPHERE: LazyLock<Mesh> = LazyLock::new(|| build_sphere(SPHERE_SUBDIVISIONS));

// The cached sphere has to stay addressable with u16 indices.
const _: () = assert!(sphere_vertex_count(SPHERE_SUBDIVISIONS) <= u16::MAX as usize + 1);

impl Mesh {
    /// The 24-vertex, 12-triangle cube spanning `[-1, 1]` on every axis.
    pub fn cube() -> &'static Mesh {
        &CUBE
    }

    /// The unit sphere at [`SPHERE_SUBDIVISIONS`]. Built by the first caller.
    pub fn sphere() -> &'static Mesh {
        &SPHERE
    }

    /// Builds a fresh sphere for an arbitrary subdivision, rejecting sizes whose vertex
    /// count no longer fits 16-bit indices.
    pub fn generate_sphere(size: usize) -> anyhow::Result<Mesh> {
        ensure!(size > 0, "sphere subdivision must be at least 1");
        let count = sphere_vertex_count(size);
        ensure!(
            count <= u16::MAX as usize + 1,
            "sphere subdivision {size} needs {count} vertices, more than 16-bit indices can address"
        );
        Ok(build_sphere(size))
    }

    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }
}

/// Columns of the sphere grid: eight 45° sectors plus the closing seam column.
pub const fn sphere_columns(size: usize) -> usize {
    8 * size + 9
}

/// Rows of the sphere grid, pole fans excluded.
pub const fn sphere_rows(size: usize) -> usize {
    4 * size + 3
}

/// Grid vertices plus one collapsed pole vertex per fan triangle at each end.
pub const fn sphere_vertex_count(size: usize) -> usize {
    let (columns, rows) = (sphere_columns(size), sphere_rows(size));
    2 * (columns - 1) + columns * rows
}

/// Two pole fans plus two triangles for every grid quad, three indices each.
pub const fn sphere_index_count(size: usize) -> usize {
    let (columns, rows) = (sphere_columns(size), sphere_rows(size));
    3 * (2 * (columns - 1) + 2 * (rows - 1) * (columns - 1))
}

#[rustfmt::skip]
fn build_cube() -> Mesh {
    let vertices = vec![
        // front
        Vertex::new([ 1.0,  1.0,  1.0], [ 0.0,  0.0,  1.0], [1.0, 1.0]),
        Vertex::new([ 1.0, -1.0,  1.0], [ 0.0,  0.0,  1.0], [1.0, 0.0]),
        Vertex::new([-1.0, -1.0,  1.0], [ 0.0,  0.0,  1.0], [0.0, 0.0]),
        Vertex::new([-1.0,  1.0,  1.0], [ 0.0,  0.0,  1.0], [0.0, 1.0]),
        // top
        Vertex::new([ 1.0,  1.0, -1.0], [ 0.0,  1.0,  0.0], [1.0, 1.0]),
        Vertex::new([ 1.0,  1.0,  1.0], [ 0.0,  1.0,  0.0], [1.0, 0.0]),
        Vertex::new([-1.0,  1.0,  1.0], [ 0.0,  1.0,  0.0], [0.0, 0.0]),
        Vertex::new([-1.0,  1.0, -1.0], [ 0.0,  1.0,  0.0], [0.0, 1.0]),
        // bottom
        Vertex::new([ 1.0, -1.0,  1.0], [ 0.0, -1.0,  0.0], [1.0, 1.0]),
        Vertex::new([ 1.0, -1.0, -1.0], [ 0.0, -1.0,  0.0], [1.0, 0.0]),
        Vertex::new([-1.0, -1.0, -1.0], [ 0.0, -1.0,  0.0], [0.0, 0.0]),
        Vertex::new([-1.0, -1.0,  1.0], [ 0.0, -1.0,  0.0], [0.0, 1.0]),
        // left
        Vertex::new([-1.0,  1.0,  1.0], [-1.0,  0.0,  0.0], [1.0, 1.0]),
        Vertex::new([-1.0, -1.0,  1.0], [-1.0,  0.0,  0.0], [1.0, 0.0]),
        Vertex::new([-1.0, -1.0, -1.0], [-1.0,  0.0,  0.0], [0.0, 0.0]),
        Vertex::new([-1.0,  1.0, -1.0], [-1.0,  0.0,  0.0], [0.0, 1.0]),
        // right
        Vertex::new([ 1.0,  1.0, -1.0], [ 1.0,  0.0,  0.0], [1.0, 1.0]),
        Vertex::new([ 1.0, -1.0, -1.0], [ 1.0,  0.0,  0.0], [1.0, 0.0]),
        Vertex::new([ 1.0, -1.0,  1.0], [ 1.0,  0.0,  0.0], [0.0, 0.0]),
        Vertex::new([ 1.0,  1.0,  1.0], [ 1.0,  0.0,  0.0], [0.0, 1.0]),
        // back
        Vertex::new([-1.0,  1.0, -1.0], [ 0.0,  0.0, -1.0], [1.0, 1.0]),
        Vertex::new([-1.0, -1.0, -1.0], [ 0.0,  0.0, -1.0], [1.0, 0.0]),
        Vertex::new([ 1.0, -1.0, -1.0], [ 0.0,  0.0, -1.0], [0.0, 0.0]),
        Vertex::new([ 1.0,  1.0, -1.0], [ 0.0,  0.0, -1.0], [0.0, 1.0]),
    ];
    let indices = vec![
         0,  1,  3,   1,  2,  3,
         4,  5,  7,   5,  6,  7,
         8,  9, 11,   9, 10, 11,
        12, 13, 15,  13, 14, 15,
        16, 17, 19,  17, 18, 19,
        20, 21, 23,  21, 22, 23,
    ];
    Mesh { vertices, indices }
}

#[derive(Clone, Copy)]
struct Angle {
    cos: f32,
    sin: f32,
}

/// `size` angles strictly inside the first 45°; the 0° and 45° seams are placed
/// separately so no grid column is computed twice.
fn quadrant_angles(size: usize) -> Vec<Angle> {
    let step = FRAC_PI_4 / (size + 1) as f32;
    (1..=size)
        .map(|i| {
            let angle = step * i as f32;
            Angle {
                cos: angle.cos(),
                sin: angle.sin(),
            }
        })
        .collect()
}

/// Direction grid of `rows × columns` unit vectors. Row `2·size + 1` is the equator;
/// every other row reuses the equator's x/z scaled by the row's latitude.
fn direction_grid(size: usize) -> Vec<Vec<[f32; 3]>> {
    let columns = sphere_columns(size);
    let rows = sphere_rows(size);
    let angles = quadrant_angles(size);
    let diagonal = FRAC_PI_4.sin();

    let mut equator = vec![[0.0f32; 3]; columns];
    let top = 2 * size + 2;
    let left = 4 * size + 4;
    let bottom = 6 * size + 6;
    let right = 8 * size + 8;
    let sector = size + 1;

    equator[0] = [1.0, 0.0, 0.0];
    equator[sector] = [diagonal, 0.0, diagonal];
    equator[top] = [0.0, 0.0, 1.0];
    equator[top + sector] = [-diagonal, 0.0, diagonal];
    equator[left] = [-1.0, 0.0, 0.0];
    equator[left + sector] = [-diagonal, 0.0, -diagonal];
    equator[bottom] = [0.0, 0.0, -1.0];
    equator[bottom + sector] = [diagonal, 0.0, -diagonal];
    equator[right] = [1.0, 0.0, 0.0];

    for (i, angle) in (1..=size).zip(&angles) {
        let (x, z) = (angle.cos, angle.sin);
        equator[i] = [x, 0.0, z];
        equator[top - i] = [z, 0.0, x];
        equator[top + i] = [-z, 0.0, x];
        equator[left - i] = [-x, 0.0, z];
        equator[left + i] = [-x, 0.0, -z];
        equator[bottom - i] = [-z, 0.0, -x];
        equator[bottom + i] = [z, 0.0, -x];
        equator[right - i] = [x, 0.0, -z];
    }

    let middle = 2 * size + 1;
    let mut grid = vec![vec![[0.0f32; 3]; columns]; rows];

    let scaled = |scale: f32, y: f32| -> Vec<[f32; 3]> {
        equator
            .iter()
            .map(|[x, _, z]| [x * scale, y, z * scale])
            .collect()
    };

    grid[middle - size - 1] = scaled(diagonal, diagonal);
    grid[middle + size + 1] = scaled(diagonal, -diagonal);

    for (i, angle) in (1..=size).zip(&angles) {
        // near the poles the angle is measured from the axis, near the equator from the plane
        grid[i - 1] = scaled(angle.sin, angle.cos);
        grid[middle - i] = scaled(angle.cos, angle.sin);
        grid[middle + i] = scaled(angle.cos, -angle.sin);
        grid[rows - i] = scaled(angle.sin, -angle.cos);
    }
    grid[middle] = equator;

    grid
}

fn build_sphere(size: usize) -> Mesh {
    let columns = sphere_columns(size);
    let rows = sphere_rows(size);
    let grid = direction_grid(size);

    let u_step = 1.0 / (columns - 1) as f32;
    let v_step = 1.0 / (rows + 1) as f32;

    let mut vertices = Vec::with_capacity(sphere_vertex_count(size));

    // Each fan triangle gets its own pole vertex, offset half a step so the texture
    // seam lines up with the middle of the triangle.
    let fan = |y: f32, v: f32| {
        (0..columns - 1).map(move |i| {
            Vertex::on_unit_sphere([0.0, y, 0.0], [u_step / 2.0 + u_step * i as f32, v])
        })
    };

    vertices.extend(fan(1.0, 1.0));
    for (row, directions) in grid.iter().enumerate() {
        let v = 1.0 - v_step * (row + 1) as f32;
        vertices.extend(
            directions
                .iter()
                .enumerate()
                .map(|(column, &direction)| {
                    Vertex::on_unit_sphere(direction, [u_step * column as f32, v])
                }),
        );
    }
    vertices.extend(fan(-1.0, 0.0));

    let offset = columns - 1;
    let index = |i: usize| i as u16;
    let mut indices = Vec::with_capacity(sphere_index_count(size));

    for i in 0..offset {
        indices.extend([index(i), index(offset + i), index(offset + i + 1)]);
    }

    for row in 0..rows - 1 {
        for column in 0..columns - 1 {
            let top_left = offset + columns * row + column;
            let top_right = top_left + 1;
            let bottom_left = top_left + columns;
            let bottom_right = bottom_left + 1;

            indices.extend([index(top_right), index(top_left), index(bottom_right)]);
            indices.extend([index(bottom_right), index(top_left), index(bottom_left)]);
        }
    }

    let last_row = offset + columns * (rows - 1);
    let bottom_fan = offset + columns * rows;
    for i in 0..offset {
        indices.extend([
            index(last_row + i),
            index(bottom_fan + i),
            index(last_row + i + 1),
        ]);
    }

    Mesh { vertices, indices }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn length(v: [f32; 3]) -> f32 {
        (v[0] * v[0] + v[1] * v[1] + v[2] * v[2]).sqrt()
    }

    #[test]
    fn cube_has_24_vertices_and_12_triangles() {
        let cube = Mesh::cube();
        assert_eq!(cube.vertex_count(), 24);
        assert_eq!(cube.triangle_count(), 12);
        assert!(cube.indices.iter().all(|&i| (i as usize) < cube.vertex_count()));
    }

    #[test]
    fn cached_sphere_matches_closed_form_counts() {
        let sphere = Mesh::sphere();
        assert_eq!(sphere.vertex_count(), sphere_vertex_count(SPHERE_SUBDIVISIONS));
        assert_eq!(sphere.indices.len(), sphere_index_count(SPHERE_SUBDIVISIONS));
        assert_eq!(sphere.vertex_count(), 4003);
        assert_eq!(sphere.indices.len(), 22704);
    }

    #[test]
    fn sphere_is_cached() {
        assert!(std::ptr::eq(Mesh::sphere(), Mesh::sphere()));
    }

    #[test]
    fn counts_are_deterministic_for_every_size() {
        for size in 1..=12 {
            let sphere = Mesh::generate_sphere(size).unwrap();
            assert_eq!(sphere.vertex_count(), sphere_vertex_count(size), "size {size}");
            assert_eq!(sphere.indices.len(), sphere_index_count(size), "size {size}");
        }
    }

    #[test]
    fn every_sphere_vertex_is_unit_length_and_its_own_normal() {
        for size in [1, 3, SPHERE_SUBDIVISIONS] {
            let sphere = Mesh::generate_sphere(size).unwrap();
            for vertex in &sphere.vertices {
                assert!((length(vertex.position) - 1.0).abs() < 1e-5, "{vertex:?}");
                assert_eq!(vertex.position, vertex.normal);
            }
        }
    }

    #[test]
    fn sphere_indices_stay_in_range() {
        let sphere = Mesh::sphere();
        let count = sphere.vertex_count();
        assert!(sphere.indices.iter().all(|&i| (i as usize) < count));
    }

    #[test]
    fn texture_coordinates_stay_in_unit_square() {
        for vertex in &Mesh::sphere().vertices {
            let [u, v] = vertex.tex_coords;
            assert!((0.0..=1.0 + 1e-6).contains(&u), "u = {u}");
            assert!((0.0..=1.0).contains(&v), "v = {v}");
        }
    }

    #[test]
    fn seam_columns_coincide() {
        let size = 4;
        let grid = direction_grid(size);
        let last = sphere_columns(size) - 1;
        for row in &grid {
            let (first, seam) = (row[0], row[last]);
            for axis in 0..3 {
                assert!((first[axis] - seam[axis]).abs() < 1e-6);
            }
        }
    }

    #[test]
    fn oversized_subdivision_is_rejected() {
        assert!(Mesh::generate_sphere(0).is_err());
        assert!(Mesh::generate_sphere(44).is_ok());
        assert!(Mesh::generate_sphere(45).is_err());
    }
}
