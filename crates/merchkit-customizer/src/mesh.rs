//! Product surface meshes the artwork texture is projected onto.

use crate::texture::MeshMaterial;
use merchkit_core::{PrintArea, SurfaceKind};
use nalgebra::{Point3, Vector2};
use std::f64::consts::TAU;
use tiny_skia::Color;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Vertex {
    pub position: Point3<f64>,
    /// Texture coordinate, `v = 0` at the top edge.
    pub uv: Vector2<f64>,
}

/// Triangle mesh with UVs, in millimetres.
#[derive(Debug, Clone, PartialEq)]
pub struct ProductMesh {
    pub surface: SurfaceKind,
    pub vertices: Vec<Vertex>,
    pub triangles: Vec<[u32; 3]>,
}

impl ProductMesh {
    /// Flat rectangle in the XY plane, centered on the origin.
    pub fn plane(width: f64, height: f64, segments: u32) -> Self {
        let segments = segments.max(1);
        let mut vertices = Vec::with_capacity(((segments + 1) * (segments + 1)) as usize);
        for row in 0..=segments {
            let v = row as f64 / segments as f64;
            for col in 0..=segments {
                let u = col as f64 / segments as f64;
                vertices.push(Vertex {
                    position: Point3::new((u - 0.5) * width, (0.5 - v) * height, 0.0),
                    uv: Vector2::new(u, v),
                });
            }
        }
        Self {
            surface: SurfaceKind::Flat,
            vertices,
            triangles: grid_triangles(segments, segments),
        }
    }

    /// Open cylinder around the Y axis.
    ///
    /// The seam column is duplicated so `u` runs 0..=1 around the wrap.
    pub fn cylinder(radius: f64, height: f64, radial_segments: u32, height_segments: u32) -> Self {
        let radial = radial_segments.max(3);
        let rows = height_segments.max(1);
        let mut vertices = Vec::with_capacity(((radial + 1) * (rows + 1)) as usize);
        for row in 0..=rows {
            let v = row as f64 / rows as f64;
            for col in 0..=radial {
                let u = col as f64 / radial as f64;
                let angle = u * TAU;
                vertices.push(Vertex {
                    position: Point3::new(
                        radius * angle.sin(),
                        (0.5 - v) * height,
                        radius * angle.cos(),
                    ),
                    uv: Vector2::new(u, v),
                });
            }
        }
        Self {
            surface: SurfaceKind::Cylindrical,
            vertices,
            triangles: grid_triangles(radial, rows),
        }
    }

    /// Mesh matching a print area; a cylinder's circumference equals the
    /// print area width.
    pub fn for_print_area(area: &PrintArea, surface: SurfaceKind) -> Self {
        match surface {
            SurfaceKind::Flat => Self::plane(area.width_mm, area.height_mm, 8),
            SurfaceKind::Cylindrical => {
                Self::cylinder(area.width_mm / TAU, area.height_mm, 48, 4)
            }
        }
    }

    /// Per-vertex colors with the material applied.
    pub fn project(&self, material: &MeshMaterial) -> Vec<Color> {
        self.vertices
            .iter()
            .map(|v| material.shade(v.uv.x, v.uv.y))
            .collect()
    }
}

fn grid_triangles(cols: u32, rows: u32) -> Vec<[u32; 3]> {
    let stride = cols + 1;
    let mut triangles = Vec::with_capacity((cols * rows * 2) as usize);
    for row in 0..rows {
        for col in 0..cols {
            let a = row * stride + col;
            let b = a + 1;
            let c = a + stride;
            let d = c + 1;
            triangles.push([a, c, b]);
            triangles.push([b, c, d]);
        }
    }
    triangles
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plane_counts() {
        let mesh = ProductMesh::plane(100.0, 50.0, 2);
        assert_eq!(mesh.vertices.len(), 9);
        assert_eq!(mesh.triangles.len(), 8);
        let max = mesh.vertices.len() as u32;
        assert!(mesh.triangles.iter().flatten().all(|&i| i < max));
    }

    #[test]
    fn test_cylinder_seam_shares_position() {
        let mesh = ProductMesh::cylinder(10.0, 20.0, 8, 1);
        let first = mesh.vertices[0];
        let seam = mesh.vertices[8];
        assert!((first.position - seam.position).norm() < 1e-9);
        assert_eq!(first.uv.x, 0.0);
        assert_eq!(seam.uv.x, 1.0);
    }

    #[test]
    fn test_cylinder_circumference_matches_print_area() {
        let area = PrintArea::new(220.0, 90.0);
        let mesh = ProductMesh::for_print_area(&area, SurfaceKind::Cylindrical);
        let radius = Vector2::new(mesh.vertices[0].position.x, mesh.vertices[0].position.z).norm();
        assert!((radius * TAU - 220.0).abs() < 1e-9);
    }
}
