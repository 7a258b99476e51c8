use crate::float_types::Real;
use crate::mesh::Mesh;
use crate::mesh::polygon::Polygon;
use crate::mesh::vertex::Vertex;
use nalgebra::{Point3, Vector3};
use std::fmt::{Debug, Write as _};
use std::io::Cursor;

impl<S: Clone + Debug + Send + Sync> Mesh<S> {
    /// Convert this Mesh to an **ASCII STL** string with the given `name`.
    ///
    /// ```rust
    /// # use meshchunk::mesh::Mesh;
    /// let mesh = Mesh::<()>::cuboid(1.0, 1.0, 1.0, None);
    /// let text = mesh.to_stl_ascii("my_solid");
    /// assert!(text.starts_with("solid my_solid"));
    /// ```
    pub fn to_stl_ascii(&self, name: &str) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "solid {name}");
        for poly in &self.polygons {
            let n = poly.plane.normal();
            for tri in poly.triangulate() {
                let _ = writeln!(out, "  facet normal {:.6} {:.6} {:.6}", n.x, n.y, n.z);
                out.push_str("    outer loop\n");
                for v in &tri {
                    let p = v.pos;
                    let _ = writeln!(out, "      vertex {:.6} {:.6} {:.6}", p.x, p.y, p.z);
                }
                out.push_str("    endloop\n");
                out.push_str("  endfacet\n");
            }
        }
        let _ = writeln!(out, "endsolid {name}");
        out
    }

    /// Convert this Mesh to a **binary STL** byte vector.
    ///
    /// Binary STL has no place for a solid name, so `_name` is ignored.
    pub fn to_stl_binary(&self, _name: &str) -> std::io::Result<Vec<u8>> {
        use stl_io::{Normal, Triangle, Vertex as StlVertex, write_stl};

        let mut triangles = Vec::<Triangle>::new();
        for poly in &self.polygons {
            let n = poly.plane.normal();
            for tri in poly.triangulate() {
                #[allow(clippy::unnecessary_cast)]
                triangles.push(Triangle {
                    normal: Normal::new([n.x as f32, n.y as f32, n.z as f32]),
                    vertices: tri.map(|v| {
                        let p = v.pos;
                        StlVertex::new([p.x as f32, p.y as f32, p.z as f32])
                    }),
                });
            }
        }

        let mut cursor = Cursor::new(Vec::new());
        write_stl(&mut cursor, triangles.iter())?;
        Ok(cursor.into_inner())
    }

    /// Read an ASCII or binary STL. Every facet becomes one triangle tagged
    /// with `metadata`. Degenerate facets (repeated corners) are skipped.
    pub fn from_stl(stl_data: &[u8], metadata: Option<S>) -> std::io::Result<Mesh<S>> {
        let mut cursor = Cursor::new(stl_data);
        let stl_reader = stl_io::create_stl_reader(&mut cursor)?;

        let mut polygons = Vec::new();
        for tri_result in stl_reader {
            let tri = tri_result?;
            #[allow(clippy::unnecessary_cast)]
            let normal = Vector3::new(
                tri.normal[0] as Real,
                tri.normal[1] as Real,
                tri.normal[2] as Real,
            );
            #[allow(clippy::unnecessary_cast)]
            let vertices: Vec<Vertex> = tri
                .vertices
                .iter()
                .map(|v| Vertex::new(Point3::new(v[0] as Real, v[1] as Real, v[2] as Real), normal))
                .collect();
            if vertices[0].pos == vertices[1].pos
                || vertices[1].pos == vertices[2].pos
                || vertices[0].pos == vertices[2].pos
            {
                continue;
            }
            polygons.push(Polygon::new(vertices, metadata.clone()));
        }

        Ok(Mesh::from_polygons(&polygons))
    }
}
