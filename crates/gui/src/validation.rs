//! Input guards and export mesh checks.
//!
//! `validate_coords`, `validate_log_line` and `sanitize_filename` are the
//! boundary checks applied to untrusted log files and user-entered file
//! names. `MeshValidator` checks an `ExportMesh` before it is packaged and is
//! used heavily by tests.

use shared::UserPos;

use crate::error::LineRejection;
use crate::export::ExportMesh;
use crate::project_log::matches_line_grammar;

/// Largest user coordinate accepted from a log file
pub const MAX_USER_COORD: u64 = 1000;

/// Accept 1-based coordinates in `[0, MAX_USER_COORD]`.
///
/// Zero passes here; it is rejected later by the grid bounds check.
pub fn validate_coords(x: u64, y: u64, z: u64) -> Result<UserPos, LineRejection> {
    let check = |v: u64| {
        if v <= MAX_USER_COORD {
            u32::try_from(v).map_err(|_| LineRejection::CoordinateOutOfRange)
        } else {
            Err(LineRejection::CoordinateOutOfRange)
        }
    };
    Ok(UserPos::new(check(x)?, check(y)?, check(z)?))
}

/// True if `line` has the persisted `N:P(x,y,z)` / `N:E(x,y,z)` shape
pub fn validate_log_line(line: &str) -> bool {
    matches_line_grammar(line)
}

/// Keep only `[A-Za-z0-9_.-]`
pub fn sanitize_filename(name: &str) -> String {
    name.chars()
        .filter(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '-'))
        .collect()
}

/// Validator for `ExportMesh` integrity checks.
pub struct MeshValidator<'a> {
    mesh: &'a ExportMesh,
}

impl<'a> MeshValidator<'a> {
    pub fn new(mesh: &'a ExportMesh) -> Self {
        Self { mesh }
    }

    pub fn vertex_count(&self) -> usize {
        self.mesh.vertices.len()
    }

    pub fn triangle_count(&self) -> usize {
        self.mesh.triangles.len()
    }

    /// Number of cubes implied by the vertex count
    pub fn cube_count(&self) -> usize {
        self.vertex_count() / 8
    }

    /// Each cube contributes exactly 8 vertices and 12 triangles
    pub fn is_per_cube_layout(&self) -> bool {
        self.vertex_count() % 8 == 0 && self.triangle_count() == self.cube_count() * 12
    }

    /// Check that all indices are within the valid vertex range.
    pub fn are_indices_in_range(&self) -> bool {
        let max_idx = self.vertex_count() as u64;
        self.mesh
            .triangles
            .iter()
            .flatten()
            .all(|&i| u64::from(i) < max_idx)
    }

    /// No triangle repeats a vertex index
    pub fn has_degenerate_triangles(&self) -> bool {
        self.mesh
            .triangles
            .iter()
            .any(|[a, b, c]| a == b || b == c || a == c)
    }

    /// Min and max corner, or `None` for an empty mesh
    pub fn bounds(&self) -> Option<([f64; 3], [f64; 3])> {
        let first = *self.mesh.vertices.first()?;
        let mut min = first;
        let mut max = first;
        for v in &self.mesh.vertices {
            for axis in 0..3 {
                min[axis] = min[axis].min(v[axis]);
                max[axis] = max[axis].max(v[axis]);
            }
        }
        Some((min, max))
    }

    /// Width, depth and height of the bounding box
    pub fn dimensions(&self) -> [f64; 3] {
        match self.bounds() {
            Some((min, max)) => [max[0] - min[0], max[1] - min[1], max[2] - min[2]],
            None => [0.0; 3],
        }
    }

    pub fn assert_dimensions_approx(&self, expected: [f64; 3], tolerance: f64) -> bool {
        let dims = self.dimensions();
        (0..3).all(|i| (dims[i] - expected[i]).abs() < tolerance)
    }

    /// Run all validation checks and return a list of error messages.
    /// An empty list means the mesh is valid.
    pub fn validate_all(&self) -> Vec<String> {
        let mut errors = Vec::new();

        if !self.is_per_cube_layout() {
            errors.push(format!(
                "{} vertices and {} triangles do not form whole cubes",
                self.vertex_count(),
                self.triangle_count()
            ));
        }

        if !self.are_indices_in_range() {
            let max_idx = self.vertex_count() as u64;
            let out_of_range: Vec<_> = self
                .mesh
                .triangles
                .iter()
                .flatten()
                .filter(|&&i| u64::from(i) >= max_idx)
                .take(5)
                .collect();
            errors.push(format!(
                "Indices out of range (vertex_count={}): {:?}",
                max_idx, out_of_range
            ));
        }

        if self.has_degenerate_triangles() {
            errors.push("Some triangles repeat a vertex".to_string());
        }

        errors
    }
}

#[cfg(test)]
mod tests {
    use shared::Cell;

    use super::*;
    use crate::export::build_mesh;

    fn one_cube() -> ExportMesh {
        build_mesh(&[Cell::new(0, 0, 0)], 10.0)
    }

    #[test]
    fn test_validate_coords_range() {
        assert_eq!(validate_coords(1, 2, 3), Ok(UserPos::new(1, 2, 3)));
        assert!(validate_coords(0, 0, 0).is_ok());
        assert!(validate_coords(1000, 1000, 1000).is_ok());
        assert_eq!(
            validate_coords(1001, 1, 1),
            Err(LineRejection::CoordinateOutOfRange)
        );
        assert_eq!(
            validate_coords(1, 1, u64::MAX),
            Err(LineRejection::CoordinateOutOfRange)
        );
    }

    #[test]
    fn test_validate_log_line() {
        assert!(validate_log_line("12:P(1,2,3)"));
        assert!(validate_log_line("1:E(9999,0,1)"));
        assert!(!validate_log_line("12:P(1,2,3);"));
        assert!(!validate_log_line("rm -rf /"));
    }

    #[test]
    fn test_sanitize_filename() {
        assert_eq!(sanitize_filename("my model (v2).3mf"), "mymodelv2.3mf");
        assert_eq!(sanitize_filename("../etc/passwd"), "..etcpasswd");
        assert_eq!(sanitize_filename("ok_name-1.txt"), "ok_name-1.txt");
        assert_eq!(sanitize_filename("ünïcode"), "ncode");
    }

    #[test]
    fn test_cube_mesh_valid() {
        let mesh = one_cube();
        let v = MeshValidator::new(&mesh);
        assert_eq!(v.cube_count(), 1);
        assert!(v.validate_all().is_empty(), "{:?}", v.validate_all());
        assert!(v.assert_dimensions_approx([10.0, 10.0, 10.0], 1e-9));
    }

    #[test]
    fn test_catches_bad_indices() {
        let mut mesh = one_cube();
        mesh.triangles[3] = [0, 1, 42];
        let errors = MeshValidator::new(&mesh).validate_all();
        assert!(errors.iter().any(|e| e.contains("out of range")));
    }

    #[test]
    fn test_catches_partial_cube() {
        let mut mesh = one_cube();
        mesh.triangles.pop();
        let errors = MeshValidator::new(&mesh).validate_all();
        assert!(errors.iter().any(|e| e.contains("whole cubes")));
    }

    #[test]
    fn test_catches_degenerate() {
        let mut mesh = one_cube();
        mesh.triangles[0] = [2, 2, 1];
        assert!(MeshValidator::new(&mesh).has_degenerate_triangles());
    }

    #[test]
    fn test_empty_mesh() {
        let mesh = ExportMesh::default();
        let v = MeshValidator::new(&mesh);
        assert!(v.bounds().is_none());
        assert_eq!(v.dimensions(), [0.0; 3]);
        assert!(v.validate_all().is_empty());
    }
}
