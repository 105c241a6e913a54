//! 3MF export of a connected part.
//!
//! Every cube contributes its own 8 corners and 12 triangles. Shared faces
//! between neighbours are kept, so the mesh is not minimal.

use std::collections::HashSet;
use std::io::{Cursor, Write};
use std::path::{Path, PathBuf};

use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, Event};
use quick_xml::Writer;
use shared::Cell;
use zip::write::SimpleFileOptions;
use zip::ZipWriter;

use crate::connectivity::find_part;
use crate::error::ExportError;
use crate::grid::VoxelGrid;
use crate::validation::sanitize_filename;

/// Edge length of one exported cube in millimeters
pub const EXPORT_CUBE_SIZE_MM: f64 = 10.0;
/// Largest part that may be exported
pub const MAX_EXPORT_CELLS: usize = 5000;
/// File name used when sanitizing leaves nothing
pub const DEFAULT_EXPORT_NAME: &str = "part.3mf";

const NAMESPACE_3MF: &str = "http://schemas.microsoft.com/3dmanufacturing/core/2015/02";

const MODEL_PATH: &str = "3D/3dmodel.model";
const CONTENT_TYPES_PATH: &str = "[Content_Types].xml";
const RELS_PATH: &str = "_rels/.rels";

const CONTENT_TYPES_XML: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types">
  <Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/>
  <Default Extension="model" ContentType="application/vnd.ms-package.3dmanufacturing-3dmodel+xml"/>
</Types>"#;

const RELS_XML: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">
  <Relationship Target="/3D/3dmodel.model" Id="rel0" Type="http://schemas.microsoft.com/3dmanufacturing/2013/01/3dmodel"/>
</Relationships>"#;

/// Triangles of one cube over its local corners 0..8.
///
/// Corners 0-3 are the bottom square and 4-7 the top square, each
/// counter-clockwise seen from above starting at the min corner.
const CUBE_TRIANGLES: [[u32; 3]; 12] = [
    // bottom
    [0, 2, 1],
    [0, 3, 2],
    // top
    [4, 5, 6],
    [4, 6, 7],
    // front
    [0, 1, 5],
    [0, 5, 4],
    // back
    [2, 3, 7],
    [2, 7, 6],
    // left
    [0, 7, 3],
    [0, 4, 7],
    // right
    [1, 2, 6],
    [1, 6, 5],
];

/// Triangle mesh in output units
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExportMesh {
    pub vertices: Vec<[f64; 3]>,
    pub triangles: Vec<[u32; 3]>,
}

impl ExportMesh {
    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    pub fn triangle_count(&self) -> usize {
        self.triangles.len()
    }
}

fn cube_corners(cell: Cell, size: f64) -> [[f64; 3]; 8] {
    let x = cell.x as f64 * size;
    let y = cell.y as f64 * size;
    let z = cell.z as f64 * size;
    let s = size;
    [
        [x, y, z],
        [x + s, y, z],
        [x + s, y + s, z],
        [x, y + s, z],
        [x, y, z + s],
        [x + s, y, z + s],
        [x + s, y + s, z + s],
        [x, y + s, z + s],
    ]
}

/// Build a mesh with one independent 8-vertex, 12-triangle box per cell.
pub fn build_mesh<'a>(cells: impl IntoIterator<Item = &'a Cell>, cube_size: f64) -> ExportMesh {
    let mut mesh = ExportMesh::default();
    let mut offset = 0u32;

    for &cell in cells {
        mesh.vertices.extend_from_slice(&cube_corners(cell, cube_size));
        mesh.triangles.extend(
            CUBE_TRIANGLES
                .iter()
                .map(|[a, b, c]| [a + offset, b + offset, c + offset]),
        );
        offset += 8;
    }

    mesh
}

/// Find the part containing `seed`, enforce the size ceiling, and mesh it.
pub fn mesh_for_part(grid: &VoxelGrid, seed: Cell) -> Result<(HashSet<Cell>, ExportMesh), ExportError> {
    let part = find_part(grid, seed);
    if part.is_empty() {
        return Err(ExportError::EmptyPart);
    }
    if part.len() > MAX_EXPORT_CELLS {
        tracing::warn!(cells = part.len(), limit = MAX_EXPORT_CELLS, "part too large to export");
        return Err(ExportError::PartTooLarge {
            cells: part.len(),
            limit: MAX_EXPORT_CELLS,
        });
    }

    let mesh = build_mesh(&part, EXPORT_CUBE_SIZE_MM);
    Ok((part, mesh))
}

/// Generate the `3D/3dmodel.model` document.
pub fn model_xml(mesh: &ExportMesh) -> Result<String, ExportError> {
    let mut buffer = Vec::new();
    let mut writer = Writer::new_with_indent(Cursor::new(&mut buffer), b' ', 2);

    writer
        .write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))
        .map_err(ExportError::xml)?;

    let mut model = BytesStart::new("model");
    model.push_attribute(("unit", "millimeter"));
    model.push_attribute(("xmlns", NAMESPACE_3MF));
    writer.write_event(Event::Start(model)).map_err(ExportError::xml)?;
    writer
        .write_event(Event::Start(BytesStart::new("resources")))
        .map_err(ExportError::xml)?;

    let mut object = BytesStart::new("object");
    object.push_attribute(("id", "1"));
    object.push_attribute(("type", "model"));
    writer.write_event(Event::Start(object)).map_err(ExportError::xml)?;
    writer
        .write_event(Event::Start(BytesStart::new("mesh")))
        .map_err(ExportError::xml)?;

    writer
        .write_event(Event::Start(BytesStart::new("vertices")))
        .map_err(ExportError::xml)?;
    for [x, y, z] in &mesh.vertices {
        let mut vertex = BytesStart::new("vertex");
        vertex.push_attribute(("x", x.to_string().as_str()));
        vertex.push_attribute(("y", y.to_string().as_str()));
        vertex.push_attribute(("z", z.to_string().as_str()));
        writer.write_event(Event::Empty(vertex)).map_err(ExportError::xml)?;
    }
    writer
        .write_event(Event::End(BytesEnd::new("vertices")))
        .map_err(ExportError::xml)?;

    writer
        .write_event(Event::Start(BytesStart::new("triangles")))
        .map_err(ExportError::xml)?;
    for [v1, v2, v3] in &mesh.triangles {
        let mut triangle = BytesStart::new("triangle");
        triangle.push_attribute(("v1", v1.to_string().as_str()));
        triangle.push_attribute(("v2", v2.to_string().as_str()));
        triangle.push_attribute(("v3", v3.to_string().as_str()));
        writer.write_event(Event::Empty(triangle)).map_err(ExportError::xml)?;
    }
    writer
        .write_event(Event::End(BytesEnd::new("triangles")))
        .map_err(ExportError::xml)?;

    writer
        .write_event(Event::End(BytesEnd::new("mesh")))
        .map_err(ExportError::xml)?;
    writer
        .write_event(Event::End(BytesEnd::new("object")))
        .map_err(ExportError::xml)?;
    writer
        .write_event(Event::End(BytesEnd::new("resources")))
        .map_err(ExportError::xml)?;

    writer
        .write_event(Event::Start(BytesStart::new("build")))
        .map_err(ExportError::xml)?;
    let mut item = BytesStart::new("item");
    item.push_attribute(("objectid", "1"));
    writer.write_event(Event::Empty(item)).map_err(ExportError::xml)?;
    writer
        .write_event(Event::End(BytesEnd::new("build")))
        .map_err(ExportError::xml)?;

    writer
        .write_event(Event::End(BytesEnd::new("model")))
        .map_err(ExportError::xml)?;

    String::from_utf8(buffer).map_err(ExportError::xml)
}

/// Package a mesh as an in-memory 3MF archive.
pub fn serialize_package(mesh: &ExportMesh) -> Result<Vec<u8>, ExportError> {
    let model = model_xml(mesh)?;

    let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
    let options = SimpleFileOptions::default().compression_method(zip::CompressionMethod::Deflated);

    zip.start_file(MODEL_PATH, options).map_err(ExportError::archive)?;
    zip.write_all(model.as_bytes())?;

    zip.start_file(CONTENT_TYPES_PATH, options)
        .map_err(ExportError::archive)?;
    zip.write_all(CONTENT_TYPES_XML.as_bytes())?;

    zip.start_file(RELS_PATH, options).map_err(ExportError::archive)?;
    zip.write_all(RELS_XML.as_bytes())?;

    let cursor = zip.finish().map_err(ExportError::archive)?;
    Ok(cursor.into_inner())
}

/// Safe file name for a requested export destination: basename only,
/// restricted characters, `.3mf` extension.
pub fn package_file_name(requested: &Path) -> String {
    let base = requested
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();
    let mut name = sanitize_filename(&base);
    if name.is_empty() || name.chars().all(|c| c == '.') {
        return DEFAULT_EXPORT_NAME.to_string();
    }
    if !name.to_ascii_lowercase().ends_with(".3mf") {
        name.push_str(".3mf");
    }
    name
}

/// Serialize `mesh` and write it next to `requested`, returning the final path.
///
/// The archive is written to a temporary sibling first and renamed into
/// place, so a failed export never leaves a file at the destination. An
/// existing file is only replaced when its name is exactly the one requested.
pub fn write_package(mesh: &ExportMesh, requested: &Path) -> Result<PathBuf, ExportError> {
    let dir = requested.parent().unwrap_or_else(|| Path::new(""));
    let name = package_file_name(requested);
    let path = dir.join(&name);
    if requested.file_name() != Some(std::ffi::OsStr::new(&name)) && path.exists() {
        tracing::warn!(path = %path.display(), "sanitized export name collides with existing file");
        return Err(ExportError::NameTaken { path });
    }

    let bytes = serialize_package(mesh)?;
    let tmp = path.with_extension("3mf.part");

    if let Err(e) = std::fs::write(&tmp, &bytes).and_then(|()| std::fs::rename(&tmp, &path)) {
        let _ = std::fs::remove_file(&tmp);
        tracing::error!(path = %path.display(), error = %e, "3MF export failed");
        return Err(e.into());
    }

    tracing::info!(
        path = %path.display(),
        vertices = mesh.vertex_count(),
        triangles = mesh.triangle_count(),
        "exported 3MF"
    );
    Ok(path)
}

#[cfg(test)]
mod tests {
    use std::io::Read;

    use super::*;

    fn cells(list: &[(i32, i32, i32)]) -> Vec<Cell> {
        list.iter().map(|&(x, y, z)| Cell::new(x, y, z)).collect()
    }

    #[test]
    fn test_single_cube_mesh() {
        let mesh = build_mesh(&cells(&[(0, 0, 0)]), 10.0);
        assert_eq!(mesh.vertex_count(), 8);
        assert_eq!(mesh.triangle_count(), 12);
        assert_eq!(mesh.vertices[0], [0.0, 0.0, 0.0]);
        assert_eq!(mesh.vertices[6], [10.0, 10.0, 10.0]);
    }

    #[test]
    fn test_two_cubes_not_deduplicated() {
        let mesh = build_mesh(&cells(&[(0, 0, 0), (1, 0, 0)]), 10.0);
        assert_eq!(mesh.vertex_count(), 16);
        assert_eq!(mesh.triangle_count(), 24);
        // Second cube's triangles are offset by 8
        let max_index = mesh.triangles.iter().flatten().copied().max().unwrap();
        assert_eq!(max_index, 15);
        let second_block_min = mesh.triangles[12..].iter().flatten().copied().min().unwrap();
        assert_eq!(second_block_min, 8);
    }

    #[test]
    fn test_cube_offset_and_scale() {
        let mesh = build_mesh(&cells(&[(2, 3, 4)]), 10.0);
        assert_eq!(mesh.vertices[0], [20.0, 30.0, 40.0]);
        assert_eq!(mesh.vertices[6], [30.0, 40.0, 50.0]);
    }

    #[test]
    fn test_mesh_for_part_rejects_empty_seed() {
        let grid: VoxelGrid = cells(&[(0, 0, 0)]).into_iter().collect();
        assert!(matches!(
            mesh_for_part(&grid, Cell::new(1, 1, 1)),
            Err(ExportError::EmptyPart)
        ));
    }

    #[test]
    fn test_mesh_for_part_ceiling() {
        let grid: VoxelGrid = (0..MAX_EXPORT_CELLS as i32 + 1)
            .map(|x| Cell::new(x, 0, 0))
            .collect();
        match mesh_for_part(&grid, Cell::new(0, 0, 0)) {
            Err(ExportError::PartTooLarge { cells, limit }) => {
                assert_eq!(cells, MAX_EXPORT_CELLS + 1);
                assert_eq!(limit, MAX_EXPORT_CELLS);
            }
            other => panic!("expected PartTooLarge, got {other:?}"),
        }
    }

    #[test]
    fn test_mesh_for_part_at_ceiling_is_allowed() {
        let grid: VoxelGrid = (0..MAX_EXPORT_CELLS as i32).map(|x| Cell::new(x, 0, 0)).collect();
        let (part, mesh) = mesh_for_part(&grid, Cell::new(10, 0, 0)).unwrap();
        assert_eq!(part.len(), MAX_EXPORT_CELLS);
        assert_eq!(mesh.triangle_count(), MAX_EXPORT_CELLS * 12);
    }

    #[test]
    fn test_model_xml_structure() {
        let mesh = build_mesh(&cells(&[(0, 0, 0)]), 10.0);
        let xml = model_xml(&mesh).unwrap();
        assert!(xml.starts_with("<?xml"));
        assert!(xml.contains(r#"unit="millimeter""#));
        assert!(xml.contains(NAMESPACE_3MF));
        assert!(xml.contains(r#"<object id="1" type="model">"#));
        assert!(xml.contains(r#"<item objectid="1"/>"#));
        assert_eq!(xml.matches("<vertex ").count(), 8);
        assert_eq!(xml.matches("<triangle ").count(), 12);
    }

    #[test]
    fn test_package_has_three_members() {
        let mesh = build_mesh(&cells(&[(0, 0, 0)]), 10.0);
        let bytes = serialize_package(&mesh).unwrap();
        let mut archive = zip::ZipArchive::new(Cursor::new(bytes)).unwrap();
        assert_eq!(archive.len(), 3);

        let mut model = String::new();
        archive
            .by_name(MODEL_PATH)
            .unwrap()
            .read_to_string(&mut model)
            .unwrap();
        assert!(model.contains("<mesh>"));
        assert!(archive.by_name(CONTENT_TYPES_PATH).is_ok());
        assert!(archive.by_name(RELS_PATH).is_ok());
    }

    #[test]
    fn test_package_file_name() {
        assert_eq!(package_file_name(Path::new("/tmp/my part")), "mypart.3mf");
        assert_eq!(package_file_name(Path::new("thing.3MF")), "thing.3MF");
        assert_eq!(package_file_name(Path::new("../../etc/passwd")), "passwd.3mf");
        assert_eq!(package_file_name(Path::new("/tmp/")), "tmp.3mf");
        assert_eq!(package_file_name(Path::new("###")), DEFAULT_EXPORT_NAME);
    }

    #[test]
    fn test_write_package() {
        let dir = tempfile::tempdir().unwrap();
        let mesh = build_mesh(&cells(&[(0, 0, 0), (0, 0, 1)]), 10.0);
        let path = write_package(&mesh, &dir.path().join("tower")).unwrap();
        assert_eq!(path, dir.path().join("tower.3mf"));
        assert!(path.exists());
        assert!(!dir.path().join("tower.3mf.part").exists());
    }

    #[test]
    fn test_write_package_missing_dir_leaves_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("missing").join("part.3mf");
        let mesh = build_mesh(&cells(&[(0, 0, 0)]), 10.0);
        assert!(matches!(write_package(&mesh, &target), Err(ExportError::Io(_))));
        assert!(!target.exists());
    }
}
