use acudb_core::error::Error;
use acudb_core::geom::Vec3;
use acudb_core::mesh::MeshPoint;
use acudb_core::renderable::RenderableBuffer;
use acudb_import_obj::{import_obj, parse_mtl, parse_obj};
use std::path::Path;

const TORSO_OBJ: &str = "\
# exported body mesh
mtllib torso.mtl
o Torso
v 0 0 0
v 1 0 0
v 1 1 0
v 0 1 1
vn 0 0 1
VT 0 0
vt 1 0
vt 1 1
g chest
usemtl skin
f 1/1/1 2/2/1 3/3/1
f 1/1/1 3/3/1 4//1
g back
f 2/2/1 3/3/1 4/1/1
";

const TORSO_MTL: &str = "\
newmtl skin
Ka 0.1 0.1 0.1
Kd 0.9 0.7 0.6
Ks 0 0 0
d 0.5
Ns 10
map_Kd textures/skin.png

newmtl bone
Kd 1 1 1
";

fn write_mesh(dir: &Path) -> std::path::PathBuf {
    std::fs::write(dir.join("torso.mtl"), TORSO_MTL).unwrap();
    let path = dir.join("torso.obj");
    std::fs::write(&path, TORSO_OBJ).unwrap();
    path
}

#[test]
fn loads_mesh_with_groups_and_materials() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_mesh(dir.path());

    let mesh = import_obj(&path).expect("import");
    assert_eq!("Torso", mesh.name());
    assert_eq!(Some(path.as_path()), mesh.source());
    assert_eq!(4, mesh.vertices().len());
    assert_eq!(1, mesh.normals().len());
    assert_eq!(3, mesh.textures().len());
    assert_eq!(3, mesh.face_count());

    let groups = mesh.groups();
    assert_eq!(2, groups.len());
    assert_eq!("chest", groups[0].name);
    assert_eq!(Some("skin"), groups[0].material.as_deref());
    assert_eq!(2, groups[0].faces.len());
    assert_eq!("back", groups[1].name);
    assert_eq!(None, groups[1].material);

    // 1-based tokens become 0-based; an empty texture slot becomes -1.
    assert_eq!(MeshPoint::new(0, 0, 0), groups[0].faces[0].points[0]);
    assert_eq!(MeshPoint::new(3, 0, -1), groups[0].faces[1].points[2]);

    let skin = mesh.material("skin");
    assert_eq!(Vec3::new(0.9, 0.7, 0.6), skin.diffuse);
    assert_eq!(0.5, skin.dissolve);
    assert_eq!(10.0, skin.specular_exponent);
    assert_eq!(
        Some(dir.path().join("textures/skin.png")),
        skin.texture.clone()
    );
    assert!(mesh.find_material("bone").is_some());
    assert!(mesh.find_out_of_bounds().is_none());
}

#[test]
fn loaded_mesh_indexes_into_renderable_buffer() {
    let dir = tempfile::tempdir().unwrap();
    let mesh = import_obj(&write_mesh(dir.path())).expect("import");

    let buffer = RenderableBuffer::build(&mesh).expect("build");
    assert_eq!(9, buffer.indices.len());
    // Distinct corners: 1/1/1, 2/2/1, 3/3/1, 4//1, 4/1/1.
    assert_eq!(5, buffer.vertices.len());
    assert_eq!(2, buffer.ranges.len());
    assert_eq!(6, buffer.ranges[0].index_count);
    assert_eq!(6, buffer.ranges[1].first_index);
}

#[test]
fn usemtl_after_faces_splits_group() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("m.mtl"), "newmtl a\nnewmtl b\n").unwrap();
    let text = "mtllib m.mtl\nv 0 0 0\nv 1 0 0\nv 0 1 0\nvn 0 0 1\nvt 0 0\n\
                usemtl a\nf 1/1/1 2/1/1 3/1/1\nusemtl b\nf 3/1/1 2/1/1 1/1/1\n";
    let mesh = parse_obj(text, dir.path()).expect("parse");

    let groups = mesh.groups();
    assert_eq!(2, groups.len());
    assert_eq!("default", groups[0].name);
    assert_eq!(Some("a"), groups[0].material.as_deref());
    assert_eq!("default", groups[1].name);
    assert_eq!(Some("b"), groups[1].material.as_deref());
}

#[test]
fn non_numeric_face_index_reports_line() {
    let text = "v 0 0 0\nvn 0 0 1\nvt 0 0\nf 1/1/1 x/1/1 1/1/1\n";
    let err = parse_obj(text, Path::new(".")).unwrap_err();
    assert_eq!(Some(4), err.line());
    assert!(err.to_string().contains("not a positive integer"));
}

#[test]
fn zero_index_is_rejected() {
    let text = "v 0 0 0\nvn 0 0 1\nvt 0 0\nf 0/1/1 1/1/1 1/1/1\n";
    assert!(matches!(
        parse_obj(text, Path::new(".")),
        Err(Error::Format(_))
    ));
}

#[test]
fn out_of_range_index_is_rejected() {
    let text = "v 0 0 0\nvn 0 0 1\nvt 0 0\nf 1/1/1 2/1/1 1/1/2\n";
    let err = parse_obj(text, Path::new(".")).unwrap_err();
    assert!(err.to_string().contains("out of range"), "{err}");
}

#[test]
fn mesh_without_normals_is_rejected() {
    let text = "v 0 0 0\nvt 0 0\nf 1/1 1/1 1/1\n";
    let err = parse_obj(text, Path::new(".")).unwrap_err();
    assert!(err.to_string().contains("no normals"), "{err}");
}

#[test]
fn missing_material_library_is_an_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let text = "mtllib nowhere.mtl\nv 0 0 0\nvn 0 0 1\nvt 0 0\nf 1/1/1 1/1/1 1/1/1\n";
    assert!(matches!(
        parse_obj(text, dir.path()),
        Err(Error::Io { .. })
    ));
}

#[test]
fn malformed_material_library_is_a_format_error() {
    let err = parse_mtl("Kd 1 1 1\n", Path::new(".")).unwrap_err();
    assert_eq!(Some(1), err.line);

    let err = parse_mtl("newmtl a\nKs 1 one 1\n", Path::new(".")).unwrap_err();
    assert_eq!(Some(2), err.line);
}

#[test]
fn dissolve_options_precede_the_value() {
    let materials = parse_mtl("newmtl glass\nd -halo 0.25\n", Path::new(".")).expect("parse");
    assert_eq!(0.25, materials["glass"].dissolve);

    let materials = parse_mtl("newmtl glass\nTr 0.25\n", Path::new(".")).expect("parse");
    assert_eq!(0.75, materials["glass"].dissolve);
}
