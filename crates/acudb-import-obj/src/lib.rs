//! Wavefront OBJ/MTL subset loader.
//!
//! Understands `mtllib`, `o`, `g`, `usemtl`, `v`, `vn`, `vt` and `f`.
//! Faces are stored as written; triangulation is left to the caller.

mod mtl;

use acudb_core::error::{Error, FormatError, Result};
use acudb_core::geom::{Vec2, Vec3};
use acudb_core::mesh::{Face, Group, Material, MeshDataset, MeshPoint};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

pub use mtl::parse_mtl;

const DEFAULT_GROUP: &str = "default";

pub fn import_obj(path: &Path) -> Result<MeshDataset> {
    let text = std::fs::read_to_string(path).map_err(|e| Error::io(path, e))?;
    let base_dir = path.parent().unwrap_or_else(|| Path::new(""));
    let source_name = path.display().to_string();
    let mesh = ObjImporter::new(base_dir, Some(source_name)).import(&text)?;
    Ok(mesh.with_source(path))
}

/// Parses OBJ text. A referenced material library is read from `base_dir`.
pub fn parse_obj(text: &str, base_dir: &Path) -> Result<MeshDataset> {
    ObjImporter::new(base_dir, None).import(text)
}

struct ObjImporter<'a> {
    base_dir: &'a Path,
    source_name: Option<String>,
    name: String,
    material_lib: Option<PathBuf>,
    vertices: Vec<Vec3>,
    normals: Vec<Vec3>,
    textures: Vec<Vec2>,
    groups: Vec<Group>,
    current: Option<Group>,
}

impl<'a> ObjImporter<'a> {
    fn new(base_dir: &'a Path, source_name: Option<String>) -> Self {
        Self {
            base_dir,
            source_name,
            name: String::new(),
            material_lib: None,
            vertices: Vec::new(),
            normals: Vec::new(),
            textures: Vec::new(),
            groups: Vec::new(),
            current: None,
        }
    }

    fn import(mut self, text: &str) -> Result<MeshDataset> {
        for (idx, line) in text.lines().enumerate() {
            self.parse_line(line, idx + 1)?;
        }
        self.flush_group();

        let materials = match &self.material_lib {
            Some(lib) => self.load_materials(lib)?,
            None => HashMap::new(),
        };

        debug!(
            name = %self.name,
            vertices = self.vertices.len(),
            normals = self.normals.len(),
            textures = self.textures.len(),
            groups = self.groups.len(),
            materials = materials.len(),
            "parsed mesh"
        );

        let source_name = self.source_name.clone();
        let mesh = MeshDataset::new(
            self.name,
            self.vertices,
            self.normals,
            self.textures,
            self.groups,
            materials,
        );
        validate(&mesh).map_err(|err| match source_name {
            Some(name) => err.in_source(name),
            None => err,
        })?;
        Ok(mesh)
    }

    fn parse_line(&mut self, line: &str, line_no: usize) -> Result<()> {
        let mut fields = line.split_whitespace();
        let Some(tag) = fields.next() else {
            return Ok(());
        };
        if tag.starts_with('#') {
            return Ok(());
        }

        match tag.to_ascii_lowercase().as_str() {
            "mtllib" => {
                let file = self.required(fields.next(), "mtllib", line_no)?;
                self.material_lib = Some(self.base_dir.join(file));
            }
            "o" => {
                self.name = fields.collect::<Vec<_>>().join(" ");
            }
            "g" => {
                self.flush_group();
                let name = fields.collect::<Vec<_>>().join(" ");
                self.current = Some(Group::new(if name.is_empty() {
                    DEFAULT_GROUP.to_string()
                } else {
                    name
                }));
            }
            "usemtl" => {
                let material = self.required(fields.next(), "usemtl", line_no)?.to_string();
                let group = self.current_group();
                if group.faces.is_empty() {
                    group.material = Some(material);
                } else {
                    // One material per group: split.
                    let name = group.name.clone();
                    self.flush_group();
                    let mut group = Group::new(name);
                    group.material = Some(material);
                    self.current = Some(group);
                }
            }
            "v" => {
                let v = self.vec3(&mut fields, line_no)?;
                self.vertices.push(v);
            }
            "vn" => {
                let n = self.vec3(&mut fields, line_no)?;
                self.normals.push(n);
            }
            "vt" => {
                let u = self.float(fields.next(), line_no)?;
                let v = self.float(fields.next(), line_no)?;
                self.textures.push(Vec2::new(u, v));
            }
            "f" => {
                let points = fields
                    .map(|tok| self.mesh_point(tok, line_no))
                    .collect::<Result<Vec<_>>>()?;
                if points.is_empty() {
                    return Err(self.error("face without points", line_no).into());
                }
                self.current_group().faces.push(Face::new(points));
            }
            _ => {}
        }
        Ok(())
    }

    fn current_group(&mut self) -> &mut Group {
        self.current.get_or_insert_with(|| Group::new(DEFAULT_GROUP))
    }

    fn flush_group(&mut self) {
        if let Some(group) = self.current.take() {
            if group.faces.is_empty() {
                debug!(group = %group.name, "dropping empty group");
            } else {
                self.groups.push(group);
            }
        }
    }

    fn load_materials(&self, lib: &Path) -> Result<HashMap<String, Material>> {
        let text = std::fs::read_to_string(lib).map_err(|e| Error::io(lib, e))?;
        let materials = parse_mtl(&text, self.base_dir)
            .map_err(|err| err.in_source(lib.display().to_string()))?;
        if materials.is_empty() {
            warn!(path = ?lib, "material library defines no materials");
        }
        Ok(materials)
    }

    // Face token: vertex[/texture][/normal], 1-based.
    fn mesh_point(&self, token: &str, line_no: usize) -> Result<MeshPoint> {
        let mut parts = token.split('/');
        let vertex = self.index(parts.next(), line_no)?;
        let texture = self.index(parts.next(), line_no)?;
        let normal = self.index(parts.next(), line_no)?;
        if parts.next().is_some() {
            return Err(self.error(format!("bad face token {token:?}"), line_no).into());
        }
        if vertex == MeshPoint::ABSENT {
            return Err(self
                .error(format!("face token {token:?} has no vertex index"), line_no)
                .into());
        }
        Ok(MeshPoint::new(vertex, normal, texture))
    }

    fn index(&self, part: Option<&str>, line_no: usize) -> Result<i32> {
        let part = match part {
            None | Some("") => return Ok(MeshPoint::ABSENT),
            Some(p) => p,
        };
        match part.parse::<i32>() {
            Ok(v) if v > 0 => Ok(v - 1),
            _ => Err(self
                .error(format!("index {part:?} is not a positive integer"), line_no)
                .into()),
        }
    }

    fn vec3<'s>(&self, fields: &mut impl Iterator<Item = &'s str>, line_no: usize) -> Result<Vec3> {
        let x = self.float(fields.next(), line_no)?;
        let y = self.float(fields.next(), line_no)?;
        let z = self.float(fields.next(), line_no)?;
        Ok(Vec3::new(x, y, z))
    }

    fn float(&self, field: Option<&str>, line_no: usize) -> Result<f32> {
        let field = self.required(field, "number", line_no)?;
        field
            .parse()
            .map_err(|_| self.error(format!("{field:?} is not a number"), line_no).into())
    }

    fn required<'s>(&self, field: Option<&'s str>, what: &str, line_no: usize) -> Result<&'s str> {
        field.ok_or_else(|| self.error(format!("missing {what}"), line_no).into())
    }

    fn error(&self, message: impl Into<String>, line_no: usize) -> FormatError {
        let err = FormatError::at_line(message, line_no);
        match &self.source_name {
            Some(name) => err.in_source(name.clone()),
            None => err,
        }
    }
}

fn validate(mesh: &MeshDataset) -> std::result::Result<(), FormatError> {
    if mesh.vertices().is_empty() {
        return Err(FormatError::new("mesh has no vertices"));
    }
    if mesh.normals().is_empty() {
        return Err(FormatError::new("mesh has no normals"));
    }
    if mesh.textures().is_empty() {
        return Err(FormatError::new("mesh has no texture coordinates"));
    }
    if mesh.face_count() == 0 {
        return Err(FormatError::new("mesh has no faces"));
    }
    if let Some(p) = mesh.find_out_of_bounds() {
        return Err(FormatError::new(format!(
            "face index out of range: vertex {} normal {} texture {}",
            p.vertex, p.normal, p.texture
        )));
    }
    Ok(())
}
