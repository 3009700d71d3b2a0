use crate::geom::{BBox3, Vec2, Vec3};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;

/// One face corner: indices into the vertex, normal and texture arrays of a
/// [`MeshDataset`]. `-1` marks an absent component.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct MeshPoint {
    pub vertex: i32,
    pub normal: i32,
    pub texture: i32,
}

impl MeshPoint {
    pub const ABSENT: i32 = -1;

    pub const fn new(vertex: i32, normal: i32, texture: i32) -> Self {
        Self {
            vertex,
            normal,
            texture,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Face {
    pub points: Vec<MeshPoint>,
}

impl Face {
    pub fn new(points: Vec<MeshPoint>) -> Self {
        Self { points }
    }

    pub fn is_triangle(&self) -> bool {
        self.points.len() == 3
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Material {
    pub name: String,
    pub ambient: Vec3,
    pub diffuse: Vec3,
    pub specular: Vec3,
    /// Opacity, 1.0 is fully opaque.
    pub dissolve: f32,
    pub specular_exponent: f32,
    pub optical_density: f32,
    pub texture: Option<PathBuf>,
}

impl Material {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ambient: Vec3::ZERO,
            diffuse: Vec3::new(0.8, 0.8, 0.8),
            specular: Vec3::ZERO,
            dissolve: 1.0,
            specular_exponent: 0.0,
            optical_density: 1.0,
            texture: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Group {
    pub name: String,
    pub material: Option<String>,
    pub faces: Vec<Face>,
}

impl Group {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            material: None,
            faces: Vec::new(),
        }
    }

    pub fn triangle_count(&self) -> usize {
        self.faces.iter().filter(|f| f.is_triangle()).count()
    }
}

/// A loaded mesh. Immutable once constructed; the bounding box is computed
/// in [`MeshDataset::new`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MeshDataset {
    name: String,
    source: Option<PathBuf>,
    vertices: Vec<Vec3>,
    normals: Vec<Vec3>,
    textures: Vec<Vec2>,
    groups: Vec<Group>,
    materials: HashMap<String, Material>,
    bounding_box: BBox3,
}

impl MeshDataset {
    pub fn new(
        name: impl Into<String>,
        vertices: Vec<Vec3>,
        normals: Vec<Vec3>,
        textures: Vec<Vec2>,
        groups: Vec<Group>,
        materials: HashMap<String, Material>,
    ) -> Self {
        let bounding_box = BBox3::from_points(&vertices);
        Self {
            name: name.into(),
            source: None,
            vertices,
            normals,
            textures,
            groups,
            materials,
            bounding_box,
        }
    }

    pub fn with_source(mut self, source: impl Into<PathBuf>) -> Self {
        self.source = Some(source.into());
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn source(&self) -> Option<&std::path::Path> {
        self.source.as_deref()
    }

    pub fn vertices(&self) -> &[Vec3] {
        &self.vertices
    }

    pub fn normals(&self) -> &[Vec3] {
        &self.normals
    }

    pub fn textures(&self) -> &[Vec2] {
        &self.textures
    }

    pub fn groups(&self) -> &[Group] {
        &self.groups
    }

    pub fn materials(&self) -> &HashMap<String, Material> {
        &self.materials
    }

    pub fn bounding_box(&self) -> BBox3 {
        self.bounding_box
    }

    pub fn faces(&self) -> impl Iterator<Item = &Face> {
        self.groups.iter().flat_map(|g| g.faces.iter())
    }

    pub fn face_count(&self) -> usize {
        self.groups.iter().map(|g| g.faces.len()).sum()
    }

    pub fn find_material(&self, name: &str) -> Option<&Material> {
        self.materials.get(name)
    }

    /// # Panics
    ///
    /// Panics if no material named `name` exists.
    pub fn material(&self, name: &str) -> &Material {
        match self.materials.get(name) {
            Some(m) => m,
            None => panic!("material {name:?} is not defined in mesh {:?}", self.name),
        }
    }

    /// First mesh point whose indices fall outside the corresponding
    /// array, if any.
    pub fn find_out_of_bounds(&self) -> Option<MeshPoint> {
        let ok = |idx: i32, len: usize| idx == MeshPoint::ABSENT || (idx >= 0 && (idx as usize) < len);
        self.faces()
            .flat_map(|f| f.points.iter())
            .find(|p| {
                !(ok(p.vertex, self.vertices.len())
                    && ok(p.normal, self.normals.len())
                    && ok(p.texture, self.textures.len()))
            })
            .copied()
    }
}
