use crate::error::{Error, Result};
use crate::geom::{BBox3, Vec2, Vec3};
use crate::mesh::{Material, MeshDataset, MeshPoint};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Interleaved vertex as uploaded to the GPU.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct VertexRecord {
    pub position: Vec3,
    pub normal: Vec3,
    pub texture: Vec2,
}

/// Slice of the index list drawn with one material.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DrawRange {
    pub group: String,
    pub material: Option<Material>,
    pub first_index: usize,
    pub index_count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RenderableBuffer {
    pub vertices: Vec<VertexRecord>,
    pub indices: Vec<u32>,
    pub ranges: Vec<DrawRange>,
    pub bounding_box: BBox3,
}

impl RenderableBuffer {
    /// Deduplicates the mesh points of every face into a shared vertex
    /// list. Identical mesh points map to the same slot.
    ///
    /// # Panics
    ///
    /// Panics if a face is not a triangle, or if a face corner has no
    /// vertex or one outside the vertex array.
    pub fn build(mesh: &MeshDataset) -> Result<Self> {
        let mut indexer = VertexIndexer::new(mesh);
        let mut ranges = Vec::with_capacity(mesh.groups().len());

        for group in mesh.groups() {
            let material = match &group.material {
                Some(name) => Some(
                    mesh.find_material(name)
                        .cloned()
                        .ok_or_else(|| Error::UnresolvedMaterial {
                            group: group.name.clone(),
                            material: name.clone(),
                        })?,
                ),
                None => None,
            };

            let first_index = indexer.indices.len();
            for face in &group.faces {
                assert!(
                    face.is_triangle(),
                    "face in group {:?} has {} points, expected 3",
                    group.name,
                    face.points.len()
                );
                for point in &face.points {
                    indexer.push(*point);
                }
            }
            ranges.push(DrawRange {
                group: group.name.clone(),
                material,
                first_index,
                index_count: indexer.indices.len() - first_index,
            });
        }

        Ok(Self {
            vertices: indexer.vertices,
            indices: indexer.indices,
            ranges,
            bounding_box: mesh.bounding_box(),
        })
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }
}

struct VertexIndexer<'a> {
    mesh: &'a MeshDataset,
    slots: HashMap<MeshPoint, u32>,
    vertices: Vec<VertexRecord>,
    indices: Vec<u32>,
}

impl<'a> VertexIndexer<'a> {
    fn new(mesh: &'a MeshDataset) -> Self {
        Self {
            mesh,
            slots: HashMap::new(),
            vertices: Vec::new(),
            indices: Vec::with_capacity(mesh.face_count() * 3),
        }
    }

    fn push(&mut self, point: MeshPoint) {
        let slot = match self.slots.get(&point) {
            Some(&slot) => slot,
            None => {
                let slot = self.vertices.len() as u32;
                self.vertices.push(self.record(point));
                self.slots.insert(point, slot);
                slot
            }
        };
        self.indices.push(slot);
    }

    fn record(&self, point: MeshPoint) -> VertexRecord {
        let Some(position) = lookup(self.mesh.vertices(), point.vertex) else {
            panic!("mesh point {point:?} has no vertex in mesh {:?}", self.mesh.name());
        };
        VertexRecord {
            position,
            normal: lookup(self.mesh.normals(), point.normal).unwrap_or(Vec3::ZERO),
            texture: lookup(self.mesh.textures(), point.texture).unwrap_or(Vec2::ZERO),
        }
    }
}

fn lookup<T: Copy>(values: &[T], index: i32) -> Option<T> {
    usize::try_from(index).ok().and_then(|i| values.get(i).copied())
}
