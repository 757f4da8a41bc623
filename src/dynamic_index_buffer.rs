//! Per-frame index buffer for drawing arbitrary subsets of a model's nodes, such as the
//! selected or hovered surfaces, without touching the static index buffers.

use arrayvec::ArrayVec;

use crate::error::{ModelError, RenderError};
use crate::material::UMaterialRef;
use crate::model::{FBspNode, UModel};

/// One draw call: a range of triangles in an index buffer, drawn with a material.
#[derive(Clone, Debug, PartialEq)]
pub struct FMeshBatch<'a> {
    pub material: &'a UMaterialRef,
    pub index_buffer: &'a [u32],
    pub first_index: usize,
    pub num_primitives: usize,
    pub min_vertex_index: u32,
    pub max_vertex_index: u32,
}

impl FMeshBatch<'_> {
    /// The indices this batch draws.
    pub fn indices(&self) -> &[u32] {
        &self.index_buffer[self.first_index..self.first_index + self.num_primitives * 3]
    }
}

/// Receives the draw calls issued by the model renderer.
pub trait FPrimitiveDrawInterface {
    fn draw_mesh(&mut self, mesh: &FMeshBatch<'_>);
}

/// First and last vertex buffer index of one face of a node with at least one vertex.
/// Face 1 is the back face of a two-sided surface, stored right after the front face.
pub(crate) fn face_vertex_range(node: &FBspNode, back_face: usize) -> Result<(u32, u32), ModelError> {
    let base_vertex_index = back_face
        .checked_mul(node.vertex_count)
        .and_then(|offset| node.first_vertex_index.checked_add(offset))
        .ok_or(ModelError::VertexIndexOverflow(node.first_vertex_index))?;
    let last_vertex_index = base_vertex_index
        .checked_add(node.vertex_count.saturating_sub(1))
        .ok_or(ModelError::VertexIndexOverflow(base_vertex_index))?;
    let to_u32 = |vertex_index: usize| u32::try_from(vertex_index).map_err(|_| ModelError::VertexIndexOverflow(vertex_index));
    Ok((to_u32(base_vertex_index)?, to_u32(last_vertex_index)?))
}

/// A fixed-capacity buffer of 32-bit indices. Nodes are appended while the buffer is
/// locked; `draw` unlocks it, submits everything appended since the previous draw as one
/// batch, then locks the remaining space for the next batch.
#[derive(Debug)]
pub struct FModelDynamicIndexBuffer {
    indices: Vec<u32>,
    first_index: usize,
    next_index: usize,
    min_vertex_index: u32,
    max_vertex_index: u32,
    total_indices: usize,
    locked: bool,
}

impl FModelDynamicIndexBuffer {
    pub fn new(total_indices: usize) -> FModelDynamicIndexBuffer {
        let mut buffer = FModelDynamicIndexBuffer {
            indices: vec![0; total_indices],
            first_index: 0,
            next_index: 0,
            min_vertex_index: u32::MAX,
            max_vertex_index: 0,
            total_indices,
            locked: false,
        };
        if total_indices > 0 {
            buffer.lock();
        }
        buffer
    }

    pub fn total_indices(&self) -> usize {
        self.total_indices
    }

    pub fn first_index(&self) -> usize {
        self.first_index
    }

    pub fn next_index(&self) -> usize {
        self.next_index
    }

    pub fn is_locked(&self) -> bool {
        self.locked
    }

    /// Vertex index range referenced since the last draw, if anything was added.
    pub fn vertex_index_range(&self) -> Option<(u32, u32)> {
        (self.next_index > self.first_index).then_some((self.min_vertex_index, self.max_vertex_index))
    }

    /// Appends the triangle fan of every face of `node_index` that lies in `zone_index`
    /// (any zone when `None`). The front face is in the node's front zone, the back face
    /// of a two-sided surface in its back zone.
    pub fn add_node(&mut self, model: &UModel, node_index: usize, zone_index: Option<u8>) -> Result<(), RenderError> {
        let (node, surface) = model.node_surface(node_index)?;
        if node.vertex_count < 3 {
            return Ok(());
        }

        let faces: ArrayVec<usize, 2> = (0..surface.face_count())
            .filter(|&back_face| zone_index.map_or(true, |zone_index| node.zone[1 - back_face] == zone_index))
            .collect();
        if faces.is_empty() {
            return Ok(());
        }
        if !self.locked {
            return Err(RenderError::BufferNotLocked);
        }

        // A node goes in whole or not at all.
        let requested = node.triangle_count() * 3 * faces.len();
        if self.next_index + requested > self.total_indices {
            return Err(RenderError::CapacityExceeded {
                next_index: self.next_index,
                requested,
                capacity: self.total_indices,
            });
        }
        let ranges = faces
            .iter()
            .map(|&back_face| face_vertex_range(node, back_face))
            .collect::<Result<ArrayVec<(u32, u32), 2>, ModelError>>()?;

        for (base_vertex_index, last_vertex_index) in ranges {
            let mut cursor = self.next_index;
            for vertex_index in 2..node.vertex_count as u32 {
                self.indices[cursor] = base_vertex_index;
                self.indices[cursor + 1] = base_vertex_index + vertex_index;
                self.indices[cursor + 2] = base_vertex_index + vertex_index - 1;
                cursor += 3;
            }
            self.next_index = cursor;
            self.min_vertex_index = self.min_vertex_index.min(base_vertex_index);
            self.max_vertex_index = self.max_vertex_index.max(last_vertex_index);
        }
        Ok(())
    }

    /// Submits the nodes added since the last draw. Returns whether a batch was drawn.
    pub fn draw(&mut self, pdi: &mut dyn FPrimitiveDrawInterface, material: &UMaterialRef) -> bool {
        if self.next_index <= self.first_index {
            return false;
        }

        self.unlock();
        let mesh = FMeshBatch {
            material,
            index_buffer: &self.indices,
            first_index: self.first_index,
            num_primitives: (self.next_index - self.first_index) / 3,
            min_vertex_index: self.min_vertex_index,
            max_vertex_index: self.max_vertex_index,
        };
        log::trace!("Dynamic index buffer draw: {} triangles from index {}", mesh.num_primitives, mesh.first_index);
        pdi.draw_mesh(&mesh);
        self.first_index = self.next_index;
        self.lock();
        true
    }

    fn lock(&mut self) {
        if self.next_index < self.total_indices {
            self.locked = true;
            self.min_vertex_index = u32::MAX;
            self.max_vertex_index = 0;
        }
    }

    fn unlock(&mut self) {
        self.locked = false;
    }
}
