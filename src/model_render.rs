//! Static render data of a Bsp model: nodes are bucketed by material into elements, and
//! every element's triangles are written into one shared index buffer per material.

use std::collections::HashMap;
use std::sync::Arc;
use parking_lot::{Mutex, RwLock};
use crate::box_::FBox;
use crate::dynamic_index_buffer::{face_vertex_range, FModelDynamicIndexBuffer, FPrimitiveDrawInterface};
use crate::error::{ModelError, RenderError};
use crate::fpoly::EPolyFlags;
use crate::material::UMaterialRef;
use crate::model::UModel;

#[derive(Clone, Debug, Default, PartialEq)]
pub struct FRawIndexBuffer {
    pub indices: Vec<u32>,
}

/// Index buffers shared by every element drawn with the same material.
pub type FMaterialIndexBuffers = HashMap<UMaterialRef, FRawIndexBuffer>;

/// The nodes of a component that share a material, and where their triangles live in
/// that material's index buffer.
#[derive(Clone, Debug, PartialEq)]
pub struct FModelElement {
    pub material: UMaterialRef,
    pub nodes: Vec<usize>,
    pub first_index: usize,
    pub num_triangles: usize,
    pub min_vertex_index: u32,
    pub max_vertex_index: u32,
    pub bounding_box: FBox,
}

impl FModelElement {
    pub fn new(material: UMaterialRef) -> FModelElement {
        FModelElement {
            material,
            nodes: Vec::new(),
            first_index: 0,
            num_triangles: 0,
            min_vertex_index: u32::MAX,
            max_vertex_index: 0,
            bounding_box: FBox::default(),
        }
    }

    /// Clears everything the render-data build accumulates.
    fn reset(&mut self, first_index: usize) {
        self.first_index = first_index;
        self.num_triangles = 0;
        self.min_vertex_index = u32::MAX;
        self.max_vertex_index = 0;
        self.bounding_box = FBox::default();
    }

    /// The element's indices within its material buffer.
    pub fn indices<'a>(&self, index_buffers: &'a FMaterialIndexBuffers) -> Option<&'a [u32]> {
        index_buffers
            .get(&self.material)
            .and_then(|buffer| buffer.indices.get(self.first_index..self.first_index + self.num_triangles * 3))
    }
}

/// A renderable chunk of a model: a list of nodes, split into per-material elements.
#[derive(Clone, Debug, PartialEq)]
pub struct UModelComponent {
    pub component_index: usize,
    pub zone_index: Option<u8>,
    pub nodes: Vec<usize>,
    pub elements: Vec<FModelElement>,
}

impl UModelComponent {
    pub fn new(component_index: usize, zone_index: Option<u8>, nodes: Vec<usize>) -> UModelComponent {
        UModelComponent {
            component_index,
            zone_index,
            nodes,
            elements: Vec::new(),
        }
    }

    /// Groups the component's nodes into one element per material, in the order the
    /// materials are first seen, and links each node back to its component and element.
    pub fn generate_elements(&mut self, model: &mut UModel) -> Result<(), ModelError> {
        self.elements.clear();
        let mut element_by_material: HashMap<UMaterialRef, usize> = HashMap::new();

        for (component_node_index, &node_index) in self.nodes.iter().enumerate() {
            let (_, surface) = model.node_surface(node_index)?;
            let element_index = *element_by_material.entry(surface.material.clone()).or_insert_with(|| {
                self.elements.push(FModelElement::new(surface.material.clone()));
                self.elements.len() - 1
            });
            self.elements[element_index].nodes.push(node_index);

            let node = &mut model.nodes[node_index];
            node.component_index = Some(self.component_index);
            node.component_node_index = Some(component_node_index);
            node.component_element_index = Some(element_index);
        }

        log::debug!("Component {}: {} nodes in {} elements", self.component_index, self.nodes.len(), self.elements.len());
        Ok(())
    }

    pub fn triangle_count(&self) -> usize {
        self.elements.iter().map(|element| element.num_triangles).sum()
    }

    /// Appends every element's triangles to its material's index buffer and recomputes
    /// the element's index range, vertex range and bounds.
    pub fn build_render_data(&mut self, model: &UModel, index_buffers: &mut FMaterialIndexBuffers) -> Result<(), RenderError> {
        for element in &mut self.elements {
            let index_buffer = index_buffers.entry(element.material.clone()).or_default();
            element.reset(index_buffer.indices.len());

            for &node_index in &element.nodes {
                let (node, surface) = model.node_surface(node_index)?;

                // Don't put portal polygons in the static index buffer.
                if surface.is_portal() || node.vertex_count < 3 {
                    continue;
                }

                for back_face in 0..surface.face_count() {
                    for point in model.node_points(node_index)? {
                        element.bounding_box += *point;
                    }

                    let (base_vertex_index, last_vertex_index) = face_vertex_range(node, back_face)?;
                    for vertex_index in 2..node.vertex_count as u32 {
                        index_buffer.indices.push(base_vertex_index);
                        index_buffer.indices.push(base_vertex_index + vertex_index);
                        index_buffer.indices.push(base_vertex_index + vertex_index - 1);
                        element.num_triangles += 1;
                    }
                    element.min_vertex_index = element.min_vertex_index.min(base_vertex_index);
                    element.max_vertex_index = element.max_vertex_index.max(last_vertex_index);
                }
            }
        }
        Ok(())
    }
}

/// Builds fresh index buffers for `components`, in order. Each call starts from empty
/// buffers, so rebuilding an unchanged model yields identical data.
pub fn build_render_data(model: &UModel, components: &mut [UModelComponent]) -> Result<FMaterialIndexBuffers, RenderError> {
    let mut index_buffers = FMaterialIndexBuffers::new();
    for component in components.iter_mut() {
        component.build_render_data(model, &mut index_buffers)?;
    }
    log::info!(
        "Built model render data: {} components, {} materials, {} indices",
        components.len(),
        index_buffers.len(),
        index_buffers.values().map(|buffer| buffer.indices.len()).sum::<usize>()
    );
    Ok(index_buffers)
}

/// One complete, consistent set of render data.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct FModelRenderData {
    pub components: Vec<UModelComponent>,
    pub index_buffers: FMaterialIndexBuffers,
}

/// Render data shared between the thread that edits geometry and the threads that draw.
/// Rebuilds happen on a private copy that is swapped in whole, so readers only ever see
/// complete data.
#[derive(Debug, Default)]
pub struct FModelRenderResources {
    current: RwLock<Arc<FModelRenderData>>,
    rebuild_lock: Mutex<()>,
}

impl FModelRenderResources {
    pub fn new(components: Vec<UModelComponent>) -> FModelRenderResources {
        FModelRenderResources {
            current: RwLock::new(Arc::new(FModelRenderData { components, index_buffers: FMaterialIndexBuffers::new() })),
            rebuild_lock: Mutex::new(()),
        }
    }

    pub fn snapshot(&self) -> Arc<FModelRenderData> {
        self.current.read().clone()
    }

    /// Rebuilds the render data for `model` and publishes it. On error the previous data
    /// stays current.
    pub fn rebuild(&self, model: &UModel) -> Result<Arc<FModelRenderData>, RenderError> {
        let _rebuilding = self.rebuild_lock.lock();
        let mut components = self.snapshot().components.clone();
        let index_buffers = build_render_data(model, &mut components)?;
        let render_data = Arc::new(FModelRenderData { components, index_buffers });
        *self.current.write() = render_data.clone();
        Ok(render_data)
    }
}

/// Draws the nodes of `component` whose surfaces carry `flag` (e.g. selected or hovered)
/// through a dynamic index buffer, one batch per element. Portals and surfaces hidden in
/// the editor are left out. The buffer is sized from the element triangle counts, so the
/// component's render data must be built first. Returns the number of batches drawn.
pub fn draw_surface_highlights(
    model: &UModel,
    component: &UModelComponent,
    flag: EPolyFlags,
    pdi: &mut dyn FPrimitiveDrawInterface,
    highlight_material: Option<&UMaterialRef>,
) -> Result<usize, RenderError> {
    let mut index_buffer = FModelDynamicIndexBuffer::new(component.triangle_count() * 3);
    let mut batch_count = 0;

    for element in &component.elements {
        for &node_index in &element.nodes {
            let (_, surface) = model.node_surface(node_index)?;
            if surface.poly_flags.contains(flag) && !surface.poly_flags.intersects(EPolyFlags::Portal | EPolyFlags::HiddenEd) {
                index_buffer.add_node(model, node_index, component.zone_index)?;
            }
        }
        if index_buffer.draw(pdi, highlight_material.unwrap_or(&element.material)) {
            batch_count += 1;
        }
    }
    Ok(batch_count)
}
