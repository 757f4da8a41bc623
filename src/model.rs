use cgmath::InnerSpace;
use crate::error::ModelError;
use crate::fpoly::{EPolyFlags, FPoly};
use crate::material::UMaterialRef;
use crate::math::{basis_determinant_sign, create_orthonormal_basis, FPlane, FVector, FVector2D, FVector4};
use crate::math::{THRESH_POINTS_ARE_NEAR, THRESH_POINTS_ARE_SAME};

/// Max vertices in a Bsp node, pre clipping.
pub const BSP_NODE_MAX_NODE_VERTICES: usize = 16;
/// Max vertices in a Bsp node, post clipping.
pub const BSP_NODE_MAX_FINAL_VERTICES: usize = 24;

/// Two vectors are near if within this distance and can be combined.
const THRESH_VECTORS_ARE_NEAR: f32 = 0.0004;

/// One Bsp polygon.  Lists all of the properties associated with the
/// polygon's plane.  Does not include a point list; the actual points
/// are stored along with Bsp nodes, since several nodes which lie in the
/// same plane may reference the same poly.
#[derive(Clone, Debug, PartialEq)]
pub struct FBspSurf {
    pub material: UMaterialRef,
    pub poly_flags: EPolyFlags,
    pub base_point_index: usize,
    pub normal_index: usize,
    pub texture_u_index: usize,
    pub texture_v_index: usize,
    pub plane: FPlane,
}

impl Default for FBspSurf {
    fn default() -> Self {
        FBspSurf {
            material: UMaterialRef::default_material(),
            poly_flags: EPolyFlags::empty(),
            base_point_index: 0,
            normal_index: 0,
            texture_u_index: 0,
            texture_v_index: 0,
            plane: FPlane::new(),
        }
    }
}

impl FBspSurf {
    pub fn is_portal(&self) -> bool {
        self.poly_flags.contains(EPolyFlags::Portal)
    }

    pub fn is_two_sided(&self) -> bool {
        self.poly_flags.contains(EPolyFlags::TwoSided)
    }

    /// Number of faces the surface is drawn with: the front, plus a mirrored back for
    /// two-sided surfaces.
    pub fn face_count(&self) -> usize {
        if self.is_two_sided() { 2 } else { 1 }
    }
}

/// One convex face of the Bsp. A node may have 0 or 3 to `BSP_NODE_MAX_NODE_VERTICES`
/// vertices; a node with zero vertices only splits space and is never drawn.
#[derive(Clone, Debug, PartialEq)]
pub struct FBspNode {
    /// Plane the node falls into (X, Y, Z, W).
    pub plane: FPlane,
    /// Index of first vertex in vertex pool.
    pub vertex_pool_index: usize,
    /// Number of vertices in node.
    pub vertex_count: usize,
    /// Index to surface information.
    pub surface_index: usize,
    /// Visibility zone in 1=front, 0=back.
    pub zone: [u8; 2],
    /// Index of the node's first vertex in the model vertex buffer.
    pub first_vertex_index: usize,
    /// Model component the node is drawn by.
    pub component_index: Option<usize>,
    /// Position of the node in its component's node list.
    pub component_node_index: Option<usize>,
    /// Element of the component that holds the node's triangles.
    pub component_element_index: Option<usize>,
}

impl Default for FBspNode {
    fn default() -> Self {
        Self::new()
    }
}

impl FBspNode {

    pub fn new() -> FBspNode {
        FBspNode {
            plane: FPlane::new(),
            vertex_pool_index: 0,
            vertex_count: 0,
            surface_index: 0,
            zone: [0, 0],
            first_vertex_index: 0,
            component_index: None,
            component_node_index: None,
            component_element_index: None,
        }
    }

    /// Number of triangles a fan over this node's polygon produces, per face.
    pub fn triangle_count(&self) -> usize {
        self.vertex_count.saturating_sub(2)
    }
}

/// One vertex associated with a Bsp node's polygon.  Contains a vertex index
/// into the level's FPoints table, and a unique number which is common to all
/// other sides in the level which are cospatial with this side.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FVert {
    pub point_index: usize,
    pub side_index: Option<usize>,
    /// Light-map coordinate of the front face.
    pub shadow_tex_coord: FVector2D,
    /// Light-map coordinate of the back face of a two-sided surface.
    pub backface_shadow_tex_coord: FVector2D,
}

impl FVert {
    pub fn new(point_index: usize) -> FVert {
        FVert {
            point_index,
            side_index: None,
            shadow_tex_coord: FVector2D::new(0.0, 0.0),
            backface_shadow_tex_coord: FVector2D::new(0.0, 0.0),
        }
    }
}

/// A vertex of the model's render vertex buffer.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FModelVertex {
    pub position: FVector,
    pub tex_coord: FVector2D,
    pub shadow_tex_coord: FVector2D,
    pub tangent_x: FVector,
    /// Normal, with the basis determinant sign in `w`.
    pub tangent_z: FVector4,
}

#[derive(Clone, Debug, PartialEq, Default)]
pub struct UModel {
    pub vertices: Vec<FVert>,
    pub points: Vec<FVector>,
    pub vectors: Vec<FVector>,
    pub nodes: Vec<FBspNode>,
    pub surfaces: Vec<FBspSurf>,
    /// Render vertices, filled by `build_vertex_buffer`.
    pub vertex_buffer: Vec<FModelVertex>,
}

impl UModel {
    pub fn new() -> UModel {
        UModel::default()
    }

    pub fn node(&self, node_index: usize) -> Result<&FBspNode, ModelError> {
        self.nodes.get(node_index).ok_or(ModelError::NodeOutOfRange {
            node_index,
            node_count: self.nodes.len(),
        })
    }

    /// The surface `surface_index`, as referenced by node `node_index`.
    pub fn surface(&self, surface_index: usize, node_index: usize) -> Result<&FBspSurf, ModelError> {
        self.surfaces.get(surface_index).ok_or(ModelError::SurfaceOutOfRange {
            node_index,
            surface_index,
            surface_count: self.surfaces.len(),
        })
    }

    pub fn node_surface(&self, node_index: usize) -> Result<(&FBspNode, &FBspSurf), ModelError> {
        let node = self.node(node_index)?;
        Ok((node, self.surface(node.surface_index, node_index)?))
    }

    /// The run of vertices owned by a node.
    pub fn node_vertex_pool(&self, node_index: usize) -> Result<&[FVert], ModelError> {
        let node = self.node(node_index)?;
        let start = node.vertex_pool_index;
        let end = start + node.vertex_count;
        self.vertices.get(start..end).ok_or(ModelError::VertexPoolOutOfRange {
            node_index,
            start,
            end,
            vertex_count: self.vertices.len(),
        })
    }

    /// Position of every vertex of a node, in pool order.
    pub fn node_points(&self, node_index: usize) -> Result<impl Iterator<Item = &FVector> + '_, ModelError> {
        let node = self.node(node_index)?;
        let pool = self.node_vertex_pool(node_index)?;
        for (i, vert) in pool.iter().enumerate() {
            if vert.point_index >= self.points.len() {
                return Err(ModelError::PointOutOfRange {
                    vertex_index: node.vertex_pool_index + i,
                    point_index: vert.point_index,
                    point_count: self.points.len(),
                });
            }
        }
        Ok(pool.iter().map(move |vert| &self.points[vert.point_index]))
    }

    /// Checks every index the model stores against the array it points into.
    pub fn validate(&self) -> Result<(), ModelError> {
        for (surface_index, surface) in self.surfaces.iter().enumerate() {
            for vector_index in [surface.normal_index, surface.texture_u_index, surface.texture_v_index] {
                if vector_index >= self.vectors.len() {
                    return Err(ModelError::VectorOutOfRange {
                        surface_index,
                        vector_index,
                        vector_count: self.vectors.len(),
                    });
                }
            }
            if surface.base_point_index >= self.points.len() {
                return Err(ModelError::SurfacePointOutOfRange {
                    surface_index,
                    point_index: surface.base_point_index,
                    point_count: self.points.len(),
                });
            }
        }

        for node_index in 0..self.nodes.len() {
            let (node, _) = self.node_surface(node_index)?;
            if node.vertex_count > BSP_NODE_MAX_NODE_VERTICES {
                return Err(ModelError::TooManyVertices {
                    node_index,
                    vertex_count: node.vertex_count,
                    max: BSP_NODE_MAX_NODE_VERTICES,
                });
            }
            self.node_points(node_index)?;
        }
        Ok(())
    }

    /// Add a new point to the model, merging near-duplicates, and return its index.
    pub fn add_point(&mut self, v: FVector, exact: bool) -> usize {
        let thresh = if exact { THRESH_POINTS_ARE_SAME } else { THRESH_POINTS_ARE_NEAR };
        add_thing(&mut self.points, v, thresh)
    }

    /// Add a new vector to the model, merging near-duplicates, and return its index.
    pub fn add_vector(&mut self, v: FVector) -> usize {
        add_thing(&mut self.vectors, v, THRESH_VECTORS_ARE_NEAR)
    }

    /// Add a polygon to the model as a new surface with a single node, returning the node
    /// index. Consecutive duplicate points are merged; a polygon left with fewer than
    /// three points keeps its node but with no vertices.
    pub fn add_polygon(&mut self, vertices: &[FVector], poly_flags: EPolyFlags, material: UMaterialRef) -> Result<usize, ModelError> {
        let node_index = self.nodes.len();
        if vertices.len() > BSP_NODE_MAX_NODE_VERTICES {
            return Err(ModelError::TooManyVertices {
                node_index,
                vertex_count: vertices.len(),
                max: BSP_NODE_MAX_NODE_VERTICES,
            });
        }

        let mut ed_poly = FPoly::from_vertices(vertices);
        let plane = match ed_poly.vertices.first() {
            Some(first) => FPlane::new_from_origin_and_normal(first, &ed_poly.normal),
            None => FPlane::new(),
        };

        // Texture axes in the plane of the polygon.
        let mut texture_u = FVector::new(0.0, 0.0, 0.0);
        let mut texture_v = FVector::new(0.0, 0.0, 0.0);
        if ed_poly.normal.magnitude2() > 0.0 {
            for i in 1..ed_poly.vertices.len() {
                let u = (ed_poly.vertices[0] - ed_poly.vertices[i]).cross(ed_poly.normal);
                if u.magnitude2() > 0.0 {
                    texture_u = u.normalize();
                    texture_v = ed_poly.normal.cross(texture_u).normalize();
                    break;
                }
            }
        }

        let surface = FBspSurf {
            material,
            poly_flags,
            base_point_index: self.add_point(ed_poly.base, true),
            normal_index: self.add_vector(ed_poly.normal),
            texture_u_index: self.add_vector(texture_u),
            texture_v_index: self.add_vector(texture_v),
            plane,
        };
        let surface_index = self.surfaces.len();
        self.surfaces.push(surface);

        let mut node = FBspNode::new();
        node.plane = plane;
        node.surface_index = surface_index;
        node.vertex_pool_index = self.vertices.len();

        for vertex in ed_poly.vertices.drain(..) {
            let point_index = self.add_point(vertex, false);
            let is_repeat = node.vertex_count > 0
                && self.vertices[node.vertex_pool_index + node.vertex_count - 1].point_index == point_index;
            if !is_repeat {
                self.vertices.push(FVert::new(point_index));
                node.vertex_count += 1;
            }
        }

        if node.vertex_count >= 2 && self.vertices[node.vertex_pool_index].point_index == self.vertices[node.vertex_pool_index + node.vertex_count - 1].point_index {
            self.vertices.pop();
            node.vertex_count -= 1;
        }

        if node.vertex_count < 3 {
            log::warn!("add_polygon: Infinitesimal polygon {} ({})", node.vertex_count, vertices.len());
            self.vertices.truncate(node.vertex_pool_index);
            node.vertex_count = 0;
        }

        self.nodes.push(node);
        Ok(node_index)
    }

    /// Lays out the render vertex buffer: assigns each node its `first_vertex_index` and
    /// writes one vertex per node vertex, plus a reversed copy with a flipped normal for
    /// two-sided surfaces. Returns the number of vertices written.
    pub fn build_vertex_buffer(&mut self, texture_tile_size: f32) -> Result<usize, ModelError> {
        self.validate()?;

        // Calculate the size of the vertex buffer and the base vertex index of each node.
        let mut vertex_count = 0usize;
        for node_index in 0..self.nodes.len() {
            let face_count = self.surfaces[self.nodes[node_index].surface_index].face_count();
            let node = &mut self.nodes[node_index];
            node.first_vertex_index = vertex_count;
            vertex_count += node.vertex_count * face_count;
        }

        let mut vertex_buffer = Vec::with_capacity(vertex_count);
        for node in &self.nodes {
            let surface = &self.surfaces[node.surface_index];
            let texture_base = self.points[surface.base_point_index];
            let texture_x = self.vectors[surface.texture_u_index];
            let texture_y = self.vectors[surface.texture_v_index];

            // Use the texture coordinates and normal to create an orthonormal tangent basis.
            let mut tangent_x = texture_x;
            let mut tangent_y = texture_y;
            let mut tangent_z = self.vectors[surface.normal_index];
            create_orthonormal_basis(&mut tangent_x, &mut tangent_y, &mut tangent_z);
            let sign = basis_determinant_sign(&tangent_x, &tangent_y, &tangent_z);

            let pool = &self.vertices[node.vertex_pool_index..node.vertex_pool_index + node.vertex_count];
            let model_vertex = |vert: &FVert, shadow_tex_coord: FVector2D, normal: FVector| {
                let position = self.points[vert.point_index];
                FModelVertex {
                    position,
                    tex_coord: FVector2D::new(
                        (position - texture_base).dot(texture_x) / texture_tile_size,
                        (position - texture_base).dot(texture_y) / texture_tile_size,
                    ),
                    shadow_tex_coord,
                    tangent_x,
                    tangent_z: normal.extend(sign),
                }
            };

            for vert in pool {
                vertex_buffer.push(model_vertex(vert, vert.shadow_tex_coord, tangent_z));
            }
            if surface.is_two_sided() {
                for vert in pool.iter().rev() {
                    vertex_buffer.push(model_vertex(vert, vert.backface_shadow_tex_coord, -tangent_z));
                }
            }
        }

        log::debug!("Built model vertex buffer: {} vertices for {} nodes", vertex_buffer.len(), self.nodes.len());
        self.vertex_buffer = vertex_buffer;
        Ok(vertex_count)
    }
}

/// Add a new vector to the table (merging near-duplicates) and return its index.
fn add_thing(vectors: &mut Vec<FVector>, v: FVector, threshold: f32) -> usize {
    for (i, table_vector) in vectors.iter().enumerate() {
        let temp = v.x - table_vector.x;
        if temp > -threshold && temp < threshold {
            let temp = v.y - table_vector.y;
            if temp > -threshold && temp < threshold {
                let temp = v.z - table_vector.z;
                if temp > -threshold && temp < threshold {
                    // Found nearly-matching vector.
                    return i
                }
            }
        }
    }
    vectors.push(v);
    vectors.len() - 1
}
