//! Mouse picking of Bsp surfaces. Every node polygon is clipped, projected and
//! rasterized against the single clicked pixel; the nearest front-facing surface wins.

use arrayvec::ArrayVec;
use crate::config::FModelRenderConfig;
use crate::error::ModelError;
use crate::fpoly::{FPoly, FPOLY_MAX_VERTICES};
use crate::math::{cross_2d, FVector2D, FVector4};
use crate::model::UModel;
use crate::raster::{FRasterPolicy, FTriangleRasterizer};
use crate::view::FSceneView;

/// The running result of one hit test.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FModelHitState {
    /// Depth of the nearest surface found so far.
    pub surface_z: f32,
    pub surface_index: usize,
    pub hit_surface: bool,
    pub x: i32,
    pub y: i32,
}

impl FModelHitState {
    pub fn new(x: i32, y: i32) -> FModelHitState {
        FModelHitState {
            surface_z: f32::MAX,
            surface_index: 0,
            hit_surface: false,
            x,
            y,
        }
    }

    pub fn result(&self) -> Option<usize> {
        self.hit_surface.then_some(self.surface_index)
    }
}

/// Keeps the nearest front-facing pixel of the surface currently being rasterized.
pub struct FModelHitRasterPolicy<'a> {
    hit_state: &'a mut FModelHitState,
    surface_index: usize,
}

impl<'a> FModelHitRasterPolicy<'a> {
    pub fn new(hit_state: &'a mut FModelHitState, surface_index: usize) -> Self {
        FModelHitRasterPolicy { hit_state, surface_index }
    }
}

impl FRasterPolicy for FModelHitRasterPolicy<'_> {
    /// Screen-space `(x, y, depth, w)`.
    type Interpolant = FVector4;

    fn min_x(&self) -> i32 { self.hit_state.x }
    fn max_x(&self) -> i32 { self.hit_state.x }
    fn min_y(&self) -> i32 { self.hit_state.y }
    fn max_y(&self) -> i32 { self.hit_state.y }

    fn process_pixel(&mut self, _x: i32, _y: i32, vertex: &FVector4, back_facing: bool) {
        // Strictly nearer only: the first surface seen at a given depth keeps the pixel.
        if !back_facing && vertex.z < self.hit_state.surface_z {
            self.hit_state.surface_z = vertex.z;
            self.hit_state.surface_index = self.surface_index;
            self.hit_state.hit_surface = true;
        }
    }
}

/// Hit proxy for a Bsp model: resolves a clicked pixel to the surface under it.
pub struct HModel<'a> {
    pub model: &'a UModel,
    pub config: FModelRenderConfig,
}

impl<'a> HModel<'a> {
    pub fn new(model: &'a UModel) -> HModel<'a> {
        HModel { model, config: FModelRenderConfig::default() }
    }

    pub fn with_config(model: &'a UModel, config: FModelRenderConfig) -> HModel<'a> {
        HModel { model, config }
    }

    /// Finds the surface drawn at pixel (`x`, `y`) of `view`. Portals are never hit, and
    /// a single-sided surface seen from behind is ignored. Returns `Ok(None)` when
    /// nothing covers the pixel.
    pub fn resolve_surface(&self, view: &FSceneView, x: i32, y: i32) -> Result<Option<usize>, ModelError> {
        let mut hit_state = FModelHitState::new(x, y);

        for node_index in 0..self.model.nodes.len() {
            let (node, surface) = self.model.node_surface(node_index)?;
            if surface.is_portal() || node.vertex_count < 3 {
                continue;
            }

            let mut polygon = FPoly::from_node(self.model, node_index)?;

            if let Some(near_plane) = view.near_clipping_plane {
                let normal = near_plane.normal();
                if polygon.split(&-normal, &(normal * near_plane.w)) == 0 {
                    continue;
                }
            }

            // Transform the polygon into screen space.
            let mut screen_vertices: ArrayVec<FVector4, FPOLY_MAX_VERTICES> = ArrayVec::new();
            for vertex in &polygon.vertices {
                match view.project(vertex, self.config.min_projected_w) {
                    Some(screen_vertex) => screen_vertices.push(screen_vertex),
                    None => break,
                }
            }
            if screen_vertices.len() != polygon.vertices.len() {
                log::trace!("resolve_surface: node {} has a vertex on the eye plane, skipping", node_index);
                continue;
            }

            let policy = FModelHitRasterPolicy::new(&mut hit_state, node.surface_index);
            let mut rasterizer = FTriangleRasterizer::new(policy);
            for leading_vertex_index in 2..screen_vertices.len() {
                let triangle = [0, leading_vertex_index, leading_vertex_index - 1].map(|i| screen_vertices[i]);
                let points = triangle.map(|v| FVector2D::new(v.x, v.y));
                let back_facing = cross_2d(points[0], points[1], points[2]) < 0.0;
                rasterizer.draw_triangle(
                    triangle[0], triangle[1], triangle[2],
                    points[0], points[1], points[2],
                    back_facing && !surface.is_two_sided(),
                );
            }
        }

        match hit_state.result() {
            Some(surface_index) => log::debug!("resolve_surface: pixel ({}, {}) hit surface {} at depth {}", x, y, surface_index, hit_state.surface_z),
            None => log::debug!("resolve_surface: pixel ({}, {}) hit nothing", x, y),
        }
        Ok(hit_state.result())
    }
}
