use cgmath::InnerSpace;
use arrayvec::ArrayVec;
use bitflags::bitflags;
use crate::error::ModelError;
use crate::math::{FVector, point_plane_distance, line_plane_intersection, THRESH_SPLIT_POLY_WITH_PLANE, THRESH_ZERO_NORM_SQUARED};
use crate::model::{UModel, BSP_NODE_MAX_FINAL_VERTICES, BSP_NODE_MAX_NODE_VERTICES};

/// Maximum vertices an FPoly may have. Clipping a node polygon against a plane can add
/// one vertex, so this is the post-clipping node limit.
pub const FPOLY_MAX_VERTICES: usize = BSP_NODE_MAX_FINAL_VERTICES;

/// Flags describing effects and properties of a Bsp polygon.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct EPolyFlags(u32);

bitflags! {
    impl EPolyFlags : u32 {
        // Regular in-game flags.
        /// Poly is invisible.
        const Invisible     = 0x00000001;
        /// Poly should be drawn masked.
        const Masked        = 0x00000002;
        /// Poly is transparent.
        const Translucent   = 0x00000004;
        /// Poly is not solid, doesn't block.
        const NotSolid      = 0x00000008;
        /// Poly is semi-solid = collision solid, Csg nonsolid.
        const Semisolid     = 0x00000020;
        /// Poly is visible from both sides.
        const TwoSided      = 0x00000100;
        /// Don't merge poly's nodes before lighting when rendering.
        const NoMerge       = 0x00010000;
        /// Render as wireframe
        const Wireframe     = 0x00200000;
        /// Unlit.
        const Unlit         = 0x00400000;
        /// Portal between iZones.
        const Portal        = 0x04000000;
        /// Antiportal
        const AntiPortal    = 0x08000000;
        /// Mirrored BSP surface.
        const Mirrored      = 0x20000000;

        // Editor flags.
        /// Editor: Poly is under the mouse cursor.
        const Hovered       = 0x00008000;
        /// Editor: Poly is remembered.
        const Memorized     = 0x01000000;
        /// Editor: Poly is selected.
        const Selected      = 0x02000000;
        /// Editor: Poly is hidden in the editor viewports.
        const HiddenEd      = 0x10000000;
    }
}

/// Poly flag names as they appear in exported brush data, in SCREAMING_SNAKE_CASE.
pub static POLY_FLAGS: phf::Map<&'static str, u32> = phf::phf_map! {
    "INVISIBLE" => 0x00000001,
    "MASKED" => 0x00000002,
    "TRANSLUCENT" => 0x00000004,
    "NOT_SOLID" => 0x00000008,
    "SEMISOLID" => 0x00000020,
    "TWO_SIDED" => 0x00000100,
    "HOVERED" => 0x00008000,
    "NO_MERGE" => 0x00010000,
    "WIREFRAME" => 0x00200000,
    "UNLIT" => 0x00400000,
    "MEMORIZED" => 0x01000000,
    "SELECTED" => 0x02000000,
    "PORTAL" => 0x04000000,
    "ANTI_PORTAL" => 0x08000000,
    "HIDDEN_ED" => 0x10000000,
    "MIRRORED" => 0x20000000,
};

impl EPolyFlags {
    /// Builds flags from their exported names. Unknown names are ignored.
    pub fn from_names<'a, I: IntoIterator<Item = &'a str>>(names: I) -> EPolyFlags {
        let mut flags = EPolyFlags::empty();
        for name in names {
            match POLY_FLAGS.get(name) {
                Some(bits) => flags |= EPolyFlags::from_bits_retain(*bits),
                None => log::warn!("Unknown poly flag {:?}", name),
            }
        }
        flags
    }
}

/// Results from FPoly.SplitWithPlane, describing the result of splitting
/// an arbitrary FPoly with an arbitrary plane.
#[derive(Debug, PartialEq)]
pub enum ESplitType
{
    /// Poly wasn't split, but is coplanar with plane
    Coplanar,
    /// Poly wasn't split, but is entirely in front of plane
    Front,
    /// Poly wasn't split, but is entirely in back of plane
    Back,
    /// Poly was split into two new editor polygons
    Split(FPoly, FPoly),
}

#[derive(Clone, Copy, PartialEq)]
enum ESplitPlaneStatus {
    Front,
    Back,
}

/// A free-standing convex polygon. Node polygons are pulled out of the model's
/// vertex pool into one of these before they are clipped and projected.
#[derive(Clone, Debug, PartialEq)]
pub struct FPoly {
    /// Base point of polygon.
    pub base: FVector,
    /// Normal of polygon.
    pub normal: FVector,
    pub vertices: ArrayVec<FVector, FPOLY_MAX_VERTICES>,
    /// FPoly & Bsp poly bit flags (PF_).
    pub poly_flags: EPolyFlags,
}

impl Default for FPoly {
    fn default() -> Self {
        Self::new()
    }
}

impl FPoly {

    pub fn new() -> FPoly {
        FPoly {
            base: FVector::new(0.0, 0.0, 0.0),
            normal: FVector::new(0.0, 0.0, 0.0),
            vertices: ArrayVec::new(),
            poly_flags: EPolyFlags::empty(),
        }
    }

    /// Vertices beyond `FPOLY_MAX_VERTICES` are dropped.
    pub fn from_vertices(vertices: &[FVector]) -> Self {
        let mut fpoly = FPoly::new();
        fpoly.vertices.extend(vertices.iter().copied().take(FPOLY_MAX_VERTICES));
        if let Some(first) = fpoly.vertices.first() {
            fpoly.base = *first;
        }
        _ = fpoly.calc_normal();
        fpoly
    }

    /// Pulls the polygon of a Bsp node out of the model's vertex pool, in pool order.
    pub fn from_node(model: &UModel, node_index: usize) -> Result<FPoly, ModelError> {
        let node = model.node(node_index)?;
        if node.vertex_count > BSP_NODE_MAX_NODE_VERTICES {
            return Err(ModelError::TooManyVertices {
                node_index,
                vertex_count: node.vertex_count,
                max: BSP_NODE_MAX_NODE_VERTICES,
            });
        }

        let surface = model.surface(node.surface_index, node_index)?;
        let mut poly = FPoly::new();
        for (i, vert) in model.node_vertex_pool(node_index)?.iter().enumerate() {
            let point = model.points.get(vert.point_index).ok_or(ModelError::PointOutOfRange {
                vertex_index: node.vertex_pool_index + i,
                point_index: vert.point_index,
                point_count: model.points.len(),
            })?;
            poly.vertices.push(*point);
        }
        poly.base = poly.vertices.first().copied().unwrap_or(poly.base);
        poly.normal = node.plane.normal();
        poly.poly_flags = surface.poly_flags;
        Ok(poly)
    }

    /// Compute the normal from the winding (right-hand rule). Sets the normal to zero and
    /// fails if the polygon has no area.
    pub fn calc_normal(&mut self) -> Result<FVector, String> {
        self.normal = FVector::new(0.0, 0.0, 0.0);
        for i in 2..self.vertices.len() {
            self.normal += (self.vertices[i - 1] - self.vertices[0]).cross(self.vertices[i] - self.vertices[0]);
        }
        if self.normal.magnitude2() < THRESH_ZERO_NORM_SQUARED {
            self.normal = FVector::new(0.0, 0.0, 0.0);
            return Err("Zero-area normal".to_string());
        }
        self.normal = self.normal.normalize();
        Ok(self.normal)
    }

    /// Split with plane quickly for in-game geometry operations.
    /// Results are always valid. May return sliver polys.
    pub fn split_with_plane_fast(&self, plane_base: &FVector, plane_normal: &FVector) -> ESplitType {
        let mut vertex_statuses = [ESplitPlaneStatus::Front; FPOLY_MAX_VERTICES];
        let mut front = false;
        let mut back = false;

        for (i, vertex) in self.vertices.iter().enumerate() {
            let distance = point_plane_distance(vertex, plane_base, plane_normal);
            if distance >= 0.0 {
                vertex_statuses[i] = ESplitPlaneStatus::Front;
                if distance > THRESH_SPLIT_POLY_WITH_PLANE {
                    front = true;
                }
            } else {
                vertex_statuses[i] = ESplitPlaneStatus::Back;
                if distance < -THRESH_SPLIT_POLY_WITH_PLANE {
                    back = true;
                }
            }
        }

        if !front {
            if back {
                ESplitType::Back
            } else {
                ESplitType::Coplanar
            }
        }
        else if !back {
            ESplitType::Front
        }
        else {
            let mut front_poly = FPoly::new();
            let mut back_poly = FPoly::new();

            let mut w = self.vertices.len() - 1;
            let mut prev_status = vertex_statuses[w];

            for (v, vertex) in self.vertices.iter().enumerate() {
                let status = vertex_statuses[v];
                if status != prev_status {
                    // Crossing.
                    let intersection = line_plane_intersection(&self.vertices[w], vertex, plane_base, plane_normal);
                    push_clipped(&mut front_poly, intersection);
                    push_clipped(&mut back_poly, intersection);
                    if prev_status == ESplitPlaneStatus::Front {
                        push_clipped(&mut back_poly, *vertex);
                    } else {
                        push_clipped(&mut front_poly, *vertex);
                    }
                } else if status == ESplitPlaneStatus::Front {
                    push_clipped(&mut front_poly, *vertex);
                } else {
                    push_clipped(&mut back_poly, *vertex);
                }

                prev_status = status;
                w = v;
            }

            for poly in [&mut front_poly, &mut back_poly] {
                poly.base = self.base;
                poly.normal = self.normal;
                poly.poly_flags = self.poly_flags;
            }

            ESplitType::Split(front_poly, back_poly)
        }
    }

    /// Split a poly and keep only the front half. Returns number of vertices,
    /// 0 if clipped away.
    pub fn split(&mut self, plane_normal: &FVector, plane_base: &FVector) -> usize {
        match self.split_with_plane_fast(plane_base, plane_normal) {
            ESplitType::Back => 0,
            ESplitType::Split(front, _) => {
                *self = front;
                self.vertices.len()
            },
            _ => self.vertices.len()
        }
    }
}

// A convex polygon gains at most one vertex per split, so this only drops vertices of
// input that was already over the limit.
fn push_clipped(poly: &mut FPoly, vertex: FVector) {
    if poly.vertices.try_push(vertex).is_err() {
        log::warn!("Clipped polygon exceeds {} vertices, dropping vertex", FPOLY_MAX_VERTICES);
    }
}
