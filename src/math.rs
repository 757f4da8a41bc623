use cgmath::{InnerSpace, Matrix4, Vector2, Vector3, Vector4};

pub type FVector = Vector3<f32>;
pub type FVector2D = Vector2<f32>;
pub type FVector4 = Vector4<f32>;
pub type FMatrix = Matrix4<f32>;

/// A plane in the form `X*x + Y*y + Z*z = W`, where (X, Y, Z) is the unit normal.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FPlane {
    pub x: f32,
    pub y: f32,
    pub z: f32,
    pub w: f32,
}

impl Default for FPlane {
    fn default() -> Self {
        Self::new()
    }
}

impl FPlane {
    pub fn new() -> FPlane {
        FPlane { x: 0.0, y: 0.0, z: 0.0, w: 0.0 }
    }

    pub fn new_from_normal_and_w(normal: FVector, w: f32) -> FPlane {
        FPlane { x: normal.x, y: normal.y, z: normal.z, w }
    }

    pub fn new_from_origin_and_normal(origin: &FVector, normal: &FVector) -> FPlane {
        FPlane::new_from_normal_and_w(*normal, normal.dot(*origin))
    }

    pub fn normal(&self) -> FVector {
        FVector::new(self.x, self.y, self.z)
    }

    pub fn plane_dot(&self, p: FVector) -> f32 {
        (self.x * p.x) + (self.y * p.y) + (self.z * p.z) - self.w
    }
}

// Floating point constants.

/// Two points are same if within this distance
pub const THRESH_POINTS_ARE_SAME: f32 = 0.002;
/// Two points are near if within this distance and can be combined if imprecise math is ok
pub const THRESH_POINTS_ARE_NEAR: f32 = 0.015;
///  A plane splits a polygon in half
pub const THRESH_SPLIT_POLY_WITH_PLANE: f32 = 0.25;
/// Size of a unit normal that is considered "zero", squared
pub const THRESH_ZERO_NORM_SQUARED: f32 = 0.0001;

pub const SMALL_NUMBER: f32 = 1.0e-8;

/// Calculate the signed distance (in the direction of the normal) between a point and a plane.
pub fn point_plane_distance(point: &FVector, plane_base: &FVector, plane_normal: &FVector) -> f32 {
    (point - plane_base).dot(*plane_normal)
}

/// Find the intersection of an infinite line (defined by two points) and
/// a plane.  Assumes that the line and plane do indeed intersect; you must
/// make sure they're not parallel before calling.
pub fn line_plane_intersection(point1: &FVector, point2: &FVector, plane_base: &FVector, plane_normal: &FVector) -> FVector {
    point1
        + ((point2 - point1) *
            ((plane_base - point1).dot(*plane_normal)
                / (point2 - point1).dot(*plane_normal)))
}

/// Signed area (times two) of the 2D triangle `p0, p1, p2`.
pub fn cross_2d(p0: FVector2D, p1: FVector2D, p2: FVector2D) -> f32 {
    let a = p1 - p0;
    let b = p2 - p0;
    a.x * b.y - a.y * b.x
}

/// Gram-Schmidt the two tangents against `z_axis` so the three form an orthonormal basis.
/// `z_axis` keeps its direction. Degenerate tangents fall back to an arbitrary
/// perpendicular axis.
pub fn create_orthonormal_basis(x_axis: &mut FVector, y_axis: &mut FVector, z_axis: &mut FVector) {
    if z_axis.magnitude2() < THRESH_ZERO_NORM_SQUARED {
        *z_axis = FVector::new(0.0, 0.0, 1.0);
    } else {
        *z_axis = z_axis.normalize();
    }

    *x_axis -= *z_axis * x_axis.dot(*z_axis);
    *y_axis -= *z_axis * y_axis.dot(*z_axis);

    if x_axis.magnitude2() < THRESH_ZERO_NORM_SQUARED {
        *x_axis = y_axis.cross(*z_axis);
    }
    if x_axis.magnitude2() < THRESH_ZERO_NORM_SQUARED {
        // Both tangents were parallel to the normal.
        let up = if z_axis.z.abs() < 0.999 { FVector::new(0.0, 0.0, 1.0) } else { FVector::new(1.0, 0.0, 0.0) };
        *x_axis = up.cross(*z_axis);
    }
    *x_axis = x_axis.normalize();

    *y_axis = z_axis.cross(*x_axis) * if y_axis.dot(z_axis.cross(*x_axis)) < 0.0 { -1.0 } else { 1.0 };
}

/// Sign of the determinant of the basis, used to reconstruct the binormal on the GPU.
pub fn basis_determinant_sign(x_axis: &FVector, y_axis: &FVector, z_axis: &FVector) -> f32 {
    if x_axis.cross(*y_axis).dot(*z_axis) < 0.0 { -1.0 } else { 1.0 }
}
