use cgmath::{Deg, EuclideanSpace, InnerSpace, Matrix4, Point3};
use crate::math::{FMatrix, FPlane, FVector, FVector4};

/// The camera a hit test is resolved against: a world-to-clip transform, the viewport
/// rectangle it maps onto, and an optional near clipping plane.
#[derive(Clone, Debug, PartialEq)]
pub struct FSceneView {
    /// Projection * view.
    pub world_to_clip: FMatrix,
    /// Viewport origin in pixels.
    pub x: i32,
    pub y: i32,
    /// Viewport size in pixels.
    pub size_x: u32,
    pub size_y: u32,
    /// World-space near plane. Points on its positive side are in front of the near
    /// plane as seen from the plane, i.e. between it and the eye, and are clipped away.
    pub near_clipping_plane: Option<FPlane>,
}

impl FSceneView {
    pub fn new(world_to_clip: FMatrix, x: i32, y: i32, size_x: u32, size_y: u32) -> FSceneView {
        FSceneView {
            world_to_clip,
            x,
            y,
            size_x,
            size_y,
            near_clipping_plane: None,
        }
    }

    /// A right-handed perspective camera at `eye` looking at `target`, with a near
    /// clipping plane `near` units in front of the eye.
    pub fn new_perspective(eye: FVector, target: FVector, up: FVector, fov_y_degrees: f32, near: f32, far: f32, size_x: u32, size_y: u32) -> FSceneView {
        let aspect = size_x as f32 / size_y.max(1) as f32;
        let view = Matrix4::look_at_rh(Point3::from_vec(eye), Point3::from_vec(target), up);
        let projection = cgmath::perspective(Deg(fov_y_degrees), aspect, near, far);

        let forward = (target - eye).normalize();
        let near_point = eye + forward * near;
        let mut scene_view = FSceneView::new(projection * view, 0, 0, size_x, size_y);
        scene_view.near_clipping_plane = Some(FPlane::new_from_origin_and_normal(&near_point, &-forward));
        scene_view
    }

    /// A right-handed orthographic camera at `eye` looking at `target`. The view volume
    /// spans `width` by `height` world units. Orthographic views have no near clipping
    /// plane.
    pub fn new_orthographic(eye: FVector, target: FVector, up: FVector, width: f32, height: f32, near: f32, far: f32, size_x: u32, size_y: u32) -> FSceneView {
        let view = Matrix4::look_at_rh(Point3::from_vec(eye), Point3::from_vec(target), up);
        let projection = cgmath::ortho(-width / 2.0, width / 2.0, -height / 2.0, height / 2.0, near, far);
        FSceneView::new(projection * view, 0, 0, size_x, size_y)
    }

    /// Transforms a world-space point into homogeneous clip space.
    pub fn world_to_screen(&self, point: &FVector) -> FVector4 {
        self.world_to_clip * point.extend(1.0)
    }

    /// Projects a world-space point to `(pixel x, pixel y, clip z, clip w)`. Screen Y
    /// grows downwards. Returns `None` when `|w| <= min_w`, where the perspective divide
    /// would blow up.
    pub fn project(&self, point: &FVector, min_w: f32) -> Option<FVector4> {
        let clip = self.world_to_screen(point);
        if clip.w.abs() <= min_w {
            return None;
        }
        let inv_w = 1.0 / clip.w;
        Some(FVector4::new(
            self.x as f32 + (0.5 + clip.x * 0.5 * inv_w) * self.size_x as f32,
            self.y as f32 + (0.5 - clip.y * 0.5 * inv_w) * self.size_y as f32,
            clip.z,
            clip.w,
        ))
    }
}
