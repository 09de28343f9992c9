use glam::{Mat4, Quat, Vec3};

/// Perspective camera producing the per-frame `view_proj` matrix.
///
/// The view matrix is the inverse of the camera's own transform. Depth maps
/// to wgpu's `[0, 1]` clip range.
#[derive(Debug, Clone, PartialEq)]
pub struct Camera {
    pub translation: Vec3,
    pub rotation: Quat,
    pub scale: Vec3,
    /// Vertical field of view, radians.
    pub fov_y: f32,
    pub near: f32,
    pub far: f32,
}

impl Default for Camera {
    fn default() -> Self {
        Self {
            translation: Vec3::new(0.0, 0.0, 3.0),
            rotation: Quat::IDENTITY,
            scale: Vec3::ONE,
            fov_y: 45.0_f32.to_radians(),
            near: 0.1,
            far: 100.0,
        }
    }
}

impl Camera {
    pub fn view_matrix(&self) -> Mat4 {
        Mat4::from_scale_rotation_translation(self.scale, self.rotation, self.translation).inverse()
    }

    pub fn projection_matrix(&self, aspect_ratio: f32) -> Mat4 {
        Mat4::perspective_rh(self.fov_y, aspect_ratio.max(f32::EPSILON), self.near, self.far)
    }

    /// `projection * view`, the matrix uploaded as `view_proj`.
    pub fn view_projection(&self, aspect_ratio: f32) -> Mat4 {
        self.projection_matrix(aspect_ratio) * self.view_matrix()
    }

    /// Moves the camera in its local frame.
    pub fn translate_local(&mut self, delta: Vec3) {
        self.translation += self.rotation * delta;
    }

    pub fn rotate(&mut self, rotation: Quat) {
        self.rotation = (rotation * self.rotation).normalize();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: Vec3, b: Vec3) -> bool {
        (a - b).abs().max_element() < 1e-5
    }

    #[test]
    fn origin_camera_has_identity_view() {
        let cam = Camera {
            translation: Vec3::ZERO,
            ..Default::default()
        };
        assert_eq!(cam.view_matrix(), Mat4::IDENTITY);
    }

    #[test]
    fn point_in_front_projects_inside_clip_volume() {
        let cam = Camera::default();
        let clip = cam.view_projection(16.0 / 9.0) * glam::Vec4::new(0.0, 0.0, 0.0, 1.0);
        assert!(clip.w > 0.0);
        let ndc = clip.truncate() / clip.w;
        assert!(ndc.x.abs() <= 1.0 && ndc.y.abs() <= 1.0);
        assert!((0.0..=1.0).contains(&ndc.z));
    }

    #[test]
    fn local_translation_follows_rotation() {
        let mut cam = Camera {
            translation: Vec3::ZERO,
            ..Default::default()
        };
        cam.rotate(Quat::from_rotation_y(std::f32::consts::FRAC_PI_2));
        cam.translate_local(Vec3::new(0.0, 0.0, -1.0));
        // Facing -X after a quarter turn about +Y.
        assert!(approx(cam.translation, Vec3::new(-1.0, 0.0, 0.0)));
    }

    #[test]
    fn zero_aspect_does_not_produce_nan() {
        let m = Camera::default().view_projection(0.0);
        assert!(!m.is_nan());
    }
}
