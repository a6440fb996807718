//! Orbit camera supplying the view/projection transform, plus the pointer
//! unprojection used to place spawns and interaction nodes in the world.

use glam::{Mat4, Vec3};

const FOV_Y_RADIANS: f32 = std::f32::consts::FRAC_PI_4;
const Z_NEAR: f32 = 0.1;
const Z_FAR: f32 = 100.0;

pub struct Camera {
    pub yaw: f32,
    pub pitch: f32,
    pub distance: f32,
    pub target: Vec3,
}

impl Camera {
    pub fn new() -> Self {
        Self {
            yaw: 0.0,
            pitch: 0.3,
            distance: 3.0,
            target: Vec3::ZERO,
        }
    }

    pub fn position(&self) -> Vec3 {
        let x = self.distance * self.pitch.cos() * self.yaw.sin();
        let y = self.distance * self.pitch.sin();
        let z = self.distance * self.pitch.cos() * self.yaw.cos();
        self.target + Vec3::new(x, y, z)
    }

    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.position(), self.target, Vec3::Y)
    }

    pub fn projection_matrix(&self, aspect: f32) -> Mat4 {
        Mat4::perspective_rh(FOV_Y_RADIANS, aspect, Z_NEAR, Z_FAR)
    }

    pub fn view_proj(&self, aspect: f32) -> Mat4 {
        self.projection_matrix(aspect) * self.view_matrix()
    }

    /// Map a pointer position in NDC (x right, y up, both -1..1) to the point
    /// where its view ray crosses the z = 0 plane. Spawns and drawn nodes land
    /// on that plane.
    pub fn pointer_to_world(&self, ndc_x: f32, ndc_y: f32, aspect: f32) -> Vec3 {
        let inv = self.view_proj(aspect).inverse();
        let near = inv.project_point3(Vec3::new(ndc_x, ndc_y, 0.0));
        let far = inv.project_point3(Vec3::new(ndc_x, ndc_y, 1.0));
        let dir = far - near;

        if dir.z.abs() < 1e-6 {
            // ray parallel to the plane; fall back to the near point
            return Vec3::new(near.x, near.y, 0.0);
        }
        let t = -near.z / dir.z;
        near + dir * t
    }
}

impl Default for Camera {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pointer_lands_on_plane() {
        let camera = Camera::new();
        let world = camera.pointer_to_world(0.3, -0.4, 16.0 / 9.0);
        assert!(world.z.abs() < 1e-4);
    }

    #[test]
    fn test_center_pointer_hits_target_axis() {
        let mut camera = Camera::new();
        camera.pitch = 0.0;
        camera.yaw = 0.0;
        // looking straight down -Z at the origin: the screen center ray
        // crosses z = 0 at the target
        let world = camera.pointer_to_world(0.0, 0.0, 1.0);
        assert!(world.length() < 1e-3);
    }
}
