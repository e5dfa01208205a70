use crate::config::CameraConfig;

/// Fixed perspective camera pulled back along +Z, looking at the origin.
#[derive(Debug, Clone)]
pub struct Camera {
    position: glam::Vec3,
    aspect: f32,
    fov_y: f32,
    near: f32,
    far: f32,
    projection: glam::Mat4,
}

impl Camera {
    pub fn new(config: &CameraConfig, aspect: f32) -> Self {
        let fov_y = config.fov_y_degrees.to_radians();
        let projection = Self::perspective(fov_y, aspect, config.near, config.far);

        Self {
            position: glam::vec3(0.0, 0.0, config.distance),
            aspect,
            fov_y,
            near: config.near,
            far: config.far,
            projection,
        }
    }

    pub fn projection(&self) -> glam::Mat4 {
        self.projection
    }

    pub fn view(&self) -> glam::Mat4 {
        glam::Mat4::from_translation(-self.position)
    }

    /// The matrix the transform stack is reset to at the start of a frame.
    pub fn view_proj(&self) -> glam::Mat4 {
        self.projection() * self.view()
    }

    pub fn position(&self) -> glam::Vec3 {
        self.position
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        if width == 0 || height == 0 {
            return;
        }
        self.aspect = width as f32 / height as f32;
        self.projection = Self::perspective(self.fov_y, self.aspect, self.near, self.far);
    }

    fn perspective(fov_y: f32, aspect: f32, near: f32, far: f32) -> glam::Mat4 {
        glam::Mat4::perspective_rh(fov_y, aspect, near, far)
    }
}
