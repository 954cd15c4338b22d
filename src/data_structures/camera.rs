//! Fly camera with yaw/pitch orientation.
//!
//! The camera only produces matrices; input handling lives in the
//! application. [`Camera::data`] is the record written into the camera
//! frame ring every frame.

use std::f32::consts::FRAC_PI_2;

use cgmath::{InnerSpace, Matrix4, Point3, Rad, Vector3};

#[rustfmt::skip]
pub const OPENGL_TO_WGPU_MATRIX: Matrix4<f32> = Matrix4::new(
    1.0, 0.0, 0.0, 0.0,
    0.0, 1.0, 0.0, 0.0,
    0.0, 0.0, 0.5, 0.0,
    0.0, 0.0, 0.5, 1.0,
);

const PITCH_EPSILON: f32 = 0.0001;
const WORLD_UP: Vector3<f32> = Vector3::new(0.0, 1.0, 0.0);

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Projection {
    Perspective {
        fovy: Rad<f32>,
        znear: f32,
        zfar: f32,
    },
    /// Centered orthographic volume from `0` to `depth` along the view axis.
    Orthographic { depth: f32 },
}

/// Camera record as laid out in the camera storage buffer.
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct CameraData {
    pub view: [[f32; 4]; 4],
    pub projection: [[f32; 4]; 4],
    pub position: [f32; 3],
    pub _padding: f32,
}

#[derive(Clone, Debug)]
pub struct Camera {
    position: Point3<f32>,
    yaw: Rad<f32>,
    pitch: Rad<f32>,
    direction: Vector3<f32>,
    up: Vector3<f32>,
    right: Vector3<f32>,
    width: f32,
    height: f32,
    projection: Projection,
}

impl Camera {
    /// Perspective camera looking down -z.
    pub fn perspective<F: Into<Rad<f32>>>(
        position: Point3<f32>,
        fovy: F,
        width: f32,
        height: f32,
        znear: f32,
        zfar: f32,
    ) -> Self {
        let mut camera = Self {
            position,
            yaw: Rad(-FRAC_PI_2),
            pitch: Rad(0.0),
            direction: -Vector3::unit_z(),
            up: WORLD_UP,
            right: Vector3::unit_x(),
            width,
            height,
            projection: Projection::Perspective {
                fovy: fovy.into(),
                znear,
                zfar,
            },
        };
        camera.add_pitch(Rad(0.0));
        camera
    }

    /// Orthographic camera at z = 1 looking at the origin.
    pub fn orthographic(width: f32, height: f32, depth: f32) -> Self {
        Self {
            position: Point3::new(0.0, 0.0, 1.0),
            yaw: Rad(-FRAC_PI_2),
            pitch: Rad(0.0),
            direction: -Vector3::unit_z(),
            up: WORLD_UP,
            right: Vector3::unit_x(),
            width,
            height,
            projection: Projection::Orthographic { depth },
        }
    }

    pub fn translate(&mut self, translation: Vector3<f32>) {
        self.position += translation;
    }

    pub fn add_yaw<R: Into<Rad<f32>>>(&mut self, value: R) {
        self.yaw += value.into();
        self.update_axes();
    }

    pub fn set_yaw<R: Into<Rad<f32>>>(&mut self, yaw: R) {
        self.yaw = yaw.into();
        self.update_axes();
    }

    /// Pitch is clamped just short of straight up/down so the view basis
    /// never degenerates.
    pub fn add_pitch<R: Into<Rad<f32>>>(&mut self, value: R) {
        self.set_pitch(self.pitch + value.into());
    }

    pub fn set_pitch<R: Into<Rad<f32>>>(&mut self, pitch: R) {
        let limit = FRAC_PI_2 - PITCH_EPSILON;
        self.pitch = Rad(pitch.into().0.clamp(-limit, limit));
        self.update_axes();
    }

    pub fn resize(&mut self, width: f32, height: f32) {
        self.width = width;
        self.height = height;
    }

    fn update_axes(&mut self) {
        let (sin_pitch, cos_pitch) = self.pitch.0.sin_cos();
        let (sin_yaw, cos_yaw) = self.yaw.0.sin_cos();
        self.direction = Vector3::new(cos_pitch * cos_yaw, sin_pitch, cos_pitch * sin_yaw).normalize();
        self.right = self.direction.cross(WORLD_UP).normalize();
        self.up = self.right.cross(self.direction).normalize();
    }

    pub fn position(&self) -> Point3<f32> {
        self.position
    }

    pub fn set_position(&mut self, position: Point3<f32>) {
        self.position = position;
    }

    pub fn direction(&self) -> Vector3<f32> {
        self.direction
    }

    pub fn up(&self) -> Vector3<f32> {
        self.up
    }

    pub fn right(&self) -> Vector3<f32> {
        self.right
    }

    pub fn yaw(&self) -> Rad<f32> {
        self.yaw
    }

    pub fn pitch(&self) -> Rad<f32> {
        self.pitch
    }

    pub fn width(&self) -> f32 {
        self.width
    }

    pub fn height(&self) -> f32 {
        self.height
    }

    pub fn projection(&self) -> Projection {
        self.projection
    }

    pub fn view_matrix(&self) -> Matrix4<f32> {
        Matrix4::look_to_rh(self.position, self.direction, self.up)
    }

    pub fn projection_matrix(&self) -> Matrix4<f32> {
        let projection = match self.projection {
            Projection::Perspective { fovy, znear, zfar } => {
                cgmath::perspective(fovy, self.width / self.height.max(1.0), znear, zfar)
            }
            Projection::Orthographic { depth } => {
                let right = self.width / 2.0;
                let top = self.height / 2.0;
                cgmath::ortho(-right, right, -top, top, 0.0, depth)
            }
        };
        OPENGL_TO_WGPU_MATRIX * projection
    }

    pub fn data(&self) -> CameraData {
        CameraData {
            view: self.view_matrix().into(),
            projection: self.projection_matrix().into(),
            position: self.position.into(),
            _padding: 0.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use cgmath::Deg;

    use super::*;

    #[test]
    fn camera_data_is_tightly_packed() {
        assert_eq!(std::mem::size_of::<CameraData>(), 144);
    }

    #[test]
    fn default_orientation_looks_down_negative_z() {
        let camera = Camera::perspective(Point3::new(0.0, 0.0, 5.0), Deg(45.0), 800.0, 600.0, 0.1, 100.0);
        assert!((camera.direction() - -Vector3::unit_z()).magnitude() < 1e-5);
        assert!((camera.up() - Vector3::unit_y()).magnitude() < 1e-5);
    }

    #[test]
    fn pitch_is_clamped_short_of_vertical() {
        let mut camera = Camera::perspective(Point3::new(0.0, 0.0, 0.0), Deg(45.0), 1.0, 1.0, 0.1, 10.0);
        camera.add_pitch(Rad(10.0));
        assert!(camera.pitch().0 < FRAC_PI_2);
        assert!(camera.up().magnitude() > 0.99);
    }
}
