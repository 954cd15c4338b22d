//! Entity transforms.
//!
//! A transform is a position, a rotation quaternion and a per-axis scale.
//! Composition with `*` applies the right hand side in the local space of
//! the left hand side, the way parent and child transforms combine.

use std::ops::Mul;

use cgmath::{One, Quaternion, Rotation3, Vector3};

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Transform {
    pub position: Vector3<f32>,
    pub rotation: Quaternion<f32>,
    pub scale: Vector3<f32>,
}

impl Transform {
    /// Identity transform (no move, rotate, or scale).
    pub fn new() -> Self {
        Self {
            position: Vector3::new(0.0, 0.0, 0.0),
            rotation: Quaternion::one(),
            scale: Vector3::new(1.0, 1.0, 1.0),
        }
    }

    pub fn from_position(position: Vector3<f32>) -> Self {
        Self {
            position,
            ..Self::new()
        }
    }

    pub fn with_rotation(mut self, axis: Vector3<f32>, angle: cgmath::Rad<f32>) -> Self {
        self.rotation = Quaternion::from_axis_angle(axis, angle);
        self
    }

    pub fn with_scale(mut self, scale: Vector3<f32>) -> Self {
        self.scale = scale;
        self
    }

    pub fn translate(&mut self, translation: Vector3<f32>) {
        self.position += translation;
    }

    pub fn to_matrix(&self) -> cgmath::Matrix4<f32> {
        cgmath::Matrix4::from_translation(self.position)
            * cgmath::Matrix4::from(self.rotation)
            * cgmath::Matrix4::from_nonuniform_scale(self.scale.x, self.scale.y, self.scale.z)
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self::new()
    }
}

impl From<Vector3<f32>> for Transform {
    fn from(position: Vector3<f32>) -> Self {
        Self::from_position(position)
    }
}

impl Mul<&Transform> for &Transform {
    type Output = Transform;

    fn mul(self, rhs: &Transform) -> Transform {
        let scaled_rhs_pos = Vector3::new(
            self.scale.x * rhs.position.x,
            self.scale.y * rhs.position.y,
            self.scale.z * rhs.position.z,
        );
        Transform {
            position: self.position + (self.rotation * scaled_rhs_pos),
            rotation: self.rotation * rhs.rotation,
            scale: Vector3::new(
                self.scale.x * rhs.scale.x,
                self.scale.y * rhs.scale.y,
                self.scale.z * rhs.scale.z,
            ),
        }
    }
}

impl Mul for Transform {
    type Output = Transform;

    fn mul(self, rhs: Transform) -> Transform {
        &self * &rhs
    }
}

#[cfg(test)]
mod tests {
    use cgmath::{Deg, InnerSpace, SquareMatrix, Vector4};

    use super::*;

    #[test]
    fn identity_is_neutral() {
        let t = Transform::from_position(Vector3::new(1.0, 2.0, 3.0));
        assert_eq!(Transform::new() * t, t);
        assert_eq!(Transform::new().to_matrix(), cgmath::Matrix4::identity());
    }

    #[test]
    fn composition_matches_matrix_product() {
        let parent = Transform::from_position(Vector3::new(0.0, 1.0, 0.0))
            .with_rotation(Vector3::unit_y(), Deg(90.0).into())
            .with_scale(Vector3::new(2.0, 2.0, 2.0));
        let child = Transform::from_position(Vector3::new(1.0, 0.0, 0.0));

        let composed = (&parent * &child).to_matrix() * Vector4::new(0.0, 0.0, 0.0, 1.0);
        let product = parent.to_matrix() * child.to_matrix() * Vector4::new(0.0, 0.0, 0.0, 1.0);
        assert!((composed - product).magnitude() < 1e-5);
    }
}
