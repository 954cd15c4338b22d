//! Light sources fed to the lighting pass.

#[derive(Clone, Copy, Debug, Default, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
#[repr(C)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
}

impl Color {
    pub const WHITE: Color = Color::new(1.0, 1.0, 1.0);
    pub const AZURE: Color = Color::new(0.0, 0.5, 1.0);

    pub const fn new(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b }
    }

    pub fn scaled(self, factor: f32) -> Self {
        Self::new(self.r * factor, self.g * factor, self.b * factor)
    }
}

impl From<Color> for [f32; 3] {
    fn from(c: Color) -> Self {
        [c.r, c.g, c.b]
    }
}

impl std::fmt::Display for Color {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "r={} g={} b={}", self.r, self.g, self.b)
    }
}

/// Point light as laid out in the lighting storage buffer.
///
/// Fields are ordered so every `vec3` is followed by a scalar, which keeps
/// the struct free of implicit WGSL padding.
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct PointLight {
    pub position: [f32; 3],
    pub constant_attenuation: f32,
    pub color: [f32; 3],
    pub linear_attenuation: f32,
    pub quadratic_attenuation: f32,
    pub specular_power: f32,
    pub _padding: [f32; 2],
}

impl PointLight {
    pub fn new(position: cgmath::Vector3<f32>, color: Color) -> Self {
        Self {
            position: position.into(),
            constant_attenuation: 1.0,
            color: color.into(),
            linear_attenuation: 0.045,
            quadratic_attenuation: 0.0075,
            specular_power: 32.0,
            _padding: [0.0; 2],
        }
    }

    pub fn with_attenuation(mut self, constant: f32, linear: f32, quadratic: f32) -> Self {
        self.constant_attenuation = constant;
        self.linear_attenuation = linear;
        self.quadratic_attenuation = quadratic;
        self
    }

    pub fn with_specular_power(mut self, power: f32) -> Self {
        self.specular_power = power;
        self
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Lights {
    pub ambient: Color,
    pub points: Vec<PointLight>,
}

impl Default for Lights {
    fn default() -> Self {
        Self {
            ambient: Color::WHITE.scaled(0.1),
            points: Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn point_light_matches_shader_stride() {
        assert_eq!(std::mem::size_of::<PointLight>(), 48);
    }
}
