use std::fmt;
use std::ops::Mul;

/// 4x4 transformation matrix stored column-major.
///
/// Element `(row, col)` lives at index `col * 4 + row`, so the translation of an
/// affine transform occupies indices 12, 13 and 14. This is also the layout WGSL
/// expects for `mat4x4<f32>`, which lets the matrix be uploaded as-is.
///
/// Every constructor returns a fresh value; nothing mutates in place.
/// Composition reads right to left: applying `a` first and then `b` to a point
/// is `b * a` (or `Matrix4::multiply(&b, &a)`).
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct Matrix4 {
    m: [f32; 16],
}

impl Matrix4 {
    pub const IDENTITY: Self = Self {
        m: [
            1.0, 0.0, 0.0, 0.0, //
            0.0, 1.0, 0.0, 0.0, //
            0.0, 0.0, 1.0, 0.0, //
            0.0, 0.0, 0.0, 1.0,
        ],
    };

    /// Build from 16 values already in column-major order.
    pub const fn from_cols_array(m: [f32; 16]) -> Self {
        Self { m }
    }

    pub const fn identity() -> Self {
        Self::IDENTITY
    }

    /// Rotation about +X; a positive angle turns +Y toward +Z.
    pub fn rotate_x(angle: f32) -> Self {
        let (s, c) = angle.sin_cos();
        Self::from_cols_array([
            1.0, 0.0, 0.0, 0.0, //
            0.0, c, s, 0.0, //
            0.0, -s, c, 0.0, //
            0.0, 0.0, 0.0, 1.0,
        ])
    }

    /// Rotation about +Y; a positive angle turns +Z toward +X.
    pub fn rotate_y(angle: f32) -> Self {
        let (s, c) = angle.sin_cos();
        Self::from_cols_array([
            c, 0.0, -s, 0.0, //
            0.0, 1.0, 0.0, 0.0, //
            s, 0.0, c, 0.0, //
            0.0, 0.0, 0.0, 1.0,
        ])
    }

    /// Rotation about +Z; a positive angle turns +X toward +Y.
    pub fn rotate_z(angle: f32) -> Self {
        let (s, c) = angle.sin_cos();
        Self::from_cols_array([
            c, s, 0.0, 0.0, //
            -s, c, 0.0, 0.0, //
            0.0, 0.0, 1.0, 0.0, //
            0.0, 0.0, 0.0, 1.0,
        ])
    }

    /// Uniform scale on x, y and z. The w row is left alone.
    pub fn scale_uniform(factor: f32) -> Self {
        Self::from_cols_array([
            factor, 0.0, 0.0, 0.0, //
            0.0, factor, 0.0, 0.0, //
            0.0, 0.0, factor, 0.0, //
            0.0, 0.0, 0.0, 1.0,
        ])
    }

    /// Translation packed into the fourth column (indices 12..15).
    pub fn translate(x: f32, y: f32, z: f32) -> Self {
        Self::from_cols_array([
            1.0, 0.0, 0.0, 0.0, //
            0.0, 1.0, 0.0, 0.0, //
            0.0, 0.0, 1.0, 0.0, //
            x, y, z, 1.0,
        ])
    }

    /// Right-handed perspective projection.
    ///
    /// View-space z in `[-near, -far]` ends up in clip-space `[-1, 1]` after the
    /// perspective divide (OpenGL convention). The caller must keep
    /// `near != far` and `aspect != 0`.
    pub fn perspective(fov_y: f32, aspect: f32, near: f32, far: f32) -> Self {
        let f = 1.0 / (fov_y / 2.0).tan();
        let depth = far - near;
        Self::from_cols_array([
            f / aspect, 0.0, 0.0, 0.0, //
            0.0, f, 0.0, 0.0, //
            0.0, 0.0, -((far + near) / depth), -1.0, //
            0.0, 0.0, -((2.0 * near * far) / depth), 0.0,
        ])
    }

    /// Matrix product `a·b`.
    pub fn multiply(a: &Self, b: &Self) -> Self {
        let mut out = [0.0f32; 16];
        for col in 0..4 {
            for row in 0..4 {
                out[col * 4 + row] = (0..4)
                    .map(|k| a.m[k * 4 + row] * b.m[col * 4 + k])
                    .sum();
            }
        }
        Self::from_cols_array(out)
    }

    /// Product of all matrices, left to right. The last matrix is the first
    /// one applied to a point. An empty slice yields the identity.
    pub fn compose(matrices: &[Self]) -> Self {
        matrices
            .iter()
            .fold(Self::IDENTITY, |acc, m| Self::multiply(&acc, m))
    }

    /// Scale, then rotate, then translate.
    pub fn compose_trs(translation: &Self, rotation: &Self, scale: &Self) -> Self {
        Self::compose(&[*translation, *rotation, *scale])
    }

    /// Apply to a homogeneous column vector.
    pub fn transform_point(&self, p: [f32; 4]) -> [f32; 4] {
        let mut out = [0.0f32; 4];
        for (row, value) in out.iter_mut().enumerate() {
            *value = (0..4).map(|k| self.m[k * 4 + row] * p[k]).sum();
        }
        out
    }

    pub fn get(&self, row: usize, col: usize) -> f32 {
        self.m[col * 4 + row]
    }

    pub fn as_array(&self) -> &[f32; 16] {
        &self.m
    }

    pub fn approx_eq(&self, other: &Self, epsilon: f32) -> bool {
        self.m
            .iter()
            .zip(other.m.iter())
            .all(|(a, b)| (a - b).abs() <= epsilon)
    }
}

impl Default for Matrix4 {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Mul for Matrix4 {
    type Output = Matrix4;

    fn mul(self, rhs: Matrix4) -> Matrix4 {
        Matrix4::multiply(&self, &rhs)
    }
}

impl From<Matrix4> for glam::Mat4 {
    fn from(m: Matrix4) -> Self {
        glam::Mat4::from_cols_array(&m.m)
    }
}

impl From<glam::Mat4> for Matrix4 {
    fn from(m: glam::Mat4) -> Self {
        Matrix4::from_cols_array(m.to_cols_array())
    }
}

/// Prints rows, not columns.
impl fmt::Display for Matrix4 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in 0..4 {
            writeln!(
                f,
                "{:6.2} {:6.2} {:6.2} {:6.2}",
                self.get(row, 0),
                self.get(row, 1),
                self.get(row, 2),
                self.get(row, 3)
            )?;
        }
        Ok(())
    }
}
