//! Pan/zoom transform between content space and screen space.
//!
//! The state is a single affine map `screen = content * scale + (x, y)`.
//! It is only changed through [`ViewportTransform::shift`],
//! [`ViewportTransform::scale`] and the explicit setters; graph mutations
//! never touch it. Clamping (min/max zoom, pan limits) is left to the caller.

use crate::error::{Error, Result};
use crate::geom::Point;
use serde::{Deserialize, Serialize};

/// Uniform-scale affine transform: `p' = p * scale + (x, y)`.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct TransformMatrix {
    pub scale: f64,
    pub x: f64,
    pub y: f64,
}

impl Default for TransformMatrix {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl TransformMatrix {
    pub const IDENTITY: TransformMatrix = TransformMatrix {
        scale: 1.0,
        x: 0.0,
        y: 0.0,
    };

    pub fn apply(&self, point: Point) -> Point {
        Point::new(point.x * self.scale + self.x, point.y * self.scale + self.y)
    }

    /// The inverse map. Only meaningful for a non-zero scale.
    pub fn inverse(&self) -> TransformMatrix {
        TransformMatrix {
            scale: 1.0 / self.scale,
            x: -self.x / self.scale,
            y: -self.y / self.scale,
        }
    }
}

/// Partial update of a [`TransformMatrix`]; `None` fields keep their value.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MatrixPatch {
    pub scale: Option<f64>,
    pub x: Option<f64>,
    pub y: Option<f64>,
}

fn check_scale(scale: f64) -> Result<()> {
    if scale.is_finite() && scale > 0.0 {
        Ok(())
    } else {
        Err(Error::InvalidScale(scale))
    }
}

/// The viewport's content→screen transform.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct ViewportTransform {
    matrix: TransformMatrix,
}

impl ViewportTransform {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_matrix(matrix: TransformMatrix) -> Result<Self> {
        check_scale(matrix.scale)?;
        Ok(Self { matrix })
    }

    /// Content→screen matrix.
    pub fn matrix(&self) -> TransformMatrix {
        self.matrix
    }

    /// Screen→content matrix.
    pub fn inverse_matrix(&self) -> TransformMatrix {
        self.matrix.inverse()
    }

    /// Absolute scale of content on screen.
    pub fn absolute_scale(&self) -> f64 {
        self.matrix.scale
    }

    /// How many content units one screen unit represents.
    pub fn screen_scale(&self) -> f64 {
        1.0 / self.matrix.scale
    }

    /// Translate by `(dx, dy)` expressed in the units of the space being
    /// translated, i.e. scaled by the current scale before it is composed.
    pub fn shift(&mut self, dx: f64, dy: f64) {
        let m = &mut self.matrix;
        m.x += m.scale * dx;
        m.y += m.scale * dy;
    }

    /// Multiply the scale by `factor`, keeping the pivot `(cx, cy)` fixed.
    ///
    /// Composes `Translate(pivot) · Scale(factor) · Translate(-pivot)` on the
    /// right of the current transform.
    pub fn scale(&mut self, factor: f64, cx: f64, cy: f64) -> Result<()> {
        check_scale(factor)?;
        let m = &mut self.matrix;
        let shift = m.scale * (1.0 - factor);
        m.x += shift * cx;
        m.y += shift * cy;
        m.scale *= factor;
        Ok(())
    }

    pub fn to_screen(&self, x: f64, y: f64) -> (f64, f64) {
        let p = self.matrix.apply(Point::new(x, y));
        (p.x, p.y)
    }

    pub fn to_content(&self, x: f64, y: f64) -> (f64, f64) {
        let m = &self.matrix;
        ((x - m.x) / m.scale, (y - m.y) / m.scale)
    }

    pub fn point_to_screen(&self, point: Point) -> Point {
        self.matrix.apply(point)
    }

    pub fn point_to_content(&self, point: Point) -> Point {
        let (x, y) = self.to_content(point.x, point.y);
        Point::new(x, y)
    }

    /// Replace the whole transform, e.g. when restoring a saved view.
    pub fn set_matrix(&mut self, matrix: TransformMatrix) -> Result<()> {
        check_scale(matrix.scale)?;
        self.matrix = matrix;
        Ok(())
    }

    /// Overwrite selected components of the transform.
    pub fn patch(&mut self, patch: MatrixPatch) -> Result<()> {
        let next = TransformMatrix {
            scale: patch.scale.unwrap_or(self.matrix.scale),
            x: patch.x.unwrap_or(self.matrix.x),
            y: patch.y.unwrap_or(self.matrix.y),
        };
        self.set_matrix(next)
    }
}
