//! Value: destination shapes a spring can be pulled towards.
//! All numeric types use f32.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Coarse kind of a [`Value`], used to check a destination against the property it targets.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ValueKind {
    Float,
    Vec2,
    Rect,
    ColorRgba,
    Insets,
}

impl ValueKind {
    /// Number of scalar components a value of this kind carries.
    #[inline]
    pub fn arity(self) -> usize {
        match self {
            ValueKind::Float => 1,
            ValueKind::Vec2 => 2,
            ValueKind::Rect | ValueKind::ColorRgba | ValueKind::Insets => 4,
        }
    }

    /// The all-zero value of this kind.
    pub fn zero(self) -> Value {
        match self {
            ValueKind::Float => Value::Float(0.0),
            ValueKind::Vec2 => Value::Vec2([0.0; 2]),
            ValueKind::Rect => Value::Rect([0.0; 4]),
            ValueKind::ColorRgba => Value::ColorRgba([0.0; 4]),
            ValueKind::Insets => Value::Insets([0.0; 4]),
        }
    }
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ValueKind::Float => "float",
            ValueKind::Vec2 => "vec2",
            ValueKind::Rect => "rect",
            ValueKind::ColorRgba => "color",
            ValueKind::Insets => "insets",
        };
        f.write_str(name)
    }
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", content = "data")]
pub enum Value {
    /// Scalar float
    Float(f32),

    /// 2D point, size or offset
    Vec2([f32; 2]),

    /// Rectangle as (x, y, width, height)
    Rect([f32; 4]),

    /// RGBA color
    ColorRgba([f32; 4]),

    /// Edge insets as (top, left, bottom, right)
    Insets([f32; 4]),
}

impl Value {
    #[inline]
    pub fn kind(&self) -> ValueKind {
        match self {
            Value::Float(_) => ValueKind::Float,
            Value::Vec2(_) => ValueKind::Vec2,
            Value::Rect(_) => ValueKind::Rect,
            Value::ColorRgba(_) => ValueKind::ColorRgba,
            Value::Insets(_) => ValueKind::Insets,
        }
    }

    /// Flat view of the scalar components.
    #[inline]
    pub fn components(&self) -> &[f32] {
        match self {
            Value::Float(v) => std::slice::from_ref(v),
            Value::Vec2(v) => v,
            Value::Rect(v) | Value::ColorRgba(v) | Value::Insets(v) => v,
        }
    }

    /// Rebuild a value of `kind` from flat components.
    /// Returns `None` when the component count does not match the kind's arity.
    pub fn from_components(kind: ValueKind, components: &[f32]) -> Option<Self> {
        if components.len() != kind.arity() {
            return None;
        }
        let c = components;
        Some(match kind {
            ValueKind::Float => Value::Float(c[0]),
            ValueKind::Vec2 => Value::Vec2([c[0], c[1]]),
            ValueKind::Rect => Value::Rect([c[0], c[1], c[2], c[3]]),
            ValueKind::ColorRgba => Value::ColorRgba([c[0], c[1], c[2], c[3]]),
            ValueKind::Insets => Value::Insets([c[0], c[1], c[2], c[3]]),
        })
    }

    /// Convenience constructors
    pub fn f(v: f32) -> Self {
        Value::Float(v)
    }

    pub fn point(x: f32, y: f32) -> Self {
        Value::Vec2([x, y])
    }

    pub fn rect(x: f32, y: f32, width: f32, height: f32) -> Self {
        Value::Rect([x, y, width, height])
    }

    pub fn rgba(r: f32, g: f32, b: f32, a: f32) -> Self {
        Value::ColorRgba([r, g, b, a])
    }
}
