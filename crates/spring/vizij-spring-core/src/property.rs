//! Logical properties, target capability classes, and the resolver that maps a
//! (capability, property) pair onto the engine's animatable-property name.
//!
//! The engine has different readers/writers for key paths that look alike across
//! target types (`bounds` on a layer vs. a view), so resolution always goes through
//! the target's capability tables in a fixed precedence order.

use crate::error::{BridgeError, Result};
use crate::ids::TargetId;
use crate::value::ValueKind;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Capability table a property name can be looked up in.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Capability {
    Layer,
    ShapeLayer,
    LayoutConstraint,
    View,
    ScrollView,
    NavigationBar,
    Label,
}

impl Capability {
    /// Lookup precedence used by [`resolve`].
    pub const PRECEDENCE: [Capability; 7] = [
        Capability::ShapeLayer,
        Capability::Layer,
        Capability::LayoutConstraint,
        Capability::View,
        Capability::ScrollView,
        Capability::NavigationBar,
        Capability::Label,
    ];
}

/// Closed set of target classes the host can hand to the bridge.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TargetKind {
    Layer,
    ShapeLayer,
    View,
    ScrollView,
    Label,
    NavigationBar,
    LayoutConstraint,
}

impl TargetKind {
    /// Every capability table this kind of target satisfies.
    pub fn capabilities(self) -> &'static [Capability] {
        match self {
            TargetKind::Layer => &[Capability::Layer],
            TargetKind::ShapeLayer => &[Capability::ShapeLayer, Capability::Layer],
            TargetKind::View => &[Capability::View],
            TargetKind::ScrollView => &[Capability::View, Capability::ScrollView],
            TargetKind::Label => &[Capability::View, Capability::Label],
            TargetKind::NavigationBar => &[Capability::View, Capability::NavigationBar],
            TargetKind::LayoutConstraint => &[Capability::LayoutConstraint],
        }
    }

    #[inline]
    pub fn has(self, capability: Capability) -> bool {
        self.capabilities().contains(&capability)
    }
}

/// Opaque handle to an animatable host object. Identity is `id`; `kind` only
/// decides which properties are addressable.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Target {
    pub id: TargetId,
    pub kind: TargetKind,
}

impl Target {
    pub fn new(id: u64, kind: TargetKind) -> Self {
        Self {
            id: TargetId(id),
            kind,
        }
    }
}

macro_rules! properties {
    ($($variant:ident => $path:literal, $kind:ident;)+) => {
        /// Logical animatable property, named by its key path.
        #[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(try_from = "String", into = "String")]
        pub enum Property {
            $($variant,)+
        }

        impl Property {
            pub const ALL: &'static [Property] = &[$(Property::$variant,)+];

            /// Key path this property is addressed by.
            pub fn key_path(self) -> &'static str {
                match self {
                    $(Property::$variant => $path,)+
                }
            }

            /// Shape of destination values this property accepts.
            pub fn value_kind(self) -> ValueKind {
                match self {
                    $(Property::$variant => ValueKind::$kind,)+
                }
            }
        }

        impl FromStr for Property {
            type Err = BridgeError;

            fn from_str(s: &str) -> Result<Self> {
                match s {
                    $($path => Ok(Property::$variant),)+
                    other => Err(BridgeError::UnknownProperty {
                        key_path: other.to_string(),
                    }),
                }
            }
        }
    };
}

properties! {
    BackgroundColor => "backgroundColor", ColorRgba;
    Bounds => "bounds", Rect;
    CornerRadius => "cornerRadius", Float;
    BorderWidth => "borderWidth", Float;
    BorderColor => "borderColor", ColorRgba;
    Opacity => "opacity", Float;
    Position => "position", Vec2;
    PositionX => "position.x", Float;
    PositionY => "position.y", Float;
    RotationZ => "transform.rotation.z", Float;
    RotationX => "transform.rotation.x", Float;
    RotationY => "transform.rotation.y", Float;
    ScaleX => "transform.scale.x", Float;
    ScaleXY => "transform.scale", Vec2;
    ScaleY => "transform.scale.y", Float;
    Size => "bounds.size", Vec2;
    SublayerScaleXY => "sublayerTransform.scale", Vec2;
    SublayerTranslationX => "sublayerTransform.translation.x", Float;
    SublayerTranslationXY => "sublayerTransform.translation", Vec2;
    SublayerTranslationY => "sublayerTransform.translation.y", Float;
    SublayerTranslationZ => "sublayerTransform.translation.z", Float;
    TranslationX => "transform.translation.x", Float;
    TranslationXY => "transform.translation", Vec2;
    TranslationY => "transform.translation.y", Float;
    TranslationZ => "transform.translation.z", Float;
    ZPosition => "zPosition", Float;
    ShadowColor => "shadowColor", ColorRgba;
    ShadowOffset => "shadowOffset", Vec2;
    ShadowOpacity => "shadowOpacity", Float;
    ShadowRadius => "shadowRadius", Float;
    StrokeStart => "strokeStart", Float;
    StrokeEnd => "strokeEnd", Float;
    StrokeColor => "strokeColor", ColorRgba;
    FillColor => "fillColor", ColorRgba;
    LineWidth => "lineWidth", Float;
    LineDashPhase => "lineDashPhase", Float;
    Constant => "constant", Float;
    Alpha => "alpha", Float;
    Center => "center", Vec2;
    Frame => "frame", Rect;
    TintColor => "tintColor", ColorRgba;
    ContentOffset => "contentOffset", Vec2;
    ContentSize => "contentSize", Vec2;
    ZoomScale => "zoomScale", Float;
    ContentInset => "contentInset", Insets;
    ScrollIndicatorInsets => "scrollIndicatorInsets", Insets;
    BarTintColor => "barTintColor", ColorRgba;
    TextColor => "textColor", ColorRgba;
}

impl fmt::Display for Property {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key_path())
    }
}

impl From<Property> for String {
    fn from(p: Property) -> String {
        p.key_path().to_string()
    }
}

impl TryFrom<String> for Property {
    type Error = BridgeError;

    fn try_from(s: String) -> Result<Self> {
        s.parse()
    }
}

fn layer_table(p: Property) -> Option<&'static str> {
    use Property::*;
    Some(match p {
        BackgroundColor => "layer.backgroundColor",
        Bounds => "layer.bounds",
        CornerRadius => "layer.cornerRadius",
        BorderWidth => "layer.borderWidth",
        BorderColor => "layer.borderColor",
        Opacity => "layer.opacity",
        Position => "layer.position",
        PositionX => "layer.position.x",
        PositionY => "layer.position.y",
        RotationZ => "layer.rotation",
        RotationX => "layer.rotation.x",
        RotationY => "layer.rotation.y",
        ScaleX => "layer.scale.x",
        ScaleXY => "layer.scale.xy",
        ScaleY => "layer.scale.y",
        Size => "layer.size",
        SublayerScaleXY => "layer.subscale.xy",
        SublayerTranslationX => "layer.subtranslation.x",
        SublayerTranslationXY => "layer.subtranslation.xy",
        SublayerTranslationY => "layer.subtranslation.y",
        SublayerTranslationZ => "layer.subtranslation.z",
        TranslationX => "layer.translation.x",
        TranslationXY => "layer.translation.xy",
        TranslationY => "layer.translation.y",
        TranslationZ => "layer.translation.z",
        ZPosition => "layer.zPosition",
        ShadowColor => "layer.shadowColor",
        ShadowOffset => "layer.shadowOffset",
        ShadowOpacity => "layer.shadowOpacity",
        ShadowRadius => "layer.shadowRadius",
        _ => return None,
    })
}

fn shape_layer_table(p: Property) -> Option<&'static str> {
    use Property::*;
    Some(match p {
        StrokeStart => "shapeLayer.strokeStart",
        StrokeEnd => "shapeLayer.strokeEnd",
        StrokeColor => "shapeLayer.strokeColor",
        FillColor => "shapeLayer.fillColor",
        LineWidth => "shapeLayer.lineWidth",
        LineDashPhase => "shapeLayer.lineDashPhase",
        _ => return None,
    })
}

fn layout_constraint_table(p: Property) -> Option<&'static str> {
    match p {
        Property::Constant => Some("layoutConstraint.constant"),
        _ => None,
    }
}

fn view_table(p: Property) -> Option<&'static str> {
    use Property::*;
    Some(match p {
        Alpha => "view.alpha",
        BackgroundColor => "view.backgroundColor",
        Bounds => "view.bounds",
        Center => "view.center",
        Frame => "view.frame",
        ScaleX => "view.scale.x",
        ScaleXY => "view.scale.xy",
        ScaleY => "view.scale.y",
        Size => "view.size",
        TintColor => "view.tintColor",
        _ => return None,
    })
}

fn scroll_view_table(p: Property) -> Option<&'static str> {
    use Property::*;
    Some(match p {
        ContentOffset => "scrollView.contentOffset",
        ContentSize => "scrollView.contentSize",
        ZoomScale => "scrollView.zoomScale",
        ContentInset => "scrollView.contentInset",
        ScrollIndicatorInsets => "scrollView.scrollIndicatorInsets",
        _ => return None,
    })
}

fn navigation_bar_table(p: Property) -> Option<&'static str> {
    match p {
        Property::BarTintColor => Some("navigationBar.barTintColor"),
        _ => None,
    }
}

fn label_table(p: Property) -> Option<&'static str> {
    match p {
        Property::TextColor => Some("label.textColor"),
        _ => None,
    }
}

/// Look `property` up in a single capability table.
pub fn lookup(capability: Capability, property: Property) -> Option<&'static str> {
    match capability {
        Capability::Layer => layer_table(property),
        Capability::ShapeLayer => shape_layer_table(property),
        Capability::LayoutConstraint => layout_constraint_table(property),
        Capability::View => view_table(property),
        Capability::ScrollView => scroll_view_table(property),
        Capability::NavigationBar => navigation_bar_table(property),
        Capability::Label => label_table(property),
    }
}

/// Engine property name for `property` on a target of `kind`, if any table the
/// kind satisfies knows it.
pub fn resolve(kind: TargetKind, property: Property) -> Option<&'static str> {
    Capability::PRECEDENCE
        .iter()
        .filter(|cap| kind.has(**cap))
        .find_map(|cap| lookup(*cap, property))
}

/// Like [`resolve`], but a miss is an [`BridgeError::UnsupportedProperty`].
pub fn resolve_checked(kind: TargetKind, property: Property) -> Result<&'static str> {
    resolve(kind, property).ok_or(BridgeError::UnsupportedProperty { property, kind })
}
