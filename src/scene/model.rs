use std::collections::BTreeSet;

use crate::{
    animation::anim::Anim,
    assets::store::AssetRef,
    foundation::core::{FrameIndex, Rgba8Premul, Vec2},
    foundation::error::{FramewiseError, FramewiseResult},
    timeline::sequence::Sequence,
};

/// Node of the declarative scene graph.
///
/// The set of variants is closed: leaves draw something, composites overlay their children in
/// declaration order (later children paint above earlier ones), and sequences clip their child to
/// a time window and shift its frame axis.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RenderUnit {
    /// Visual element.
    Leaf(Leaf),
    /// Ordered overlay of children.
    Composite(Composite),
    /// Time-windowed child.
    Sequence(SequenceUnit),
}

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
/// A visual element with animated properties.
pub struct Leaf {
    /// Optional label carried into the output tree.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// What to draw.
    pub visual: Visual,
    /// Animated opacity/transform.
    #[serde(default)]
    pub props: UnitProps,
}

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
/// Container whose children are layered in declaration order.
pub struct Composite {
    /// Optional label carried into the output tree.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Animated opacity/transform applied to the whole group.
    #[serde(default)]
    pub props: UnitProps,
    /// Children, bottom-most first.
    pub children: Vec<RenderUnit>,
}

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
/// Wraps a child in an activation window on the parent's frame axis.
pub struct SequenceUnit {
    /// Optional label; used for the child's output node when the child has none.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Active window.
    pub window: Sequence,
    /// Wrapped unit, evaluated on the window-local axis.
    pub child: Box<RenderUnit>,
}

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
/// Per-unit animated properties.
pub struct UnitProps {
    /// Opacity; clamped to `[0, 1]` at evaluation time.
    #[serde(default = "Anim::one")]
    pub opacity: Anim,
    /// Animated transform.
    #[serde(default)]
    pub transform: TransformAnim,
}

impl Default for UnitProps {
    fn default() -> Self {
        Self {
            opacity: Anim::one(),
            transform: TransformAnim::default(),
        }
    }
}

impl UnitProps {
    /// Replace the opacity animation.
    pub fn opacity(mut self, opacity: Anim) -> Self {
        self.opacity = opacity;
        self
    }

    /// Replace both translation animations.
    pub fn translate(mut self, x: Anim, y: Anim) -> Self {
        self.transform.translate_x = x;
        self.transform.translate_y = y;
        self
    }

    /// Replace the scale animation.
    pub fn scale(mut self, scale: Anim) -> Self {
        self.transform.scale = scale;
        self
    }

    /// Replace the rotation animation (radians).
    pub fn rotation(mut self, rotation_rad: Anim) -> Self {
        self.transform.rotation_rad = rotation_rad;
        self
    }

    /// Set the static pivot for scale and rotation.
    pub fn anchor(mut self, anchor: Vec2) -> Self {
        self.transform.anchor = anchor;
        self
    }

    fn validate(&self) -> FramewiseResult<()> {
        self.opacity.validate()?;
        self.transform.validate()
    }
}

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
/// Transform components, each animated independently.
pub struct TransformAnim {
    /// Horizontal translation in pixels.
    #[serde(default = "Anim::zero")]
    pub translate_x: Anim,
    /// Vertical translation in pixels.
    #[serde(default = "Anim::zero")]
    pub translate_y: Anim,
    /// Uniform scale.
    #[serde(default = "Anim::one")]
    pub scale: Anim,
    /// Rotation in radians.
    #[serde(default = "Anim::zero")]
    pub rotation_rad: Anim,
    /// Static pivot in local space.
    #[serde(default = "default_anchor")]
    pub anchor: Vec2,
}

fn default_anchor() -> Vec2 {
    Vec2::ZERO
}

impl Default for TransformAnim {
    fn default() -> Self {
        Self {
            translate_x: Anim::zero(),
            translate_y: Anim::zero(),
            scale: Anim::one(),
            rotation_rad: Anim::zero(),
            anchor: Vec2::ZERO,
        }
    }
}

impl TransformAnim {
    fn validate(&self) -> FramewiseResult<()> {
        self.translate_x.validate()?;
        self.translate_y.validate()?;
        self.scale.validate()?;
        self.rotation_rad.validate()?;
        if !self.anchor.is_finite() {
            return Err(FramewiseError::configuration("anchor must be finite"));
        }
        Ok(())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
/// Text colour and size.
pub struct TextStyle {
    /// Fill colour.
    pub color: Rgba8Premul,
    /// Font size in pixels.
    pub size_px: f32,
}

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
/// Leaf payload.
pub enum Visual {
    /// Filled rectangle.
    Solid {
        /// Fill colour.
        color: Rgba8Premul,
        /// Width in pixels.
        width: f64,
        /// Height in pixels.
        height: f64,
    },
    /// Static text.
    Text {
        /// UTF-8 content.
        text: String,
        /// Colour and size.
        style: TextStyle,
    },
    /// Text revealed character by character.
    TypedText(TypedText),
    /// Raster image resolved by the asset locator.
    Image {
        /// Asset handle.
        src: AssetRef,
        /// Display width in pixels.
        width: f64,
        /// Display height in pixels.
        height: f64,
    },
}

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
/// Typing effect: `floor((frame - start_frame) * speed)` characters are visible, with a caret
/// while the text is incomplete.
pub struct TypedText {
    /// Full text.
    pub text: String,
    /// Local frame at which typing begins.
    #[serde(default)]
    pub start_frame: u64,
    /// Characters revealed per frame.
    #[serde(default = "default_typing_speed")]
    pub speed: f64,
    /// Colour and size.
    pub style: TextStyle,
    /// Caret fill colour.
    pub caret_color: Rgba8Premul,
}

fn default_typing_speed() -> f64 {
    1.5
}

impl TypedText {
    /// Number of characters (Unicode scalar values) in the full text.
    pub fn len_chars(&self) -> usize {
        self.text.chars().count()
    }

    /// Visible character count at `local`, clamped to `[0, len]`.
    pub fn visible_chars(&self, local: FrameIndex) -> usize {
        let elapsed = local.0 as f64 - self.start_frame as f64;
        let typed = (elapsed * self.speed).floor();
        if typed <= 0.0 {
            return 0;
        }
        let len = self.len_chars();
        if typed >= len as f64 {
            len
        } else {
            typed as usize
        }
    }

    /// The visible prefix at `local`.
    pub fn visible_text(&self, local: FrameIndex) -> &str {
        let n = self.visible_chars(local);
        match self.text.char_indices().nth(n) {
            Some((byte, _)) => &self.text[..byte],
            None => &self.text,
        }
    }

    /// `true` while typing has not reached the end of the text.
    pub fn shows_caret(&self, local: FrameIndex) -> bool {
        self.visible_chars(local) < self.len_chars()
    }

    fn validate(&self) -> FramewiseResult<()> {
        if !self.speed.is_finite() || self.speed <= 0.0 {
            return Err(FramewiseError::configuration(
                "typed text speed must be finite and > 0",
            ));
        }
        check_font_size(self.style.size_px)
    }
}

fn check_font_size(size_px: f32) -> FramewiseResult<()> {
    if !size_px.is_finite() || size_px <= 0.0 {
        return Err(FramewiseError::configuration(
            "text size_px must be finite and > 0",
        ));
    }
    Ok(())
}

fn check_size(width: f64, height: f64) -> FramewiseResult<()> {
    if !(width.is_finite() && height.is_finite()) || width < 0.0 || height < 0.0 {
        return Err(FramewiseError::configuration(
            "visual width/height must be finite and >= 0",
        ));
    }
    Ok(())
}

impl Visual {
    fn validate(&self) -> FramewiseResult<()> {
        match self {
            Self::Solid { width, height, .. } | Self::Image { width, height, .. } => {
                check_size(*width, *height)
            }
            Self::Text { style, .. } => check_font_size(style.size_px),
            Self::TypedText(t) => t.validate(),
        }
    }
}

impl Leaf {
    /// Leaf with default properties.
    pub fn new(visual: Visual) -> Self {
        Self {
            name: None,
            visual,
            props: UnitProps::default(),
        }
    }

    /// Attach a label.
    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Replace the animated properties.
    pub fn with_props(mut self, props: UnitProps) -> Self {
        self.props = props;
        self
    }
}

impl Composite {
    /// Composite with default properties.
    pub fn new(children: Vec<RenderUnit>) -> Self {
        Self {
            name: None,
            props: UnitProps::default(),
            children,
        }
    }

    /// Attach a label.
    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Replace the animated properties.
    pub fn with_props(mut self, props: UnitProps) -> Self {
        self.props = props;
        self
    }
}

impl SequenceUnit {
    /// Wrap `child` in `window`.
    pub fn new(window: Sequence, child: impl Into<RenderUnit>) -> Self {
        Self {
            name: None,
            window,
            child: Box::new(child.into()),
        }
    }

    /// Attach a label.
    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }
}

impl From<Leaf> for RenderUnit {
    fn from(v: Leaf) -> Self {
        Self::Leaf(v)
    }
}

impl From<Composite> for RenderUnit {
    fn from(v: Composite) -> Self {
        Self::Composite(v)
    }
}

impl From<SequenceUnit> for RenderUnit {
    fn from(v: SequenceUnit) -> Self {
        Self::Sequence(v)
    }
}

impl RenderUnit {
    /// Shorthand for a windowed unit.
    pub fn sequence(
        offset: u64,
        duration: u64,
        child: impl Into<RenderUnit>,
    ) -> FramewiseResult<Self> {
        Ok(SequenceUnit::new(Sequence::new(offset, duration)?, child).into())
    }

    /// Validate the whole subtree.
    pub fn validate(&self) -> FramewiseResult<()> {
        match self {
            Self::Leaf(leaf) => {
                leaf.visual.validate()?;
                leaf.props.validate()
            }
            Self::Composite(c) => {
                c.props.validate()?;
                c.children.iter().try_for_each(RenderUnit::validate)
            }
            Self::Sequence(s) => s.child.validate(),
        }
    }

    /// Collect every asset referenced in the subtree.
    pub fn collect_asset_refs(&self, out: &mut BTreeSet<AssetRef>) {
        match self {
            Self::Leaf(leaf) => {
                if let Visual::Image { src, .. } = &leaf.visual {
                    out.insert(src.clone());
                }
            }
            Self::Composite(c) => {
                for child in &c.children {
                    child.collect_asset_refs(out);
                }
            }
            Self::Sequence(s) => s.child.collect_asset_refs(out),
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/scene/model.rs"]
mod tests;
