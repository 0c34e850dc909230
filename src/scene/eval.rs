use crate::{
    animation::anim::SampleCtx,
    assets::store::AssetRef,
    composition::model::Composition,
    foundation::core::{Affine, FrameIndex, Rgba8Premul, Transform2D, Vec2},
    foundation::error::{FramewiseError, FramewiseResult},
    foundation::math::Fnv1a64,
    scene::model::{RenderUnit, UnitProps, Visual},
};

#[derive(Clone, Debug, PartialEq, serde::Serialize)]
/// Visual output of one composition frame.
pub struct FrameOutput {
    /// Evaluated composition frame.
    pub frame: FrameIndex,
    /// Output tree; `None` when the root itself is outside its window.
    pub root: Option<VisualNode>,
}

#[derive(Clone, Debug, PartialEq, serde::Serialize)]
/// One evaluated unit. Transform and opacity are relative to the parent node.
pub struct VisualNode {
    /// Label from the unit (or its enclosing sequence).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Frame on the unit's own axis.
    pub local_frame: FrameIndex,
    /// Transform relative to the parent.
    pub transform: Affine,
    /// Opacity in `[0, 1]`, relative to the parent.
    pub opacity: f64,
    /// Payload.
    pub content: VisualContent,
}

#[derive(Clone, Debug, PartialEq, serde::Serialize)]
#[serde(rename_all = "snake_case")]
/// Payload of a [`VisualNode`].
pub enum VisualContent {
    /// Active children in paint order.
    Group(Vec<VisualNode>),
    /// Drawable leaf.
    Leaf(LeafContent),
}

#[derive(Clone, Debug, PartialEq, serde::Serialize)]
#[serde(rename_all = "snake_case")]
/// Drawable payload handed to the rasterizer.
pub enum LeafContent {
    /// Filled rectangle at the local origin.
    Solid {
        /// Fill colour.
        color: Rgba8Premul,
        /// Width in pixels.
        width: f64,
        /// Height in pixels.
        height: f64,
    },
    /// Text run.
    Text {
        /// Text to draw (already truncated for typing effects).
        text: String,
        /// Fill colour.
        color: Rgba8Premul,
        /// Font size in pixels.
        size_px: f32,
        /// Caret colour when a caret follows the text.
        #[serde(skip_serializing_if = "Option::is_none")]
        caret: Option<Rgba8Premul>,
    },
    /// Image drawn at the local origin.
    Image {
        /// Asset handle.
        src: AssetRef,
        /// Display width in pixels.
        width: f64,
        /// Display height in pixels.
        height: f64,
    },
}

#[derive(Clone, Debug, PartialEq, serde::Serialize)]
/// Leaf in painter's order with its accumulated transform and opacity.
pub struct PaintItem {
    /// Label of the leaf node.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Composition-space transform.
    pub transform: Affine,
    /// Product of every ancestor's opacity.
    pub opacity: f64,
    /// What to draw.
    pub content: LeafContent,
}

impl FrameOutput {
    /// Painter-ordered list of leaves (first item is drawn first).
    pub fn flatten(&self) -> Vec<PaintItem> {
        let mut out = Vec::new();
        if let Some(root) = &self.root {
            flatten_into(root, Affine::IDENTITY, 1.0, &mut out);
        }
        out
    }

    /// Stable 64-bit hash of the serialized output.
    pub fn fingerprint(&self) -> FramewiseResult<u64> {
        let mut h = Fnv1a64::new_default();
        serde_json::to_writer(&mut h, self)
            .map_err(|e| FramewiseError::serde(format!("fingerprint encode failed: {e}")))?;
        Ok(h.finish())
    }
}

fn flatten_into(node: &VisualNode, parent: Affine, parent_opacity: f64, out: &mut Vec<PaintItem>) {
    let transform = parent * node.transform;
    let opacity = parent_opacity * node.opacity;
    match &node.content {
        VisualContent::Group(children) => {
            for child in children {
                flatten_into(child, transform, opacity, out);
            }
        }
        VisualContent::Leaf(content) => out.push(PaintItem {
            name: node.name.clone(),
            transform,
            opacity,
            content: content.clone(),
        }),
    }
}

/// Stateless evaluator from composition + frame to visual output.
pub struct Evaluator;

impl Evaluator {
    #[tracing::instrument(skip(comp), fields(comp = %comp.id))]
    /// Evaluate `frame`; frames at or past the composition duration are a lookup error.
    pub fn eval_frame(comp: &Composition, frame: FrameIndex) -> FramewiseResult<FrameOutput> {
        comp.check_frame(frame)?;
        Ok(Self::eval_frame_unchecked(comp, frame))
    }

    pub(crate) fn eval_frame_unchecked(comp: &Composition, frame: FrameIndex) -> FrameOutput {
        let ctx = SampleCtx {
            frame,
            local: frame,
            fps: comp.fps,
        };
        FrameOutput {
            frame,
            root: eval_unit(&comp.root, ctx),
        }
    }
}

fn eval_unit(unit: &RenderUnit, ctx: SampleCtx) -> Option<VisualNode> {
    match unit {
        RenderUnit::Sequence(seq) => {
            let local = seq.window.local_frame(ctx.local)?;
            let mut node = eval_unit(&seq.child, SampleCtx { local, ..ctx })?;
            if node.name.is_none() {
                node.name.clone_from(&seq.name);
            }
            Some(node)
        }
        RenderUnit::Composite(c) => {
            let children = c
                .children
                .iter()
                .filter_map(|child| eval_unit(child, ctx))
                .collect();
            Some(node_with_props(
                c.name.clone(),
                &c.props,
                ctx,
                VisualContent::Group(children),
            ))
        }
        RenderUnit::Leaf(leaf) => Some(node_with_props(
            leaf.name.clone(),
            &leaf.props,
            ctx,
            VisualContent::Leaf(eval_visual(&leaf.visual, ctx.local)),
        )),
    }
}

fn node_with_props(
    name: Option<String>,
    props: &UnitProps,
    ctx: SampleCtx,
    content: VisualContent,
) -> VisualNode {
    let t = &props.transform;
    let transform = Transform2D {
        translate: Vec2::new(t.translate_x.sample(ctx), t.translate_y.sample(ctx)),
        rotation_rad: t.rotation_rad.sample(ctx),
        scale: t.scale.sample(ctx),
        anchor: t.anchor,
    };
    VisualNode {
        name,
        local_frame: ctx.local,
        transform: transform.to_affine(),
        opacity: props.opacity.sample(ctx).clamp(0.0, 1.0),
        content,
    }
}

fn eval_visual(visual: &Visual, local: FrameIndex) -> LeafContent {
    match visual {
        Visual::Solid {
            color,
            width,
            height,
        } => LeafContent::Solid {
            color: *color,
            width: *width,
            height: *height,
        },
        Visual::Text { text, style } => LeafContent::Text {
            text: text.clone(),
            color: style.color,
            size_px: style.size_px,
            caret: None,
        },
        Visual::TypedText(typed) => LeafContent::Text {
            text: typed.visible_text(local).to_string(),
            color: typed.style.color,
            size_px: typed.style.size_px,
            caret: typed.shows_caret(local).then_some(typed.caret_color),
        },
        Visual::Image { src, width, height } => LeafContent::Image {
            src: src.clone(),
            width: *width,
            height: *height,
        },
    }
}

#[cfg(test)]
#[path = "../../tests/unit/scene/eval.rs"]
mod tests;
