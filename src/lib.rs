//! Framewise is a frame-indexed animation composition model.
//!
//! Every visual and audible property is a pure function of one integer frame counter:
//!
//! - Describe a [`Composition`] as a tree of [`RenderUnit`]s (leaves, composites and time-windowed
//!   sequences) plus [`AudioTrack`]s, either with the [`CompositionBuilder`] or as JSON
//! - Register it in a [`Registry`] under a unique id
//! - Evaluate any frame in any order with [`Registry::render_frame`] or [`render_frames`]; the
//!   result is a [`FrameOutput`] tree handed to an external rasterizer
//!
//! Animated values come from [`interpolate`] (piecewise-linear mapping with clamp/extend
//! extrapolation) and [`spring`] (closed-form damped oscillator), combined in [`Anim`]
//! expressions.
#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod foundation;

pub(crate) mod animation;
pub(crate) mod assets;
pub(crate) mod audio;
pub(crate) mod composition;
pub(crate) mod registry;
pub(crate) mod render;
pub(crate) mod scene;
pub(crate) mod timeline;

pub use crate::foundation::core::{
    Affine, Canvas, Fps, FrameIndex, FrameRange, Rgba8Premul, Transform2D, Vec2,
};
pub use crate::foundation::error::{FramewiseError, FramewiseResult};

pub use crate::animation::anim::{Anim, SampleCtx};
pub use crate::animation::ease::Ease;
pub use crate::animation::interpolate::{Extrapolate, InterpolationMapping, interpolate};
pub use crate::animation::spring::{DEFAULT_SETTLE_THRESHOLD, SpringConfig, spring};
pub use crate::assets::store::{
    AssetCache, AssetLocator, AssetRef, AudioPcm, LoadedAsset, PreparedImage,
};
pub use crate::audio::mix::{
    AudioManifest, AudioSegment, MIX_SAMPLE_RATE, build_audio_manifest, frame_to_sample,
    mix_manifest,
};
pub use crate::audio::track::{ActiveAudio, AudioTrack, active_audio_at};
pub use crate::composition::dsl::CompositionBuilder;
pub use crate::composition::model::Composition;
pub use crate::registry::catalog::Registry;
pub use crate::render::pipeline::{RenderThreading, render_frame, render_frames};
pub use crate::scene::eval::{
    Evaluator, FrameOutput, LeafContent, PaintItem, VisualContent, VisualNode,
};
pub use crate::scene::model::{
    Composite, Leaf, RenderUnit, SequenceUnit, TextStyle, TransformAnim, TypedText, UnitProps,
    Visual,
};
pub use crate::timeline::sequence::{Sequence, resolve_nested};
