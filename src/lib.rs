//! clipline resolves timed, annotated text clips (lyrics, captions, subtitles) into per-frame
//! state and glyph layouts.
//!
//! - Parse clip text with structural sigils into [`Clip`]s
//! - Partition each [`ClipTrack`] into [`ClipGroup`]s at clear-screen markers
//! - Query a [`Sequence`] for the group active at a frame, resolved into a [`ResolvedGroup`]
//! - Lay a resolved group out as a [`ClipGroupPens`] tree with a [`TextStyler`]
#![forbid(unsafe_code)]

mod foundation;

pub(crate) mod animation;
pub(crate) mod pens;
pub(crate) mod timeline;

pub use crate::foundation::core::{Fps, FrameContext, FrameIndex, FrameRange, Rect};
pub use crate::foundation::error::{ClipLineError, ClipLineResult};

pub use crate::animation::ease::{Ease, EaseFn, EaseRegistry};
pub use crate::pens::style::{GlyphBox, GrafStyle, PensOpts, StyledRun, TextBrushRgba8, TextStyle};
pub use crate::pens::styler::{MonospaceStyler, ParleyStyler, TextStyler};
pub use crate::pens::tree::{ClipGroupPens, ClipPen, LineMeta, PenGroup, PenNode, PenTag};
pub use crate::timeline::clip::{Clip, ClipFlag, ClipType, FadeAnchor, JoinDirection, sigil};
pub use crate::timeline::group::ClipGroup;
pub use crate::timeline::inline_data::DataValue;
pub use crate::timeline::model::{ClipDef, MarkerDef, SequenceDef, TrackDef};
pub use crate::timeline::resolve::{
    ClipSnapshot, ClipState, GroupSnapshot, Position, ResolvedGroup,
};
pub use crate::timeline::sequence::{QueryThreading, Sequence};
pub use crate::timeline::track::{ClipTrack, Marker};
