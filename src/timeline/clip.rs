use std::borrow::Cow;
use std::collections::BTreeMap;

use crate::{
    animation::ease::EaseRegistry,
    foundation::core::{FrameIndex, FrameRange},
    foundation::error::{ClipLineError, ClipLineResult},
    timeline::inline_data::{DataValue, parse_inline_data},
};

/// Authoring sigils recognised in clip text.
pub mod sigil {
    /// Leading: close the current group.
    pub const CLEAR_SCREEN: char = '*';
    /// Leading: start a new line.
    pub const NEW_LINE: char = '≈';
    /// Leading: paragraph break.
    pub const GRAF_BREAK: char = '¶';
    /// Leading: fuse with the previous clip into one word.
    pub const JOIN_PREV: char = '+';
    /// Leading: metadata clip, never rendered.
    pub const META: &str = "µ:";
    /// Separates text from field sigils and their payloads.
    pub const FIELD: char = ':';
    /// Field: the next segment holds comma-separated style tokens.
    pub const STYLES: &str = "ß";
    /// Field: the next segment holds `&`-joined `key=value` data.
    pub const DATA: &str = "∂";
    /// Leading: blank new line, optionally followed by a height.
    pub const BLANK_LINE: char = '§';
    /// Leading: blank clip.
    pub const BLANK: char = '∫';
    /// Leading (fade in) or trailing (fade out) fade marker.
    pub const FADE: char = 'ƒ';
    /// Text used for synthetic paragraph-mark clips.
    pub const GRAF_MARK: &str = "¶";
}

const DEFAULT_BLANK_HEIGHT: f64 = 20.0;
const DEFAULT_FADE_FRAMES: u64 = 3;

/// Structural role of a clip, decided by its leading sigil.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum ClipType {
    /// Closes the current group; never part of a group itself.
    ClearScreen,
    /// Starts a new visual line.
    NewLine,
    /// Paragraph break: closes the line and emits a paragraph mark.
    GrafBreak,
    /// Reserved for blank clips.
    Blank,
    /// A free-standing word; rendered with a leading space.
    Isolated,
    /// Fused to the previous clip in the same word.
    JoinPrev,
    /// Metadata; skipped during rendering.
    Meta,
}

/// Fade flags carried by a clip.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
)]
pub enum ClipFlag {
    /// Fade in over N frames.
    FadeIn,
    /// Fade out over N frames.
    FadeOut,
}

/// Which end of a join link to set.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum JoinDirection {
    /// The clip before this one in the run (`-1`).
    Prev,
    /// The clip after this one in the run (`+1`).
    Next,
}

/// Where a fade window starts relative to its clip.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FadeAnchor {
    /// Window starts at the clip's own start (`0`).
    ClipStart,
    /// Window ends at the clip's start, beginning `duration` frames earlier (`-1`).
    Lead,
}

impl TryFrom<i32> for FadeAnchor {
    type Error = ClipLineError;

    fn try_from(value: i32) -> ClipLineResult<Self> {
        match value {
            0 => Ok(Self::ClipStart),
            -1 => Ok(Self::Lead),
            other => Err(ClipLineError::animation(format!(
                "fade anchor must be 0 (clip start) or -1 (lead), got {other}"
            ))),
        }
    }
}

/// Smallest timed text unit.
///
/// Built by parsing annotated text (see [`sigil`]). Once a clip is placed in a
/// [`crate::ClipGroup`] it knows its group-local index, its group, and its join neighbours; all
/// three are indices, never references.
#[derive(Clone, Debug, PartialEq)]
pub struct Clip {
    /// Text exactly as authored.
    pub input_text: String,
    /// Working text after sigils were stripped.
    pub text: String,
    /// Fully stripped text, kept even if `text` is rewritten later.
    pub original_text: String,
    /// Frame span; `end` is exclusive.
    pub range: FrameRange,
    /// Structural role.
    pub clip_type: ClipType,
    /// Blank clips take up time but render nothing.
    pub blank: bool,
    /// Height of a `§` blank line.
    pub blank_height: f64,
    /// Fade flags and their durations in frames.
    pub flags: BTreeMap<ClipFlag, u64>,
    /// Tokens from a `ß` field.
    pub inline_styles: Vec<String>,
    /// Values from a `∂` field.
    pub inline_data: BTreeMap<String, DataValue>,
    /// Owning track index.
    pub track: usize,
    pub(crate) idx: Option<usize>,
    pub(crate) group: Option<usize>,
    pub(crate) join_prev: Option<usize>,
    pub(crate) join_next: Option<usize>,
}

impl Clip {
    /// Parse `text` into a clip spanning `[start, end)` on `track`.
    pub fn new(
        text: impl Into<String>,
        start: FrameIndex,
        end: FrameIndex,
        track: usize,
    ) -> ClipLineResult<Self> {
        let range = FrameRange::new(start, end).map_err(|_| {
            ClipLineError::validation(format!(
                "clip start {} must be <= end {}",
                start.0, end.0
            ))
        })?;
        Ok(Self::parse(text.into(), range, track))
    }

    /// Preassign a group-local index; groups overwrite it on construction.
    pub fn with_index(mut self, idx: usize) -> Self {
        self.idx = Some(idx);
        self
    }

    fn parse(input_text: String, range: FrameRange, track: usize) -> Self {
        let mut clip_type = ClipType::Isolated;
        let mut rest = input_text.as_str();

        if let Some(r) = rest.strip_prefix(sigil::CLEAR_SCREEN) {
            rest = r;
            clip_type = ClipType::ClearScreen;
        } else if let Some(r) = rest.strip_prefix(sigil::NEW_LINE) {
            rest = r;
            clip_type = ClipType::NewLine;
        } else if let Some(r) = rest.strip_prefix(sigil::GRAF_BREAK) {
            rest = r;
            clip_type = ClipType::GrafBreak;
        } else if let Some(r) = rest.strip_prefix(sigil::JOIN_PREV) {
            rest = r;
            clip_type = ClipType::JoinPrev;
        } else if let Some(r) = rest.strip_prefix(sigil::META) {
            rest = r;
            clip_type = ClipType::Meta;
        }

        let parts: Vec<&str> = rest.split(sigil::FIELD).collect();
        let inline_styles = field_after(&parts, sigil::STYLES)
            .map(|seg| seg.split(',').map(str::to_string).collect())
            .unwrap_or_default();
        let inline_data = field_after(&parts, sigil::DATA)
            .map(parse_inline_data)
            .unwrap_or_default();

        let mut text = parts[0].to_string();
        let mut blank = false;
        let mut blank_height = DEFAULT_BLANK_HEIGHT;

        if let Some(r) = text.strip_prefix(sigil::BLANK_LINE) {
            text = r.to_string();
            clip_type = ClipType::NewLine;
            blank = true;
            match text.trim().parse::<f64>() {
                Ok(h) if h.is_finite() => blank_height = h,
                _ => tracing::debug!(
                    input = %input_text,
                    "blank height not numeric; using default"
                ),
            }
        }

        if text.starts_with(sigil::BLANK) {
            text.clear();
            blank = true;
        }
        if text.is_empty() {
            blank = true;
        }

        let mut flags = BTreeMap::new();
        if let Some(r) = text.strip_prefix(sigil::FADE) {
            let (frames, tail) = split_fade_frames(r);
            text = tail.to_string();
            flags.insert(ClipFlag::FadeIn, frames);
        } else if text.ends_with(sigil::FADE) {
            flags.insert(ClipFlag::FadeOut, DEFAULT_FADE_FRAMES);
        }

        Self {
            original_text: text.clone(),
            input_text,
            text,
            range,
            clip_type,
            blank,
            blank_height,
            flags,
            inline_styles,
            inline_data,
            track,
            idx: None,
            group: None,
            join_prev: None,
            join_next: None,
        }
    }

    /// Inclusive start frame.
    pub fn start(&self) -> FrameIndex {
        self.range.start
    }

    /// Exclusive end frame.
    pub fn end(&self) -> FrameIndex {
        self.range.end
    }

    /// Index within the owning group, once grouped.
    pub fn idx(&self) -> Option<usize> {
        self.idx
    }

    /// Index of the owning group within its track, once grouped.
    pub fn group(&self) -> Option<usize> {
        self.group
    }

    /// Group-local index of the previous clip in this clip's join run.
    pub fn join_prev(&self) -> Option<usize> {
        self.join_prev
    }

    /// Group-local index of the next clip in this clip's join run.
    pub fn join_next(&self) -> Option<usize> {
        self.join_next
    }

    /// Link this clip to the clip at group-local index `other`.
    pub fn add_join(&mut self, direction: JoinDirection, other: usize) {
        match direction {
            JoinDirection::Prev => self.join_prev = Some(other),
            JoinDirection::Next => self.join_next = Some(other),
        }
    }

    /// Start frame of the join run this clip belongs to.
    ///
    /// `siblings` is the owning group's clip list.
    pub fn join_start(&self, siblings: &[Clip]) -> FrameIndex {
        let mut clip = self;
        let mut steps = 0;
        while let Some(prev) = clip.join_prev.and_then(|i| siblings.get(i)) {
            clip = prev;
            steps += 1;
            if steps > siblings.len() {
                break;
            }
        }
        clip.start()
    }

    /// End frame of the join run this clip belongs to.
    pub fn join_end(&self, siblings: &[Clip]) -> FrameIndex {
        let mut clip = self;
        let mut steps = 0;
        while let Some(next) = clip.join_next.and_then(|i| siblings.get(i)) {
            clip = next;
            steps += 1;
            if steps > siblings.len() {
                break;
            }
        }
        clip.end()
    }

    /// Text as it should be laid out: isolated words get a leading space.
    pub fn ftext(&self) -> Cow<'_, str> {
        if self.clip_type == ClipType::Isolated {
            Cow::Owned(format!(" {}", self.text))
        } else {
            Cow::Borrowed(&self.text)
        }
    }

    /// Segment `index` of a `/`-separated text, or the last segment when out of range.
    pub fn text_for_index(&self, index: usize) -> &str {
        let mut segments = self.text.split('/');
        let last = self.text.rsplit('/').next().unwrap_or_default();
        segments.nth(index).unwrap_or(last)
    }

    /// Fade-in length in frames, or `default` when the clip has none.
    pub fn fade(&self, default: u64) -> u64 {
        self.flags
            .get(&ClipFlag::FadeIn)
            .copied()
            .unwrap_or(default)
    }

    /// Fade-in progress at `frame`.
    ///
    /// Returns `-1.0` before the window, `1.0` after it, and the eased progress inside it.
    /// `fade_length` overrides the clip's own fade; with neither the result is `-1.0`.
    pub fn fade_in(
        &self,
        frame: FrameIndex,
        ease: &str,
        registry: &EaseRegistry,
        fade_length: Option<u64>,
        anchor: FadeAnchor,
    ) -> ClipLineResult<f64> {
        let fade = match fade_length.filter(|f| *f > 0) {
            Some(f) => f,
            None => match self.flags.get(&ClipFlag::FadeIn) {
                Some(f) => *f,
                None => return Ok(-1.0),
            },
        };
        // Wide enough for any u64 frame and fade length.
        let fade_w = i128::from(fade);
        let start = i128::from(self.start().0);
        let window_start = match anchor {
            FadeAnchor::ClipStart => start,
            FadeAnchor::Lead => start - fade_w,
        };
        let fi = i128::from(frame.0);
        if fi < window_start {
            return Ok(-1.0);
        }
        if fi > window_start + fade_w {
            return Ok(1.0);
        }
        let progress = (fi - window_start) as f64 / fade as f64;
        registry.apply(ease, progress)
    }
}

// Payload segment following the first segment equal to `marker`.
fn field_after<'s>(parts: &[&'s str], marker: &str) -> Option<&'s str> {
    let i = parts.iter().position(|p| *p == marker)?;
    parts.get(i + 1).copied()
}

// `<digits>ƒ` right after a leading fade sigil sets the fade length.
fn split_fade_frames(s: &str) -> (u64, &str) {
    let digits_len = s.bytes().take_while(u8::is_ascii_digit).count();
    if digits_len == 0 {
        return (DEFAULT_FADE_FRAMES, s);
    }
    let Some(tail) = s[digits_len..].strip_prefix(sigil::FADE) else {
        return (DEFAULT_FADE_FRAMES, s);
    };
    match s[..digits_len].parse::<u64>() {
        Ok(frames) => (frames, tail),
        Err(_) => {
            tracing::debug!(digits = &s[..digits_len], "fade length overflow; using default");
            (DEFAULT_FADE_FRAMES, tail)
        }
    }
}

impl std::fmt::Display for Clip {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "<Clip:({}/{}\"{}\")>",
            self.start(),
            self.end(),
            self.text
        )
    }
}

#[cfg(test)]
#[path = "../../tests/unit/timeline/clip.rs"]
mod tests;
