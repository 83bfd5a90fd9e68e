use std::borrow::Cow;
use std::collections::BTreeSet;

use crate::{
    foundation::core::{FrameIndex, FrameRange},
    timeline::clip::{Clip, ClipType},
    timeline::group::ClipGroup,
    timeline::track::ClipTrack,
};

/// Where a clip sits relative to the query frame.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Position {
    /// Ended before the frame (`-1`).
    Past,
    /// Contains the frame (`0`).
    Current,
    /// Starts after the frame (`1`).
    Future,
}

impl Position {
    /// Classify `range` against `frame`.
    pub fn of(range: FrameRange, frame: FrameIndex) -> Self {
        if range.start > frame {
            Self::Future
        } else if range.end > frame {
            Self::Current
        } else {
            Self::Past
        }
    }

    /// `-1`, `0` or `1`.
    pub fn as_i8(self) -> i8 {
        match self {
            Self::Past => -1,
            Self::Current => 0,
            Self::Future => 1,
        }
    }
}

impl serde::Serialize for Position {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_i8(self.as_i8())
    }
}

/// Per-frame state of one clip.
#[derive(Clone, Debug, PartialEq)]
pub struct ClipState<'a> {
    /// Past / current / future.
    pub position: Position,
    /// Fused to the current clip through a join run.
    pub joined: bool,
    /// Style tokens collected from the style tracks.
    pub styles: Vec<String>,
    /// Style-track clips the tokens came from.
    pub style_clips: Vec<&'a Clip>,
}

/// A [`ClipGroup`] resolved against one query frame.
///
/// Built fresh by every [`ClipGroup::position`] call, so concurrent queries never share state.
#[derive(Clone, Debug)]
pub struct ResolvedGroup<'a> {
    group: &'a ClipGroup,
    frame: FrameIndex,
    states: Vec<ClipState<'a>>,
    style_tracks: Vec<&'a ClipTrack>,
}

impl ClipGroup {
    /// Resolve every clip of this group at `frame`.
    ///
    /// Each clip is classified as past, current or future. Clips fused to the current clip by
    /// its join run are marked joined. Each style track is then sampled at a per-clip reference
    /// frame (`end - 1` for past clips, `frame` for the current clip, `start` for future
    /// clips) and the matching style clip's comma-separated text is appended to the clip's
    /// styles.
    pub fn position<'a>(
        &'a self,
        frame: FrameIndex,
        style_tracks: &[&'a ClipTrack],
    ) -> ResolvedGroup<'a> {
        let mut states: Vec<ClipState<'a>> = self
            .clips()
            .iter()
            .map(|clip| ClipState {
                position: Position::of(clip.range, frame),
                joined: false,
                styles: Vec::new(),
                style_clips: Vec::new(),
            })
            .collect();

        if let Some(current) = states.iter().position(|s| s.position == Position::Current) {
            for idx in self.join_run(current) {
                if idx != current {
                    states[idx].joined = true;
                }
            }
        }

        for (clip, state) in self.clips().iter().zip(states.iter_mut()) {
            // A past clip ending at frame 0 has no `end - 1` to sample.
            let reference = match state.position {
                Position::Past => clip.end().0.checked_sub(1).map(FrameIndex),
                Position::Current => Some(frame),
                Position::Future => Some(clip.start()),
            };
            let Some(reference) = reference else {
                continue;
            };
            for &track in style_tracks {
                let Some(style_clip) = track.current(reference) else {
                    continue;
                };
                state.styles.extend(style_tokens(style_clip));
                state.style_clips.push(style_clip);
            }
        }

        ResolvedGroup {
            group: self,
            frame,
            states,
            style_tracks: style_tracks.to_vec(),
        }
    }
}

fn style_tokens(style_clip: &Clip) -> impl Iterator<Item = String> + '_ {
    style_clip
        .text
        .trim()
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

impl<'a> ResolvedGroup<'a> {
    /// The group these states belong to.
    pub fn group(&self) -> &'a ClipGroup {
        self.group
    }

    /// Query frame.
    pub fn frame(&self) -> FrameIndex {
        self.frame
    }

    /// Style tracks consulted for this resolution.
    pub fn style_tracks(&self) -> &[&'a ClipTrack] {
        &self.style_tracks
    }

    /// `false` for the sentinel group.
    pub fn is_valid(&self) -> bool {
        self.group.is_valid()
    }

    /// States indexed like [`ClipGroup::clips`].
    pub fn states(&self) -> &[ClipState<'a>] {
        &self.states
    }

    /// State of clip `idx`.
    pub fn state(&self, idx: usize) -> Option<&ClipState<'a>> {
        self.states.get(idx)
    }

    /// Position of clip `idx`; unknown clips count as future.
    pub fn position_of(&self, idx: usize) -> Position {
        self.state(idx).map_or(Position::Future, |s| s.position)
    }

    /// Clips paired with their states.
    pub fn iter(&self) -> impl Iterator<Item = (&'a Clip, &ClipState<'a>)> {
        self.group.clips().iter().zip(self.states.iter())
    }

    /// Union of every clip's styles.
    pub fn styles(&self) -> BTreeSet<&str> {
        self.states
            .iter()
            .flat_map(|s| s.styles.iter().map(String::as_str))
            .collect()
    }

    /// First recorded style clip whose text contains `token`.
    pub fn style_matching(&self, token: &str) -> Option<&'a Clip> {
        self.states
            .iter()
            .flat_map(|s| s.style_clips.iter().copied())
            .find(|c| c.text.contains(token))
    }

    /// First style-track clip current at `frame` that satisfies `pred`.
    pub fn current_style_matching<F>(&self, frame: FrameIndex, pred: F) -> Option<&'a Clip>
    where
        F: Fn(&Clip) -> bool,
    {
        self.style_tracks
            .iter()
            .copied()
            .filter_map(|t| t.current(frame))
            .find(|&c| pred(c))
    }

    /// First style-track clip current at `frame` whose text contains `token`.
    pub fn current_style_containing(&self, frame: FrameIndex, token: &str) -> Option<&'a Clip> {
        self.current_style_matching(frame, |c| c.text.contains(token))
    }

    /// Index of the clip at the current position.
    pub fn current_idx(&self) -> Option<usize> {
        self.states
            .iter()
            .position(|s| s.position == Position::Current)
    }

    /// The clip containing the query frame.
    pub fn current_syllable(&self) -> Option<&'a Clip> {
        self.current_idx().and_then(|i| self.group.clip(i))
    }

    /// The join run around the current clip.
    pub fn current_word(&self) -> Option<&'a [Clip]> {
        let idx = self.current_idx()?;
        self.group.clips().get(self.group.join_run(idx))
    }

    /// The line holding the current clip.
    pub fn current_line(&self) -> Option<Vec<Cow<'a, Clip>>> {
        let group: &'a ClipGroup = self.group;
        group.lines(false).into_iter().find(|line| {
            line.iter()
                .any(|c| c.idx().map(|i| self.position_of(i)) == Some(Position::Current))
        })
    }

    /// See [`ClipGroup::lines`].
    pub fn lines(&self, ignore_newlines: bool) -> Vec<Vec<Cow<'a, Clip>>> {
        self.group.lines(ignore_newlines)
    }

    /// Serializable summary of this resolution.
    pub fn snapshot(&self) -> GroupSnapshot {
        GroupSnapshot {
            frame: self.frame,
            track: self.group.track(),
            group: self.group.index(),
            range: self.is_valid().then(|| self.group.range()),
            clips: self
                .iter()
                .enumerate()
                .map(|(idx, (clip, state))| ClipSnapshot {
                    idx,
                    text: clip.text.clone(),
                    input_text: clip.input_text.clone(),
                    clip_type: clip.clip_type,
                    range: clip.range,
                    position: state.position,
                    joined: state.joined,
                    styles: state.styles.clone(),
                })
                .collect(),
        }
    }
}

/// One resolved frame, detached from the sequence it came from.
#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub struct GroupSnapshot {
    /// Query frame.
    pub frame: FrameIndex,
    /// Track queried.
    pub track: usize,
    /// Group index, `None` when nothing matched.
    pub group: Option<usize>,
    /// Group frame span, `None` when nothing matched.
    pub range: Option<FrameRange>,
    /// Per-clip results.
    pub clips: Vec<ClipSnapshot>,
}

/// Per-clip entry of a [`GroupSnapshot`].
#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub struct ClipSnapshot {
    /// Group-local index.
    pub idx: usize,
    /// Working text.
    pub text: String,
    /// Authored text.
    pub input_text: String,
    /// Structural role.
    pub clip_type: ClipType,
    /// Frame span.
    pub range: FrameRange,
    /// Serialized as `-1`, `0` or `1`.
    pub position: Position,
    /// Fused to the current clip.
    pub joined: bool,
    /// Resolved style tokens.
    pub styles: Vec<String>,
}

#[cfg(test)]
#[path = "../../tests/unit/timeline/resolve.rs"]
mod tests;
