use std::borrow::Cow;
use std::ops::RangeInclusive;

use crate::{
    foundation::core::{FrameIndex, FrameRange},
    timeline::clip::{Clip, ClipType, sigil},
    timeline::inline_data::DataValue,
};

/// A maximal run of clips between clear-screen boundaries.
///
/// Groups are built by [`crate::ClipTrack`] and never change afterwards. Per-frame state lives
/// in the [`crate::ResolvedGroup`] returned by [`ClipGroup::position`].
#[derive(Clone, Debug, PartialEq)]
pub struct ClipGroup {
    index: Option<usize>,
    track: usize,
    clips: Vec<Clip>,
    range: FrameRange,
}

impl ClipGroup {
    /// Build group `index` of `track`, assigning each clip its group-local index.
    pub fn new(track: usize, index: usize, mut clips: Vec<Clip>) -> Self {
        for (idx, clip) in clips.iter_mut().enumerate() {
            clip.idx = Some(idx);
            clip.group = Some(index);
        }
        let range = match (clips.first(), clips.last()) {
            (Some(first), Some(last)) => FrameRange {
                start: first.start(),
                end: last.end().max(first.start()),
            },
            _ => FrameRange {
                start: FrameIndex(0),
                end: FrameIndex(0),
            },
        };
        Self {
            index: Some(index),
            track,
            clips,
            range,
        }
    }

    /// The invalid sentinel group returned when no group matches a query.
    pub fn empty(track: usize) -> Self {
        Self {
            index: None,
            track,
            clips: Vec::new(),
            range: FrameRange {
                start: FrameIndex(0),
                end: FrameIndex(0),
            },
        }
    }

    /// Position of this group in its track, `None` for the sentinel group.
    pub fn index(&self) -> Option<usize> {
        self.index
    }

    /// Owning track index.
    pub fn track(&self) -> usize {
        self.track
    }

    /// `false` for a group without clips.
    pub fn is_valid(&self) -> bool {
        !self.clips.is_empty()
    }

    /// Clips in order; `clips()[i].idx() == Some(i)`.
    pub fn clips(&self) -> &[Clip] {
        &self.clips
    }

    /// Clip at group-local index `idx`.
    pub fn clip(&self, idx: usize) -> Option<&Clip> {
        self.clips.get(idx)
    }

    /// Number of clips.
    pub fn len(&self) -> usize {
        self.clips.len()
    }

    /// `true` when the group has no clips.
    pub fn is_empty(&self) -> bool {
        self.clips.is_empty()
    }

    /// First clip's start.
    pub fn start(&self) -> FrameIndex {
        self.range.start
    }

    /// Last clip's end.
    pub fn end(&self) -> FrameIndex {
        self.range.end
    }

    /// `[start, end)` of the whole group.
    pub fn range(&self) -> FrameRange {
        self.range
    }

    /// Inline data `field` of the last clip.
    pub fn ldata(&self, field: &str) -> Option<&DataValue> {
        self.clips.last()?.inline_data.get(field)
    }

    /// Inline data `field` of the last clip, or `default`.
    pub fn ldata_or(&self, field: &str, default: DataValue) -> DataValue {
        self.ldata(field).cloned().unwrap_or(default)
    }

    /// Start frame of the join run containing clip `idx`.
    pub fn join_start(&self, idx: usize) -> Option<FrameIndex> {
        Some(self.clips.get(idx)?.join_start(&self.clips))
    }

    /// End frame of the join run containing clip `idx`.
    pub fn join_end(&self, idx: usize) -> Option<FrameIndex> {
        Some(self.clips.get(idx)?.join_end(&self.clips))
    }

    /// Group-local indices of the join run containing clip `idx`.
    ///
    /// Follows `join_prev` back and `join_next` forward; links are intra-group so the walk is
    /// bounded by the group length.
    pub fn join_run(&self, idx: usize) -> RangeInclusive<usize> {
        let mut first = idx;
        let mut steps = 0;
        while let Some(prev) = self.clips.get(first).and_then(|c| c.join_prev) {
            if prev >= first || steps > self.clips.len() {
                break;
            }
            first = prev;
            steps += 1;
        }
        let mut last = idx;
        while let Some(next) = self.clips.get(last).and_then(|c| c.join_next) {
            if next <= last || next >= self.clips.len() {
                break;
            }
            last = next;
        }
        first..=last
    }

    /// Neighbour `offset` positions away from clip `idx`.
    ///
    /// Without `wrap` anything out of range is `None`. With `wrap`, stepping past the end wraps
    /// to the first clip but stepping before the start still yields `None`.
    pub fn sibling(&self, idx: usize, offset: isize, wrap: bool) -> Option<&Clip> {
        let Some(target) = idx.checked_add_signed(offset) else {
            return if wrap && offset > 0 { self.clips.first() } else { None };
        };
        if target >= self.clips.len() {
            return if wrap { self.clips.first() } else { None };
        }
        self.clips.get(target)
    }

    /// Split the group into visual lines.
    ///
    /// NewLine clips open a new line, or with `ignore_newlines` join the current one with a
    /// leading space. A GrafBreak closes the line, emits a one-clip line holding a paragraph
    /// mark copy of itself, and opens the next line.
    pub fn lines(&self, ignore_newlines: bool) -> Vec<Vec<Cow<'_, Clip>>> {
        let mut lines = Vec::new();
        let mut line: Vec<Cow<'_, Clip>> = Vec::new();
        for clip in &self.clips {
            match clip.clip_type {
                ClipType::NewLine if ignore_newlines => {
                    if clip.text.starts_with(' ') {
                        line.push(Cow::Borrowed(clip));
                    } else {
                        let mut spaced = clip.clone();
                        spaced.text.insert(0, ' ');
                        line.push(Cow::Owned(spaced));
                    }
                }
                ClipType::NewLine => {
                    flush_line(&mut lines, &mut line);
                    line.push(Cow::Borrowed(clip));
                }
                ClipType::GrafBreak => {
                    flush_line(&mut lines, &mut line);
                    let mut mark = clip.clone();
                    mark.text = sigil::GRAF_MARK.to_string();
                    lines.push(vec![Cow::Owned(mark)]);
                    line.push(Cow::Borrowed(clip));
                }
                _ => line.push(Cow::Borrowed(clip)),
            }
        }
        flush_line(&mut lines, &mut line);
        lines
    }

    /// Compact debug rendering of the group's text and structure.
    pub fn text(&self) -> String {
        let mut out = String::new();
        for c in &self.clips {
            match c.clip_type {
                ClipType::Isolated => out.push_str("( )"),
                ClipType::JoinPrev => out.push('|'),
                ClipType::NewLine => out.push_str("/(\\n)/"),
                _ => {}
            }
            out.push_str(&c.text);
        }
        out
    }
}

// Empty lines (a break at the very start of a group) are not emitted.
fn flush_line<'a>(lines: &mut Vec<Vec<Cow<'a, Clip>>>, line: &mut Vec<Cow<'a, Clip>>) {
    if !line.is_empty() {
        lines.push(std::mem::take(line));
    }
}

impl std::fmt::Display for ClipGroup {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "<ClipGroup {}-{} \"{}\">",
            self.start(),
            self.end(),
            self.text()
        )
    }
}

#[cfg(test)]
#[path = "../../tests/unit/timeline/group.rs"]
mod tests;
