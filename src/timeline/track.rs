use crate::{
    foundation::core::{FrameIndex, FrameRange},
    timeline::clip::{Clip, ClipType, JoinDirection},
    timeline::group::ClipGroup,
};

/// Named time range on a track. The payload is opaque to clipline.
#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub struct Marker {
    /// Marked frames.
    pub range: FrameRange,
    /// Arbitrary authoring data.
    pub data: serde_json::Value,
}

/// Ordered clips for one timeline lane, partitioned into [`ClipGroup`]s.
#[derive(Clone, Debug)]
pub struct ClipTrack {
    index: usize,
    clips: Vec<Clip>,
    groups: Vec<ClipGroup>,
    markers: Vec<Marker>,
    empty_group: ClipGroup,
}

impl ClipTrack {
    /// Build track `index` from clips in timeline order.
    pub fn new(index: usize, clips: Vec<Clip>, markers: Vec<Marker>) -> Self {
        let mut clips = clips;
        for clip in &mut clips {
            clip.track = index;
        }
        let groups = grouped_clips(index, &mut clips);
        tracing::trace!(
            track = index,
            clips = clips.len(),
            groups = groups.len(),
            "partitioned track"
        );
        Self {
            index,
            clips,
            groups,
            markers,
            empty_group: ClipGroup::empty(index),
        }
    }

    /// Position of this track in its sequence.
    pub fn index(&self) -> usize {
        self.index
    }

    /// Every clip, clear-screen markers included.
    pub fn clips(&self) -> &[Clip] {
        &self.clips
    }

    /// Groups in timeline order.
    pub fn groups(&self) -> &[ClipGroup] {
        &self.groups
    }

    /// Track markers.
    pub fn markers(&self) -> &[Marker] {
        &self.markers
    }

    /// Sentinel group used when a query matches nothing.
    pub fn empty_group(&self) -> &ClipGroup {
        &self.empty_group
    }

    /// First clip whose `[start, end)` contains `frame`.
    pub fn current(&self, frame: FrameIndex) -> Option<&Clip> {
        self.clips.iter().find(|c| c.range.contains(frame))
    }

    /// Latest clip end on this track.
    pub fn duration(&self) -> FrameIndex {
        self.clips
            .iter()
            .map(Clip::end)
            .max()
            .unwrap_or_default()
    }
}

impl std::fmt::Display for ClipTrack {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let head: Vec<String> = self
            .clips
            .iter()
            .take(3)
            .map(|c| c.ftext().into_owned())
            .collect();
        write!(f, "<ClipTrack {}>", head.join("/"))
    }
}

// Splits at ClearScreen clips, which belong to no group. A JoinPrev clip links to the clip
// right before it in track order; after a ClearScreen there is none. Group membership and
// links are written back onto `clips` so track and group views agree.
fn grouped_clips(track: usize, clips: &mut [Clip]) -> Vec<ClipGroup> {
    let mut groups = Vec::new();
    let mut acc: Vec<Clip> = Vec::new();
    let mut acc_src: Vec<usize> = Vec::new();
    let mut members: Vec<Vec<usize>> = Vec::new();

    for (pos, clip) in clips.iter().enumerate() {
        if clip.clip_type == ClipType::ClearScreen {
            if !acc.is_empty() {
                groups.push(ClipGroup::new(track, groups.len(), std::mem::take(&mut acc)));
                members.push(std::mem::take(&mut acc_src));
            }
            continue;
        }

        let mut clip = clip.clone();
        if clip.clip_type == ClipType::JoinPrev {
            let next_idx = acc.len();
            if let Some(prev) = acc.last_mut() {
                prev.add_join(JoinDirection::Next, next_idx);
                clip.add_join(JoinDirection::Prev, next_idx - 1);
            }
        }
        acc.push(clip);
        acc_src.push(pos);
    }
    if !acc.is_empty() {
        groups.push(ClipGroup::new(track, groups.len(), acc));
        members.push(acc_src);
    }

    for (group, src) in groups.iter().zip(&members) {
        for (grouped, &pos) in group.clips().iter().zip(src) {
            let clip = &mut clips[pos];
            clip.idx = grouped.idx;
            clip.group = grouped.group;
            clip.join_prev = grouped.join_prev;
            clip.join_next = grouped.join_next;
        }
    }
    groups
}

#[cfg(test)]
#[path = "../../tests/unit/timeline/track.rs"]
mod tests;
