use rayon::prelude::*;

use crate::{
    foundation::core::{Fps, FrameIndex, FrameRange},
    foundation::error::{ClipLineError, ClipLineResult},
    timeline::group::ClipGroup,
    timeline::resolve::{GroupSnapshot, ResolvedGroup},
    timeline::track::ClipTrack,
};

/// Threading options for [`Sequence::frame_snapshots`].
#[derive(Clone, Debug, Default)]
pub struct QueryThreading {
    /// Resolve frames on a dedicated rayon pool.
    pub parallel: bool,
    /// Override the number of rayon worker threads. `None` uses rayon defaults.
    pub threads: Option<usize>,
}

/// Multi-track timeline with frame-indexed queries.
///
/// Tracks are immutable once the sequence is built; every query returns a fresh
/// [`ResolvedGroup`] borrowing the sequence. The only mutable state is the current time
/// indicator (`cti`) consulted by [`Sequence::find_workarea`].
#[derive(Clone, Debug)]
pub struct Sequence {
    duration: u64,
    fps: Fps,
    storyboard: Vec<FrameIndex>,
    tracks: Vec<ClipTrack>,
    workarea_track: usize,
    cti: FrameIndex,
}

impl Sequence {
    /// Build a sequence. Track `i` must have been created with index `i`.
    pub fn new(
        duration: u64,
        fps: Fps,
        storyboard: Vec<FrameIndex>,
        tracks: Vec<ClipTrack>,
        workarea_track: usize,
    ) -> ClipLineResult<Self> {
        if duration == 0 {
            return Err(ClipLineError::validation("duration must be > 0 frames"));
        }
        if tracks.is_empty() {
            return Err(ClipLineError::validation(
                "sequence must have at least one track",
            ));
        }
        if workarea_track >= tracks.len() {
            return Err(ClipLineError::validation(format!(
                "workarea track {workarea_track} out of range ({} tracks)",
                tracks.len()
            )));
        }
        for (i, track) in tracks.iter().enumerate() {
            if track.index() != i {
                return Err(ClipLineError::validation(format!(
                    "track at position {i} was built with index {}",
                    track.index()
                )));
            }
        }
        Ok(Self {
            duration,
            fps,
            storyboard,
            tracks,
            workarea_track,
            cti: FrameIndex(0),
        })
    }

    /// Total length in frames.
    pub fn duration(&self) -> u64 {
        self.duration
    }

    pub fn fps(&self) -> Fps {
        self.fps
    }

    /// Authored cut points.
    pub fn storyboard(&self) -> &[FrameIndex] {
        &self.storyboard
    }

    pub fn tracks(&self) -> &[ClipTrack] {
        &self.tracks
    }

    /// Track `idx`, or a `Query` error.
    pub fn track(&self, idx: usize) -> ClipLineResult<&ClipTrack> {
        self.tracks.get(idx).ok_or_else(|| {
            ClipLineError::query(format!(
                "track index {idx} out of range ({} tracks)",
                self.tracks.len()
            ))
        })
    }

    /// Index of the track driving [`Sequence::find_workarea`], jumps and text lookups.
    pub fn workarea_track(&self) -> usize {
        self.workarea_track
    }

    // Checked in `new`.
    fn workarea(&self) -> &ClipTrack {
        &self.tracks[self.workarea_track]
    }

    /// Timestamp of `frame` in seconds.
    pub fn secs_at(&self, frame: FrameIndex) -> f64 {
        self.fps.frames_to_secs(frame.0)
    }

    /// Frame shown at `secs`, floored and clamped to the sequence.
    pub fn frame_at_secs(&self, secs: f64) -> FrameIndex {
        FrameIndex(self.fps.secs_to_frames_floor(secs).min(self.duration - 1))
    }

    /// Current time indicator.
    pub fn cti(&self) -> FrameIndex {
        self.cti
    }

    pub fn set_cti(&mut self, frame: FrameIndex) {
        self.cti = frame;
    }

    /// Resolve the group of `track_idx` active at `frame`.
    ///
    /// With `check_end` the group must satisfy `start <= frame < end`. Without it the group
    /// only has to start at or before `frame` while the next group (if any) starts after it,
    /// so a group stays selected through the gap that follows it.
    #[tracing::instrument(level = "trace", skip(self))]
    pub fn track_clip_group_for_frame(
        &self,
        track_idx: usize,
        frame: FrameIndex,
        styles: &[usize],
        check_end: bool,
    ) -> ClipLineResult<Option<ResolvedGroup<'_>>> {
        let track = self.track(track_idx)?;
        let style_tracks = self.style_tracks(styles)?;
        Ok(locate_group(track, frame, check_end).map(|g| g.position(frame, &style_tracks)))
    }

    /// Strict [`Sequence::track_clip_group_for_frame`] that falls back to the track's
    /// sentinel group when nothing matches.
    pub fn clip_group(
        &self,
        track_idx: usize,
        frame: FrameIndex,
        styles: &[usize],
    ) -> ClipLineResult<ResolvedGroup<'_>> {
        let track = self.track(track_idx)?;
        let style_tracks = self.style_tracks(styles)?;
        let group = locate_group(track, frame, true).unwrap_or(track.empty_group());
        Ok(group.position(frame, &style_tracks))
    }

    /// Frame span of the workarea group containing the cti.
    pub fn find_workarea(&self) -> Option<FrameRange> {
        locate_group(self.workarea(), self.cti, true).map(ClipGroup::range)
    }

    /// `[0] + storyboard + [duration - 1]`.
    pub fn base_jumps(&self) -> Vec<FrameIndex> {
        let mut jumps = Vec::with_capacity(self.storyboard.len() + 2);
        jumps.push(FrameIndex(0));
        jumps.extend(self.storyboard.iter().copied());
        jumps.push(FrameIndex(self.duration - 1));
        jumps
    }

    /// Base cut points with every workarea clip start inserted before the final one.
    pub fn jumps(&self) -> Vec<FrameIndex> {
        let mut jumps = self.base_jumps();
        let last = jumps.pop().unwrap_or_default();
        jumps.extend(self.workarea().clips().iter().map(|c| c.start()));
        jumps.push(last);
        jumps
    }

    /// Authored text of the workarea syllable that starts exactly at `frame`.
    pub fn text_for_frame(&self, frame: FrameIndex) -> Option<&str> {
        let group = locate_group(self.workarea(), frame, true)?;
        let syllable = group.position(frame, &[]).current_syllable()?;
        (syllable.start() == frame).then_some(syllable.input_text.as_str())
    }

    /// Snapshot every frame of `range` on `track_idx`.
    ///
    /// Frames without a group produce snapshots with no group and no clips.
    pub fn frame_snapshots(
        &self,
        track_idx: usize,
        range: FrameRange,
        styles: &[usize],
        threading: &QueryThreading,
    ) -> ClipLineResult<Vec<GroupSnapshot>> {
        self.track(track_idx)?;
        self.style_tracks(styles)?;
        let frames: Vec<FrameIndex> = range.frames().collect();
        let snapshot = |f: &FrameIndex| -> ClipLineResult<GroupSnapshot> {
            Ok(self.clip_group(track_idx, *f, styles)?.snapshot())
        };

        if !threading.parallel {
            return frames.iter().map(snapshot).collect();
        }

        let pool = build_thread_pool(threading.threads)?;
        tracing::debug!(
            frames = frames.len(),
            threads = pool.current_num_threads(),
            "resolving frames in parallel"
        );
        pool.install(|| frames.par_iter().map(snapshot).collect())
    }

    fn style_tracks(&self, styles: &[usize]) -> ClipLineResult<Vec<&ClipTrack>> {
        styles
            .iter()
            .map(|&idx| {
                self.tracks.get(idx).ok_or_else(|| {
                    ClipLineError::query(format!("style track index {idx} out of range"))
                })
            })
            .collect()
    }
}

fn locate_group(track: &ClipTrack, frame: FrameIndex, check_end: bool) -> Option<&ClipGroup> {
    let groups = track.groups();
    groups.iter().enumerate().find_map(|(i, g)| {
        if g.start() > frame {
            return None;
        }
        let end_good = if check_end {
            g.end() > frame
        } else {
            groups.get(i + 1).is_none_or(|next| next.start() > frame)
        };
        end_good.then_some(g)
    })
}

fn build_thread_pool(threads: Option<usize>) -> ClipLineResult<rayon::ThreadPool> {
    if let Some(n) = threads
        && n == 0
    {
        return Err(ClipLineError::validation(
            "query threading 'threads' must be >= 1 when set",
        ));
    }

    let mut builder = rayon::ThreadPoolBuilder::new();
    if let Some(n) = threads {
        builder = builder.num_threads(n);
    }
    builder
        .build()
        .map_err(|e| ClipLineError::query(format!("failed to build rayon thread pool: {e}")))
}

#[cfg(test)]
#[path = "../../tests/unit/timeline/sequence.rs"]
mod tests;
