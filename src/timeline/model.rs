use std::{fs::File, io::BufReader, path::Path};

use crate::{
    foundation::core::{Fps, FrameIndex, FrameRange},
    foundation::error::{ClipLineError, ClipLineResult},
    timeline::clip::Clip,
    timeline::sequence::Sequence,
    timeline::track::{ClipTrack, Marker},
};

/// Serialized sequence document.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct SequenceDef {
    /// Total frames.
    pub duration: u64,
    pub fps: Fps,
    /// Authored cut points.
    #[serde(default)]
    pub storyboard: Vec<u64>,
    #[serde(default)]
    pub workarea_track: usize,
    pub tracks: Vec<TrackDef>,
}

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct TrackDef {
    /// Display name; not used by queries.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub clips: Vec<ClipDef>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub markers: Vec<MarkerDef>,
}

/// Annotated clip text over `[start, end)`.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ClipDef {
    pub text: String,
    pub start: u64,
    pub end: u64,
}

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct MarkerDef {
    pub start: u64,
    pub end: u64,
    #[serde(default, skip_serializing_if = "serde_json::Value::is_null")]
    pub data: serde_json::Value,
}

impl SequenceDef {
    pub fn validate(&self) -> ClipLineResult<()> {
        if self.fps.num == 0 || self.fps.den == 0 {
            return Err(ClipLineError::validation("fps must have num>0 and den>0"));
        }
        if self.duration == 0 {
            return Err(ClipLineError::validation("duration must be > 0 frames"));
        }
        if self.tracks.is_empty() {
            return Err(ClipLineError::validation(
                "sequence must have at least one track",
            ));
        }
        if self.workarea_track >= self.tracks.len() {
            return Err(ClipLineError::validation(format!(
                "workarea_track {} out of range ({} tracks)",
                self.workarea_track,
                self.tracks.len()
            )));
        }

        for (ti, track) in self.tracks.iter().enumerate() {
            for (ci, clip) in track.clips.iter().enumerate() {
                if clip.start > clip.end {
                    return Err(ClipLineError::validation(format!(
                        "track {ti} clip {ci} ('{}') has invalid range (start > end)",
                        clip.text
                    )));
                }
            }
            for (mi, marker) in track.markers.iter().enumerate() {
                if marker.start > marker.end {
                    return Err(ClipLineError::validation(format!(
                        "track {ti} marker {mi} has invalid range (start > end)"
                    )));
                }
            }
        }
        Ok(())
    }
}

impl Sequence {
    /// Parse and build a sequence from JSON.
    pub fn from_reader<R: std::io::Read>(r: R) -> ClipLineResult<Self> {
        let def: SequenceDef = serde_json::from_reader(r)
            .map_err(|e| ClipLineError::serde(format!("parse sequence JSON: {e}")))?;
        Self::from_def(def)
    }

    /// Parse and build a sequence from a JSON file on disk.
    pub fn from_path(path: impl AsRef<Path>) -> ClipLineResult<Self> {
        let path = path.as_ref();
        let f = File::open(path).map_err(|e| {
            ClipLineError::validation(format!("open sequence JSON '{}': {e}", path.display()))
        })?;
        let r = BufReader::new(f);
        Self::from_reader(r)
    }

    /// Validate `def` and build its tracks.
    pub fn from_def(def: SequenceDef) -> ClipLineResult<Self> {
        def.validate()?;
        let fps = Fps::new(def.fps.num, def.fps.den)?;

        let mut tracks = Vec::with_capacity(def.tracks.len());
        for (ti, track) in def.tracks.into_iter().enumerate() {
            let clips = track
                .clips
                .into_iter()
                .map(|c| Clip::new(c.text, FrameIndex(c.start), FrameIndex(c.end), ti))
                .collect::<ClipLineResult<Vec<_>>>()?;
            let markers = track
                .markers
                .into_iter()
                .map(|m| {
                    Ok(Marker {
                        range: FrameRange::new(FrameIndex(m.start), FrameIndex(m.end))?,
                        data: m.data,
                    })
                })
                .collect::<ClipLineResult<Vec<_>>>()?;
            tracks.push(ClipTrack::new(ti, clips, markers));
        }

        let storyboard = def.storyboard.into_iter().map(FrameIndex).collect();
        Sequence::new(def.duration, fps, storyboard, tracks, def.workarea_track)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/timeline/model.rs"]
mod tests;
