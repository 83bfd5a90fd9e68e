use super::*;
use crate::timeline::clip::Clip;

fn track(index: usize, clips: &[(&str, u64, u64)]) -> ClipTrack {
    let clips = clips
        .iter()
        .map(|(t, s, e)| Clip::new(*t, FrameIndex(*s), FrameIndex(*e), index).unwrap())
        .collect();
    ClipTrack::new(index, clips, Vec::new())
}

fn sequence() -> Sequence {
    let words = track(
        0,
        &[
            ("*", 0, 0),
            ("Hello", 0, 10),
            ("+world", 10, 20),
            ("*", 20, 20),
            ("again", 25, 30),
        ],
    );
    let styles = track(1, &[("bold", 0, 40)]);
    Sequence::new(
        40,
        Fps::new(30, 1).unwrap(),
        vec![FrameIndex(12)],
        vec![words, styles],
        0,
    )
    .unwrap()
}

fn range(start: u64, end: u64) -> FrameRange {
    FrameRange::new(FrameIndex(start), FrameIndex(end)).unwrap()
}

#[test]
fn new_rejects_bad_shapes() {
    let fps = Fps::new(24, 1).unwrap();
    assert!(Sequence::new(0, fps, vec![], vec![track(0, &[])], 0).is_err());
    assert!(Sequence::new(10, fps, vec![], vec![], 0).is_err());
    assert!(Sequence::new(10, fps, vec![], vec![track(0, &[])], 1).is_err());
    assert!(Sequence::new(10, fps, vec![], vec![track(1, &[])], 0).is_err());
}

#[test]
fn strict_lookup_requires_frame_inside_group() {
    let s = sequence();
    let g = s
        .track_clip_group_for_frame(0, FrameIndex(15), &[], true)
        .unwrap()
        .unwrap();
    assert_eq!(g.group().index(), Some(0));
    assert!(
        s.track_clip_group_for_frame(0, FrameIndex(22), &[], true)
            .unwrap()
            .is_none()
    );
    assert!(
        s.track_clip_group_for_frame(0, FrameIndex(35), &[], true)
            .unwrap()
            .is_none()
    );
}

#[test]
fn open_ended_lookup_holds_group_until_next_starts() {
    let s = sequence();
    let at = |f: u64| {
        s.track_clip_group_for_frame(0, FrameIndex(f), &[], false)
            .unwrap()
            .and_then(|g| g.group().index())
    };
    assert_eq!(at(22), Some(0));
    assert_eq!(at(25), Some(1));
    assert_eq!(at(35), Some(1));
}

#[test]
fn clip_group_falls_back_to_sentinel() {
    let s = sequence();
    let g = s.clip_group(0, FrameIndex(22), &[]).unwrap();
    assert!(!g.is_valid());
    assert_eq!(g.group().index(), None);
    assert!(g.states().is_empty());
}

#[test]
fn style_indices_resolve_to_tracks() {
    let s = sequence();
    let g = s.clip_group(0, FrameIndex(5), &[1]).unwrap();
    assert_eq!(g.state(0).unwrap().styles, ["bold"]);
    assert_eq!(g.style_tracks().len(), 1);
}

#[test]
fn unknown_indices_are_query_errors() {
    let s = sequence();
    assert!(matches!(
        s.clip_group(7, FrameIndex(0), &[]),
        Err(ClipLineError::Query(_))
    ));
    assert!(matches!(
        s.clip_group(0, FrameIndex(0), &[9]),
        Err(ClipLineError::Query(_))
    ));
    assert!(matches!(s.track(2), Err(ClipLineError::Query(_))));
}

#[test]
fn find_workarea_follows_cti() {
    let mut s = sequence();
    assert_eq!(s.find_workarea(), Some(range(0, 20)));
    s.set_cti(FrameIndex(22));
    assert_eq!(s.cti(), FrameIndex(22));
    assert_eq!(s.find_workarea(), None);
    s.set_cti(FrameIndex(26));
    assert_eq!(s.find_workarea(), Some(range(25, 30)));
}

#[test]
fn jumps_insert_clip_starts_before_last() {
    let s = sequence();
    assert_eq!(
        s.base_jumps(),
        [FrameIndex(0), FrameIndex(12), FrameIndex(39)]
    );
    let got: Vec<u64> = s.jumps().into_iter().map(|f| f.0).collect();
    assert_eq!(got, [0, 12, 0, 0, 10, 20, 25, 39]);
    assert_eq!(s.jumps(), s.jumps());
}

#[test]
fn seconds_map_to_frames_and_back() {
    let s = sequence();
    assert_eq!(s.secs_at(FrameIndex(15)), 0.5);
    assert_eq!(s.frame_at_secs(0.5), FrameIndex(15));
    assert_eq!(s.frame_at_secs(0.499), FrameIndex(14));
    assert_eq!(s.frame_at_secs(-3.0), FrameIndex(0));
    assert_eq!(s.frame_at_secs(60.0), FrameIndex(39));
    assert_eq!(s.frame_at_secs(s.secs_at(FrameIndex(27))), FrameIndex(27));
}

#[test]
fn text_for_frame_only_at_syllable_start() {
    let s = sequence();
    assert_eq!(s.text_for_frame(FrameIndex(0)), Some("Hello"));
    assert_eq!(s.text_for_frame(FrameIndex(10)), Some("+world"));
    assert_eq!(s.text_for_frame(FrameIndex(11)), None);
    assert_eq!(s.text_for_frame(FrameIndex(22)), None);
}

#[test]
fn parallel_snapshots_match_serial() {
    let s = sequence();
    let serial = s
        .frame_snapshots(0, range(0, 40), &[1], &QueryThreading::default())
        .unwrap();
    let parallel = s
        .frame_snapshots(
            0,
            range(0, 40),
            &[1],
            &QueryThreading {
                parallel: true,
                threads: Some(2),
            },
        )
        .unwrap();
    assert_eq!(serial.len(), 40);
    assert_eq!(serial, parallel);
    assert_eq!(serial[22].group, None);
    assert_eq!(serial[26].group, Some(1));
}

#[test]
fn zero_threads_is_rejected() {
    let s = sequence();
    let threading = QueryThreading {
        parallel: true,
        threads: Some(0),
    };
    assert!(matches!(
        s.frame_snapshots(0, range(0, 4), &[], &threading),
        Err(ClipLineError::Validation(_))
    ));
}

#[test]
fn sequence_is_sync() {
    fn assert_sync<T: Sync + Send>() {}
    assert_sync::<Sequence>();
}
