use super::*;

fn track(clips: &[(&str, u64, u64)]) -> ClipTrack {
    let clips = clips
        .iter()
        .map(|(t, s, e)| Clip::new(*t, FrameIndex(*s), FrameIndex(*e), 9).unwrap())
        .collect();
    ClipTrack::new(2, clips, Vec::new())
}

#[test]
fn new_assigns_track_index() {
    let t = track(&[("a", 0, 5)]);
    assert_eq!(t.index(), 2);
    assert!(t.clips().iter().all(|c| c.track == 2));
    assert!(t.groups().iter().all(|g| g.track() == 2));
    assert_eq!(t.empty_group().track(), 2);
}

#[test]
fn groups_partition_non_clear_clips() {
    let t = track(&[
        ("*", 0, 0),
        ("a", 0, 5),
        ("+b", 5, 10),
        ("*", 10, 10),
        ("c", 10, 15),
        ("*", 15, 15),
        ("*", 15, 15),
        ("d", 15, 20),
    ]);
    assert_eq!(t.groups().len(), 3);
    let grouped: usize = t.groups().iter().map(ClipGroup::len).sum();
    let non_clear = t
        .clips()
        .iter()
        .filter(|c| c.clip_type != ClipType::ClearScreen)
        .count();
    assert_eq!(grouped, non_clear);
    for (i, g) in t.groups().iter().enumerate() {
        assert_eq!(g.index(), Some(i));
        assert!(g.clips().iter().all(|c| c.clip_type != ClipType::ClearScreen));
    }
}

#[test]
fn join_prev_after_clear_screen_has_no_link() {
    let t = track(&[("a", 0, 5), ("*", 5, 5), ("+b", 5, 10)]);
    let b = &t.groups()[1].clips()[0];
    assert_eq!(b.clip_type, ClipType::JoinPrev);
    assert_eq!(b.join_prev(), None);
    assert_eq!(t.groups()[0].clips()[0].join_next(), None);
}

#[test]
fn group_links_are_mirrored_on_track_clips() {
    let t = track(&[("*", 0, 0), ("Hel", 0, 5), ("+lo", 5, 9)]);
    let lo = &t.clips()[2];
    assert_eq!(lo.idx(), Some(1));
    assert_eq!(lo.group(), Some(0));
    assert_eq!(lo.join_prev(), Some(0));
    assert_eq!(t.clips()[1].join_next(), Some(1));
    assert_eq!(t.clips()[0].group(), None);
}

#[test]
fn current_returns_the_first_containing_clip() {
    let t = track(&[("a", 0, 5), ("b", 5, 10), ("c", 12, 20)]);
    assert_eq!(t.current(FrameIndex(0)).map(|c| c.text.as_str()), Some("a"));
    assert_eq!(t.current(FrameIndex(5)).map(|c| c.text.as_str()), Some("b"));
    assert!(t.current(FrameIndex(10)).is_none());
    assert!(t.current(FrameIndex(20)).is_none());
    assert_eq!(t.duration(), FrameIndex(20));
}

#[test]
fn clear_screen_clips_stay_queryable() {
    let t = track(&[("a", 0, 5), ("*", 5, 8), ("b", 8, 10)]);
    let c = t.current(FrameIndex(6)).unwrap();
    assert_eq!(c.clip_type, ClipType::ClearScreen);
}

#[test]
fn empty_track_has_no_groups() {
    let t = track(&[]);
    assert!(t.groups().is_empty());
    assert_eq!(t.duration(), FrameIndex(0));
    assert!(!t.empty_group().is_valid());
}

#[test]
fn display_lists_leading_clips() {
    let t = track(&[("a", 0, 5), ("+b", 5, 10), ("c", 10, 15), ("d", 15, 20)]);
    assert_eq!(t.to_string(), "<ClipTrack  a/b/ c>");
}
