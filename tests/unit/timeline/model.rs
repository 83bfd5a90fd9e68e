use super::*;

const DOC: &str = r#"{
  "duration": 60,
  "fps": { "num": 30, "den": 1 },
  "storyboard": [24],
  "tracks": [
    {
      "name": "lyrics",
      "clips": [
        { "text": "*", "start": 0, "end": 0 },
        { "text": "Hello", "start": 0, "end": 10 },
        { "text": "+world", "start": 10, "end": 20 }
      ],
      "markers": [{ "start": 0, "end": 30, "data": { "verse": 1 } }]
    },
    {
      "clips": [{ "text": "bold", "start": 0, "end": 60 }]
    }
  ]
}"#;

#[test]
fn from_reader_builds_tracks() {
    let s = Sequence::from_reader(DOC.as_bytes()).unwrap();
    assert_eq!(s.duration(), 60);
    assert_eq!(s.fps(), Fps::new(30, 1).unwrap());
    assert_eq!(s.storyboard(), [FrameIndex(24)]);
    assert_eq!(s.workarea_track(), 0);
    assert_eq!(s.tracks().len(), 2);
    let lyrics = s.track(0).unwrap();
    assert_eq!(lyrics.groups().len(), 1);
    assert_eq!(lyrics.markers()[0].data["verse"], 1);
    assert_eq!(s.track(1).unwrap().clips()[0].track, 1);
}

#[test]
fn def_round_trips_optional_fields() {
    let def: SequenceDef = serde_json::from_str(DOC).unwrap();
    assert_eq!(def.tracks[0].name.as_deref(), Some("lyrics"));
    assert!(def.tracks[1].markers.is_empty());
    let v = serde_json::to_value(&def).unwrap();
    assert!(v["tracks"][1].get("markers").is_none());
    assert!(v["tracks"][1].get("name").is_none());
}

#[test]
fn malformed_json_is_a_serde_error() {
    let err = Sequence::from_reader("{ \"duration\": ".as_bytes()).unwrap_err();
    assert!(matches!(err, ClipLineError::Serde(_)));
}

#[test]
fn validation_rejects_bad_documents() {
    let base: SequenceDef = serde_json::from_str(DOC).unwrap();

    let mut def = base.clone();
    def.fps.den = 0;
    assert!(def.validate().is_err());

    let mut def = base.clone();
    def.duration = 0;
    assert!(def.validate().is_err());

    let mut def = base.clone();
    def.tracks.clear();
    assert!(def.validate().is_err());

    let mut def = base.clone();
    def.workarea_track = 2;
    assert!(def.validate().is_err());

    let mut def = base.clone();
    def.tracks[0].clips[1].start = 11;
    let err = Sequence::from_def(def).unwrap_err();
    assert!(err.to_string().contains("'Hello'"));

    let mut def = base;
    def.tracks[0].markers[0].end = 0;
    def.tracks[0].markers[0].start = 5;
    assert!(matches!(
        Sequence::from_def(def),
        Err(ClipLineError::Validation(_))
    ));
}

#[test]
fn missing_file_is_reported_with_path() {
    let err = Sequence::from_path("/definitely/not/here.json").unwrap_err();
    assert!(err.to_string().contains("/definitely/not/here.json"));
}
