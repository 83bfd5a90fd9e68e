use super::*;
use crate::foundation::core::FrameIndex;
use crate::pens::styler::MonospaceStyler;
use crate::timeline::track::ClipTrack;

fn track(clips: &[(&str, u64, u64)]) -> ClipTrack {
    let clips = clips
        .iter()
        .map(|(t, s, e)| Clip::new(*t, FrameIndex(*s), FrameIndex(*e), 0).unwrap())
        .collect();
    ClipTrack::new(0, clips, Vec::new())
}

fn words() -> ClipTrack {
    track(&[
        ("Hel", 0, 5),
        ("+lo", 5, 9),
        ("big", 9, 15),
        ("≈next", 15, 20),
        ("µ:note", 20, 21),
        ("∫", 21, 22),
    ])
}

fn ctx(f: u64) -> FrameContext {
    FrameContext::new(FrameIndex(f), Rect::new(0.0, 0.0, 500.0, 500.0))
}

fn mono(
    _: &FrameContext,
    _: usize,
    _: &Clip,
    text: &str,
) -> anyhow::Result<(String, TextStyle)> {
    Ok((text.to_string(), TextStyle::new("mono", 10.0)))
}

fn line_meta(node: &PenNode) -> &LineMeta {
    match node {
        PenNode::Group(g) => g.line.as_ref().unwrap(),
        PenNode::Clip(_) => panic!("expected a line"),
    }
}

fn chars(pen: &ClipPen) -> String {
    pen.glyphs.iter().map(|g| g.ch).collect()
}

#[test]
fn tree_is_in_paint_order() {
    let t = words();
    let r = t.groups()[0].position(FrameIndex(6), &[]);
    let pens = r
        .pens(&ctx(6), &mut MonospaceStyler::default(), &PensOpts::default(), mono)
        .unwrap();

    assert_eq!(pens.group, Some(0));
    let line_indices: Vec<usize> = pens.lines.iter().map(|l| line_meta(l).line_index).collect();
    assert_eq!(line_indices, [1, 0]);

    let clips: Vec<String> = pens.clips().into_iter().map(chars).collect();
    assert_eq!(clips, ["txen", "gib ", "ol", "leH "]);

    let slugs = pens.slugs();
    assert_eq!(slugs.len(), 3);
    assert_eq!(slugs[2].children.len(), 2);
}

#[test]
fn lines_stack_top_down_with_leading() {
    let t = words();
    let r = t.groups()[0].position(FrameIndex(6), &[]);
    let pens = r
        .pens(&ctx(6), &mut MonospaceStyler::default(), &PensOpts::default(), mono)
        .unwrap();
    let frames: Vec<Rect> = pens.lines().map(|l| l.frame).collect();
    assert_eq!(frames[1], Rect::new(0.0, 0.0, 60.0, 12.0));
    assert_eq!(frames[0], Rect::new(0.0, 32.0, 24.0, 44.0));
    assert_eq!(pens.frame(), Some(Rect::new(0.0, 0.0, 60.0, 44.0)));
}

#[test]
fn line_meta_tracks_position_and_text() {
    let t = words();
    let r = t.groups()[0].position(FrameIndex(6), &[]);
    let pens = r
        .pens(&ctx(6), &mut MonospaceStyler::default(), &PensOpts::default(), mono)
        .unwrap();
    let first = line_meta(&pens.lines[1]);
    assert_eq!(first.position, Position::Current);
    assert_eq!(first.line_text, " Hello big");
    assert_eq!(line_meta(&pens.lines[0]).position, Position::Future);

    let r = t.groups()[0].position(FrameIndex(16), &[]);
    let pens = r
        .pens(&ctx(16), &mut MonospaceStyler::default(), &PensOpts::default(), mono)
        .unwrap();
    assert_eq!(line_meta(&pens.lines[1]).position, Position::Past);
}

#[test]
fn meta_and_blank_clips_never_reach_the_callback() {
    let t = words();
    let r = t.groups()[0].position(FrameIndex(0), &[]);
    let mut seen = Vec::new();
    let pens = r
        .pens(
            &ctx(0),
            &mut MonospaceStyler::default(),
            &PensOpts::default(),
            |f, line, clip, text| {
                seen.push(clip.text.clone());
                mono(f, line, clip, text)
            },
        )
        .unwrap();
    assert_eq!(seen, ["Hel", "lo", "big", "next"]);
    assert!(pens.clips().iter().all(|c| c.clip < 4));
}

#[test]
fn style_changes_start_new_runs_and_slugs() {
    let t = words();
    let r = t.groups()[0].position(FrameIndex(0), &[]);
    let pens = r
        .pens(
            &ctx(0),
            &mut MonospaceStyler::default(),
            &PensOpts::default(),
            |_, _, clip, text| {
                let size = if clip.text == "lo" { 20.0 } else { 10.0 };
                Ok((text.to_string(), TextStyle::new("mono", size)))
            },
        )
        .unwrap();
    // " Hel" at 6px, "lo" at 12px, " big" at 6px.
    let lo = pens.clips().into_iter().find(|c| c.clip == 1).unwrap();
    assert_eq!(lo.glyphs.last().unwrap().bounds.x0, 24.0);
    assert_eq!(pens.slugs().len(), 4);
    let big = pens.clips().into_iter().find(|c| c.clip == 2).unwrap();
    assert_eq!(big.glyphs.last().unwrap().bounds.x0, 48.0);
}

#[test]
fn fit_compresses_wide_lines() {
    let t = words();
    let r = t.groups()[0].position(FrameIndex(0), &[]);
    let opts = PensOpts {
        fit: Some(30.0),
        ..PensOpts::default()
    };
    let pens = r
        .pens(&ctx(0), &mut MonospaceStyler::default(), &opts, mono)
        .unwrap();
    let frames: Vec<Rect> = pens.lines().map(|l| l.frame).collect();
    assert_eq!(frames[1].width(), 30.0);
    assert_eq!(frames[0].width(), 24.0);
}

#[test]
fn rect_override_moves_origin() {
    let t = words();
    let r = t.groups()[0].position(FrameIndex(0), &[]);
    let opts = PensOpts {
        rect: Some(Rect::new(100.0, 50.0, 300.0, 300.0)),
        ..PensOpts::default()
    };
    let pens = r
        .pens(&ctx(0), &mut MonospaceStyler::default(), &opts, mono)
        .unwrap();
    let first = pens.lines().last().unwrap();
    assert_eq!(first.frame.origin(), kurbo::Point::new(100.0, 50.0));
}

#[test]
fn callback_errors_are_render_errors() {
    let t = words();
    let r = t.groups()[0].position(FrameIndex(0), &[]);
    let err = r
        .pens(
            &ctx(0),
            &mut MonospaceStyler::default(),
            &PensOpts::default(),
            |f, line, clip, text| {
                if clip.text == "big" {
                    anyhow::bail!("no style for big");
                }
                mono(f, line, clip, text)
            },
        )
        .unwrap_err();
    assert!(matches!(err, ClipLineError::Render(_)));
    assert!(err.to_string().contains("no style for big"));
}

struct Broken;

impl TextStyler for Broken {
    fn style_text(&mut self, _: &str, _: &TextStyle) -> ClipLineResult<StyledRun> {
        Ok(StyledRun {
            glyphs: Vec::new(),
            frame: Rect::ZERO,
        })
    }
}

#[test]
fn short_styler_output_is_a_layout_error() {
    let t = words();
    let r = t.groups()[0].position(FrameIndex(0), &[]);
    let err = r
        .pens(&ctx(0), &mut Broken, &PensOpts::default(), mono)
        .unwrap_err();
    assert!(matches!(err, ClipLineError::Layout(_)));
}

#[test]
fn blank_lines_keep_their_height() {
    let t = track(&[("a", 0, 5), ("§40", 5, 6), ("≈b", 6, 10)]);
    let r = t.groups()[0].position(FrameIndex(0), &[]);
    let pens = r
        .pens(&ctx(0), &mut MonospaceStyler::default(), &PensOpts::default(), mono)
        .unwrap();
    let frames: Vec<Rect> = pens.lines().map(|l| l.frame).collect();
    assert_eq!(frames.len(), 3);
    assert_eq!(frames[1].height(), 40.0);
    assert!(pens.lines().nth(1).unwrap().children.is_empty());
    assert_eq!(frames[0].y0, 92.0);
}

#[test]
fn remove_futures_hides_unsung_words() {
    let t = words();
    let r = t.groups()[0].position(FrameIndex(6), &[]);
    let mut pens = r
        .pens(&ctx(6), &mut MonospaceStyler::default(), &PensOpts::default(), mono)
        .unwrap();
    pens.remove_futures(true);
    assert_eq!(pens.lines().count(), 1);
    let clips: Vec<usize> = pens.clips().iter().map(|c| c.clip).collect();
    assert_eq!(clips, [1, 0]);
}

#[test]
fn graf_break_renders_its_mark() {
    let t = track(&[("one", 0, 5), ("¶two", 5, 10)]);
    let r = t.groups()[0].position(FrameIndex(0), &[]);
    let pens = r
        .pens(&ctx(0), &mut MonospaceStyler::default(), &PensOpts::default(), mono)
        .unwrap();
    assert_eq!(pens.lines().count(), 3);
    let mark = &pens.lines().nth(1).unwrap().line.as_ref().unwrap().line_text;
    assert_eq!(mark, "¶");
}

#[test]
fn parley_styled_pens_slice_glyphs_per_clip() {
    let bytes = std::fs::read(concat!(
        env!("CARGO_MANIFEST_DIR"),
        "/tests/data/fonts/DejaVuSans.ttf"
    ))
    .unwrap();
    let mut styler = crate::pens::styler::ParleyStyler::new();
    styler.register_font("sans", &bytes).unwrap();

    let t = words();
    let r = t.groups()[0].position(FrameIndex(6), &[]);
    let pens = r
        .pens(&ctx(6), &mut styler, &PensOpts::default(), |_, _, _, text| {
            Ok((text.to_string(), TextStyle::new("sans", 24.0)))
        })
        .unwrap();

    let clips: Vec<String> = pens.clips().into_iter().map(chars).collect();
    assert_eq!(clips, ["txen", "gib ", "ol", "leH "]);
    let slugs = pens.slugs();
    assert_eq!(slugs.len(), 3);
    assert_eq!(slugs[2].children.len(), 2);

    // Reading order: "Hel" sits left of "lo", which sits left of " big".
    let x0 = |i: usize| pens.clips()[i].frame().unwrap().x0;
    assert!(x0(3) < x0(2));
    assert!(x0(2) < x0(1));
    let first = pens.lines().nth(1).unwrap();
    assert!(first.frame.width() > 0.0);
    assert!(first.frame.y0 < pens.lines().next().unwrap().frame.y0);
}
