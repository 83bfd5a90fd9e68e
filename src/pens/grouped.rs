use crate::{
    foundation::core::{FrameContext, Rect},
    foundation::error::{ClipLineError, ClipLineResult},
    pens::style::{GlyphBox, PensOpts, StyledRun, TextStyle},
    pens::styler::TextStyler,
    pens::tree::{ClipGroupPens, ClipPen, LineMeta, PenGroup, PenNode, PenTag, union},
    timeline::clip::{Clip, ClipType},
    timeline::resolve::{Position, ResolvedGroup},
};

struct RenderedClip<'c> {
    clip: &'c Clip,
    text: String,
    style: TextStyle,
}

impl ResolvedGroup<'_> {
    /// Lay the group out as a tree of glyph boxes.
    ///
    /// `render_clip` receives the frame, the line index, the clip and its `ftext`, and returns
    /// the text to set plus its style. Meta and blank clips are never passed to it. A callback
    /// error aborts the whole layout with [`ClipLineError::Render`].
    ///
    /// Lines are stacked top-down from the top of the layout rectangle, `leading` apart. A
    /// line holding only `§` blank lines still takes up their height.
    #[tracing::instrument(
        level = "debug",
        skip_all,
        fields(track = self.group().track(), group = ?self.group().index(), frame = frame.index.0)
    )]
    pub fn pens<S, F>(
        &self,
        frame: &FrameContext,
        styler: &mut S,
        opts: &PensOpts,
        mut render_clip: F,
    ) -> ClipLineResult<ClipGroupPens>
    where
        S: TextStyler + ?Sized,
        F: FnMut(&FrameContext, usize, &Clip, &str) -> anyhow::Result<(String, TextStyle)>,
    {
        let rect = opts.rect.unwrap_or(frame.rect);
        let lines = self.lines(opts.ignore_newlines);
        let mut out = Vec::with_capacity(lines.len());
        let mut y = rect.y0;

        for (line_index, line) in lines.iter().enumerate() {
            let mut rendered = Vec::new();
            for clip in line {
                let clip: &Clip = clip;
                if clip.clip_type == ClipType::Meta || clip.blank {
                    continue;
                }
                let ftext = clip.ftext();
                let (text, style) = render_clip(frame, line_index, clip, &ftext).map_err(|e| {
                    ClipLineError::render(format!("render callback failed for {clip}: {e:#}"))
                })?;
                rendered.push(RenderedClip { clip, text, style });
            }

            let mut runs: Vec<(&[RenderedClip<'_>], StyledRun, f64)> = Vec::new();
            let mut line_width = 0.0_f64;
            let mut line_height = line
                .iter()
                .filter(|c| c.blank && c.clip_type == ClipType::NewLine)
                .map(|c| c.blank_height)
                .fold(0.0_f64, f64::max);
            for run in rendered.chunk_by(|a, b| a.style == b.style) {
                let text: String = run.iter().map(|r| r.text.as_str()).collect();
                let styled = styler.style_text(&text, &run[0].style)?;
                let expected = text.chars().count();
                if styled.glyphs.len() != expected {
                    return Err(ClipLineError::layout(format!(
                        "styler returned {} glyphs for {expected} chars of {text:?}",
                        styled.glyphs.len()
                    )));
                }
                let run_x = line_width;
                line_width += styled.width();
                line_height = line_height.max(styled.height());
                runs.push((run, styled, run_x));
            }

            let scale = match opts.fit {
                Some(fit) if line_width > fit && line_width > 0.0 => fit / line_width,
                _ => 1.0,
            };
            let place = |g: GlyphBox, run_x: f64| GlyphBox {
                bounds: Rect::new(
                    rect.x0 + (run_x + g.bounds.x0) * scale,
                    y + g.bounds.y0,
                    rect.x0 + (run_x + g.bounds.x1) * scale,
                    y + g.bounds.y1,
                ),
                ..g
            };

            let mut position = Position::Future;
            let mut line_text = String::new();
            let mut slugs: Vec<PenGroup> = Vec::new();
            for (run, styled, run_x) in runs {
                let mut glyphs = styled.glyphs.into_iter();
                let mut last_slug: Option<usize> = None;
                for r in run {
                    let clip_position = r
                        .clip
                        .idx()
                        .map_or(Position::Future, |i| self.position_of(i));
                    if clip_position != Position::Future {
                        position = clip_position;
                    }
                    line_text.push_str(&r.clip.ftext());

                    let n = r.text.chars().count();
                    let pen = ClipPen {
                        clip: r.clip.idx().unwrap_or_default(),
                        line_index,
                        text: r.text.clone(),
                        style: r.style.clone(),
                        position: clip_position,
                        glyphs: glyphs.by_ref().take(n).map(|g| place(g, run_x)).collect(),
                    };
                    if r.clip.clip_type == ClipType::JoinPrev
                        && let Some(i) = last_slug
                    {
                        slugs[i].children.push(PenNode::Clip(pen));
                    } else {
                        slugs.push(PenGroup {
                            tag: PenTag::Slug,
                            children: vec![PenNode::Clip(pen)],
                            frame: Rect::ZERO,
                            line: None,
                        });
                        last_slug = Some(slugs.len() - 1);
                    }
                }
            }

            let line_frame = Rect::new(rect.x0, y, rect.x0 + line_width * scale, y + line_height);
            let mut children = Vec::with_capacity(slugs.len());
            for mut slug in slugs {
                slug.frame = union(slug.children.iter().filter_map(PenNode::frame))
                    .unwrap_or(Rect::new(rect.x0, y, rect.x0, y + line_height));
                for child in &mut slug.children {
                    if let PenNode::Clip(c) = child {
                        c.glyphs.reverse();
                    }
                }
                slug.children.reverse();
                children.push(PenNode::Group(slug));
            }
            children.reverse();

            out.push(PenNode::Group(PenGroup {
                tag: PenTag::Line,
                children,
                frame: line_frame,
                line: Some(LineMeta {
                    line_index,
                    position,
                    line_text,
                }),
            }));
            y += line_height + opts.graf_style.leading;
        }
        out.reverse();

        Ok(ClipGroupPens {
            track: self.group().track(),
            group: self.group().index(),
            lines: out,
        })
    }
}

#[cfg(test)]
#[path = "../../tests/unit/pens/grouped.rs"]
mod tests;
