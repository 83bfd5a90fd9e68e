use crate::{
    foundation::core::Rect,
    pens::style::{GlyphBox, TextStyle},
    timeline::resolve::Position,
};

/// Kind of an interior [`PenGroup`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize)]
pub enum PenTag {
    /// One visual line.
    Line,
    /// One word: a clip plus the JoinPrev clips fused to it.
    Slug,
}

/// Node of a [`ClipGroupPens`] tree.
#[derive(Clone, Debug, PartialEq, serde::Serialize)]
#[serde(tag = "node", rename_all = "snake_case")]
pub enum PenNode {
    Clip(ClipPen),
    Group(PenGroup),
}

impl PenNode {
    /// Laid-out bounds, `None` when nothing was placed.
    pub fn frame(&self) -> Option<Rect> {
        match self {
            Self::Clip(c) => c.frame(),
            Self::Group(g) => Some(g.frame),
        }
    }

    fn is_empty(&self) -> bool {
        match self {
            Self::Clip(c) => c.glyphs.is_empty(),
            Self::Group(g) => g.children.is_empty(),
        }
    }
}

/// Line metadata recorded during assembly.
#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub struct LineMeta {
    pub line_index: usize,
    /// Most advanced position of any clip on the line: future until a clip is current or past.
    pub position: Position,
    /// Concatenated `ftext` of the line's clips.
    pub line_text: String,
}

#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub struct PenGroup {
    pub tag: PenTag,
    pub children: Vec<PenNode>,
    pub frame: Rect,
    /// Set on [`PenTag::Line`] groups only.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub line: Option<LineMeta>,
}

/// Glyphs produced for one clip.
#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub struct ClipPen {
    /// Group-local clip index.
    pub clip: usize,
    pub line_index: usize,
    /// Text returned by the render callback.
    pub text: String,
    pub style: TextStyle,
    pub position: Position,
    pub glyphs: Vec<GlyphBox>,
}

impl ClipPen {
    /// Union of the glyph bounds.
    pub fn frame(&self) -> Option<Rect> {
        union(self.glyphs.iter().map(|g| g.bounds))
    }
}

pub(crate) fn union(rects: impl IntoIterator<Item = Rect>) -> Option<Rect> {
    rects.into_iter().reduce(|a, b| a.union(b))
}

/// Nested group → line → slug → clip → glyph structure for one resolved group.
///
/// Every level is stored in paint order, which is the reverse of reading order: the last line
/// comes first, and so on down to the glyphs.
#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub struct ClipGroupPens {
    pub track: usize,
    pub group: Option<usize>,
    pub lines: Vec<PenNode>,
}

impl ClipGroupPens {
    /// Line groups in paint order.
    pub fn lines(&self) -> impl Iterator<Item = &PenGroup> {
        self.lines.iter().filter_map(|n| match n {
            PenNode::Group(g) if g.tag == PenTag::Line => Some(g),
            _ => None,
        })
    }

    /// Every slug, depth-first.
    pub fn slugs(&self) -> Vec<&PenGroup> {
        let mut out = Vec::new();
        for node in &self.lines {
            collect_tagged(node, PenTag::Slug, &mut out);
        }
        out
    }

    /// Every clip leaf, depth-first.
    pub fn clips(&self) -> Vec<&ClipPen> {
        let mut out = Vec::new();
        for node in &self.lines {
            collect_clips(node, &mut out);
        }
        out
    }

    /// Apply `f` to every clip leaf.
    pub fn map_clips<F>(&mut self, mut f: F) -> &mut Self
    where
        F: FnMut(&mut ClipPen),
    {
        for node in &mut self.lines {
            visit_clips_mut(node, &mut f);
        }
        self
    }

    /// Drop the glyphs of clips in future position.
    ///
    /// With `clean`, empty clips, slugs and lines are then removed bottom-up.
    pub fn remove_futures(&mut self, clean: bool) -> &mut Self {
        self.map_clips(|c| {
            if c.position == Position::Future {
                c.glyphs.clear();
            }
        });
        if clean {
            for node in &mut self.lines {
                prune_empty(node);
            }
            self.lines.retain(|n| !n.is_empty());
        }
        self
    }

    /// Union of every line frame.
    pub fn frame(&self) -> Option<Rect> {
        union(self.lines.iter().filter_map(PenNode::frame))
    }
}

fn collect_tagged<'a>(node: &'a PenNode, tag: PenTag, out: &mut Vec<&'a PenGroup>) {
    if let PenNode::Group(g) = node {
        if g.tag == tag {
            out.push(g);
        } else {
            for child in &g.children {
                collect_tagged(child, tag, out);
            }
        }
    }
}

fn collect_clips<'a>(node: &'a PenNode, out: &mut Vec<&'a ClipPen>) {
    match node {
        PenNode::Clip(c) => out.push(c),
        PenNode::Group(g) => {
            for child in &g.children {
                collect_clips(child, out);
            }
        }
    }
}

fn visit_clips_mut<F: FnMut(&mut ClipPen)>(node: &mut PenNode, f: &mut F) {
    match node {
        PenNode::Clip(c) => f(c),
        PenNode::Group(g) => {
            for child in &mut g.children {
                visit_clips_mut(child, f);
            }
        }
    }
}

fn prune_empty(node: &mut PenNode) {
    if let PenNode::Group(g) = node {
        for child in &mut g.children {
            prune_empty(child);
        }
        g.children.retain(|c| !c.is_empty());
    }
}

#[cfg(test)]
#[path = "../../tests/unit/pens/tree.rs"]
mod tests;
