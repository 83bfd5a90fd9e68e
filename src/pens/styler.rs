use std::collections::BTreeMap;

use crate::{
    foundation::core::Rect,
    foundation::error::{ClipLineError, ClipLineResult},
    pens::style::{GlyphBox, StyledRun, TextBrushRgba8, TextStyle},
};

/// Lays out one run of same-style text.
///
/// Implementations must return exactly one [`GlyphBox`] per `char` of `text`, in text order.
pub trait TextStyler {
    fn style_text(&mut self, text: &str, style: &TextStyle) -> ClipLineResult<StyledRun>;
}

fn check_size(style: &TextStyle) -> ClipLineResult<()> {
    if !style.size_px.is_finite() || style.size_px <= 0.0 {
        return Err(ClipLineError::layout(format!(
            "text size_px must be finite and > 0, got {}",
            style.size_px
        )));
    }
    Ok(())
}

/// Fixed-pitch metrics derived from the font size. Ignores the font name.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MonospaceStyler {
    /// Advance per character as a fraction of the font size.
    pub advance_ratio: f64,
    /// Line-box height as a fraction of the font size.
    pub line_height_ratio: f64,
}

impl Default for MonospaceStyler {
    fn default() -> Self {
        Self {
            advance_ratio: 0.6,
            line_height_ratio: 1.2,
        }
    }
}

impl TextStyler for MonospaceStyler {
    fn style_text(&mut self, text: &str, style: &TextStyle) -> ClipLineResult<StyledRun> {
        check_size(style)?;
        let size = f64::from(style.size_px);
        let advance = size * self.advance_ratio;
        let pitch = advance + f64::from(style.tracking_px);
        let height = size * self.line_height_ratio;

        let glyphs: Vec<GlyphBox> = text
            .chars()
            .enumerate()
            .map(|(i, ch)| {
                let x0 = pitch * i as f64;
                GlyphBox {
                    glyph_id: u32::from(ch),
                    ch,
                    bounds: Rect::new(x0, 0.0, x0 + advance, height),
                }
            })
            .collect();
        let width = pitch * glyphs.len() as f64;
        Ok(StyledRun {
            glyphs,
            frame: Rect::new(0.0, 0.0, width, height),
        })
    }
}

/// Shapes text with Parley using fonts registered from raw bytes.
pub struct ParleyStyler {
    font_ctx: parley::FontContext,
    layout_ctx: parley::LayoutContext<TextBrushRgba8>,
    families: BTreeMap<String, String>,
}

impl Default for ParleyStyler {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for ParleyStyler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ParleyStyler")
            .field("families", &self.families)
            .finish_non_exhaustive()
    }
}

impl ParleyStyler {
    pub fn new() -> Self {
        Self {
            font_ctx: parley::FontContext::default(),
            layout_ctx: parley::LayoutContext::new(),
            families: BTreeMap::new(),
        }
    }

    /// Register font bytes under `name`, the value [`TextStyle::font`] refers to.
    ///
    /// Returns the family name Parley resolved from the font.
    pub fn register_font(
        &mut self,
        name: impl Into<String>,
        bytes: &[u8],
    ) -> ClipLineResult<&str> {
        let families = self
            .font_ctx
            .collection
            .register_fonts(parley::fontique::Blob::from(bytes.to_vec()), None);
        let family_id = families.first().map(|(id, _)| *id).ok_or_else(|| {
            ClipLineError::layout("no font families registered from font bytes")
        })?;
        let family_name = self
            .font_ctx
            .collection
            .family_name(family_id)
            .ok_or_else(|| ClipLineError::layout("registered font family has no name"))?
            .to_string();

        let name = name.into();
        tracing::debug!(font = %name, family = %family_name, "registered font");
        let slot = self.families.entry(name).or_default();
        *slot = family_name;
        Ok(slot.as_str())
    }

    fn family(&self, font: &str) -> ClipLineResult<&str> {
        self.families
            .get(font)
            .map(String::as_str)
            .ok_or_else(|| ClipLineError::layout(format!("font '{font}' is not registered")))
    }
}

impl TextStyler for ParleyStyler {
    fn style_text(&mut self, text: &str, style: &TextStyle) -> ClipLineResult<StyledRun> {
        check_size(style)?;
        let family_name = self.family(&style.font)?.to_string();

        let mut builder = self
            .layout_ctx
            .ranged_builder(&mut self.font_ctx, text, 1.0, true);
        builder.push_default(parley::style::StyleProperty::FontStack(
            parley::style::FontStack::Source(std::borrow::Cow::Owned(family_name)),
        ));
        builder.push_default(parley::style::StyleProperty::FontSize(style.size_px));
        builder.push_default(parley::style::StyleProperty::Brush(style.fill));
        let mut layout: parley::Layout<TextBrushRgba8> = builder.build(text);
        layout.break_all_lines(None);

        let char_starts: Vec<usize> = text.char_indices().map(|(i, _)| i).collect();
        let chars: Vec<char> = text.chars().collect();
        let mut slots: Vec<Option<GlyphBox>> = vec![None; char_starts.len()];
        let mut height = 0.0_f64;

        for line in layout.lines() {
            let metrics = line.metrics();
            let top = f64::from(metrics.baseline - metrics.ascent);
            let bottom = f64::from(metrics.baseline + metrics.descent);
            height = height.max(bottom);
            for item in line.items() {
                let parley::layout::PositionedLayoutItem::GlyphRun(run) = item else {
                    continue;
                };
                let mut x = f64::from(run.offset());
                for cluster in run.run().visual_clusters() {
                    let range = cluster.text_range();
                    let advance = f64::from(cluster.advance());
                    let glyph_id = cluster.glyphs().next().map_or(0, |g| g.id);
                    let first = char_starts.partition_point(|&b| b < range.start);
                    let last = char_starts.partition_point(|&b| b < range.end);
                    // Ligatures split their advance evenly across the chars they cover.
                    let share = advance / (last - first).max(1) as f64;
                    for (k, ci) in (first..last).enumerate() {
                        let x0 = x + share * k as f64;
                        slots[ci] = Some(GlyphBox {
                            glyph_id,
                            ch: chars[ci],
                            bounds: Rect::new(x0, top, x0 + share, bottom),
                        });
                    }
                    x += advance;
                }
            }
        }

        let tracking = f64::from(style.tracking_px);
        let mut glyphs = Vec::with_capacity(slots.len());
        let mut pen_x = 0.0_f64;
        for (i, (slot, ch)) in slots.into_iter().zip(chars).enumerate() {
            let shift = tracking * i as f64;
            let glyph = match slot {
                Some(g) => GlyphBox {
                    bounds: Rect::new(
                        g.bounds.x0 + shift,
                        g.bounds.y0,
                        g.bounds.x1 + shift,
                        g.bounds.y1,
                    ),
                    ..g
                },
                None => GlyphBox {
                    glyph_id: 0,
                    ch,
                    bounds: Rect::new(pen_x, 0.0, pen_x, height),
                },
            };
            pen_x = glyph.bounds.x1;
            glyphs.push(glyph);
        }

        let width = f64::from(layout.width()) + tracking * glyphs.len() as f64;
        Ok(StyledRun {
            glyphs,
            frame: Rect::new(0.0, 0.0, width, height),
        })
    }
}

#[cfg(test)]
#[path = "../../tests/unit/pens/styler.rs"]
mod tests;
