use crate::foundation::core::Rect;

/// RGBA8 fill color for a text run. Doubles as the Parley brush.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct TextBrushRgba8 {
    /// Red channel.
    pub r: u8,
    /// Green channel.
    pub g: u8,
    /// Blue channel.
    pub b: u8,
    /// Alpha channel.
    pub a: u8,
}

impl TextBrushRgba8 {
    /// Opaque white.
    pub const WHITE: Self = Self {
        r: 255,
        g: 255,
        b: 255,
        a: 255,
    };
}

/// How a render callback wants a clip's text set.
///
/// Consecutive clips with equal styles are laid out as one run.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct TextStyle {
    /// Font family name, as registered with the styler.
    pub font: String,
    /// Font size in pixels.
    pub size_px: f32,
    /// Extra advance added after every character.
    #[serde(default)]
    pub tracking_px: f32,
    /// Fill color.
    #[serde(default = "default_fill")]
    pub fill: TextBrushRgba8,
}

fn default_fill() -> TextBrushRgba8 {
    TextBrushRgba8::WHITE
}

impl TextStyle {
    pub fn new(font: impl Into<String>, size_px: f32) -> Self {
        Self {
            font: font.into(),
            size_px,
            tracking_px: 0.0,
            fill: TextBrushRgba8::WHITE,
        }
    }

    pub fn with_tracking(mut self, tracking_px: f32) -> Self {
        self.tracking_px = tracking_px;
        self
    }
}

/// Vertical spacing between laid-out lines.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct GrafStyle {
    /// Gap between one line's bottom and the next line's top.
    pub leading: f64,
}

impl Default for GrafStyle {
    fn default() -> Self {
        Self { leading: 20.0 }
    }
}

/// Options for [`crate::ResolvedGroup::pens`].
#[derive(Clone, Debug, Default)]
pub struct PensOpts {
    /// Layout rectangle; `None` uses the frame's rectangle.
    pub rect: Option<Rect>,
    pub graf_style: GrafStyle,
    /// Lines wider than this are compressed horizontally to fit.
    pub fit: Option<f64>,
    /// Lay NewLine clips out inline instead of breaking.
    pub ignore_newlines: bool,
}

/// One shaped character.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize)]
pub struct GlyphBox {
    /// Font glyph id (first glyph of the character's cluster).
    pub glyph_id: u32,
    /// Source character.
    pub ch: char,
    /// Ink-independent layout box.
    pub bounds: Rect,
}

/// A laid-out run of same-style text: exactly one [`GlyphBox`] per `char` of the input.
///
/// Coordinates are relative to the run origin, with `y = 0` at the top of the line box.
#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub struct StyledRun {
    pub glyphs: Vec<GlyphBox>,
    /// Advance width by line-box height.
    pub frame: Rect,
}

impl StyledRun {
    pub fn width(&self) -> f64 {
        self.frame.width()
    }

    pub fn height(&self) -> f64 {
        self.frame.height()
    }
}
