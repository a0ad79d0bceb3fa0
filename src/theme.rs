use eframe::egui::Color32;
use palette::{LinSrgb, Mix, Srgb};

// ---------------------------------------------------------------------------
// Colour themes for the heatmap
// ---------------------------------------------------------------------------

/// Sequential colour scheme selectable in the side panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ColorTheme {
    #[default]
    Blues,
    Greens,
    Reds,
}

impl ColorTheme {
    pub const ALL: [ColorTheme; 3] = [ColorTheme::Blues, ColorTheme::Greens, ColorTheme::Reds];

    pub fn name(self) -> &'static str {
        match self {
            ColorTheme::Blues => "blues",
            ColorTheme::Greens => "greens",
            ColorTheme::Reds => "reds",
        }
    }

    /// Parse a theme name, ignoring case and surrounding whitespace.
    pub fn from_name(name: &str) -> Option<Self> {
        let name = name.trim();
        Self::ALL
            .into_iter()
            .find(|t| t.name().eq_ignore_ascii_case(name))
    }

    /// Light and dark ends of the ramp.
    fn endpoints(self) -> (Srgb<u8>, Srgb<u8>) {
        match self {
            ColorTheme::Blues => (Srgb::new(247, 251, 255), Srgb::new(8, 48, 107)),
            ColorTheme::Greens => (Srgb::new(247, 252, 245), Srgb::new(0, 68, 27)),
            ColorTheme::Reds => (Srgb::new(255, 245, 240), Srgb::new(103, 0, 13)),
        }
    }

    /// Colour for `t` in `[0, 1]`; values outside are clamped.
    pub fn ramp(self, t: f32) -> Color32 {
        let t = if t.is_nan() { 0.0 } else { t.clamp(0.0, 1.0) };
        let (light, dark) = self.endpoints();
        let light: LinSrgb = light.into_format::<f32>().into_linear();
        let dark: LinSrgb = dark.into_format::<f32>().into_linear();
        let rgb: Srgb<u8> = Srgb::<f32>::from_linear(light.mix(dark, t)).into_format::<u8>();
        Color32::from_rgb(rgb.red, rgb.green, rgb.blue)
    }

    /// Colour for `value` scaled into `[min, max]`.
    pub fn color_for(self, value: f64, min: f64, max: f64) -> Color32 {
        self.ramp(normalize(value, min, max))
    }
}

/// Scale `value` into `[0, 1]`. A degenerate range maps everything to 0.
pub fn normalize(value: f64, min: f64, max: f64) -> f32 {
    let range = max - min;
    if range.abs() < f64::EPSILON {
        0.0
    } else {
        ((value - min) / range) as f32
    }
}
