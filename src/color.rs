use eframe::egui::Color32;
use palette::{Hsl, IntoColor, Srgb};

/// Colour of the first plotted series (the actual values).
pub const ACTUAL_COLOR: Color32 = Color32::RED;
/// Colour of the second plotted series (the predictions).
pub const PREDICTED_COLOR: Color32 = Color32::BLUE;

// ---------------------------------------------------------------------------
// Color palette generator
// ---------------------------------------------------------------------------

/// Generates `n` visually distinct colours using evenly spaced hues.
pub fn generate_palette(n: usize) -> Vec<Color32> {
    if n == 0 {
        return Vec::new();
    }
    (0..n)
        .map(|i| {
            // offset so the extra hues don't land on pure red/blue
            let hue = 30.0 + (i as f32 / n as f32) * 360.0;
            let hsl = Hsl::new(hue, 0.75, 0.45);
            let rgb: Srgb = hsl.into_color();
            Color32::from_rgb(
                (rgb.red * 255.0) as u8,
                (rgb.green * 255.0) as u8,
                (rgb.blue * 255.0) as u8,
            )
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Series colours: column name → Color32
// ---------------------------------------------------------------------------

/// Fixed display colour per plotted series: red, blue, then palette hues.
#[derive(Debug, Clone)]
pub struct SeriesColors {
    mapping: Vec<(String, Color32)>,
    default_color: Color32,
}

impl SeriesColors {
    pub fn new(series: &[String]) -> Self {
        let extra = generate_palette(series.len().saturating_sub(2));
        let colors = [ACTUAL_COLOR, PREDICTED_COLOR].into_iter().chain(extra);
        SeriesColors {
            mapping: series.iter().cloned().zip(colors).collect(),
            default_color: Color32::GRAY,
        }
    }

    pub fn color_for(&self, series: &str) -> Color32 {
        self.mapping
            .iter()
            .find(|(name, _)| name == series)
            .map(|(_, c)| *c)
            .unwrap_or(self.default_color)
    }

    /// Return the legend entries (series name → colour) for the UI.
    pub fn legend_entries(&self) -> &[(String, Color32)] {
        &self.mapping
    }
}
