use std::collections::HashMap;

use eframe::egui::Color32;
use palette::{Hsl, IntoColor, Srgb};

/// Hue step between consecutive series; keeps neighbours far apart on the
/// colour wheel however many charts are on screen.
const GOLDEN_ANGLE: f32 = 137.507_76;

fn from_hue(hue: f32) -> Color32 {
    let rgb: Srgb = Hsl::new(hue.rem_euclid(360.0), 0.7, 0.5).into_color();
    let [r, g, b] =
        [rgb.red, rgb.green, rgb.blue].map(|c| (c.clamp(0.0, 1.0) * 255.0).round() as u8);
    Color32::from_rgb(r, g, b)
}

/// `n` colours with evenly spaced hues.
pub fn evenly_spaced(n: usize) -> Vec<Color32> {
    (0..n)
        .map(|i| from_hue(i as f32 * 360.0 / n as f32))
        .collect()
}

/// Colour of the `i`-th chart on the dashboard.
pub fn series_color(i: usize) -> Color32 {
    from_hue(210.0 + i as f32 * GOLDEN_ANGLE)
}

/// Slice colours for a pie, one per distinct label.
#[derive(Debug, Clone, Default)]
pub struct ColorMap {
    colors: HashMap<String, Color32>,
}

impl ColorMap {
    pub fn new<'a>(labels: impl IntoIterator<Item = &'a str>) -> Self {
        let mut distinct: Vec<&str> = Vec::new();
        for label in labels {
            if !distinct.contains(&label) {
                distinct.push(label);
            }
        }
        let colors = distinct
            .iter()
            .zip(evenly_spaced(distinct.len()))
            .map(|(label, color)| (label.to_string(), color))
            .collect();
        ColorMap { colors }
    }

    /// Grey for labels the map was not built with.
    pub fn color_for(&self, label: &str) -> Color32 {
        self.colors.get(label).copied().unwrap_or(Color32::GRAY)
    }
}
