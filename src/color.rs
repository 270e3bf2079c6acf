use palette::{Hsl, IntoColor, Srgb};

use crate::data::model::Country;

// ---------------------------------------------------------------------------
// Color palette generator
// ---------------------------------------------------------------------------

/// Generates `n` visually distinct colours using evenly spaced hues.
pub fn generate_palette(n: usize) -> Vec<Srgb<u8>> {
    if n == 0 {
        return Vec::new();
    }
    (0..n)
        .map(|i| {
            let hue = (i as f32 / n as f32) * 360.0;
            let hsl = Hsl::new(hue, 0.75, 0.55);
            let rgb: Srgb = hsl.into_color();
            rgb.into_format::<u8>()
        })
        .collect()
}

/// `#rrggbb` form used in chart specifications.
pub fn to_hex(c: Srgb<u8>) -> String {
    format!("#{:02x}{:02x}{:02x}", c.red, c.green, c.blue)
}

// ---------------------------------------------------------------------------
// Country → colour
// ---------------------------------------------------------------------------

/// Fixed colour per country so every chart uses the same legend.
#[derive(Debug, Clone)]
pub struct CountryColors {
    colors: Vec<Srgb<u8>>,
}

impl Default for CountryColors {
    fn default() -> Self {
        Self {
            colors: generate_palette(Country::ALL.len()),
        }
    }
}

impl CountryColors {
    pub fn color_for(&self, country: Country) -> Srgb<u8> {
        self.colors[country.index()]
    }

    /// Vega-Lite `scale.domain` / `scale.range` pair for the given countries.
    pub fn scale(&self, countries: &[Country]) -> (Vec<String>, Vec<String>) {
        countries
            .iter()
            .map(|&c| (c.name().to_string(), to_hex(self.color_for(c))))
            .unzip()
    }
}
