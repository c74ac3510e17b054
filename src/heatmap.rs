use ratatui::style::Color;

pub const BEST_RANK: f64 = 1.0;
pub const WORST_RANK: f64 = 20.0;

const SATURATION: f64 = 0.70;
const LIGHTNESS: f64 = 0.45;

/// Hue for a category rank: 120 (green) at rank 1 down to 0 (red) at rank 20.
/// Ranks outside [1, 20] collapse to the boundary hue.
pub fn hue_for(rank: f64) -> f64 {
    let clamped = rank.clamp(BEST_RANK, WORST_RANK);
    120.0 * (WORST_RANK - clamped) / (WORST_RANK - BEST_RANK)
}

/// Heatmap color for an optional rank. Absent ranks and placeholder values
/// (zero or negative, the backend's "-") stay uncolored.
pub fn color_for(rank: Option<f64>) -> Option<Color> {
    let rank = rank.filter(|r| r.is_finite() && *r > 0.0)?;
    let (r, g, b) = hsl_to_rgb(hue_for(rank), SATURATION, LIGHTNESS);
    Some(Color::Rgb(r, g, b))
}

fn hsl_to_rgb(hue: f64, saturation: f64, lightness: f64) -> (u8, u8, u8) {
    let c = (1.0 - (2.0 * lightness - 1.0).abs()) * saturation;
    let h = hue / 60.0;
    let x = c * (1.0 - (h % 2.0 - 1.0).abs());
    let (r1, g1, b1) = match h as u32 {
        0 => (c, x, 0.0),
        1 => (x, c, 0.0),
        2 => (0.0, c, x),
        3 => (0.0, x, c),
        4 => (x, 0.0, c),
        _ => (c, 0.0, x),
    };
    let m = lightness - c / 2.0;
    (
        ((r1 + m) * 255.0).round() as u8,
        ((g1 + m) * 255.0).round() as u8,
        ((b1 + m) * 255.0).round() as u8,
    )
}
