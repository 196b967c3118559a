use ratatui::style::Color;
use ratatui::style::Modifier;
use ratatui::style::Style;

/// Screen background.
pub(crate) const BACKGROUND_RGB: (u8, u8, u8) = (0x1e, 0x1e, 0x2c);
/// Title text.
pub(crate) const GOLD_RGB: (u8, u8, u8) = (0xff, 0xd7, 0x00);
/// Roll button fill.
pub(crate) const BUTTON_RGB: (u8, u8, u8) = (0x4c, 0xaf, 0x50);
/// Die body.
pub(crate) const DIE_RGB: (u8, u8, u8) = (0xf5, 0xf5, 0xf5);
/// Pips.
pub(crate) const PIP_RGB: (u8, u8, u8) = (0x1e, 0x1e, 0x2c);

pub(crate) fn screen_style() -> Style {
    Style::default().bg(color(BACKGROUND_RGB))
}

pub(crate) fn title_style() -> Style {
    Style::default()
        .fg(color(GOLD_RGB))
        .add_modifier(Modifier::BOLD)
}

pub(crate) fn button_style(pressed: bool) -> Style {
    let style = Style::default()
        .bg(color(BUTTON_RGB))
        .fg(Color::White)
        .add_modifier(Modifier::BOLD);
    if pressed {
        style.add_modifier(Modifier::REVERSED)
    } else {
        style
    }
}

pub(crate) fn die_style() -> Style {
    Style::default().bg(color(DIE_RGB)).fg(color(PIP_RGB))
}

pub(crate) fn hint_style() -> Style {
    Style::default().fg(Color::DarkGray)
}

/// Resolves an RGB triple against what the terminal can show.
///
/// Truecolor terminals get the exact value; everything else degrades to the
/// perceptually closest of the 16 basic ANSI colors, and terminals that report
/// no color support at all keep their default.
pub(crate) fn color(rgb: (u8, u8, u8)) -> Color {
    let Some(color_level) = supports_color::on_cached(supports_color::Stream::Stdout) else {
        return Color::default();
    };
    if color_level.has_16m {
        let (r, g, b) = rgb;
        Color::Rgb(r, g, b)
    } else if color_level.has_basic {
        closest_basic_color(rgb)
    } else {
        Color::default()
    }
}

fn closest_basic_color(target: (u8, u8, u8)) -> Color {
    BASIC_TERMINAL_COLORS
        .iter()
        .min_by(|(_, a), (_, b)| {
            perceptual_distance(*a, target)
                .partial_cmp(&perceptual_distance(*b, target))
                .unwrap_or(std::cmp::Ordering::Equal)
        })
        .map(|(color, _)| *color)
        .unwrap_or(Color::default())
}

/// Weighted Euclidean distance ("redmean"), close enough to perceived
/// difference for picking a fallback color.
fn perceptual_distance(a: (u8, u8, u8), b: (u8, u8, u8)) -> f32 {
    let (r1, g1, b1) = (f32::from(a.0), f32::from(a.1), f32::from(a.2));
    let (r2, g2, b2) = (f32::from(b.0), f32::from(b.1), f32::from(b.2));
    let mean_r = (r1 + r2) / 2.0;
    let dr = r1 - r2;
    let dg = g1 - g2;
    let db = b1 - b2;
    ((2.0 + mean_r / 256.0) * dr * dr + 4.0 * dg * dg + (2.0 + (255.0 - mean_r) / 256.0) * db * db)
        .sqrt()
}

// Mapping of ANSI color indices to approximate RGB tuples. These values mirror Windows'
// default console palette so the fallback path stays visually consistent across platforms.
const BASIC_TERMINAL_COLORS: [(Color, (u8, u8, u8)); 16] = [
    (Color::Black, (0, 0, 0)),
    (Color::Blue, (0, 0, 128)),
    (Color::Green, (0, 128, 0)),
    (Color::Cyan, (0, 128, 128)),
    (Color::Red, (128, 0, 0)),
    (Color::Magenta, (128, 0, 128)),
    (Color::Yellow, (128, 128, 0)),
    (Color::Gray, (192, 192, 192)),
    (Color::DarkGray, (128, 128, 128)),
    (Color::LightBlue, (0, 0, 255)),
    (Color::LightGreen, (0, 255, 0)),
    (Color::LightCyan, (0, 255, 255)),
    (Color::LightRed, (255, 0, 0)),
    (Color::LightMagenta, (255, 0, 255)),
    (Color::LightYellow, (255, 255, 0)),
    (Color::White, (255, 255, 255)),
];
