//! Plot theme and colour scales shared by every map frame.

/// Plotly colour scale: (position in [0, 1], hex colour) stops.
pub type ColorScale = &'static [(f64, &'static str)];

pub const FONT_COLOR: &str = "#1e4a4a";
pub const FONT_FAMILY: &str = "Helvetica";
pub const TITLE_FONT_FAMILY: &str = "Georgia, serif";
pub const TITLE_FONT_SIZE: u32 = 24;
pub const BACKGROUND: &str = "#ffffff";
pub const MENU_BACKGROUND: &str = "#F3F4F3";
pub const MARKER_OPACITY: f64 = 0.7;
pub const DIMMED_OPACITY: f64 = 0.05;

pub const GENDER_SPLIT_SCALE: ColorScale = &[
    (0.0, "#30003B"),
    (0.1, "#6c307b"),
    (0.3, "#9657A5"),
    (0.4, "#CFBCD0"),
    (0.45, "#fbecfc"),
    (0.5, "#F3F4F3"),
    (0.55, "#d8f7e7"),
    (0.6, "#AAC9B8"),
    (0.7, "#0B8569"),
    (0.9, "#00573e"),
    (1.0, "#06474D"),
];

pub const ACCEPTANCE_RATE_SCALE: ColorScale = &[
    (0.0, "#000004"),
    (0.1, "#1b0c41"),
    (0.2, "#4f0a6d"),
    (0.3, "#781c6d"),
    (0.4, "#a42c60"),
    (0.5, "#cc444c"),
    (0.6, "#ed6925"),
    (0.7, "#fb9a06"),
    (0.8, "#f7d13d"),
    (0.9, "#fcfdbf"),
    (1.0, "#ffffff"),
];

pub const GRADUATION_RATE_SCALE: ColorScale = &[
    (0.0, "#fd7f25"),
    (0.2, "#fdae25"),
    (0.35, "#fddd25"),
    (0.5, "#dede2b"),
    (0.55, "#c3de2b"),
    (0.6, "#b5de2b"),
    (0.65, "#6ece58"),
    (0.7, "#58ce7d"),
    (0.75, "#1f9e89"),
    (0.85, "#26748e"),
    (1.0, "#2c4682"),
];

pub const EARNINGS_SCALE: ColorScale = &[
    (0.0, "#320404"),
    (0.15, "#750C0C"),
    (0.25, "#8E3D3D"),
    (0.35, "#A75A5A"),
    (0.45, "#CF878E"),
    (0.5, "#CF87A9"),
    (0.55, "#DF9BD3"),
    (0.6, "#DFB8D8"),
    (0.75, "#AAA6F4"),
    (0.8, "#A8BCFE"),
    (1.0, "#CDEAF5"),
];
