use crate::menu::icon::{IconRenderer, RenderError};
use crate::menu::style::{StyleKey, StyleRecord};
use image::{Rgba, RgbaImage};
use palette::{Srgb, Srgba, WithAlpha};
use regex::Regex;
use std::str::FromStr;
use std::sync::LazyLock;
use strum::{Display as StrumDisplay, EnumString};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, EnumString, StrumDisplay)]
#[strum(ascii_case_insensitive, serialize_all = "lowercase")]
pub enum IconShape {
    #[default]
    Circle,
    Square,
}

impl IconShape {
    /// Parses a configured shape, falling back to a circle.
    pub fn from_config(value: &str) -> Self {
        Self::from_str(value).unwrap_or_else(|_| {
            log::warn!("Unknown icon style {:?}, using circle", value);
            Self::Circle
        })
    }
}

pub struct SwatchColors {
    pub outline: Srgba<f64>,
    pub hatch: Srgba<f64>,
    pub unknown: Srgba<f64>,
    pub broken: Srgba<f64>,
}

impl Default for SwatchColors {
    fn default() -> Self {
        Self {
            outline: Srgba::new(0.6, 0.6, 0.6, 1.0),
            hatch: Srgba::new(0.25, 0.25, 0.25, 0.9),
            unknown: Srgba::new(0.5, 0.5, 0.5, 0.6),
            broken: Srgba::new(0.8, 0.2, 0.2, 0.5),
        }
    }
}

/// Draws each style as a small swatch: the fill inside the shape and the
/// stroke around it.
#[derive(Default)]
pub struct SwatchRenderer {
    shape: IconShape,
    colors: SwatchColors,
}

impl SwatchRenderer {
    pub fn new(shape: IconShape) -> Self {
        Self {
            shape,
            colors: SwatchColors::default(),
        }
    }

    pub fn with_colors(mut self, colors: SwatchColors) -> Self {
        self.colors = colors;
        self
    }

    pub fn shape(&self) -> IconShape {
        self.shape
    }

    /// Distance of a pixel centre inside the shape's outline, negative
    /// outside.
    fn depth(&self, size: u32, x: u32, y: u32) -> f64 {
        let half = size as f64 / 2.0;
        let (dx, dy) = (x as f64 + 0.5 - half, y as f64 + 0.5 - half);
        let reach = half - 1.0;
        match self.shape {
            IconShape::Circle => reach - dx.hypot(dy),
            IconShape::Square => reach - dx.abs().max(dy.abs()),
        }
    }

    fn paint<F>(&self, size: u32, mut shade: F) -> RgbaImage
    where
        F: FnMut(u32, u32, f64) -> Option<Srgba<f64>>,
    {
        RgbaImage::from_fn(size, size, |x, y| {
            let depth = self.depth(size, x, y);
            if depth < 0.0 {
                return Rgba([0, 0, 0, 0]);
            }
            shade(x, y, depth).map_or(Rgba([0, 0, 0, 0]), to_pixel)
        })
    }

    fn render_standard(
        &self,
        style: &StyleRecord,
        size: u32,
    ) -> Result<RgbaImage, RenderError> {
        let fill = style
            .get(StyleKey::Fill)
            .map(|v| parse_color(StyleKey::Fill, v))
            .transpose()?;
        let stroke = style
            .get(StyleKey::Stroke)
            .map(|v| parse_color(StyleKey::Stroke, v))
            .transpose()?;
        let fill = fill.map(|c| c.with_alpha(c.alpha * opacity(style, StyleKey::FillOpacity)));
        let stroke =
            stroke.map(|c| c.with_alpha(c.alpha * opacity(style, StyleKey::StrokeOpacity)));

        let band = (size as f64 / 10.0).max(1.0);
        let stroke = match (fill, stroke) {
            (None, None) => Some(self.colors.outline),
            (_, stroke) => stroke,
        };

        Ok(self.paint(size, |_, _, depth| {
            if depth < band {
                stroke.or(fill)
            } else {
                fill
            }
        }))
    }

    fn render_hatched(&self, size: u32) -> RgbaImage {
        let stripe = (size / 8).max(1);
        let hatch = self.colors.hatch;
        self.paint(size, |x, y, _| ((x + y) / stripe % 2 == 0).then_some(hatch))
    }

    /// Outline with a diagonal cross: the style is unknown or empty.
    fn render_unknown(&self, size: u32) -> RgbaImage {
        let band = (size as f64 / 12.0).max(1.0);
        let color = self.colors.unknown;
        self.paint(size, |x, y, depth| {
            let on_cross = x.abs_diff(y) as f64 <= band / 2.0
                || (x + y).abs_diff(size - 1) as f64 <= band / 2.0;
            (depth < band || on_cross).then_some(color)
        })
    }
}

impl IconRenderer for SwatchRenderer {
    fn render(&self, style: &StyleRecord, size: u32) -> Result<RgbaImage, RenderError> {
        if style.is_empty() {
            return Ok(self.render_unknown(size));
        }
        match style {
            StyleRecord::Standard(_) => self.render_standard(style, size),
            StyleRecord::Custom(markup) => {
                if !markup.trim_start().starts_with('<') {
                    return Err(RenderError::Markup(markup.clone()));
                }
                Ok(self.render_hatched(size))
            }
        }
    }

    /// Icon markup is drawn as a swatch of the first fill and stroke colours
    /// it paints with, or hatched when it names none.
    fn render_icon(&self, markup: &str, size: u32) -> Result<RgbaImage, RenderError> {
        if !markup.trim_start().starts_with('<') {
            return Err(RenderError::Markup(markup.to_string()));
        }
        let paints = icon_paints(markup);
        if paints.is_empty() {
            return Ok(self.render_hatched(size));
        }
        self.render_standard(&StyleRecord::standard(paints), size)
    }

    fn placeholder(&self, size: u32) -> RgbaImage {
        let broken = self.colors.broken;
        self.paint(size, |_, _, _| Some(broken))
    }
}

static PAINT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"\b(fill|stroke)\s*[:=]\s*['"]?([^;'"\s>]+)"#).expect("static regex")
});

/// First usable fill and stroke found in `markup`, as attribute or inline style.
fn icon_paints(markup: &str) -> Vec<(StyleKey, String)> {
    let mut paints: Vec<(StyleKey, String)> = Vec::new();
    for caps in PAINT.captures_iter(markup) {
        let key = if &caps[1] == "fill" {
            StyleKey::Fill
        } else {
            StyleKey::Stroke
        };
        if paints.iter().any(|(k, _)| *k == key) || parse_color(key, &caps[2]).is_err() {
            continue;
        }
        paints.push((key, caps[2].to_string()));
    }
    paints
}

fn opacity(style: &StyleRecord, key: StyleKey) -> f64 {
    style
        .get(key)
        .and_then(|v| v.trim().parse::<f64>().ok())
        .map_or(1.0, |v| v.clamp(0.0, 1.0))
}

/// Parses a CSS hex (`#rgb`, `#rrggbb`) or named colour. `none` is fully
/// transparent.
pub fn parse_color(key: StyleKey, value: &str) -> Result<Srgba<f64>, RenderError> {
    let trimmed = value.trim();
    if trimmed.eq_ignore_ascii_case("none") {
        return Ok(Srgba::new(0.0, 0.0, 0.0, 0.0));
    }

    let rgb = if trimmed.starts_with('#') {
        Srgb::<u8>::from_str(trimmed).ok()
    } else {
        palette::named::from_str(&trimmed.to_ascii_lowercase())
    };

    rgb.map(|c| c.into_format::<f64>().with_alpha(1.0))
        .ok_or_else(|| RenderError::Color {
            key: key.to_string(),
            value: value.to_string(),
        })
}

fn to_pixel(color: Srgba<f64>) -> Rgba<u8> {
    let (r, g, b, a) = color.into_format::<u8, u8>().into_components();
    Rgba([r, g, b, a])
}
