use crate::menu::geometry::Layout;
use crate::menu::session::MenuSettings;
use crate::menu::slot::SlotSpec;
use crate::menu::style::{StyleKey, StyleRecord, StyleTable};
use crate::render::{IconShape, SwatchColors, SwatchRenderer, parse_color};
use directories::ProjectDirs;
use palette::Srgba;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::str::FromStr;
use thiserror::Error;

/// Largest level count whose panel indices still fit the slot encoding.
const MAX_PANEL_LEVELS: u8 = 42;

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct GlobalConfig {
    pub panel_max_levels: u8,
    pub panel_radius: f64,
    pub border_width: f64,
    pub icon_size: u32,
    pub icon_cache_capacity: usize,
    pub default_icon_style: String,
    pub guide_color: Option<String>,
    pub broken_color: Option<String>,
}

impl Default for GlobalConfig {
    fn default() -> Self {
        Self {
            panel_max_levels: 2,
            panel_radius: 180.0,
            border_width: 10.0,
            icon_size: 64,
            icon_cache_capacity: 512,
            default_icon_style: IconShape::Circle.to_string(),
            guide_color: None,
            broken_color: None,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ButtonConfig {
    pub slot: SlotSpec,
    #[serde(default)]
    pub style: Option<BTreeMap<String, String>>,
    #[serde(default)]
    pub svg: Option<String>,
    #[serde(default)]
    pub icon: Option<String>,
}

impl ButtonConfig {
    fn style_record(&self) -> Option<StyleRecord> {
        match (&self.svg, &self.style) {
            (Some(svg), style) => {
                if style.is_some() {
                    log::warn!("Button {:?} has both style and svg, using svg", self.slot);
                }
                Some(StyleRecord::custom(svg.trim()))
            }
            (None, Some(style)) => {
                let pairs = style.iter().filter_map(|(key, value)| {
                    match StyleKey::from_str(key) {
                        Ok(key) => Some((key, value.clone())),
                        Err(_) => {
                            log::warn!("Ignoring unknown style key {:?}", key);
                            None
                        }
                    }
                });
                Some(StyleRecord::standard(pairs))
            }
            (None, None) => None,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct SvgDefConfig {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub attrs: BTreeMap<String, String>,
    #[serde(default)]
    pub svg: Option<String>,
}

impl SvgDefConfig {
    pub fn markup(&self) -> String {
        let attrs: String = self
            .attrs
            .iter()
            .map(|(k, v)| format!(r#" {k}="{v}""#))
            .collect();
        match &self.svg {
            Some(body) => format!(
                r#"<{kind} id="{id}"{attrs}>{body}</{kind}>"#,
                kind = self.kind,
                id = self.id,
                body = body.trim()
            ),
            None => format!(r#"<{} id="{}"{attrs}/>"#, self.kind, self.id),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub global: GlobalConfig,
    #[serde(default)]
    pub buttons: Vec<ButtonConfig>,
    #[serde(default, rename = "svg-defs")]
    pub svg_defs: Vec<SvgDefConfig>,
}

impl Config {
    pub fn max_levels(&self) -> u8 {
        let levels = self.global.panel_max_levels;
        if levels > MAX_PANEL_LEVELS {
            log::warn!(
                "panel-max-levels {} is too large, using {}",
                levels,
                MAX_PANEL_LEVELS
            );
            return MAX_PANEL_LEVELS;
        }
        levels
    }

    pub fn panel_radius(&self) -> f64 {
        let radius = self.global.panel_radius;
        if radius.is_finite() && radius > 0.0 {
            return radius;
        }
        let fallback = GlobalConfig::default().panel_radius;
        log::warn!("panel-radius {} is not positive, using {}", radius, fallback);
        fallback
    }

    pub fn border_width(&self) -> f64 {
        let width = self.global.border_width;
        if width.is_finite() && width >= 0.0 {
            return width;
        }
        let fallback = GlobalConfig::default().border_width;
        log::warn!("border-width {} is negative, using {}", width, fallback);
        fallback
    }

    pub fn settings(&self) -> MenuSettings {
        MenuSettings {
            max_levels: self.max_levels(),
            layout: Layout::new(self.panel_radius(), self.border_width()),
            icon_size: self.global.icon_size.max(1),
            icon_cache_capacity: self.global.icon_cache_capacity,
        }
    }

    pub fn renderer(&self) -> SwatchRenderer {
        let defaults = SwatchColors::default();
        let guide = color_or(self.global.guide_color.as_deref(), defaults.outline);
        SwatchRenderer::new(IconShape::from_config(&self.global.default_icon_style)).with_colors(
            SwatchColors {
                outline: guide,
                unknown: guide,
                broken: color_or(self.global.broken_color.as_deref(), defaults.broken),
                ..defaults
            },
        )
    }

    /// Validated styles and defs. Offending entries are skipped.
    pub fn style_table(&self) -> StyleTable {
        let max_levels = self.max_levels();
        let mut table = StyleTable::new();

        for button in &self.buttons {
            let fields = button.slot.fields();
            if let Err(e) = fields.validate(max_levels) {
                log::warn!("Skipping button {:?}: {}", button.slot, e);
                continue;
            }
            let addr = fields.encode();
            let Some(style) = button.style_record() else {
                log::warn!("Skipping button {}: no style or svg", addr);
                continue;
            };
            if !table.insert(addr, style) {
                log::warn!("Skipping duplicate button {}", addr);
                continue;
            }
            if let Some(icon) = &button.icon {
                table.set_icon(addr, icon.trim());
            }
        }

        for def in &self.svg_defs {
            if !table.defs_mut().insert(def.id.clone(), def.markup()) {
                log::warn!("Skipping duplicate svg def {:?}", def.id);
            }
        }

        log::info!("Loaded {} button styles", table.len());
        table
    }
}

fn color_or(value: Option<&str>, fallback: Srgba<f64>) -> Srgba<f64> {
    let Some(value) = value else {
        return fallback;
    };
    parse_color(StyleKey::Stroke, value).unwrap_or_else(|e| {
        log::warn!("{}, keeping default", e);
        fallback
    })
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to determine config directory")]
    ConfigDirNotFound,
    #[error("Config error: {0}")]
    Config(#[from] config::ConfigError),
    #[error("Notify error: {0}")]
    Notify(#[from] notify::Error),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub fn get_config_path() -> Result<std::path::PathBuf, ConfigError> {
    let proj_dirs =
        ProjectDirs::from("org", "inkhex", "inkhex").ok_or(ConfigError::ConfigDirNotFound)?;
    Ok(proj_dirs.config_dir().join("config.toml"))
}

pub fn load_config() -> Result<Config, ConfigError> {
    let config_path = get_config_path()?;

    let s = config::Config::builder()
        .add_source(config::File::from(config_path).required(false))
        .add_source(config::Environment::with_prefix("INKHEX"))
        .build()?;

    Ok(s.try_deserialize()?)
}

pub fn parse_config(toml: &str) -> Result<Config, ConfigError> {
    let s = config::Config::builder()
        .add_source(config::File::from_str(toml, config::FileFormat::Toml))
        .build()?;

    Ok(s.try_deserialize()?)
}

/// Falls back to an empty menu if the config cannot be read.
pub fn load_or_default() -> Config {
    match load_config() {
        Ok(c) => c,
        Err(e) => {
            log::error!("Failed to load config: {}", e);
            Config::default()
        }
    }
}

pub fn write_default_config() -> std::io::Result<std::path::PathBuf> {
    let path =
        get_config_path().map_err(|e| std::io::Error::new(std::io::ErrorKind::NotFound, e))?;
    if let Some(parent) = path.parent() {
        fs_err::create_dir_all(parent)?;
    }
    if !path.exists() {
        fs_err::write(&path, DEFAULT_CONFIG)?;
    }
    Ok(path)
}

const DEFAULT_CONFIG: &str = include_str!("default_config.toml");
