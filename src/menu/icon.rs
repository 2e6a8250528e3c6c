use crate::menu::slot::WedgeAddress;
use crate::menu::style::StyleRecord;
use image::RgbaImage;
use lru::LruCache;
use std::num::NonZeroUsize;
use std::sync::Arc;
use thiserror::Error;

pub type Icon = Arc<RgbaImage>;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RenderError {
    #[error("cannot parse {key} colour {value:?}")]
    Color { key: String, value: String },
    #[error("malformed style markup: {0}")]
    Markup(String),
}

/// Turns a style into a square icon. Must return identical pixels for
/// identical arguments, otherwise cached icons go stale.
pub trait IconRenderer {
    fn render(&self, style: &StyleRecord, size: u32) -> Result<RgbaImage, RenderError>;

    /// Draws a button's own icon markup in place of its style swatch.
    fn render_icon(&self, markup: &str, size: u32) -> Result<RgbaImage, RenderError> {
        self.render(&StyleRecord::custom(markup), size)
    }

    /// Shown when [`render`](Self::render) fails.
    fn placeholder(&self, size: u32) -> RgbaImage {
        RgbaImage::new(size, size)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct IconKey {
    addr: WedgeAddress,
    size: u32,
    style: StyleRecord,
    icon: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct IconCacheStats {
    pub hits: u64,
    pub misses: u64,
    pub failures: u64,
    pub size: usize,
    pub capacity: usize,
}

/// LRU cache of rendered icons.
///
/// Entries are keyed by the style's content rather than by a version
/// number, so a wedge whose configured style changes misses on its own and
/// an unchanged one keeps hitting however often its panel is rebuilt.
pub struct IconCache {
    cache: LruCache<IconKey, Icon>,
    stats: IconCacheStats,
}

impl IconCache {
    pub fn new(capacity: usize) -> Self {
        let cap = NonZeroUsize::new(capacity.max(1)).unwrap_or(NonZeroUsize::MIN);
        Self {
            cache: LruCache::new(cap),
            stats: IconCacheStats {
                capacity: cap.get(),
                ..Default::default()
            },
        }
    }

    /// The icon for `addr`. `icon` is the button's own markup, drawn instead
    /// of `style` when present.
    pub fn get<R>(
        &mut self,
        addr: WedgeAddress,
        style: &StyleRecord,
        icon: Option<&str>,
        size: u32,
        renderer: &R,
    ) -> Icon
    where
        R: IconRenderer + ?Sized,
    {
        let key = IconKey {
            addr,
            size,
            style: style.clone(),
            icon: icon.map(str::to_owned),
        };

        if let Some(icon) = self.cache.get(&key) {
            self.stats.hits += 1;
            return icon.clone();
        }

        self.stats.misses += 1;
        let rendered = match icon {
            Some(markup) => renderer.render_icon(markup, size),
            None => renderer.render(style, size),
        };
        let icon = match rendered {
            Ok(image) => Arc::new(image),
            Err(e) => {
                self.stats.failures += 1;
                log::warn!("Failed to render icon for {}: {}", addr, e);
                Arc::new(renderer.placeholder(size))
            }
        };

        self.cache.put(key, icon.clone());
        icon
    }

    pub fn resize(&mut self, capacity: usize) {
        let cap = NonZeroUsize::new(capacity.max(1)).unwrap_or(NonZeroUsize::MIN);
        self.cache.resize(cap);
        self.stats.capacity = cap.get();
    }

    pub fn stats(&self) -> IconCacheStats {
        IconCacheStats {
            size: self.cache.len(),
            ..self.stats
        }
    }
}
