use crate::menu::slot::WedgeAddress;
use regex::Regex;
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::sync::LazyLock;
use strum::{Display as StrumDisplay, EnumIter, EnumString};

pub const STYLE_MIME_TYPE: &str = "image/x-inkscape-svg";

const XML_HEADER: &str = r#"<?xml version="1.0" encoding="UTF-8"?>"#;

/// Attributes a standard style may set. Declaration order is the order in
/// which they are written to the clipboard.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, EnumString, EnumIter, StrumDisplay,
)]
#[strum(serialize_all = "kebab-case")]
pub enum StyleKey {
    Stroke,
    StrokeWidth,
    StrokeOpacity,
    StrokeDasharray,
    MarkerStart,
    MarkerMid,
    MarkerEnd,
    Fill,
    FillOpacity,
    FontFamily,
    FontSize,
    FontStyle,
}

pub type StyleMap = BTreeMap<StyleKey, String>;

/// The style carried by one wedge. Compared and hashed by content.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum StyleRecord {
    Standard(StyleMap),
    Custom(String),
}

impl Default for StyleRecord {
    fn default() -> Self {
        Self::Standard(StyleMap::new())
    }
}

impl StyleRecord {
    pub fn standard<K, V>(pairs: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<StyleKey>,
        V: Into<String>,
    {
        Self::Standard(
            pairs
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }

    pub fn custom(markup: impl Into<String>) -> Self {
        Self::Custom(markup.into())
    }

    /// No attributes and no markup: rendered as the "unknown style" marker
    /// and never copied.
    pub fn is_empty(&self) -> bool {
        match self {
            Self::Standard(styles) => styles.is_empty(),
            Self::Custom(markup) => markup.is_empty(),
        }
    }

    pub fn get(&self, key: StyleKey) -> Option<&str> {
        match self {
            Self::Standard(styles) => styles.get(&key).map(String::as_str),
            Self::Custom(_) => None,
        }
    }

    /// `key:value;key:value` in canonical key order.
    pub fn inline_style(&self) -> String {
        match self {
            Self::Standard(styles) => styles
                .iter()
                .map(|(k, v)| format!("{k}:{v}"))
                .collect::<Vec<_>>()
                .join(";"),
            Self::Custom(markup) => markup.clone(),
        }
    }

    /// The SVG document placed on the clipboard, with every referenced
    /// definition inlined under `<defs>`.
    pub fn clipboard_document(&self, defs: &SvgDefs) -> String {
        match self {
            Self::Standard(_) => {
                let style = self.inline_style();
                format!(
                    r#"{XML_HEADER}<svg><defs>{}</defs><inkscape:clipboard style="{style}"/></svg>"#,
                    defs.resolve(&style)
                )
            }
            Self::Custom(markup) => format!(
                "{XML_HEADER}<svg><defs>{}</defs>{markup}</svg>",
                defs.resolve(markup)
            ),
        }
    }
}

/// Read access to the configured style of each wedge.
pub trait StyleLookup {
    fn get_style(&self, addr: WedgeAddress) -> Option<&StyleRecord>;

    fn has_style(&self, addr: WedgeAddress) -> bool {
        self.get_style(addr).is_some()
    }

    fn svg_defs(&self) -> &SvgDefs;

    /// Markup a button draws as its icon instead of a style swatch.
    fn custom_icon(&self, _addr: WedgeAddress) -> Option<&str> {
        None
    }
}

/// In-memory style source built from the button config.
#[derive(Debug, Clone, Default)]
pub struct StyleTable {
    styles: HashMap<WedgeAddress, StyleRecord>,
    icons: HashMap<WedgeAddress, String>,
    defs: SvgDefs,
}

impl StyleTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `false` and keeps the existing entry if `addr` is taken.
    pub fn insert(&mut self, addr: WedgeAddress, style: StyleRecord) -> bool {
        if self.styles.contains_key(&addr) {
            return false;
        }
        self.styles.insert(addr, style);
        true
    }

    pub fn with(mut self, addr: WedgeAddress, style: StyleRecord) -> Self {
        self.styles.insert(addr, style);
        self
    }

    pub fn set_icon(&mut self, addr: WedgeAddress, markup: impl Into<String>) {
        self.icons.insert(addr, markup.into());
    }

    pub fn with_icon(mut self, addr: WedgeAddress, markup: impl Into<String>) -> Self {
        self.set_icon(addr, markup);
        self
    }

    pub fn defs_mut(&mut self) -> &mut SvgDefs {
        &mut self.defs
    }

    pub fn len(&self) -> usize {
        self.styles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.styles.is_empty()
    }
}

impl StyleLookup for StyleTable {
    fn get_style(&self, addr: WedgeAddress) -> Option<&StyleRecord> {
        self.styles.get(&addr)
    }

    fn svg_defs(&self) -> &SvgDefs {
        &self.defs
    }

    fn custom_icon(&self, addr: WedgeAddress) -> Option<&str> {
        self.icons.get(&addr).map(String::as_str)
    }
}

static URL_REF: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"\burl\(['"]?#([^'")]+)['"]?\)"#).expect("static regex")
});
static HREF_REF: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"\bxlink:href=['"]?#([^'"\s>]+)['"]?"#).expect("static regex")
});

/// Shared `<defs>` bodies (gradients, markers, patterns) keyed by id.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SvgDefs {
    defs: BTreeMap<String, String>,
}

impl SvgDefs {
    /// Returns `false` if `id` is already defined.
    pub fn insert(&mut self, id: impl Into<String>, body: impl Into<String>) -> bool {
        let id = id.into();
        if self.defs.contains_key(&id) {
            return false;
        }
        self.defs.insert(id, body.into());
        true
    }

    pub fn contains(&self, id: &str) -> bool {
        self.defs.contains_key(id)
    }

    /// Ids referenced through `url(#id)` in `style`.
    pub fn referenced_ids(style: &str) -> Vec<String> {
        URL_REF
            .captures_iter(style)
            .map(|c| c[1].to_string())
            .collect()
    }

    /// Concatenated bodies of every def `style` needs, following references
    /// between defs. Each def appears once; unknown ids are skipped.
    pub fn resolve(&self, style: &str) -> String {
        let mut pending = Self::referenced_ids(style);
        let mut added = BTreeSet::new();
        let mut out = String::new();

        while let Some(id) = pending.pop() {
            let Some(body) = self.defs.get(&id) else {
                continue;
            };
            if !added.insert(id) {
                continue;
            }
            out.push_str(body);
            for re in [&*URL_REF, &*HREF_REF] {
                pending.extend(
                    re.captures_iter(body)
                        .map(|c| c[1].to_string())
                        .filter(|id| !added.contains(id)),
                );
            }
        }
        out
    }
}

/// Folds the styles of `addrs`, in order, into one descriptor.
///
/// Standard styles merge key by key with later values winning. The first
/// custom style discards everything merged so far and switches the fold to
/// custom mode for good: later custom styles replace it wholesale and later
/// standard styles are ignored.
pub fn compose<L>(addrs: impl IntoIterator<Item = WedgeAddress>, lookup: &L) -> StyleRecord
where
    L: StyleLookup + ?Sized,
{
    let mut standard_mode = true;
    let mut standard = StyleMap::new();
    let mut custom = String::new();

    for addr in addrs {
        match lookup.get_style(addr) {
            Some(StyleRecord::Standard(styles)) if standard_mode => {
                standard.extend(styles.iter().map(|(k, v)| (*k, v.clone())));
            }
            Some(StyleRecord::Custom(markup)) => {
                custom.clone_from(markup);
                standard_mode = false;
            }
            Some(StyleRecord::Standard(_)) | None => {}
        }
    }

    if standard_mode {
        StyleRecord::Standard(standard)
    } else {
        StyleRecord::Custom(custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    const A: WedgeAddress = WedgeAddress::encode(0, 0, 1, 0);
    const B: WedgeAddress = WedgeAddress::encode(0, 1, 1, 0);
    const C: WedgeAddress = WedgeAddress::encode(0, 2, 1, 0);
    const D: WedgeAddress = WedgeAddress::encode(0, 3, 1, 0);
    const UNSTYLED: WedgeAddress = WedgeAddress::encode(0, 4, 2, 4);

    fn table() -> StyleTable {
        StyleTable::new()
            .with(A, StyleRecord::standard([(StyleKey::Fill, "red")]))
            .with(
                B,
                StyleRecord::standard([(StyleKey::Fill, "blue"), (StyleKey::Stroke, "black")]),
            )
            .with(C, StyleRecord::custom("<svg>custom</svg>"))
            .with(D, StyleRecord::custom("<svg>other</svg>"))
    }

    #[test]
    fn test_compose_empty_is_placeholder() {
        let composed = compose([], &table());
        assert_eq!(composed, StyleRecord::default());
        assert!(composed.is_empty());
    }

    #[test]
    fn test_compose_single_standard() {
        assert_eq!(
            compose([A], &table()),
            StyleRecord::standard([(StyleKey::Fill, "red")])
        );
    }

    #[test]
    fn test_compose_later_standard_key_wins() {
        assert_eq!(
            compose([A, B], &table()),
            StyleRecord::standard([(StyleKey::Fill, "blue"), (StyleKey::Stroke, "black")])
        );
        assert_eq!(
            compose([B, A], &table()),
            StyleRecord::standard([(StyleKey::Fill, "red"), (StyleKey::Stroke, "black")])
        );
    }

    #[test]
    fn test_compose_custom_discards_prior_standards() {
        assert_eq!(
            compose([A, C], &table()),
            StyleRecord::custom("<svg>custom</svg>")
        );
    }

    #[test]
    fn test_compose_custom_first_locks_out_standards() {
        assert_eq!(
            compose([C, A, B], &table()),
            StyleRecord::custom("<svg>custom</svg>")
        );
    }

    #[test]
    fn test_compose_later_custom_replaces_earlier() {
        assert_eq!(
            compose([C, A, D], &table()),
            StyleRecord::custom("<svg>other</svg>")
        );
    }

    #[test]
    fn test_compose_skips_unstyled_wedges() {
        assert_eq!(
            compose([UNSTYLED, A, UNSTYLED], &table()),
            StyleRecord::standard([(StyleKey::Fill, "red")])
        );
    }

    #[test]
    fn test_style_key_names() {
        assert_eq!(StyleKey::StrokeDasharray.to_string(), "stroke-dasharray");
        assert_eq!(StyleKey::from_str("marker-end"), Ok(StyleKey::MarkerEnd));
        assert!(StyleKey::from_str("opacity").is_err());
    }

    #[test]
    fn test_standard_document_uses_canonical_order() {
        let style = StyleRecord::standard([
            (StyleKey::FontSize, "12px"),
            (StyleKey::Fill, "none"),
            (StyleKey::Stroke, "#000"),
        ]);
        assert_eq!(
            style.clipboard_document(&SvgDefs::default()),
            r#"<?xml version="1.0" encoding="UTF-8"?><svg><defs></defs><inkscape:clipboard style="stroke:#000;fill:none;font-size:12px"/></svg>"#
        );
    }

    #[test]
    fn test_document_inlines_referenced_defs_once() {
        let mut defs = SvgDefs::default();
        defs.insert("grad", r##"<linearGradient id="grad" xlink:href="#stops"/>"##);
        defs.insert("stops", r#"<linearGradient id="stops"><stop offset="0"/></linearGradient>"#);
        defs.insert("unused", r#"<marker id="unused"/>"#);

        let style = StyleRecord::standard([
            (StyleKey::Fill, "url(#grad)"),
            (StyleKey::Stroke, "url('#grad')"),
            (StyleKey::MarkerEnd, "url(#missing)"),
        ]);
        let doc = style.clipboard_document(&defs);

        assert_eq!(doc.matches(r#"id="grad""#).count(), 1);
        assert_eq!(doc.matches(r#"id="stops""#).count(), 1);
        assert!(!doc.contains("unused"));
    }

    #[test]
    fn test_custom_document_wraps_markup() {
        let style = StyleRecord::custom(r#"<rect style="fill:url(#p)"/>"#);
        let mut defs = SvgDefs::default();
        defs.insert("p", r#"<pattern id="p"/>"#);
        assert_eq!(
            style.clipboard_document(&defs),
            r#"<?xml version="1.0" encoding="UTF-8"?><svg><defs><pattern id="p"/></defs><rect style="fill:url(#p)"/></svg>"#
        );
    }
}
