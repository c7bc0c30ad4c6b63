//! Property allow-list for style attributes
//!
//! Each allowed property carries a `PropertyRule`: the keywords it accepts,
//! which kinds of non-keyword value it accepts, and which functions may
//! appear in it.

use std::collections::{HashMap, HashSet};
use std::ops::BitOr;
use std::sync::{Arc, LazyLock};

/// Value kinds a property accepts beyond its keywords
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PropertyFlags(u8);

impl PropertyFlags {
    pub const NONE: PropertyFlags = PropertyFlags(0);
    /// Numbers, lengths and percentages
    pub const QUANTITY: PropertyFlags = PropertyFlags(1);
    /// Quantities may be negative
    pub const NEGATIVE: PropertyFlags = PropertyFlags(1 << 1);
    /// `#rgb`, `#rgba`, `#rrggbb`, `#rrggbbaa`
    pub const HASH_COLOR: PropertyFlags = PropertyFlags(1 << 2);
    /// Quoted strings
    pub const STRING: PropertyFlags = PropertyFlags(1 << 3);
    /// Words that are not keywords, e.g. font family names
    pub const UNRESERVED_WORD: PropertyFlags = PropertyFlags(1 << 4);
    /// `url(...)` with an allowed scheme
    pub const URL: PropertyFlags = PropertyFlags(1 << 5);

    #[inline]
    pub fn contains(self, other: PropertyFlags) -> bool {
        self.0 & other.0 == other.0
    }
}

impl BitOr for PropertyFlags {
    type Output = PropertyFlags;

    fn bitor(self, rhs: PropertyFlags) -> PropertyFlags {
        PropertyFlags(self.0 | rhs.0)
    }
}

/// What one property accepts
#[derive(Debug, Clone, Default)]
pub struct PropertyRule {
    pub flags: PropertyFlags,
    pub keywords: HashSet<String>,
    pub functions: HashSet<String>,
}

impl PropertyRule {
    pub fn new(flags: PropertyFlags) -> Self {
        PropertyRule {
            flags,
            ..Default::default()
        }
    }

    /// Add accepted keywords (stored lowercased)
    pub fn keywords(mut self, words: &[&str]) -> Self {
        self.keywords
            .extend(words.iter().map(|w| w.to_ascii_lowercase()));
        self
    }

    /// Add accepted function names (stored lowercased)
    pub fn functions(mut self, names: &[&str]) -> Self {
        self.functions
            .extend(names.iter().map(|n| n.to_ascii_lowercase()));
        self
    }

    #[inline]
    pub fn allows_keyword(&self, word: &str) -> bool {
        self.keywords.contains(word) || GLOBAL_KEYWORDS.contains(&word)
    }
}

/// Keywords every property accepts
pub const GLOBAL_KEYWORDS: &[&str] = &["inherit", "initial"];

/// Units a quantity may carry
pub const UNITS: &[&str] = &[
    "", "%", "px", "em", "ex", "rem", "ch", "vw", "vh", "vmin", "vmax", "cm", "mm", "in", "pt",
    "pc", "q", "deg", "rad", "grad", "turn", "s", "ms",
];

/// Map from property name to its rule
#[derive(Debug, Clone, Default)]
pub struct CssSchema {
    properties: HashMap<String, PropertyRule>,
}

impl CssSchema {
    /// Empty schema: every property is rejected
    pub fn new() -> Self {
        Self::default()
    }

    /// Allow a property under the given rule
    pub fn with_property(mut self, name: &str, rule: PropertyRule) -> Self {
        self.properties.insert(name.to_ascii_lowercase(), rule);
        self
    }

    /// Look up the rule for a lowercased property name
    #[inline]
    pub fn get(&self, name: &str) -> Option<&PropertyRule> {
        self.properties.get(name)
    }

    pub fn len(&self) -> usize {
        self.properties.len()
    }

    pub fn is_empty(&self) -> bool {
        self.properties.is_empty()
    }

    /// Shared handle to the built-in schema
    pub fn default_schema() -> Arc<CssSchema> {
        Arc::clone(&DEFAULT_SCHEMA)
    }
}

static DEFAULT_SCHEMA: LazyLock<Arc<CssSchema>> = LazyLock::new(|| Arc::new(build_default()));

const COLOR_NAMES: &[&str] = &[
    "aqua", "black", "blue", "fuchsia", "gray", "grey", "green", "lime", "maroon", "navy",
    "olive", "orange", "purple", "red", "silver", "teal", "white", "yellow", "transparent",
    "currentcolor",
];
const COLOR_FUNCTIONS: &[&str] = &["rgb", "rgba", "hsl", "hsla"];
const BORDER_STYLES: &[&str] = &[
    "none", "hidden", "dotted", "dashed", "solid", "double", "groove", "ridge", "inset", "outset",
];
const BORDER_WIDTHS: &[&str] = &["thin", "medium", "thick"];
const LIST_STYLE_TYPES: &[&str] = &[
    "disc", "circle", "square", "decimal", "decimal-leading-zero", "lower-roman",
    "upper-roman", "lower-alpha", "upper-alpha", "lower-latin", "upper-latin", "lower-greek",
    "armenian", "georgian", "none",
];
const FONT_FAMILIES: &[&str] = &["serif", "sans-serif", "monospace", "cursive", "fantasy"];
const FONT_SIZES: &[&str] = &[
    "xx-small", "x-small", "small", "medium", "large", "x-large", "xx-large", "smaller",
    "larger",
];
const FONT_STYLES: &[&str] = &["normal", "italic", "oblique"];
const FONT_VARIANTS: &[&str] = &["normal", "small-caps"];
const FONT_WEIGHTS: &[&str] = &["normal", "bold", "bolder", "lighter"];
const OVERFLOW: &[&str] = &["visible", "hidden", "scroll", "auto"];

fn color_rule() -> PropertyRule {
    PropertyRule::new(PropertyFlags::HASH_COLOR)
        .keywords(COLOR_NAMES)
        .functions(COLOR_FUNCTIONS)
}

fn size_rule(extra: &[&str]) -> PropertyRule {
    PropertyRule::new(PropertyFlags::QUANTITY).keywords(extra)
}

fn build_default() -> CssSchema {
    let q = PropertyFlags::QUANTITY;
    let qn = PropertyFlags::QUANTITY | PropertyFlags::NEGATIVE;
    let mut schema = CssSchema::new()
        .with_property("color", color_rule())
        .with_property("background-color", color_rule())
        .with_property(
            "background-repeat",
            PropertyRule::new(PropertyFlags::NONE)
                .keywords(&["repeat", "repeat-x", "repeat-y", "no-repeat", "space", "round"]),
        )
        .with_property(
            "background-attachment",
            PropertyRule::new(PropertyFlags::NONE).keywords(&["scroll", "fixed", "local"]),
        )
        .with_property(
            "background-position",
            PropertyRule::new(qn).keywords(&["left", "right", "top", "bottom", "center"]),
        )
        .with_property(
            "border-collapse",
            PropertyRule::new(PropertyFlags::NONE).keywords(&["collapse", "separate"]),
        )
        .with_property("border-spacing", PropertyRule::new(q))
        .with_property(
            "caption-side",
            PropertyRule::new(PropertyFlags::NONE).keywords(&["top", "bottom"]),
        )
        .with_property(
            "clear",
            PropertyRule::new(PropertyFlags::NONE).keywords(&["none", "left", "right", "both"]),
        )
        .with_property(
            "float",
            PropertyRule::new(PropertyFlags::NONE).keywords(&["none", "left", "right"]),
        )
        .with_property(
            "direction",
            PropertyRule::new(PropertyFlags::NONE).keywords(&["ltr", "rtl"]),
        )
        .with_property(
            "empty-cells",
            PropertyRule::new(PropertyFlags::NONE).keywords(&["show", "hide"]),
        )
        .with_property(
            "font-family",
            PropertyRule::new(PropertyFlags::STRING | PropertyFlags::UNRESERVED_WORD)
                .keywords(FONT_FAMILIES),
        )
        .with_property("font-size", size_rule(FONT_SIZES))
        .with_property(
            "font-style",
            PropertyRule::new(PropertyFlags::NONE).keywords(FONT_STYLES),
        )
        .with_property(
            "font-variant",
            PropertyRule::new(PropertyFlags::NONE).keywords(FONT_VARIANTS),
        )
        .with_property("font-weight", size_rule(FONT_WEIGHTS))
        .with_property(
            "font",
            PropertyRule::new(q | PropertyFlags::STRING | PropertyFlags::UNRESERVED_WORD)
                .keywords(FONT_FAMILIES)
                .keywords(FONT_SIZES)
                .keywords(FONT_STYLES)
                .keywords(FONT_VARIANTS)
                .keywords(FONT_WEIGHTS),
        )
        .with_property("letter-spacing", PropertyRule::new(qn).keywords(&["normal"]))
        .with_property("word-spacing", PropertyRule::new(qn).keywords(&["normal"]))
        .with_property("line-height", size_rule(&["normal"]))
        .with_property(
            "list-style-type",
            PropertyRule::new(PropertyFlags::NONE).keywords(LIST_STYLE_TYPES),
        )
        .with_property(
            "list-style-position",
            PropertyRule::new(PropertyFlags::NONE).keywords(&["inside", "outside"]),
        )
        .with_property(
            "list-style",
            PropertyRule::new(PropertyFlags::NONE)
                .keywords(LIST_STYLE_TYPES)
                .keywords(&["inside", "outside"]),
        )
        .with_property("overflow", PropertyRule::new(PropertyFlags::NONE).keywords(OVERFLOW))
        .with_property("overflow-x", PropertyRule::new(PropertyFlags::NONE).keywords(OVERFLOW))
        .with_property("overflow-y", PropertyRule::new(PropertyFlags::NONE).keywords(OVERFLOW))
        .with_property(
            "table-layout",
            PropertyRule::new(PropertyFlags::NONE).keywords(&["auto", "fixed"]),
        )
        .with_property(
            "text-align",
            PropertyRule::new(PropertyFlags::NONE)
                .keywords(&["left", "right", "center", "justify", "start", "end"]),
        )
        .with_property(
            "text-decoration",
            PropertyRule::new(PropertyFlags::HASH_COLOR)
                .keywords(&["none", "underline", "overline", "line-through", "blink"])
                .keywords(COLOR_NAMES)
                .functions(COLOR_FUNCTIONS),
        )
        .with_property("text-indent", PropertyRule::new(qn))
        .with_property(
            "text-transform",
            PropertyRule::new(PropertyFlags::NONE)
                .keywords(&["none", "capitalize", "uppercase", "lowercase"]),
        )
        .with_property(
            "unicode-bidi",
            PropertyRule::new(PropertyFlags::NONE)
                .keywords(&["normal", "embed", "bidi-override", "isolate"]),
        )
        .with_property(
            "vertical-align",
            PropertyRule::new(qn).keywords(&[
                "baseline", "sub", "super", "top", "text-top", "middle", "bottom", "text-bottom",
            ]),
        )
        .with_property(
            "white-space",
            PropertyRule::new(PropertyFlags::NONE)
                .keywords(&["normal", "pre", "nowrap", "pre-wrap", "pre-line"]),
        )
        .with_property(
            "visibility",
            PropertyRule::new(PropertyFlags::NONE).keywords(&["visible", "hidden", "collapse"]),
        );

    for name in ["width", "height", "min-width", "min-height"] {
        schema = schema.with_property(name, size_rule(&["auto"]));
    }
    for name in ["max-width", "max-height"] {
        schema = schema.with_property(name, size_rule(&["none"]));
    }

    for side in ["", "-top", "-right", "-bottom", "-left"] {
        schema = schema
            .with_property(&format!("margin{side}"), PropertyRule::new(qn).keywords(&["auto"]))
            .with_property(&format!("padding{side}"), PropertyRule::new(q))
            .with_property(
                &format!("border{side}"),
                PropertyRule::new(q | PropertyFlags::HASH_COLOR)
                    .keywords(BORDER_STYLES)
                    .keywords(BORDER_WIDTHS)
                    .keywords(COLOR_NAMES)
                    .functions(COLOR_FUNCTIONS),
            )
            .with_property(&format!("border{side}-color"), color_rule())
            .with_property(
                &format!("border{side}-style"),
                PropertyRule::new(PropertyFlags::NONE).keywords(BORDER_STYLES),
            )
            .with_property(
                &format!("border{side}-width"),
                PropertyRule::new(q).keywords(BORDER_WIDTHS),
            );
    }

    for corner in ["", "-top-left", "-top-right", "-bottom-right", "-bottom-left"] {
        schema = schema.with_property(&format!("border{corner}-radius"), PropertyRule::new(q));
    }

    schema = schema
        .with_property(
            "outline",
            PropertyRule::new(q | PropertyFlags::HASH_COLOR)
                .keywords(BORDER_STYLES)
                .keywords(BORDER_WIDTHS)
                .keywords(COLOR_NAMES)
                .functions(COLOR_FUNCTIONS),
        )
        .with_property("outline-color", color_rule())
        .with_property(
            "outline-style",
            PropertyRule::new(PropertyFlags::NONE).keywords(BORDER_STYLES),
        )
        .with_property("outline-width", PropertyRule::new(q).keywords(BORDER_WIDTHS));

    schema
}
