//! Static element classification
//!
//! Independent of configuration: how an element's content is treated, which
//! list items a container expects, and which open elements a start tag
//! implicitly closes.

/// How an element holds content
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentModel {
    /// Never has content; always rendered self-closed
    Void,
    /// Holds elements but no text; closed when text arrives
    StrictNoText,
    /// Holds items; stray content is wrapped in an implicit item
    ListContainer,
    Normal,
}

const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "keygen", "link", "meta",
    "param", "source", "track", "wbr",
];

const STRICT_NO_TEXT_ELEMENTS: &[&str] = &[
    "audio", "colgroup", "datalist", "dir", "frameset", "optgroup", "select", "table", "tbody",
    "tfoot", "thead", "video",
];

/// Elements whose content is discarded along with them
const DROPPED_CONTENT_ELEMENTS: &[&str] = &[
    "script", "style", "title", "xmp", "iframe", "noembed", "noframes", "noscript",
];

/// Elements that are dropped when rendering would leave them bare
pub const SKIP_IF_EMPTY: &[&str] = &["a", "font", "img", "input", "span"];

/// Classify an element by name (lowercase)
pub fn content_model(name: &str) -> ContentModel {
    if VOID_ELEMENTS.contains(&name) {
        ContentModel::Void
    } else if STRICT_NO_TEXT_ELEMENTS.contains(&name) {
        ContentModel::StrictNoText
    } else if implicit_item(name).is_some() {
        ContentModel::ListContainer
    } else {
        ContentModel::Normal
    }
}

/// Item element a list container wraps stray content in
pub fn implicit_item(container: &str) -> Option<&'static str> {
    match container {
        "ol" | "ul" | "menu" => Some("li"),
        "dl" => Some("dd"),
        "tr" => Some("td"),
        _ => None,
    }
}

/// Whether `name` is an item of the list container
pub fn is_item_of(container: &str, name: &str) -> bool {
    match container {
        "ol" | "ul" | "menu" => name == "li",
        "dl" => matches!(name, "dd" | "dt"),
        "tr" => matches!(name, "td" | "th"),
        _ => false,
    }
}

/// Content of these elements never reaches the output
pub fn drops_content(name: &str) -> bool {
    DROPPED_CONTENT_ELEMENTS.contains(&name)
}

/// Open cells stop end tags other than their own (and `table`) from
/// closing elements outside them
pub fn is_scope_barrier(name: &str) -> bool {
    matches!(name, "td" | "th")
}

/// Whether a start tag for `incoming` ends the open element `open`
pub fn implies_end(open: &str, incoming: &str) -> bool {
    match open {
        "li" => incoming == "li",
        "dt" | "dd" => matches!(incoming, "dt" | "dd"),
        "tr" => incoming == "tr",
        "td" | "th" => matches!(incoming, "td" | "th" | "tr"),
        "p" => incoming == "p",
        _ => false,
    }
}
