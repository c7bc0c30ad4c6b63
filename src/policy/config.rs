//! Sanitizer configuration
//!
//! `Config` is immutable once built and safe to share between threads. It is
//! assembled through `ConfigBuilder`, which validates every name once.

use crate::css::schema::CssSchema;
use crate::css::CssSanitizer;
use crate::error::{ConfigError, Result};
use crate::policy::url::{protocol_set, DEFAULT_PROTOCOLS};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tracing::debug;

/// Elements allowed by the default allow-list
pub const DEFAULT_ELEMENTS: &[&str] = &[
    "a", "abbr", "acronym", "address", "area", "article", "aside", "audio", "b", "bdi", "bdo",
    "big", "blockquote", "br", "caption", "center", "cite", "code", "col", "colgroup", "dd",
    "del", "details", "dfn", "dir", "div", "dl", "dt", "em", "figcaption", "figure", "font",
    "footer", "h1", "h2", "h3", "h4", "h5", "h6", "header", "hgroup", "hr", "i", "img", "ins",
    "kbd", "li", "map", "mark", "nav", "ol", "p", "pre", "q", "rp", "rt", "ruby", "s", "samp",
    "section", "small", "span", "strike", "strong", "sub", "summary", "sup", "table", "tbody",
    "td", "tfoot", "th", "thead", "time", "tr", "tt", "u", "ul", "var", "video",
];

/// Attributes allowed on every element by the default allow-list
pub const DEFAULT_ATTRIBUTES: &[&str] = &[
    "abbr", "alt", "cite", "class", "datetime", "height", "href", "lang", "name", "poster", "src",
    "title", "width", "xml:lang",
];

/// Attributes whose value is a URL and must pass the protocol check
pub const URL_ATTRIBUTES: &[&str] = &[
    "action", "background", "cite", "codebase", "data", "dynsrc", "formaction", "href", "icon",
    "longdesc", "lowsrc", "manifest", "poster", "profile", "src", "usemap", "xlink:href",
];

/// Default nesting bound
pub const DEFAULT_MAX_DEPTH: usize = 256;

/// Resolved sanitizer configuration
#[derive(Debug, Clone)]
pub struct Config {
    elements: HashSet<String>,
    attributes: HashSet<String>,
    element_attributes: HashMap<String, HashSet<String>>,
    url_attributes: HashSet<String>,
    protocols: HashSet<String>,
    allow_styling: bool,
    add_rel_nofollow: bool,
    skip_empty_tags_if_useless: bool,
    css: CssSanitizer,
    max_depth: usize,
}

impl Default for Config {
    fn default() -> Self {
        Config::allow_list()
    }
}

impl Config {
    /// Start from the default allow-list
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::default()
    }

    /// Default allow-list configuration
    pub fn allow_list() -> Config {
        ConfigBuilder::default().assemble()
    }

    /// Nothing allowed: every tag is stripped and only text remains
    pub fn strip_all() -> Config {
        ConfigBuilder::empty().assemble()
    }

    /// Default allow-list without anchors
    pub fn no_links() -> Config {
        ConfigBuilder::default().disallow_elements(["a"]).assemble()
    }

    #[inline]
    pub fn allows_element(&self, name: &str) -> bool {
        self.elements.contains(name)
    }

    /// Check an attribute against the global and per-element allow-lists
    #[inline]
    pub fn allows_attribute(&self, element: &str, name: &str) -> bool {
        self.attributes.contains(name)
            || self
                .element_attributes
                .get(element)
                .is_some_and(|set| set.contains(name))
    }

    #[inline]
    pub fn is_url_attribute(&self, name: &str) -> bool {
        self.url_attributes.contains(name)
    }

    pub fn protocols(&self) -> &HashSet<String> {
        &self.protocols
    }

    pub fn allow_styling(&self) -> bool {
        self.allow_styling
    }

    pub fn add_rel_nofollow(&self) -> bool {
        self.add_rel_nofollow
    }

    pub fn skip_empty_tags_if_useless(&self) -> bool {
        self.skip_empty_tags_if_useless
    }

    pub fn css(&self) -> &CssSanitizer {
        &self.css
    }

    pub fn max_depth(&self) -> usize {
        self.max_depth
    }

    /// True when no element can ever be rendered
    pub fn strips_everything(&self) -> bool {
        self.elements.is_empty()
    }
}

/// Builder for `Config`
#[derive(Debug, Clone)]
pub struct ConfigBuilder {
    elements: HashSet<String>,
    attributes: HashSet<String>,
    element_attributes: HashMap<String, HashSet<String>>,
    url_attributes: HashSet<String>,
    protocols: HashSet<String>,
    allow_styling: bool,
    add_rel_nofollow: bool,
    skip_empty_tags_if_useless: bool,
    css_schema: Arc<CssSchema>,
    max_depth: usize,
}

impl Default for ConfigBuilder {
    /// The default allow-list
    fn default() -> Self {
        ConfigBuilder {
            elements: names(DEFAULT_ELEMENTS),
            attributes: names(DEFAULT_ATTRIBUTES),
            element_attributes: HashMap::new(),
            url_attributes: names(URL_ATTRIBUTES),
            protocols: protocol_set(DEFAULT_PROTOCOLS),
            allow_styling: true,
            add_rel_nofollow: false,
            skip_empty_tags_if_useless: false,
            css_schema: CssSchema::default_schema(),
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

fn names<I, S>(items: I) -> HashSet<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    items
        .into_iter()
        .map(|s| s.as_ref().to_ascii_lowercase())
        .collect()
}

impl ConfigBuilder {
    /// Empty allow-lists, styling off
    pub fn empty() -> Self {
        ConfigBuilder {
            elements: HashSet::new(),
            attributes: HashSet::new(),
            allow_styling: false,
            ..Default::default()
        }
    }

    /// Replace the allowed elements
    pub fn elements<I, S>(mut self, elements: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.elements = names(elements);
        self
    }

    /// Add allowed elements
    pub fn allow_elements<I, S>(mut self, elements: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.elements.extend(names(elements));
        self
    }

    /// Remove elements from the allow-list
    pub fn disallow_elements<I, S>(mut self, elements: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for name in names(elements) {
            self.elements.remove(&name);
        }
        self
    }

    /// Replace the globally allowed attributes
    pub fn attributes<I, S>(mut self, attributes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.attributes = names(attributes);
        self
    }

    /// Add globally allowed attributes
    pub fn allow_attributes<I, S>(mut self, attributes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.attributes.extend(names(attributes));
        self
    }

    /// Allow attributes on one element only
    pub fn element_attributes<I, S>(mut self, element: &str, attributes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.element_attributes
            .entry(element.to_ascii_lowercase())
            .or_default()
            .extend(names(attributes));
        self
    }

    /// Replace the URL-bearing attribute names
    pub fn url_attributes<I, S>(mut self, attributes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.url_attributes = names(attributes);
        self
    }

    /// Replace the allowed URL schemes
    pub fn protocols<I, S>(mut self, protocols: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.protocols = protocol_set(protocols);
        self
    }

    pub fn allow_styling(mut self, allow: bool) -> Self {
        self.allow_styling = allow;
        self
    }

    pub fn add_rel_nofollow(mut self, add: bool) -> Self {
        self.add_rel_nofollow = add;
        self
    }

    pub fn skip_empty_tags_if_useless(mut self, skip: bool) -> Self {
        self.skip_empty_tags_if_useless = skip;
        self
    }

    pub fn css_schema(mut self, schema: Arc<CssSchema>) -> Self {
        self.css_schema = schema;
        self
    }

    pub fn max_depth(mut self, depth: usize) -> Self {
        self.max_depth = depth;
        self
    }

    /// Validate every name and produce the configuration
    pub fn build(self) -> Result<Config> {
        for name in &self.elements {
            check_name("element", name)?;
        }
        let per_element = self
            .element_attributes
            .iter()
            .flat_map(|(element, attrs)| std::iter::once(element).chain(attrs.iter()));
        for name in self.attributes.iter().chain(&self.url_attributes).chain(per_element) {
            check_name("attribute", name)?;
        }
        for scheme in &self.protocols {
            check_scheme(scheme)?;
        }
        Ok(self.assemble())
    }

    fn assemble(self) -> Config {
        debug!(
            elements = self.elements.len(),
            attributes = self.attributes.len(),
            allow_styling = self.allow_styling,
            add_rel_nofollow = self.add_rel_nofollow,
            skip_empty_tags_if_useless = self.skip_empty_tags_if_useless,
            "sanitizer config built"
        );
        let css = CssSanitizer::new(self.css_schema).with_protocols(self.protocols.clone());
        Config {
            elements: self.elements,
            attributes: self.attributes,
            element_attributes: self.element_attributes,
            url_attributes: self.url_attributes,
            protocols: self.protocols,
            allow_styling: self.allow_styling,
            add_rel_nofollow: self.add_rel_nofollow,
            skip_empty_tags_if_useless: self.skip_empty_tags_if_useless,
            css,
            max_depth: self.max_depth,
        }
    }
}

/// Names end up verbatim in the output, so they may not contain anything
/// that could break out of a tag
fn check_name(kind: &'static str, name: &str) -> Result<()> {
    let valid = !name.is_empty()
        && !name.chars().any(|c| {
            c.is_whitespace()
                || c.is_control()
                || matches!(c, '"' | '\'' | '<' | '>' | '/' | '=' | '`')
        });
    if valid {
        Ok(())
    } else {
        Err(ConfigError::InvalidName {
            kind,
            name: name.to_string(),
        })
    }
}

fn check_scheme(scheme: &str) -> Result<()> {
    let valid = scheme.chars().next().is_some_and(|c| c.is_ascii_alphabetic())
        && scheme
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'));
    if valid {
        Ok(())
    } else {
        Err(ConfigError::InvalidName {
            kind: "protocol",
            name: scheme.to_string(),
        })
    }
}
