//! Sanitizer flavors
//!
//! One engine, three stock configurations:
//! - `StripAll`: every tag removed, text kept and escaped
//! - `AllowList`: the default allow-list (or the caller's `tags`/`attributes`)
//! - `NoLinks`: the allow-list without anchors

use crate::core::entities::decode_html;
use crate::error::Result;
use crate::options::SanitizeOptions;
use crate::policy::config::Config;
use std::borrow::Cow;
use tracing::debug;

/// Which stock configuration a sanitizer starts from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Flavor {
    StripAll,
    AllowList,
    NoLinks,
}

/// A resolved configuration plus the flavor-level output options
#[derive(Debug, Clone)]
pub struct Sanitizer {
    flavor: Flavor,
    config: Config,
    encode_special_chars: bool,
}

impl Sanitizer {
    pub fn strip_all() -> Self {
        Sanitizer::new(Flavor::StripAll, Config::strip_all())
    }

    pub fn allow_list() -> Self {
        Sanitizer::new(Flavor::AllowList, Config::allow_list())
    }

    pub fn no_links() -> Self {
        Sanitizer::new(Flavor::NoLinks, Config::no_links())
    }

    /// Wrap an already built configuration
    pub fn new(flavor: Flavor, config: Config) -> Self {
        Sanitizer {
            flavor,
            config,
            encode_special_chars: true,
        }
    }

    /// Resolve per-call options for a flavor
    pub fn from_options(flavor: Flavor, options: &SanitizeOptions) -> Result<Self> {
        let config = options.resolve(flavor)?;
        debug!(?flavor, "sanitizer built from options");
        Ok(Sanitizer {
            flavor,
            config,
            encode_special_chars: options.encode_special_chars,
        })
    }

    pub fn flavor(&self) -> Flavor {
        self.flavor
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Sanitize a fragment. Blank input is returned as is.
    pub fn sanitize<'a>(&self, html: &'a str) -> Cow<'a, str> {
        if html.trim().is_empty() {
            return Cow::Borrowed(html);
        }
        debug!(flavor = ?self.flavor, len = html.len(), "sanitizing");

        let out = crate::sanitize(html, &self.config);
        if self.flavor == Flavor::StripAll && !self.encode_special_chars {
            if let Cow::Owned(decoded) = decode_html(&out) {
                return Cow::Owned(decoded);
            }
        }
        out
    }

    /// Filter a standalone style value with this sanitizer's CSS rules
    pub fn sanitize_css(&self, style: &str) -> String {
        self.config.css().sanitize(style)
    }
}

impl Default for Sanitizer {
    fn default() -> Self {
        Sanitizer::allow_list()
    }
}
