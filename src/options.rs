//! Per-call options
//!
//! `SanitizeOptions` is what a caller passes at the boundary, typically
//! decoded from JSON. It is validated and resolved into a `Config` before any
//! input is touched.

use crate::error::{ConfigError, Result};
use crate::policy::config::{Config, ConfigBuilder};
use crate::sanitizer::Flavor;
use serde::Deserialize;
use serde_json::Value;

/// Options recognized by `Sanitizer::from_options`
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct SanitizeOptions {
    /// Overrides the allowed elements
    pub tags: Option<Vec<String>>,
    /// Overrides the globally allowed attributes
    pub attributes: Option<Vec<String>>,
    pub add_rel_nofollow: bool,
    pub skip_empty_tags_if_useless: bool,
    pub allow_styling: bool,
    /// Strip-all flavor only: false decodes the escaped output again
    pub encode_special_chars: bool,
}

impl Default for SanitizeOptions {
    fn default() -> Self {
        SanitizeOptions {
            tags: None,
            attributes: None,
            add_rel_nofollow: false,
            skip_empty_tags_if_useless: false,
            allow_styling: true,
            encode_special_chars: true,
        }
    }
}

impl SanitizeOptions {
    /// Decode options from a JSON object.
    ///
    /// `tags` and `attributes`, when present and not null, must be arrays.
    pub fn from_json(json: &str) -> Result<Self> {
        let value: Value = serde_json::from_str(json)?;
        for key in ["tags", "attributes"] {
            match value.get(key) {
                None | Some(Value::Null) | Some(Value::Array(_)) => {}
                Some(_) => return Err(ConfigError::NotEnumerable(key)),
            }
        }
        Ok(serde_json::from_value(value)?)
    }

    pub fn tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags = Some(tags.into_iter().map(Into::into).collect());
        self
    }

    pub fn attributes<I, S>(mut self, attributes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.attributes = Some(attributes.into_iter().map(Into::into).collect());
        self
    }

    /// Build the configuration for a flavor
    pub fn resolve(&self, flavor: Flavor) -> Result<Config> {
        if flavor == Flavor::StripAll {
            return Ok(Config::strip_all());
        }

        let mut builder = ConfigBuilder::default()
            .add_rel_nofollow(self.add_rel_nofollow)
            .skip_empty_tags_if_useless(self.skip_empty_tags_if_useless)
            .allow_styling(self.allow_styling);
        if let Some(tags) = &self.tags {
            builder = builder.elements(tags);
        }
        if let Some(attributes) = &self.attributes {
            builder = builder.attributes(attributes);
        }
        if flavor == Flavor::NoLinks {
            builder = builder.disallow_elements(["a"]);
        }
        builder.build()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let options = SanitizeOptions::from_json("{}").unwrap();
        assert_eq!(options, SanitizeOptions::default());
        assert!(options.allow_styling);
        assert!(options.encode_special_chars);
    }

    #[test]
    fn test_from_json() {
        let options = SanitizeOptions::from_json(
            r#"{"tags": ["u"], "add_rel_nofollow": true, "allow_styling": false}"#,
        )
        .unwrap();
        assert_eq!(options.tags, Some(vec!["u".to_string()]));
        assert!(options.add_rel_nofollow);
        assert!(!options.allow_styling);
    }

    #[test]
    fn test_tags_must_be_enumerable() {
        let err = SanitizeOptions::from_json(r#"{"tags": "foo"}"#).unwrap_err();
        assert!(matches!(err, ConfigError::NotEnumerable("tags")));
        assert_eq!(err.to_string(), "tags must be enumerable");

        let err = SanitizeOptions::from_json(r#"{"attributes": 1}"#).unwrap_err();
        assert!(matches!(err, ConfigError::NotEnumerable("attributes")));
    }

    #[test]
    fn test_malformed_json() {
        let err = SanitizeOptions::from_json("{").unwrap_err();
        assert!(matches!(err, ConfigError::Options(_)));
    }

    #[test]
    fn test_resolve() {
        let config = SanitizeOptions::default()
            .tags(["u"])
            .resolve(Flavor::AllowList)
            .unwrap();
        assert!(config.allows_element("u"));
        assert!(!config.allows_element("a"));

        let config = SanitizeOptions::default().resolve(Flavor::NoLinks).unwrap();
        assert!(!config.allows_element("a"));
        assert!(config.allows_element("b"));

        let config = SanitizeOptions::default().resolve(Flavor::StripAll).unwrap();
        assert!(config.strips_everything());
    }
}
