//! Policy Engine
//!
//! Walks the token stream once, keeping a stack of open elements, and reports
//! what survives to an `EventSink`:
//! - disallowed tags vanish while their text is kept
//! - attributes are filtered against the allow-lists, URL attributes against
//!   the protocol list, `style` through the CSS filter
//! - content models are enforced (void, no-text, list containers)
//! - every element left open is closed at the end
//!
//! Work per token is bounded by the nesting depth, which is capped, so a run
//! is linear in the input.

use super::config::Config;
use super::content_model::{
    content_model, drops_content, implicit_item, implies_end, is_item_of, is_scope_barrier,
    ContentModel, SKIP_IF_EMPTY,
};
use super::url::is_allowed_url;
use crate::core::attributes::Attribute;
use crate::core::entities::decode_html;
use crate::core::tokenizer::Token;
use crate::serializer::{EventSink, OutputAttribute};
use std::borrow::Cow;
use std::collections::HashSet;
use tracing::trace;

/// An element on the open stack
#[derive(Debug)]
struct OpenElement<'a> {
    name: Cow<'a, str>,
    /// False for elements elided because they ended up bare
    rendered: bool,
    model: ContentModel,
}

/// Applies a `Config` to a token stream
#[derive(Debug, Clone, Copy)]
pub struct PolicyEngine<'c> {
    config: &'c Config,
}

impl<'c> PolicyEngine<'c> {
    pub fn new(config: &'c Config) -> Self {
        PolicyEngine { config }
    }

    /// Filter the tokens into the sink
    pub fn run<'a, I, S>(&self, tokens: I, sink: &mut S)
    where
        I: IntoIterator<Item = Token<'a>>,
        S: EventSink + ?Sized,
    {
        let mut run = Run {
            config: self.config,
            sink,
            stack: Vec::new(),
            suppress: None,
        };
        for token in tokens {
            run.token(token);
        }
        run.close_all();
    }
}

/// State of a single pass
struct Run<'c, 'a, 's, S: EventSink + ?Sized> {
    config: &'c Config,
    sink: &'s mut S,
    stack: Vec<OpenElement<'a>>,
    /// Inside an element whose content is dropped, until its end tag
    suppress: Option<Cow<'a, str>>,
}

impl<'c, 'a, 's, S: EventSink + ?Sized> Run<'c, 'a, 's, S> {
    fn token(&mut self, token: Token<'a>) {
        if let Some(suppressed) = &self.suppress {
            if let Token::EndTag { name } = &token {
                if name == suppressed {
                    self.suppress = None;
                }
            }
            return;
        }

        match token {
            Token::StartTag { name, attributes } => self.start_tag(name, &attributes, false),
            Token::SelfClosingTag { name, attributes } => self.start_tag(name, &attributes, true),
            Token::EndTag { name } => self.end_tag(&name),
            Token::Text(raw) => self.text(&decode_html(raw)),
            Token::CData(raw) => self.text(raw),
            Token::Comment(_) => {}
        }
    }

    fn start_tag(&mut self, name: Cow<'a, str>, attributes: &[Attribute<'a>], self_closing: bool) {
        if drops_content(&name) {
            trace!(element = %name, "dropping element with its content");
            self.suppress = Some(name);
            return;
        }
        if name == "plaintext" {
            // The tokenizer passes the rest of the input as raw data
            return;
        }
        if !self.config.allows_element(&name) {
            trace!(element = %name, "dropping disallowed element");
            return;
        }
        if self.stack.len() >= self.config.max_depth() {
            trace!(element = %name, depth = self.stack.len(), "dropping element beyond max depth");
            return;
        }

        while self
            .stack
            .last()
            .is_some_and(|open| implies_end(&open.name, &name))
        {
            self.pop();
        }
        self.wrap_in_implicit_item(Some(name.as_ref()));

        let model = content_model(&name);
        let attributes = self.filter_attributes(&name, attributes);
        let elide = self.config.skip_empty_tags_if_useless()
            && attributes.is_empty()
            && SKIP_IF_EMPTY.contains(&name.as_ref());

        if model == ContentModel::Void {
            if !elide {
                self.sink.start_element(&name, &attributes, true);
            }
            return;
        }

        if self_closing {
            if !elide {
                self.sink.start_element(&name, &attributes, false);
                self.sink.end_element(&name);
            }
            return;
        }

        if elide {
            trace!(element = %name, "eliding element without attributes");
        } else {
            self.sink.start_element(&name, &attributes, false);
        }
        self.stack.push(OpenElement {
            name,
            rendered: !elide,
            model,
        });
    }

    fn end_tag(&mut self, name: &str) {
        let mut target = None;
        for (index, open) in self.stack.iter().enumerate().rev() {
            if open.name == name {
                target = Some(index);
                break;
            }
            if is_scope_barrier(&open.name) && name != "table" {
                break;
            }
        }

        if let Some(index) = target {
            while self.stack.len() > index {
                self.pop();
            }
        }
    }

    fn text(&mut self, text: &str) {
        if text.is_empty() {
            return;
        }
        if text.chars().any(|c| !c.is_whitespace()) {
            while self
                .stack
                .last()
                .is_some_and(|open| open.model == ContentModel::StrictNoText)
            {
                self.pop();
            }
            self.wrap_in_implicit_item(None);
        }
        self.sink.text(text);
    }

    /// Open the implicit item when the innermost element is a list container
    /// and `incoming` (None for text) is not one of its items
    fn wrap_in_implicit_item(&mut self, incoming: Option<&str>) {
        let Some(open) = self.stack.last() else {
            return;
        };
        if open.model != ContentModel::ListContainer {
            return;
        }
        if incoming.is_some_and(|name| is_item_of(&open.name, name)) {
            return;
        }
        let Some(item) = implicit_item(&open.name) else {
            return;
        };
        if !self.config.allows_element(item) || self.stack.len() >= self.config.max_depth() {
            return;
        }

        self.sink.start_element(item, &[], false);
        self.stack.push(OpenElement {
            name: Cow::Borrowed(item),
            rendered: true,
            model: content_model(item),
        });
    }

    fn filter_attributes(
        &self,
        element: &str,
        attributes: &[Attribute<'a>],
    ) -> Vec<OutputAttribute<'a>> {
        let mut seen: HashSet<&str> = HashSet::with_capacity(attributes.len());
        let mut kept: Vec<OutputAttribute<'a>> = Vec::with_capacity(attributes.len());

        for attr in attributes {
            let name: &str = &attr.name;
            // Duplicates: the first occurrence wins
            if !seen.insert(name) {
                continue;
            }

            if name == "style" {
                if !self.config.allow_styling() {
                    trace!(element, "dropping style attribute");
                    continue;
                }
                let css = self.config.css().sanitize(&attr.decoded_value());
                if !css.is_empty() {
                    kept.push(OutputAttribute::new(attr.name.clone(), css));
                }
                continue;
            }

            if !self.config.allows_attribute(element, name) {
                trace!(element, attribute = name, "dropping disallowed attribute");
                continue;
            }

            let value = attr.decoded_value().into_owned();
            if self.config.is_url_attribute(name) && !is_allowed_url(&value, self.config.protocols()) {
                trace!(element, attribute = name, "dropping attribute with disallowed protocol");
                continue;
            }
            kept.push(OutputAttribute::new(attr.name.clone(), value));
        }

        if element == "a" && self.config.add_rel_nofollow() {
            match kept.iter_mut().find(|a| a.name == "rel") {
                Some(rel) => rel.value = Cow::Borrowed("nofollow"),
                None => kept.push(OutputAttribute::new("rel", "nofollow")),
            }
        }

        kept
    }

    fn pop(&mut self) {
        if let Some(open) = self.stack.pop() {
            if open.rendered {
                self.sink.end_element(&open.name);
            }
        }
    }

    fn close_all(&mut self) {
        while !self.stack.is_empty() {
            self.pop();
        }
    }
}
