//! Output stage
//!
//! The policy engine reports what survives through `EventSink`.
//! `HtmlSerializer` renders those callbacks as canonical markup;
//! `EventCollector` records them for inspection.

use crate::core::entities::encode_html_onto;
use std::borrow::Cow;

/// An attribute that survived filtering, value already decoded
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputAttribute<'a> {
    pub name: Cow<'a, str>,
    pub value: Cow<'a, str>,
}

impl<'a> OutputAttribute<'a> {
    pub fn new(name: impl Into<Cow<'a, str>>, value: impl Into<Cow<'a, str>>) -> Self {
        OutputAttribute {
            name: name.into(),
            value: value.into(),
        }
    }
}

/// Receiver for the filtered document
pub trait EventSink {
    /// Called when an element is rendered
    ///
    /// # Arguments
    /// * `name` - Lowercased element name
    /// * `attributes` - Surviving attributes in source order
    /// * `is_void` - True for elements rendered without content or end tag
    fn start_element(&mut self, name: &str, attributes: &[OutputAttribute<'_>], is_void: bool);

    /// Called when a rendered element closes
    fn end_element(&mut self, name: &str);

    /// Called for text content (decoded, not yet encoded)
    fn text(&mut self, text: &str);
}

/// Renders events as HTML with every text and attribute value encoded
#[derive(Debug, Default)]
pub struct HtmlSerializer {
    out: String,
}

impl HtmlSerializer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create with estimated output capacity
    pub fn with_capacity(capacity: usize) -> Self {
        HtmlSerializer {
            out: String::with_capacity(capacity),
        }
    }

    /// Take the rendered output
    pub fn finish(self) -> String {
        self.out
    }
}

impl EventSink for HtmlSerializer {
    fn start_element(&mut self, name: &str, attributes: &[OutputAttribute<'_>], is_void: bool) {
        self.out.push('<');
        self.out.push_str(name);
        for attr in attributes {
            self.out.push(' ');
            self.out.push_str(&attr.name);
            self.out.push_str("=\"");
            encode_html_onto(&attr.value, &mut self.out);
            self.out.push('"');
        }
        if is_void {
            self.out.push_str(" />");
        } else {
            self.out.push('>');
        }
    }

    fn end_element(&mut self, name: &str) {
        self.out.push_str("</");
        self.out.push_str(name);
        self.out.push('>');
    }

    fn text(&mut self, text: &str) {
        encode_html_onto(text, &mut self.out);
    }
}

/// A recorded sink callback
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    Start {
        name: String,
        attributes: Vec<(String, String)>,
        is_void: bool,
    },
    End(String),
    Text(String),
}

/// Sink that records events; adjacent text is merged
#[derive(Debug, Default)]
pub struct EventCollector {
    events: Vec<Event>,
}

impl EventCollector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Take the collected events
    pub fn into_events(self) -> Vec<Event> {
        self.events
    }
}

impl EventSink for EventCollector {
    fn start_element(&mut self, name: &str, attributes: &[OutputAttribute<'_>], is_void: bool) {
        self.events.push(Event::Start {
            name: name.to_string(),
            attributes: attributes
                .iter()
                .map(|a| (a.name.to_string(), a.value.to_string()))
                .collect(),
            is_void,
        });
    }

    fn end_element(&mut self, name: &str) {
        self.events.push(Event::End(name.to_string()));
    }

    fn text(&mut self, text: &str) {
        if let Some(Event::Text(last)) = self.events.last_mut() {
            last.push_str(text);
        } else {
            self.events.push(Event::Text(text.to_string()));
        }
    }
}
