use std::borrow::Cow;

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use rust_embed::RustEmbed;

use crate::page::{Page, Query};

#[derive(RustEmbed)]
#[folder = "assets/"]
struct EmbeddedAssets;

const STYLESHEET_MARKER: &str = "data-calmpage-style";

#[derive(Clone, Copy, Debug, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub enum Stylesheet {
    Ripple,
    Notifications,
    Spinner,
}

impl Stylesheet {
    pub fn name(self) -> &'static str {
        match self {
            Stylesheet::Ripple => "ripple",
            Stylesheet::Notifications => "notifications",
            Stylesheet::Spinner => "spinner",
        }
    }

    fn path(self) -> String {
        format!("styles/{}.css", self.name())
    }

    pub fn source(self) -> String {
        embedded_text(&self.path()).unwrap_or_default()
    }
}

/// Adds the stylesheet to `<head>` unless a previous call already did.
pub fn inject_stylesheet(page: &dyn Page, stylesheet: Stylesheet) -> bool {
    let head = page.head();
    let marker = Query::tag("style").and(Query::attr_equals(STYLESHEET_MARKER, stylesheet.name()));
    if page.query_first(Some(head), &marker).is_some() {
        return false;
    }
    let style = page.create_element("style");
    page.set_attribute(style, STYLESHEET_MARKER, stylesheet.name());
    page.set_text(style, &stylesheet.source());
    page.append_child(head, style);
    true
}

/// Inline SVG placeholder for images that failed to load, as a data URI.
pub fn image_placeholder_uri(label: &str) -> String {
    let svg = embedded_text("images/placeholder.svg")
        .unwrap_or_default()
        .trim()
        .replace("{label}", &escape_xml(label));
    format!("data:image/svg+xml;base64,{}", STANDARD.encode(svg))
}

fn embedded_text(path: &str) -> Option<String> {
    let file = EmbeddedAssets::get(path)?;
    Some(match file.data {
        Cow::Borrowed(bytes) => String::from_utf8_lossy(bytes).into_owned(),
        Cow::Owned(bytes) => String::from_utf8_lossy(&bytes).into_owned(),
    })
}

fn escape_xml(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            _ => escaped.push(ch),
        }
    }
    escaped
}
