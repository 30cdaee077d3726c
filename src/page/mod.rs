//! Capability interface between the page features and the document they run in.
//!
//! Features never touch a browser global. Everything they read or mutate goes
//! through [`Page`], which a host implements over its real document and which
//! [`MemoryPage`] implements in memory for headless runs and tests.

mod memory;
mod query;

use std::fmt::{Display, Formatter};
use std::sync::Arc;

use futures::future::BoxFuture;
use url::Url;

pub use memory::MemoryPage;
pub use query::{Matchable, Query};

#[derive(Clone, Copy, Debug, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct ElementId(pub u64);

impl Display for ElementId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "element#{}", self.0)
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct ListenerId(pub u64);

#[derive(Clone, Copy, Debug, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct ObserverId(pub u64);

#[derive(Clone, Copy, Debug, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub enum EventTarget {
    Document,
    Window,
    Element(ElementId),
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub enum EventKind {
    Click,
    Input,
    Submit,
    KeyDown,
    Resize,
    Scroll,
    MouseEnter,
    MouseLeave,
    Error,
}

#[derive(Clone, Debug, PartialEq)]
pub struct PageEvent {
    pub kind: EventKind,
    pub target: Option<ElementId>,
    pub current_target: EventTarget,
    pub key: Option<String>,
    pub client_x: f64,
    pub client_y: f64,
    default_prevented: bool,
    propagation_stopped: bool,
}

impl PageEvent {
    pub fn new(kind: EventKind) -> Self {
        Self {
            kind,
            target: None,
            current_target: EventTarget::Document,
            key: None,
            client_x: 0.0,
            client_y: 0.0,
            default_prevented: false,
            propagation_stopped: false,
        }
    }

    pub fn target(mut self, element: ElementId) -> Self {
        self.target = Some(element);
        self
    }

    pub fn key(mut self, key: impl Into<String>) -> Self {
        self.key = Some(key.into());
        self
    }

    pub fn at(mut self, client_x: f64, client_y: f64) -> Self {
        self.client_x = client_x;
        self.client_y = client_y;
        self
    }

    pub fn prevent_default(&mut self) {
        self.default_prevented = true;
    }

    pub fn stop_propagation(&mut self) {
        self.propagation_stopped = true;
    }

    pub fn is_default_prevented(&self) -> bool {
        self.default_prevented
    }

    pub fn is_propagation_stopped(&self) -> bool {
        self.propagation_stopped
    }

    /// The element whose listener is running, if the event is at an element.
    pub fn current_element(&self) -> Option<ElementId> {
        match self.current_target {
            EventTarget::Element(element) => Some(element),
            EventTarget::Document | EventTarget::Window => None,
        }
    }
}

pub type EventHandler = Arc<dyn Fn(&mut PageEvent) + Send + Sync>;

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Rect {
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub fn new(left: f64, top: f64, width: f64, height: f64) -> Self {
        Self {
            left,
            top,
            width,
            height,
        }
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ScrollBehavior {
    Auto,
    Smooth,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Length {
    Px(f64),
    Percent(f64),
}

impl Display for Length {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Length::Px(value) => write!(f, "{value}px"),
            Length::Percent(value) => write!(f, "{value}%"),
        }
    }
}

/// Intersection observer settings.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct VisibilityOptions {
    pub threshold: f64,
    /// Top, right, bottom, left.
    pub root_margin: [Length; 4],
}

impl Default for VisibilityOptions {
    fn default() -> Self {
        Self {
            threshold: 0.0,
            root_margin: [Length::Px(0.0); 4],
        }
    }
}

impl VisibilityOptions {
    pub fn threshold(mut self, threshold: f64) -> Self {
        self.threshold = threshold.clamp(0.0, 1.0);
        self
    }

    pub fn root_margin(mut self, margin: [Length; 4]) -> Self {
        self.root_margin = margin;
        self
    }

    pub fn root_margin_css(&self) -> String {
        self.root_margin
            .iter()
            .map(Length::to_string)
            .collect::<Vec<_>>()
            .join(" ")
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct VisibilityEntry {
    pub target: ElementId,
    pub is_intersecting: bool,
    pub ratio: f64,
}

pub type VisibilityHandler = Arc<dyn Fn(ObserverId, &VisibilityEntry) + Send + Sync>;

pub type Task = BoxFuture<'static, ()>;

/// Everything a page feature may do to its document.
///
/// Unknown element ids are ignored by mutators and yield empty results from
/// readers, matching how a detached DOM node behaves.
pub trait Page: Send + Sync {
    fn head(&self) -> ElementId;
    fn body(&self) -> ElementId;

    /// Matches in document order below `scope` (or the whole document), excluding `scope`.
    fn query_all(&self, scope: Option<ElementId>, query: &Query) -> Vec<ElementId>;

    fn query_first(&self, scope: Option<ElementId>, query: &Query) -> Option<ElementId> {
        self.query_all(scope, query).into_iter().next()
    }

    /// `element` itself or its nearest ancestor matching `query`.
    fn closest(&self, element: ElementId, query: &Query) -> Option<ElementId>;
    fn parent(&self, element: ElementId) -> Option<ElementId>;
    /// Inclusive: an element contains itself.
    fn contains(&self, ancestor: ElementId, node: ElementId) -> bool;

    fn create_element(&self, tag: &str) -> ElementId;
    fn append_child(&self, parent: ElementId, child: ElementId);
    fn remove(&self, element: ElementId);
    fn is_connected(&self, element: ElementId) -> bool;

    fn tag_name(&self, element: ElementId) -> Option<String>;
    fn attribute(&self, element: ElementId, name: &str) -> Option<String>;
    fn set_attribute(&self, element: ElementId, name: &str, value: &str);
    fn remove_attribute(&self, element: ElementId, name: &str);

    fn has_class(&self, element: ElementId, class: &str) -> bool;
    fn add_class(&self, element: ElementId, class: &str);
    fn remove_class(&self, element: ElementId, class: &str);

    fn style(&self, element: ElementId, property: &str) -> Option<String>;
    /// An empty value removes the inline property.
    fn set_style(&self, element: ElementId, property: &str, value: &str);

    /// Text content of the element and its descendants.
    fn text(&self, element: ElementId) -> String;
    /// Replaces the element's children with a single text run.
    fn set_text(&self, element: ElementId, text: &str);

    fn value(&self, element: ElementId) -> String;
    fn set_value(&self, element: ElementId, value: &str);
    fn is_checked(&self, element: ElementId) -> bool;
    fn set_checked(&self, element: ElementId, checked: bool);
    fn is_disabled(&self, element: ElementId) -> bool;
    fn set_disabled(&self, element: ElementId, disabled: bool);

    fn bounding_rect(&self, element: ElementId) -> Rect;
    fn viewport_width(&self) -> f64;
    fn scroll_offset(&self) -> f64;
    fn scroll_to(&self, top: f64, behavior: ScrollBehavior);

    /// Absolute URL of the current document.
    fn href(&self) -> String;
    fn navigate(&self, url: &str);

    fn pathname(&self) -> String {
        Url::parse(&self.href())
            .map(|url| url.path().to_string())
            .unwrap_or_else(|_| "/".to_string())
    }

    /// Resolves a possibly relative link against the current document.
    fn resolve_url(&self, href: &str) -> Option<Url> {
        Url::parse(&self.href()).ok()?.join(href).ok()
    }

    fn add_listener(
        &self,
        target: EventTarget,
        kind: EventKind,
        handler: EventHandler,
    ) -> ListenerId;

    fn create_observer(
        &self,
        options: VisibilityOptions,
        handler: VisibilityHandler,
    ) -> ObserverId;
    fn observe(&self, observer: ObserverId, element: ElementId);
    fn unobserve(&self, observer: ObserverId, element: ElementId);

    /// Hands a task to the page's event loop.
    fn spawn(&self, task: Task);
}

/// Builds an [`EventHandler`] from a closure.
pub fn handler(f: impl Fn(&mut PageEvent) + Send + Sync + 'static) -> EventHandler {
    Arc::new(f)
}

/// Builds a [`VisibilityHandler`] from a closure.
pub fn visibility_handler(
    f: impl Fn(ObserverId, &VisibilityEntry) + Send + Sync + 'static,
) -> VisibilityHandler {
    Arc::new(f)
}
