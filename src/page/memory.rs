use std::collections::{BTreeMap, BTreeSet};
use std::sync::{Mutex, MutexGuard, PoisonError};

use futures::executor::block_on;
use futures::future::join_all;

use super::{
    ElementId, EventHandler, EventKind, EventTarget, ListenerId, Matchable, ObserverId, Page,
    PageEvent, Query, Rect, ScrollBehavior, Task, VisibilityEntry, VisibilityHandler,
    VisibilityOptions,
};

#[derive(Clone, Debug, Default)]
struct Node {
    tag: String,
    attributes: BTreeMap<String, String>,
    classes: Vec<String>,
    styles: BTreeMap<String, String>,
    text: String,
    value: String,
    checked: bool,
    disabled: bool,
    rect: Rect,
    parent: Option<ElementId>,
    children: Vec<ElementId>,
}

impl Matchable for Node {
    fn tag(&self) -> &str {
        &self.tag
    }

    fn attribute(&self, name: &str) -> Option<&str> {
        if name == "class" {
            return None;
        }
        self.attributes.get(name).map(String::as_str)
    }

    fn has_class(&self, class: &str) -> bool {
        self.classes.iter().any(|candidate| candidate == class)
    }
}

struct ListenerEntry {
    target: EventTarget,
    kind: EventKind,
    handler: EventHandler,
}

struct ObserverEntry {
    options: VisibilityOptions,
    handler: VisibilityHandler,
    targets: BTreeSet<ElementId>,
}

struct Dom {
    nodes: BTreeMap<ElementId, Node>,
    next_id: u64,
    root: ElementId,
    head: ElementId,
    body: ElementId,
    listeners: Vec<ListenerEntry>,
    next_listener: u64,
    observers: BTreeMap<ObserverId, ObserverEntry>,
    next_observer: u64,
    href: String,
    navigations: Vec<String>,
    viewport_width: f64,
    scroll_offset: f64,
    scroll_requests: Vec<(f64, ScrollBehavior)>,
}

impl Dom {
    fn new(href: String) -> Self {
        let mut dom = Self {
            nodes: BTreeMap::new(),
            next_id: 0,
            root: ElementId(0),
            head: ElementId(0),
            body: ElementId(0),
            listeners: Vec::new(),
            next_listener: 0,
            observers: BTreeMap::new(),
            next_observer: 0,
            href,
            navigations: Vec::new(),
            viewport_width: 1_024.0,
            scroll_offset: 0.0,
            scroll_requests: Vec::new(),
        };
        dom.root = dom.allocate("html");
        dom.head = dom.allocate("head");
        dom.body = dom.allocate("body");
        let (root, head, body) = (dom.root, dom.head, dom.body);
        dom.attach(root, head);
        dom.attach(root, body);
        dom
    }

    fn allocate(&mut self, tag: &str) -> ElementId {
        self.next_id += 1;
        let id = ElementId(self.next_id);
        self.nodes.insert(
            id,
            Node {
                tag: tag.to_ascii_lowercase(),
                ..Node::default()
            },
        );
        id
    }

    fn attach(&mut self, parent: ElementId, child: ElementId) {
        if !self.nodes.contains_key(&parent) || self.is_inclusive_ancestor(child, parent) {
            return;
        }
        self.detach(child);
        if let Some(node) = self.nodes.get_mut(&child) {
            node.parent = Some(parent);
        }
        if let Some(node) = self.nodes.get_mut(&parent) {
            node.children.push(child);
        }
    }

    fn detach(&mut self, child: ElementId) {
        let Some(parent) = self.nodes.get_mut(&child).and_then(|node| node.parent.take()) else {
            return;
        };
        if let Some(node) = self.nodes.get_mut(&parent) {
            node.children.retain(|candidate| *candidate != child);
        }
    }

    fn is_inclusive_ancestor(&self, ancestor: ElementId, node: ElementId) -> bool {
        let mut cursor = Some(node);
        while let Some(current) = cursor {
            if current == ancestor {
                return true;
            }
            cursor = self.nodes.get(&current).and_then(|node| node.parent);
        }
        false
    }

    fn descendants(&self, scope: ElementId) -> Vec<ElementId> {
        let mut ordered = Vec::new();
        let mut stack = self
            .nodes
            .get(&scope)
            .map(|node| node.children.iter().rev().copied().collect::<Vec<_>>())
            .unwrap_or_default();
        while let Some(current) = stack.pop() {
            ordered.push(current);
            if let Some(node) = self.nodes.get(&current) {
                stack.extend(node.children.iter().rev().copied());
            }
        }
        ordered
    }

    fn text_of(&self, element: ElementId) -> String {
        let Some(node) = self.nodes.get(&element) else {
            return String::new();
        };
        let mut text = node.text.clone();
        for child in &node.children {
            text.push_str(&self.text_of(*child));
        }
        text
    }

    fn propagation_path(&self, target: EventTarget) -> Vec<EventTarget> {
        let mut path = Vec::new();
        match target {
            EventTarget::Element(element) => {
                let mut cursor = Some(element);
                while let Some(current) = cursor {
                    path.push(EventTarget::Element(current));
                    cursor = self.nodes.get(&current).and_then(|node| node.parent);
                }
                if self.is_inclusive_ancestor(self.root, element) {
                    path.push(EventTarget::Document);
                    path.push(EventTarget::Window);
                }
            }
            EventTarget::Document => {
                path.push(EventTarget::Document);
                path.push(EventTarget::Window);
            }
            EventTarget::Window => path.push(EventTarget::Window),
        }
        path
    }
}

/// In-memory document implementing [`Page`].
///
/// Serves as the headless host and as the test double: callers build a tree,
/// fire events with the driver methods and inspect the resulting state.
/// Spawned tasks queue up until [`MemoryPage::run_until_idle`] drives them.
pub struct MemoryPage {
    dom: Mutex<Dom>,
    tasks: Mutex<Vec<Task>>,
}

impl Default for MemoryPage {
    fn default() -> Self {
        Self::new("https://example.com/")
    }
}

impl MemoryPage {
    pub fn new(href: impl Into<String>) -> Self {
        Self {
            dom: Mutex::new(Dom::new(href.into())),
            tasks: Mutex::new(Vec::new()),
        }
    }

    fn dom(&self) -> MutexGuard<'_, Dom> {
        self.dom.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn with_node<R>(&self, element: ElementId, f: impl FnOnce(&Node) -> R) -> Option<R> {
        self.dom().nodes.get(&element).map(f)
    }

    fn with_node_mut(&self, element: ElementId, f: impl FnOnce(&mut Node)) {
        if let Some(node) = self.dom().nodes.get_mut(&element) {
            f(node);
        }
    }

    /// Creates an element under `parent`. `class` attributes are split into classes.
    pub fn insert(&self, parent: ElementId, tag: &str, attributes: &[(&str, &str)]) -> ElementId {
        let element = self.create_element(tag);
        for (name, value) in attributes {
            self.set_attribute(element, name, value);
        }
        self.append_child(parent, element);
        element
    }

    pub fn set_rect(&self, element: ElementId, rect: Rect) {
        self.with_node_mut(element, |node| node.rect = rect);
    }

    pub fn classes(&self, element: ElementId) -> Vec<String> {
        self.with_node(element, |node| node.classes.clone())
            .unwrap_or_default()
    }

    pub fn children(&self, element: ElementId) -> Vec<ElementId> {
        self.with_node(element, |node| node.children.clone())
            .unwrap_or_default()
    }

    /// Fires `event` at `target` and bubbles it to the document and window.
    pub fn dispatch(&self, target: EventTarget, mut event: PageEvent) -> PageEvent {
        if let (None, EventTarget::Element(element)) = (event.target, target) {
            event.target = Some(element);
        }
        let path = self.dom().propagation_path(target);
        for current in path {
            let handlers = self
                .dom()
                .listeners
                .iter()
                .filter(|entry| entry.target == current && entry.kind == event.kind)
                .map(|entry| entry.handler.clone())
                .collect::<Vec<_>>();
            event.current_target = current;
            for handler in handlers {
                handler(&mut event);
            }
            if event.is_propagation_stopped() {
                break;
            }
        }
        event
    }

    pub fn click(&self, element: ElementId) -> PageEvent {
        self.dispatch(
            EventTarget::Element(element),
            PageEvent::new(EventKind::Click),
        )
    }

    pub fn click_at(&self, element: ElementId, client_x: f64, client_y: f64) -> PageEvent {
        self.dispatch(
            EventTarget::Element(element),
            PageEvent::new(EventKind::Click).at(client_x, client_y),
        )
    }

    pub fn click_document(&self) -> PageEvent {
        self.dispatch(EventTarget::Document, PageEvent::new(EventKind::Click))
    }

    /// Sets the control's value and fires an input event at it.
    pub fn type_into(&self, element: ElementId, value: &str) -> PageEvent {
        self.set_value(element, value);
        self.dispatch(
            EventTarget::Element(element),
            PageEvent::new(EventKind::Input),
        )
    }

    pub fn submit(&self, form: ElementId) -> PageEvent {
        self.dispatch(EventTarget::Element(form), PageEvent::new(EventKind::Submit))
    }

    pub fn key_down(&self, key: &str) -> PageEvent {
        self.dispatch(
            EventTarget::Document,
            PageEvent::new(EventKind::KeyDown).key(key),
        )
    }

    pub fn hover(&self, element: ElementId) -> PageEvent {
        self.dispatch(
            EventTarget::Element(element),
            PageEvent::new(EventKind::MouseEnter),
        )
    }

    pub fn leave(&self, element: ElementId) -> PageEvent {
        self.dispatch(
            EventTarget::Element(element),
            PageEvent::new(EventKind::MouseLeave),
        )
    }

    pub fn fail_load(&self, element: ElementId) -> PageEvent {
        self.dispatch(EventTarget::Element(element), PageEvent::new(EventKind::Error))
    }

    pub fn resize(&self, viewport_width: f64) -> PageEvent {
        self.dom().viewport_width = viewport_width;
        self.dispatch(EventTarget::Window, PageEvent::new(EventKind::Resize))
    }

    pub fn scroll_window(&self, offset: f64) -> PageEvent {
        self.dom().scroll_offset = offset;
        self.dispatch(EventTarget::Window, PageEvent::new(EventKind::Scroll))
    }

    /// Reports a visibility change of `element` to every observer watching it.
    pub fn set_visible(&self, element: ElementId, visible: bool) {
        let ratio = if visible { 1.0 } else { 0.0 };
        self.set_intersection_ratio(element, ratio);
    }

    pub fn set_intersection_ratio(&self, element: ElementId, ratio: f64) {
        let observers = self
            .dom()
            .observers
            .iter()
            .filter(|(_, entry)| entry.targets.contains(&element))
            .map(|(id, entry)| (*id, entry.options, entry.handler.clone()))
            .collect::<Vec<_>>();
        for (id, options, handler) in observers {
            let is_intersecting = ratio > 0.0 && ratio >= options.threshold;
            handler(
                id,
                &VisibilityEntry {
                    target: element,
                    is_intersecting,
                    ratio,
                },
            );
        }
    }

    pub fn observed_count(&self, element: ElementId) -> usize {
        self.dom()
            .observers
            .values()
            .filter(|entry| entry.targets.contains(&element))
            .count()
    }

    pub fn observer_options(&self, observer: ObserverId) -> Option<VisibilityOptions> {
        self.dom()
            .observers
            .get(&observer)
            .map(|entry| entry.options)
    }

    pub fn listener_count(&self, target: EventTarget, kind: EventKind) -> usize {
        self.dom()
            .listeners
            .iter()
            .filter(|entry| entry.target == target && entry.kind == kind)
            .count()
    }

    pub fn total_listeners(&self) -> usize {
        self.dom().listeners.len()
    }

    pub fn navigations(&self) -> Vec<String> {
        self.dom().navigations.clone()
    }

    pub fn scroll_requests(&self) -> Vec<(f64, ScrollBehavior)> {
        self.dom().scroll_requests.clone()
    }

    pub fn pending_tasks(&self) -> usize {
        self.tasks
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Drives spawned tasks, including the ones they spawn, until none remain.
    pub fn run_until_idle(&self) {
        loop {
            let batch = std::mem::take(
                &mut *self.tasks.lock().unwrap_or_else(PoisonError::into_inner),
            );
            if batch.is_empty() {
                break;
            }
            block_on(join_all(batch));
        }
    }
}

impl Page for MemoryPage {
    fn head(&self) -> ElementId {
        self.dom().head
    }

    fn body(&self) -> ElementId {
        self.dom().body
    }

    fn query_all(&self, scope: Option<ElementId>, query: &Query) -> Vec<ElementId> {
        let dom = self.dom();
        let scope = scope.unwrap_or(dom.root);
        dom.descendants(scope)
            .into_iter()
            .filter(|element| {
                dom.nodes
                    .get(element)
                    .is_some_and(|node| query.matches(node))
            })
            .collect()
    }

    fn closest(&self, element: ElementId, query: &Query) -> Option<ElementId> {
        let dom = self.dom();
        let mut cursor = Some(element);
        while let Some(current) = cursor {
            let node = dom.nodes.get(&current)?;
            if query.matches(node) {
                return Some(current);
            }
            cursor = node.parent;
        }
        None
    }

    fn parent(&self, element: ElementId) -> Option<ElementId> {
        self.with_node(element, |node| node.parent).flatten()
    }

    fn contains(&self, ancestor: ElementId, node: ElementId) -> bool {
        self.dom().is_inclusive_ancestor(ancestor, node)
    }

    fn create_element(&self, tag: &str) -> ElementId {
        self.dom().allocate(tag)
    }

    fn append_child(&self, parent: ElementId, child: ElementId) {
        self.dom().attach(parent, child);
    }

    fn remove(&self, element: ElementId) {
        self.dom().detach(element);
    }

    fn is_connected(&self, element: ElementId) -> bool {
        let dom = self.dom();
        dom.is_inclusive_ancestor(dom.root, element)
    }

    fn tag_name(&self, element: ElementId) -> Option<String> {
        self.with_node(element, |node| node.tag.clone())
    }

    fn attribute(&self, element: ElementId, name: &str) -> Option<String> {
        self.with_node(element, |node| {
            if name == "class" {
                return (!node.classes.is_empty()).then(|| node.classes.join(" "));
            }
            node.attributes.get(name).cloned()
        })
        .flatten()
    }

    fn set_attribute(&self, element: ElementId, name: &str, value: &str) {
        self.with_node_mut(element, |node| match name {
            "class" => {
                node.classes = value.split_whitespace().map(str::to_string).collect();
            }
            "value" => {
                node.value = value.to_string();
                node.attributes.insert(name.to_string(), value.to_string());
            }
            "checked" => {
                node.checked = true;
                node.attributes.insert(name.to_string(), value.to_string());
            }
            "disabled" => {
                node.disabled = true;
                node.attributes.insert(name.to_string(), value.to_string());
            }
            _ => {
                node.attributes.insert(name.to_string(), value.to_string());
            }
        });
    }

    fn remove_attribute(&self, element: ElementId, name: &str) {
        self.with_node_mut(element, |node| {
            if name == "class" {
                node.classes.clear();
            }
            node.attributes.remove(name);
        });
    }

    fn has_class(&self, element: ElementId, class: &str) -> bool {
        self.with_node(element, |node| node.has_class(class))
            .unwrap_or(false)
    }

    fn add_class(&self, element: ElementId, class: &str) {
        self.with_node_mut(element, |node| {
            if !node.has_class(class) {
                node.classes.push(class.to_string());
            }
        });
    }

    fn remove_class(&self, element: ElementId, class: &str) {
        self.with_node_mut(element, |node| {
            node.classes.retain(|candidate| candidate != class)
        });
    }

    fn style(&self, element: ElementId, property: &str) -> Option<String> {
        self.with_node(element, |node| node.styles.get(property).cloned())
            .flatten()
    }

    fn set_style(&self, element: ElementId, property: &str, value: &str) {
        self.with_node_mut(element, |node| {
            if value.is_empty() {
                node.styles.remove(property);
            } else {
                node.styles.insert(property.to_string(), value.to_string());
            }
        });
    }

    fn text(&self, element: ElementId) -> String {
        self.dom().text_of(element)
    }

    fn set_text(&self, element: ElementId, text: &str) {
        let mut dom = self.dom();
        let children = dom
            .nodes
            .get(&element)
            .map(|node| node.children.clone())
            .unwrap_or_default();
        for child in children {
            dom.detach(child);
        }
        if let Some(node) = dom.nodes.get_mut(&element) {
            node.text = text.to_string();
        }
    }

    fn value(&self, element: ElementId) -> String {
        self.with_node(element, |node| node.value.clone())
            .unwrap_or_default()
    }

    fn set_value(&self, element: ElementId, value: &str) {
        self.with_node_mut(element, |node| node.value = value.to_string());
    }

    fn is_checked(&self, element: ElementId) -> bool {
        self.with_node(element, |node| node.checked)
            .unwrap_or(false)
    }

    fn set_checked(&self, element: ElementId, checked: bool) {
        self.with_node_mut(element, |node| node.checked = checked);
    }

    fn is_disabled(&self, element: ElementId) -> bool {
        self.with_node(element, |node| node.disabled)
            .unwrap_or(false)
    }

    fn set_disabled(&self, element: ElementId, disabled: bool) {
        self.with_node_mut(element, |node| node.disabled = disabled);
    }

    fn bounding_rect(&self, element: ElementId) -> Rect {
        self.with_node(element, |node| node.rect)
            .unwrap_or_default()
    }

    fn viewport_width(&self) -> f64 {
        self.dom().viewport_width
    }

    fn scroll_offset(&self) -> f64 {
        self.dom().scroll_offset
    }

    fn scroll_to(&self, top: f64, behavior: ScrollBehavior) {
        let mut dom = self.dom();
        dom.scroll_offset = top.max(0.0);
        dom.scroll_requests.push((top, behavior));
    }

    fn href(&self) -> String {
        self.dom().href.clone()
    }

    fn navigate(&self, url: &str) {
        self.dom().navigations.push(url.to_string());
    }

    fn add_listener(
        &self,
        target: EventTarget,
        kind: EventKind,
        handler: EventHandler,
    ) -> ListenerId {
        let mut dom = self.dom();
        dom.next_listener += 1;
        let id = ListenerId(dom.next_listener);
        dom.listeners.push(ListenerEntry {
            target,
            kind,
            handler,
        });
        id
    }

    fn create_observer(
        &self,
        options: VisibilityOptions,
        handler: VisibilityHandler,
    ) -> ObserverId {
        let mut dom = self.dom();
        dom.next_observer += 1;
        let id = ObserverId(dom.next_observer);
        dom.observers.insert(
            id,
            ObserverEntry {
                options,
                handler,
                targets: BTreeSet::new(),
            },
        );
        id
    }

    fn observe(&self, observer: ObserverId, element: ElementId) {
        if let Some(entry) = self.dom().observers.get_mut(&observer) {
            entry.targets.insert(element);
        }
    }

    fn unobserve(&self, observer: ObserverId, element: ElementId) {
        if let Some(entry) = self.dom().observers.get_mut(&observer) {
            entry.targets.remove(&element);
        }
    }

    fn spawn(&self, task: Task) {
        self.tasks
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(task);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn query_all_returns_document_order() {
        let page = MemoryPage::default();
        let body = page.body();
        let section = page.insert(body, "section", &[("id", "about")]);
        let first = page.insert(section, "p", &[("class", "lead text")]);
        let second = page.insert(body, "p", &[]);

        assert_eq!(page.query_all(None, &Query::tag("p")), vec![first, second]);
        assert_eq!(
            page.query_all(Some(section), &Query::class("lead")),
            vec![first]
        );
        assert_eq!(page.attribute(first, "class").as_deref(), Some("lead text"));
        assert_eq!(page.closest(first, &Query::tag("section")), Some(section));
    }

    #[test]
    fn events_bubble_to_document_until_stopped() {
        let page = MemoryPage::default();
        let body = page.body();
        let outer = page.insert(body, "div", &[]);
        let inner = page.insert(outer, "button", &[]);
        let seen = Arc::new(Mutex::new(Vec::new()));

        for target in [
            EventTarget::Element(inner),
            EventTarget::Element(outer),
            EventTarget::Document,
        ] {
            let seen = seen.clone();
            page.add_listener(
                target,
                EventKind::Click,
                Arc::new(move |event: &mut PageEvent| {
                    seen.lock().expect("seen lock").push(event.current_target);
                }),
            );
        }

        let event = page.click(inner);
        assert_eq!(event.target, Some(inner));
        assert_eq!(
            *seen.lock().expect("seen lock"),
            vec![
                EventTarget::Element(inner),
                EventTarget::Element(outer),
                EventTarget::Document
            ]
        );

        seen.lock().expect("seen lock").clear();
        page.add_listener(
            EventTarget::Element(inner),
            EventKind::Click,
            Arc::new(|event: &mut PageEvent| event.stop_propagation()),
        );
        page.click(inner);
        assert_eq!(
            *seen.lock().expect("seen lock"),
            vec![EventTarget::Element(inner)]
        );
    }

    #[test]
    fn set_text_replaces_children() {
        let page = MemoryPage::default();
        let button = page.insert(page.body(), "button", &[]);
        page.set_text(button, "Send");
        let spinner = page.insert(button, "span", &[]);
        page.set_text(spinner, "*");
        assert_eq!(page.text(button), "Send*");

        page.set_text(button, "Send");
        assert!(page.children(button).is_empty());
        assert!(!page.is_connected(spinner));
    }

    #[test]
    fn tasks_spawned_by_tasks_are_drained() {
        let page = Arc::new(MemoryPage::default());
        let runs = Arc::new(AtomicUsize::new(0));
        let inner_page = page.clone();
        let inner_runs = runs.clone();
        page.spawn(Box::pin(async move {
            inner_runs.fetch_add(1, Ordering::SeqCst);
            let nested_runs = inner_runs.clone();
            inner_page.spawn(Box::pin(async move {
                nested_runs.fetch_add(1, Ordering::SeqCst);
            }));
        }));

        page.run_until_idle();
        assert_eq!(runs.load(Ordering::SeqCst), 2);
        assert_eq!(page.pending_tasks(), 0);
    }

    #[test]
    fn visibility_respects_threshold() {
        let page = MemoryPage::default();
        let counter = page.insert(page.body(), "span", &[]);
        let hits = Arc::new(AtomicUsize::new(0));
        let seen = hits.clone();
        let observer = page.create_observer(
            VisibilityOptions::default().threshold(0.5),
            Arc::new(move |_: ObserverId, entry: &VisibilityEntry| {
                if entry.is_intersecting {
                    seen.fetch_add(1, Ordering::SeqCst);
                }
            }),
        );
        page.observe(observer, counter);

        page.set_intersection_ratio(counter, 0.2);
        assert_eq!(hits.load(Ordering::SeqCst), 0);
        page.set_intersection_ratio(counter, 0.6);
        assert_eq!(hits.load(Ordering::SeqCst), 1);

        page.unobserve(observer, counter);
        page.set_visible(counter, true);
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn pathname_and_relative_urls_resolve_against_href() {
        let page = MemoryPage::new("https://example.com/services/index.html");
        assert_eq!(page.pathname(), "/services/index.html");
        assert_eq!(
            page.resolve_url("about.html").map(|url| url.path().to_string()),
            Some("/services/about.html".to_string())
        );
    }
}
