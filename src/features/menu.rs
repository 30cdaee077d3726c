use std::sync::Arc;

use crate::error::PageResult;
use crate::page::{ElementId, EventKind, EventTarget, Page, Query, handler};
use crate::timing::Debouncer;

use super::PageContext;

const OPEN_CLASS: &str = "show";

/// The collapsible navigation of narrow viewports.
#[derive(Clone)]
pub struct MobileMenu {
    page: Arc<dyn Page>,
    toggler: ElementId,
    collapse: ElementId,
}

impl MobileMenu {
    /// Finds the toggle button and its collapsible panel.
    pub fn locate(page: Arc<dyn Page>) -> Option<Self> {
        let toggler = page.query_first(None, &Query::class("navbar-toggler"))?;
        let collapse = page.query_first(None, &Query::class("navbar-collapse"))?;
        Some(Self {
            page,
            toggler,
            collapse,
        })
    }

    pub fn is_open(&self) -> bool {
        self.page.has_class(self.collapse, OPEN_CLASS)
    }

    pub fn open(&self) {
        self.page.add_class(self.collapse, OPEN_CLASS);
        self.page.set_attribute(self.toggler, "aria-expanded", "true");
        self.page.set_style(self.page.body(), "overflow", "hidden");
    }

    pub fn close(&self) {
        self.page.remove_class(self.collapse, OPEN_CLASS);
        self.page.set_attribute(self.toggler, "aria-expanded", "false");
        self.page.set_style(self.page.body(), "overflow", "");
    }

    pub fn toggle(&self) {
        if self.is_open() {
            self.close();
        } else {
            self.open();
        }
    }

    fn owns(&self, element: ElementId) -> bool {
        self.page.contains(self.collapse, element) || self.page.contains(self.toggler, element)
    }
}

pub(super) fn install(cx: &PageContext) -> PageResult<()> {
    let Some(menu) = MobileMenu::locate(cx.page.clone()) else {
        tracing::debug!("no navbar toggler or collapse; menu not wired");
        return Ok(());
    };
    let page = cx.page.as_ref();

    let toggle = menu.clone();
    page.add_listener(
        EventTarget::Element(menu.toggler),
        EventKind::Click,
        handler(move |event| {
            event.prevent_default();
            toggle.toggle();
        }),
    );

    let escape = menu.clone();
    page.add_listener(
        EventTarget::Document,
        EventKind::KeyDown,
        handler(move |event| {
            if event.key.as_deref() == Some("Escape") && escape.is_open() {
                escape.close();
            }
        }),
    );

    let outside = menu.clone();
    page.add_listener(
        EventTarget::Document,
        EventKind::Click,
        handler(move |event| {
            if !outside.is_open() {
                return;
            }
            let inside = event.target.is_some_and(|target| outside.owns(target));
            if !inside {
                outside.close();
            }
        }),
    );

    for link in page.query_all(None, &Query::class("nav-link")) {
        let menu = menu.clone();
        page.add_listener(
            EventTarget::Element(link),
            EventKind::Click,
            handler(move |_| menu.close()),
        );
    }

    let breakpoint = cx.config.mobile_breakpoint_px;
    let debouncer = Debouncer::new(cx.page.clone(), cx.config.timings.resize_debounce);
    let resize = menu;
    page.add_listener(
        EventTarget::Window,
        EventKind::Resize,
        handler(move |_| {
            let menu = resize.clone();
            debouncer.call(move || {
                if menu.page.viewport_width() >= breakpoint && menu.is_open() {
                    menu.close();
                }
            });
        }),
    );
    Ok(())
}
