use crate::error::PageResult;
use crate::page::{EventKind, EventTarget, Query, ScrollBehavior, handler};

use super::PageContext;

fn is_homepage(pathname: &str) -> bool {
    pathname == "/" || pathname == "/index.html"
}

/// Same-page anchors scroll smoothly on the homepage, clearing the fixed header.
pub(super) fn install(cx: &PageContext) -> PageResult<()> {
    let pathname = cx.page.pathname();
    if !is_homepage(&pathname) {
        tracing::debug!(%pathname, "not the homepage; smooth scroll not wired");
        return Ok(());
    }

    let page = cx.page.clone();
    let header_offset = cx.config.header_offset_px;
    cx.page.add_listener(
        EventTarget::Document,
        EventKind::Click,
        handler(move |event| {
            let Some(target) = event.target else {
                return;
            };
            let anchor = Query::tag("a").and(Query::attr_prefix("href", "#"));
            let Some(link) = page.closest(target, &anchor) else {
                return;
            };
            let Some(href) = page.attribute(link, "href") else {
                return;
            };
            if href == "#" || href == "#!" {
                return;
            }
            event.prevent_default();

            let Some(section) = page.query_first(None, &Query::id(&href[1..])) else {
                tracing::debug!(%href, "anchor target not found");
                return;
            };
            let top = page.bounding_rect(section).top + page.scroll_offset() - header_offset;
            page.scroll_to(top, ScrollBehavior::Smooth);
        }),
    );
    Ok(())
}
