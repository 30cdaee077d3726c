use crate::error::PageResult;
use crate::page::{EventKind, EventTarget, Query, handler};

use super::PageContext;

/// Sends placeholder privacy links to the privacy page.
pub(super) fn install(cx: &PageContext) -> PageResult<()> {
    let page = cx.page.as_ref();
    let links = page.query_all(
        None,
        &Query::tag("a").and(Query::attr_contains("href", "privacy")),
    );
    for link in links {
        let placeholder = page.attribute(link, "href").as_deref() == Some("#");
        let labelled = page.text(link).to_lowercase().contains("datenschutz");
        if !placeholder && !labelled {
            continue;
        }

        let clicked = cx.page.clone();
        let privacy_page = cx.config.privacy_page.clone();
        page.add_listener(
            EventTarget::Element(link),
            EventKind::Click,
            handler(move |event| {
                if clicked.pathname().contains("privacy") {
                    return;
                }
                event.prevent_default();
                clicked.navigate(&privacy_page);
            }),
        );
    }
    Ok(())
}
