use crate::error::PageResult;
use crate::page::{Length, Query, VisibilityOptions, visibility_handler};

use super::PageContext;

/// Highlights the nav link of the section currently at the top of the viewport.
pub(super) fn install(cx: &PageContext) -> PageResult<()> {
    let page = cx.page.as_ref();
    let sections = page.query_all(None, &Query::tag("section").and(Query::has_attr("id")));
    let links = page.query_all(
        None,
        &Query::class("nav-link").and(Query::attr_prefix("href", "#")),
    );
    if sections.is_empty() || links.is_empty() {
        tracing::debug!(
            sections = sections.len(),
            links = links.len(),
            "nothing to spy on; scroll spy not wired"
        );
        return Ok(());
    }

    let options = VisibilityOptions::default().threshold(0.0).root_margin([
        Length::Px(-80.0),
        Length::Px(0.0),
        Length::Percent(-80.0),
        Length::Px(0.0),
    ]);
    let spy = cx.page.clone();
    let observer = page.create_observer(
        options,
        visibility_handler(move |_, entry| {
            if !entry.is_intersecting {
                return;
            }
            let Some(id) = spy.attribute(entry.target, "id") else {
                return;
            };
            let anchor = format!("#{id}");
            for &link in &links {
                spy.remove_class(link, "active");
                spy.remove_attribute(link, "aria-current");
                if spy.attribute(link, "href").as_deref() == Some(anchor.as_str()) {
                    spy.add_class(link, "active");
                    spy.set_attribute(link, "aria-current", "page");
                }
            }
        }),
    );
    for section in sections {
        page.observe(observer, section);
    }
    Ok(())
}
