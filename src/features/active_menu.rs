use crate::error::PageResult;
use crate::page::Query;

use super::PageContext;

fn same_page(link_path: &str, current_path: &str) -> bool {
    link_path == current_path
        || (current_path == "/" && link_path == "/index.html")
        || (current_path == "/index.html" && link_path == "/")
}

/// Marks the nav link of the current page. Only the first match is marked.
pub(super) fn install(cx: &PageContext) -> PageResult<()> {
    let page = cx.page.as_ref();
    let current_path = page.pathname();
    let links = page.query_all(None, &Query::class("nav-link"));
    for &link in &links {
        page.remove_attribute(link, "aria-current");
        page.remove_class(link, "active");
    }

    let current = links.into_iter().find(|&link| {
        page.attribute(link, "href")
            .and_then(|href| page.resolve_url(&href))
            .is_some_and(|url| same_page(url.path(), &current_path))
    });
    match current {
        Some(link) => {
            page.set_attribute(link, "aria-current", "page");
            page.add_class(link, "active");
        }
        None => tracing::debug!(%current_path, "no nav link for current page"),
    }
    Ok(())
}
