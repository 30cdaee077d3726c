use crate::assets::image_placeholder_uri;
use crate::error::PageResult;
use crate::page::{EventKind, EventTarget, Query, handler};

use super::PageContext;

/// Lazy loading by default, and a neutral placeholder for images that fail.
pub(super) fn install(cx: &PageContext) -> PageResult<()> {
    let page = cx.page.as_ref();
    let placeholder = image_placeholder_uri(&cx.i18n.t("image.placeholder"));

    for image in page.query_all(None, &Query::tag("img")) {
        if page.attribute(image, "loading").is_none() {
            page.set_attribute(image, "loading", "lazy");
        }

        let failed = cx.page.clone();
        let placeholder = placeholder.clone();
        page.add_listener(
            EventTarget::Element(image),
            EventKind::Error,
            handler(move |event| {
                let Some(image) = event.current_element() else {
                    return;
                };
                let src = failed.attribute(image, "src");
                tracing::debug!(%image, ?src, "image failed to load");
                failed.set_attribute(image, "src", &placeholder);
                failed.set_style(image, "object-fit", "contain");
            }),
        );
    }
    Ok(())
}
