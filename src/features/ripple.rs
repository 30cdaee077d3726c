use std::time::Duration;

use futures_timer::Delay;

use crate::assets::{Stylesheet, inject_stylesheet};
use crate::error::PageResult;
use crate::page::{EventKind, EventTarget, Query, handler};

use super::PageContext;

/// Hover transitions and click ripples on buttons, nav links and cards.
pub(super) fn install(cx: &PageContext) -> PageResult<()> {
    let motion = cx.config.motion;
    if !motion.animates() {
        tracing::debug!("motion disabled; micro interactions not wired");
        return Ok(());
    }
    let hover = motion.effective(motion.hover).css_transition(&["all"]);
    let ripple = motion.effective(motion.ripple);
    let page = cx.page.as_ref();

    let targets = page.query_all(
        None,
        &Query::any([
            Query::class("btn"),
            Query::class("nav-link"),
            Query::class("card"),
        ]),
    );
    for target in targets {
        let hovered = cx.page.clone();
        let hover = hover.clone();
        page.add_listener(
            EventTarget::Element(target),
            EventKind::MouseEnter,
            handler(move |event| {
                if let Some(element) = event.current_element() {
                    hovered.set_style(element, "transition", &hover);
                }
            }),
        );

        let clicked = cx.page.clone();
        page.add_listener(
            EventTarget::Element(target),
            EventKind::Click,
            handler(move |event| {
                let Some(host) = event.current_element() else {
                    return;
                };
                let rect = clicked.bounding_rect(host);
                let size = rect.width.max(rect.height);
                let left = event.client_x - rect.left - size / 2.0;
                let top = event.client_y - rect.top - size / 2.0;

                let span = clicked.create_element("span");
                clicked.add_class(span, "ripple");
                for (property, value) in [
                    ("width", format!("{size}px")),
                    ("height", format!("{size}px")),
                    ("left", format!("{left}px")),
                    ("top", format!("{top}px")),
                    ("position", "absolute".to_string()),
                    ("border-radius", "50%".to_string()),
                    ("background", "rgba(255, 255, 255, 0.6)".to_string()),
                    ("transform", "scale(0)".to_string()),
                    ("animation", ripple.css_animation("ripple")),
                    ("pointer-events", "none".to_string()),
                ] {
                    clicked.set_style(span, property, &value);
                }

                let position = clicked.style(host, "position");
                if matches!(position.as_deref(), None | Some("static")) {
                    clicked.set_style(host, "position", "relative");
                }
                clicked.set_style(host, "overflow", "hidden");
                clicked.append_child(host, span);

                let cleanup = clicked.clone();
                let lifetime = Duration::from_millis(u64::from(ripple.duration_ms));
                clicked.spawn(Box::pin(async move {
                    Delay::new(lifetime).await;
                    if cleanup.is_connected(span) {
                        cleanup.remove(span);
                    }
                }));
            }),
        );
    }

    inject_stylesheet(page, Stylesheet::Ripple);
    Ok(())
}
