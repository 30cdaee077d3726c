use crate::error::PageResult;
use crate::page::{EventKind, EventTarget, ScrollBehavior, handler};
use crate::timing::Throttle;

use super::PageContext;

const RESTING_SHADOW: &str = "0 4px 12px rgba(0,0,0,0.2)";

/// A floating button that appears once the page is scrolled down.
pub(super) fn install(cx: &PageContext) -> PageResult<()> {
    let page = cx.page.as_ref();
    let motion = cx.config.motion;

    let button = page.create_element("button");
    page.add_class(button, "scroll-to-top");
    page.set_text(button, "↑");
    page.set_attribute(button, "type", "button");
    page.set_attribute(button, "aria-label", &cx.i18n.t("scroll_to_top.label"));
    for (property, value) in [
        ("position", "fixed"),
        ("bottom", "30px"),
        ("right", "30px"),
        ("width", "50px"),
        ("height", "50px"),
        ("border-radius", "50%"),
        (
            "background",
            "linear-gradient(135deg, var(--color-primary), var(--color-secondary))",
        ),
        ("color", "white"),
        ("border", "none"),
        ("font-size", "24px"),
        ("cursor", "pointer"),
        ("opacity", "0"),
        ("visibility", "hidden"),
        ("z-index", "1000"),
        ("box-shadow", RESTING_SHADOW),
    ] {
        page.set_style(button, property, value);
    }
    page.set_style(
        button,
        "transition",
        &motion.effective(motion.hover).css_transition(&["all"]),
    );
    page.append_child(page.body(), button);

    let threshold = cx.config.scroll_to_top_threshold_px;
    let throttle = Throttle::new(cx.page.clone(), cx.config.timings.scroll_throttle);
    let scrolled = cx.page.clone();
    page.add_listener(
        EventTarget::Window,
        EventKind::Scroll,
        handler(move |_| {
            throttle.call(|| {
                let (opacity, visibility) = if scrolled.scroll_offset() > threshold {
                    ("1", "visible")
                } else {
                    ("0", "hidden")
                };
                scrolled.set_style(button, "opacity", opacity);
                scrolled.set_style(button, "visibility", visibility);
            });
        }),
    );

    let clicked = cx.page.clone();
    page.add_listener(
        EventTarget::Element(button),
        EventKind::Click,
        handler(move |_| clicked.scroll_to(0.0, ScrollBehavior::Smooth)),
    );

    let hovered = cx.page.clone();
    page.add_listener(
        EventTarget::Element(button),
        EventKind::MouseEnter,
        handler(move |_| {
            hovered.set_style(button, "transform", "translateY(-5px) scale(1.1)");
            hovered.set_style(button, "box-shadow", "0 6px 20px rgba(0,0,0,0.3)");
        }),
    );
    let left = cx.page.clone();
    page.add_listener(
        EventTarget::Element(button),
        EventKind::MouseLeave,
        handler(move |_| {
            left.set_style(button, "transform", "translateY(0) scale(1)");
            left.set_style(button, "box-shadow", RESTING_SHADOW);
        }),
    );
    Ok(())
}
