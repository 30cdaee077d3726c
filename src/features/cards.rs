use crate::error::PageResult;
use crate::page::{EventKind, EventTarget, Query, handler};

use super::PageContext;

pub(super) fn install(cx: &PageContext) -> PageResult<()> {
    let page = cx.page.as_ref();
    let motion = cx.config.motion;
    let transition = motion.effective(motion.hover).css_transition(&["all"]);

    for card in page.query_all(None, &Query::class("card")) {
        page.set_style(card, "transition", &transition);

        let lifted = cx.page.clone();
        page.add_listener(
            EventTarget::Element(card),
            EventKind::MouseEnter,
            handler(move |_| lifted.set_style(card, "transform", "translateY(-8px) scale(1.02)")),
        );
        let settled = cx.page.clone();
        page.add_listener(
            EventTarget::Element(card),
            EventKind::MouseLeave,
            handler(move |_| settled.set_style(card, "transform", "translateY(0) scale(1)")),
        );
    }
    Ok(())
}
