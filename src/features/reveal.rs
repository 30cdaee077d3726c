use futures_timer::Delay;

use crate::error::PageResult;
use crate::page::{Length, Query, VisibilityOptions, visibility_handler};

use super::PageContext;

fn reveal_targets() -> Query {
    Query::any([
        Query::class("card"),
        Query::class("btn"),
        Query::tag("img"),
        Query::tag("h1"),
        Query::tag("h2"),
        Query::tag("h3"),
        Query::tag("p"),
        Query::class("form-control"),
    ])
}

/// Fades content in from below the first time it scrolls into view.
pub(super) fn install(cx: &PageContext) -> PageResult<()> {
    let motion = cx.config.motion;
    if !motion.animates() {
        tracing::debug!("motion disabled; scroll reveal not wired");
        return Ok(());
    }
    let transition = motion.effective(motion.reveal);
    let frame = cx.config.timings.frame;

    let page = cx.page.clone();
    let options = VisibilityOptions::default().threshold(0.1).root_margin([
        Length::Px(0.0),
        Length::Px(0.0),
        Length::Px(-100.0),
        Length::Px(0.0),
    ]);
    let observer = cx.page.create_observer(
        options,
        visibility_handler(move |observer, entry| {
            if !entry.is_intersecting {
                return;
            }
            let element = entry.target;
            page.set_style(element, "opacity", "0");
            page.set_style(
                element,
                "transform",
                &format!("translateY({}px)", transition.offset_px),
            );
            page.unobserve(observer, element);

            let animated = page.clone();
            page.spawn(Box::pin(async move {
                Delay::new(frame).await;
                animated.set_style(
                    element,
                    "transition",
                    &transition.css_transition(&["opacity", "transform"]),
                );
                animated.set_style(element, "opacity", "1");
                animated.set_style(element, "transform", "translateY(0)");
            }));
        }),
    );

    let targets = cx.page.query_all(None, &reveal_targets());
    tracing::debug!(count = targets.len(), "observing elements for scroll reveal");
    for element in targets {
        cx.page.observe(observer, element);
    }
    Ok(())
}
