use std::time::{Duration, Instant};

use futures_timer::Delay;

use crate::error::PageResult;
use crate::page::{Query, VisibilityOptions, visibility_handler};

use super::PageContext;

/// Reads a counter target the lenient way number attributes are usually
/// written: surrounding whitespace and trailing text are ignored.
///
/// `" 1200+ "` is `1200`; `"-5"` is `-5`; `"many"` is `None`.
pub fn parse_count_target(raw: &str) -> Option<i64> {
    let raw = raw.trim_start();
    let (sign, digits) = match raw.as_bytes().first()? {
        b'-' => (-1, &raw[1..]),
        b'+' => (1, &raw[1..]),
        _ => (1, raw),
    };
    let end = digits
        .find(|ch: char| !ch.is_ascii_digit())
        .unwrap_or(digits.len());
    digits[..end].parse::<i64>().ok().map(|value| sign * value)
}

/// Value shown `elapsed` into an animation from zero to `target`.
fn frame_value(target: i64, elapsed: Duration, duration: Duration) -> Option<i64> {
    if elapsed >= duration {
        return None;
    }
    let progress = elapsed.as_secs_f64() / duration.as_secs_f64();
    Some((target as f64 * progress).floor() as i64)
}

/// Animates `[data-count]` elements up to their target once half visible.
pub(super) fn install(cx: &PageContext) -> PageResult<()> {
    let page = cx.page.as_ref();
    let counters = page.query_all(None, &Query::has_attr("data-count"));
    if counters.is_empty() {
        tracing::debug!("no counters; count-up not wired");
        return Ok(());
    }

    let counting = cx.page.clone();
    let i18n = cx.i18n.clone();
    let duration = cx.config.timings.count_up;
    let frame = cx.config.timings.frame;
    let observer = page.create_observer(
        VisibilityOptions::default().threshold(0.5),
        visibility_handler(move |observer, entry| {
            if !entry.is_intersecting {
                return;
            }
            let element = entry.target;
            counting.unobserve(observer, element);

            let raw = counting.attribute(element, "data-count").unwrap_or_default();
            let Some(target) = parse_count_target(&raw) else {
                tracing::warn!(%element, %raw, "unparsable count-up target");
                return;
            };

            let page = counting.clone();
            let i18n = i18n.clone();
            counting.spawn(Box::pin(async move {
                let started = Instant::now();
                while let Some(value) = frame_value(target, started.elapsed(), duration) {
                    page.set_text(element, &i18n.format_integer(value));
                    Delay::new(frame).await;
                }
                page.set_text(element, &i18n.format_integer(target));
            }));
        }),
    );
    for counter in counters {
        page.observe(observer, counter);
    }
    Ok(())
}
