use std::collections::VecDeque;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock};
use std::time::Duration;

use futures_timer::Delay;

use crate::assets::{Stylesheet, inject_stylesheet};
use crate::error::{PageError, PageResult, read_lock, write_lock};
use crate::motion::MotionTransition;
use crate::page::{ElementId, Page};

#[derive(Clone, Copy, Debug, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct NotificationId(pub u64);

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Severity {
    Info,
    Success,
    Danger,
}

impl Severity {
    pub fn css_class(self) -> &'static str {
        match self {
            Severity::Info => "alert-info",
            Severity::Success => "alert-success",
            Severity::Danger => "alert-danger",
        }
    }
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Notification {
    pub id: NotificationId,
    pub message: String,
    pub severity: Severity,
    pub element: ElementId,
}

#[derive(Default)]
struct NotifierState {
    container: Option<ElementId>,
    live: VecDeque<Notification>,
}

/// Stacks transient messages in a fixed corner of the page.
///
/// Each message removes itself after the display duration, playing the exit
/// animation first. There is no limit and no deduplication.
#[derive(Clone)]
pub struct Notifier {
    page: Arc<dyn Page>,
    display: Duration,
    transition: MotionTransition,
    next_id: Arc<AtomicU64>,
    state: Arc<RwLock<NotifierState>>,
}

impl Notifier {
    pub fn new(page: Arc<dyn Page>, display: Duration, transition: MotionTransition) -> Self {
        Self {
            page,
            display,
            transition,
            next_id: Arc::new(AtomicU64::new(0)),
            state: Arc::new(RwLock::new(NotifierState::default())),
        }
    }

    pub fn notify(&self, message: &str, severity: Severity) -> PageResult<NotificationId> {
        let id = NotificationId(self.next_id.fetch_add(1, Ordering::SeqCst) + 1);
        let container = self.container()?;

        let page = self.page.as_ref();
        let element = page.create_element("div");
        page.add_class(element, "alert");
        page.add_class(element, severity.css_class());
        page.set_attribute(element, "role", "alert");
        page.set_style(element, "margin-bottom", "10px");
        page.set_style(element, "padding", "15px");
        page.set_style(element, "border-radius", "8px");
        page.set_style(element, "box-shadow", "0 4px 12px rgba(0,0,0,0.15)");
        page.set_style(element, "animation", &self.transition.css_animation("slideIn"));
        page.set_text(element, message);
        page.append_child(container, element);

        write_lock::<_, PageError>(&self.state, "recording notification")?
            .live
            .push_back(Notification {
                id,
                message: message.to_string(),
                severity,
                element,
            });
        tracing::debug!(?severity, id = id.0, "notification shown");

        let notifier = self.clone();
        self.page.spawn(Box::pin(async move {
            Delay::new(notifier.display).await;
            notifier
                .page
                .set_style(element, "animation", &notifier.transition.css_animation("slideOut"));
            Delay::new(Duration::from_millis(u64::from(notifier.transition.duration_ms))).await;
            if let Err(error) = notifier.dismiss(id) {
                tracing::warn!(%error, id = id.0, "failed to dismiss notification");
            }
        }));
        Ok(id)
    }

    /// Removes a notification immediately. Returns `false` if it is already gone.
    pub fn dismiss(&self, id: NotificationId) -> PageResult<bool> {
        let mut state = write_lock::<_, PageError>(&self.state, "dismissing notification")?;
        let Some(index) = state.live.iter().position(|entry| entry.id == id) else {
            return Ok(false);
        };
        if let Some(entry) = state.live.remove(index) {
            self.page.remove(entry.element);
        }
        Ok(true)
    }

    /// Live notifications in arrival order.
    pub fn list(&self) -> PageResult<Vec<Notification>> {
        Ok(read_lock::<_, PageError>(&self.state, "listing notifications")?
            .live
            .iter()
            .cloned()
            .collect())
    }

    pub fn container_element(&self) -> PageResult<Option<ElementId>> {
        Ok(read_lock::<_, PageError>(&self.state, "reading notification container")?.container)
    }

    fn container(&self) -> PageResult<ElementId> {
        let mut state = write_lock::<_, PageError>(&self.state, "creating notification container")?;
        if let Some(container) = state.container {
            return Ok(container);
        }

        let page = self.page.as_ref();
        inject_stylesheet(page, Stylesheet::Notifications);
        let container = page.create_element("div");
        page.add_class(container, "notification-container");
        page.set_style(container, "position", "fixed");
        page.set_style(container, "top", "20px");
        page.set_style(container, "right", "20px");
        page.set_style(container, "z-index", "9999");
        page.set_style(container, "max-width", "400px");
        page.append_child(page.body(), container);
        state.container = Some(container);
        Ok(container)
    }
}
