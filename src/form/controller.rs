use std::collections::BTreeMap;
use std::sync::{Arc, RwLock};
use std::time::Duration;

use futures::future::{AbortHandle, Abortable};
use futures_timer::Delay;

use crate::assets::{Stylesheet, inject_stylesheet};
use crate::config::PageConfig;
use crate::error::{StatePoisoned, read_lock, write_lock};
use crate::feedback::{Notifier, Severity};
use crate::i18n::I18nManager;
use crate::page::{ElementId, EventKind, EventTarget, Page, Query, handler};

use super::fields::{FieldBinding, FieldRole, locate_fields};
use super::rules::{FieldInput, check_field};

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum SubmitState {
    Idle,
    Validating,
    Submitting,
    Done,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum SubmitOutcome {
    /// Validation failed; errors are shown and the form is idle again.
    Rejected,
    /// The submission task is running.
    Submitting,
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct FieldState {
    pub valid: bool,
    pub message: Option<String>,
}

impl Default for FieldState {
    fn default() -> Self {
        Self {
            valid: true,
            message: None,
        }
    }
}

impl FieldState {
    fn invalid(message: String) -> Self {
        Self {
            valid: false,
            message: Some(message),
        }
    }
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct FormOptions {
    pub submit_delay: Duration,
    pub redirect_delay: Duration,
    pub confirmation_page: String,
}

impl Default for FormOptions {
    fn default() -> Self {
        Self::from(&PageConfig::default())
    }
}

impl From<&PageConfig> for FormOptions {
    fn from(config: &PageConfig) -> Self {
        Self {
            submit_delay: config.timings.submit_delay,
            redirect_delay: config.timings.redirect_delay,
            confirmation_page: config.confirmation_page.clone(),
        }
    }
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct FormSnapshot {
    pub submit_state: SubmitState,
    pub submit_count: u32,
    /// Every state entered since the form was bound, starting with `Idle`.
    pub history: Vec<SubmitState>,
    pub fields: BTreeMap<FieldRole, FieldState>,
    pub is_valid: bool,
}

#[derive(Debug, Clone, Eq, PartialEq, thiserror::Error)]
pub enum FormError {
    #[error(transparent)]
    StatePoisoned(#[from] StatePoisoned),
    #[error("invalid submit state transition: {from:?} -> {to:?}")]
    InvalidStateTransition { from: SubmitState, to: SubmitState },
    #[error("form submit is already in progress")]
    AlreadySubmitting,
    #[error("form was already submitted")]
    AlreadySubmitted,
    #[error("form mixes field id schemes (`#{english}` and `#{german}`)")]
    AmbiguousFieldScheme {
        english: &'static str,
        german: &'static str,
    },
}

pub type FormResult<T> = Result<T, FormError>;

struct FormState {
    submit_state: SubmitState,
    submit_count: u32,
    history: Vec<SubmitState>,
    fields: BTreeMap<FieldRole, FieldState>,
    submission: Option<AbortHandle>,
    saved_label: Option<String>,
}

/// Validation and submit lifecycle of one contact form.
///
/// Errors are recomputed on every submit and cleared field by field as the
/// user edits. A successful submit locks the submit control, runs a single
/// abortable task that stands in for the network call, and then redirects.
#[derive(Clone)]
pub struct FormController {
    page: Arc<dyn Page>,
    form: ElementId,
    fields: Arc<Vec<FieldBinding>>,
    notifier: Notifier,
    i18n: I18nManager,
    options: Arc<FormOptions>,
    state: Arc<RwLock<FormState>>,
}

impl FormController {
    pub fn bind(
        page: Arc<dyn Page>,
        form: ElementId,
        notifier: Notifier,
        i18n: I18nManager,
        options: FormOptions,
    ) -> FormResult<Self> {
        let fields = locate_fields(page.as_ref(), form)?;
        let field_states = fields
            .iter()
            .map(|binding| (binding.role, FieldState::default()))
            .collect();
        Ok(Self {
            page,
            form,
            fields: Arc::new(fields),
            notifier,
            i18n,
            options: Arc::new(options),
            state: Arc::new(RwLock::new(FormState {
                submit_state: SubmitState::Idle,
                submit_count: 0,
                history: vec![SubmitState::Idle],
                fields: field_states,
                submission: None,
                saved_label: None,
            })),
        })
    }

    pub fn form(&self) -> ElementId {
        self.form
    }

    pub fn fields(&self) -> &[FieldBinding] {
        &self.fields
    }

    /// Wires input clearing on every control and submit handling on the form.
    pub fn install(&self) {
        let controls = self.page.query_all(
            Some(self.form),
            &Query::any([Query::tag("input"), Query::tag("textarea"), Query::tag("select")]),
        );
        for control in controls {
            let controller = self.clone();
            self.page.add_listener(
                EventTarget::Element(control),
                EventKind::Input,
                handler(move |event| {
                    let Some(element) = event.current_element() else {
                        return;
                    };
                    if let Err(error) = controller.clear_field_error(element) {
                        tracing::warn!(%error, %element, "failed to clear field error");
                    }
                }),
            );
        }

        let controller = self.clone();
        self.page.add_listener(
            EventTarget::Element(self.form),
            EventKind::Submit,
            handler(move |event| {
                event.prevent_default();
                event.stop_propagation();
                match controller.submit() {
                    Ok(outcome) => tracing::debug!(?outcome, "form submit handled"),
                    Err(error @ (FormError::AlreadySubmitting | FormError::AlreadySubmitted)) => {
                        tracing::debug!(%error, "ignoring repeated submit");
                    }
                    Err(error) => tracing::warn!(%error, "form submit failed"),
                }
            }),
        );
    }

    /// Validate, then submit if every field passed.
    pub fn submit(&self) -> FormResult<SubmitOutcome> {
        if !self.validate_form()? {
            return Ok(SubmitOutcome::Rejected);
        }
        self.submit_form()?;
        Ok(SubmitOutcome::Submitting)
    }

    /// Checks one field, showing or hiding its inline error.
    ///
    /// Returns `None` when the form has no control for `role`.
    pub fn validate_field(&self, role: FieldRole) -> FormResult<Option<FieldState>> {
        let Some(binding) = self.binding_for_role(role) else {
            return Ok(None);
        };
        let input = self.read_input(binding);
        let field = match check_field(role, &input, &self.i18n) {
            Ok(()) => {
                hide_field_error(self.page.as_ref(), binding.element);
                FieldState::default()
            }
            Err(error) => {
                show_field_error(self.page.as_ref(), binding.element, &error.message);
                FieldState::invalid(error.message)
            }
        };
        write_lock::<_, FormError>(&self.state, "writing field validation result")?
            .fields
            .insert(role, field.clone());
        Ok(Some(field))
    }

    /// Validates every present field. On failure the form returns to idle and
    /// a single danger notification is shown.
    pub fn validate_form(&self) -> FormResult<bool> {
        {
            let mut state = write_lock::<_, FormError>(&self.state, "starting validation")?;
            match state.submit_state {
                SubmitState::Submitting => return Err(FormError::AlreadySubmitting),
                SubmitState::Done => return Err(FormError::AlreadySubmitted),
                SubmitState::Idle | SubmitState::Validating => {}
            }
            transition_submit_state(&mut state, SubmitState::Validating)?;
            state.submit_count = state.submit_count.saturating_add(1);
        }

        let mut is_valid = true;
        for binding in self.fields.iter() {
            if let Some(field) = self.validate_field(binding.role)? {
                is_valid &= field.valid;
            }
        }

        if !is_valid {
            {
                let mut state =
                    write_lock::<_, FormError>(&self.state, "handling validation failure")?;
                transition_submit_state(&mut state, SubmitState::Idle)?;
            }
            let message = self.i18n.t("form.check_input");
            if let Err(error) = self.notifier.notify(&message, Severity::Danger) {
                tracing::warn!(%error, "failed to show validation notification");
            }
        }
        Ok(is_valid)
    }

    /// Locks the submit control and starts the simulated submission.
    ///
    /// Only valid right after a successful [`FormController::validate_form`].
    pub fn submit_form(&self) -> FormResult<()> {
        let button = self.submit_button();
        let (abort, registration) = AbortHandle::new_pair();
        {
            let mut state = write_lock::<_, FormError>(&self.state, "moving to submitting")?;
            transition_submit_state(&mut state, SubmitState::Submitting)?;
            state.submission = Some(abort);
            state.saved_label = button.map(|button| self.page.text(button));
        }
        if let Some(button) = button {
            self.show_busy(button);
        }
        tracing::info!(form = %self.form, "form submission started");

        let controller = self.clone();
        let submission = Abortable::new(
            async move { controller.run_submission().await },
            registration,
        );
        self.page.spawn(Box::pin(async move {
            if submission.await.is_err() {
                tracing::debug!("form submission aborted");
            }
        }));
        Ok(())
    }

    /// Aborts a running submission and unlocks the submit control.
    ///
    /// Returns `false` when nothing was submitting.
    pub fn cancel_submission(&self) -> FormResult<bool> {
        let (abort, label) = {
            let mut state = write_lock::<_, FormError>(&self.state, "cancelling submission")?;
            if state.submit_state != SubmitState::Submitting {
                return Ok(false);
            }
            transition_submit_state(&mut state, SubmitState::Idle)?;
            (state.submission.take(), state.saved_label.take())
        };
        if let Some(abort) = abort {
            abort.abort();
        }
        if let Some(button) = self.submit_button() {
            self.page.set_disabled(button, false);
            self.page.remove_attribute(button, "aria-busy");
            if let Some(label) = label {
                self.page.set_text(button, &label);
            }
        }
        tracing::info!(form = %self.form, "form submission cancelled");
        Ok(true)
    }

    /// Hides the inline error of `element` and marks its field valid again.
    pub fn clear_field_error(&self, element: ElementId) -> FormResult<()> {
        hide_field_error(self.page.as_ref(), element);
        if let Some(binding) = self.fields.iter().find(|binding| binding.element == element) {
            write_lock::<_, FormError>(&self.state, "clearing field error")?
                .fields
                .insert(binding.role, FieldState::default());
        }
        Ok(())
    }

    pub fn snapshot(&self) -> FormResult<FormSnapshot> {
        let state = read_lock::<_, FormError>(&self.state, "creating form snapshot")?;
        Ok(FormSnapshot {
            submit_state: state.submit_state,
            submit_count: state.submit_count,
            history: state.history.clone(),
            fields: state.fields.clone(),
            is_valid: state.fields.values().all(|field| field.valid),
        })
    }

    pub fn submit_state(&self) -> FormResult<SubmitState> {
        Ok(read_lock::<_, FormError>(&self.state, "reading submit state")?.submit_state)
    }

    async fn run_submission(&self) {
        Delay::new(self.options.submit_delay).await;
        if let Err(error) = self.finish_submission() {
            tracing::warn!(%error, "failed to complete form submission");
            return;
        }
        let message = self.i18n.t("form.sent");
        if let Err(error) = self.notifier.notify(&message, Severity::Success) {
            tracing::warn!(%error, "failed to show success notification");
        }

        Delay::new(self.options.redirect_delay).await;
        tracing::info!(target = %self.options.confirmation_page, "redirecting after submit");
        self.page.navigate(&self.options.confirmation_page);
    }

    fn finish_submission(&self) -> FormResult<()> {
        let mut state = write_lock::<_, FormError>(&self.state, "completing submission")?;
        transition_submit_state(&mut state, SubmitState::Done)?;
        state.submission = None;
        Ok(())
    }

    fn binding_for_role(&self, role: FieldRole) -> Option<FieldBinding> {
        self.fields
            .iter()
            .find(|binding| binding.role == role)
            .copied()
    }

    fn read_input(&self, binding: FieldBinding) -> FieldInput {
        if binding.role.is_checkbox() {
            FieldInput::checkbox(self.page.is_checked(binding.element))
        } else {
            FieldInput::text(&self.page.value(binding.element))
        }
    }

    fn submit_button(&self) -> Option<ElementId> {
        self.page.query_first(
            Some(self.form),
            &Query::tag("button").and(Query::attr_equals("type", "submit")),
        )
    }

    fn show_busy(&self, button: ElementId) {
        let page = self.page.as_ref();
        inject_stylesheet(page, Stylesheet::Spinner);
        page.set_disabled(button, true);
        page.set_attribute(button, "aria-busy", "true");
        page.set_text(button, &self.i18n.t("form.sending"));

        let spinner = page.create_element("span");
        page.set_attribute(spinner, "class", "spinner-border spinner-border-sm me-2");
        page.set_style(spinner, "width", "1rem");
        page.set_style(spinner, "height", "1rem");
        page.set_style(spinner, "border", "2px solid currentColor");
        page.set_style(spinner, "border-right-color", "transparent");
        page.set_style(spinner, "border-radius", "50%");
        page.set_style(spinner, "display", "inline-block");
        page.set_style(spinner, "animation", "spinner 0.75s linear infinite");
        page.append_child(button, spinner);
    }
}

fn transition_submit_state(state: &mut FormState, next: SubmitState) -> FormResult<()> {
    let current = state.submit_state;
    if current == next {
        return Ok(());
    }

    let allowed = matches!(
        (current, next),
        (SubmitState::Idle, SubmitState::Validating)
            | (SubmitState::Validating, SubmitState::Idle)
            | (SubmitState::Validating, SubmitState::Submitting)
            | (SubmitState::Submitting, SubmitState::Done)
            | (SubmitState::Submitting, SubmitState::Idle)
    );
    if !allowed {
        return Err(FormError::InvalidStateTransition {
            from: current,
            to: next,
        });
    }
    state.submit_state = next;
    state.history.push(next);
    Ok(())
}

const INVALID_CLASS: &str = "is-invalid";
const FEEDBACK_CLASS: &str = "invalid-feedback";

fn feedback_element(page: &dyn Page, field: ElementId) -> Option<ElementId> {
    let parent = page.parent(field)?;
    page.query_first(Some(parent), &Query::class(FEEDBACK_CLASS))
}

fn show_field_error(page: &dyn Page, field: ElementId, message: &str) {
    page.add_class(field, INVALID_CLASS);
    let feedback = match feedback_element(page, field) {
        Some(feedback) => feedback,
        None => {
            let feedback = page.create_element("div");
            page.add_class(feedback, FEEDBACK_CLASS);
            if let Some(parent) = page.parent(field) {
                page.append_child(parent, feedback);
            }
            feedback
        }
    };
    page.set_text(feedback, message);
    page.set_style(feedback, "display", "block");
}

fn hide_field_error(page: &dyn Page, field: ElementId) {
    page.remove_class(field, INVALID_CLASS);
    if let Some(feedback) = feedback_element(page, field) {
        page.set_style(feedback, "display", "none");
    }
}
