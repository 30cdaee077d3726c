use crate::error::PageResult;
use crate::form::{FormController, FormError, FormOptions};
use crate::page::Query;

use super::PageContext;

/// Binds a [`FormController`] to every form on the page.
pub(super) fn install(cx: &PageContext) -> PageResult<()> {
    let options = FormOptions::from(cx.config.as_ref());
    for form in cx.page.query_all(None, &Query::tag("form")) {
        let bound = FormController::bind(
            cx.page.clone(),
            form,
            cx.notifier.clone(),
            cx.i18n.clone(),
            options.clone(),
        );
        let controller = match bound {
            Ok(controller) => controller,
            Err(error @ FormError::AmbiguousFieldScheme { .. }) => {
                tracing::warn!(%error, %form, "form left unwired");
                continue;
            }
            Err(error) => return Err(error.into()),
        };
        controller.install();
        tracing::debug!(%form, fields = controller.fields().len(), "form validation wired");
        cx.register_form(controller)?;
    }
    Ok(())
}
