use std::fmt::{Display, Formatter};

use crate::page::{ElementId, Page, Query};

use super::controller::{FormError, FormResult};
use super::rules::{MESSAGE_MIN_CHARS, Rule};

#[derive(Clone, Copy, Debug, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub enum FieldRole {
    FirstName,
    LastName,
    Email,
    Phone,
    Message,
    Privacy,
}

/// Id convention a contact form uses for its controls.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum FieldScheme {
    English,
    German,
}

impl FieldRole {
    pub const ALL: [FieldRole; 6] = [
        FieldRole::FirstName,
        FieldRole::LastName,
        FieldRole::Email,
        FieldRole::Phone,
        FieldRole::Message,
        FieldRole::Privacy,
    ];

    pub fn element_id(self, scheme: FieldScheme) -> &'static str {
        match (self, scheme) {
            (FieldRole::FirstName, FieldScheme::English) => "firstName",
            (FieldRole::FirstName, FieldScheme::German) => "vorname",
            (FieldRole::LastName, FieldScheme::English) => "lastName",
            (FieldRole::LastName, FieldScheme::German) => "nachname",
            (FieldRole::Email, _) => "email",
            (FieldRole::Phone, FieldScheme::English) => "phone",
            (FieldRole::Phone, FieldScheme::German) => "telefon",
            (FieldRole::Message, FieldScheme::English) => "message",
            (FieldRole::Message, FieldScheme::German) => "nachricht",
            (FieldRole::Privacy, FieldScheme::English) => "privacy",
            (FieldRole::Privacy, FieldScheme::German) => "datenschutz",
        }
    }

    /// Whether the two schemes name this field differently.
    fn scheme_specific(self) -> bool {
        self.element_id(FieldScheme::English) != self.element_id(FieldScheme::German)
    }

    pub fn rules(self) -> &'static [Rule] {
        match self {
            FieldRole::FirstName | FieldRole::LastName => &[Rule::Required, Rule::Name],
            FieldRole::Email => &[Rule::Required, Rule::Email],
            FieldRole::Phone => &[Rule::Phone],
            FieldRole::Message => &[Rule::Required, Rule::MinLength(MESSAGE_MIN_CHARS)],
            FieldRole::Privacy => &[Rule::Checked],
        }
    }

    pub fn is_checkbox(self) -> bool {
        self == FieldRole::Privacy
    }

    pub(super) fn message_prefix(self) -> &'static str {
        match self {
            FieldRole::FirstName => "first_name",
            FieldRole::LastName => "last_name",
            FieldRole::Email => "email",
            FieldRole::Phone => "phone",
            FieldRole::Message => "message",
            FieldRole::Privacy => "privacy",
        }
    }
}

impl Display for FieldRole {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.message_prefix())
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct FieldBinding {
    pub role: FieldRole,
    pub element: ElementId,
}

/// Finds the recognized controls inside `form`.
///
/// Fields are optional. A form mixing both id schemes is rejected instead of
/// picking one of the duplicates.
pub fn locate_fields(page: &dyn Page, form: ElementId) -> FormResult<Vec<FieldBinding>> {
    let lookup = |role: FieldRole, scheme: FieldScheme| {
        page.query_first(Some(form), &Query::id(role.element_id(scheme)))
    };

    let english = FieldRole::ALL
        .into_iter()
        .filter(|role| role.scheme_specific())
        .find(|role| lookup(*role, FieldScheme::English).is_some());
    let german = FieldRole::ALL
        .into_iter()
        .filter(|role| role.scheme_specific())
        .find(|role| lookup(*role, FieldScheme::German).is_some());

    let scheme = match (english, german) {
        (Some(english), Some(german)) => {
            return Err(FormError::AmbiguousFieldScheme {
                english: english.element_id(FieldScheme::English),
                german: german.element_id(FieldScheme::German),
            });
        }
        (None, Some(_)) => FieldScheme::German,
        _ => FieldScheme::English,
    };

    Ok(FieldRole::ALL
        .into_iter()
        .filter_map(|role| {
            lookup(role, scheme).map(|element| FieldBinding { role, element })
        })
        .collect())
}
