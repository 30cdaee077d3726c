use crate::i18n::I18nManager;

use super::fields::FieldRole;

pub const NAME_MIN_CHARS: usize = 2;
pub const NAME_MAX_CHARS: usize = 50;
pub const PHONE_MIN_CHARS: usize = 10;
pub const PHONE_MAX_CHARS: usize = 20;
pub const MESSAGE_MIN_CHARS: usize = 10;

/// A single check applied to a field's trimmed value.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Rule {
    Required,
    Name,
    Email,
    /// Passes on empty input; the phone field is optional.
    Phone,
    MinLength(usize),
    Checked,
}

/// What a rule sees of a form control.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct FieldInput {
    pub value: String,
    pub checked: bool,
}

impl FieldInput {
    pub fn text(value: &str) -> Self {
        Self {
            value: value.trim().to_string(),
            checked: false,
        }
    }

    pub fn checkbox(checked: bool) -> Self {
        Self {
            value: String::new(),
            checked,
        }
    }
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct FieldError {
    pub role: FieldRole,
    pub rule: Rule,
    pub message: String,
}

impl Rule {
    pub fn check(self, input: &FieldInput) -> bool {
        match self {
            Rule::Required => !input.value.is_empty(),
            Rule::Name => is_valid_name(&input.value),
            Rule::Email => is_valid_email(&input.value),
            Rule::Phone => is_valid_phone(&input.value),
            Rule::MinLength(min) => has_min_length(&input.value, min),
            Rule::Checked => input.checked,
        }
    }

    fn message_key(self, role: FieldRole) -> String {
        let field = role.message_prefix();
        match self {
            Rule::Required | Rule::Checked => format!("form.{field}.required"),
            Rule::MinLength(_) => format!("form.{field}.too_short"),
            Rule::Name | Rule::Email | Rule::Phone => format!("form.{field}.invalid"),
        }
    }

    pub fn message(self, role: FieldRole, i18n: &I18nManager) -> String {
        let key = self.message_key(role);
        match self {
            Rule::MinLength(min) => i18n.t_with(&key, &[("min", &min.to_string())]),
            _ => i18n.t(&key),
        }
    }
}

/// Runs the role's rules in order and reports the first failure.
pub fn check_field(
    role: FieldRole,
    input: &FieldInput,
    i18n: &I18nManager,
) -> Result<(), FieldError> {
    for rule in role.rules() {
        if !rule.check(input) {
            return Err(FieldError {
                role,
                rule: *rule,
                message: rule.message(role, i18n),
            });
        }
    }
    Ok(())
}

/// Letters (ASCII and U+00C0..=U+00FF), whitespace, hyphens and apostrophes; 2 to 50 chars.
pub fn is_valid_name(name: &str) -> bool {
    let count = name.chars().count();
    (NAME_MIN_CHARS..=NAME_MAX_CHARS).contains(&count)
        && name.chars().all(|ch| {
            ch.is_ascii_alphabetic()
                || ('\u{C0}'..='\u{FF}').contains(&ch)
                || ch.is_whitespace()
                || ch == '-'
                || ch == '\''
        })
}

/// `local@domain.tld`: no whitespace, one `@`, and a dot inside the domain.
pub fn is_valid_email(email: &str) -> bool {
    if email.chars().any(char::is_whitespace) {
        return false;
    }
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    if local.is_empty() || domain.contains('@') {
        return false;
    }
    domain
        .char_indices()
        .any(|(index, ch)| ch == '.' && index > 0 && index + 1 < domain.len())
}

/// Empty passes. Otherwise 10 to 20 chars of digits, whitespace, `+`, `-`, `(`, `)`.
pub fn is_valid_phone(phone: &str) -> bool {
    if phone.is_empty() {
        return true;
    }
    let count = phone.chars().count();
    (PHONE_MIN_CHARS..=PHONE_MAX_CHARS).contains(&count)
        && phone
            .chars()
            .all(|ch| ch.is_ascii_digit() || ch.is_whitespace() || "+-()".contains(ch))
}

/// Length in UTF-16 code units, the way the browser measures form text.
pub fn has_min_length(text: &str, min: usize) -> bool {
    text.encode_utf16().count() >= min
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_follow_letter_rules() {
        for valid in ["Jean-Luc", "Zoë", "O'Brien", "Anna Maria", "Jö"] {
            assert!(is_valid_name(valid), "{valid} should be valid");
        }
        for invalid in ["J", "R2D2", "Anna_Maria", "Łukasz", "a".repeat(51).as_str()] {
            assert!(!is_valid_name(invalid), "{invalid} should be invalid");
        }
        assert!(is_valid_name(&"a".repeat(50)));
    }

    #[test]
    fn emails_need_at_and_dotted_domain() {
        assert!(is_valid_email("a@b.co"));
        assert!(is_valid_email("first.last@sub.example.org"));
        for invalid in [
            "plain",
            "a@b",
            "@b.co",
            "a@.co",
            "a@b.",
            "a @b.co",
            "a@b@c.co",
            "a.b.co",
        ] {
            assert!(!is_valid_email(invalid), "{invalid} should be invalid");
        }
    }

    #[test]
    fn phone_is_optional_but_shaped_when_present() {
        assert!(is_valid_phone(""));
        assert!(is_valid_phone("+1 (555) 123-4567"));
        assert!(is_valid_phone("0301234567"));
        assert!(!is_valid_phone("123"));
        assert!(!is_valid_phone("0301234567x"));
        assert!(!is_valid_phone(&"1".repeat(21)));
    }

    #[test]
    fn message_length_counts_utf16_units() {
        assert!(!has_min_length("too short", MESSAGE_MIN_CHARS));
        assert!(has_min_length("long enough", MESSAGE_MIN_CHARS));
        assert!(has_min_length("🙂🙂🙂🙂🙂", MESSAGE_MIN_CHARS));
    }

    #[test]
    fn first_failing_rule_wins() {
        let i18n = I18nManager::with_locale("de");
        let empty = check_field(FieldRole::Email, &FieldInput::text("   "), &i18n)
            .expect_err("empty email");
        assert_eq!(empty.rule, Rule::Required);
        assert_eq!(empty.message, "Bitte geben Sie Ihre E-Mail-Adresse ein.");

        let shaped = check_field(FieldRole::Email, &FieldInput::text("nope"), &i18n)
            .expect_err("bad email");
        assert_eq!(shaped.rule, Rule::Email);

        let short = check_field(FieldRole::Message, &FieldInput::text("hi"), &i18n)
            .expect_err("short message");
        assert_eq!(
            short.message,
            "Die Nachricht muss mindestens 10 Zeichen lang sein."
        );

        assert!(check_field(FieldRole::Phone, &FieldInput::text(""), &i18n).is_ok());
        let unchecked = check_field(FieldRole::Privacy, &FieldInput::checkbox(false), &i18n)
            .expect_err("privacy unchecked");
        assert_eq!(
            unchecked.message,
            "Bitte akzeptieren Sie die Datenschutzerklärung."
        );
    }
}
