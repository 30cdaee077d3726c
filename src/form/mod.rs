mod controller;
mod fields;
mod rules;


pub use controller::{
    FieldState, FormController, FormError, FormOptions, FormResult, FormSnapshot, SubmitOutcome,
    SubmitState,
};
pub use fields::{FieldBinding, FieldRole, FieldScheme, locate_fields};
pub use rules::{
    FieldError, FieldInput, MESSAGE_MIN_CHARS, NAME_MAX_CHARS, NAME_MIN_CHARS, PHONE_MAX_CHARS,
    PHONE_MIN_CHARS, Rule, check_field, has_min_length, is_valid_email, is_valid_name,
    is_valid_phone,
};
