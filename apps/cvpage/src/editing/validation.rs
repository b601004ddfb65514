use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

// `[0-9]` rather than `\d`: the regex crate's `\d` matches every Unicode digit.
static PHONE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\+?[0-9]{7,15}$").expect("phone pattern compiles"));

static EMAIL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email pattern compiles"));

/// Fields that carry a shape check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValidatedField {
    Phone,
    Email,
}

/// Outcome of checking a single field value.
///
/// `Empty` is its own outcome: a blank field is absent, not malformed, and
/// never blocks a save.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldCheck {
    Valid,
    Invalid,
    Empty,
}

impl FieldCheck {
    pub fn blocks_save(self) -> bool {
        self == FieldCheck::Invalid
    }
}

impl ValidatedField {
    pub fn as_str(self) -> &'static str {
        match self {
            ValidatedField::Phone => "phone",
            ValidatedField::Email => "email",
        }
    }
}

/// Optional leading `+` followed by 7 to 15 ASCII digits. False on empty input.
pub fn is_valid_phone(text: &str) -> bool {
    PHONE_RE.is_match(text)
}

/// `local@domain.tld` shape. No RFC conformance beyond that.
pub fn is_valid_email(text: &str) -> bool {
    EMAIL_RE.is_match(text)
}

/// Trims `value` and classifies it for `field`.
pub fn check_field(field: ValidatedField, value: &str) -> FieldCheck {
    let value = value.trim();
    if value.is_empty() {
        return FieldCheck::Empty;
    }
    let ok = match field {
        ValidatedField::Phone => is_valid_phone(value),
        ValidatedField::Email => is_valid_email(value),
    };
    if ok {
        FieldCheck::Valid
    } else {
        FieldCheck::Invalid
    }
}
