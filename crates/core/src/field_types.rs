//! Field type registry.
//!
//! Every field kind is registered exactly once in [`FIELD_TYPES`] together
//! with its default configuration, the validation keys that apply to it and
//! its value validator. Adding a field kind means adding one variant and one
//! table row.

use std::sync::LazyLock;

use chrono::NaiveDate;
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::FieldError;
use crate::form::{FieldOption, FieldValidation, FormField};

/// Default maximum length of a short text answer.
pub const DEFAULT_TEXT_MAX_LENGTH: u32 = 255;

/// Default maximum length of a long text answer.
pub const DEFAULT_TEXTAREA_MAX_LENGTH: u32 = 2000;

/// Default maximum number of attachments per file field.
pub const DEFAULT_MAX_FILES: u32 = 1;

/// Default maximum size of one attachment (5 MiB).
pub const DEFAULT_MAX_FILE_SIZE: u64 = 5 * 1024 * 1024;

/// Accepted date format for `date` fields.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

static EMAIL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email pattern is valid")
});

static TEL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\+?[0-9]{7,15}$").expect("phone pattern is valid"));

// ---------------------------------------------------------------------------
// Field kinds
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldKind {
    Text,
    Textarea,
    Number,
    Email,
    Tel,
    Date,
    Select,
    Radio,
    Checkbox,
    File,
}

impl FieldKind {
    /// All kinds, in registry order.
    pub const ALL: [FieldKind; 10] = [
        Self::Text,
        Self::Textarea,
        Self::Number,
        Self::Email,
        Self::Tel,
        Self::Date,
        Self::Select,
        Self::Radio,
        Self::Checkbox,
        Self::File,
    ];

    fn index(self) -> usize {
        match self {
            Self::Text => 0,
            Self::Textarea => 1,
            Self::Number => 2,
            Self::Email => 3,
            Self::Tel => 4,
            Self::Date => 5,
            Self::Select => 6,
            Self::Radio => 7,
            Self::Checkbox => 8,
            Self::File => 9,
        }
    }

    /// The registry entry for this kind.
    pub fn spec(self) -> &'static FieldTypeSpec {
        &FIELD_TYPES[self.index()]
    }

    pub fn as_str(self) -> &'static str {
        self.spec().name
    }
}

impl std::fmt::Display for FieldKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Registry
// ---------------------------------------------------------------------------

/// Checks a non-empty answer against the field's declared rules.
pub type ValueValidator = fn(&FormField, &Value) -> Option<FieldError>;

/// Registry entry describing one field kind.
pub struct FieldTypeSpec {
    pub kind: FieldKind,
    /// Wire name, identical to the serde representation.
    pub name: &'static str,
    /// Label given to a freshly added field.
    pub default_label: &'static str,
    /// Whether the kind carries an option list.
    pub has_options: bool,
    /// Whether the answer is an array (checkbox values, attachments).
    pub multi_value: bool,
    pub length_bounds: bool,
    pub value_bounds: bool,
    pub file_limits: bool,
    pub default_validation: FieldValidation,
    pub validate: ValueValidator,
}

const NO_BOUNDS: FieldValidation = FieldValidation {
    min_length: None,
    max_length: None,
    min: None,
    max: None,
    max_files: None,
    max_size: None,
};

pub static FIELD_TYPES: [FieldTypeSpec; 10] = [
    FieldTypeSpec {
        kind: FieldKind::Text,
        name: "text",
        default_label: "Short answer",
        has_options: false,
        multi_value: false,
        length_bounds: true,
        value_bounds: false,
        file_limits: false,
        default_validation: FieldValidation {
            max_length: Some(DEFAULT_TEXT_MAX_LENGTH),
            ..NO_BOUNDS
        },
        validate: validate_text,
    },
    FieldTypeSpec {
        kind: FieldKind::Textarea,
        name: "textarea",
        default_label: "Long answer",
        has_options: false,
        multi_value: false,
        length_bounds: true,
        value_bounds: false,
        file_limits: false,
        default_validation: FieldValidation {
            max_length: Some(DEFAULT_TEXTAREA_MAX_LENGTH),
            ..NO_BOUNDS
        },
        validate: validate_text,
    },
    FieldTypeSpec {
        kind: FieldKind::Number,
        name: "number",
        default_label: "Number",
        has_options: false,
        multi_value: false,
        length_bounds: false,
        value_bounds: true,
        file_limits: false,
        default_validation: NO_BOUNDS,
        validate: validate_number,
    },
    FieldTypeSpec {
        kind: FieldKind::Email,
        name: "email",
        default_label: "Email address",
        has_options: false,
        multi_value: false,
        length_bounds: false,
        value_bounds: false,
        file_limits: false,
        default_validation: NO_BOUNDS,
        validate: validate_email,
    },
    FieldTypeSpec {
        kind: FieldKind::Tel,
        name: "tel",
        default_label: "Phone number",
        has_options: false,
        multi_value: false,
        length_bounds: false,
        value_bounds: false,
        file_limits: false,
        default_validation: NO_BOUNDS,
        validate: validate_tel,
    },
    FieldTypeSpec {
        kind: FieldKind::Date,
        name: "date",
        default_label: "Date",
        has_options: false,
        multi_value: false,
        length_bounds: false,
        value_bounds: false,
        file_limits: false,
        default_validation: NO_BOUNDS,
        validate: validate_date,
    },
    FieldTypeSpec {
        kind: FieldKind::Select,
        name: "select",
        default_label: "Dropdown",
        has_options: true,
        multi_value: false,
        length_bounds: false,
        value_bounds: false,
        file_limits: false,
        default_validation: NO_BOUNDS,
        validate: validate_single_choice,
    },
    FieldTypeSpec {
        kind: FieldKind::Radio,
        name: "radio",
        default_label: "Single choice",
        has_options: true,
        multi_value: false,
        length_bounds: false,
        value_bounds: false,
        file_limits: false,
        default_validation: NO_BOUNDS,
        validate: validate_single_choice,
    },
    FieldTypeSpec {
        kind: FieldKind::Checkbox,
        name: "checkbox",
        default_label: "Multiple choice",
        has_options: true,
        multi_value: true,
        length_bounds: false,
        value_bounds: false,
        file_limits: false,
        default_validation: NO_BOUNDS,
        validate: validate_multi_choice,
    },
    FieldTypeSpec {
        kind: FieldKind::File,
        name: "file",
        default_label: "File upload",
        has_options: false,
        multi_value: true,
        length_bounds: false,
        value_bounds: false,
        file_limits: true,
        default_validation: FieldValidation {
            max_files: Some(DEFAULT_MAX_FILES),
            max_size: Some(DEFAULT_MAX_FILE_SIZE),
            ..NO_BOUNDS
        },
        validate: validate_files,
    },
];

impl FieldTypeSpec {
    /// Options given to a freshly added choice field.
    pub fn default_options(&self) -> Vec<FieldOption> {
        if !self.has_options {
            return Vec::new();
        }
        (1..=2)
            .map(|n| FieldOption {
                label: format!("Option {n}"),
                value: format!("option_{n}"),
            })
            .collect()
    }

    /// Instantiate a field of this kind with its default configuration.
    pub fn instantiate(&self, id: String, order: u32) -> FormField {
        FormField {
            id,
            kind: self.kind,
            label: self.default_label.to_string(),
            description: None,
            placeholder: None,
            required: false,
            order,
            options: self.default_options(),
            validation: self.default_validation.clone(),
        }
    }
}

/// Generate a fresh field id.
pub fn new_field_id() -> String {
    format!("field_{}", uuid::Uuid::new_v4().simple())
}

// ---------------------------------------------------------------------------
// Emptiness and required checks
// ---------------------------------------------------------------------------

/// Whether an answer counts as "not given": missing, null, a blank string or
/// an empty array.
pub fn is_empty_value(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => true,
        Some(Value::String(s)) => s.trim().is_empty(),
        Some(Value::Array(items)) => items.is_empty(),
        Some(_) => false,
    }
}

/// Check one answer: the required rule first, then the kind's validator.
///
/// Empty optional answers pass without running the kind's rules.
pub fn check_value(field: &FormField, value: Option<&Value>) -> Option<FieldError> {
    if is_empty_value(value) {
        if field.required {
            return Some(FieldError::new(
                &field.id,
                &field.label,
                "required",
                format!("{} is required", field.label),
            ));
        }
        return None;
    }
    let value = value?;
    (field.kind.spec().validate)(field, value)
}

// ---------------------------------------------------------------------------
// Validators
// ---------------------------------------------------------------------------

fn type_error(field: &FormField, expected: &str) -> FieldError {
    FieldError::new(
        &field.id,
        &field.label,
        "type",
        format!("{} must be {expected}", field.label),
    )
}

fn validate_text(field: &FormField, value: &Value) -> Option<FieldError> {
    let Some(text) = value.as_str() else {
        return Some(type_error(field, "text"));
    };
    let len = text.chars().count();
    if let Some(min) = field.validation.min_length {
        if len < min as usize {
            return Some(FieldError::new(
                &field.id,
                &field.label,
                "min_length",
                format!("{} must be at least {min} characters", field.label),
            ));
        }
    }
    if let Some(max) = field.validation.max_length {
        if len > max as usize {
            return Some(FieldError::new(
                &field.id,
                &field.label,
                "max_length",
                format!("{} must be at most {max} characters", field.label),
            ));
        }
    }
    None
}

/// Numbers arrive either as JSON numbers or as numeric strings from forms.
pub fn numeric_value(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok().filter(|n| n.is_finite()),
        _ => None,
    }
}

fn validate_number(field: &FormField, value: &Value) -> Option<FieldError> {
    let Some(number) = numeric_value(value) else {
        return Some(type_error(field, "a number"));
    };
    if let Some(min) = field.validation.min {
        if number < min {
            return Some(FieldError::new(
                &field.id,
                &field.label,
                "min",
                format!("{} must be at least {min}", field.label),
            ));
        }
    }
    if let Some(max) = field.validation.max {
        if number > max {
            return Some(FieldError::new(
                &field.id,
                &field.label,
                "max",
                format!("{} must be at most {max}", field.label),
            ));
        }
    }
    None
}

fn validate_email(field: &FormField, value: &Value) -> Option<FieldError> {
    match value.as_str() {
        Some(s) if EMAIL_RE.is_match(s.trim()) => None,
        _ => Some(FieldError::new(
            &field.id,
            &field.label,
            "email",
            format!("{} must be a valid email address", field.label),
        )),
    }
}

fn validate_tel(field: &FormField, value: &Value) -> Option<FieldError> {
    let normalized = value
        .as_str()
        .map(|s| s.chars().filter(|c| !matches!(c, ' ' | '-')).collect::<String>());
    match normalized {
        Some(s) if TEL_RE.is_match(&s) => None,
        _ => Some(FieldError::new(
            &field.id,
            &field.label,
            "tel",
            format!("{} must be a valid phone number", field.label),
        )),
    }
}

fn validate_date(field: &FormField, value: &Value) -> Option<FieldError> {
    match value.as_str() {
        Some(s) if NaiveDate::parse_from_str(s.trim(), DATE_FORMAT).is_ok() => None,
        _ => Some(FieldError::new(
            &field.id,
            &field.label,
            "date",
            format!("{} must be a date in YYYY-MM-DD format", field.label),
        )),
    }
}

fn option_error(field: &FormField, value: &str) -> FieldError {
    FieldError::new(
        &field.id,
        &field.label,
        "option",
        format!("'{value}' is not a valid choice for {}", field.label),
    )
}

fn validate_single_choice(field: &FormField, value: &Value) -> Option<FieldError> {
    let Some(choice) = value.as_str() else {
        return Some(type_error(field, "one of the listed options"));
    };
    if field.has_option(choice) {
        None
    } else {
        Some(option_error(field, choice))
    }
}

fn validate_multi_choice(field: &FormField, value: &Value) -> Option<FieldError> {
    let Some(items) = value.as_array() else {
        return Some(type_error(field, "a list of options"));
    };
    for item in items {
        match item.as_str() {
            Some(choice) if field.has_option(choice) => {}
            Some(choice) => return Some(option_error(field, choice)),
            None => return Some(option_error(field, &item.to_string())),
        }
    }
    None
}

fn validate_files(field: &FormField, value: &Value) -> Option<FieldError> {
    let Some(items) = value.as_array() else {
        return Some(type_error(field, "a list of files"));
    };
    if let Some(max_files) = field.validation.max_files {
        if items.len() > max_files as usize {
            return Some(FieldError::new(
                &field.id,
                &field.label,
                "max_files",
                format!("{} accepts at most {max_files} file(s)", field.label),
            ));
        }
    }
    for item in items {
        let Some(size) = item.get("size").and_then(Value::as_u64) else {
            return Some(type_error(field, "a list of files"));
        };
        if let Some(max_size) = field.validation.max_size {
            if size > max_size {
                return Some(FieldError::new(
                    &field.id,
                    &field.label,
                    "max_size",
                    format!("Each file in {} must be at most {max_size} bytes", field.label),
                ));
            }
        }
    }
    None
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn field(kind: FieldKind) -> FormField {
        kind.spec().instantiate(format!("f_{kind}"), 0)
    }

    #[test]
    fn registry_rows_match_kind_order() {
        for (i, kind) in FieldKind::ALL.iter().enumerate() {
            assert_eq!(FIELD_TYPES[i].kind, *kind);
        }
    }

    #[test]
    fn registry_names_match_serde_names() {
        for kind in FieldKind::ALL {
            let serialized = serde_json::to_value(kind).unwrap();
            assert_eq!(serialized, json!(kind.as_str()));
        }
    }

    #[test]
    fn choice_kinds_get_default_options() {
        for kind in FieldKind::ALL {
            let f = field(kind);
            assert_eq!(!f.options.is_empty(), kind.spec().has_options, "{kind}");
        }
    }

    #[test]
    fn defaults_carry_type_bounds() {
        assert_eq!(field(FieldKind::Text).validation.max_length, Some(255));
        assert_eq!(field(FieldKind::File).validation.max_files, Some(1));
        assert_eq!(field(FieldKind::Number).validation, FieldValidation::default());
    }

    #[test]
    fn empty_values() {
        assert!(is_empty_value(None));
        assert!(is_empty_value(Some(&json!(null))));
        assert!(is_empty_value(Some(&json!("  "))));
        assert!(is_empty_value(Some(&json!([]))));
        assert!(!is_empty_value(Some(&json!(0))));
        assert!(!is_empty_value(Some(&json!(["a"]))));
    }

    #[test]
    fn required_missing_value_fails() {
        let mut f = field(FieldKind::Text);
        f.required = true;
        let err = check_value(&f, None).unwrap();
        assert_eq!(err.rule, "required");
    }

    #[test]
    fn optional_empty_value_skips_rules() {
        let mut f = field(FieldKind::Text);
        f.validation.min_length = Some(5);
        assert!(check_value(&f, Some(&json!(""))).is_none());
    }

    #[test]
    fn text_length_counts_characters() {
        let mut f = field(FieldKind::Text);
        f.validation.min_length = Some(3);
        f.validation.max_length = Some(4);
        assert!(check_value(&f, Some(&json!("تهران"))).is_some());
        assert!(check_value(&f, Some(&json!("قم"))).is_some());
        assert!(check_value(&f, Some(&json!("کرج"))).is_none());
    }

    #[test]
    fn text_rejects_non_string() {
        let f = field(FieldKind::Textarea);
        assert_eq!(check_value(&f, Some(&json!({"a": 1}))).unwrap().rule, "type");
    }

    #[test]
    fn number_bounds_and_numeric_strings() {
        let mut f = field(FieldKind::Number);
        f.validation.min = Some(1.0);
        f.validation.max = Some(10.0);
        assert!(check_value(&f, Some(&json!(5))).is_none());
        assert!(check_value(&f, Some(&json!("7.5"))).is_none());
        assert_eq!(check_value(&f, Some(&json!(0))).unwrap().rule, "min");
        assert_eq!(check_value(&f, Some(&json!("11"))).unwrap().rule, "max");
        assert_eq!(check_value(&f, Some(&json!("ten"))).unwrap().rule, "type");
    }

    #[test]
    fn email_format() {
        let f = field(FieldKind::Email);
        assert!(check_value(&f, Some(&json!("center@edu.ir"))).is_none());
        assert!(check_value(&f, Some(&json!("not-an-email"))).is_some());
    }

    #[test]
    fn tel_format_ignores_spaces_and_dashes() {
        let f = field(FieldKind::Tel);
        assert!(check_value(&f, Some(&json!("0912 345-6789"))).is_none());
        assert!(check_value(&f, Some(&json!("+989123456789"))).is_none());
        assert!(check_value(&f, Some(&json!("12ab"))).is_some());
    }

    #[test]
    fn date_format() {
        let f = field(FieldKind::Date);
        assert!(check_value(&f, Some(&json!("2026-03-21"))).is_none());
        assert!(check_value(&f, Some(&json!("2026-02-30"))).is_some());
        assert!(check_value(&f, Some(&json!("21/03/2026"))).is_some());
    }

    #[test]
    fn single_choice_must_be_an_option() {
        let f = field(FieldKind::Select);
        assert!(check_value(&f, Some(&json!("option_1"))).is_none());
        assert_eq!(check_value(&f, Some(&json!("option_9"))).unwrap().rule, "option");
    }

    #[test]
    fn checkbox_rejects_unknown_element() {
        let mut f = field(FieldKind::Checkbox);
        f.options = vec![
            FieldOption { label: "A".into(), value: "a".into() },
            FieldOption { label: "B".into(), value: "b".into() },
        ];
        assert!(check_value(&f, Some(&json!(["a", "b"]))).is_none());
        let err = check_value(&f, Some(&json!(["a", "c"]))).unwrap();
        assert_eq!(err.rule, "option");
        assert!(err.message.contains("'c'"));
    }

    #[test]
    fn files_respect_count_and_size() {
        let mut f = field(FieldKind::File);
        f.validation.max_files = Some(2);
        f.validation.max_size = Some(100);
        let ok = json!([{ "size": 10 }, { "size": 100 }]);
        let too_many = json!([{ "size": 1 }, { "size": 1 }, { "size": 1 }]);
        let too_big = json!([{ "size": 101 }]);
        assert!(check_value(&f, Some(&ok)).is_none());
        assert_eq!(check_value(&f, Some(&too_many)).unwrap().rule, "max_files");
        assert_eq!(check_value(&f, Some(&too_big)).unwrap().rule, "max_size");
    }
}
