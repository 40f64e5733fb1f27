//! Form definition model and save-time checks.
//!
//! A [`FormDraft`] is what an author sends on create/update. The server
//! re-validates it with [`FormDraft::into_validated`] regardless of any
//! client-side checks: non-empty title, fields and target roles, the
//! per-field invariants, and a dense renumbering of `order`.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::error::CoreError;
use crate::field_types::FieldKind;
use crate::roles::Role;
use crate::types::DbId;

/// Maximum title length accepted on save.
pub const MAX_TITLE_LEN: u64 = 255;

// ---------------------------------------------------------------------------
// Fields
// ---------------------------------------------------------------------------

/// One selectable option of a `select`, `radio` or `checkbox` field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldOption {
    pub label: String,
    pub value: String,
}

/// Per-field validation bounds. Which keys apply depends on the field type.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FieldValidation {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_length: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_length: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_files: Option<u32>,
    /// Maximum size of a single attachment in bytes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_size: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FormField {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: FieldKind,
    pub label: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub placeholder: Option<String>,
    #[serde(default)]
    pub required: bool,
    #[serde(default)]
    pub order: u32,
    #[serde(default)]
    pub options: Vec<FieldOption>,
    #[serde(default)]
    pub validation: FieldValidation,
}

impl FormField {
    /// The allowed option values, in declaration order.
    pub fn option_values(&self) -> impl Iterator<Item = &str> {
        self.options.iter().map(|o| o.value.as_str())
    }

    pub fn has_option(&self, value: &str) -> bool {
        self.option_values().any(|v| v == value)
    }
}

// ---------------------------------------------------------------------------
// Definition status
// ---------------------------------------------------------------------------

/// Lifecycle of a form *definition* (not of its submissions).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FormStatus {
    #[default]
    Draft,
    Active,
    Inactive,
}

impl FormStatus {
    pub fn from_str_db(s: &str) -> Result<Self, CoreError> {
        match s {
            "draft" => Ok(Self::Draft),
            "active" => Ok(Self::Active),
            "inactive" => Ok(Self::Inactive),
            _ => Err(CoreError::Validation(format!(
                "Invalid form status '{s}'. Must be one of: draft, active, inactive"
            ))),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Draft => "draft",
            Self::Active => "active",
            Self::Inactive => "inactive",
        }
    }
}

// ---------------------------------------------------------------------------
// Settings and audience
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormSettings {
    #[serde(default)]
    pub allow_multiple_submissions: bool,
    #[serde(default)]
    pub show_progress_bar: bool,
    #[serde(default = "default_submit_button_text")]
    pub submit_button_text: String,
    #[serde(default = "default_success_message")]
    pub success_message: String,
}

fn default_submit_button_text() -> String {
    "Submit".to_string()
}

fn default_success_message() -> String {
    "Your response has been recorded.".to_string()
}

impl Default for FormSettings {
    fn default() -> Self {
        Self {
            allow_multiple_submissions: false,
            show_progress_bar: false,
            submit_button_text: default_submit_button_text(),
            success_message: default_success_message(),
        }
    }
}

/// Who a form is aimed at. Empty `districts` and `None` attributes mean
/// "unrestricted" on that axis.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct AudienceTarget {
    #[validate(length(min = 1, message = "At least one target role is required"))]
    pub roles: Vec<Role>,
    #[serde(default)]
    pub districts: Vec<DbId>,
    #[serde(default)]
    pub gender: Option<String>,
    #[serde(default)]
    pub period: Option<String>,
    #[serde(default)]
    pub organization_type: Option<String>,
}

impl AudienceTarget {
    /// Attribute filters only take effect for exam-center managers.
    pub fn has_attribute_filters(&self) -> bool {
        self.roles.contains(&Role::ExamCenterManager)
    }
}

// ---------------------------------------------------------------------------
// Draft (create / update payload)
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct FormDraft {
    #[validate(length(min = 1, max = 255, message = "Title must be 1-255 characters"))]
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub status: FormStatus,
    #[validate(length(min = 1, message = "A form needs at least one field"))]
    pub fields: Vec<FormField>,
    #[validate(nested)]
    pub target: AudienceTarget,
    #[serde(default)]
    pub settings: FormSettings,
}

impl FormDraft {
    /// Re-validate a draft and normalize it for storage.
    ///
    /// Trims the title, strips inapplicable validation keys and options,
    /// de-duplicates target roles and districts, and renumbers `order`
    /// densely following the submitted order.
    pub fn into_validated(mut self) -> Result<Self, CoreError> {
        self.title = self.title.trim().to_string();
        self.validate()
            .map_err(|e| CoreError::Validation(e.to_string()))?;

        let mut seen_ids = HashSet::new();
        for field in &mut self.fields {
            if field.id.trim().is_empty() {
                return Err(CoreError::Validation("Every field needs an id".into()));
            }
            if !seen_ids.insert(field.id.clone()) {
                return Err(CoreError::Validation(format!(
                    "Duplicate field id '{}'",
                    field.id
                )));
            }
            sanitize_field(field)?;
        }

        self.fields.sort_by_key(|f| f.order);
        renumber(&mut self.fields);

        self.target.roles.sort();
        self.target.roles.dedup();
        self.target.districts.sort_unstable();
        self.target.districts.dedup();
        for attr in [
            &mut self.target.gender,
            &mut self.target.period,
            &mut self.target.organization_type,
        ] {
            if attr.as_deref().is_some_and(|s| s.trim().is_empty()) {
                *attr = None;
            }
        }

        Ok(self)
    }
}

/// Set `order = index` for every field.
pub fn renumber(fields: &mut [FormField]) {
    for (index, field) in fields.iter_mut().enumerate() {
        field.order = index as u32;
    }
}

/// Enforce the per-type invariants on a single field.
fn sanitize_field(field: &mut FormField) -> Result<(), CoreError> {
    let spec = field.kind.spec();

    if field.label.trim().is_empty() {
        return Err(CoreError::Validation(format!(
            "Field '{}' needs a label",
            field.id
        )));
    }

    if spec.has_options {
        if field.options.is_empty() {
            return Err(CoreError::Validation(format!(
                "Field '{}' ({}) needs at least one option",
                field.label, field.kind
            )));
        }
        let mut values = HashSet::new();
        for option in &field.options {
            if option.value.is_empty() {
                return Err(CoreError::Validation(format!(
                    "Field '{}' has an option with an empty value",
                    field.label
                )));
            }
            if !values.insert(option.value.as_str()) {
                return Err(CoreError::Validation(format!(
                    "Field '{}' has duplicate option value '{}'",
                    field.label, option.value
                )));
            }
        }
    } else {
        field.options.clear();
    }

    let v = &mut field.validation;
    if !spec.length_bounds {
        v.min_length = None;
        v.max_length = None;
    }
    if !spec.value_bounds {
        v.min = None;
        v.max = None;
    }
    if !spec.file_limits {
        v.max_files = None;
        v.max_size = None;
    }

    if let (Some(min), Some(max)) = (v.min_length, v.max_length) {
        if min > max {
            return Err(CoreError::Validation(format!(
                "Field '{}': min_length {min} exceeds max_length {max}",
                field.label
            )));
        }
    }
    if let (Some(min), Some(max)) = (v.min, v.max) {
        if min > max {
            return Err(CoreError::Validation(format!(
                "Field '{}': min {min} exceeds max {max}",
                field.label
            )));
        }
    }
    if v.max_files == Some(0) {
        return Err(CoreError::Validation(format!(
            "Field '{}': max_files must be at least 1",
            field.label
        )));
    }

    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use serde_json::json;

    fn draft(fields: serde_json::Value) -> FormDraft {
        serde_json::from_value(json!({
            "title": "  Exam center readiness  ",
            "fields": fields,
            "target": { "roles": ["exam_center_manager"] },
        }))
        .unwrap()
    }

    #[test]
    fn status_from_str_roundtrip() {
        for status in [FormStatus::Draft, FormStatus::Active, FormStatus::Inactive] {
            assert_eq!(FormStatus::from_str_db(status.as_str()).unwrap(), status);
        }
        assert!(FormStatus::from_str_db("published").is_err());
    }

    #[test]
    fn draft_defaults_to_draft_status_and_default_settings() {
        let d = draft(json!([{ "id": "a", "type": "text", "label": "Name" }]));
        assert_eq!(d.status, FormStatus::Draft);
        assert!(!d.settings.allow_multiple_submissions);
        assert_eq!(d.settings.submit_button_text, "Submit");
    }

    #[test]
    fn validated_draft_trims_title() {
        let d = draft(json!([{ "id": "a", "type": "text", "label": "Name" }]))
            .into_validated()
            .unwrap();
        assert_eq!(d.title, "Exam center readiness");
    }

    #[test]
    fn blank_title_is_rejected() {
        let mut d = draft(json!([{ "id": "a", "type": "text", "label": "Name" }]));
        d.title = "   ".into();
        assert_matches!(d.into_validated(), Err(CoreError::Validation(_)));
    }

    #[test]
    fn empty_fields_are_rejected() {
        assert_matches!(draft(json!([])).into_validated(), Err(CoreError::Validation(_)));
    }

    #[test]
    fn empty_target_roles_are_rejected() {
        let mut d = draft(json!([{ "id": "a", "type": "text", "label": "Name" }]));
        d.target.roles.clear();
        assert_matches!(d.into_validated(), Err(CoreError::Validation(_)));
    }

    #[test]
    fn duplicate_field_ids_are_rejected() {
        let d = draft(json!([
            { "id": "a", "type": "text", "label": "One" },
            { "id": "a", "type": "text", "label": "Two" },
        ]));
        assert_matches!(d.into_validated(), Err(CoreError::Validation(_)));
    }

    #[test]
    fn choice_field_without_options_is_rejected() {
        let d = draft(json!([{ "id": "a", "type": "radio", "label": "Shift" }]));
        assert_matches!(d.into_validated(), Err(CoreError::Validation(_)));
    }

    #[test]
    fn duplicate_option_values_are_rejected() {
        let d = draft(json!([{
            "id": "a", "type": "select", "label": "Shift",
            "options": [{ "label": "AM", "value": "am" }, { "label": "Morning", "value": "am" }]
        }]));
        assert_matches!(d.into_validated(), Err(CoreError::Validation(_)));
    }

    #[test]
    fn inapplicable_options_and_bounds_are_stripped() {
        let d = draft(json!([{
            "id": "a", "type": "number", "label": "Seats",
            "options": [{ "label": "x", "value": "x" }],
            "validation": { "min": 1.0, "max": 500.0, "min_length": 3, "max_files": 2 }
        }]))
        .into_validated()
        .unwrap();
        let field = &d.fields[0];
        assert!(field.options.is_empty());
        assert_eq!(field.validation.min, Some(1.0));
        assert_eq!(field.validation.max, Some(500.0));
        assert_eq!(field.validation.min_length, None);
        assert_eq!(field.validation.max_files, None);
    }

    #[test]
    fn inverted_bounds_are_rejected() {
        let d = draft(json!([{
            "id": "a", "type": "text", "label": "Code",
            "validation": { "min_length": 10, "max_length": 2 }
        }]));
        assert_matches!(d.into_validated(), Err(CoreError::Validation(_)));
    }

    #[test]
    fn order_is_renumbered_densely_following_submitted_order() {
        let d = draft(json!([
            { "id": "c", "type": "text", "label": "C", "order": 40 },
            { "id": "a", "type": "text", "label": "A", "order": 3 },
            { "id": "b", "type": "text", "label": "B", "order": 17 },
        ]))
        .into_validated()
        .unwrap();
        let ids: Vec<_> = d.fields.iter().map(|f| f.id.as_str()).collect();
        let orders: Vec<_> = d.fields.iter().map(|f| f.order).collect();
        assert_eq!(ids, ["a", "b", "c"]);
        assert_eq!(orders, [0, 1, 2]);
    }

    #[test]
    fn blank_attribute_filters_become_unrestricted() {
        let mut d = draft(json!([{ "id": "a", "type": "text", "label": "Name" }]));
        d.target.gender = Some("  ".into());
        d.target.period = Some("متوسطه اول".into());
        let d = d.into_validated().unwrap();
        assert_eq!(d.target.gender, None);
        assert_eq!(d.target.period.as_deref(), Some("متوسطه اول"));
    }

    #[test]
    fn field_serializes_type_key_and_skips_empty_bounds() {
        let d = draft(json!([{ "id": "a", "type": "textarea", "label": "Notes" }]));
        let value = serde_json::to_value(&d.fields[0]).unwrap();
        assert_eq!(value["type"], "textarea");
        assert_eq!(value["validation"], json!({}));
    }
}
