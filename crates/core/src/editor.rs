//! Local authoring operations over a form's field list.
//!
//! Fields live in an index-addressed `Vec`; every structural change runs a
//! renumbering pass so `order` is always the dense sequence `0..n-1` and
//! matches the vector position.

use crate::error::CoreError;
use crate::field_types::{new_field_id, FieldKind};
use crate::form::{renumber, FieldOption, FormField};

/// Suffix appended to the label of a duplicated field.
pub const DUPLICATE_LABEL_SUFFIX: &str = " (copy)";

#[derive(Debug, Clone, Default, PartialEq)]
pub struct FieldList {
    fields: Vec<FormField>,
}

impl FieldList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adopt an existing field array, ordering it by its stored `order`.
    pub fn from_fields(mut fields: Vec<FormField>) -> Self {
        fields.sort_by_key(|f| f.order);
        renumber(&mut fields);
        Self { fields }
    }

    pub fn fields(&self) -> &[FormField] {
        &self.fields
    }

    pub fn into_fields(self) -> Vec<FormField> {
        self.fields
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&FormField> {
        self.fields.iter().find(|f| f.id == id)
    }

    fn position(&self, id: &str) -> Result<usize, CoreError> {
        self.fields
            .iter()
            .position(|f| f.id == id)
            .ok_or_else(|| CoreError::Validation(format!("Unknown field id '{id}'")))
    }

    fn field_mut(&mut self, id: &str) -> Result<&mut FormField, CoreError> {
        let index = self.position(id)?;
        Ok(&mut self.fields[index])
    }

    /// Append a new field of `kind` with the registry defaults. Returns its id.
    pub fn add_field(&mut self, kind: FieldKind) -> String {
        let id = new_field_id();
        let field = kind.spec().instantiate(id.clone(), self.fields.len() as u32);
        self.fields.push(field);
        id
    }

    /// Clone a field under a fresh id and append it at the end of the list.
    pub fn duplicate_field(&mut self, id: &str) -> Result<String, CoreError> {
        let index = self.position(id)?;
        let mut copy = self.fields[index].clone();
        copy.id = new_field_id();
        copy.label.push_str(DUPLICATE_LABEL_SUFFIX);
        copy.order = self.fields.len() as u32;
        let new_id = copy.id.clone();
        self.fields.push(copy);
        Ok(new_id)
    }

    /// Move the field at `from` to `to` and renumber the whole list.
    pub fn move_field(&mut self, from: usize, to: usize) -> Result<(), CoreError> {
        let len = self.fields.len();
        if from >= len || to >= len {
            return Err(CoreError::Validation(format!(
                "Cannot move field from {from} to {to}: list has {len} field(s)"
            )));
        }
        let field = self.fields.remove(from);
        self.fields.insert(to, field);
        renumber(&mut self.fields);
        Ok(())
    }

    pub fn remove_field(&mut self, id: &str) -> Result<FormField, CoreError> {
        let index = self.position(id)?;
        let removed = self.fields.remove(index);
        renumber(&mut self.fields);
        Ok(removed)
    }

    /// Switch a field's kind, resetting options and validation to the new
    /// kind's defaults. Id, label, required flag and order are kept.
    pub fn change_kind(&mut self, id: &str, kind: FieldKind) -> Result<(), CoreError> {
        let field = self.field_mut(id)?;
        if field.kind == kind {
            return Ok(());
        }
        let spec = kind.spec();
        field.kind = kind;
        field.options = spec.default_options();
        field.validation = spec.default_validation.clone();
        Ok(())
    }

    /// Append an option to a choice field.
    pub fn add_option(&mut self, id: &str, option: FieldOption) -> Result<(), CoreError> {
        let field = self.field_mut(id)?;
        if !field.kind.spec().has_options {
            return Err(CoreError::Validation(format!(
                "Field '{}' ({}) does not take options",
                field.label, field.kind
            )));
        }
        if field.has_option(&option.value) {
            return Err(CoreError::Validation(format!(
                "Field '{}' already has option '{}'",
                field.label, option.value
            )));
        }
        field.options.push(option);
        Ok(())
    }

    /// Remove an option by value. The last option of a choice field cannot
    /// be removed.
    pub fn remove_option(&mut self, id: &str, value: &str) -> Result<FieldOption, CoreError> {
        let field = self.field_mut(id)?;
        let index = field
            .options
            .iter()
            .position(|o| o.value == value)
            .ok_or_else(|| {
                CoreError::Validation(format!("Field '{}' has no option '{value}'", field.label))
            })?;
        if field.options.len() == 1 {
            return Err(CoreError::Validation(format!(
                "Field '{}' must keep at least one option",
                field.label
            )));
        }
        Ok(field.options.remove(index))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    fn orders(list: &FieldList) -> Vec<u32> {
        list.fields().iter().map(|f| f.order).collect()
    }

    fn assert_dense(list: &FieldList) {
        let expected: Vec<u32> = (0..list.len() as u32).collect();
        assert_eq!(orders(list), expected);
    }

    #[test]
    fn add_appends_with_current_count_as_order() {
        let mut list = FieldList::new();
        let a = list.add_field(FieldKind::Text);
        let b = list.add_field(FieldKind::Radio);
        assert_ne!(a, b);
        assert_eq!(list.get(&b).unwrap().order, 1);
        assert_eq!(list.get(&b).unwrap().options.len(), 2);
    }

    #[test]
    fn duplicate_appends_at_end_with_new_id_and_suffix() {
        let mut list = FieldList::new();
        let first = list.add_field(FieldKind::Select);
        list.add_field(FieldKind::Text);
        let copy = list.duplicate_field(&first).unwrap();

        let original = list.get(&first).unwrap().clone();
        let duplicated = list.get(&copy).unwrap();
        assert_ne!(copy, first);
        assert_eq!(duplicated.order, 2);
        assert_eq!(duplicated.label, format!("{}{DUPLICATE_LABEL_SUFFIX}", original.label));
        assert_eq!(duplicated.options, original.options);
        assert_eq!(duplicated.validation, original.validation);
        assert_eq!(duplicated.kind, original.kind);
    }

    #[test]
    fn moving_last_to_first_renumbers_every_field() {
        let mut list = FieldList::new();
        let ids: Vec<String> = (0..5).map(|_| list.add_field(FieldKind::Text)).collect();

        list.move_field(4, 0).unwrap();

        assert_dense(&list);
        let new_ids: Vec<&str> = list.fields().iter().map(|f| f.id.as_str()).collect();
        assert_eq!(
            new_ids,
            [ids[4].as_str(), ids[0].as_str(), ids[1].as_str(), ids[2].as_str(), ids[3].as_str()]
        );
        for (old_order, id) in ids.iter().enumerate() {
            assert_ne!(list.get(id).unwrap().order as usize, old_order);
        }
    }

    #[test]
    fn move_out_of_range_is_rejected() {
        let mut list = FieldList::new();
        list.add_field(FieldKind::Text);
        assert_matches!(list.move_field(0, 3), Err(CoreError::Validation(_)));
    }

    #[test]
    fn order_stays_dense_after_mixed_operations() {
        let mut list = FieldList::new();
        let a = list.add_field(FieldKind::Text);
        let b = list.add_field(FieldKind::Number);
        list.add_field(FieldKind::Checkbox);
        list.duplicate_field(&b).unwrap();
        list.move_field(3, 1).unwrap();
        list.remove_field(&a).unwrap();
        list.add_field(FieldKind::File);
        list.move_field(0, 3).unwrap();
        list.duplicate_field(&b).unwrap();
        list.remove_field(&b).unwrap();
        assert_eq!(list.len(), 4);
        assert_dense(&list);
    }

    #[test]
    fn from_fields_sorts_and_renumbers() {
        let mut list = FieldList::new();
        list.add_field(FieldKind::Text);
        list.add_field(FieldKind::Date);
        let mut fields = list.into_fields();
        fields[0].order = 9;
        fields[1].order = 4;
        let list = FieldList::from_fields(fields);
        assert_eq!(list.fields()[0].kind, FieldKind::Date);
        assert_dense(&list);
    }

    #[test]
    fn change_kind_resets_options_and_bounds() {
        let mut list = FieldList::new();
        let id = list.add_field(FieldKind::Text);
        list.change_kind(&id, FieldKind::Checkbox).unwrap();
        let field = list.get(&id).unwrap();
        assert_eq!(field.kind, FieldKind::Checkbox);
        assert_eq!(field.options.len(), 2);
        assert_eq!(field.validation.max_length, None);

        list.change_kind(&id, FieldKind::Email).unwrap();
        assert!(list.get(&id).unwrap().options.is_empty());
    }

    #[test]
    fn option_toggling() {
        let mut list = FieldList::new();
        let id = list.add_field(FieldKind::Radio);
        list.add_option(&id, FieldOption { label: "Other".into(), value: "other".into() })
            .unwrap();
        assert_eq!(list.get(&id).unwrap().options.len(), 3);

        assert!(list
            .add_option(&id, FieldOption { label: "Dup".into(), value: "other".into() })
            .is_err());

        list.remove_option(&id, "option_1").unwrap();
        list.remove_option(&id, "option_2").unwrap();
        assert_matches!(list.remove_option(&id, "other"), Err(CoreError::Validation(_)));
    }

    #[test]
    fn options_on_non_choice_field_are_rejected() {
        let mut list = FieldList::new();
        let id = list.add_field(FieldKind::Number);
        let result = list.add_option(&id, FieldOption { label: "x".into(), value: "x".into() });
        assert_matches!(result, Err(CoreError::Validation(_)));
    }
}
