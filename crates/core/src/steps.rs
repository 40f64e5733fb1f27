//! Step planning for multi-page form presentation.
//!
//! A form with the progress bar enabled is cut into contiguous chunks of
//! `ceil(field_count / step_count)` fields; otherwise it is a single step.
//! Moving forward out of a step requires every required field in it to be
//! answered; moving forward from the last step runs full validation.

use std::collections::HashMap;

use serde::Serialize;
use serde_json::Value;

use crate::error::{CoreError, FieldError};
use crate::field_types::is_empty_value;
use crate::form::FormField;
use crate::submission::{index_responses, validate_responses, ResponseEntry};

/// Default number of steps a progress-bar form is divided into.
pub const DEFAULT_STEP_COUNT: usize = 3;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Step {
    /// Zero-based position of the step.
    pub index: usize,
    pub fields: Vec<FormField>,
}

/// Partition `fields` (sorted by `order`) into presentation steps.
pub fn plan(fields: &[FormField], show_progress_bar: bool, step_count: usize) -> Vec<Step> {
    if fields.is_empty() {
        return Vec::new();
    }

    let mut ordered = fields.to_vec();
    ordered.sort_by_key(|f| f.order);

    if !show_progress_bar {
        return vec![Step {
            index: 0,
            fields: ordered,
        }];
    }

    let chunk_size = ordered.len().div_ceil(step_count.max(1));
    ordered
        .chunks(chunk_size)
        .enumerate()
        .map(|(index, chunk)| Step {
            index,
            fields: chunk.to_vec(),
        })
        .collect()
}

/// First required field in `step` that has no answer.
pub fn first_blocking_error(step: &Step, responses: &HashMap<&str, &Value>) -> Option<FieldError> {
    step.fields.iter().find_map(|field| {
        let value = responses.get(field.id.as_str()).copied();
        (field.required && is_empty_value(value)).then(|| {
            FieldError::new(
                &field.id,
                &field.label,
                "required",
                format!("{} is required", field.label),
            )
        })
    })
}

/// Result of trying to move forward.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Advance {
    /// Moved to the step with this index.
    Moved(usize),
    /// The last step passed full validation; the form may be submitted.
    ReadyToSubmit,
}

/// Tracks the current step while a user fills in a form.
#[derive(Debug, Clone)]
pub struct StepNavigator {
    steps: Vec<Step>,
    current: usize,
}

impl StepNavigator {
    pub fn new(steps: Vec<Step>) -> Self {
        Self { steps, current: 0 }
    }

    pub fn current(&self) -> usize {
        self.current
    }

    pub fn step_count(&self) -> usize {
        self.steps.len()
    }

    pub fn is_last(&self) -> bool {
        self.current + 1 >= self.steps.len()
    }

    /// Completion percentage shown by the progress bar.
    pub fn progress_percent(&self) -> u8 {
        if self.steps.is_empty() {
            return 100;
        }
        (((self.current + 1) * 100) / self.steps.len()) as u8
    }

    /// Try to move forward.
    ///
    /// Within the form only the current step's required fields are checked
    /// and the first violation is returned. On the last step every field of
    /// the form is validated and all violations are returned.
    pub fn advance(&mut self, responses: &[ResponseEntry]) -> Result<Advance, CoreError> {
        if self.is_last() {
            let all_fields: Vec<FormField> = self
                .steps
                .iter()
                .flat_map(|s| s.fields.iter().cloned())
                .collect();
            validate_responses(&all_fields, responses)?;
            return Ok(Advance::ReadyToSubmit);
        }

        let index = index_responses(responses);
        if let Some(error) = first_blocking_error(&self.steps[self.current], &index) {
            return Err(CoreError::FieldValidation(vec![error]));
        }
        self.current += 1;
        Ok(Advance::Moved(self.current))
    }

    /// Move backward without validating.
    pub fn back(&mut self) -> usize {
        self.current = self.current.saturating_sub(1);
        self.current
    }
}
