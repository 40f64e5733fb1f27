//! Domain logic for the dynamic form engine.
//!
//! Pure logic only: the field type registry, form definitions and their
//! editor, audience resolution, step planning, submission validation and
//! lifecycle, the attachment store interface and the lookup cache. Nothing in
//! this crate talks to the database or HTTP.

pub mod attachments;
pub mod audience;
pub mod editor;
pub mod error;
pub mod field_types;
pub mod form;
pub mod lookup_cache;
pub mod pagination;
pub mod roles;
pub mod steps;
pub mod submission;
pub mod types;
