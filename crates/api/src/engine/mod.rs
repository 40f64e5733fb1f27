//! Request-scoped orchestration shared by the form and submission handlers.
//!
//! - [`access`] -- loading forms and deciding who may view, edit or review them.
//! - [`submission`] -- the submit pipeline (audience check, validation,
//!   duplicate check, attachment upload, insert with rollback).

pub mod access;
pub mod submission;
