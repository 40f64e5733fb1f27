//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async methods that
//! accept `&PgPool` as the first argument.

pub mod form_repo;
pub mod geography_repo;
pub mod submission_repo;
pub mod user_repo;

pub use form_repo::FormRepo;
pub use geography_repo::GeographyRepo;
pub use submission_repo::SubmissionRepo;
pub use user_repo::UserRepo;
