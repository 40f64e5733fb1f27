pub mod forms;
pub mod lookups;
pub mod submissions;
