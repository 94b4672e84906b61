pub mod detail;
pub mod forms;
pub mod posts;
