pub mod common;
pub mod delete;
pub mod edit;
pub mod list;
pub mod mode;
pub mod new;
pub mod show;
