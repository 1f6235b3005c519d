pub mod catalog;
pub mod show;
