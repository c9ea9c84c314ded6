pub mod movie;
pub mod show;
