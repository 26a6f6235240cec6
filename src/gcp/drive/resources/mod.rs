pub mod endpoint;
pub mod file;
