pub mod log;
pub mod prepare;
