pub mod debug;
pub mod prompt;
pub mod scan;
