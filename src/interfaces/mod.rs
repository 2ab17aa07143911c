pub mod host;
pub mod script;
