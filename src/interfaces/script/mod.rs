//! JSON-lines scripts that drive the bridge from the command line.

pub mod reader;
pub mod writer;
