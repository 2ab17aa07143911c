use serde::Serialize;
use std::fmt;

/// Correlation id handed to the SDK with each launched flow and echoed back in
/// the matching activity result.
pub type RequestCode = u32;

/// The kinds of operation that can be in flight. At most one call of each kind
/// may be pending at a time.
#[derive(Debug, Serialize, PartialEq, Eq, Hash, Clone, Copy)]
#[serde(rename_all = "lowercase")]
pub enum OperationKind {
    Payment,
    Setup,
    Fpx,
}

impl fmt::Display for OperationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OperationKind::Payment => f.write_str("payment"),
            OperationKind::Setup => f.write_str("setup"),
            OperationKind::Fpx => f.write_str("fpx"),
        }
    }
}
