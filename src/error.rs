use crate::domain::operation::OperationKind;
use thiserror::Error;

/// An exception raised by the payment SDK while processing a request.
///
/// The display form mirrors the SDK's own `<Exception>: <message>` rendering,
/// which is what callers receive as the `Stripe.Error` message.
#[derive(Error, Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(tag = "kind", content = "message", rename_all = "snake_case")]
pub enum SdkError {
    #[error("APIException: {0}")]
    Api(String),
    #[error("CardException: {0}")]
    Card(String),
    #[error("AuthenticationException: {0}")]
    Authentication(String),
    #[error("InvalidRequestException: {0}")]
    InvalidRequest(String),
    #[error("APIConnectionException: {0}")]
    Connection(String),
}

#[derive(Error, Debug)]
pub enum BridgeError {
    #[error("Payment SDK is not initialized, call initialize first")]
    NotInitialized,
    #[error("Activity doesn't exist")]
    ActivityDoesNotExist,
    #[error("Invalid publishable key: {0}")]
    InvalidPublishableKey(String),
    #[error("Invalid arguments: {0}")]
    InvalidArguments(String),
    #[error("A {0} operation is already in progress")]
    Busy(OperationKind),
    #[error("{0}")]
    Canceled(String),
    #[error("{0}")]
    OtherStatus(String),
    #[error("{0}")]
    Sdk(#[from] SdkError),
    #[error("Call was dropped before it settled")]
    Dropped,
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),
}

impl BridgeError {
    /// The error code surfaced to the host application on rejection.
    pub fn code(&self) -> &'static str {
        match self {
            BridgeError::NotInitialized => "E_NOT_INITIALIZED",
            BridgeError::ActivityDoesNotExist => "E_ACTIVITY_DOES_NOT_EXIST",
            BridgeError::InvalidPublishableKey(_) => "E_INVALID_PUBLISHABLE_KEY",
            BridgeError::InvalidArguments(_) => "E_INVALID_ARGUMENTS",
            BridgeError::Busy(_) => "E_OPERATION_IN_PROGRESS",
            BridgeError::Canceled(_) => "Stripe.Canceled",
            BridgeError::OtherStatus(_) => "Stripe.OtherStatus",
            BridgeError::Sdk(_) => "Stripe.Error",
            BridgeError::Dropped => "E_CALL_DROPPED",
            BridgeError::IoError(_) | BridgeError::JsonError(_) => "E_INTERNAL",
        }
    }
}

pub type Result<T> = std::result::Result<T, BridgeError>;
