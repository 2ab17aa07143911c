use super::intent::{IntentStatus, StripeIntent};
use super::payment_method::{FpxPaymentMethod, PaymentMethodResult};
use crate::error::{BridgeError, SdkError};
use serde::Serialize;

/// The value a call resolves with.
///
/// Confirmations resolve with no payload (serialized as `null`), FPX payments
/// with the created payment method.
#[derive(Debug, Serialize, PartialEq, Eq, Clone)]
#[serde(untagged)]
pub enum Resolution {
    Empty,
    PaymentMethod(FpxPaymentMethod),
}

impl Resolution {
    pub fn into_payment_method(self) -> Option<FpxPaymentMethod> {
        match self {
            Resolution::PaymentMethod(pm) => Some(pm),
            Resolution::Empty => None,
        }
    }
}

/// Terminal outcome of a confirmation flow.
#[derive(Debug, PartialEq, Eq, Clone)]
pub enum Outcome {
    Succeeded,
    Canceled(String),
    Other(String),
    Error(SdkError),
}

impl Outcome {
    /// Translates the SDK's intent callback into an outcome.
    ///
    /// Shared by payment confirmation (card or payment-method id) and setup
    /// confirmation.
    pub fn from_intent_result(result: Result<StripeIntent, SdkError>) -> Self {
        match result {
            Ok(intent) => match intent.status {
                IntentStatus::Succeeded => Outcome::Succeeded,
                IntentStatus::Canceled => Outcome::Canceled(intent.status.to_string()),
                other => Outcome::Other(other.to_string()),
            },
            Err(e) => Outcome::Error(e),
        }
    }

    pub fn into_result(self) -> Result<(), BridgeError> {
        match self {
            Outcome::Succeeded => Ok(()),
            Outcome::Canceled(status) => Err(BridgeError::Canceled(status)),
            Outcome::Other(status) => Err(BridgeError::OtherStatus(status)),
            Outcome::Error(e) => Err(BridgeError::Sdk(e)),
        }
    }
}

/// Translates the payment-method picker's result for an FPX payment.
///
/// A canceled picker rejects with `Stripe.Canceled` so the caller is never left
/// waiting.
pub fn fpx_result(result: PaymentMethodResult) -> Result<FpxPaymentMethod, BridgeError> {
    match result {
        PaymentMethodResult::Success(payment_method) => Ok(FpxPaymentMethod::try_from(payment_method)?),
        PaymentMethodResult::Canceled => Err(BridgeError::Canceled(IntentStatus::Canceled.to_string())),
        PaymentMethodResult::Failure(e) => Err(BridgeError::Sdk(e)),
    }
}
