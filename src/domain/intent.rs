use super::card::PaymentMethodCreateParams;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Return URL handed to the SDK for redirect-based confirmation flows.
pub const RETURN_URL: &str = "stripejs://use_stripe_sdk/return_url";

/// Status of a payment or setup intent as reported by the SDK.
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Clone, Copy)]
#[serde(rename_all = "snake_case")]
pub enum IntentStatus {
    RequiresPaymentMethod,
    RequiresConfirmation,
    RequiresAction,
    Processing,
    RequiresCapture,
    Canceled,
    Succeeded,
}

impl IntentStatus {
    pub fn code(&self) -> &'static str {
        match self {
            IntentStatus::RequiresPaymentMethod => "requires_payment_method",
            IntentStatus::RequiresConfirmation => "requires_confirmation",
            IntentStatus::RequiresAction => "requires_action",
            IntentStatus::Processing => "processing",
            IntentStatus::RequiresCapture => "requires_capture",
            IntentStatus::Canceled => "canceled",
            IntentStatus::Succeeded => "succeeded",
        }
    }
}

impl fmt::Display for IntentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// A payment or setup intent as returned at the end of a confirmation flow.
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Clone)]
pub struct StripeIntent {
    #[serde(default)]
    pub id: Option<String>,
    pub status: IntentStatus,
}

/// Where the payment method for a payment confirmation comes from.
#[derive(Debug, Clone)]
pub enum PaymentMethodSource {
    CreateParams(PaymentMethodCreateParams),
    Id(String),
}

#[derive(Debug, Clone)]
pub struct ConfirmPaymentIntentParams {
    pub client_secret: String,
    pub payment_method: PaymentMethodSource,
    pub return_url: Option<String>,
    pub save_payment_method: Option<bool>,
}

impl ConfirmPaymentIntentParams {
    pub fn with_payment_method_create_params(
        create_params: PaymentMethodCreateParams,
        client_secret: impl Into<String>,
        return_url: Option<String>,
        save_payment_method: bool,
    ) -> Self {
        Self {
            client_secret: client_secret.into(),
            payment_method: PaymentMethodSource::CreateParams(create_params),
            return_url,
            save_payment_method: Some(save_payment_method),
        }
    }

    pub fn with_payment_method_id(
        payment_method_id: impl Into<String>,
        client_secret: impl Into<String>,
        return_url: impl Into<String>,
    ) -> Self {
        Self {
            client_secret: client_secret.into(),
            payment_method: PaymentMethodSource::Id(payment_method_id.into()),
            return_url: Some(return_url.into()),
            save_payment_method: None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ConfirmSetupIntentParams {
    pub client_secret: String,
    pub payment_method: PaymentMethodCreateParams,
}

impl ConfirmSetupIntentParams {
    pub fn create(payment_method: PaymentMethodCreateParams, client_secret: impl Into<String>) -> Self {
        Self {
            client_secret: client_secret.into(),
            payment_method,
        }
    }
}
