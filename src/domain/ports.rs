use super::config::PublishableKey;
use super::intent::{ConfirmPaymentIntentParams, ConfirmSetupIntentParams, StripeIntent};
use super::operation::RequestCode;
use super::payment_method::{PaymentMethodResult, PaymentMethodType};
use crate::error::SdkError;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// A foreground UI context the SDK can launch its flows from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Activity {
    pub name: String,
}

impl Activity {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Clone, Copy)]
#[serde(rename_all = "lowercase")]
pub enum ResultCode {
    Ok,
    Canceled,
}

/// Completion event delivered by the host when a launched flow returns.
#[derive(Debug, Serialize, Deserialize, PartialEq, Clone)]
#[serde(rename_all = "camelCase")]
pub struct ActivityResult {
    pub request_code: RequestCode,
    pub result_code: ResultCode,
    #[serde(default)]
    pub data: Option<serde_json::Value>,
}

/// The payment SDK client, bound to a publishable key.
///
/// The `confirm_*` and `launch_*` calls only start a flow; its result arrives
/// later as an [`ActivityResult`] carrying the same request code, which the
/// `on_*_result` methods interpret. They return `None` for events that are not
/// results of the corresponding flow.
#[async_trait]
pub trait PaymentSdk: Send + Sync {
    fn publishable_key(&self) -> &PublishableKey;

    async fn confirm_payment(
        &self,
        activity: &Activity,
        params: ConfirmPaymentIntentParams,
        request_code: RequestCode,
    ) -> Result<(), SdkError>;

    async fn confirm_setup_intent(
        &self,
        activity: &Activity,
        params: ConfirmSetupIntentParams,
        request_code: RequestCode,
    ) -> Result<(), SdkError>;

    async fn launch_payment_method_picker(
        &self,
        activity: &Activity,
        payment_method_type: PaymentMethodType,
        request_code: RequestCode,
    ) -> Result<(), SdkError>;

    fn on_payment_result(&self, result: &ActivityResult) -> Option<Result<StripeIntent, SdkError>>;

    fn on_setup_result(&self, result: &ActivityResult) -> Option<Result<StripeIntent, SdkError>>;

    fn on_payment_method_result(&self, result: &ActivityResult) -> Option<PaymentMethodResult>;
}

/// Creates SDK clients bound to a publishable key.
pub trait PaymentSdkFactory: Send + Sync {
    fn create(&self, publishable_key: &PublishableKey) -> PaymentSdkHandle;
}

/// Gives access to the host's current foreground activity, if any.
pub trait ActivityHost: Send + Sync {
    fn current_activity(&self) -> Option<Activity>;
}

pub type PaymentSdkHandle = Arc<dyn PaymentSdk>;
pub type PaymentSdkFactoryBox = Box<dyn PaymentSdkFactory>;
pub type ActivityHostBox = Box<dyn ActivityHost>;
