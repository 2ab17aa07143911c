use crate::domain::card::PaymentMethodCreateParams;
use crate::domain::config::PublishableKey;
use crate::domain::intent::{
    ConfirmPaymentIntentParams, ConfirmSetupIntentParams, PaymentMethodSource, StripeIntent,
};
use crate::domain::operation::RequestCode;
use crate::domain::payment_method::{PaymentMethod, PaymentMethodResult, PaymentMethodType};
use crate::domain::ports::{
    Activity, ActivityHost, ActivityResult, PaymentSdk, PaymentSdkFactory, PaymentSdkHandle, ResultCode,
};
use crate::error::SdkError;
use async_trait::async_trait;
use secrecy::ExposeSecret;
use serde::Deserialize;
use std::sync::{Arc, PoisonError};
use tokio::sync::RwLock;

/// A call the simulated SDK received.
#[derive(Debug, Clone)]
pub enum SdkCall {
    ConfirmPayment {
        publishable_key: String,
        activity: Activity,
        params: ConfirmPaymentIntentParams,
        request_code: RequestCode,
    },
    ConfirmSetupIntent {
        publishable_key: String,
        activity: Activity,
        params: ConfirmSetupIntentParams,
        request_code: RequestCode,
    },
    LaunchPaymentMethodPicker {
        publishable_key: String,
        activity: Activity,
        payment_method_type: PaymentMethodType,
        request_code: RequestCode,
    },
}

impl SdkCall {
    pub fn request_code(&self) -> RequestCode {
        match self {
            SdkCall::ConfirmPayment { request_code, .. }
            | SdkCall::ConfirmSetupIntent { request_code, .. }
            | SdkCall::LaunchPaymentMethodPicker { request_code, .. } => *request_code,
        }
    }

    pub fn publishable_key(&self) -> &str {
        match self {
            SdkCall::ConfirmPayment { publishable_key, .. }
            | SdkCall::ConfirmSetupIntent { publishable_key, .. }
            | SdkCall::LaunchPaymentMethodPicker { publishable_key, .. } => publishable_key,
        }
    }
}

/// Shared, append-only record of SDK calls.
///
/// Clones share the same underlying log.
#[derive(Default, Clone)]
pub struct SdkCallLog {
    calls: Arc<RwLock<Vec<SdkCall>>>,
}

impl SdkCallLog {
    pub fn new() -> Self {
        Self::default()
    }

    async fn record(&self, call: SdkCall) {
        self.calls.write().await.push(call);
    }

    pub async fn calls(&self) -> Vec<SdkCall> {
        self.calls.read().await.clone()
    }

    pub async fn last(&self) -> Option<SdkCall> {
        self.calls.read().await.last().cloned()
    }
}

/// Intent result payload: `{"intent": {...}}` or `{"error": {...}}`.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
enum IntentPayload {
    Intent(StripeIntent),
    Error(SdkError),
}

/// Picker result payload: `{"paymentMethod": {...}}` or `{"error": {...}}`.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
enum PickerPayload {
    PaymentMethod(PaymentMethod),
    Error(SdkError),
}

/// An in-memory payment SDK client.
///
/// Records every flow it is asked to start and interprets activity-result
/// payloads in the JSON shapes described on [`IntentPayload`] and
/// [`PickerPayload`]. It never produces results on its own: the host (a test
/// or the CLI script) delivers them.
pub struct SimulatedSdk {
    publishable_key: PublishableKey,
    log: SdkCallLog,
    start_error: Option<SdkError>,
}

impl SimulatedSdk {
    pub fn new(publishable_key: PublishableKey, log: SdkCallLog) -> Self {
        Self {
            publishable_key,
            log,
            start_error: None,
        }
    }

    fn started(&self) -> Result<(), SdkError> {
        match &self.start_error {
            Some(e) => Err(e.clone()),
            None => Ok(()),
        }
    }

    /// Local card check run before a flow starts; only digits are accepted.
    fn check_card(create_params: &PaymentMethodCreateParams) -> Result<(), SdkError> {
        let PaymentMethodCreateParams::Card(card) = create_params;
        let number = card.number.expose_secret();
        if number.is_empty() || !number.chars().all(|c| c.is_ascii_digit()) {
            return Err(SdkError::Card("Your card's number is invalid.".to_string()));
        }
        Ok(())
    }

    fn intent_result(result: &ActivityResult) -> Option<Result<StripeIntent, SdkError>> {
        let data = result.data.as_ref()?;
        match IntentPayload::deserialize(data) {
            Ok(IntentPayload::Intent(intent)) => Some(Ok(intent)),
            Ok(IntentPayload::Error(e)) => Some(Err(e)),
            Err(e) => Some(Err(SdkError::Api(format!("Malformed intent result: {}", e)))),
        }
    }
}

#[async_trait]
impl PaymentSdk for SimulatedSdk {
    fn publishable_key(&self) -> &PublishableKey {
        &self.publishable_key
    }

    async fn confirm_payment(
        &self,
        activity: &Activity,
        params: ConfirmPaymentIntentParams,
        request_code: RequestCode,
    ) -> Result<(), SdkError> {
        let card_check = match &params.payment_method {
            PaymentMethodSource::CreateParams(create_params) => Self::check_card(create_params),
            PaymentMethodSource::Id(_) => Ok(()),
        };
        self.log
            .record(SdkCall::ConfirmPayment {
                publishable_key: self.publishable_key.as_str().to_string(),
                activity: activity.clone(),
                params,
                request_code,
            })
            .await;
        self.started().and(card_check)
    }

    async fn confirm_setup_intent(
        &self,
        activity: &Activity,
        params: ConfirmSetupIntentParams,
        request_code: RequestCode,
    ) -> Result<(), SdkError> {
        let card_check = Self::check_card(&params.payment_method);
        self.log
            .record(SdkCall::ConfirmSetupIntent {
                publishable_key: self.publishable_key.as_str().to_string(),
                activity: activity.clone(),
                params,
                request_code,
            })
            .await;
        self.started().and(card_check)
    }

    async fn launch_payment_method_picker(
        &self,
        activity: &Activity,
        payment_method_type: PaymentMethodType,
        request_code: RequestCode,
    ) -> Result<(), SdkError> {
        self.log
            .record(SdkCall::LaunchPaymentMethodPicker {
                publishable_key: self.publishable_key.as_str().to_string(),
                activity: activity.clone(),
                payment_method_type,
                request_code,
            })
            .await;
        self.started()
    }

    fn on_payment_result(&self, result: &ActivityResult) -> Option<Result<StripeIntent, SdkError>> {
        Self::intent_result(result)
    }

    fn on_setup_result(&self, result: &ActivityResult) -> Option<Result<StripeIntent, SdkError>> {
        Self::intent_result(result)
    }

    fn on_payment_method_result(&self, result: &ActivityResult) -> Option<PaymentMethodResult> {
        if result.result_code == ResultCode::Canceled {
            return Some(PaymentMethodResult::Canceled);
        }
        let Some(data) = result.data.as_ref() else {
            return Some(PaymentMethodResult::Failure(SdkError::InvalidRequest(
                "Picker returned no payment method".to_string(),
            )));
        };
        Some(match PickerPayload::deserialize(data) {
            Ok(PickerPayload::PaymentMethod(pm)) => PaymentMethodResult::Success(pm),
            Ok(PickerPayload::Error(e)) => PaymentMethodResult::Failure(e),
            Err(e) => PaymentMethodResult::Failure(SdkError::Api(format!("Malformed picker result: {}", e))),
        })
    }
}

/// Creates [`SimulatedSdk`] clients that all record into one [`SdkCallLog`].
#[derive(Default, Clone)]
pub struct SimulatedSdkFactory {
    log: SdkCallLog,
    start_error: Option<SdkError>,
}

impl SimulatedSdkFactory {
    pub fn new(log: SdkCallLog) -> Self {
        Self {
            log,
            start_error: None,
        }
    }

    /// Clients created by this factory fail to start any flow with `error`.
    pub fn failing_with(log: SdkCallLog, error: SdkError) -> Self {
        Self {
            log,
            start_error: Some(error),
        }
    }
}

impl PaymentSdkFactory for SimulatedSdkFactory {
    fn create(&self, publishable_key: &PublishableKey) -> PaymentSdkHandle {
        Arc::new(SimulatedSdk {
            publishable_key: publishable_key.clone(),
            log: self.log.clone(),
            start_error: self.start_error.clone(),
        })
    }
}

/// An activity host whose foreground activity is set explicitly.
///
/// Clones share the same activity slot.
#[derive(Default, Clone)]
pub struct StaticActivityHost {
    activity: Arc<std::sync::RwLock<Option<Activity>>>,
}

impl StaticActivityHost {
    pub fn new(activity: Option<Activity>) -> Self {
        Self {
            activity: Arc::new(std::sync::RwLock::new(activity)),
        }
    }

    pub fn set_activity(&self, activity: Option<Activity>) {
        *self.activity.write().unwrap_or_else(PoisonError::into_inner) = activity;
    }
}

impl ActivityHost for StaticActivityHost {
    fn current_activity(&self) -> Option<Activity> {
        self.activity
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}
