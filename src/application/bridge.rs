use crate::domain::card::{CardParams, PaymentMethodCreateParams};
use crate::domain::completion::{Completion, PendingOutcome, completion};
use crate::domain::config::{BridgeConfig, PublishableKey};
use crate::domain::intent::{ConfirmPaymentIntentParams, ConfirmSetupIntentParams, IntentStatus, RETURN_URL};
use crate::domain::operation::{OperationKind, RequestCode};
use crate::domain::outcome::{Outcome, Resolution, fpx_result};
use crate::domain::payment_method::PaymentMethodType;
use crate::domain::ports::{
    Activity, ActivityHostBox, ActivityResult, PaymentSdkFactoryBox, PaymentSdkHandle, ResultCode,
};
use crate::error::{BridgeError, Result, SdkError};
use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};
use tokio::sync::{Mutex, RwLock};
use tracing::{debug, info, warn};

struct Client {
    config: BridgeConfig,
    sdk: PaymentSdkHandle,
}

struct PendingCall {
    kind: OperationKind,
    sdk: PaymentSdkHandle,
    completion: Completion<Resolution>,
}

impl PendingCall {
    /// Asks the SDK client that launched this call to interpret the event.
    ///
    /// The request code already ties the event to this call, so an event the
    /// SDK does not recognise still settles it: a canceled activity rejects
    /// as canceled, anything else as an SDK error.
    fn interpret(&self, result: &ActivityResult) -> Result<Resolution> {
        let interpreted = match self.kind {
            OperationKind::Payment => self
                .sdk
                .on_payment_result(result)
                .map(|r| Outcome::from_intent_result(r).into_result().map(|()| Resolution::Empty)),
            OperationKind::Setup => self
                .sdk
                .on_setup_result(result)
                .map(|r| Outcome::from_intent_result(r).into_result().map(|()| Resolution::Empty)),
            OperationKind::Fpx => self
                .sdk
                .on_payment_method_result(result)
                .map(|r| fpx_result(r).map(Resolution::PaymentMethod)),
        };

        interpreted.unwrap_or_else(|| {
            debug!(
                request_code = result.request_code,
                kind = %self.kind,
                result_code = ?result.result_code,
                "Activity result not recognised by the payment SDK"
            );
            Err(match result.result_code {
                ResultCode::Canceled => BridgeError::Canceled(IntentStatus::Canceled.to_string()),
                ResultCode::Ok => BridgeError::Sdk(SdkError::Api(format!(
                    "Unrecognised result for {} call {}",
                    self.kind, result.request_code
                ))),
            })
        })
    }
}

/// Bridges payment operations from the host application to the payment SDK.
///
/// Every operation other than `initialize` returns a [`PendingOutcome`] once
/// the SDK flow has been launched. The outcome settles when the host delivers
/// the flow's [`ActivityResult`] to [`PaymentBridge::on_activity_result`].
///
/// At most one call per [`OperationKind`] may be pending; a second call of the
/// same kind is rejected with [`BridgeError::Busy`] and the first is unaffected.
pub struct PaymentBridge {
    sdk_factory: PaymentSdkFactoryBox,
    activity_host: ActivityHostBox,
    client: RwLock<Option<Client>>,
    pending: Mutex<HashMap<RequestCode, PendingCall>>,
    next_request_code: AtomicU32,
}

impl PaymentBridge {
    /// Name the module is registered under with the host runtime.
    pub const NAME: &'static str = "AgawebStripe";

    pub fn new(sdk_factory: PaymentSdkFactoryBox, activity_host: ActivityHostBox) -> Self {
        Self {
            sdk_factory,
            activity_host,
            client: RwLock::new(None),
            pending: Mutex::new(HashMap::new()),
            next_request_code: AtomicU32::new(1),
        }
    }

    /// Configures the SDK client with the given publishable key.
    ///
    /// Replaces any previous client. Calls already in flight keep the client
    /// that launched them.
    pub async fn initialize(&self, publishable_key: &str) -> Result<()> {
        let publishable_key = PublishableKey::new(publishable_key).inspect_err(|e| {
            warn!(error = %e, "Rejected publishable key");
        })?;
        let sdk = self.sdk_factory.create(&publishable_key);
        info!(publishable_key = %sdk.publishable_key().masked(), "Payment SDK initialized");

        *self.client.write().await = Some(Client {
            config: BridgeConfig::new(publishable_key),
            sdk,
        });
        Ok(())
    }

    pub async fn is_initialized(&self) -> bool {
        self.client.read().await.is_some()
    }

    pub async fn config(&self) -> Option<BridgeConfig> {
        self.client.read().await.as_ref().map(|c| c.config.clone())
    }

    /// Kinds of operation currently awaiting a result.
    pub async fn pending_kinds(&self) -> Vec<OperationKind> {
        self.pending.lock().await.values().map(|call| call.kind).collect()
    }

    /// Confirms a payment intent with raw card details.
    pub async fn confirm_card_payment(
        &self,
        client_secret: &str,
        card: CardParams,
        save_payment_method: bool,
    ) -> Result<PendingOutcome<Resolution>> {
        let params = ConfirmPaymentIntentParams::with_payment_method_create_params(
            PaymentMethodCreateParams::create_card(card),
            client_secret,
            None,
            save_payment_method,
        );
        self.confirm_payment(params).await
    }

    /// Confirms a payment intent with an existing payment method.
    pub async fn confirm_payment_with_method_id(
        &self,
        client_secret: &str,
        payment_method_id: &str,
    ) -> Result<PendingOutcome<Resolution>> {
        let params =
            ConfirmPaymentIntentParams::with_payment_method_id(payment_method_id, client_secret, RETURN_URL);
        self.confirm_payment(params).await
    }

    /// Confirms a setup intent, saving the card for future payments without
    /// charging it.
    pub async fn confirm_card_setup(
        &self,
        client_secret: &str,
        card: CardParams,
    ) -> Result<PendingOutcome<Resolution>> {
        let (sdk, activity) = self.preflight(OperationKind::Setup).await?;
        let outcome = self.register(OperationKind::Setup, &sdk).await?;
        let params = ConfirmSetupIntentParams::create(PaymentMethodCreateParams::create_card(card), client_secret);

        let started = sdk
            .confirm_setup_intent(&activity, params, outcome.request_code())
            .await;
        Ok(self.launched(outcome, started).await)
    }

    /// Launches the bank picker for an FPX payment.
    ///
    /// Resolves with [`Resolution::PaymentMethod`] holding the created payment
    /// method and the selected bank.
    pub async fn request_fpx_payment(&self) -> Result<PendingOutcome<Resolution>> {
        let (sdk, activity) = self.preflight(OperationKind::Fpx).await?;
        let outcome = self.register(OperationKind::Fpx, &sdk).await?;

        let started = sdk
            .launch_payment_method_picker(&activity, PaymentMethodType::Fpx, outcome.request_code())
            .await;
        Ok(self.launched(outcome, started).await)
    }

    /// Entry point for every activity result the host receives.
    ///
    /// Events that match no pending call are ignored. A matched event always
    /// settles its call and frees the slot for that kind.
    pub async fn on_activity_result(&self, result: ActivityResult) {
        let Some(call) = self.pending.lock().await.remove(&result.request_code) else {
            debug!(request_code = result.request_code, "No pending call for activity result");
            return;
        };

        let settlement = call.interpret(&result);
        match &settlement {
            Ok(_) => debug!(request_code = result.request_code, kind = %call.kind, "Call resolved"),
            Err(e) => debug!(
                request_code = result.request_code,
                kind = %call.kind,
                code = e.code(),
                "Call rejected"
            ),
        }
        if !call.completion.settle(settlement) {
            debug!(request_code = result.request_code, "Caller stopped waiting before settlement");
        }
    }

    async fn confirm_payment(&self, params: ConfirmPaymentIntentParams) -> Result<PendingOutcome<Resolution>> {
        let (sdk, activity) = self.preflight(OperationKind::Payment).await?;
        let outcome = self.register(OperationKind::Payment, &sdk).await?;

        let started = sdk
            .confirm_payment(&activity, params, outcome.request_code())
            .await;
        Ok(self.launched(outcome, started).await)
    }

    async fn preflight(&self, kind: OperationKind) -> Result<(PaymentSdkHandle, Activity)> {
        let sdk = self
            .client
            .read()
            .await
            .as_ref()
            .map(|client| Arc::clone(&client.sdk));
        let Some(sdk) = sdk else {
            warn!(%kind, "Operation requested before initialize");
            return Err(BridgeError::NotInitialized);
        };

        let Some(activity) = self.activity_host.current_activity() else {
            warn!(%kind, "No foreground activity to launch from");
            return Err(BridgeError::ActivityDoesNotExist);
        };

        Ok((sdk, activity))
    }

    async fn register(&self, kind: OperationKind, sdk: &PaymentSdkHandle) -> Result<PendingOutcome<Resolution>> {
        let mut pending = self.pending.lock().await;
        if pending.values().any(|call| call.kind == kind) {
            warn!(%kind, "Operation already in progress");
            return Err(BridgeError::Busy(kind));
        }

        let request_code = self.next_request_code.fetch_add(1, Ordering::Relaxed);
        let (completion, outcome) = completion(kind, request_code);
        pending.insert(
            request_code,
            PendingCall {
                kind,
                sdk: Arc::clone(sdk),
                completion,
            },
        );
        debug!(%kind, request_code, "Call registered");
        Ok(outcome)
    }

    /// Rejects the call right away if the SDK could not start its flow.
    async fn launched(
        &self,
        outcome: PendingOutcome<Resolution>,
        started: std::result::Result<(), SdkError>,
    ) -> PendingOutcome<Resolution> {
        if let Err(e) = started {
            warn!(
                request_code = outcome.request_code(),
                kind = %outcome.kind(),
                error = %e,
                "Payment SDK failed to start flow"
            );
            if let Some(call) = self.pending.lock().await.remove(&outcome.request_code()) {
                call.completion.reject(BridgeError::Sdk(e));
            }
        }
        outcome
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::intent::PaymentMethodSource;
    use crate::infrastructure::simulated::{SdkCall, SdkCallLog, SimulatedSdkFactory, StaticActivityHost};
    use secrecy::ExposeSecret;
    use serde_json::json;

    fn bridge() -> (PaymentBridge, SdkCallLog, StaticActivityHost) {
        let log = SdkCallLog::new();
        let host = StaticActivityHost::new(Some(Activity::new("MainActivity")));
        let bridge = PaymentBridge::new(
            Box::new(SimulatedSdkFactory::new(log.clone())),
            Box::new(host.clone()),
        );
        (bridge, log, host)
    }

    async fn initialized_bridge() -> (PaymentBridge, SdkCallLog, StaticActivityHost) {
        let (bridge, log, host) = bridge();
        bridge.initialize("pk_test_123").await.unwrap();
        (bridge, log, host)
    }

    fn card() -> CardParams {
        CardParams::new("4242424242424242", 12, 2030, Some("123".to_string()))
    }

    fn intent_result(request_code: RequestCode, status: &str) -> ActivityResult {
        ActivityResult {
            request_code,
            result_code: ResultCode::Ok,
            data: Some(json!({"intent": {"id": "pi_1", "status": status}})),
        }
    }

    #[tokio::test]
    async fn test_operations_before_initialize_fail_fast() {
        let (bridge, log, _) = bridge();

        let err = bridge
            .confirm_card_payment("pi_secret", card(), false)
            .await
            .unwrap_err();
        assert!(matches!(err, BridgeError::NotInitialized));
        assert!(matches!(
            bridge.confirm_card_setup("seti_secret", card()).await,
            Err(BridgeError::NotInitialized)
        ));
        assert!(matches!(
            bridge.request_fpx_payment().await,
            Err(BridgeError::NotInitialized)
        ));
        assert!(log.calls().await.is_empty());
        assert!(bridge.pending_kinds().await.is_empty());
    }

    #[tokio::test]
    async fn test_initialize_binds_client_to_key() {
        let (bridge, log, _) = bridge();
        bridge.initialize("pk_test_first").await.unwrap();
        bridge.initialize("pk_test_second").await.unwrap();
        assert!(bridge.is_initialized().await);
        assert_eq!(
            bridge.config().await.unwrap().publishable_key.as_str(),
            "pk_test_second"
        );

        bridge
            .confirm_card_payment("pi_secret", card(), true)
            .await
            .unwrap();

        let call = log.last().await.unwrap();
        assert_eq!(call.publishable_key(), "pk_test_second");
    }

    #[tokio::test]
    async fn test_initialize_rejects_secret_key() {
        let (bridge, _, _) = bridge();
        let err = bridge.initialize("sk_test_123").await.unwrap_err();
        assert_eq!(err.code(), "E_INVALID_PUBLISHABLE_KEY");
        assert!(!bridge.is_initialized().await);
    }

    #[tokio::test]
    async fn test_confirm_card_payment_forwards_card_and_save_flag() {
        let (bridge, log, _) = initialized_bridge().await;
        let pending = bridge
            .confirm_card_payment("pi_secret", card(), true)
            .await
            .unwrap();

        let Some(SdkCall::ConfirmPayment {
            params,
            request_code,
            activity,
            ..
        }) = log.last().await
        else {
            panic!("expected a payment confirmation");
        };
        assert_eq!(request_code, pending.request_code());
        assert_eq!(activity, Activity::new("MainActivity"));
        assert_eq!(params.client_secret, "pi_secret");
        assert_eq!(params.save_payment_method, Some(true));
        assert_eq!(params.return_url, None);
        let PaymentMethodSource::CreateParams(PaymentMethodCreateParams::Card(forwarded)) = params.payment_method
        else {
            panic!("expected card create params");
        };
        assert_eq!(forwarded.number.expose_secret(), "4242424242424242");
        assert_eq!((forwarded.exp_month, forwarded.exp_year), (12, 2030));
        assert_eq!(forwarded.cvc.as_ref().map(|cvc| cvc.expose_secret()), Some("123"));
    }

    #[tokio::test]
    async fn test_confirm_with_method_id_attaches_return_url() {
        let (bridge, log, _) = initialized_bridge().await;
        bridge
            .confirm_payment_with_method_id("pi_secret", "pm_card_visa")
            .await
            .unwrap();

        let Some(SdkCall::ConfirmPayment { params, .. }) = log.last().await else {
            panic!("expected a payment confirmation");
        };
        assert_eq!(params.return_url.as_deref(), Some("stripejs://use_stripe_sdk/return_url"));
        assert!(matches!(params.payment_method, PaymentMethodSource::Id(ref id) if id == "pm_card_visa"));
    }

    #[tokio::test]
    async fn test_status_mapping_settles_once() {
        let cases = [
            ("succeeded", None),
            ("canceled", Some("Stripe.Canceled")),
            ("requires_payment_method", Some("Stripe.OtherStatus")),
        ];

        for (status, expected_code) in cases {
            let (bridge, _, _) = initialized_bridge().await;
            let pending = bridge
                .confirm_card_payment("pi_secret", card(), false)
                .await
                .unwrap();
            let request_code = pending.request_code();

            bridge.on_activity_result(intent_result(request_code, status)).await;
            // A duplicate delivery finds nothing pending.
            bridge.on_activity_result(intent_result(request_code, "succeeded")).await;

            match (pending.wait().await, expected_code) {
                (Ok(resolution), None) => assert_eq!(resolution, Resolution::Empty),
                (Err(e), Some(code)) => {
                    assert_eq!(e.code(), code);
                    assert_eq!(e.to_string(), status);
                }
                (other, _) => panic!("unexpected settlement for {}: {:?}", status, other),
            }
            assert!(bridge.pending_kinds().await.is_empty());
        }
    }

    #[tokio::test]
    async fn test_sdk_exception_rejects_with_description() {
        let (bridge, _, _) = initialized_bridge().await;
        let pending = bridge.confirm_card_setup("seti_secret", card()).await.unwrap();

        bridge
            .on_activity_result(ActivityResult {
                request_code: pending.request_code(),
                result_code: ResultCode::Ok,
                data: Some(json!({"error": {"kind": "authentication", "message": "3DS failed"}})),
            })
            .await;

        let err = pending.wait().await.unwrap_err();
        assert_eq!(err.code(), "Stripe.Error");
        assert_eq!(err.to_string(), "AuthenticationException: 3DS failed");
    }

    #[tokio::test]
    async fn test_second_call_of_same_kind_is_busy() {
        let (bridge, log, _) = initialized_bridge().await;
        let first = bridge
            .confirm_card_payment("pi_first", card(), false)
            .await
            .unwrap();

        let err = bridge
            .confirm_payment_with_method_id("pi_second", "pm_1")
            .await
            .unwrap_err();
        assert!(matches!(err, BridgeError::Busy(OperationKind::Payment)));
        assert_eq!(err.code(), "E_OPERATION_IN_PROGRESS");
        assert_eq!(log.calls().await.len(), 1);

        // Other kinds are independent.
        let setup = bridge.confirm_card_setup("seti_secret", card()).await.unwrap();
        assert_ne!(setup.request_code(), first.request_code());

        bridge
            .on_activity_result(intent_result(first.request_code(), "succeeded"))
            .await;
        assert!(first.wait().await.is_ok());
        assert_eq!(bridge.pending_kinds().await, vec![OperationKind::Setup]);

        // Once settled, the slot is free again.
        assert!(bridge.confirm_payment_with_method_id("pi_third", "pm_1").await.is_ok());
    }

    #[tokio::test]
    async fn test_unmatched_activity_result_is_noop() {
        let (bridge, _, _) = initialized_bridge().await;
        bridge.on_activity_result(intent_result(999, "succeeded")).await;

        let mut pending = bridge.request_fpx_payment().await.unwrap();
        bridge.on_activity_result(intent_result(999, "succeeded")).await;
        assert!(pending.try_take().is_none());
        assert_eq!(bridge.pending_kinds().await, vec![OperationKind::Fpx]);
    }

    #[tokio::test]
    async fn test_canceled_result_without_data_settles_and_frees_slot() {
        let (bridge, _, _) = initialized_bridge().await;
        let pending = bridge
            .confirm_card_payment("pi_first", card(), false)
            .await
            .unwrap();

        bridge
            .on_activity_result(ActivityResult {
                request_code: pending.request_code(),
                result_code: ResultCode::Canceled,
                data: None,
            })
            .await;

        let err = pending.wait().await.unwrap_err();
        assert_eq!(err.code(), "Stripe.Canceled");
        assert_eq!(err.to_string(), "canceled");
        assert!(bridge.pending_kinds().await.is_empty());

        let next = bridge
            .confirm_card_payment("pi_second", card(), false)
            .await
            .unwrap();
        bridge
            .on_activity_result(intent_result(next.request_code(), "succeeded"))
            .await;
        assert_eq!(next.wait().await.unwrap(), Resolution::Empty);
    }

    #[tokio::test]
    async fn test_unrecognised_result_rejects_and_frees_slot() {
        let (bridge, _, _) = initialized_bridge().await;
        let pending = bridge.confirm_card_setup("seti_first", card()).await.unwrap();

        bridge
            .on_activity_result(ActivityResult {
                request_code: pending.request_code(),
                result_code: ResultCode::Ok,
                data: None,
            })
            .await;

        let err = pending.wait().await.unwrap_err();
        assert_eq!(err.code(), "Stripe.Error");
        assert!(bridge.pending_kinds().await.is_empty());
        assert!(bridge.confirm_card_setup("seti_second", card()).await.is_ok());
    }

    #[tokio::test]
    async fn test_fpx_payment_resolves_with_bank_code() {
        let (bridge, log, _) = initialized_bridge().await;
        let pending = bridge.request_fpx_payment().await.unwrap();

        let Some(SdkCall::LaunchPaymentMethodPicker {
            payment_method_type,
            ..
        }) = log.last().await
        else {
            panic!("expected the picker to be launched");
        };
        assert_eq!(payment_method_type, PaymentMethodType::Fpx);

        bridge
            .on_activity_result(ActivityResult {
                request_code: pending.request_code(),
                result_code: ResultCode::Ok,
                data: Some(json!({
                    "paymentMethod": {"id": "pm_123", "type": "fpx", "fpx": {"bank": "maybank2u"}}
                })),
            })
            .await;

        let payment_method = pending.wait().await.unwrap().into_payment_method().unwrap();
        assert_eq!(payment_method.r#type, "fpx");
        assert_eq!(payment_method.id, "pm_123");
        assert_eq!(payment_method.bank_code, "maybank2u");
    }

    #[tokio::test]
    async fn test_fpx_picker_cancel_rejects() {
        let (bridge, _, _) = initialized_bridge().await;
        let pending = bridge.request_fpx_payment().await.unwrap();

        bridge
            .on_activity_result(ActivityResult {
                request_code: pending.request_code(),
                result_code: ResultCode::Canceled,
                data: None,
            })
            .await;

        let err = pending.wait().await.unwrap_err();
        assert_eq!(err.code(), "Stripe.Canceled");
        assert!(bridge.pending_kinds().await.is_empty());
    }

    #[tokio::test]
    async fn test_fpx_picker_failure_rejects_with_sdk_error() {
        let (bridge, _, _) = initialized_bridge().await;
        let pending = bridge.request_fpx_payment().await.unwrap();

        bridge
            .on_activity_result(ActivityResult {
                request_code: pending.request_code(),
                result_code: ResultCode::Ok,
                data: Some(json!({"error": {"kind": "card", "message": "Bank unavailable"}})),
            })
            .await;

        let err = pending.wait().await.unwrap_err();
        assert_eq!(err.code(), "Stripe.Error");
        assert_eq!(err.to_string(), "CardException: Bank unavailable");
        assert!(bridge.pending_kinds().await.is_empty());
    }

    #[tokio::test]
    async fn test_missing_activity_rejects_without_sdk_call() {
        let (bridge, log, host) = initialized_bridge().await;
        host.set_activity(None);

        let err = bridge.request_fpx_payment().await.unwrap_err();
        assert_eq!(err.code(), "E_ACTIVITY_DOES_NOT_EXIST");
        assert!(matches!(
            bridge.confirm_card_payment("pi_secret", card(), false).await,
            Err(BridgeError::ActivityDoesNotExist)
        ));
        assert!(log.calls().await.is_empty());
        assert!(bridge.pending_kinds().await.is_empty());
    }

    #[tokio::test]
    async fn test_failed_start_rejects_and_frees_slot() {
        let log = SdkCallLog::new();
        let bridge = PaymentBridge::new(
            Box::new(SimulatedSdkFactory::failing_with(
                log.clone(),
                SdkError::Connection("offline".to_string()),
            )),
            Box::new(StaticActivityHost::new(Some(Activity::new("MainActivity")))),
        );
        bridge.initialize("pk_test_123").await.unwrap();

        let pending = bridge
            .confirm_card_payment("pi_secret", card(), false)
            .await
            .unwrap();
        let err = pending.wait().await.unwrap_err();
        assert_eq!(err.code(), "Stripe.Error");
        assert!(bridge.pending_kinds().await.is_empty());
    }

    #[tokio::test]
    async fn test_result_interpreted_by_launching_client_after_reinitialize() {
        let (bridge, log, _) = initialized_bridge().await;
        let pending = bridge
            .confirm_card_payment("pi_secret", card(), false)
            .await
            .unwrap();

        bridge.initialize("pk_test_other").await.unwrap();
        bridge
            .on_activity_result(intent_result(pending.request_code(), "succeeded"))
            .await;

        assert!(pending.wait().await.is_ok());
        assert_eq!(log.calls().await[0].publishable_key(), "pk_test_123");
    }

    #[tokio::test]
    async fn test_abandoned_call_frees_slot_on_result() {
        let (bridge, _, _) = initialized_bridge().await;
        let pending = bridge.request_fpx_payment().await.unwrap();
        let request_code = pending.request_code();
        drop(pending);

        assert!(matches!(
            bridge.request_fpx_payment().await,
            Err(BridgeError::Busy(OperationKind::Fpx))
        ));

        bridge
            .on_activity_result(ActivityResult {
                request_code,
                result_code: ResultCode::Canceled,
                data: None,
            })
            .await;
        assert!(bridge.request_fpx_payment().await.is_ok());
    }
}
