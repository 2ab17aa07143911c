use crate::application::bridge::PaymentBridge;
use crate::domain::card::CardParams;
use crate::domain::completion::PendingOutcome;
use crate::domain::operation::RequestCode;
use crate::domain::outcome::Resolution;
use crate::error::{BridgeError, Result};
use serde::{Deserialize, Serialize};

/// A method call from the host application.
///
/// Accepts `{"method": <name>, "args": {...}}`. The legacy method names the
/// module first shipped with are accepted as aliases.
#[derive(Debug, Deserialize, Clone)]
#[serde(
    tag = "method",
    content = "args",
    rename_all = "camelCase",
    rename_all_fields = "camelCase"
)]
pub enum Invocation {
    #[serde(alias = "initModule")]
    Initialize { publishable_key: String },
    #[serde(alias = "requestPaymentWithFpx")]
    RequestFpxPayment,
    #[serde(alias = "confirmPaymentWithCard")]
    ConfirmCardPayment {
        client_secret: String,
        card: CardParams,
        save_payment_method: bool,
    },
    #[serde(alias = "confirmPaymentWithPaymentMethodId")]
    ConfirmPaymentWithMethodId {
        client_secret: String,
        payment_method_id: String,
    },
    ConfirmCardSetup { client_secret: String, card: CardParams },
}

impl Invocation {
    pub fn from_value(value: serde_json::Value) -> Result<Self> {
        serde_json::from_value(value).map_err(|e| BridgeError::InvalidArguments(e.to_string()))
    }

    pub fn method_name(&self) -> &'static str {
        match self {
            Invocation::Initialize { .. } => "initialize",
            Invocation::RequestFpxPayment => "requestFpxPayment",
            Invocation::ConfirmCardPayment { .. } => "confirmCardPayment",
            Invocation::ConfirmPaymentWithMethodId { .. } => "confirmPaymentWithMethodId",
            Invocation::ConfirmCardSetup { .. } => "confirmCardSetup",
        }
    }
}

/// What the host application receives for a call.
#[derive(Debug, Serialize, PartialEq, Clone)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum Reply {
    Resolved { value: serde_json::Value },
    Rejected { code: String, message: String },
    Pending,
}

impl Reply {
    pub fn rejected(error: &BridgeError) -> Self {
        Reply::Rejected {
            code: error.code().to_string(),
            message: error.to_string(),
        }
    }

    pub fn from_result(result: Result<Resolution>) -> Self {
        match result {
            Ok(resolution) => match serde_json::to_value(resolution) {
                Ok(value) => Reply::Resolved { value },
                Err(e) => Reply::rejected(&BridgeError::from(e)),
            },
            Err(e) => Reply::rejected(&e),
        }
    }
}

/// A dispatched call: either settled on the spot or waiting on the SDK.
#[derive(Debug)]
pub enum HostCall {
    Settled(Reply),
    Pending(PendingOutcome<Resolution>),
}

impl HostCall {
    pub fn request_code(&self) -> Option<RequestCode> {
        match self {
            HostCall::Settled(_) => None,
            HostCall::Pending(outcome) => Some(outcome.request_code()),
        }
    }

    /// Returns the reply if the call has settled, without waiting.
    pub fn poll_reply(&mut self) -> Option<Reply> {
        match self {
            HostCall::Settled(reply) => Some(reply.clone()),
            HostCall::Pending(outcome) => {
                let reply = Reply::from_result(outcome.try_take()?);
                *self = HostCall::Settled(reply.clone());
                Some(reply)
            }
        }
    }

    pub async fn reply(self) -> Reply {
        match self {
            HostCall::Settled(reply) => reply,
            HostCall::Pending(outcome) => Reply::from_result(outcome.wait().await),
        }
    }
}

/// Routes an invocation to the bridge.
pub async fn dispatch(bridge: &PaymentBridge, invocation: Invocation) -> HostCall {
    let started = match invocation {
        Invocation::Initialize { publishable_key } => {
            return HostCall::Settled(Reply::from_result(
                bridge
                    .initialize(&publishable_key)
                    .await
                    .map(|()| Resolution::Empty),
            ));
        }
        Invocation::RequestFpxPayment => bridge.request_fpx_payment().await,
        Invocation::ConfirmCardPayment {
            client_secret,
            card,
            save_payment_method,
        } => {
            bridge
                .confirm_card_payment(&client_secret, card, save_payment_method)
                .await
        }
        Invocation::ConfirmPaymentWithMethodId {
            client_secret,
            payment_method_id,
        } => {
            bridge
                .confirm_payment_with_method_id(&client_secret, &payment_method_id)
                .await
        }
        Invocation::ConfirmCardSetup { client_secret, card } => {
            bridge.confirm_card_setup(&client_secret, card).await
        }
    };

    match started {
        Ok(outcome) => HostCall::Pending(outcome),
        Err(e) => HostCall::Settled(Reply::rejected(&e)),
    }
}
