use crate::error::SdkError;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Clone, Copy)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethodType {
    Fpx,
}

impl PaymentMethodType {
    pub fn code(&self) -> &'static str {
        match self {
            PaymentMethodType::Fpx => "fpx",
        }
    }
}

impl fmt::Display for PaymentMethodType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Clone)]
pub struct Fpx {
    #[serde(default)]
    pub bank: Option<String>,
}

/// A payment method created by the SDK.
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Clone)]
pub struct PaymentMethod {
    pub id: String,
    pub r#type: PaymentMethodType,
    #[serde(default)]
    pub fpx: Option<Fpx>,
}

/// Result of the SDK's add-payment-method picker.
#[derive(Debug, PartialEq, Eq, Clone)]
pub enum PaymentMethodResult {
    Success(PaymentMethod),
    Canceled,
    Failure(SdkError),
}

/// The value an FPX payment resolves with.
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Clone)]
#[serde(rename_all = "camelCase")]
pub struct FpxPaymentMethod {
    pub r#type: String,
    pub id: String,
    pub bank_code: String,
}

impl TryFrom<PaymentMethod> for FpxPaymentMethod {
    type Error = SdkError;

    fn try_from(payment_method: PaymentMethod) -> Result<Self, Self::Error> {
        let bank_code = payment_method
            .fpx
            .and_then(|fpx| fpx.bank)
            .ok_or_else(|| {
                SdkError::InvalidRequest(format!(
                    "Payment method {} has no FPX bank code",
                    payment_method.id
                ))
            })?;

        Ok(Self {
            r#type: payment_method.r#type.to_string(),
            id: payment_method.id,
            bank_code,
        })
    }
}
