use secrecy::SecretString;
use serde::{Deserialize, Deserializer};

/// Raw card fields supplied by the host application.
///
/// Validation of the number, expiry and CVC belongs to the payment SDK; the
/// bridge only forwards them. The number and CVC stay wrapped until the SDK
/// reads them.
#[derive(Debug, Deserialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct CardParams {
    #[serde(deserialize_with = "deserialize_secret")]
    pub number: SecretString,
    pub exp_month: i32,
    pub exp_year: i32,
    #[serde(default, deserialize_with = "deserialize_optional_secret")]
    pub cvc: Option<SecretString>,
}

impl CardParams {
    pub fn new(number: impl Into<String>, exp_month: i32, exp_year: i32, cvc: Option<String>) -> Self {
        Self {
            number: SecretString::from(number.into()),
            exp_month,
            exp_year,
            cvc: cvc.map(SecretString::from),
        }
    }
}

fn deserialize_secret<'de, D>(deserializer: D) -> Result<SecretString, D::Error>
where
    D: Deserializer<'de>,
{
    String::deserialize(deserializer).map(SecretString::from)
}

fn deserialize_optional_secret<'de, D>(deserializer: D) -> Result<Option<SecretString>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.map(SecretString::from))
}

/// Parameters for creating a payment method as part of a confirmation.
#[derive(Debug, Clone)]
pub enum PaymentMethodCreateParams {
    Card(CardParams),
}

impl PaymentMethodCreateParams {
    pub fn create_card(card: CardParams) -> Self {
        Self::Card(card)
    }
}
