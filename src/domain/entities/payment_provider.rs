use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumString};

/// External payment processor a subscription record belongs to.
///
/// The service currently bills through a single processor, but the tag is
/// stored on every record so events and rows stay attributable if another
/// processor is ever added.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    sqlx::Type,
    AsRefStr,
    Display,
    EnumString,
)]
#[sqlx(type_name = "payment_provider", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum PaymentProvider {
    Paypal,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serializes_as_snake_case() {
        assert_eq!(PaymentProvider::Paypal.as_ref(), "paypal");
        assert_eq!("PAYPAL".parse::<PaymentProvider>().unwrap(), PaymentProvider::Paypal);
    }
}
