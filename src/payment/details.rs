use std::{fmt, sync::LazyLock};

use regex::Regex;
use serde::Deserialize;
use utoipa::ToSchema;

use super::PaymentMethod;
use crate::lifecycle::LifecycleError;

static EXPIRY_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(0[1-9]|1[0-2])/\d{2}$").expect("valid expiry regex"));
static IFSC_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Z]{4}0[A-Z0-9]{6}$").expect("valid IFSC regex"));

/// Method-specific payment details, e.g.
/// `{"method": "upi", "details": {"upiId": "user@okaxis"}}`.
#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(tag = "method", content = "details", rename_all = "lowercase")]
pub enum PaymentDetails {
    Card(CardDetails),
    Upi(UpiDetails),
    #[serde(alias = "net_banking", alias = "net-banking")]
    Netbanking(NetBankingDetails),
}

#[derive(Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CardDetails {
    pub card_number: String,
    pub card_holder: String,
    pub expiry: String,
    pub cvv: String,
}

impl fmt::Debug for CardDetails {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CardDetails")
            .field("card_number", &mask(&digits_only(&self.card_number)))
            .field("card_holder", &self.card_holder)
            .field("expiry", &self.expiry)
            .field("cvv", &"***")
            .finish()
    }
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpiDetails {
    pub upi_id: String,
}

#[derive(Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct NetBankingDetails {
    pub account_number: String,
    pub ifsc: String,
    pub bank_name: Option<String>,
}

impl fmt::Debug for NetBankingDetails {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NetBankingDetails")
            .field("account_number", &mask(&self.account_number))
            .field("ifsc", &self.ifsc)
            .field("bank_name", &self.bank_name)
            .finish()
    }
}

impl PaymentDetails {
    pub fn method(&self) -> PaymentMethod {
        match self {
            PaymentDetails::Card(_) => PaymentMethod::Card,
            PaymentDetails::Upi(_) => PaymentMethod::Upi,
            PaymentDetails::Netbanking(_) => PaymentMethod::Netbanking,
        }
    }

    pub fn validate(&self) -> Result<(), LifecycleError> {
        match self {
            PaymentDetails::Card(card) => {
                let number = digits_only(&card.card_number);
                if number.len() != 16 || !is_all_digits(&number) {
                    return Err(invalid("Card number must be 16 digits"));
                }
                if card.card_holder.trim().is_empty() {
                    return Err(invalid("Card holder name is required"));
                }
                if !EXPIRY_RE.is_match(card.expiry.trim()) {
                    return Err(invalid("Expiry must be in MM/YY format"));
                }
                if card.cvv.len() != 3 || !is_all_digits(&card.cvv) {
                    return Err(invalid("CVV must be 3 digits"));
                }
            }
            PaymentDetails::Upi(upi) => {
                let id = upi.upi_id.trim();
                match id.split_once('@') {
                    Some((handle, provider))
                        if !handle.is_empty() && !provider.is_empty() && !provider.contains('@') => {}
                    _ => return Err(invalid("UPI ID must look like name@provider")),
                }
            }
            PaymentDetails::Netbanking(bank) => {
                let account = bank.account_number.trim();
                if !(9..=18).contains(&account.len()) || !is_all_digits(account) {
                    return Err(invalid("Account number must be 9 to 18 digits"));
                }
                if !IFSC_RE.is_match(bank.ifsc.trim()) {
                    return Err(invalid("IFSC must look like ABCD0123456"));
                }
            }
        }
        Ok(())
    }

    /// The only form of the details that is persisted or logged.
    pub fn masked(&self) -> String {
        match self {
            PaymentDetails::Card(card) => format!("card {}", mask(&digits_only(&card.card_number))),
            PaymentDetails::Upi(upi) => format!("upi {}", upi.upi_id.trim()),
            PaymentDetails::Netbanking(bank) => format!(
                "netbanking {} {}",
                bank.ifsc.trim(),
                mask(bank.account_number.trim())
            ),
        }
    }
}

fn invalid(msg: &str) -> LifecycleError {
    LifecycleError::Validation(msg.to_string())
}

fn digits_only(raw: &str) -> String {
    raw.chars().filter(|c| !matches!(c, ' ' | '-')).collect()
}

fn is_all_digits(s: &str) -> bool {
    !s.is_empty() && s.chars().all(|c| c.is_ascii_digit())
}

fn mask(s: &str) -> String {
    let chars: Vec<char> = s.chars().collect();
    let keep = chars.len().min(4);
    let tail: String = chars[chars.len() - keep..].iter().collect();
    format!("****{tail}")
}
