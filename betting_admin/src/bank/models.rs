//! Bank account models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::accounts::UserId;

/// Bank record belonging to a user
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BankDetails {
    pub id: Uuid,
    pub user_id: UserId,
    pub account_holder: String,
    pub bank_name: String,
    pub account_number: String,
    pub ifsc_code: String,
    pub upi_id: Option<String>,
    #[serde(rename = "primary", with = "yes_no")]
    pub is_primary: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Fields for adding a bank record
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewBankDetails {
    pub account_holder: String,
    pub bank_name: String,
    pub account_number: String,
    pub ifsc_code: String,
    pub upi_id: Option<String>,
    #[serde(rename = "primary", with = "yes_no", default)]
    pub is_primary: bool,
}

/// Editable bank record fields; the primary flag has its own operation
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BankDetailsUpdate {
    pub account_holder: Option<String>,
    pub bank_name: Option<String>,
    pub account_number: Option<String>,
    pub ifsc_code: Option<String>,
    pub upi_id: Option<String>,
}

/// `"Yes"`/`"No"` wire representation of a boolean flag
pub mod yes_no {
    use serde::{Deserialize, Deserializer, Serializer, de::Error};

    pub fn serialize<S: Serializer>(value: &bool, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(if *value { "Yes" } else { "No" })
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<bool, D::Error> {
        let raw = String::deserialize(deserializer)?;
        match raw.as_str() {
            "Yes" | "yes" => Ok(true),
            "No" | "no" => Ok(false),
            other => Err(D::Error::custom(format!("expected Yes or No, got {other}"))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_primary_flag_wire_format() {
        let json = r#"{
            "accountHolder": "A. Holder",
            "bankName": "State Bank",
            "accountNumber": "001122",
            "ifscCode": "SBIN0001",
            "upiId": null,
            "primary": "Yes"
        }"#;
        let bank: NewBankDetails = serde_json::from_str(json).unwrap();
        assert!(bank.is_primary);

        let value = serde_json::to_value(&bank).unwrap();
        assert_eq!(value["primary"], "Yes");
    }

    #[test]
    fn test_primary_flag_defaults_to_no() {
        let json = r#"{
            "accountHolder": "A. Holder",
            "bankName": "State Bank",
            "accountNumber": "001122",
            "ifscCode": "SBIN0001"
        }"#;
        let bank: NewBankDetails = serde_json::from_str(json).unwrap();
        assert!(!bank.is_primary);
    }

    #[test]
    fn test_primary_flag_rejects_garbage() {
        let json = r#"{
            "accountHolder": "A", "bankName": "B", "accountNumber": "1",
            "ifscCode": "X", "primary": "maybe"
        }"#;
        assert!(serde_json::from_str::<NewBankDetails>(json).is_err());
    }
}
