//! Guest records

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use core_kernel::{ClientId, HotelId};

/// A guest known to the hotel
///
/// Outstanding debt is never stored here: it is always derived from the
/// guest's stay accounts in the ledger.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Client {
    /// Unique identifier
    pub id: ClientId,
    /// Hotel the record belongs to
    pub hotel_id: HotelId,
    /// First name
    pub first_name: String,
    /// Last name
    pub last_name: String,
    /// Phone number
    pub phone: Option<String>,
    /// Email address
    pub email: Option<String>,
    /// Flagged as a regular / VIP guest
    pub vip: bool,
    /// Free-text notes for the front desk
    pub notes: Option<String>,
    /// Created timestamp
    pub created_at: DateTime<Utc>,
    /// Updated timestamp
    pub updated_at: DateTime<Utc>,
}

impl Client {
    /// Creates a new guest record
    pub fn new(
        hotel_id: HotelId,
        first_name: impl Into<String>,
        last_name: impl Into<String>,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: ClientId::new_v7(),
            hotel_id,
            first_name: first_name.into(),
            last_name: last_name.into(),
            phone: None,
            email: None,
            vip: false,
            notes: None,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn with_phone(mut self, phone: impl Into<String>) -> Self {
        self.phone = Some(phone.into());
        self
    }

    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }

    pub fn mark_vip(mut self) -> Self {
        self.vip = true;
        self
    }

    /// Display name for lists and receipts
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_full_name() {
        let client = Client::new(HotelId::new(), "Hery", "Rakotomalala");
        assert_eq!(client.full_name(), "Hery Rakotomalala");
        assert!(!client.vip);
    }

    #[test]
    fn test_builder_helpers() {
        let client = Client::new(HotelId::new(), "Voahangy", "Andrianarisoa")
            .with_phone("+261 34 12 345 67")
            .mark_vip();
        assert!(client.vip);
        assert!(client.phone.is_some());
        assert!(client.email.is_none());
    }
}
