//! Room aggregate and housekeeping status machine

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use core_kernel::{HotelId, Money, ReservationId, RoomId};

use crate::error::StayError;

/// Housekeeping/occupancy status of a room
///
/// `Occupied` is only ever entered through check-in; manual overrides may
/// move a room between the other four states.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoomStatus {
    Available,
    Occupied,
    Cleaning,
    Maintenance,
    OutOfService,
}

impl RoomStatus {
    pub fn label(&self) -> &'static str {
        match self {
            RoomStatus::Available => "Disponible",
            RoomStatus::Occupied => "Occupée",
            RoomStatus::Cleaning => "Nettoyage",
            RoomStatus::Maintenance => "Maintenance",
            RoomStatus::OutOfService => "Hors service",
        }
    }
}

/// Physical room category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoomType {
    Single,
    Double,
    Suite,
    Family,
    Bungalow,
}

impl RoomType {
    /// Usual number of guests for the category, used as the capacity
    /// default when a room is registered without one
    pub fn default_capacity(&self) -> i16 {
        match self {
            RoomType::Single => 1,
            RoomType::Double => 2,
            RoomType::Suite => 2,
            RoomType::Family => 4,
            RoomType::Bungalow => 3,
        }
    }
}

/// A physical room in a hotel
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Room {
    /// Unique identifier
    pub id: RoomId,
    /// Owning hotel
    pub hotel_id: HotelId,
    /// Door number, unique within the hotel
    pub number: String,
    /// Floor, when the building has them
    pub floor: Option<i16>,
    /// Category
    pub room_type: RoomType,
    /// Number of guests the room sleeps
    pub capacity: i16,
    /// Amenity tags shown to the front desk ("climatisation", "wifi", ...)
    pub amenities: Vec<String>,
    /// Free-text description
    pub notes: Option<String>,
    /// Nightly rate
    pub rate_per_night: Money,
    /// Current status
    pub status: RoomStatus,
    /// When the current status was entered; drives the cleaning expiry sweep
    pub status_changed_at: DateTime<Utc>,
    /// Reservation holding the room while occupied
    pub occupied_by: Option<ReservationId>,
    /// Created timestamp
    pub created_at: DateTime<Utc>,
    /// Updated timestamp
    pub updated_at: DateTime<Utc>,
}

impl Room {
    /// Creates a new available room
    pub fn new(
        hotel_id: HotelId,
        number: impl Into<String>,
        room_type: RoomType,
        rate_per_night: Money,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: RoomId::new_v7(),
            hotel_id,
            number: number.into(),
            floor: None,
            room_type,
            capacity: room_type.default_capacity(),
            amenities: Vec::new(),
            notes: None,
            rate_per_night,
            status: RoomStatus::Available,
            status_changed_at: now,
            occupied_by: None,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn with_floor(mut self, floor: i16) -> Self {
        self.floor = Some(floor);
        self
    }

    pub fn with_capacity(mut self, capacity: i16) -> Self {
        self.capacity = capacity;
        self
    }

    pub fn with_amenities(mut self, amenities: Vec<String>) -> Self {
        self.amenities = amenities;
        self
    }

    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = Some(notes.into());
        self
    }

    /// Checks whether a manual status override is allowed
    ///
    /// Occupied is excluded on both sides: it is owned by the reservation
    /// lifecycle, not by housekeeping.
    pub fn can_transition_to(&self, target: RoomStatus) -> bool {
        use RoomStatus::*;
        matches!(
            (self.status, target),
            (Available, Cleaning)
                | (Available, Maintenance)
                | (Available, OutOfService)
                | (Cleaning, Available)
                | (Cleaning, Maintenance)
                | (Maintenance, Available)
                | (Maintenance, OutOfService)
                | (OutOfService, Available)
                | (OutOfService, Maintenance)
        )
    }

    /// Validates a manual override request against the status machine
    pub fn check_override(&self, target: RoomStatus) -> Result<(), StayError> {
        if target == RoomStatus::Occupied {
            return Err(StayError::invalid_transition(self.status, target));
        }
        if self.status == RoomStatus::Occupied {
            return Err(StayError::RoomOccupied {
                room: self.number.clone(),
            });
        }
        if !self.can_transition_to(target) {
            return Err(StayError::invalid_transition(self.status, target));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core_kernel::Currency;
    use rust_decimal_macros::dec;

    fn room() -> Room {
        Room::new(
            HotelId::new(),
            "101",
            RoomType::Double,
            Money::new(dec!(100000), Currency::MGA),
        )
    }

    #[test]
    fn test_new_room_is_available() {
        let room = room();
        assert_eq!(room.status, RoomStatus::Available);
        assert!(room.occupied_by.is_none());
    }

    #[test]
    fn test_manual_occupied_is_rejected() {
        let room = room();
        let err = room.check_override(RoomStatus::Occupied).unwrap_err();
        assert!(matches!(err, StayError::InvalidTransition { .. }));
    }

    #[test]
    fn test_occupied_room_rejects_overrides() {
        let mut room = room();
        room.status = RoomStatus::Occupied;
        let err = room.check_override(RoomStatus::Cleaning).unwrap_err();
        assert!(matches!(err, StayError::RoomOccupied { .. }));
    }

    #[test]
    fn test_override_between_service_states() {
        let mut room = room();
        assert!(room.check_override(RoomStatus::Maintenance).is_ok());
        room.status = RoomStatus::Maintenance;
        assert!(room.check_override(RoomStatus::OutOfService).is_ok());
        room.status = RoomStatus::OutOfService;
        assert!(room.check_override(RoomStatus::Available).is_ok());
        // No direct path back into cleaning from out-of-service
        assert!(room.check_override(RoomStatus::Cleaning).is_err());
    }
}
