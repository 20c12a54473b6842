//! Stay lifecycle DTOs

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use domain_stay::{Client, PaymentProgress, Reservation, Room};

#[derive(Debug, Deserialize, Validate)]
pub struct CreateClientRequest {
    #[validate(length(min = 1, max = 100))]
    pub first_name: String,
    #[validate(length(min = 1, max = 100))]
    pub last_name: String,
    pub phone: Option<String>,
    #[validate(email)]
    pub email: Option<String>,
    #[serde(default)]
    pub vip: bool,
    pub notes: Option<String>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreateRoomRequest {
    #[validate(length(min = 1, max = 10))]
    pub number: String,
    pub floor: Option<i16>,
    pub room_type: String,
    pub rate_per_night: Decimal,
    pub currency: String,
    #[validate(range(min = 1, max = 20))]
    pub capacity: Option<i16>,
    pub amenities: Option<Vec<String>>,
    pub notes: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CreateReservationRequest {
    pub client_id: Uuid,
    pub room_id: Uuid,
    pub check_in_date: NaiveDate,
    pub check_out_date: NaiveDate,
    /// Advance paid at booking, in the room's currency
    pub acompte: Option<Decimal>,
    pub notes: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct SetRoomStatusRequest {
    pub status: String,
}

#[derive(Debug, Serialize)]
pub struct ClientResponse {
    pub id: String,
    pub first_name: String,
    pub last_name: String,
    pub full_name: String,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub vip: bool,
    pub created_at: DateTime<Utc>,
}

impl From<Client> for ClientResponse {
    fn from(client: Client) -> Self {
        Self {
            id: client.id.to_string(),
            full_name: client.full_name(),
            first_name: client.first_name,
            last_name: client.last_name,
            phone: client.phone,
            email: client.email,
            vip: client.vip,
            created_at: client.created_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct RoomResponse {
    pub id: String,
    pub number: String,
    pub floor: Option<i16>,
    pub room_type: String,
    pub capacity: i16,
    pub amenities: Vec<String>,
    pub notes: Option<String>,
    pub rate_per_night: Decimal,
    pub currency: String,
    pub status: String,
    pub status_changed_at: DateTime<Utc>,
    pub occupied_by: Option<String>,
}

impl From<Room> for RoomResponse {
    fn from(room: Room) -> Self {
        Self {
            id: room.id.to_string(),
            number: room.number,
            floor: room.floor,
            room_type: format!("{:?}", room.room_type).to_lowercase(),
            capacity: room.capacity,
            amenities: room.amenities,
            notes: room.notes,
            rate_per_night: room.rate_per_night.amount(),
            currency: room.rate_per_night.currency().code().to_string(),
            status: room.status.label().to_string(),
            status_changed_at: room.status_changed_at,
            occupied_by: room.occupied_by.map(|r| r.to_string()),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ReservationResponse {
    pub id: String,
    pub client_id: String,
    pub room_id: String,
    pub status: String,
    pub check_in_date: NaiveDate,
    pub check_out_date: NaiveDate,
    pub nights: i64,
    pub rate_per_night: Decimal,
    pub total_price: Decimal,
    pub acompte: Decimal,
    pub currency: String,
    pub notes: Option<String>,
    pub needs_reconciliation: bool,
    pub checked_in_at: Option<DateTime<Utc>>,
    pub checked_out_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    /// Derived from the ledger when an account exists
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payment_progress: Option<PaymentProgress>,
}

impl ReservationResponse {
    pub fn from_reservation(reservation: Reservation, progress: Option<PaymentProgress>) -> Self {
        Self {
            id: reservation.id.to_string(),
            client_id: reservation.client_id.to_string(),
            room_id: reservation.room_id.to_string(),
            status: format!("{:?}", reservation.status).to_lowercase(),
            check_in_date: reservation.check_in_date,
            check_out_date: reservation.check_out_date,
            nights: reservation.nights(),
            rate_per_night: reservation.rate_per_night.amount(),
            total_price: reservation.total_price.amount(),
            acompte: reservation.acompte.amount(),
            currency: reservation.total_price.currency().code().to_string(),
            notes: reservation.notes,
            needs_reconciliation: reservation.needs_reconciliation,
            checked_in_at: reservation.checked_in_at,
            checked_out_at: reservation.checked_out_at,
            created_at: reservation.created_at,
            payment_progress: progress,
        }
    }
}
