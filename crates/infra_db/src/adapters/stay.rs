//! PostgreSQL Stay Adapter
//!
//! Implements `StayPort` over the `rooms`, `reservations` and `clients`
//! tables. Room status changes go through a conditional UPDATE keyed on the
//! current status, so the database arbitrates concurrent claims.

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use sqlx::{FromRow, PgPool};
use tracing::instrument;
use uuid::Uuid;

use core_kernel::{ClientId, DomainPort, HotelId, PortError, ReservationId, RoomId};
use domain_stay::{
    Client, Reservation, ReservationStatus, Room, RoomStatus, RoomType, StayPort,
};

use crate::adapters::{enum_from_row, enum_to_column, money_from_row};
use crate::error::DatabaseError;

/// PostgreSQL-backed implementation of the `StayPort` trait
#[derive(Debug, Clone)]
pub struct PostgresStayAdapter {
    pool: PgPool,
}

impl PostgresStayAdapter {
    /// Creates a new PostgreSQL stay adapter
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

impl DomainPort for PostgresStayAdapter {}

#[async_trait]
impl StayPort for PostgresStayAdapter {
    async fn get_room(&self, id: RoomId) -> Result<Room, PortError> {
        let row = sqlx::query_as::<_, RoomRow>(
            r#"
            SELECT id, hotel_id, number, floor, room_type, capacity, amenities,
                   notes, rate_per_night, currency, status, status_changed_at,
                   occupied_by, created_at, updated_at
            FROM rooms
            WHERE id = $1
            "#,
        )
        .bind(id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(DatabaseError::from)?
        .ok_or_else(|| PortError::not_found("Room", id))?;

        Ok(Room::try_from(row)?)
    }

    async fn insert_room(&self, room: &Room) -> Result<(), PortError> {
        sqlx::query(
            r#"
            INSERT INTO rooms (id, hotel_id, number, floor, room_type, capacity,
                               amenities, notes, rate_per_night, currency, status,
                               status_changed_at, occupied_by, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15)
            "#,
        )
        .bind(room.id.as_uuid())
        .bind(room.hotel_id.as_uuid())
        .bind(&room.number)
        .bind(room.floor)
        .bind(enum_to_column(&room.room_type))
        .bind(room.capacity)
        .bind(&room.amenities)
        .bind(&room.notes)
        .bind(room.rate_per_night.amount())
        .bind(room.rate_per_night.currency().code())
        .bind(enum_to_column(&room.status))
        .bind(room.status_changed_at)
        .bind(room.occupied_by.map(|r| *r.as_uuid()))
        .bind(room.created_at)
        .bind(room.updated_at)
        .execute(&self.pool)
        .await
        .map_err(DatabaseError::from)?;
        Ok(())
    }

    async fn update_room(&self, room: &Room) -> Result<(), PortError> {
        let result = sqlx::query(
            r#"
            UPDATE rooms
            SET number = $1, floor = $2, room_type = $3, capacity = $4,
                amenities = $5, notes = $6, rate_per_night = $7, currency = $8,
                updated_at = $9
            WHERE id = $10
            "#,
        )
        .bind(&room.number)
        .bind(room.floor)
        .bind(enum_to_column(&room.room_type))
        .bind(room.capacity)
        .bind(&room.amenities)
        .bind(&room.notes)
        .bind(room.rate_per_night.amount())
        .bind(room.rate_per_night.currency().code())
        .bind(Utc::now())
        .bind(room.id.as_uuid())
        .execute(&self.pool)
        .await
        .map_err(DatabaseError::from)?;

        if result.rows_affected() == 0 {
            return Err(PortError::not_found("Room", room.id));
        }
        Ok(())
    }

    async fn list_rooms(&self, hotel_id: HotelId) -> Result<Vec<Room>, PortError> {
        let rows = sqlx::query_as::<_, RoomRow>(
            r#"
            SELECT id, hotel_id, number, floor, room_type, capacity, amenities,
                   notes, rate_per_night, currency, status, status_changed_at,
                   occupied_by, created_at, updated_at
            FROM rooms
            WHERE hotel_id = $1
            ORDER BY number
            "#,
        )
        .bind(hotel_id.as_uuid())
        .fetch_all(&self.pool)
        .await
        .map_err(DatabaseError::from)?;

        rows.into_iter().map(|r| Ok(Room::try_from(r)?)).collect()
    }

    #[instrument(skip(self))]
    async fn compare_and_set_room(
        &self,
        id: RoomId,
        expected: RoomStatus,
        next: RoomStatus,
        occupied_by: Option<ReservationId>,
    ) -> Result<bool, PortError> {
        let result = sqlx::query(
            r#"
            UPDATE rooms
            SET status = $1, occupied_by = $2, status_changed_at = $3, updated_at = $3
            WHERE id = $4 AND status = $5
            "#,
        )
        .bind(enum_to_column(&next))
        .bind(occupied_by.map(|r| *r.as_uuid()))
        .bind(Utc::now())
        .bind(id.as_uuid())
        .bind(enum_to_column(&expected))
        .execute(&self.pool)
        .await
        .map_err(DatabaseError::from)?;

        if result.rows_affected() == 1 {
            return Ok(true);
        }

        // Distinguish a lost race from a missing room
        let exists = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM rooms WHERE id = $1")
            .bind(id.as_uuid())
            .fetch_one(&self.pool)
            .await
            .map_err(DatabaseError::from)?;
        if exists == 0 {
            return Err(PortError::not_found("Room", id));
        }
        Ok(false)
    }

    async fn get_reservation(&self, id: ReservationId) -> Result<Reservation, PortError> {
        let row = sqlx::query_as::<_, ReservationRow>(
            r#"
            SELECT id, hotel_id, client_id, room_id, status, check_in_date,
                   check_out_date, rate_per_night, total_price, acompte, currency,
                   notes, needs_reconciliation, checked_in_at, checked_out_at,
                   created_at, updated_at
            FROM reservations
            WHERE id = $1
            "#,
        )
        .bind(id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(DatabaseError::from)?
        .ok_or_else(|| PortError::not_found("Reservation", id))?;

        Ok(Reservation::try_from(row)?)
    }

    async fn insert_reservation(&self, reservation: &Reservation) -> Result<(), PortError> {
        sqlx::query(
            r#"
            INSERT INTO reservations (id, hotel_id, client_id, room_id, status,
                                      check_in_date, check_out_date, rate_per_night,
                                      total_price, acompte, currency, notes,
                                      needs_reconciliation, checked_in_at,
                                      checked_out_at, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17)
            "#,
        )
        .bind(reservation.id.as_uuid())
        .bind(reservation.hotel_id.as_uuid())
        .bind(reservation.client_id.as_uuid())
        .bind(reservation.room_id.as_uuid())
        .bind(enum_to_column(&reservation.status))
        .bind(reservation.check_in_date)
        .bind(reservation.check_out_date)
        .bind(reservation.rate_per_night.amount())
        .bind(reservation.total_price.amount())
        .bind(reservation.acompte.amount())
        .bind(reservation.rate_per_night.currency().code())
        .bind(&reservation.notes)
        .bind(reservation.needs_reconciliation)
        .bind(reservation.checked_in_at)
        .bind(reservation.checked_out_at)
        .bind(reservation.created_at)
        .bind(reservation.updated_at)
        .execute(&self.pool)
        .await
        .map_err(DatabaseError::from)?;
        Ok(())
    }

    async fn update_reservation(&self, reservation: &Reservation) -> Result<(), PortError> {
        let result = sqlx::query(
            r#"
            UPDATE reservations
            SET status = $1, needs_reconciliation = $2, checked_in_at = $3,
                checked_out_at = $4, updated_at = $5
            WHERE id = $6
            "#,
        )
        .bind(enum_to_column(&reservation.status))
        .bind(reservation.needs_reconciliation)
        .bind(reservation.checked_in_at)
        .bind(reservation.checked_out_at)
        .bind(reservation.updated_at)
        .bind(reservation.id.as_uuid())
        .execute(&self.pool)
        .await
        .map_err(DatabaseError::from)?;

        if result.rows_affected() == 0 {
            return Err(PortError::not_found("Reservation", reservation.id));
        }
        Ok(())
    }

    async fn delete_reservation(&self, id: ReservationId) -> Result<(), PortError> {
        let result = sqlx::query("DELETE FROM reservations WHERE id = $1")
            .bind(id.as_uuid())
            .execute(&self.pool)
            .await
            .map_err(DatabaseError::from)?;

        if result.rows_affected() == 0 {
            return Err(PortError::not_found("Reservation", id));
        }
        Ok(())
    }

    async fn list_reservations(&self, hotel_id: HotelId) -> Result<Vec<Reservation>, PortError> {
        let rows = sqlx::query_as::<_, ReservationRow>(
            r#"
            SELECT id, hotel_id, client_id, room_id, status, check_in_date,
                   check_out_date, rate_per_night, total_price, acompte, currency,
                   notes, needs_reconciliation, checked_in_at, checked_out_at,
                   created_at, updated_at
            FROM reservations
            WHERE hotel_id = $1
            ORDER BY created_at
            "#,
        )
        .bind(hotel_id.as_uuid())
        .fetch_all(&self.pool)
        .await
        .map_err(DatabaseError::from)?;

        rows.into_iter()
            .map(|r| Ok(Reservation::try_from(r)?))
            .collect()
    }

    async fn get_client(&self, id: ClientId) -> Result<Client, PortError> {
        let row = sqlx::query_as::<_, ClientRow>(
            r#"
            SELECT id, hotel_id, first_name, last_name, phone, email, vip, notes,
                   created_at, updated_at
            FROM clients
            WHERE id = $1
            "#,
        )
        .bind(id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(DatabaseError::from)?
        .ok_or_else(|| PortError::not_found("Client", id))?;

        Ok(Client::from(row))
    }

    async fn insert_client(&self, client: &Client) -> Result<(), PortError> {
        sqlx::query(
            r#"
            INSERT INTO clients (id, hotel_id, first_name, last_name, phone, email,
                                 vip, notes, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            "#,
        )
        .bind(client.id.as_uuid())
        .bind(client.hotel_id.as_uuid())
        .bind(&client.first_name)
        .bind(&client.last_name)
        .bind(&client.phone)
        .bind(&client.email)
        .bind(client.vip)
        .bind(&client.notes)
        .bind(client.created_at)
        .bind(client.updated_at)
        .execute(&self.pool)
        .await
        .map_err(DatabaseError::from)?;
        Ok(())
    }

    async fn update_client(&self, client: &Client) -> Result<(), PortError> {
        let result = sqlx::query(
            r#"
            UPDATE clients
            SET first_name = $1, last_name = $2, phone = $3, email = $4, vip = $5,
                notes = $6, updated_at = $7
            WHERE id = $8
            "#,
        )
        .bind(&client.first_name)
        .bind(&client.last_name)
        .bind(&client.phone)
        .bind(&client.email)
        .bind(client.vip)
        .bind(&client.notes)
        .bind(Utc::now())
        .bind(client.id.as_uuid())
        .execute(&self.pool)
        .await
        .map_err(DatabaseError::from)?;

        if result.rows_affected() == 0 {
            return Err(PortError::not_found("Client", client.id));
        }
        Ok(())
    }

    async fn list_clients(&self, hotel_id: HotelId) -> Result<Vec<Client>, PortError> {
        let rows = sqlx::query_as::<_, ClientRow>(
            r#"
            SELECT id, hotel_id, first_name, last_name, phone, email, vip, notes,
                   created_at, updated_at
            FROM clients
            WHERE hotel_id = $1
            ORDER BY last_name, first_name
            "#,
        )
        .bind(hotel_id.as_uuid())
        .fetch_all(&self.pool)
        .await
        .map_err(DatabaseError::from)?;

        Ok(rows.into_iter().map(Client::from).collect())
    }
}

#[derive(Debug, FromRow)]
struct RoomRow {
    id: Uuid,
    hotel_id: Uuid,
    number: String,
    floor: Option<i16>,
    room_type: String,
    capacity: i16,
    amenities: Vec<String>,
    notes: Option<String>,
    rate_per_night: Decimal,
    currency: String,
    status: String,
    status_changed_at: DateTime<Utc>,
    occupied_by: Option<Uuid>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<RoomRow> for Room {
    type Error = DatabaseError;

    fn try_from(row: RoomRow) -> Result<Self, Self::Error> {
        let room_type: RoomType = enum_from_row("room_type", &row.room_type)?;
        let status: RoomStatus = enum_from_row("status", &row.status)?;
        Ok(Room {
            id: RoomId::from_uuid(row.id),
            hotel_id: HotelId::from_uuid(row.hotel_id),
            number: row.number,
            floor: row.floor,
            room_type,
            capacity: row.capacity,
            amenities: row.amenities,
            notes: row.notes,
            rate_per_night: money_from_row(row.rate_per_night, &row.currency)?,
            status,
            status_changed_at: row.status_changed_at,
            occupied_by: row.occupied_by.map(ReservationId::from_uuid),
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

#[derive(Debug, FromRow)]
struct ReservationRow {
    id: Uuid,
    hotel_id: Uuid,
    client_id: Uuid,
    room_id: Uuid,
    status: String,
    check_in_date: NaiveDate,
    check_out_date: NaiveDate,
    rate_per_night: Decimal,
    total_price: Decimal,
    acompte: Decimal,
    currency: String,
    notes: Option<String>,
    needs_reconciliation: bool,
    checked_in_at: Option<DateTime<Utc>>,
    checked_out_at: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<ReservationRow> for Reservation {
    type Error = DatabaseError;

    fn try_from(row: ReservationRow) -> Result<Self, Self::Error> {
        let status: ReservationStatus = enum_from_row("status", &row.status)?;
        Ok(Reservation {
            id: ReservationId::from_uuid(row.id),
            hotel_id: HotelId::from_uuid(row.hotel_id),
            client_id: ClientId::from_uuid(row.client_id),
            room_id: RoomId::from_uuid(row.room_id),
            status,
            check_in_date: row.check_in_date,
            check_out_date: row.check_out_date,
            rate_per_night: money_from_row(row.rate_per_night, &row.currency)?,
            total_price: money_from_row(row.total_price, &row.currency)?,
            acompte: money_from_row(row.acompte, &row.currency)?,
            notes: row.notes,
            needs_reconciliation: row.needs_reconciliation,
            checked_in_at: row.checked_in_at,
            checked_out_at: row.checked_out_at,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

#[derive(Debug, FromRow)]
struct ClientRow {
    id: Uuid,
    hotel_id: Uuid,
    first_name: String,
    last_name: String,
    phone: Option<String>,
    email: Option<String>,
    vip: bool,
    notes: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<ClientRow> for Client {
    fn from(row: ClientRow) -> Self {
        Client {
            id: ClientId::from_uuid(row.id),
            hotel_id: HotelId::from_uuid(row.hotel_id),
            first_name: row.first_name,
            last_name: row.last_name,
            phone: row.phone,
            email: row.email,
            vip: row.vip,
            notes: row.notes,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}
