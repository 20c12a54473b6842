//! Stay Domain Ports
//!
//! The `StayPort` trait defines everything the lifecycle needs from its data
//! store. The PostgreSQL adapter lives in `infra_db`; an in-memory mock is
//! provided here for unit testing.
//!
//! Room status changes go through `compare_and_set_room`, an atomic
//! compare-and-set on the current status. Check-in claims the room through it
//! before any reservation row is written, so when two front desks race over
//! the same room the loser fails with zero writes.

use async_trait::async_trait;

use core_kernel::{ClientId, DomainPort, HotelId, PortError, ReservationId, RoomId};

use crate::client::Client;
use crate::reservation::Reservation;
use crate::room::{Room, RoomStatus};

/// Port trait for stay persistence
#[async_trait]
pub trait StayPort: DomainPort {
    /// Retrieves a room by ID
    async fn get_room(&self, id: RoomId) -> Result<Room, PortError>;

    /// Inserts a new room
    async fn insert_room(&self, room: &Room) -> Result<(), PortError>;

    /// Persists non-status room fields
    async fn update_room(&self, room: &Room) -> Result<(), PortError>;

    /// All rooms of a hotel
    async fn list_rooms(&self, hotel_id: HotelId) -> Result<Vec<Room>, PortError>;

    /// Atomically moves a room from `expected` to `next`
    ///
    /// Returns `Ok(false)` without writing anything when the room is no
    /// longer in `expected`. On success `occupied_by` is set to the given
    /// value and `status_changed_at` advances.
    async fn compare_and_set_room(
        &self,
        id: RoomId,
        expected: RoomStatus,
        next: RoomStatus,
        occupied_by: Option<ReservationId>,
    ) -> Result<bool, PortError>;

    /// Retrieves a reservation by ID
    async fn get_reservation(&self, id: ReservationId) -> Result<Reservation, PortError>;

    /// Inserts a new reservation
    async fn insert_reservation(&self, reservation: &Reservation) -> Result<(), PortError>;

    /// Persists a reservation after a state change
    async fn update_reservation(&self, reservation: &Reservation) -> Result<(), PortError>;

    /// Removes a reservation row
    async fn delete_reservation(&self, id: ReservationId) -> Result<(), PortError>;

    /// All reservations of a hotel
    async fn list_reservations(&self, hotel_id: HotelId) -> Result<Vec<Reservation>, PortError>;

    /// Retrieves a client by ID
    async fn get_client(&self, id: ClientId) -> Result<Client, PortError>;

    /// Inserts a new client
    async fn insert_client(&self, client: &Client) -> Result<(), PortError>;

    /// Persists client detail changes
    async fn update_client(&self, client: &Client) -> Result<(), PortError>;

    /// All clients of a hotel
    async fn list_clients(&self, hotel_id: HotelId) -> Result<Vec<Client>, PortError>;
}

/// In-memory mock adapter for testing without a database
#[cfg(any(test, feature = "mock"))]
pub mod mock {
    use super::*;
    use chrono::Utc;
    use std::collections::HashMap;
    use std::sync::Arc;
    use tokio::sync::RwLock;

    /// In-memory implementation of `StayPort`
    #[derive(Debug, Default)]
    pub struct MockStayPort {
        rooms: Arc<RwLock<HashMap<RoomId, Room>>>,
        reservations: Arc<RwLock<HashMap<ReservationId, Reservation>>>,
        clients: Arc<RwLock<HashMap<ClientId, Client>>>,
        fail_reservation_writes: Arc<RwLock<bool>>,
    }

    impl MockStayPort {
        pub fn new() -> Self {
            Self::default()
        }

        /// Makes every subsequent reservation write fail, for exercising
        /// the compensation paths
        pub async fn fail_reservation_writes(&self, fail: bool) {
            *self.fail_reservation_writes.write().await = fail;
        }
    }

    impl DomainPort for MockStayPort {}

    #[async_trait]
    impl StayPort for MockStayPort {
        async fn get_room(&self, id: RoomId) -> Result<Room, PortError> {
            self.rooms
                .read()
                .await
                .get(&id)
                .cloned()
                .ok_or_else(|| PortError::not_found("Room", id))
        }

        async fn insert_room(&self, room: &Room) -> Result<(), PortError> {
            self.rooms.write().await.insert(room.id, room.clone());
            Ok(())
        }

        async fn update_room(&self, room: &Room) -> Result<(), PortError> {
            let mut rooms = self.rooms.write().await;
            match rooms.get_mut(&room.id) {
                Some(existing) => {
                    *existing = room.clone();
                    Ok(())
                }
                None => Err(PortError::not_found("Room", room.id)),
            }
        }

        async fn list_rooms(&self, hotel_id: HotelId) -> Result<Vec<Room>, PortError> {
            let mut rooms: Vec<Room> = self
                .rooms
                .read()
                .await
                .values()
                .filter(|r| r.hotel_id == hotel_id)
                .cloned()
                .collect();
            rooms.sort_by(|a, b| a.number.cmp(&b.number));
            Ok(rooms)
        }

        async fn compare_and_set_room(
            &self,
            id: RoomId,
            expected: RoomStatus,
            next: RoomStatus,
            occupied_by: Option<ReservationId>,
        ) -> Result<bool, PortError> {
            let mut rooms = self.rooms.write().await;
            let room = rooms
                .get_mut(&id)
                .ok_or_else(|| PortError::not_found("Room", id))?;
            if room.status != expected {
                return Ok(false);
            }
            let now = Utc::now();
            room.status = next;
            room.occupied_by = occupied_by;
            room.status_changed_at = now;
            room.updated_at = now;
            Ok(true)
        }

        async fn get_reservation(&self, id: ReservationId) -> Result<Reservation, PortError> {
            self.reservations
                .read()
                .await
                .get(&id)
                .cloned()
                .ok_or_else(|| PortError::not_found("Reservation", id))
        }

        async fn insert_reservation(&self, reservation: &Reservation) -> Result<(), PortError> {
            if *self.fail_reservation_writes.read().await {
                return Err(PortError::connection("simulated write failure"));
            }
            self.reservations
                .write()
                .await
                .insert(reservation.id, reservation.clone());
            Ok(())
        }

        async fn update_reservation(&self, reservation: &Reservation) -> Result<(), PortError> {
            if *self.fail_reservation_writes.read().await {
                return Err(PortError::connection("simulated write failure"));
            }
            let mut reservations = self.reservations.write().await;
            match reservations.get_mut(&reservation.id) {
                Some(existing) => {
                    *existing = reservation.clone();
                    Ok(())
                }
                None => Err(PortError::not_found("Reservation", reservation.id)),
            }
        }

        async fn delete_reservation(&self, id: ReservationId) -> Result<(), PortError> {
            let mut reservations = self.reservations.write().await;
            match reservations.remove(&id) {
                Some(_) => Ok(()),
                None => Err(PortError::not_found("Reservation", id)),
            }
        }

        async fn list_reservations(
            &self,
            hotel_id: HotelId,
        ) -> Result<Vec<Reservation>, PortError> {
            let mut reservations: Vec<Reservation> = self
                .reservations
                .read()
                .await
                .values()
                .filter(|r| r.hotel_id == hotel_id)
                .cloned()
                .collect();
            reservations.sort_by_key(|r| r.created_at);
            Ok(reservations)
        }

        async fn get_client(&self, id: ClientId) -> Result<Client, PortError> {
            self.clients
                .read()
                .await
                .get(&id)
                .cloned()
                .ok_or_else(|| PortError::not_found("Client", id))
        }

        async fn insert_client(&self, client: &Client) -> Result<(), PortError> {
            self.clients.write().await.insert(client.id, client.clone());
            Ok(())
        }

        async fn update_client(&self, client: &Client) -> Result<(), PortError> {
            let mut clients = self.clients.write().await;
            match clients.get_mut(&client.id) {
                Some(existing) => {
                    *existing = client.clone();
                    Ok(())
                }
                None => Err(PortError::not_found("Client", client.id)),
            }
        }

        async fn list_clients(&self, hotel_id: HotelId) -> Result<Vec<Client>, PortError> {
            let mut clients: Vec<Client> = self
                .clients
                .read()
                .await
                .values()
                .filter(|c| c.hotel_id == hotel_id)
                .cloned()
                .collect();
            clients.sort_by_key(|c| c.created_at);
            Ok(clients)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::mock::MockStayPort;
    use super::*;
    use crate::room::RoomType;
    use core_kernel::{Currency, Money};
    use rust_decimal_macros::dec;

    fn room() -> Room {
        Room::new(
            HotelId::new(),
            "101",
            RoomType::Double,
            Money::new(dec!(100000), Currency::MGA),
        )
    }

    #[tokio::test]
    async fn test_cas_succeeds_once() {
        let port = MockStayPort::new();
        let room = room();
        port.insert_room(&room).await.unwrap();

        let reservation_id = ReservationId::new();
        let won = port
            .compare_and_set_room(
                room.id,
                RoomStatus::Available,
                RoomStatus::Occupied,
                Some(reservation_id),
            )
            .await
            .unwrap();
        assert!(won);

        // Second claim against the stale expectation fails cleanly
        let won = port
            .compare_and_set_room(
                room.id,
                RoomStatus::Available,
                RoomStatus::Occupied,
                Some(ReservationId::new()),
            )
            .await
            .unwrap();
        assert!(!won);

        let stored = port.get_room(room.id).await.unwrap();
        assert_eq!(stored.status, RoomStatus::Occupied);
        assert_eq!(stored.occupied_by, Some(reservation_id));
    }

    #[tokio::test]
    async fn test_cas_on_missing_room() {
        let port = MockStayPort::new();
        let err = port
            .compare_and_set_room(
                RoomId::new(),
                RoomStatus::Available,
                RoomStatus::Cleaning,
                None,
            )
            .await
            .unwrap_err();
        assert!(err.is_not_found());
    }
}
