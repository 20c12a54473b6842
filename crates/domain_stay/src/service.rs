//! Stay lifecycle service
//!
//! Orchestrates reservations, rooms and clients over a `StayPort`, and
//! bridges into the billing ledger at the two points where the lifecycle
//! touches money: check-in opens the stay account seeded with the room
//! total, and deletion is refused once the account carries history.
//!
//! Rooms and reservations live in separate rows with no cross-row
//! transaction, so every sequence that touches both is ordered to fail
//! safe: check-in claims the room first (a lost race costs zero writes),
//! and any sequence interrupted after its first write either compensates
//! or flags the reservation with `needs_reconciliation` and reports
//! `PartialFailure`.

use std::sync::Arc;

use tokio::sync::broadcast;
use tracing::{debug, error, instrument, warn};

use chrono::{NaiveDate, Utc};
use core_kernel::{ClientId, HotelId, Money, ReservationId, RoomId};
use rust_decimal::Decimal;
use domain_folio::FolioService;

use crate::client::Client;
use crate::error::StayError;
use crate::events::StayEvent;
use crate::ports::StayPort;
use crate::reservation::{Reservation, ReservationStatus};
use crate::room::{Room, RoomStatus};

/// Application service for the stay lifecycle
pub struct StayService {
    port: Arc<dyn StayPort>,
    folio: Arc<FolioService>,
    events: Option<broadcast::Sender<StayEvent>>,
}

impl StayService {
    /// Creates a new service over the given store adapter and ledger
    pub fn new(port: Arc<dyn StayPort>, folio: Arc<FolioService>) -> Self {
        Self {
            port,
            folio,
            events: None,
        }
    }

    /// Attaches a best-effort event channel for observers
    pub fn with_events(mut self, sender: broadcast::Sender<StayEvent>) -> Self {
        self.events = Some(sender);
        self
    }

    /// Registers a new guest
    pub async fn create_client(&self, client: Client) -> Result<Client, StayError> {
        self.port.insert_client(&client).await?;
        Ok(client)
    }

    /// Registers a new room, available from the start
    pub async fn create_room(&self, room: Room) -> Result<Room, StayError> {
        self.port.insert_room(&room).await?;
        Ok(room)
    }

    /// Books a room for a client
    ///
    /// The nightly rate is frozen from the room at booking time; later rate
    /// changes never move an existing reservation's total.
    #[instrument(skip(self))]
    pub async fn create_reservation(
        &self,
        hotel_id: HotelId,
        client_id: ClientId,
        room_id: RoomId,
        check_in_date: NaiveDate,
        check_out_date: NaiveDate,
        acompte: Option<Decimal>,
        notes: Option<String>,
    ) -> Result<Reservation, StayError> {
        let room = self.load_room(room_id).await?;
        self.load_client(client_id).await?;

        let mut reservation = Reservation::book(
            hotel_id,
            client_id,
            room_id,
            check_in_date,
            check_out_date,
            room.rate_per_night,
        )?;
        if let Some(amount) = acompte {
            if amount.is_sign_negative() {
                return Err(StayError::InvalidAmount(
                    "acompte must not be negative".to_string(),
                ));
            }
            reservation =
                reservation.with_acompte(Money::new(amount, room.rate_per_night.currency()));
        }
        if let Some(notes) = notes {
            reservation = reservation.with_notes(notes);
        }
        self.port.insert_reservation(&reservation).await?;

        debug!(reservation = %reservation.id, room = %room.number, "reservation booked");
        self.notify_reservation(&reservation);
        Ok(reservation)
    }

    /// Confirms a pending reservation
    pub async fn confirm_reservation(
        &self,
        reservation_id: ReservationId,
    ) -> Result<Reservation, StayError> {
        let mut reservation = self.load_reservation(reservation_id).await?;
        reservation.transition_to(ReservationStatus::Confirmed)?;
        self.port.update_reservation(&reservation).await?;
        self.notify_reservation(&reservation);
        Ok(reservation)
    }

    /// Checks the guest in: claims the room, moves the reservation to
    /// `CheckedIn` and opens the stay account seeded with the room total
    ///
    /// The room is claimed first through compare-and-set, so when two
    /// check-ins race over one room the loser gets `RoomConflict` before
    /// anything is written.
    #[instrument(skip(self))]
    pub async fn check_in(&self, reservation_id: ReservationId) -> Result<Reservation, StayError> {
        let mut reservation = self.load_reservation(reservation_id).await?;
        if !matches!(
            reservation.status,
            ReservationStatus::Pending | ReservationStatus::Confirmed
        ) {
            return Err(StayError::invalid_transition(
                reservation.status,
                ReservationStatus::CheckedIn,
            ));
        }

        let room = self.load_room(reservation.room_id).await?;
        let claimed = self
            .port
            .compare_and_set_room(
                room.id,
                RoomStatus::Available,
                RoomStatus::Occupied,
                Some(reservation.id),
            )
            .await?;
        if !claimed {
            return Err(StayError::RoomConflict {
                room: room.number.clone(),
            });
        }

        reservation.transition_to(ReservationStatus::CheckedIn)?;
        if let Err(write_err) = self.port.update_reservation(&reservation).await {
            // Give the room back so the failed check-in leaves no trace
            return Err(self
                .release_or_partial(
                    room.id,
                    RoomStatus::Occupied,
                    StayError::Storage(write_err),
                    "room claimed but reservation write failed",
                )
                .await);
        }

        if let Err(folio_err) = self
            .folio
            .ensure_account(
                reservation.id,
                reservation.hotel_id,
                reservation.client_id,
                reservation.total_price,
            )
            .await
        {
            error!(reservation = %reservation.id, error = %folio_err,
                "stay account not opened at check-in");
            self.flag_reconciliation(&mut reservation).await;
            return Err(StayError::partial_failure(format!(
                "checked in but stay account not opened: {}",
                folio_err
            )));
        }

        debug!(reservation = %reservation.id, room = %room.number, "guest checked in");
        self.notify_reservation(&reservation);
        self.notify_room(room.id, RoomStatus::Occupied);
        Ok(reservation)
    }

    /// Checks the guest out and releases the room
    ///
    /// The ledger is deliberately left untouched: an unpaid solde survives
    /// departure and shows up as client debt.
    #[instrument(skip(self))]
    pub async fn check_out(&self, reservation_id: ReservationId) -> Result<Reservation, StayError> {
        let mut reservation = self.load_reservation(reservation_id).await?;
        reservation.transition_to(ReservationStatus::CheckedOut)?;
        self.port.update_reservation(&reservation).await?;

        self.release_room_after(&mut reservation).await?;

        debug!(reservation = %reservation.id, "guest checked out");
        self.notify_reservation(&reservation);
        Ok(reservation)
    }

    /// Cancels a reservation; an in-house cancellation also frees the room
    #[instrument(skip(self))]
    pub async fn cancel_reservation(
        &self,
        reservation_id: ReservationId,
    ) -> Result<Reservation, StayError> {
        let mut reservation = self.load_reservation(reservation_id).await?;
        let was_checked_in = reservation.status == ReservationStatus::CheckedIn;

        reservation.transition_to(ReservationStatus::Cancelled)?;
        self.port.update_reservation(&reservation).await?;

        if was_checked_in {
            self.release_room_after(&mut reservation).await?;
        }

        self.notify_reservation(&reservation);
        Ok(reservation)
    }

    /// Marks a guest who never arrived
    ///
    /// Only reachable before check-in, so no room is held and nothing needs
    /// releasing.
    pub async fn mark_no_show(
        &self,
        reservation_id: ReservationId,
    ) -> Result<Reservation, StayError> {
        let mut reservation = self.load_reservation(reservation_id).await?;
        reservation.transition_to(ReservationStatus::NoShow)?;
        self.port.update_reservation(&reservation).await?;
        self.notify_reservation(&reservation);
        Ok(reservation)
    }

    /// Deletes a reservation that never accrued billing history
    ///
    /// A stay whose account carries lines or payments is part of the books
    /// and can only be cancelled, never erased.
    #[instrument(skip(self))]
    pub async fn delete_reservation(&self, reservation_id: ReservationId) -> Result<(), StayError> {
        let reservation = self.load_reservation(reservation_id).await?;
        if reservation.status == ReservationStatus::CheckedIn {
            return Err(StayError::invalid_transition(reservation.status, "Deleted"));
        }
        if self.folio.has_activity(reservation_id).await? {
            return Err(StayError::HasBillingHistory {
                reservation: reservation_id.to_string(),
            });
        }
        self.port.delete_reservation(reservation_id).await?;
        Ok(())
    }

    /// Manual housekeeping override of a room's status
    ///
    /// Occupied is rejected on both sides: rooms enter it only through
    /// check-in and leave it only through check-out or cancellation.
    #[instrument(skip(self))]
    pub async fn set_room_status(
        &self,
        room_id: RoomId,
        target: RoomStatus,
    ) -> Result<Room, StayError> {
        let room = self.load_room(room_id).await?;
        room.check_override(target)?;

        let moved = self
            .port
            .compare_and_set_room(room_id, room.status, target, None)
            .await?;
        if !moved {
            // Someone changed the room between our read and the write
            return Err(StayError::RoomConflict {
                room: room.number.clone(),
            });
        }

        self.notify_room(room_id, target);
        self.load_room(room_id).await
    }

    /// Reservation read
    pub async fn get_reservation(
        &self,
        reservation_id: ReservationId,
    ) -> Result<Reservation, StayError> {
        self.load_reservation(reservation_id).await
    }

    /// Room read
    pub async fn get_room(&self, room_id: RoomId) -> Result<Room, StayError> {
        self.load_room(room_id).await
    }

    /// All rooms of a hotel
    pub async fn list_rooms(&self, hotel_id: HotelId) -> Result<Vec<Room>, StayError> {
        Ok(self.port.list_rooms(hotel_id).await?)
    }

    /// All reservations of a hotel
    pub async fn list_reservations(
        &self,
        hotel_id: HotelId,
    ) -> Result<Vec<Reservation>, StayError> {
        Ok(self.port.list_reservations(hotel_id).await?)
    }

    /// All clients of a hotel
    pub async fn list_clients(&self, hotel_id: HotelId) -> Result<Vec<Client>, StayError> {
        Ok(self.port.list_clients(hotel_id).await?)
    }

    /// Client read
    pub async fn get_client(&self, client_id: ClientId) -> Result<Client, StayError> {
        self.load_client(client_id).await
    }

    /// Releases the reservation's room after its row already says the stay
    /// ended; a failed release flags the reservation instead of unwinding it
    async fn release_room_after(&self, reservation: &mut Reservation) -> Result<(), StayError> {
        let released = match self
            .port
            .compare_and_set_room(
                reservation.room_id,
                RoomStatus::Occupied,
                RoomStatus::Available,
                None,
            )
            .await
        {
            Ok(released) => released,
            Err(release_err) => {
                error!(reservation = %reservation.id, error = %release_err,
                    "room release failed after reservation write");
                self.flag_reconciliation(reservation).await;
                return Err(StayError::partial_failure(format!(
                    "stay ended but room not released: {}",
                    release_err
                )));
            }
        };

        if !released {
            // Room was not in Occupied; a sweep or override got there first
            warn!(reservation = %reservation.id, room = %reservation.room_id,
                "room already released");
        } else {
            self.notify_room(reservation.room_id, RoomStatus::Available);
        }
        Ok(())
    }

    /// Compensates a claimed room, or reports the sequence as half-applied
    async fn release_or_partial(
        &self,
        room_id: RoomId,
        expected: RoomStatus,
        original: StayError,
        context: &str,
    ) -> StayError {
        match self
            .port
            .compare_and_set_room(room_id, expected, RoomStatus::Available, None)
            .await
        {
            Ok(_) => original,
            Err(release_err) => {
                error!(room = %room_id, error = %release_err, "compensating release failed");
                StayError::partial_failure(format!("{}: {}", context, release_err))
            }
        }
    }

    /// Best-effort flagging; the reservation row may itself be unreachable
    async fn flag_reconciliation(&self, reservation: &mut Reservation) {
        reservation.needs_reconciliation = true;
        if let Err(flag_err) = self.port.update_reservation(reservation).await {
            error!(reservation = %reservation.id, error = %flag_err,
                "could not flag reservation for reconciliation");
        }
    }

    async fn load_reservation(&self, id: ReservationId) -> Result<Reservation, StayError> {
        self.port.get_reservation(id).await.map_err(|e| {
            if e.is_not_found() {
                StayError::reservation_not_found(id)
            } else {
                StayError::Storage(e)
            }
        })
    }

    async fn load_room(&self, id: RoomId) -> Result<Room, StayError> {
        self.port.get_room(id).await.map_err(|e| {
            if e.is_not_found() {
                StayError::room_not_found(id)
            } else {
                StayError::Storage(e)
            }
        })
    }

    async fn load_client(&self, id: ClientId) -> Result<Client, StayError> {
        self.port.get_client(id).await.map_err(|e| {
            if e.is_not_found() {
                StayError::client_not_found(id)
            } else {
                StayError::Storage(e)
            }
        })
    }

    fn notify_reservation(&self, reservation: &Reservation) {
        self.notify(StayEvent::ReservationChanged {
            reservation_id: reservation.id,
            status: reservation.status,
            timestamp: Utc::now(),
        });
    }

    fn notify_room(&self, room_id: RoomId, status: RoomStatus) {
        self.notify(StayEvent::RoomChanged {
            room_id,
            status,
            timestamp: Utc::now(),
        });
    }

    fn notify(&self, event: StayEvent) {
        if let Some(sender) = &self.events {
            if sender.send(event).is_err() {
                warn!("stay event dropped: no subscribers");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::mock::MockStayPort;
    use crate::room::RoomType;
    use core_kernel::{Currency, Money};
    use domain_folio::ports::mock::MockFolioPort;
    use rust_decimal_macros::dec;

    struct Fixture {
        stay: StayService,
        folio: Arc<FolioService>,
        port: Arc<MockStayPort>,
        hotel_id: HotelId,
    }

    fn mga(n: i64) -> Money {
        Money::from_minor(n, Currency::MGA)
    }

    fn fixture() -> Fixture {
        let port = Arc::new(MockStayPort::new());
        let folio = Arc::new(FolioService::new(Arc::new(MockFolioPort::new())));
        let stay = StayService::new(port.clone(), folio.clone());
        Fixture {
            stay,
            folio,
            port,
            hotel_id: HotelId::new(),
        }
    }

    async fn booked_reservation(fx: &Fixture) -> Reservation {
        let client = fx
            .stay
            .create_client(Client::new(fx.hotel_id, "Hery", "Rakotomalala"))
            .await
            .unwrap();
        let room = fx
            .stay
            .create_room(Room::new(fx.hotel_id, "101", RoomType::Double, mga(100_000)).with_floor(1))
            .await
            .unwrap();
        fx.stay
            .create_reservation(
                fx.hotel_id,
                client.id,
                room.id,
                NaiveDate::from_ymd_opt(2026, 3, 10).unwrap(),
                NaiveDate::from_ymd_opt(2026, 3, 11).unwrap(),
                None,
                None,
            )
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_check_in_claims_room_and_opens_account() {
        let fx = fixture();
        let reservation = booked_reservation(&fx).await;

        let checked_in = fx.stay.check_in(reservation.id).await.unwrap();
        assert_eq!(checked_in.status, ReservationStatus::CheckedIn);

        let room = fx.stay.get_room(reservation.room_id).await.unwrap();
        assert_eq!(room.status, RoomStatus::Occupied);
        assert_eq!(room.occupied_by, Some(reservation.id));

        // Account opened, seeded with the one-night total
        let account = fx
            .folio
            .ensure_account(
                reservation.id,
                reservation.hotel_id,
                reservation.client_id,
                mga(100_000),
            )
            .await
            .unwrap();
        assert_eq!(account.total_facture.amount(), dec!(100000));
    }

    #[tokio::test]
    async fn test_booking_records_acompte_in_room_currency() {
        let fx = fixture();
        let first = booked_reservation(&fx).await;

        let reservation = fx
            .stay
            .create_reservation(
                fx.hotel_id,
                first.client_id,
                first.room_id,
                NaiveDate::from_ymd_opt(2026, 4, 1).unwrap(),
                NaiveDate::from_ymd_opt(2026, 4, 3).unwrap(),
                Some(dec!(50000)),
                Some("arrive tard".to_string()),
            )
            .await
            .unwrap();
        assert_eq!(reservation.acompte, mga(50_000));
        assert_eq!(reservation.notes.as_deref(), Some("arrive tard"));

        let err = fx
            .stay
            .create_reservation(
                fx.hotel_id,
                first.client_id,
                first.room_id,
                NaiveDate::from_ymd_opt(2026, 5, 1).unwrap(),
                NaiveDate::from_ymd_opt(2026, 5, 3).unwrap(),
                Some(dec!(-1)),
                None,
            )
            .await
            .unwrap_err();
        assert!(matches!(err, StayError::InvalidAmount(_)));
    }

    #[tokio::test]
    async fn test_double_check_in_same_room() {
        let fx = fixture();
        let first = booked_reservation(&fx).await;
        let second = fx
            .stay
            .create_reservation(
                fx.hotel_id,
                first.client_id,
                first.room_id,
                NaiveDate::from_ymd_opt(2026, 3, 10).unwrap(),
                NaiveDate::from_ymd_opt(2026, 3, 12).unwrap(),
                None,
                None,
            )
            .await
            .unwrap();

        fx.stay.check_in(first.id).await.unwrap();
        let err = fx.stay.check_in(second.id).await.unwrap_err();
        assert!(matches!(err, StayError::RoomConflict { .. }));

        // The loser's reservation is untouched
        let second = fx.stay.get_reservation(second.id).await.unwrap();
        assert_eq!(second.status, ReservationStatus::Pending);
        assert!(fx.folio.has_activity(second.id).await.unwrap() == false);
    }

    #[tokio::test]
    async fn test_check_in_from_terminal_state() {
        let fx = fixture();
        let reservation = booked_reservation(&fx).await;
        fx.stay.cancel_reservation(reservation.id).await.unwrap();

        let err = fx.stay.check_in(reservation.id).await.unwrap_err();
        assert!(matches!(err, StayError::InvalidTransition { .. }));
    }

    #[tokio::test]
    async fn test_check_out_releases_room_and_keeps_ledger() {
        let fx = fixture();
        let reservation = booked_reservation(&fx).await;
        fx.stay.check_in(reservation.id).await.unwrap();

        let checked_out = fx.stay.check_out(reservation.id).await.unwrap();
        assert_eq!(checked_out.status, ReservationStatus::CheckedOut);
        assert!(checked_out.checked_out_at.is_some());

        let room = fx.stay.get_room(reservation.room_id).await.unwrap();
        assert_eq!(room.status, RoomStatus::Available);
        assert!(room.occupied_by.is_none());

        // Unpaid balance survives departure
        let debt = fx
            .folio
            .client_debt(reservation.client_id, Currency::MGA)
            .await
            .unwrap();
        assert_eq!(debt.amount(), dec!(100000));
    }

    #[tokio::test]
    async fn test_cancel_in_house_releases_room() {
        let fx = fixture();
        let reservation = booked_reservation(&fx).await;
        fx.stay.check_in(reservation.id).await.unwrap();

        fx.stay.cancel_reservation(reservation.id).await.unwrap();
        let room = fx.stay.get_room(reservation.room_id).await.unwrap();
        assert_eq!(room.status, RoomStatus::Available);
    }

    #[tokio::test]
    async fn test_cancel_before_arrival_leaves_room_alone() {
        let fx = fixture();
        let reservation = booked_reservation(&fx).await;

        fx.stay.cancel_reservation(reservation.id).await.unwrap();
        let room = fx.stay.get_room(reservation.room_id).await.unwrap();
        assert_eq!(room.status, RoomStatus::Available);
        assert!(room.occupied_by.is_none());
    }

    #[tokio::test]
    async fn test_no_show_from_confirmed() {
        let fx = fixture();
        let reservation = booked_reservation(&fx).await;
        fx.stay.confirm_reservation(reservation.id).await.unwrap();

        let marked = fx.stay.mark_no_show(reservation.id).await.unwrap();
        assert_eq!(marked.status, ReservationStatus::NoShow);
    }

    #[tokio::test]
    async fn test_delete_without_history() {
        let fx = fixture();
        let reservation = booked_reservation(&fx).await;
        fx.stay.cancel_reservation(reservation.id).await.unwrap();

        fx.stay.delete_reservation(reservation.id).await.unwrap();
        let err = fx.stay.get_reservation(reservation.id).await.unwrap_err();
        assert!(matches!(err, StayError::ReservationNotFound(_)));
    }

    #[tokio::test]
    async fn test_delete_blocked_by_billing_history() {
        let fx = fixture();
        let reservation = booked_reservation(&fx).await;
        fx.stay.check_in(reservation.id).await.unwrap();

        let account = fx
            .folio
            .ensure_account(
                reservation.id,
                reservation.hotel_id,
                reservation.client_id,
                mga(100_000),
            )
            .await
            .unwrap();
        fx.folio
            .record_payment(
                account.id,
                mga(100_000),
                domain_folio::PaymentMethod::Especes,
                None,
                None,
            )
            .await
            .unwrap();
        fx.stay.check_out(reservation.id).await.unwrap();

        let err = fx.stay.delete_reservation(reservation.id).await.unwrap_err();
        assert!(matches!(err, StayError::HasBillingHistory { .. }));
    }

    #[tokio::test]
    async fn test_delete_checked_in_rejected() {
        let fx = fixture();
        let reservation = booked_reservation(&fx).await;
        fx.stay.check_in(reservation.id).await.unwrap();

        let err = fx.stay.delete_reservation(reservation.id).await.unwrap_err();
        assert!(matches!(err, StayError::InvalidTransition { .. }));
    }

    #[tokio::test]
    async fn test_manual_occupied_rejected() {
        let fx = fixture();
        let room = fx
            .stay
            .create_room(Room::new(fx.hotel_id, "102", RoomType::Single, mga(80_000)))
            .await
            .unwrap();

        let err = fx
            .stay
            .set_room_status(room.id, RoomStatus::Occupied)
            .await
            .unwrap_err();
        assert!(matches!(err, StayError::InvalidTransition { .. }));
    }

    #[tokio::test]
    async fn test_override_occupied_room_rejected() {
        let fx = fixture();
        let reservation = booked_reservation(&fx).await;
        fx.stay.check_in(reservation.id).await.unwrap();

        let err = fx
            .stay
            .set_room_status(reservation.room_id, RoomStatus::Maintenance)
            .await
            .unwrap_err();
        assert!(matches!(err, StayError::RoomOccupied { .. }));
    }

    #[tokio::test]
    async fn test_failed_reservation_write_releases_room() {
        let fx = fixture();
        let reservation = booked_reservation(&fx).await;

        fx.port.fail_reservation_writes(true).await;
        let err = fx.stay.check_in(reservation.id).await.unwrap_err();
        assert!(matches!(err, StayError::Storage(_)));
        fx.port.fail_reservation_writes(false).await;

        // Compensation gave the room back
        let room = fx.stay.get_room(reservation.room_id).await.unwrap();
        assert_eq!(room.status, RoomStatus::Available);

        // And the check-in can be retried cleanly
        fx.stay.check_in(reservation.id).await.unwrap();
    }
}
