//! Housekeeping expiry sweep
//!
//! Rooms parked in `Cleaning` return to `Available` on their own once the
//! crew has had time to finish, without anyone touching the front desk
//! screen. The sweep is idempotent and races safely: each expired room is
//! flipped through the same compare-and-set used everywhere else, so a
//! concurrent sweep or manual override simply wins and this pass skips the
//! room.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tokio::sync::watch;
use tracing::{debug, info, warn};

use core_kernel::HotelId;

use crate::error::StayError;
use crate::ports::StayPort;
use crate::room::RoomStatus;

/// How long a room may sit in `Cleaning` before the sweep releases it
pub const CLEANING_EXPIRY: Duration = Duration::from_secs(30 * 60);

/// Background task returning cleaned rooms to service
pub struct HousekeepingSweeper {
    port: Arc<dyn StayPort>,
    hotel_id: HotelId,
    expiry: Duration,
    interval: Duration,
}

impl HousekeepingSweeper {
    pub fn new(port: Arc<dyn StayPort>, hotel_id: HotelId) -> Self {
        Self {
            port,
            hotel_id,
            expiry: CLEANING_EXPIRY,
            interval: Duration::from_secs(60),
        }
    }

    /// Overrides the expiry threshold
    pub fn with_expiry(mut self, expiry: Duration) -> Self {
        self.expiry = expiry;
        self
    }

    /// Overrides the pause between passes
    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    /// Releases every room that has been in `Cleaning` longer than the
    /// expiry, returning how many were released
    pub async fn sweep_once(&self) -> Result<u32, StayError> {
        let rooms = self.port.list_rooms(self.hotel_id).await?;
        let now = Utc::now();
        let mut released = 0u32;

        for room in rooms {
            if room.status != RoomStatus::Cleaning {
                continue;
            }
            let in_cleaning = (now - room.status_changed_at)
                .to_std()
                .unwrap_or(Duration::ZERO);
            if in_cleaning < self.expiry {
                continue;
            }

            match self
                .port
                .compare_and_set_room(room.id, RoomStatus::Cleaning, RoomStatus::Available, None)
                .await
            {
                Ok(true) => {
                    debug!(room = %room.number, "cleaning expired, room released");
                    released += 1;
                }
                Ok(false) => {
                    // Someone moved the room since our read
                    debug!(room = %room.number, "room left cleaning before the sweep");
                }
                Err(e) => {
                    // Keep sweeping the rest; this room gets another pass
                    warn!(room = %room.number, error = %e, "sweep skipped room");
                }
            }
        }

        Ok(released)
    }

    /// Runs the sweep on an interval until `shutdown` flips to true
    pub async fn run(self, mut shutdown: watch::Receiver<bool>) {
        let mut ticker = tokio::time::interval(self.interval);
        info!(hotel = %self.hotel_id, "housekeeping sweeper started");

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    match self.sweep_once().await {
                        Ok(0) => {}
                        Ok(n) => info!(released = n, "housekeeping sweep released rooms"),
                        Err(e) => warn!(error = %e, "housekeeping sweep failed"),
                    }
                }
                _ = shutdown.changed() => {
                    if *shutdown.borrow() {
                        info!("housekeeping sweeper stopping");
                        return;
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::mock::MockStayPort;
    use crate::room::{Room, RoomType};
    use chrono::Duration as ChronoDuration;
    use core_kernel::{Currency, Money};
    use rust_decimal_macros::dec;

    async fn cleaning_room(port: &MockStayPort, hotel_id: HotelId, number: &str, age_min: i64) -> Room {
        let mut room = Room::new(
            hotel_id,
            number,
            RoomType::Double,
            Money::new(dec!(100000), Currency::MGA),
        );
        room.status = RoomStatus::Cleaning;
        room.status_changed_at = Utc::now() - ChronoDuration::minutes(age_min);
        port.insert_room(&room).await.unwrap();
        room
    }

    #[tokio::test]
    async fn test_sweep_releases_only_expired_rooms() {
        let port = Arc::new(MockStayPort::new());
        let hotel_id = HotelId::new();
        let old = cleaning_room(&port, hotel_id, "101", 45).await;
        let fresh = cleaning_room(&port, hotel_id, "102", 5).await;

        let sweeper = HousekeepingSweeper::new(port.clone(), hotel_id);
        let released = sweeper.sweep_once().await.unwrap();
        assert_eq!(released, 1);

        assert_eq!(
            port.get_room(old.id).await.unwrap().status,
            RoomStatus::Available
        );
        assert_eq!(
            port.get_room(fresh.id).await.unwrap().status,
            RoomStatus::Cleaning
        );
    }

    #[tokio::test]
    async fn test_sweep_is_idempotent() {
        let port = Arc::new(MockStayPort::new());
        let hotel_id = HotelId::new();
        cleaning_room(&port, hotel_id, "101", 45).await;

        let sweeper = HousekeepingSweeper::new(port.clone(), hotel_id);
        assert_eq!(sweeper.sweep_once().await.unwrap(), 1);
        assert_eq!(sweeper.sweep_once().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_sweep_ignores_other_statuses() {
        let port = Arc::new(MockStayPort::new());
        let hotel_id = HotelId::new();
        let mut room = Room::new(
            hotel_id,
            "103",
            RoomType::Suite,
            Money::new(dec!(250000), Currency::MGA),
        );
        room.status = RoomStatus::Maintenance;
        room.status_changed_at = Utc::now() - ChronoDuration::hours(5);
        port.insert_room(&room).await.unwrap();

        let sweeper = HousekeepingSweeper::new(port.clone(), hotel_id);
        assert_eq!(sweeper.sweep_once().await.unwrap(), 0);
        assert_eq!(
            port.get_room(room.id).await.unwrap().status,
            RoomStatus::Maintenance
        );
    }

    #[tokio::test]
    async fn test_run_stops_on_shutdown() {
        let port = Arc::new(MockStayPort::new());
        let sweeper = HousekeepingSweeper::new(port, HotelId::new())
            .with_interval(Duration::from_millis(10));

        let (tx, rx) = watch::channel(false);
        let handle = tokio::spawn(sweeper.run(rx));

        tokio::time::sleep(Duration::from_millis(30)).await;
        tx.send(true).unwrap();
        tokio::time::timeout(Duration::from_secs(1), handle)
            .await
            .expect("sweeper did not stop")
            .unwrap();
    }
}
