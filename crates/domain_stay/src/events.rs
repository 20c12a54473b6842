//! Stay domain events

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use core_kernel::{ReservationId, RoomId};

use crate::reservation::ReservationStatus;
use crate::room::RoomStatus;

/// Events emitted after a lifecycle mutation has been persisted
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum StayEvent {
    /// A reservation moved through its state machine
    ReservationChanged {
        reservation_id: ReservationId,
        status: ReservationStatus,
        timestamp: DateTime<Utc>,
    },
    /// A room changed housekeeping/occupancy status
    RoomChanged {
        room_id: RoomId,
        status: RoomStatus,
        timestamp: DateTime<Utc>,
    },
}
