//! Test Data Builders
//!
//! Builder patterns over the domain entities with sensible defaults, so
//! tests specify only the fields they care about.

use chrono::NaiveDate;
use core_kernel::{ClientId, HotelId, Money, RoomId};
use domain_stay::{Client, Reservation, Room, RoomStatus, RoomType};

use crate::fixtures::{IdFixtures, MoneyFixtures, TemporalFixtures};

/// Builder for guest records
pub struct TestClientBuilder {
    hotel_id: HotelId,
    first_name: String,
    last_name: String,
    phone: Option<String>,
    vip: bool,
}

impl Default for TestClientBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl TestClientBuilder {
    pub fn new() -> Self {
        Self {
            hotel_id: IdFixtures::hotel_id(),
            first_name: "Hery".to_string(),
            last_name: "Rakoto".to_string(),
            phone: None,
            vip: false,
        }
    }

    pub fn with_hotel(mut self, hotel_id: HotelId) -> Self {
        self.hotel_id = hotel_id;
        self
    }

    pub fn with_name(mut self, first: impl Into<String>, last: impl Into<String>) -> Self {
        self.first_name = first.into();
        self.last_name = last.into();
        self
    }

    pub fn with_phone(mut self, phone: impl Into<String>) -> Self {
        self.phone = Some(phone.into());
        self
    }

    pub fn vip(mut self) -> Self {
        self.vip = true;
        self
    }

    pub fn build(self) -> Client {
        let mut client = Client::new(self.hotel_id, self.first_name, self.last_name);
        client.phone = self.phone;
        client.vip = self.vip;
        client
    }
}

/// Builder for rooms
pub struct TestRoomBuilder {
    hotel_id: HotelId,
    number: String,
    room_type: RoomType,
    rate_per_night: Money,
    status: RoomStatus,
}

impl Default for TestRoomBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl TestRoomBuilder {
    pub fn new() -> Self {
        Self {
            hotel_id: IdFixtures::hotel_id(),
            number: "101".to_string(),
            room_type: RoomType::Double,
            rate_per_night: MoneyFixtures::mga_rate(),
            status: RoomStatus::Available,
        }
    }

    pub fn with_hotel(mut self, hotel_id: HotelId) -> Self {
        self.hotel_id = hotel_id;
        self
    }

    pub fn with_number(mut self, number: impl Into<String>) -> Self {
        self.number = number.into();
        self
    }

    pub fn with_type(mut self, room_type: RoomType) -> Self {
        self.room_type = room_type;
        self
    }

    pub fn with_rate(mut self, rate: Money) -> Self {
        self.rate_per_night = rate;
        self
    }

    pub fn with_status(mut self, status: RoomStatus) -> Self {
        self.status = status;
        self
    }

    pub fn build(self) -> Room {
        let mut room = Room::new(self.hotel_id, self.number, self.room_type, self.rate_per_night);
        room.status = self.status;
        room
    }
}

/// Builder for reservations
pub struct TestReservationBuilder {
    hotel_id: HotelId,
    client_id: ClientId,
    room_id: RoomId,
    check_in_date: NaiveDate,
    check_out_date: NaiveDate,
    rate_per_night: Money,
}

impl Default for TestReservationBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl TestReservationBuilder {
    pub fn new() -> Self {
        Self {
            hotel_id: IdFixtures::hotel_id(),
            client_id: IdFixtures::client_id(),
            room_id: IdFixtures::room_id(),
            check_in_date: TemporalFixtures::arrival(),
            check_out_date: TemporalFixtures::departure(),
            rate_per_night: MoneyFixtures::mga_rate(),
        }
    }

    pub fn with_client(mut self, client_id: ClientId) -> Self {
        self.client_id = client_id;
        self
    }

    pub fn with_room(mut self, room_id: RoomId) -> Self {
        self.room_id = room_id;
        self
    }

    pub fn with_dates(mut self, check_in: NaiveDate, check_out: NaiveDate) -> Self {
        self.check_in_date = check_in;
        self.check_out_date = check_out;
        self
    }

    pub fn with_rate(mut self, rate: Money) -> Self {
        self.rate_per_night = rate;
        self
    }

    /// Builds the reservation; panics on invalid dates since a builder
    /// misuse is a test bug
    pub fn build(self) -> Reservation {
        Reservation::book(
            self.hotel_id,
            self.client_id,
            self.room_id,
            self.check_in_date,
            self.check_out_date,
            self.rate_per_night,
        )
        .expect("builder produced invalid reservation dates")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_default_reservation_totals() {
        let reservation = TestReservationBuilder::new().build();
        assert_eq!(reservation.nights(), 3);
        assert_eq!(reservation.total_price.amount(), dec!(300000));
    }

    #[test]
    fn test_room_builder_status_override() {
        let room = TestRoomBuilder::new()
            .with_status(RoomStatus::Cleaning)
            .build();
        assert_eq!(room.status, RoomStatus::Cleaning);
    }
}
