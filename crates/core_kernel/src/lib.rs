//! Core Kernel - Foundational types for the hotel stay system
//!
//! This crate provides the building blocks used across all domain modules:
//! - Money types with precise decimal arithmetic
//! - Strongly-typed entity identifiers
//! - Port abstractions shared by every adapter

pub mod identifiers;
pub mod money;
pub mod ports;

pub use identifiers::{
    AccountId, ChargeLineId, ClientId, HotelId, PaymentId, ReservationId, RoomId,
};
pub use money::{Currency, Money, MoneyError};
pub use ports::{DomainPort, PortError};
