//! Cross-domain integration tests
//!
//! Exercise the stay lifecycle and the billing ledger together over the
//! in-memory adapters: arrival seeds the ledger, consumption and payments
//! move the solde, departure frees the room but never touches the ledger.

use std::sync::Arc;
use std::time::Duration;

use rust_decimal_macros::dec;

use core_kernel::{ClientId, Currency, ReservationId, RoomId};
use domain_folio::{AccountStatus, ChargeType, FolioService, MockFolioPort, PaymentMethod};
use domain_stay::{
    HousekeepingSweeper, MockStayPort, ReservationStatus, Room, RoomStatus, RoomType, StayError,
    StayService, StayPort,
};
use test_utils::{
    assert_account_balanced, assert_money_positive, assert_money_zero, IdFixtures, MoneyFixtures,
    TemporalFixtures, TestClientBuilder,
};

struct World {
    stay: Arc<StayService>,
    folio: Arc<FolioService>,
    port: Arc<MockStayPort>,
}

fn world() -> World {
    let port = Arc::new(MockStayPort::new());
    let folio = Arc::new(FolioService::new(Arc::new(MockFolioPort::new())));
    let stay = Arc::new(StayService::new(port.clone(), folio.clone()));
    World { stay, folio, port }
}

async fn seeded_reservation(world: &World, room_number: &str) -> (ClientId, RoomId, ReservationId) {
    let client = world
        .stay
        .create_client(TestClientBuilder::new().with_phone("+261 34 00 000 00").build())
        .await
        .unwrap();
    let room = world
        .stay
        .create_room(
            Room::new(
                IdFixtures::hotel_id(),
                room_number,
                RoomType::Double,
                MoneyFixtures::mga_rate(),
            )
            .with_floor(2),
        )
        .await
        .unwrap();
    let reservation = world
        .stay
        .create_reservation(
            IdFixtures::hotel_id(),
            client.id,
            room.id,
            TemporalFixtures::arrival(),
            TemporalFixtures::departure(),
            None,
            None,
        )
        .await
        .unwrap();
    (client.id, room.id, reservation.id)
}

#[tokio::test]
async fn test_checkin_seeds_ledger_and_occupies_room() {
    let world = world();
    let (_, room_id, reservation_id) = seeded_reservation(&world, "301").await;

    let reservation = world.stay.check_in(reservation_id).await.unwrap();
    assert_eq!(reservation.status, ReservationStatus::CheckedIn);

    let room = world.stay.get_room(room_id).await.unwrap();
    assert_eq!(room.status, RoomStatus::Occupied);
    assert_eq!(room.occupied_by, Some(reservation_id));

    // 3 nights at the fixture rate
    let account = world
        .folio
        .account_for_reservation(reservation_id)
        .await
        .unwrap()
        .expect("account opened at check-in");
    assert_eq!(account.total_facture.amount(), dec!(300000));
    assert_eq!(account.solde().amount(), dec!(300000));
    assert_eq!(account.status, AccountStatus::Ouvert);
    assert_account_balanced(&account);
}

#[tokio::test]
async fn test_settled_stay_full_cycle() {
    let world = world();
    let (client_id, room_id, reservation_id) = seeded_reservation(&world, "302").await;
    world.stay.check_in(reservation_id).await.unwrap();

    let account = world
        .folio
        .account_for_reservation(reservation_id)
        .await
        .unwrap()
        .unwrap();

    world
        .folio
        .add_charge(
            account.id,
            ChargeType::Minibar,
            MoneyFixtures::mga_minibar(),
            Some("Eau + THB".to_string()),
        )
        .await
        .unwrap();
    world
        .folio
        .record_payment(
            account.id,
            core_kernel::Money::new(dec!(315000), Currency::MGA),
            PaymentMethod::Especes,
            None,
            None,
        )
        .await
        .unwrap();

    let summary = world.folio.balance_summary(account.id).await.unwrap();
    assert_money_zero(&summary.solde);
    assert_eq!(summary.status, AccountStatus::Solde);

    // Departure frees the room, the ledger keeps its totals
    world.stay.check_out(reservation_id).await.unwrap();
    let room = world.stay.get_room(room_id).await.unwrap();
    assert_eq!(room.status, RoomStatus::Available);
    assert_eq!(room.occupied_by, None);

    let account = world.folio.account(account.id).await.unwrap();
    assert_eq!(account.total_facture.amount(), dec!(315000));
    assert_eq!(account.total_paye.amount(), dec!(315000));

    let debt = world
        .folio
        .client_debt(client_id, Currency::MGA)
        .await
        .unwrap();
    assert_money_zero(&debt);
}

#[tokio::test]
async fn test_unpaid_checkout_becomes_client_debt() {
    let world = world();
    let (client_id, _, reservation_id) = seeded_reservation(&world, "303").await;
    world.stay.check_in(reservation_id).await.unwrap();
    world.stay.check_out(reservation_id).await.unwrap();

    let debt = world
        .folio
        .client_debt(client_id, Currency::MGA)
        .await
        .unwrap();
    assert_money_positive(&debt);
    assert_eq!(debt.amount(), dec!(300000));
}

#[tokio::test]
async fn test_delete_guarded_by_billing_history() {
    let world = world();
    let (_, _, reservation_id) = seeded_reservation(&world, "304").await;
    world.stay.check_in(reservation_id).await.unwrap();

    let account = world
        .folio
        .account_for_reservation(reservation_id)
        .await
        .unwrap()
        .unwrap();
    world
        .folio
        .add_charge(
            account.id,
            ChargeType::Restaurant,
            MoneyFixtures::mga_minibar(),
            None,
        )
        .await
        .unwrap();
    world.stay.check_out(reservation_id).await.unwrap();

    let err = world.stay.delete_reservation(reservation_id).await.unwrap_err();
    assert!(matches!(err, StayError::HasBillingHistory { .. }));

    // The baseline room charge alone does not count as history
    let (_, _, clean_reservation) = seeded_reservation(&world, "305").await;
    world.stay.check_in(clean_reservation).await.unwrap();
    world.stay.check_out(clean_reservation).await.unwrap();
    world.stay.delete_reservation(clean_reservation).await.unwrap();
}

#[tokio::test]
async fn test_double_checkin_single_winner() {
    let world = world();
    let (_, room_id, first) = seeded_reservation(&world, "306").await;

    let client = world
        .stay
        .create_client(TestClientBuilder::new().with_name("Voahangy", "Rabe").build())
        .await
        .unwrap();
    let second = world
        .stay
        .create_reservation(
            IdFixtures::hotel_id(),
            client.id,
            room_id,
            TemporalFixtures::arrival(),
            TemporalFixtures::departure(),
            None,
            None,
        )
        .await
        .unwrap();

    world.stay.check_in(first).await.unwrap();
    let err = world.stay.check_in(second.id).await.unwrap_err();
    assert!(matches!(err, StayError::RoomConflict { .. }));

    // The loser is untouched: no status change, no account opened
    let loser = world.stay.get_reservation(second.id).await.unwrap();
    assert_eq!(loser.status, ReservationStatus::Pending);
    assert!(world
        .folio
        .account_for_reservation(second.id)
        .await
        .unwrap()
        .is_none());
}

#[tokio::test]
async fn test_housekeeping_sweep_releases_expired_cleaning() {
    let world = world();
    let (_, room_id, _) = seeded_reservation(&world, "307").await;

    world
        .stay
        .set_room_status(room_id, RoomStatus::Cleaning)
        .await
        .unwrap();

    let sweeper = HousekeepingSweeper::new(world.port.clone(), IdFixtures::hotel_id())
        .with_expiry(Duration::ZERO);
    let released = sweeper.sweep_once().await.unwrap();
    assert_eq!(released, 1);

    let room = world.stay.get_room(room_id).await.unwrap();
    assert_eq!(room.status, RoomStatus::Available);

    // A second pass finds nothing to do
    assert_eq!(sweeper.sweep_once().await.unwrap(), 0);
}

#[tokio::test]
async fn test_cancel_checked_in_reservation_frees_room() {
    let world = world();
    let (_, room_id, reservation_id) = seeded_reservation(&world, "308").await;
    world.stay.check_in(reservation_id).await.unwrap();

    let reservation = world.stay.cancel_reservation(reservation_id).await.unwrap();
    assert_eq!(reservation.status, ReservationStatus::Cancelled);

    let room = world.stay.get_room(room_id).await.unwrap();
    assert_eq!(room.status, RoomStatus::Available);
}

#[tokio::test]
async fn test_ports_shared_between_service_and_sweeper() {
    // The sweeper and the service act on the same rooms through the same
    // compare-and-set, so a manual release beats a concurrent sweep.
    let world = world();
    let (_, room_id, _) = seeded_reservation(&world, "309").await;
    world
        .stay
        .set_room_status(room_id, RoomStatus::Cleaning)
        .await
        .unwrap();

    let released = world
        .port
        .compare_and_set_room(room_id, RoomStatus::Cleaning, RoomStatus::Available, None)
        .await
        .unwrap();
    assert!(released);

    let sweeper = HousekeepingSweeper::new(world.port.clone(), IdFixtures::hotel_id())
        .with_expiry(Duration::ZERO);
    assert_eq!(sweeper.sweep_once().await.unwrap(), 0);
}
