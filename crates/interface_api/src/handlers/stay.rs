//! Stay lifecycle handlers

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};
use uuid::Uuid;
use validator::Validate;

use core_kernel::{ClientId, Money, ReservationId, RoomId};
use domain_stay::{Client, PaymentProgress, Reservation, Room, RoomStatus, RoomType};

use crate::auth::{permissions, Claims};
use crate::dto::stay::*;
use crate::error::ApiError;
use crate::handlers::{check_hotel_scope, hotel_from_claims, parse_enum, require_permission};
use crate::AppState;

fn money_from_request(amount: rust_decimal::Decimal, currency: &str) -> Result<Money, ApiError> {
    let currency = currency
        .parse()
        .map_err(|_| ApiError::BadRequest(format!("unknown currency '{}'", currency)))?;
    Ok(Money::new(amount, currency))
}

/// Resolves a path id into a reservation the caller's hotel owns
async fn scoped_reservation(
    state: &AppState,
    claims: &Claims,
    id: Uuid,
) -> Result<Reservation, ApiError> {
    let hotel_id = hotel_from_claims(claims)?;
    let reservation = state
        .stay
        .get_reservation(ReservationId::from_uuid(id))
        .await?;
    check_hotel_scope(hotel_id, reservation.hotel_id, "reservation")?;
    Ok(reservation)
}

async fn reservation_response(
    state: &AppState,
    reservation: Reservation,
) -> Result<ReservationResponse, ApiError> {
    let progress = match state
        .folio
        .account_for_reservation(reservation.id)
        .await?
    {
        Some(account) => Some(PaymentProgress::derive(
            account.total_paye,
            account.solde(),
        )),
        None => None,
    };
    Ok(ReservationResponse::from_reservation(reservation, progress))
}

/// Registers a new guest
pub async fn create_client(
    State(state): State<AppState>,
    claims: Extension<Claims>,
    Json(request): Json<CreateClientRequest>,
) -> Result<(StatusCode, Json<ClientResponse>), ApiError> {
    require_permission(&claims, permissions::CLIENT_WRITE)?;
    request.validate()?;

    let hotel_id = hotel_from_claims(&claims)?;
    let mut client = Client::new(hotel_id, request.first_name, request.last_name);
    client.phone = request.phone;
    client.email = request.email;
    client.vip = request.vip;
    client.notes = request.notes;

    let client = state.stay.create_client(client).await?;
    Ok((StatusCode::CREATED, Json(client.into())))
}

/// Lists guests
pub async fn list_clients(
    State(state): State<AppState>,
    claims: Extension<Claims>,
) -> Result<Json<Vec<ClientResponse>>, ApiError> {
    require_permission(&claims, permissions::CLIENT_READ)?;
    let hotel_id = hotel_from_claims(&claims)?;
    let clients = state.stay.list_clients(hotel_id).await?;
    Ok(Json(clients.into_iter().map(Into::into).collect()))
}

/// Gets a guest by ID
pub async fn get_client(
    State(state): State<AppState>,
    claims: Extension<Claims>,
    Path(id): Path<Uuid>,
) -> Result<Json<ClientResponse>, ApiError> {
    require_permission(&claims, permissions::CLIENT_READ)?;
    let hotel_id = hotel_from_claims(&claims)?;
    let client = state.stay.get_client(ClientId::from_uuid(id)).await?;
    check_hotel_scope(hotel_id, client.hotel_id, "client")?;
    Ok(Json(client.into()))
}

/// Registers a new room
pub async fn create_room(
    State(state): State<AppState>,
    claims: Extension<Claims>,
    Json(request): Json<CreateRoomRequest>,
) -> Result<(StatusCode, Json<RoomResponse>), ApiError> {
    require_permission(&claims, permissions::ROOM_WRITE)?;
    request.validate()?;

    let hotel_id = hotel_from_claims(&claims)?;
    let room_type: RoomType = parse_enum("room_type", &request.room_type)?;
    let rate = money_from_request(request.rate_per_night, &request.currency)?;
    if !rate.is_positive() {
        return Err(ApiError::BadRequest(
            "rate_per_night must be strictly positive".to_string(),
        ));
    }

    let mut room = Room::new(hotel_id, request.number, room_type, rate);
    if let Some(floor) = request.floor {
        room = room.with_floor(floor);
    }
    if let Some(capacity) = request.capacity {
        room = room.with_capacity(capacity);
    }
    if let Some(amenities) = request.amenities {
        room = room.with_amenities(amenities);
    }
    if let Some(notes) = request.notes {
        room = room.with_notes(notes);
    }

    let room = state.stay.create_room(room).await?;
    Ok((StatusCode::CREATED, Json(room.into())))
}

/// Lists rooms with their live status
pub async fn list_rooms(
    State(state): State<AppState>,
    claims: Extension<Claims>,
) -> Result<Json<Vec<RoomResponse>>, ApiError> {
    require_permission(&claims, permissions::ROOM_READ)?;
    let hotel_id = hotel_from_claims(&claims)?;
    let rooms = state.stay.list_rooms(hotel_id).await?;
    Ok(Json(rooms.into_iter().map(Into::into).collect()))
}

/// Gets a room by ID
pub async fn get_room(
    State(state): State<AppState>,
    claims: Extension<Claims>,
    Path(id): Path<Uuid>,
) -> Result<Json<RoomResponse>, ApiError> {
    require_permission(&claims, permissions::ROOM_READ)?;
    let hotel_id = hotel_from_claims(&claims)?;
    let room = state.stay.get_room(RoomId::from_uuid(id)).await?;
    check_hotel_scope(hotel_id, room.hotel_id, "room")?;
    Ok(Json(room.into()))
}

/// Manual housekeeping status override
pub async fn set_room_status(
    State(state): State<AppState>,
    claims: Extension<Claims>,
    Path(id): Path<Uuid>,
    Json(request): Json<SetRoomStatusRequest>,
) -> Result<Json<RoomResponse>, ApiError> {
    require_permission(&claims, permissions::ROOM_OVERRIDE)?;
    let hotel_id = hotel_from_claims(&claims)?;
    let status: RoomStatus = parse_enum("status", &request.status)?;
    let room_id = RoomId::from_uuid(id);
    let room = state.stay.get_room(room_id).await?;
    check_hotel_scope(hotel_id, room.hotel_id, "room")?;
    let room = state.stay.set_room_status(room_id, status).await?;
    Ok(Json(room.into()))
}

/// Books a room for a client
pub async fn create_reservation(
    State(state): State<AppState>,
    claims: Extension<Claims>,
    Json(request): Json<CreateReservationRequest>,
) -> Result<(StatusCode, Json<ReservationResponse>), ApiError> {
    require_permission(&claims, permissions::RESERVATION_WRITE)?;
    let hotel_id = hotel_from_claims(&claims)?;

    let room = state
        .stay
        .get_room(RoomId::from_uuid(request.room_id))
        .await?;
    check_hotel_scope(hotel_id, room.hotel_id, "room")?;
    let client = state
        .stay
        .get_client(ClientId::from_uuid(request.client_id))
        .await?;
    check_hotel_scope(hotel_id, client.hotel_id, "client")?;

    let reservation = state
        .stay
        .create_reservation(
            hotel_id,
            ClientId::from_uuid(request.client_id),
            RoomId::from_uuid(request.room_id),
            request.check_in_date,
            request.check_out_date,
            request.acompte,
            request.notes,
        )
        .await?;
    let response = reservation_response(&state, reservation).await?;
    Ok((StatusCode::CREATED, Json(response)))
}

/// Lists reservations
pub async fn list_reservations(
    State(state): State<AppState>,
    claims: Extension<Claims>,
) -> Result<Json<Vec<ReservationResponse>>, ApiError> {
    require_permission(&claims, permissions::RESERVATION_READ)?;
    let hotel_id = hotel_from_claims(&claims)?;

    let reservations = state.stay.list_reservations(hotel_id).await?;
    let mut responses = Vec::with_capacity(reservations.len());
    for reservation in reservations {
        responses.push(reservation_response(&state, reservation).await?);
    }
    Ok(Json(responses))
}

/// Gets a reservation by ID
pub async fn get_reservation(
    State(state): State<AppState>,
    claims: Extension<Claims>,
    Path(id): Path<Uuid>,
) -> Result<Json<ReservationResponse>, ApiError> {
    require_permission(&claims, permissions::RESERVATION_READ)?;
    let reservation = scoped_reservation(&state, &claims, id).await?;
    let response = reservation_response(&state, reservation).await?;
    Ok(Json(response))
}

/// Confirms a pending reservation
pub async fn confirm_reservation(
    State(state): State<AppState>,
    claims: Extension<Claims>,
    Path(id): Path<Uuid>,
) -> Result<Json<ReservationResponse>, ApiError> {
    require_permission(&claims, permissions::RESERVATION_WRITE)?;
    let reservation = scoped_reservation(&state, &claims, id).await?;
    let reservation = state.stay.confirm_reservation(reservation.id).await?;
    let response = reservation_response(&state, reservation).await?;
    Ok(Json(response))
}

/// Checks the guest in
pub async fn check_in(
    State(state): State<AppState>,
    claims: Extension<Claims>,
    Path(id): Path<Uuid>,
) -> Result<Json<ReservationResponse>, ApiError> {
    require_permission(&claims, permissions::RESERVATION_CHECKIN)?;
    let reservation = scoped_reservation(&state, &claims, id).await?;
    let reservation = state.stay.check_in(reservation.id).await?;
    let response = reservation_response(&state, reservation).await?;
    Ok(Json(response))
}

/// Checks the guest out
pub async fn check_out(
    State(state): State<AppState>,
    claims: Extension<Claims>,
    Path(id): Path<Uuid>,
) -> Result<Json<ReservationResponse>, ApiError> {
    require_permission(&claims, permissions::RESERVATION_CHECKOUT)?;
    let reservation = scoped_reservation(&state, &claims, id).await?;
    let reservation = state.stay.check_out(reservation.id).await?;
    let response = reservation_response(&state, reservation).await?;
    Ok(Json(response))
}

/// Cancels a reservation
pub async fn cancel_reservation(
    State(state): State<AppState>,
    claims: Extension<Claims>,
    Path(id): Path<Uuid>,
) -> Result<Json<ReservationResponse>, ApiError> {
    require_permission(&claims, permissions::RESERVATION_CANCEL)?;
    let reservation = scoped_reservation(&state, &claims, id).await?;
    let reservation = state.stay.cancel_reservation(reservation.id).await?;
    let response = reservation_response(&state, reservation).await?;
    Ok(Json(response))
}

/// Marks a guest who never arrived
pub async fn mark_no_show(
    State(state): State<AppState>,
    claims: Extension<Claims>,
    Path(id): Path<Uuid>,
) -> Result<Json<ReservationResponse>, ApiError> {
    require_permission(&claims, permissions::RESERVATION_CANCEL)?;
    let reservation = scoped_reservation(&state, &claims, id).await?;
    let reservation = state.stay.mark_no_show(reservation.id).await?;
    let response = reservation_response(&state, reservation).await?;
    Ok(Json(response))
}

/// Deletes a reservation that never accrued billing history
pub async fn delete_reservation(
    State(state): State<AppState>,
    claims: Extension<Claims>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    require_permission(&claims, permissions::RESERVATION_WRITE)?;
    let reservation = scoped_reservation(&state, &claims, id).await?;
    state.stay.delete_reservation(reservation.id).await?;
    Ok(StatusCode::NO_CONTENT)
}
