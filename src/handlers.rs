// region:    --- Imports
use crate::booking::model::{Booking, BookingState, NewBooking};
use crate::booking::service::BookingService;
use crate::error::{AppError, AppResult};
use crate::item::model::{Comment, Item, ItemPatch, ItemView, NewComment, NewItem};
use crate::item::service::ItemService;
use crate::request::model::{NewRequest, RequestView};
use crate::request::service::RequestService;
use crate::user::model::{NewUser, User, UserPatch};
use crate::user::service::UserService;
use axum::async_trait;
use axum::extract::{FromRequestParts, Path, Query, State};
use axum::http::request::Parts;
use axum::routing::{get, patch, post};
use axum::{Json, Router};
use serde::Deserialize;
use std::sync::Arc;
use tracing::info;

// endregion: --- Imports

// region:    --- App State

/// 서비스 묶음
#[derive(Clone)]
pub struct AppState {
    pub users: Arc<UserService>,
    pub items: Arc<ItemService>,
    pub bookings: Arc<BookingService>,
    pub requests: Arc<RequestService>,
}

/// 라우터 설정
pub fn app(state: AppState) -> Router {
    Router::new()
        .route("/users", post(create_user))
        .route(
            "/users/:id",
            get(get_user).patch(update_user).delete(delete_user),
        )
        .route("/items", post(create_item).get(get_items))
        .route("/items/search", get(search_items))
        .route("/items/:id", patch(update_item).get(get_item))
        .route("/items/:id/comment", post(add_comment))
        .route("/bookings", post(create_booking).get(get_bookings))
        .route("/bookings/owner", get(get_bookings_by_owner))
        .route("/bookings/:id", patch(approve_booking).get(get_booking))
        .route("/requests", post(create_request).get(get_requests))
        .route("/requests/all", get(get_all_requests))
        .route("/requests/:id", get(get_request))
        .with_state(state)
}

// endregion: --- App State

// region:    --- Sharer Header

pub const USER_ID_HEADER: &str = "X-Sharer-User-Id";

/// X-Sharer-User-Id 헤더로 실려 오는 행위자 id
pub struct SharerId(pub i64);

#[async_trait]
impl<S> FromRequestParts<S> for SharerId
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let value = parts
            .headers
            .get(USER_ID_HEADER)
            .ok_or_else(|| AppError::BadRequest(format!("Missing {USER_ID_HEADER} header")))?;
        value
            .to_str()
            .ok()
            .and_then(|raw| raw.trim().parse::<i64>().ok())
            .map(SharerId)
            .ok_or_else(|| AppError::BadRequest(format!("Invalid {USER_ID_HEADER} header")))
    }
}

// endregion: --- Sharer Header

// region:    --- Query Params

#[derive(Debug, Deserialize)]
struct StateQuery {
    state: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ApproveQuery {
    approved: bool,
}

#[derive(Debug, Deserialize)]
struct SearchQuery {
    text: String,
}

// endregion: --- Query Params

// region:    --- User Handlers

/// 사용자 등록
async fn create_user(
    State(state): State<AppState>,
    Json(new): Json<NewUser>,
) -> AppResult<Json<User>> {
    info!("{:<12} --> 사용자 등록 요청: {:?}", "Command", new);
    Ok(Json(state.users.create_user(new).await?))
}

/// 사용자 조회
async fn get_user(State(state): State<AppState>, Path(id): Path<i64>) -> AppResult<Json<User>> {
    info!("{:<12} --> 사용자 조회 요청 id: {}", "HandlerQuery", id);
    Ok(Json(state.users.get_user(id).await?))
}

/// 사용자 수정
async fn update_user(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(patch): Json<UserPatch>,
) -> AppResult<Json<User>> {
    info!(
        "{:<12} --> 사용자 수정 요청 id: {}, {:?}",
        "Command", id, patch
    );
    Ok(Json(state.users.update_user(id, patch).await?))
}

/// 사용자 삭제
async fn delete_user(State(state): State<AppState>, Path(id): Path<i64>) -> AppResult<()> {
    info!("{:<12} --> 사용자 삭제 요청 id: {}", "Command", id);
    state.users.delete_user(id).await
}

// endregion: --- User Handlers

// region:    --- Item Handlers

/// 물품 등록
async fn create_item(
    State(state): State<AppState>,
    SharerId(user_id): SharerId,
    Json(new): Json<NewItem>,
) -> AppResult<Json<Item>> {
    info!(
        "{:<12} --> 물품 등록 요청: user {}, {:?}",
        "Command", user_id, new
    );
    Ok(Json(state.items.create_item(user_id, new).await?))
}

/// 물품 수정
async fn update_item(
    State(state): State<AppState>,
    SharerId(user_id): SharerId,
    Path(id): Path<i64>,
    Json(patch): Json<ItemPatch>,
) -> AppResult<Json<Item>> {
    info!(
        "{:<12} --> 물품 수정 요청 id: {}, {:?}",
        "Command", id, patch
    );
    Ok(Json(state.items.update_item(user_id, id, patch).await?))
}

/// 물품 조회. 헤더는 있어도 되고 없어도 된다.
async fn get_item(
    State(state): State<AppState>,
    viewer: Option<SharerId>,
    Path(id): Path<i64>,
) -> AppResult<Json<ItemView>> {
    info!("{:<12} --> 물품 조회 요청 id: {}", "HandlerQuery", id);
    Ok(Json(state.items.get_item(id, viewer.map(|s| s.0)).await?))
}

/// 소유자의 물품 목록 조회
async fn get_items(
    State(state): State<AppState>,
    SharerId(user_id): SharerId,
) -> AppResult<Json<Vec<ItemView>>> {
    info!("{:<12} --> 물품 목록 요청: user {}", "HandlerQuery", user_id);
    Ok(Json(state.items.get_items(user_id).await?))
}

/// 물품 검색
async fn search_items(
    State(state): State<AppState>,
    Query(query): Query<SearchQuery>,
) -> AppResult<Json<Vec<Item>>> {
    info!("{:<12} --> 물품 검색 요청: {:?}", "HandlerQuery", query.text);
    Ok(Json(state.items.search_items(&query.text).await?))
}

/// 댓글 작성
async fn add_comment(
    State(state): State<AppState>,
    SharerId(user_id): SharerId,
    Path(id): Path<i64>,
    Json(new): Json<NewComment>,
) -> AppResult<Json<Comment>> {
    info!(
        "{:<12} --> 댓글 작성 요청: item {}, user {}",
        "Command", id, user_id
    );
    Ok(Json(state.items.add_comment(user_id, id, new).await?))
}

// endregion: --- Item Handlers

// region:    --- Booking Handlers

/// 예약 생성
async fn create_booking(
    State(state): State<AppState>,
    SharerId(user_id): SharerId,
    Json(new): Json<NewBooking>,
) -> AppResult<Json<Booking>> {
    info!(
        "{:<12} --> 예약 생성 요청: user {}, {:?}",
        "Command", user_id, new
    );
    Ok(Json(state.bookings.create_booking(user_id, new).await?))
}

/// 예약 승인/거절
async fn approve_booking(
    State(state): State<AppState>,
    SharerId(user_id): SharerId,
    Path(id): Path<i64>,
    Query(query): Query<ApproveQuery>,
) -> AppResult<Json<Booking>> {
    info!(
        "{:<12} --> 예약 결정 요청: booking {}, approved {}",
        "Command", id, query.approved
    );
    Ok(Json(
        state
            .bookings
            .approve_booking(user_id, id, query.approved)
            .await?,
    ))
}

/// 예약 조회
async fn get_booking(
    State(state): State<AppState>,
    SharerId(user_id): SharerId,
    Path(id): Path<i64>,
) -> AppResult<Json<Booking>> {
    info!("{:<12} --> 예약 조회 요청 id: {}", "HandlerQuery", id);
    Ok(Json(state.bookings.get_booking(user_id, id).await?))
}

/// 예약자 기준 예약 목록
async fn get_bookings(
    State(state): State<AppState>,
    SharerId(user_id): SharerId,
    Query(query): Query<StateQuery>,
) -> AppResult<Json<Vec<Booking>>> {
    info!(
        "{:<12} --> 예약 목록 요청: user {}, state {:?}",
        "HandlerQuery", user_id, query.state
    );
    let state_filter = BookingState::parse(query.state.as_deref())?;
    Ok(Json(
        state.bookings.list_for_booker(user_id, state_filter).await?,
    ))
}

/// 소유자 기준 예약 목록
async fn get_bookings_by_owner(
    State(state): State<AppState>,
    SharerId(user_id): SharerId,
    Query(query): Query<StateQuery>,
) -> AppResult<Json<Vec<Booking>>> {
    info!(
        "{:<12} --> 소유자 예약 목록 요청: user {}, state {:?}",
        "HandlerQuery", user_id, query.state
    );
    let state_filter = BookingState::parse(query.state.as_deref())?;
    Ok(Json(
        state.bookings.list_for_owner(user_id, state_filter).await?,
    ))
}

// endregion: --- Booking Handlers

// region:    --- Request Handlers

/// 공유 요청 등록
async fn create_request(
    State(state): State<AppState>,
    SharerId(user_id): SharerId,
    Json(new): Json<NewRequest>,
) -> AppResult<Json<RequestView>> {
    info!("{:<12} --> 요청 등록: user {}, {:?}", "Command", user_id, new);
    Ok(Json(state.requests.create_request(user_id, new).await?))
}

/// 본인 공유 요청 목록
async fn get_requests(
    State(state): State<AppState>,
    SharerId(user_id): SharerId,
) -> AppResult<Json<Vec<RequestView>>> {
    info!("{:<12} --> 본인 요청 목록: user {}", "HandlerQuery", user_id);
    Ok(Json(state.requests.get_requests(user_id).await?))
}

/// 다른 사용자들의 공유 요청 목록
async fn get_all_requests(
    State(state): State<AppState>,
    SharerId(user_id): SharerId,
) -> AppResult<Json<Vec<RequestView>>> {
    info!("{:<12} --> 전체 요청 목록: user {}", "HandlerQuery", user_id);
    Ok(Json(state.requests.get_all_requests(user_id).await?))
}

/// 공유 요청 단건 조회. 누구나 볼 수 있다.
async fn get_request(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> AppResult<Json<RequestView>> {
    info!("{:<12} --> 요청 조회 id: {}", "HandlerQuery", id);
    Ok(Json(state.requests.get_request(id).await?))
}

// endregion: --- Request Handlers
