use crate::booking::model::{Booking, BookingStatus};
use crate::database::DatabaseManager;
use crate::error::{AppError, AppResult};
use crate::item::model::{Comment, Item, NewItem};
use crate::request::model::ItemRequest;
use crate::user::model::{NewUser, User};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::sync::Arc;

use super::{
    queries, BookingRepository, CommentRepository, ItemRepository, NewBookingRecord,
    NewCommentRecord, RequestRepository, UserRepository,
};

// region:    --- Booking Row

/// 예약 조인 결과의 평면 행. 도메인 모델로 조립해서 내보낸다.
#[derive(sqlx::FromRow)]
struct BookingRow {
    id: i64,
    start_date: DateTime<Utc>,
    end_date: DateTime<Utc>,
    status: String,
    item_id: i64,
    item_name: String,
    item_description: String,
    item_available: bool,
    item_owner_id: i64,
    item_request_id: Option<i64>,
    booker_id: i64,
    booker_email: String,
    booker_name: String,
}

impl TryFrom<BookingRow> for Booking {
    type Error = AppError;

    fn try_from(row: BookingRow) -> Result<Self, Self::Error> {
        let status = BookingStatus::parse(&row.status)
            .ok_or_else(|| AppError::Internal(format!("unknown booking status: {}", row.status)))?;
        Ok(Booking {
            id: row.id,
            start: row.start_date,
            end: row.end_date,
            item: Item {
                id: row.item_id,
                name: row.item_name,
                description: row.item_description,
                available: row.item_available,
                owner_id: row.item_owner_id,
                request_id: row.item_request_id,
            },
            booker: User {
                id: row.booker_id,
                email: row.booker_email,
                name: row.booker_name,
            },
            status,
        })
    }
}

// endregion: --- Booking Row

// region:    --- User Repository

/// unique 제약 위반을 이메일 충돌로 바꾼다
fn map_unique_email(e: sqlx::Error, email: &str) -> AppError {
    match e.as_database_error() {
        Some(db) if db.is_unique_violation() => {
            AppError::Conflict(format!("User with email {email} already exists"))
        }
        _ => AppError::Database(e),
    }
}

pub struct PgUserRepository {
    db: Arc<DatabaseManager>,
}

impl PgUserRepository {
    pub fn new(db: Arc<DatabaseManager>) -> Self {
        Self { db }
    }
}

#[async_trait]
impl UserRepository for PgUserRepository {
    async fn create(&self, new: NewUser) -> AppResult<User> {
        self.db
            .transaction(|tx| {
                Box::pin(async move {
                    let user = sqlx::query_as::<_, User>(queries::INSERT_USER)
                        .bind(&new.email)
                        .bind(&new.name)
                        .fetch_one(&mut **tx)
                        .await
                        .map_err(|e| map_unique_email(e, &new.email))?;
                    Ok(user)
                })
            })
            .await
    }

    async fn update(&self, user: User) -> AppResult<User> {
        self.db
            .transaction(|tx| {
                Box::pin(async move {
                    let user = sqlx::query_as::<_, User>(queries::UPDATE_USER)
                        .bind(user.id)
                        .bind(&user.email)
                        .bind(&user.name)
                        .fetch_one(&mut **tx)
                        .await
                        .map_err(|e| map_unique_email(e, &user.email))?;
                    Ok(user)
                })
            })
            .await
    }

    async fn find_by_id(&self, id: i64) -> AppResult<Option<User>> {
        self.db
            .transaction(|tx| {
                Box::pin(async move {
                    let user = sqlx::query_as::<_, User>(queries::GET_USER)
                        .bind(id)
                        .fetch_optional(&mut **tx)
                        .await?;
                    Ok(user)
                })
            })
            .await
    }

    async fn find_by_email(&self, email: &str) -> AppResult<Option<User>> {
        let email = email.to_owned();
        self.db
            .transaction(|tx| {
                Box::pin(async move {
                    let user = sqlx::query_as::<_, User>(queries::GET_USER_BY_EMAIL)
                        .bind(&email)
                        .fetch_optional(&mut **tx)
                        .await?;
                    Ok(user)
                })
            })
            .await
    }

    async fn delete(&self, id: i64) -> AppResult<()> {
        self.db
            .transaction(|tx| {
                Box::pin(async move {
                    sqlx::query(queries::DELETE_USER)
                        .bind(id)
                        .execute(&mut **tx)
                        .await?;
                    Ok(())
                })
            })
            .await
    }
}

// endregion: --- User Repository

// region:    --- Item Repository

pub struct PgItemRepository {
    db: Arc<DatabaseManager>,
}

impl PgItemRepository {
    pub fn new(db: Arc<DatabaseManager>) -> Self {
        Self { db }
    }
}

#[async_trait]
impl ItemRepository for PgItemRepository {
    async fn create(&self, owner_id: i64, new: NewItem) -> AppResult<Item> {
        self.db
            .transaction(|tx| {
                Box::pin(async move {
                    let item = sqlx::query_as::<_, Item>(queries::INSERT_ITEM)
                        .bind(&new.name)
                        .bind(&new.description)
                        .bind(new.available)
                        .bind(owner_id)
                        .bind(new.request_id)
                        .fetch_one(&mut **tx)
                        .await?;
                    Ok(item)
                })
            })
            .await
    }

    async fn update(&self, item: Item) -> AppResult<Item> {
        self.db
            .transaction(|tx| {
                Box::pin(async move {
                    let item = sqlx::query_as::<_, Item>(queries::UPDATE_ITEM)
                        .bind(item.id)
                        .bind(&item.name)
                        .bind(&item.description)
                        .bind(item.available)
                        .fetch_one(&mut **tx)
                        .await?;
                    Ok(item)
                })
            })
            .await
    }

    async fn find_by_id(&self, id: i64) -> AppResult<Option<Item>> {
        self.db
            .transaction(|tx| {
                Box::pin(async move {
                    let item = sqlx::query_as::<_, Item>(queries::GET_ITEM)
                        .bind(id)
                        .fetch_optional(&mut **tx)
                        .await?;
                    Ok(item)
                })
            })
            .await
    }

    async fn find_by_owner(&self, owner_id: i64) -> AppResult<Vec<Item>> {
        self.db
            .transaction(|tx| {
                Box::pin(async move {
                    let items = sqlx::query_as::<_, Item>(queries::GET_ITEMS_BY_OWNER)
                        .bind(owner_id)
                        .fetch_all(&mut **tx)
                        .await?;
                    Ok(items)
                })
            })
            .await
    }

    async fn search(&self, text: &str) -> AppResult<Vec<Item>> {
        let text = text.to_owned();
        self.db
            .transaction(|tx| {
                Box::pin(async move {
                    let items = sqlx::query_as::<_, Item>(queries::SEARCH_ITEMS)
                        .bind(&text)
                        .fetch_all(&mut **tx)
                        .await?;
                    Ok(items)
                })
            })
            .await
    }

    async fn find_by_request(&self, request_id: i64) -> AppResult<Vec<Item>> {
        self.db
            .transaction(|tx| {
                Box::pin(async move {
                    let items = sqlx::query_as::<_, Item>(queries::GET_ITEMS_BY_REQUEST)
                        .bind(request_id)
                        .fetch_all(&mut **tx)
                        .await?;
                    Ok(items)
                })
            })
            .await
    }

    async fn find_by_requests(&self, request_ids: Vec<i64>) -> AppResult<Vec<Item>> {
        self.db
            .transaction(|tx| {
                Box::pin(async move {
                    let items = sqlx::query_as::<_, Item>(queries::GET_ITEMS_BY_REQUESTS)
                        .bind(&request_ids)
                        .fetch_all(&mut **tx)
                        .await?;
                    Ok(items)
                })
            })
            .await
    }
}

// endregion: --- Item Repository

// region:    --- Booking Repository

pub struct PgBookingRepository {
    db: Arc<DatabaseManager>,
}

impl PgBookingRepository {
    pub fn new(db: Arc<DatabaseManager>) -> Self {
        Self { db }
    }

    /// 조인 행 목록 조회 공통 경로
    async fn fetch_bookings(&self, query: &'static str, id: i64) -> AppResult<Vec<Booking>> {
        self.db
            .transaction(|tx| {
                Box::pin(async move {
                    let rows = sqlx::query_as::<_, BookingRow>(query)
                        .bind(id)
                        .fetch_all(&mut **tx)
                        .await?;
                    rows.into_iter().map(Booking::try_from).collect()
                })
            })
            .await
    }

    async fn fetch_bookings_with_status(
        &self,
        query: &'static str,
        id: i64,
        status: BookingStatus,
    ) -> AppResult<Vec<Booking>> {
        self.db
            .transaction(|tx| {
                Box::pin(async move {
                    let rows = sqlx::query_as::<_, BookingRow>(query)
                        .bind(id)
                        .bind(status.as_str())
                        .fetch_all(&mut **tx)
                        .await?;
                    rows.into_iter().map(Booking::try_from).collect()
                })
            })
            .await
    }

    async fn fetch_bookings_with_moment(
        &self,
        query: &'static str,
        id: i64,
        moment: DateTime<Utc>,
    ) -> AppResult<Vec<Booking>> {
        self.db
            .transaction(|tx| {
                Box::pin(async move {
                    let rows = sqlx::query_as::<_, BookingRow>(query)
                        .bind(id)
                        .bind(moment)
                        .fetch_all(&mut **tx)
                        .await?;
                    rows.into_iter().map(Booking::try_from).collect()
                })
            })
            .await
    }
}

#[async_trait]
impl BookingRepository for PgBookingRepository {
    async fn create(&self, new: NewBookingRecord) -> AppResult<Booking> {
        self.db
            .transaction(|tx| {
                Box::pin(async move {
                    // 가용성 재확인을 통과하지 못하면 아무 행도 돌아오지 않는다
                    let id = sqlx::query_scalar::<_, i64>(queries::INSERT_BOOKING)
                        .bind(new.start)
                        .bind(new.end)
                        .bind(new.item_id)
                        .bind(new.booker_id)
                        .bind(new.status.as_str())
                        .fetch_optional(&mut **tx)
                        .await?
                        .ok_or_else(|| {
                            AppError::BadRequest("Item is not available".to_string())
                        })?;
                    let row = sqlx::query_as::<_, BookingRow>(queries::GET_BOOKING)
                        .bind(id)
                        .fetch_one(&mut **tx)
                        .await?;
                    Booking::try_from(row)
                })
            })
            .await
    }

    async fn update_status(&self, id: i64, status: BookingStatus) -> AppResult<Booking> {
        self.db
            .transaction(|tx| {
                Box::pin(async move {
                    sqlx::query(queries::UPDATE_BOOKING_STATUS)
                        .bind(id)
                        .bind(status.as_str())
                        .execute(&mut **tx)
                        .await?;
                    let row = sqlx::query_as::<_, BookingRow>(queries::GET_BOOKING)
                        .bind(id)
                        .fetch_one(&mut **tx)
                        .await?;
                    Booking::try_from(row)
                })
            })
            .await
    }

    async fn find_by_id(&self, id: i64) -> AppResult<Option<Booking>> {
        self.db
            .transaction(|tx| {
                Box::pin(async move {
                    let row = sqlx::query_as::<_, BookingRow>(queries::GET_BOOKING)
                        .bind(id)
                        .fetch_optional(&mut **tx)
                        .await?;
                    row.map(Booking::try_from).transpose()
                })
            })
            .await
    }

    async fn find_by_booker(&self, booker_id: i64) -> AppResult<Vec<Booking>> {
        self.fetch_bookings(queries::BOOKINGS_BY_BOOKER, booker_id)
            .await
    }

    async fn find_by_booker_and_status(
        &self,
        booker_id: i64,
        status: BookingStatus,
    ) -> AppResult<Vec<Booking>> {
        self.fetch_bookings_with_status(queries::BOOKINGS_BY_BOOKER_AND_STATUS, booker_id, status)
            .await
    }

    async fn find_by_booker_end_before(
        &self,
        booker_id: i64,
        moment: DateTime<Utc>,
    ) -> AppResult<Vec<Booking>> {
        self.fetch_bookings_with_moment(queries::BOOKINGS_BY_BOOKER_END_BEFORE, booker_id, moment)
            .await
    }

    async fn find_by_booker_start_after(
        &self,
        booker_id: i64,
        moment: DateTime<Utc>,
    ) -> AppResult<Vec<Booking>> {
        self.fetch_bookings_with_moment(queries::BOOKINGS_BY_BOOKER_START_AFTER, booker_id, moment)
            .await
    }

    async fn find_by_owner(&self, owner_id: i64) -> AppResult<Vec<Booking>> {
        self.fetch_bookings(queries::BOOKINGS_BY_OWNER, owner_id).await
    }

    async fn find_by_owner_and_status(
        &self,
        owner_id: i64,
        status: BookingStatus,
    ) -> AppResult<Vec<Booking>> {
        self.fetch_bookings_with_status(queries::BOOKINGS_BY_OWNER_AND_STATUS, owner_id, status)
            .await
    }

    async fn find_by_owner_end_before(
        &self,
        owner_id: i64,
        moment: DateTime<Utc>,
    ) -> AppResult<Vec<Booking>> {
        self.fetch_bookings_with_moment(queries::BOOKINGS_BY_OWNER_END_BEFORE, owner_id, moment)
            .await
    }

    async fn find_by_owner_start_after(
        &self,
        owner_id: i64,
        moment: DateTime<Utc>,
    ) -> AppResult<Vec<Booking>> {
        self.fetch_bookings_with_moment(queries::BOOKINGS_BY_OWNER_START_AFTER, owner_id, moment)
            .await
    }

    async fn find_by_item(&self, item_id: i64) -> AppResult<Vec<Booking>> {
        self.fetch_bookings(queries::BOOKINGS_BY_ITEM, item_id).await
    }

    async fn find_by_booker_and_item(
        &self,
        booker_id: i64,
        item_id: i64,
        status: BookingStatus,
        end_before: DateTime<Utc>,
    ) -> AppResult<Vec<Booking>> {
        self.db
            .transaction(|tx| {
                Box::pin(async move {
                    let rows =
                        sqlx::query_as::<_, BookingRow>(queries::BOOKINGS_BY_BOOKER_AND_ITEM)
                            .bind(booker_id)
                            .bind(item_id)
                            .bind(status.as_str())
                            .bind(end_before)
                            .fetch_all(&mut **tx)
                            .await?;
                    rows.into_iter().map(Booking::try_from).collect()
                })
            })
            .await
    }
}

// endregion: --- Booking Repository

// region:    --- Comment Repository

pub struct PgCommentRepository {
    db: Arc<DatabaseManager>,
}

impl PgCommentRepository {
    pub fn new(db: Arc<DatabaseManager>) -> Self {
        Self { db }
    }
}

#[async_trait]
impl CommentRepository for PgCommentRepository {
    async fn create(&self, new: NewCommentRecord) -> AppResult<Comment> {
        self.db
            .transaction(|tx| {
                Box::pin(async move {
                    let id = sqlx::query_scalar::<_, i64>(queries::INSERT_COMMENT)
                        .bind(&new.text)
                        .bind(new.item_id)
                        .bind(new.author_id)
                        .bind(new.created)
                        .fetch_one(&mut **tx)
                        .await?;
                    let comment = sqlx::query_as::<_, Comment>(queries::GET_COMMENT)
                        .bind(id)
                        .fetch_one(&mut **tx)
                        .await?;
                    Ok(comment)
                })
            })
            .await
    }

    async fn find_by_item(&self, item_id: i64) -> AppResult<Vec<Comment>> {
        self.db
            .transaction(|tx| {
                Box::pin(async move {
                    let comments = sqlx::query_as::<_, Comment>(queries::COMMENTS_BY_ITEM)
                        .bind(item_id)
                        .fetch_all(&mut **tx)
                        .await?;
                    Ok(comments)
                })
            })
            .await
    }
}

// endregion: --- Comment Repository

// region:    --- Request Repository

pub struct PgRequestRepository {
    db: Arc<DatabaseManager>,
}

impl PgRequestRepository {
    pub fn new(db: Arc<DatabaseManager>) -> Self {
        Self { db }
    }
}

#[async_trait]
impl RequestRepository for PgRequestRepository {
    async fn create(
        &self,
        requestor_id: i64,
        description: String,
        created: DateTime<Utc>,
    ) -> AppResult<ItemRequest> {
        self.db
            .transaction(|tx| {
                Box::pin(async move {
                    let request = sqlx::query_as::<_, ItemRequest>(queries::INSERT_REQUEST)
                        .bind(&description)
                        .bind(requestor_id)
                        .bind(created)
                        .fetch_one(&mut **tx)
                        .await?;
                    Ok(request)
                })
            })
            .await
    }

    async fn find_by_id(&self, id: i64) -> AppResult<Option<ItemRequest>> {
        self.db
            .transaction(|tx| {
                Box::pin(async move {
                    let request = sqlx::query_as::<_, ItemRequest>(queries::GET_REQUEST)
                        .bind(id)
                        .fetch_optional(&mut **tx)
                        .await?;
                    Ok(request)
                })
            })
            .await
    }

    async fn find_by_requestor(&self, requestor_id: i64) -> AppResult<Vec<ItemRequest>> {
        self.db
            .transaction(|tx| {
                Box::pin(async move {
                    let requests = sqlx::query_as::<_, ItemRequest>(queries::REQUESTS_BY_REQUESTOR)
                        .bind(requestor_id)
                        .fetch_all(&mut **tx)
                        .await?;
                    Ok(requests)
                })
            })
            .await
    }

    async fn find_by_other_requestors(&self, requestor_id: i64) -> AppResult<Vec<ItemRequest>> {
        self.db
            .transaction(|tx| {
                Box::pin(async move {
                    let requests = sqlx::query_as::<_, ItemRequest>(queries::REQUESTS_BY_OTHERS)
                        .bind(requestor_id)
                        .fetch_all(&mut **tx)
                        .await?;
                    Ok(requests)
                })
            })
            .await
    }
}

// endregion: --- Request Repository
