use crate::booking::model::{Booking, BookingStatus};
use crate::error::AppResult;
use crate::item::model::{Comment, Item, NewItem};
use crate::request::model::ItemRequest;
use crate::user::model::{NewUser, User};
use async_trait::async_trait;
use chrono::{DateTime, Utc};

pub mod memory;
pub mod postgres;
pub mod queries;

// region:    --- Records

/// 예약 저장 레코드. 기간/가용성 검증을 통과한 뒤에만 만들어진다.
#[derive(Debug, Clone, Copy)]
pub struct NewBookingRecord {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub item_id: i64,
    pub booker_id: i64,
    pub status: BookingStatus,
}

/// 댓글 저장 레코드. 작성 시각은 서비스의 시계에서 받는다.
#[derive(Debug, Clone)]
pub struct NewCommentRecord {
    pub text: String,
    pub item_id: i64,
    pub author_id: i64,
    pub created: DateTime<Utc>,
}

// endregion: --- Records

// region:    --- Repository Traits

/// 사용자 저장소
#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn create(&self, new: NewUser) -> AppResult<User>;
    async fn update(&self, user: User) -> AppResult<User>;
    async fn find_by_id(&self, id: i64) -> AppResult<Option<User>>;
    async fn find_by_email(&self, email: &str) -> AppResult<Option<User>>;
    /// 없는 id여도 오류 없이 끝난다
    async fn delete(&self, id: i64) -> AppResult<()>;
}

/// 물품 저장소
#[async_trait]
pub trait ItemRepository: Send + Sync {
    async fn create(&self, owner_id: i64, new: NewItem) -> AppResult<Item>;
    async fn update(&self, item: Item) -> AppResult<Item>;
    async fn find_by_id(&self, id: i64) -> AppResult<Option<Item>>;
    async fn find_by_owner(&self, owner_id: i64) -> AppResult<Vec<Item>>;
    /// 가용 물품의 이름/설명 부분 일치 검색(대소문자 무시)
    async fn search(&self, text: &str) -> AppResult<Vec<Item>>;
    async fn find_by_request(&self, request_id: i64) -> AppResult<Vec<Item>>;
    async fn find_by_requests(&self, request_ids: Vec<i64>) -> AppResult<Vec<Item>>;
}

/// 예약 저장소. 목록은 시작 시각 내림차순, 동률이면 id 오름차순이다.
#[async_trait]
pub trait BookingRepository: Send + Sync {
    /// 물품 가용성 재확인과 한 단위로 저장한다. 가용하지 않으면 BadRequest.
    async fn create(&self, new: NewBookingRecord) -> AppResult<Booking>;
    async fn update_status(&self, id: i64, status: BookingStatus) -> AppResult<Booking>;
    async fn find_by_id(&self, id: i64) -> AppResult<Option<Booking>>;
    async fn find_by_booker(&self, booker_id: i64) -> AppResult<Vec<Booking>>;
    async fn find_by_booker_and_status(
        &self,
        booker_id: i64,
        status: BookingStatus,
    ) -> AppResult<Vec<Booking>>;
    async fn find_by_booker_end_before(
        &self,
        booker_id: i64,
        moment: DateTime<Utc>,
    ) -> AppResult<Vec<Booking>>;
    async fn find_by_booker_start_after(
        &self,
        booker_id: i64,
        moment: DateTime<Utc>,
    ) -> AppResult<Vec<Booking>>;
    async fn find_by_owner(&self, owner_id: i64) -> AppResult<Vec<Booking>>;
    async fn find_by_owner_and_status(
        &self,
        owner_id: i64,
        status: BookingStatus,
    ) -> AppResult<Vec<Booking>>;
    async fn find_by_owner_end_before(
        &self,
        owner_id: i64,
        moment: DateTime<Utc>,
    ) -> AppResult<Vec<Booking>>;
    async fn find_by_owner_start_after(
        &self,
        owner_id: i64,
        moment: DateTime<Utc>,
    ) -> AppResult<Vec<Booking>>;
    async fn find_by_item(&self, item_id: i64) -> AppResult<Vec<Booking>>;
    /// 댓글 자격 판정용: 주어진 상태로 이미 끝난 예약만 고른다
    async fn find_by_booker_and_item(
        &self,
        booker_id: i64,
        item_id: i64,
        status: BookingStatus,
        end_before: DateTime<Utc>,
    ) -> AppResult<Vec<Booking>>;
}

/// 댓글 저장소. 목록은 작성 시각 오름차순이다.
#[async_trait]
pub trait CommentRepository: Send + Sync {
    async fn create(&self, new: NewCommentRecord) -> AppResult<Comment>;
    async fn find_by_item(&self, item_id: i64) -> AppResult<Vec<Comment>>;
}

/// 공유 요청 저장소. 목록은 등록 시각 내림차순이다.
#[async_trait]
pub trait RequestRepository: Send + Sync {
    async fn create(
        &self,
        requestor_id: i64,
        description: String,
        created: DateTime<Utc>,
    ) -> AppResult<ItemRequest>;
    async fn find_by_id(&self, id: i64) -> AppResult<Option<ItemRequest>>;
    async fn find_by_requestor(&self, requestor_id: i64) -> AppResult<Vec<ItemRequest>>;
    async fn find_by_other_requestors(&self, requestor_id: i64) -> AppResult<Vec<ItemRequest>>;
}

// endregion: --- Repository Traits
