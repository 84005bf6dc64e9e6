use crate::booking::model::{Booking, BookingStatus};
use crate::booking::service::{find_last, find_next};
use crate::clock::Clock;
use crate::error::{AppError, AppResult};
use crate::repository::{
    BookingRepository, CommentRepository, ItemRepository, NewCommentRecord, RequestRepository,
    UserRepository,
};
use crate::user::model::User;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::info;

use super::model::{Comment, Item, ItemPatch, ItemView, NewComment, NewItem};

// region:    --- Item Service

/// 물품 목록 관리와 댓글 처리
pub struct ItemService {
    items: Arc<dyn ItemRepository>,
    users: Arc<dyn UserRepository>,
    bookings: Arc<dyn BookingRepository>,
    comments: Arc<dyn CommentRepository>,
    requests: Arc<dyn RequestRepository>,
    clock: Arc<dyn Clock>,
}

impl ItemService {
    pub fn new(
        items: Arc<dyn ItemRepository>,
        users: Arc<dyn UserRepository>,
        bookings: Arc<dyn BookingRepository>,
        comments: Arc<dyn CommentRepository>,
        requests: Arc<dyn RequestRepository>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            items,
            users,
            bookings,
            comments,
            requests,
            clock,
        }
    }

    /// 물품 등록. 공유 요청에 응답하는 등록이면 요청도 존재해야 한다.
    pub async fn create_item(&self, owner_id: i64, new: NewItem) -> AppResult<Item> {
        info!("{:<12} --> 물품 등록: user {}, {}", "Command", owner_id, new.name);
        self.resolve_user(owner_id).await?;
        if let Some(request_id) = new.request_id {
            self.requests
                .find_by_id(request_id)
                .await?
                .ok_or_else(|| {
                    AppError::NotFound(format!("Request with id:{request_id} not found"))
                })?;
        }
        self.items.create(owner_id, new).await
    }

    /// 물품 부분 수정. 소유자만 고칠 수 있다.
    pub async fn update_item(
        &self,
        user_id: i64,
        item_id: i64,
        patch: ItemPatch,
    ) -> AppResult<Item> {
        info!("{:<12} --> 물품 수정 id: {}, user {}", "Command", item_id, user_id);
        let mut item = self.resolve_item(item_id).await?;
        if item.owner_id != user_id {
            return Err(AppError::NotFound("You do not own this item".to_string()));
        }
        if let Some(name) = patch.name {
            // 이름 검사는 저장돼 있는 값을 본다
            if item.name.is_empty() {
                return Err(AppError::BadRequest("Name cannot be empty".to_string()));
            }
            item.name = name;
        }
        if let Some(description) = patch.description {
            if description.is_empty() {
                return Err(AppError::BadRequest(
                    "Description cannot be empty".to_string(),
                ));
            }
            item.description = description;
        }
        if let Some(available) = patch.available {
            item.available = available;
        }
        self.items.update(item).await
    }

    /// 물품 단건 조회. 마지막/다음 예약은 소유자 눈에만 보인다.
    pub async fn get_item(&self, item_id: i64, viewer: Option<i64>) -> AppResult<ItemView> {
        info!("{:<12} --> 물품 조회 id: {}", "Query", item_id);
        let item = self.resolve_item(item_id).await?;
        let (last, next) = if viewer == Some(item.owner_id) {
            let bookings = self.bookings.find_by_item(item.id).await?;
            let now = self.clock.now();
            (find_last(&bookings, now), find_next(&bookings, now))
        } else {
            (None, None)
        };
        let comments = self.comments.find_by_item(item.id).await?;
        Ok(ItemView::new(item, last, next, comments))
    }

    /// 소유자의 물품 목록. 예약 장식은 물품별로 묶어서 한 번에 계산한다.
    pub async fn get_items(&self, owner_id: i64) -> AppResult<Vec<ItemView>> {
        info!("{:<12} --> 물품 목록: user {}", "Query", owner_id);
        self.resolve_user(owner_id).await?;
        let mut by_item: HashMap<i64, Vec<Booking>> = HashMap::new();
        for booking in self.bookings.find_by_owner(owner_id).await? {
            by_item.entry(booking.item.id).or_default().push(booking);
        }
        let now = self.clock.now();
        let mut views = Vec::new();
        for item in self.items.find_by_owner(owner_id).await? {
            let bookings = by_item.get(&item.id).map(Vec::as_slice).unwrap_or(&[]);
            let comments = self.comments.find_by_item(item.id).await?;
            views.push(ItemView::new(
                item,
                find_last(bookings, now),
                find_next(bookings, now),
                comments,
            ));
        }
        Ok(views)
    }

    /// 가용 물품 검색. 빈 문자열이면 저장소까지 가지 않고 빈 목록이다.
    pub async fn search_items(&self, text: &str) -> AppResult<Vec<Item>> {
        info!("{:<12} --> 물품 검색: {:?}", "Query", text);
        if text.is_empty() {
            return Ok(Vec::new());
        }
        self.items.search(text).await
    }

    /// 댓글 작성. 승인된 예약을 이미 마친 예약자만 남길 수 있다.
    pub async fn add_comment(
        &self,
        user_id: i64,
        item_id: i64,
        new: NewComment,
    ) -> AppResult<Comment> {
        info!(
            "{:<12} --> 댓글 작성: item {}, user {}",
            "Command", item_id, user_id
        );
        let item = self.resolve_item(item_id).await?;
        let user = self.resolve_user(user_id).await?;
        let now = self.clock.now();
        let finished = self
            .bookings
            .find_by_booker_and_item(user.id, item.id, BookingStatus::Approved, now)
            .await?;
        if finished.is_empty() {
            return Err(AppError::BadRequest("User can't make comments".to_string()));
        }
        self.comments
            .create(NewCommentRecord {
                text: new.text,
                item_id: item.id,
                author_id: user.id,
                created: now,
            })
            .await
    }

    async fn resolve_user(&self, id: i64) -> AppResult<User> {
        self.users
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("User with id:{id} not found")))
    }

    async fn resolve_item(&self, id: i64) -> AppResult<Item> {
        self.items
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Item with id:{id} not found")))
    }
}

// endregion: --- Item Service
