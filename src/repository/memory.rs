use crate::booking::model::{Booking, BookingStatus};
use crate::error::{AppError, AppResult};
use crate::item::model::{Comment, Item, NewItem};
use crate::request::model::ItemRequest;
use crate::user::model::{NewUser, User};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use tokio::sync::RwLock;

use super::{
    BookingRepository, CommentRepository, ItemRepository, NewBookingRecord, NewCommentRecord,
    RequestRepository, UserRepository,
};

// region:    --- Memory Store

/// 예약의 평면 저장 레코드. 물품/예약자는 조회 시점에 조인한다.
#[derive(Debug, Clone)]
struct BookingRecord {
    id: i64,
    start: DateTime<Utc>,
    end: DateTime<Utc>,
    item_id: i64,
    booker_id: i64,
    status: BookingStatus,
}

#[derive(Debug, Clone)]
struct CommentRecord {
    id: i64,
    text: String,
    item_id: i64,
    author_id: i64,
    created: DateTime<Utc>,
}

#[derive(Debug, Default)]
struct MemoryState {
    users: HashMap<i64, User>,
    items: HashMap<i64, Item>,
    bookings: HashMap<i64, BookingRecord>,
    comments: HashMap<i64, CommentRecord>,
    requests: HashMap<i64, ItemRequest>,
    next_user_id: i64,
    next_item_id: i64,
    next_booking_id: i64,
    next_comment_id: i64,
    next_request_id: i64,
}

/// 테스트와 로컬 구동용 인메모리 저장소. 상태 전체를 잠금 하나로 지켜서
/// 가용성 재확인과 예약 저장이 한 단위로 끝난다.
#[derive(Default)]
pub struct MemoryStore {
    state: RwLock<MemoryState>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn join_booking(state: &MemoryState, rec: &BookingRecord) -> Option<Booking> {
    let item = state.items.get(&rec.item_id)?;
    let booker = state.users.get(&rec.booker_id)?;
    Some(Booking {
        id: rec.id,
        start: rec.start,
        end: rec.end,
        item: item.clone(),
        booker: booker.clone(),
        status: rec.status,
    })
}

fn join_comment(state: &MemoryState, rec: &CommentRecord) -> Option<Comment> {
    let author = state.users.get(&rec.author_id)?;
    Some(Comment {
        id: rec.id,
        text: rec.text.clone(),
        item_id: rec.item_id,
        author_name: author.name.clone(),
        created: rec.created,
    })
}

fn bookings_where<F>(state: &MemoryState, pred: F) -> Vec<Booking>
where
    F: Fn(&Booking) -> bool,
{
    let mut out: Vec<Booking> = state
        .bookings
        .values()
        .filter_map(|rec| join_booking(state, rec))
        .filter(|b| pred(b))
        .collect();
    // 시작 시각 내림차순, 동률이면 id 오름차순
    out.sort_by(|a, b| b.start.cmp(&a.start).then(a.id.cmp(&b.id)));
    out
}

// endregion: --- Memory Store

// region:    --- User Repository

#[async_trait]
impl UserRepository for MemoryStore {
    async fn create(&self, new: NewUser) -> AppResult<User> {
        let mut s = self.state.write().await;
        // 이메일 unique 제약
        if s.users.values().any(|u| u.email == new.email) {
            return Err(AppError::Conflict(format!(
                "User with email {} already exists",
                new.email
            )));
        }
        s.next_user_id += 1;
        let user = User {
            id: s.next_user_id,
            email: new.email,
            name: new.name,
        };
        s.users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn update(&self, user: User) -> AppResult<User> {
        let mut s = self.state.write().await;
        if s.users
            .values()
            .any(|u| u.email == user.email && u.id != user.id)
        {
            return Err(AppError::Conflict(format!(
                "User with email {} already exists",
                user.email
            )));
        }
        match s.users.get_mut(&user.id) {
            Some(stored) => {
                *stored = user;
                Ok(stored.clone())
            }
            None => Err(AppError::Internal(format!(
                "user {} missing on update",
                user.id
            ))),
        }
    }

    async fn find_by_id(&self, id: i64) -> AppResult<Option<User>> {
        let s = self.state.read().await;
        Ok(s.users.get(&id).cloned())
    }

    async fn find_by_email(&self, email: &str) -> AppResult<Option<User>> {
        let s = self.state.read().await;
        Ok(s.users.values().find(|u| u.email == email).cloned())
    }

    async fn delete(&self, id: i64) -> AppResult<()> {
        let mut s = self.state.write().await;
        s.users.remove(&id);
        Ok(())
    }
}

// endregion: --- User Repository

// region:    --- Item Repository

#[async_trait]
impl ItemRepository for MemoryStore {
    async fn create(&self, owner_id: i64, new: NewItem) -> AppResult<Item> {
        let mut s = self.state.write().await;
        s.next_item_id += 1;
        let item = Item {
            id: s.next_item_id,
            name: new.name,
            description: new.description,
            available: new.available,
            owner_id,
            request_id: new.request_id,
        };
        s.items.insert(item.id, item.clone());
        Ok(item)
    }

    async fn update(&self, item: Item) -> AppResult<Item> {
        let mut s = self.state.write().await;
        match s.items.get_mut(&item.id) {
            Some(stored) => {
                *stored = item;
                Ok(stored.clone())
            }
            None => Err(AppError::Internal(format!(
                "item {} missing on update",
                item.id
            ))),
        }
    }

    async fn find_by_id(&self, id: i64) -> AppResult<Option<Item>> {
        let s = self.state.read().await;
        Ok(s.items.get(&id).cloned())
    }

    async fn find_by_owner(&self, owner_id: i64) -> AppResult<Vec<Item>> {
        let s = self.state.read().await;
        let mut items: Vec<Item> = s
            .items
            .values()
            .filter(|i| i.owner_id == owner_id)
            .cloned()
            .collect();
        items.sort_by_key(|i| i.id);
        Ok(items)
    }

    async fn search(&self, text: &str) -> AppResult<Vec<Item>> {
        let s = self.state.read().await;
        let needle = text.to_lowercase();
        let mut items: Vec<Item> = s
            .items
            .values()
            .filter(|i| {
                i.available
                    && (i.name.to_lowercase().contains(&needle)
                        || i.description.to_lowercase().contains(&needle))
            })
            .cloned()
            .collect();
        items.sort_by_key(|i| i.id);
        Ok(items)
    }

    async fn find_by_request(&self, request_id: i64) -> AppResult<Vec<Item>> {
        let s = self.state.read().await;
        let mut items: Vec<Item> = s
            .items
            .values()
            .filter(|i| i.request_id == Some(request_id))
            .cloned()
            .collect();
        items.sort_by_key(|i| i.id);
        Ok(items)
    }

    async fn find_by_requests(&self, request_ids: Vec<i64>) -> AppResult<Vec<Item>> {
        let s = self.state.read().await;
        let mut items: Vec<Item> = s
            .items
            .values()
            .filter(|i| i.request_id.map(|r| request_ids.contains(&r)).unwrap_or(false))
            .cloned()
            .collect();
        items.sort_by_key(|i| i.id);
        Ok(items)
    }
}

// endregion: --- Item Repository

// region:    --- Booking Repository

#[async_trait]
impl BookingRepository for MemoryStore {
    async fn create(&self, new: NewBookingRecord) -> AppResult<Booking> {
        let mut s = self.state.write().await;
        // 같은 잠금 안에서 가용성을 재확인한다
        let available = s
            .items
            .get(&new.item_id)
            .map(|i| i.available)
            .unwrap_or(false);
        if !available {
            return Err(AppError::BadRequest("Item is not available".to_string()));
        }
        s.next_booking_id += 1;
        let rec = BookingRecord {
            id: s.next_booking_id,
            start: new.start,
            end: new.end,
            item_id: new.item_id,
            booker_id: new.booker_id,
            status: new.status,
        };
        s.bookings.insert(rec.id, rec.clone());
        join_booking(&s, &rec)
            .ok_or_else(|| AppError::Internal("booking references a missing row".to_string()))
    }

    async fn update_status(&self, id: i64, status: BookingStatus) -> AppResult<Booking> {
        let mut s = self.state.write().await;
        let rec = match s.bookings.get_mut(&id) {
            Some(rec) => {
                rec.status = status;
                rec.clone()
            }
            None => {
                return Err(AppError::NotFound(format!("Booking with id:{id} not found")));
            }
        };
        join_booking(&s, &rec)
            .ok_or_else(|| AppError::Internal("booking references a missing row".to_string()))
    }

    async fn find_by_id(&self, id: i64) -> AppResult<Option<Booking>> {
        let s = self.state.read().await;
        Ok(s.bookings.get(&id).and_then(|rec| join_booking(&s, rec)))
    }

    async fn find_by_booker(&self, booker_id: i64) -> AppResult<Vec<Booking>> {
        let s = self.state.read().await;
        Ok(bookings_where(&s, |b| b.booker.id == booker_id))
    }

    async fn find_by_booker_and_status(
        &self,
        booker_id: i64,
        status: BookingStatus,
    ) -> AppResult<Vec<Booking>> {
        let s = self.state.read().await;
        Ok(bookings_where(&s, |b| {
            b.booker.id == booker_id && b.status == status
        }))
    }

    async fn find_by_booker_end_before(
        &self,
        booker_id: i64,
        moment: DateTime<Utc>,
    ) -> AppResult<Vec<Booking>> {
        let s = self.state.read().await;
        Ok(bookings_where(&s, |b| {
            b.booker.id == booker_id && b.end < moment
        }))
    }

    async fn find_by_booker_start_after(
        &self,
        booker_id: i64,
        moment: DateTime<Utc>,
    ) -> AppResult<Vec<Booking>> {
        let s = self.state.read().await;
        Ok(bookings_where(&s, |b| {
            b.booker.id == booker_id && b.start > moment
        }))
    }

    async fn find_by_owner(&self, owner_id: i64) -> AppResult<Vec<Booking>> {
        let s = self.state.read().await;
        Ok(bookings_where(&s, |b| b.item.owner_id == owner_id))
    }

    async fn find_by_owner_and_status(
        &self,
        owner_id: i64,
        status: BookingStatus,
    ) -> AppResult<Vec<Booking>> {
        let s = self.state.read().await;
        Ok(bookings_where(&s, |b| {
            b.item.owner_id == owner_id && b.status == status
        }))
    }

    async fn find_by_owner_end_before(
        &self,
        owner_id: i64,
        moment: DateTime<Utc>,
    ) -> AppResult<Vec<Booking>> {
        let s = self.state.read().await;
        Ok(bookings_where(&s, |b| {
            b.item.owner_id == owner_id && b.end < moment
        }))
    }

    async fn find_by_owner_start_after(
        &self,
        owner_id: i64,
        moment: DateTime<Utc>,
    ) -> AppResult<Vec<Booking>> {
        let s = self.state.read().await;
        Ok(bookings_where(&s, |b| {
            b.item.owner_id == owner_id && b.start > moment
        }))
    }

    async fn find_by_item(&self, item_id: i64) -> AppResult<Vec<Booking>> {
        let s = self.state.read().await;
        let mut out = bookings_where(&s, |b| b.item.id == item_id);
        out.sort_by_key(|b| b.id);
        Ok(out)
    }

    async fn find_by_booker_and_item(
        &self,
        booker_id: i64,
        item_id: i64,
        status: BookingStatus,
        end_before: DateTime<Utc>,
    ) -> AppResult<Vec<Booking>> {
        let s = self.state.read().await;
        let mut out = bookings_where(&s, |b| {
            b.booker.id == booker_id
                && b.item.id == item_id
                && b.status == status
                && b.end < end_before
        });
        out.sort_by_key(|b| b.id);
        Ok(out)
    }
}

// endregion: --- Booking Repository

// region:    --- Comment Repository

#[async_trait]
impl CommentRepository for MemoryStore {
    async fn create(&self, new: NewCommentRecord) -> AppResult<Comment> {
        let mut s = self.state.write().await;
        s.next_comment_id += 1;
        let rec = CommentRecord {
            id: s.next_comment_id,
            text: new.text,
            item_id: new.item_id,
            author_id: new.author_id,
            created: new.created,
        };
        s.comments.insert(rec.id, rec.clone());
        join_comment(&s, &rec)
            .ok_or_else(|| AppError::Internal("comment references a missing row".to_string()))
    }

    async fn find_by_item(&self, item_id: i64) -> AppResult<Vec<Comment>> {
        let s = self.state.read().await;
        let mut comments: Vec<Comment> = s
            .comments
            .values()
            .filter(|c| c.item_id == item_id)
            .filter_map(|c| join_comment(&s, c))
            .collect();
        comments.sort_by(|a, b| a.created.cmp(&b.created).then(a.id.cmp(&b.id)));
        Ok(comments)
    }
}

// endregion: --- Comment Repository

// region:    --- Request Repository

#[async_trait]
impl RequestRepository for MemoryStore {
    async fn create(
        &self,
        requestor_id: i64,
        description: String,
        created: DateTime<Utc>,
    ) -> AppResult<ItemRequest> {
        let mut s = self.state.write().await;
        s.next_request_id += 1;
        let request = ItemRequest {
            id: s.next_request_id,
            description,
            requestor_id,
            created,
        };
        s.requests.insert(request.id, request.clone());
        Ok(request)
    }

    async fn find_by_id(&self, id: i64) -> AppResult<Option<ItemRequest>> {
        let s = self.state.read().await;
        Ok(s.requests.get(&id).cloned())
    }

    async fn find_by_requestor(&self, requestor_id: i64) -> AppResult<Vec<ItemRequest>> {
        let s = self.state.read().await;
        let mut requests: Vec<ItemRequest> = s
            .requests
            .values()
            .filter(|r| r.requestor_id == requestor_id)
            .cloned()
            .collect();
        requests.sort_by(|a, b| b.created.cmp(&a.created).then(a.id.cmp(&b.id)));
        Ok(requests)
    }

    async fn find_by_other_requestors(&self, requestor_id: i64) -> AppResult<Vec<ItemRequest>> {
        let s = self.state.read().await;
        let mut requests: Vec<ItemRequest> = s
            .requests
            .values()
            .filter(|r| r.requestor_id != requestor_id)
            .cloned()
            .collect();
        requests.sort_by(|a, b| b.created.cmp(&a.created).then(a.id.cmp(&b.id)));
        Ok(requests)
    }
}

// endregion: --- Request Repository

// region:    --- Tests


// endregion: --- Tests
