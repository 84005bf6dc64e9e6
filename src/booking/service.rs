use crate::clock::Clock;
use crate::error::{AppError, AppResult};
use crate::repository::{BookingRepository, ItemRepository, NewBookingRecord, UserRepository};
use crate::user::model::User;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use tracing::info;

use super::model::{Booking, BookingState, BookingStatus, NewBooking};

// region:    --- Last/Next Selection

/// 이미 끝난 예약 가운데 종료 시각이 가장 늦은 것
pub fn find_last(bookings: &[Booking], now: DateTime<Utc>) -> Option<Booking> {
    bookings
        .iter()
        .filter(|b| b.end < now)
        .max_by_key(|b| b.end)
        .cloned()
}

/// 아직 시작하지 않은 예약 가운데 종료 시각이 가장 이른 것
pub fn find_next(bookings: &[Booking], now: DateTime<Utc>) -> Option<Booking> {
    bookings
        .iter()
        .filter(|b| b.start > now)
        .min_by_key(|b| b.end)
        .cloned()
}

// endregion: --- Last/Next Selection

// region:    --- Booking Service

/// 예약 수명주기 엔진
pub struct BookingService {
    bookings: Arc<dyn BookingRepository>,
    items: Arc<dyn ItemRepository>,
    users: Arc<dyn UserRepository>,
    clock: Arc<dyn Clock>,
}

impl BookingService {
    pub fn new(
        bookings: Arc<dyn BookingRepository>,
        items: Arc<dyn ItemRepository>,
        users: Arc<dyn UserRepository>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            bookings,
            items,
            users,
            clock,
        }
    }

    /// 예약 생성. 예약자 존재 → 물품 존재 → 기간 → 가용성 순서로 검증하고 WAITING으로 저장한다.
    /// 과거 기간도 거르지 않는다.
    pub async fn create_booking(&self, booker_id: i64, new: NewBooking) -> AppResult<Booking> {
        info!(
            "{:<12} --> 예약 생성: user {}, item {}",
            "Command", booker_id, new.item_id
        );
        self.resolve_user(booker_id).await?;
        let item = self
            .items
            .find_by_id(new.item_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Item with id:{} not found", new.item_id)))?;
        if new.start == new.end {
            return Err(AppError::BadRequest("Start and end are equal".to_string()));
        }
        if new.start > new.end {
            return Err(AppError::BadRequest("Start is after end".to_string()));
        }
        if !item.available {
            return Err(AppError::BadRequest("Item is not available".to_string()));
        }
        self.bookings
            .create(NewBookingRecord {
                start: new.start,
                end: new.end,
                item_id: item.id,
                booker_id,
                status: BookingStatus::Waiting,
            })
            .await
    }

    /// 소유자의 승인/거절 결정. 결정은 몇 번이고 다시 내릴 수 있다.
    /// 소유자가 아니면 누구든(모르는 id 포함) Forbidden이다.
    pub async fn approve_booking(
        &self,
        user_id: i64,
        booking_id: i64,
        approved: bool,
    ) -> AppResult<Booking> {
        info!(
            "{:<12} --> 예약 결정: booking {}, user {}, approved {}",
            "Command", booking_id, user_id, approved
        );
        let booking = self.resolve_booking(booking_id).await?;
        if booking.item.owner_id != user_id {
            return Err(AppError::Forbidden("User is not owner of item".to_string()));
        }
        let status = if approved {
            BookingStatus::Approved
        } else {
            BookingStatus::Rejected
        };
        self.bookings.update_status(booking_id, status).await
    }

    /// 예약 단건 조회. 예약자와 물품 소유자에게만 보인다.
    pub async fn get_booking(&self, user_id: i64, booking_id: i64) -> AppResult<Booking> {
        info!(
            "{:<12} --> 예약 조회 id: {}, user {}",
            "Query", booking_id, user_id
        );
        let booking = self.resolve_booking(booking_id).await?;
        if booking.booker.id != user_id && booking.item.owner_id != user_id {
            return Err(AppError::Forbidden("User is not authorized".to_string()));
        }
        Ok(booking)
    }

    /// 예약자 기준 목록. 예약자 존재는 따로 확인하지 않으므로 모르는 id면 빈 목록이다.
    pub async fn list_for_booker(
        &self,
        booker_id: i64,
        state: BookingState,
    ) -> AppResult<Vec<Booking>> {
        info!(
            "{:<12} --> 예약자 예약 목록: user {}, state {:?}",
            "Query", booker_id, state
        );
        let now = self.clock.now();
        match state {
            BookingState::All => self.bookings.find_by_booker(booker_id).await,
            BookingState::Current => {
                self.bookings
                    .find_by_booker_and_status(booker_id, BookingStatus::Approved)
                    .await
            }
            BookingState::Past => self.bookings.find_by_booker_end_before(booker_id, now).await,
            BookingState::Future => {
                self.bookings
                    .find_by_booker_start_after(booker_id, now)
                    .await
            }
            BookingState::Waiting => {
                self.bookings
                    .find_by_booker_and_status(booker_id, BookingStatus::Waiting)
                    .await
            }
            BookingState::Rejected => {
                self.bookings
                    .find_by_booker_and_status(booker_id, BookingStatus::Rejected)
                    .await
            }
        }
    }

    /// 소유자 기준 목록. 소유자는 먼저 존재해야 한다.
    pub async fn list_for_owner(
        &self,
        owner_id: i64,
        state: BookingState,
    ) -> AppResult<Vec<Booking>> {
        info!(
            "{:<12} --> 소유자 예약 목록: user {}, state {:?}",
            "Query", owner_id, state
        );
        self.resolve_user(owner_id).await?;
        let now = self.clock.now();
        match state {
            BookingState::All => self.bookings.find_by_owner(owner_id).await,
            BookingState::Current => {
                self.bookings
                    .find_by_owner_and_status(owner_id, BookingStatus::Approved)
                    .await
            }
            BookingState::Past => self.bookings.find_by_owner_end_before(owner_id, now).await,
            BookingState::Future => {
                self.bookings
                    .find_by_owner_start_after(owner_id, now)
                    .await
            }
            BookingState::Waiting => {
                self.bookings
                    .find_by_owner_and_status(owner_id, BookingStatus::Waiting)
                    .await
            }
            BookingState::Rejected => {
                self.bookings
                    .find_by_owner_and_status(owner_id, BookingStatus::Rejected)
                    .await
            }
        }
    }

    async fn resolve_user(&self, id: i64) -> AppResult<User> {
        self.users
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("User with id:{id} not found")))
    }

    async fn resolve_booking(&self, id: i64) -> AppResult<Booking> {
        self.bookings
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Booking with id:{id} not found")))
    }
}

// endregion: --- Booking Service

// region:    --- Tests

#[cfg(test)]
mod tests {
    use super::*;
    use crate::item::model::Item;
    use chrono::Duration;

    fn booking(id: i64, start_hours: i64, end_hours: i64, base: DateTime<Utc>) -> Booking {
        Booking {
            id,
            start: base + Duration::hours(start_hours),
            end: base + Duration::hours(end_hours),
            item: Item {
                id: 1,
                name: "drill".to_string(),
                description: "cordless drill".to_string(),
                available: true,
                owner_id: 1,
                request_id: None,
            },
            booker: User {
                id: 2,
                email: "booker@example.com".to_string(),
                name: "booker".to_string(),
            },
            status: BookingStatus::Approved,
        }
    }

    /// 마지막 예약은 끝난 것 중 종료가 가장 늦은 것이다
    #[test]
    fn find_last_picks_latest_ended() {
        let now = Utc::now();
        let bookings = vec![
            booking(1, -10, -5, now),
            booking(2, -4, -2, now),
            booking(3, -1, 1, now),
            booking(4, 2, 3, now),
        ];
        assert_eq!(find_last(&bookings, now).map(|b| b.id), Some(2));
    }

    /// 다음 예약은 시작 전인 것 중 종료가 가장 이른 것이다
    #[test]
    fn find_next_picks_earliest_end_among_upcoming() {
        let now = Utc::now();
        // 시작은 1번이 먼저지만 종료는 2번이 먼저다
        let bookings = vec![booking(1, 1, 100, now), booking(2, 2, 3, now)];
        assert_eq!(find_next(&bookings, now).map(|b| b.id), Some(2));
    }

    /// 진행 중인 예약은 마지막에도 다음에도 들어가지 않는다
    #[test]
    fn ongoing_booking_is_neither_last_nor_next() {
        let now = Utc::now();
        let bookings = vec![booking(1, -1, 1, now)];
        assert!(find_last(&bookings, now).is_none());
        assert!(find_next(&bookings, now).is_none());
    }
}

// endregion: --- Tests
