use crate::booking::model::Booking;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// region:    --- Item Model

// 물품 모델
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Item {
    pub id: i64,
    pub name: String,
    pub description: String,
    pub available: bool,
    pub owner_id: i64,
    pub request_id: Option<i64>,
}

/// 물품 상세. 소유자 조회에서만 마지막/다음 예약이 채워진다.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemView {
    pub id: i64,
    pub name: String,
    pub description: String,
    pub available: bool,
    pub owner_id: i64,
    pub request_id: Option<i64>,
    pub last_booking: Option<Booking>,
    pub next_booking: Option<Booking>,
    pub comments: Vec<Comment>,
}

impl ItemView {
    pub fn new(
        item: Item,
        last_booking: Option<Booking>,
        next_booking: Option<Booking>,
        comments: Vec<Comment>,
    ) -> Self {
        Self {
            id: item.id,
            name: item.name,
            description: item.description,
            available: item.available,
            owner_id: item.owner_id,
            request_id: item.request_id,
            last_booking,
            next_booking,
            comments,
        }
    }
}

/// 물품 등록 요청
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewItem {
    pub name: String,
    pub description: String,
    pub available: bool,
    pub request_id: Option<i64>,
}

/// 물품 부분 수정 요청
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct ItemPatch {
    pub name: Option<String>,
    pub description: Option<String>,
    pub available: Option<bool>,
}

// 댓글 모델. 작성자는 이름으로 노출된다.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
    pub id: i64,
    pub text: String,
    pub item_id: i64,
    pub author_name: String,
    pub created: DateTime<Utc>,
}

/// 댓글 작성 요청
#[derive(Debug, Serialize, Deserialize)]
pub struct NewComment {
    pub text: String,
}

// endregion: --- Item Model
