use crate::item::model::Item;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// region:    --- Request Model

// 물품 공유 요청 모델
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct ItemRequest {
    pub id: i64,
    pub description: String,
    pub requestor_id: i64,
    pub created: DateTime<Utc>,
}

/// 요청 상세. items가 None이면 본문에 null로 내려간다.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestView {
    pub id: i64,
    pub description: String,
    pub requestor_id: i64,
    pub created: DateTime<Utc>,
    pub items: Option<Vec<Item>>,
}

impl RequestView {
    pub fn new(request: ItemRequest, items: Option<Vec<Item>>) -> Self {
        Self {
            id: request.id,
            description: request.description,
            requestor_id: request.requestor_id,
            created: request.created,
            items,
        }
    }
}

/// 요청 등록 바디
#[derive(Debug, Serialize, Deserialize)]
pub struct NewRequest {
    pub description: String,
}

// endregion: --- Request Model
