use crate::clock::Clock;
use crate::error::{AppError, AppResult};
use crate::item::model::Item;
use crate::repository::{ItemRepository, RequestRepository, UserRepository};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::info;

use super::model::{ItemRequest, NewRequest, RequestView};

// region:    --- Request Service

/// 물품 공유 요청 관리
pub struct RequestService {
    requests: Arc<dyn RequestRepository>,
    items: Arc<dyn ItemRepository>,
    users: Arc<dyn UserRepository>,
    clock: Arc<dyn Clock>,
}

impl RequestService {
    pub fn new(
        requests: Arc<dyn RequestRepository>,
        items: Arc<dyn ItemRepository>,
        users: Arc<dyn UserRepository>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            requests,
            items,
            users,
            clock,
        }
    }

    /// 요청 등록. 갓 만든 요청의 items는 빈 배열이다.
    pub async fn create_request(&self, user_id: i64, new: NewRequest) -> AppResult<RequestView> {
        info!("{:<12} --> 요청 등록: user {}", "Command", user_id);
        self.resolve_user(user_id).await?;
        let request = self
            .requests
            .create(user_id, new.description, self.clock.now())
            .await?;
        Ok(RequestView::new(request, Some(Vec::new())))
    }

    /// 본인 요청 목록(최신순). 연결된 물품은 일괄 조회로 채우고,
    /// 조회 결과에 묶음이 없는 요청의 items는 null로 남는다.
    pub async fn get_requests(&self, user_id: i64) -> AppResult<Vec<RequestView>> {
        info!("{:<12} --> 본인 요청 목록: user {}", "Query", user_id);
        let requests = self.requests.find_by_requestor(user_id).await?;
        let ids: Vec<i64> = requests.iter().map(|r| r.id).collect();
        let mut by_request: HashMap<i64, Vec<Item>> = HashMap::new();
        for item in self.items.find_by_requests(ids).await? {
            if let Some(request_id) = item.request_id {
                by_request.entry(request_id).or_default().push(item);
            }
        }
        Ok(requests
            .into_iter()
            .map(|r| {
                let items = by_request.remove(&r.id);
                RequestView::new(r, items)
            })
            .collect())
    }

    /// 다른 사용자들의 요청 목록(최신순). items는 항상 빈 배열이다.
    pub async fn get_all_requests(&self, user_id: i64) -> AppResult<Vec<RequestView>> {
        info!("{:<12} --> 전체 요청 목록: user {}", "Query", user_id);
        let requests = self.requests.find_by_other_requestors(user_id).await?;
        Ok(requests
            .into_iter()
            .map(|r| RequestView::new(r, Some(Vec::new())))
            .collect())
    }

    /// 요청 단건 조회. 연결된 물품을 함께 내려준다.
    pub async fn get_request(&self, request_id: i64) -> AppResult<RequestView> {
        info!("{:<12} --> 요청 조회 id: {}", "Query", request_id);
        let request = self.resolve_request(request_id).await?;
        let items = self.items.find_by_request(request.id).await?;
        Ok(RequestView::new(request, Some(items)))
    }

    async fn resolve_user(&self, id: i64) -> AppResult<()> {
        self.users
            .find_by_id(id)
            .await?
            .map(|_| ())
            .ok_or_else(|| AppError::NotFound(format!("User with id:{id} not found")))
    }

    async fn resolve_request(&self, id: i64) -> AppResult<ItemRequest> {
        self.requests
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Request with id:{id} not found")))
    }
}

// endregion: --- Request Service
