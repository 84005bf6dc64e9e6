use crate::error::{AppError, AppResult};
use crate::repository::UserRepository;
use std::sync::Arc;
use tracing::info;

use super::model::{NewUser, User, UserPatch};

// region:    --- User Service

/// 사용자 계정 관리
pub struct UserService {
    users: Arc<dyn UserRepository>,
}

impl UserService {
    pub fn new(users: Arc<dyn UserRepository>) -> Self {
        Self { users }
    }

    /// 사용자 등록. 이메일은 전체에서 유일해야 한다.
    pub async fn create_user(&self, new: NewUser) -> AppResult<User> {
        info!("{:<12} --> 사용자 등록: {}", "Command", new.email);
        self.ensure_email_free(&new.email).await?;
        self.users.create(new).await
    }

    pub async fn get_user(&self, id: i64) -> AppResult<User> {
        info!("{:<12} --> 사용자 조회 id: {}", "Query", id);
        self.resolve(id).await
    }

    /// 부분 수정. 이메일이 실제로 바뀔 때만 유일성을 다시 검사한다.
    pub async fn update_user(&self, id: i64, patch: UserPatch) -> AppResult<User> {
        info!("{:<12} --> 사용자 수정 id: {}", "Command", id);
        let mut user = self.resolve(id).await?;
        if let Some(email) = patch.email {
            if email != user.email {
                self.ensure_email_free(&email).await?;
            }
            user.email = email;
        }
        if let Some(name) = patch.name {
            user.name = name;
        }
        self.users.update(user).await
    }

    /// 삭제. 없는 id면 아무 일도 하지 않는다.
    pub async fn delete_user(&self, id: i64) -> AppResult<()> {
        info!("{:<12} --> 사용자 삭제 id: {}", "Command", id);
        self.users.delete(id).await
    }

    async fn resolve(&self, id: i64) -> AppResult<User> {
        self.users
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("User with id:{id} not found")))
    }

    async fn ensure_email_free(&self, email: &str) -> AppResult<()> {
        match self.users.find_by_email(email).await? {
            Some(_) => Err(AppError::Conflict(format!(
                "User with email {email} already exists"
            ))),
            None => Ok(()),
        }
    }
}

// endregion: --- User Service
