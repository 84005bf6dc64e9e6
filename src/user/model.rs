use serde::{Deserialize, Serialize};

// region:    --- User Model

// 사용자 모델
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct User {
    pub id: i64,
    pub email: String,
    pub name: String,
}

/// 사용자 등록 요청
#[derive(Debug, Serialize, Deserialize)]
pub struct NewUser {
    pub email: String,
    pub name: String,
}

/// 사용자 부분 수정 요청. 빠진 필드는 기존 값을 유지한다.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct UserPatch {
    pub email: Option<String>,
    pub name: Option<String>,
}

// endregion: --- User Model
