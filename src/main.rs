// region:    --- Imports
use sharing_service::booking::service::BookingService;
use sharing_service::clock::{Clock, SystemClock};
use sharing_service::database::DatabaseManager;
use sharing_service::handlers::{self, AppState};
use sharing_service::item::service::ItemService;
use sharing_service::repository::postgres::{
    PgBookingRepository, PgCommentRepository, PgItemRepository, PgRequestRepository,
    PgUserRepository,
};
use sharing_service::repository::{
    BookingRepository, CommentRepository, ItemRepository, RequestRepository, UserRepository,
};
use sharing_service::request::service::RequestService;
use sharing_service::user::service::UserService;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};
use tracing::{error, info};
// endregion: --- Imports

// region:    --- Main
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // logging 초기화
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .without_time()
        .with_target(false)
        .init();

    // DatabaseManager 생성
    let db = Arc::new(DatabaseManager::new().await);

    // 데이터베이스 초기화
    if let Err(e) = db.initialize_database().await {
        error!("{:<12} --> 데이터베이스 초기화 실패: {:?}", "Main", e);
        return Err(e.into());
    }
    info!("{:<12} --> 데이터베이스 초기화 성공", "Main");

    // 저장소 구성
    let users: Arc<dyn UserRepository> = Arc::new(PgUserRepository::new(Arc::clone(&db)));
    let items: Arc<dyn ItemRepository> = Arc::new(PgItemRepository::new(Arc::clone(&db)));
    let bookings: Arc<dyn BookingRepository> = Arc::new(PgBookingRepository::new(Arc::clone(&db)));
    let comments: Arc<dyn CommentRepository> = Arc::new(PgCommentRepository::new(Arc::clone(&db)));
    let requests: Arc<dyn RequestRepository> = Arc::new(PgRequestRepository::new(Arc::clone(&db)));
    let clock: Arc<dyn Clock> = Arc::new(SystemClock);

    // 서비스 구성(생성자 주입)
    let state = AppState {
        users: Arc::new(UserService::new(Arc::clone(&users))),
        items: Arc::new(ItemService::new(
            Arc::clone(&items),
            Arc::clone(&users),
            Arc::clone(&bookings),
            Arc::clone(&comments),
            Arc::clone(&requests),
            Arc::clone(&clock),
        )),
        bookings: Arc::new(BookingService::new(
            Arc::clone(&bookings),
            Arc::clone(&items),
            Arc::clone(&users),
            Arc::clone(&clock),
        )),
        requests: Arc::new(RequestService::new(
            requests,
            items,
            users,
            clock,
        )),
    };

    // 개발 편의를 위한 cors 설정
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // 라우터 설정
    let routes_all = handlers::app(state).layer(cors);

    // 리스너 생성(로컬 호스트의 3000번 포트를 사용)
    let listener = TcpListener::bind("0.0.0.0:3000").await?;
    info!(
        "{:<12} --> Web Server: Listening on {}",
        "Main",
        listener.local_addr()?
    );

    // 서버 실행
    if let Err(err) = axum::serve(listener, routes_all.into_make_service()).await {
        error!("{:<12} --> Server error: {}", "Main", err);
    }
    Ok(())
}
// endregion: --- Main
