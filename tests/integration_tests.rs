use axum::http::StatusCode;
use chrono::{DateTime, Duration, Utc};
use reqwest::Client;
use serde_json::{json, Value};
use sharing_service::booking::service::BookingService;
use sharing_service::clock::{Clock, FixedClock};
use sharing_service::handlers::{self, AppState, USER_ID_HEADER};
use sharing_service::item::service::ItemService;
use sharing_service::repository::memory::MemoryStore;
use sharing_service::repository::{
    BookingRepository, CommentRepository, ItemRepository, RequestRepository, UserRepository,
};
use sharing_service::request::service::RequestService;
use sharing_service::user::service::UserService;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::info;

/// 트레이싱 초기화
fn init_tracing() {
    let subscriber = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .without_time()
        .with_target(false)
        .with_test_writer()
        .finish();
    tracing::subscriber::set_global_default(subscriber).expect("트레이싱 구독자 설정 실패");
}

struct TestApp {
    base_url: String,
    client: Client,
    clock: Arc<FixedClock>,
}

impl TestApp {
    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

/// 인메모리 저장소와 고정 시계로 테스트 서버 기동
async fn spawn_app() -> TestApp {
    let store = Arc::new(MemoryStore::new());
    let users: Arc<dyn UserRepository> = store.clone();
    let items: Arc<dyn ItemRepository> = store.clone();
    let bookings: Arc<dyn BookingRepository> = store.clone();
    let comments: Arc<dyn CommentRepository> = store.clone();
    let requests: Arc<dyn RequestRepository> = store.clone();
    let clock = Arc::new(FixedClock::new(Utc::now()));
    let clock_dyn: Arc<dyn Clock> = clock.clone();

    let state = AppState {
        users: Arc::new(UserService::new(Arc::clone(&users))),
        items: Arc::new(ItemService::new(
            Arc::clone(&items),
            Arc::clone(&users),
            Arc::clone(&bookings),
            Arc::clone(&comments),
            Arc::clone(&requests),
            Arc::clone(&clock_dyn),
        )),
        bookings: Arc::new(BookingService::new(
            Arc::clone(&bookings),
            Arc::clone(&items),
            Arc::clone(&users),
            Arc::clone(&clock_dyn),
        )),
        requests: Arc::new(RequestService::new(requests, items, users, clock_dyn)),
    };

    let app = handlers::app(state);
    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind listener");
    let addr = listener.local_addr().expect("Failed to read local addr");
    tokio::spawn(async move {
        axum::serve(listener, app.into_make_service()).await.unwrap();
    });

    TestApp {
        base_url: format!("http://{addr}"),
        client: Client::new(),
        clock,
    }
}

/// 예약 생성 테스트
#[tokio::test]
async fn booking_is_created_waiting() {
    let app = spawn_app().await;
    let owner = create_user(&app, "owner@example.com", "owner").await;
    let booker = create_user(&app, "booker@example.com", "booker").await;
    let item = create_item(&app, id(&owner), "드릴", "충전 드릴", true).await;

    let now = app.clock.now();
    let booking = create_booking(
        &app,
        id(&booker),
        id(&item),
        now + Duration::minutes(10),
        now + Duration::hours(1),
    )
    .await;

    assert_eq!(booking["status"], "WAITING");
    assert_eq!(booking["item"]["id"], item["id"]);
    assert_eq!(booking["booker"]["id"], booker["id"]);
    assert_eq!(booking["item"]["ownerId"], owner["id"]);
}

/// 기간 검증 테스트: 잘못된 기간은 아무 행도 남기지 않는다
#[tokio::test]
async fn booking_rejects_bad_windows() {
    let app = spawn_app().await;
    let owner = create_user(&app, "owner@example.com", "owner").await;
    let booker = create_user(&app, "booker@example.com", "booker").await;
    let item = create_item(&app, id(&owner), "드릴", "충전 드릴", true).await;

    let now = app.clock.now();
    let response = post_booking(&app, id(&booker), id(&item), now, now).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(error_of(response).await, "Start and end are equal");

    let response = post_booking(
        &app,
        id(&booker),
        id(&item),
        now + Duration::hours(2),
        now + Duration::hours(1),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(error_of(response).await, "Start is after end");

    let listed = get_with_header(&app, id(&booker), "/bookings").await;
    assert_eq!(booking_ids(listed).await, Vec::<i64>::new());
}

/// 존재 검증 테스트
#[tokio::test]
async fn booking_rejects_missing_user_or_item() {
    let app = spawn_app().await;
    let owner = create_user(&app, "owner@example.com", "owner").await;
    let item = create_item(&app, id(&owner), "드릴", "충전 드릴", true).await;

    let now = app.clock.now();
    let response = post_booking(&app, 99, id(&item), now, now + Duration::hours(1)).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(error_of(response).await, "User with id:99 not found");

    let response = post_booking(&app, id(&owner), 99, now, now + Duration::hours(1)).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(error_of(response).await, "Item with id:99 not found");
}

/// 가용성 검증 테스트
#[tokio::test]
async fn booking_rejects_unavailable_item() {
    let app = spawn_app().await;
    let owner = create_user(&app, "owner@example.com", "owner").await;
    let booker = create_user(&app, "booker@example.com", "booker").await;
    let item = create_item(&app, id(&owner), "사다리", "접이식", false).await;

    let now = app.clock.now();
    let response = post_booking(
        &app,
        id(&booker),
        id(&item),
        now + Duration::hours(1),
        now + Duration::hours(2),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(error_of(response).await, "Item is not available");
}

/// 예약 조회 권한 테스트: 예약자와 소유자만 볼 수 있다
#[tokio::test]
async fn booking_is_visible_to_booker_and_owner_only() {
    let app = spawn_app().await;
    let owner = create_user(&app, "owner@example.com", "owner").await;
    let booker = create_user(&app, "booker@example.com", "booker").await;
    let other = create_user(&app, "other@example.com", "other").await;
    let item = create_item(&app, id(&owner), "드릴", "충전 드릴", true).await;

    let now = app.clock.now();
    let booking = create_booking(
        &app,
        id(&booker),
        id(&item),
        now + Duration::hours(1),
        now + Duration::hours(2),
    )
    .await;
    let path = format!("/bookings/{}", id(&booking));

    let response = get_with_header(&app, id(&booker), &path).await;
    assert_eq!(response.status(), StatusCode::OK);
    let response = get_with_header(&app, id(&owner), &path).await;
    assert_eq!(response.status(), StatusCode::OK);

    let response = get_with_header(&app, id(&other), &path).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    assert_eq!(error_of(response).await, "User is not authorized");

    let response = get_with_header(&app, id(&owner), "/bookings/99").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(error_of(response).await, "Booking with id:99 not found");
}

/// 승인/거절 테스트: 소유자만 결정하고, 결정은 다시 내릴 수 있다
#[tokio::test]
async fn approval_is_owner_only_and_repeatable() {
    let app = spawn_app().await;
    let owner = create_user(&app, "owner@example.com", "owner").await;
    let booker = create_user(&app, "booker@example.com", "booker").await;
    let other = create_user(&app, "other@example.com", "other").await;
    let item = create_item(&app, id(&owner), "드릴", "충전 드릴", true).await;

    let now = app.clock.now();
    let booking = create_booking(
        &app,
        id(&booker),
        id(&item),
        now + Duration::hours(1),
        now + Duration::hours(2),
    )
    .await;
    let booking_id = id(&booking);

    // 소유자가 아니면 등록된 사용자든 모르는 id든 똑같이 거절된다
    let response = decide_booking(&app, id(&other), booking_id, true).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    assert_eq!(error_of(response).await, "User is not owner of item");

    let response = decide_booking(&app, 99, booking_id, true).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    assert_eq!(error_of(response).await, "User is not owner of item");

    let response = decide_booking(&app, id(&owner), booking_id, true).await;
    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["status"], "APPROVED");

    // 승인 후에도 거절로 뒤집을 수 있다
    let response = decide_booking(&app, id(&owner), booking_id, false).await;
    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["status"], "REJECTED");

    let response = decide_booking(&app, id(&owner), 99, true).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(error_of(response).await, "Booking with id:99 not found");
}

/// 예약자 상태별 목록 테스트
#[tokio::test]
async fn booker_listing_filters_by_state() {
    init_tracing();
    let app = spawn_app().await;
    let owner = create_user(&app, "owner@example.com", "owner").await;
    let booker = create_user(&app, "booker@example.com", "booker").await;
    let item = create_item(&app, id(&owner), "드릴", "충전 드릴", true).await;

    let now = app.clock.now();
    let book = |start: DateTime<Utc>, end: DateTime<Utc>| {
        create_booking(&app, id(&booker), id(&item), start, end)
    };
    let b1 = id(&book(now + Duration::hours(1), now + Duration::hours(10)).await);
    let b2 = id(&book(now + Duration::hours(2), now + Duration::hours(12)).await);
    let b3 = id(&book(now - Duration::hours(10), now - Duration::hours(5)).await);
    let b4 = id(&book(now + Duration::hours(3), now + Duration::hours(20)).await);
    decide_booking(&app, id(&owner), b2, false).await;
    decide_booking(&app, id(&owner), b3, true).await;
    decide_booking(&app, id(&owner), b4, true).await;
    info!("예약 {}건 준비 완료", 4);

    // 시작 시각 내림차순
    let listed = get_with_header(&app, id(&booker), "/bookings?state=ALL").await;
    assert_eq!(booking_ids(listed).await, vec![b4, b2, b1, b3]);

    let listed = get_with_header(&app, id(&booker), "/bookings?state=WAITING").await;
    assert_eq!(booking_ids(listed).await, vec![b1]);

    let listed = get_with_header(&app, id(&booker), "/bookings?state=REJECTED").await;
    assert_eq!(booking_ids(listed).await, vec![b2]);

    let listed = get_with_header(&app, id(&booker), "/bookings?state=PAST").await;
    assert_eq!(booking_ids(listed).await, vec![b3]);

    let listed = get_with_header(&app, id(&booker), "/bookings?state=FUTURE").await;
    assert_eq!(booking_ids(listed).await, vec![b4, b2, b1]);

    // CURRENT는 기간과 무관하게 승인된 예약이다
    let listed = get_with_header(&app, id(&booker), "/bookings?state=CURRENT").await;
    assert_eq!(booking_ids(listed).await, vec![b4, b3]);

    // 소문자도 같은 필터다
    let listed = get_with_header(&app, id(&booker), "/bookings?state=current").await;
    assert_eq!(booking_ids(listed).await, vec![b4, b3]);

    // 상태 필터를 빼면 ALL이다
    let listed = get_with_header(&app, id(&booker), "/bookings").await;
    assert_eq!(booking_ids(listed).await, vec![b4, b2, b1, b3]);

    let response = get_with_header(&app, id(&booker), "/bookings?state=NONSENSE").await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(error_of(response).await, "Unknown state: NONSENSE");

    // 예약자 기준 목록은 모르는 사용자라도 빈 목록으로 끝난다
    let listed = get_with_header(&app, 99, "/bookings").await;
    assert_eq!(booking_ids(listed).await, Vec::<i64>::new());
}

/// 소유자 상태별 목록 테스트
#[tokio::test]
async fn owner_listing_filters_by_state() {
    let app = spawn_app().await;
    let owner = create_user(&app, "owner@example.com", "owner").await;
    let booker = create_user(&app, "booker@example.com", "booker").await;
    let idle = create_user(&app, "idle@example.com", "idle").await;
    let item = create_item(&app, id(&owner), "드릴", "충전 드릴", true).await;

    let now = app.clock.now();
    let book = |start: DateTime<Utc>, end: DateTime<Utc>| {
        create_booking(&app, id(&booker), id(&item), start, end)
    };
    let b1 = id(&book(now + Duration::hours(1), now + Duration::hours(10)).await);
    let b2 = id(&book(now - Duration::hours(10), now - Duration::hours(5)).await);
    decide_booking(&app, id(&owner), b2, true).await;

    let listed = get_with_header(&app, id(&owner), "/bookings/owner?state=ALL").await;
    assert_eq!(booking_ids(listed).await, vec![b1, b2]);

    let listed = get_with_header(&app, id(&owner), "/bookings/owner?state=PAST").await;
    assert_eq!(booking_ids(listed).await, vec![b2]);

    let listed = get_with_header(&app, id(&owner), "/bookings/owner?state=FUTURE").await;
    assert_eq!(booking_ids(listed).await, vec![b1]);

    let listed = get_with_header(&app, id(&owner), "/bookings/owner?state=WAITING").await;
    assert_eq!(booking_ids(listed).await, vec![b1]);

    let listed = get_with_header(&app, id(&owner), "/bookings/owner?state=CURRENT").await;
    assert_eq!(booking_ids(listed).await, vec![b2]);

    // 물품 없는 사용자는 빈 목록, 모르는 사용자는 404다
    let listed = get_with_header(&app, id(&idle), "/bookings/owner").await;
    assert_eq!(booking_ids(listed).await, Vec::<i64>::new());

    let response = get_with_header(&app, 99, "/bookings/owner").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(error_of(response).await, "User with id:99 not found");
}

/// 마지막/다음 예약 장식 테스트: 소유자에게만 보이고, 다음은 종료가 가장 이른 것이다
#[tokio::test]
async fn item_view_decorates_last_and_next_for_owner_only() {
    let app = spawn_app().await;
    let owner = create_user(&app, "owner@example.com", "owner").await;
    let booker = create_user(&app, "booker@example.com", "booker").await;
    let item = create_item(&app, id(&owner), "드릴", "충전 드릴", true).await;

    let now = app.clock.now();
    let book = |start: DateTime<Utc>, end: DateTime<Utc>| {
        create_booking(&app, id(&booker), id(&item), start, end)
    };
    // 과거 둘, 미래 둘. 미래는 시작이 늦어도 종료가 이른 쪽이 "다음"이다.
    let last_expected = id(&book(now - Duration::days(1), now - Duration::hours(2)).await);
    let _older = id(&book(now - Duration::days(3), now - Duration::days(2)).await);
    let _far = id(&book(now + Duration::hours(1), now + Duration::days(10)).await);
    let next_expected = id(&book(now + Duration::hours(2), now + Duration::hours(5)).await);

    let path = format!("/items/{}", id(&item));
    let response = get_with_header(&app, id(&owner), &path).await;
    assert_eq!(response.status(), StatusCode::OK);
    let view: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(view["lastBooking"]["id"], last_expected);
    assert_eq!(view["nextBooking"]["id"], next_expected);

    // 소유자가 아니면 장식이 비어 있다
    let response = get_with_header(&app, id(&booker), &path).await;
    let view: Value = response.json().await.expect("Failed to parse response");
    assert!(view["lastBooking"].is_null());
    assert!(view["nextBooking"].is_null());

    // 헤더가 없어도 조회는 된다
    let response = app
        .client
        .get(app.url(&path))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), StatusCode::OK);
    let view: Value = response.json().await.expect("Failed to parse response");
    assert!(view["lastBooking"].is_null());
    assert!(view["nextBooking"].is_null());
    assert_eq!(view["comments"], json!([]));
}

/// 댓글 자격 테스트: 승인된 예약을 마친 예약자만 남길 수 있다
#[tokio::test]
async fn comment_requires_finished_approved_booking() {
    let app = spawn_app().await;
    let owner = create_user(&app, "owner@example.com", "owner").await;
    let booker = create_user(&app, "booker@example.com", "booker").await;
    let other = create_user(&app, "other@example.com", "other").await;
    let item = create_item(&app, id(&owner), "드릴", "충전 드릴", true).await;

    let now = app.clock.now();
    let booking = create_booking(
        &app,
        id(&booker),
        id(&item),
        now + Duration::minutes(1),
        now + Duration::minutes(5),
    )
    .await;
    decide_booking(&app, id(&owner), id(&booking), true).await;

    // 아직 끝나지 않은 예약으로는 못 쓴다
    let response = post_comment(&app, id(&booker), id(&item), "좋은 드릴이에요").await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(error_of(response).await, "User can't make comments");

    app.clock.advance(Duration::minutes(10));

    let response = post_comment(&app, id(&booker), id(&item), "좋은 드릴이에요").await;
    assert_eq!(response.status(), StatusCode::OK);
    let comment: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(comment["authorName"], "booker");
    assert_eq!(comment["itemId"], item["id"]);
    assert_eq!(comment["text"], "좋은 드릴이에요");

    // 예약 이력이 없는 사용자는 못 쓴다
    let response = post_comment(&app, id(&other), id(&item), "저도요").await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(error_of(response).await, "User can't make comments");

    // 승인되지 않은 예약은 끝났어도 자격이 안 된다
    let waiting = create_booking(
        &app,
        id(&other),
        id(&item),
        now - Duration::hours(2),
        now - Duration::hours(1),
    )
    .await;
    assert_eq!(waiting["status"], "WAITING");
    let response = post_comment(&app, id(&other), id(&item), "아직이요").await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    // 댓글은 누구의 조회에서든 보인다
    let response = app
        .client
        .get(app.url(&format!("/items/{}", id(&item))))
        .send()
        .await
        .expect("Failed to send request");
    let view: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(view["comments"][0]["text"], "좋은 드릴이에요");

    // 물품/사용자 존재가 자격보다 먼저다
    let response = post_comment(&app, id(&booker), 99, "유령 물품").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(error_of(response).await, "Item with id:99 not found");

    let response = post_comment(&app, 99, id(&item), "유령 사용자").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(error_of(response).await, "User with id:99 not found");
}

/// 사용자 관리 테스트
#[tokio::test]
async fn user_lifecycle_enforces_unique_email() {
    let app = spawn_app().await;
    let first = create_user(&app, "dup@example.com", "first").await;
    assert_eq!(id(&first), 1);

    // 같은 이메일은 등록할 수 없다
    let response = app
        .client
        .post(app.url("/users"))
        .json(&json!({ "email": "dup@example.com", "name": "second" }))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), StatusCode::CONFLICT);
    assert_eq!(
        error_of(response).await,
        "User with email dup@example.com already exists"
    );

    let second = create_user(&app, "second@example.com", "second").await;

    // 이름만 고치면 이메일은 그대로다
    let response = app
        .client
        .patch(app.url(&format!("/users/{}", id(&first))))
        .json(&json!({ "name": "renamed" }))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["name"], "renamed");
    assert_eq!(body["email"], "dup@example.com");

    // 자기 이메일로 다시 고치는 것은 충돌이 아니다
    let response = app
        .client
        .patch(app.url(&format!("/users/{}", id(&first))))
        .json(&json!({ "email": "dup@example.com" }))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), StatusCode::OK);

    // 남의 이메일로는 못 바꾼다
    let response = app
        .client
        .patch(app.url(&format!("/users/{}", id(&second))))
        .json(&json!({ "email": "dup@example.com" }))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), StatusCode::CONFLICT);

    let response = app
        .client
        .get(app.url("/users/99"))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(error_of(response).await, "User with id:99 not found");

    // 삭제는 조용히 끝나고, 없는 id를 지워도 마찬가지다
    let response = app
        .client
        .delete(app.url(&format!("/users/{}", id(&second))))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .client
        .get(app.url(&format!("/users/{}", id(&second))))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = app
        .client
        .delete(app.url(&format!("/users/{}", id(&second))))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), StatusCode::OK);
}

/// 물품 수정/검색 테스트
#[tokio::test]
async fn item_update_and_search_rules() {
    let app = spawn_app().await;
    let owner = create_user(&app, "owner@example.com", "owner").await;
    let stranger = create_user(&app, "stranger@example.com", "stranger").await;
    let item = create_item(&app, id(&owner), "Power Drill", "cordless tool", true).await;
    let item_path = format!("/items/{}", id(&item));

    // 소유자가 아니면 수정할 수 없다
    let response = patch_item(&app, id(&stranger), &item_path, json!({ "name": "mine" })).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(error_of(response).await, "You do not own this item");

    let response = patch_item(&app, id(&owner), &item_path, json!({ "description": "" })).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(error_of(response).await, "Description cannot be empty");

    let response = patch_item(
        &app,
        id(&owner),
        &item_path,
        json!({ "name": "Hammer Drill", "description": "sds plus" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["name"], "Hammer Drill");
    assert_eq!(body["description"], "sds plus");

    // 검색은 이름/설명 부분 일치이고 대소문자를 가리지 않는다
    create_item(&app, id(&owner), "ladder", "aluminium DRILL holder", true).await;
    create_item(&app, id(&owner), "drill bits", "steel", false).await;

    let found = search(&app, "drill").await;
    let names: Vec<String> = found
        .as_array()
        .expect("array body")
        .iter()
        .map(|i| i["name"].as_str().unwrap_or_default().to_string())
        .collect();
    assert_eq!(names, vec!["Hammer Drill", "ladder"]);

    // 빈 검색어는 빈 목록이다
    let found = search(&app, "").await;
    assert_eq!(found, json!([]));

    // 가용 여부를 끄면 검색에서 빠진다
    let response = patch_item(&app, id(&owner), &item_path, json!({ "available": false })).await;
    assert_eq!(response.status(), StatusCode::OK);
    let found = search(&app, "hammer").await;
    assert_eq!(found, json!([]));

    // 소유자 목록 조회는 장식된 물품을 내려준다
    let response = get_with_header(&app, id(&owner), "/items").await;
    assert_eq!(response.status(), StatusCode::OK);
    let views: Value = response.json().await.expect("Failed to parse response");
    let views = views.as_array().expect("array body");
    assert_eq!(views.len(), 3);
    assert!(views.iter().all(|v| v["comments"].is_array()));

    let response = get_with_header(&app, 99, "/items").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(error_of(response).await, "User with id:99 not found");
}

/// 헤더 검증 테스트
#[tokio::test]
async fn sharer_header_is_required_for_items() {
    let app = spawn_app().await;

    let response = app
        .client
        .post(app.url("/items"))
        .json(&json!({ "name": "드릴", "description": "충전 드릴", "available": true }))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(error_of(response).await, "Missing X-Sharer-User-Id header");

    let response = app
        .client
        .get(app.url("/bookings"))
        .header(USER_ID_HEADER, "abc")
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(error_of(response).await, "Invalid X-Sharer-User-Id header");
}

/// 공유 요청 테스트
#[tokio::test]
async fn request_registry_lists_and_decorates() {
    let app = spawn_app().await;
    let owner = create_user(&app, "owner@example.com", "owner").await;
    let requestor = create_user(&app, "requestor@example.com", "requestor").await;

    let response = app
        .client
        .post(app.url("/requests"))
        .header(USER_ID_HEADER, 99)
        .json(&json!({ "description": "드릴이 필요해요" }))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(error_of(response).await, "User with id:99 not found");

    let first = create_request(&app, id(&requestor), "드릴이 필요해요").await;
    assert_eq!(first["items"], json!([]));
    app.clock.advance(Duration::minutes(1));
    let second = create_request(&app, id(&requestor), "사다리도 필요해요").await;

    // 첫 요청에만 응답 물품을 올린다
    let response = app
        .client
        .post(app.url("/items"))
        .header(USER_ID_HEADER, id(&owner))
        .json(&json!({
            "name": "드릴",
            "description": "충전 드릴",
            "available": true,
            "requestId": id(&first)
        }))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), StatusCode::OK);
    let offered: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(offered["requestId"], first["id"]);

    // 없는 요청에 응답하는 등록은 거절된다
    let response = app
        .client
        .post(app.url("/items"))
        .header(USER_ID_HEADER, id(&owner))
        .json(&json!({
            "name": "사다리",
            "description": "접이식",
            "available": true,
            "requestId": 77
        }))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(error_of(response).await, "Request with id:77 not found");

    // 본인 목록은 최신순이고, 물품 묶음이 없는 요청의 items는 null이다
    let response = get_with_header(&app, id(&requestor), "/requests").await;
    assert_eq!(response.status(), StatusCode::OK);
    let listed: Value = response.json().await.expect("Failed to parse response");
    let listed = listed.as_array().expect("array body");
    assert_eq!(listed.len(), 2);
    assert_eq!(listed[0]["id"], second["id"]);
    assert!(listed[0]["items"].is_null());
    assert_eq!(listed[1]["id"], first["id"]);
    assert_eq!(listed[1]["items"][0]["id"], offered["id"]);

    // 다른 사용자 목록에서는 items가 항상 빈 배열이다
    let response = get_with_header(&app, id(&owner), "/requests/all").await;
    let listed: Value = response.json().await.expect("Failed to parse response");
    let listed = listed.as_array().expect("array body");
    assert_eq!(listed.len(), 2);
    assert!(listed.iter().all(|r| r["items"] == json!([])));

    let response = get_with_header(&app, id(&requestor), "/requests/all").await;
    let listed: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(listed, json!([]));

    // 단건 조회는 헤더 없이 되고, 연결된 물품을 담는다
    let response = app
        .client
        .get(app.url(&format!("/requests/{}", id(&first))))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["items"][0]["id"], offered["id"]);

    let response = app
        .client
        .get(app.url("/requests/99"))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(error_of(response).await, "Request with id:99 not found");
}

// region:    --- Helpers

/// id 필드 추출
fn id(value: &Value) -> i64 {
    value["id"].as_i64().expect("id field")
}

/// 오류 본문의 error 필드
async fn error_of(response: reqwest::Response) -> String {
    let body: Value = response.json().await.expect("Failed to parse response");
    body["error"].as_str().unwrap_or_default().to_string()
}

/// 테스트용 사용자 등록
async fn create_user(app: &TestApp, email: &str, name: &str) -> Value {
    let response = app
        .client
        .post(app.url("/users"))
        .json(&json!({ "email": email, "name": name }))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), StatusCode::OK);
    response.json().await.expect("Failed to parse response")
}

/// 테스트용 물품 등록
async fn create_item(
    app: &TestApp,
    owner_id: i64,
    name: &str,
    description: &str,
    available: bool,
) -> Value {
    let response = app
        .client
        .post(app.url("/items"))
        .header(USER_ID_HEADER, owner_id)
        .json(&json!({ "name": name, "description": description, "available": available }))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), StatusCode::OK);
    response.json().await.expect("Failed to parse response")
}

/// 예약 생성 요청 전송
async fn post_booking(
    app: &TestApp,
    booker_id: i64,
    item_id: i64,
    start: DateTime<Utc>,
    end: DateTime<Utc>,
) -> reqwest::Response {
    app.client
        .post(app.url("/bookings"))
        .header(USER_ID_HEADER, booker_id)
        .json(&json!({ "itemId": item_id, "start": start, "end": end }))
        .send()
        .await
        .expect("Failed to send request")
}

/// 예약 생성 후 본문 반환
async fn create_booking(
    app: &TestApp,
    booker_id: i64,
    item_id: i64,
    start: DateTime<Utc>,
    end: DateTime<Utc>,
) -> Value {
    let response = post_booking(app, booker_id, item_id, start, end).await;
    assert_eq!(response.status(), StatusCode::OK);
    response.json().await.expect("Failed to parse response")
}

/// 예약 승인/거절 요청 전송
async fn decide_booking(
    app: &TestApp,
    user_id: i64,
    booking_id: i64,
    approved: bool,
) -> reqwest::Response {
    app.client
        .patch(app.url(&format!("/bookings/{booking_id}?approved={approved}")))
        .header(USER_ID_HEADER, user_id)
        .send()
        .await
        .expect("Failed to send request")
}

/// 사용자 헤더를 실어 GET 요청 전송
async fn get_with_header(app: &TestApp, user_id: i64, path: &str) -> reqwest::Response {
    app.client
        .get(app.url(path))
        .header(USER_ID_HEADER, user_id)
        .send()
        .await
        .expect("Failed to send request")
}

/// 응답 본문의 예약 id 목록
async fn booking_ids(response: reqwest::Response) -> Vec<i64> {
    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = response.json().await.expect("Failed to parse response");
    body.as_array()
        .expect("array body")
        .iter()
        .map(id)
        .collect()
}

/// 물품 수정 요청 전송
async fn patch_item(app: &TestApp, user_id: i64, path: &str, patch: Value) -> reqwest::Response {
    app.client
        .patch(app.url(path))
        .header(USER_ID_HEADER, user_id)
        .json(&patch)
        .send()
        .await
        .expect("Failed to send request")
}

/// 물품 검색
async fn search(app: &TestApp, text: &str) -> Value {
    let response = app
        .client
        .get(app.url("/items/search"))
        .query(&[("text", text)])
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), StatusCode::OK);
    response.json().await.expect("Failed to parse response")
}

/// 댓글 작성 요청 전송
async fn post_comment(app: &TestApp, user_id: i64, item_id: i64, text: &str) -> reqwest::Response {
    app.client
        .post(app.url(&format!("/items/{item_id}/comment")))
        .header(USER_ID_HEADER, user_id)
        .json(&json!({ "text": text }))
        .send()
        .await
        .expect("Failed to send request")
}

/// 공유 요청 등록
async fn create_request(app: &TestApp, user_id: i64, description: &str) -> Value {
    let response = app
        .client
        .post(app.url("/requests"))
        .header(USER_ID_HEADER, user_id)
        .json(&json!({ "description": description }))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), StatusCode::OK);
    response.json().await.expect("Failed to parse response")
}

// endregion: --- Helpers
