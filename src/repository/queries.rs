// region:    --- User Queries

/// 사용자 등록
pub const INSERT_USER: &str =
    "INSERT INTO users (email, name) VALUES ($1, $2) RETURNING id, email, name";

/// 사용자 수정
pub const UPDATE_USER: &str =
    "UPDATE users SET email = $2, name = $3 WHERE id = $1 RETURNING id, email, name";

/// 사용자 조회
pub const GET_USER: &str = "SELECT id, email, name FROM users WHERE id = $1";

/// 이메일로 사용자 조회
pub const GET_USER_BY_EMAIL: &str = "SELECT id, email, name FROM users WHERE email = $1";

/// 사용자 삭제
pub const DELETE_USER: &str = "DELETE FROM users WHERE id = $1";

// endregion: --- User Queries

// region:    --- Item Queries

/// 물품 등록
pub const INSERT_ITEM: &str = r#"
    INSERT INTO items (name, description, available, owner_id, request_id)
    VALUES ($1, $2, $3, $4, $5)
    RETURNING id, name, description, available, owner_id, request_id
"#;

/// 물품 수정
pub const UPDATE_ITEM: &str = r#"
    UPDATE items
    SET name = $2, description = $3, available = $4
    WHERE id = $1
    RETURNING id, name, description, available, owner_id, request_id
"#;

/// 물품 조회
pub const GET_ITEM: &str =
    "SELECT id, name, description, available, owner_id, request_id FROM items WHERE id = $1";

/// 소유자의 물품 목록 조회
pub const GET_ITEMS_BY_OWNER: &str =
    "SELECT id, name, description, available, owner_id, request_id FROM items WHERE owner_id = $1 ORDER BY id";

/// 가용 물품 검색(이름/설명 부분 일치, 대소문자 무시)
pub const SEARCH_ITEMS: &str = r#"
    SELECT id, name, description, available, owner_id, request_id
    FROM items
    WHERE available = TRUE
      AND (name ILIKE '%' || $1 || '%' OR description ILIKE '%' || $1 || '%')
    ORDER BY id
"#;

/// 공유 요청에 연결된 물품 조회
pub const GET_ITEMS_BY_REQUEST: &str =
    "SELECT id, name, description, available, owner_id, request_id FROM items WHERE request_id = $1 ORDER BY id";

/// 여러 공유 요청에 연결된 물품 일괄 조회
pub const GET_ITEMS_BY_REQUESTS: &str =
    "SELECT id, name, description, available, owner_id, request_id FROM items WHERE request_id = ANY($1) ORDER BY id";

// endregion: --- Item Queries

// region:    --- Booking Queries

/// 예약 저장. 물품 가용성을 같은 문장에서 재확인하고, 통과하지 못하면 행이 없다.
pub const INSERT_BOOKING: &str = r#"
    INSERT INTO bookings (start_date, end_date, item_id, booker_id, status)
    SELECT $1, $2, $3, $4, $5
    WHERE EXISTS (SELECT 1 FROM items WHERE id = $3 AND available = TRUE)
    RETURNING id
"#;

/// 예약 상태 변경
pub const UPDATE_BOOKING_STATUS: &str = "UPDATE bookings SET status = $2 WHERE id = $1";

/// 예약 조회(물품/예약자 포함)
pub const GET_BOOKING: &str = r#"
    SELECT b.id, b.start_date, b.end_date, b.status,
           i.id AS item_id, i.name AS item_name, i.description AS item_description,
           i.available AS item_available, i.owner_id AS item_owner_id, i.request_id AS item_request_id,
           u.id AS booker_id, u.email AS booker_email, u.name AS booker_name
    FROM bookings b
    JOIN items i ON i.id = b.item_id
    JOIN users u ON u.id = b.booker_id
    WHERE b.id = $1
"#;

/// 예약자의 예약 목록
pub const BOOKINGS_BY_BOOKER: &str = r#"
    SELECT b.id, b.start_date, b.end_date, b.status,
           i.id AS item_id, i.name AS item_name, i.description AS item_description,
           i.available AS item_available, i.owner_id AS item_owner_id, i.request_id AS item_request_id,
           u.id AS booker_id, u.email AS booker_email, u.name AS booker_name
    FROM bookings b
    JOIN items i ON i.id = b.item_id
    JOIN users u ON u.id = b.booker_id
    WHERE b.booker_id = $1
    ORDER BY b.start_date DESC, b.id
"#;

/// 예약자의 상태별 예약 목록
pub const BOOKINGS_BY_BOOKER_AND_STATUS: &str = r#"
    SELECT b.id, b.start_date, b.end_date, b.status,
           i.id AS item_id, i.name AS item_name, i.description AS item_description,
           i.available AS item_available, i.owner_id AS item_owner_id, i.request_id AS item_request_id,
           u.id AS booker_id, u.email AS booker_email, u.name AS booker_name
    FROM bookings b
    JOIN items i ON i.id = b.item_id
    JOIN users u ON u.id = b.booker_id
    WHERE b.booker_id = $1 AND b.status = $2
    ORDER BY b.start_date DESC, b.id
"#;

/// 예약자의 종료된 예약 목록
pub const BOOKINGS_BY_BOOKER_END_BEFORE: &str = r#"
    SELECT b.id, b.start_date, b.end_date, b.status,
           i.id AS item_id, i.name AS item_name, i.description AS item_description,
           i.available AS item_available, i.owner_id AS item_owner_id, i.request_id AS item_request_id,
           u.id AS booker_id, u.email AS booker_email, u.name AS booker_name
    FROM bookings b
    JOIN items i ON i.id = b.item_id
    JOIN users u ON u.id = b.booker_id
    WHERE b.booker_id = $1 AND b.end_date < $2
    ORDER BY b.start_date DESC, b.id
"#;

/// 예약자의 시작 전 예약 목록
pub const BOOKINGS_BY_BOOKER_START_AFTER: &str = r#"
    SELECT b.id, b.start_date, b.end_date, b.status,
           i.id AS item_id, i.name AS item_name, i.description AS item_description,
           i.available AS item_available, i.owner_id AS item_owner_id, i.request_id AS item_request_id,
           u.id AS booker_id, u.email AS booker_email, u.name AS booker_name
    FROM bookings b
    JOIN items i ON i.id = b.item_id
    JOIN users u ON u.id = b.booker_id
    WHERE b.booker_id = $1 AND b.start_date > $2
    ORDER BY b.start_date DESC, b.id
"#;

/// 소유자 물품에 걸린 예약 목록
pub const BOOKINGS_BY_OWNER: &str = r#"
    SELECT b.id, b.start_date, b.end_date, b.status,
           i.id AS item_id, i.name AS item_name, i.description AS item_description,
           i.available AS item_available, i.owner_id AS item_owner_id, i.request_id AS item_request_id,
           u.id AS booker_id, u.email AS booker_email, u.name AS booker_name
    FROM bookings b
    JOIN items i ON i.id = b.item_id
    JOIN users u ON u.id = b.booker_id
    WHERE i.owner_id = $1
    ORDER BY b.start_date DESC, b.id
"#;

/// 소유자 물품의 상태별 예약 목록
pub const BOOKINGS_BY_OWNER_AND_STATUS: &str = r#"
    SELECT b.id, b.start_date, b.end_date, b.status,
           i.id AS item_id, i.name AS item_name, i.description AS item_description,
           i.available AS item_available, i.owner_id AS item_owner_id, i.request_id AS item_request_id,
           u.id AS booker_id, u.email AS booker_email, u.name AS booker_name
    FROM bookings b
    JOIN items i ON i.id = b.item_id
    JOIN users u ON u.id = b.booker_id
    WHERE i.owner_id = $1 AND b.status = $2
    ORDER BY b.start_date DESC, b.id
"#;

/// 소유자 물품의 종료된 예약 목록
pub const BOOKINGS_BY_OWNER_END_BEFORE: &str = r#"
    SELECT b.id, b.start_date, b.end_date, b.status,
           i.id AS item_id, i.name AS item_name, i.description AS item_description,
           i.available AS item_available, i.owner_id AS item_owner_id, i.request_id AS item_request_id,
           u.id AS booker_id, u.email AS booker_email, u.name AS booker_name
    FROM bookings b
    JOIN items i ON i.id = b.item_id
    JOIN users u ON u.id = b.booker_id
    WHERE i.owner_id = $1 AND b.end_date < $2
    ORDER BY b.start_date DESC, b.id
"#;

/// 소유자 물품의 시작 전 예약 목록
pub const BOOKINGS_BY_OWNER_START_AFTER: &str = r#"
    SELECT b.id, b.start_date, b.end_date, b.status,
           i.id AS item_id, i.name AS item_name, i.description AS item_description,
           i.available AS item_available, i.owner_id AS item_owner_id, i.request_id AS item_request_id,
           u.id AS booker_id, u.email AS booker_email, u.name AS booker_name
    FROM bookings b
    JOIN items i ON i.id = b.item_id
    JOIN users u ON u.id = b.booker_id
    WHERE i.owner_id = $1 AND b.start_date > $2
    ORDER BY b.start_date DESC, b.id
"#;

/// 물품에 걸린 예약 전체(마지막/다음 예약 계산용)
pub const BOOKINGS_BY_ITEM: &str = r#"
    SELECT b.id, b.start_date, b.end_date, b.status,
           i.id AS item_id, i.name AS item_name, i.description AS item_description,
           i.available AS item_available, i.owner_id AS item_owner_id, i.request_id AS item_request_id,
           u.id AS booker_id, u.email AS booker_email, u.name AS booker_name
    FROM bookings b
    JOIN items i ON i.id = b.item_id
    JOIN users u ON u.id = b.booker_id
    WHERE b.item_id = $1
    ORDER BY b.id
"#;

/// 예약자가 특정 물품에서 이미 마친 예약(댓글 자격 판정용)
pub const BOOKINGS_BY_BOOKER_AND_ITEM: &str = r#"
    SELECT b.id, b.start_date, b.end_date, b.status,
           i.id AS item_id, i.name AS item_name, i.description AS item_description,
           i.available AS item_available, i.owner_id AS item_owner_id, i.request_id AS item_request_id,
           u.id AS booker_id, u.email AS booker_email, u.name AS booker_name
    FROM bookings b
    JOIN items i ON i.id = b.item_id
    JOIN users u ON u.id = b.booker_id
    WHERE b.booker_id = $1 AND b.item_id = $2 AND b.status = $3 AND b.end_date < $4
    ORDER BY b.id
"#;

// endregion: --- Booking Queries

// region:    --- Comment Queries

/// 댓글 저장
pub const INSERT_COMMENT: &str =
    "INSERT INTO comments (text, item_id, author_id, created) VALUES ($1, $2, $3, $4) RETURNING id";

/// 댓글 조회(작성자 이름 포함)
pub const GET_COMMENT: &str = r#"
    SELECT c.id, c.text, c.item_id, u.name AS author_name, c.created
    FROM comments c
    JOIN users u ON u.id = c.author_id
    WHERE c.id = $1
"#;

/// 물품의 댓글 목록(작성 시각 오름차순)
pub const COMMENTS_BY_ITEM: &str = r#"
    SELECT c.id, c.text, c.item_id, u.name AS author_name, c.created
    FROM comments c
    JOIN users u ON u.id = c.author_id
    WHERE c.item_id = $1
    ORDER BY c.created, c.id
"#;

// endregion: --- Comment Queries

// region:    --- Request Queries

/// 공유 요청 등록
pub const INSERT_REQUEST: &str = r#"
    INSERT INTO requests (description, requestor_id, created)
    VALUES ($1, $2, $3)
    RETURNING id, description, requestor_id, created
"#;

/// 공유 요청 조회
pub const GET_REQUEST: &str =
    "SELECT id, description, requestor_id, created FROM requests WHERE id = $1";

/// 본인이 올린 공유 요청 목록(최신순)
pub const REQUESTS_BY_REQUESTOR: &str =
    "SELECT id, description, requestor_id, created FROM requests WHERE requestor_id = $1 ORDER BY created DESC, id";

/// 다른 사용자가 올린 공유 요청 목록(최신순)
pub const REQUESTS_BY_OTHERS: &str =
    "SELECT id, description, requestor_id, created FROM requests WHERE requestor_id <> $1 ORDER BY created DESC, id";

// endregion: --- Request Queries
