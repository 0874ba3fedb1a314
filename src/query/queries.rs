// region:    --- Users
pub const INSERT_USER: &str = r#"
    INSERT INTO users (id, first_name, last_name, email, password_hash, is_email_verified,
                       is_superuser, is_staff, avatar_id, created_at, updated_at)
    VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
"#;

pub const UPDATE_USER: &str = r#"
    UPDATE users
    SET first_name = $2, last_name = $3, email = $4, password_hash = $5,
        is_email_verified = $6, is_superuser = $7, is_staff = $8, avatar_id = $9, updated_at = $10
    WHERE id = $1
"#;

pub const GET_USER: &str = "SELECT * FROM users WHERE id = $1";

pub const GET_USER_BY_EMAIL: &str = "SELECT * FROM users WHERE email = $1";
// endregion: --- Users

// region:    --- Tokens
/// 사용자의 토큰 쌍 생성 또는 교체
pub const UPSERT_TOKEN_PAIR: &str = r#"
    INSERT INTO jwts (user_id, access, refresh, updated_at)
    VALUES ($1, $2, $3, NOW())
    ON CONFLICT (user_id) DO UPDATE
    SET access = EXCLUDED.access, refresh = EXCLUDED.refresh, updated_at = NOW()
"#;

pub const GET_TOKEN_PAIR_BY_REFRESH: &str =
    "SELECT user_id, access, refresh FROM jwts WHERE refresh = $1";

/// 저장된 refresh 값이 일치할 때만 교체
pub const SWAP_TOKEN_PAIR: &str = r#"
    UPDATE jwts SET access = $3, refresh = $4, updated_at = NOW()
    WHERE user_id = $1 AND refresh = $2
"#;

pub const GET_USER_BY_ACCESS: &str = r#"
    SELECT u.* FROM users u
    JOIN jwts j ON j.user_id = u.id
    WHERE u.id = $1 AND j.access = $2
"#;

pub const DELETE_TOKEN_PAIR: &str = "DELETE FROM jwts WHERE user_id = $1";
// endregion: --- Tokens

// region:    --- Otps
pub const UPSERT_OTP: &str = r#"
    INSERT INTO otps (user_id, code, issued_at) VALUES ($1, $2, $3)
    ON CONFLICT (user_id) DO UPDATE SET code = EXCLUDED.code, issued_at = EXCLUDED.issued_at
"#;

pub const GET_OTP: &str = "SELECT user_id, code, issued_at FROM otps WHERE user_id = $1";

pub const DELETE_OTP: &str = "DELETE FROM otps WHERE user_id = $1";
// endregion: --- Otps

// region:    --- Files & Categories
pub const UPSERT_FILE: &str = r#"
    INSERT INTO files (id, resource_type) VALUES ($1, $2)
    ON CONFLICT (id) DO UPDATE SET resource_type = EXCLUDED.resource_type
"#;

pub const GET_FILE: &str = "SELECT id, resource_type FROM files WHERE id = $1";

pub const INSERT_CATEGORY: &str = "INSERT INTO categories (id, name, slug) VALUES ($1, $2, $3)";

pub const GET_ALL_CATEGORIES: &str = "SELECT id, name, slug FROM categories ORDER BY name";

pub const GET_CATEGORY: &str = "SELECT id, name, slug FROM categories WHERE id = $1";

pub const GET_CATEGORY_BY_SLUG: &str = "SELECT id, name, slug FROM categories WHERE slug = $1";

pub const GET_CATEGORY_SLUG_OWNER: &str = "SELECT id FROM categories WHERE slug = $1";
// endregion: --- Files & Categories

// region:    --- Listings
pub const INSERT_LISTING: &str = r#"
    INSERT INTO listings (id, auctioneer_id, name, slug, description, category_id, price,
                          closing_date, active, image_id, created_at, updated_at)
    VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
"#;

pub const UPDATE_LISTING: &str = r#"
    UPDATE listings
    SET name = $2, slug = $3, description = $4, category_id = $5, price = $6,
        closing_date = $7, active = $8, image_id = $9, updated_at = $10
    WHERE id = $1
"#;

pub const GET_LISTING: &str = "SELECT * FROM listings WHERE id = $1";

pub const GET_LISTING_BY_SLUG: &str = "SELECT * FROM listings WHERE slug = $1";

pub const GET_LISTING_SLUG_OWNER: &str = "SELECT id FROM listings WHERE slug = $1";

pub const GET_ALL_LISTINGS: &str = "SELECT * FROM listings ORDER BY created_at DESC";

pub const GET_AUCTIONEER_LISTINGS: &str =
    "SELECT * FROM listings WHERE auctioneer_id = $1 ORDER BY created_at DESC";

/// $1 이 NULL이면 카테고리 없는 상품
pub const GET_CATEGORY_LISTINGS: &str =
    "SELECT * FROM listings WHERE category_id IS NOT DISTINCT FROM $1 ORDER BY created_at DESC";

pub const GET_RELATED_LISTINGS: &str = r#"
    SELECT * FROM listings
    WHERE category_id IS NOT DISTINCT FROM $1 AND id <> $2
    ORDER BY created_at DESC
"#;

/// 마감 시각이 지난 활성 상품 종료
pub const CLOSE_EXPIRED_LISTINGS: &str =
    "UPDATE listings SET active = FALSE, updated_at = $1 WHERE active AND closing_date <= $1";

/// 입찰 직렬화를 위한 상품 행 잠금
pub const LOCK_LISTING: &str = "SELECT id FROM listings WHERE id = $1 FOR UPDATE";
// endregion: --- Listings

// region:    --- Bids
pub const GET_BID_SUMMARY: &str = r#"
    SELECT COALESCE(MAX(amount), 0) AS highest, COUNT(*) AS count
    FROM bids WHERE listing_id = $1
"#;

pub const GET_HIGHEST_BID: &str =
    "SELECT COALESCE(MAX(amount), 0) FROM bids WHERE listing_id = $1";

pub const GET_LATEST_BIDS: &str = r#"
    SELECT id, user_id, listing_id, amount, created_at, updated_at
    FROM bids
    WHERE listing_id = $1
    ORDER BY updated_at DESC, amount DESC
    LIMIT $2
"#;

/// 입찰자당 1행: 재입찰 시 금액 덮어쓰기
pub const UPSERT_BID: &str = r#"
    INSERT INTO bids (id, user_id, listing_id, amount, created_at, updated_at)
    VALUES ($1, $2, $3, $4, $5, $5)
    ON CONFLICT (user_id, listing_id) DO UPDATE
    SET amount = EXCLUDED.amount, updated_at = EXCLUDED.updated_at
    RETURNING id, user_id, listing_id, amount, created_at, updated_at
"#;
// endregion: --- Bids

// region:    --- Watchlists
pub const INSERT_GUEST: &str = r#"
    INSERT INTO guest_users (id, created_at) VALUES ($1, $2)
    ON CONFLICT (id) DO NOTHING
"#;

pub const GET_GUEST: &str = "SELECT id, created_at FROM guest_users WHERE id = $1";

pub const GET_WATCH: &str = r#"
    SELECT id FROM watchlists
    WHERE listing_id = $1 AND user_id IS NOT DISTINCT FROM $2
      AND guest_user_id IS NOT DISTINCT FROM $3
"#;

pub const INSERT_WATCH: &str = r#"
    INSERT INTO watchlists (id, listing_id, user_id, guest_user_id, created_at)
    VALUES ($1, $2, $3, $4, $5)
    ON CONFLICT DO NOTHING
"#;

pub const DELETE_WATCH: &str = "DELETE FROM watchlists WHERE id = $1";

pub const GET_WATCHED_LISTINGS: &str = r#"
    SELECT l.* FROM listings l
    JOIN watchlists w ON w.listing_id = l.id
    WHERE w.user_id IS NOT DISTINCT FROM $1 AND w.guest_user_id IS NOT DISTINCT FROM $2
    ORDER BY w.created_at DESC
"#;

/// 게스트 관심 목록을 사용자 소유로 복사 (이미 있으면 무시)
pub const COPY_GUEST_WATCHLIST: &str = r#"
    INSERT INTO watchlists (id, listing_id, user_id, guest_user_id, created_at)
    SELECT gen_random_uuid(), listing_id, $2, NULL, created_at
    FROM watchlists WHERE guest_user_id = $1
    ON CONFLICT (user_id, listing_id) DO NOTHING
"#;

/// 게스트 삭제 (관심 목록은 CASCADE)
pub const DELETE_GUEST: &str = "DELETE FROM guest_users WHERE id = $1";
// endregion: --- Watchlists

// region:    --- General
/// 사이트 정보는 id = 1 단일 행
pub const INSERT_SITE_DETAIL: &str = r#"
    INSERT INTO site_details (id, name, email, phone, address, fb, tw, wh, ig)
    VALUES (1, $1, $2, $3, $4, $5, $6, $7, $8)
    ON CONFLICT (id) DO NOTHING
"#;

pub const GET_SITE_DETAIL: &str =
    "SELECT name, email, phone, address, fb, tw, wh, ig FROM site_details WHERE id = 1";

pub const INSERT_SUBSCRIBER: &str = r#"
    INSERT INTO subscribers (id, email, exported, created_at) VALUES ($1, $2, $3, $4)
    ON CONFLICT (email) DO NOTHING
"#;

pub const INSERT_REVIEW: &str = r#"
    INSERT INTO reviews (id, reviewer_id, shown, text, created_at) VALUES ($1, $2, $3, $4, $5)
"#;

pub const COUNT_REVIEWS: &str = "SELECT COUNT(*) FROM reviews";

pub const GET_SHOWN_REVIEWS: &str = r#"
    SELECT id, reviewer_id, shown, text, created_at FROM reviews
    WHERE shown ORDER BY created_at DESC
"#;
// endregion: --- General
