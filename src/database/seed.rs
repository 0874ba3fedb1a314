/// 초기 데이터 (관리자, 테스트 등록자, 후기 작성자, 기본 카테고리, 후기)
/// 이미 있으면 건너뛴다.
// region:    --- Imports
use crate::auction::lifecycle::assign_unique_slug;
use crate::auction::model::Category;
use crate::auth::model::User;
use crate::auth::password::Passwords;
use crate::error::AppError;
use crate::general::model::Review;
use crate::store::{SlugScope, Store};
use chrono::Utc;
use tracing::info;
use uuid::Uuid;

// endregion: --- Imports

// region:    --- Seed
pub const CATEGORIES: [&str; 8] = [
    "Technology",
    "Fashion",
    "Sports",
    "Cosmetics",
    "Books",
    "Furniture",
    "Vehicles",
    "Art",
];

struct SeedUser {
    first_name: &'static str,
    last_name: &'static str,
    email: &'static str,
    password: &'static str,
    is_superuser: bool,
}

pub const REVIEWER_EMAIL: &str = "testreviewer@email.com";

const REVIEW_TEXT: &str = "Maecenas vitae porttitor neque, ac porttitor nunc. Duis venenatis \
    lacinia libero. Nam nec augue ut nunc vulputate tincidunt at suscipit nunc.";

const USERS: [SeedUser; 3] = [
    SeedUser {
        first_name: "Test",
        last_name: "Admin",
        email: "testadmin@email.com",
        password: "testadmin",
        is_superuser: true,
    },
    SeedUser {
        first_name: "Test",
        last_name: "Auctioneer",
        email: "testauctioneer@email.com",
        password: "testauctioneer",
        is_superuser: false,
    },
    SeedUser {
        first_name: "Test",
        last_name: "Reviewer",
        email: REVIEWER_EMAIL,
        password: "testreviewer",
        is_superuser: false,
    },
];

pub async fn seed_initial_data(store: &dyn Store, passwords: &Passwords) -> Result<(), AppError> {
    let now = Utc::now();
    for seed in &USERS {
        if store.find_user_by_email(seed.email).await?.is_some() {
            continue;
        }
        store
            .insert_user(&User {
                id: Uuid::new_v4(),
                first_name: seed.first_name.to_string(),
                last_name: seed.last_name.to_string(),
                email: seed.email.to_string(),
                password_hash: passwords.hash(seed.password)?,
                is_email_verified: true,
                is_superuser: seed.is_superuser,
                is_staff: seed.is_superuser,
                avatar_id: None,
                created_at: now,
                updated_at: now,
            })
            .await?;
        info!("{:<12} --> 초기 사용자 생성: {}", "Seed", seed.email);
    }

    let existing = store.list_categories().await?;
    for name in CATEGORIES {
        if existing.iter().any(|c| c.name == name) {
            continue;
        }
        let category = Category {
            id: Uuid::new_v4(),
            name: name.to_string(),
            slug: assign_unique_slug(store, SlugScope::Category, name, None).await?,
        };
        store.insert_category(&category).await?;
    }

    if store.count_reviews().await? == 0 {
        let reviewer = store
            .find_user_by_email(REVIEWER_EMAIL)
            .await?
            .ok_or_else(|| AppError::Internal("후기 작성자 없음".to_string()))?;
        for _ in 0..3 {
            store
                .insert_review(&Review {
                    id: Uuid::new_v4(),
                    reviewer_id: reviewer.id,
                    shown: true,
                    text: REVIEW_TEXT.to_string(),
                    created_at: now,
                })
                .await?;
        }
        info!("{:<12} --> 초기 후기 생성", "Seed");
    }
    info!("{:<12} --> 초기 데이터 준비 완료", "Seed");
    Ok(())
}
// endregion: --- Seed
