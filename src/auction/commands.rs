/// 경매 등록자 커맨드 처리
/// 1. 상품 등록
/// 2. 상품 수정 (본인 상품만, 종료된 상품은 다시 열 수 없음)
/// 3. 프로필 수정
// region:    --- Imports
use crate::auction::lifecycle::{
    self, assign_unique_slug, fits_amount_column, round_amount, OTHER_CATEGORY_SLUG,
};
use crate::auction::model::{File, Listing};
use crate::auth::model::User;
use crate::error::AppError;
use crate::store::{SlugScope, Store};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Deserialize;
use tracing::info;
use uuid::Uuid;
use validator::{Validate, ValidationError};

// endregion: --- Imports

// region:    --- Commands
pub const ALLOWED_FILE_TYPES: [&str; 7] = [
    "image/bmp",
    "image/gif",
    "image/jpeg",
    "image/png",
    "image/tiff",
    "image/webp",
    "image/svg+xml",
];

fn default_category() -> String {
    OTHER_CATEGORY_SLUG.to_string()
}

fn price_amount(amount: &Decimal) -> Result<(), ValidationError> {
    if *amount <= Decimal::ZERO {
        return Err(ValidationError::new("positive").with_message("Must be greater than 0".into()));
    }
    if !fits_amount_column(*amount) {
        let message = "Must be less than 100000000";
        return Err(ValidationError::new("range").with_message(message.into()));
    }
    Ok(())
}

/// 상품 등록 명령
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateListingCommand {
    #[validate(length(min = 1, max = 70, message = "Must be between 1 and 70 characters"))]
    pub name: String,
    pub desc: String,
    #[serde(default = "default_category")]
    pub category: String,
    #[validate(custom(function = "price_amount"))]
    pub price: Decimal,
    pub closing_date: DateTime<Utc>,
    pub file_type: String,
}

/// 상품 수정 명령 (없는 필드는 유지)
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct UpdateListingCommand {
    #[validate(length(min = 1, max = 70, message = "Must be between 1 and 70 characters"))]
    pub name: Option<String>,
    pub desc: Option<String>,
    pub category: Option<String>,
    #[validate(custom(function = "price_amount"))]
    pub price: Option<Decimal>,
    pub closing_date: Option<DateTime<Utc>>,
    pub active: Option<bool>,
    pub file_type: Option<String>,
}

/// 프로필 수정 명령
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct UpdateProfileCommand {
    #[validate(length(min = 1, max = 50, message = "Must be between 1 and 50 characters"))]
    pub first_name: String,
    #[validate(length(min = 1, max = 50, message = "Must be between 1 and 50 characters"))]
    pub last_name: String,
    pub file_type: Option<String>,
}

fn check_file_type(file_type: &str) -> Result<(), AppError> {
    if ALLOWED_FILE_TYPES.contains(&file_type) {
        Ok(())
    } else {
        Err(AppError::invalid_field("file_type", "Invalid file type!"))
    }
}

fn check_closing_date(closing_date: DateTime<Utc>, now: DateTime<Utc>) -> Result<(), AppError> {
    if closing_date > now {
        Ok(())
    } else {
        Err(AppError::invalid_field(
            "closing_date",
            "Closing date must be in the future",
        ))
    }
}

/// 상품 조회 후 소유자 확인
pub async fn owned_listing(
    store: &dyn Store,
    slug: &str,
    owner: &User,
) -> Result<Listing, AppError> {
    let listing = store
        .find_listing_by_slug(slug)
        .await?
        .ok_or_else(|| AppError::NotFound("Invalid listing!".to_string()))?;
    if listing.auctioneer_id != owner.id {
        return Err(AppError::Forbidden(
            "This listing doesn't belong to you!".to_string(),
        ));
    }
    Ok(listing)
}

/// 1. 상품 등록
pub async fn handle_create_listing(
    store: &dyn Store,
    auctioneer: &User,
    cmd: CreateListingCommand,
    now: DateTime<Utc>,
) -> Result<Listing, AppError> {
    info!("{:<12} --> 상품 등록 요청: {}", "Command", cmd.name);
    cmd.validate()?;
    check_closing_date(cmd.closing_date, now)?;
    let category = lifecycle::resolve_category(store, &cmd.category).await?;
    check_file_type(&cmd.file_type)?;

    let image = File {
        id: Uuid::new_v4(),
        resource_type: cmd.file_type,
    };
    store.insert_file(&image).await?;

    let listing = Listing {
        id: Uuid::new_v4(),
        auctioneer_id: auctioneer.id,
        slug: assign_unique_slug(store, SlugScope::Listing, &cmd.name, None).await?,
        name: cmd.name,
        description: cmd.desc,
        category_id: category.map(|c| c.id),
        price: round_amount(cmd.price),
        closing_date: cmd.closing_date,
        active: true,
        image_id: image.id,
        created_at: now,
        updated_at: now,
    };
    store.insert_listing(&listing).await?;
    info!("{:<12} --> 상품 등록 완료: {}", "Command", listing.slug);
    Ok(listing)
}

/// 2. 상품 수정
pub async fn handle_update_listing(
    store: &dyn Store,
    auctioneer: &User,
    slug: &str,
    cmd: UpdateListingCommand,
    now: DateTime<Utc>,
) -> Result<Listing, AppError> {
    info!("{:<12} --> 상품 수정 요청: {}", "Command", slug);
    let mut listing = owned_listing(store, slug, auctioneer).await?;
    cmd.validate()?;

    let state = lifecycle::current_state(store, &listing, now).await?;
    if state.is_closed() && (cmd.active == Some(true) || cmd.closing_date.is_some()) {
        return Err(AppError::Gone("This auction is closed!".to_string()));
    }

    if let Some(closing_date) = cmd.closing_date {
        check_closing_date(closing_date, now)?;
        listing.closing_date = closing_date;
    }
    if let Some(category) = cmd.category.as_deref() {
        listing.category_id = lifecycle::resolve_category(store, category)
            .await?
            .map(|c| c.id);
    }
    if let Some(file_type) = cmd.file_type {
        check_file_type(&file_type)?;
        store
            .update_file(&File {
                id: listing.image_id,
                resource_type: file_type,
            })
            .await?;
    }
    if let Some(name) = cmd.name {
        if name != listing.name {
            listing.slug =
                assign_unique_slug(store, SlugScope::Listing, &name, Some(listing.id)).await?;
            listing.name = name;
        }
    }
    if let Some(desc) = cmd.desc {
        listing.description = desc;
    }
    if let Some(price) = cmd.price {
        listing.price = round_amount(price);
    }
    if let Some(active) = cmd.active {
        listing.active = active;
    }
    listing.updated_at = now;

    store.update_listing(&listing).await?;
    info!("{:<12} --> 상품 수정 완료: {}", "Command", listing.slug);
    Ok(listing)
}

/// 3. 프로필 수정 (아바타 파일 타입이 있으면 파일 생성 또는 갱신)
pub async fn handle_update_profile(
    store: &dyn Store,
    user: &User,
    cmd: UpdateProfileCommand,
    now: DateTime<Utc>,
) -> Result<User, AppError> {
    cmd.validate()?;
    let mut user = user.clone();

    if let Some(file_type) = cmd.file_type {
        check_file_type(&file_type)?;
        let avatar = File {
            id: user.avatar_id.unwrap_or_else(Uuid::new_v4),
            resource_type: file_type,
        };
        match user.avatar_id {
            Some(_) => store.update_file(&avatar).await?,
            None => store.insert_file(&avatar).await?,
        }
        user.avatar_id = Some(avatar.id);
    }
    user.first_name = cmd.first_name;
    user.last_name = cmd.last_name;
    user.updated_at = now;

    store.update_user(&user).await?;
    info!("{:<12} --> 프로필 수정: {}", "Command", user.id);
    Ok(user)
}
// endregion: --- Commands
