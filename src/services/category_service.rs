use sea_orm::ActiveValue::NotSet;
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, QueryOrder, Set};
use uuid::Uuid;

use crate::{
    audit,
    dto::categories::{CategoryList, CreateCategoryRequest, UpdateCategoryRequest},
    entity::categories::{ActiveModel, Column, Entity as Categories, Model as CategoryModel},
    error::{AppError, AppResult},
    middleware::auth::{AuthUser, ensure_staff},
    models::Category,
    response::{ApiResponse, Meta},
    state::AppState,
    validation,
};

pub async fn list_categories(state: &AppState) -> AppResult<ApiResponse<CategoryList>> {
    let items: Vec<Category> = Categories::find()
        .order_by_asc(Column::Name)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(Category::from)
        .collect();
    let meta = Meta::total(items.len());
    Ok(ApiResponse::success("Categories", CategoryList { items }, Some(meta)))
}

/// Look a category up by id or by slug.
pub async fn find_category(state: &AppState, key: &str) -> AppResult<Option<CategoryModel>> {
    let found = match Uuid::parse_str(key) {
        Ok(id) => Categories::find_by_id(id).one(&state.orm).await?,
        Err(_) => {
            Categories::find()
                .filter(Column::Slug.eq(key.to_lowercase()))
                .one(&state.orm)
                .await?
        }
    };
    Ok(found)
}

pub async fn get_category(state: &AppState, key: &str) -> AppResult<ApiResponse<Category>> {
    let category = find_category(state, key).await?.ok_or(AppError::NotFound)?;
    Ok(ApiResponse::success("Category", Category::from(category), None))
}

fn clean_slug(raw: Option<&str>, name: &str) -> AppResult<String> {
    let slug = validation::slugify(raw.filter(|s| !s.trim().is_empty()).unwrap_or(name));
    if slug.is_empty() {
        return Err(AppError::BadRequest("slug must contain letters or digits".into()));
    }
    Ok(slug)
}

async fn ensure_unique(
    state: &AppState,
    name: &str,
    slug: &str,
    except: Option<Uuid>,
) -> AppResult<()> {
    let mut finder = Categories::find().filter(
        sea_orm::Condition::any()
            .add(Column::Name.eq(name))
            .add(Column::Slug.eq(slug)),
    );
    if let Some(id) = except {
        finder = finder.filter(Column::Id.ne(id));
    }
    if finder.one(&state.orm).await?.is_some() {
        return Err(AppError::Conflict("Category name or slug already exists".into()));
    }
    Ok(())
}

pub async fn create_category(
    state: &AppState,
    user: &AuthUser,
    payload: CreateCategoryRequest,
) -> AppResult<ApiResponse<Category>> {
    ensure_staff(user)?;
    let name = validation::ensure_present("name", &payload.name)?;
    let slug = clean_slug(payload.slug.as_deref(), &name)?;
    ensure_unique(state, &name, &slug, None).await?;

    let category = ActiveModel {
        id: Set(Uuid::new_v4()),
        name: Set(name),
        slug: Set(slug),
        description: Set(payload.description),
        image_url: Set(payload.image_url),
        created_at: NotSet,
    }
    .insert(&state.orm)
    .await?;

    audit::record(
        &state.pool,
        user.user_id,
        "category_create",
        "categories",
        serde_json::json!({ "category_id": category.id }),
    )
    .await;

    Ok(ApiResponse::success(
        "Category created",
        Category::from(category),
        Some(Meta::empty()),
    ))
}

pub async fn update_category(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
    payload: UpdateCategoryRequest,
) -> AppResult<ApiResponse<Category>> {
    ensure_staff(user)?;
    let existing = Categories::find_by_id(id)
        .one(&state.orm)
        .await?
        .ok_or(AppError::NotFound)?;

    let name = match payload.name {
        Some(name) => validation::ensure_present("name", &name)?,
        None => existing.name.clone(),
    };
    let slug = match payload.slug {
        Some(slug) => clean_slug(Some(&slug), &name)?,
        None => existing.slug.clone(),
    };
    ensure_unique(state, &name, &slug, Some(id)).await?;

    let mut active: ActiveModel = existing.into();
    active.name = Set(name);
    active.slug = Set(slug);
    if let Some(description) = payload.description {
        active.description = Set(Some(description));
    }
    if let Some(image_url) = payload.image_url {
        active.image_url = Set(Some(image_url));
    }
    let category = active.update(&state.orm).await?;

    audit::record(
        &state.pool,
        user.user_id,
        "category_update",
        "categories",
        serde_json::json!({ "category_id": category.id }),
    )
    .await;

    Ok(ApiResponse::success(
        "Updated",
        Category::from(category),
        Some(Meta::empty()),
    ))
}

pub async fn delete_category(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
) -> AppResult<ApiResponse<serde_json::Value>> {
    ensure_staff(user)?;
    let result = Categories::delete_by_id(id).exec(&state.orm).await?;
    if result.rows_affected == 0 {
        return Err(AppError::NotFound);
    }

    audit::record(
        &state.pool,
        user.user_id,
        "category_delete",
        "categories",
        serde_json::json!({ "category_id": id }),
    )
    .await;

    Ok(ApiResponse::done("Deleted"))
}
