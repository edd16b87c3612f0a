mod common;

use furniture_store_api::{
    dto::{
        categories::{CreateCategoryRequest, UpdateCategoryRequest},
        products::{CreateProductRequest, UpdateProductRequest},
        wishlist::AddWishlistRequest,
    },
    entity::sea_orm_active_enums::{Role, UserStatus},
    error::AppError,
    middleware::auth::{MaybeUser, SessionUser},
    pricing::{MAX_PRICE, PriceTier},
    routes::params::{Pagination, ProductQuery},
    services::{cart_service, category_service, product_service, wishlist_service},
};

fn chair(name: &str, category_id: Option<uuid::Uuid>, sale_price: Option<i64>) -> CreateProductRequest {
    CreateProductRequest {
        name: name.into(),
        description: Some("Cane back dining chair".into()),
        category_id,
        price: 8_000,
        sale_price,
        stock: 20,
        badges: vec!["Bestseller".into()],
        image_url: None,
        material: Some("cane".into()),
    }
}

// Staff build the catalog; guests and business buyers browse it at their own prices.
#[tokio::test]
async fn catalog_browsing_and_wishlist_flow() -> anyhow::Result<()> {
    let Some(database_url) = common::database_url() else {
        return Ok(());
    };
    let state = common::setup_state(&database_url).await?;

    let admin = common::create_user(&state, "admin@example.com", Role::Admin, UserStatus::Active).await?;
    let buyer = common::create_user(&state, "buyer@example.com", Role::Business, UserStatus::Active).await?;

    let dining = category_service::create_category(
        &state,
        &admin,
        CreateCategoryRequest {
            name: "Dining Room".into(),
            slug: None,
            description: None,
            image_url: None,
        },
    )
    .await?
    .data
    .unwrap();
    assert_eq!(dining.slug, "dining-room");
    assert!(category_service::get_category(&state, "dining-room").await.is_ok());

    let cane = product_service::create_product(&state, &admin, chair("Cane Chair", Some(dining.id), None))
        .await?
        .data
        .unwrap();
    assert_eq!(cane.badges, vec!["bestseller".to_string()]);
    product_service::create_product(&state, &admin, chair("Rattan Chair", None, Some(7_000))).await?;

    // Names are unique
    assert!(matches!(
        product_service::create_product(&state, &admin, chair("Cane Chair", None, None)).await,
        Err(AppError::Conflict(_))
    ));

    let guest = MaybeUser(None);
    let all = product_service::list_products(&state, &guest, ProductQuery::default())
        .await?
        .data
        .unwrap();
    assert_eq!(all.items.len(), 2);
    assert!(all.items.iter().all(|p| p.price_tier == PriceTier::Retail));

    let in_dining = product_service::list_products(
        &state,
        &guest,
        ProductQuery {
            category: Some("dining-room".into()),
            ..Default::default()
        },
    )
    .await?
    .data
    .unwrap();
    assert_eq!(in_dining.items.len(), 1);
    assert_eq!(in_dining.items[0].product.id, cane.id);

    let on_sale = product_service::list_products(
        &state,
        &guest,
        ProductQuery {
            on_sale: Some(true),
            ..Default::default()
        },
    )
    .await?
    .data
    .unwrap();
    assert_eq!(on_sale.items.len(), 1);
    assert_eq!(on_sale.items[0].effective_price, 7_000);

    // Search terms match literally, wildcards included
    let search = |q: &str| ProductQuery {
        q: Some(q.into()),
        ..Default::default()
    };
    let found = product_service::list_products(&state, &guest, search("RATTAN"))
        .await?
        .data
        .unwrap();
    assert_eq!(found.items.len(), 1);
    for wildcard in ["%", "_", "Ca_e"] {
        let found = product_service::list_products(&state, &guest, search(wildcard))
            .await?
            .data
            .unwrap();
        assert!(found.items.is_empty(), "{wildcard} matched as a wildcard");
    }

    // Prices beyond the ceiling are refused up front
    let err = product_service::create_product(
        &state,
        &admin,
        CreateProductRequest {
            price: MAX_PRICE + 1,
            ..chair("Gilded Throne", None, None)
        },
    )
    .await
    .unwrap_err();
    assert!(matches!(err, AppError::BadRequest(_)));

    let business = MaybeUser(Some(SessionUser {
        user_id: buyer.user_id,
        role: Role::Business,
        status: UserStatus::Active,
    }));
    let priced = product_service::get_product(&state, &business, cane.id)
        .await?
        .data
        .unwrap();
    assert_eq!(priced.price_tier, PriceTier::Business);
    assert_eq!(priced.effective_price, 6_560);

    // Wishlist -> cart at business prices
    wishlist_service::add_to_wishlist(&state, &buyer, AddWishlistRequest { product_id: cane.id }).await?;
    let wishlist = wishlist_service::list_wishlist(&state, &buyer, Pagination::default())
        .await?
        .data
        .unwrap();
    assert_eq!(wishlist.items.len(), 1);

    let moved = wishlist_service::move_to_cart(&state, &buyer, cane.id)
        .await?
        .data
        .unwrap();
    assert_eq!(moved.quantity, 1);
    assert!(matches!(
        wishlist_service::move_to_cart(&state, &buyer, cane.id).await,
        Err(AppError::NotFound)
    ));

    let cart = cart_service::list_cart(&state, &buyer).await?.data.unwrap();
    assert_eq!(cart.price_tier, PriceTier::Business);
    assert_eq!(cart.total, 6_560);

    // Staff edit products field by field
    let renamed = product_service::update_product(
        &state,
        &admin,
        cane.id,
        UpdateProductRequest {
            name: Some("Cane Armchair".into()),
            description: None,
            category_id: None,
            price: Some(8_500),
            sale_price: None,
            stock: None,
            badges: None,
            image_url: None,
            material: None,
            is_active: None,
        },
    )
    .await?
    .data
    .unwrap();
    assert_eq!(renamed.name, "Cane Armchair");
    assert_eq!(renamed.price, 8_500);
    assert_eq!(renamed.stock, 20);
    assert_eq!(renamed.category_id, Some(dining.id));

    // Categories are renamed by staff only; deleting one leaves its products uncategorised
    let rename = || UpdateCategoryRequest {
        name: Some("Dining".into()),
        slug: Some("dining".into()),
        description: Some("Tables and chairs".into()),
        image_url: None,
    };
    assert!(matches!(
        category_service::update_category(&state, &buyer, dining.id, rename()).await,
        Err(AppError::Forbidden)
    ));
    let renamed_category = category_service::update_category(&state, &admin, dining.id, rename())
        .await?
        .data
        .unwrap();
    assert_eq!(renamed_category.slug, "dining");
    assert!(matches!(
        category_service::get_category(&state, "dining-room").await,
        Err(AppError::NotFound)
    ));

    category_service::delete_category(&state, &admin, dining.id).await?;
    assert!(matches!(
        category_service::delete_category(&state, &admin, dining.id).await,
        Err(AppError::NotFound)
    ));
    let orphan = product_service::get_product(&state, &guest, cane.id)
        .await?
        .data
        .unwrap();
    assert_eq!(orphan.product.category_id, None);

    // A product nobody ordered is removed outright; retired products vanish for guests
    product_service::delete_product(&state, &admin, cane.id).await?;
    assert!(matches!(
        product_service::get_product(&state, &guest, cane.id).await,
        Err(AppError::NotFound)
    ));

    Ok(())
}
