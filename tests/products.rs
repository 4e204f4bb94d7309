//! Catálogo: criação, conflito de SKU, imagens e varredura do diretório.

mod common;

use serde_json::json;

use haly_cms::{
    common::error::AppError,
    models::product::{CreateProductPayload, ImagePosition, ReorderImagesPayload, UpdateProductPayload},
};

fn create(value: serde_json::Value) -> CreateProductPayload {
    serde_json::from_value(value).unwrap()
}

#[tokio::test]
async fn create_normalises_slug_color_and_defaults() {
    let env = common::test_env().await;
    let product = env
        .state
        .product_service
        .create(create(json!({ "sku": "AH 1024", "color": "Dark Grey" })))
        .await
        .unwrap()
        .product;

    assert_eq!(product.slug, "ah-1024");
    assert_eq!(product.color, "dark-grey");
    assert_eq!(product.sizes, "160x230,200x300,300x400");
    assert_eq!(product.tags, "");
    assert!(product.is_active);
}

#[tokio::test]
async fn duplicate_sku_fails_without_a_second_row() {
    let env = common::test_env().await;
    let service = &env.state.product_service;

    service.create(create(json!({ "sku": "AH-1", "color": "red" }))).await.unwrap();
    let err = service
        .create(create(json!({ "sku": "AH-1", "slug": "other-slug", "color": "green" })))
        .await
        .unwrap_err();

    assert!(matches!(err, AppError::UniqueConstraintViolation(_)));
    assert_eq!(env.products.count(), 1);
}

#[tokio::test]
async fn partial_update_keeps_untouched_fields() {
    let env = common::test_env().await;
    let service = &env.state.product_service;

    let created = service
        .create(create(json!({ "sku": "AH-7", "color": "cream", "tags": "new" })))
        .await
        .unwrap();
    let updated = service
        .update(
            created.product.id,
            UpdateProductPayload { is_active: Some(false), ..Default::default() },
        )
        .await
        .unwrap()
        .product;

    assert!(!updated.is_active);
    assert_eq!(updated.sku, "AH-7");
    assert_eq!(updated.tags, "new");

    // Inativo some da lista pública
    assert!(service.list(true).await.unwrap().is_empty());
    assert_eq!(service.list(false).await.unwrap().len(), 1);
}

#[tokio::test]
async fn jpeg_named_exe_is_accepted_by_content() {
    let env = common::test_env().await;
    let stored = env.state.media_service.store(common::tiny_jpeg(), "photo.exe").await.unwrap();

    assert_eq!(stored.mime, "image/jpeg");
    assert!(stored.url.starts_with("/uploads/"));
    assert!(stored.url.ends_with("-photo.jpg"));
    assert_eq!((stored.width, stored.height), (Some(2), Some(2)));
    assert!(stored.variants.iter().any(|v| v.mime == "image/webp"));
}

#[tokio::test]
async fn non_allowed_content_is_rejected_whatever_the_name() {
    let env = common::test_env().await;
    let err = env
        .state
        .media_service
        .store(b"MZ\x90\x00 not an image".to_vec(), "carpet.jpg")
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::UnsupportedFileType(_)));
}

#[tokio::test]
async fn images_are_appended_and_reordered() {
    let env = common::test_env().await;
    let service = &env.state.product_service;
    let id = service
        .create(create(json!({ "sku": "AH-55", "color": "grey" })))
        .await
        .unwrap()
        .product
        .id;

    let first = service.add_image(id, common::tiny_jpeg(), "a.jpg").await.unwrap();
    let second = service.add_image(id, common::tiny_jpeg(), "b.jpg").await.unwrap();
    assert_eq!((first.position, second.position), (0, 1));

    let reordered = service
        .reorder_images(
            id,
            ReorderImagesPayload {
                images: vec![
                    ImagePosition { id: first.id, position: 1 },
                    ImagePosition { id: second.id, position: 0 },
                ],
            },
        )
        .await
        .unwrap();
    assert_eq!(reordered.images[0].id, second.id);

    let foreign = service
        .reorder_images(
            id,
            ReorderImagesPayload { images: vec![ImagePosition { id: uuid::Uuid::new_v4(), position: 0 }] },
        )
        .await
        .unwrap_err();
    assert!(matches!(foreign, AppError::BadRequest(_)));

    service.delete_image(id, first.id).await.unwrap();
    assert_eq!(service.get(id).await.unwrap().images.len(), 1);
}

#[tokio::test]
async fn scan_creates_then_updates_by_sku() {
    let env = common::test_env().await;
    let folder = env.dir.path().join("Images/Halylar/Dark Grey");
    std::fs::create_dir_all(&folder).unwrap();
    std::fs::write(folder.join("Haly 2041.jpg"), common::tiny_jpeg()).unwrap();
    std::fs::write(folder.join("notes.txt"), "ignored").unwrap();

    let service = &env.state.product_service;
    let first = service.scan_directory().await.unwrap();
    assert_eq!((first.created, first.updated), (1, 0));

    let products = service.list(false).await.unwrap();
    assert_eq!(products[0].product.sku, "AH-2041");
    assert_eq!(products[0].product.color, "dark-grey");
    assert_eq!(products[0].images.len(), 1);
    assert!(products[0].images[0].media.url.starts_with("/Images/Halylar/"));

    let second = service.scan_directory().await.unwrap();
    assert_eq!((second.created, second.updated), (0, 1));
    assert!(env.audit.actions().iter().any(|a| a == "SCAN_PRODUCTS"));
}

#[tokio::test]
async fn scan_does_not_leave_products_without_images() {
    let env = common::test_env().await;
    let folder = env.dir.path().join("Images/Halylar/Red");
    std::fs::create_dir_all(&folder).unwrap();
    std::fs::write(folder.join("Haly 7001.jpg"), common::tiny_jpeg()).unwrap();

    env.products.fail_image_writes();
    let summary = env.state.product_service.scan_directory().await.unwrap();

    assert_eq!((summary.created, summary.updated, summary.skipped), (0, 0, 1));
    assert_eq!(env.products.count(), 0);
}
