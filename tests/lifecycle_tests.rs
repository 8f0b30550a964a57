use bytes::Bytes;
use item_photo_server::{
    adapters::outbound::storage::{create_s3_photo_store, S3Config},
    domain::models::{CreateItemRequest, ItemPolicy, PhotoUpload, UpdateItemRequest},
    ports::services::ItemService,
    InMemoryItemRepository, ItemError, ItemId, ItemServiceImpl, ObjectStorePhotoStore, Price,
    ValidationError,
};
use std::sync::Arc;
use std::time::Duration;

fn setup() -> (ItemServiceImpl, Arc<ObjectStorePhotoStore>) {
    let store = Arc::new(ObjectStorePhotoStore::in_memory());
    let service = ItemServiceImpl::new(
        Arc::new(InMemoryItemRepository::new()),
        store.clone(),
        ItemPolicy::default(),
    );
    (service, store)
}

fn request(name: &str, price: f64) -> CreateItemRequest {
    CreateItemRequest {
        name: Some(name.to_string()),
        price: Some(Price::new(price).unwrap()),
        ..Default::default()
    }
}

fn png(data: &'static [u8], file_name: &str) -> PhotoUpload {
    PhotoUpload::new(data, Some("image/png".to_string()), file_name)
}

#[tokio::test]
async fn mug_lifecycle() {
    let (service, store) = setup();

    // create
    let created = service
        .create_item(request("Mug", 10.0), Some(png(b"PNGDATA", "a.png")))
        .await
        .unwrap();
    assert_eq!(created.price.value(), 10.0);
    let first = created.photo.clone().unwrap();
    assert!(first.key.as_str().ends_with("a.png"));
    assert!(first.url.contains(first.key.as_str()));
    assert_eq!(
        store.fetch_photo(&first.key).await.unwrap(),
        Bytes::from_static(b"PNGDATA")
    );

    // metadata-only update keeps the photo
    let repriced = service
        .update_item(
            &created.id,
            UpdateItemRequest {
                price: Some(Price::new(12.0).unwrap()),
                ..Default::default()
            },
            None,
        )
        .await
        .unwrap();
    assert_eq!(repriced.price.value(), 12.0);
    assert_eq!(repriced.name, "Mug");
    assert_eq!(repriced.photo.as_ref(), Some(&first));

    // photo replacement removes the old object
    let replaced = service
        .update_item(
            &created.id,
            UpdateItemRequest::default(),
            Some(png(b"NEW", "b.png")),
        )
        .await
        .unwrap();
    let second = replaced.photo.clone().unwrap();
    assert!(second.key.as_str().ends_with("b.png"));
    assert_ne!(second.key, first.key);
    assert_eq!(replaced.price.value(), 12.0);
    assert!(store.fetch_photo(&first.key).await.unwrap_err().is_not_found());
    assert_eq!(
        store.fetch_photo(&second.key).await.unwrap(),
        Bytes::from_static(b"NEW")
    );

    // delete removes both record and object
    service.delete_item(&created.id).await.unwrap();
    assert!(matches!(
        service.get_item(&created.id).await,
        Err(ItemError::NotFound { .. })
    ));
    assert!(store.fetch_photo(&second.key).await.unwrap_err().is_not_found());
    assert!(store.list_keys().await.unwrap().is_empty());
    assert!(service.pending_orphans().await.is_empty());
}

#[tokio::test]
async fn list_returns_newest_first() {
    let (service, _) = setup();

    let mut ids = Vec::new();
    for (i, name) in ["first", "second", "third"].iter().enumerate() {
        let file_name = format!("{}.png", i);
        let item = service
            .create_item(request(name, 1.0), Some(png(b"x", &file_name)))
            .await
            .unwrap();
        ids.push(item.id);
        tokio::time::sleep(Duration::from_millis(5)).await;
    }

    let listed: Vec<ItemId> = service
        .list_items()
        .await
        .unwrap()
        .into_iter()
        .map(|item| item.id)
        .collect();

    ids.reverse();
    assert_eq!(listed, ids);
}

#[tokio::test]
async fn empty_update_changes_nothing_but_updated_at() {
    let (service, _) = setup();
    let created = service
        .create_item(request("Lamp", 30.0), Some(png(b"LAMP", "lamp.png")))
        .await
        .unwrap();

    let updated = service
        .update_item(&created.id, UpdateItemRequest::default(), None)
        .await
        .unwrap();

    assert_eq!(updated.name, created.name);
    assert_eq!(updated.price, created.price);
    assert_eq!(updated.note, created.note);
    assert_eq!(updated.photo, created.photo);
    assert_eq!(updated.created_at, created.created_at);
    assert!(updated.updated_at >= created.updated_at);
}

#[tokio::test]
async fn unknown_ids_are_not_found() {
    let (service, store) = setup();
    let missing = ItemId::generate();

    assert!(matches!(
        service.get_item(&missing).await,
        Err(ItemError::NotFound { .. })
    ));
    assert!(matches!(
        service
            .update_item(&missing, UpdateItemRequest::default(), Some(png(b"x", "x.png")))
            .await,
        Err(ItemError::NotFound { .. })
    ));
    assert!(matches!(
        service.delete_item(&missing).await,
        Err(ItemError::NotFound { .. })
    ));

    // nothing was uploaded for the missing item
    assert!(store.list_keys().await.unwrap().is_empty());
}

#[tokio::test]
async fn create_requires_photo_by_default() {
    let (service, store) = setup();

    let err = service
        .create_item(request("Mug", 10.0), None)
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        ItemError::Validation(ValidationError::PhotoRequired)
    ));

    let err = service
        .create_item(
            request("Mug", 10.0),
            Some(PhotoUpload::new(&b"GIF89a"[..], Some("image/gif".to_string()), "a.gif")),
        )
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        ItemError::Validation(ValidationError::UnsupportedContentType { .. })
    ));

    assert!(service.list_items().await.unwrap().is_empty());
    assert!(store.list_keys().await.unwrap().is_empty());
}

#[tokio::test]
async fn permissive_policy_allows_items_without_photo() {
    let service = ItemServiceImpl::new(
        Arc::new(InMemoryItemRepository::new()),
        Arc::new(ObjectStorePhotoStore::in_memory()),
        ItemPolicy::permissive(),
    );

    let item = service
        .create_item(request("Sticker", 0.5), None)
        .await
        .unwrap();
    assert!(item.photo.is_none());

    // deleting an item without a photo never needs storage
    service.delete_item(&item.id).await.unwrap();
}

#[tokio::test]
async fn upload_ticket_from_s3_backend() {
    let config = S3Config {
        access_key: Some("AKIDEXAMPLE".to_string()),
        secret_key: Some("wJalrXUtnFEMI/K7MDENG+bPxRfiCYEXAMPLEKEY".to_string()),
        ..S3Config::new("photos", "us-east-1")
    };
    let service = ItemServiceImpl::new(
        Arc::new(InMemoryItemRepository::new()),
        Arc::new(create_s3_photo_store(&config).unwrap()),
        ItemPolicy::default(),
    )
    .with_key_prefix("my_uploads");

    let ticket = service
        .create_upload_ticket("holiday photo.png", "image/png")
        .await
        .unwrap();

    assert!(ticket.file_key.as_str().starts_with("my_uploads/"));
    assert!(ticket.file_key.as_str().ends_with("-holiday_photo.png"));
    assert_eq!(
        ticket.file_url,
        format!("https://photos.s3.us-east-1.amazonaws.com/{}", ticket.file_key)
    );
    assert!(ticket.upload_url.contains("X-Amz-Signature="));

    let err = service
        .create_upload_ticket("a.gif", "image/gif")
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        ItemError::Validation(ValidationError::UnsupportedContentType { .. })
    ));

    let err = service.create_upload_ticket("", "image/png").await.unwrap_err();
    assert!(matches!(
        err,
        ItemError::Validation(ValidationError::MissingField("name"))
    ));
}
