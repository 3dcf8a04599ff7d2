use reelshare_core::{
    ConflictError, EntityKind, ErrorKind, ItemPayload, ManualClock, RecordStore, StoreError,
    UserPayload,
};
use std::sync::Arc;
use std::thread;

#[test]
fn share_appends_in_order_and_confirms() {
    let store = RecordStore::open_in_memory().unwrap();
    let first = store.create_item(ItemPayload::new("one", "1")).unwrap();
    let second = store.create_item(ItemPayload::new("two", "2")).unwrap();
    let user = store.add_user(UserPayload::new("u", "e")).unwrap();

    let confirmation = store.share_item(&second.id, &user.id).unwrap();
    assert_eq!(confirmation.shared_count, 1);
    assert!(confirmation.to_string().contains("shared successfully"));
    store.share_item(&first.id, &user.id).unwrap();

    let loaded = store.get_user(&user.id).unwrap();
    assert_eq!(loaded.shared_item_ids, Some(vec![second.id, first.id]));
}

#[test]
fn duplicate_share_conflicts_without_mutation() {
    let store = RecordStore::open_in_memory().unwrap();
    let item = store.create_item(ItemPayload::new("t", "d")).unwrap();
    let user = store.add_user(UserPayload::new("u", "e")).unwrap();

    store.share_item(&item.id, &user.id).unwrap();
    let err = store.share_item(&item.id, &user.id).unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Conflict);
    assert!(matches!(
        err,
        StoreError::Conflict(ConflictError::AlreadyShared { ref item_id, ref user_id })
            if *item_id == item.id && *user_id == user.id
    ));
    assert_eq!(
        store.get_user(&user.id).unwrap().shared_item_ids,
        Some(vec![item.id])
    );
}

#[test]
fn share_with_missing_item_or_user_is_not_found_and_changes_nothing() {
    let store = RecordStore::open_in_memory().unwrap();
    let item = store.create_item(ItemPayload::new("t", "d")).unwrap();
    let user = store.add_user(UserPayload::new("u", "e")).unwrap();
    let items_before = store.list_items().unwrap();
    let users_before = store.list_users().unwrap();

    let missing_item = store.share_item("nope", &user.id).unwrap_err();
    assert!(matches!(
        missing_item,
        StoreError::NotFound { entity: EntityKind::Item, ref id } if id == "nope"
    ));

    let missing_user = store.share_item(&item.id, "nobody").unwrap_err();
    assert!(matches!(
        missing_user,
        StoreError::NotFound { entity: EntityKind::User, ref id } if id == "nobody"
    ));

    let both_missing = store.share_item("nope", "nobody").unwrap_err();
    assert!(matches!(
        both_missing,
        StoreError::NotFound {
            entity: EntityKind::Item,
            ..
        }
    ));

    assert_eq!(store.list_items().unwrap(), items_before);
    assert_eq!(store.list_users().unwrap(), users_before);
}

#[test]
fn deleted_item_cannot_be_shared() {
    let store = RecordStore::open_in_memory().unwrap();
    let item = store.create_item(ItemPayload::new("t", "d")).unwrap();
    let user = store.add_user(UserPayload::new("u", "e")).unwrap();
    store.delete_item(&item.id).unwrap();

    let err = store.share_item(&item.id, &user.id).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound);
    assert_eq!(store.get_user(&user.id).unwrap().shared_item_ids, None);
}

#[test]
fn concurrent_duplicate_shares_record_exactly_one() {
    let store = Arc::new(RecordStore::open_in_memory().unwrap());
    let item = store.create_item(ItemPayload::new("t", "d")).unwrap();
    let user = store.add_user(UserPayload::new("u", "e")).unwrap();

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let store = Arc::clone(&store);
            let item_id = item.id.clone();
            let user_id = user.id.clone();
            thread::spawn(move || store.share_item(&item_id, &user_id))
        })
        .collect();

    let results: Vec<_> = handles
        .into_iter()
        .map(|handle| handle.join().unwrap())
        .collect();

    assert_eq!(results.iter().filter(|result| result.is_ok()).count(), 1);
    assert!(results
        .iter()
        .filter_map(|result| result.as_ref().err())
        .all(|err| err.kind() == ErrorKind::Conflict));
    assert_eq!(
        store.get_user(&user.id).unwrap().shared_item_ids,
        Some(vec![item.id])
    );
}

#[test]
fn create_update_share_scenario() {
    let clock = Arc::new(ManualClock::new(42));
    let store = RecordStore::open_in_memory().unwrap().with_clock(clock);

    let item = store.create_item(ItemPayload::new("A", "B")).unwrap();
    assert_eq!(item.created_at, 42);
    assert_eq!(item.updated_at, None);

    let err = store
        .update_item(&item.id, ItemPayload::new("", "B"))
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Validation);
    assert_eq!(store.get_item(&item.id).unwrap(), item);

    let user = store.add_user(UserPayload::new("u", "e")).unwrap();

    store.share_item(&item.id, &user.id).unwrap();
    assert_eq!(
        store.get_user(&user.id).unwrap().shared_item_ids,
        Some(vec![item.id.clone()])
    );

    let err = store.share_item(&item.id, &user.id).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Conflict);
}
