//! Shared contract checks run against any live backend.
//!
//! Each check owns a dedicated collection, dropping it before and after so
//! reruns are independent.

use std::sync::Arc;

use serde_json::{json, Value};

use docbench_core::{
    AdapterError, Document, DocumentAdapter, Filter, QueryOptions, CREATED_AT_FIELD, ID_FIELD,
    UPDATED_AT_FIELD,
};

pub fn doc_of(value: Value) -> Document {
    match value {
        Value::Object(map) => map,
        _ => panic!("document literal must be an object"),
    }
}

/// Inserted documents come back identical through `find_by_id`.
pub async fn check_round_trip(adapter: &Arc<dyn DocumentAdapter>, collection: &str) {
    adapter.drop_collection(collection).await.unwrap();

    let doc = doc_of(json!({
        "name": "alice",
        "age": 30,
        "verified": true,
        "tags": ["x", "y"],
        "address": {"city": "Berlin"}
    }));
    let inserted = adapter.insert_one(collection, doc.clone()).await.unwrap();

    let id = inserted.get(ID_FIELD).cloned().expect("identity present");
    assert!(inserted.get(CREATED_AT_FIELD).is_some());
    assert!(inserted.get(UPDATED_AT_FIELD).is_some());

    let fetched = adapter
        .find_by_id(collection, &id)
        .await
        .unwrap()
        .expect("document round-trips by identity");
    for (field, value) in &doc {
        assert_eq!(fetched.get(field), Some(value), "field '{}' survives", field);
    }
    assert_eq!(fetched.get(ID_FIELD), Some(&id));

    adapter.drop_collection(collection).await.unwrap();
}

/// A `$gte`/`$lte` window selects exactly the in-range documents.
pub async fn check_filter_window(adapter: &Arc<dyn DocumentAdapter>, collection: &str) {
    adapter.drop_collection(collection).await.unwrap();

    let docs: Vec<Document> = [17, 18, 65, 66]
        .iter()
        .map(|age| doc_of(json!({"name": format!("person_{}", age), "age": age})))
        .collect();
    adapter.insert_many(collection, docs).await.unwrap();

    let filter = doc_of(json!({"age": {"$gte": 18, "$lte": 65}}));
    let matched = adapter
        .find(collection, &filter, &QueryOptions::new())
        .await
        .unwrap();
    let mut ages: Vec<i64> = matched
        .iter()
        .map(|d| d.get("age").and_then(Value::as_i64).unwrap())
        .collect();
    ages.sort_unstable();
    assert_eq!(ages, vec![18, 65]);

    // Sort/limit compile against the same filter machinery.
    let sorted = adapter
        .find(
            collection,
            &Filter::new(),
            &QueryOptions::new().with_sort("age", -1).with_limit(2),
        )
        .await
        .unwrap();
    let ages: Vec<i64> = sorted
        .iter()
        .map(|d| d.get("age").and_then(Value::as_i64).unwrap())
        .collect();
    assert_eq!(ages, vec![66, 65]);

    assert_eq!(adapter.count(collection, &Filter::new()).await.unwrap(), 4);
    assert_eq!(adapter.count(collection, &filter).await.unwrap(), 2);

    adapter.drop_collection(collection).await.unwrap();
}

/// `$push` creates then appends; `$pull` removes matching elements.
pub async fn check_update_operators(adapter: &Arc<dyn DocumentAdapter>, collection: &str) {
    adapter.drop_collection(collection).await.unwrap();

    let inserted = adapter
        .insert_one(collection, doc_of(json!({"name": "alice"})))
        .await
        .unwrap();
    let id = inserted.get(ID_FIELD).cloned().unwrap();
    let mut by_id = Filter::new();
    by_id.insert(ID_FIELD.to_string(), id);

    let updated = adapter
        .update_one(collection, &by_id, &doc_of(json!({"$push": {"tags": "a"}})))
        .await
        .unwrap()
        .expect("matched");
    assert_eq!(updated.get("tags"), Some(&json!(["a"])));

    let updated = adapter
        .update_one(collection, &by_id, &doc_of(json!({"$push": {"tags": "b"}})))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(updated.get("tags"), Some(&json!(["a", "b"])));

    let updated = adapter
        .update_one(collection, &by_id, &doc_of(json!({"$pull": {"tags": "a"}})))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(updated.get("tags"), Some(&json!(["b"])));

    // No match -> None, not an error.
    let missing = doc_of(json!({"name": "nobody"}));
    let result = adapter
        .update_one(collection, &missing, &doc_of(json!({"$set": {"x": 1}})))
        .await
        .unwrap();
    assert!(result.is_none());

    adapter.drop_collection(collection).await.unwrap();
}

/// `update_many` reports matched and modified counts.
pub async fn check_update_many_counts(adapter: &Arc<dyn DocumentAdapter>, collection: &str) {
    adapter.drop_collection(collection).await.unwrap();

    let docs: Vec<Document> = (0..4)
        .map(|i| doc_of(json!({"n": i, "status": if i < 3 { "open" } else { "done" }})))
        .collect();
    adapter.insert_many(collection, docs).await.unwrap();

    let filter = doc_of(json!({"status": "open"}));
    let report = adapter
        .update_many(collection, &filter, &doc_of(json!({"$set": {"status": "done"}})))
        .await
        .unwrap();
    assert_eq!(report.matched_count, 3);
    assert_eq!(report.modified_count, 3);

    let report = adapter
        .update_many(collection, &filter, &doc_of(json!({"$set": {"status": "done"}})))
        .await
        .unwrap();
    assert_eq!(report.matched_count, 0);
    assert_eq!(report.modified_count, 0);

    adapter.drop_collection(collection).await.unwrap();
}

/// N concurrent single-document pushes lose no updates.
pub async fn check_concurrent_pushes(adapter: &Arc<dyn DocumentAdapter>, collection: &str) {
    const WRITERS: usize = 8;

    adapter.drop_collection(collection).await.unwrap();

    let inserted = adapter
        .insert_one(collection, doc_of(json!({"name": "contended"})))
        .await
        .unwrap();
    let id = inserted.get(ID_FIELD).cloned().unwrap();

    let mut handles = Vec::with_capacity(WRITERS);
    for writer in 0..WRITERS {
        let adapter = Arc::clone(adapter);
        let collection = collection.to_string();
        let id = id.clone();
        handles.push(tokio::spawn(async move {
            let mut by_id = Filter::new();
            by_id.insert(ID_FIELD.to_string(), id);
            let update = doc_of(json!({"$push": {"tags": format!("tag_{}", writer)}}));
            adapter.update_one(&collection, &by_id, &update).await
        }));
    }
    for handle in handles {
        handle.await.unwrap().unwrap();
    }

    let fetched = adapter.find_by_id(collection, &id).await.unwrap().unwrap();
    let tags = fetched.get("tags").and_then(Value::as_array).unwrap();
    assert_eq!(tags.len(), WRITERS, "no update may be lost");
    for writer in 0..WRITERS {
        let tag = json!(format!("tag_{}", writer));
        assert!(tags.contains(&tag), "missing {}", tag);
    }

    adapter.drop_collection(collection).await.unwrap();
}

/// Repeated creates never fail or duplicate; drop reports what it removed.
pub async fn check_provisioning_idempotence(adapter: &Arc<dyn DocumentAdapter>, collection: &str) {
    adapter.drop_collection(collection).await.unwrap();

    adapter.create_collection(collection).await.unwrap();
    adapter.create_collection(collection).await.unwrap();

    adapter
        .insert_one(collection, doc_of(json!({"k": 1})))
        .await
        .unwrap();
    assert_eq!(adapter.count(collection, &Filter::new()).await.unwrap(), 1);

    assert!(adapter.drop_collection(collection).await.unwrap());
    assert!(!adapter.drop_collection(collection).await.unwrap());
}

/// An empty batch returns empty without touching the backend.
pub async fn check_empty_batch(adapter: &Arc<dyn DocumentAdapter>, collection: &str) {
    let inserted = adapter.insert_many(collection, Vec::new()).await.unwrap();
    assert!(inserted.is_empty());
}

/// Every CRUD call after disconnect rejects with the not-connected error.
pub async fn check_disconnected_guard(adapter: Arc<dyn DocumentAdapter>, collection: &str) {
    adapter.disconnect().await.unwrap();
    assert!(!adapter.is_connected().await);

    let filter = Filter::new();
    let not_connected = |err: AdapterError| matches!(err, AdapterError::NotConnected { .. });

    assert!(not_connected(
        adapter
            .insert_one(collection, doc_of(json!({"k": 1})))
            .await
            .unwrap_err()
    ));
    assert!(not_connected(
        adapter
            .insert_many(collection, vec![doc_of(json!({"k": 1}))])
            .await
            .unwrap_err()
    ));
    assert!(not_connected(
        adapter
            .find(collection, &filter, &QueryOptions::new())
            .await
            .unwrap_err()
    ));
    assert!(not_connected(
        adapter.find_one(collection, &filter).await.unwrap_err()
    ));
    assert!(not_connected(
        adapter.count(collection, &filter).await.unwrap_err()
    ));
    assert!(not_connected(
        adapter
            .update_many(collection, &filter, &doc_of(json!({"$set": {"x": 1}})))
            .await
            .unwrap_err()
    ));
    assert!(not_connected(
        adapter.delete_many(collection, &filter).await.unwrap_err()
    ));
    assert!(not_connected(
        adapter.create_collection(collection).await.unwrap_err()
    ));

    // A second disconnect stays a no-op.
    adapter.disconnect().await.unwrap();
}

/// Deletes report whether and how much they removed.
pub async fn check_deletes(adapter: &Arc<dyn DocumentAdapter>, collection: &str) {
    adapter.drop_collection(collection).await.unwrap();

    let docs: Vec<Document> = (0..3)
        .map(|i| doc_of(json!({"n": i, "status": "stale"})))
        .collect();
    adapter.insert_many(collection, docs).await.unwrap();

    assert!(adapter
        .delete_one(collection, &doc_of(json!({"status": "stale"})))
        .await
        .unwrap());
    assert_eq!(
        adapter
            .delete_many(collection, &doc_of(json!({"status": "stale"})))
            .await
            .unwrap(),
        2
    );
    assert!(!adapter
        .delete_one(collection, &doc_of(json!({"status": "stale"})))
        .await
        .unwrap());

    adapter.drop_collection(collection).await.unwrap();
}
