use bsonite::collection::{Document, FindOptions};
use bsonite::common::Value;
use bsonite::doc;
use bsonite::errors::ErrorKind;
use bsonite_int_test::test_util::{cleanup, create_test_context, create_test_docs, run_test};

#[test]
fn test_insert_many_keeps_order() {
    run_test(
        create_test_context,
        |ctx| {
            let collection = ctx.collection("test")?;
            let result = collection.insert_many(create_test_docs())?;
            assert_eq!(result.affected(), 3);
            assert_eq!(result.ids(), &[Value::from(1), Value::from(2), Value::from(3)]);

            let docs = collection.find(&doc! {}, &FindOptions::new())?;
            assert_eq!(docs, create_test_docs());
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_insert_generates_distinct_ids() {
    run_test(
        create_test_context,
        |ctx| {
            let collection = ctx.collection("generated")?;
            let docs: Vec<Document> = (0..100).map(|i| doc! { n: i }).collect();
            let result = collection.insert_many(docs)?;

            let mut ids: Vec<String> = result.ids().iter().map(|id| format!("{:?}", id)).collect();
            ids.sort();
            ids.dedup();
            assert_eq!(ids.len(), 100);

            let first = collection.find_one(&doc! { n: 0 })?.unwrap_or_default();
            assert_eq!(first.keys().next().map(String::as_str), Some("_id"));
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_insert_rejects_operator_fields() {
    run_test(
        create_test_context,
        |ctx| {
            let collection = ctx.collection("rejected")?;
            let err = collection.insert(doc! { "$set": { a: 1 } }).err();
            assert_eq!(err.map(|e| e.kind().clone()), Some(ErrorKind::BadValue));
            assert!(ctx.db().get_collection("test", "rejected").is_none());
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_insert_creates_collection() {
    run_test(
        create_test_context,
        |ctx| {
            let db = ctx.db();
            assert!(db.collection_names("test").is_empty());

            ctx.collection("b")?.insert(doc! { x: 1 })?;
            ctx.collection("a")?.insert(doc! { x: 1 })?;
            let _untouched = ctx.collection("c")?;

            assert_eq!(db.collection_names("test"), vec!["a".to_string(), "b".to_string()]);
            assert_eq!(db.database_names(), vec!["test".to_string()]);
            Ok(())
        },
        cleanup,
    )
}
