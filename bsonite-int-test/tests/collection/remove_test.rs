use bsonite::collection::FindOptions;
use bsonite::common::Value;
use bsonite::doc;
use bsonite_int_test::test_util::{cleanup, create_test_context, field_values, insert_test_documents, run_test};

#[test]
fn test_remove_matching() {
    run_test(
        create_test_context,
        |ctx| {
            let collection = ctx.collection("test")?;
            insert_test_documents(&collection)?;

            let result = collection.remove(&doc! { last_name: "ln2" }, false)?;
            assert_eq!(result.affected(), 2);
            assert_eq!(result.ids(), &[Value::from(2), Value::from(3)]);

            let docs = collection.find(&doc! {}, &FindOptions::new())?;
            assert_eq!(field_values(&docs, "_id"), vec![Value::from(1)]);
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_remove_just_one() {
    run_test(
        create_test_context,
        |ctx| {
            let collection = ctx.collection("test")?;
            insert_test_documents(&collection)?;

            let result = collection.remove(&doc! { last_name: "ln2" }, true)?;
            assert_eq!(result.affected(), 1);
            assert_eq!(collection.count(&doc! { last_name: "ln2" })?, 1);
            assert_eq!(collection.count(&doc! { _id: 3 })?, 1);
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_remove_nothing() {
    run_test(
        create_test_context,
        |ctx| {
            let collection = ctx.collection("test")?;
            insert_test_documents(&collection)?;

            let result = collection.remove(&doc! { first_name: "nobody" }, false)?;
            assert_eq!(result.affected(), 0);
            assert_eq!(collection.size(), 3);

            assert!(collection.remove(&doc! { "$bad": 1 }, false).is_err());
            assert_eq!(collection.size(), 3);
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_drop_collection() {
    run_test(
        create_test_context,
        |ctx| {
            let collection = ctx.collection("test")?;
            insert_test_documents(&collection)?;

            assert!(ctx.db().drop_collection("test", "test"));
            assert!(collection.is_empty());
            assert!(ctx.db().collection_names("test").is_empty());
            assert!(!ctx.db().drop_collection("test", "test"));
            Ok(())
        },
        cleanup,
    )
}
