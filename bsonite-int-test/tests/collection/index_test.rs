use bsonite::common::Value;
use bsonite::doc;
use bsonite::errors::ErrorKind;
use bsonite::index::{unique_index, IndexOptions};
use bsonite_int_test::test_util::{cleanup, create_test_context, insert_test_documents, run_test};

fn names(indexes: &[bsonite::collection::Document]) -> Vec<Value> {
    indexes
        .iter()
        .map(|index| index.get("name").cloned().unwrap_or(Value::Null))
        .collect()
}

#[test]
fn test_create_and_list_indexes() {
    run_test(
        create_test_context,
        |ctx| {
            let collection = ctx.collection("indexed")?;
            assert!(collection.create_index(doc! { first_name: 1, last_name: (-1) }, &IndexOptions::new())?);
            assert!(collection.create_index(doc! { email: 1 }, &unique_index())?);
            assert!(ctx.db().has_collection("test", "indexed"));

            let indexes = collection.list_indexes();
            assert_eq!(
                names(&indexes),
                vec![
                    Value::from("_id_"),
                    Value::from("first_name_1_last_name_-1"),
                    Value::from("email_1")
                ]
            );
            assert_eq!(
                indexes[2],
                doc! { v: 1, key: { email: 1 }, name: "email_1", ns: "test.indexed", unique: true }
            );
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_index_conflicts() {
    run_test(
        create_test_context,
        |ctx| {
            let collection = ctx.collection("indexed")?;
            collection.create_index(doc! { a: 1 }, &IndexOptions::new())?;

            assert!(!collection.create_index(doc! { a: 1 }, &IndexOptions::new())?);

            let code = |keys, options: &IndexOptions| {
                collection.create_index(keys, options).err().and_then(|e| e.code())
            };
            assert_eq!(code(doc! { b: 1 }, &IndexOptions::new().name("a_1")), Some(86));
            assert_eq!(code(doc! { a: 1 }, &IndexOptions::new().unique(true)), Some(85));
            assert_eq!(code(doc! { a: 1 }, &IndexOptions::new().name("other")), Some(85));
            assert_eq!(code(doc! { a: "hashed", b: 1 }, &IndexOptions::new()), Some(16763));
            assert_eq!(collection.list_indexes().len(), 2);
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_drop_index() {
    run_test(
        create_test_context,
        |ctx| {
            let collection = ctx.collection("indexed")?;
            collection.create_index(doc! { a: 1 }, &IndexOptions::new())?;

            let err = collection.drop_index("_id_").err().map(|e| e.kind().clone());
            assert_eq!(err, Some(ErrorKind::BadValue));

            let err = collection.drop_index("missing").err();
            assert_eq!(err.as_ref().map(|e| e.kind().clone()), Some(ErrorKind::IndexNotFound));
            assert_eq!(err.and_then(|e| e.code()), Some(27));

            collection.drop_index("a_1")?;
            assert_eq!(collection.list_indexes().len(), 1);
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_indexes_do_not_change_matching() {
    run_test(
        create_test_context,
        |ctx| {
            let collection = ctx.collection("test")?;
            insert_test_documents(&collection)?;
            let before = collection.count(&doc! { last_name: "ln2" })?;

            collection.create_index(doc! { last_name: 1 }, &unique_index())?;
            assert_eq!(collection.count(&doc! { last_name: "ln2" })?, before);
            Ok(())
        },
        cleanup,
    )
}
