use bsonite::collection::{multi, upsert, FindOptions, UpdateOptions};
use bsonite::common::Value;
use bsonite::doc;
use bsonite::errors::ErrorKind;
use bsonite_int_test::test_util::{cleanup, create_test_context, insert_test_documents, run_test};

#[test]
fn test_update_first_match_only() {
    run_test(
        create_test_context,
        |ctx| {
            let collection = ctx.collection("test")?;
            insert_test_documents(&collection)?;

            let result = collection.update(
                &doc! { last_name: "ln2" },
                &doc! { "$set": { last_name: "new-last-name" } },
                &UpdateOptions::default(),
            )?;
            assert_eq!(result.matched(), 1);
            assert_eq!(result.modified(), 1);
            assert!(result.upserted_id().is_none());

            assert_eq!(collection.count(&doc! { last_name: "new-last-name" })?, 1);
            let doc = collection.find_one(&doc! { _id: 2 })?.unwrap_or_default();
            assert_eq!(doc.get("last_name"), Some(&Value::from("new-last-name")));
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_set_is_idempotent() {
    run_test(
        create_test_context,
        |ctx| {
            let collection = ctx.collection("test")?;
            insert_test_documents(&collection)?;
            let update = doc! { "$set": { "address.city": "Rome", score: 5 } };

            let first = collection.update(&doc! {}, &update, &multi())?;
            assert_eq!(first.matched(), 3);
            assert_eq!(first.modified(), 3);
            let once = collection.find(&doc! {}, &FindOptions::new())?;

            let second = collection.update(&doc! {}, &update, &multi())?;
            assert_eq!(second.matched(), 3);
            assert_eq!(second.modified(), 0);
            let twice = collection.find(&doc! {}, &FindOptions::new())?;

            assert_eq!(once, twice);
            assert_eq!(collection.count(&doc! { "address.city": "Rome" })?, 3);
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_upsert_copies_only_equality() {
    run_test(
        create_test_context,
        |ctx| {
            let collection = ctx.collection("upsert")?;
            let result = collection.update(
                &doc! { a: "value2", b: { "$gt": 5 } },
                &doc! { "$set": { c: 10 } },
                &upsert(),
            )?;
            assert_eq!(result.matched(), 0);
            let id = result.upserted_id().cloned().unwrap_or(Value::Null);
            assert!(matches!(id, Value::ObjectId(_)));

            let docs = collection.find(&doc! {}, &FindOptions::new())?;
            assert_eq!(docs.len(), 1);
            assert_eq!(docs[0], doc! { a: "value2", c: 10, _id: id });
            assert!(!docs[0].contains_key("b"));
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_upsert_replacement_and_set_on_insert() {
    run_test(
        create_test_context,
        |ctx| {
            let collection = ctx.collection("upsert")?;

            collection.update(&doc! { a: 1 }, &doc! { b: 2 }, &upsert())?;
            let doc = collection.find_one(&doc! { b: 2 })?.unwrap_or_default();
            assert!(!doc.contains_key("a"));
            assert!(doc.has_id());

            collection.update(
                &doc! { k: "x" },
                &doc! { "$set": { n: 1 }, "$setOnInsert": { created: true } },
                &upsert(),
            )?;
            collection.update(
                &doc! { k: "x" },
                &doc! { "$set": { n: 2 }, "$setOnInsert": { created: false } },
                &upsert(),
            )?;
            let doc = collection.find_one(&doc! { k: "x" })?.unwrap_or_default();
            assert_eq!(doc.get("n"), Some(&Value::from(2)));
            assert_eq!(doc.get("created"), Some(&Value::from(true)));
            assert_eq!(collection.size(), 2);
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_replacement_keeps_id() {
    run_test(
        create_test_context,
        |ctx| {
            let collection = ctx.collection("test")?;
            insert_test_documents(&collection)?;

            collection.update(&doc! { _id: 2 }, &doc! { first_name: "x" }, &UpdateOptions::default())?;
            let doc = collection.find_one(&doc! { _id: 2 })?.unwrap_or_default();
            assert_eq!(doc, doc! { _id: 2, first_name: "x" });
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_array_modifiers() {
    run_test(
        create_test_context,
        |ctx| {
            let collection = ctx.collection("arrays")?;
            collection.insert(doc! { _id: 1, key: ["value1", "value2", "value1"], n: [1, 2, 3] })?;

            collection.update(&doc! {}, &doc! { "$pull": { key: "value1" } }, &UpdateOptions::default())?;
            collection.update(
                &doc! {},
                &doc! { "$push": { n: { "$each": [4, 5] } }, "$addToSet": { key: { "$each": ["value2", "value3"] } } },
                &UpdateOptions::default(),
            )?;
            collection.update(&doc! {}, &doc! { "$pop": { n: (-1) } }, &UpdateOptions::default())?;
            collection.update(&doc! {}, &doc! { "$pullAll": { n: [2, 5] } }, &UpdateOptions::default())?;

            let doc = collection.find_one(&doc! { _id: 1 })?.unwrap_or_default();
            assert_eq!(doc, doc! { _id: 1, key: ["value2", "value3"], n: [3, 4] });
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_field_modifiers() {
    run_test(
        create_test_context,
        |ctx| {
            let collection = ctx.collection("fields")?;
            collection.insert(doc! { _id: 1, count: 2, price: 1.5, old: "x", gone: true })?;

            collection.update(
                &doc! { _id: 1 },
                &doc! {
                    "$inc": { count: 3, "stats.hits": 1 },
                    "$mul": { price: 2 },
                    "$rename": { old: "new" },
                    "$unset": { gone: "" }
                },
                &UpdateOptions::default(),
            )?;

            let doc = collection.find_one(&doc! { _id: 1 })?.unwrap_or_default();
            assert_eq!(doc.get("count"), Some(&Value::from(5)));
            assert_eq!(doc.get_path("stats.hits"), Some(&Value::from(1)));
            assert_eq!(doc.get("price"), Some(&Value::from(3.0)));
            assert_eq!(doc.get("new"), Some(&Value::from("x")));
            assert!(!doc.contains_key("old"));
            assert!(!doc.contains_key("gone"));
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_multi_update_stops_at_failure() {
    run_test(
        create_test_context,
        |ctx| {
            let collection = ctx.collection("partial")?;
            collection.insert_many(vec![
                doc! { _id: 1, n: 1 },
                doc! { _id: 2, n: "x" },
                doc! { _id: 3, n: 3 },
            ])?;

            let err = collection
                .update(&doc! {}, &doc! { "$inc": { n: 1 } }, &multi())
                .err()
                .map(|e| e.kind().clone());
            assert_eq!(err, Some(ErrorKind::InputDataError));

            assert_eq!(collection.count(&doc! { _id: 1, n: 2 })?, 1);
            assert_eq!(collection.count(&doc! { _id: 3, n: 3 })?, 1);
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_invalid_updates_change_nothing() {
    run_test(
        create_test_context,
        |ctx| {
            let collection = ctx.collection("test")?;
            insert_test_documents(&collection)?;
            let before = collection.find(&doc! {}, &FindOptions::new())?;

            let invalid = vec![
                doc! { "$set": { a: 1 }, b: 2 },
                doc! { "$bogus": { a: 1 } },
                doc! { "$inc": { a: "one" } },
                doc! { "$set": 5 },
            ];
            for update in invalid {
                let err = collection.update(&doc! {}, &update, &multi()).err();
                assert_eq!(err.map(|e| e.kind().clone()), Some(ErrorKind::BadValue), "{}", update);
            }

            assert_eq!(collection.find(&doc! {}, &FindOptions::new())?, before);
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_set_far_past_array_end_is_rejected() {
    run_test(
        create_test_context,
        |ctx| {
            let collection = ctx.collection("padding")?;
            collection.insert(doc! { _id: 1, a: [] })?;

            let err = collection
                .update(
                    &doc! { _id: 1 },
                    &doc! { "$set": { "a.1000000000000000000": 1 } },
                    &UpdateOptions::default(),
                )
                .err()
                .map(|e| e.kind().clone());
            assert_eq!(err, Some(ErrorKind::BadValue));

            let doc = collection.find_one(&doc! { _id: 1 })?.unwrap_or_default();
            assert_eq!(doc, doc! { _id: 1, a: [] });
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_pull_on_missing_field_fails() {
    run_test(
        create_test_context,
        |ctx| {
            let collection = ctx.collection("pull")?;
            collection.insert(doc! { _id: 1 })?;

            let err = collection
                .update(&doc! {}, &doc! { "$pull": { key: "x" } }, &UpdateOptions::default())
                .err()
                .map(|e| e.kind().clone());
            assert_eq!(err, Some(ErrorKind::InputDataError));
            Ok(())
        },
        cleanup,
    )
}
