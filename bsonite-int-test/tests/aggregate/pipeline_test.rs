use bsonite::common::Value;
use bsonite::{doc, val};
use bsonite_int_test::test_util::{cleanup, create_test_context, insert_test_documents, run_test};

#[test]
fn test_group_keeps_first_seen_order() {
    run_test(
        create_test_context,
        |ctx| {
            let collection = ctx.collection("grouped")?;
            collection.insert_many(vec![
                doc! { k: "a", v: 1 },
                doc! { k: "b", v: 1 },
                doc! { k: "b", v: 2 },
            ])?;

            let results = collection.aggregate(&[val!(doc! {
                "$group": { _id: "$k", total: { "$sum": "$v" } }
            })])?;
            assert_eq!(
                results,
                vec![doc! { _id: "a", total: 1 }, doc! { _id: "b", total: 3 }]
            );
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_max_across_types() {
    run_test(
        create_test_context,
        |ctx| {
            let collection = ctx.collection("mixed")?;
            collection.insert_many(vec![
                doc! { g: 1, v: 123 },
                doc! { g: 1, v: "def" },
                doc! { g: 2, v: "def" },
                doc! { g: 2, v: { a: 1 } },
            ])?;

            let results = collection.aggregate(&[
                val!(doc! { "$group": { _id: "$g", top: { "$max": "$v" } } }),
                val!(doc! { "$sort": { _id: 1 } }),
            ])?;
            assert_eq!(
                results,
                vec![doc! { _id: 1, top: "def" }, doc! { _id: 2, top: { a: 1 } }]
            );
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_match_sort_skip_limit_project() {
    run_test(
        create_test_context,
        |ctx| {
            let collection = ctx.collection("test")?;
            insert_test_documents(&collection)?;

            let results = collection.aggregate(&[
                val!(doc! { "$match": { arr: { "$gt": 2 } } }),
                val!(doc! { "$sort": { first_name: (-1) } }),
                val!(doc! { "$skip": 1 }),
                val!(doc! { "$limit": 5 }),
                val!(doc! { "$project": { first_name: 1, _id: 0 } }),
            ])?;
            assert_eq!(results, vec![doc! { first_name: "fn2" }, doc! { first_name: "fn1" }]);

            let none = collection.aggregate(&[val!(doc! { "$limit": 0 })])?;
            assert!(none.is_empty());
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_group_without_key() {
    run_test(
        create_test_context,
        |ctx| {
            let collection = ctx.collection("test")?;
            insert_test_documents(&collection)?;

            let results = collection.aggregate(&[val!(doc! {
                "$group": { _id: null, count: { "$sum": 1 }, names: { "$push": "$first_name" } }
            })])?;
            assert_eq!(
                results,
                vec![doc! { _id: null, count: 3, names: ["fn1", "fn2", "fn3"] }]
            );
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_invalid_pipeline_runs_nothing() {
    run_test(
        create_test_context,
        |ctx| {
            let collection = ctx.collection("test")?;
            insert_test_documents(&collection)?;

            let code = |stages: &[Value]| collection.aggregate(stages).err().and_then(|e| e.code());
            assert_eq!(code(&[val!(doc! { "$match": {}, "$limit": 1 })]), Some(16435));
            assert_eq!(
                code(&[val!(doc! { "$limit": 1 }), val!(doc! { "$unwind": "$arr" })]),
                Some(16436)
            );
            assert_eq!(collection.size(), 3);
            Ok(())
        },
        cleanup,
    )
}
