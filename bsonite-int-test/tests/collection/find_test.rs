use bsonite::collection::FindOptions;
use bsonite::common::{RegexValue, Value};
use bsonite::doc;
use bsonite::errors::ErrorKind;
use bsonite_int_test::test_util::{cleanup, create_test_context, date, field_values, insert_test_documents, run_test};

fn ids(values: &[i32]) -> Vec<Value> {
    values.iter().map(|v| Value::from(*v)).collect()
}

#[test]
fn test_find_all() {
    run_test(
        create_test_context,
        |ctx| {
            let collection = ctx.collection("test")?;
            insert_test_documents(&collection)?;

            let docs = collection.find(&doc! {}, &FindOptions::new())?;
            assert_eq!(field_values(&docs, "_id"), ids(&[1, 2, 3]));
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_find_by_equality_and_comparison() {
    run_test(
        create_test_context,
        |ctx| {
            let collection = ctx.collection("test")?;
            insert_test_documents(&collection)?;

            let docs = collection.find(&doc! { last_name: "ln2" }, &FindOptions::new())?;
            assert_eq!(field_values(&docs, "_id"), ids(&[2, 3]));

            let docs = collection.find(&doc! { first_name: { "$ne": "fn1" } }, &FindOptions::new())?;
            assert_eq!(field_values(&docs, "_id"), ids(&[2, 3]));

            let after = date("2011-01-01T00:00:00Z");
            let docs = collection.find(&doc! { birth_day: { "$gt": after } }, &FindOptions::new())?;
            assert_eq!(field_values(&docs, "_id"), ids(&[1, 3]));

            // strings and numbers are different comparison families
            assert_eq!(collection.count(&doc! { first_name: { "$gt": 0 } })?, 0);
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_find_in_arrays() {
    run_test(
        create_test_context,
        |ctx| {
            let collection = ctx.collection("test")?;
            insert_test_documents(&collection)?;

            assert_eq!(collection.count(&doc! { arr: 4 })?, 2);
            assert_eq!(collection.count(&doc! { arr: { "$gt": 8 } })?, 1);
            assert_eq!(collection.count(&doc! { arr: { "$all": [3, 4] } })?, 1);
            assert_eq!(collection.count(&doc! { arr: { "$all": [1, 4] } })?, 0);
            assert_eq!(collection.count(&doc! { arr: [1, 2, 3] })?, 1);
            assert_eq!(collection.count(&doc! { "arr.0": 9 })?, 1);

            let docs = collection.find(&doc! { list: { "$in": ["five", "one"] } }, &FindOptions::new())?;
            assert_eq!(field_values(&docs, "_id"), ids(&[1, 2]));

            // $nin negates the element-wise retry as a whole
            assert_eq!(collection.count(&doc! { list: { "$nin": ["three"] } })?, 1);

            // $not over an array: no element above 3
            assert_eq!(collection.count(&doc! { arr: { "$not": { "$gt": 3 } } })?, 1);
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_find_missing_and_null() {
    run_test(
        create_test_context,
        |ctx| {
            let collection = ctx.collection("test")?;
            insert_test_documents(&collection)?;

            let docs = collection.find(&doc! { "address.zip": null }, &FindOptions::new())?;
            assert_eq!(field_values(&docs, "_id"), ids(&[2, 3]));

            assert_eq!(collection.count(&doc! { list: { "$exists": false } })?, 1);
            assert_eq!(collection.count(&doc! { "address.zip": { "$exists": true } })?, 2);
            assert_eq!(collection.count(&doc! { "address.city": "Berlin" })?, 1);
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_find_by_regex() {
    run_test(
        create_test_context,
        |ctx| {
            let collection = ctx.collection("test")?;
            insert_test_documents(&collection)?;

            assert_eq!(collection.count(&doc! { body: { "$regex": "quick" } })?, 2);
            assert_eq!(
                collection.count(&doc! { body: { "$regex": "^lorem", "$options": "i" } })?,
                1
            );
            assert_eq!(collection.count(&doc! { body: (RegexValue::new("fox", "")) })?, 1);
            assert_eq!(
                collection.count(&doc! { body: { "$not": (RegexValue::new("quick", "")) } })?,
                1
            );
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_find_with_logical_operators() {
    run_test(
        create_test_context,
        |ctx| {
            let collection = ctx.collection("test")?;
            insert_test_documents(&collection)?;

            assert_eq!(
                collection.count(&doc! { "$or": [{ first_name: "fn1" }, { last_name: "ln2" }] })?,
                3
            );
            assert_eq!(
                collection.count(&doc! { "$and": [{ last_name: "ln2" }, { arr: 9 }] })?,
                1
            );
            assert_eq!(
                collection.count(&doc! { "$nor": [{ first_name: "fn1" }, { first_name: "fn2" }] })?,
                1
            );
            assert_eq!(collection.count(&doc! { "$and": [] })?, 3);
            assert_eq!(collection.count(&doc! { "$or": [] })?, 0);
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_find_with_options() {
    run_test(
        create_test_context,
        |ctx| {
            let collection = ctx.collection("test")?;
            insert_test_documents(&collection)?;

            let docs = collection.find(&doc! {}, &FindOptions::new().skip(1).limit(1))?;
            assert_eq!(field_values(&docs, "_id"), ids(&[2]));

            let docs = collection.find(&doc! {}, &FindOptions::new().skip(5))?;
            assert!(docs.is_empty());

            let docs = collection.find(
                &doc! { _id: 1 },
                &FindOptions::new().projection(doc! { first_name: 1, "address.city": 1 }),
            )?;
            assert_eq!(
                docs,
                vec![doc! { _id: 1, first_name: "fn1", address: { city: "Paris" } }]
            );

            let docs = collection.find(
                &doc! { _id: 3 },
                &FindOptions::new().projection(doc! { body: 0, birth_day: 0, arr: 0 }),
            )?;
            assert_eq!(docs, vec![doc! { _id: 3, first_name: "fn3", last_name: "ln2" }]);
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_projection_examples() {
    run_test(
        create_test_context,
        |ctx| {
            let collection = ctx.collection("projection")?;
            collection.insert(doc! { _id: 1, a: 1, b: { c: "d", x: "y" } })?;

            let included = collection.find(&doc! {}, &FindOptions::new().projection(doc! { "b.c": 1 }))?;
            assert_eq!(included, vec![doc! { _id: 1, b: { c: "d" } }]);

            let excluded = collection.find(&doc! {}, &FindOptions::new().projection(doc! { "b.c": 0 }))?;
            assert_eq!(excluded, vec![doc! { _id: 1, a: 1, b: { x: "y" } }]);
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_find_invalid_queries() {
    run_test(
        create_test_context,
        |ctx| {
            let collection = ctx.collection("test")?;
            insert_test_documents(&collection)?;

            let invalid = vec![
                doc! { "$where": "this.a == 1" },
                doc! { "$or": { a: 1 } },
                doc! { a: { "$in": 1 } },
                doc! { a: { "$bogus": 1 } },
                doc! { a: { "$regex": 5 } },
                doc! { a: { "$regex": "(" } },
            ];
            for query in invalid {
                let err = collection.find(&query, &FindOptions::new()).err();
                assert_eq!(err.map(|e| e.kind().clone()), Some(ErrorKind::BadValue), "{}", query);
            }

            let err = collection
                .find(&doc! {}, &FindOptions::new().projection(doc! { a: 1, b: 0 }))
                .err();
            assert!(err.is_some());
            Ok(())
        },
        cleanup,
    )
}
