use bsonite::bsonite::Bsonite;
use bsonite::collection::{Collection, Document};
use bsonite::doc;
use bsonite::errors::BsoniteResult;
use chrono::{DateTime, Utc};
use std::panic::{RefUnwindSafe, UnwindSafe};

pub const TEST_DATABASE: &str = "test";

/// Runs `test` against a fresh context, then `after`, failing with the
/// first error or panic message.
pub fn run_test<T, B, A>(before: B, test: T, after: A)
where
    T: Fn(TestContext) -> BsoniteResult<()> + UnwindSafe + RefUnwindSafe,
    B: Fn() -> BsoniteResult<TestContext> + UnwindSafe + RefUnwindSafe,
    A: Fn(TestContext) -> BsoniteResult<()> + UnwindSafe + RefUnwindSafe,
{
    let result = std::panic::catch_unwind(|| -> Result<(), String> {
        let ctx = before().map_err(|e| format!("Before run failed: {:?}", e))?;
        let test_result = test(ctx.clone());
        let after_result = after(ctx);
        test_result.map_err(|e| format!("Test failed: {:?}", e))?;
        after_result.map_err(|e| format!("After run failed: {:?}", e))
    });

    match result {
        Ok(Ok(())) => {}
        Ok(Err(message)) => panic!("{}", message),
        Err(panic) => std::panic::resume_unwind(panic),
    }
}

#[derive(Clone)]
pub struct TestContext {
    db: Bsonite,
}

impl TestContext {
    pub fn new(db: Bsonite) -> Self {
        Self { db }
    }

    pub fn db(&self) -> Bsonite {
        self.db.clone()
    }

    /// The collection `name` in the test database.
    pub fn collection(&self, name: &str) -> BsoniteResult<Collection> {
        self.db.collection(TEST_DATABASE, name)
    }
}

pub fn create_test_context() -> BsoniteResult<TestContext> {
    let db = Bsonite::builder().default_database(TEST_DATABASE).open()?;
    Ok(TestContext::new(db))
}

pub fn cleanup(ctx: TestContext) -> BsoniteResult<()> {
    for database in ctx.db().database_names() {
        ctx.db().drop_database(&database);
    }
    Ok(())
}

pub fn date(rfc3339: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(rfc3339)
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_default()
}

pub fn create_test_docs() -> Vec<Document> {
    let dt1 = date("2012-07-01T02:15:22+02:00");
    let dt2 = date("2010-06-12T12:05:35+05:30");
    let dt3 = date("2014-04-17T22:25:44-04:00");

    let doc1 = doc! {
        _id: 1,
        first_name: "fn1",
        last_name: "ln1",
        birth_day: dt1,
        arr: [1, 2, 3],
        list: ["one", "two", "three"],
        address: { city: "Paris", zip: "75001" },
        body: "a quick brown fox jump over the lazy dog",
    };

    let doc2 = doc! {
        _id: 2,
        first_name: "fn2",
        last_name: "ln2",
        birth_day: dt2,
        arr: [3, 4, 3],
        list: ["three", "four", "five"],
        address: { city: "Berlin", zip: null },
        body: "quick hello world from bsonite",
    };

    let doc3 = doc! {
        _id: 3,
        first_name: "fn3",
        last_name: "ln2",
        birth_day: dt3,
        arr: [9, 4, 8],
        body: "Lorem ipsum dolor sit amet, consectetur \
        adipiscing elit. Sed nunc mi, mattis ullamcorper \
        dignissim vitae, condimentum non lorem.",
    };

    vec![doc1, doc2, doc3]
}

pub fn insert_test_documents(collection: &Collection) -> BsoniteResult<()> {
    collection.insert_many(create_test_docs())?;
    Ok(())
}

/// Values of `field` across `docs`, in order.
pub fn field_values(docs: &[Document], field: &str) -> Vec<bsonite::common::Value> {
    docs.iter()
        .map(|doc| doc.get(field).cloned().unwrap_or(bsonite::common::Value::Null))
        .collect()
}
