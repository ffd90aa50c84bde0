use bsonite::collection::{FindOptions, UpdateOptions};
use bsonite::doc;
use bsonite::wire::{
    DeleteMessage, InsertMessage, Namespace, OpCode, QueryMessage, Reply, Request, UpdateMessage,
};
use bsonite_int_test::test_util::{cleanup, create_test_context, create_test_docs, insert_test_documents, run_test};
use bytes::BytesMut;

#[test]
fn test_query_drives_find() {
    run_test(
        create_test_context,
        |ctx| {
            let collection = ctx.collection("test")?;
            insert_test_documents(&collection)?;
            let codec = ctx.db().wire_codec();

            let query = Request::Query(QueryMessage {
                flags: 0,
                namespace: Namespace::new("test", "test"),
                skip: 0,
                number_to_return: 0,
                query: doc! { last_name: "ln2" },
                return_fields: Some(doc! { first_name: 1 }),
            });
            let bytes = codec.encode_request(7, &query)?;
            let Some((message, consumed)) = codec.decode(&bytes)? else {
                panic!("query not decoded");
            };
            assert_eq!(consumed, bytes.len());
            assert_eq!(message.header.request_id, 7);
            assert_eq!(message.header.op_code, OpCode::Query);

            let Request::Query(decoded) = message.request else {
                panic!("expected a query");
            };
            let target = ctx
                .db()
                .collection(decoded.namespace.database(), decoded.namespace.collection())?;
            let mut options = FindOptions::new().skip(decoded.skip as u64);
            if let Some(fields) = decoded.return_fields {
                options = options.projection(fields);
            }
            let docs = target.find(&decoded.query, &options)?;

            let reply = codec.encode_reply(8, message.header.request_id, &Reply::new(docs))?;
            let Some((header, reply, _)) = codec.decode_reply(&reply)? else {
                panic!("reply not decoded");
            };
            assert_eq!(header.response_to, 7);
            assert_eq!(reply.number_returned(), 2);
            assert_eq!(
                reply.documents,
                vec![doc! { _id: 2, first_name: "fn2" }, doc! { _id: 3, first_name: "fn3" }]
            );
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_reply_preserves_documents() {
    run_test(
        create_test_context,
        |ctx| {
            let codec = ctx.db().wire_codec();
            let bytes = codec.encode_reply(1, 0, &Reply::new(create_test_docs()))?;
            let Some((_, reply, consumed)) = codec.decode_reply(&bytes)? else {
                panic!("reply not decoded");
            };
            assert_eq!(consumed, bytes.len());
            assert_eq!(reply.documents, create_test_docs());
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_write_requests_apply_to_collection() {
    run_test(
        create_test_context,
        |ctx| {
            let codec = ctx.db().wire_codec();
            let namespace = Namespace::new("test", "wire");
            let requests = vec![
                Request::Insert(InsertMessage {
                    flags: 0,
                    namespace: namespace.clone(),
                    documents: vec![doc! { _id: 1, n: 1 }, doc! { _id: 2, n: 2 }],
                }),
                Request::Update(UpdateMessage {
                    namespace: namespace.clone(),
                    flags: 0,
                    selector: doc! { _id: 1 },
                    update: doc! { "$inc": { n: 10 } },
                }),
                Request::Delete(DeleteMessage {
                    namespace: namespace.clone(),
                    flags: 1 << 1,
                    selector: doc! { _id: 2 },
                }),
            ];

            let mut buf = BytesMut::new();
            for (id, request) in requests.iter().enumerate() {
                buf.extend_from_slice(&codec.encode_request(id as i32, request)?);
            }

            let collection = ctx.collection("wire")?;
            while let Some(message) = codec.decode_buf(&mut buf)? {
                match message.request {
                    Request::Insert(insert) => {
                        collection.insert_many(insert.documents)?;
                    }
                    Request::Update(update) => {
                        let options = UpdateOptions::new(update.upsert(), update.multi_update());
                        collection.update(&update.selector, &update.update, &options)?;
                    }
                    Request::Delete(delete) => {
                        collection.remove(&delete.selector, delete.single_remove())?;
                    }
                    other => panic!("unexpected request {:?}", other),
                }
            }
            assert!(buf.is_empty());

            let docs = collection.find(&doc! {}, &FindOptions::new())?;
            assert_eq!(docs, vec![doc! { _id: 1, n: 11 }]);
            Ok(())
        },
        cleanup,
    )
}
