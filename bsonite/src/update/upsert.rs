use crate::collection::{Document, FieldPath, ObjectId};
use crate::common::{Value, DOC_ID};
use crate::errors::BsoniteResult;
use crate::filter::is_operator_document;

/// Copies the equality constraints of `query` into `target`.
///
/// `$and` branches are followed, `$or` and `$nor` are skipped. A field whose
/// expression is a plain value, or an operator document holding `$eq`, is set
/// at its path. Regex literals and other operators contribute nothing.
pub(crate) fn seed_from_query(query: &Document, target: &mut Document) -> BsoniteResult<()> {
    for (key, expression) in query.iter() {
        if key == "$and" {
            if let Value::Array(branches) = expression {
                for branch in branches {
                    if let Value::Document(branch) = branch {
                        seed_from_query(branch, target)?;
                    }
                }
            }
            continue;
        }
        if key.starts_with('$') {
            continue;
        }

        let value = match expression {
            Value::Regex(_) => continue,
            Value::Document(operators) if is_operator_document(operators) => {
                match operators.get("$eq") {
                    Some(value) => value.clone(),
                    None => continue,
                }
            }
            literal => literal.clone(),
        };
        FieldPath::parse(key).set(target, value)?;
    }
    Ok(())
}

/// Appends a fresh ObjectId when the document has no `_id`, and returns the id.
pub(crate) fn ensure_id(doc: &mut Document) -> Value {
    if let Some(id) = doc.id() {
        return id.clone();
    }
    let id = Value::ObjectId(ObjectId::new());
    doc.put(DOC_ID, id.clone());
    id
}
