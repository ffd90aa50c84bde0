use std::cmp::Ordering;
use std::fmt::Display;

use crate::collection::{Document, FieldPath};
use crate::common::{compare_values, ordering_to_int, Value, MISSING_TYPE_NAME};
use crate::errors::{BsoniteError, BsoniteResult, ErrorKind};

use super::pipeline_error;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum CompareOp {
    Eq,
    Ne,
    Lt,
    Lte,
    Gt,
    Gte,
    Cmp,
}

impl CompareOp {
    fn from_name(name: &str) -> Option<CompareOp> {
        match name {
            "$eq" => Some(CompareOp::Eq),
            "$ne" => Some(CompareOp::Ne),
            "$lt" => Some(CompareOp::Lt),
            "$lte" => Some(CompareOp::Lte),
            "$gt" => Some(CompareOp::Gt),
            "$gte" => Some(CompareOp::Gte),
            "$cmp" => Some(CompareOp::Cmp),
            _ => None,
        }
    }

    fn name(&self) -> &'static str {
        match self {
            CompareOp::Eq => "$eq",
            CompareOp::Ne => "$ne",
            CompareOp::Lt => "$lt",
            CompareOp::Lte => "$lte",
            CompareOp::Gt => "$gt",
            CompareOp::Gte => "$gte",
            CompareOp::Cmp => "$cmp",
        }
    }

    fn evaluate(&self, ordering: Ordering) -> Value {
        match self {
            CompareOp::Eq => Value::Bool(ordering == Ordering::Equal),
            CompareOp::Ne => Value::Bool(ordering != Ordering::Equal),
            CompareOp::Lt => Value::Bool(ordering == Ordering::Less),
            CompareOp::Lte => Value::Bool(ordering != Ordering::Greater),
            CompareOp::Gt => Value::Bool(ordering == Ordering::Greater),
            CompareOp::Gte => Value::Bool(ordering != Ordering::Less),
            CompareOp::Cmp => Value::from(ordering_to_int(ordering)),
        }
    }
}

/// A validated aggregation expression.
///
/// Parsing performs every structural check, so evaluation only fails on
/// runtime type errors such as `$size` of a non-array.
#[derive(Clone, Debug, PartialEq)]
pub(crate) enum Expression {
    Literal(Value),
    Field(FieldPath),
    Object(Vec<(String, Expression)>),
    IfNull(Box<Expression>, Box<Expression>),
    Compare(CompareOp, Box<Expression>, Box<Expression>),
    Size(Box<Expression>),
    Cond(Box<Expression>, Box<Expression>, Box<Expression>),
}

impl Expression {
    /// Parses an expression in value position.
    pub(crate) fn parse(value: &Value) -> BsoniteResult<Expression> {
        match value {
            Value::String(text) if text.starts_with('$') => {
                Ok(Expression::Field(FieldPath::parse(&text[1..])))
            }
            Value::Document(doc) => Expression::parse_document(doc),
            other => Ok(Expression::Literal(other.clone())),
        }
    }

    fn parse_document(doc: &Document) -> BsoniteResult<Expression> {
        let Some((first, operand)) = doc.iter().next() else {
            return Ok(Expression::Object(Vec::new()));
        };

        if first.starts_with('$') {
            if doc.size() > 1 {
                return Err(pipeline_error(
                    15983,
                    format!(
                        "the operator must be the only field in a pipeline object (at '{}')",
                        first
                    ),
                ));
            }
            return Expression::parse_operator(first, operand);
        }

        let mut fields = Vec::with_capacity(doc.size());
        for (field, value) in doc.iter() {
            if field.starts_with('$') {
                return Err(pipeline_error(
                    15990,
                    format!(
                        "this object is already an operator expression, and can't be used as a document expression (at '{}')",
                        field
                    ),
                ));
            }
            if matches!(value, Value::Number(_) | Value::Bool(_)) {
                return Err(pipeline_error(
                    16420,
                    "field inclusion is not allowed inside of $expressions".to_string(),
                ));
            }
            fields.push((field.clone(), Expression::parse(value)?));
        }
        Ok(Expression::Object(fields))
    }

    fn parse_operator(name: &str, operand: &Value) -> BsoniteResult<Expression> {
        if name == "$cond" {
            if let Value::Document(params) = operand {
                return Expression::parse_cond_document(params);
            }
        }

        let args = match operand {
            Value::Array(items) => items.iter().map(Expression::parse).collect::<BsoniteResult<Vec<_>>>()?,
            single => vec![Expression::parse(single)?],
        };

        if let Some(op) = CompareOp::from_name(name) {
            let [lhs, rhs] = arity::<2>(name, args)?;
            return Ok(Expression::Compare(op, Box::new(lhs), Box::new(rhs)));
        }

        match name {
            "$ifNull" => {
                let [value, replacement] = arity::<2>(name, args)?;
                Ok(Expression::IfNull(Box::new(value), Box::new(replacement)))
            }
            "$size" => {
                let [array] = arity::<1>(name, args)?;
                Ok(Expression::Size(Box::new(array)))
            }
            "$cond" => {
                let [condition, then, otherwise] = arity::<3>(name, args)?;
                Ok(Expression::Cond(
                    Box::new(condition),
                    Box::new(then),
                    Box::new(otherwise),
                ))
            }
            unknown => Err(pipeline_error(15999, format!("invalid operator '{}'", unknown))),
        }
    }

    fn parse_cond_document(params: &Document) -> BsoniteResult<Expression> {
        if let Some(unknown) = params
            .keys()
            .find(|key| !matches!(key.as_str(), "if" | "then" | "else"))
        {
            return Err(pipeline_error(
                17083,
                format!("Unrecognized parameter to $cond: {}", unknown),
            ));
        }

        let parameter = |name: &str| -> BsoniteResult<Box<Expression>> {
            match params.get(name) {
                Some(value) => Ok(Box::new(Expression::parse(value)?)),
                None => Err(pipeline_error(
                    17080,
                    format!("Missing '{}' parameter to $cond", name),
                )),
            }
        };
        Ok(Expression::Cond(
            parameter("if")?,
            parameter("then")?,
            parameter("else")?,
        ))
    }

    /// Evaluates against `doc`; a missing field evaluates to `Null`.
    pub(crate) fn evaluate(&self, doc: &Document) -> BsoniteResult<Value> {
        Ok(self.evaluate_optional(doc)?.unwrap_or(Value::Null))
    }

    /// Evaluates against `doc`, reporting a missing field as `None`.
    pub(crate) fn evaluate_optional(&self, doc: &Document) -> BsoniteResult<Option<Value>> {
        match self {
            Expression::Literal(value) => Ok(Some(value.clone())),
            Expression::Field(path) => Ok(path.get(doc).cloned()),
            Expression::Object(fields) => {
                let mut result = Document::new();
                for (field, expression) in fields {
                    if let Some(value) = expression.evaluate_optional(doc)? {
                        result.put(field.as_str(), value);
                    }
                }
                Ok(Some(Value::Document(result)))
            }
            Expression::IfNull(value, replacement) => match value.evaluate_optional(doc)? {
                Some(value) if !value.is_null() => Ok(Some(value)),
                _ => replacement.evaluate_optional(doc),
            },
            Expression::Compare(op, lhs, rhs) => {
                let lhs = lhs.evaluate(doc)?;
                let rhs = rhs.evaluate(doc)?;
                Ok(Some(op.evaluate(compare_values(&lhs, &rhs))))
            }
            Expression::Size(array) => match array.evaluate_optional(doc)? {
                Some(Value::Array(items)) => Ok(Some(Value::from(items.len()))),
                other => {
                    let type_name = other.as_ref().map_or(MISSING_TYPE_NAME, Value::type_name);
                    log::error!("$size applied to {}", type_name);
                    Err(BsoniteError::new(
                        &format!(
                            "The argument to $size must be an Array, but was of type: {}",
                            type_name
                        ),
                        ErrorKind::TypeMismatch,
                    )
                    .with_code(17124))
                }
            },
            Expression::Cond(condition, then, otherwise) => {
                let truthy = condition
                    .evaluate_optional(doc)?
                    .is_some_and(|value| value.is_truthy());
                if truthy {
                    then.evaluate_optional(doc)
                } else {
                    otherwise.evaluate_optional(doc)
                }
            }
        }
    }
}

impl Display for Expression {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Expression::Literal(value) => write!(f, "{}", value),
            Expression::Field(path) => write!(f, "${}", path),
            Expression::Object(fields) => {
                let parts: Vec<String> = fields
                    .iter()
                    .map(|(field, expression)| format!("{}: {}", field, expression))
                    .collect();
                write!(f, "{{{}}}", parts.join(", "))
            }
            Expression::IfNull(value, replacement) => {
                write!(f, "$ifNull({}, {})", value, replacement)
            }
            Expression::Compare(op, lhs, rhs) => write!(f, "{}({}, {})", op.name(), lhs, rhs),
            Expression::Size(array) => write!(f, "$size({})", array),
            Expression::Cond(condition, then, otherwise) => {
                write!(f, "$cond({}, {}, {})", condition, then, otherwise)
            }
        }
    }
}

fn arity<const N: usize>(name: &str, args: Vec<Expression>) -> BsoniteResult<[Expression; N]> {
    let count = args.len();
    args.try_into().map_err(|_| {
        pipeline_error(
            16020,
            format!(
                "Expression {} takes exactly {} arguments. {} were passed in.",
                name, N, count
            ),
        )
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{doc, val};

    fn eval(expression: Value, doc: &Document) -> Value {
        Expression::parse(&expression).unwrap().evaluate(doc).unwrap()
    }

    fn parse_code(expression: Value) -> Option<i32> {
        Expression::parse(&expression).err().unwrap().code()
    }

    #[test]
    fn literals_and_fields() {
        let doc = doc! { a: { b: 5 } };
        assert_eq!(eval(val!(3), &doc), val!(3));
        assert_eq!(eval(val!("plain"), &doc), val!("plain"));
        assert_eq!(eval(val!("$a.b"), &doc), val!(5));
        assert_eq!(eval(val!("$missing"), &doc), Value::Null);
    }

    #[test]
    fn object_expression() {
        let doc = doc! { a: 1, b: 2 };
        assert_eq!(
            eval(val!(doc! { x: "$a", y: "$b", z: "$nope" }), &doc),
            val!(doc! { x: 1, y: 2 })
        );
    }

    #[test]
    fn if_null_is_lazy() {
        let doc = doc! { a: null, b: [1] };
        assert_eq!(eval(val!(doc! { "$ifNull": ["$a", "fallback"] }), &doc), val!("fallback"));
        assert_eq!(eval(val!(doc! { "$ifNull": ["$b", "fallback"] }), &doc), val!(vec![1]));
        // the replacement is never evaluated when the value is present
        assert_eq!(
            eval(val!(doc! { "$ifNull": ["$b", { "$size": "$a" }] }), &doc),
            val!(vec![1])
        );
    }

    #[test]
    fn comparisons_use_full_order() {
        let doc = doc! { n: 5, s: "x" };
        assert_eq!(eval(val!(doc! { "$gt": ["$s", "$n"] }), &doc), val!(true));
        assert_eq!(eval(val!(doc! { "$eq": ["$n", 5] }), &doc), val!(true));
        assert_eq!(eval(val!(doc! { "$cmp": ["$n", 7] }), &doc), val!(-1));
        assert_eq!(eval(val!(doc! { "$cmp": ["$n", "$n"] }), &doc), val!(0));
        assert_eq!(eval(val!(doc! { "$lte": ["$missing", null] }), &doc), val!(true));
    }

    #[test]
    fn size_of_array_and_type_mismatch() {
        let doc = doc! { a: [1, 2, 3], s: "abc" };
        assert_eq!(eval(val!(doc! { "$size": "$a" }), &doc), val!(3));

        let expression = Expression::parse(&val!(doc! { "$size": "$s" })).unwrap();
        let err = expression.evaluate(&doc).err().unwrap();
        assert_eq!(err.kind(), &ErrorKind::TypeMismatch);
        assert_eq!(err.code(), Some(17124));
        assert!(err.message().ends_with("string"));

        let expression = Expression::parse(&val!(doc! { "$size": "$nope" })).unwrap();
        let err = expression.evaluate(&doc).err().unwrap();
        assert!(err.message().ends_with("missing"));
    }

    #[test]
    fn cond_forms() {
        let doc = doc! { flag: 0, list: [] };
        assert_eq!(eval(val!(doc! { "$cond": ["$flag", "yes", "no"] }), &doc), val!("no"));
        assert_eq!(eval(val!(doc! { "$cond": ["$list", "yes", "no"] }), &doc), val!("yes"));
        assert_eq!(
            eval(val!(doc! { "$cond": { "if": "$missing", "then": 1, "else": 2 } }), &doc),
            val!(2)
        );
    }

    #[test]
    fn structural_errors() {
        assert_eq!(parse_code(val!(doc! { "$bogus": 1 })), Some(15999));
        assert_eq!(parse_code(val!(doc! { "$eq": [1, 2], "$ne": [1, 2] })), Some(15983));
        assert_eq!(parse_code(val!(doc! { a: "$x", "$eq": [1, 2] })), Some(15990));
        assert_eq!(parse_code(val!(doc! { "$eq": [1] })), Some(16020));
        assert_eq!(parse_code(val!(doc! { "$size": [1, 2] })), Some(16020));
        assert_eq!(parse_code(val!(doc! { a: 1 })), Some(16420));
        assert_eq!(parse_code(val!(doc! { "$cond": { "if": 1, "then": 2 } })), Some(17080));
        assert_eq!(
            parse_code(val!(doc! { "$cond": { "if": 1, "then": 2, "else": 3, "other": 4 } })),
            Some(17083)
        );
    }

    #[test]
    fn nested_errors_surface() {
        assert_eq!(parse_code(val!(doc! { x: { "$bogus": 1 } })), Some(15999));
        assert_eq!(parse_code(val!(doc! { "$ifNull": [{ "$bogus": 1 }, 1] })), Some(15999));
    }

    #[test]
    fn display() {
        let expression = Expression::parse(&val!(doc! { "$cmp": ["$a", 1] })).unwrap();
        assert_eq!(expression.to_string(), "$cmp($a, 1)");
    }
}
