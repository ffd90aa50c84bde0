//! Field projection of result documents.
//!
//! A projection spec maps dotted paths to a truthy (include) or falsy
//! (exclude) flag. Inclusion and exclusion cannot be mixed, except that `_id`
//! may always be excluded.

use std::fmt::Display;

use crate::collection::{Document, FieldPath};
use crate::common::DOC_ID;
use crate::errors::{BsoniteError, BsoniteResult, ErrorKind};

#[derive(Clone, Debug, PartialEq)]
enum Mode {
    Identity,
    Include { paths: Vec<FieldPath>, include_id: bool },
    Exclude { paths: Vec<FieldPath> },
}

/// A validated projection spec.
///
/// # Examples
///
/// ```rust,ignore
/// use bsonite::doc;
/// use bsonite::projection::Projection;
///
/// let projection = Projection::parse(&doc!{ "a.b": 1, _id: 0 })?;
/// let projected = projection.apply(&doc!{ _id: 1, a: { b: 2, c: 3 }, d: 4 })?;
/// assert_eq!(projected, doc!{ a: { b: 2 } });
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct Projection {
    mode: Mode,
}

impl Projection {
    /// A projection returning documents unchanged.
    pub fn identity() -> Projection {
        Projection { mode: Mode::Identity }
    }

    /// Validates `spec` and builds the projection. An empty spec is the identity.
    pub fn parse(spec: &Document) -> BsoniteResult<Projection> {
        let mut inclusions = Vec::new();
        let mut exclusions = Vec::new();
        let mut id_flag = None;

        for (field, flag) in spec.iter() {
            if field == DOC_ID {
                id_flag = Some(flag.is_truthy());
                continue;
            }
            let path = FieldPath::parse(field);
            path.validate()?;
            if flag.is_truthy() {
                inclusions.push(path);
            } else {
                exclusions.push(path);
            }
        }

        if !inclusions.is_empty() && !exclusions.is_empty() {
            log::error!("Projection {} mixes inclusion and exclusion", spec);
            return Err(BsoniteError::new(
                "Projection cannot have a mix of inclusion and exclusion.",
                ErrorKind::BadValue,
            ));
        }

        let mode = match id_flag {
            _ if !inclusions.is_empty() => Mode::Include {
                paths: inclusions,
                include_id: id_flag != Some(false),
            },
            Some(false) => {
                exclusions.push(FieldPath::parse(DOC_ID));
                Mode::Exclude { paths: exclusions }
            }
            _ if !exclusions.is_empty() => Mode::Exclude { paths: exclusions },
            Some(true) => Mode::Include {
                paths: Vec::new(),
                include_id: true,
            },
            None => Mode::Identity,
        };
        Ok(Projection { mode })
    }

    /// Parses an optional spec, treating `None` as the identity.
    pub fn parse_optional(spec: Option<&Document>) -> BsoniteResult<Projection> {
        match spec {
            Some(spec) => Projection::parse(spec),
            None => Ok(Projection::identity()),
        }
    }

    pub fn is_identity(&self) -> bool {
        self.mode == Mode::Identity
    }

    /// Projects one document.
    pub fn apply(&self, doc: &Document) -> BsoniteResult<Document> {
        match &self.mode {
            Mode::Identity => Ok(doc.clone()),
            Mode::Include { paths, include_id } => {
                let mut projected = Document::new();
                if *include_id {
                    if let Some(id) = doc.id() {
                        projected.put(DOC_ID, id.clone());
                    }
                }
                for path in paths {
                    if let Some(value) = path.get(doc) {
                        path.set(&mut projected, value.clone())?;
                    }
                }
                Ok(projected)
            }
            Mode::Exclude { paths } => {
                let mut projected = doc.clone();
                for path in paths {
                    path.delete(&mut projected);
                }
                Ok(projected)
            }
        }
    }

    /// Projects every document of `docs`.
    pub fn apply_all(&self, docs: Vec<Document>) -> BsoniteResult<Vec<Document>> {
        if self.is_identity() {
            return Ok(docs);
        }
        docs.iter().map(|doc| self.apply(doc)).collect()
    }
}

impl Display for Projection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let join = |paths: &[FieldPath]| {
            paths.iter().map(|p| p.to_string()).collect::<Vec<_>>().join(", ")
        };
        match &self.mode {
            Mode::Identity => write!(f, "identity"),
            Mode::Include { paths, include_id } => {
                write!(f, "include [{}] with _id {}", join(paths), include_id)
            }
            Mode::Exclude { paths } => write!(f, "exclude [{}]", join(paths)),
        }
    }
}

/// Applies `spec` to `docs`; a `None` or empty spec returns them unchanged.
pub fn project(docs: Vec<Document>, spec: Option<&Document>) -> BsoniteResult<Vec<Document>> {
    Projection::parse_optional(spec)?.apply_all(docs)
}
