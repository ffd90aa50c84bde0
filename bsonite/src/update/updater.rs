use std::fmt::Display;

use crate::collection::{Document, UpdateOptions, UpdateResult};
use crate::common::DOC_ID;
use crate::errors::{BsoniteError, BsoniteResult, ErrorKind};
use crate::filter::Filter;

use super::modifier::Modifier;
use super::upsert::{ensure_id, seed_from_query};

#[derive(Clone)]
enum UpdateKind {
    /// Every top-level key is a literal: the matched document is replaced.
    Replacement(Document),
    Operators(Vec<Modifier>),
}

/// A parsed update document.
///
/// Parsing validates every modifier, so a malformed update is rejected before
/// any document is touched. Applying it mutates the matched documents in place
/// and, when asked to, synthesizes an upserted document.
///
/// # Examples
///
/// ```rust,ignore
/// use bsonite::doc;
/// use bsonite::collection::upsert;
/// use bsonite::update::Updater;
///
/// let updater = Updater::parse(&doc!{ "$inc": { hits: 1 } })?;
/// let result = updater.apply(&mut documents, &doc!{ page: "home" }, &upsert())?;
/// ```
#[derive(Clone)]
pub struct Updater {
    kind: UpdateKind,
}

impl Updater {
    /// Parses an update document.
    ///
    /// A document with no `$` key is a replacement. Otherwise every key must be
    /// a known modifier.
    pub fn parse(spec: &Document) -> BsoniteResult<Updater> {
        if !spec.keys().any(|key| key.starts_with('$')) {
            return Ok(Updater {
                kind: UpdateKind::Replacement(spec.clone()),
            });
        }

        let mut modifiers = Vec::new();
        for (operator, operand) in spec.iter() {
            if !operator.starts_with('$') {
                log::error!("Update mixes modifiers with literal field '{}'", operator);
                return Err(BsoniteError::new(
                    &format!("Unknown modifier: {}", operator),
                    ErrorKind::BadValue,
                ));
            }
            modifiers.extend(Modifier::parse(operator, operand)?);
        }
        Ok(Updater {
            kind: UpdateKind::Operators(modifiers),
        })
    }

    pub fn is_replacement(&self) -> bool {
        matches!(self.kind, UpdateKind::Replacement(_))
    }

    /// Applies the update to one existing document.
    pub fn apply_to(&self, doc: &mut Document) -> BsoniteResult<()> {
        match &self.kind {
            UpdateKind::Replacement(replacement) => {
                doc.retain(|key, _| key == DOC_ID || replacement.contains_key(key));
                for (key, value) in replacement.iter() {
                    doc.put(key.as_str(), value.clone());
                }
                Ok(())
            }
            UpdateKind::Operators(modifiers) => {
                for modifier in modifiers {
                    modifier.apply(doc, false)?;
                }
                Ok(())
            }
        }
    }

    /// Builds the document inserted by an upsert that matched nothing.
    ///
    /// A replacement is used verbatim; operator updates start from the
    /// equality constraints of `query`. A fresh `_id` is added when missing.
    pub fn build_upsert(&self, query: &Document) -> BsoniteResult<Document> {
        let mut doc = match &self.kind {
            UpdateKind::Replacement(replacement) => replacement.clone(),
            UpdateKind::Operators(modifiers) => {
                let mut seeded = Document::new();
                seed_from_query(query, &mut seeded)?;
                for modifier in modifiers {
                    modifier.apply(&mut seeded, true)?;
                }
                seeded
            }
        };
        ensure_id(&mut doc);
        Ok(doc)
    }

    /// Applies the update to the documents of a collection that match `query`.
    ///
    /// Without `multi` only the first match is updated. A failure on one
    /// document stops the update there; earlier documents keep their changes.
    pub fn apply(
        &self,
        documents: &mut Vec<Document>,
        query: &Document,
        options: &UpdateOptions,
    ) -> BsoniteResult<UpdateResult> {
        let filter = Filter::parse(query)?;

        let mut targets = Vec::new();
        for (index, doc) in documents.iter().enumerate() {
            if filter.apply(doc)? {
                targets.push(index);
                if !options.is_multi() {
                    break;
                }
            }
        }

        if targets.is_empty() {
            if !options.is_upsert() {
                return Ok(UpdateResult::default());
            }
            let doc = self.build_upsert(query)?;
            let id = doc.id().cloned();
            log::debug!("Upserting document {} for query {}", doc, filter);
            documents.push(doc);
            return Ok(UpdateResult::new(0, 0, id));
        }

        let mut modified = 0;
        for index in targets.iter().copied() {
            let doc = &mut documents[index];
            let before = doc.clone();
            self.apply_to(doc)?;
            if *doc != before {
                modified += 1;
            }
        }
        Ok(UpdateResult::new(targets.len(), modified, None))
    }
}

impl Display for Updater {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.kind {
            UpdateKind::Replacement(doc) => write!(f, "replace with {}", doc),
            UpdateKind::Operators(modifiers) => {
                let names: Vec<String> = modifiers.iter().map(|m| m.to_string()).collect();
                write!(f, "[{}]", names.join(", "))
            }
        }
    }
}
