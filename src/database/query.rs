//! Filtered reads that a [`DocumentStore`](super::store::DocumentStore) runs
//! server side when it can.
//!
//! Filters use MongoDB query syntax over the store form of a document, so an
//! identity field is addressed as `_id`. [`MemoryStore`](super::store::MemoryStore)
//! understands the subset used in this crate: equality (an array field matches
//! when it contains the value) and `$in`.

use bson::{doc, Bson};
use std::cmp::Ordering;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Query {
    pub filter: bson::Document,
    /// `{ field: 1 }` ascending or `{ field: -1 }` descending
    pub sort: Option<bson::Document>,
    pub limit: Option<i64>
}

impl Query {
    pub fn filter(filter: bson::Document) -> Query {
        Query {
            filter,
            ..Query::default()
        }
    }

    pub fn sort_by(mut self, field: &str, descending: bool) -> Query {
        let mut sort = bson::Document::new();
        sort.insert(field, if descending { -1 } else { 1 });
        self.sort = Some(sort);

        self
    }

    pub fn limit(mut self, limit: i64) -> Query {
        self.limit = Some(limit);

        self
    }
}

/// Whether a stored document satisfies `filter`.
pub(crate) fn matches(document: &bson::Document, filter: &bson::Document) -> bool {
    filter.iter().all(|(field, condition)| {
        let value = document.get(field);

        match condition {
            Bson::Document(operators) if is_operator_document(operators) => operators
                .iter()
                .all(|(operator, argument)| match (operator.as_str(), argument) {
                    ("$in", Bson::Array(candidates)) => candidates.iter().any(|c| value_matches(value, c)),
                    _ => false
                }),
            expected => value_matches(value, expected)
        }
    })
}

fn is_operator_document(document: &bson::Document) -> bool {
    document.keys().next().is_some_and(|k| k.starts_with('$'))
}

fn value_matches(value: Option<&Bson>, expected: &Bson) -> bool {
    match value {
        None => *expected == Bson::Null,
        Some(Bson::Array(items)) => items.contains(expected) || Bson::Array(items.clone()) == *expected,
        Some(value) => value == expected
    }
}

/// Orders two stored documents by the first field of a sort specification.
pub(crate) fn compare(a: &bson::Document, b: &bson::Document, sort: &bson::Document) -> Ordering {
    let Some((field, direction)) = sort.iter().next() else {
        return Ordering::Equal;
    };

    let ordering = compare_values(a.get(field), b.get(field));
    let descending = matches!(direction, Bson::Int32(d) if *d < 0) || matches!(direction, Bson::Int64(d) if *d < 0);

    if descending {
        ordering.reverse()
    } else {
        ordering
    }
}

// MongoDB's cross-type order for the types these documents hold
fn type_order(value: Option<&Bson>) -> u8 {
    match value {
        None | Some(Bson::Null) => 0,
        Some(Bson::Int32(_) | Bson::Int64(_) | Bson::Double(_)) => 1,
        Some(Bson::String(_)) => 2,
        Some(Bson::Document(_)) => 3,
        Some(Bson::Array(_)) => 4,
        Some(Bson::ObjectId(_)) => 5,
        Some(Bson::Boolean(_)) => 6,
        Some(Bson::DateTime(_)) => 7,
        Some(_) => 8
    }
}

fn as_f64(value: &Bson) -> Option<f64> {
    match value {
        Bson::Int32(v) => Some(*v as f64),
        Bson::Int64(v) => Some(*v as f64),
        Bson::Double(v) => Some(*v),
        _ => None
    }
}

fn compare_values(a: Option<&Bson>, b: Option<&Bson>) -> Ordering {
    let by_type = type_order(a).cmp(&type_order(b));
    if by_type != Ordering::Equal {
        return by_type;
    }

    match (a, b) {
        (Some(Bson::String(a)), Some(Bson::String(b))) => a.cmp(b),
        (Some(Bson::ObjectId(a)), Some(Bson::ObjectId(b))) => a.cmp(b),
        (Some(Bson::Boolean(a)), Some(Bson::Boolean(b))) => a.cmp(b),
        (Some(Bson::DateTime(a)), Some(Bson::DateTime(b))) => a.cmp(b),
        (Some(a), Some(b)) => match (as_f64(a), as_f64(b)) {
            (Some(a), Some(b)) => a.total_cmp(&b),
            _ => Ordering::Equal
        },
        _ => Ordering::Equal
    }
}

/// Filter on a document's key, plus its stored version when it is versioned.
///
/// Documents written before versioning have no version field, which counts as version 0.
pub(crate) fn versioned_key_filter(key_field: &str, key: &Bson, expected: Option<u64>) -> bson::Document {
    let mut filter = bson::Document::new();
    filter.insert(key_field, key.clone());

    match expected {
        Some(0) => {
            filter.insert(super::keys::VERSION_FIELD, doc! { "$in": [Bson::Null, 0_i64] });
        }
        Some(version) => {
            filter.insert(super::keys::VERSION_FIELD, version as i64);
        }
        None => {}
    }

    filter
}
