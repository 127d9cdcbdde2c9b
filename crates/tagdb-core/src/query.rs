//! # Query Module
//!
//! Typed queries resolved from [`QueryParams`].
//!
//! Resolution dispatches on the query type, then picks the sub-query from
//! which of key, value, operation and parameter were supplied:
//!
//! | key | value | operation | parameter | query |
//! |-----|-------|-----------|-----------|-------|
//! | Y | Y | N | N | `UPDATE`: replace payload |
//! | Y | N | Y | Y | `UPDATE`: `AddTag` / `RemoveTag` |
//! | Y | N | N | N | `SHOW`: single key |
//! | N | N | Y | Y | `SHOW`: `ByTag` |
//! | N | N | N | N | `SHOW`: whole store |
//!
//! A query that resolves is always well formed; no store operation is
//! attempted for one that does not.

use crate::primitives::{OP_ADD_TAG, OP_BY_TAG, OP_REMOVE_TAG};
use crate::types::{Flag, QueryError, QueryParams};
use crate::{Element, Store};
use std::fmt;
use std::str::FromStr;

// =============================================================================
// RESPONSE TEXT
// =============================================================================

pub const MSG_INSERTED: &str = "Object Successfully inserted into Database.";
pub const MSG_REMOVED: &str = "Object with key successfully removed from the Database.";
pub const MSG_PAYLOAD_UPDATED: &str = "Successfully updated the value associated with the given key.";
pub const MSG_TAG_ADDED: &str = "Successfully Added Tag to Object with given Key in Database.";
pub const MSG_TAG_ALREADY_PRESENT: &str =
    "Object with given Key already carries the Tag. Nothing to change.";
pub const MSG_TAG_REMOVED: &str = "Successfully Removed Tag from Object with given Key in Database.";
pub const MSG_TAG_NOT_PRESENT: &str =
    "Object with given Key does not carry the Tag. Nothing to change.";

// =============================================================================
// QUERY TYPE
// =============================================================================

/// The four verbs of the query language.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryType {
    Insert,
    Delete,
    Update,
    Show,
}

impl QueryType {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            QueryType::Insert => "INSERT",
            QueryType::Delete => "DELETE",
            QueryType::Update => "UPDATE",
            QueryType::Show => "SHOW",
        }
    }
}

impl FromStr for QueryType {
    type Err = QueryError;

    /// Case-sensitive: `show` is not a query type.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "INSERT" => Ok(QueryType::Insert),
            "DELETE" => Ok(QueryType::Delete),
            "UPDATE" => Ok(QueryType::Update),
            "SHOW" => Ok(QueryType::Show),
            other => Err(QueryError::UnsupportedType(other.to_string())),
        }
    }
}

impl fmt::Display for QueryType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// QUERY
// =============================================================================

/// A fully resolved query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Query {
    /// Store a fresh untagged element.
    Insert { key: String, value: String },
    Delete { key: String },
    UpdatePayload { key: String, value: String },
    AddTag { key: String, tag: String },
    RemoveTag { key: String, tag: String },
    ShowKey { key: String },
    ShowByTag { tag: String },
    ShowAll,
}

impl Query {
    /// Resolve a parameter record into a query.
    pub fn from_params(params: &QueryParams) -> Result<Self, QueryError> {
        let query_type: QueryType = params
            .get(Flag::Type)
            .ok_or(QueryError::MissingType)?
            .parse()?;

        match query_type {
            QueryType::Insert => Self::resolve_insert(params),
            QueryType::Delete => Self::resolve_delete(params),
            QueryType::Update => Self::resolve_update(params),
            QueryType::Show => Self::resolve_show(params),
        }
    }

    fn resolve_insert(params: &QueryParams) -> Result<Self, QueryError> {
        let (Some(key), Some(value)) = (params.get(Flag::Key), params.get(Flag::Value)) else {
            return Err(QueryError::InsertMissingArguments);
        };
        if params.has(Flag::Operation) || params.has(Flag::Parameter) {
            return Err(QueryError::InsertForbiddenArguments);
        }
        Ok(Query::Insert {
            key: key.to_string(),
            value: value.to_string(),
        })
    }

    fn resolve_delete(params: &QueryParams) -> Result<Self, QueryError> {
        let Some(key) = params.get(Flag::Key) else {
            return Err(QueryError::DeleteMissingKey);
        };
        if params.has(Flag::Value) || params.has(Flag::Operation) || params.has(Flag::Parameter) {
            return Err(QueryError::DeleteForbiddenArguments);
        }
        Ok(Query::Delete {
            key: key.to_string(),
        })
    }

    fn resolve_update(params: &QueryParams) -> Result<Self, QueryError> {
        match Shape::of(params) {
            Shape {
                key: Some(key),
                value: Some(value),
                operation: None,
                parameter: None,
            } => Ok(Query::UpdatePayload {
                key: key.to_string(),
                value: value.to_string(),
            }),
            Shape {
                key: Some(key),
                value: None,
                operation: Some(operation),
                parameter: Some(tag),
            } => match operation {
                OP_ADD_TAG => Ok(Query::AddTag {
                    key: key.to_string(),
                    tag: tag.to_string(),
                }),
                OP_REMOVE_TAG => Ok(Query::RemoveTag {
                    key: key.to_string(),
                    tag: tag.to_string(),
                }),
                other => Err(QueryError::InvalidUpdateOperation(other.to_string())),
            },
            _ => Err(QueryError::InvalidSubQuery(QueryType::Update.as_str())),
        }
    }

    fn resolve_show(params: &QueryParams) -> Result<Self, QueryError> {
        match Shape::of(params) {
            Shape {
                key: Some(key),
                value: None,
                operation: None,
                parameter: None,
            } => Ok(Query::ShowKey {
                key: key.to_string(),
            }),
            Shape {
                key: None,
                value: None,
                operation: Some(operation),
                parameter: Some(tag),
            } => {
                if operation != OP_BY_TAG {
                    return Err(QueryError::InvalidShowOperation(operation.to_string()));
                }
                Ok(Query::ShowByTag {
                    tag: tag.to_string(),
                })
            }
            Shape {
                key: None,
                value: None,
                operation: None,
                parameter: None,
            } => Ok(Query::ShowAll),
            _ => Err(QueryError::InvalidSubQuery(QueryType::Show.as_str())),
        }
    }

    /// The verb this query came from.
    #[must_use]
    pub const fn query_type(&self) -> QueryType {
        match self {
            Query::Insert { .. } => QueryType::Insert,
            Query::Delete { .. } => QueryType::Delete,
            Query::UpdatePayload { .. } | Query::AddTag { .. } | Query::RemoveTag { .. } => {
                QueryType::Update
            }
            Query::ShowKey { .. } | Query::ShowByTag { .. } | Query::ShowAll => QueryType::Show,
        }
    }

    /// Short name of the resolved sub-query, used in diagnostics.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Query::Insert { .. } => "insert",
            Query::Delete { .. } => "delete",
            Query::UpdatePayload { .. } => "update_payload",
            Query::AddTag { .. } => "add_tag",
            Query::RemoveTag { .. } => "remove_tag",
            Query::ShowKey { .. } => "show_key",
            Query::ShowByTag { .. } => "show_by_tag",
            Query::ShowAll => "show_all",
        }
    }

    /// Whether the query leaves the store untouched.
    #[must_use]
    pub const fn is_read_only(&self) -> bool {
        matches!(self.query_type(), QueryType::Show)
    }

    /// Run the query against the store.
    pub fn execute(&self, store: &mut Store) -> Result<String, QueryError> {
        match self {
            Query::Insert { key, value } => {
                if !store.insert(key.clone(), Element::new(value.clone())) {
                    return Err(QueryError::KeyExists);
                }
                Ok(MSG_INSERTED.to_string())
            }
            Query::Delete { key } => {
                if !store.remove(key) {
                    return Err(QueryError::KeyNotFound);
                }
                Ok(MSG_REMOVED.to_string())
            }
            Query::UpdatePayload { key, value } => {
                if !store.update_payload(key, value.clone()) {
                    return Err(QueryError::KeyNotFound);
                }
                Ok(MSG_PAYLOAD_UPDATED.to_string())
            }
            Query::AddTag { key, tag } => {
                let already = store.tag_exists(key, tag);
                if !store.add_tag(key, tag) {
                    return Err(QueryError::KeyNotFound);
                }
                let message = if already { MSG_TAG_ALREADY_PRESENT } else { MSG_TAG_ADDED };
                Ok(message.to_string())
            }
            Query::RemoveTag { key, tag } => {
                let present = store.tag_exists(key, tag);
                if !store.remove_tag(key, tag) {
                    return Err(QueryError::KeyNotFound);
                }
                let message = if present { MSG_TAG_REMOVED } else { MSG_TAG_NOT_PRESENT };
                Ok(message.to_string())
            }
            Query::ShowKey { .. } | Query::ShowByTag { .. } | Query::ShowAll => {
                self.execute_read(store)
            }
        }
    }

    /// Run a read-only query. Mutating queries are refused.
    pub fn execute_read(&self, store: &Store) -> Result<String, QueryError> {
        match self {
            Query::ShowKey { key } => Ok(store.render(key)),
            Query::ShowByTag { tag } => Ok(store.render_by_tag(tag)),
            Query::ShowAll => Ok(store.render_all()),
            _ => Err(QueryError::RequiresWrite),
        }
    }
}

/// Which of the sub-query arguments were supplied.
struct Shape<'a> {
    key: Option<&'a str>,
    value: Option<&'a str>,
    operation: Option<&'a str>,
    parameter: Option<&'a str>,
}

impl<'a> Shape<'a> {
    fn of(params: &'a QueryParams) -> Self {
        Self {
            key: params.get(Flag::Key),
            value: params.get(Flag::Value),
            operation: params.get(Flag::Operation),
            parameter: params.get(Flag::Parameter),
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================
