//! Item model.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{Result, SnapshotError};
use crate::scope::Scope;

/// A horizon, instance or collection listed by the API.
///
/// Only the id and the naming fields are interpreted; everything else the
/// API returns is kept in `extra` for logging.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Item {
    /// Opaque identifier used in snapshot paths.
    pub id: String,

    /// Display name (horizons, collections).
    #[serde(default)]
    pub name: Option<String>,

    /// Display alias (instances).
    #[serde(default)]
    pub alias: Option<String>,

    /// Remaining fields, untouched.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Item {
    /// Decode a list response for `scope`.
    ///
    /// Nested scopes carry their items under a key named after the scope;
    /// horizons return the array directly.
    ///
    /// # Errors
    ///
    /// Returns [`SnapshotError::UnexpectedResponse`] if the nested key is
    /// missing or the items do not decode.
    pub fn list_from_response(scope: Scope, response: Value) -> Result<Vec<Item>> {
        let list = if scope.list_requires_scope() {
            match response {
                Value::Object(mut map) => map.remove(scope.path()).ok_or_else(|| {
                    SnapshotError::UnexpectedResponse(format!(
                        "{scope} list response has no '{scope}' key"
                    ))
                })?,
                other => {
                    return Err(SnapshotError::UnexpectedResponse(format!(
                        "{scope} list response is not an object: {other}"
                    )))
                }
            }
        } else {
            response
        };

        serde_json::from_value(list).map_err(|e| {
            SnapshotError::UnexpectedResponse(format!("{scope} list did not decode: {e}"))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_nested_list_unwraps_scope_key() {
        let response = json!({
            "instances": [
                {"id": "i1", "alias": "my-todo", "release": {"version": "1.0"}},
                {"id": "i2", "alias": "notes"}
            ],
            "page": {"size": 2}
        });

        let items = Item::list_from_response(Scope::Instances, response).unwrap();
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].id, "i1");
        assert_eq!(items[0].alias.as_deref(), Some("my-todo"));
        assert!(items[0].extra.contains_key("release"));
    }

    #[test]
    fn test_flat_list_used_directly() {
        let response = json!([{"id": "h1", "name": "Todo"}]);
        let items = Item::list_from_response(Scope::Horizons, response).unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].name.as_deref(), Some("Todo"));
    }

    #[test]
    fn test_missing_scope_key_is_rejected() {
        let err = Item::list_from_response(Scope::Collections, json!({"detail": "unauthorized"}))
            .unwrap_err();
        assert!(matches!(err, SnapshotError::UnexpectedResponse(_)));
    }
}
