//! Resource scopes and their per-scope rules.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::SnapshotError;
use crate::models::Item;

/// Field of an [`Item`] used to name its downloaded archives.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DisplayField {
    Name,
    Alias,
}

impl DisplayField {
    /// Pick the display value off an item, falling back to its id.
    pub fn select<'a>(&self, item: &'a Item) -> &'a str {
        let value = match self {
            Self::Name => item.name.as_deref(),
            Self::Alias => item.alias.as_deref(),
        };
        value.unwrap_or(&item.id)
    }
}

/// One of the three top-level resource categories.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Scope {
    /// Deployable units.
    Horizons,
    /// Running instances.
    Instances,
    /// Grouped collections.
    Collections,
}

impl Scope {
    /// All scopes in processing order.
    pub const ALL: [Scope; 3] = [Scope::Horizons, Scope::Instances, Scope::Collections];

    /// URL path segment, also used as the output subdirectory.
    pub fn path(&self) -> &'static str {
        match self {
            Self::Horizons => "horizons",
            Self::Instances => "instances",
            Self::Collections => "collections",
        }
    }

    /// Whether the list endpoint nests items under a key named after the scope.
    pub fn list_requires_scope(&self) -> bool {
        !matches!(self, Self::Horizons)
    }

    /// Item field used for output file names.
    pub fn display_field(&self) -> DisplayField {
        match self {
            Self::Instances => DisplayField::Alias,
            Self::Horizons | Self::Collections => DisplayField::Name,
        }
    }

    /// Scopes selected by an optional filter, in processing order.
    pub fn selected(filter: Option<Scope>) -> Vec<Scope> {
        Self::ALL
            .into_iter()
            .filter(|scope| filter.map_or(true, |f| f == *scope))
            .collect()
    }

    /// Parse an optional scope name, where empty or missing means every scope.
    ///
    /// # Errors
    ///
    /// Returns [`SnapshotError::InvalidScope`] for unknown names.
    pub fn parse_filter(name: Option<&str>) -> Result<Option<Scope>, SnapshotError> {
        match name.map(str::trim) {
            None | Some("") => Ok(None),
            Some(name) => name.parse().map(Some),
        }
    }
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.path())
    }
}

impl FromStr for Scope {
    type Err = SnapshotError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|scope| scope.path() == s)
            .ok_or_else(|| SnapshotError::InvalidScope(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scope_table() {
        assert_eq!(Scope::Horizons.path(), "horizons");
        assert!(!Scope::Horizons.list_requires_scope());
        assert_eq!(Scope::Horizons.display_field(), DisplayField::Name);

        assert_eq!(Scope::Instances.path(), "instances");
        assert!(Scope::Instances.list_requires_scope());
        assert_eq!(Scope::Instances.display_field(), DisplayField::Alias);

        assert_eq!(Scope::Collections.path(), "collections");
        assert!(Scope::Collections.list_requires_scope());
        assert_eq!(Scope::Collections.display_field(), DisplayField::Name);
    }

    #[test]
    fn test_selected_keeps_order() {
        assert_eq!(Scope::selected(None), Scope::ALL.to_vec());
        assert_eq!(Scope::selected(Some(Scope::Instances)), vec![Scope::Instances]);
    }

    #[test]
    fn test_parse_filter() {
        assert_eq!(Scope::parse_filter(None).unwrap(), None);
        assert_eq!(Scope::parse_filter(Some("")).unwrap(), None);
        assert_eq!(
            Scope::parse_filter(Some("collections")).unwrap(),
            Some(Scope::Collections)
        );

        let err = Scope::parse_filter(Some("bogus")).unwrap_err();
        assert!(matches!(err, SnapshotError::InvalidScope(ref s) if s == "bogus"));
    }

    #[test]
    fn test_display_field_falls_back_to_id() {
        let item: Item = serde_json::from_value(serde_json::json!({
            "id": "a1",
            "name": "Todo App"
        }))
        .unwrap();

        assert_eq!(DisplayField::Name.select(&item), "Todo App");
        assert_eq!(DisplayField::Alias.select(&item), "a1");
    }
}
