//! Typed entities extracted from query text.
//!
//! An `EntitySet` holds at most one value per kind; a kind is present only
//! if its pattern matched. Absence is never an error (it leaves template
//! parameters bound to the unset sentinel downstream).

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// The entity kinds the extractor knows about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    Factory,
    Supplier,
    Material,
    Status,
    ChartType,
    TimeRange,
}

impl EntityKind {
    /// The template parameter name this kind binds to (e.g. `{factory}`).
    pub fn param_name(&self) -> &'static str {
        match self {
            EntityKind::Factory => "factory",
            EntityKind::Supplier => "supplier",
            EntityKind::Material => "material",
            EntityKind::Status => "status",
            EntityKind::ChartType => "chart_type",
            EntityKind::TimeRange => "time_range",
        }
    }

    /// Reverse lookup for template validation.
    pub fn from_param_name(name: &str) -> Option<Self> {
        match name {
            "factory" => Some(EntityKind::Factory),
            "supplier" => Some(EntityKind::Supplier),
            "material" => Some(EntityKind::Material),
            "status" => Some(EntityKind::Status),
            "chart_type" => Some(EntityKind::ChartType),
            "time_range" => Some(EntityKind::TimeRange),
            _ => None,
        }
    }

    /// All kinds, in a stable order.
    pub fn all() -> [EntityKind; 6] {
        [
            EntityKind::Factory,
            EntityKind::Supplier,
            EntityKind::Material,
            EntityKind::Status,
            EntityKind::ChartType,
            EntityKind::TimeRange,
        ]
    }
}

/// At most one extracted string per entity kind.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EntitySet {
    entities: BTreeMap<EntityKind, String>,
}

impl EntitySet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a value for a kind. The first extraction wins; the extractor
    /// never calls this twice for the same kind.
    pub fn insert(&mut self, kind: EntityKind, value: impl Into<String>) {
        self.entities.entry(kind).or_insert_with(|| value.into());
    }

    pub fn get(&self, kind: EntityKind) -> Option<&str> {
        self.entities.get(&kind).map(String::as_str)
    }

    pub fn contains(&self, kind: EntityKind) -> bool {
        self.entities.contains_key(&kind)
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&EntityKind, &String)> {
        self.entities.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_insert_wins() {
        let mut set = EntitySet::new();
        set.insert(EntityKind::Factory, "深圳");
        set.insert(EntityKind::Factory, "东莞");
        assert_eq!(set.get(EntityKind::Factory), Some("深圳"));
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn absent_kind_is_none() {
        let set = EntitySet::new();
        assert!(set.is_empty());
        assert_eq!(set.get(EntityKind::Status), None);
        assert!(!set.contains(EntityKind::Status));
    }

    #[test]
    fn param_names_round_trip() {
        for kind in EntityKind::all() {
            assert_eq!(EntityKind::from_param_name(kind.param_name()), Some(kind));
        }
        assert_eq!(EntityKind::from_param_name("warehouse"), None);
    }
}
