use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// Category of DSL building block a catalog describes.
///
/// The set is closed: every run produces exactly one catalog per variant, and
/// the variant selects the normalization rules applied to its entries.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub enum EntityKind {
    Component,
    DataFormat,
    Language,
    Model,
    Pattern,
}

impl EntityKind {
    /// All kinds in the order catalogs are assembled.
    pub const ALL: [EntityKind; 5] = [
        EntityKind::Component,
        EntityKind::DataFormat,
        EntityKind::Language,
        EntityKind::Model,
        EntityKind::Pattern,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            EntityKind::Component => "component",
            EntityKind::DataFormat => "dataformat",
            EntityKind::Language => "language",
            EntityKind::Model => "model",
            EntityKind::Pattern => "pattern",
        }
    }

    /// Plural name used for aggregate keys, raw source directories and output files.
    pub fn catalog_name(&self) -> &'static str {
        match self {
            EntityKind::Component => "components",
            EntityKind::DataFormat => "dataformats",
            EntityKind::Language => "languages",
            EntityKind::Model => "models",
            EntityKind::Pattern => "patterns",
        }
    }

    /// Accepts both the singular kind name and the plural catalog name.
    pub fn parse(value: &str) -> Option<Self> {
        EntityKind::ALL
            .into_iter()
            .find(|kind| kind.as_str() == value || kind.catalog_name() == value)
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for EntityKind {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for EntityKind {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = String::deserialize(deserializer)?;
        EntityKind::parse(&value)
            .ok_or_else(|| serde::de::Error::custom(format!("unknown entity kind '{value}'")))
    }
}
