//! Per-kind normalization rules.
//!
//! Kind-specific behavior lives in this table rather than in the merge loop,
//! so adding an exclusion or moving a model block only touches data here.

use crate::kind::EntityKind;

#[derive(Debug)]
pub struct KindRules {
    pub kind: EntityKind,
    /// Key of the model block inside a raw entity document.
    pub model_key: &'static str,
    /// Entity names dropped before merging; they never appear in the catalog.
    pub excluded_names: &'static [&'static str],
}

/// Model fields describing structure rather than presentation. The schema
/// fragment's value wins for these; the raw model wins for everything else.
pub const STRUCTURAL_MODEL_FIELDS: &[&str] = &["kind"];

static COMPONENT: KindRules = KindRules {
    kind: EntityKind::Component,
    model_key: "component",
    excluded_names: &[],
};

static DATA_FORMAT: KindRules = KindRules {
    kind: EntityKind::DataFormat,
    model_key: "dataformat",
    excluded_names: &[],
};

static LANGUAGE: KindRules = KindRules {
    kind: EntityKind::Language,
    model_key: "language",
    // Legacy alias of the simple language.
    excluded_names: &["file"],
};

static MODEL: KindRules = KindRules {
    kind: EntityKind::Model,
    model_key: "model",
    excluded_names: &[],
};

static PATTERN: KindRules = KindRules {
    kind: EntityKind::Pattern,
    model_key: "model",
    excluded_names: &[],
};

pub fn rules_for(kind: EntityKind) -> &'static KindRules {
    match kind {
        EntityKind::Component => &COMPONENT,
        EntityKind::DataFormat => &DATA_FORMAT,
        EntityKind::Language => &LANGUAGE,
        EntityKind::Model => &MODEL,
        EntityKind::Pattern => &PATTERN,
    }
}

impl KindRules {
    pub fn excludes(&self, name: &str) -> bool {
        self.excluded_names.contains(&name)
    }
}
