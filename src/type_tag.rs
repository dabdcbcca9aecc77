//! Classification of the loosely-typed type tags found in raw metadata.
//!
//! Raw properties describe their type either with a JSON-ish primitive name
//! (`string`, `boolean`, `duration`), a collection notation
//! (`java.util.List<java.lang.String>`, `String[]`) or a fully-qualified class
//! name (`javax.sql.DataSource`). Everything funnels through [`TypeTag::parse`]
//! so the merge step only ever matches on three variants.

use serde_json::{Map, Value};

/// Scalar and structural types a raw tag can resolve to.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Primitive {
    String,
    Boolean,
    Integer,
    Number,
    Object,
    Duration,
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum TypeTag {
    Primitive(Primitive),
    Collection(Box<TypeTag>),
    /// Host-language class referenced opaquely by its fully-qualified name.
    ClassRef(String),
}

const COLLECTION_TYPES: &[&str] = &[
    "java.util.List",
    "java.util.ArrayList",
    "java.util.LinkedList",
    "java.util.Set",
    "java.util.HashSet",
    "java.util.LinkedHashSet",
    "java.util.SortedSet",
    "java.util.TreeSet",
    "java.util.Collection",
    "list",
    "set",
];

const MAP_TYPES: &[&str] = &[
    "java.util.Map",
    "java.util.HashMap",
    "java.util.LinkedHashMap",
    "java.util.TreeMap",
    "java.util.SortedMap",
    "java.util.Properties",
    "map",
];

impl TypeTag {
    /// Classify a raw tag. Returns `None` for blank tags.
    pub fn parse(raw: &str) -> Option<TypeTag> {
        let tag = raw.trim();
        if tag.is_empty() {
            return None;
        }

        if let Some(element) = tag.strip_suffix("[]") {
            let element = TypeTag::parse(element).unwrap_or(TypeTag::Primitive(Primitive::String));
            return Some(TypeTag::Collection(Box::new(element)));
        }

        if let Some((base, args)) = split_generic(tag) {
            if COLLECTION_TYPES.contains(&base) {
                let element =
                    TypeTag::parse(args).unwrap_or(TypeTag::Primitive(Primitive::String));
                return Some(TypeTag::Collection(Box::new(element)));
            }
            return TypeTag::parse(base);
        }

        if COLLECTION_TYPES.contains(&tag) || tag == "array" {
            return Some(TypeTag::Collection(Box::new(TypeTag::Primitive(
                Primitive::String,
            ))));
        }
        if MAP_TYPES.contains(&tag) {
            return Some(TypeTag::Primitive(Primitive::Object));
        }
        if let Some(primitive) = primitive_for(tag) {
            return Some(TypeTag::Primitive(primitive));
        }
        if tag.contains('.') {
            return Some(TypeTag::ClassRef(tag.to_string()));
        }
        Some(TypeTag::Primitive(Primitive::Object))
    }

    /// Type tag of a raw property block.
    ///
    /// `javaType` is more precise than `type` and wins when both are present.
    /// A property that enumerates its allowed values is rendered as a string
    /// even when its Java type is a class.
    pub fn from_property(property: &Map<String, Value>) -> Option<TypeTag> {
        let raw = property
            .get("javaType")
            .and_then(Value::as_str)
            .filter(|tag| !tag.trim().is_empty())
            .or_else(|| property.get("type").and_then(Value::as_str))?;
        let tag = TypeTag::parse(raw)?;

        let enumerated = property
            .get("enum")
            .and_then(Value::as_array)
            .is_some_and(|values| !values.is_empty());
        match tag {
            TypeTag::ClassRef(_) if enumerated => Some(TypeTag::Primitive(Primitive::String)),
            other => Some(other),
        }
    }
}

fn split_generic(tag: &str) -> Option<(&str, &str)> {
    let open = tag.find('<')?;
    let inner = tag[open + 1..].strip_suffix('>')?;
    Some((tag[..open].trim(), inner.trim()))
}

fn primitive_for(tag: &str) -> Option<Primitive> {
    let primitive = match tag {
        "string" | "String" | "java.lang.String" | "char" | "java.lang.Character" | "enum" => {
            Primitive::String
        }
        "boolean" | "java.lang.Boolean" => Primitive::Boolean,
        "integer" | "int" | "long" | "short" | "byte" | "java.lang.Integer" | "java.lang.Long"
        | "java.lang.Short" | "java.lang.Byte" | "java.math.BigInteger" => Primitive::Integer,
        "number" | "double" | "float" | "java.lang.Double" | "java.lang.Float"
        | "java.math.BigDecimal" => Primitive::Number,
        "object" | "java.lang.Object" => Primitive::Object,
        "duration" | "java.time.Duration" => Primitive::Duration,
        _ => return None,
    };
    Some(primitive)
}
