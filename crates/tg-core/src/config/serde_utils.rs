//! Shared deserialization helpers for configuration
//!
//! YAML happily types unquoted values, so a hex-less gist id arrives as an
//! integer and a single config path arrives as a bare string. These helpers
//! accept those shapes.

use serde::{Deserialize, Deserializer};

#[derive(Deserialize)]
#[serde(untagged)]
enum StringLike {
    Str(String),
    Int(i64),
    UInt(u64),
}

impl From<StringLike> for String {
    fn from(value: StringLike) -> Self {
        match value {
            StringLike::Str(s) => s,
            StringLike::Int(i) => i.to_string(),
            StringLike::UInt(u) => u.to_string(),
        }
    }
}

/// Deserialize an optional string, accepting integers as their decimal form
pub fn opt_string_like<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<StringLike>::deserialize(deserializer).map(|opt| opt.map(String::from))
}

#[derive(Deserialize)]
#[serde(untagged)]
enum OneOrMany<T> {
    One(T),
    Many(Vec<T>),
}

/// Deserialize either a single value or a list into an optional list
pub fn opt_one_or_many<'de, D, T>(deserializer: D) -> Result<Option<Vec<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<OneOrMany<T>>::deserialize(deserializer).map(|opt| {
        opt.map(|v| match v {
            OneOrMany::One(item) => vec![item],
            OneOrMany::Many(items) => items,
        })
    })
}
