//! Type conversion table loading
//!
//! The conversion table maps protobuf field kinds to target-language type
//! names and accessor idioms. It lives next to the templates as a JSON file
//! so each binding language ships its own table.
//!
//! ```json
//! {
//!     "TYPE_DOUBLE": "double",
//!     "TYPE_STRING": { "type": "std::string", "accessor": "{field}()" },
//!     "TYPE_ENUM": "{name}",
//!     "repeated": { "prefix": "std::vector<", "suffix": ">" }
//! }
//! ```

use crate::{GeneratorError, Result};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use tracing::debug;

/// Placeholder replaced by the raw field name in accessor patterns
const FIELD_PLACEHOLDER: &str = "{field}";

/// Placeholder replaced by the referenced type name in message/enum patterns
const NAME_PLACEHOLDER: &str = "{name}";

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RawConversion {
    Name(String),
    Detailed {
        #[serde(rename = "type")]
        type_name: String,
        #[serde(default)]
        accessor: Option<String>,
    },
}

#[derive(Debug, Deserialize)]
struct RawRepeated {
    #[serde(default)]
    prefix: String,
    #[serde(default)]
    suffix: String,
    #[serde(default)]
    accessor: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawTable {
    #[serde(default)]
    repeated: Option<RawRepeated>,
    #[serde(flatten)]
    entries: BTreeMap<String, RawConversion>,
}

/// One entry of the table: target type name and accessor pattern
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Conversion {
    pub type_name: String,
    pub accessor: String,
}

impl Conversion {
    /// Target type, with `{name}` replaced by the referenced type name
    pub fn type_for(&self, referenced_name: &str) -> String {
        self.type_name.replace(NAME_PLACEHOLDER, referenced_name)
    }

    /// Accessor, with `{field}` replaced by the raw field name
    pub fn accessor_for(&self, field_name: &str) -> String {
        self.accessor.replace(FIELD_PLACEHOLDER, field_name)
    }
}

/// Wrapper applied to the element type of repeated fields
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepeatedConversion {
    pub prefix: String,
    pub suffix: String,
    pub accessor: Option<String>,
}

impl RepeatedConversion {
    pub fn wrap(&self, element_type: &str) -> String {
        format!("{}{}{}", self.prefix, element_type, self.suffix)
    }

    /// Repeated-specific accessor, if the table overrides the element one
    pub fn accessor_for(&self, field_name: &str) -> Option<String> {
        self.accessor
            .as_ref()
            .map(|pattern| pattern.replace(FIELD_PLACEHOLDER, field_name))
    }
}

/// Immutable conversion table, loaded once per run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TypeConversions {
    entries: BTreeMap<String, Conversion>,
    repeated: Option<RepeatedConversion>,
}

impl TypeConversions {
    /// Load the table from a JSON file
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| {
            GeneratorError::Configuration(format!(
                "Failed to read type conversions file {}: {}",
                path.display(),
                e
            ))
        })?;

        let conversions = Self::from_json_str(&content).map_err(|e| {
            GeneratorError::Configuration(format!("{} ({})", e, path.display()))
        })?;
        debug!(
            path = %path.display(),
            entries = conversions.len(),
            "loaded type conversions"
        );
        Ok(conversions)
    }

    /// Parse the table from JSON text
    pub fn from_json_str(content: &str) -> Result<Self> {
        let raw: RawTable = serde_json::from_str(content).map_err(|e| {
            GeneratorError::Configuration(format!("Malformed type conversions table: {}", e))
        })?;

        let entries = raw
            .entries
            .into_iter()
            .map(|(key, value)| {
                let conversion = match value {
                    RawConversion::Name(type_name) => Conversion {
                        type_name,
                        accessor: FIELD_PLACEHOLDER.to_string(),
                    },
                    RawConversion::Detailed {
                        type_name,
                        accessor,
                    } => Conversion {
                        type_name,
                        accessor: accessor.unwrap_or_else(|| FIELD_PLACEHOLDER.to_string()),
                    },
                };
                (key, conversion)
            })
            .collect();

        let repeated = raw.repeated.map(|r| RepeatedConversion {
            prefix: r.prefix,
            suffix: r.suffix,
            accessor: r.accessor,
        });

        Ok(Self { entries, repeated })
    }

    /// Build a table directly from entries, mostly useful in tests
    pub fn from_entries<I, K, V>(entries: I, repeated: Option<RepeatedConversion>) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            entries: entries
                .into_iter()
                .map(|(k, v)| {
                    (
                        k.into(),
                        Conversion {
                            type_name: v.into(),
                            accessor: FIELD_PLACEHOLDER.to_string(),
                        },
                    )
                })
                .collect(),
            repeated,
        }
    }

    pub fn get(&self, key: &str) -> Option<&Conversion> {
        self.entries.get(key)
    }

    pub fn repeated(&self) -> Option<&RepeatedConversion> {
        self.repeated.as_ref()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
