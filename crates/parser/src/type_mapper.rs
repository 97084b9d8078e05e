//! Type mapping from protobuf field descriptors to target-language types
//!
//! Maps each field to a [`TypeInfo`] using the run's conversion table.

use prost_types::field_descriptor_proto::{Label, Type};
use prost_types::FieldDescriptorProto;
use protoc_gen_mavsdk_common::{GeneratorError, Result, TypeConversions, TypeInfo};

/// Suffix of result-wrapper message types (e.g. `ActionResult`)
pub const RESULT_SUFFIX: &str = "Result";

/// Resolves field types against a conversion table
#[derive(Debug, Clone, Copy)]
pub struct TypeMapper<'a> {
    conversions: &'a TypeConversions,
}

impl<'a> TypeMapper<'a> {
    pub fn new(conversions: &'a TypeConversions) -> Self {
        Self { conversions }
    }

    /// Resolve a field's declared type
    ///
    /// Scalars must have a table entry. Message and enum references use the
    /// `TYPE_MESSAGE` / `TYPE_ENUM` patterns when present and the referenced
    /// name otherwise. Repeated fields require the `repeated` entry.
    pub fn resolve(&self, field: &FieldDescriptorProto) -> Result<TypeInfo> {
        let kind = field
            .r#type
            .and_then(|t| Type::try_from(t).ok())
            .ok_or_else(|| {
                GeneratorError::TypeResolution(format!(
                    "Field '{}' has no resolvable type",
                    field.name()
                ))
            })?;
        let key = kind.as_str_name();

        let (element, accessor, is_result) = match kind {
            Type::Message | Type::Enum => {
                let referenced = short_type_name(field.type_name());
                let (element, accessor) = match self.conversions.get(key) {
                    Some(conversion) => (
                        conversion.type_for(referenced),
                        conversion.accessor_for(field.name()),
                    ),
                    None => (referenced.to_string(), field.name().to_string()),
                };
                let is_result = kind == Type::Message && referenced.ends_with(RESULT_SUFFIX);
                (element, accessor, is_result)
            }
            Type::Group => {
                return Err(GeneratorError::TypeResolution(format!(
                    "Field '{}' is a group, which is not supported",
                    field.name()
                )))
            }
            _ => {
                let conversion = self.conversions.get(key).ok_or_else(|| {
                    GeneratorError::TypeResolution(format!(
                        "No conversion for {} (field '{}')",
                        key,
                        field.name()
                    ))
                })?;
                (
                    conversion.type_name.clone(),
                    conversion.accessor_for(field.name()),
                    false,
                )
            }
        };

        let is_repeated = field.label() == Label::Repeated;
        let (name, accessor) = if is_repeated {
            let repeated = self.conversions.repeated().ok_or_else(|| {
                GeneratorError::TypeResolution(format!(
                    "No 'repeated' conversion for repeated field '{}'",
                    field.name()
                ))
            })?;
            (
                repeated.wrap(&element),
                repeated.accessor_for(field.name()).unwrap_or(accessor),
            )
        } else {
            (element.clone(), accessor)
        };

        Ok(TypeInfo {
            name,
            inner_name: element,
            accessor,
            is_primitive: !matches!(kind, Type::Message | Type::Enum),
            is_enum: kind == Type::Enum,
            is_repeated,
            is_result,
        })
    }
}

/// Last segment of a fully-qualified type name (`.pkg.Outer.Inner` -> `Inner`)
pub fn short_type_name(type_name: &str) -> &str {
    type_name.rsplit('.').next().unwrap_or(type_name)
}
