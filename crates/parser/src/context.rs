//! Shared inputs of the model builders for one schema file

use crate::docs::DocIndex;
use crate::options::OptionsResolver;
use crate::type_mapper::TypeMapper;
use protoc_gen_mavsdk_common::{Identifier, Settings};

/// Everything a builder needs besides the declarations it walks
#[derive(Debug, Clone, Copy)]
pub struct ModelContext<'a> {
    /// Protobuf package, used to form fully-qualified names
    pub proto_package: &'a str,
    pub plugin_name: &'a str,
    pub settings: &'a Settings,
    pub docs: &'a DocIndex,
    pub options: &'a OptionsResolver,
}

impl<'a> ModelContext<'a> {
    pub fn identifier(&self, raw: &str) -> Identifier {
        Identifier::parse(raw, &self.settings.initialisms)
    }

    pub fn type_mapper(&self) -> TypeMapper<'a> {
        TypeMapper::new(&self.settings.conversions)
    }

    /// `package.name`, or `name` for files without a package
    pub fn full_name(&self, name: &str) -> String {
        if self.proto_package.is_empty() {
            name.to_string()
        } else {
            format!("{}.{}", self.proto_package, name)
        }
    }
}
