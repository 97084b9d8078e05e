//! Enum model builder

use crate::context::ModelContext;
use crate::docs::DeclarationPath;
use prost_types::EnumDescriptorProto;
use protoc_gen_mavsdk_common::{EnumModel, EnumValueModel, Identifier};
use tracing::debug;

/// Build models for the top-level enums of a file
pub fn collect_enums(enums: &[EnumDescriptorProto], ctx: &ModelContext) -> Vec<EnumModel> {
    enums
        .iter()
        .enumerate()
        .map(|(i, desc)| build_enum(desc, DeclarationPath::enumeration(i), None, ctx))
        .collect()
}

/// Build one enum whose declaration lives at `path`
///
/// Value numbers are carried through unchanged.
pub(crate) fn build_enum(
    desc: &EnumDescriptorProto,
    path: DeclarationPath,
    parent: Option<Identifier>,
    ctx: &ModelContext,
) -> EnumModel {
    let values = desc
        .value
        .iter()
        .enumerate()
        .map(|(j, value)| EnumValueModel {
            name: ctx.identifier(value.name()),
            description: ctx
                .docs
                .get(&path.value(j))
                .to_string(),
            number: value.number(),
        })
        .collect::<Vec<_>>();

    debug!(name = desc.name(), values = values.len(), "built enum");

    EnumModel {
        name: ctx.identifier(desc.name()),
        description: ctx.docs.get(&path).to_string(),
        parent,
        values,
    }
}
