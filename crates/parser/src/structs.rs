//! Struct model builder
//!
//! Every message becomes a [`StructModel`]. Messages named `...Request` and
//! `...Response` are set aside as method payloads; the rest are plain
//! structs exposed to the templates directly.

use crate::context::ModelContext;
use crate::docs::DeclarationPath;
use crate::enums::build_enum;
use prost_types::{DescriptorProto, FieldDescriptorProto};
use protoc_gen_mavsdk_common::{FieldModel, Result, StructModel, StructRole};
use tracing::debug;

/// Struct models of one file, split by role, each in declaration order
#[derive(Debug, Clone, Default)]
pub struct CollectedStructs {
    pub structs: Vec<StructModel>,
    pub requests: Vec<StructModel>,
    pub responses: Vec<StructModel>,
}

impl CollectedStructs {
    pub fn all(&self) -> impl Iterator<Item = &StructModel> {
        self.structs
            .iter()
            .chain(&self.requests)
            .chain(&self.responses)
    }

    /// Whether any collected struct carries a result wrapper
    pub fn has_result(&self) -> bool {
        self.all().any(|s| s.has_result)
    }
}

pub fn collect_structs(
    messages: &[DescriptorProto],
    ctx: &ModelContext,
) -> Result<CollectedStructs> {
    let mut collected = CollectedStructs::default();

    for (i, message) in messages.iter().enumerate() {
        let model = build_struct(i, message, ctx)?;
        match model.role {
            StructRole::Plain => collected.structs.push(model),
            StructRole::Request => collected.requests.push(model),
            StructRole::Response => collected.responses.push(model),
        }
    }

    debug!(
        structs = collected.structs.len(),
        requests = collected.requests.len(),
        responses = collected.responses.len(),
        "collected structs"
    );

    Ok(collected)
}

fn build_struct(
    index: usize,
    message: &DescriptorProto,
    ctx: &ModelContext,
) -> Result<StructModel> {
    let full_name = ctx.full_name(message.name());
    let name = ctx.identifier(message.name());

    let fields = message
        .field
        .iter()
        .enumerate()
        .map(|(j, field)| build_field(index, j, &full_name, field, ctx))
        .collect::<Result<Vec<_>>>()?;

    let nested_enums = message
        .enum_type
        .iter()
        .enumerate()
        .map(|(j, desc)| {
            build_enum(
                desc,
                DeclarationPath::nested_enum(index, j),
                Some(name.clone()),
                ctx,
            )
        })
        .collect();

    let has_result = fields.iter().any(|f| f.type_info.is_result);

    Ok(StructModel {
        role: StructRole::classify(message.name()),
        description: ctx.docs.get(&DeclarationPath::message(index)).to_string(),
        name,
        fields,
        nested_enums,
        has_result,
    })
}

fn build_field(
    message_index: usize,
    field_index: usize,
    message_full_name: &str,
    field: &FieldDescriptorProto,
    ctx: &ModelContext,
) -> Result<FieldModel> {
    let type_info = ctx.type_mapper().resolve(field)?;
    let options = ctx.options.field_options(message_full_name, field.name());

    Ok(FieldModel {
        name: ctx.identifier(field.name()),
        type_info,
        description: ctx
            .docs
            .get(&DeclarationPath::field(message_index, field_index))
            .to_string(),
        default_value: options.default_value,
        epsilon: options.epsilon,
    })
}
