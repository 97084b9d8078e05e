//! File model assembly
//!
//! Runs the builders for one schema file in order (docs, enums, structs,
//! methods) and packages the result as a [`FileModel`].

use crate::context::ModelContext;
use crate::docs::{DeclarationPath, DocIndex};
use crate::enums::collect_enums;
use crate::methods::collect_methods;
use crate::options::OptionsResolver;
use crate::structs::collect_structs;
use prost_types::FileDescriptorProto;
use protoc_gen_mavsdk_common::{FileModel, GenerationTarget, Identifier, Result, Settings};
use tracing::info;

/// Names derived for a file by the orchestrator
#[derive(Debug, Clone, Copy)]
pub struct FileSpec<'a> {
    /// Package as exposed to templates (the Java package in Java mode)
    pub package: &'a str,
    /// Upper-camel plugin name, e.g. `Action`
    pub plugin_name: &'a str,
}

pub fn build_file_model(
    file: &FileDescriptorProto,
    spec: &FileSpec,
    settings: &Settings,
    options: &OptionsResolver,
) -> Result<FileModel> {
    let docs = DocIndex::from_source_info(file.source_code_info.as_ref());
    let ctx = ModelContext {
        proto_package: file.package(),
        plugin_name: spec.plugin_name,
        settings,
        docs: &docs,
        options,
    };

    let enums = collect_enums(&file.enum_type, &ctx);
    let structs = collect_structs(&file.message_type, &ctx)?;
    let methods = collect_methods(&file.service, &structs, &ctx)?;
    let has_result = structs.has_result();

    info!(
        file = file.name(),
        plugin = spec.plugin_name,
        enums = enums.len(),
        structs = structs.structs.len(),
        methods = methods.len(),
        "assembled file model"
    );

    Ok(FileModel {
        package: Identifier::parse(spec.package, &settings.initialisms),
        plugin_name: Identifier::parse(spec.plugin_name, &settings.initialisms),
        class_description: docs.get(&DeclarationPath::service(0)).to_string(),
        enums,
        structs: structs.structs,
        requests: structs.requests,
        responses: structs.responses,
        methods,
        has_result,
        is_server: GenerationTarget::from_plugin_name(spec.plugin_name).is_server(),
    })
}
