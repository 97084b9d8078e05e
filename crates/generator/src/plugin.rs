//! protoc plugin orchestration
//!
//! Turns one `CodeGeneratorRequest` into one `CodeGeneratorResponse`: parse
//! parameters, load the data files and templates once, then build and render
//! a file model for every user schema file in the request.

use crate::params::PluginParameters;
use crate::templates::{Renderer, TemplateRenderer, WhitespaceControl};
use prost::Message;
use prost_types::compiler::code_generator_response::File;
use prost_types::compiler::{CodeGeneratorRequest, CodeGeneratorResponse};
use prost_types::FileDescriptorProto;
use protoc_gen_mavsdk_common::{GeneratorError, Identifier, Initialisms, Result, Settings};
use protoc_gen_mavsdk_parser::{build_file_model, FileSpec, OptionsResolver};
use tracing::{debug, error, info};

/// Package prefixes that never carry user-facing declarations
const SKIPPED_PACKAGE_PREFIXES: [&str; 2] = ["google", "com.google"];

/// Packages of the plugin's own option definitions
const SKIPPED_PACKAGES: [&str; 2] = ["mavsdk.options", "options.mavsdk"];

/// Whether declarations in `package` are skipped entirely
pub fn is_skipped_package(package: &str) -> bool {
    SKIPPED_PACKAGE_PREFIXES
        .iter()
        .any(|prefix| package.starts_with(prefix))
        || SKIPPED_PACKAGES.contains(&package)
}

/// Package exposed to templates: the Java package in Java mode when set
pub fn extract_package(file: &FileDescriptorProto, is_java: bool) -> &str {
    let java_package = file
        .options
        .as_ref()
        .map(|options| options.java_package())
        .filter(|package| !package.is_empty());

    match java_package {
        Some(package) if is_java => package,
        _ => file.package(),
    }
}

/// Derive the plugin name and output directory of a schema file
///
/// `action/action.proto` becomes (`Action`, `action`). In Java mode the
/// directory comes from the package instead (`io.mavsdk.action` ->
/// `io/mavsdk/action`).
pub fn plugin_name_and_dir(
    file_name: &str,
    package: &str,
    is_java: bool,
    initialisms: &Initialisms,
) -> (String, String) {
    let (dir, base) = match file_name.rsplit_once('/') {
        Some((dir, base)) => (dir, base),
        None => ("", file_name),
    };
    let stem = base.split('.').next().unwrap_or(base);
    let plugin_name = Identifier::parse(stem, initialisms).upper_camel_case();

    let plugin_dir = if is_java {
        package.replace('.', "/")
    } else {
        dir.to_string()
    };

    (plugin_name, plugin_dir)
}

/// Path of the generated file relative to the protoc output directory
pub fn output_path(params: &PluginParameters, plugin_name: &str, plugin_dir: &str) -> String {
    if let Some(output_file) = &params.output_file {
        return output_file.clone();
    }

    let ext = params.file_ext.as_deref().unwrap_or_default();
    if plugin_dir.is_empty() {
        format!("{}.{}", plugin_name, ext)
    } else {
        format!("{}/{}.{}", plugin_dir, plugin_name, ext)
    }
}

/// Generate one output file per user schema file of the request
///
/// The first error aborts the whole run; no partial file list is returned.
pub fn generate(
    request: &CodeGeneratorRequest,
    params: &PluginParameters,
    settings: &Settings,
    renderer: &dyn Renderer,
    options: &OptionsResolver,
) -> Result<Vec<File>> {
    let is_java = params.is_java();
    let template = params.template_name();
    let mut files = Vec::new();

    for proto_file in &request.proto_file {
        let package = extract_package(proto_file, is_java);
        if is_skipped_package(package) {
            debug!(file = proto_file.name(), package, "skipping file");
            continue;
        }

        let (plugin_name, plugin_dir) =
            plugin_name_and_dir(proto_file.name(), package, is_java, &settings.initialisms);
        let spec = FileSpec {
            package,
            plugin_name: &plugin_name,
        };

        let model = build_file_model(proto_file, &spec, settings, options)?;
        let content = renderer.render(template, &model.render_context())?;
        let name = output_path(params, &plugin_name, &plugin_dir);

        info!(file = proto_file.name(), output = %name, "generated");
        files.push(File {
            name: Some(name),
            content: Some(content),
            ..Default::default()
        });
    }

    Ok(files)
}

/// Run the whole plugin on the raw bytes of a `CodeGeneratorRequest`
///
/// Never fails: any error is reported through the response's `error` field,
/// which protoc shows to the user.
pub fn generate_response(bytes: &[u8], env_template_path: Option<String>) -> CodeGeneratorResponse {
    match run(bytes, env_template_path) {
        Ok(file) => CodeGeneratorResponse {
            file,
            ..Default::default()
        },
        Err(e) => {
            error!(error = %e, "generation failed");
            CodeGeneratorResponse {
                error: Some(e.to_string()),
                ..Default::default()
            }
        }
    }
}

fn run(bytes: &[u8], env_template_path: Option<String>) -> Result<Vec<File>> {
    let request = CodeGeneratorRequest::decode(bytes).map_err(|e| {
        GeneratorError::Parse(format!("Failed to decode CodeGeneratorRequest: {}", e))
    })?;

    let params = PluginParameters::parse(request.parameter(), env_template_path)?;
    let settings = Settings::load(&params.initialisms_path(), &params.conversions_path())?;
    let renderer = TemplateRenderer::load(
        &params.template_path,
        WhitespaceControl {
            lstrip_blocks: params.lstrip_blocks,
            trim_blocks: params.trim_blocks,
        },
    )?;
    let options = OptionsResolver::from_request_bytes(bytes);

    generate(&request, &params, &settings, &renderer, &options)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::templates::MockRenderer;
    use prost_types::{DescriptorProto, FileOptions, MethodDescriptorProto, ServiceDescriptorProto};
    use protoc_gen_mavsdk_common::TypeConversions;

    fn params(raw: &str) -> PluginParameters {
        PluginParameters::parse(raw, Some("/templates".into())).unwrap()
    }

    fn action_file(name: &str, package: &str) -> FileDescriptorProto {
        FileDescriptorProto {
            name: Some(name.into()),
            package: Some(package.into()),
            message_type: vec![
                DescriptorProto {
                    name: Some("ArmRequest".into()),
                    ..Default::default()
                },
                DescriptorProto {
                    name: Some("ArmResponse".into()),
                    ..Default::default()
                },
            ],
            service: vec![ServiceDescriptorProto {
                name: Some("ActionService".into()),
                method: vec![MethodDescriptorProto {
                    name: Some("Arm".into()),
                    input_type: Some(format!(".{}.ArmRequest", package)),
                    output_type: Some(format!(".{}.ArmResponse", package)),
                    ..Default::default()
                }],
                ..Default::default()
            }],
            ..Default::default()
        }
    }

    #[test]
    fn test_skipped_packages() {
        assert!(is_skipped_package("google.protobuf"));
        assert!(is_skipped_package("com.google.protobuf"));
        assert!(is_skipped_package("mavsdk.options"));
        assert!(is_skipped_package("options.mavsdk"));
        assert!(!is_skipped_package("mavsdk.rpc.action"));
        assert!(!is_skipped_package("mavsdk.options.extra"));
    }

    #[test]
    fn test_plugin_name_and_dir() {
        let initialisms = Initialisms::default();

        let (name, dir) =
            plugin_name_and_dir("action/action.proto", "mavsdk.rpc.action", false, &initialisms);
        assert_eq!(name, "Action");
        assert_eq!(dir, "action");

        let (name, dir) = plugin_name_and_dir(
            "action_server/action_server.proto",
            "io.mavsdk.action_server",
            true,
            &initialisms,
        );
        assert_eq!(name, "ActionServer");
        assert_eq!(dir, "io/mavsdk/action_server");

        let (name, dir) = plugin_name_and_dir("telemetry.proto", "", false, &initialisms);
        assert_eq!(name, "Telemetry");
        assert_eq!(dir, "");
    }

    #[test]
    fn test_output_path() {
        assert_eq!(
            output_path(&params("file_ext=h"), "Action", "action"),
            "action/Action.h"
        );
        assert_eq!(output_path(&params("file_ext=h"), "Action", ""), "Action.h");
        assert_eq!(
            output_path(&params("output_file=all.swift"), "Action", "action"),
            "all.swift"
        );
    }

    #[test]
    fn test_extract_package() {
        let mut file = action_file("action/action.proto", "mavsdk.rpc.action");
        assert_eq!(extract_package(&file, true), "mavsdk.rpc.action");

        file.options = Some(FileOptions {
            java_package: Some("io.mavsdk.action".into()),
            ..Default::default()
        });
        assert_eq!(extract_package(&file, true), "io.mavsdk.action");
        assert_eq!(extract_package(&file, false), "mavsdk.rpc.action");
    }

    #[test]
    fn test_generate_renders_each_user_file() {
        let request = CodeGeneratorRequest {
            proto_file: vec![
                action_file("mavsdk_options.proto", "mavsdk.options"),
                action_file("action/action.proto", "mavsdk.rpc.action"),
            ],
            ..Default::default()
        };

        let mut renderer = MockRenderer::new();
        renderer
            .expect_render()
            .withf(|template, _| template == "file.j2")
            .times(1)
            .returning(|_, ctx| {
                Ok(format!(
                    "{} {}",
                    ctx.plugin_name.upper_camel_case(),
                    ctx.methods.len()
                ))
            });

        let files = generate(
            &request,
            &params("file_ext=h"),
            &Settings::new(Initialisms::default(), TypeConversions::default()),
            &renderer,
            &OptionsResolver::empty(),
        )
        .unwrap();

        assert_eq!(files.len(), 1);
        assert_eq!(files[0].name(), "action/Action.h");
        assert_eq!(files[0].content(), "Action 1");
    }

    #[test]
    fn test_render_error_aborts_run() {
        let request = CodeGeneratorRequest {
            proto_file: vec![action_file("action/action.proto", "mavsdk.rpc.action")],
            ..Default::default()
        };

        let mut renderer = MockRenderer::new();
        renderer
            .expect_render()
            .returning(|_, _| Err(GeneratorError::Generation("boom".into())));

        let result = generate(
            &request,
            &params("file_ext=h"),
            &Settings::default(),
            &renderer,
            &OptionsResolver::empty(),
        );
        assert!(matches!(result, Err(GeneratorError::Generation(_))));
    }

    #[test]
    fn test_undecodable_request_becomes_error_response() {
        let response = generate_response(&[0xff, 0xff, 0xff], None);
        assert!(response.file.is_empty());
        assert!(response.error().contains("CodeGeneratorRequest"));
    }
}
