//! Method model builder
//!
//! Classifies each RPC along two independent axes (streaming shape and
//! generation target) and binds it to its request/response structs.

use crate::context::ModelContext;
use crate::docs::DeclarationPath;
use crate::structs::CollectedStructs;
use crate::type_mapper::short_type_name;
use prost_types::{MethodDescriptorProto, ServiceDescriptorProto};
use protoc_gen_mavsdk_common::{
    GenerationTarget, GeneratorError, MethodKind, MethodModel, Result, StreamingShape,
    StructModel, StructRef, StructRole,
};
use tracing::debug;

/// Build models for the methods of every service in the file
///
/// Fails with a lookup error if a method's input or output type is not
/// among the collected requests/responses.
pub fn collect_methods(
    services: &[ServiceDescriptorProto],
    structs: &CollectedStructs,
    ctx: &ModelContext,
) -> Result<Vec<MethodModel>> {
    let mut methods = Vec::new();

    for (i, service) in services.iter().enumerate() {
        let service_name = ctx.full_name(service.name());
        for (j, method) in service.method.iter().enumerate() {
            let path = DeclarationPath::method(i, j);
            methods.push(build_method(&service_name, method, path, structs, ctx)?);
        }
    }

    Ok(methods)
}

fn build_method(
    service_name: &str,
    method: &MethodDescriptorProto,
    path: DeclarationPath,
    structs: &CollectedStructs,
    ctx: &ModelContext,
) -> Result<MethodModel> {
    let request = lookup(
        method.name(),
        StructRole::Request,
        method.input_type(),
        &structs.requests,
    )?;
    let response = lookup(
        method.name(),
        StructRole::Response,
        method.output_type(),
        &structs.responses,
    )?;
    let response_model = &structs.responses[response.index()];

    let shape = StreamingShape::from_flags(method.client_streaming(), method.server_streaming());
    let kind = if shape.is_server_streaming() {
        MethodKind::Stream
    } else if response_model.return_field().is_some() {
        MethodKind::Request
    } else {
        MethodKind::Call
    };

    debug!(method = method.name(), ?shape, ?kind, "built method");

    Ok(MethodModel {
        name: ctx.identifier(method.name()),
        description: ctx.docs.get(&path).to_string(),
        shape,
        target: GenerationTarget::from_plugin_name(ctx.plugin_name),
        kind,
        options: ctx.options.method_options(service_name, method.name()),
        has_result: response_model.has_result,
        request,
        response,
    })
}

/// Find the payload struct a method refers to, by its unqualified name
fn lookup(
    method_name: &str,
    role: StructRole,
    type_name: &str,
    candidates: &[StructModel],
) -> Result<StructRef> {
    let short = short_type_name(type_name);

    candidates
        .iter()
        .position(|s| s.name.raw() == short)
        .map(StructRef::new)
        .ok_or_else(|| {
            GeneratorError::Lookup(format!(
                "Method '{}' uses '{}', which is not a {:?} message of this file",
                method_name, type_name, role
            ))
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::docs::DocIndex;
    use crate::options::OptionsResolver;
    use crate::structs::collect_structs;
    use prost_types::field_descriptor_proto::{Label, Type};
    use prost_types::{DescriptorProto, FieldDescriptorProto};
    use protoc_gen_mavsdk_common::{AsyncType, Settings, TypeConversions};

    fn message(name: &str, field: Vec<FieldDescriptorProto>) -> DescriptorProto {
        DescriptorProto {
            name: Some(name.into()),
            field,
            ..Default::default()
        }
    }

    fn result_field() -> FieldDescriptorProto {
        FieldDescriptorProto {
            name: Some("action_result".into()),
            number: Some(1),
            label: Some(Label::Optional as i32),
            r#type: Some(Type::Message as i32),
            type_name: Some(".mavsdk.rpc.action.ActionResult".into()),
            ..Default::default()
        }
    }

    fn float_field(name: &str) -> FieldDescriptorProto {
        FieldDescriptorProto {
            name: Some(name.into()),
            number: Some(2),
            label: Some(Label::Optional as i32),
            r#type: Some(Type::Float as i32),
            ..Default::default()
        }
    }

    fn rpc(name: &str, input: &str, output: &str, server_streaming: bool) -> MethodDescriptorProto {
        MethodDescriptorProto {
            name: Some(name.into()),
            input_type: Some(format!(".mavsdk.rpc.action.{}", input)),
            output_type: Some(format!(".mavsdk.rpc.action.{}", output)),
            server_streaming: Some(server_streaming),
            ..Default::default()
        }
    }

    fn build(plugin_name: &str, methods: Vec<MethodDescriptorProto>) -> Result<(CollectedStructs, Vec<MethodModel>)> {
        let settings = Settings::new(
            Default::default(),
            TypeConversions::from_entries([("TYPE_FLOAT", "float")], None),
        );
        let docs = DocIndex::default();
        let options = OptionsResolver::empty();
        let ctx = ModelContext {
            proto_package: "mavsdk.rpc.action",
            plugin_name,
            settings: &settings,
            docs: &docs,
            options: &options,
        };

        let messages = vec![
            message("ArmRequest", vec![]),
            message("ArmResponse", vec![result_field()]),
            message("GetTakeoffAltitudeRequest", vec![]),
            message(
                "GetTakeoffAltitudeResponse",
                vec![result_field(), float_field("altitude")],
            ),
            message("SubscribeAltitudeRequest", vec![]),
            message("AltitudeResponse", vec![float_field("altitude_m")]),
        ];
        let structs = collect_structs(&messages, &ctx)?;
        let service = ServiceDescriptorProto {
            name: Some("ActionService".into()),
            method: methods,
            ..Default::default()
        };
        let methods = collect_methods(&[service], &structs, &ctx)?;
        Ok((structs, methods))
    }

    #[test]
    fn test_unary_call_resolves_payloads() {
        let (structs, methods) =
            build("Action", vec![rpc("Arm", "ArmRequest", "ArmResponse", false)]).unwrap();

        let arm = &methods[0];
        assert_eq!(arm.name.lower_snake_case(), "arm");
        assert_eq!(arm.shape, StreamingShape::Unary);
        assert_eq!(arm.kind, MethodKind::Call);
        assert_eq!(arm.target, GenerationTarget::Client);
        assert!(arm.has_result);
        assert_eq!(arm.options.async_type, AsyncType::Both);
        assert_eq!(structs.requests[arm.request.index()].name.raw(), "ArmRequest");
        assert_eq!(structs.responses[arm.response.index()].name.raw(), "ArmResponse");
    }

    #[test]
    fn test_method_kinds() {
        let (_, methods) = build(
            "Action",
            vec![
                rpc(
                    "GetTakeoffAltitude",
                    "GetTakeoffAltitudeRequest",
                    "GetTakeoffAltitudeResponse",
                    false,
                ),
                rpc("SubscribeAltitude", "SubscribeAltitudeRequest", "AltitudeResponse", true),
            ],
        )
        .unwrap();

        assert_eq!(methods[0].kind, MethodKind::Request);
        assert_eq!(methods[1].kind, MethodKind::Stream);
        assert_eq!(methods[1].shape, StreamingShape::ServerStreaming);
        assert!(!methods[1].has_result);
    }

    #[test]
    fn test_server_plugin_target() {
        let (_, methods) =
            build("ActionServer", vec![rpc("Arm", "ArmRequest", "ArmResponse", false)]).unwrap();
        assert_eq!(methods[0].target, GenerationTarget::Server);
    }

    #[test]
    fn test_missing_payload_is_lookup_error() {
        let result = build("Action", vec![rpc("Land", "LandRequest", "LandResponse", false)]);
        assert!(matches!(result, Err(GeneratorError::Lookup(_))));
    }

    #[test]
    fn test_request_type_must_be_a_request() {
        let result = build("Action", vec![rpc("Arm", "ArmResponse", "ArmResponse", false)]);
        assert!(matches!(result, Err(GeneratorError::Lookup(_))));
    }
}
