//! Binding model handed to the templates
//!
//! One [`FileModel`] is assembled per schema file. Methods refer to their
//! request/response structs through [`StructRef`] handles into the owning
//! file model; [`RenderContext`] resolves those handles into a borrowed,
//! serializable view for rendering.

use crate::Identifier;
use serde::Serialize;

/// Single enum value; the numeric code is carried through unchanged
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EnumValueModel {
    pub name: Identifier,
    pub description: String,
    pub number: i32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EnumModel {
    pub name: Identifier,
    pub description: String,
    /// Enclosing message for enums declared inside a message
    pub parent: Option<Identifier>,
    pub values: Vec<EnumValueModel>,
}

/// Resolved target-language type of a field
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TypeInfo {
    /// Target type name, including any repeated wrapper
    pub name: String,
    /// Element type before the repeated wrapper is applied
    pub inner_name: String,
    pub accessor: String,
    pub is_primitive: bool,
    pub is_enum: bool,
    pub is_repeated: bool,
    /// The referenced message is a result wrapper (`...Result`)
    pub is_result: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldModel {
    pub name: Identifier,
    pub type_info: TypeInfo,
    pub description: String,
    pub default_value: Option<String>,
    pub epsilon: Option<f64>,
}

/// Role of a message, decided purely by its name suffix
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StructRole {
    Plain,
    Request,
    Response,
}

impl StructRole {
    pub const REQUEST_SUFFIX: &'static str = "Request";
    pub const RESPONSE_SUFFIX: &'static str = "Response";

    /// Classify a raw message name
    ///
    /// A plain message that happens to end in `Request` is classified as a
    /// request; there is no structural disambiguation.
    pub fn classify(message_name: &str) -> Self {
        if message_name.ends_with(Self::REQUEST_SUFFIX) {
            StructRole::Request
        } else if message_name.ends_with(Self::RESPONSE_SUFFIX) {
            StructRole::Response
        } else {
            StructRole::Plain
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StructModel {
    pub name: Identifier,
    pub description: String,
    pub role: StructRole,
    pub fields: Vec<FieldModel>,
    pub nested_enums: Vec<EnumModel>,
    pub has_result: bool,
}

impl StructModel {
    /// First field that is not a result wrapper, i.e. the returned value
    pub fn return_field(&self) -> Option<&FieldModel> {
        self.fields.iter().find(|f| !f.type_info.is_result)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StreamingShape {
    Unary,
    ClientStreaming,
    ServerStreaming,
    Bidirectional,
}

impl StreamingShape {
    pub fn from_flags(client_streaming: bool, server_streaming: bool) -> Self {
        match (client_streaming, server_streaming) {
            (false, false) => StreamingShape::Unary,
            (true, false) => StreamingShape::ClientStreaming,
            (false, true) => StreamingShape::ServerStreaming,
            (true, true) => StreamingShape::Bidirectional,
        }
    }

    pub fn is_client_streaming(self) -> bool {
        matches!(
            self,
            StreamingShape::ClientStreaming | StreamingShape::Bidirectional
        )
    }

    pub fn is_server_streaming(self) -> bool {
        matches!(
            self,
            StreamingShape::ServerStreaming | StreamingShape::Bidirectional
        )
    }
}

/// Which side of the RPC the generated code implements
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum GenerationTarget {
    Client,
    Server,
}

impl GenerationTarget {
    /// Plugins named `...Server` (e.g. `MissionRawServer`) generate server stubs
    pub fn from_plugin_name(plugin_name: &str) -> Self {
        if plugin_name.to_lowercase().ends_with("server") {
            GenerationTarget::Server
        } else {
            GenerationTarget::Client
        }
    }

    pub fn is_server(self) -> bool {
        self == GenerationTarget::Server
    }
}

/// Calling convention of a method
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MethodKind {
    /// Unary, response carries at most a result
    Call,
    /// Unary, response carries a value
    Request,
    /// Server streaming subscription
    Stream,
}

/// `mavsdk.options.async_type` method option
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AsyncType {
    Async,
    Sync,
    #[default]
    Both,
}

impl AsyncType {
    pub fn from_number(number: i32) -> Option<Self> {
        match number {
            0 => Some(AsyncType::Async),
            1 => Some(AsyncType::Sync),
            2 => Some(AsyncType::Both),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct MethodOptions {
    pub async_type: AsyncType,
    pub is_finite: bool,
}

/// Non-owning handle to a struct owned by the same [`FileModel`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StructRef(usize);

impl StructRef {
    pub fn new(index: usize) -> Self {
        Self(index)
    }

    pub fn index(self) -> usize {
        self.0
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MethodModel {
    pub name: Identifier,
    pub description: String,
    pub shape: StreamingShape,
    pub target: GenerationTarget,
    pub kind: MethodKind,
    pub options: MethodOptions,
    pub has_result: bool,
    /// Index into [`FileModel::requests`]
    #[serde(skip)]
    pub request: StructRef,
    /// Index into [`FileModel::responses`]
    #[serde(skip)]
    pub response: StructRef,
}

/// Everything needed to render one output artifact
#[derive(Debug, Clone, PartialEq)]
pub struct FileModel {
    pub package: Identifier,
    pub plugin_name: Identifier,
    pub class_description: String,
    pub enums: Vec<EnumModel>,
    pub structs: Vec<StructModel>,
    pub requests: Vec<StructModel>,
    pub responses: Vec<StructModel>,
    pub methods: Vec<MethodModel>,
    pub has_result: bool,
    pub is_server: bool,
}

impl FileModel {
    pub fn request_of(&self, method: &MethodModel) -> &StructModel {
        &self.requests[method.request.index()]
    }

    pub fn response_of(&self, method: &MethodModel) -> &StructModel {
        &self.responses[method.response.index()]
    }

    /// Borrowed view handed to the template engine
    pub fn render_context(&self) -> RenderContext<'_> {
        RenderContext {
            package: &self.package,
            plugin_name: &self.plugin_name,
            class_description: &self.class_description,
            enums: &self.enums,
            structs: &self.structs,
            methods: self
                .methods
                .iter()
                .map(|method| {
                    let response = self.response_of(method);
                    MethodView {
                        method,
                        request: self.request_of(method),
                        response,
                        return_field: response.return_field(),
                    }
                })
                .collect(),
            has_result: self.has_result,
            is_server: self.is_server,
        }
    }
}

/// A method together with the payload structs it refers to
#[derive(Debug, Clone, Serialize)]
pub struct MethodView<'a> {
    #[serde(flatten)]
    pub method: &'a MethodModel,
    pub request: &'a StructModel,
    pub response: &'a StructModel,
    pub return_field: Option<&'a FieldModel>,
}

/// Serializable render context for one output artifact
#[derive(Debug, Clone, Serialize)]
pub struct RenderContext<'a> {
    pub package: &'a Identifier,
    pub plugin_name: &'a Identifier,
    pub class_description: &'a str,
    pub enums: &'a [EnumModel],
    pub structs: &'a [StructModel],
    pub methods: Vec<MethodView<'a>>,
    pub has_result: bool,
    pub is_server: bool,
}
