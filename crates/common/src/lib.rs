//! Common types and utilities for protoc-gen-mavsdk
//!
//! This crate contains the shared error type, identifier normalization,
//! the type conversion table and the binding model consumed by templates.

mod conversions;
mod model;
mod naming;
mod settings;

pub use conversions::{Conversion, RepeatedConversion, TypeConversions};
pub use model::{
    AsyncType, EnumModel, EnumValueModel, FieldModel, FileModel, GenerationTarget, MethodKind,
    MethodModel, MethodOptions, MethodView, RenderContext, StreamingShape, StructModel, StructRef,
    StructRole, TypeInfo,
};
pub use naming::{Identifier, Initialisms, Token, TokenKind};
pub use settings::Settings;

use thiserror::Error;

/// Errors that can occur while generating bindings
#[derive(Error, Debug)]
pub enum GeneratorError {
    /// Missing or invalid invocation parameter, or unusable data file
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// A schema type has no entry in the conversion table
    #[error("Type resolution error: {0}")]
    TypeResolution(String),

    /// A method references a payload type that was not collected
    #[error("Lookup error: {0}")]
    Lookup(String),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Generation error: {0}")]
    Generation(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type for generator operations
pub type Result<T> = std::result::Result<T, GeneratorError>;
