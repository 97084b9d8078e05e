//! Binding model construction from protobuf descriptors
//!
//! This crate turns the `FileDescriptorProto`s of a code generation request
//! into the intermediate [`FileModel`](protoc_gen_mavsdk_common::FileModel).
//!
//! ## Pipeline
//!
//! For each schema file:
//! - `SourceCodeInfo` comments are indexed by declaration path
//! - enums, then structs, then methods are built
//! - the pieces are assembled into one file model
//!
//! Field types are resolved through the conversion table of the run's
//! [`Settings`](protoc_gen_mavsdk_common::Settings); method payloads are
//! matched to structs by their `Request` / `Response` suffix.

mod assembler;
mod context;
pub mod docs;
mod enums;
mod methods;
mod options;
mod structs;
mod type_mapper;

pub use assembler::{build_file_model, FileSpec};
pub use context::ModelContext;
pub use docs::{DeclarationPath, DocIndex};
pub use enums::collect_enums;
pub use methods::collect_methods;
pub use options::{FieldOptions, OptionsResolver};
pub use structs::{collect_structs, CollectedStructs};
pub use type_mapper::{short_type_name, TypeMapper, RESULT_SUFFIX};
