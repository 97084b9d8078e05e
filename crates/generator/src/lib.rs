//! Code generation for MAVSDK language bindings
//!
//! This crate drives the protoc plugin: it parses invocation parameters,
//! builds a file model for every schema file through the parser crate and
//! renders it with a user-supplied template directory.

mod params;
mod plugin;
mod templates;

pub use params::{PluginParameters, DEFAULT_TEMPLATE_FILE, TEMPLATE_PATH_ENV};
pub use plugin::{
    extract_package, generate, generate_response, is_skipped_package, output_path,
    plugin_name_and_dir,
};
pub use templates::{Renderer, TemplateRenderer, WhitespaceControl};
