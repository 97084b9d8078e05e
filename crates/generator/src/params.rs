//! Plugin invocation parameters
//!
//! protoc hands the plugin a single `key=value,key=value` string taken from
//! `--mavsdk_opt` / `--mavsdk_out`.

use protoc_gen_mavsdk_common::{GeneratorError, Result};
use std::path::PathBuf;
use tracing::debug;

/// Environment variable consulted when `template_path` is not given
pub const TEMPLATE_PATH_ENV: &str = "TEMPLATE_PATH";

/// Template rendered when `template_file` is not given
pub const DEFAULT_TEMPLATE_FILE: &str = "file.j2";

/// Parsed invocation parameters
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PluginParameters {
    pub output_file: Option<String>,
    pub file_ext: Option<String>,
    pub template_path: PathBuf,
    pub template_file: Option<String>,
    pub initialisms_file: Option<PathBuf>,
    pub conversions_file: Option<PathBuf>,
    pub lstrip_blocks: bool,
    pub trim_blocks: bool,
}

impl PluginParameters {
    /// Parse the raw parameter string
    ///
    /// `env_template_path` is the value of [`TEMPLATE_PATH_ENV`], passed in
    /// rather than read here so callers control the environment.
    pub fn parse(raw: &str, env_template_path: Option<String>) -> Result<Self> {
        let mut output_file = None;
        let mut file_ext = None;
        let mut template_path = None;
        let mut template_file = None;
        let mut initialisms_file = None;
        let mut conversions_file = None;
        let mut lstrip_blocks = false;
        let mut trim_blocks = false;

        for entry in raw.split(',') {
            let mut parts = entry.split('=');
            let (Some(key), Some(value), None) = (parts.next(), parts.next(), parts.next()) else {
                if !entry.is_empty() {
                    debug!(entry, "ignoring malformed parameter");
                }
                continue;
            };

            match key.trim() {
                "output_file" => output_file = Some(value.to_string()),
                "file_ext" => file_ext = Some(value.to_string()),
                "template_path" => template_path = Some(PathBuf::from(value)),
                "template_file" => template_file = Some(value.to_string()),
                "initialisms_file" => initialisms_file = Some(PathBuf::from(value)),
                "conversions_file" => conversions_file = Some(PathBuf::from(value)),
                "lstrip_blocks" => lstrip_blocks = parse_bool(value),
                "trim_blocks" => trim_blocks = parse_bool(value),
                other => debug!(key = other, "ignoring unknown parameter"),
            }
        }

        if file_ext.is_none() && output_file.is_none() {
            return Err(GeneratorError::Configuration(
                "'file_ext' option was not specified! See \
                 --[name]_out=file_ext=<value>,<other_options>:/path/to/output \
                 or --[name]_opt=file_ext=<value>,<other_options> in the protoc command line."
                    .to_string(),
            ));
        }

        let template_path = template_path
            .or_else(|| env_template_path.filter(|p| !p.is_empty()).map(PathBuf::from))
            .ok_or_else(|| {
                GeneratorError::Configuration(format!(
                    "'template_path' option was not specified! See \
                     --[name]_opt=template_path=<value> in the protoc command line. \
                     Alternatively, set the {} environment variable.",
                    TEMPLATE_PATH_ENV
                ))
            })?;

        Ok(Self {
            output_file,
            file_ext,
            template_path,
            template_file,
            initialisms_file,
            conversions_file,
            lstrip_blocks,
            trim_blocks,
        })
    }

    /// Whether output follows the Java layout (package-derived directories)
    pub fn is_java(&self) -> bool {
        match &self.output_file {
            Some(output_file) => output_file.ends_with("java"),
            None => self.file_ext.as_deref() == Some("java"),
        }
    }

    pub fn initialisms_path(&self) -> PathBuf {
        self.initialisms_file
            .clone()
            .unwrap_or_else(|| self.template_path.join("initialisms"))
    }

    pub fn conversions_path(&self) -> PathBuf {
        self.conversions_file
            .clone()
            .unwrap_or_else(|| self.template_path.join("type_conversions"))
    }

    pub fn template_name(&self) -> &str {
        self.template_file.as_deref().unwrap_or(DEFAULT_TEMPLATE_FILE)
    }
}

fn parse_bool(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "true" | "1" | "yes" | "on"
    )
}
