//! Template loading and rendering

use protoc_gen_mavsdk_common::{GeneratorError, RenderContext, Result};
use std::collections::HashMap;
use std::error::Error as _;
use std::fs;
use std::path::Path;
use tera::{Tera, Value};
use tracing::debug;

/// Renders a named template against a file's render context
#[cfg_attr(test, mockall::automock)]
pub trait Renderer {
    fn render<'a>(&self, template: &str, ctx: &RenderContext<'a>) -> Result<String>;
}

/// Jinja-style whitespace options applied while loading templates
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WhitespaceControl {
    /// Strip spaces and tabs before a `{%` or `{#` tag that starts a line
    pub lstrip_blocks: bool,
    /// Drop the first newline after a `{% %}` or `{# #}` tag
    pub trim_blocks: bool,
}

impl WhitespaceControl {
    /// Only whitespace adjacent to statement and comment tags is touched;
    /// text outside tags and `{{ }}` expressions pass through unchanged.
    fn apply(&self, source: &str) -> String {
        if !self.lstrip_blocks && !self.trim_blocks {
            return source.to_string();
        }

        let mut out = String::with_capacity(source.len());
        let mut rest = source;
        while let Some(start) = find_tag_open(rest) {
            let (text, tail) = rest.split_at(start);
            let is_block = !tail.starts_with("{{");

            if is_block && self.lstrip_blocks {
                push_lstripped(&mut out, text);
            } else {
                out.push_str(text);
            }

            let Some(len) = tag_len(tail) else {
                // Unterminated tag, left for tera to report
                out.push_str(tail);
                return out;
            };
            out.push_str(&tail[..len]);
            rest = &tail[len..];

            if is_block && self.trim_blocks {
                let newline = if rest.starts_with("\r\n") {
                    2
                } else if rest.starts_with('\n') {
                    1
                } else {
                    0
                };
                rest = &rest[newline..];
            }
        }
        out.push_str(rest);
        out
    }
}

/// Tera-backed renderer over every file of a template directory
pub struct TemplateRenderer {
    tera: Tera,
}

impl TemplateRenderer {
    /// Load all regular files of `dir` as templates, named by file name
    pub fn load(dir: &Path, whitespace: WhitespaceControl) -> Result<Self> {
        let entries = fs::read_dir(dir).map_err(|e| {
            GeneratorError::Configuration(format!(
                "Failed to read template directory {}: {}",
                dir.display(),
                e
            ))
        })?;

        let mut sources = Vec::new();
        for entry in entries {
            let path = entry?.path();
            if !path.is_file() {
                continue;
            }
            let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
                continue;
            };
            let Ok(content) = fs::read_to_string(&path) else {
                debug!(path = %path.display(), "skipping non UTF-8 file");
                continue;
            };
            sources.push((name.to_string(), whitespace.apply(&content)));
        }
        sources.sort();

        let mut tera = Tera::default();
        tera.autoescape_on(vec![]);
        tera.register_filter("indent", indent_filter);
        tera.register_filter("remove_prefix", remove_prefix_filter);
        tera.add_raw_templates(sources).map_err(|e| {
            GeneratorError::Configuration(format!(
                "Failed to load templates from {}: {}",
                dir.display(),
                describe(&e)
            ))
        })?;

        debug!(
            dir = %dir.display(),
            templates = tera.get_template_names().count(),
            "loaded templates"
        );

        Ok(Self { tera })
    }
}

impl Renderer for TemplateRenderer {
    fn render<'a>(&self, template: &str, ctx: &RenderContext<'a>) -> Result<String> {
        let context = tera::Context::from_serialize(ctx)
            .map_err(|e| GeneratorError::Generation(format!("Invalid render context: {}", e)))?;

        self.tera.render(template, &context).map_err(|e| {
            GeneratorError::Generation(format!(
                "Failed to render template '{}': {}",
                template,
                describe(&e)
            ))
        })
    }
}

/// Tera errors keep the useful part of the message in their source chain
fn describe(err: &tera::Error) -> String {
    let mut message = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = cause.source();
    }
    message
}

/// Byte offset of the next `{%`, `{#` or `{{`
fn find_tag_open(source: &str) -> Option<usize> {
    let bytes = source.as_bytes();
    bytes
        .windows(2)
        .position(|pair| pair[0] == b'{' && matches!(pair[1], b'%' | b'#' | b'{'))
}

/// Length of the tag at the start of `tag`, closer included. Closers inside
/// string literals of statements and expressions do not end the tag.
fn tag_len(tag: &str) -> Option<usize> {
    let (closer, quoted): (&[u8], bool) = if tag.starts_with("{%") {
        (b"%}", true)
    } else if tag.starts_with("{#") {
        (b"#}", false)
    } else {
        (b"}}", true)
    };

    let bytes = tag.as_bytes();
    let mut quote = None;
    for i in 2..bytes.len() {
        match quote {
            Some(q) if bytes[i] == q => quote = None,
            Some(_) => {}
            None if quoted && matches!(bytes[i], b'"' | b'\'' | b'`') => quote = Some(bytes[i]),
            None if bytes[i..].starts_with(closer) => return Some(i + closer.len()),
            None => {}
        }
    }
    None
}

/// Push `text`, dropping its trailing spaces and tabs when they are all that
/// separates the following tag from the start of its line
fn push_lstripped(out: &mut String, text: &str) {
    let trimmed = text.trim_end_matches([' ', '\t']);
    let at_line_start = if trimmed.is_empty() {
        out.is_empty() || out.ends_with('\n')
    } else {
        trimmed.ends_with('\n')
    };
    out.push_str(if at_line_start { trimmed } else { text });
}

/// `indent(width=4, first=false)`: indent every line but the first
fn indent_filter(value: &Value, args: &HashMap<String, Value>) -> tera::Result<Value> {
    let s = value
        .as_str()
        .ok_or_else(|| tera::Error::msg("indent filter expects a string"))?;
    let width = match args.get("width") {
        Some(w) => w
            .as_u64()
            .ok_or_else(|| tera::Error::msg("indent filter expects an integer width"))?,
        None => 4,
    };
    let first = args.get("first").and_then(Value::as_bool).unwrap_or(false);
    let padding = " ".repeat(width as usize);

    let indented = s
        .split('\n')
        .enumerate()
        .map(|(i, line)| {
            if (i > 0 || first) && !line.trim().is_empty() {
                format!("{}{}", padding, line)
            } else {
                line.to_string()
            }
        })
        .collect::<Vec<_>>()
        .join("\n");

    Ok(Value::String(indented))
}

/// `remove_prefix(prefix="...")`
fn remove_prefix_filter(value: &Value, args: &HashMap<String, Value>) -> tera::Result<Value> {
    let s = value
        .as_str()
        .ok_or_else(|| tera::Error::msg("remove_prefix filter expects a string"))?;
    let prefix = args
        .get("prefix")
        .and_then(Value::as_str)
        .ok_or_else(|| tera::Error::msg("remove_prefix filter expects a `prefix` argument"))?;

    Ok(Value::String(
        s.strip_prefix(prefix).unwrap_or(s).to_string(),
    ))
}
