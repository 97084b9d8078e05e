//! Documentation extraction from `SourceCodeInfo`
//!
//! protoc attaches comments to declarations through location paths built
//! from the field tags of `descriptor.proto` itself: "the 3rd field of the
//! 1st message" is `[4, 0, 2, 2]` because `FileDescriptorProto.message_type`
//! has tag 4 and `DescriptorProto.field` has tag 2. These tag numbers are an
//! external contract and are spelled out in [`tags`].

use prost_types::source_code_info::Location;
use prost_types::SourceCodeInfo;
use std::collections::HashMap;

/// Field tags of `google/protobuf/descriptor.proto` used in location paths
pub mod tags {
    /// `FileDescriptorProto.message_type`
    pub const FILE_MESSAGE_TYPE: i32 = 4;
    /// `FileDescriptorProto.enum_type`
    pub const FILE_ENUM_TYPE: i32 = 5;
    /// `FileDescriptorProto.service`
    pub const FILE_SERVICE: i32 = 6;
    /// `DescriptorProto.field`
    pub const MESSAGE_FIELD: i32 = 2;
    /// `DescriptorProto.enum_type`
    pub const MESSAGE_ENUM_TYPE: i32 = 4;
    /// `EnumDescriptorProto.value`
    pub const ENUM_VALUE: i32 = 2;
    /// `ServiceDescriptorProto.method`
    pub const SERVICE_METHOD: i32 = 2;
}

/// Structural position of a declaration inside a schema file
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DeclarationPath(Vec<i32>);

impl DeclarationPath {
    fn root(tag: i32, index: usize) -> Self {
        Self(vec![tag, index as i32])
    }

    /// Path of the `index`-th element under field `tag` of this declaration
    fn child(&self, tag: i32, index: usize) -> Self {
        let mut path = self.0.clone();
        path.push(tag);
        path.push(index as i32);
        Self(path)
    }

    pub fn message(message: usize) -> Self {
        Self::root(tags::FILE_MESSAGE_TYPE, message)
    }

    pub fn field(message: usize, field: usize) -> Self {
        Self::message(message).child(tags::MESSAGE_FIELD, field)
    }

    pub fn nested_enum(message: usize, nested: usize) -> Self {
        Self::message(message).child(tags::MESSAGE_ENUM_TYPE, nested)
    }

    pub fn enumeration(index: usize) -> Self {
        Self::root(tags::FILE_ENUM_TYPE, index)
    }

    /// Path of the `index`-th value of the enum at this path
    pub fn value(&self, index: usize) -> Self {
        self.child(tags::ENUM_VALUE, index)
    }

    pub fn service(index: usize) -> Self {
        Self::root(tags::FILE_SERVICE, index)
    }

    pub fn method(service: usize, method: usize) -> Self {
        Self::service(service).child(tags::SERVICE_METHOD, method)
    }

    pub fn as_slice(&self) -> &[i32] {
        &self.0
    }
}

/// Comment text per declaration path, built once per schema file
#[derive(Debug, Clone, Default)]
pub struct DocIndex {
    entries: HashMap<DeclarationPath, String>,
}

impl DocIndex {
    pub fn from_source_info(info: Option<&SourceCodeInfo>) -> Self {
        let mut entries = HashMap::new();

        for location in info.map(|i| i.location.as_slice()).unwrap_or_default() {
            if let Some(text) = comment_text(location) {
                entries
                    .entry(DeclarationPath(location.path.clone()))
                    .or_insert(text);
            }
        }

        Self { entries }
    }

    /// Documentation for a declaration, empty when it has none
    pub fn get(&self, path: &DeclarationPath) -> &str {
        self.entries.get(path).map(String::as_str).unwrap_or("")
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Leading comment, else the closest detached one, else the trailing one
fn comment_text(location: &Location) -> Option<String> {
    let raw = location
        .leading_comments
        .as_deref()
        .filter(|c| !c.trim().is_empty())
        .or_else(|| location.leading_detached_comments.last().map(String::as_str))
        .or(location.trailing_comments.as_deref())?;

    let text = clean_comment(raw);
    (!text.is_empty()).then_some(text)
}

fn clean_comment(raw: &str) -> String {
    raw.lines()
        .map(|line| line.strip_prefix(' ').unwrap_or(line).trim_end())
        .collect::<Vec<_>>()
        .join("\n")
        .trim()
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn location(path: Vec<i32>, leading: Option<&str>) -> Location {
        Location {
            path,
            leading_comments: leading.map(str::to_string),
            ..Default::default()
        }
    }

    #[test]
    fn test_paths_use_descriptor_tags() {
        assert_eq!(DeclarationPath::message(0).as_slice(), &[4, 0]);
        assert_eq!(DeclarationPath::field(0, 2).as_slice(), &[4, 0, 2, 2]);
        assert_eq!(DeclarationPath::nested_enum(1, 0).as_slice(), &[4, 1, 4, 0]);
        assert_eq!(
            DeclarationPath::nested_enum(1, 0).value(3).as_slice(),
            &[4, 1, 4, 0, 2, 3]
        );
        assert_eq!(DeclarationPath::enumeration(0).as_slice(), &[5, 0]);
        assert_eq!(DeclarationPath::enumeration(0).value(1).as_slice(), &[5, 0, 2, 1]);
        assert_eq!(DeclarationPath::service(0).as_slice(), &[6, 0]);
        assert_eq!(DeclarationPath::method(0, 4).as_slice(), &[6, 0, 2, 4]);
    }

    #[test]
    fn test_lookup_by_path() {
        let info = SourceCodeInfo {
            location: vec![
                location(vec![6, 0], Some(" Enable simple actions.\n")),
                location(vec![4, 0, 2, 2], Some(" Altitude in metres\n")),
                location(vec![4, 0, 2, 2, 1], None),
            ],
        };

        let docs = DocIndex::from_source_info(Some(&info));
        assert_eq!(docs.len(), 2);
        assert_eq!(docs.get(&DeclarationPath::service(0)), "Enable simple actions.");
        assert_eq!(docs.get(&DeclarationPath::field(0, 2)), "Altitude in metres");
        assert_eq!(docs.get(&DeclarationPath::field(0, 1)), "");
    }

    #[test]
    fn test_comment_fallbacks() {
        let detached = Location {
            path: vec![5, 0],
            leading_detached_comments: vec![" first\n".into(), " closest\n".into()],
            trailing_comments: Some(" trailing\n".into()),
            ..Default::default()
        };
        let trailing = Location {
            path: vec![5, 0, 2, 0],
            trailing_comments: Some(" Value doc\n".into()),
            ..Default::default()
        };
        let info = SourceCodeInfo {
            location: vec![detached, trailing],
        };

        let docs = DocIndex::from_source_info(Some(&info));
        assert_eq!(docs.get(&DeclarationPath::enumeration(0)), "closest");
        assert_eq!(docs.get(&DeclarationPath::enumeration(0).value(0)), "Value doc");
    }

    #[test]
    fn test_multiline_comment() {
        let info = SourceCodeInfo {
            location: vec![location(
                vec![4, 1],
                Some(" Type for position.\n\n  Indented line\n"),
            )],
        };

        let docs = DocIndex::from_source_info(Some(&info));
        assert_eq!(
            docs.get(&DeclarationPath::message(1)),
            "Type for position.\n\n Indented line"
        );
    }

    #[test]
    fn test_missing_source_info() {
        let docs = DocIndex::from_source_info(None);
        assert!(docs.is_empty());
        assert_eq!(docs.get(&DeclarationPath::message(0)), "");
    }
}
