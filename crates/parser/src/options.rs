//! Custom `mavsdk.options` extensions
//!
//! `prost_types` drops extension fields while decoding descriptor options,
//! so the raw file descriptors of the request are decoded a second time into
//! a `prost_reflect::DescriptorPool`, which keeps them.

use prost::Message;
use prost_reflect::{DescriptorPool, DynamicMessage, Value};
use protoc_gen_mavsdk_common::{AsyncType, MethodOptions};
use tracing::{debug, warn};

const ASYNC_TYPE: &str = "mavsdk.options.async_type";
const IS_FINITE: &str = "mavsdk.options.is_finite";
const DEFAULT_VALUE: &str = "mavsdk.options.default_value";
const EPSILON: &str = "mavsdk.options.epsilon";

/// `CodeGeneratorRequest` with the file descriptors left undecoded
#[derive(Clone, PartialEq, ::prost::Message)]
struct RawCodeGeneratorRequest {
    #[prost(bytes = "vec", repeated, tag = "15")]
    pub proto_file: Vec<Vec<u8>>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
struct RawFileDescriptorSet {
    #[prost(bytes = "vec", repeated, tag = "1")]
    pub file: Vec<Vec<u8>>,
}

/// Custom options attached to a field
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FieldOptions {
    pub default_value: Option<String>,
    pub epsilon: Option<f64>,
}

/// Looks up custom option values by declaration name
#[derive(Debug, Clone, Default)]
pub struct OptionsResolver {
    pool: Option<DescriptorPool>,
}

impl OptionsResolver {
    /// Resolver that knows no options; every lookup yields defaults
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn from_pool(pool: DescriptorPool) -> Self {
        Self { pool: Some(pool) }
    }

    /// Build from the raw bytes of a `CodeGeneratorRequest`
    ///
    /// Failure to build the pool is not fatal: options are optional, so the
    /// resolver degrades to [`OptionsResolver::empty`].
    pub fn from_request_bytes(bytes: &[u8]) -> Self {
        match RawCodeGeneratorRequest::decode(bytes) {
            Ok(request) => Self::from_raw_files(request.proto_file),
            Err(e) => {
                warn!(error = %e, "could not decode request for custom options");
                Self::empty()
            }
        }
    }

    pub fn from_raw_files(files: Vec<Vec<u8>>) -> Self {
        let set = RawFileDescriptorSet { file: files }.encode_to_vec();
        match DescriptorPool::decode(set.as_slice()) {
            Ok(pool) => Self::from_pool(pool),
            Err(e) => {
                warn!(error = %e, "custom options unavailable");
                Self::empty()
            }
        }
    }

    /// Options of `method_name` in the fully-qualified service
    pub fn method_options(&self, service: &str, method_name: &str) -> MethodOptions {
        let Some(options) = self.pool.as_ref().and_then(|pool| {
            pool.get_service_by_name(service)?
                .methods()
                .find(|m| m.name() == method_name)
                .map(|m| m.options())
        }) else {
            return MethodOptions::default();
        };

        let async_type = match self.extension(&options, ASYNC_TYPE) {
            Some(Value::EnumNumber(n)) => AsyncType::from_number(n).unwrap_or_else(|| {
                debug!(service, method_name, value = n, "unknown async_type");
                AsyncType::default()
            }),
            _ => AsyncType::default(),
        };
        let is_finite = matches!(self.extension(&options, IS_FINITE), Some(Value::Bool(true)));

        MethodOptions {
            async_type,
            is_finite,
        }
    }

    /// Options of `field_name` in the fully-qualified message
    pub fn field_options(&self, message: &str, field_name: &str) -> FieldOptions {
        let Some(options) = self.pool.as_ref().and_then(|pool| {
            pool.get_message_by_name(message)?
                .get_field_by_name(field_name)
                .map(|f| f.options())
        }) else {
            return FieldOptions::default();
        };

        let default_value = match self.extension(&options, DEFAULT_VALUE) {
            Some(Value::String(s)) => Some(s),
            _ => None,
        };
        let epsilon = match self.extension(&options, EPSILON) {
            Some(Value::F64(v)) => Some(v),
            _ => None,
        };

        FieldOptions {
            default_value,
            epsilon,
        }
    }

    fn extension(&self, options: &DynamicMessage, name: &str) -> Option<Value> {
        let extension = self.pool.as_ref()?.get_extension_by_name(name)?;
        if !options.has_extension(&extension) {
            return None;
        }
        Some(options.get_extension(&extension).into_owned())
    }
}
