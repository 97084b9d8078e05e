//! Per-run generation settings

use crate::{Initialisms, Result, TypeConversions};
use std::path::Path;

/// Data files loaded once at startup and shared read-only by every builder
#[derive(Debug, Clone, Default)]
pub struct Settings {
    pub initialisms: Initialisms,
    pub conversions: TypeConversions,
}

impl Settings {
    pub fn new(initialisms: Initialisms, conversions: TypeConversions) -> Self {
        Self {
            initialisms,
            conversions,
        }
    }

    /// Load both data files
    pub fn load(initialisms_path: &Path, conversions_path: &Path) -> Result<Self> {
        Ok(Self {
            initialisms: Initialisms::load(initialisms_path)?,
            conversions: TypeConversions::load(conversions_path)?,
        })
    }
}
