//! First-boot script passed to the VM as custom data
//!
//! The script leaves two things behind that other tooling relies on: a
//! headless Java runtime and an empty directory for the server payload.
//! Installing or starting the payload itself is not part of the script.

use crate::error::{AzureError, Result};
use base64::Engine;
use base64::engine::general_purpose::STANDARD;

pub const DEFAULT_JAVA_VERSION: u32 = 17;
pub const DEFAULT_PAYLOAD_DIR: &str = "fabric-server";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BootScript {
    pub java_version: u32,
    /// Created under the admin user's home directory
    pub payload_dir: String,
}

impl Default for BootScript {
    fn default() -> Self {
        Self {
            java_version: DEFAULT_JAVA_VERSION,
            payload_dir: DEFAULT_PAYLOAD_DIR.to_string(),
        }
    }
}

impl BootScript {
    pub fn java_package(&self) -> String {
        format!("openjdk-{}-jre-headless", self.java_version)
    }

    pub fn render(&self) -> String {
        format!(
            "#!/bin/bash\n\
             sudo apt update -y\n\
             sudo apt install {} -y\n\
             mkdir -p ~/{}\n",
            self.java_package(),
            self.payload_dir
        )
    }

    /// Base64 of the rendered script, as the `customData` field expects
    pub fn to_custom_data(&self) -> String {
        STANDARD.encode(self.render())
    }
}

/// Reverses [`BootScript::to_custom_data`]
pub fn decode_custom_data(custom_data: &str) -> Result<String> {
    let bytes = STANDARD
        .decode(custom_data.trim())
        .map_err(|e| AzureError::InvalidCustomData(e.to_string()))?;
    String::from_utf8(bytes).map_err(|e| AzureError::InvalidCustomData(e.to_string()))
}
