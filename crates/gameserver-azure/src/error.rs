//! Azure provider error types

use gameserver_cloud::CloudError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AzureError {
    #[error("az CLI not found. Please install: https://learn.microsoft.com/cli/azure/install-azure-cli")]
    AzNotFound,

    #[error("az authentication failed: {0}")]
    AuthenticationFailed(String),

    #[error("az command failed: {0}")]
    CommandFailed(String),

    #[error(
        "Invalid OS image reference '{0}': expected publisher:offer:sku:version with four non-empty fields"
    )]
    InvalidImageReference(String),

    #[error("Key generation failed: {0}")]
    KeyGeneration(String),

    #[error("Stored SSH key is unusable: {0}")]
    InvalidStoredKey(String),

    #[error("Invalid custom data: {0}")]
    InvalidCustomData(String),

    #[error("Unexpected az output: {0}")]
    UnexpectedOutput(String),

    #[error("JSON parse error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Cloud error: {0}")]
    CloudError(#[from] CloudError),
}

pub type Result<T> = std::result::Result<T, AzureError>;

impl From<AzureError> for CloudError {
    fn from(error: AzureError) -> Self {
        match error {
            AzureError::CloudError(e) => e,
            AzureError::AzNotFound => {
                CloudError::AuthenticationFailed(AzureError::AzNotFound.to_string())
            }
            AzureError::AuthenticationFailed(message) => CloudError::AuthenticationFailed(message),
            AzureError::CommandFailed(message) => CloudError::CommandFailed(message),
            AzureError::InvalidImageReference(value) => {
                CloudError::InvalidConfig(AzureError::InvalidImageReference(value).to_string())
            }
            AzureError::JsonError(e) => CloudError::Json(e),
            AzureError::IoError(e) => CloudError::Io(e),
            other => CloudError::ApiError(other.to_string()),
        }
    }
}
