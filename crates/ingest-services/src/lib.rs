//! Ingest Services Layer
//!
//! Request-path services: the upload policy builder, the credential issuer that
//! exchanges the policy for temporary credentials, and the text generation
//! capability. Provider backends sit behind traits so handlers and tests can swap
//! them freely.

pub mod credentials;
pub mod generation;
pub mod policy;

pub use credentials::{
    CredentialError, CredentialIssuer, FederationTokenProvider, FederationTokenRequest,
    IssuedUploadCredentials, RequiredTag,
};
#[cfg(feature = "sts")]
pub use credentials::StsFederationTokenProvider;
#[cfg(feature = "anthropic")]
pub use generation::AnthropicGenerator;
pub use generation::{GenerationError, TextGenerator};
pub use policy::{build_upload_policy, Effect, PolicyDocument, Statement};
