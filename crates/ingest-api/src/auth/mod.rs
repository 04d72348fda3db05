//! Bearer-token authentication.
//!
//! Token verification is a capability behind [`TokenVerifier`]; the production backend
//! validates RS256/ES256 tokens against the identity provider's JWKS.

pub mod middleware;
pub mod models;
pub mod verifier;

pub use middleware::{auth_middleware, AuthState};
pub use models::{AuthenticatedUser, Claims};
pub use verifier::{JwksTokenVerifier, TokenVerifier};
