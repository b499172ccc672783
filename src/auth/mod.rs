//! Authentication: password hashing, token issuance/validation, the
//! signup/login/refresh service, and the per-request authorizer.

pub mod authorizer;
pub mod handlers;
pub mod password;
pub mod service;
pub mod token;

pub use authorizer::{AuthenticatedUser, PublicPaths, RequestAuthorizer};
pub use service::{AuthService, TokenPair};
pub use token::{Claims, TokenIssuer};
