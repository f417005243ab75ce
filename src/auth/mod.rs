//! JWT authentication with role-based access control.
//!
//! Every protected route goes through one gate: extract the credential
//! (access-token cookie, Authorization header as fallback), verify it
//! against the process secret, then check the claim's role against the
//! endpoint's explicit allow-list. Outcomes map uniformly onto the response
//! envelope: 401 for any extraction/verification failure, 403 for a role
//! outside the list.

mod cookie;
mod errors;
mod extractors;
mod policy;
mod state;

pub use cookie::{
    ACCESS_COOKIE_NAME, REFRESH_COOKIE_NAME, access_credential, bearer_token, get_cookie,
};
pub use errors::AuthError;
pub use extractors::{Auth, authorize};
pub use policy::{AdminOnly, AnyRole, RoleConstraint, SuperAdminOnly, is_allowed};
pub use state::HasAuthBackend;
