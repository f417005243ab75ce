//! Authentication state trait and macro.

use crate::jwt::JwtConfig;

/// Trait for router state types that can feed the authorization gate.
///
/// The gate is stateless: it only needs the token codec. The signing secret
/// lives inside [`JwtConfig`], constructed once at startup and shared by
/// reference, never through a mutable global.
pub trait HasAuthBackend {
    fn jwt(&self) -> &JwtConfig;
}

/// Implement [`HasAuthBackend`] for a state struct with a `jwt: Arc<JwtConfig>`
/// field.
#[macro_export]
macro_rules! impl_has_auth_backend {
    ($state_type:ty) => {
        impl $crate::auth::HasAuthBackend for $state_type {
            fn jwt(&self) -> &$crate::jwt::JwtConfig {
                &self.jwt
            }
        }
    };
}
