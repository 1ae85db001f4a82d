/// Authentication and authorization
///
/// # Modules
///
/// - [`jwt`]: HS256 bearer token signing and validation
/// - [`middleware`]: `AuthContext` and bearer header authentication
/// - [`authorization`]: Event permission port and its implementations

pub mod authorization;
pub mod jwt;
pub mod middleware;
