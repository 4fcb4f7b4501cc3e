/// Authentication and authorization utilities
///
/// - [`password`]: Argon2id hashing — the opaque one-way hasher
/// - [`jwt`]: HS256 access/refresh tokens
/// - [`middleware`]: bearer extraction and the request `AuthContext`
/// - [`authorization`]: the single ownership predicate
pub mod authorization;
pub mod jwt;
pub mod middleware;
pub mod password;
