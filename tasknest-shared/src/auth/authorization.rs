/// Ownership checks
///
/// Ownership is the only access rule in tasknest: a principal may act
/// on a resource exactly when the resource's owner id equals their own.
/// There are no roles, no shared access, no admin override. Every
/// handler that gates on ownership calls the one predicate here rather
/// than re-implementing the comparison inline, so the rule cannot
/// drift between operations.
///
/// # Example
///
/// ```
/// use tasknest_shared::auth::authorization::require_ownership;
/// use tasknest_shared::auth::middleware::AuthContext;
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let auth = AuthContext::new(1);
/// require_ownership(&auth, 1)?;             // own resource: allowed
/// assert!(require_ownership(&auth, 2).is_err()); // someone else's: denied
/// # Ok(())
/// # }
/// ```
use super::middleware::AuthContext;

/// Error type for authorization checks
#[derive(Debug, thiserror::Error)]
pub enum AuthzError {
    /// Authenticated, but not the owner of the target resource
    #[error("Not enough permissions")]
    NotOwner,
}

/// Allows the operation iff the principal owns the target resource
///
/// `owner_id` must come from the stored record (or, for user
/// self-operations, the record's own id) — never from a
/// caller-supplied value on the wire.
pub fn require_ownership(auth: &AuthContext, owner_id: i64) -> Result<(), AuthzError> {
    if auth.user_id != owner_id {
        return Err(AuthzError::NotOwner);
    }

    Ok(())
}
