//! Ownership checks for mutations.
//!
//! Every check takes the result of the lookup, not just the entity, so that a
//! missing record is reported as `NotFound` before ownership is considered.

use uuid::Uuid;

use crate::auth::actor::Actor;
use crate::services::error::ServiceError;
use crate::types::Operation;

/// An entity owned by a single user
pub trait Owned {
    /// Human readable entity name used in error messages
    const KIND: &'static str;

    fn owner_id(&self) -> Uuid;

    /// Whether an admin may perform `op` on someone else's entity
    fn admin_override(_actor: &Actor, _op: Operation) -> bool {
        false
    }
}

/// Resolve a lookup result, failing with `NotFound` when nothing was found
pub fn resolve<T: Owned>(found: Option<T>) -> Result<T, ServiceError> {
    found.ok_or_else(|| ServiceError::not_found(format!("{} not found", T::KIND)))
}

/// True when `actor` may perform `op` on `entity`
pub fn permits<T: Owned>(actor: &Actor, entity: &T, op: Operation) -> bool {
    entity.owner_id() == actor.id || T::admin_override(actor, op)
}

/// Resolve the lookup, then check ownership (or the entity's admin override)
pub fn authorize<T: Owned>(actor: &Actor, found: Option<T>, op: Operation) -> Result<T, ServiceError> {
    let entity = resolve(found)?;
    if permits(actor, &entity, op) {
        Ok(entity)
    } else {
        tracing::warn!(
            actor = %actor.id,
            kind = T::KIND,
            operation = op.verb(),
            "rejected mutation by non-owner"
        );
        Err(ServiceError::forbidden(format!(
            "You do not have permission to {} this {}",
            op.verb(),
            T::KIND
        )))
    }
}
