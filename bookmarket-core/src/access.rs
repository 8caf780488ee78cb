//! Access control
//!
//! Authorization is a chain of pure checks evaluated by the request handler
//! before any business logic runs:
//!
//! 1. [`require_authenticated`] - the actor has a session
//! 2. [`require_role`] - the actor holds a marketplace role
//! 3. [`check_ownership`] - the actor owns the resource being mutated
//!
//! The [`Gate`] strings these together with short-circuit semantics. The
//! first denial is final and no later check is evaluated.

use crate::actor::{Actor, Identity, Role};
use crate::types::UserId;
use serde::Serialize;
use tracing::debug;

/// Outcome of an authorization check
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AccessDecision {
    Allow,
    DenyUnauthenticated,
    DenyForbiddenRole,
    DenyNotOwner,
}

impl AccessDecision {
    pub fn is_allowed(&self) -> bool {
        matches!(self, AccessDecision::Allow)
    }

    /// `Ok(())` on allow, the denial otherwise
    pub fn into_result(self) -> Result<(), AccessDecision> {
        match self {
            AccessDecision::Allow => Ok(()),
            denied => Err(denied),
        }
    }
}

impl std::fmt::Display for AccessDecision {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AccessDecision::Allow => write!(f, "allow"),
            AccessDecision::DenyUnauthenticated => write!(f, "deny_unauthenticated"),
            AccessDecision::DenyForbiddenRole => write!(f, "deny_forbidden_role"),
            AccessDecision::DenyNotOwner => write!(f, "deny_not_owner"),
        }
    }
}

/// An entity whose mutation is restricted to its owner
pub trait ProtectedResource {
    fn owner_id(&self) -> UserId;
}

pub fn require_authenticated(actor: &Actor) -> AccessDecision {
    if actor.is_authenticated() {
        AccessDecision::Allow
    } else {
        AccessDecision::DenyUnauthenticated
    }
}

/// Role check. The anonymous actor holds no role and is always denied.
pub fn require_role(actor: &Actor, role: Role) -> AccessDecision {
    if actor.role() == Some(role) {
        AccessDecision::Allow
    } else {
        AccessDecision::DenyForbiddenRole
    }
}

/// Ownership check, independent of the actor's role.
///
/// The resource must already exist; a failed lookup is the caller's
/// not-found case and never reaches this check.
pub fn check_ownership<R>(actor: &Actor, resource: &R) -> AccessDecision
where
    R: ProtectedResource + ?Sized,
{
    match actor.id() {
        Some(id) if id == resource.owner_id() => AccessDecision::Allow,
        _ => AccessDecision::DenyNotOwner,
    }
}

/// How far a request has progressed through the gate
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Stage {
    Anonymous,
    Authenticated,
    RoleChecked,
    OwnershipChecked,
    /// Past the gate; only [`Gate::finish`] moves here
    Executed,
}

/// Short-circuiting chain of access checks for one request
#[derive(Debug, Clone)]
pub struct Gate<'a> {
    actor: &'a Actor,
    stage: Stage,
    denied: Option<AccessDecision>,
}

impl<'a> Gate<'a> {
    pub fn new(actor: &'a Actor) -> Self {
        Self {
            actor,
            stage: Stage::Anonymous,
            denied: None,
        }
    }

    pub fn require_authenticated(self) -> Self {
        if self.denied.is_some() || self.stage >= Stage::Authenticated {
            return self;
        }
        let decision = require_authenticated(self.actor);
        self.apply(decision, Stage::Authenticated)
    }

    pub fn require_role(self, role: Role) -> Self {
        let gate = self.require_authenticated();
        if gate.denied.is_some() {
            return gate;
        }
        let decision = require_role(gate.actor, role);
        gate.apply(decision, Stage::RoleChecked)
    }

    pub fn check_ownership<R>(self, resource: &R) -> Self
    where
        R: ProtectedResource + ?Sized,
    {
        let gate = self.require_authenticated();
        if gate.denied.is_some() {
            return gate;
        }
        let decision = check_ownership(gate.actor, resource);
        gate.apply(decision, Stage::OwnershipChecked)
    }

    pub fn stage(&self) -> Stage {
        self.stage
    }

    pub fn decision(&self) -> AccessDecision {
        match self.denied {
            Some(denied) => denied,
            None if self.stage == Stage::Anonymous => require_authenticated(self.actor),
            None => AccessDecision::Allow,
        }
    }

    /// Close the gate. Every protected operation requires a session, so a
    /// gate with no explicit checks still authenticates the actor.
    pub fn finish(self) -> Result<Identity, AccessDecision> {
        let gate = self.require_authenticated();
        if let Some(denied) = gate.denied {
            debug!(decision = %denied, actor = ?gate.actor.id(), "access denied");
            return Err(denied);
        }
        let identity = gate
            .actor
            .identity()
            .ok_or(AccessDecision::DenyUnauthenticated)?;
        let gate = gate.apply(AccessDecision::Allow, Stage::Executed);
        debug!(stage = ?gate.stage, actor = identity.id, "access granted");
        Ok(identity)
    }

    fn apply(mut self, decision: AccessDecision, next: Stage) -> Self {
        if decision.is_allowed() {
            self.stage = self.stage.max(next);
        } else {
            self.denied = Some(decision);
        }
        self
    }
}
