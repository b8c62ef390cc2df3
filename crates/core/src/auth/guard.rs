//! Route gating decisions
//!
//! A pure, synchronous decision function over an auth snapshot and a
//! route's declared requirement. Evaluation order is load-bearing: loading
//! is checked before identity so a resolving session never flashes a login
//! redirect, and identity before profile status because a missing identity
//! is a different failure mode than an unapproved profile.
//!
//! Redirects are silent: denial of access is communicated by where the
//! member lands, never by an error dialog.

use trestle_domain::{MemberStatus, Role};

use super::service::AuthSnapshot;

/// Outcome of a route-guard evaluation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// Session still resolving; render a loading indicator
    RenderLoading,
    /// No identity; send to login, carrying the requested path for the
    /// post-login return
    RedirectLogin { return_to: String },
    /// Authenticated but forced through the password-reset flow first
    RedirectPasswordReset,
    /// No profile yet, or profile not approved
    RedirectPending,
    /// Role does not satisfy the route's requirement
    RedirectMembers,
    /// Access granted
    Render,
}

/// Decide whether a route renders for the given auth snapshot.
///
/// `required` is the route's declared role requirement; `None` means any
/// active member may enter. The role check consults the role partial order,
/// so an admin satisfies a member-level requirement.
#[must_use]
pub fn decide(auth: &AuthSnapshot, required: Option<Role>, requested_path: &str) -> Outcome {
    if auth.loading {
        return Outcome::RenderLoading;
    }

    if auth.session.is_none() {
        return Outcome::RedirectLogin { return_to: requested_path.to_string() };
    }

    // Forced reset outranks everything else once authenticated
    if auth.needs_password_reset() {
        return Outcome::RedirectPasswordReset;
    }

    let Some(profile) = auth.profile.as_ref() else {
        return Outcome::RedirectPending;
    };
    if profile.status != MemberStatus::Active {
        return Outcome::RedirectPending;
    }

    if let Some(required) = required {
        if !profile.role.covers(required) {
            return Outcome::RedirectMembers;
        }
    }

    Outcome::Render
}

/// Stricter variant for admin-only pages.
///
/// Requires `role == Admin` and `status == Active` exactly; there is no
/// superset relationship to traverse above the top role.
#[must_use]
pub fn decide_admin(auth: &AuthSnapshot, requested_path: &str) -> Outcome {
    if auth.loading {
        return Outcome::RenderLoading;
    }

    if auth.session.is_none() {
        return Outcome::RedirectLogin { return_to: requested_path.to_string() };
    }

    if auth.needs_password_reset() {
        return Outcome::RedirectPasswordReset;
    }

    let Some(profile) = auth.profile.as_ref() else {
        return Outcome::RedirectPending;
    };
    if profile.status != MemberStatus::Active {
        return Outcome::RedirectPending;
    }

    if profile.role != Role::Admin {
        return Outcome::RedirectMembers;
    }

    Outcome::Render
}
