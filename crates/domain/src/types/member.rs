//! Member profile types
//!
//! One profile row per identity, stored in the hosted backend and joined by
//! `user_id`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Lodge role attached to a member profile.
///
/// Roles form an explicit partial order (`Admin` above `Member`) so the
/// route guard consults rank rather than comparing names. A future office
/// slots in by extending `rank` only.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Member,
    Admin,
}

impl Role {
    fn rank(self) -> u8 {
        match self {
            Self::Member => 0,
            Self::Admin => 1,
        }
    }

    /// Whether this role grants everything `required` grants.
    #[must_use]
    pub fn covers(self, required: Self) -> bool {
        self.rank() >= required.rank()
    }
}

impl Default for Role {
    fn default() -> Self {
        Self::Member
    }
}

/// Approval status of a member profile.
///
/// A row with no status (older signups predate the column) reads as
/// `Pending`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum MemberStatus {
    Pending,
    Active,
    Inactive,
}

impl Default for MemberStatus {
    fn default() -> Self {
        Self::Pending
    }
}

impl MemberStatus {
    /// Deserialize helper tolerating an explicit `null` column value.
    pub(crate) fn from_nullable<'de, D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        Ok(Option::<Self>::deserialize(deserializer)?.unwrap_or_default())
    }
}

/// Member profile stored in the hosted backend
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MemberProfile {
    pub id: Uuid,
    /// Identity-provider user id; unique per profile
    pub user_id: Uuid,
    pub full_name: String,
    /// Lodge office, free text (e.g. "Worshipful Master")
    pub position: Option<String>,
    #[serde(default)]
    pub role: Role,
    #[serde(default, deserialize_with = "MemberStatus::from_nullable")]
    pub status: MemberStatus,
    pub contact_email: Option<String>,
    pub contact_phone: Option<String>,
    /// Gates visibility of the contact fields in the member directory
    #[serde(default)]
    pub share_contact_info: bool,
    /// Forces a redirect to the password-reset flow while true
    #[serde(default)]
    pub needs_password_reset: bool,
    pub join_date: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl MemberProfile {
    /// Derived admin check: `role == Admin` AND `status == Active`.
    ///
    /// Never stored; recomputed on every read so role/status edits cannot
    /// drift from it.
    #[must_use]
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin && self.status == MemberStatus::Active
    }

    /// Whether member-only areas are open to this profile.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.status == MemberStatus::Active
    }

    /// Copy for directory display, with contact fields blanked unless the
    /// member opted into sharing them.
    #[must_use]
    pub fn directory_view(&self) -> Self {
        let mut entry = self.clone();
        if !entry.share_contact_info {
            entry.contact_email = None;
            entry.contact_phone = None;
        }
        entry
    }
}

/// Payload for creating a member profile.
///
/// Self-signup leaves `role`/`status` at their defaults (`Member`,
/// `Pending`); admin creation sets both explicitly.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewProfile {
    pub user_id: Uuid,
    pub full_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub position: Option<String>,
    #[serde(default)]
    pub role: Role,
    #[serde(default)]
    pub status: MemberStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub contact_email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub contact_phone: Option<String>,
    #[serde(default)]
    pub share_contact_info: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub join_date: Option<DateTime<Utc>>,
}

impl NewProfile {
    /// Self-signup payload with membership defaults.
    #[must_use]
    pub fn signup(user_id: Uuid, full_name: impl Into<String>) -> Self {
        Self {
            user_id,
            full_name: full_name.into(),
            position: None,
            role: Role::Member,
            status: MemberStatus::Pending,
            contact_email: None,
            contact_phone: None,
            share_contact_info: false,
            join_date: None,
        }
    }
}

/// Partial update for a member profile; only set fields are written.
///
/// Serializes with absent fields omitted, which maps directly onto the
/// store's PATCH semantics.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProfilePatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub full_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub position: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<Role>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<MemberStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub contact_email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub contact_phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub share_contact_info: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub needs_password_reset: Option<bool>,
}

impl ProfilePatch {
    /// True when the patch writes nothing.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.full_name.is_none()
            && self.position.is_none()
            && self.role.is_none()
            && self.status.is_none()
            && self.contact_email.is_none()
            && self.contact_phone.is_none()
            && self.share_contact_info.is_none()
            && self.needs_password_reset.is_none()
    }

    /// Patch clearing the forced password-reset flag after a successful
    /// reset.
    #[must_use]
    pub fn password_reset_done() -> Self {
        Self { needs_password_reset: Some(false), ..Self::default() }
    }
}
