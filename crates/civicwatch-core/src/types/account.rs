//! Account role and profile types.

use serde::{Deserialize, Serialize};

/// Account role within CivicWatch.
///
/// Roles are persisted as an integer flag: `0` for citizens, `1` for
/// officers. Unknown flags do not map to a role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AccountRole {
    /// A citizen reporting incidents.
    Citizen,
    /// An officer handling incidents.
    Officer,
}

impl AccountRole {
    /// Resolve a role from its persisted integer flag.
    ///
    /// Returns `None` for flags outside the known set.
    pub fn from_flag(flag: i32) -> Option<Self> {
        match flag {
            0 => Some(Self::Citizen),
            1 => Some(Self::Officer),
            _ => None,
        }
    }
}

/// The slice of an account that security decisions read.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccountProfile {
    /// Numeric account identifier.
    pub user_id: i64,
    /// Contact address for verification codes. May be empty for accounts
    /// registered without one.
    pub email: String,
    /// Persisted role flag. See [`AccountRole::from_flag`].
    pub role_flag: i32,
}

impl AccountProfile {
    /// Create a profile.
    pub fn new(user_id: i64, email: impl Into<String>, role_flag: i32) -> Self {
        Self {
            user_id,
            email: email.into(),
            role_flag,
        }
    }

    /// Resolve the role flag, if it maps to a known role.
    pub fn role(&self) -> Option<AccountRole> {
        AccountRole::from_flag(self.role_flag)
    }

    /// Whether the account has a usable (non-blank) contact address.
    pub fn has_email(&self) -> bool {
        !self.email.trim().is_empty()
    }
}
