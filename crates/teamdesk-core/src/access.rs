// SPDX-FileCopyrightText: 2026 Teamdesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Role-based access control.
//!
//! Roles form a closed, totally ordered set. Every permission check in the
//! workspace goes through [`has_permission`].

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

use crate::directory::User;
use crate::error::TeamdeskError;

/// Permission level of an authenticated user, lowest first.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Display,
    EnumString,
    Serialize,
    Deserialize,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum UserRole {
    Member,
    TeamLead,
    ProjectManager,
}

/// Returns true when `user` holds at least `required`.
pub fn has_permission(user: Option<&User>, required: UserRole) -> bool {
    user.is_some_and(|u| u.role >= required)
}

/// Route guard: `Ok` when permitted, `AccessDenied` otherwise.
pub fn require_role(user: Option<&User>, required: UserRole) -> Result<(), TeamdeskError> {
    if has_permission(user, required) {
        Ok(())
    } else {
        Err(TeamdeskError::AccessDenied { required })
    }
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use super::*;
    use crate::directory::AccountStatus;

    fn user(role: UserRole) -> User {
        User {
            id: "u-1".into(),
            email: "lead@example.com".into(),
            role,
            full_name: "Lee".into(),
            avatar_url: None,
            status: AccountStatus::Active,
        }
    }

    #[test]
    fn roles_are_ordered() {
        assert!(UserRole::ProjectManager > UserRole::TeamLead);
        assert!(UserRole::TeamLead > UserRole::Member);
    }

    #[test]
    fn higher_roles_inherit_lower_permissions() {
        let pm = user(UserRole::ProjectManager);
        let lead = user(UserRole::TeamLead);
        let member = user(UserRole::Member);

        assert!(has_permission(Some(&pm), UserRole::Member));
        assert!(has_permission(Some(&pm), UserRole::ProjectManager));
        assert!(has_permission(Some(&lead), UserRole::TeamLead));
        assert!(!has_permission(Some(&lead), UserRole::ProjectManager));
        assert!(!has_permission(Some(&member), UserRole::TeamLead));
    }

    #[test]
    fn anonymous_user_is_never_permitted() {
        assert!(!has_permission(None, UserRole::Member));
        let err = require_role(None, UserRole::Member).unwrap_err();
        assert!(matches!(
            err,
            TeamdeskError::AccessDenied {
                required: UserRole::Member
            }
        ));
    }

    #[test]
    fn roles_use_store_spelling() {
        assert_eq!(UserRole::ProjectManager.to_string(), "project_manager");
        assert_eq!(UserRole::from_str("team_lead").unwrap(), UserRole::TeamLead);
        let json = serde_json::to_string(&UserRole::Member).unwrap();
        assert_eq!(json, "\"member\"");
    }
}
