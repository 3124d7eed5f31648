// SPDX-FileCopyrightText: 2026 Teamdesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Directory entities: team members, documents, projects, and users.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

use crate::access::UserRole;

/// Availability of an AI team member.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum MemberStatus {
    Active,
    Busy,
    Idle,
}

/// An AI "team member" agent a user can chat with.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TeamMember {
    pub id: String,
    #[serde(default)]
    pub name: String,
    pub role: String,
    #[serde(default)]
    pub icon: String,
    pub status: MemberStatus,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub responsibilities: Vec<String>,
    #[serde(default)]
    pub chat_enabled: bool,
}

/// Review state of a shared document.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum DocumentStatus {
    Draft,
    Review,
    Approved,
}

/// A project document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub content: String,
    pub last_modified: DateTime<Utc>,
    #[serde(default)]
    pub status: Option<DocumentStatus>,
    #[serde(default)]
    pub url: Option<String>,
}

/// Partial document update; unset fields are left untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DocumentUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<DocumentStatus>,
}

impl DocumentUpdate {
    pub fn is_empty(&self) -> bool {
        self.title.is_none() && self.content.is_none() && self.status.is_none()
    }
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum ProjectStatus {
    Planning,
    InProgress,
    Completed,
    OnHold,
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Low,
    Medium,
    High,
}

/// A project tracked on the dashboard.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Project {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub status: ProjectStatus,
    pub due_date: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default)]
    pub created_by: Option<String>,
    #[serde(default)]
    pub team_id: Option<String>,
    #[serde(default)]
    pub progress: u8,
    pub priority: Priority,
    #[serde(default)]
    pub budget: Option<f64>,
    #[serde(default)]
    pub start_date: Option<String>,
    #[serde(default)]
    pub end_date: Option<String>,
    #[serde(default)]
    pub tags: Option<Vec<String>>,
}

/// Fields supplied when creating a project.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateProjectInput {
    pub name: String,
    pub description: String,
    pub status: ProjectStatus,
    pub due_date: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub team_id: Option<String>,
    pub priority: Priority,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub budget: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
}

/// Partial project update keyed by `id`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UpdateProjectInput {
    pub id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<ProjectStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub due_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub priority: Option<Priority>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub budget: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
}

/// Membership row linking a user to a project.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectMember {
    pub project_id: String,
    pub user_id: String,
    pub joined_at: DateTime<Utc>,
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum AccountStatus {
    Active,
    Inactive,
    Suspended,
}

/// A human user of the dashboard.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub email: String,
    pub role: UserRole,
    #[serde(default)]
    pub full_name: String,
    #[serde(default)]
    pub avatar_url: Option<String>,
    pub status: AccountStatus,
}

/// Partial profile update for a user row.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct UserProfileUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub full_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avatar_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<UserRole>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<AccountStatus>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn team_member_row_defaults_optional_columns() {
        let row = serde_json::json!({
            "id": "m-1",
            "role": "QA Tester",
            "status": "idle"
        });
        let member: TeamMember = serde_json::from_value(row).unwrap();
        assert_eq!(member.status, MemberStatus::Idle);
        assert!(member.responsibilities.is_empty());
        assert!(!member.chat_enabled);
    }

    #[test]
    fn partial_updates_skip_unset_fields() {
        let update = DocumentUpdate {
            status: Some(DocumentStatus::Approved),
            ..Default::default()
        };
        let json = serde_json::to_value(&update).unwrap();
        assert_eq!(json, serde_json::json!({"status": "approved"}));
        assert!(DocumentUpdate::default().is_empty());
    }

    #[test]
    fn project_status_uses_snake_case() {
        assert_eq!(ProjectStatus::InProgress.to_string(), "in_progress");
        assert_eq!(
            serde_json::to_string(&ProjectStatus::OnHold).unwrap(),
            "\"on_hold\""
        );
    }
}
