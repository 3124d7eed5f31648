// SPDX-FileCopyrightText: 2026 Teamdesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Directory and project data services.

use async_trait::async_trait;

use crate::directory::{
    CreateProjectInput, Document, DocumentUpdate, MemberStatus, Project, TeamMember,
    UpdateProjectInput, User, UserProfileUpdate,
};
use crate::error::TeamdeskError;
use crate::traits::adapter::PluginAdapter;

/// Team members, documents, and user profiles.
#[async_trait]
pub trait DirectoryStore: PluginAdapter {
    async fn team_members(&self) -> Result<Vec<TeamMember>, TeamdeskError>;

    /// Sets the status of every member holding `role`.
    async fn update_team_member_status(
        &self,
        role: &str,
        status: MemberStatus,
    ) -> Result<(), TeamdeskError>;

    /// Documents, most recently modified first.
    async fn documents(&self) -> Result<Vec<Document>, TeamdeskError>;

    async fn update_document(&self, id: &str, update: &DocumentUpdate)
    -> Result<(), TeamdeskError>;

    /// The `users` row with `id`, or `None` when there is none.
    async fn user(&self, id: &str) -> Result<Option<User>, TeamdeskError>;

    async fn update_user_profile(
        &self,
        user_id: &str,
        update: &UserProfileUpdate,
    ) -> Result<User, TeamdeskError>;
}

/// Project CRUD and membership.
#[async_trait]
pub trait ProjectStore: PluginAdapter {
    /// Projects, newest first.
    async fn projects(&self) -> Result<Vec<Project>, TeamdeskError>;

    async fn project(&self, id: &str) -> Result<Project, TeamdeskError>;

    async fn create_project(
        &self,
        input: &CreateProjectInput,
        created_by: Option<&str>,
    ) -> Result<Project, TeamdeskError>;

    async fn update_project(&self, input: &UpdateProjectInput) -> Result<Project, TeamdeskError>;

    /// Sets progress (0–100).
    async fn update_project_progress(&self, id: &str, progress: u8)
    -> Result<Project, TeamdeskError>;

    async fn delete_project(&self, id: &str) -> Result<(), TeamdeskError>;

    async fn add_project_member(&self, project_id: &str, user_id: &str)
    -> Result<(), TeamdeskError>;

    async fn remove_project_member(
        &self,
        project_id: &str,
        user_id: &str,
    ) -> Result<(), TeamdeskError>;
}
