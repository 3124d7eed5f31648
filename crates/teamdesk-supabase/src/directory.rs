// SPDX-FileCopyrightText: 2026 Teamdesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! [`DirectoryStore`] over the `team_members`, `documents`, and `users` tables.

use std::str::FromStr;

use async_trait::async_trait;
use serde_json::json;
use tracing::{debug, info, warn};

use teamdesk_core::directory::{
    Document, DocumentUpdate, MemberStatus, TeamMember, User, UserProfileUpdate,
};
use teamdesk_core::{DirectoryStore, TeamdeskError};

use crate::SupabaseStore;
use crate::client::eq;

impl SupabaseStore {
    /// Status update from untyped input. An unknown status is logged and
    /// skipped without a request.
    pub async fn update_team_member_status_raw(
        &self,
        role: &str,
        status: &str,
    ) -> Result<(), TeamdeskError> {
        match MemberStatus::from_str(status) {
            Ok(status) => self.update_team_member_status(role, status).await,
            Err(_) => {
                warn!(role, status, "ignoring team member status update with invalid value");
                Ok(())
            }
        }
    }
}

#[async_trait]
impl DirectoryStore for SupabaseStore {
    async fn team_members(&self) -> Result<Vec<TeamMember>, TeamdeskError> {
        self.rest()
            .select("team_members", &vec![], "fetch team members")
            .await
    }

    async fn update_team_member_status(
        &self,
        role: &str,
        status: MemberStatus,
    ) -> Result<(), TeamdeskError> {
        self.rest()
            .update_minimal(
                "team_members",
                &vec![eq("role", role)],
                &json!({ "status": status }),
                "update team member status",
            )
            .await?;
        info!(role, %status, "team member status updated");
        Ok(())
    }

    async fn documents(&self) -> Result<Vec<Document>, TeamdeskError> {
        self.rest()
            .select(
                "documents",
                &vec![("order", "last_modified.desc".to_string())],
                "fetch documents",
            )
            .await
    }

    async fn update_document(
        &self,
        id: &str,
        update: &DocumentUpdate,
    ) -> Result<(), TeamdeskError> {
        if update.is_empty() {
            debug!(id, "empty document update skipped");
            return Ok(());
        }
        self.rest()
            .update_minimal("documents", &vec![eq("id", id)], update, "update document")
            .await
    }

    async fn user(&self, id: &str) -> Result<Option<User>, TeamdeskError> {
        let rows: Vec<User> = self
            .rest()
            .select("users", &vec![eq("id", id)], "fetch user")
            .await?;
        Ok(rows.into_iter().next())
    }

    async fn update_user_profile(
        &self,
        user_id: &str,
        update: &UserProfileUpdate,
    ) -> Result<User, TeamdeskError> {
        let rows: Vec<User> = self
            .rest()
            .update(
                "users",
                &vec![eq("id", user_id)],
                update,
                "update user profile",
            )
            .await?;
        rows.into_iter()
            .next()
            .ok_or_else(|| TeamdeskError::store("update user profile", "no such user"))
    }
}
