// SPDX-FileCopyrightText: 2026 Teamdesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! [`ProjectStore`] over the `projects` and `project_members` tables.

use async_trait::async_trait;
use chrono::Utc;
use serde_json::{Map, Value, json};
use tracing::info;

use teamdesk_core::directory::{CreateProjectInput, Project, UpdateProjectInput};
use teamdesk_core::{ProjectStore, TeamdeskError};

use crate::SupabaseStore;
use crate::client::eq;

fn single(rows: Vec<Project>, operation: &str) -> Result<Project, TeamdeskError> {
    rows.into_iter()
        .next()
        .ok_or_else(|| TeamdeskError::store(operation, "no matching project"))
}

fn to_object<T: serde::Serialize>(value: &T) -> Result<Map<String, Value>, TeamdeskError> {
    match serde_json::to_value(value) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(_) => Err(TeamdeskError::Internal("project input is not an object".into())),
        Err(e) => Err(TeamdeskError::Internal(format!("failed to encode project input: {e}"))),
    }
}

#[async_trait]
impl ProjectStore for SupabaseStore {
    async fn projects(&self) -> Result<Vec<Project>, TeamdeskError> {
        self.rest()
            .select(
                "projects",
                &vec![("order", "created_at.desc".to_string())],
                "fetch projects",
            )
            .await
    }

    async fn project(&self, id: &str) -> Result<Project, TeamdeskError> {
        let rows = self
            .rest()
            .select("projects", &vec![eq("id", id)], "fetch project")
            .await?;
        single(rows, "fetch project")
    }

    async fn create_project(
        &self,
        input: &CreateProjectInput,
        created_by: Option<&str>,
    ) -> Result<Project, TeamdeskError> {
        let now = Utc::now().to_rfc3339();
        let mut row = to_object(input)?;
        row.insert("created_by".into(), json!(created_by));
        row.insert("progress".into(), json!(0));
        row.insert("created_at".into(), json!(now));
        row.insert("updated_at".into(), json!(now));

        let rows = self
            .rest()
            .insert("projects", &[Value::Object(row)], "create project")
            .await?;
        let project = single(rows, "create project")?;
        info!(id = %project.id, name = %project.name, "project created");
        Ok(project)
    }

    async fn update_project(&self, input: &UpdateProjectInput) -> Result<Project, TeamdeskError> {
        let mut patch = to_object(input)?;
        patch.remove("id");
        patch.insert("updated_at".into(), json!(Utc::now().to_rfc3339()));

        let rows = self
            .rest()
            .update(
                "projects",
                &vec![eq("id", &input.id)],
                &Value::Object(patch),
                "update project",
            )
            .await?;
        single(rows, "update project")
    }

    async fn update_project_progress(
        &self,
        id: &str,
        progress: u8,
    ) -> Result<Project, TeamdeskError> {
        if progress > 100 {
            return Err(TeamdeskError::Validation(format!(
                "progress must be between 0 and 100, got {progress}"
            )));
        }
        let rows = self
            .rest()
            .update(
                "projects",
                &vec![eq("id", id)],
                &json!({ "progress": progress, "updated_at": Utc::now().to_rfc3339() }),
                "update project progress",
            )
            .await?;
        single(rows, "update project progress")
    }

    async fn delete_project(&self, id: &str) -> Result<(), TeamdeskError> {
        self.rest()
            .delete("projects", &vec![eq("id", id)], "delete project")
            .await?;
        info!(id, "project deleted");
        Ok(())
    }

    async fn add_project_member(&self, project_id: &str, user_id: &str) -> Result<(), TeamdeskError> {
        let row = json!([{
            "project_id": project_id,
            "user_id": user_id,
            "joined_at": Utc::now().to_rfc3339(),
        }]);
        let _: Vec<Value> = self
            .rest()
            .insert("project_members", &row, "add project member")
            .await?;
        Ok(())
    }

    async fn remove_project_member(
        &self,
        project_id: &str,
        user_id: &str,
    ) -> Result<(), TeamdeskError> {
        self.rest()
            .delete(
                "project_members",
                &vec![eq("project_id", project_id), eq("user_id", user_id)],
                "remove project member",
            )
            .await
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::SupabaseSettings;
    use teamdesk_core::directory::{Priority, ProjectStatus};
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, Request, ResponseTemplate};

    fn store(server: &MockServer) -> SupabaseStore {
        SupabaseStore::new(&SupabaseSettings {
            url: server.uri(),
            anon_key: "anon".into(),
            ai_function: "generate-ai-response".into(),
            timeout: Duration::from_secs(5),
            heartbeat: Duration::from_secs(25),
        })
        .unwrap()
    }

    fn project_row(progress: u8) -> Value {
        json!({
            "id": "p-1",
            "name": "Realtime collaboration",
            "description": "Shared cursors",
            "status": "in_progress",
            "due_date": "2024-04-01",
            "created_at": "2024-03-01T00:00:00+00:00",
            "updated_at": "2024-03-02T00:00:00+00:00",
            "created_by": "u-1",
            "progress": progress,
            "priority": "high"
        })
    }

    #[tokio::test]
    async fn create_sets_progress_and_owner() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/rest/v1/projects"))
            .respond_with(|req: &Request| {
                let body: Value = serde_json::from_slice(&req.body).unwrap();
                let row = &body[0];
                assert_eq!(row["progress"], 0);
                assert_eq!(row["created_by"], "u-1");
                assert_eq!(row["status"], "in_progress");
                assert!(row["created_at"].is_string());
                assert!(row.get("budget").is_none());
                ResponseTemplate::new(201).set_body_json(json!([project_row(0)]))
            })
            .expect(1)
            .mount(&server)
            .await;

        let input = CreateProjectInput {
            name: "Realtime collaboration".into(),
            description: "Shared cursors".into(),
            status: ProjectStatus::InProgress,
            due_date: "2024-04-01".into(),
            team_id: None,
            priority: Priority::High,
            budget: None,
            start_date: None,
            end_date: None,
            tags: None,
        };
        let project = store(&server)
            .create_project(&input, Some("u-1"))
            .await
            .unwrap();
        assert_eq!(project.progress, 0);
    }

    #[tokio::test]
    async fn progress_above_hundred_is_rejected_locally() {
        let server = MockServer::start().await;
        Mock::given(method("PATCH"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let err = store(&server)
            .update_project_progress("p-1", 101)
            .await
            .unwrap_err();
        assert!(matches!(err, TeamdeskError::Validation(_)));
    }

    #[tokio::test]
    async fn update_omits_id_from_patch() {
        let server = MockServer::start().await;
        Mock::given(method("PATCH"))
            .and(path("/rest/v1/projects"))
            .and(query_param("id", "eq.p-1"))
            .respond_with(|req: &Request| {
                let body: Value = serde_json::from_slice(&req.body).unwrap();
                assert!(body.get("id").is_none());
                assert_eq!(body["name"], "Renamed");
                ResponseTemplate::new(200).set_body_json(json!([project_row(40)]))
            })
            .mount(&server)
            .await;

        let input = UpdateProjectInput {
            id: "p-1".into(),
            name: Some("Renamed".into()),
            ..Default::default()
        };
        let project = store(&server).update_project(&input).await.unwrap();
        assert_eq!(project.progress, 40);
    }

    #[tokio::test]
    async fn missing_project_is_a_store_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/rest/v1/projects"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
            .mount(&server)
            .await;

        let err = store(&server).project("nope").await.unwrap_err();
        assert_eq!(err.to_string(), "Failed to fetch project: no matching project");
    }

    #[tokio::test]
    async fn member_removal_filters_both_columns() {
        let server = MockServer::start().await;
        Mock::given(method("DELETE"))
            .and(path("/rest/v1/project_members"))
            .and(query_param("project_id", "eq.p-1"))
            .and(query_param("user_id", "eq.u-2"))
            .respond_with(ResponseTemplate::new(204))
            .expect(1)
            .mount(&server)
            .await;

        store(&server)
            .remove_project_member("p-1", "u-2")
            .await
            .unwrap();
    }
}
