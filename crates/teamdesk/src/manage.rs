// SPDX-FileCopyrightText: 2026 Teamdesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Write commands: projects, member status, documents, and profiles.
//!
//! Every write resolves the acting user from `app.user_id` and checks its
//! role with [`require_role`] before the first request is sent.

use clap::Subcommand;
use colored::Colorize;
use tracing::{info, warn};

use teamdesk_config::TeamdeskConfig;
use teamdesk_core::directory::{
    AccountStatus, CreateProjectInput, DocumentStatus, DocumentUpdate, Priority, Project,
    ProjectStatus, UpdateProjectInput, User, UserProfileUpdate,
};
use teamdesk_core::{DirectoryStore, ProjectStore, TeamdeskError, UserRole, require_role};
use teamdesk_supabase::SupabaseStore;

use crate::adapters;
use crate::listings::progress_bar;

#[derive(Subcommand, Debug)]
pub enum ProjectAction {
    /// Show one project.
    Show { id: String },
    /// Create a project.
    Create {
        name: String,
        /// Due date, e.g. 2024-06-30.
        #[arg(long)]
        due: String,
        #[arg(long, default_value = "")]
        description: String,
        #[arg(long, default_value = "planning")]
        status: ProjectStatus,
        #[arg(long, default_value = "medium")]
        priority: Priority,
        #[arg(long)]
        team: Option<String>,
        /// Comma-separated tags.
        #[arg(long, value_delimiter = ',')]
        tags: Vec<String>,
    },
    /// Change project fields.
    Update {
        id: String,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        description: Option<String>,
        #[arg(long)]
        status: Option<ProjectStatus>,
        #[arg(long)]
        due: Option<String>,
        #[arg(long)]
        priority: Option<Priority>,
    },
    /// Set progress (0-100).
    Progress { id: String, progress: u8 },
    /// Delete a project.
    Delete { id: String },
    /// Add a user to a project.
    AddMember { project_id: String, user_id: String },
    /// Remove a user from a project.
    RemoveMember { project_id: String, user_id: String },
}

impl ProjectAction {
    /// Lowest role allowed to run the action.
    pub fn required_role(&self) -> UserRole {
        match self {
            ProjectAction::Show { .. } => UserRole::Member,
            ProjectAction::Update { .. }
            | ProjectAction::Progress { .. }
            | ProjectAction::AddMember { .. }
            | ProjectAction::RemoveMember { .. } => UserRole::TeamLead,
            ProjectAction::Create { .. } | ProjectAction::Delete { .. } => {
                UserRole::ProjectManager
            }
        }
    }
}

/// Profile fields to change. Without `--user` the acting user is edited.
#[derive(clap::Args, Debug, Default)]
pub struct ProfileArgs {
    /// Edit another user (project managers only).
    #[arg(long)]
    pub user: Option<String>,
    #[arg(long)]
    pub full_name: Option<String>,
    #[arg(long)]
    pub avatar_url: Option<String>,
    #[arg(long)]
    pub role: Option<UserRole>,
    #[arg(long)]
    pub status: Option<AccountStatus>,
}

impl ProfileArgs {
    /// Members may edit their own name and avatar; anything else needs a
    /// project manager.
    fn required_role(&self, acting: Option<&User>) -> UserRole {
        let other = match (&self.user, acting) {
            (Some(target), Some(me)) => *target != me.id,
            (Some(_), None) => true,
            (None, _) => false,
        };
        if other || self.role.is_some() || self.status.is_some() {
            UserRole::ProjectManager
        } else {
            UserRole::Member
        }
    }
}

/// The `users` row named by `app.user_id`. `None` when unset or unknown.
pub async fn acting_user<S>(config: &TeamdeskConfig, store: &S) -> Result<Option<User>, TeamdeskError>
where
    S: DirectoryStore + ?Sized,
{
    let Some(id) = config.app.user_id.as_deref() else {
        warn!("app.user_id is not set; acting anonymously");
        return Ok(None);
    };
    let user = store.user(id).await?;
    if user.is_none() {
        warn!(user_id = id, "acting user not found");
    }
    Ok(user)
}

fn describe(project: &Project) -> String {
    format!(
        "{} {}  {}  {}  due {}",
        project.id.dimmed(),
        project.name.bold(),
        project.status,
        progress_bar(project.progress),
        project.due_date
    )
}

/// Runs `action` on behalf of `user` and returns the line to print.
pub async fn project_command<S>(
    store: &S,
    user: Option<&User>,
    action: ProjectAction,
) -> Result<String, TeamdeskError>
where
    S: ProjectStore + ?Sized,
{
    require_role(user, action.required_role())?;

    match action {
        ProjectAction::Show { id } => Ok(describe(&store.project(&id).await?)),
        ProjectAction::Create {
            name,
            due,
            description,
            status,
            priority,
            team,
            tags,
        } => {
            let input = CreateProjectInput {
                name,
                description,
                status,
                due_date: due,
                team_id: team,
                priority,
                budget: None,
                start_date: None,
                end_date: None,
                tags: (!tags.is_empty()).then_some(tags),
            };
            let created = store.create_project(&input, user.map(|u| u.id.as_str())).await?;
            Ok(format!("created {}", describe(&created)))
        }
        ProjectAction::Update {
            id,
            name,
            description,
            status,
            due,
            priority,
        } => {
            let input = UpdateProjectInput {
                id,
                name,
                description,
                status,
                due_date: due,
                priority,
                ..Default::default()
            };
            Ok(format!("updated {}", describe(&store.update_project(&input).await?)))
        }
        ProjectAction::Progress { id, progress } => {
            let project = store.update_project_progress(&id, progress).await?;
            Ok(describe(&project))
        }
        ProjectAction::Delete { id } => {
            store.delete_project(&id).await?;
            Ok(format!("deleted project {id}"))
        }
        ProjectAction::AddMember {
            project_id,
            user_id,
        } => {
            store.add_project_member(&project_id, &user_id).await?;
            Ok(format!("added {user_id} to {project_id}"))
        }
        ProjectAction::RemoveMember {
            project_id,
            user_id,
        } => {
            store.remove_project_member(&project_id, &user_id).await?;
            Ok(format!("removed {user_id} from {project_id}"))
        }
    }
}

/// Sets the status of every AI team member holding `role`. Team leads and up.
pub async fn member_status_command(
    store: &SupabaseStore,
    user: Option<&User>,
    role: &str,
    status: &str,
) -> Result<String, TeamdeskError> {
    require_role(user, UserRole::TeamLead)?;
    store.update_team_member_status_raw(role, status).await?;
    Ok(format!("{role}: {status}"))
}

/// Edits a document's title or status. Any signed-in member.
pub async fn document_command<S>(
    store: &S,
    user: Option<&User>,
    id: &str,
    update: DocumentUpdate,
) -> Result<String, TeamdeskError>
where
    S: DirectoryStore + ?Sized,
{
    require_role(user, UserRole::Member)?;
    if update.is_empty() {
        return Ok("nothing to change".to_string());
    }
    store.update_document(id, &update).await?;
    Ok(format!("updated document {id}"))
}

pub async fn profile_command<S>(
    store: &S,
    user: Option<&User>,
    args: ProfileArgs,
) -> Result<String, TeamdeskError>
where
    S: DirectoryStore + ?Sized,
{
    require_role(user, args.required_role(user))?;
    let target = match (args.user, user) {
        (Some(target), _) => target,
        (None, Some(me)) => me.id.clone(),
        (None, None) => {
            return Err(TeamdeskError::AccessDenied {
                required: UserRole::Member,
            });
        }
    };
    let update = UserProfileUpdate {
        full_name: args.full_name,
        avatar_url: args.avatar_url,
        role: args.role,
        status: args.status,
    };
    let saved = store.update_user_profile(&target, &update).await?;
    info!(user_id = %saved.id, role = %saved.role, "profile updated");
    Ok(format!(
        "{} <{}> {} {}",
        saved.full_name.bold(),
        saved.email,
        saved.role,
        saved.status
    ))
}

pub async fn run_project(config: &TeamdeskConfig, action: ProjectAction) -> Result<(), TeamdeskError> {
    let store = adapters::store(config)?;
    let user = acting_user(config, store.as_ref()).await?;
    println!("{}", project_command(store.as_ref(), user.as_ref(), action).await?);
    Ok(())
}

pub async fn run_member_status(
    config: &TeamdeskConfig,
    role: &str,
    status: &str,
) -> Result<(), TeamdeskError> {
    let store = adapters::store(config)?;
    let user = acting_user(config, store.as_ref()).await?;
    println!(
        "{}",
        member_status_command(&store, user.as_ref(), role, status).await?
    );
    Ok(())
}

pub async fn run_document(
    config: &TeamdeskConfig,
    id: &str,
    title: Option<String>,
    status: Option<DocumentStatus>,
) -> Result<(), TeamdeskError> {
    let store = adapters::store(config)?;
    let user = acting_user(config, store.as_ref()).await?;
    let update = DocumentUpdate {
        title,
        content: None,
        status,
    };
    println!(
        "{}",
        document_command(store.as_ref(), user.as_ref(), id, update).await?
    );
    Ok(())
}

pub async fn run_profile(config: &TeamdeskConfig, args: ProfileArgs) -> Result<(), TeamdeskError> {
    let store = adapters::store(config)?;
    let user = acting_user(config, store.as_ref()).await?;
    println!("{}", profile_command(store.as_ref(), user.as_ref(), args).await?);
    Ok(())
}
