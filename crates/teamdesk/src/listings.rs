// SPDX-FileCopyrightText: 2026 Teamdesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Read-only listings: team, documents, projects, and the sprint overview.

use chrono::Utc;
use colored::{ColoredString, Colorize};
use tracing::warn;

use teamdesk_config::TeamdeskConfig;
use teamdesk_core::directory::{DocumentStatus, MemberStatus, ProjectStatus, TeamMember};
use teamdesk_core::roster::{current_sprint, default_team};
use teamdesk_core::{DirectoryStore, ProjectStore, TeamdeskError};

use crate::adapters;

fn member_status(status: MemberStatus) -> ColoredString {
    let label = status.to_string();
    match status {
        MemberStatus::Active => label.green(),
        MemberStatus::Busy => label.yellow(),
        MemberStatus::Idle => label.dimmed(),
    }
}

fn project_status(status: ProjectStatus) -> ColoredString {
    let label = status.to_string().replace('_', " ");
    match status {
        ProjectStatus::Completed => label.green(),
        ProjectStatus::InProgress => label.blue(),
        ProjectStatus::OnHold => label.red(),
        ProjectStatus::Planning => label.yellow(),
    }
}

/// Ten-cell text bar for a 0-100 percentage.
pub fn progress_bar(progress: u8) -> String {
    let progress = progress.min(100);
    let filled = usize::from(progress).div_ceil(10);
    format!("[{}{}] {progress:>3}%", "#".repeat(filled), ".".repeat(10 - filled))
}

/// Team from the store, or the built-in roster when it is empty or unreachable.
pub(crate) async fn team(config: &TeamdeskConfig) -> Vec<TeamMember> {
    let fetched = match adapters::store(config) {
        Ok(store) => store.team_members().await,
        Err(e) => Err(e),
    };
    match fetched {
        Ok(members) if !members.is_empty() => members,
        Ok(_) => default_team(),
        Err(e) => {
            warn!(error = %e, "team directory unavailable, using built-in roster");
            default_team()
        }
    }
}

pub async fn run_members(config: &TeamdeskConfig) -> Result<(), TeamdeskError> {
    for member in team(config).await {
        let chat = if member.chat_enabled { "chat" } else { "" };
        println!(
            "{:<16} {:<32} {:<8} {}",
            member.id.bold(),
            member.role,
            member_status(member.status),
            chat.dimmed()
        );
        for duty in &member.responsibilities {
            println!("{:<16} - {duty}", "");
        }
    }
    Ok(())
}

pub async fn run_documents(config: &TeamdeskConfig) -> Result<(), TeamdeskError> {
    let store = adapters::store(config)?;
    let documents = store.documents().await?;
    if documents.is_empty() {
        println!("{}", "no documents".dimmed());
    }
    for doc in documents {
        let status = match doc.status {
            Some(DocumentStatus::Approved) => "approved".green(),
            Some(DocumentStatus::Review) => "review".yellow(),
            Some(DocumentStatus::Draft) => "draft".dimmed(),
            None => "".normal(),
        };
        println!(
            "{}  {:<40} {}",
            doc.last_modified.format("%Y-%m-%d").to_string().dimmed(),
            doc.title,
            status
        );
    }
    Ok(())
}

pub async fn run_projects(config: &TeamdeskConfig) -> Result<(), TeamdeskError> {
    let store = adapters::store(config)?;
    let projects = store.projects().await?;
    if projects.is_empty() {
        println!("{}", "no projects".dimmed());
    }
    for project in projects {
        println!(
            "{:<30} {:<12} {:<7} {} due {}",
            project.name.bold(),
            project_status(project.status),
            project.priority.to_string(),
            progress_bar(project.progress),
            project.due_date
        );
    }
    Ok(())
}

pub fn run_sprint() {
    let sprint = current_sprint();
    let today = Utc::now().date_naive();
    println!(
        "{}  {} - {}  ({} days remaining)",
        format!("Sprint {}", sprint.number).bold(),
        sprint.start_date,
        sprint.end_date,
        sprint.days_remaining(today)
    );
    println!("\n{}", "Goals".underline());
    for goal in &sprint.goals {
        println!("  - {goal}");
    }
    println!("\n{}", "Ceremonies".underline());
    println!("  Daily standup  {}", sprint.ceremonies.daily_standup);
    println!(
        "  Review         {}",
        sprint.ceremonies.review.format("%Y-%m-%d %H:%M UTC")
    );
    println!(
        "  Retrospective  {}",
        sprint.ceremonies.retrospective.format("%Y-%m-%d %H:%M UTC")
    );
}
