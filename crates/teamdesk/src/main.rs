// SPDX-FileCopyrightText: 2026 Teamdesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Teamdesk - team collaboration with AI team members.
//!
//! Binary entry point: the AI relay server, an interactive chat, listings
//! of the team directory, and role-guarded write commands.

mod adapters;
mod assist;
mod chat;
mod listings;
mod manage;
mod relay;
mod shutdown;
mod status;

use clap::{Parser, Subcommand};
use colored::Colorize;

use teamdesk_core::MemberId;
use teamdesk_core::directory::DocumentStatus;

use crate::manage::{ProfileArgs, ProjectAction};

/// Teamdesk - team collaboration with AI team members.
#[derive(Parser, Debug)]
#[command(name = "teamdesk", version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run the AI relay HTTP server.
    Relay,
    /// Chat with an AI team member.
    Chat {
        /// Team member id, e.g. `qa-tester`.
        member_id: String,
    },
    /// List the AI team.
    Members,
    /// List project documents.
    Documents,
    /// List projects.
    Projects,
    /// Show the current sprint.
    Sprint,
    /// Create, change, or delete projects.
    Project {
        #[command(subcommand)]
        action: ProjectAction,
    },
    /// Set the status of AI team members holding a role.
    SetStatus {
        /// Role title, e.g. "QA Tester".
        role: String,
        /// active, busy, or idle.
        status: String,
    },
    /// Change a document's title or review status.
    Document {
        id: String,
        #[arg(long)]
        title: Option<String>,
        #[arg(long)]
        status: Option<DocumentStatus>,
    },
    /// Update a user profile.
    Profile(ProfileArgs),
    /// Ask an AI team member a one-off question.
    Ask {
        member_id: String,
        message: String,
    },
    /// Ask the AI to review a document.
    Review { document_id: String },
    /// Print the effective configuration with secrets masked.
    Config,
    /// Check the store, responder, cache, and relay.
    Status {
        /// Output JSON.
        #[arg(long)]
        json: bool,
        /// Disable colors.
        #[arg(long)]
        plain: bool,
    },
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let config = match teamdesk_config::load_and_validate() {
        Ok(config) => config,
        Err(errors) => {
            teamdesk_config::render_errors(&errors);
            std::process::exit(1);
        }
    };

    init_tracing(&config.app.log_level);

    let result = match cli.command {
        Some(Commands::Relay) => relay::run_relay(&config).await,
        Some(Commands::Chat { member_id }) => chat::run_chat(&config, MemberId::new(member_id)).await,
        Some(Commands::Members) => listings::run_members(&config).await,
        Some(Commands::Documents) => listings::run_documents(&config).await,
        Some(Commands::Projects) => listings::run_projects(&config).await,
        Some(Commands::Sprint) => {
            listings::run_sprint();
            Ok(())
        }
        Some(Commands::Project { action }) => manage::run_project(&config, action).await,
        Some(Commands::SetStatus { role, status }) => {
            manage::run_member_status(&config, &role, &status).await
        }
        Some(Commands::Document { id, title, status }) => {
            manage::run_document(&config, &id, title, status).await
        }
        Some(Commands::Profile(args)) => manage::run_profile(&config, args).await,
        Some(Commands::Ask { member_id, message }) => {
            assist::run_ask(&config, MemberId::new(member_id), &message).await
        }
        Some(Commands::Review { document_id }) => assist::run_review(&config, &document_id).await,
        Some(Commands::Config) => match teamdesk_config::render_effective(&config) {
            Ok(rendered) => {
                print!("{rendered}");
                Ok(())
            }
            Err(e) => Err(teamdesk_core::TeamdeskError::Config(e.to_string())),
        },
        Some(Commands::Status { json, plain }) => status::run_status(&config, json, plain).await,
        None => {
            println!("teamdesk: use --help for available commands");
            Ok(())
        }
    };

    if let Err(e) = result {
        eprintln!("{}: {e}", "error".red());
        std::process::exit(1);
    }
}

/// Initializes the tracing subscriber. `RUST_LOG` overrides `app.log_level`.
fn init_tracing(log_level: &str) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("teamdesk={log_level},warn")));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn binary_loads_config_defaults() {
        let config = teamdesk_config::load_and_validate_str("").expect("defaults should be valid");
        assert_eq!(config.app.name, "teamdesk");
    }

    #[test]
    fn chat_command_takes_member_id() {
        let cli = Cli::try_parse_from(["teamdesk", "chat", "qa-tester"]).unwrap();
        match cli.command {
            Some(Commands::Chat { member_id }) => assert_eq!(member_id, "qa-tester"),
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn status_flags_parse() {
        let cli = Cli::try_parse_from(["teamdesk", "status", "--json"]).unwrap();
        assert!(matches!(
            cli.command,
            Some(Commands::Status {
                json: true,
                plain: false
            })
        ));
    }

    #[test]
    fn project_subcommands_parse_typed_values() {
        let cli = Cli::try_parse_from([
            "teamdesk", "project", "create", "Dashboard", "--due", "2024-06-30", "--priority",
            "high", "--tags", "ui,api",
        ])
        .unwrap();
        match cli.command {
            Some(Commands::Project {
                action:
                    ProjectAction::Create {
                        priority, tags, status, ..
                    },
            }) => {
                assert_eq!(priority, teamdesk_core::directory::Priority::High);
                assert_eq!(status, teamdesk_core::directory::ProjectStatus::Planning);
                assert_eq!(tags, vec!["ui", "api"]);
            }
            other => panic!("unexpected command: {other:?}"),
        }

        assert!(Cli::try_parse_from(["teamdesk", "project", "progress", "p-1", "300"]).is_err());
    }

    #[test]
    fn profile_role_flag_uses_store_spelling() {
        let cli = Cli::try_parse_from(["teamdesk", "profile", "--user", "u-2", "--role", "team_lead"])
            .unwrap();
        match cli.command {
            Some(Commands::Profile(args)) => {
                assert_eq!(args.user.as_deref(), Some("u-2"));
                assert_eq!(args.role, Some(teamdesk_core::UserRole::TeamLead));
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }
}
