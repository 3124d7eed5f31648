// SPDX-FileCopyrightText: 2026 Teamdesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `teamdesk chat` command implementation.
//!
//! An interactive REPL over a [`ChatSession`]. `/more` pages in older
//! history, `/retry` reloads the latest page, `/quit` saves and exits.

use std::collections::HashSet;
use std::sync::Arc;

use chrono::{DateTime, Local, Utc};
use colored::Colorize;
use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;
use tracing::{debug, warn};

use teamdesk_chat::{ChatFailure, ChatSession, ChatView, LoadMoreOutcome, SendOutcome};
use teamdesk_config::TeamdeskConfig;
use teamdesk_core::directory::TeamMember;
use teamdesk_core::roster::default_team;
use teamdesk_core::{
    ChatMessage, DirectoryStore, MemberId, NoticeSink, PluginAdapter, Sender, TeamdeskError,
};

use crate::adapters;

/// Prints notices to stderr.
struct TerminalNotices;

impl NoticeSink for TerminalNotices {
    fn notify(&self, text: &str) {
        eprintln!("{} {}", "!".red().bold(), text.red());
    }
}

/// Tracks which messages have been printed.
#[derive(Default)]
struct Transcript {
    printed: HashSet<(Sender, DateTime<Utc>, String)>,
}

impl Transcript {
    fn fingerprint(message: &ChatMessage) -> (Sender, DateTime<Utc>, String) {
        (message.sender, message.timestamp, message.content.clone())
    }

    /// Prints messages not seen before, in display order.
    fn print_new(&mut self, view: &ChatView, assistant: &str) {
        for message in &view.messages {
            if self.printed.insert(Self::fingerprint(message)) {
                println!("{}", render_line(message, assistant));
            }
        }
    }

    fn reprint(&mut self, view: &ChatView, assistant: &str) {
        self.printed.clear();
        println!("{}", "-".repeat(40).dimmed());
        self.print_new(view, assistant);
    }
}

/// One transcript line. Markdown bold markers are dropped.
fn render_line(message: &ChatMessage, assistant: &str) -> String {
    let time = message
        .timestamp
        .with_timezone(&Local)
        .format("%H:%M")
        .to_string();
    let content = message.content.replace("**", "");
    match message.sender {
        Sender::User => format!("{} {} {}", time.dimmed(), "you:".blue().bold(), content),
        Sender::Ai => format!(
            "{} {} {}",
            time.dimmed(),
            format!("{assistant}:").green().bold(),
            content
        ),
    }
}

/// Display name for `member_id`, falling back to the built-in roster.
fn display_name(members: &[TeamMember], member_id: &MemberId) -> String {
    members
        .iter()
        .chain(default_team().iter())
        .find(|m| m.id == member_id.as_str())
        .map(|m| if m.name.is_empty() { m.role.clone() } else { m.name.clone() })
        .unwrap_or_else(|| member_id.to_string())
}

pub async fn run_chat(config: &TeamdeskConfig, member_id: MemberId) -> Result<(), TeamdeskError> {
    let store = adapters::store(config)?;
    let responder = adapters::chat_responder(config)?;
    let cache = adapters::cache(config).await?;

    let members = store.team_members().await.unwrap_or_else(|e| {
        warn!(error = %e, "team directory unavailable, using built-in roster");
        Vec::new()
    });
    let name = display_name(&members, &member_id);

    let session = ChatSession::new(store.clone(), responder, cache.clone(), &config.chat)
        .with_notices(Arc::new(TerminalNotices));

    let mut rl = DefaultEditor::new()
        .map_err(|e| TeamdeskError::Internal(format!("failed to initialize readline: {e}")))?;

    println!("{}", format!("chat with {name}").bold().green());
    println!(
        "Type {} for older messages, {} to reload, {} to exit.\n",
        "/more".yellow(),
        "/retry".yellow(),
        "/quit".yellow()
    );

    let mut transcript = Transcript::default();
    if let Err(e) = session.open(member_id.clone()).await {
        debug!(error = %e, "opened without fresh history");
    }
    let view = session.view();
    if view.messages.is_empty() {
        println!("{}", "No messages yet. Start a conversation!".dimmed());
    }
    transcript.print_new(&view, &name);

    let prompt = format!("{}> ", "you".blue());
    loop {
        match rl.readline(&prompt) {
            Ok(line) => {
                let trimmed = line.trim();
                match trimmed {
                    "/quit" | "/exit" => break,
                    "/more" => match session.load_more().await {
                        Ok(LoadMoreOutcome::Skipped) => {
                            println!("{}", "no older messages".dimmed());
                        }
                        Ok(LoadMoreOutcome::Loaded { .. }) => {
                            transcript.reprint(&session.view(), &name);
                        }
                        Err(e) => debug!(error = %e, "load more failed"),
                    },
                    "/retry" => {
                        if session.retry().await.is_ok() {
                            transcript.reprint(&session.view(), &name);
                        }
                    }
                    _ => {
                        let _ = rl.add_history_entry(&line);
                        // Show pushes that arrived while waiting for input.
                        transcript.print_new(&session.view(), &name);
                        match session.send(trimmed).await {
                            Ok(SendOutcome::Ignored) => continue,
                            Ok(SendOutcome::Apologized(failure)) => {
                                debug!(error = %failure, "reply replaced by apology");
                            }
                            Ok(_) => {}
                            Err(e) => eprintln!("{}: {e}", "error".red()),
                        }
                        transcript.print_new(&session.view(), &name);
                    }
                }
            }
            Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => break,
            Err(e) => {
                eprintln!("{}: {e}", "error".red());
                break;
            }
        }
    }

    match session.close().await {
        Ok(report) => {
            if report.saved > 0 {
                println!(
                    "{}",
                    format!("saved {} messages", report.saved).dimmed()
                );
            }
        }
        Err(ChatFailure::NotOpen) => {}
        Err(e) => eprintln!("{}: {e}", "error".red()),
    }
    cache.shutdown().await?;

    println!("{}", "goodbye".dimmed());
    Ok(())
}
