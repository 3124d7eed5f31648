// SPDX-FileCopyrightText: 2026 Teamdesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! One-shot AI commands: `ask` a team role and `review` a document.
//!
//! Both call the generative endpoint directly, whatever `chat.responder`
//! is set to, and keep no history.

use colored::Colorize;
use tracing::debug;

use teamdesk_config::TeamdeskConfig;
use teamdesk_core::directory::{Document, TeamMember};
use teamdesk_core::roster::default_team;
use teamdesk_core::{DirectoryStore, MemberId, TeamdeskError};
use teamdesk_gemini::{DocumentReview, GeminiResponder};

use crate::{adapters, listings};

/// Role title the AI should play for `member_id`.
pub fn role_for(members: &[TeamMember], member_id: &MemberId) -> String {
    members
        .iter()
        .chain(default_team().iter())
        .find(|m| m.id == member_id.as_str())
        .map(|m| m.role.clone())
        .unwrap_or_else(|| member_id.to_string())
}

pub async fn ask(
    responder: &GeminiResponder,
    members: &[TeamMember],
    member_id: &MemberId,
    message: &str,
) -> Result<String, TeamdeskError> {
    let message = message.trim();
    if message.is_empty() {
        return Err(TeamdeskError::Validation("message is empty".into()));
    }
    let role = role_for(members, member_id);
    debug!(member = %member_id, role = %role, "asking team role");
    responder.persona_reply(&role, message).await
}

pub async fn review(
    responder: &GeminiResponder,
    documents: &[Document],
    id: &str,
) -> Result<DocumentReview, TeamdeskError> {
    let document = documents
        .iter()
        .find(|d| d.id == id)
        .ok_or_else(|| TeamdeskError::Validation(format!("no document with id `{id}`")))?;
    responder.review_document(document).await
}

pub async fn run_ask(
    config: &TeamdeskConfig,
    member_id: MemberId,
    message: &str,
) -> Result<(), TeamdeskError> {
    let responder = GeminiResponder::new(&config.gemini)?;
    let members = listings::team(config).await;
    let reply = ask(&responder, &members, &member_id, message).await?;
    println!("{} {reply}", format!("{}:", role_for(&members, &member_id)).cyan().bold());
    Ok(())
}

pub async fn run_review(config: &TeamdeskConfig, id: &str) -> Result<(), TeamdeskError> {
    let store = adapters::store(config)?;
    let documents = store.documents().await?;
    let responder = GeminiResponder::new(&config.gemini)?;
    let result = review(&responder, &documents, id).await?;
    println!("{}\n{}", "Review".underline(), result.feedback);
    Ok(())
}
