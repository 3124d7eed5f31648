// SPDX-FileCopyrightText: 2026 Teamdesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Embedded database migrations using refinery.

use teamdesk_core::TeamdeskError;

mod embedded {
    use refinery::embed_migrations;
    embed_migrations!("migrations");
}

/// Run all pending migrations against the given connection.
///
/// Refinery tracks applied versions in `refinery_schema_history`.
pub fn run_migrations(conn: &mut rusqlite::Connection) -> Result<(), TeamdeskError> {
    embedded::migrations::runner()
        .run(conn)
        .map_err(|e| TeamdeskError::Storage {
            source: Box::new(e),
        })?;
    Ok(())
}
