// SPDX-FileCopyrightText: 2026 Teamdesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Turns figment errors into miette reports.
//!
//! Every field of the model has a default, so the errors a user can hit are
//! unknown keys, wrong value types, and validation failures.

#![allow(unused_assignments)] // emitted by the miette derive

use figment::error::Kind;
use miette::{Diagnostic, NamedSource, SourceSpan};
use thiserror::Error;

/// Jaro-Winkler score a known key must beat to be offered as a correction.
const SUGGESTION_THRESHOLD: f64 = 0.75;

#[derive(Debug, Error, Diagnostic)]
pub enum ConfigError {
    #[error("unknown configuration key `{key}`")]
    #[diagnostic(code(teamdesk::config::unknown_key), help("{hint}"))]
    UnknownKey {
        key: String,
        suggestion: Option<String>,
        hint: String,
        #[label("not a key of this section")]
        span: Option<SourceSpan>,
        #[source_code]
        src: Option<NamedSource<String>>,
    },

    #[error("`{key}` should be {expected}, found {found}")]
    #[diagnostic(code(teamdesk::config::invalid_type))]
    InvalidType {
        key: String,
        found: String,
        expected: String,
    },

    #[error("validation error: {message}")]
    #[diagnostic(code(teamdesk::config::validation))]
    Validation { message: String },

    #[error("configuration error: {0}")]
    #[diagnostic(code(teamdesk::config::other))]
    Other(String),
}

impl ConfigError {
    pub(crate) fn validation(message: impl Into<String>) -> Self {
        ConfigError::Validation {
            message: message.into(),
        }
    }

    fn unknown_key(field: &str, known: &[&str], located: Located) -> Self {
        let suggestion = suggest_key(field, known);
        let listing = known.join(", ");
        let hint = match &suggestion {
            Some(s) => format!("did you mean `{s}`? known keys: {listing}"),
            None => format!("known keys: {listing}"),
        };
        let (span, src) = match located {
            Some((span, src)) => (Some(span), Some(src)),
            None => (None, None),
        };
        ConfigError::UnknownKey {
            key: field.to_string(),
            suggestion,
            hint,
            span,
            src,
        }
    }
}

type Located = Option<(SourceSpan, NamedSource<String>)>;

/// Maps each error held by `err` to a report. `toml_sources` holds the
/// `(path, content)` of every file that was merged.
pub fn figment_to_config_errors(
    err: figment::Error,
    toml_sources: &[(String, String)],
) -> Vec<ConfigError> {
    err.into_iter()
        .map(|error| {
            let dotted = error.path.join(".");
            match &error.kind {
                Kind::UnknownField(field, known) => {
                    let located = locate(&error, field, toml_sources);
                    ConfigError::unknown_key(field, known, located)
                }
                Kind::InvalidType(found, expected) => ConfigError::InvalidType {
                    key: dotted,
                    found: found.to_string(),
                    expected: expected.to_string(),
                },
                _ => ConfigError::Other(error.to_string()),
            }
        })
        .collect()
}

/// File and span of an unknown key, when the key came from a TOML file.
fn locate(error: &figment::error::Error, field: &str, toml_sources: &[(String, String)]) -> Located {
    let from_file = error
        .metadata
        .as_ref()
        .and_then(|m| m.source.as_ref())
        .and_then(|s| s.file_path())
        .map(|p| p.display().to_string());

    // Inline strings carry no file source; use the only candidate.
    let (path, content) = match from_file {
        Some(path) => toml_sources.iter().find(|(p, _)| *p == path)?,
        None if toml_sources.len() == 1 => toml_sources.first()?,
        None => return None,
    };

    let offset = find_key_offset(content, &error.path, field)?;
    Some((
        SourceSpan::new(offset.into(), field.len()),
        NamedSource::new(path, content.clone()),
    ))
}

/// Byte offset of `field` as a key inside the table named by `path[0]`.
///
/// With an empty `path` only the top-level table is searched. The scan
/// stops at the next table header, so a key of the same name in another
/// section is never reported.
pub fn find_key_offset(content: &str, path: &[String], field: &str) -> Option<usize> {
    let wanted = path.first().map(String::as_str);
    let mut current: Option<&str> = None;
    let mut offset = 0;

    for line in content.split_inclusive('\n') {
        let start = offset;
        offset += line.len();
        let body = line.trim_start();

        if let Some(header) = body.strip_prefix('[') {
            current = header.split(']').next().map(str::trim);
            continue;
        }
        if current != wanted {
            continue;
        }
        let Some(rest) = body.strip_prefix(field) else {
            continue;
        };
        if rest.trim_start().starts_with('=') {
            return Some(start + line.len() - body.len());
        }
    }

    None
}

/// Closest known key above the similarity threshold.
pub fn suggest_key(unknown: &str, known: &[&str]) -> Option<String> {
    known
        .iter()
        .map(|&key| (key, strsim::jaro_winkler(unknown, key)))
        .filter(|(_, score)| *score > SUGGESTION_THRESHOLD)
        .max_by(|a, b| a.1.total_cmp(&b.1))
        .map(|(key, _)| key.to_string())
}

/// Prints each report to stderr.
pub fn render_errors(errors: &[ConfigError]) {
    let handler = miette::GraphicalReportHandler::new();
    for error in errors {
        let mut out = String::new();
        match handler.render_report(&mut out, error as &dyn Diagnostic) {
            Ok(()) => eprint!("{out}"),
            Err(_) => eprintln!("Error: {error}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn suggests_close_key() {
        let known = &["page_size", "responder"];
        assert_eq!(suggest_key("page_sise", known), Some("page_size".to_string()));
        assert_eq!(suggest_key("respnder", known), Some("responder".to_string()));
    }

    #[test]
    fn no_suggestion_for_distant_typo() {
        let known = &["url", "anon_key", "ai_function"];
        assert_eq!(suggest_key("zzzzzz", known), None);
    }

    #[test]
    fn key_offset_is_scoped_to_section() {
        let content = "[app]\nmodle = \"x\"\n\n[gemini]\nmodle = \"y\"\n";
        let path = vec!["gemini".to_string()];
        let offset = find_key_offset(content, &path, "modle").unwrap();
        assert_eq!(&content[offset..offset + 5], "modle");
        assert!(offset > content.find("[gemini]").unwrap());
    }

    #[test]
    fn key_offset_ignores_prefix_matches_and_later_sections() {
        let content = "[chat]\npage_size_max = 3\n[relay]\npage_size = 1\n";
        let path = vec!["chat".to_string()];
        assert_eq!(find_key_offset(content, &path, "page_size"), None);
    }

    #[test]
    fn missing_section_has_no_offset() {
        let path = vec!["relay".to_string()];
        assert_eq!(find_key_offset("[app]\nname = \"x\"\n", &path, "name"), None);
    }

    #[test]
    fn unknown_key_help_lists_known_keys() {
        let error = ConfigError::unknown_key("modle", &["model", "base_url"], None);
        match error {
            ConfigError::UnknownKey {
                suggestion, hint, ..
            } => {
                assert_eq!(suggestion.as_deref(), Some("model"));
                assert_eq!(hint, "did you mean `model`? known keys: model, base_url");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
