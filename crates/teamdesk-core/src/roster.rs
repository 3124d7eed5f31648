// SPDX-FileCopyrightText: 2026 Teamdesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Built-in AI team roster and sprint overview.
//!
//! Shown when the hosted store has no `team_members` rows or is unreachable.

use chrono::{DateTime, NaiveDate, TimeZone, Utc};

use crate::directory::{MemberStatus, TeamMember};

/// (id, role, icon, status, responsibilities)
const ROSTER: &[(&str, &str, &str, MemberStatus, [&str; 3])] = &[
    (
        "architect",
        "Software Engineer (Architect)",
        "Code2",
        MemberStatus::Active,
        ["Define system architecture", "Write design documents", "Specify requirements"],
    ),
    (
        "frontend-dev",
        "Frontend Developer",
        "Layout",
        MemberStatus::Busy,
        ["Build user interface", "Implement designs", "API integration"],
    ),
    (
        "backend-dev",
        "Backend Developer",
        "Database",
        MemberStatus::Active,
        ["Develop APIs", "Server-side logic", "Data management"],
    ),
    (
        "qa-tester",
        "QA Tester",
        "TestTube",
        MemberStatus::Idle,
        ["Write automated tests", "Run test suites", "Report issues"],
    ),
    (
        "cicd-engineer",
        "CI/CD Engineer",
        "GitBranch",
        MemberStatus::Active,
        ["Manage deployment pipeline", "Automate processes", "Monitor systems"],
    ),
    (
        "product-owner",
        "Product Owner",
        "Target",
        MemberStatus::Busy,
        ["Define product backlog", "Prioritize tasks", "Align business goals"],
    ),
    (
        "scrum-master",
        "Scrum Master",
        "Users",
        MemberStatus::Active,
        ["Facilitate ceremonies", "Remove blockers", "Ensure collaboration"],
    ),
];

/// The default AI team, all chat-enabled.
pub fn default_team() -> Vec<TeamMember> {
    ROSTER
        .iter()
        .map(|(id, role, icon, status, duties)| TeamMember {
            id: (*id).to_string(),
            name: (*role).to_string(),
            role: (*role).to_string(),
            icon: (*icon).to_string(),
            status: *status,
            description: String::new(),
            responsibilities: duties.iter().map(|d| (*d).to_string()).collect(),
            chat_enabled: true,
        })
        .collect()
}

/// Scheduled scrum ceremonies for a sprint.
#[derive(Debug, Clone, PartialEq)]
pub struct Ceremonies {
    pub daily_standup: String,
    pub review: DateTime<Utc>,
    pub retrospective: DateTime<Utc>,
}

/// Current sprint summary.
#[derive(Debug, Clone, PartialEq)]
pub struct SprintInfo {
    pub number: u32,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub goals: Vec<String>,
    pub ceremonies: Ceremonies,
}

impl SprintInfo {
    /// Days left in the sprint as of `today`, zero once it has ended.
    pub fn days_remaining(&self, today: NaiveDate) -> i64 {
        (self.end_date - today).num_days().max(0)
    }
}

/// The sprint shown on the dashboard overview.
pub fn current_sprint() -> SprintInfo {
    SprintInfo {
        number: 12,
        start_date: NaiveDate::from_ymd_opt(2024, 3, 11).unwrap_or_default(),
        end_date: NaiveDate::from_ymd_opt(2024, 3, 24).unwrap_or_default(),
        goals: vec![
            "Implement real-time collaboration features".to_string(),
            "Set up automated testing pipeline".to_string(),
            "Integrate Scrum automation tools".to_string(),
        ],
        ceremonies: Ceremonies {
            daily_standup: "10:00 AM EST".to_string(),
            review: Utc
                .with_ymd_and_hms(2024, 3, 24, 14, 0, 0)
                .single()
                .unwrap_or_default(),
            retrospective: Utc
                .with_ymd_and_hms(2024, 3, 24, 15, 30, 0)
                .single()
                .unwrap_or_default(),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_team_has_seven_chat_enabled_members() {
        let team = default_team();
        assert_eq!(team.len(), 7);
        assert!(team.iter().all(|m| m.chat_enabled));
        assert!(team.iter().all(|m| m.responsibilities.len() == 3));
        assert_eq!(team[3].role, "QA Tester");
        assert_eq!(team[3].status, MemberStatus::Idle);
    }

    #[test]
    fn sprint_countdown_stops_at_zero() {
        let sprint = current_sprint();
        let mid = NaiveDate::from_ymd_opt(2024, 3, 20).unwrap();
        let after = NaiveDate::from_ymd_opt(2024, 4, 1).unwrap();
        assert_eq!(sprint.days_remaining(mid), 4);
        assert_eq!(sprint.days_remaining(after), 0);
        assert!(sprint.ceremonies.review < sprint.ceremonies.retrospective);
    }
}
