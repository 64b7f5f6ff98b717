//! Match Review
//!
//! Lets a human page through a [`MatchResult`] and override proposals with
//! short text commands before the result is committed.

use crate::matcher::{MatchChoice, MatchResult};
use tracing::{debug, info};

/// Number of rows shown per page
const ROWS_PER_PAGE: usize = 10;

/// Result of a review command
#[derive(Debug, Clone, PartialEq)]
pub enum ReviewAction {
    /// A row's choice was changed (0-based row)
    Updated(usize),
    NextPage,
    PreviousPage,
    /// Render the current page again
    ShowPage,
    /// Reviewer accepted the result
    Commit,
    /// Reviewer discarded the result
    Cancelled,
    /// Command understood but the row or value is invalid
    Rejected(String),
    /// Input not recognized
    NotRecognized,
}

/// State of the review session
#[derive(Debug, Clone, PartialEq)]
pub enum ReviewState {
    Active,
    Committed,
    Cancelled,
}

/// Interactive editing session over one match result
#[derive(Debug)]
pub struct ReviewSession {
    result: MatchResult,
    page: usize,
    state: ReviewState,
}

impl ReviewSession {
    pub fn new(result: MatchResult) -> Self {
        info!("📋 Review started: {} materials", result.len());
        Self {
            result,
            page: 0,
            state: ReviewState::Active,
        }
    }

    pub fn is_active(&self) -> bool {
        self.state == ReviewState::Active
    }

    pub fn state(&self) -> &ReviewState {
        &self.state
    }

    pub fn result(&self) -> &MatchResult {
        &self.result
    }

    pub fn page(&self) -> usize {
        self.page
    }

    pub fn total_pages(&self) -> usize {
        if self.result.is_empty() {
            0
        } else {
            (self.result.len() - 1) / ROWS_PER_PAGE + 1
        }
    }

    /// Render the current page as text, one numbered row per line
    pub fn render_page(&self) -> String {
        if self.result.is_empty() {
            return "No materials to review.".to_string();
        }

        let start = self.page * ROWS_PER_PAGE;
        let end = std::cmp::min(start + ROWS_PER_PAGE, self.result.len());

        let mut lines = vec![format!(
            "Page {}/{} ({} materials)",
            self.page + 1,
            self.total_pages(),
            self.result.len()
        )];
        for (offset, row) in self.result.rows()[start..end].iter().enumerate() {
            lines.push(format!(
                "{:>3}. {} -> {}",
                start + offset + 1,
                row.source,
                self.result.label(row.choice)
            ));
        }

        let choices: Vec<String> = self
            .result
            .combo_items()
            .iter()
            .enumerate()
            .map(|(idx, label)| format!("{}={}", idx, label))
            .collect();
        lines.push(format!("Choices: {}", choices.join(", ")));
        lines.join("\n")
    }

    /// Handle one review command
    pub fn handle_command(&mut self, text: &str) -> ReviewAction {
        if !self.is_active() {
            return ReviewAction::NotRecognized;
        }

        let text = text.trim();
        let lower = text.to_lowercase();

        match lower.as_str() {
            "list" | "show" => return ReviewAction::ShowPage,
            "next" | "more" => {
                if self.page + 1 < self.total_pages() {
                    self.page += 1;
                    debug!("Review: next page -> {}", self.page + 1);
                    return ReviewAction::NextPage;
                }
                return ReviewAction::ShowPage;
            }
            "previous" | "back" => {
                if self.page > 0 {
                    self.page -= 1;
                    debug!("Review: previous page -> {}", self.page + 1);
                    return ReviewAction::PreviousPage;
                }
                return ReviewAction::ShowPage;
            }
            "commit" | "apply" | "replace" => {
                self.state = ReviewState::Committed;
                return ReviewAction::Commit;
            }
            "cancel" | "quit" | "exit" => {
                self.state = ReviewState::Cancelled;
                return ReviewAction::Cancelled;
            }
            _ => {}
        }

        match parse_assignment(text) {
            Some((row, value)) => self.assign(row, value),
            None => ReviewAction::NotRecognized,
        }
    }

    fn assign(&mut self, row_number: usize, value: &str) -> ReviewAction {
        let row = row_number.saturating_sub(1);
        if row_number == 0 || row >= self.result.len() {
            return ReviewAction::Rejected(format!("No row {}", row_number));
        }

        let choice = match self.resolve_value(value) {
            Some(choice) => choice,
            None => return ReviewAction::Rejected(format!("'{}' is not a choice", value)),
        };

        match self.result.set_choice(row, choice) {
            Ok(()) => {
                info!(
                    "📌 {} -> {}",
                    self.result.rows()[row].source,
                    self.result.label(choice)
                );
                ReviewAction::Updated(row)
            }
            Err(e) => ReviewAction::Rejected(e.to_string()),
        }
    }

    /// A value is a candidate name, `none`, or a pick-list number.
    ///
    /// Exact names win, so a candidate literally called `none` stays
    /// reachable while `None` always means no match.
    fn resolve_value(&self, value: &str) -> Option<MatchChoice> {
        if let Ok(choice) = self.result.choice_for(value) {
            return Some(choice);
        }
        if value.eq_ignore_ascii_case("none") {
            return Some(MatchChoice::None);
        }
        value
            .parse::<usize>()
            .ok()
            .and_then(|idx| MatchChoice::from_combo_index(idx, self.result.candidates().len()))
    }

    /// End the session, handing back the result only if it was committed
    pub fn finish(self) -> Option<MatchResult> {
        match self.state {
            ReviewState::Committed => Some(self.result),
            _ => None,
        }
    }
}

/// Parse `<row> <value>` or `<row> = <value>`
fn parse_assignment(text: &str) -> Option<(usize, &str)> {
    let (row, value) = match text.split_once('=') {
        Some((row, value)) => (row.trim(), value.trim()),
        None => {
            let (row, value) = text.split_once(char::is_whitespace)?;
            (row.trim(), value.trim())
        }
    };

    if value.is_empty() {
        return None;
    }
    row.parse::<usize>().ok().map(|row| (row, value))
}
