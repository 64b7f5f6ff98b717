//! Material Name Matcher
//!
//! Proposes, for every source material name, the replacement name with the
//! best token-set similarity. The proposal is a plain [`MatchResult`] that a
//! reviewer edits through explicit overrides before it is committed.

use crate::error::{VrError, VrResult};
use crate::utils::token_set_ratio;
use tracing::debug;

/// Minimum similarity (0-100) for a proposal to be kept
pub const MATCH_THRESHOLD: u8 = 60;

/// Label shown for "no acceptable match"
pub const NONE_LABEL: &str = "None";

/// The replacement chosen for one source name
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchChoice {
    /// Leave the source material alone
    None,
    /// Index into the candidate list
    Candidate(usize),
}

impl MatchChoice {
    /// Position in the pick list, where 0 is `None`
    pub fn combo_index(self) -> usize {
        match self {
            MatchChoice::None => 0,
            MatchChoice::Candidate(idx) => idx + 1,
        }
    }

    /// Inverse of [`combo_index`](Self::combo_index) for a list of
    /// `candidate_count` candidates
    pub fn from_combo_index(index: usize, candidate_count: usize) -> Option<Self> {
        match index {
            0 => Some(MatchChoice::None),
            i if i <= candidate_count => Some(MatchChoice::Candidate(i - 1)),
            _ => None,
        }
    }
}

/// One source name and its current choice
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchRow {
    pub source: String,
    pub choice: MatchChoice,
}

/// Outcome of a matching run, editable until committed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchResult {
    rows: Vec<MatchRow>,
    candidates: Vec<String>,
}

impl MatchResult {
    pub fn rows(&self) -> &[MatchRow] {
        &self.rows
    }

    pub fn candidates(&self) -> &[String] {
        &self.candidates
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Display label of a choice
    pub fn label(&self, choice: MatchChoice) -> &str {
        match choice {
            MatchChoice::None => NONE_LABEL,
            MatchChoice::Candidate(idx) => self
                .candidates
                .get(idx)
                .map(String::as_str)
                .unwrap_or(NONE_LABEL),
        }
    }

    /// Resolve a label to a choice. `"None"` always means no match.
    pub fn choice_for(&self, value: &str) -> VrResult<MatchChoice> {
        if value == NONE_LABEL {
            return Ok(MatchChoice::None);
        }
        self.candidates
            .iter()
            .position(|candidate| candidate == value)
            .map(MatchChoice::Candidate)
            .ok_or_else(|| VrError::InvalidCandidate(value.to_string()))
    }

    /// Override the choice of one row
    pub fn set_choice(&mut self, row: usize, choice: MatchChoice) -> VrResult<()> {
        if let MatchChoice::Candidate(idx) = choice {
            if idx >= self.candidates.len() {
                return Err(VrError::InvalidCandidate(format!("#{}", idx)));
            }
        }
        let entry = self.rows.get_mut(row).ok_or(VrError::InvalidRow(row))?;
        entry.choice = choice;
        Ok(())
    }

    /// Override every row whose source is `source` with `value`.
    ///
    /// Returns the number of rows changed.
    pub fn apply_override(&mut self, source: &str, value: &str) -> VrResult<usize> {
        let choice = self.choice_for(value)?;

        let mut changed = 0;
        for row in self.rows.iter_mut().filter(|row| row.source == source) {
            row.choice = choice;
            changed += 1;
        }

        if changed == 0 {
            return Err(VrError::UnknownSource(source.to_string()));
        }
        debug!("Override {} -> {} ({} row(s))", source, value, changed);
        Ok(changed)
    }

    /// `(source, chosen label)` pairs in source order
    pub fn mapping(&self) -> Vec<(String, String)> {
        self.rows
            .iter()
            .map(|row| (row.source.clone(), self.label(row.choice).to_string()))
            .collect()
    }

    /// The reviewer's pick list: `None` followed by every candidate
    pub fn combo_items(&self) -> Vec<String> {
        std::iter::once(NONE_LABEL.to_string())
            .chain(self.candidates.iter().cloned())
            .collect()
    }

    /// Consume the result, keeping only rows with a candidate
    pub fn into_rebinds(self) -> Vec<(String, String)> {
        let MatchResult { rows, candidates } = self;
        rows.into_iter()
            .filter_map(|row| match row.choice {
                MatchChoice::Candidate(idx) => Some((row.source, candidates[idx].clone())),
                MatchChoice::None => None,
            })
            .collect()
    }
}

/// Match every source name against the candidates with token-set similarity
/// and the fixed [`MATCH_THRESHOLD`].
pub fn classify_by_similarity<S: AsRef<str>>(source: &[S], candidates: &[S]) -> MatchResult {
    classify_with(source, candidates, MATCH_THRESHOLD, token_set_ratio)
}

/// Match with an explicit threshold and scorer.
///
/// The first candidate reaching the highest score wins; a best score below
/// `threshold` yields [`MatchChoice::None`].
pub fn classify_with<S, F>(source: &[S], candidates: &[S], threshold: u8, scorer: F) -> MatchResult
where
    S: AsRef<str>,
    F: Fn(&str, &str) -> u8,
{
    let rows = source
        .iter()
        .map(|name| {
            let name = name.as_ref();
            let mut best: Option<(usize, u8)> = None;

            for (idx, candidate) in candidates.iter().enumerate() {
                let score = scorer(name, candidate.as_ref());
                if score > best.map_or(0, |(_, s)| s) {
                    best = Some((idx, score));
                }
            }

            let choice = match best {
                Some((idx, score)) if score >= threshold => MatchChoice::Candidate(idx),
                _ => MatchChoice::None,
            };
            debug!("{} -> {:?} (best {:?})", name, choice, best);

            MatchRow {
                source: name.to_string(),
                choice,
            }
        })
        .collect();

    MatchResult {
        rows,
        candidates: candidates.iter().map(|c| c.as_ref().to_string()).collect(),
    }
}
