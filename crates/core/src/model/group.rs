use serde::Serialize;
use std::collections::HashSet;

use crate::model::{IdRange, Question, QuestionId, Row, cell, matches};

/// Reserved selector meaning "every question"; never a group of its own.
pub const ALL_GROUP: &str = "ALL";

/// Named subset of questions defined by inclusive id ranges.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Group {
    name: String,
    ranges: Vec<IdRange>,
}

impl Group {
    #[must_use]
    pub fn new(name: impl Into<String>, ranges: Vec<IdRange>) -> Self {
        Self {
            name: name.into(),
            ranges,
        }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn ranges(&self) -> &[IdRange] {
        &self.ranges
    }

    #[must_use]
    pub fn contains(&self, id: QuestionId) -> bool {
        matches(id, &self.ranges)
    }
}

/// Parse group definitions from `[name, range_spec]` rows.
///
/// - rows with an empty name are skipped
/// - ranges are separated by `,` or `;`; `a-b` is a span and a bare number a single id
/// - unparseable tokens are dropped with a warning, the rest of the row is kept
/// - the first row wins when a name repeats; [`ALL_GROUP`] is reserved and skipped
#[must_use]
pub fn parse_groups(rows: &[Row]) -> Vec<Group> {
    let mut seen = HashSet::new();
    let mut groups = Vec::new();

    for (line, row) in rows.iter().enumerate() {
        let name = cell(row, 0);
        if name.is_empty() {
            continue;
        }
        if name == ALL_GROUP {
            log::warn!("groups row {}: name {ALL_GROUP:?} is reserved, skipping", line + 1);
            continue;
        }
        if !seen.insert(name.to_string()) {
            log::warn!("groups row {}: duplicate group {name:?}, skipping", line + 1);
            continue;
        }

        let ranges = cell(row, 1)
            .split([',', ';'])
            .filter(|token| !token.trim().is_empty())
            .filter_map(|token| match IdRange::parse_token(token) {
                Ok(range) => Some(range),
                Err(err) => {
                    log::warn!("groups row {} ({name}): {err}", line + 1);
                    None
                }
            })
            .collect();

        groups.push(Group::new(name, ranges));
    }

    log::debug!("parsed {} groups from {} rows", groups.len(), rows.len());
    groups
}

/// Questions whose id falls inside `group`, in their original relative order.
#[must_use]
pub fn resolve_members(questions: &[Question], group: &Group) -> Vec<Question> {
    questions
        .iter()
        .filter(|question| group.contains(question.id()))
        .cloned()
        .collect()
}
