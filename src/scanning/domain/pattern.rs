use crate::shared::ScanError;
use regex::Regex;
use serde::{Deserialize, Serialize};

/// Identifier of a failure pattern
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PatternId(i64);

impl PatternId {
    pub fn new(id: i64) -> Self {
        Self(id)
    }

    pub fn value(&self) -> i64 {
        self.0
    }
}

impl std::fmt::Display for PatternId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PatternKind {
    Regex,
    Literal,
}

/// A failure signature as stored in persistence
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pattern {
    id: PatternId,
    kind: PatternKind,
    text: String,
    description: String,
}

impl Pattern {
    pub fn new(id: PatternId, kind: PatternKind, text: String, description: String) -> Self {
        Self {
            id,
            kind,
            text,
            description,
        }
    }

    pub fn literal(id: i64, text: &str, description: &str) -> Self {
        Self::new(
            PatternId::new(id),
            PatternKind::Literal,
            text.to_string(),
            description.to_string(),
        )
    }

    pub fn regex(id: i64, text: &str, description: &str) -> Self {
        Self::new(
            PatternId::new(id),
            PatternKind::Regex,
            text.to_string(),
            description.to_string(),
        )
    }

    pub fn id(&self) -> PatternId {
        self.id
    }

    pub fn kind(&self) -> PatternKind {
        self.kind
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn compile(&self) -> Result<CompiledPattern, ScanError> {
        let matcher = match self.kind {
            PatternKind::Regex => {
                let regex = Regex::new(&self.text).map_err(|e| ScanError::InvalidPattern {
                    id: self.id.value(),
                    details: e.to_string(),
                })?;
                PatternMatcherKind::Regex(regex)
            }
            PatternKind::Literal => PatternMatcherKind::Literal(self.text.clone()),
        };

        Ok(CompiledPattern {
            id: self.id,
            matcher,
        })
    }
}

#[derive(Debug, Clone)]
pub enum PatternMatcherKind {
    Regex(Regex),
    Literal(String),
}

/// A pattern ready to be applied to log lines
#[derive(Debug, Clone)]
pub struct CompiledPattern {
    id: PatternId,
    matcher: PatternMatcherKind,
}

impl CompiledPattern {
    pub fn id(&self) -> PatternId {
        self.id
    }

    pub fn matcher(&self) -> &PatternMatcherKind {
        &self.matcher
    }

    /// First match in `line` as a byte range
    pub fn find_in(&self, line: &str) -> Option<(usize, usize)> {
        match &self.matcher {
            PatternMatcherKind::Regex(regex) => regex.find(line).map(|m| (m.start(), m.end())),
            PatternMatcherKind::Literal(text) => {
                line.find(text.as_str()).map(|start| (start, start + text.len()))
            }
        }
    }
}
