//! Replay scripts
//!
//! A script is a JSON array of steps recorded from a session against the
//! forum API:
//!
//! ```json
//! [
//!   {"op": "query", "document": {"kind": "posts", "limit": 10}, "data": {"posts": {}}},
//!   {"op": "mutation", "name": "vote", "variables": {"postId": 1, "value": 1}, "result": {"vote": true}},
//!   {"op": "read", "document": {"kind": "posts", "limit": 10}}
//! ]
//! ```

use fc_coordinator::{documents, Client, ClientError, QueryRead, UpdateOutcome};
use fc_store::QueryDocument;
use serde::Deserialize;
use serde_json::{json, Value};
use std::fmt::{self, Display, Formatter};
use std::path::{Path, PathBuf};

/// Errors while loading or replaying a script
#[derive(Debug, thiserror::Error)]
pub enum ScriptError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid script: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("step {step} failed: {source}")]
    Step {
        step: usize,
        #[source]
        source: ClientError,
    },
}

/// Query document named by a script
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum DocumentSpec {
    Me,
    Posts {
        limit: i64,
        #[serde(default)]
        cursor: Option<String>,
    },
    Replies {
        #[serde(rename = "postId")]
        post_id: i64,
        limit: i64,
        #[serde(default)]
        cursor: Option<String>,
    },
    Post {
        id: i64,
    },
}

impl DocumentSpec {
    /// Build the query document
    #[must_use]
    pub fn to_document(&self) -> QueryDocument {
        match self {
            Self::Me => documents::me(),
            Self::Posts { limit, cursor } => documents::posts(*limit, cursor.as_deref()),
            Self::Replies {
                post_id,
                limit,
                cursor,
            } => documents::replies(*post_id, *limit, cursor.as_deref()),
            Self::Post { id } => documents::post(*id),
        }
    }
}

/// One recorded step
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "op", rename_all = "lowercase")]
pub enum Step {
    /// A query response arrived
    Query { document: DocumentSpec, data: Value },
    /// A mutation response arrived
    Mutation {
        name: String,
        #[serde(default)]
        variables: Value,
        result: Value,
    },
    /// The view read a query from the cache
    Read { document: DocumentSpec },
}

/// Parsed script
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(transparent)]
pub struct Script {
    steps: Vec<Step>,
}

impl Script {
    /// Parse a script from JSON text
    ///
    /// # Errors
    /// Returns error if the text is not a valid script
    pub fn from_json(text: &str) -> Result<Self, ScriptError> {
        Ok(serde_json::from_str(text)?)
    }

    /// Load a script file
    ///
    /// # Errors
    /// Returns error if the file cannot be read or parsed
    pub fn load(path: &Path) -> Result<Self, ScriptError> {
        let text = std::fs::read_to_string(path).map_err(|source| ScriptError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&text)
    }

    /// Steps in order
    #[inline]
    #[must_use]
    pub fn steps(&self) -> &[Step] {
        &self.steps
    }
}

/// What one step did
#[derive(Debug, Clone, PartialEq)]
pub enum StepReport {
    /// Query response recorded
    Recorded { document: String },
    /// Mutation applied
    Mutated { name: String, outcome: UpdateOutcome },
    /// Cache read
    Read { document: String, read: QueryRead },
}

impl StepReport {
    /// JSON line form
    #[must_use]
    pub fn to_json(&self, step: usize) -> Value {
        match self {
            Self::Recorded { document } => {
                json!({"step": step, "op": "query", "document": document})
            }
            Self::Mutated { name, outcome } => {
                json!({"step": step, "op": "mutation", "name": name, "outcome": outcome.to_string()})
            }
            Self::Read { document, read } => match read {
                QueryRead::Miss => {
                    json!({"step": step, "op": "read", "document": document, "status": "miss"})
                }
                QueryRead::Hit { data, partial } => json!({
                    "step": step,
                    "op": "read",
                    "document": document,
                    "status": "hit",
                    "partial": partial,
                    "data": data
                }),
            },
        }
    }
}

impl Display for StepReport {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::Recorded { document } => write!(f, "query {document}: recorded"),
            Self::Mutated { name, outcome } => write!(f, "mutation {name}: {outcome}"),
            Self::Read {
                document,
                read: QueryRead::Miss,
            } => write!(f, "read {document}: miss"),
            Self::Read {
                document,
                read: QueryRead::Hit { data, partial },
            } => {
                let status = if *partial { "partial hit" } else { "hit" };
                let pretty = serde_json::to_string_pretty(data).map_err(|_| fmt::Error)?;
                write!(f, "read {document}: {status}\n{pretty}")
            }
        }
    }
}

/// Run every step of `script` against `client`
///
/// # Errors
/// Returns error on the first step whose payload cannot be stored
pub fn replay(client: &mut Client, script: &Script) -> Result<Vec<StepReport>, ScriptError> {
    let mut reports = Vec::with_capacity(script.steps().len());

    for (index, step) in script.steps().iter().enumerate() {
        let report = match step {
            Step::Query { document, data } => {
                let document = document.to_document();
                client
                    .write_result(&document, data)
                    .map_err(|source| ScriptError::Step {
                        step: index,
                        source,
                    })?;
                StepReport::Recorded {
                    document: document.name().to_string(),
                }
            }
            Step::Mutation {
                name,
                variables,
                result,
            } => {
                StepReport::Mutated {
                    name: name.clone(),
                    outcome: client.apply_mutation(name, variables, result),
                }
            }
            Step::Read { document } => {
                let document = document.to_document();
                StepReport::Read {
                    document: document.name().to_string(),
                    read: client.read(&document),
                }
            }
        };
        tracing::debug!(step = index, "step replayed");
        reports.push(report);
    }

    tracing::info!(steps = reports.len(), "script replayed");
    Ok(reports)
}
