//! # Schema Validation Error Types
//!
//! [`SchemaError`] is the base validation error; each variant is one of
//! the specialized failures (unsupported type, fetch, timeout, invalid
//! schema, credential violations, rule failures). Violations carry
//! structured context: the schema that was violated, the instance path,
//! and a human-readable message.

use std::fmt;

use thiserror::Error;

/// Errors from the schema validation pipeline.
#[derive(Error, Debug)]
pub enum SchemaError {
    /// The reference declared a validator type outside the allow-list.
    #[error("unsupported schema validator type \"{schema_type}\" for {url}")]
    UnsupportedSchemaType {
        /// The schema URL.
        url: String,
        /// The declared (rejected) validator type.
        schema_type: String,
    },

    /// The schema document could not be fetched. `status` is present for
    /// non-2xx responses and absent for transport failures.
    #[error("schema fetch failed for {url}: {reason}")]
    Fetch {
        /// The schema URL.
        url: String,
        /// HTTP status, when the server answered.
        status: Option<u16>,
        /// What went wrong.
        reason: String,
    },

    /// The fetch exceeded the caller-supplied timeout; the in-flight
    /// request was abandoned.
    #[error("schema fetch timed out for {url} after {timeout_ms} ms")]
    Timeout {
        /// The schema URL.
        url: String,
        /// The timeout that elapsed.
        timeout_ms: u64,
    },

    /// The fetched document is not itself a well-formed schema.
    #[error("invalid schema document at {url}: {reason}")]
    InvalidSchema {
        /// The schema URL.
        url: String,
        /// Why the document was rejected.
        reason: String,
    },

    /// The credential violated one or more schemas.
    #[error("credential failed schema validation:\n{violations}")]
    CredentialValidation {
        /// Every violation across every schema reference.
        violations: ValidationViolations,
    },

    /// One or more custom rules rejected the credential.
    #[error("credential failed semantic rules:\n{0}")]
    Rules(RuleViolations),
}

/// A single schema violation with structured context.
#[derive(Debug, Clone)]
pub struct Violation {
    /// The schema the credential was validated against.
    pub schema_url: String,
    /// JSON Pointer path to the violating field in the credential.
    pub instance_path: String,
    /// Human-readable description of the violation.
    pub message: String,
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.instance_path.is_empty() {
            write!(f, "  [{}] (root): {}", self.schema_url, self.message)
        } else {
            write!(f, "  [{}] {}: {}", self.schema_url, self.instance_path, self.message)
        }
    }
}

/// Collection of schema violations.
#[derive(Debug, Clone)]
pub struct ValidationViolations {
    violations: Vec<Violation>,
}

impl ValidationViolations {
    /// Wrap a collected set of violations.
    pub fn new(violations: Vec<Violation>) -> Self {
        Self { violations }
    }

    /// Returns the number of violations.
    pub fn len(&self) -> usize {
        self.violations.len()
    }

    /// Returns true if there are no violations.
    pub fn is_empty(&self) -> bool {
        self.violations.is_empty()
    }

    /// Returns a slice of all violations.
    pub fn violations(&self) -> &[Violation] {
        &self.violations
    }
}

impl fmt::Display for ValidationViolations {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, v) in self.violations.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "{v}")?;
        }
        Ok(())
    }
}

/// All messages collected from failing custom rules.
#[derive(Debug, Clone)]
pub struct RuleViolations(
    /// The collected messages, in rule order.
    pub Vec<String>,
);

impl fmt::Display for RuleViolations {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, msg) in self.0.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "  {msg}")?;
        }
        Ok(())
    }
}
