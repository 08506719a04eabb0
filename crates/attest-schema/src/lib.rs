#![deny(missing_docs)]

//! # attest-schema — Remote Credential-Schema Validation
//!
//! Validates credentials against externally supplied JSON Schemas:
//! fetches schema documents through an injected network collaborator
//! under a caller-supplied timeout, caches raw documents and compiled
//! validators independently (both bounded), and runs an ordered list of
//! semantic rules after schema validation.
//!
//! ## Trust Boundary
//!
//! Schema references arrive from untrusted credentials. The validator
//! type must sit in a fixed allow-list before anything is fetched, and
//! strict mode meta-validates the fetched document before compiling it.

pub mod cache;
pub mod error;
pub mod fetch;
pub mod rules;
pub mod validator;

pub use cache::{BoundedCache, CacheConfig};
pub use error::{RuleViolations, SchemaError, ValidationViolations, Violation};
pub use fetch::{HttpSchemaFetcher, SchemaFetcher};
pub use rules::{
    CustomRule, ExpirationNotPastRule, IssuanceDatePresentRule, IssuerUrlRule, RuleContext,
    RuleOutcome,
};
pub use validator::{SchemaRef, SchemaValidator, ValidationOptions, SUPPORTED_SCHEMA_TYPES};
