//! # Custom Semantic Rules
//!
//! An ordered list of predicate objects run after schema validation.
//! Each rule inspects the credential and reports every problem it
//! finds; the validator aggregates all messages across all rules.
//!
//! The three built-in reference rules cover what a JSON Schema cannot
//! express: dates compared against the injected clock, and issuer
//! resolvability.

use serde_json::Value;
use url::Url;

use attest_core::Timestamp;

/// Context shared by every rule in one validation pass.
#[derive(Debug, Clone, Copy)]
pub struct RuleContext {
    /// The current time, from the validator's injected clock.
    pub now: Timestamp,
}

/// The result of one rule evaluation.
#[derive(Debug, Clone)]
pub struct RuleOutcome {
    /// Whether the rule passed.
    pub is_valid: bool,
    /// Every problem the rule found.
    pub errors: Vec<String>,
}

impl RuleOutcome {
    /// A passing outcome.
    pub fn ok() -> Self {
        Self {
            is_valid: true,
            errors: Vec::new(),
        }
    }

    /// A failing outcome with the collected messages.
    pub fn fail(errors: Vec<String>) -> Self {
        Self {
            is_valid: false,
            errors,
        }
    }
}

/// A semantic predicate over a credential.
pub trait CustomRule: Send + Sync {
    /// Short rule name, used in log output.
    fn name(&self) -> &'static str;

    /// Evaluate the credential.
    fn evaluate(&self, credential: &Value, ctx: &RuleContext) -> RuleOutcome;
}

fn date_field<'a>(credential: &'a Value, fields: &[&'a str]) -> Option<(&'a str, String)> {
    fields.iter().find_map(|f| {
        credential
            .get(*f)
            .and_then(Value::as_str)
            .map(|v| (*f, v.to_string()))
    })
}

/// Issuance date must be present, parseable, and not in the future.
pub struct IssuanceDatePresentRule;

impl CustomRule for IssuanceDatePresentRule {
    fn name(&self) -> &'static str {
        "issuance-date-present"
    }

    fn evaluate(&self, credential: &Value, ctx: &RuleContext) -> RuleOutcome {
        let Some((field, raw)) = date_field(credential, &["issuanceDate", "validFrom"]) else {
            return RuleOutcome::fail(vec!["issuance date missing".to_string()]);
        };
        match Timestamp::parse(&raw) {
            None => RuleOutcome::fail(vec![format!("{field} \"{raw}\" is not a valid date")]),
            Some(issued) if issued > ctx.now => {
                RuleOutcome::fail(vec![format!("{field} \"{raw}\" is in the future")])
            }
            Some(_) => RuleOutcome::ok(),
        }
    }
}

/// Expiration date, when present, must not lie in the past.
pub struct ExpirationNotPastRule;

impl CustomRule for ExpirationNotPastRule {
    fn name(&self) -> &'static str {
        "expiration-not-past"
    }

    fn evaluate(&self, credential: &Value, ctx: &RuleContext) -> RuleOutcome {
        let Some((field, raw)) =
            date_field(credential, &["expirationDate", "validUntil", "expires"])
        else {
            return RuleOutcome::ok();
        };
        match Timestamp::parse(&raw) {
            None => RuleOutcome::fail(vec![format!("{field} \"{raw}\" is not a valid date")]),
            Some(expires) if expires < ctx.now => {
                RuleOutcome::fail(vec![format!("{field} \"{raw}\" is in the past")])
            }
            Some(_) => RuleOutcome::ok(),
        }
    }
}

/// Issuer must be present and resolvable to a valid URL — either a
/// plain string or an object carrying `id`.
pub struct IssuerUrlRule;

impl CustomRule for IssuerUrlRule {
    fn name(&self) -> &'static str {
        "issuer-url"
    }

    fn evaluate(&self, credential: &Value, _ctx: &RuleContext) -> RuleOutcome {
        let issuer = match credential.get("issuer") {
            None => return RuleOutcome::fail(vec!["issuer missing".to_string()]),
            Some(Value::String(s)) => s.clone(),
            Some(Value::Object(obj)) => match obj.get("id").and_then(Value::as_str) {
                Some(id) => id.to_string(),
                None => {
                    return RuleOutcome::fail(vec!["issuer object has no id".to_string()]);
                }
            },
            Some(_) => {
                return RuleOutcome::fail(vec![
                    "issuer must be a string or an object with an id".to_string(),
                ]);
            }
        };
        if Url::parse(&issuer).is_err() {
            return RuleOutcome::fail(vec![format!("issuer \"{issuer}\" is not a valid URL")]);
        }
        RuleOutcome::ok()
    }
}
