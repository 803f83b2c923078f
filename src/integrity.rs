//! Cross-provider response integrity checking.
//!
//! The gateway answers attested RPC calls with an envelope carrying one
//! signed digest per contributing provider. Independent providers answering
//! the same call must agree on the digest; a disagreement signals a
//! potential correctness or security problem and is always surfaced.
//!
//! Signature verification against the attestation identity is out of scope;
//! only digest agreement is checked.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

/// One provider's signed claim about an RPC response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Attestation {
    pub signature: String,
    /// The signed response digest. Agreement is checked on this field.
    #[serde(rename = "msg")]
    pub message: String,
    #[serde(rename = "signatureFormat", default)]
    pub signature_format: Option<String>,
    #[serde(rename = "hashAlgo", default)]
    pub hash_algorithm: Option<String>,
    #[serde(default)]
    pub identity: Option<String>,
}

/// Response envelope returned by the gateway for attested RPC calls.
#[derive(Debug, Clone, Deserialize)]
pub struct AttestedResponse {
    pub id: String,
    pub jsonrpc: String,
    pub result: Value,
    #[serde(default)]
    pub attestations: Vec<Attestation>,
}

impl AttestedResponse {
    /// Check that every attestation on this response agrees.
    pub fn verify(
        &self,
        method: &str,
        params: &Value,
        providers: &[String],
        acceptance_threshold: u32,
    ) -> Result<(), IntegrityError> {
        check_attestations(
            &self.attestations,
            method,
            params,
            providers,
            acceptance_threshold,
        )
    }
}

/// Diagnostic context for a digest disagreement between two providers.
#[derive(Debug, Clone, PartialEq)]
pub struct IntegrityViolation {
    pub method: String,
    pub params: Value,
    pub acceptance_threshold: u32,
    pub providers: Vec<String>,
    pub left_identity: String,
    pub right_identity: String,
    pub left_message: String,
    pub right_message: String,
}

impl fmt::Display for IntegrityViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "the integrity of the RPC request could not be confirmed under the \
             acceptance threshold of {} between the providers {:?}; \
             method: {}, params: {}; \
             message digest {} (from {}) and {} (from {}) are inconsistent",
            self.acceptance_threshold,
            self.providers,
            self.method,
            self.params,
            self.left_message,
            self.left_identity,
            self.right_message,
            self.right_identity,
        )
    }
}

/// Errors raised while checking attestations.
#[derive(Debug, Error)]
pub enum IntegrityError {
    /// Two providers disagree on the response digest.
    #[error("{0}")]
    Mismatch(Box<IntegrityViolation>),

    /// The response carried fewer attestations than the quorum requires.
    #[error("response carried {supplied} attestations, at least {required} required")]
    Insufficient { supplied: usize, required: usize },
}

/// Check that all attestations for one logical request agree on the digest.
///
/// The acceptance threshold is enforced as a minimum attestation count
/// (never below two), and agreement is required pairwise across every
/// supplied attestation. The first disagreeing pair in index order wins.
pub fn check_attestations(
    attestations: &[Attestation],
    method: &str,
    params: &Value,
    providers: &[String],
    acceptance_threshold: u32,
) -> Result<(), IntegrityError> {
    let required = (acceptance_threshold as usize).max(2);
    if attestations.len() < required {
        return Err(IntegrityError::Insufficient {
            supplied: attestations.len(),
            required,
        });
    }

    for i in 0..attestations.len() {
        for j in (i + 1)..attestations.len() {
            if attestations[i].message != attestations[j].message {
                return Err(IntegrityError::Mismatch(Box::new(IntegrityViolation {
                    method: method.to_string(),
                    params: params.clone(),
                    acceptance_threshold,
                    providers: providers.to_vec(),
                    left_identity: identity_of(attestations, providers, i),
                    right_identity: identity_of(attestations, providers, j),
                    left_message: attestations[i].message.clone(),
                    right_message: attestations[j].message.clone(),
                })));
            }
        }
    }

    Ok(())
}

/// Display name for the provider behind attestation `index`: the configured
/// provider list first, the attestation's own identity as fallback.
fn identity_of(attestations: &[Attestation], providers: &[String], index: usize) -> String {
    providers
        .get(index)
        .cloned()
        .or_else(|| attestations[index].identity.clone())
        .unwrap_or_else(|| format!("provider #{}", index + 1))
}
