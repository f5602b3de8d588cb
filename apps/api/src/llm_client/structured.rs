//! Structured inference: the contract between the matching core and whatever
//! generative model sits behind it.
//!
//! A caller names the shape it wants (`OutputSchema`), the provider returns raw JSON,
//! and `infer_structured` turns that into either a validated typed value or an
//! `InferenceError`. Nothing half-parsed ever escapes this module.

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde_json::Value;
use thiserror::Error;

use super::LlmError;

/// The "unavailable" signal: transport, provider or schema failure.
#[derive(Debug, Error)]
pub enum InferenceError {
    #[error("provider call failed: {0}")]
    Provider(#[from] LlmError),

    #[error("output for `{schema}` did not match the requested shape: {reason}")]
    InvalidOutput { schema: &'static str, reason: String },
}

/// A named JSON shape the model must answer in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OutputSchema {
    pub name: &'static str,
    /// Example JSON object, embedded verbatim into the prompt.
    pub shape: &'static str,
}

#[derive(Debug, Clone, Copy)]
pub struct InferenceRequest<'a> {
    pub system: &'a str,
    pub prompt: &'a str,
    pub schema: &'a OutputSchema,
}

/// Request/response capability backed by an external model.
/// Every call is fallible and potentially slow.
#[async_trait]
pub trait InferenceProvider: Send + Sync {
    async fn infer(&self, request: InferenceRequest<'_>) -> Result<Value, InferenceError>;
}

/// A typed result that can be requested from an `InferenceProvider`.
pub trait StructuredOutput: DeserializeOwned + Send {
    const SCHEMA: OutputSchema;

    /// Bound checks serde cannot express (ranges, non-finite numbers).
    fn validate(&self) -> Result<(), String>;
}

/// Calls the provider once and returns a validated `T`, or the reason it could not.
pub async fn infer_structured<T: StructuredOutput>(
    provider: &dyn InferenceProvider,
    system: &str,
    prompt: &str,
) -> Result<T, InferenceError> {
    let schema = T::SCHEMA;
    let value = provider
        .infer(InferenceRequest {
            system,
            prompt,
            schema: &schema,
        })
        .await?;

    let output: T = serde_json::from_value(value).map_err(|e| InferenceError::InvalidOutput {
        schema: schema.name,
        reason: e.to_string(),
    })?;

    output
        .validate()
        .map_err(|reason| InferenceError::InvalidOutput {
            schema: schema.name,
            reason,
        })?;

    Ok(output)
}

/// Checks that a model-reported percentage is finite and within [0, 100].
pub fn check_percentage(field: &str, value: f64) -> Result<(), String> {
    if value.is_finite() && (0.0..=100.0).contains(&value) {
        Ok(())
    } else {
        Err(format!("{field} must be within [0, 100], got {value}"))
    }
}
