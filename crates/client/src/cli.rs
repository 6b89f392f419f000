//! Command-line arguments of `datactl`.

use clap::Parser;
use common::Method;
use entity_store::MergeStrategy;
use normalizer::NormalizerSpec;

use crate::{ClientError, Result};
use orchestrator::RequestIntent;

/// Send one request through the entity cache and print the resulting state.
#[derive(Debug, Parser)]
#[command(name = "datactl", version, about)]
pub struct Cli {
    /// HTTP method: GET, POST, PUT, PATCH or DELETE.
    pub method: Method,

    /// API path, e.g. `bookings` or `offerers/o1`.
    pub path: String,

    /// Collection the payload is stored in (default: first path segment).
    #[arg(long)]
    pub key: Option<String>,

    /// JSON request body.
    #[arg(long)]
    pub body: Option<String>,

    /// Extract an embedded field into a collection, as `field=collection`.
    #[arg(long = "normalize", value_name = "FIELD=COLLECTION")]
    pub normalize: Vec<String>,

    /// JSON normalizer spec; takes precedence over `--normalize`.
    #[arg(long, conflicts_with = "normalize")]
    pub normalizer: Option<String>,

    /// Merge strategy: replace, by-id or by-position.
    #[arg(long, default_value_t = MergeStrategy::ReplaceCollection)]
    pub merge: MergeStrategy,

    /// Token slot attached to the request (default: the configured token type
    /// when a token is configured).
    #[arg(long)]
    pub token_type: Option<String>,

    /// Print Prometheus metrics after the request.
    #[arg(long)]
    pub metrics: bool,
}

impl Cli {
    /// Builds the request intent described by the arguments.
    pub fn to_intent(&self, default_token_type: Option<&str>) -> Result<RequestIntent> {
        let mut intent = RequestIntent::new(self.method, self.path.clone())
            .merge(self.merge)
            .normalizer(self.normalizer_spec()?);

        if let Some(key) = &self.key {
            intent = intent.key(key.clone());
        }
        if let Some(body) = &self.body {
            intent = intent.body(serde_json::from_str(body)?);
        }
        if let Some(token_type) = self.token_type.as_deref().or(default_token_type) {
            intent = intent.token_type(token_type);
        }
        Ok(intent)
    }

    fn normalizer_spec(&self) -> Result<NormalizerSpec> {
        if let Some(raw) = &self.normalizer {
            let value: serde_json::Value = serde_json::from_str(raw)?;
            return Ok(NormalizerSpec::from_value(&value)?);
        }

        self.normalize
            .iter()
            .try_fold(NormalizerSpec::new(), |spec, rule| {
                let (field, collection) = parse_rule(rule)?;
                Ok(spec.field(field, collection))
            })
    }
}

/// Splits `field=collection`.
pub fn parse_rule(rule: &str) -> Result<(&str, &str)> {
    match rule.split_once('=') {
        Some((field, collection)) if !field.trim().is_empty() && !collection.trim().is_empty() => {
            Ok((field.trim(), collection.trim()))
        }
        _ => Err(ClientError::InvalidArgument(format!(
            "expected FIELD=COLLECTION, got {rule:?}"
        ))),
    }
}
