use crate::estimation::{DEFAULT_EFFORT_TARGETS, MetricGroups};
use anyhow::{Context, Result};
use schemars::{JsonSchema, Schema, schema_for};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use strum::{EnumMessage, IntoEnumIterator};
use strum_macros::{Display, EnumDiscriminants, EnumIter, EnumMessage, EnumString, IntoStaticStr};

fn default_n() -> usize {
    2
}

fn default_effort_targets() -> Vec<f64> {
    DEFAULT_EFFORT_TARGETS.to_vec()
}

/// Contract for a tagged `{"type": ..., "params": ...}` configuration enum.
pub trait Choice: Sized + Serialize + DeserializeOwned + JsonSchema {
    type Kind: Copy + Into<&'static str> + EnumMessage + IntoEnumIterator;

    /// JSON Schema for the whole tagged enum.
    fn schema() -> Schema;

    /// Default `params` JSON for a given kind, `Value::Null` for kinds without
    /// parameters.
    fn default_params(kind: Self::Kind) -> Value;

    /// Build the typed enum from kind + params.
    fn from_parts(kind: Self::Kind, params: Value) -> Result<Self> {
        let key: &'static str = kind.into();
        let v = if params.is_null() {
            json!({ "type": key })
        } else {
            json!({ "type": key, "params": params })
        };
        serde_json::from_value(v).with_context(|| format!("invalid parameters for '{key}'"))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, EnumDiscriminants, PartialEq)]
#[serde(tag = "type", content = "params", rename_all = "kebab-case")]
#[strum_discriminants(name(RetrievalKind))]
#[strum_discriminants(derive(EnumIter, EnumString, Display, IntoStaticStr, EnumMessage))]
#[strum_discriminants(strum(serialize_all = "kebab-case"))]
pub enum RetrievalChoice {
    #[serde(rename = "n-gram")]
    #[strum_discriminants(strum(
        serialize = "n-gram",
        message = "N-gram",
        detailed_message = "Every window of n consecutive activities is one species."
    ))]
    NGram(NGramParameters),

    #[strum_discriminants(strum(
        message = "Trace variant",
        detailed_message = "The whole activity sequence of a trace is one species."
    ))]
    TraceVariant,

    #[strum_discriminants(strum(
        message = "Activity",
        detailed_message = "Every single activity is one species."
    ))]
    Activity,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct NGramParameters {
    #[serde(default = "default_n")]
    #[schemars(
        title = "Window width",
        description = "Number of consecutive activities forming one species",
        default = "default_n",
        range(min = 1)
    )]
    pub n: usize,
}

impl Default for NGramParameters {
    fn default() -> Self {
        Self { n: default_n() }
    }
}

impl Choice for RetrievalChoice {
    type Kind = RetrievalKind;

    fn schema() -> Schema {
        schema_for!(RetrievalChoice)
    }

    fn default_params(kind: Self::Kind) -> Value {
        match kind {
            RetrievalKind::NGram => json!({ "n": default_n() }),
            RetrievalKind::TraceVariant | RetrievalKind::Activity => Value::Null,
        }
    }
}

/// Construction parameters of one species estimator.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct EstimatorParams {
    #[schemars(title = "Retrieval", description = "How species are read off a trace")]
    pub retrieval: RetrievalChoice,

    #[schemars(
        title = "Step Size",
        description = "Record a checkpoint every N samples",
        range(min = 1)
    )]
    pub step_size: u64,

    #[serde(default = "default_effort_targets")]
    #[schemars(
        title = "Completeness Targets",
        description = "Completeness levels in (0, 1) for which sampling effort is estimated",
        default = "default_effort_targets"
    )]
    pub effort_targets: Vec<f64>,

    #[serde(default)]
    #[schemars(
        title = "Metric Groups",
        description = "Metric groups to compute at each checkpoint (default: all)"
    )]
    pub metric_groups: MetricGroups,
}

impl EstimatorParams {
    pub fn from_json(s: &str) -> Result<Self> {
        serde_json::from_str(s).context("failed to parse estimator parameters")
    }

    pub fn schema() -> Schema {
        schema_for!(EstimatorParams)
    }
}

/// Parameters of a bootstrap profiling run.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct BootstrapParams {
    pub estimator: EstimatorParams,

    #[schemars(
        title = "Replicates",
        description = "Number of resampled runs",
        range(min = 1)
    )]
    pub replicates: usize,

    #[serde(default)]
    #[schemars(title = "Seed", description = "Master seed for resampling")]
    pub seed: u64,

    #[serde(default)]
    #[schemars(
        title = "Workers",
        description = "Worker threads (None = available parallelism)"
    )]
    pub workers: Option<usize>,
}

impl BootstrapParams {
    pub fn from_json(s: &str) -> Result<Self> {
        serde_json::from_str(s).context("failed to parse bootstrap parameters")
    }
}
