//! Async transform engine

use hyperweave_core::{
    CallOptions, DEFAULT_VARIANT, DataShape, DeserializeCall, Document, PrimaryData, Registry,
    ResourceTarget, Result, SerializeCall,
};
use serde_json::Value;
use std::sync::Arc;

use crate::scheduler::{Cadence, Scheduler, TokioScheduler, YieldPolicy};

/// Serializes and deserializes against a shared registry, yielding to the
/// scheduler between top-level records
#[derive(Debug, Clone)]
pub struct AsyncTransformer<S = TokioScheduler> {
    registry: Arc<Registry>,
    scheduler: S,
    policy: YieldPolicy,
}

impl AsyncTransformer<TokioScheduler> {
    /// Create a transformer that yields through tokio
    pub fn new(registry: Arc<Registry>) -> Self {
        Self::with_scheduler(registry, TokioScheduler)
    }
}

impl<S: Scheduler> AsyncTransformer<S> {
    /// Create a transformer with a custom scheduler
    pub fn with_scheduler(registry: Arc<Registry>, scheduler: S) -> Self {
        Self {
            registry,
            scheduler,
            policy: YieldPolicy::default(),
        }
    }

    /// Set the yield cadence
    pub fn with_policy(mut self, policy: YieldPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// The registry this transformer reads from
    pub fn registry(&self) -> &Arc<Registry> {
        &self.registry
    }

    /// Serialize `data` into a document.
    ///
    /// Yields after every `policy.every` top-level records and once more
    /// before the document is assembled.
    pub async fn serialize(
        &self,
        target: impl Into<ResourceTarget>,
        data: &Value,
        options: impl Into<CallOptions>,
    ) -> Result<Document> {
        let target = target.into();
        let options = options.into();
        let mut call = SerializeCall::new(&self.registry, &target, &options)?;
        let mut cadence = Cadence::new(self.policy);

        let primary = match DataShape::of(data) {
            DataShape::Empty => PrimaryData::Null,
            DataShape::One(record) => match call.resource(record)? {
                Some(resource) => PrimaryData::One(Box::new(resource)),
                None => PrimaryData::Null,
            },
            DataShape::Many(records) => {
                let mut resources = Vec::with_capacity(records.len());
                for record in records {
                    resources.extend(call.resource(record)?);
                    if cadence.tick() {
                        self.scheduler.yield_now().await;
                    }
                }
                PrimaryData::Many(resources)
            }
        };

        tracing::trace!(included = call.included_len(), "finalizing document");
        self.scheduler.yield_now().await;
        Ok(call.finish(data, primary))
    }

    /// Deserialize a document's primary data, yielding like [`serialize`](Self::serialize)
    pub async fn deserialize(
        &self,
        target: impl Into<ResourceTarget>,
        document: &Document,
        variant: Option<&str>,
    ) -> Result<Value> {
        let target = target.into();
        let call = DeserializeCall::new(
            &self.registry,
            &target,
            variant.unwrap_or(DEFAULT_VARIANT),
            document,
        )?;
        let mut cadence = Cadence::new(self.policy);

        let value = match &document.data {
            PrimaryData::Null => Value::Null,
            PrimaryData::One(resource) => call.resource(resource)?,
            PrimaryData::Many(resources) => {
                let mut records = Vec::with_capacity(resources.len());
                for resource in resources {
                    records.push(call.resource(resource)?);
                    if cadence.tick() {
                        self.scheduler.yield_now().await;
                    }
                }
                Value::Array(records)
            }
        };

        self.scheduler.yield_now().await;
        Ok(value)
    }
}
