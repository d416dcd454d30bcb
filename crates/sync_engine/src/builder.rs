//! Runtime construction from a [`SyncBlueprint`].
//!
//! Every configured stream becomes a [`PolicyArray`] of `sub_streams`
//! [`DynPolicy`] members sharing the stream's retrieval strategy, history
//! window and attribute. Streams are addressed by name; names and sub ids
//! come from external data, so they are checked and reported as errors
//! instead of panicking.

use contracts::{
    Attribute, ContractError, PivotStrategy, PushStatus, StreamConfig, SyncBlueprint, Timestamp,
};
use nalgebra::DVector;
use tracing::info;

use crate::interpolation::Interpolate;
use crate::policy::{DynPolicy, Retrieval};
use crate::policy_array::PolicyArray;
use crate::storage::TimeIndexedStorage;
use crate::synchronizer::Synchronizer;

/// Outputs of one configured stream: one slot per sub-stream.
pub type StreamOutputs<M> = Vec<Option<M>>;

type Streams<M> = Vec<PolicyArray<DynPolicy<M>>>;

#[derive(Debug, Clone)]
struct StreamMeta {
    name: String,
    sub_streams: usize,
    dimension: usize,
}

/// Synchronizer assembled from configuration.
pub struct ConfiguredSynchronizer<M: Interpolate + Clone> {
    inner: Synchronizer<Streams<M>>,
    streams: Vec<StreamMeta>,
}

fn build_stream<M: Interpolate + Clone>(config: &StreamConfig) -> PolicyArray<DynPolicy<M>> {
    let retrieval = Retrieval::from(config.retrieval);
    PolicyArray::from_fn(config.sub_streams, |_| {
        DynPolicy::with_storage(retrieval, TimeIndexedStorage::new(config.history_window()))
            .with_attribute(config.attribute)
    })
}

impl<M: Interpolate + Clone> ConfiguredSynchronizer<M> {
    /// Build from a blueprint.
    ///
    /// Only structural problems that would make the synchronizer unusable are
    /// rejected here; field-level validation belongs to the config loader.
    pub fn from_blueprint(blueprint: &SyncBlueprint) -> Result<Self, ContractError> {
        if blueprint.streams.is_empty() {
            return Err(ContractError::config_validation(
                "streams",
                "at least one stream is required",
            ));
        }
        if let Some(config) = blueprint.streams.iter().find(|s| s.sub_streams == 0) {
            return Err(ContractError::config_validation(
                format!("streams.{}.sub_streams", config.name),
                "must be at least 1",
            ));
        }
        if blueprint.synchronizer == PivotStrategy::MasterSlave
            && !blueprint
                .streams
                .iter()
                .any(|s| s.attribute == Attribute::Master)
        {
            return Err(ContractError::config_validation(
                "streams",
                "master_slave mode requires a master stream",
            ));
        }

        let participants: Streams<M> = blueprint.streams.iter().map(build_stream).collect();
        let streams = blueprint
            .streams
            .iter()
            .map(|s| StreamMeta {
                name: s.name.clone(),
                sub_streams: s.sub_streams,
                dimension: s.dimension,
            })
            .collect();

        info!(
            mode = blueprint.synchronizer.name(),
            streams = blueprint.streams.len(),
            policies = blueprint.policy_count(),
            "Synchronizer built from blueprint"
        );

        Ok(Self {
            inner: Synchronizer::new(blueprint.synchronizer, participants),
            streams,
        })
    }

    /// Replace the emission callback. Outputs are in blueprint stream order.
    pub fn register_callback<F>(&mut self, callback: F)
    where
        F: FnMut(Timestamp, Vec<StreamOutputs<M>>) + Send + 'static,
    {
        self.inner.register_callback(callback);
    }

    pub fn clear_callback(&mut self) {
        self.inner.clear_callback();
    }

    /// Position of the stream called `name`.
    pub fn stream_index(&self, name: &str) -> Result<usize, ContractError> {
        self.streams
            .iter()
            .position(|s| s.name == name)
            .ok_or_else(|| ContractError::unknown_stream(name))
    }

    fn check_sub_id(&self, index: usize, sub_id: usize) -> Result<(), ContractError> {
        let meta = &self.streams[index];
        if sub_id >= meta.sub_streams {
            return Err(ContractError::UnknownSubStream {
                stream: meta.name.clone(),
                sub_id,
                available: meta.sub_streams,
            });
        }
        Ok(())
    }

    /// Push `msg` into sub-stream `sub_id` of the stream called `stream`.
    ///
    /// Dynamically sized payloads must match the stream's configured
    /// dimension.
    pub fn push(
        &mut self,
        stream: &str,
        sub_id: usize,
        time: Timestamp,
        msg: M,
    ) -> Result<PushStatus, ContractError> {
        let index = self.stream_index(stream)?;
        self.check_sub_id(index, sub_id)?;
        if let Some(actual) = msg.width() {
            let expected = self.streams[index].dimension;
            if actual != expected {
                return Err(ContractError::PayloadShape {
                    stream: stream.to_string(),
                    expected,
                    actual,
                });
            }
        }
        Ok(self.inner.push_at(index, time, (msg, sub_id)))
    }

    pub fn stream_names(&self) -> impl ExactSizeIterator<Item = &str> + '_ {
        self.streams.iter().map(|s| s.name.as_str())
    }

    /// Configured payload width of stream `index`.
    pub fn dimension(&self, index: usize) -> Option<usize> {
        self.streams.get(index).map(|s| s.dimension)
    }

    pub fn queue_size(&self, stream: &str) -> Result<usize, ContractError> {
        let index = self.stream_index(stream)?;
        Ok(self.inner.queue_size(index))
    }

    pub fn sub_queue_size(&self, stream: &str, sub_id: usize) -> Result<usize, ContractError> {
        let index = self.stream_index(stream)?;
        self.check_sub_id(index, sub_id)?;
        Ok(self.inner.sub_queue_size(index, sub_id))
    }

    pub fn time_pivot(&self) -> Timestamp {
        self.inner.time_pivot()
    }

    pub fn emitted_count(&self) -> u64 {
        self.inner.emitted_count()
    }

    pub fn strategy(&self) -> PivotStrategy {
        self.inner.strategy()
    }

    pub fn inner(&self) -> &Synchronizer<Streams<M>> {
        &self.inner
    }
}

impl ConfiguredSynchronizer<DVector<f64>> {
    /// [`push`](Self::push) for raw values, e.g. replayed trace records.
    pub fn push_values(
        &mut self,
        stream: &str,
        sub_id: usize,
        time: Timestamp,
        values: Vec<f64>,
    ) -> Result<PushStatus, ContractError> {
        self.push(stream, sub_id, time, DVector::from_vec(values))
    }
}
