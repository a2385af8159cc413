use std::marker::PhantomData;

use serde::de::DeserializeOwned;
use tracing::trace;

use crate::error::Result;

/// Turns completed frame payloads into values.
///
/// Each call to [`PayloadDecoder::push`] receives exactly one payload. A
/// payload may hold zero or more whitespace-separated JSON values; all of them
/// are returned in order. A payload that fails to parse yields one error and
/// leaves the decoder ready for the next payload.
#[derive(Debug)]
pub struct PayloadDecoder<T> {
    values: u64,
    failures: u64,
    finished: bool,
    _marker: PhantomData<fn() -> T>,
}

impl<T: DeserializeOwned> PayloadDecoder<T> {
    pub fn new() -> Self {
        Self {
            values: 0,
            failures: 0,
            finished: false,
            _marker: PhantomData,
        }
    }

    /// Decode one complete payload.
    pub fn push(&mut self, payload: &[u8]) -> Vec<Result<T>> {
        if self.finished {
            trace!(len = payload.len(), "payload after end of input ignored");
            return Vec::new();
        }

        let mut out = Vec::new();
        for item in serde_json::Deserializer::from_slice(payload).into_iter::<T>() {
            match item {
                Ok(value) => {
                    self.values += 1;
                    out.push(Ok(value));
                }
                Err(err) => {
                    self.failures += 1;
                    out.push(Err(err.into()));
                    break;
                }
            }
        }
        out
    }

    /// End of input: no further payloads will be accepted.
    pub fn finish(&mut self) {
        self.finished = true;
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }

    /// Values decoded so far.
    pub fn values_decoded(&self) -> u64 {
        self.values
    }

    /// Payloads that failed to parse so far.
    pub fn failures(&self) -> u64 {
        self.failures
    }
}

impl<T: DeserializeOwned> Default for PayloadDecoder<T> {
    fn default() -> Self {
        Self::new()
    }
}
