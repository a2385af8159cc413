//! JSON messages over length-prefixed frames.
//!
//! The frame layer only knows byte boundaries. This crate is the payload side
//! of the contract: values are serialized to one self-contained JSON document
//! per frame, and each completed payload is parsed back into zero or more
//! values, in order.

pub mod error;
pub mod message;
pub mod payload;
pub mod reader;
pub mod stream;
pub mod writer;

pub use error::{JsonFrameError, Result};
pub use message::{encode_message, serialize_message, MessagePolicy};
pub use payload::PayloadDecoder;
pub use reader::JsonReader;
pub use stream::JsonStream;
pub use writer::JsonWriter;
