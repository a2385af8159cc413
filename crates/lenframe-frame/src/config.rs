use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use bytes::Buf;

use crate::error::{FrameError, Result};

/// Widest supported length prefix. Lengths are decoded into a `u64`.
pub const MAX_PREFIX_WIDTH: usize = 8;

/// Prefix width used when none is configured.
pub const DEFAULT_PREFIX_WIDTH: usize = 4;

/// Default maximum payload size accepted by decoders and writers: 16 MiB.
pub const DEFAULT_MAX_PAYLOAD: u64 = 16 * 1024 * 1024;

/// Number of bytes used to encode a frame's payload length, big-endian.
///
/// Always in `1..=MAX_PREFIX_WIDTH`; both peers must agree on it out of band.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PrefixWidth(u8);

impl PrefixWidth {
    /// The conventional 4-byte prefix.
    pub const DEFAULT: PrefixWidth = PrefixWidth(DEFAULT_PREFIX_WIDTH as u8);

    /// Validate a prefix width.
    pub fn new(width: usize) -> Result<Self> {
        if width == 0 || width > MAX_PREFIX_WIDTH {
            return Err(FrameError::InvalidConfiguration(format!(
                "prefix width must be between 1 and {MAX_PREFIX_WIDTH} bytes, got {width}"
            )));
        }
        Ok(Self(width as u8))
    }

    /// Width in bytes.
    pub fn get(self) -> usize {
        usize::from(self.0)
    }

    /// Largest payload length this width can represent: `2^(8*width) - 1`.
    pub fn max_len(self) -> u64 {
        if self.get() == MAX_PREFIX_WIDTH {
            u64::MAX
        } else {
            (1u64 << (8 * self.get())) - 1
        }
    }

    /// Decode a complete big-endian prefix.
    ///
    /// `prefix` must hold exactly `self.get()` bytes.
    pub(crate) fn decode(self, mut prefix: &[u8]) -> u64 {
        debug_assert_eq!(prefix.len(), self.get());
        prefix.get_uint(self.get())
    }
}

impl Default for PrefixWidth {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl fmt::Display for PrefixWidth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<usize> for PrefixWidth {
    type Error = FrameError;

    fn try_from(width: usize) -> Result<Self> {
        Self::new(width)
    }
}

impl FromStr for PrefixWidth {
    type Err = FrameError;

    fn from_str(input: &str) -> Result<Self> {
        let width = input.trim().parse::<usize>().map_err(|_| {
            FrameError::InvalidConfiguration(format!("prefix width is not a number: {input:?}"))
        })?;
        Self::new(width)
    }
}

/// Configuration shared by decoders, readers and writers.
#[derive(Debug, Clone)]
pub struct FrameConfig {
    /// Length prefix width. Default: 4 bytes.
    pub prefix_width: PrefixWidth,
    /// Maximum payload size in bytes. Default: 16 MiB.
    ///
    /// Inbound frames declaring more are skipped and reported; outbound
    /// payloads above it are refused.
    pub max_payload_size: u64,
    /// Read timeout for blocking operations.
    pub read_timeout: Option<Duration>,
    /// Write timeout for blocking operations.
    pub write_timeout: Option<Duration>,
}

impl FrameConfig {
    /// Default configuration with a different prefix width.
    pub fn with_prefix_width(width: usize) -> Result<Self> {
        Ok(Self {
            prefix_width: PrefixWidth::new(width)?,
            ..Self::default()
        })
    }

    /// Reject configurations no frame could satisfy.
    pub fn validate(&self) -> Result<()> {
        if self.max_payload_size == 0 {
            return Err(FrameError::InvalidConfiguration(
                "max payload size must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }

    /// The payload limit actually enforced: the configured maximum clamped to
    /// what the prefix can express.
    pub fn effective_max_payload(&self) -> u64 {
        self.max_payload_size.min(self.prefix_width.max_len())
    }
}

impl Default for FrameConfig {
    fn default() -> Self {
        Self {
            prefix_width: PrefixWidth::DEFAULT,
            max_payload_size: DEFAULT_MAX_PAYLOAD,
            read_timeout: None,
            write_timeout: None,
        }
    }
}
