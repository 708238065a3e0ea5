//! Built-in timestamp extension (type code `-1`).
//!
//! ```text
//! timestamp 32: fixext4  | seconds: u32
//! timestamp 64: fixext8  | nanoseconds: 30 bits | seconds: 34 bits
//! timestamp 96: ext8(12) | nanoseconds: u32     | seconds: i64
//! ```

use std::time::{Duration, SystemTime, UNIX_EPOCH};

use super::decode::{Decode, Decoder};
use super::encode::{Encode, Encoder};
use super::ext::ExtensionType;
use super::{Error, Result};

const NANOS_PER_SEC: u32 = 1_000_000_000;
const SECONDS_34_BIT_MASK: u64 = (1 << 34) - 1;

/// Point in time relative to the Unix epoch
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Timestamp {
    seconds: i64,
    nanoseconds: u32,
}

impl Timestamp {
    /// Create a timestamp
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidArgument`] if `nanoseconds` is not below one second.
    pub fn new(seconds: i64, nanoseconds: u32) -> Result<Self> {
        if nanoseconds >= NANOS_PER_SEC {
            return Err(Error::invalid_argument(format!(
                "nanoseconds {nanoseconds} out of range"
            )));
        }
        Ok(Self {
            seconds,
            nanoseconds,
        })
    }

    /// Whole seconds since the epoch (negative before it)
    #[must_use]
    pub const fn seconds(&self) -> i64 {
        self.seconds
    }

    /// Sub-second part, always below one second
    #[must_use]
    pub const fn nanoseconds(&self) -> u32 {
        self.nanoseconds
    }

    /// Convert to [`SystemTime`]
    #[must_use]
    pub fn to_system_time(&self) -> SystemTime {
        let nanos = Duration::from_nanos(u64::from(self.nanoseconds));
        if self.seconds >= 0 {
            UNIX_EPOCH + Duration::from_secs(self.seconds.unsigned_abs()) + nanos
        } else {
            UNIX_EPOCH - Duration::from_secs(self.seconds.unsigned_abs()) + nanos
        }
    }
}

impl From<SystemTime> for Timestamp {
    #[allow(clippy::cast_possible_wrap)]
    fn from(time: SystemTime) -> Self {
        match time.duration_since(UNIX_EPOCH) {
            Ok(after) => Self {
                seconds: after.as_secs() as i64,
                nanoseconds: after.subsec_nanos(),
            },
            Err(err) => {
                let before = err.duration();
                let mut seconds = -(before.as_secs() as i64);
                let mut nanoseconds = before.subsec_nanos();
                if nanoseconds > 0 {
                    seconds -= 1;
                    nanoseconds = NANOS_PER_SEC - nanoseconds;
                }
                Self {
                    seconds,
                    nanoseconds,
                }
            }
        }
    }
}

impl ExtensionType for Timestamp {
    const TYPE_CODE: i8 = -1;

    fn payload_len(&self) -> usize {
        if self.seconds >> 34 == 0 {
            if self.nanoseconds == 0 && u32::try_from(self.seconds).is_ok() {
                4
            } else {
                8
            }
        } else {
            12
        }
    }

    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    fn write_payload(&self, out: &mut [u8]) {
        match out.len() {
            4 => out.copy_from_slice(&(self.seconds as u32).to_be_bytes()),
            8 => {
                let packed = (u64::from(self.nanoseconds) << 34) | self.seconds as u64;
                out.copy_from_slice(&packed.to_be_bytes());
            }
            _ => {
                out[..4].copy_from_slice(&self.nanoseconds.to_be_bytes());
                out[4..].copy_from_slice(&self.seconds.to_be_bytes());
            }
        }
    }

    #[allow(clippy::cast_possible_truncation, clippy::cast_possible_wrap)]
    fn from_payload(payload: &[u8]) -> Result<Self> {
        let (seconds, nanoseconds) = match payload.len() {
            4 => {
                let mut raw = [0u8; 4];
                raw.copy_from_slice(payload);
                (i64::from(u32::from_be_bytes(raw)), 0)
            }
            8 => {
                let mut raw = [0u8; 8];
                raw.copy_from_slice(payload);
                let packed = u64::from_be_bytes(raw);
                ((packed & SECONDS_34_BIT_MASK) as i64, (packed >> 34) as u32)
            }
            12 => {
                let mut nanos = [0u8; 4];
                let mut secs = [0u8; 8];
                nanos.copy_from_slice(&payload[..4]);
                secs.copy_from_slice(&payload[4..]);
                (i64::from_be_bytes(secs), u32::from_be_bytes(nanos))
            }
            len => {
                return Err(Error::malformed(
                    Self::TYPE_CODE,
                    format!("timestamp payload must be 4, 8 or 12 bytes, got {len}"),
                ));
            }
        };
        if nanoseconds >= NANOS_PER_SEC {
            return Err(Error::malformed(
                Self::TYPE_CODE,
                format!("nanoseconds {nanoseconds} out of range"),
            ));
        }
        Ok(Self {
            seconds,
            nanoseconds,
        })
    }
}

impl Encode for Timestamp {
    fn encode(&self, enc: &mut Encoder<'_>) -> Result<()> {
        enc.write_extension(self)
    }
}

impl Decode for Timestamp {
    fn decode(&mut self, dec: &mut Decoder<'_>) -> Result<()> {
        if dec.try_read_nil()? {
            *self = Self::default();
            return Ok(());
        }
        *self = dec.read_extension::<Self>()?;
        Ok(())
    }
}

impl Encode for SystemTime {
    fn encode(&self, enc: &mut Encoder<'_>) -> Result<()> {
        enc.write_extension(&Timestamp::from(*self))
    }
}
