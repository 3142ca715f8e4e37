use std::fmt;
use std::hash::Hasher;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use data_encoding::BASE32_DNSSEC;
use err_derive::Error;
use hex_slice::AsHex;
use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use siphasher::sip::SipHasher24;

use crate::ids::Id;

const STAMP_LEN: usize = 8;

/// Sixteen bytes: a big-endian nanosecond timestamp followed by eight
/// random bytes. The textual form is lowercase base32hex, so it sorts the
/// same way as the bytes do.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct UntypedId {
    val: [u8; 16],
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IdParseError {
    #[error(display = "Invalid prefix")]
    InvalidPrefix,
    #[error(display = "Unparseable Id")]
    Unparseable,
}

impl UntypedId {
    pub(crate) fn from_parts(stamp: u64, random: u64) -> Self {
        let mut val = [0u8; 16];
        val[..STAMP_LEN].copy_from_slice(&stamp.to_be_bytes());
        val[STAMP_LEN..].copy_from_slice(&random.to_be_bytes());
        UntypedId { val }
    }

    /// Deterministic id for some content; the same input always yields the
    /// same id.
    pub fn hashed(input: &[u8]) -> Self {
        let mut halves = [0u64; 2];
        for (i, half) in halves.iter_mut().enumerate() {
            let mut h = SipHasher24::new_with_keys(0, i as u64);
            h.write(input);
            *half = h.finish();
        }
        Self::from_parts(halves[0], halves[1])
    }

    pub fn timestamp(&self) -> SystemTime {
        UNIX_EPOCH + Duration::from_nanos(self.stamp())
    }

    pub fn random(&self) -> u64 {
        let mut buf = [0u8; 8];
        buf.copy_from_slice(&self.val[STAMP_LEN..]);
        u64::from_be_bytes(buf)
    }

    pub fn typed<T>(self) -> Id<T> {
        Id::from_untyped(self)
    }

    fn stamp(&self) -> u64 {
        let mut buf = [0u8; 8];
        buf.copy_from_slice(&self.val[..STAMP_LEN]);
        u64::from_be_bytes(buf)
    }
}

impl fmt::Display for UntypedId {
    fn fmt(&self, fmt: &mut fmt::Formatter) -> fmt::Result {
        fmt.write_str(&BASE32_DNSSEC.encode(&self.val))
    }
}

impl fmt::Debug for UntypedId {
    fn fmt(&self, fmt: &mut fmt::Formatter) -> fmt::Result {
        fmt.debug_struct("UntypedId")
            .field("val", &format_args!("{:x}", self.val.as_hex()))
            .finish()
    }
}

impl std::str::FromStr for UntypedId {
    type Err = IdParseError;
    fn from_str(src: &str) -> Result<Self, Self::Err> {
        let bytes = BASE32_DNSSEC
            .decode(src.as_bytes())
            .map_err(|_| IdParseError::Unparseable)?;
        let mut id = UntypedId::default();
        if bytes.len() != id.val.len() {
            return Err(IdParseError::Unparseable);
        }
        id.val.copy_from_slice(&bytes);
        Ok(id)
    }
}

impl Serialize for UntypedId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for UntypedId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct UntypedIdVisitor;
        impl<'vi> de::Visitor<'vi> for UntypedIdVisitor {
            type Value = UntypedId;

            fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
                write!(formatter, "an UntypedId string")
            }

            fn visit_str<E: de::Error>(self, value: &str) -> Result<UntypedId, E> {
                value.parse::<UntypedId>().map_err(E::custom)
            }
        }

        deserializer.deserialize_str(UntypedIdVisitor)
    }
}
