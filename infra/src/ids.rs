use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::marker::PhantomData;
use std::sync::atomic::{self, AtomicU64};
use std::time::{SystemTime, UNIX_EPOCH};

use serde::{de, Deserialize, Deserializer, Serialize, Serializer};

pub use crate::untyped_ids::IdParseError;
use crate::untyped_ids::UntypedId;

pub struct Id<T> {
    inner: UntypedId,
    phantom: PhantomData<T>,
}

pub trait Entity {
    const PREFIX: &'static str;
}

const DIVIDER: &str = "-";

/// Hands out ids whose timestamps strictly increase, so that two ids from
/// the same generator never collide even within one clock tick.
#[derive(Debug, Default)]
pub struct IdGen {
    last_stamp: AtomicU64,
}

impl IdGen {
    pub fn new() -> Self {
        IdGen::default()
    }

    pub fn untyped(&self) -> UntypedId {
        let now = now_nanos();
        let mut prev = self.last_stamp.load(atomic::Ordering::SeqCst);
        let stamp = loop {
            let next = std::cmp::max(now, prev.saturating_add(1));
            match self.last_stamp.compare_exchange_weak(
                prev,
                next,
                atomic::Ordering::SeqCst,
                atomic::Ordering::SeqCst,
            ) {
                Ok(_) => break next,
                Err(actual) => prev = actual,
            }
        };
        UntypedId::from_parts(stamp, rand::random())
    }

    pub fn generate<T>(&self) -> Id<T> {
        self.untyped().typed()
    }
}

fn now_nanos() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos() as u64)
        .unwrap_or(0)
}

impl<T> Id<T> {
    pub(crate) fn from_untyped(inner: UntypedId) -> Self {
        Id {
            inner,
            phantom: PhantomData,
        }
    }

    pub fn untyped(&self) -> UntypedId {
        self.inner
    }
}

impl<T: Entity> fmt::Display for Id<T> {
    fn fmt(&self, fmt: &mut fmt::Formatter) -> fmt::Result {
        write!(fmt, "{}{}{}", T::PREFIX, DIVIDER, self.inner)
    }
}

impl<T> fmt::Debug for Id<T> {
    fn fmt(&self, fmt: &mut fmt::Formatter) -> fmt::Result {
        fmt.debug_tuple("Id").field(&self.inner).finish()
    }
}

impl<T: Entity> std::str::FromStr for Id<T> {
    type Err = IdParseError;
    fn from_str(src: &str) -> Result<Self, Self::Err> {
        if !src.starts_with(T::PREFIX) {
            return Err(IdParseError::InvalidPrefix);
        }
        let remainder = &src[T::PREFIX.len()..];
        if !remainder.starts_with(DIVIDER) {
            return Err(IdParseError::Unparseable);
        }

        let inner = remainder[DIVIDER.len()..].parse::<UntypedId>()?;
        Ok(inner.typed())
    }
}

impl<T> Default for Id<T> {
    fn default() -> Self {
        UntypedId::default().typed()
    }
}

impl<T> PartialEq for Id<T> {
    fn eq(&self, other: &Self) -> bool {
        self.inner == other.inner
    }
}

impl<T> Eq for Id<T> {}

impl<T> Hash for Id<T> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.inner.hash(state)
    }
}

impl<T> PartialOrd for Id<T> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<T> Ord for Id<T> {
    fn cmp(&self, other: &Self) -> Ordering {
        self.inner.cmp(&other.inner)
    }
}

impl<T> Clone for Id<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for Id<T> {}

impl<T: Entity> Serialize for Id<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de, T: Entity> Deserialize<'de> for Id<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct IdStrVisitor<T>(PhantomData<T>);
        impl<'vi, T: Entity> de::Visitor<'vi> for IdStrVisitor<T> {
            type Value = Id<T>;

            fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
                write!(formatter, "an Id string")
            }

            fn visit_str<E: de::Error>(self, value: &str) -> Result<Id<T>, E> {
                value.parse::<Id<T>>().map_err(E::custom)
            }
        }

        deserializer.deserialize_str(IdStrVisitor(PhantomData))
    }
}
