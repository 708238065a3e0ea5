//! Extension type registry.
//!
//! Maps a Rust type to a MessagePack extension type code. A [`Registry`] is
//! shared by every encode/decode call that is handed it; readers take the
//! read lock, registration takes the write lock. The built-in timestamp
//! (type code `-1`) is always present and cannot be removed.

use std::any::{TypeId, type_name};
use std::collections::HashMap;
use std::sync::{LazyLock, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use tracing::{debug, trace};

use super::timestamp::Timestamp;
use super::{Error, Result};

/// A user-defined MessagePack extension type
///
/// The encoder calls [`payload_len`](Self::payload_len) during the measuring
/// pass and [`write_payload`](Self::write_payload) during the emitting pass;
/// both must agree.
pub trait ExtensionType: Sized + Send + Sync + 'static {
    /// Extension type code carried on the wire
    const TYPE_CODE: i8;

    /// Exact payload size in bytes
    fn payload_len(&self) -> usize;

    /// Fill `out`, which is exactly `payload_len()` bytes long
    fn write_payload(&self, out: &mut [u8]);

    /// Parse a payload. Reject bad input with [`Error::malformed`].
    fn from_payload(payload: &[u8]) -> Result<Self>;
}

impl Error {
    /// Payload rejected by an extension type's decoder
    pub fn malformed(type_code: i8, reason: impl Into<String>) -> Self {
        Self::MalformedExtensionPayload {
            type_code,
            reason: reason.into(),
        }
    }
}

type ProbeFn = fn(&[u8]) -> Result<()>;

#[derive(Debug, Clone, Copy)]
pub(crate) struct Registration {
    type_id: TypeId,
    type_name: &'static str,
    type_code: i8,
    seq: u64,
    probe: ProbeFn,
}

impl Registration {
    fn of<T: ExtensionType>(seq: u64) -> Self {
        Self {
            type_id: TypeId::of::<T>(),
            type_name: type_name::<T>(),
            type_code: T::TYPE_CODE,
            seq,
            probe: |payload| T::from_payload(payload).map(drop),
        }
    }

    pub(crate) const fn type_id(&self) -> TypeId {
        self.type_id
    }

    /// Run the registered decoder over `payload`, discarding the value
    pub(crate) fn probe(&self, payload: &[u8]) -> Result<()> {
        (self.probe)(payload)
    }
}

#[derive(Debug)]
struct State {
    by_type: HashMap<TypeId, Registration>,
    ordered: Vec<Registration>,
    next_seq: u64,
}

impl State {
    fn rebuild(&mut self) {
        self.ordered = self.by_type.values().copied().collect();
        self.ordered.sort_by_key(|entry| entry.seq);
    }
}

/// Registry of extension types
#[derive(Debug)]
pub struct Registry {
    state: RwLock<State>,
}

static GLOBAL: LazyLock<Registry> = LazyLock::new(Registry::new);

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}

impl Registry {
    /// Create a registry holding only the built-in timestamp
    #[must_use]
    pub fn new() -> Self {
        let builtin = Registration::of::<Timestamp>(0);
        let mut state = State {
            by_type: HashMap::from([(builtin.type_id, builtin)]),
            ordered: Vec::new(),
            next_seq: 1,
        };
        state.rebuild();
        Self {
            state: RwLock::new(state),
        }
    }

    /// Process-wide registry used by the top-level functions
    #[must_use]
    pub fn global() -> &'static Self {
        &GLOBAL
    }

    fn read(&self) -> RwLockReadGuard<'_, State> {
        self.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, State> {
        self.state.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Register `T`. Registering an already present type (including the
    /// built-in timestamp) is a no-op.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidArgument`] if a different type already claims
    /// `T::TYPE_CODE`.
    pub fn register<T: ExtensionType>(&self) -> Result<()> {
        let type_id = TypeId::of::<T>();
        let mut state = self.write();
        if state.by_type.contains_key(&type_id) {
            trace!(type_name = type_name::<T>(), "extension already registered");
            return Ok(());
        }
        if let Some(owner) = state
            .ordered
            .iter()
            .find(|entry| entry.type_code == T::TYPE_CODE)
        {
            return Err(Error::invalid_argument(format!(
                "extension type code {} already claimed by {}",
                T::TYPE_CODE,
                owner.type_name
            )));
        }
        let seq = state.next_seq;
        state.next_seq += 1;
        state.by_type.insert(type_id, Registration::of::<T>(seq));
        state.rebuild();
        debug!(
            type_name = type_name::<T>(),
            type_code = T::TYPE_CODE,
            "registered extension"
        );
        Ok(())
    }

    /// Remove `T`. Returns whether it was registered. The built-in timestamp
    /// is never removed.
    pub fn unregister<T: ExtensionType>(&self) -> bool {
        let type_id = TypeId::of::<T>();
        if type_id == TypeId::of::<Timestamp>() {
            trace!("ignoring request to unregister the built-in timestamp");
            return false;
        }
        let mut state = self.write();
        let removed = state.by_type.remove(&type_id).is_some();
        if removed {
            state.rebuild();
            debug!(type_name = type_name::<T>(), "unregistered extension");
        }
        removed
    }

    /// Check whether `T` is registered
    #[must_use]
    pub fn is_registered<T: ExtensionType>(&self) -> bool {
        self.read().by_type.contains_key(&TypeId::of::<T>())
    }

    /// Check whether any registered type claims `type_code`
    #[must_use]
    pub fn contains_code(&self, type_code: i8) -> bool {
        self.lookup(type_code).is_some()
    }

    /// First registration, in registration order, claiming `type_code`
    pub(crate) fn lookup(&self, type_code: i8) -> Option<Registration> {
        self.read()
            .ordered
            .iter()
            .find(|entry| entry.type_code == type_code)
            .copied()
    }

    /// Number of registered types, the built-in included
    #[must_use]
    pub fn len(&self) -> usize {
        self.read().ordered.len()
    }

    /// Always false: the built-in timestamp is always present
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.read().ordered.is_empty()
    }

    /// Registered type codes in registration order
    #[must_use]
    pub fn type_codes(&self) -> Vec<i8> {
        self.read()
            .ordered
            .iter()
            .map(|entry| entry.type_code)
            .collect()
    }
}

/// Register `T` in the process-wide registry
pub fn register_extension<T: ExtensionType>() -> Result<()> {
    Registry::global().register::<T>()
}

/// Remove `T` from the process-wide registry
pub fn unregister_extension<T: ExtensionType>() -> bool {
    Registry::global().unregister::<T>()
}
