// Without the feature nothing reads the events back.
#![cfg_attr(not(feature = "tracking"), allow(dead_code))]

/// How a level was merged.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum LevelPath {
    /// Every A range fit into the cache.
    Cache,
    /// Block rolling around internal buffers.
    InPlace,
}

/// Which merge routine joined an A range with its B values.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum MergeKind {
    /// A was copied into the cache.
    External,
    /// A was parked in the second internal buffer.
    Internal,
    /// No scratch space, rotations only.
    Rotating,
}

/// One recorded step of a sort.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Event {
    /// A merge level started; `length` is the length of its ranges.
    Level { length: usize, path: LevelPath },

    /// Internal buffers established for an in-place level (0 when not found).
    Buffers { buffer1: usize, buffer2: usize },

    /// An A range of `a_len` was merged with the `b_len` B values after it.
    Merge { kind: MergeKind, a_len: usize, b_len: usize },
}

#[cfg(feature = "tracking")]
mod tracking_impl {
    use std::sync::Mutex;

    use super::*;

    lazy_static::lazy_static! {
        static ref TRACKING_REGISTER: Mutex<Vec<Event>> = Mutex::new(Vec::new());
    }

    fn push(event: Event) {
        let mut register = TRACKING_REGISTER.lock().unwrap_or_else(|e| e.into_inner());
        register.push(event);
    }

    /// Drains every event recorded since the last call.
    pub fn read_tracked_events() -> Vec<Event> {
        let mut register = TRACKING_REGISTER.lock().unwrap_or_else(|e| e.into_inner());
        std::mem::take(&mut *register)
    }

    pub fn register_level(length: usize, path: LevelPath) {
        push(Event::Level { length, path });
    }

    pub fn register_buffers(buffer1: usize, buffer2: usize) {
        push(Event::Buffers { buffer1, buffer2 });
    }

    pub fn register_merge(kind: MergeKind, a_len: usize, b_len: usize) {
        push(Event::Merge { kind, a_len, b_len });
    }
}

/// Dummy implementation.
#[cfg(not(feature = "tracking"))]
mod tracking_impl {
    use super::*;

    #[inline]
    pub fn register_level(_length: usize, _path: LevelPath) {}
    #[inline]
    pub fn register_buffers(_buffer1: usize, _buffer2: usize) {}
    #[inline]
    pub fn register_merge(_kind: MergeKind, _a_len: usize, _b_len: usize) {}
}

#[cfg(feature = "tracking")]
pub use tracking_impl::read_tracked_events;
pub(crate) use tracking_impl::{register_buffers, register_level, register_merge};
