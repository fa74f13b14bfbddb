// Copyright (c) 2025 Graphcore Ltd. All rights reserved.

//! Signals.
//!
//! A [`Signal<T>`] models a wire with hardware register semantics: it holds a
//! `(current, next)` value pair. [read()](Signal::read) returns the settled
//! `current` value and [write()](Signal::write) stages the `next` value,
//! which becomes visible when the [engine](crate::engine::Engine) commits at
//! the end of each micro-phase. A value persists until it is overwritten.
//!
//! Signals are cheaply cloneable handles; every clone refers to the same
//! wire. Each signal has exactly one logical driver - the engine does not
//! police this, but models must respect it.

use std::cell::Cell;
use std::fmt;
use std::rc::Rc;

use brunel_track::entity::Entity;

/// The value types a [`Signal`] can carry.
///
/// `trace_bits` provides the raw bit representation used for per-cycle
/// snapshots taken by [observers](crate::observer::CycleObserver).
pub trait SignalValue: Copy + Default + PartialEq + fmt::Debug + 'static {
    /// The raw bit representation of this value.
    fn trace_bits(&self) -> u64;
}

impl SignalValue for bool {
    fn trace_bits(&self) -> u64 {
        u64::from(*self)
    }
}

impl SignalValue for u8 {
    fn trace_bits(&self) -> u64 {
        u64::from(*self)
    }
}

impl SignalValue for u16 {
    fn trace_bits(&self) -> u64 {
        u64::from(*self)
    }
}

impl SignalValue for u32 {
    fn trace_bits(&self) -> u64 {
        u64::from(*self)
    }
}

impl SignalValue for u64 {
    fn trace_bits(&self) -> u64 {
        *self
    }
}

struct SignalState<T>
where
    T: SignalValue,
{
    current: Cell<T>,
    next: Cell<T>,
}

/// A handle onto a named wire.
pub struct Signal<T>
where
    T: SignalValue,
{
    entity: Rc<Entity>,
    state: Rc<SignalState<T>>,
}

impl<T> Clone for Signal<T>
where
    T: SignalValue,
{
    fn clone(&self) -> Self {
        Self {
            entity: self.entity.clone(),
            state: self.state.clone(),
        }
    }
}

impl<T> fmt::Display for Signal<T>
where
    T: SignalValue,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.entity.fmt(f)
    }
}

impl<T> fmt::Debug for Signal<T>
where
    T: SignalValue,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Signal")
            .field("entity", &self.entity)
            .field("current", &self.state.current.get())
            .field("next", &self.state.next.get())
            .finish()
    }
}

impl<T> Signal<T>
where
    T: SignalValue,
{
    pub(crate) fn new(entity: Rc<Entity>) -> Self {
        Self {
            entity,
            state: Rc::new(SignalState {
                current: Cell::new(T::default()),
                next: Cell::new(T::default()),
            }),
        }
    }

    /// Sample the settled value.
    #[must_use]
    pub fn read(&self) -> T {
        self.state.current.get()
    }

    /// Stage a value; it becomes visible at the next commit.
    pub fn write(&self, value: T) {
        self.state.next.set(value);
    }

    /// The entity naming this signal.
    #[must_use]
    pub fn entity(&self) -> &Rc<Entity> {
        &self.entity
    }
}

/// Type-erased view of a signal used by the engine for commits and
/// snapshots.
pub(crate) trait AnySignal {
    fn commit(&self);
    fn trace_bits(&self) -> u64;
}

impl<T> AnySignal for Signal<T>
where
    T: SignalValue,
{
    fn commit(&self) {
        self.state.current.set(self.state.next.get());
    }

    fn trace_bits(&self) -> u64 {
        self.state.current.get().trace_bits()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use brunel_track::entity::toplevel;

    #[test]
    fn writes_are_invisible_until_commit() {
        let sig = Signal::<u32>::new(toplevel("sig"));
        sig.write(7);
        assert_eq!(sig.read(), 0);
        sig.commit();
        assert_eq!(sig.read(), 7);
    }

    #[test]
    fn values_persist_across_commits() {
        let sig = Signal::<u32>::new(toplevel("sig"));
        sig.write(7);
        sig.commit();
        sig.commit();
        sig.commit();
        assert_eq!(sig.read(), 7);
    }

    #[test]
    fn clones_share_the_wire() {
        let sig = Signal::<bool>::new(toplevel("sig"));
        let other = sig.clone();
        other.write(true);
        sig.commit();
        assert!(sig.read());
    }
}
