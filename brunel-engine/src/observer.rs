// Copyright (c) 2025 Graphcore Ltd. All rights reserved.

//! Per-cycle observability.
//!
//! External tracers register a [`CycleObserver`] with the
//! [engine](crate::engine::Engine) and receive, at every cycle boundary, the
//! settled value of every named signal. This is the seam a waveform writer or
//! console tracer plugs into; the engine itself does no formatting.

use std::rc::Rc;

use crate::traits::SimContext;

/// The settled value of one named signal at a cycle boundary.
#[derive(Clone, Debug)]
pub struct SignalSample {
    /// Full hierarchical signal name.
    pub name: Rc<str>,

    /// Raw bit representation of the settled value.
    pub bits: u64,
}

/// Receives a snapshot of every signal at the end of each cycle.
///
/// Snapshots are only assembled when at least one observer is registered, so
/// an unobserved simulation pays nothing for this interface.
pub trait CycleObserver {
    /// Called after the settle-phase commit of every cycle.
    fn cycle_end(&mut self, ctx: &SimContext, signals: &[SignalSample]);
}
