// Copyright (c) 2025 Graphcore Ltd. All rights reserved.

//! Component traits.

use crate::types::Cycle;

/// Per-cycle context handed to every component.
///
/// `popping_enabled` is the one piece of global simulation state: a flag the
/// driver toggles at the phase boundary and every endpoint popper observes.
/// It lives here, rather than in a process global, so that tests can run
/// several independent simulations.
#[derive(Clone, Copy, Debug)]
pub struct SimContext {
    /// The cycle whose rising edge is being executed.
    pub cycle: Cycle,

    /// Simulated time of this rising edge in nanoseconds.
    pub time_ns: u64,

    /// Synchronous reset level. While low, components clear their buffers,
    /// counters and output drives on each rising edge.
    pub reset_n: bool,

    /// Whether endpoint poppers may drain their queues this cycle.
    pub popping_enabled: bool,
}

/// A clocked component.
///
/// Components are plain structs registered with the
/// [engine](crate::engine::Engine). Every rising edge the engine calls
/// [tick()](Clocked::tick) on each component, commits all signal writes, and
/// then calls [settle()](Clocked::settle) on the components that report
/// [needs_settle()](Clocked::needs_settle). A settling component re-samples
/// signals written during the edge phase of the same cycle; its own writes
/// commit at the end of the cycle.
pub trait Clocked {
    /// Edge phase: sample inputs as of the previous settled state and stage
    /// outputs.
    fn tick(&mut self, ctx: &SimContext);

    /// Delta-settle phase: re-sample same-cycle edge writes. Only called when
    /// [needs_settle()](Clocked::needs_settle) returns true.
    fn settle(&mut self, _ctx: &SimContext) {}

    /// Opt in to the delta-settle pass. Sampled once, at registration.
    fn needs_settle(&self) -> bool {
        false
    }
}
