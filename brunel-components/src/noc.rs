// Copyright (c) 2025 Graphcore Ltd. All rights reserved.

//! Fixed-latency elastic pipeline with deterministic duty-cycle
//! back-pressure.
//!
//! The NoC is a shift register of `latency` slots. A beat accepted at the
//! head moves one slot per cycle toward the tail; uncongested, the consumer
//! observes the egress assertion exactly `latency` cycles after the
//! accepting edge. Beats never overtake, and once accepted are never lost
//! or duplicated.
//!
//! Back-pressure is a deterministic modulo schedule, not randomness: the
//! first `pattern_len * stall_pct / 100` cycles of every `pattern_len`-cycle
//! period refuse ingress. Because the driven ready gates acceptance one
//! cycle later, it is computed against the *next* cycle's pattern position -
//! the look-ahead keeps the registered ready exactly aligned with the stall
//! schedule.
//!
//! # Ports
//!
//! This component has six ports:
//!  - Three input signals: `valid_in`, `axi_in`, `ready_in`
//!  - Three output signals: `ready_out`, `valid_out`, `axi_out`

use std::cell::RefCell;
use std::rc::Rc;

use brunel_engine::engine::Engine;
use brunel_engine::signal::Signal;
use brunel_engine::sim_error;
use brunel_engine::traits::{Clocked, SimContext};
use brunel_engine::types::SimError;
use brunel_track::entity::Entity;
use brunel_track::trace;
use brunel_protocol::AxiWord;

pub struct AxiNoc {
    entity: Rc<Entity>,
    latency: usize,
    pattern_len: usize,
    stall_pct: usize,
    pipe: Vec<Option<AxiWord>>,
    pattern_ctr: usize,

    valid_in: Signal<bool>,
    axi_in: Signal<AxiWord>,
    ready_out: Signal<bool>,
    valid_out: Signal<bool>,
    axi_out: Signal<AxiWord>,
    ready_in: Signal<bool>,
}

impl AxiNoc {
    #[allow(clippy::too_many_arguments)]
    pub fn new_and_register(
        engine: &mut Engine,
        parent: &Rc<Entity>,
        name: &str,
        latency: usize,
        pattern_len: usize,
        stall_pct: usize,
        valid_in: Signal<bool>,
        axi_in: Signal<AxiWord>,
        ready_out: Signal<bool>,
        valid_out: Signal<bool>,
        axi_out: Signal<AxiWord>,
        ready_in: Signal<bool>,
    ) -> Result<Rc<RefCell<Self>>, SimError> {
        if latency == 0 {
            return sim_error!(format!("{parent}::{name}: latency must be non-zero"));
        }
        if pattern_len == 0 {
            return sim_error!(format!("{parent}::{name}: pattern length must be non-zero"));
        }
        if stall_pct >= 100 {
            return sim_error!(format!("{parent}::{name}: stall percentage must be <100"));
        }
        let entity = Rc::new(Entity::new(parent, name));
        let rc_self = Rc::new(RefCell::new(Self {
            entity,
            latency,
            pattern_len,
            stall_pct,
            pipe: vec![None; latency],
            pattern_ctr: 0,
            valid_in,
            axi_in,
            ready_out,
            valid_out,
            axi_out,
            ready_in,
        }));
        engine.register(&rc_self);
        Ok(rc_self)
    }

    fn stall_cycles(&self) -> usize {
        self.pattern_len * self.stall_pct / 100
    }

    /// Beats currently in the pipeline.
    #[must_use]
    pub fn in_flight(&self) -> usize {
        self.pipe.iter().filter(|slot| slot.is_some()).count()
    }
}

impl Clocked for AxiNoc {
    fn tick(&mut self, ctx: &SimContext) {
        if !ctx.reset_n {
            self.pipe.iter_mut().for_each(|slot| *slot = None);
            self.pattern_ctr = 0;
            self.valid_out.write(false);
            self.ready_out.write(false);
            return;
        }

        let tail = self.latency - 1;

        // Egress completion: the consumer took the presented beat at this
        // edge (committed valid against committed ready).
        if self.valid_out.read() && self.ready_in.read() {
            if let Some(word) = self.pipe[tail].take() {
                trace!(self.entity ; "egress accepted {}", word);
            }
        }

        // Advance the pipeline one stage. Iterating from the tail lets a
        // single hole pull the whole train forward one slot.
        for i in (1..self.latency).rev() {
            if self.pipe[i].is_none() && self.pipe[i - 1].is_some() {
                self.pipe[i] = self.pipe[i - 1].take();
            }
        }

        // Ingress: the producer presented against our committed ready.
        if self.valid_in.read() && self.ready_out.read() {
            let word = self.axi_in.read();
            debug_assert!(self.pipe[0].is_none(), "ingress into occupied slot");
            self.pipe[0] = Some(word);
            trace!(self.entity ; "ingress {}", word);
        }

        // Drive the tail slot.
        match self.pipe[tail] {
            Some(word) => {
                self.valid_out.write(true);
                self.axi_out.write(word);
            }
            None => self.valid_out.write(false),
        }

        // Look-ahead stall: the ready we drive now gates acceptance next
        // cycle, so it must reflect next cycle's pattern position.
        let next_ctr = (self.pattern_ctr + 1) % self.pattern_len;
        let next_stall = next_ctr < self.stall_cycles();
        self.pattern_ctr = next_ctr;

        // An accepted beat is guaranteed a free head slot next cycle as long
        // as any hole exists in the pipe: the shift pass above pulls the
        // train forward through the nearest hole.
        let has_space = self.pipe.iter().any(Option::is_none);
        self.ready_out.write(has_space && !next_stall);
    }
}
