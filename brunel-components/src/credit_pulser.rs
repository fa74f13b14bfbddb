// Copyright (c) 2025 Graphcore Ltd. All rights reserved.

//! Credit deserializer: expands a credit beat back into per-thread pulses.
//!
//! An accepted beat loads the three emit counters; every cycle each
//! non-zero counter contributes one pulse on its bit of `credit_out` and
//! decrements. `ready_out` is re-asserted only once every counter has
//! drained, so a new beat is accepted only when the previous one has been
//! fully replayed. Pulses left over from the previous beat are emitted
//! before a new beat is loaded within the same cycle.
//!
//! # Ports
//!
//! This component has four ports:
//!  - Two input signals: `valid_in`, `axi_in`
//!  - Two output signals: `ready_out`, `credit_out` (3-bit bus)

use std::cell::RefCell;
use std::rc::Rc;

use brunel_engine::engine::Engine;
use brunel_engine::signal::Signal;
use brunel_engine::traits::{Clocked, SimContext};
use brunel_engine::types::SimError;
use brunel_track::entity::Entity;
use brunel_track::trace;
use brunel_protocol::{axi_to_credits, AxiWord, CreditBits, NUM_THREADS};

pub struct CreditPulser {
    entity: Rc<Entity>,
    emit_cnt: [u16; NUM_THREADS],

    valid_in: Signal<bool>,
    axi_in: Signal<AxiWord>,
    ready_out: Signal<bool>,
    credit_out: Signal<CreditBits>,
}

impl CreditPulser {
    pub fn new_and_register(
        engine: &mut Engine,
        parent: &Rc<Entity>,
        name: &str,
        valid_in: Signal<bool>,
        axi_in: Signal<AxiWord>,
        ready_out: Signal<bool>,
        credit_out: Signal<CreditBits>,
    ) -> Result<Rc<RefCell<Self>>, SimError> {
        let entity = Rc::new(Entity::new(parent, name));
        let rc_self = Rc::new(RefCell::new(Self {
            entity,
            emit_cnt: [0; NUM_THREADS],
            valid_in,
            axi_in,
            ready_out,
            credit_out,
        }));
        engine.register(&rc_self);
        Ok(rc_self)
    }
}

impl Clocked for CreditPulser {
    fn tick(&mut self, ctx: &SimContext) {
        if !ctx.reset_n {
            self.emit_cnt = [0; NUM_THREADS];
            self.ready_out.write(true);
            self.credit_out.write(CreditBits::default());
            return;
        }

        // Replay one pulse per thread per cycle from the current beat.
        let mut pulse = CreditBits::default();
        for (i, count) in self.emit_cnt.iter_mut().enumerate() {
            if *count > 0 {
                pulse.set(i);
                *count -= 1;
            }
        }
        self.credit_out.write(pulse);

        if self.valid_in.read() && self.ready_out.read() {
            self.emit_cnt = axi_to_credits(&self.axi_in.read());
            trace!(
                self.entity ;
                "loaded beat ({}, {}, {})",
                self.emit_cnt[0],
                self.emit_cnt[1],
                self.emit_cnt[2]
            );
        }

        self.ready_out
            .write(self.emit_cnt.iter().all(|count| *count == 0));
    }
}
