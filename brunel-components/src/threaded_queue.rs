// Copyright (c) 2025 Graphcore Ltd. All rights reserved.

//! One bounded per-thread FIFO with a credit generator.
//!
//! The queue grants the producer one credit per free slot, up to its
//! capacity, as single-cycle pulses on `credit_out`. `credits` tracks pulses
//! issued minus credits consumed by pops; it is the producer's view of free
//! space, lagged by the round-trip latency of whatever carries the pulses.
//! Capacity is compared against `credits`, not occupancy, so a late pop may
//! leave `credits > 0` with an empty FIFO - that is the intended
//! outstanding-credit accounting.
//!
//! # Ports
//!
//! This component has three ports:
//!  - Two input signals: `valid_in`, `tlp_in`
//!  - One output signal: `credit_out` (single-cycle pulse)

use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;

use brunel_engine::engine::Engine;
use brunel_engine::signal::Signal;
use brunel_engine::sim_error;
use brunel_engine::traits::{Clocked, SimContext};
use brunel_engine::types::SimError;
use brunel_track::entity::Entity;
use brunel_track::trace;
use brunel_protocol::RawTlp;

pub struct ThreadedQueue {
    entity: Rc<Entity>,
    capacity: usize,
    fifo: VecDeque<RawTlp>,
    credits: usize,
    credit_pending: bool,

    valid_in: Signal<bool>,
    tlp_in: Signal<RawTlp>,
    credit_out: Signal<bool>,
}

impl ThreadedQueue {
    pub fn new_and_register(
        engine: &mut Engine,
        parent: &Rc<Entity>,
        name: &str,
        capacity: usize,
        valid_in: Signal<bool>,
        tlp_in: Signal<RawTlp>,
        credit_out: Signal<bool>,
    ) -> Result<Rc<RefCell<Self>>, SimError> {
        if capacity == 0 {
            return sim_error!(format!("{parent}::{name}: capacity must be non-zero"));
        }
        let entity = Rc::new(Entity::new(parent, name));
        let rc_self = Rc::new(RefCell::new(Self {
            entity,
            capacity,
            fifo: VecDeque::with_capacity(capacity),
            credits: 0,
            credit_pending: false,
            valid_in,
            tlp_in,
            credit_out,
        }));
        engine.register(&rc_self);
        Ok(rc_self)
    }

    #[must_use]
    pub fn has_data(&self) -> bool {
        !self.fifo.is_empty()
    }

    /// Remove the head packet. Consumes one credit when any are outstanding.
    pub fn pop_data(&mut self) -> Option<RawTlp> {
        let pkt = self.fifo.pop_front()?;
        if self.credits > 0 {
            self.credits -= 1;
        }
        trace!(self.entity ; "pop {} credits={}", pkt, self.credits);
        Some(pkt)
    }

    #[must_use]
    pub fn occupancy(&self) -> usize {
        self.fifo.len()
    }

    #[must_use]
    pub fn credits(&self) -> usize {
        self.credits
    }

    #[must_use]
    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

impl Clocked for ThreadedQueue {
    fn tick(&mut self, ctx: &SimContext) {
        if !ctx.reset_n {
            self.fifo.clear();
            self.credits = 0;
            self.credit_pending = false;
            self.credit_out.write(false);
            return;
        }

        // A credit pulse lasts exactly one cycle.
        if self.credit_pending {
            self.credit_out.write(false);
            self.credit_pending = false;
        }

        if self.valid_in.read() && self.fifo.len() < self.capacity {
            let pkt = self.tlp_in.read();
            self.fifo.push_back(pkt);
            trace!(self.entity ; "enqueue {} occupancy={}", pkt, self.fifo.len());
        }

        if self.credits < self.capacity && self.fifo.len() < self.capacity {
            self.credits += 1;
            self.credit_out.write(true);
            self.credit_pending = true;
            trace!(self.entity ; "issue credit, outstanding={}", self.credits);
        }
    }
}
