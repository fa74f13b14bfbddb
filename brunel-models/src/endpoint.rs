// Copyright (c) 2025 Graphcore Ltd. All rights reserved.

//! The Endpoint: a receive front-end plus a deterministic popper.
//!
//! The popper drains the per-thread queues at a fixed 1-in-4 rate: a modulo
//! counter advances every cycle while the global `popping_enabled` flag is
//! set, and on the count-3 cycle one pop is attempted on each of the three
//! queues. The deliberately under-provisioned drain rate keeps the credit
//! loop under pressure.
//!
//! Delivered packets are recorded (count, per-thread histogram and arrival
//! order) so scenarios can check ordering, duplication and balance.
//!
//! # Ports
//!
//! This component has three ports, forwarded to its front-end:
//!  - Two input signals: `raw_valid`, `raw_tlp`
//!  - One output signal: `credit_out` (3-bit bus)

use std::cell::RefCell;
use std::rc::Rc;

use brunel_engine::engine::Engine;
use brunel_engine::signal::Signal;
use brunel_engine::traits::{Clocked, SimContext};
use brunel_engine::types::SimError;
use brunel_track::entity::Entity;
use brunel_track::trace;
use brunel_components::front_end::ThreadedFrontEnd;
use brunel_protocol::{CreditBits, RawTlp, NUM_THREADS};

const POP_PERIOD: u32 = 4;

pub struct Endpoint {
    entity: Rc<Entity>,
    front: Rc<RefCell<ThreadedFrontEnd>>,
    pop_counter: u32,
    delivered: Vec<RawTlp>,
    histogram: [u64; NUM_THREADS],
}

impl Endpoint {
    pub fn new_and_register(
        engine: &mut Engine,
        parent: &Rc<Entity>,
        name: &str,
        queue_capacity: usize,
        raw_valid: Signal<bool>,
        raw_tlp: Signal<RawTlp>,
        credit_out: Signal<CreditBits>,
    ) -> Result<Rc<RefCell<Self>>, SimError> {
        let entity = Rc::new(Entity::new(parent, name));
        let front = ThreadedFrontEnd::new_and_register(
            engine,
            &entity,
            "front",
            queue_capacity,
            raw_valid,
            raw_tlp,
            credit_out,
        )?;
        let rc_self = Rc::new(RefCell::new(Self {
            entity,
            front,
            pop_counter: 0,
            delivered: Vec::new(),
            histogram: [0; NUM_THREADS],
        }));
        engine.register(&rc_self);
        Ok(rc_self)
    }

    /// The wrapped front-end (exposed for state checks in tests).
    #[must_use]
    pub fn front(&self) -> &Rc<RefCell<ThreadedFrontEnd>> {
        &self.front
    }

    /// Number of packets delivered to the popper.
    #[must_use]
    pub fn num_delivered(&self) -> usize {
        self.delivered.len()
    }

    /// Delivered packets in arrival order.
    #[must_use]
    pub fn delivered(&self) -> &[RawTlp] {
        &self.delivered
    }

    /// Delivered packet counts per thread (0-indexed).
    #[must_use]
    pub fn histogram(&self) -> [u64; NUM_THREADS] {
        self.histogram
    }
}

impl Clocked for Endpoint {
    fn tick(&mut self, ctx: &SimContext) {
        if !ctx.reset_n {
            self.pop_counter = 0;
            return;
        }
        if !ctx.popping_enabled {
            return;
        }

        if self.pop_counter == POP_PERIOD - 1 {
            for index in 0..NUM_THREADS {
                if let Some(pkt) = self.front.borrow().pop_data(index) {
                    debug_assert_eq!(pkt.queue_index(), Some(index));
                    self.histogram[index] += 1;
                    self.delivered.push(pkt);
                    trace!(self.entity ; "delivered {} from queue{}", pkt, index);
                }
            }
        }
        self.pop_counter = (self.pop_counter + 1) % POP_PERIOD;
    }
}
