// Copyright (c) 2025 Graphcore Ltd. All rights reserved.

//! Per-thread receive front-end: demux router plus credit combiner.
//!
//! Wraps one [ThreadedQueue](crate::threaded_queue::ThreadedQueue) per
//! thread. The router demultiplexes the ingress packet stream onto the
//! per-queue valid/tlp signals by wire thread id; packets with a reserved or
//! out-of-range id (0 in the producer convention) are silently dropped and
//! no queue is written. The combiner OR-reduces the per-queue credit pulses
//! onto the external 3-bit credit bus.
//!
//! The router runs in the delta-settle phase so it observes the producer's
//! `ingress_valid` assertion in the same cycle it is made; the queues then
//! pick the routed packet up at the next edge.
//!
//! # Ports
//!
//! This component has three ports:
//!  - Two input signals: `ingress_valid`, `ingress_tlp`
//!  - One output signal: `credit_out` (3-bit bus)

use std::cell::RefCell;
use std::rc::Rc;

use brunel_engine::engine::Engine;
use brunel_engine::signal::Signal;
use brunel_engine::traits::{Clocked, SimContext};
use brunel_engine::types::SimError;
use brunel_track::entity::Entity;
use brunel_track::trace;
use brunel_protocol::{CreditBits, RawTlp, NUM_THREADS};

use crate::threaded_queue::ThreadedQueue;

pub struct ThreadedFrontEnd {
    entity: Rc<Entity>,

    ingress_valid: Signal<bool>,
    ingress_tlp: Signal<RawTlp>,
    credit_out: Signal<CreditBits>,

    queues: Vec<Rc<RefCell<ThreadedQueue>>>,
    valid_signals: Vec<Signal<bool>>,
    tlp_signals: Vec<Signal<RawTlp>>,
    credit_signals: Vec<Signal<bool>>,
}

impl ThreadedFrontEnd {
    pub fn new_and_register(
        engine: &mut Engine,
        parent: &Rc<Entity>,
        name: &str,
        queue_capacity: usize,
        ingress_valid: Signal<bool>,
        ingress_tlp: Signal<RawTlp>,
        credit_out: Signal<CreditBits>,
    ) -> Result<Rc<RefCell<Self>>, SimError> {
        let entity = Rc::new(Entity::new(parent, name));

        let mut queues = Vec::with_capacity(NUM_THREADS);
        let mut valid_signals = Vec::with_capacity(NUM_THREADS);
        let mut tlp_signals = Vec::with_capacity(NUM_THREADS);
        let mut credit_signals = Vec::with_capacity(NUM_THREADS);
        for i in 0..NUM_THREADS {
            let valid = engine.signal::<bool>(&entity, &format!("valid{i}"))?;
            let tlp = engine.signal::<RawTlp>(&entity, &format!("tlp{i}"))?;
            let credit = engine.signal::<bool>(&entity, &format!("credit{i}"))?;
            let queue = ThreadedQueue::new_and_register(
                engine,
                &entity,
                &format!("queue{i}"),
                queue_capacity,
                valid.clone(),
                tlp.clone(),
                credit.clone(),
            )?;
            queues.push(queue);
            valid_signals.push(valid);
            tlp_signals.push(tlp);
            credit_signals.push(credit);
        }

        let rc_self = Rc::new(RefCell::new(Self {
            entity,
            ingress_valid,
            ingress_tlp,
            credit_out,
            queues,
            valid_signals,
            tlp_signals,
            credit_signals,
        }));
        engine.register(&rc_self);
        Ok(rc_self)
    }

    #[must_use]
    pub fn has_data(&self, index: usize) -> bool {
        self.queues[index].borrow().has_data()
    }

    pub fn pop_data(&self, index: usize) -> Option<RawTlp> {
        self.queues[index].borrow_mut().pop_data()
    }

    #[must_use]
    pub fn queue(&self, index: usize) -> &Rc<RefCell<ThreadedQueue>> {
        &self.queues[index]
    }
}

impl Clocked for ThreadedFrontEnd {
    // Combiner: OR-reduce the per-queue credit pulses onto the 3-bit bus.
    fn tick(&mut self, ctx: &SimContext) {
        if !ctx.reset_n {
            self.credit_out.write(CreditBits::default());
            return;
        }
        let mut combined = CreditBits::default();
        for (i, credit) in self.credit_signals.iter().enumerate() {
            if credit.read() {
                combined.set(i);
            }
        }
        self.credit_out.write(combined);
    }

    // Router: demux the same-cycle ingress assertion onto the queue signals.
    fn settle(&mut self, ctx: &SimContext) {
        if !ctx.reset_n {
            for valid in &self.valid_signals {
                valid.write(false);
            }
            return;
        }

        for valid in &self.valid_signals {
            valid.write(false);
        }
        if self.ingress_valid.read() {
            let pkt = self.ingress_tlp.read();
            match pkt.queue_index() {
                Some(index) => {
                    self.tlp_signals[index].write(pkt);
                    self.valid_signals[index].write(true);
                    trace!(self.entity ; "route {} to queue{}", pkt, index);
                }
                None => {
                    trace!(self.entity ; "drop {} (reserved thread id)", pkt);
                }
            }
        }
    }

    fn needs_settle(&self) -> bool {
        true
    }
}
