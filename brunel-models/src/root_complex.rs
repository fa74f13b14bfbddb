// Copyright (c) 2025 Graphcore Ltd. All rights reserved.

//! The Root Complex: a credit-gated round-robin packet source.
//!
//! Every cycle the RC first counts the pulses on its 3-bit credit bus into
//! per-thread counters, then emits at most one packet: threads are scanned
//! round-robin starting from the rotation pointer, the first thread holding
//! a credit wins, one credit is consumed, and `raw_valid` is asserted for
//! exactly one cycle. A packet is never emitted without a prior unconsumed
//! credit for its thread, and with every thread holding credits the dispatch
//! order is strictly 1, 2, 3, 1, ...
//!
//! Sequence numbers start at 1 and are strictly increasing for the lifetime
//! of the instance.
//!
//! # Ports
//!
//! This component has three ports:
//!  - One input signal: `credit_in` (3-bit bus)
//!  - Two output signals: `raw_valid`, `raw_tlp`

use std::cell::RefCell;
use std::rc::Rc;

use brunel_engine::engine::Engine;
use brunel_engine::signal::Signal;
use brunel_engine::traits::{Clocked, SimContext};
use brunel_engine::types::SimError;
use brunel_track::entity::Entity;
use brunel_track::trace;
use brunel_protocol::{CreditBits, RawTlp, NUM_THREADS};

pub struct RootComplex {
    entity: Rc<Entity>,
    packet_seq: u32,
    credit_counter: [u32; NUM_THREADS],
    /// Round-robin pointer: the wire thread id to try first, in `{1, 2, 3}`.
    rr_pointer: u8,
    sent_log: Vec<RawTlp>,

    credit_in: Signal<CreditBits>,
    raw_valid: Signal<bool>,
    raw_tlp: Signal<RawTlp>,
}

impl RootComplex {
    pub fn new_and_register(
        engine: &mut Engine,
        parent: &Rc<Entity>,
        name: &str,
        credit_in: Signal<CreditBits>,
        raw_valid: Signal<bool>,
        raw_tlp: Signal<RawTlp>,
    ) -> Result<Rc<RefCell<Self>>, SimError> {
        let entity = Rc::new(Entity::new(parent, name));
        let rc_self = Rc::new(RefCell::new(Self {
            entity,
            packet_seq: 1,
            credit_counter: [0; NUM_THREADS],
            rr_pointer: 1,
            sent_log: Vec::new(),
            credit_in,
            raw_valid,
            raw_tlp,
        }));
        engine.register(&rc_self);
        Ok(rc_self)
    }

    /// Packets emitted since the last reset.
    #[must_use]
    pub fn packets_sent(&self) -> u64 {
        self.sent_log.len() as u64
    }

    /// Every packet emitted since the last reset, in emission order.
    #[must_use]
    pub fn sent_packets(&self) -> &[RawTlp] {
        &self.sent_log
    }

    /// Unconsumed credits per thread (0-indexed).
    #[must_use]
    pub fn credit_counters(&self) -> [u32; NUM_THREADS] {
        self.credit_counter
    }
}

impl Clocked for RootComplex {
    fn tick(&mut self, ctx: &SimContext) {
        if !ctx.reset_n {
            self.packet_seq = 1;
            self.credit_counter = [0; NUM_THREADS];
            self.rr_pointer = 1;
            self.sent_log.clear();
            self.raw_valid.write(false);
            return;
        }

        // Credit pulses are edge-counted: one pulse per cycle per bit.
        let pulses = self.credit_in.read();
        for (i, counter) in self.credit_counter.iter_mut().enumerate() {
            if pulses.bit(i) {
                *counter += 1;
            }
        }

        self.raw_valid.write(false);
        for offset in 0..NUM_THREADS as u8 {
            let tid = (self.rr_pointer - 1 + offset) % NUM_THREADS as u8 + 1;
            let index = usize::from(tid - 1);
            if self.credit_counter[index] == 0 {
                continue;
            }

            let pkt = RawTlp {
                seq_num: self.packet_seq,
                thread_id: tid,
            };
            debug_assert!(pkt.queue_index().is_some());
            self.raw_tlp.write(pkt);
            self.raw_valid.write(true);
            self.credit_counter[index] -= 1;
            self.packet_seq += 1;
            self.sent_log.push(pkt);
            self.rr_pointer = tid % NUM_THREADS as u8 + 1;
            trace!(self.entity ; "send {} credits_left={}", pkt, self.credit_counter[index]);
            break;
        }
    }
}
