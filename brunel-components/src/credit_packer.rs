// Copyright (c) 2025 Graphcore Ltd. All rights reserved.

//! Credit serializer: aggregates credit pulses over a window into one beat.
//!
//! Pulses on the 3-bit `credit_in` bus are counted into per-thread
//! accumulators (saturating at 16 bits). Every `window_size` cycles the
//! accumulators are latched into one AXI credit beat, zeroed, and the beat
//! is driven until the downstream accepts it. A beat is emitted even when
//! every count is zero - the empty-window beat doubles as a keep-alive. The
//! window counter pauses while a beat is waiting to be accepted, so under
//! back-pressure windows stretch rather than overlap.
//!
//! # Ports
//!
//! This component has four ports:
//!  - Two input signals: `credit_in` (3-bit bus), `ready_in`
//!  - Two output signals: `valid_out`, `axi_out`

use std::cell::RefCell;
use std::rc::Rc;

use brunel_engine::engine::Engine;
use brunel_engine::signal::Signal;
use brunel_engine::sim_error;
use brunel_engine::traits::{Clocked, SimContext};
use brunel_engine::types::SimError;
use brunel_track::entity::Entity;
use brunel_track::trace;
use brunel_protocol::{credits_to_axi, AxiWord, CreditBits, NUM_THREADS};

pub struct CreditPacker {
    entity: Rc<Entity>,
    window_size: usize,
    accum: [u16; NUM_THREADS],
    ctr: usize,
    sending: bool,
    pending: AxiWord,

    credit_in: Signal<CreditBits>,
    valid_out: Signal<bool>,
    axi_out: Signal<AxiWord>,
    ready_in: Signal<bool>,
}

impl CreditPacker {
    #[allow(clippy::too_many_arguments)]
    pub fn new_and_register(
        engine: &mut Engine,
        parent: &Rc<Entity>,
        name: &str,
        window_size: usize,
        credit_in: Signal<CreditBits>,
        valid_out: Signal<bool>,
        axi_out: Signal<AxiWord>,
        ready_in: Signal<bool>,
    ) -> Result<Rc<RefCell<Self>>, SimError> {
        if window_size == 0 {
            return sim_error!(format!("{parent}::{name}: window size must be non-zero"));
        }
        let entity = Rc::new(Entity::new(parent, name));
        let rc_self = Rc::new(RefCell::new(Self {
            entity,
            window_size,
            accum: [0; NUM_THREADS],
            ctr: 0,
            sending: false,
            pending: AxiWord::default(),
            credit_in,
            valid_out,
            axi_out,
            ready_in,
        }));
        engine.register(&rc_self);
        Ok(rc_self)
    }
}

impl Clocked for CreditPacker {
    fn tick(&mut self, ctx: &SimContext) {
        if !ctx.reset_n {
            self.accum = [0; NUM_THREADS];
            self.ctr = 0;
            self.sending = false;
            self.valid_out.write(false);
            return;
        }

        // Count incoming credit pulses every cycle, including while a beat
        // is waiting to go out.
        let pulses = self.credit_in.read();
        for (i, accum) in self.accum.iter_mut().enumerate() {
            if pulses.bit(i) {
                *accum = accum.saturating_add(1);
            }
        }

        // Complete the handshake before stepping the window so that with an
        // always-ready downstream the emission period is exactly the window.
        if self.sending && self.valid_out.read() && self.ready_in.read() {
            self.sending = false;
            trace!(self.entity ; "beat accepted");
        }

        if !self.sending {
            self.ctr += 1;
            if self.ctr == self.window_size {
                self.ctr = 0;
                self.pending = credits_to_axi(&self.accum);
                trace!(
                    self.entity ;
                    "window expired, packing ({}, {}, {})",
                    self.accum[0],
                    self.accum[1],
                    self.accum[2]
                );
                self.accum = [0; NUM_THREADS];
                self.sending = true;
            }
        }

        if self.sending {
            self.valid_out.write(true);
            self.axi_out.write(self.pending);
        } else {
            self.valid_out.write(false);
        }
    }
}
