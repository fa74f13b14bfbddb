// Copyright (c) 2025 Graphcore Ltd. All rights reserved.

//! Data ingress buffer: valid/ready AXI interface feeding a pulsed egress.
//!
//! Beats accepted from the NoC are decoded back to TLPs and queued; one
//! packet per cycle is popped and pulsed onto `tlp_out`/`valid_out` for the
//! receive front-end. `ready_out` is registered - it advertises the free
//! space the FIFO had at the end of the previous cycle, which is what the
//! NoC's acceptance decision is based on.
//!
//! # Ports
//!
//! This component has five ports:
//!  - Two input signals: `valid_in`, `axi_in`
//!  - Three output signals: `ready_out`, `valid_out`, `tlp_out`

use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;

use brunel_engine::engine::Engine;
use brunel_engine::signal::Signal;
use brunel_engine::sim_error;
use brunel_engine::traits::{Clocked, SimContext};
use brunel_engine::types::SimError;
use brunel_track::entity::Entity;
use brunel_track::{debug, trace};
use brunel_protocol::{axi_to_tlp, AxiWord, RawTlp};

pub struct RxBuf {
    entity: Rc<Entity>,
    depth: usize,
    fifo: VecDeque<RawTlp>,
    max_occupancy: usize,

    valid_in: Signal<bool>,
    axi_in: Signal<AxiWord>,
    ready_out: Signal<bool>,
    valid_out: Signal<bool>,
    tlp_out: Signal<RawTlp>,
}

impl RxBuf {
    #[allow(clippy::too_many_arguments)]
    pub fn new_and_register(
        engine: &mut Engine,
        parent: &Rc<Entity>,
        name: &str,
        depth: usize,
        valid_in: Signal<bool>,
        axi_in: Signal<AxiWord>,
        ready_out: Signal<bool>,
        valid_out: Signal<bool>,
        tlp_out: Signal<RawTlp>,
    ) -> Result<Rc<RefCell<Self>>, SimError> {
        if depth == 0 {
            return sim_error!(format!("{parent}::{name}: depth must be non-zero"));
        }
        let entity = Rc::new(Entity::new(parent, name));
        let rc_self = Rc::new(RefCell::new(Self {
            entity,
            depth,
            fifo: VecDeque::with_capacity(depth),
            max_occupancy: 0,
            valid_in,
            axi_in,
            ready_out,
            valid_out,
            tlp_out,
        }));
        engine.register(&rc_self);
        Ok(rc_self)
    }

    /// High-water mark of FIFO occupancy.
    #[must_use]
    pub fn max_occupancy(&self) -> usize {
        self.max_occupancy
    }

    /// Packets currently buffered.
    #[must_use]
    pub fn occupancy(&self) -> usize {
        self.fifo.len()
    }
}

impl Clocked for RxBuf {
    fn tick(&mut self, ctx: &SimContext) {
        if !ctx.reset_n {
            self.fifo.clear();
            self.ready_out.write(false);
            self.valid_out.write(false);
            return;
        }

        if self.valid_in.read() && self.ready_out.read() {
            let word = self.axi_in.read();
            let pkt = axi_to_tlp(&word);
            self.fifo.push_back(pkt);
            trace!(self.entity ; "accept {} occupancy={}", pkt, self.fifo.len());
        }

        if self.fifo.len() > self.max_occupancy {
            self.max_occupancy = self.fifo.len();
            debug!(self.entity ; "occupancy watermark {}", self.max_occupancy);
        }

        match self.fifo.pop_front() {
            Some(pkt) => {
                self.tlp_out.write(pkt);
                self.valid_out.write(true);
            }
            None => self.valid_out.write(false),
        }

        self.ready_out.write(self.fifo.len() < self.depth);
    }
}
