// Copyright (c) 2025 Graphcore Ltd. All rights reserved.

//! Data egress buffer: deep FIFO feeding a valid/ready AXI interface.
//!
//! Packets arriving on the pulsed ingress are queued and converted to AXI
//! beats one at a time through a hold register. The held beat is driven
//! until the committed `egress_ready` confirms the consumer took it. There
//! is no back-pressure toward the producer; the FIFO is sized generously and
//! an overflow (a protocol violation upstream) drops the packet with a
//! warning.
//!
//! # Ports
//!
//! This component has five ports:
//!  - Three input signals: `ingress_valid`, `ingress_tlp`, `egress_ready`
//!  - Two output signals: `egress_valid`, `egress_axi`

use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;

use brunel_engine::engine::Engine;
use brunel_engine::signal::Signal;
use brunel_engine::sim_error;
use brunel_engine::traits::{Clocked, SimContext};
use brunel_engine::types::SimError;
use brunel_track::entity::Entity;
use brunel_track::{debug, trace, warn};
use brunel_protocol::{tlp_to_axi, AxiWord, RawTlp};

pub struct TxBuf {
    entity: Rc<Entity>,
    depth: usize,
    fifo: VecDeque<RawTlp>,
    holding: Option<RawTlp>,
    max_occupancy: usize,

    ingress_valid: Signal<bool>,
    ingress_tlp: Signal<RawTlp>,
    egress_valid: Signal<bool>,
    egress_axi: Signal<AxiWord>,
    egress_ready: Signal<bool>,
}

impl TxBuf {
    #[allow(clippy::too_many_arguments)]
    pub fn new_and_register(
        engine: &mut Engine,
        parent: &Rc<Entity>,
        name: &str,
        depth: usize,
        ingress_valid: Signal<bool>,
        ingress_tlp: Signal<RawTlp>,
        egress_valid: Signal<bool>,
        egress_axi: Signal<AxiWord>,
        egress_ready: Signal<bool>,
    ) -> Result<Rc<RefCell<Self>>, SimError> {
        if depth == 0 {
            return sim_error!(format!("{parent}::{name}: depth must be non-zero"));
        }
        let entity = Rc::new(Entity::new(parent, name));
        let rc_self = Rc::new(RefCell::new(Self {
            entity,
            depth,
            fifo: VecDeque::new(),
            holding: None,
            max_occupancy: 0,
            ingress_valid,
            ingress_tlp,
            egress_valid,
            egress_axi,
            egress_ready,
        }));
        engine.register(&rc_self);
        Ok(rc_self)
    }

    /// High-water mark of FIFO occupancy (held beat included).
    #[must_use]
    pub fn max_occupancy(&self) -> usize {
        self.max_occupancy
    }

    /// Packets currently buffered, held beat included.
    #[must_use]
    pub fn occupancy(&self) -> usize {
        self.fifo.len() + usize::from(self.holding.is_some())
    }
}

impl Clocked for TxBuf {
    fn tick(&mut self, ctx: &SimContext) {
        if !ctx.reset_n {
            self.fifo.clear();
            self.holding = None;
            self.egress_valid.write(false);
            return;
        }

        // Beat taken: the consumer saw our committed valid against its
        // committed ready at this edge.
        if let Some(pkt) = self.holding {
            if self.egress_valid.read() && self.egress_ready.read() {
                trace!(self.entity ; "handshake complete for {}", pkt);
                self.holding = None;
            }
        }

        if self.ingress_valid.read() {
            let pkt = self.ingress_tlp.read();
            if self.fifo.len() < self.depth {
                self.fifo.push_back(pkt);
            } else {
                warn!(self.entity ; "overflow, dropping {}", pkt);
            }
        }

        let occupancy = self.fifo.len() + usize::from(self.holding.is_some());
        if occupancy > self.max_occupancy {
            self.max_occupancy = occupancy;
            debug!(self.entity ; "occupancy watermark {}", self.max_occupancy);
        }

        if self.holding.is_none() {
            self.holding = self.fifo.pop_front();
        }

        match self.holding {
            Some(pkt) => {
                self.egress_valid.write(true);
                self.egress_axi.write(tlp_to_axi(&pkt));
            }
            None => self.egress_valid.write(false),
        }
    }
}
