// Copyright (c) 2025 Graphcore Ltd. All rights reserved.

//! Credit bus duty-cycle monitor.
//!
//! Samples the direct and tunneled credit buses every cycle and reports the
//! percentage of cycles each bus had any bit set.

use std::cell::RefCell;
use std::rc::Rc;

use brunel_engine::engine::Engine;
use brunel_engine::signal::Signal;
use brunel_engine::traits::{Clocked, SimContext};
use brunel_engine::types::SimError;
use brunel_track::entity::Entity;
use brunel_protocol::CreditBits;

pub struct DutyMonitor {
    #[allow(dead_code)]
    entity: Rc<Entity>,
    total: u64,
    hi_direct: u64,
    hi_tunneled: u64,

    bus_direct: Signal<CreditBits>,
    bus_tunneled: Signal<CreditBits>,
}

impl DutyMonitor {
    pub fn new_and_register(
        engine: &mut Engine,
        parent: &Rc<Entity>,
        name: &str,
        bus_direct: Signal<CreditBits>,
        bus_tunneled: Signal<CreditBits>,
    ) -> Result<Rc<RefCell<Self>>, SimError> {
        let entity = Rc::new(Entity::new(parent, name));
        let rc_self = Rc::new(RefCell::new(Self {
            entity,
            total: 0,
            hi_direct: 0,
            hi_tunneled: 0,
            bus_direct,
            bus_tunneled,
        }));
        engine.register(&rc_self);
        Ok(rc_self)
    }

    /// Duty percentages `(pct_direct, pct_tunneled)` over all samples.
    #[must_use]
    pub fn report(&self) -> (f64, f64) {
        if self.total == 0 {
            return (0.0, 0.0);
        }
        let pct = |hi: u64| 100.0 * hi as f64 / self.total as f64;
        (pct(self.hi_direct), pct(self.hi_tunneled))
    }

    #[must_use]
    pub fn samples(&self) -> u64 {
        self.total
    }
}

impl Clocked for DutyMonitor {
    fn tick(&mut self, _ctx: &SimContext) {
        self.total += 1;
        if self.bus_direct.read().any() {
            self.hi_direct += 1;
        }
        if self.bus_tunneled.read().any() {
            self.hi_tunneled += 1;
        }
    }
}
