// Copyright (c) 2025 Graphcore Ltd. All rights reserved.

//! The engine.
//!
//! The [`Engine`] owns the clock, the component list and every named signal.
//! Each call to [step()](Engine::step) executes one rising edge as described
//! in the [crate docs](crate): edge pass, commit, settle pass, commit,
//! observers.

use std::cell::RefCell;
use std::collections::HashSet;
use std::rc::Rc;

use brunel_track::entity::{toplevel, Entity};
use log::trace;

use crate::clock::Clock;
use crate::observer::{CycleObserver, SignalSample};
use crate::signal::{AnySignal, Signal, SignalValue};
use crate::sim_error;
use crate::traits::{Clocked, SimContext};
use crate::types::{Cycle, SimError};

struct RegisteredComponent {
    component: Rc<RefCell<dyn Clocked>>,
    needs_settle: bool,
}

struct RegisteredSignal {
    name: Rc<str>,
    signal: Rc<dyn AnySignal>,
}

/// The simulation engine.
pub struct Engine {
    clock: Clock,
    top: Rc<Entity>,
    components: Vec<RegisteredComponent>,
    signals: Vec<RegisteredSignal>,
    signal_names: HashSet<String>,
    observers: Vec<Box<dyn CycleObserver>>,
    cycle: Cycle,
    popping_enabled: bool,
    forced_reset_cycles: Cycle,
}

impl Default for Engine {
    fn default() -> Self {
        Self::new()
    }
}

impl Engine {
    /// Create an engine with the default 100 ns clock and 20 ns reset window.
    #[must_use]
    pub fn new() -> Self {
        Self::with_clock(Clock::default())
    }

    /// Create an engine with an explicit clock.
    #[must_use]
    pub fn with_clock(clock: Clock) -> Self {
        Self {
            clock,
            top: toplevel("top"),
            components: Vec::new(),
            signals: Vec::new(),
            signal_names: HashSet::new(),
            observers: Vec::new(),
            cycle: 0,
            popping_enabled: true,
            forced_reset_cycles: 0,
        }
    }

    /// The top-level entity that every model hangs off.
    #[must_use]
    pub fn top(&self) -> &Rc<Entity> {
        &self.top
    }

    /// The clock timing in use.
    #[must_use]
    pub fn clock(&self) -> &Clock {
        &self.clock
    }

    /// Register a component. Its [needs_settle](Clocked::needs_settle) choice
    /// is sampled here.
    pub fn register<C>(&mut self, component: &Rc<RefCell<C>>)
    where
        C: Clocked + 'static,
    {
        let needs_settle = component.borrow().needs_settle();
        let component: Rc<RefCell<dyn Clocked>> = component.clone();
        self.components.push(RegisteredComponent {
            component,
            needs_settle,
        });
    }

    /// Create a named signal. Fails if the full hierarchical name is already
    /// taken.
    pub fn signal<T>(&mut self, parent: &Rc<Entity>, name: &str) -> Result<Signal<T>, SimError>
    where
        T: SignalValue,
    {
        let entity = Rc::new(Entity::new(parent, name));
        let full_name = entity.full_name();
        if !self.signal_names.insert(full_name.clone()) {
            return sim_error!(format!("signal {full_name} already exists"));
        }
        let signal = Signal::<T>::new(entity);
        self.signals.push(RegisteredSignal {
            name: Rc::from(full_name.as_str()),
            signal: Rc::new(signal.clone()),
        });
        Ok(signal)
    }

    /// Register a per-cycle observer.
    pub fn add_observer(&mut self, observer: Box<dyn CycleObserver>) {
        self.observers.push(observer);
    }

    /// The next cycle to execute.
    #[must_use]
    pub fn cycle(&self) -> Cycle {
        self.cycle
    }

    /// Simulated time of the next rising edge.
    #[must_use]
    pub fn time_now_ns(&self) -> u64 {
        self.clock.time_at(self.cycle)
    }

    /// Toggle the global popping flag observed by endpoint poppers.
    pub fn set_popping_enabled(&mut self, enabled: bool) {
        self.popping_enabled = enabled;
    }

    /// Re-assert synchronous reset for the next `cycles` rising edges.
    pub fn assert_reset(&mut self, cycles: Cycle) {
        self.forced_reset_cycles = cycles;
    }

    fn commit_signals(&self) {
        for registered in &self.signals {
            registered.signal.commit();
        }
    }

    fn snapshot(&self) -> Vec<SignalSample> {
        self.signals
            .iter()
            .map(|registered| SignalSample {
                name: registered.name.clone(),
                bits: registered.signal.trace_bits(),
            })
            .collect()
    }

    /// Execute one rising edge.
    pub fn step(&mut self) {
        let startup_reset = self.clock.in_reset(self.cycle);
        let forced_reset = self.forced_reset_cycles > 0;
        if forced_reset {
            self.forced_reset_cycles -= 1;
        }
        let ctx = SimContext {
            cycle: self.cycle,
            time_ns: self.clock.time_at(self.cycle),
            reset_n: !(startup_reset || forced_reset),
            popping_enabled: self.popping_enabled,
        };
        trace!(
            "cycle {} @{}ns reset_n={}",
            ctx.cycle,
            ctx.time_ns,
            ctx.reset_n
        );

        for registered in &self.components {
            registered.component.borrow_mut().tick(&ctx);
        }
        self.commit_signals();

        for registered in &self.components {
            if registered.needs_settle {
                registered.component.borrow_mut().settle(&ctx);
            }
        }
        self.commit_signals();

        if !self.observers.is_empty() {
            let samples = self.snapshot();
            for observer in &mut self.observers {
                observer.cycle_end(&ctx, &samples);
            }
        }

        self.cycle += 1;
    }

    /// Execute `cycles` rising edges.
    pub fn run_cycles(&mut self, cycles: Cycle) {
        for _ in 0..cycles {
            self.step();
        }
    }
}
