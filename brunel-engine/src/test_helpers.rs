// Copyright (c) 2025 Graphcore Ltd. All rights reserved.

//! Helpers shared by the engine and component tests.

use std::cell::RefCell;
use std::rc::Rc;

use brunel_track::entity::Entity;

use crate::engine::Engine;
use crate::signal::{Signal, SignalValue};
use crate::traits::{Clocked, SimContext};

/// Create an engine for a test, with logging initialised.
#[must_use]
pub fn start_test() -> Engine {
    brunel_track::test_helpers::init();
    Engine::new()
}

/// A closure-driven component, used by tests to drive signals cycle by
/// cycle from the edge phase.
pub struct Stimulus<F>
where
    F: FnMut(&SimContext),
{
    #[allow(dead_code)]
    entity: Rc<Entity>,
    drive: F,
}

impl<F> Stimulus<F>
where
    F: FnMut(&SimContext) + 'static,
{
    /// Build and register a stimulus.
    pub fn new_and_register(
        engine: &mut Engine,
        parent: &Rc<Entity>,
        name: &str,
        drive: F,
    ) -> Rc<RefCell<Self>> {
        let entity = Rc::new(Entity::new(parent, name));
        let rc_self = Rc::new(RefCell::new(Self { entity, drive }));
        engine.register(&rc_self);
        rc_self
    }
}

impl<F> Clocked for Stimulus<F>
where
    F: FnMut(&SimContext),
{
    fn tick(&mut self, ctx: &SimContext) {
        (self.drive)(ctx);
    }
}

/// Records the settled value a signal presents at every rising edge.
///
/// The sample for cycle N is the value every edge-phase component saw during
/// cycle N, i.e. the value committed at the end of cycle N-1.
pub struct Monitor<T>
where
    T: SignalValue,
{
    #[allow(dead_code)]
    entity: Rc<Entity>,
    signal: Signal<T>,
    samples: Vec<T>,
}

impl<T> Monitor<T>
where
    T: SignalValue,
{
    /// Build and register a monitor on `signal`.
    pub fn new_and_register(
        engine: &mut Engine,
        parent: &Rc<Entity>,
        name: &str,
        signal: &Signal<T>,
    ) -> Rc<RefCell<Self>> {
        let entity = Rc::new(Entity::new(parent, name));
        let rc_self = Rc::new(RefCell::new(Self {
            entity,
            signal: signal.clone(),
            samples: Vec::new(),
        }));
        engine.register(&rc_self);
        rc_self
    }

    /// The recorded samples, one per executed cycle.
    #[must_use]
    pub fn samples(&self) -> &[T] {
        &self.samples
    }
}

impl<T> Clocked for Monitor<T>
where
    T: SignalValue,
{
    fn tick(&mut self, _ctx: &SimContext) {
        self.samples.push(self.signal.read());
    }
}
