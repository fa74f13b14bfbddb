// Copyright (c) 2025 Graphcore Ltd. All rights reserved.

//! Shared wiring for the component tests.

use std::cell::RefCell;
use std::rc::Rc;

use brunel_components::threaded_queue::ThreadedQueue;
use brunel_engine::engine::Engine;
use brunel_engine::signal::Signal;
use brunel_protocol::RawTlp;

/// A single queue with its three port signals.
pub struct QueueHarness {
    pub queue: Rc<RefCell<ThreadedQueue>>,
    pub valid_in: Signal<bool>,
    pub tlp_in: Signal<RawTlp>,
    pub credit_out: Signal<bool>,
}

impl QueueHarness {
    pub fn build(engine: &mut Engine, capacity: usize) -> Self {
        let top = engine.top().clone();
        let valid_in = engine.signal::<bool>(&top, "q_valid").unwrap();
        let tlp_in = engine.signal::<RawTlp>(&top, "q_tlp").unwrap();
        let credit_out = engine.signal::<bool>(&top, "q_credit").unwrap();
        let queue = ThreadedQueue::new_and_register(
            engine,
            &top,
            "queue",
            capacity,
            valid_in.clone(),
            tlp_in.clone(),
            credit_out.clone(),
        )
        .unwrap();
        Self {
            queue,
            valid_in,
            tlp_in,
            credit_out,
        }
    }
}
