// Copyright (c) 2025 Graphcore Ltd. All rights reserved.

//! `Brunel` - cycle engine
//!
//! This library provides the core of the Brunel engine which executes
//! cycle-accurate simulations of clocked
//! [components](../brunel_components/index.html).
//!
//! # Execution model
//!
//! The engine advances a single global clock. Every rising edge runs in two
//! observable micro-phases:
//!
//!  1. **Edge phase** - every registered component's
//!     [tick()](crate::traits::Clocked::tick) runs once. Components sample
//!     their input [signals](crate::signal::Signal) as of the previous
//!     settled state and write their outputs.
//!  2. **Delta-settle phase** - the edge-phase writes are committed, then the
//!     [settle()](crate::traits::Clocked::settle) pass runs over the
//!     components that opted in. A settling component may re-sample another
//!     component's same-cycle write before driving its final outputs.
//!
//! Signal writes made during a pass are not visible within that pass, so the
//! order in which independent components run never changes the result.
//!
//! # Simple simulation
//!
//! ```rust
//! use brunel_engine::engine::Engine;
//! use brunel_engine::test_helpers::{Monitor, Stimulus};
//!
//! let mut engine = Engine::new();
//! let top = engine.top().clone();
//! let sig = engine.signal::<u32>(&top, "value").unwrap();
//!
//! let out = sig.clone();
//! Stimulus::new_and_register(&mut engine, &top, "stim", move |ctx| {
//!     out.write(ctx.cycle as u32);
//! });
//! let monitor = Monitor::new_and_register(&mut engine, &top, "mon", &sig);
//!
//! engine.run_cycles(4);
//! // A write in cycle N is observable from cycle N + 1.
//! assert_eq!(monitor.borrow().samples(), &[0, 0, 1, 2]);
//! ```

pub mod clock;
pub mod engine;
pub mod observer;
pub mod signal;
pub mod test_helpers;
pub mod traits;
pub mod types;
