// Copyright (c) 2025 Graphcore Ltd. All rights reserved.

//! Simulation components.
//!
//! The building blocks of the credit-tunneled transport. Every component is
//! a [Clocked](brunel_engine::traits::Clocked) struct created with a
//! `new_and_register` constructor that binds its ports
//! ([signals](brunel_engine::signal::Signal)) at construction time.
//!
//! # Handshakes
//!
//! All valid/ready interfaces here are registered: both endpoints evaluate
//! the transfer condition `valid.read() && ready.read()` from the same
//! committed values at the same edge, so the producer's release decision and
//! the consumer's acceptance decision always agree. A producer keeps driving
//! a beat until the committed ready confirms it was taken; a consumer drives
//! its ready from its own pre-cycle state, never from a same-cycle pending
//! write. Under this discipline no beat is dropped or duplicated once it has
//! been presented against an asserted ready.

pub mod credit_packer;
pub mod credit_pulser;
pub mod duty_monitor;
pub mod front_end;
pub mod noc;
pub mod rx_buf;
pub mod threaded_queue;
pub mod tx_buf;
