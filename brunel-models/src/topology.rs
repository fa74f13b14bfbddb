// Copyright (c) 2025 Graphcore Ltd. All rights reserved.

//! Topology builders.
//!
//! Two arrangements of the same producer/consumer pair:
//!
//! - [`build_direct`]: `RC -> EP` with the credit bus wired straight back.
//! - [`build_tunneled`]: `RC -> TxBuf -> DataNoC -> RxBuf -> EP`, with the
//!   credits returning over `EP -> CreditPacker -> CreditNoC -> CreditPulser
//!   -> RC`.
//!
//! The builders create every interconnect signal under a named entity and
//! return handles to the components so drivers and tests can read their
//! statistics afterwards.

use std::cell::RefCell;
use std::rc::Rc;

use brunel_engine::engine::Engine;
use brunel_engine::signal::Signal;
use brunel_engine::sim_error;
use brunel_engine::types::SimError;
use brunel_track::entity::Entity;
use brunel_components::credit_packer::CreditPacker;
use brunel_components::credit_pulser::CreditPulser;
use brunel_components::noc::AxiNoc;
use brunel_components::rx_buf::RxBuf;
use brunel_components::tx_buf::TxBuf;
use brunel_protocol::{AxiWord, CreditBits, RawTlp};

use crate::endpoint::Endpoint;
use crate::root_complex::RootComplex;

/// Sizes and latencies for the tunneled topology.
#[derive(Clone, Copy, Debug)]
pub struct TunnelConfig {
    pub thread_q_depth: usize,
    pub tx_fifo_depth: usize,
    pub rx_fifo_depth: usize,
    pub credit_sense_window: usize,
    pub data_noc_latency: usize,
    pub data_noc_stall_pct: usize,
    pub credit_noc_latency: usize,
    pub credit_noc_stall_pct: usize,
    pub noc_pattern_len: usize,
}

impl Default for TunnelConfig {
    fn default() -> Self {
        Self {
            thread_q_depth: 8,
            tx_fifo_depth: 1024,
            rx_fifo_depth: 24,
            credit_sense_window: 8,
            data_noc_latency: 100,
            data_noc_stall_pct: 5,
            credit_noc_latency: 100,
            credit_noc_stall_pct: 5,
            noc_pattern_len: 100,
        }
    }
}

impl TunnelConfig {
    /// Reject configurations the components cannot represent.
    pub fn validate(&self) -> Result<(), SimError> {
        if self.data_noc_stall_pct >= 100 || self.credit_noc_stall_pct >= 100 {
            return sim_error!("NoC stall percentage must be <100");
        }
        if self.thread_q_depth == 0
            || self.tx_fifo_depth == 0
            || self.rx_fifo_depth == 0
            || self.credit_sense_window == 0
            || self.data_noc_latency == 0
            || self.credit_noc_latency == 0
            || self.noc_pattern_len == 0
        {
            return sim_error!("sizes, latencies and the credit window must be non-zero");
        }
        Ok(())
    }
}

/// Handles onto the direct `RC -> EP` arrangement.
pub struct DirectTopology {
    pub rc: Rc<RefCell<RootComplex>>,
    pub ep: Rc<RefCell<Endpoint>>,
    pub raw_valid: Signal<bool>,
    pub raw_tlp: Signal<RawTlp>,
    pub credit_bus: Signal<CreditBits>,
}

/// Build the direct topology under `parent::name`.
pub fn build_direct(
    engine: &mut Engine,
    parent: &Rc<Entity>,
    name: &str,
    thread_q_depth: usize,
) -> Result<DirectTopology, SimError> {
    let entity = Rc::new(Entity::new(parent, name));

    let raw_valid = engine.signal::<bool>(&entity, "raw_valid")?;
    let raw_tlp = engine.signal::<RawTlp>(&entity, "raw_tlp")?;
    let credit_bus = engine.signal::<CreditBits>(&entity, "credit")?;

    let rc = RootComplex::new_and_register(
        engine,
        &entity,
        "rc",
        credit_bus.clone(),
        raw_valid.clone(),
        raw_tlp.clone(),
    )?;
    let ep = Endpoint::new_and_register(
        engine,
        &entity,
        "ep",
        thread_q_depth,
        raw_valid.clone(),
        raw_tlp.clone(),
        credit_bus.clone(),
    )?;

    Ok(DirectTopology {
        rc,
        ep,
        raw_valid,
        raw_tlp,
        credit_bus,
    })
}

/// Handles onto the tunneled arrangement.
pub struct TunneledTopology {
    pub rc: Rc<RefCell<RootComplex>>,
    pub ep: Rc<RefCell<Endpoint>>,
    pub tx_buf: Rc<RefCell<TxBuf>>,
    pub data_noc: Rc<RefCell<AxiNoc>>,
    pub rx_buf: Rc<RefCell<RxBuf>>,
    pub credit_packer: Rc<RefCell<CreditPacker>>,
    pub credit_noc: Rc<RefCell<AxiNoc>>,
    pub credit_pulser: Rc<RefCell<CreditPulser>>,

    pub raw_valid: Signal<bool>,
    pub raw_tlp: Signal<RawTlp>,
    /// Credit bus at the EP side, before packing.
    pub ep_credit_bus: Signal<CreditBits>,
    /// Credit bus at the RC side, after the pulser replays it.
    pub rc_credit_bus: Signal<CreditBits>,
}

/// Build the tunneled topology under `parent::name`.
pub fn build_tunneled(
    engine: &mut Engine,
    parent: &Rc<Entity>,
    name: &str,
    config: &TunnelConfig,
) -> Result<TunneledTopology, SimError> {
    config.validate()?;
    let entity = Rc::new(Entity::new(parent, name));

    // RC -> TxBuf
    let raw_valid = engine.signal::<bool>(&entity, "raw_valid")?;
    let raw_tlp = engine.signal::<RawTlp>(&entity, "raw_tlp")?;
    // TxBuf <-> DataNoC
    let tx_valid = engine.signal::<bool>(&entity, "tx_valid")?;
    let tx_axi = engine.signal::<AxiWord>(&entity, "tx_axi")?;
    let tx_ready = engine.signal::<bool>(&entity, "tx_ready")?;
    // DataNoC <-> RxBuf
    let rx_valid = engine.signal::<bool>(&entity, "rx_valid")?;
    let rx_axi = engine.signal::<AxiWord>(&entity, "rx_axi")?;
    let rx_ready = engine.signal::<bool>(&entity, "rx_ready")?;
    // RxBuf -> EP front-end
    let ep_valid = engine.signal::<bool>(&entity, "ep_valid")?;
    let ep_tlp = engine.signal::<RawTlp>(&entity, "ep_tlp")?;
    // EP -> CreditPacker
    let ep_credit_bus = engine.signal::<CreditBits>(&entity, "ep_credit")?;
    // CreditPacker <-> CreditNoC
    let pk_valid = engine.signal::<bool>(&entity, "pk_valid")?;
    let pk_axi = engine.signal::<AxiWord>(&entity, "pk_axi")?;
    let pk_ready = engine.signal::<bool>(&entity, "pk_ready")?;
    // CreditNoC <-> CreditPulser
    let pl_valid = engine.signal::<bool>(&entity, "pl_valid")?;
    let pl_axi = engine.signal::<AxiWord>(&entity, "pl_axi")?;
    let pl_ready = engine.signal::<bool>(&entity, "pl_ready")?;
    // CreditPulser -> RC
    let rc_credit_bus = engine.signal::<CreditBits>(&entity, "rc_credit")?;

    let rc = RootComplex::new_and_register(
        engine,
        &entity,
        "rc",
        rc_credit_bus.clone(),
        raw_valid.clone(),
        raw_tlp.clone(),
    )?;
    let tx_buf = TxBuf::new_and_register(
        engine,
        &entity,
        "tx_buf",
        config.tx_fifo_depth,
        raw_valid.clone(),
        raw_tlp.clone(),
        tx_valid.clone(),
        tx_axi.clone(),
        tx_ready.clone(),
    )?;
    let data_noc = AxiNoc::new_and_register(
        engine,
        &entity,
        "data_noc",
        config.data_noc_latency,
        config.noc_pattern_len,
        config.data_noc_stall_pct,
        tx_valid.clone(),
        tx_axi.clone(),
        tx_ready.clone(),
        rx_valid.clone(),
        rx_axi.clone(),
        rx_ready.clone(),
    )?;
    let rx_buf = RxBuf::new_and_register(
        engine,
        &entity,
        "rx_buf",
        config.rx_fifo_depth,
        rx_valid.clone(),
        rx_axi.clone(),
        rx_ready.clone(),
        ep_valid.clone(),
        ep_tlp.clone(),
    )?;
    let ep = Endpoint::new_and_register(
        engine,
        &entity,
        "ep",
        config.thread_q_depth,
        ep_valid.clone(),
        ep_tlp.clone(),
        ep_credit_bus.clone(),
    )?;
    let credit_packer = CreditPacker::new_and_register(
        engine,
        &entity,
        "credit_packer",
        config.credit_sense_window,
        ep_credit_bus.clone(),
        pk_valid.clone(),
        pk_axi.clone(),
        pk_ready.clone(),
    )?;
    let credit_noc = AxiNoc::new_and_register(
        engine,
        &entity,
        "credit_noc",
        config.credit_noc_latency,
        config.noc_pattern_len,
        config.credit_noc_stall_pct,
        pk_valid.clone(),
        pk_axi.clone(),
        pk_ready.clone(),
        pl_valid.clone(),
        pl_axi.clone(),
        pl_ready.clone(),
    )?;
    let credit_pulser = CreditPulser::new_and_register(
        engine,
        &entity,
        "credit_pulser",
        pl_valid.clone(),
        pl_axi.clone(),
        pl_ready.clone(),
        rc_credit_bus.clone(),
    )?;

    Ok(TunneledTopology {
        rc,
        ep,
        tx_buf,
        data_noc,
        rx_buf,
        credit_packer,
        credit_noc,
        credit_pulser,
        raw_valid,
        raw_tlp,
        ep_credit_bus,
        rc_credit_bus,
    })
}
