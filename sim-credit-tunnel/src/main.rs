// Copyright (c) 2025 Graphcore Ltd. All rights reserved.

//! Compare direct and windowed credit return on one simulation.
//!
//! Two topologies are instantiated on a shared clock: a direct `RC -> EP`
//! pair with the credit bus wired straight back, and a tunneled pair whose
//! data and credits travel over fixed-latency NoCs with the credits packed
//! into windowed beats. The run has two phases: popping is enabled for the
//! first half of the simulated time and disabled for the second, and the
//! duty-cycle monitor reports how busy each credit bus was.

use clap::Parser;
use indicatif::ProgressBar;
use log::LevelFilter;

use brunel_components::duty_monitor::DutyMonitor;
use brunel_engine::engine::Engine;
use brunel_engine::observer::{CycleObserver, SignalSample};
use brunel_engine::traits::SimContext;
use brunel_engine::types::SimError;
use brunel_models::topology::{build_direct, build_tunneled, TunnelConfig};
use brunel_track::info;

/// Command-line arguments.
#[derive(Parser)]
#[command(about = "Credit-tunnel throughput and duty-cycle comparison")]
struct Cli {
    /// Enable logging to the console.
    #[arg(long, default_value = "false")]
    stdout: bool,

    /// Level of log message to display.
    #[arg(long, default_value = "Info")]
    stdout_level: log::Level,

    /// Show a progress bar over simulated cycles.
    #[arg(long)]
    progress: bool,

    /// Dump every named signal at each cycle boundary (trace level).
    #[arg(long)]
    trace_signals: bool,

    /// Total simulated microseconds. Popping is disabled at the halfway
    /// mark.
    #[arg(long, default_value = "10000")]
    sim_time_us: u64,

    /// Per-thread queue depth inside each endpoint.
    #[arg(long, default_value = "8")]
    thread_q_depth: usize,

    /// TX buffer depth on the tunneled data path.
    #[arg(long, default_value = "1024")]
    tx_fifo_depth: usize,

    /// RX buffer depth on the tunneled data path.
    #[arg(long, default_value = "24")]
    rx_fifo_depth: usize,

    /// Credit aggregation window in cycles.
    #[arg(long, default_value = "8")]
    credit_sense_window: usize,

    /// Data NoC pipeline latency in cycles.
    #[arg(long, default_value = "100")]
    data_noc_latency: usize,

    /// Data NoC stall percentage, in [0, 99].
    #[arg(long, default_value = "5")]
    data_noc_stall_pct: usize,

    /// Credit NoC pipeline latency in cycles.
    #[arg(long, default_value = "100")]
    credit_noc_latency: usize,

    /// Credit NoC stall percentage, in [0, 99].
    #[arg(long, default_value = "5")]
    credit_noc_stall_pct: usize,

    /// Stall pattern resolution in cycles.
    #[arg(long, default_value = "100")]
    noc_pattern_len: usize,
}

impl Cli {
    fn tunnel_config(&self) -> TunnelConfig {
        TunnelConfig {
            thread_q_depth: self.thread_q_depth,
            tx_fifo_depth: self.tx_fifo_depth,
            rx_fifo_depth: self.rx_fifo_depth,
            credit_sense_window: self.credit_sense_window,
            data_noc_latency: self.data_noc_latency,
            data_noc_stall_pct: self.data_noc_stall_pct,
            credit_noc_latency: self.credit_noc_latency,
            credit_noc_stall_pct: self.credit_noc_stall_pct,
            noc_pattern_len: self.noc_pattern_len,
        }
    }
}

/// An external tracer on the engine's per-cycle snapshot interface.
struct SignalTracer;

impl CycleObserver for SignalTracer {
    fn cycle_end(&mut self, ctx: &SimContext, signals: &[SignalSample]) {
        for sample in signals {
            log::trace!(
                "cycle {} @{}ns {} = {:#x}",
                ctx.cycle,
                ctx.time_ns,
                sample.name,
                sample.bits
            );
        }
    }
}

fn run_phase(engine: &mut Engine, cycles: u64, progress: Option<&ProgressBar>) {
    const CHUNK: u64 = 1024;
    let mut remaining = cycles;
    while remaining > 0 {
        let step = remaining.min(CHUNK);
        engine.run_cycles(step);
        if let Some(bar) = progress {
            bar.inc(step);
        }
        remaining -= step;
    }
}

fn main() -> Result<(), SimError> {
    let args = Cli::parse();

    env_logger::Builder::new()
        .filter_level(if args.stdout {
            args.stdout_level.to_level_filter()
        } else {
            LevelFilter::Off
        })
        .init();

    let config = args.tunnel_config();
    config.validate()?;

    let mut engine = Engine::new();
    let top = engine.top().clone();
    info!(top ;
        "Direct and tunneled topologies, {}us at {}ns/cycle, window={}, NoC latency {}/{}",
        args.sim_time_us,
        engine.clock().period_ns(),
        config.credit_sense_window,
        config.data_noc_latency,
        config.credit_noc_latency
    );

    let direct = build_direct(&mut engine, &top, "direct", config.thread_q_depth)?;
    let tunneled = build_tunneled(&mut engine, &top, "tunneled", &config)?;
    let monitor = DutyMonitor::new_and_register(
        &mut engine,
        &top,
        "duty_mon",
        direct.credit_bus.clone(),
        tunneled.rc_credit_bus.clone(),
    )?;

    if args.trace_signals {
        engine.add_observer(Box::new(SignalTracer));
    }

    let total_cycles = engine.clock().cycles_per_us(args.sim_time_us);
    let half_cycles = total_cycles / 2;
    let progress_bar = args.progress.then(|| ProgressBar::new(total_cycles));

    info!(top ; "Phase 1: popping enabled for {} cycles", half_cycles);
    engine.set_popping_enabled(true);
    run_phase(&mut engine, half_cycles, progress_bar.as_ref());

    info!(top ; "Phase 2: popping disabled for {} cycles", total_cycles - half_cycles);
    engine.set_popping_enabled(false);
    run_phase(&mut engine, total_cycles - half_cycles, progress_bar.as_ref());

    if let Some(bar) = progress_bar {
        bar.finish();
    }

    let (pct_direct, pct_tunneled) = monitor.borrow().report();
    println!("---- Credit bus duty cycle ----");
    println!("Direct bus  : {pct_direct:.3} %");
    println!("Tunneled bus: {pct_tunneled:.3} %");
    println!("---- Delivery ----");
    println!(
        "Direct  : sent {} delivered {} histogram {:?}",
        direct.rc.borrow().packets_sent(),
        direct.ep.borrow().num_delivered(),
        direct.ep.borrow().histogram()
    );
    println!(
        "Tunneled: sent {} delivered {} histogram {:?}",
        tunneled.rc.borrow().packets_sent(),
        tunneled.ep.borrow().num_delivered(),
        tunneled.ep.borrow().histogram()
    );
    println!("---- Buffers ----");
    println!(
        "TX fifo watermark {} / RX fifo watermark {}",
        tunneled.tx_buf.borrow().max_occupancy(),
        tunneled.rx_buf.borrow().max_occupancy()
    );

    info!(top ; "Done after {} cycles ({}ns)", engine.cycle(), engine.time_now_ns());
    Ok(())
}
