// Copyright (c) 2025 Graphcore Ltd. All rights reserved.

use brunel_components::credit_packer::CreditPacker;
use brunel_components::credit_pulser::CreditPulser;
use brunel_engine::engine::Engine;
use brunel_engine::signal::Signal;
use brunel_engine::test_helpers::{start_test, Monitor, Stimulus};
use brunel_protocol::{axi_to_credits, AxiWord, CreditBits};

struct PackerHarness {
    credit_in: Signal<CreditBits>,
    valid_out: Signal<bool>,
    axi_out: Signal<AxiWord>,
    ready_in: Signal<bool>,
}

impl PackerHarness {
    fn build(engine: &mut Engine, window: usize) -> Self {
        let top = engine.top().clone();
        let credit_in = engine.signal::<CreditBits>(&top, "credit_in").unwrap();
        let valid_out = engine.signal::<bool>(&top, "pk_valid").unwrap();
        let axi_out = engine.signal::<AxiWord>(&top, "pk_axi").unwrap();
        let ready_in = engine.signal::<bool>(&top, "pk_ready").unwrap();
        CreditPacker::new_and_register(
            engine,
            &top,
            "packer",
            window,
            credit_in.clone(),
            valid_out.clone(),
            axi_out.clone(),
            ready_in.clone(),
        )
        .unwrap();
        Self {
            credit_in,
            valid_out,
            axi_out,
            ready_in,
        }
    }
}

#[test]
fn emits_one_beat_per_window_when_downstream_is_always_ready() {
    let mut engine = start_test();
    let h = PackerHarness::build(&mut engine, 8);
    let top = engine.top().clone();

    let drive_ready = h.ready_in.clone();
    Stimulus::new_and_register(&mut engine, &top, "stim", move |_ctx| {
        drive_ready.write(true);
    });
    let valid_mon = Monitor::new_and_register(&mut engine, &top, "valid_mon", &h.valid_out);
    let axi_mon = Monitor::new_and_register(&mut engine, &top, "axi_mon", &h.axi_out);

    engine.run_cycles(50);

    // The first window closes on cycle 8 (cycle 0 is reset), and emission
    // repeats every 8 cycles with single-cycle assertions.
    let high: Vec<usize> = valid_mon
        .borrow()
        .samples()
        .iter()
        .enumerate()
        .filter_map(|(i, level)| level.then_some(i))
        .collect();
    assert_eq!(high, vec![9, 17, 25, 33, 41, 49]);

    // No credits arrived, so every beat is an explicit empty window.
    for index in &high {
        let word = axi_mon.borrow().samples()[*index];
        assert_eq!(axi_to_credits(&word), [0, 0, 0]);
    }
}

#[test]
fn accumulates_pulses_into_the_window_beat() {
    let mut engine = start_test();
    let h = PackerHarness::build(&mut engine, 8);
    let top = engine.top().clone();

    // Thread 1 pulses on five cycles and thread 3 on one; all the pulses
    // land inside the first window.
    let drive_credit = h.credit_in.clone();
    let drive_ready = h.ready_in.clone();
    Stimulus::new_and_register(&mut engine, &top, "stim", move |ctx| {
        let mut bits = CreditBits::default();
        if (1..=5).contains(&ctx.cycle) {
            bits.set(0);
        }
        if ctx.cycle == 3 {
            bits.set(2);
        }
        drive_credit.write(bits);
        drive_ready.write(true);
    });
    let valid_mon = Monitor::new_and_register(&mut engine, &top, "valid_mon", &h.valid_out);
    let axi_mon = Monitor::new_and_register(&mut engine, &top, "axi_mon", &h.axi_out);

    engine.run_cycles(20);

    let first_high = valid_mon
        .borrow()
        .samples()
        .iter()
        .position(|level| *level)
        .unwrap();
    assert_eq!(first_high, 9);
    let word = axi_mon.borrow().samples()[first_high];
    assert_eq!(axi_to_credits(&word), [5, 0, 1]);
}

#[test]
fn windows_stretch_under_backpressure() {
    let mut engine = start_test();
    let h = PackerHarness::build(&mut engine, 4);
    let top = engine.top().clone();

    // The downstream only becomes ready at cycle 10, so the first beat
    // waits and the second window starts late.
    let drive_ready = h.ready_in.clone();
    Stimulus::new_and_register(&mut engine, &top, "stim", move |ctx| {
        drive_ready.write(ctx.cycle >= 10);
    });
    let valid_mon = Monitor::new_and_register(&mut engine, &top, "valid_mon", &h.valid_out);

    engine.run_cycles(24);

    // First beat drives from cycle 4 until accepted at cycle 11 (ready
    // committed on cycle 10); the window counter then restarts, closing the
    // following windows 4 cycles apart again.
    let samples = valid_mon.borrow().samples().to_vec();
    let high: Vec<usize> = samples
        .iter()
        .enumerate()
        .filter_map(|(i, level)| level.then_some(i))
        .collect();
    assert_eq!(high, vec![5, 6, 7, 8, 9, 10, 11, 15, 19, 23]);
}

/// Packer wired straight into a pulser: every pulse in is replayed exactly
/// once on the far side.
#[test]
fn packer_to_pulser_conserves_pulses() {
    let mut engine = start_test();
    let h = PackerHarness::build(&mut engine, 8);
    let top = engine.top().clone();
    let credit_out = engine.signal::<CreditBits>(&top, "credit_out").unwrap();
    CreditPulser::new_and_register(
        &mut engine,
        &top,
        "pulser",
        h.valid_out.clone(),
        h.axi_out.clone(),
        h.ready_in.clone(),
        credit_out.clone(),
    )
    .unwrap();

    let drive_credit = h.credit_in.clone();
    Stimulus::new_and_register(&mut engine, &top, "stim", move |ctx| {
        let mut bits = CreditBits::default();
        // 5 pulses for thread 1, 2 for thread 2, 1 for thread 3, spread
        // over two windows.
        if (1..=5).contains(&ctx.cycle) {
            bits.set(0);
        }
        if ctx.cycle == 2 || ctx.cycle == 9 {
            bits.set(1);
        }
        if ctx.cycle == 12 {
            bits.set(2);
        }
        drive_credit.write(bits);
    });
    let out_mon = Monitor::new_and_register(&mut engine, &top, "out_mon", &credit_out);

    engine.run_cycles(40);

    let mut replayed = [0u32; 3];
    for bits in out_mon.borrow().samples() {
        for (index, count) in replayed.iter_mut().enumerate() {
            if bits.bit(index) {
                *count += 1;
            }
        }
    }
    assert_eq!(replayed, [5, 2, 1]);
}

#[test]
fn pulser_refuses_a_new_beat_until_drained() {
    let mut engine = start_test();
    let top = engine.top().clone();
    let valid_in = engine.signal::<bool>(&top, "valid_in").unwrap();
    let axi_in = engine.signal::<AxiWord>(&top, "axi_in").unwrap();
    let ready_out = engine.signal::<bool>(&top, "ready_out").unwrap();
    let credit_out = engine.signal::<CreditBits>(&top, "credit_out").unwrap();
    CreditPulser::new_and_register(
        &mut engine,
        &top,
        "pulser",
        valid_in.clone(),
        axi_in.clone(),
        ready_out.clone(),
        credit_out.clone(),
    )
    .unwrap();

    // Present a beat with a 3-deep count on thread 1; the presentation ends
    // once the transfer has happened on cycle 2.
    let drive_valid = valid_in.clone();
    let drive_axi = axi_in.clone();
    Stimulus::new_and_register(&mut engine, &top, "stim", move |ctx| {
        drive_valid.write(ctx.cycle == 1 || ctx.cycle == 2);
        drive_axi.write(brunel_protocol::credits_to_axi(&[3, 0, 0]));
    });
    let ready_mon = Monitor::new_and_register(&mut engine, &top, "ready_mon", &ready_out);
    let credit_mon = Monitor::new_and_register(&mut engine, &top, "credit_mon", &credit_out);

    engine.run_cycles(10);

    // Beat accepted on cycle 2; three pulses replay on cycles 3..=5
    // (committed view on 4..=6); ready stays low until the drain completes.
    let credits = credit_mon.borrow().samples().to_vec();
    let pulses: Vec<usize> = credits
        .iter()
        .enumerate()
        .filter_map(|(i, bits)| bits.bit(0).then_some(i))
        .collect();
    assert_eq!(pulses, vec![4, 5, 6]);

    let ready = ready_mon.borrow().samples().to_vec();
    // Committed ready: high after reset, low from the acceptance until the
    // drain completes, then high again.
    assert!(ready[2]);
    assert!(!ready[3] && !ready[4] && !ready[5]);
    assert!(ready[6] && ready[7]);
}
