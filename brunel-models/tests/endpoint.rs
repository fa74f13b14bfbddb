// Copyright (c) 2025 Graphcore Ltd. All rights reserved.

use std::cell::RefCell;
use std::rc::Rc;

use brunel_engine::engine::Engine;
use brunel_engine::signal::Signal;
use brunel_engine::test_helpers::{start_test, Stimulus};
use brunel_models::endpoint::Endpoint;
use brunel_protocol::{CreditBits, RawTlp};

struct EpHarness {
    ep: Rc<RefCell<Endpoint>>,
    raw_valid: Signal<bool>,
    raw_tlp: Signal<RawTlp>,
}

impl EpHarness {
    fn build(engine: &mut Engine, queue_capacity: usize) -> Self {
        let top = engine.top().clone();
        let raw_valid = engine.signal::<bool>(&top, "raw_valid").unwrap();
        let raw_tlp = engine.signal::<RawTlp>(&top, "raw_tlp").unwrap();
        let credit = engine.signal::<CreditBits>(&top, "credit").unwrap();
        let ep = Endpoint::new_and_register(
            engine,
            &top,
            "ep",
            queue_capacity,
            raw_valid.clone(),
            raw_tlp.clone(),
            credit.clone(),
        )
        .unwrap();
        Self {
            ep,
            raw_valid,
            raw_tlp,
        }
    }
}

/// Drive two packets per thread on cycles 1..=6, rotating thread ids.
fn six_packet_stimulus(engine: &mut Engine, h: &EpHarness) {
    let top = engine.top().clone();
    let drive_valid = h.raw_valid.clone();
    let drive_tlp = h.raw_tlp.clone();
    Stimulus::new_and_register(engine, &top, "stim", move |ctx| {
        let sending = (1..=6).contains(&ctx.cycle);
        drive_valid.write(sending);
        if sending {
            drive_tlp.write(RawTlp {
                seq_num: ctx.cycle as u32,
                thread_id: ((ctx.cycle - 1) % 3 + 1) as u8,
            });
        }
    });
}

#[test]
fn popper_drains_all_queues_at_one_in_four_cycles() {
    let mut engine = start_test();
    let h = EpHarness::build(&mut engine, 8);
    six_packet_stimulus(&mut engine, &h);

    engine.run_cycles(16);

    let ep = h.ep.borrow();
    assert_eq!(ep.num_delivered(), 6);
    assert_eq!(ep.histogram(), [2, 2, 2]);

    let seqs: Vec<u32> = ep.delivered().iter().map(|pkt| pkt.seq_num).collect();
    let mut sorted = seqs.clone();
    sorted.sort_unstable();
    assert_eq!(sorted, vec![1, 2, 3, 4, 5, 6]);
}

#[test]
fn nothing_is_delivered_while_popping_is_disabled() {
    let mut engine = start_test();
    let h = EpHarness::build(&mut engine, 8);
    six_packet_stimulus(&mut engine, &h);

    engine.set_popping_enabled(false);
    engine.run_cycles(16);

    let ep = h.ep.borrow();
    assert_eq!(ep.num_delivered(), 0);
    // The packets are parked in the per-thread queues.
    let held: usize = (0..3)
        .map(|i| ep.front().borrow().queue(i).borrow().occupancy())
        .sum();
    assert_eq!(held, 6);

    // Re-enabling the flag lets the popper catch up.
    engine.set_popping_enabled(true);
    engine.run_cycles(16);
    assert_eq!(h.ep.borrow().num_delivered(), 6);
}

#[test]
fn delivered_packets_arrive_on_the_queue_matching_their_thread() {
    let mut engine = start_test();
    let h = EpHarness::build(&mut engine, 8);
    six_packet_stimulus(&mut engine, &h);

    engine.run_cycles(20);

    let ep = h.ep.borrow();
    for pkt in ep.delivered() {
        assert!(pkt.queue_index().is_some());
    }
    // Per-thread delivery preserves the arrival order.
    for thread in 1..=3u8 {
        let seqs: Vec<u32> = ep
            .delivered()
            .iter()
            .filter(|pkt| pkt.thread_id == thread)
            .map(|pkt| pkt.seq_num)
            .collect();
        assert!(seqs.windows(2).all(|pair| pair[1] > pair[0]));
    }
}
