// Copyright (c) 2025 Graphcore Ltd. All rights reserved.

use brunel_components::threaded_queue::ThreadedQueue;
use brunel_engine::test_helpers::{start_test, Monitor, Stimulus};
use brunel_protocol::RawTlp;

mod common;
use common::QueueHarness;

#[test]
fn issues_one_credit_per_free_slot_up_to_capacity() {
    let mut engine = start_test();
    let h = QueueHarness::build(&mut engine, 3);
    let top = engine.top().clone();
    let monitor = Monitor::new_and_register(&mut engine, &top, "mon", &h.credit_out);

    engine.run_cycles(6);

    // Cycle 0 is reset; one credit is issued on each of cycles 1..=3, so the
    // committed pulse train is visible on cycles 2..=4.
    assert_eq!(
        monitor.borrow().samples(),
        &[false, false, true, true, true, false]
    );
    assert_eq!(h.queue.borrow().credits(), 3);
    assert_eq!(h.queue.borrow().occupancy(), 0);
}

#[test]
fn enqueues_and_pops_in_order() {
    let mut engine = start_test();
    let h = QueueHarness::build(&mut engine, 4);

    // Drive two packets on cycles 2 and 3; the queue samples them one cycle
    // later.
    let valid = h.valid_in.clone();
    let tlp = h.tlp_in.clone();
    let top = engine.top().clone();
    Stimulus::new_and_register(&mut engine, &top, "stim", move |ctx| {
        let sending = ctx.cycle == 2 || ctx.cycle == 3;
        valid.write(sending);
        if sending {
            tlp.write(RawTlp {
                seq_num: ctx.cycle as u32,
                thread_id: 1,
            });
        }
    });

    engine.run_cycles(6);

    assert_eq!(h.queue.borrow().occupancy(), 2);
    let first = h.queue.borrow_mut().pop_data().unwrap();
    let second = h.queue.borrow_mut().pop_data().unwrap();
    assert_eq!(first.seq_num, 2);
    assert_eq!(second.seq_num, 3);
    assert!(h.queue.borrow_mut().pop_data().is_none());
}

#[test]
fn credits_track_outstanding_grants_not_occupancy() {
    let mut engine = start_test();
    let h = QueueHarness::build(&mut engine, 2);

    engine.run_cycles(4);
    // Both credits granted, nothing enqueued: the FIFO is empty but the
    // producer-facing view holds two outstanding grants.
    assert_eq!(h.queue.borrow().credits(), 2);
    assert_eq!(h.queue.borrow().occupancy(), 0);

    // A pop with an empty FIFO consumes nothing.
    assert!(h.queue.borrow_mut().pop_data().is_none());
    assert_eq!(h.queue.borrow().credits(), 2);
}

#[test]
fn pop_consumes_a_credit_and_reopens_the_window() {
    let mut engine = start_test();
    let h = QueueHarness::build(&mut engine, 2);

    let valid = h.valid_in.clone();
    let tlp = h.tlp_in.clone();
    let top = engine.top().clone();
    Stimulus::new_and_register(&mut engine, &top, "stim", move |ctx| {
        let sending = ctx.cycle == 2;
        valid.write(sending);
        if sending {
            tlp.write(RawTlp {
                seq_num: 7,
                thread_id: 1,
            });
        }
    });

    engine.run_cycles(5);
    assert_eq!(h.queue.borrow().credits(), 2);
    assert_eq!(h.queue.borrow().occupancy(), 1);

    let pkt = h.queue.borrow_mut().pop_data().unwrap();
    assert_eq!(pkt.seq_num, 7);
    assert_eq!(h.queue.borrow().credits(), 1);

    // With a grant slot free again the queue issues a fresh credit.
    engine.run_cycles(2);
    assert_eq!(h.queue.borrow().credits(), 2);
}

#[test]
fn reset_clears_fifo_credits_and_outputs() {
    let mut engine = start_test();
    let h = QueueHarness::build(&mut engine, 4);

    let valid = h.valid_in.clone();
    let tlp = h.tlp_in.clone();
    let top = engine.top().clone();
    Stimulus::new_and_register(&mut engine, &top, "stim", move |ctx| {
        let sending = (2..=4).contains(&ctx.cycle);
        valid.write(sending);
        if sending {
            tlp.write(RawTlp {
                seq_num: ctx.cycle as u32,
                thread_id: 1,
            });
        }
    });

    engine.run_cycles(6);
    assert!(h.queue.borrow().has_data());

    engine.assert_reset(1);
    engine.run_cycles(1);

    assert!(!h.queue.borrow().has_data());
    assert_eq!(h.queue.borrow().credits(), 0);
    assert!(!h.credit_out.read());
}

#[test]
fn zero_capacity_is_rejected() {
    let mut engine = start_test();
    let top = engine.top().clone();
    let valid = engine.signal::<bool>(&top, "valid").unwrap();
    let tlp = engine.signal::<RawTlp>(&top, "tlp").unwrap();
    let credit = engine.signal::<bool>(&top, "credit").unwrap();
    assert!(ThreadedQueue::new_and_register(&mut engine, &top, "q", 0, valid, tlp, credit).is_err());
}
