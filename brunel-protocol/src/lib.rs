// Copyright (c) 2025 Graphcore Ltd. All rights reserved.

//! Wire formats shared by every block in the transport.
//!
//! Three types travel over signals:
//!  - [`RawTlp`] - the minimal transaction-layer packet `{seq_num,
//!    thread_id}` exchanged between producers and consumers.
//!  - [`AxiWord`] - the single-beat AXI-Stream payload used on the NoC, with
//!    two interpretations by position (data beat or credit beat).
//!  - [`CreditBits`] - the 3-bit credit bus, one bit per thread.
//!
//! The thread-id convention is 1-based on the wire: `thread_id` is one of
//! `{1, 2, 3}` and the value 0 is reserved. Queue arrays are 0-indexed;
//! [`RawTlp::queue_index`] performs the conversion and rejects out-of-range
//! ids.
//!
//! The mask-and-shift helpers implement the beat layouts:
//!  - data beat: `bits[31:0] = seq_num`, `bits[33:32] = thread_id`, rest 0.
//!  - credit beat: `bits[15:0] = count_t1`, `bits[31:16] = count_t2`,
//!    `bits[47:32] = count_t3`, rest 0.

use std::fmt;

use brunel_engine::signal::SignalValue;

/// Number of threads carried by the transport.
pub const NUM_THREADS: usize = 3;

/// Lowest valid wire thread id.
pub const THREAD_ID_FIRST: u8 = 1;

const SEQ_NUM_MASK: u64 = 0xffff_ffff;
const THREAD_ID_SHIFT: u32 = 32;
const THREAD_ID_MASK: u64 = 0x3;
const CREDIT_FIELD_BITS: u32 = 16;
const CREDIT_FIELD_MASK: u64 = 0xffff;

/// A simulated transaction-layer packet.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RawTlp {
    /// Producer-assigned sequence number, strictly increasing per producer.
    pub seq_num: u32,

    /// Wire thread id in `{1, 2, 3}`; 0 is reserved.
    pub thread_id: u8,
}

impl RawTlp {
    /// The 0-based queue index for this packet, or `None` for a reserved or
    /// out-of-range thread id.
    #[must_use]
    pub fn queue_index(&self) -> Option<usize> {
        let tid = usize::from(self.thread_id);
        if (1..=NUM_THREADS).contains(&tid) {
            Some(tid - 1)
        } else {
            None
        }
    }
}

impl fmt::Display for RawTlp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "RawTlp(seq_num={}, thread_id={})",
            self.seq_num, self.thread_id
        )
    }
}

impl SignalValue for RawTlp {
    fn trace_bits(&self) -> u64 {
        tlp_to_axi(self).data
    }
}

/// One beat of AXI-Stream payload. All packets are one beat, so `tlast` is
/// always true.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AxiWord {
    /// 64-bit payload.
    pub data: u64,

    /// End-of-packet marker.
    pub tlast: bool,
}

impl Default for AxiWord {
    fn default() -> Self {
        Self {
            data: 0,
            tlast: true,
        }
    }
}

impl fmt::Display for AxiWord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "AxiWord(data={:#018x}, tlast={})", self.data, self.tlast)
    }
}

impl SignalValue for AxiWord {
    fn trace_bits(&self) -> u64 {
        self.data
    }
}

/// The 3-bit credit bus; bit `i` grants one packet on thread `i + 1`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CreditBits(pub u8);

impl CreditBits {
    /// Whether the bit for 0-based thread index `index` is set.
    #[must_use]
    pub fn bit(&self, index: usize) -> bool {
        debug_assert!(index < NUM_THREADS);
        self.0 & (1 << index) != 0
    }

    /// Set the bit for 0-based thread index `index`.
    pub fn set(&mut self, index: usize) {
        debug_assert!(index < NUM_THREADS);
        self.0 |= 1 << index;
    }

    /// Whether any bit is set.
    #[must_use]
    pub fn any(&self) -> bool {
        self.0 != 0
    }
}

impl fmt::Display for CreditBits {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "CreditBits({:03b})", self.0)
    }
}

impl SignalValue for CreditBits {
    fn trace_bits(&self) -> u64 {
        u64::from(self.0)
    }
}

/// Pack a TLP into a data beat.
#[must_use]
pub fn tlp_to_axi(tlp: &RawTlp) -> AxiWord {
    let mut data = u64::from(tlp.seq_num) & SEQ_NUM_MASK;
    data |= (u64::from(tlp.thread_id) & THREAD_ID_MASK) << THREAD_ID_SHIFT;
    AxiWord { data, tlast: true }
}

/// Unpack a data beat into a TLP.
#[must_use]
pub fn axi_to_tlp(word: &AxiWord) -> RawTlp {
    RawTlp {
        seq_num: (word.data & SEQ_NUM_MASK) as u32,
        thread_id: ((word.data >> THREAD_ID_SHIFT) & THREAD_ID_MASK) as u8,
    }
}

/// Pack three per-thread credit counts into a credit beat.
#[must_use]
pub fn credits_to_axi(counts: &[u16; NUM_THREADS]) -> AxiWord {
    let mut data = 0u64;
    for (index, count) in counts.iter().enumerate() {
        data |= u64::from(*count) << (CREDIT_FIELD_BITS * index as u32);
    }
    AxiWord { data, tlast: true }
}

/// Unpack a credit beat into three per-thread credit counts.
#[must_use]
pub fn axi_to_credits(word: &AxiWord) -> [u16; NUM_THREADS] {
    let mut counts = [0u16; NUM_THREADS];
    for (index, count) in counts.iter_mut().enumerate() {
        *count = ((word.data >> (CREDIT_FIELD_BITS * index as u32)) & CREDIT_FIELD_MASK) as u16;
    }
    counts
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tlp_round_trips() {
        for tid in 0..4u8 {
            let tlp = RawTlp {
                seq_num: 0xdead_beef,
                thread_id: tid,
            };
            assert_eq!(axi_to_tlp(&tlp_to_axi(&tlp)), tlp);
        }
        let max = RawTlp {
            seq_num: u32::MAX,
            thread_id: 3,
        };
        assert_eq!(axi_to_tlp(&tlp_to_axi(&max)), max);
    }

    #[test]
    fn data_beat_field_positions() {
        let word = tlp_to_axi(&RawTlp {
            seq_num: 0x1234_5678,
            thread_id: 2,
        });
        assert_eq!(word.data & 0xffff_ffff, 0x1234_5678);
        assert_eq!((word.data >> 32) & 0x3, 2);
        assert_eq!(word.data >> 34, 0);
        assert!(word.tlast);
    }

    #[test]
    fn credits_round_trip() {
        let cases = [[0, 0, 0], [1, 2, 3], [u16::MAX, 0, u16::MAX], [8, 8, 8]];
        for counts in cases {
            assert_eq!(axi_to_credits(&credits_to_axi(&counts)), counts);
        }
    }

    #[test]
    fn credit_beat_field_positions() {
        let word = credits_to_axi(&[0x1111, 0x2222, 0x3333]);
        assert_eq!(word.data & 0xffff, 0x1111);
        assert_eq!((word.data >> 16) & 0xffff, 0x2222);
        assert_eq!((word.data >> 32) & 0xffff, 0x3333);
        assert_eq!(word.data >> 48, 0);
    }

    #[test]
    fn queue_index_rejects_reserved_ids() {
        assert_eq!(RawTlp { seq_num: 1, thread_id: 0 }.queue_index(), None);
        assert_eq!(RawTlp { seq_num: 1, thread_id: 1 }.queue_index(), Some(0));
        assert_eq!(RawTlp { seq_num: 1, thread_id: 3 }.queue_index(), Some(2));
    }
}
