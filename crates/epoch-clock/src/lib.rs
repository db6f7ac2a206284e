// epoch-clock/src/lib.rs

//! Pure epoch-timing arithmetic: `(slot, epoch_length, block_secs, block
//! height)` in, `EpochData` out. No I/O and no shared state -- every
//! function here is a plain transformation so it can be unit- and
//! property-tested in isolation from the chain adapter and the engine.

use std::time::Duration;
use subnet_types::EpochData;

/// The raw chain-clock inputs an epoch is derived from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChainClockSample {
    /// Current chain block height.
    pub block_height: u64,
    /// The subnet's phase offset, staggering its epoch boundaries
    /// relative to other subnets sharing the same chain.
    pub slot: u64,
    /// Chain-configured epoch length, in blocks.
    pub epoch_length: u64,
    /// The chain's target block time, in seconds.
    pub block_secs: u64,
}

/// Stateless epoch-timing calculator.
pub struct EpochClock;

impl EpochClock {
    /// Derive `EpochData` from a raw clock sample. `epoch_length` of zero
    /// is treated as a single perpetual epoch 0 with nothing remaining,
    /// since a real chain never configures a zero-length epoch.
    pub fn progress(sample: ChainClockSample) -> EpochData {
        if sample.epoch_length == 0 {
            return EpochData::new(0, 0, 0.0, 0.0);
        }

        let effective_block = sample.block_height + sample.slot;
        let epoch = effective_block / sample.epoch_length;
        let block_in_epoch = effective_block % sample.epoch_length;
        let blocks_remaining = sample.epoch_length - block_in_epoch;
        let percent_complete = block_in_epoch as f64 / sample.epoch_length as f64;
        let seconds_remaining = blocks_remaining as f64 * sample.block_secs as f64;

        EpochData::new(epoch, blocks_remaining, seconds_remaining, percent_complete)
    }

    /// The sub-epoch interval schedule used by the tracker: `K + 1` equal
    /// intervals spanning one epoch, so a refresh is never scheduled to
    /// straddle an epoch boundary.
    pub fn sub_epoch_interval(epoch_length: u64, block_secs: u64, updates_per_epoch: u32) -> Duration {
        let epoch_seconds = epoch_length as f64 * block_secs as f64;
        let width = epoch_seconds / (updates_per_epoch as f64 + 1.0);
        Duration::from_secs_f64(width.max(0.0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn percent_complete_is_zero_at_epoch_start() {
        let sample = ChainClockSample {
            block_height: 100,
            slot: 0,
            epoch_length: 10,
            block_secs: 6,
        };
        let data = EpochClock::progress(sample);
        assert_eq!(data.epoch, 10);
        assert_eq!(data.percent_complete, 0.0);
        assert_eq!(data.blocks_remaining, 10);
        assert_eq!(data.seconds_remaining, 60.0);
    }

    #[test]
    fn slot_offsets_the_epoch_boundary() {
        let unshifted = EpochClock::progress(ChainClockSample {
            block_height: 9,
            slot: 0,
            epoch_length: 10,
            block_secs: 6,
        });
        let shifted = EpochClock::progress(ChainClockSample {
            block_height: 9,
            slot: 1,
            epoch_length: 10,
            block_secs: 6,
        });
        assert_eq!(unshifted.epoch, 0);
        assert_eq!(shifted.epoch, 1);
    }

    #[test]
    fn zero_epoch_length_does_not_divide_by_zero() {
        let data = EpochClock::progress(ChainClockSample {
            block_height: 5,
            slot: 0,
            epoch_length: 0,
            block_secs: 6,
        });
        assert_eq!(data.epoch, 0);
        assert_eq!(data.seconds_remaining, 0.0);
    }

    #[test]
    fn sub_epoch_interval_divides_epoch_into_k_plus_one_parts() {
        let width = EpochClock::sub_epoch_interval(10, 6, 5);
        // epoch = 60s, 6 intervals -> 10s each
        assert!((width.as_secs_f64() - 10.0).abs() < 1e-9);
    }

    proptest! {
        #[test]
        fn percent_complete_always_in_unit_interval(
            block_height in 0u64..1_000_000,
            slot in 0u64..10_000,
            epoch_length in 1u64..100_000,
            block_secs in 1u64..60,
        ) {
            let data = EpochClock::progress(ChainClockSample { block_height, slot, epoch_length, block_secs });
            prop_assert!(data.percent_complete >= 0.0 && data.percent_complete < 1.0);
            prop_assert!(data.blocks_remaining >= 1 && data.blocks_remaining <= epoch_length);
        }
    }
}
