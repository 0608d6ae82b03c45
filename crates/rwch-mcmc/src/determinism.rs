use rwch_core::{derive_substream_seed, RngHandle};

const PROBE_TAG: u64 = 0x243F_6A88_85A3;
const EXCHANGE_TAG: u64 = 0xA5A5_A5A5_A5A5_A5A5;

/// Realization seed of worker, replica or Wang-Landau unit `index`.
pub fn realization_seed(master_seed: u64, index: usize) -> u64 {
    derive_substream_seed(master_seed, index as u64)
}

/// Monte-Carlo stream of worker, replica or Wang-Landau unit `index`.
pub fn monte_carlo_rng(master_seed: u64, index: usize) -> RngHandle {
    RngHandle::substream(master_seed, index as u64)
}

/// Stream driving equilibration probe `probe`.
pub fn probe_rng(master_seed: u64, probe: usize) -> RngHandle {
    RngHandle::substream(master_seed ^ PROBE_TAG, probe as u64)
}

/// Stream of the replica-exchange coordinator.
pub fn exchange_rng(master_seed: u64) -> RngHandle {
    RngHandle::substream(master_seed ^ EXCHANGE_TAG, 0)
}
