//! Per-arm seeds.
//!
//! Every arm in a problem draws from its own RNG. The seed it gets depends only
//! on the problem seed and the arm's position, so replays match across runs and
//! platforms. None of this is meant to resist an adversary.

const FNV_OFFSET: u64 = 0xcbf2_9ce4_8422_2325;
const FNV_PRIME: u64 = 0x0000_0100_0000_01b3;

/// Seed handed to arm `index` of a problem seeded with `problem_seed`.
///
/// The index is hashed with 64-bit FNV-1a, mixed into the problem seed, and
/// passed through SplitMix64 so neighbouring indices land far apart.
#[must_use]
pub fn arm_seed(problem_seed: u64, index: usize) -> u64 {
    let index_hash = (index as u64)
        .to_le_bytes()
        .iter()
        .fold(FNV_OFFSET, |h, &b| (h ^ u64::from(b)).wrapping_mul(FNV_PRIME));
    splitmix64(problem_seed ^ index_hash)
}

// One SplitMix64 step (Steele, Lea, Flood 2014).
#[inline]
fn splitmix64(x: u64) -> u64 {
    let mut z = x.wrapping_add(0x9E37_79B9_7F4A_7C15);
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    z ^ (z >> 31)
}
