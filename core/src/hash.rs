//! Pure integer hashing for deterministic per-entity decisions.
//!
//! These functions never touch an RNG stream. Anything derived from them
//! (claims per policy, shop tie-breaks) depends only on entity ids, so it is
//! stable across re-runs and independent of processing order.

/// splitmix64 finalizer.
pub fn stable_hash(x: u64) -> u64 {
    let mut z = x.wrapping_add(0x9e37_79b9_7f4a_7c15);
    z = (z ^ (z >> 30)).wrapping_mul(0xbf58_476d_1ce4_e5b9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94d0_49bb_1331_11eb);
    z ^ (z >> 31)
}

/// Order-sensitive hash of two ids.
pub fn stable_hash_pair(a: u64, b: u64) -> u64 {
    stable_hash(stable_hash(a) ^ b.rotate_left(32))
}
