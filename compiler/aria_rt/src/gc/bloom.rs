//! Bloom filter over live payload addresses.
//!
//! Most words seen during marking are not heap pointers. One hash and one
//! bit test reject them before the heap index is consulted.

/// Filter size in bits.
pub const BLOOM_BITS: usize = 65_536;

const WORDS: usize = BLOOM_BITS / 64;

pub(crate) struct BloomFilter {
    bits: Box<[u64; WORDS]>,
}

impl BloomFilter {
    pub(crate) fn new() -> Self {
        BloomFilter {
            bits: Box::new([0; WORDS]),
        }
    }

    pub(crate) fn insert(&mut self, addr: usize) {
        let bit = slot(addr);
        self.bits[bit / 64] |= 1 << (bit % 64);
    }

    /// False means `addr` was never inserted since the last clear.
    pub(crate) fn may_contain(&self, addr: usize) -> bool {
        let bit = slot(addr);
        self.bits[bit / 64] & (1 << (bit % 64)) != 0
    }

    pub(crate) fn clear(&mut self) {
        self.bits.fill(0);
    }
}

/// splitmix64 finalizer reduced to a bit index.
#[expect(clippy::cast_possible_truncation, reason = "reduced modulo BLOOM_BITS")]
fn slot(addr: usize) -> usize {
    let mut h = addr as u64;
    h = (h ^ (h >> 30)).wrapping_mul(0xbf58_476d_1ce4_e5b9);
    h = (h ^ (h >> 27)).wrapping_mul(0x94d0_49bb_1331_11eb);
    h ^= h >> 31;
    (h % BLOOM_BITS as u64) as usize
}
