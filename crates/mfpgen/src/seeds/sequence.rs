//! Seed-sequence hashing with spawnable children.
//!
//! Model
//! - Entropy words (plus an optional spawn key) are hashed into a 4-word pool with a
//!   multiply-xorshift mixer; output states are read back through a second hash.
//! - Child `i` carries the parent's spawn key extended by `i`, so every child stream is
//!   distinct from its siblings and from the parent without any arithmetic relation
//!   between their seeds.

use super::entropy::Entropy;

const POOL_SIZE: usize = 4;
const INIT_A: u32 = 0x43b0_d7e5;
const MULT_A: u32 = 0x931e_8875;
const INIT_B: u32 = 0x8b51_f9dd;
const MULT_B: u32 = 0x58f3_8ded;
const MIX_MULT_L: u32 = 0xca01_f9dd;
const MIX_MULT_R: u32 = 0x4973_f715;
const XSHIFT: u32 = 16;

#[inline]
fn hashmix(value: u32, hash_const: &mut u32) -> u32 {
    let mut v = value ^ *hash_const;
    *hash_const = hash_const.wrapping_mul(MULT_A);
    v = v.wrapping_mul(*hash_const);
    v ^ (v >> XSHIFT)
}

#[inline]
fn mix(x: u32, y: u32) -> u32 {
    let r = MIX_MULT_L.wrapping_mul(x).wrapping_sub(MIX_MULT_R.wrapping_mul(y));
    r ^ (r >> XSHIFT)
}

/// Hashed entropy pool; the root of a batch or one of its spawned children.
#[derive(Clone, Debug)]
pub struct SeedSequence {
    entropy: Entropy,
    spawn_key: Vec<u32>,
    pool: [u32; POOL_SIZE],
    children_spawned: u32,
}

impl SeedSequence {
    pub fn new(entropy: Entropy) -> Self {
        Self::with_spawn_key(entropy, Vec::new())
    }

    pub fn with_spawn_key(entropy: Entropy, spawn_key: Vec<u32>) -> Self {
        let mut seq = Self {
            entropy,
            spawn_key,
            pool: [0; POOL_SIZE],
            children_spawned: 0,
        };
        seq.pool = mix_entropy(&seq.assembled_entropy());
        seq
    }

    pub fn entropy(&self) -> &Entropy {
        &self.entropy
    }

    pub fn spawn_key(&self) -> &[u32] {
        &self.spawn_key
    }

    fn assembled_entropy(&self) -> Vec<u32> {
        let mut words = self.entropy.words();
        if !self.spawn_key.is_empty() && words.len() < POOL_SIZE {
            words.resize(POOL_SIZE, 0);
        }
        words.extend_from_slice(&self.spawn_key);
        words
    }

    /// Read `n_words` output words from the pool.
    pub fn generate_state(&self, n_words: usize) -> Vec<u32> {
        let mut hash_const = INIT_B;
        self.pool
            .iter()
            .cycle()
            .take(n_words)
            .map(|&word| {
                let mut v = word ^ hash_const;
                hash_const = hash_const.wrapping_mul(MULT_B);
                v = v.wrapping_mul(hash_const);
                v ^ (v >> XSHIFT)
            })
            .collect()
    }

    /// 32-byte seed for a `SeedableRng` with a 256-bit state.
    pub fn seed_bytes(&self) -> [u8; 32] {
        let mut out = [0u8; 32];
        for (chunk, word) in out.chunks_exact_mut(4).zip(self.generate_state(8)) {
            chunk.copy_from_slice(&word.to_le_bytes());
        }
        out
    }

    /// Spawn `n` children; later calls continue where the previous one stopped.
    pub fn spawn(&mut self, n: u32) -> Vec<SeedSequence> {
        let start = self.children_spawned;
        self.children_spawned = start.wrapping_add(n);
        (start..start.wrapping_add(n))
            .map(|i| {
                let mut key = self.spawn_key.clone();
                key.push(i);
                SeedSequence::with_spawn_key(self.entropy.clone(), key)
            })
            .collect()
    }
}

fn mix_entropy(entropy: &[u32]) -> [u32; POOL_SIZE] {
    let mut hash_const = INIT_A;
    let mut pool = [0u32; POOL_SIZE];
    for (i, slot) in pool.iter_mut().enumerate() {
        let src = entropy.get(i).copied().unwrap_or(0);
        *slot = hashmix(src, &mut hash_const);
    }
    for src in 0..POOL_SIZE {
        for dst in 0..POOL_SIZE {
            if src != dst {
                let h = hashmix(pool[src], &mut hash_const);
                pool[dst] = mix(pool[dst], h);
            }
        }
    }
    for &extra in entropy.iter().skip(POOL_SIZE) {
        for slot in pool.iter_mut() {
            let h = hashmix(extra, &mut hash_const);
            *slot = mix(*slot, h);
        }
    }
    pool
}
