//! Arbitrary-precision root entropy (little-endian 32-bit limbs).

use crate::error::GenError;
use rand::rngs::OsRng;
use rand::RngCore;
use std::fmt;
use std::str::FromStr;

const DECIMAL_CHUNK: u32 = 1_000_000_000;

/// Non-negative integer of any size; the only value a batch needs to persist.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct Entropy {
    limbs: Vec<u32>,
}

impl Entropy {
    /// 128 fresh bits from the operating system.
    pub fn fresh() -> Self {
        let mut bytes = [0u8; 16];
        OsRng.fill_bytes(&mut bytes);
        Self::from(u128::from_le_bytes(bytes))
    }

    pub fn from_limbs(mut limbs: Vec<u32>) -> Self {
        while limbs.last() == Some(&0) {
            limbs.pop();
        }
        Self { limbs }
    }

    /// Limbs fed into the seed sequence; zero maps to a single zero word.
    pub fn words(&self) -> Vec<u32> {
        if self.limbs.is_empty() {
            vec![0]
        } else {
            self.limbs.clone()
        }
    }

    pub fn is_zero(&self) -> bool {
        self.limbs.is_empty()
    }

    fn mul_add(&mut self, mul: u32, add: u32) {
        let mut carry = add as u64;
        for limb in self.limbs.iter_mut() {
            let v = (*limb as u64) * (mul as u64) + carry;
            *limb = v as u32;
            carry = v >> 32;
        }
        if carry > 0 {
            self.limbs.push(carry as u32);
        }
    }

    /// Divide in place, returning the remainder.
    fn div_rem(&mut self, div: u32) -> u32 {
        let mut rem = 0u64;
        for limb in self.limbs.iter_mut().rev() {
            let cur = (rem << 32) | (*limb as u64);
            *limb = (cur / div as u64) as u32;
            rem = cur % div as u64;
        }
        while self.limbs.last() == Some(&0) {
            self.limbs.pop();
        }
        rem as u32
    }
}

impl From<u64> for Entropy {
    fn from(v: u64) -> Self {
        Self::from_limbs(vec![v as u32, (v >> 32) as u32])
    }
}

impl From<u128> for Entropy {
    fn from(v: u128) -> Self {
        Self::from_limbs((0..4).map(|k| (v >> (32 * k)) as u32).collect())
    }
}

impl FromStr for Entropy {
    type Err = GenError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() {
            return Err(GenError::invalid("entropy must not be empty"));
        }
        let mut out = Entropy::default();
        for ch in s.chars() {
            let d = ch
                .to_digit(10)
                .ok_or_else(|| GenError::invalid(format!("entropy is not decimal: {s:?}")))?;
            out.mul_add(10, d);
        }
        Ok(out)
    }
}

impl fmt::Display for Entropy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_zero() {
            return write!(f, "0");
        }
        let mut rest = self.clone();
        let mut chunks = Vec::new();
        while !rest.is_zero() {
            chunks.push(rest.div_rem(DECIMAL_CHUNK));
        }
        let mut iter = chunks.iter().rev();
        if let Some(head) = iter.next() {
            write!(f, "{head}")?;
        }
        for chunk in iter {
            write!(f, "{chunk:09}")?;
        }
        Ok(())
    }
}
