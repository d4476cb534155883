//! Seedable deterministic PRNG used by every generator.
//!
//! The state is a single 32-bit word advanced by a mulberry32-style step.
//! Same seed + same call sequence gives bit-identical draws, which is what
//! the determinism tests and the `seed` query parameter rely on. Without an
//! explicit seed the state is derived from process entropy + wall clock and
//! is intentionally not reproducible.

use serde::Deserialize;

/// Seed accepted from callers: a number or an arbitrary string.
/// Strings are folded to 32 bits with FNV-1a.
#[derive(Clone, Debug, Deserialize)]
#[serde(untagged)]
pub enum Seed {
  Number(u64),
  Text(String),
}

impl Seed {
  pub fn to_u32(&self) -> u32 {
    match self {
      Seed::Number(n) => (*n & 0xffff_ffff) as u32,
      // Query-string seeds always arrive as text; numeric text folds the
      // same way as a JSON number so both channels reproduce each other.
      Seed::Text(s) => match s.parse::<u64>() {
        Ok(n) => (n & 0xffff_ffff) as u32,
        Err(_) => fnv1a_32(s.as_bytes()),
      },
    }
  }
}

fn fnv1a_32(bytes: &[u8]) -> u32 {
  let mut h: u32 = 0x811c_9dc5;
  for b in bytes {
    h ^= *b as u32;
    h = h.wrapping_mul(0x0100_0193);
  }
  h
}

pub struct Rng {
  state: u32,
}

impl Rng {
  pub fn from_seed(seed: u32) -> Rng {
    Rng { state: seed }
  }

  /// Seeded when the caller supplied one, entropy-derived otherwise.
  pub fn new(seed: Option<&Seed>) -> Rng {
    match seed {
      Some(s) => Rng::from_seed(s.to_u32()),
      None => {
        let nanos = std::time::SystemTime::now()
          .duration_since(std::time::UNIX_EPOCH)
          .map(|d| d.subsec_nanos())
          .unwrap_or(0);
        Rng::from_seed(rand::random::<u32>() ^ nanos)
      }
    }
  }

  /// Uniform float in [0, 1).
  pub fn float(&mut self) -> f64 {
    self.state = self.state.wrapping_add(0x6d2b_79f5);
    let mut z = self.state;
    z = (z ^ (z >> 15)).wrapping_mul(z | 1);
    z ^= z.wrapping_add((z ^ (z >> 7)).wrapping_mul(z | 61));
    ((z ^ (z >> 14)) as f64) / 4_294_967_296.0
  }

  /// Uniform integer in [lo, hi] inclusive. `lo > hi` is treated as [hi, lo].
  pub fn int(&mut self, lo: i64, hi: i64) -> i64 {
    let (lo, hi) = if lo <= hi { (lo, hi) } else { (hi, lo) };
    let span = (hi - lo + 1) as f64;
    lo + (self.float() * span) as i64
  }

  /// A multiple of `step` in [lo, hi].
  pub fn step(&mut self, lo: f64, hi: f64, step: f64) -> f64 {
    let n = ((hi - lo) / step).floor() as i64;
    lo + self.int(0, n.max(0)) as f64 * step
  }

  /// Uniform element of a non-empty slice.
  pub fn pick<'a, T>(&mut self, items: &'a [T]) -> &'a T {
    let i = self.int(0, items.len() as i64 - 1) as usize;
    &items[i]
  }

  /// Fisher-Yates permuted copy.
  pub fn shuffle<T: Clone>(&mut self, items: &[T]) -> Vec<T> {
    let mut out: Vec<T> = items.to_vec();
    for i in (1..out.len()).rev() {
      let j = self.int(0, i as i64) as usize;
      out.swap(i, j);
    }
    out
  }

  /// Weighted choice: probability proportional to weight, ties broken by
  /// iteration order. A non-positive weight sum falls back to the last item.
  pub fn weighted<T: Clone>(&mut self, items: &[(T, f64)]) -> T {
    let total: f64 = items.iter().map(|(_, w)| w.max(0.0)).sum();
    if total > 0.0 {
      let mut roll = self.float() * total;
      for (value, w) in items {
        roll -= w.max(0.0);
        if roll < 0.0 {
          return value.clone();
        }
      }
    }
    items[items.len() - 1].0.clone()
  }

  /// Short alphanumeric suffix for exercise ids. Drawn from this RNG so a
  /// fixed seed reproduces the id too.
  pub fn suffix(&mut self, len: usize) -> String {
    const ALPHABET: &[u8] = b"abcdefghijklmnopqrstuvwxyz0123456789";
    (0..len)
      .map(|_| ALPHABET[self.int(0, ALPHABET.len() as i64 - 1) as usize] as char)
      .collect()
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn same_seed_same_sequence() {
    let mut a = Rng::from_seed(42);
    let mut b = Rng::from_seed(42);
    for _ in 0..256 {
      assert_eq!(a.float().to_bits(), b.float().to_bits());
    }
  }

  #[test]
  fn string_seeds_are_stable() {
    let s1 = Seed::Text("t1".into()).to_u32();
    let s2 = Seed::Text("t1".into()).to_u32();
    assert_eq!(s1, s2);
    assert_ne!(s1, Seed::Text("t2".into()).to_u32());
  }

  #[test]
  fn numeric_text_folds_like_a_number() {
    assert_eq!(Seed::Text("42".into()).to_u32(), Seed::Number(42).to_u32());
  }

  #[test]
  fn float_stays_in_unit_interval() {
    let mut rng = Rng::from_seed(7);
    for _ in 0..10_000 {
      let v = rng.float();
      assert!((0.0..1.0).contains(&v), "out of range: {v}");
    }
  }

  #[test]
  fn int_is_inclusive_on_both_ends() {
    let mut rng = Rng::from_seed(9);
    let mut seen_lo = false;
    let mut seen_hi = false;
    for _ in 0..5_000 {
      let v = rng.int(-3, 3);
      assert!((-3..=3).contains(&v));
      seen_lo |= v == -3;
      seen_hi |= v == 3;
    }
    assert!(seen_lo && seen_hi);
  }

  #[test]
  fn step_lands_on_grid() {
    let mut rng = Rng::from_seed(11);
    for _ in 0..1_000 {
      let v = rng.step(-2.0, 2.0, 0.5);
      let q = (v / 0.5).round() * 0.5;
      assert!((v - q).abs() < 1e-12);
      assert!((-2.0..=2.0).contains(&v));
    }
  }

  #[test]
  fn shuffle_is_a_permutation() {
    let mut rng = Rng::from_seed(13);
    let orig: Vec<i64> = (0..20).collect();
    let mut shuffled = rng.shuffle(&orig);
    shuffled.sort_unstable();
    assert_eq!(shuffled, orig);
  }

  #[test]
  fn weighted_respects_zero_weights() {
    let mut rng = Rng::from_seed(17);
    for _ in 0..500 {
      let v = rng.weighted(&[("never", 0.0), ("always", 1.0)]);
      assert_eq!(v, "always");
    }
  }

  #[test]
  fn weighted_empty_sum_falls_back_to_last() {
    let mut rng = Rng::from_seed(19);
    let v = rng.weighted(&[("a", 0.0), ("b", 0.0)]);
    assert_eq!(v, "b");
  }

  #[test]
  fn suffix_is_deterministic_under_seed() {
    let mut a = Rng::from_seed(23);
    let mut b = Rng::from_seed(23);
    assert_eq!(a.suffix(6), b.suffix(6));
  }
}
