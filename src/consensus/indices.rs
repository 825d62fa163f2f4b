use rand::Rng;
use rand_chacha::rand_core::SeedableRng;
use rand_chacha::ChaCha20Rng;
use sha2::{Digest, Sha256};

use crate::ledger::Address;

const ORACLE_DOMAIN: &[u8] = b"flightsurety/oracle-indices";
const REQUEST_DOMAIN: &[u8] = b"flightsurety/request-index";

/// Pseudo-random index source for oracle assignment and status requests.
///
/// Each draw seeds a ChaCha20 stream with
/// `SHA-256(domain || seed || subject || sequence)`, where `subject` is the
/// oracle or requester identity and `sequence` is the ledger sequence number
/// at the time of the call. The same inputs always give the same indices.
#[derive(Debug, Clone)]
pub struct IndexGenerator {
    seed: u64,
    range: u8,
}

impl IndexGenerator {
    pub fn new(seed: u64, range: u8) -> Self {
        Self { seed, range }
    }

    pub fn range(&self) -> u8 {
        self.range
    }

    fn stream(&self, domain: &[u8], subject: &Address, sequence: u64) -> ChaCha20Rng {
        let mut hasher = Sha256::new();
        hasher.update(domain);
        hasher.update(self.seed.to_be_bytes());
        hasher.update(subject.as_bytes());
        hasher.update(sequence.to_be_bytes());
        ChaCha20Rng::from_seed(hasher.finalize().into())
    }

    /// Draw `count` distinct indices in `[0, range)`, in draw order
    pub fn oracle_indices(&self, oracle: &Address, sequence: u64, count: usize) -> Vec<u8> {
        let count = count.min(usize::from(self.range));
        let mut rng = self.stream(ORACLE_DOMAIN, oracle, sequence);
        let mut indices = Vec::with_capacity(count);
        while indices.len() < count {
            let candidate = rng.gen_range(0..self.range);
            if !indices.contains(&candidate) {
                indices.push(candidate);
            }
        }
        indices
    }

    /// Draw the index a new status request is addressed to
    pub fn request_index(&self, requester: &Address, sequence: u64) -> u8 {
        let mut rng = self.stream(REQUEST_DOMAIN, requester, sequence);
        rng.gen_range(0..self.range.max(1))
    }
}
