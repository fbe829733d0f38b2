use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use sha2::{Digest, Sha256};

const RNG_STREAM_ADMISSION: &str = "admission";
const RNG_STREAM_EVENTS: &str = "events";

/// Independent random streams so event draws never shift admission draws.
#[derive(Clone, Debug)]
pub(crate) struct RngStreams {
    pub(crate) admission: ChaCha8Rng,
    pub(crate) events: ChaCha8Rng,
}

impl RngStreams {
    pub(crate) fn from_seed(seed: u64) -> Self {
        Self {
            admission: ChaCha8Rng::seed_from_u64(derive_labeled_seed(seed, RNG_STREAM_ADMISSION)),
            events: ChaCha8Rng::seed_from_u64(derive_labeled_seed(seed, RNG_STREAM_EVENTS)),
        }
    }
}

fn derive_labeled_seed(base: u64, label: &str) -> u64 {
    let mut hasher = Sha256::new();
    hasher.update(base.to_le_bytes());
    hasher.update(label.as_bytes());
    let digest = hasher.finalize();
    let mut bytes = [0_u8; 8];
    bytes.copy_from_slice(&digest[..8]);
    u64::from_le_bytes(bytes)
}
