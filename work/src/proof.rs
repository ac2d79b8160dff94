//! Mining-report proof hashing.

use sha2::{Digest, Sha256};
use webcash_types::WebcashHash;

/// Hash a mining-report preimage.
///
/// The hash is computed over the base64 *text* of the preimage, not the
/// decoded JSON — deployed miners search over base64-encoded blocks
/// directly, so hashing the text is a wire-compatibility requirement.
pub fn proof_hash(preimage_b64: &str) -> WebcashHash {
    let digest = Sha256::digest(preimage_b64.as_bytes());
    WebcashHash::new(digest.into())
}
