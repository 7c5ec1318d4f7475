/* SHA-256 of a firmware image
 *
 * (c) Chris Williams, 2021.
 *
 * See LICENSE for usage and copying.
 */

use sha2::{Digest, Sha256};

/* hash the whole image, returned as lowercase hex */
pub fn sha256_hex(image: &[u8]) -> String
{
    let digest = Sha256::digest(image);
    log::debug!("hashed {} bytes of firmware", image.len());
    hex::encode(digest)
}
