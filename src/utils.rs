use hmac::{Hmac, Mac};
use sha2::Sha512;
use zeroize::Zeroizing;

pub type HmacSha512 = Hmac<Sha512>;

/// Compute HMAC-SHA512, returning a buffer that is wiped on drop
pub fn hmac_sha512(key: &[u8], data: &[u8]) -> Zeroizing<[u8; 64]> {
    let mut mac = HmacSha512::new_from_slice(key).expect("HMAC can take key of any size");
    mac.update(data);
    let result = mac.finalize().into_bytes();
    let mut hash = Zeroizing::new([0u8; 64]);
    hash.copy_from_slice(&result[..]);
    hash
}

/// Split a 64-byte HMAC output into its left and right 32-byte halves
pub fn split_i(i: &[u8; 64]) -> (Zeroizing<[u8; 32]>, Zeroizing<[u8; 32]>) {
    let mut i_l = Zeroizing::new([0u8; 32]);
    let mut i_r = Zeroizing::new([0u8; 32]);
    i_l.copy_from_slice(&i[0..32]);
    i_r.copy_from_slice(&i[32..64]);
    (i_l, i_r)
}

/// Copy a slice into a fixed-size secret buffer, checking the length
pub fn secret_array<const N: usize>(bytes: &[u8]) -> Result<Zeroizing<[u8; N]>, crate::error::Error> {
    if bytes.len() != N {
        return Err(crate::error::Error::InvalidLength {
            expected: N,
            actual: bytes.len(),
        });
    }
    let mut out = Zeroizing::new([0u8; N]);
    out.copy_from_slice(bytes);
    Ok(out)
}
