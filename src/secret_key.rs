use crate::error::Error;
use crate::utils;
use rand::rngs::OsRng;
use rand::{CryptoRng, RngCore};
use secp256k1::{PublicKey, Scalar, Secp256k1};
use std::fmt;
use zeroize::Zeroizing;

/// A secp256k1 secret scalar `k` with `0 < k < n`.
///
/// The 32 big-endian bytes live in a [`Zeroizing`] buffer and are wiped when
/// the key is dropped. Any `secp256k1::SecretKey` built from them for curve
/// operations is erased as soon as the operation completes.
#[derive(Clone)]
pub struct SecretKey {
    bytes: Zeroizing<[u8; 32]>,
}

impl SecretKey {
    /// Length of the big-endian encoding
    pub const LEN: usize = 32;

    /// Parse a 32-byte big-endian scalar, rejecting zero and values `>= n`
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, Error> {
        let bytes = utils::secret_array::<32>(bytes)?;

        let mut check =
            secp256k1::SecretKey::from_slice(&bytes[..]).map_err(|_| Error::ScalarOutOfRange)?;
        check.non_secure_erase();

        Ok(SecretKey { bytes })
    }

    /// Generate a key from the operating system's CSPRNG
    pub fn random() -> Self {
        Self::random_with(&mut OsRng)
    }

    /// Generate a key by rejection sampling 32-byte draws until one lands in `[1, n-1]`
    pub fn random_with<R: RngCore + CryptoRng + ?Sized>(rng: &mut R) -> Self {
        let mut candidate = Zeroizing::new([0u8; SecretKey::LEN]);
        loop {
            rng.fill_bytes(&mut candidate[..]);
            if let Ok(key) = SecretKey::from_bytes(&candidate[..]) {
                return key;
            }
        }
    }

    /// Fixed-width big-endian encoding
    pub fn to_bytes(&self) -> Zeroizing<[u8; 32]> {
        self.bytes.clone()
    }

    /// `k * G`
    pub fn public_key(&self) -> PublicKey {
        let secp = Secp256k1::signing_only();
        self.with_secp_key(|sk| PublicKey::from_secret_key(&secp, sk))
    }

    /// `(self + tweak) mod n`, or `None` when the sum is zero
    pub(crate) fn add_tweak(&self, tweak: &Scalar) -> Option<SecretKey> {
        self.with_secp_key(|sk| {
            let mut child = sk.add_tweak(tweak).ok()?;
            let key = SecretKey {
                bytes: Zeroizing::new(child.secret_bytes()),
            };
            child.non_secure_erase();
            Some(key)
        })
    }

    fn with_secp_key<T>(&self, f: impl FnOnce(&secp256k1::SecretKey) -> T) -> T {
        let mut sk = secp256k1::SecretKey::from_slice(&self.bytes[..])
            .expect("SecretKey always holds a scalar in [1, n-1]");
        let out = f(&sk);
        sk.non_secure_erase();
        out
    }
}

impl PartialEq for SecretKey {
    fn eq(&self, other: &Self) -> bool {
        // no early exit on the first differing byte
        self.bytes
            .iter()
            .zip(other.bytes.iter())
            .fold(0u8, |acc, (a, b)| acc | (a ^ b))
            == 0
    }
}

impl Eq for SecretKey {}

impl fmt::Debug for SecretKey {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("SecretKey(<redacted>)")
    }
}
