use crate::derivation_path::{ChildIndex, DerivationPath};
use crate::error::Error;
use crate::ext_pub_key::ExtPubKey;
use crate::secret_key::SecretKey;
use crate::utils;
use secp256k1::Scalar;
use std::fmt;
use tracing::{instrument, trace};
use zeroize::Zeroizing;

/// 32-byte chain code paired with every extended key
pub type ChainCode = [u8; 32];

/// HMAC key used to turn a seed into the master key
pub const MASTER_KEY_HMAC_KEY: &[u8] = b"Bitcoin seed";

/// Shortest seed accepted by [`ExtSecretKey::derive_master`]
pub const MIN_SEED_LEN: usize = 32;

/// Longest seed accepted by [`ExtSecretKey::derive_master`]
pub const MAX_SEED_LEN: usize = 64;

/// Length of the `secret key || chain code` export encoding
pub const EXT_SECRET_KEY_BYTES_LEN: usize = SecretKey::LEN + 32;

/// Single child key derivation step (CKDpriv).
///
/// Hardened indices feed `0x00 || ser256(k_par) || ser32(i)` into
/// HMAC-SHA512 keyed by the parent chain code, normal indices feed
/// `serP(k_par * G) || ser32(i)`. The child key is `(IL + k_par) mod n` and the
/// child chain code is `IR`. `IL >= n` or a zero child key is reported as
/// [`Error::DerivationFailure`]; the caller decides whether to move on to the
/// next index.
pub fn derive_child_key(
    parent: &SecretKey,
    chain_code: &ChainCode,
    index: ChildIndex,
) -> Result<(SecretKey, Zeroizing<ChainCode>), Error> {
    let mut hmac_input = Zeroizing::new(Vec::<u8>::with_capacity(37));

    match index {
        ChildIndex::Hardened(_) => {
            hmac_input.push(0);
            hmac_input.extend_from_slice(&parent.to_bytes()[..]);
        }
        ChildIndex::Normal(_) => {
            hmac_input.extend_from_slice(&parent.public_key().serialize());
        }
    }
    hmac_input.extend_from_slice(&index.to_bits().to_be_bytes());

    let i = utils::hmac_sha512(chain_code, &hmac_input);
    let (i_l, i_r) = utils::split_i(&i);

    let tweak = Scalar::from_be_bytes(*i_l).map_err(|_| Error::DerivationFailure(index))?;
    let child = parent
        .add_tweak(&tweak)
        .ok_or(Error::DerivationFailure(index))?;

    Ok((child, i_r))
}

/// Extended secret key: a secret key, its chain code and the path it was derived along
#[derive(Clone, PartialEq, Eq)]
pub struct ExtSecretKey {
    secret_key: SecretKey,
    chain_code: Zeroizing<ChainCode>,
    path: DerivationPath,
}

impl ExtSecretKey {
    /// Rebuild an extended key from its parts
    pub fn new(
        secret_key_bytes: &[u8],
        chain_code: &[u8],
        path: DerivationPath,
    ) -> Result<Self, Error> {
        let secret_key = SecretKey::from_bytes(secret_key_bytes)?;
        let chain_code = utils::secret_array::<32>(chain_code)?;
        Ok(ExtSecretKey {
            secret_key,
            chain_code,
            path,
        })
    }

    /// Master key from a seed: `I = HMAC-SHA512("Bitcoin seed", seed)`
    pub fn derive_master(seed: &[u8]) -> Result<Self, Error> {
        if !(MIN_SEED_LEN..=MAX_SEED_LEN).contains(&seed.len()) {
            return Err(Error::InvalidSeedLength(seed.len()));
        }

        let i = utils::hmac_sha512(MASTER_KEY_HMAC_KEY, seed);
        let (i_l, i_r) = utils::split_i(&i);
        let secret_key = SecretKey::from_bytes(&i_l[..])?;

        Ok(ExtSecretKey {
            secret_key,
            chain_code: i_r,
            path: DerivationPath::master(),
        })
    }

    /// Derive the direct child at `index`
    pub fn child(&self, index: ChildIndex) -> Result<ExtSecretKey, Error> {
        let (secret_key, chain_code) =
            derive_child_key(&self.secret_key, &self.chain_code, index)?;
        let path = self.path.child(index);
        trace!(%index, depth = path.depth(), "derived child secret key");

        Ok(ExtSecretKey {
            secret_key,
            chain_code,
            path,
        })
    }

    /// Derive along `path`, relative to this key. Stops at the first failing segment.
    #[instrument(level = "debug", skip_all, fields(path = %path))]
    pub fn derive(&self, path: &DerivationPath) -> Result<ExtSecretKey, Error> {
        path.segments()
            .iter()
            .try_fold(self.clone(), |key, &index| key.child(index))
    }

    /// The extended public key with the same chain code and path
    pub fn public_key(&self) -> ExtPubKey {
        ExtPubKey::from(self)
    }

    pub fn secret_key(&self) -> SecretKey {
        self.secret_key.clone()
    }

    pub fn chain_code(&self) -> &ChainCode {
        &self.chain_code
    }

    pub fn path(&self) -> &DerivationPath {
        &self.path
    }

    pub fn depth(&self) -> usize {
        self.path.depth()
    }

    /// Export as `secret key (32) || chain code (32)`; the path is not included
    pub fn to_bytes(&self) -> Zeroizing<[u8; EXT_SECRET_KEY_BYTES_LEN]> {
        let mut out = Zeroizing::new([0u8; EXT_SECRET_KEY_BYTES_LEN]);
        out[..SecretKey::LEN].copy_from_slice(&self.secret_key.to_bytes()[..]);
        out[SecretKey::LEN..].copy_from_slice(&self.chain_code[..]);
        out
    }

    /// Import the encoding produced by [`ExtSecretKey::to_bytes`]
    pub fn from_bytes(bytes: &[u8], path: DerivationPath) -> Result<Self, Error> {
        if bytes.len() != EXT_SECRET_KEY_BYTES_LEN {
            return Err(Error::InvalidLength {
                expected: EXT_SECRET_KEY_BYTES_LEN,
                actual: bytes.len(),
            });
        }
        let (secret_key_bytes, chain_code) = bytes.split_at(SecretKey::LEN);
        ExtSecretKey::new(secret_key_bytes, chain_code, path)
    }
}

impl fmt::Debug for ExtSecretKey {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("ExtSecretKey")
            .field("secret_key", &self.secret_key)
            .field("chain_code", &"<redacted>")
            .field("path", &self.path.to_string())
            .finish()
    }
}
