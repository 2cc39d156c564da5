use crate::derivation_path::{ChildIndex, ChildIndexNormal, DerivationPath};
use crate::error::Error;
use crate::ext_secret_key::{ChainCode, ExtSecretKey};
use crate::utils;
use secp256k1::{PublicKey, Scalar, Secp256k1};
use tracing::{instrument, trace};

/// Compressed SEC1 public key encoding
pub type PubKeyBytes = [u8; 33];

/// Extended public key: supports normal (non-hardened) derivation only
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtPubKey {
    public_key: PublicKey,
    chain_code: ChainCode,
    path: DerivationPath,
}

impl ExtPubKey {
    /// Rebuild an extended public key from a compressed point, chain code and path
    pub fn new(
        public_key_bytes: &[u8],
        chain_code: &[u8],
        path: DerivationPath,
    ) -> Result<Self, Error> {
        if public_key_bytes.len() != 33 {
            return Err(Error::InvalidLength {
                expected: 33,
                actual: public_key_bytes.len(),
            });
        }
        let public_key =
            PublicKey::from_slice(public_key_bytes).map_err(|_| Error::InvalidPublicKey)?;
        let chain_code: ChainCode = chain_code.try_into().map_err(|_| Error::InvalidLength {
            expected: 32,
            actual: chain_code.len(),
        })?;

        Ok(ExtPubKey {
            public_key,
            chain_code,
            path,
        })
    }

    /// Derive a child key (CKDpub): `K_child = point(IL) + K_par`
    pub fn child(&self, index: ChildIndexNormal) -> Result<ExtPubKey, Error> {
        let index = ChildIndex::Normal(index);
        let mut hmac_input = Vec::with_capacity(37);

        // Data = public_key || child_number
        hmac_input.extend_from_slice(&self.public_key.serialize());
        hmac_input.extend_from_slice(&index.to_bits().to_be_bytes());

        let i = utils::hmac_sha512(&self.chain_code, &hmac_input);
        let (i_l, i_r) = utils::split_i(&i);

        let tweak = Scalar::from_be_bytes(*i_l).map_err(|_| Error::DerivationFailure(index))?;
        let secp = Secp256k1::verification_only();
        let public_key = self
            .public_key
            .add_exp_tweak(&secp, &tweak)
            .map_err(|_| Error::DerivationFailure(index))?;

        let path = self.path.child(index);
        trace!(%index, depth = path.depth(), "derived child public key");

        Ok(ExtPubKey {
            public_key,
            chain_code: *i_r,
            path,
        })
    }

    /// Derive along `path`, relative to this key (only non-hardened segments)
    #[instrument(level = "debug", skip_all, fields(path = %path))]
    pub fn derive(&self, path: &DerivationPath) -> Result<ExtPubKey, Error> {
        let indices = path
            .segments()
            .iter()
            .map(|index| match index {
                ChildIndex::Normal(i) => Ok(*i),
                ChildIndex::Hardened(_) => Err(Error::HardenedDerivationRequiresPrivateKey),
            })
            .collect::<Result<Vec<_>, _>>()?;

        indices
            .into_iter()
            .try_fold(self.clone(), |key, index| key.child(index))
    }

    pub fn public_key(&self) -> PublicKey {
        self.public_key
    }

    pub fn pub_key_bytes(&self) -> PubKeyBytes {
        self.public_key.serialize()
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
}

impl From<&ExtSecretKey> for ExtPubKey {
    fn from(key: &ExtSecretKey) -> Self {
        ExtPubKey {
            public_key: key.secret_key().public_key(),
            chain_code: *key.chain_code(),
            path: key.path().clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hex_literal::hex;

    #[test]
    fn test_new_validates_parts() {
        let generator = hex!("0279be667ef9dcbbac55a06295ce870b07029bfcdb2dce28d959f2815b16f81798");
        let path = DerivationPath::master();

        let key = ExtPubKey::new(&generator, &[3u8; 32], path.clone()).unwrap();
        assert_eq!(key.pub_key_bytes(), generator);
        assert_eq!(key.chain_code(), &[3u8; 32]);

        assert_eq!(
            ExtPubKey::new(&generator[..32], &[3u8; 32], path.clone()),
            Err(Error::InvalidLength {
                expected: 33,
                actual: 32
            })
        );
        assert_eq!(
            ExtPubKey::new(&generator, &[3u8; 33], path.clone()),
            Err(Error::InvalidLength {
                expected: 32,
                actual: 33
            })
        );

        let mut not_on_curve = generator;
        not_on_curve[0] = 0x05;
        assert_eq!(
            ExtPubKey::new(&not_on_curve, &[3u8; 32], path),
            Err(Error::InvalidPublicKey)
        );
    }

    #[test]
    fn test_derive_rejects_hardened_segments() {
        let generator = hex!("0279be667ef9dcbbac55a06295ce870b07029bfcdb2dce28d959f2815b16f81798");
        let key = ExtPubKey::new(&generator, &[3u8; 32], DerivationPath::master()).unwrap();

        let path = DerivationPath::parse("m/0/1'/2").unwrap();
        assert_eq!(
            key.derive(&path),
            Err(Error::HardenedDerivationRequiresPrivateKey)
        );

        let path = DerivationPath::parse("m/0/1/2").unwrap();
        let derived = key.derive(&path).unwrap();
        assert_eq!(derived.depth(), 3);
        assert_eq!(derived.path(), &path);
    }
}
