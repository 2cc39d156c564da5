// Hierarchical deterministic key derivation for Ergo wallets
// This library implements BIP-32 child key derivation over secp256k1: derivation
// paths, secret keys, extended secret/public keys and mnemonic seeds.

pub mod derivation_path;
pub mod error;
pub mod ext_pub_key;
pub mod ext_secret_key;
pub mod mnemonic;
pub mod secret_key;
pub mod utils;

pub use derivation_path::{
    ChildIndex, ChildIndexHardened, ChildIndexNormal, DerivationPath, ERGO_COIN_TYPE,
    HARDENED_OFFSET,
};
pub use error::{Error, PathParseReason};
pub use ext_pub_key::{ExtPubKey, PubKeyBytes};
pub use ext_secret_key::{ChainCode, ExtSecretKey, MAX_SEED_LEN, MIN_SEED_LEN};
pub use mnemonic::{Mnemonic, MnemonicSeed};
pub use secret_key::SecretKey;

// Re-export types from dependencies that are part of our public API
pub use secp256k1::{self, PublicKey};
