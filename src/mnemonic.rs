use crate::utils::HmacSha512;
use std::fmt;
use unicode_normalization::UnicodeNormalization;
use zeroize::Zeroizing;

/// PBKDF2 iteration count for mnemonic seeds
pub const MNEMONIC_PBKDF2_ROUNDS: u32 = 2048;

/// 64-byte seed produced from a mnemonic phrase, wiped on drop
#[derive(Clone, PartialEq, Eq)]
pub struct MnemonicSeed(Zeroizing<[u8; 64]>);

impl MnemonicSeed {
    pub const LEN: usize = 64;

    pub fn as_bytes(&self) -> &[u8] {
        &self.0[..]
    }
}

impl AsRef<[u8]> for MnemonicSeed {
    fn as_ref(&self) -> &[u8] {
        self.as_bytes()
    }
}

impl fmt::Debug for MnemonicSeed {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("MnemonicSeed(<redacted>)")
    }
}

/// Mnemonic phrase to seed conversion
pub struct Mnemonic;

impl Mnemonic {
    /// PBKDF2-HMAC-SHA512 over the NFKD phrase, salted with `"mnemonic" || NFKD(password)`.
    ///
    /// The phrase is not checked against a word list.
    pub fn to_seed(phrase: &str, password: &str) -> MnemonicSeed {
        let phrase = Zeroizing::new(phrase.nfkd().collect::<String>());

        let mut salt = Zeroizing::new(String::with_capacity(8 + password.len() * 4));
        salt.push_str("mnemonic");
        salt.extend(password.nfkd());

        let mut seed = Zeroizing::new([0u8; MnemonicSeed::LEN]);
        pbkdf2::pbkdf2::<HmacSha512>(
            phrase.as_bytes(),
            salt.as_bytes(),
            MNEMONIC_PBKDF2_ROUNDS,
            &mut seed[..],
        )
        .expect("HMAC can take key of any size");

        MnemonicSeed(seed)
    }
}
