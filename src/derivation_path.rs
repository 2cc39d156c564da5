use crate::error::{Error, PathParseReason};
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

/// Offset added to a child index to mark it hardened (2^31)
pub const HARDENED_OFFSET: u32 = 0x8000_0000;

/// BIP-44 purpose level
pub const PURPOSE: u32 = 44;

/// Ergo coin type (SLIP-0044)
pub const ERGO_COIN_TYPE: u32 = 429;

/// Change level used by Ergo wallets (external chain only)
pub const CHANGE: u32 = 0;

/// Index of a non-hardened child, magnitude below 2^31
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ChildIndexNormal(u32);

impl ChildIndexNormal {
    /// Create a normal index, rejecting magnitudes that do not fit in 31 bits
    pub fn normal(i: u32) -> Result<Self, Error> {
        if i >= HARDENED_OFFSET {
            return Err(Error::ChildIndexOutOfRange(i));
        }
        Ok(ChildIndexNormal(i))
    }

    /// The 31-bit magnitude
    pub fn index(&self) -> u32 {
        self.0
    }

    /// The next normal index
    pub fn next(&self) -> Result<Self, Error> {
        ChildIndexNormal::normal(self.0 + 1)
    }
}

/// Index of a hardened child, magnitude below 2^31
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ChildIndexHardened(u32);

impl ChildIndexHardened {
    /// Create a hardened index from its 31-bit magnitude (the offset is applied later)
    pub fn from_31_bit(i: u32) -> Result<Self, Error> {
        if i >= HARDENED_OFFSET {
            return Err(Error::ChildIndexOutOfRange(i));
        }
        Ok(ChildIndexHardened(i))
    }

    /// The 31-bit magnitude, without the hardened offset
    pub fn index(&self) -> u32 {
        self.0
    }

    /// The next hardened index
    pub fn next(&self) -> Result<Self, Error> {
        ChildIndexHardened::from_31_bit(self.0 + 1)
    }
}

/// A single segment of a derivation path
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChildIndex {
    /// Normal derivation, uses the parent public key
    Normal(ChildIndexNormal),
    /// Hardened derivation, uses the parent secret key
    Hardened(ChildIndexHardened),
}

impl ChildIndex {
    /// Normal index with the given magnitude
    pub fn normal(i: u32) -> Result<Self, Error> {
        ChildIndexNormal::normal(i).map(ChildIndex::Normal)
    }

    /// Hardened index with the given magnitude
    pub fn hardened(i: u32) -> Result<Self, Error> {
        ChildIndexHardened::from_31_bit(i).map(ChildIndex::Hardened)
    }

    /// Raw index value as fed into child key derivation
    pub fn to_bits(&self) -> u32 {
        match self {
            ChildIndex::Normal(i) => i.0,
            ChildIndex::Hardened(i) => i.0 + HARDENED_OFFSET,
        }
    }

    /// The 31-bit magnitude, without the hardened offset
    pub fn index(&self) -> u32 {
        match self {
            ChildIndex::Normal(i) => i.0,
            ChildIndex::Hardened(i) => i.0,
        }
    }

    pub fn is_hardened(&self) -> bool {
        matches!(self, ChildIndex::Hardened(_))
    }

    /// The next index of the same kind
    pub fn next(&self) -> Result<Self, Error> {
        match self {
            ChildIndex::Normal(i) => i.next().map(ChildIndex::Normal),
            ChildIndex::Hardened(i) => i.next().map(ChildIndex::Hardened),
        }
    }
}

impl From<ChildIndexNormal> for ChildIndex {
    fn from(i: ChildIndexNormal) -> Self {
        ChildIndex::Normal(i)
    }
}

impl From<ChildIndexHardened> for ChildIndex {
    fn from(i: ChildIndexHardened) -> Self {
        ChildIndex::Hardened(i)
    }
}

impl PartialOrd for ChildIndex {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for ChildIndex {
    fn cmp(&self, other: &Self) -> Ordering {
        self.to_bits().cmp(&other.to_bits())
    }
}

impl fmt::Display for ChildIndex {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ChildIndex::Normal(i) => write!(f, "{}", i.0),
            ChildIndex::Hardened(i) => write!(f, "{}'", i.0),
        }
    }
}

impl FromStr for ChildIndex {
    type Err = PathParseReason;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (digits, hardened) = match s.strip_suffix('\'') {
            Some(digits) => (digits, true),
            None => (s, false),
        };

        if digits.is_empty() {
            return Err(if hardened {
                PathParseReason::NotNumeric(s.to_string())
            } else {
                PathParseReason::EmptySegment
            });
        }
        if !digits.bytes().all(|b| b.is_ascii_digit()) {
            return Err(PathParseReason::NotNumeric(s.to_string()));
        }

        // digits only, so the parse can fail on overflow alone
        let index: u32 = digits
            .parse()
            .map_err(|_| PathParseReason::IndexOutOfRange(digits.to_string()))?;
        if index >= HARDENED_OFFSET {
            return Err(PathParseReason::IndexOutOfRange(digits.to_string()));
        }

        Ok(if hardened {
            ChildIndex::Hardened(ChildIndexHardened(index))
        } else {
            ChildIndex::Normal(ChildIndexNormal(index))
        })
    }
}

/// A derivation path such as `m/44'/429'/0'/0/0`
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct DerivationPath(Vec<ChildIndex>);

impl DerivationPath {
    /// The root path `m`
    pub fn master() -> Self {
        DerivationPath(Vec::new())
    }

    /// Ergo account layout: `m/44'/429'/<account>'/0/<address>...`
    pub fn new(account: ChildIndexHardened, address_indices: Vec<ChildIndexNormal>) -> Self {
        let mut segments = vec![
            ChildIndex::Hardened(ChildIndexHardened(PURPOSE)),
            ChildIndex::Hardened(ChildIndexHardened(ERGO_COIN_TYPE)),
            ChildIndex::Hardened(account),
            ChildIndex::Normal(ChildIndexNormal(CHANGE)),
        ];
        segments.extend(address_indices.into_iter().map(ChildIndex::Normal));
        DerivationPath(segments)
    }

    pub fn from_segments(segments: Vec<ChildIndex>) -> Self {
        DerivationPath(segments)
    }

    /// Parse a path of the form `m/i1/i2'/...`
    pub fn parse(path: &str) -> Result<Self, Error> {
        if path.is_empty() {
            return Err(Error::Parse {
                segment_index: 0,
                reason: PathParseReason::Empty,
            });
        }

        let mut parts = path.split('/');
        if parts.next() != Some("m") {
            return Err(Error::Parse {
                segment_index: 0,
                reason: PathParseReason::MissingRoot,
            });
        }

        let segments = parts
            .enumerate()
            .map(|(i, part)| {
                part.parse::<ChildIndex>().map_err(|reason| Error::Parse {
                    segment_index: i + 1,
                    reason,
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(DerivationPath(segments))
    }

    pub fn segments(&self) -> &[ChildIndex] {
        &self.0
    }

    /// Number of derivation steps from the root
    pub fn depth(&self) -> usize {
        self.0.len()
    }

    pub fn is_master(&self) -> bool {
        self.0.is_empty()
    }

    /// This path with one more segment appended
    pub fn child(&self, index: ChildIndex) -> Self {
        let mut segments = self.0.clone();
        segments.push(index);
        DerivationPath(segments)
    }

    /// This path followed by all segments of `other`
    pub fn extend(&self, other: &DerivationPath) -> Self {
        let mut segments = self.0.clone();
        segments.extend_from_slice(&other.0);
        DerivationPath(segments)
    }

    /// This path with the last segment incremented, e.g. `m/1/2` -> `m/1/3`
    pub fn next(&self) -> Result<Self, Error> {
        let (last, init) = self.0.split_last().ok_or(Error::EmptyDerivationPath)?;
        let mut segments = init.to_vec();
        segments.push(last.next()?);
        Ok(DerivationPath(segments))
    }
}

impl fmt::Display for DerivationPath {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "m")?;
        for child in &self.0 {
            write!(f, "/{}", child)?;
        }
        Ok(())
    }
}

impl FromStr for DerivationPath {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        DerivationPath::parse(s)
    }
}

impl From<Vec<ChildIndex>> for DerivationPath {
    fn from(segments: Vec<ChildIndex>) -> Self {
        DerivationPath(segments)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn parse_err(s: &str) -> (usize, PathParseReason) {
        match DerivationPath::parse(s) {
            Err(Error::Parse {
                segment_index,
                reason,
            }) => (segment_index, reason),
            other => panic!("expected parse error for {:?}, got {:?}", s, other),
        }
    }

    #[test]
    fn test_parse_mixed_path() {
        let path: DerivationPath = "m/44/429/0'/0/0".parse().unwrap();
        let expected: Vec<(u32, bool)> = vec![
            (44, false),
            (429, false),
            (0, true),
            (0, false),
            (0, false),
        ];
        let actual: Vec<(u32, bool)> = path
            .segments()
            .iter()
            .map(|s| (s.index(), s.is_hardened()))
            .collect();
        assert_eq!(actual, expected);
        assert_eq!(path.depth(), 5);
    }

    #[test]
    fn test_parse_master() {
        let path = DerivationPath::parse("m").unwrap();
        assert!(path.is_master());
        assert_eq!(path, DerivationPath::master());
        assert_eq!(path.to_string(), "m");
    }

    #[test]
    fn test_parse_errors() {
        assert_eq!(parse_err(""), (0, PathParseReason::Empty));
        assert_eq!(parse_err("44/0"), (0, PathParseReason::MissingRoot));
        assert_eq!(parse_err("M/0"), (0, PathParseReason::MissingRoot));
        assert_eq!(parse_err("m/"), (1, PathParseReason::EmptySegment));
        assert_eq!(parse_err("m/1//2"), (2, PathParseReason::EmptySegment));
        assert_eq!(
            parse_err("m/1/x"),
            (2, PathParseReason::NotNumeric("x".to_string()))
        );
        assert_eq!(
            parse_err("m/1h"),
            (1, PathParseReason::NotNumeric("1h".to_string()))
        );
        assert_eq!(
            parse_err("m/+1"),
            (1, PathParseReason::NotNumeric("+1".to_string()))
        );
        assert_eq!(
            parse_err("m/'"),
            (1, PathParseReason::NotNumeric("'".to_string()))
        );
        assert_eq!(
            parse_err("m/2147483648"),
            (1, PathParseReason::IndexOutOfRange("2147483648".to_string()))
        );
        assert_eq!(
            parse_err("m/0/99999999999999999999'"),
            (
                2,
                PathParseReason::IndexOutOfRange("99999999999999999999".to_string())
            )
        );
    }

    #[test]
    fn test_max_index() {
        let path = DerivationPath::parse("m/2147483647'/2147483647").unwrap();
        assert_eq!(path.segments()[0].to_bits(), u32::MAX);
        assert_eq!(path.segments()[1].to_bits(), 0x7fff_ffff);
        assert!(matches!(
            ChildIndex::normal(HARDENED_OFFSET),
            Err(Error::ChildIndexOutOfRange(_))
        ));
    }

    #[test]
    fn test_ergo_account_path() {
        let path = DerivationPath::new(
            ChildIndexHardened::from_31_bit(2).unwrap(),
            vec![ChildIndexNormal::normal(7).unwrap()],
        );
        assert_eq!(path.to_string(), "m/44'/429'/2'/0/7");
    }

    #[test]
    fn test_child_and_extend() {
        let account = DerivationPath::parse("m/44'/429'/0'").unwrap();
        let change = account.child(ChildIndex::normal(0).unwrap());
        assert_eq!(change.to_string(), "m/44'/429'/0'/0");

        let tail: DerivationPath = vec![ChildIndex::normal(5).unwrap()].into();
        let full = change.extend(&tail);
        assert_eq!(full.to_string(), "m/44'/429'/0'/0/5");
        assert_eq!(full.depth(), account.depth() + 2);
        assert_eq!(account.extend(&DerivationPath::master()), account);
    }

    #[test]
    fn test_next() {
        let path = DerivationPath::parse("m/1/2").unwrap();
        assert_eq!(path.next().unwrap().to_string(), "m/1/3");

        let path = DerivationPath::parse("m/1/5'").unwrap();
        assert_eq!(path.next().unwrap().to_string(), "m/1/6'");

        assert_eq!(
            DerivationPath::master().next(),
            Err(Error::EmptyDerivationPath)
        );
        assert!(matches!(
            DerivationPath::parse("m/2147483647").unwrap().next(),
            Err(Error::ChildIndexOutOfRange(_))
        ));
    }

    #[test]
    fn test_equality_is_position_sensitive() {
        let a = DerivationPath::parse("m/1/2'").unwrap();
        let b = DerivationPath::parse("m/2'/1").unwrap();
        let c = DerivationPath::parse("m/1/2").unwrap();
        assert_ne!(a, b);
        assert_ne!(a, c);
        assert_eq!(a, DerivationPath::parse("m/1/2'").unwrap());
    }

    #[test]
    fn test_child_ordering() {
        let normal = ChildIndex::normal(5).unwrap();
        let hardened = ChildIndex::hardened(0).unwrap();
        assert!(normal < hardened);
        assert!(ChildIndex::normal(1).unwrap() < normal);
    }

    fn canonical_path() -> impl Strategy<Value = String> {
        prop::collection::vec((0u32..HARDENED_OFFSET, any::<bool>()), 0..8).prop_map(|segs| {
            let mut s = String::from("m");
            for (i, hardened) in segs {
                s.push_str(&format!("/{}{}", i, if hardened { "'" } else { "" }));
            }
            s
        })
    }

    proptest! {
        #[test]
        fn prop_canonical_round_trip(s in canonical_path()) {
            let path = DerivationPath::parse(&s).unwrap();
            prop_assert_eq!(path.to_string(), s);
        }

        #[test]
        fn prop_segments_round_trip(segs in prop::collection::vec((0u32..HARDENED_OFFSET, any::<bool>()), 0..8)) {
            let segments: Vec<ChildIndex> = segs
                .iter()
                .map(|&(i, h)| if h { ChildIndex::hardened(i).unwrap() } else { ChildIndex::normal(i).unwrap() })
                .collect();
            let path = DerivationPath::from_segments(segments);
            prop_assert_eq!(DerivationPath::parse(&path.to_string()).unwrap(), path);
        }
    }
}
