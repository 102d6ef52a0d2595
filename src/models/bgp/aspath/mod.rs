use crate::error::GeneratorError;
use crate::models::Asn;
use itertools::Itertools;
use std::fmt::{Display, Formatter};
use std::str::FromStr;


/// A single AS_SEQUENCE segment can count at most 255 ASNs.
pub const MAX_AS_PATH_LEN: usize = u8::MAX as usize;

/// AS path advertised with generated routes.
///
/// The path is always a single AS_SEQUENCE of 4-octet ASNs in path order. It is never empty: the
/// last ASN is the *root* AS, the one [RootAsPolicy] rotates to give generated routes distinct
/// paths.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(try_from = "Vec<Asn>", into = "Vec<Asn>"))]
pub struct AsPath {
    asns: Vec<Asn>,
}

impl AsPath {
    /// Builds a path from a list of ASNs.
    ///
    /// Fails if the list is empty or does not fit one AS_SEQUENCE segment.
    pub fn new(asns: Vec<Asn>) -> Result<AsPath, GeneratorError> {
        if asns.is_empty() {
            return Err(GeneratorError::EmptyAsPath);
        }
        if asns.len() > MAX_AS_PATH_LEN {
            return Err(GeneratorError::AsPathTooLong(asns.len()));
        }
        Ok(AsPath {
            asns: asns.into_iter().map(|asn| Asn::new_32bit(asn.to_u32())).collect(),
        })
    }

    /// A path made of the root AS alone.
    pub fn from_root(root: u32) -> AsPath {
        AsPath {
            asns: vec![Asn::new_32bit(root)],
        }
    }

    /// Shorthand for building a path from plain numbers.
    pub fn from_sequence<S: AsRef<[u32]>>(seq: S) -> Result<AsPath, GeneratorError> {
        AsPath::new(seq.as_ref().iter().copied().map_into().collect())
    }

    pub fn asns(&self) -> &[Asn] {
        &self.asns
    }

    /// Number of ASNs in the path.
    pub fn len(&self) -> usize {
        self.asns.len()
    }

    /// Always false, a path holds at least the root AS.
    pub fn is_empty(&self) -> bool {
        self.asns.is_empty()
    }

    /// The last ASN of the path.
    pub fn root(&self) -> Asn {
        // non-empty by construction
        self.asns[self.asns.len() - 1]
    }

    /// Returns the path with its root AS replaced.
    pub fn with_root(mut self, root: u32) -> AsPath {
        let last = self.asns.len() - 1;
        self.asns[last] = Asn::new_32bit(root);
        self
    }
}

impl FromStr for AsPath {
    type Err = GeneratorError;

    /// Parses a comma separated list of ASNs such as `"65000,65001,20"`. Empty items are skipped.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let asns = s
            .split(',')
            .map(str::trim)
            .filter(|item| !item.is_empty())
            .map(|item| {
                Asn::from_str(item).map_err(|e| GeneratorError::InvalidNumber {
                    value: item.to_string(),
                    source: e,
                })
            })
            .collect::<Result<Vec<_>, _>>()?;
        AsPath::new(asns)
    }
}

impl TryFrom<Vec<Asn>> for AsPath {
    type Error = GeneratorError;

    fn try_from(value: Vec<Asn>) -> Result<Self, Self::Error> {
        AsPath::new(value)
    }
}

impl From<AsPath> for Vec<Asn> {
    fn from(value: AsPath) -> Self {
        value.asns
    }
}

impl Display for AsPath {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.asns.iter().join(" "))
    }
}

/// How the root AS changes between batches of generated routes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RootAsPolicy {
    /// Bump the root AS by one on every rotation.
    pub increment: bool,
    /// When non-zero, the bumped root AS is reduced modulo this value.
    pub modulus: u32,
}

impl RootAsPolicy {
    pub const fn new(increment: bool, modulus: u32) -> RootAsPolicy {
        RootAsPolicy { increment, modulus }
    }

    /// Applies one rotation step and returns the resulting path.
    ///
    /// The increment wraps at 2^32 before the modulus is applied. Without `increment` the path is
    /// returned unchanged.
    pub fn rotate(&self, path: AsPath) -> AsPath {
        if !self.increment {
            return path;
        }
        let mut root = path.root().to_u32().wrapping_add(1);
        if self.modulus != 0 {
            root %= self.modulus;
        }
        path.with_root(root)
    }
}
