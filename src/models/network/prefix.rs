use crate::error::GeneratorError;
use crate::models::Afi;
use bytes::{BufMut, Bytes, BytesMut};
use ipnet::{IpNet, IpSubnets};
use std::fmt::{Debug, Display, Formatter};
use std::str::FromStr;

/// A network prefix as it is advertised in NLRI and RIB entries.
#[derive(PartialEq, Eq, Clone, Copy, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct NetworkPrefix {
    pub prefix: IpNet,
}

impl Debug for NetworkPrefix {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.prefix)
    }
}

impl Display for NetworkPrefix {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.prefix)
    }
}

impl FromStr for NetworkPrefix {
    type Err = GeneratorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(NetworkPrefix {
            prefix: IpNet::from_str(s)?,
        })
    }
}

impl From<IpNet> for NetworkPrefix {
    fn from(prefix: IpNet) -> Self {
        NetworkPrefix { prefix }
    }
}

impl NetworkPrefix {
    pub fn new(prefix: IpNet) -> NetworkPrefix {
        NetworkPrefix { prefix }
    }

    #[inline]
    pub fn afi(&self) -> Afi {
        Afi::from(self.prefix)
    }

    /// Number of bytes [NetworkPrefix::encode] produces: one length octet plus the significant
    /// address octets.
    #[inline]
    pub fn encoded_len(&self) -> usize {
        1 + self.prefix.prefix_len().div_ceil(8) as usize
    }

    /// Writes the prefix in NLRI form into `buf`.
    ///
    /// Only the leading `ceil(len/8)` octets of the address are written. Bits past the prefix
    /// length inside the last octet are copied as they are, so the address is expected to be
    /// masked already.
    pub fn encode_into(&self, buf: &mut BytesMut) {
        let bit_len = self.prefix.prefix_len();
        let byte_len = bit_len.div_ceil(8) as usize;
        buf.put_u8(bit_len);

        match self.prefix {
            IpNet::V4(prefix) => {
                buf.put_slice(&prefix.addr().octets()[0..byte_len]);
            }
            IpNet::V6(prefix) => {
                buf.put_slice(&prefix.addr().octets()[0..byte_len]);
            }
        };
    }

    /// Encodes the prefix into a byte slice.
    ///
    /// # Example
    ///
    /// ```rust
    /// use std::str::FromStr;
    /// use bgpkit_routegen::models::NetworkPrefix;
    ///
    /// let prefix = NetworkPrefix::from_str("192.168.0.0/24").unwrap();
    /// let encoded_bytes = prefix.encode();
    ///
    /// assert_eq!(encoded_bytes.iter().as_slice(), &[24, 192, 168, 0]);
    /// ```
    pub fn encode(&self) -> Bytes {
        let mut bytes = BytesMut::with_capacity(self.encoded_len());
        self.encode_into(&mut bytes);
        bytes.freeze()
    }
}

/// Lazy iterator over every sub-prefix of a given length inside a base network.
///
/// Sub-prefixes come out in ascending numeric order, each exactly once. The iterator is cheap to
/// build, so callers create a fresh one for every pass instead of rewinding.
///
/// ```rust
/// use bgpkit_routegen::models::SubPrefixes;
///
/// let subs: Vec<String> = SubPrefixes::new("10.0.0.0/22".parse().unwrap(), 24)
///     .unwrap()
///     .map(|p| p.to_string())
///     .collect();
/// assert_eq!(subs, ["10.0.0.0/24", "10.0.1.0/24", "10.0.2.0/24", "10.0.3.0/24"]);
/// ```
#[derive(Debug, Clone)]
pub struct SubPrefixes {
    inner: IpSubnets,
    remaining: Option<u128>,
}

impl SubPrefixes {
    /// Builds the iterator for `sub_len`-long prefixes inside `base`.
    ///
    /// Fails when `sub_len` is shorter than the base prefix or longer than the address width.
    /// Host bits set in `base` are ignored.
    pub fn new(base: IpNet, sub_len: u8) -> Result<SubPrefixes, GeneratorError> {
        let max_len = Afi::from(base).max_prefix_len();
        if sub_len < base.prefix_len() || sub_len > max_len {
            return Err(GeneratorError::InvalidPrefixLength {
                prefix: base,
                sub_len,
            });
        }
        let inner = base
            .trunc()
            .subnets(sub_len)
            .map_err(|_| GeneratorError::InvalidPrefixLength {
                prefix: base,
                sub_len,
            })?;
        // 2^128 sub-prefixes do not fit a u128, which only happens for ::/0 split into /128s
        let remaining = 1u128.checked_shl((sub_len - base.prefix_len()) as u32);
        Ok(SubPrefixes { inner, remaining })
    }

    /// Total number of sub-prefixes still to come, `None` when it exceeds `u128`.
    pub fn remaining(&self) -> Option<u128> {
        self.remaining
    }
}

impl Iterator for SubPrefixes {
    type Item = NetworkPrefix;

    fn next(&mut self) -> Option<Self::Item> {
        let next = self.inner.next()?;
        if let Some(remaining) = self.remaining.as_mut() {
            *remaining = remaining.saturating_sub(1);
        }
        Some(NetworkPrefix::new(next))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        match self.remaining {
            Some(n) => match usize::try_from(n) {
                Ok(n) => (n, Some(n)),
                Err(_) => (usize::MAX, None),
            },
            None => (usize::MAX, None),
        }
    }
}
