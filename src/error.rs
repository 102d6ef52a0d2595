/*!
error module defines the error types used in bgpkit-routegen.
*/
use ipnet::IpNet;
use std::io;
use std::net::IpAddr;
use std::num::ParseIntError;
use thiserror::Error;

/// Broad classes of [GeneratorError].
///
/// None of them is recoverable: generation is a one-shot batch job, and any error aborts it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// Malformed or inconsistent input supplied by the operator.
    Configuration,
    /// Generated data would violate a wire-format limit.
    EncodingInvariant,
    /// The output destination failed.
    Stream,
}

#[derive(Debug, Error)]
pub enum GeneratorError {
    /// A network prefix could not be parsed.
    ///
    /// ## Occurs during:
    ///  - Parsing of route specifications
    #[error("invalid network prefix: {0}")]
    InvalidPrefix(#[from] ipnet::AddrParseError),
    /// An IP address (next hop, peer address, BGP identifier) could not be parsed.
    #[error("invalid IP address: {0}")]
    InvalidAddress(#[from] std::net::AddrParseError),
    /// The requested sub-prefix length is shorter than the base prefix or longer than the address
    /// width.
    #[error("invalid sub-prefix length {sub_len} for {prefix}")]
    InvalidPrefixLength { prefix: IpNet, sub_len: u8 },
    /// Prefix and next hop of a route specification are of different address families.
    #[error("address family mismatch between prefix {prefix} and next hop {next_hop}")]
    AddressFamilyMismatch { prefix: IpNet, next_hop: IpAddr },
    /// Route specification arguments must come in `PREFIX SUBLEN NEXTHOP` triples.
    #[error("route arguments must come in PREFIX SUBLEN NEXTHOP triples, got {0} arguments")]
    IncompleteRouteSpec(usize),
    #[error("invalid number {value:?}: {source}")]
    InvalidNumber {
        value: String,
        #[source]
        source: ParseIntError,
    },
    /// A peer specification is not of the `bgpid,peerip,peeras` form.
    #[error("invalid peer {0:?}, expected BGPID,PEERIP,PEERAS")]
    InvalidPeer(String),
    #[error("AS path must contain at least one AS number")]
    EmptyAsPath,
    #[error("AS path of {0} AS numbers does not fit a single AS_SEQUENCE segment")]
    AsPathTooLong(usize),
    #[error("maximum prefixes per message must be at least 1")]
    InvalidMaxPack,
    #[error("peer index table cannot hold {0} peers")]
    TooManyPeers(usize),
    #[error("view name of {0} bytes is too long")]
    ViewNameTooLong(usize),
    #[error("table dump needs at least one peer")]
    NoPeers,
    #[error("update and table dump output cannot both go to stdout")]
    ConflictingOutputs,

    /// A single encoded prefix does not fit an otherwise empty UPDATE message.
    #[error("prefix {prefix} needs {encoded_len} bytes but an UPDATE only has room for {budget}")]
    OversizedPrefix {
        prefix: IpNet,
        encoded_len: usize,
        budget: usize,
    },
    /// A finished UPDATE message is longer than the BGP maximum.
    #[error("UPDATE message of {0} bytes exceeds the BGP maximum of 4096")]
    MessageTooLarge(usize),
    /// A value does not fit the width of its length field.
    #[error("{field} length {len} exceeds its field width")]
    FieldOverflow { field: &'static str, len: usize },

    /// A general IO error triggered by the output writer.
    #[error(transparent)]
    IoError(#[from] io::Error),
}

impl GeneratorError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            GeneratorError::OversizedPrefix { .. }
            | GeneratorError::MessageTooLarge(_)
            | GeneratorError::FieldOverflow { .. } => ErrorCategory::EncodingInvariant,
            GeneratorError::IoError(_) => ErrorCategory::Stream,
            _ => ErrorCategory::Configuration,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_category() {
        assert_eq!(
            GeneratorError::EmptyAsPath.category(),
            ErrorCategory::Configuration
        );
        assert_eq!(
            GeneratorError::MessageTooLarge(5000).category(),
            ErrorCategory::EncodingInvariant
        );
        let io_err = io::Error::new(io::ErrorKind::BrokenPipe, "closed");
        assert_eq!(
            GeneratorError::from(io_err).category(),
            ErrorCategory::Stream
        );
    }

    #[test]
    fn test_error_display() {
        let err = GeneratorError::AddressFamilyMismatch {
            prefix: "10.0.0.0/8".parse().unwrap(),
            next_hop: "2001:db8::1".parse().unwrap(),
        };
        assert_eq!(
            err.to_string(),
            "address family mismatch between prefix 10.0.0.0/8 and next hop 2001:db8::1"
        );
        assert_eq!(
            GeneratorError::IncompleteRouteSpec(4).to_string(),
            "route arguments must come in PREFIX SUBLEN NEXTHOP triples, got 4 arguments"
        );
    }
}
