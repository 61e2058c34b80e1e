//! Transaction output identifiers of the form `"<txHash>#<index>"`.

use std::fmt;

use crate::error::CodecError;

/// A transaction output reference, `"<txHash>#<index>"`.
///
/// Values decoded from the wire are wrapped as-is; use [`TxId::parse`] to
/// validate up front, or [`TxId::split`] to validate on demand.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TxId(String);

impl TxId {
    /// Format a hash and output index.
    pub fn new(tx_hash: &str, index: u64) -> Self {
        Self(format!("{tx_hash}#{index}"))
    }

    /// Validate and wrap.
    pub fn parse(s: &str) -> Result<Self, CodecError> {
        let id = Self(s.to_string());
        id.split()?;
        Ok(id)
    }

    /// Split into `(tx_hash, index)`.
    ///
    /// There must be exactly one `#`; the hash is returned verbatim and the
    /// index must be a base-10 non-negative integer.
    pub fn split(&self) -> Result<(&str, u64), CodecError> {
        let (hash, index) = self
            .0
            .rsplit_once('#')
            .ok_or_else(|| CodecError::malformed_txid(format!("{:?} has no '#' separator", self.0)))?;
        if hash.contains('#') {
            return Err(CodecError::malformed_txid(format!(
                "{:?} has more than one '#' separator",
                self.0
            )));
        }
        if index.is_empty() || !index.bytes().all(|b| b.is_ascii_digit()) {
            return Err(CodecError::malformed_txid(format!(
                "{:?} has a non-numeric index",
                self.0
            )));
        }
        let index = index
            .parse::<u64>()
            .map_err(|e| CodecError::malformed_txid(format!("{:?}: {e}", self.0)))?;
        Ok((hash, index))
    }

    /// The transaction hash.
    ///
    /// # Panics
    ///
    /// Panics if the identifier is malformed. Use [`TxId::split`] for untrusted input.
    pub fn tx_hash(&self) -> &str {
        match self.split() {
            Ok((hash, _)) => hash,
            Err(e) => panic!("{e}"),
        }
    }

    /// The output index.
    ///
    /// # Panics
    ///
    /// Panics if the identifier is malformed. Use [`TxId::split`] for untrusted input.
    pub fn index(&self) -> u64 {
        match self.split() {
            Ok((_, index)) => index,
            Err(e) => panic!("{e}"),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for TxId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for TxId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for TxId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    #[test]
    fn test_accessors() {
        let id = TxId::from("a#3");
        assert_eq!(id.tx_hash(), "a");
        assert_eq!(id.index(), 3);
    }

    #[test]
    fn test_new_formats() {
        let id = TxId::new("9fca96034e904d0a5c9cef27fa83188da4169ccdaefde0c2518e5f093a43dee3", 3);
        assert_eq!(
            id.as_str(),
            "9fca96034e904d0a5c9cef27fa83188da4169ccdaefde0c2518e5f093a43dee3#3"
        );
        assert_eq!(TxId::parse(id.as_str()).unwrap(), id);
    }

    #[test]
    fn test_hash_case_preserved() {
        let id = TxId::from("ABcd#0");
        assert_eq!(id.tx_hash(), "ABcd");
    }

    #[test]
    fn test_parse_rejects_malformed() {
        for bad in ["abc", "a#b#1", "a#", "a#-1", "a#1.0", "a#+1", "a# 1"] {
            let err = TxId::parse(bad).unwrap_err();
            assert_eq!(err.kind(), ErrorKind::MalformedTxId, "{bad:?}");
        }
    }

    #[test]
    #[should_panic]
    fn test_index_panics_on_malformed() {
        TxId::from("nohash").index();
    }
}
