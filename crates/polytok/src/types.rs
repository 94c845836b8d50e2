//! # Common Types

/// Integer identifier for a token.
///
/// Values in `[0, 0x10FFFF]` denote Unicode scalar values. Minted identifiers
/// are assigned by the trainer, counting up from one past the largest token
/// in the corpus, and may shadow scalar values; the decoder resolves minted
/// entries first.
pub type TokenId = i64;

/// The largest token id that can denote a Unicode scalar value.
pub const MAX_SCALAR_ID: TokenId = 0x10FFFF;

/// An ordered pair of adjacent tokens. Equality is elementwise.
pub type TokenPair = (TokenId, TokenId);

/// Type alias for hash maps in this crate.
pub type CommonHashMap<K, V> = ahash::AHashMap<K, V>;

/// Type alias for hash sets in this crate.
pub type CommonHashSet<V> = ahash::AHashSet<V>;

/// Map of `{ pair -> minted token }`.
pub type PairTokenMap = CommonHashMap<TokenPair, TokenId>;

/// Map of `{ pair -> occurrence count }`.
pub type PairCountMap = CommonHashMap<TokenPair, u64>;

/// The Unicode scalar a base token id denotes, if it denotes one.
///
/// Negative ids, ids above [`MAX_SCALAR_ID`], and surrogate values have no
/// scalar.
pub fn token_scalar(id: TokenId) -> Option<char> {
    u32::try_from(id).ok().and_then(char::from_u32)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_scalar() {
        assert_eq!(token_scalar(97), Some('a'));
        assert_eq!(token_scalar(0x10FFFF), Some('\u{10FFFF}'));

        assert_eq!(token_scalar(-1), None);
        assert_eq!(token_scalar(0xD800), None);
        assert_eq!(token_scalar(MAX_SCALAR_ID + 1), None);
    }
}
