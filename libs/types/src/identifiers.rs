//! # Typed Byte Identifiers
//!
//! Zero-cost wrappers around fixed-size byte arrays so that asset ids and
//! account ids cannot be confused at compile time, even though both are
//! 20-byte EVM-style addresses.
//!
//! ```rust
//! use dex_types::{AccountId, AssetId};
//!
//! let eth: AssetId = "0x5fbdb2315678afecb367f032d93f642f64180aa3".parse().unwrap();
//! let trader = AccountId::new([7u8; 20]);
//!
//! fn balance(_account: AccountId, _asset: AssetId) {}
//! balance(trader, eth);
//! // balance(eth, trader); // compile error
//! ```

/// Generates a strongly typed wrapper for a byte array.
///
/// The wrapper is `Copy`, totally ordered by its bytes, hex formatted on
/// display and parsed from an optionally `0x`-prefixed hex string.
#[macro_export]
macro_rules! define_typed_wrapper {
    (
        $(#[$meta:meta])*
        $name:ident, $len:expr
    ) => {
        $(#[$meta])*
        #[derive(
            Debug,
            Clone,
            Copy,
            PartialEq,
            Eq,
            PartialOrd,
            Ord,
            Hash,
            Default
        )]
        #[repr(transparent)]
        pub struct $name(pub [u8; $len]);

        impl $name {
            /// Byte length of the wrapped value
            pub const LEN: usize = $len;

            #[inline(always)]
            pub const fn new(inner: [u8; $len]) -> Self {
                Self(inner)
            }

            #[inline(always)]
            pub const fn inner(&self) -> &[u8; $len] {
                &self.0
            }

            #[inline(always)]
            pub const fn into_inner(self) -> [u8; $len] {
                self.0
            }

            #[inline(always)]
            pub fn as_bytes(&self) -> &[u8] {
                &self.0[..]
            }

            /// Lowercase `0x`-prefixed hex form
            pub fn to_hex(&self) -> String {
                format!("0x{}", hex::encode(self.0))
            }

            /// Builds an id whose last byte is `tag`; handy for fixtures
            pub const fn from_low_byte(tag: u8) -> Self {
                let mut bytes = [0u8; $len];
                bytes[$len - 1] = tag;
                Self(bytes)
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}(0x", stringify!($name))?;
                for byte in self.as_bytes() {
                    write!(f, "{:02x}", byte)?;
                }
                write!(f, ")")
            }
        }

        impl std::str::FromStr for $name {
            type Err = $crate::errors::ValidationError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                let digits = s.strip_prefix("0x").unwrap_or(s);
                let bytes = hex::decode(digits).map_err(|e| {
                    $crate::errors::ValidationError::InvalidHex {
                        input: s.to_string(),
                        reason: e.to_string(),
                    }
                })?;
                let array: [u8; $len] = bytes.as_slice().try_into().map_err(|_| {
                    $crate::errors::ValidationError::InvalidLength {
                        expected: $len,
                        actual: bytes.len(),
                    }
                })?;
                Ok(Self(array))
            }
        }

        impl From<[u8; $len]> for $name {
            #[inline(always)]
            fn from(inner: [u8; $len]) -> Self {
                Self(inner)
            }
        }

        impl From<$name> for [u8; $len] {
            #[inline(always)]
            fn from(wrapper: $name) -> [u8; $len] {
                wrapper.0
            }
        }

        impl AsRef<[u8; $len]> for $name {
            #[inline(always)]
            fn as_ref(&self) -> &[u8; $len] {
                &self.0
            }
        }

        // Serialized as the hex string so config files and logs stay readable
        impl serde::Serialize for $name {
            fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
            where
                S: serde::Serializer,
            {
                serializer.serialize_str(&self.to_hex())
            }
        }

        impl<'de> serde::Deserialize<'de> for $name {
            fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
            where
                D: serde::Deserializer<'de>,
            {
                let s = String::deserialize(deserializer)?;
                s.parse().map_err(serde::de::Error::custom)
            }
        }
    };
}

define_typed_wrapper!(
    /// Fungible token identifier (20-byte contract address)
    ///
    /// Totally ordered by its bytes; the ordering is what makes pool keys
    /// canonical.
    AssetId, 20
);

define_typed_wrapper!(
    /// Ledger account identifier (20-byte address)
    ///
    /// Identifies liquidity providers, traders and the exchange vault.
    AccountId, 20
);
