//! Shop domain type.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Errors that can occur when parsing a [`ShopDomain`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum ShopDomainError {
    /// The input string is empty.
    #[error("shop domain cannot be empty")]
    Empty,
    /// The input does not end in `.myshopify.com`.
    #[error("shop domain must end with {suffix}")]
    WrongSuffix {
        /// Required suffix.
        suffix: &'static str,
    },
    /// The store handle contains characters other than `a-z`, `0-9` and `-`.
    #[error("shop handle `{0}` may only contain letters, digits and hyphens")]
    InvalidHandle(String),
}

/// A Shopify store domain such as `my-store.myshopify.com`.
///
/// Every Admin API URL and every OAuth redirect is built from this value,
/// so anything else (another host, a path, a port) is rejected.
///
/// ## Constraints
///
/// - Lowercased on parse
/// - Exactly `<handle>.myshopify.com`
/// - Handle is non-empty, `a-z`, `0-9` and `-`, not starting with `-`
///
/// ## Examples
///
/// ```
/// use launchkit_core::ShopDomain;
///
/// assert!(ShopDomain::parse("my-store.myshopify.com").is_ok());
/// assert!(ShopDomain::parse("My-Store.MyShopify.com").is_ok());
///
/// assert!(ShopDomain::parse("").is_err());
/// assert!(ShopDomain::parse("evil.com").is_err());
/// assert!(ShopDomain::parse("a.b.myshopify.com").is_err());
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(try_from = "String", into = "String")]
pub struct ShopDomain(String);

impl ShopDomain {
    /// Domain suffix shared by every Shopify store.
    pub const SUFFIX: &'static str = ".myshopify.com";

    /// Parse a `ShopDomain` from a string.
    ///
    /// # Errors
    ///
    /// Returns an error if the input is empty, has another suffix, or the
    /// handle contains disallowed characters.
    pub fn parse(s: &str) -> Result<Self, ShopDomainError> {
        let s = s.trim().to_ascii_lowercase();
        if s.is_empty() {
            return Err(ShopDomainError::Empty);
        }

        let handle = s
            .strip_suffix(Self::SUFFIX)
            .ok_or(ShopDomainError::WrongSuffix {
                suffix: Self::SUFFIX,
            })?;

        let valid = !handle.is_empty()
            && !handle.starts_with('-')
            && handle
                .chars()
                .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-');
        if !valid {
            return Err(ShopDomainError::InvalidHandle(handle.to_owned()));
        }

        Ok(Self(s))
    }

    /// Returns the domain as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns the store handle (the part before `.myshopify.com`).
    #[must_use]
    pub fn handle(&self) -> &str {
        self.0.strip_suffix(Self::SUFFIX).unwrap_or(&self.0)
    }
}

impl fmt::Display for ShopDomain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for ShopDomain {
    type Err = ShopDomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for ShopDomain {
    type Error = ShopDomainError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::parse(&s)
    }
}

impl From<ShopDomain> for String {
    fn from(shop: ShopDomain) -> Self {
        shop.0
    }
}

impl AsRef<str> for ShopDomain {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

// SQLx support (with postgres feature)
#[cfg(feature = "postgres")]
impl sqlx::Type<sqlx::Postgres> for ShopDomain {
    fn type_info() -> sqlx::postgres::PgTypeInfo {
        <String as sqlx::Type<sqlx::Postgres>>::type_info()
    }

    fn compatible(ty: &sqlx::postgres::PgTypeInfo) -> bool {
        <String as sqlx::Type<sqlx::Postgres>>::compatible(ty)
    }
}

#[cfg(feature = "postgres")]
impl<'r> sqlx::Decode<'r, sqlx::Postgres> for ShopDomain {
    fn decode(value: sqlx::postgres::PgValueRef<'r>) -> Result<Self, sqlx::error::BoxDynError> {
        let s = <String as sqlx::Decode<sqlx::Postgres>>::decode(value)?;
        // Only validated domains are ever written
        Ok(Self(s))
    }
}

#[cfg(feature = "postgres")]
impl sqlx::Encode<'_, sqlx::Postgres> for ShopDomain {
    fn encode_by_ref(
        &self,
        buf: &mut sqlx::postgres::PgArgumentBuffer,
    ) -> Result<sqlx::encode::IsNull, sqlx::error::BoxDynError> {
        <String as sqlx::Encode<sqlx::Postgres>>::encode_by_ref(&self.0, buf)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_valid_domains() {
        assert!(ShopDomain::parse("store.myshopify.com").is_ok());
        assert!(ShopDomain::parse("my-store-2.myshopify.com").is_ok());
        assert!(ShopDomain::parse("  store.myshopify.com ").is_ok());
    }

    #[test]
    fn test_parse_lowercases() {
        let shop = ShopDomain::parse("My-Store.MYSHOPIFY.com").expect("valid");
        assert_eq!(shop.as_str(), "my-store.myshopify.com");
        assert_eq!(shop.handle(), "my-store");
    }

    #[test]
    fn test_parse_empty() {
        assert_eq!(ShopDomain::parse("  "), Err(ShopDomainError::Empty));
    }

    #[test]
    fn test_parse_wrong_suffix() {
        assert!(matches!(
            ShopDomain::parse("store.example.com"),
            Err(ShopDomainError::WrongSuffix { .. })
        ));
        assert!(matches!(
            ShopDomain::parse("https://store.myshopify.com/admin"),
            Err(ShopDomainError::WrongSuffix { .. })
        ));
    }

    #[test]
    fn test_parse_invalid_handle() {
        for bad in [
            ".myshopify.com",
            "a.b.myshopify.com",
            "-store.myshopify.com",
            "evil.com/x.myshopify.com",
            "store:443.myshopify.com",
        ] {
            assert!(
                matches!(ShopDomain::parse(bad), Err(ShopDomainError::InvalidHandle(_))),
                "{bad} should be rejected"
            );
        }
    }

    #[test]
    fn test_serde_validates() {
        let shop: ShopDomain = serde_json::from_str("\"store.myshopify.com\"").expect("valid");
        assert_eq!(serde_json::to_string(&shop).expect("valid"), "\"store.myshopify.com\"");
        assert!(serde_json::from_str::<ShopDomain>("\"evil.com\"").is_err());
    }

    #[test]
    fn test_display() {
        let shop = ShopDomain::parse("store.myshopify.com").expect("valid");
        assert_eq!(format!("{shop}"), "store.myshopify.com");
    }
}
