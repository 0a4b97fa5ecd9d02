use sea_orm::{
    sea_query::{ArrayType, Nullable, ValueType, ValueTypeErr},
    DbErr, QueryResult, TryFromU64, TryGetError, TryGetable, Value,
};
use serde::{Deserialize, Serialize};
use std::{fmt, num::ParseIntError};

/// Row identities are allocated by the store's autoincrement sequences, so
/// every id is a positive `i64`. Zero and negatives never name a row.
macro_rules! define_id {
    ($name:ident) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(i64);

        impl $name {
            pub const fn new(raw: i64) -> Self {
                Self(raw)
            }

            /// `None` for the "unset" values external callers use (`0` or below).
            pub fn positive(raw: i64) -> Option<Self> {
                (raw > 0).then_some(Self(raw))
            }

            pub const fn get(self) -> i64 {
                self.0
            }
        }

        impl From<i64> for $name {
            fn from(raw: i64) -> Self {
                Self(raw)
            }
        }

        impl From<$name> for i64 {
            fn from(id: $name) -> Self {
                id.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl std::str::FromStr for $name {
            type Err = ParseIntError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Ok(Self(s.trim().parse()?))
            }
        }

        // SeaORM trait implementations
        impl From<$name> for Value {
            fn from(id: $name) -> Self {
                Value::BigInt(Some(id.0))
            }
        }

        impl TryGetable for $name {
            fn try_get_by<I: sea_orm::ColIdx>(
                res: &QueryResult,
                idx: I,
            ) -> Result<Self, TryGetError> {
                // Go through i64's impl so NULL stays `TryGetError::Null` and
                // `Option<$name>` columns decode to `None`.
                <i64 as TryGetable>::try_get_by(res, idx).map(Self)
            }
        }

        impl ValueType for $name {
            fn try_from(v: Value) -> Result<Self, ValueTypeErr> {
                match v {
                    Value::BigInt(Some(raw)) => Ok(Self(raw)),
                    Value::Int(Some(raw)) => Ok(Self(raw.into())),
                    _ => Err(ValueTypeErr),
                }
            }

            fn type_name() -> String {
                stringify!($name).to_owned()
            }

            fn array_type() -> ArrayType {
                ArrayType::BigInt
            }

            fn column_type() -> sea_orm::ColumnType {
                sea_orm::ColumnType::BigInteger
            }
        }

        impl Nullable for $name {
            fn null() -> Value {
                Value::BigInt(None)
            }
        }

        impl TryFromU64 for $name {
            fn try_from_u64(n: u64) -> Result<Self, DbErr> {
                <i64 as TryFrom<u64>>::try_from(n)
                    .map(Self)
                    .map_err(|_| DbErr::ConvertFromU64(stringify!($name)))
            }
        }
    };
}

define_id!(ForumId);
define_id!(ThreadId);
define_id!(UserId);
define_id!(PostId);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_positive_rejects_unset_values() {
        assert_eq!(PostId::positive(0), None);
        assert_eq!(PostId::positive(-4), None);
        assert_eq!(PostId::positive(12), Some(PostId::new(12)));
    }

    #[test]
    fn test_id_string_conversion() {
        let id = ThreadId::new(42);
        let parsed: ThreadId = id.to_string().parse().unwrap();
        assert_eq!(id, parsed);
        assert!("slug-42".parse::<ThreadId>().is_err());
    }

    #[test]
    fn test_id_serialization() {
        let id = PostId::new(7);
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "7");
        let deserialized: PostId = serde_json::from_str(&json).unwrap();
        assert_eq!(id, deserialized);
    }

    #[test]
    fn test_try_from_u64_bounds() {
        assert_eq!(UserId::try_from_u64(3).unwrap(), UserId::new(3));
        assert!(UserId::try_from_u64(u64::MAX).is_err());
    }
}
