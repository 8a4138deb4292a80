//! Database engines supported by the storage layer.

use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};

/// A database engine which the application can be deployed against.
#[derive(
    Clone,
    Copy,
    Debug,
    Display,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    EnumIter,
    EnumString,
    Deserialize,
    Serialize,
    ValueEnum,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum DatabaseProvider {
    Sqlite,
    Postgresql,
    Mysql,
}

/// How a calendar date is laid out in a database column.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum DateRepresentation {
    /// A native date column, read and written as a date-time pinned to UTC midnight.
    Native,
    /// A text column holding the `YYYY-MM-DD` string itself.
    Text,
}

impl DatabaseProvider {
    /// The column representation this engine uses for calendar dates.
    pub fn date_representation(self) -> DateRepresentation {
        match self {
            Self::Postgresql | Self::Mysql => DateRepresentation::Native,
            Self::Sqlite => DateRepresentation::Text,
        }
    }

    /// Whether `NULL`s sort before every other value in an ascending ordering.
    pub fn nulls_first_ascending(self) -> bool {
        match self {
            Self::Postgresql => false,
            Self::Sqlite | Self::Mysql => true,
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use std::str::FromStr;
    use strum::IntoEnumIterator;

    #[test]
    fn test_date_representation() {
        assert_eq!(
            DatabaseProvider::Postgresql.date_representation(),
            DateRepresentation::Native
        );
        assert_eq!(
            DatabaseProvider::Mysql.date_representation(),
            DateRepresentation::Native
        );
        assert_eq!(
            DatabaseProvider::Sqlite.date_representation(),
            DateRepresentation::Text
        );
    }

    #[test]
    fn test_identifier_round_trip() {
        for provider in DatabaseProvider::iter() {
            assert_eq!(
                <DatabaseProvider as FromStr>::from_str(&provider.to_string()).unwrap(),
                provider
            );
        }
        assert_eq!(DatabaseProvider::Postgresql.to_string(), "postgresql");
        assert!(<DatabaseProvider as FromStr>::from_str("oracle").is_err());
    }
}
