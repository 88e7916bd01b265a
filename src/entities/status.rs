//! Lifecycle status shared by orders and ledger transactions.
//!
//! Any status may follow any other; the only rule enforced is membership in this
//! enumeration, checked when a status arrives as text.

use crate::errors::Error;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Status of an order or a ledger transaction
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum, Serialize, Deserialize,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Status {
    /// Created, not yet worked on
    #[sea_orm(string_value = "PENDING")]
    Pending,
    /// Being picked or otherwise handled
    #[sea_orm(string_value = "PROCESSING")]
    Processing,
    /// Done
    #[sea_orm(string_value = "COMPLETED")]
    Completed,
    /// Abandoned
    #[sea_orm(string_value = "CANCELLED")]
    Cancelled,
}

impl Status {
    /// Canonical upper-case name, as stored.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "PENDING",
            Self::Processing => "PROCESSING",
            Self::Completed => "COMPLETED",
            Self::Cancelled => "CANCELLED",
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Status {
    type Err = Error;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "PENDING" => Ok(Self::Pending),
            "PROCESSING" => Ok(Self::Processing),
            "COMPLETED" => Ok(Self::Completed),
            "CANCELLED" => Ok(Self::Cancelled),
            _ => Err(Error::validation(
                "status",
                format!("'{s}' is not a recognized status"),
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;

    #[test]
    fn test_parse_is_case_insensitive() {
        assert_eq!("completed".parse::<Status>().unwrap(), Status::Completed);
        assert_eq!(" Pending ".parse::<Status>().unwrap(), Status::Pending);
        assert_eq!(Status::Cancelled.to_string(), "CANCELLED");
    }

    #[test]
    fn test_parse_rejects_unknown_status() {
        let err = "SHIPPED".parse::<Status>().unwrap_err();
        assert!(matches!(err, Error::Validation { ref field, .. } if field == "status"));
    }
}
