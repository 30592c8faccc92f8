//! # Literal Values
//!
//! Typed literals held by value nodes and by node meta-data.

use super::NativeType;
use serde::{Deserialize, Serialize};
use std::fmt;

// =============================================================================
// ORDER ENUMERATIONS
// =============================================================================

/// Side of an order.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
pub enum Side {
    #[default]
    None,
    Ask,
    Bid,
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Self::None => "None",
            Self::Ask => "Ask",
            Self::Bid => "Bid",
        };
        f.write_str(text)
    }
}

/// Type of an order.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
pub enum OrderType {
    #[default]
    None,
    Limit,
    Market,
    Pegged,
    Stop,
}

impl fmt::Display for OrderType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Self::None => "None",
            Self::Limit => "Limit",
            Self::Market => "Market",
            Self::Pegged => "Pegged",
            Self::Stop => "Stop",
        };
        f.write_str(text)
    }
}

/// How long an order remains active.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
pub enum TimeInForce {
    #[default]
    Day,
    Gtc,
    Opg,
    Ioc,
    Fok,
    Gtx,
    Moc,
}

impl fmt::Display for TimeInForce {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Self::Day => "DAY",
            Self::Gtc => "GTC",
            Self::Opg => "OPG",
            Self::Ioc => "IOC",
            Self::Fok => "FOK",
            Self::Gtx => "GTX",
            Self::Moc => "MOC",
        };
        f.write_str(text)
    }
}

// =============================================================================
// MONEY
// =============================================================================

/// Fixed-point monetary amount stored in millionths of a unit.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
pub struct Money(pub i64);

impl Money {
    /// Number of raw units in one whole unit of currency.
    pub const MULTIPLIER: i64 = 1_000_000;

    /// Create an amount from whole and hundredth parts (e.g. `1, 25` is 1.25).
    #[must_use]
    pub const fn from_cents(whole: i64, cents: i64) -> Self {
        Self(
            whole
                .saturating_mul(Self::MULTIPLIER)
                .saturating_add(cents.saturating_mul(Self::MULTIPLIER / 100)),
        )
    }

    #[must_use]
    pub const fn raw(self) -> i64 {
        self.0
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let magnitude = self.0.unsigned_abs();
        let multiplier = Self::MULTIPLIER.unsigned_abs();
        let mut fraction = format!("{:06}", magnitude % multiplier);
        while fraction.len() > 2 && fraction.ends_with('0') {
            fraction.pop();
        }
        write!(f, "{}{}.{}", sign, magnitude / multiplier, fraction)
    }
}

// =============================================================================
// VALUE
// =============================================================================

/// A literal of one of the native scalar types.
///
/// Durations and date-times are millisecond counts (date-times relative to
/// the Unix epoch).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Value {
    Boolean(bool),
    Integer(i64),
    Decimal(f64),
    Money(Money),
    Duration(i64),
    DateTime(i64),
    Text(String),
    Security(String),
    Side(Side),
    OrderType(OrderType),
    TimeInForce(TimeInForce),
    Currency(String),
    Venue(String),
    Destination(String),
}

impl Value {
    /// The native type this literal belongs to.
    #[must_use]
    pub fn native_type(&self) -> NativeType {
        match self {
            Self::Boolean(_) => NativeType::Boolean,
            Self::Integer(_) => NativeType::Integer,
            Self::Decimal(_) => NativeType::Decimal,
            Self::Money(_) => NativeType::Money,
            Self::Duration(_) => NativeType::Duration,
            Self::DateTime(_) => NativeType::DateTime,
            Self::Text(_) => NativeType::Text,
            Self::Security(_) => NativeType::Security,
            Self::Side(_) => NativeType::Side,
            Self::OrderType(_) => NativeType::OrderType,
            Self::TimeInForce(_) => NativeType::TimeInForce,
            Self::Currency(_) => NativeType::Currency,
            Self::Venue(_) => NativeType::Venue,
            Self::Destination(_) => NativeType::Destination,
        }
    }

    /// The default literal of a native type, or `None` when the type has no
    /// literal form (order tasks).
    #[must_use]
    pub fn default_for(kind: NativeType) -> Option<Self> {
        let value = match kind {
            NativeType::Boolean => Self::Boolean(false),
            NativeType::Integer => Self::Integer(0),
            NativeType::Decimal => Self::Decimal(0.0),
            NativeType::Money => Self::Money(Money::default()),
            NativeType::Duration => Self::Duration(0),
            NativeType::DateTime => Self::DateTime(0),
            NativeType::Text => Self::Text(String::new()),
            NativeType::Security => Self::Security(String::new()),
            NativeType::Side => Self::Side(Side::default()),
            NativeType::OrderType => Self::OrderType(OrderType::default()),
            NativeType::TimeInForce => Self::TimeInForce(TimeInForce::default()),
            NativeType::Currency => Self::Currency(String::new()),
            NativeType::Venue => Self::Venue(String::new()),
            NativeType::Destination => Self::Destination(String::new()),
            NativeType::OrderTask => return None,
        };
        Some(value)
    }

    /// Lossless widenings available to this literal, narrowest first.
    #[must_use]
    pub fn widenings(&self) -> Vec<Self> {
        match self {
            Self::Integer(value) => vec![Self::Decimal(*value as f64)],
            _ => Vec::new(),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Boolean(value) => write!(f, "{}", if *value { "True" } else { "False" }),
            Self::Integer(value) => write!(f, "{}", value),
            Self::Decimal(value) => write!(f, "{}", value),
            Self::Money(value) => write!(f, "{}", value),
            Self::Duration(millis) => {
                let sign = if *millis < 0 { "-" } else { "" };
                let millis = millis.unsigned_abs();
                let seconds = millis / 1000;
                write!(
                    f,
                    "{}{:02}:{:02}:{:02}.{:03}",
                    sign,
                    seconds / 3600,
                    (seconds / 60) % 60,
                    seconds % 60,
                    millis % 1000
                )
            }
            Self::DateTime(millis) => write!(f, "{}ms", millis),
            Self::Side(value) => write!(f, "{}", value),
            Self::OrderType(value) => write!(f, "{}", value),
            Self::TimeInForce(value) => write!(f, "{}", value),
            Self::Text(value)
            | Self::Security(value)
            | Self::Currency(value)
            | Self::Venue(value)
            | Self::Destination(value) => f.write_str(value),
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================
