use serde::Serialize;
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

/// Header line of the 5-field trade layout
pub const TRADE_HEADER: &str = "receive_ts;exchange_ts;price;quantity;side";
/// Header line of the 6-field level layout (trailing rebuild flag)
pub const LEVEL_HEADER: &str = "receive_ts;exchange_ts;price;quantity;side;rebuild";

/// Column layout of an input file, identified by its header line
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum HeaderSchema {
    Trade,
    Level,
}

impl HeaderSchema {
    /// Match a header line (without its terminator) against the known layouts
    pub fn detect(header: &str) -> Option<Self> {
        match header {
            TRADE_HEADER => Some(HeaderSchema::Trade),
            LEVEL_HEADER => Some(HeaderSchema::Level),
            _ => None,
        }
    }

    pub fn field_count(self) -> usize {
        match self {
            HeaderSchema::Trade => 5,
            HeaderSchema::Level => 6,
        }
    }

    pub fn header(self) -> &'static str {
        match self {
            HeaderSchema::Trade => TRADE_HEADER,
            HeaderSchema::Level => LEVEL_HEADER,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Bid,
    Ask,
}

impl FromStr for Side {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "bid" => Ok(Side::Bid),
            "ask" => Ok(Side::Ask),
            other => Err(format!(
                "invalid value for side: '{}' when expected 'ask' or 'bid'",
                other
            )),
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::Bid => write!(f, "bid"),
            Side::Ask => write!(f, "ask"),
        }
    }
}

/// One parsed trading event.
///
/// Equality and ordering look at `receive_ts` only. Two records with the same
/// receive timestamp compare equal even when every other field differs.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct Record {
    pub receive_ts: u64,
    pub exchange_ts: u64,
    pub price: f64,
    pub quantity: f64,
    pub side: Side,
    /// `None` for trade-layout records
    pub rebuild: Option<bool>,
}

impl PartialEq for Record {
    fn eq(&self, other: &Self) -> bool {
        self.receive_ts == other.receive_ts
    }
}

impl Eq for Record {}

impl PartialOrd for Record {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Record {
    fn cmp(&self, other: &Self) -> Ordering {
        self.receive_ts.cmp(&other.receive_ts)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(receive_ts: u64, price: f64) -> Record {
        Record {
            receive_ts,
            exchange_ts: receive_ts - 1,
            price,
            quantity: 1.0,
            side: Side::Bid,
            rebuild: None,
        }
    }

    #[test]
    fn test_schema_detection() {
        assert_eq!(HeaderSchema::detect(TRADE_HEADER), Some(HeaderSchema::Trade));
        assert_eq!(HeaderSchema::detect(LEVEL_HEADER), Some(HeaderSchema::Level));
        assert_eq!(HeaderSchema::detect("receive_ts;price"), None);
        assert_eq!(HeaderSchema::detect(""), None);
        assert_eq!(HeaderSchema::detect(&format!("{} ", TRADE_HEADER)), None);
    }

    #[test]
    fn test_field_counts_match_headers() {
        for schema in [HeaderSchema::Trade, HeaderSchema::Level] {
            assert_eq!(schema.header().split(';').count(), schema.field_count());
        }
    }

    #[test]
    fn test_side_parsing_is_exact() {
        assert_eq!("bid".parse::<Side>(), Ok(Side::Bid));
        assert_eq!("ask".parse::<Side>(), Ok(Side::Ask));
        assert!("buy".parse::<Side>().is_err());
        assert!("BID".parse::<Side>().is_err());
        assert!(" ask".parse::<Side>().is_err());
    }

    #[test]
    fn test_ordering_uses_receive_ts_only() {
        let a = record(10, 1.0);
        let b = record(10, 99.0);
        let c = record(11, 0.5);

        assert_eq!(a, b);
        assert!(a < c);
        assert_eq!(c.cmp(&a), Ordering::Greater);
    }
}
