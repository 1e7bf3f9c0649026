use std::str::FromStr;

use super::LineParser;
use crate::error::IngestError;
use crate::record::{HeaderSchema, Record, Side};

/// Parser for `;`-delimited trade and level lines
#[derive(Debug, Clone, Copy, Default)]
pub struct RecordParser;

impl RecordParser {
    pub fn new() -> Self {
        Self
    }
}

fn parse_number<T: FromStr>(value: &str, name: &str) -> Result<T, IngestError> {
    value
        .parse::<T>()
        .map_err(|_| IngestError::line(format!("invalid {}: '{}'", name, value)))
}

fn parse_amount(value: &str, name: &str) -> Result<f64, IngestError> {
    let amount: f64 = parse_number(value, name)?;
    if !amount.is_finite() {
        return Err(IngestError::line(format!(
            "invalid {}: '{}' is not finite",
            name, value
        )));
    }
    Ok(amount)
}

fn parse_rebuild(value: &str) -> Result<bool, IngestError> {
    match value {
        "0" => Ok(false),
        "1" => Ok(true),
        other => Err(IngestError::line(format!(
            "invalid value for rebuild: '{}' when expected '1' or '0'",
            other
        ))),
    }
}

impl LineParser for RecordParser {
    fn parse_line(&self, line: &str, schema: HeaderSchema) -> Result<Record, IngestError> {
        let fields: Vec<&str> = line.split(';').collect();
        if fields.len() != schema.field_count() {
            return Err(IngestError::line(format!(
                "expected {} fields, found {}",
                schema.field_count(),
                fields.len()
            )));
        }

        let rebuild = match schema {
            HeaderSchema::Trade => None,
            HeaderSchema::Level => Some(parse_rebuild(fields[5])?),
        };

        Ok(Record {
            receive_ts: parse_number(fields[0], "receive_ts")?,
            exchange_ts: parse_number(fields[1], "exchange_ts")?,
            price: parse_amount(fields[2], "price")?,
            quantity: parse_amount(fields[3], "quantity")?,
            side: fields[4].parse::<Side>().map_err(IngestError::line)?,
            rebuild,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chunker::Chunk;
    use crate::stats::{get_thread_stats, reset_thread_stats};
    use std::path::PathBuf;
    use std::sync::Arc;

    fn chunk(schema: HeaderSchema, text: &str) -> Chunk {
        Chunk {
            source: Arc::new(PathBuf::from("test.csv")),
            index: 0,
            schema,
            text: text.to_string(),
        }
    }

    #[test]
    fn test_trade_line() {
        let record = RecordParser::new()
            .parse_line("1716810808593627;1716810808574000;68480.10;0.011;bid", HeaderSchema::Trade)
            .unwrap();

        assert_eq!(record.receive_ts, 1716810808593627);
        assert_eq!(record.exchange_ts, 1716810808574000);
        assert_eq!(record.price, 68480.10);
        assert_eq!(record.quantity, 0.011);
        assert_eq!(record.side, Side::Bid);
        assert_eq!(record.rebuild, None);
    }

    #[test]
    fn test_level_line() {
        let parser = RecordParser::new();
        let record = parser
            .parse_line("5;4;10.5;3;ask;1", HeaderSchema::Level)
            .unwrap();
        assert_eq!(record.side, Side::Ask);
        assert_eq!(record.rebuild, Some(true));

        let record = parser
            .parse_line("5;4;10.5;3;ask;0", HeaderSchema::Level)
            .unwrap();
        assert_eq!(record.rebuild, Some(false));
    }

    #[test]
    fn test_invalid_lines() {
        let parser = RecordParser::new();
        let cases = [
            ("1;2;3.0;4.0;buy", HeaderSchema::Trade),
            ("1;2;3.0;4.0", HeaderSchema::Trade),
            ("1;2;3.0;4.0;bid;0", HeaderSchema::Trade),
            ("1;2;3.0;4.0;bid", HeaderSchema::Level),
            ("1;2;3.0;4.0;bid;2", HeaderSchema::Level),
            ("1;2;3.0;4.0;bid;true", HeaderSchema::Level),
            ("-1;2;3.0;4.0;bid", HeaderSchema::Trade),
            ("x;2;3.0;4.0;bid", HeaderSchema::Trade),
            ("1;2;abc;4.0;bid", HeaderSchema::Trade),
            ("1;2;3.0;NaN;bid", HeaderSchema::Trade),
            ("1;2;inf;4.0;ask", HeaderSchema::Trade),
            ("1;;3.0;4.0;ask", HeaderSchema::Trade),
        ];

        for (line, schema) in cases {
            let result = parser.parse_line(line, schema);
            assert!(
                matches!(result, Err(IngestError::LineParse { .. })),
                "line should be rejected: {}",
                line
            );
        }
    }

    #[test]
    fn test_chunk_drops_only_the_bad_line() {
        reset_thread_stats();
        let text = "3;1;10.0;1.0;bid\n4;1;11.0;1.0;buy\n\n5;1;12.0;1.0;ask\n";

        let records = RecordParser::new().parse_chunk(&chunk(HeaderSchema::Trade, text));

        let stamps: Vec<u64> = records.iter().map(|r| r.receive_ts).collect();
        assert_eq!(stamps, vec![3, 5]);

        let stats = get_thread_stats();
        assert_eq!(stats.lines_read, 3);
        assert_eq!(stats.lines_rejected, 1);
    }

    #[test]
    fn test_chunk_keeps_line_order_and_handles_crlf() {
        let text = "9;1;1.0;1.0;bid;0\r\n2;1;1.0;1.0;ask;1\r\n7;1;1.0;1.0;bid;0";

        let records = RecordParser::new().parse_chunk(&chunk(HeaderSchema::Level, text));

        let stamps: Vec<u64> = records.iter().map(|r| r.receive_ts).collect();
        assert_eq!(stamps, vec![9, 2, 7]);
    }

    #[test]
    fn test_parse_chunk_is_pure_across_threads() {
        let text: String = (0..500)
            .map(|i| {
                let side = if i % 7 == 0 { "buy" } else { "bid" };
                format!("{};{};{}.5;1.0;{}\n", i, i, i, side)
            })
            .collect();
        let shared = Arc::new(chunk(HeaderSchema::Trade, &text));
        let parser = RecordParser::new();

        let first = parser.parse_chunk(&shared);
        let second = parser.parse_chunk(&shared);

        let handles: Vec<_> = (0..4)
            .map(|_| {
                let shared = Arc::clone(&shared);
                std::thread::spawn(move || RecordParser::new().parse_chunk(&shared))
            })
            .collect();

        let expected: Vec<(u64, f64)> = first.iter().map(|r| (r.receive_ts, r.price)).collect();
        assert_eq!(
            second.iter().map(|r| (r.receive_ts, r.price)).collect::<Vec<_>>(),
            expected
        );
        for handle in handles {
            let records = handle.join().unwrap();
            assert_eq!(
                records.iter().map(|r| (r.receive_ts, r.price)).collect::<Vec<_>>(),
                expected
            );
        }
        assert_eq!(first.len(), 500 - 72);
    }
}
