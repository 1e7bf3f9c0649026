#![no_main]

use libfuzzer_sys::fuzz_target;
use tickmerge::{HeaderSchema, LineParser, RecordParser};

fuzz_target!(|data: &[u8]| {
    let Some((&tag, rest)) = data.split_first() else {
        return;
    };
    let Ok(line) = std::str::from_utf8(rest) else {
        return;
    };

    let schema = if tag % 2 == 0 {
        HeaderSchema::Trade
    } else {
        HeaderSchema::Level
    };

    if let Ok(record) = RecordParser::new().parse_line(line, schema) {
        assert!(record.price.is_finite());
        assert!(record.quantity.is_finite());
        assert_eq!(record.rebuild.is_some(), schema == HeaderSchema::Level);
    }
});
