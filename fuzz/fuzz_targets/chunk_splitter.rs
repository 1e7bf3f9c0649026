#![no_main]

use std::io::Cursor;
use std::path::Path;

use libfuzzer_sys::fuzz_target;
use tickmerge::record::TRADE_HEADER;
use tickmerge::ChunkSplitter;

const MAX_CHUNK_SIZE: usize = 256;

fuzz_target!(|data: &[u8]| {
    let Some((&size, body)) = data.split_first() else {
        return;
    };
    let chunk_size = (size as usize % MAX_CHUNK_SIZE) + 1;

    let mut input = format!("{}\n", TRADE_HEADER).into_bytes();
    input.extend_from_slice(body);

    let Ok(chunks) = ChunkSplitter::new(chunk_size).split_reader(Cursor::new(input), Path::new("fuzz.csv"))
    else {
        return;
    };

    let mut texts = Vec::new();
    for chunk in chunks {
        let Ok(chunk) = chunk else {
            return;
        };
        texts.push(chunk.text);
    }

    // Every chunk but the last ends on a line terminator
    if let Some((_, rest)) = texts.split_last() {
        assert!(rest.iter().all(|text| text.ends_with('\n')));
    }

    if let Ok(body) = std::str::from_utf8(body) {
        assert_eq!(texts.concat(), body);
    }
});
