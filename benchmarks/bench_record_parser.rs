use std::hint::black_box;
use std::io::Cursor;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};

use tickmerge::record::TRADE_HEADER;
use tickmerge::{Chunk, ChunkSplitter, HeaderSchema, LineParser, RecordParser};

fn trade_body(lines: usize) -> String {
    (0..lines)
        .map(|i| {
            format!(
                "{};{};{}.{:02};{}.5;{}\n",
                1_700_000_000_000 + i,
                1_699_999_999_000 + i,
                100 + i % 50,
                i % 100,
                i % 7 + 1,
                if i % 2 == 0 { "bid" } else { "ask" }
            )
        })
        .collect()
}

fn bench_parse_line(c: &mut Criterion) {
    let parser = RecordParser::new();
    let trade = "1700000000123;1700000000001;101.25;3.5;bid";
    let level = "1700000000123;1700000000001;101.25;3.5;ask;1";

    c.bench_function("parse_line_trade", |b| {
        b.iter(|| black_box(parser.parse_line(black_box(trade), HeaderSchema::Trade)));
    });
    c.bench_function("parse_line_level", |b| {
        b.iter(|| black_box(parser.parse_line(black_box(level), HeaderSchema::Level)));
    });
    c.bench_function("parse_line_rejected", |b| {
        b.iter(|| {
            black_box(parser.parse_line(black_box("1;2;abc;3.5;bid"), HeaderSchema::Trade))
        });
    });
}

fn bench_parse_chunk(c: &mut Criterion) {
    let parser = RecordParser::new();
    let mut group = c.benchmark_group("parse_chunk");

    for lines in [64usize, 1024] {
        let chunk = Chunk {
            source: Arc::new(PathBuf::from("bench.csv")),
            index: 0,
            schema: HeaderSchema::Trade,
            text: trade_body(lines),
        };
        group.throughput(Throughput::Bytes(chunk.text.len() as u64));
        group.bench_with_input(BenchmarkId::from_parameter(lines), &chunk, |b, chunk| {
            b.iter(|| black_box(parser.parse_chunk(black_box(chunk))));
        });
    }

    group.finish();
}

fn bench_split(c: &mut Criterion) {
    let input = format!("{}\n{}", TRADE_HEADER, trade_body(10_000));
    let mut group = c.benchmark_group("split_reader");
    group.throughput(Throughput::Bytes(input.len() as u64));

    for chunk_size in [512usize, 4096, 65536] {
        let splitter = ChunkSplitter::new(chunk_size);
        group.bench_with_input(
            BenchmarkId::from_parameter(chunk_size),
            &input,
            |b, input| {
                b.iter(|| {
                    let chunks = splitter
                        .split_reader(Cursor::new(input.as_bytes()), Path::new("bench.csv"))
                        .unwrap();
                    black_box(chunks.count())
                });
            },
        );
    }

    group.finish();
}

criterion_group!(benches, bench_parse_line, bench_parse_chunk, bench_split);
criterion_main!(benches);
