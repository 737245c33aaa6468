//! 小さなMeCab形式の辞書を用いた形態素解析のベンチマーク
//!
//! ワーカーを再利用する場合と、[`Tokenizer::tokenize`]で所有型トークンを
//! 生成する場合の解析速度を計測します。

use std::sync::Arc;
use std::time::Duration;

use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use sumomo::{Dictionary, SystemDictionaryBuilder, Tokenizer};

const LEX_CSV: &str = include_str!("../src/tests/resources/lex.csv");
const MATRIX_DEF: &str = include_str!("../src/tests/resources/matrix.def");
const CHAR_DEF: &str = include_str!("../src/tests/resources/char.def");
const UNK_DEF: &str = include_str!("../src/tests/resources/unk.def");

const LINES: &[&str] = &[
    "すもももももももものうち",
    "東京都のすもも、京都のもも。",
    "スモモーとABCと1234のうち",
    "東京都東京都京都都のもも",
];

fn build_dictionary() -> Dictionary {
    SystemDictionaryBuilder::from_readers(
        LEX_CSV.as_bytes(),
        MATRIX_DEF.as_bytes(),
        CHAR_DEF.as_bytes(),
        UNK_DEF.as_bytes(),
    )
    .unwrap_or_else(|e| panic!("Failed to build the dictionary: {e}"))
}

fn criterion_benchmark(c: &mut Criterion) {
    let dict = Arc::new(build_dictionary());
    let lines: Vec<String> = LINES.iter().map(|l| l.repeat(16)).collect();
    let total_bytes: usize = lines.iter().map(String::len).sum();

    let mut group = c.benchmark_group("Tokenization Speed");
    group.throughput(Throughput::Bytes(total_bytes as u64));
    group.warm_up_time(Duration::from_secs(3));
    group.measurement_time(Duration::from_secs(10));
    group.sample_size(20);

    group.bench_function(BenchmarkId::new("Worker", "Lines"), |b| {
        b.iter_with_setup(
            || Tokenizer::from_shared_dictionary(dict.clone()).new_worker(),
            |mut worker| {
                for line in &lines {
                    worker.reset_sentence(line);
                    worker.tokenize();
                }
            },
        );
    });

    group.bench_function(BenchmarkId::new("TokenBuf", "Lines"), |b| {
        let tokenizer = Tokenizer::from_shared_dictionary(dict.clone());
        b.iter(|| {
            for line in &lines {
                std::hint::black_box(tokenizer.tokenize(line));
            }
        });
    });

    group.bench_function(BenchmarkId::new("MeCab-Compat", "Lines"), |b| {
        b.iter_with_setup(
            || {
                Tokenizer::from_shared_dictionary(dict.clone())
                    .max_grouping_len(24)
                    .new_worker()
            },
            |mut worker| {
                for line in &lines {
                    worker.reset_sentence(line);
                    worker.tokenize();
                }
            },
        );
    });

    group.finish();
}

criterion_group!(benches, criterion_benchmark);
criterion_main!(benches);
