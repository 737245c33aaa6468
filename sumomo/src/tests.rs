//! Sumomoのテストモジュール群
//!
//! `resources`以下のMeCab形式の小さな辞書を使って、
//! 各コンポーネント(connector、character、tokenizer等)の動作を検証します。

mod tokenizer;

use crate::{Dictionary, SystemDictionaryBuilder};

const LEX_CSV: &str = include_str!("./tests/resources/lex.csv");
const MATRIX_DEF: &str = include_str!("./tests/resources/matrix.def");
const CHAR_DEF: &str = include_str!("./tests/resources/char.def");
const UNK_DEF: &str = include_str!("./tests/resources/unk.def");

fn build_dictionary() -> Dictionary {
    SystemDictionaryBuilder::from_readers(
        LEX_CSV.as_bytes(),
        MATRIX_DEF.as_bytes(),
        CHAR_DEF.as_bytes(),
        UNK_DEF.as_bytes(),
    )
    .unwrap()
}
