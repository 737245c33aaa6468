//! # Sumomo
//!
//! Sumomoは、ラティスとビタビアルゴリズムに基づく日本語形態素解析の実装です。
//!
//! ## 概要
//!
//! このライブラリは、MeCab形式の辞書データ(IPADICなど)を使って
//! 日本語テキストをトークンに分割します。
//! 辞書は固定幅のバイナリ形式をとる複数のアーティファクトとして永続化でき、
//! ディレクトリから非同期に読み込めます。
//!
//! ## 主な機能
//!
//! - **形態素解析**: ラティスを構築し、最小コストのパスを求めます
//! - **未知語処理**: 文字カテゴリの規則から未知語の候補を生成します
//! - **辞書の構築**: MeCab形式のテキストからの構築
//! - **アーティファクトの永続化**: Zstandard圧縮にも対応したディレクトリへの読み書き
//!
//! ## 使用例
//!
//! ```
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! use sumomo::{SystemDictionaryBuilder, Tokenizer};
//!
//! let lexicon_csv = "すもも,1,1,100,名詞,一般,*,*,*,*,すもも,スモモ,スモモ
//! もも,1,1,100,名詞,一般,*,*,*,*,もも,モモ,モモ
//! も,2,2,50,助詞,係助詞,*,*,*,*,も,モ,モ
//! の,2,2,50,助詞,連体化,*,*,*,*,の,ノ,ノ
//! うち,1,1,100,名詞,非自立,副詞可能,*,*,*,うち,ウチ,ウチ";
//! let matrix_def = "3 3\n1 2 -10\n2 1 -10";
//! let char_def = "DEFAULT 0 1 0";
//! let unk_def = "DEFAULT,0,0,1000,名詞,一般,*,*,*,*,*";
//!
//! let dict = SystemDictionaryBuilder::from_readers(
//!     lexicon_csv.as_bytes(),
//!     matrix_def.as_bytes(),
//!     char_def.as_bytes(),
//!     unk_def.as_bytes(),
//! )?;
//!
//! let tokenizer = Tokenizer::new(dict);
//! let tokens = tokenizer.tokenize("すもももももももものうち");
//! let surfaces: Vec<_> = tokens.iter().map(|t| t.surface_form.as_str()).collect();
//! assert_eq!(surfaces, vec!["すもも", "も", "もも", "も", "もも", "の", "うち"]);
//! assert_eq!(tokens[0].reading.as_deref(), Some("スモモ"));
//! # Ok(())
//! # }
//! ```
#![cfg_attr(docsrs, feature(doc_cfg))]

#[cfg(not(any(target_pointer_width = "32", target_pointer_width = "64")))]
compile_error!("`target_pointer_width` must be 32 or 64");

/// リトルエンディアンのバイト列の読み書き
pub mod codec;

/// 辞書データ構造とビルダー
pub mod dictionary;

/// エラー型の定義
pub mod errors;

/// 文の内部表現と句読点での分割
pub mod sentence;

/// トークン型の定義
pub mod token;

/// トークナイザーの実装
pub mod tokenizer;

/// 内部ユーティリティ関数
pub mod utils;

#[cfg(test)]
mod tests;

// Re-exports
pub use dictionary::{Dictionary, DirectoryLoader, SystemDictionaryBuilder, WordType};
pub use token::TokenBuf;
pub use tokenizer::Tokenizer;

/// このライブラリのバージョン番号
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
