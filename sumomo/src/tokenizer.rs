//! Viterbiアルゴリズムに基づくトークナイザー。
//!
//! このモジュールは、日本語形態素解析のためのメイントークナイザーを提供します。
//! Viterbiアルゴリズムを使用して、入力文を最適な形態素列に分割します。
//!
//! # 主要な構造体
//!
//! - [`Tokenizer`]: 形態素解析を実行するメイントークナイザー構造体
//! - [`Worker`]: トークナイザーのワーカー。実際の解析処理を行う
//!
//! # 例
//!
//! ```
//! use sumomo::{SystemDictionaryBuilder, Tokenizer};
//!
//! let dict = SystemDictionaryBuilder::from_readers(
//!     "自然,0,0,1,名詞\n言語,0,0,4,名詞\n処理,0,0,3,名詞".as_bytes(),
//!     "1 1\n0 0 0".as_bytes(),
//!     "DEFAULT 0 1 0".as_bytes(),
//!     "DEFAULT,0,0,100,名詞".as_bytes(),
//! )?;
//! let tokenizer = Tokenizer::new(dict);
//! let mut worker = tokenizer.new_worker();
//!
//! worker.reset_sentence("自然言語処理");
//! worker.tokenize();
//!
//! for i in 0..worker.num_tokens() {
//!     let token = worker.token(i);
//!     println!("{}", token.surface());
//! }
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
pub mod lattice;
pub mod worker;

use std::sync::Arc;

use crate::Dictionary;
use crate::dictionary::{WordIdx, WordType};
use crate::sentence::{self, Sentence, SplitByPunctuation};
use crate::token::TokenBuf;
use crate::tokenizer::lattice::Lattice;
use crate::tokenizer::worker::Worker;

/// 未知語の最大グルーピング長の既定値
pub const DEFAULT_MAX_GROUPING_LEN: usize = 1024;

/// 形態素解析を行うトークナイザー。
///
/// 辞書データを`Arc`で保持し、複数の[`Worker`]インスタンスを生成して並列処理を行うことができます。
///
/// # フィールド
///
/// - `dict`: 形態素解析に使用する辞書データへの参照
/// - `max_grouping_len`: 未知語の最大グルーピング長
#[derive(Clone)]
pub struct Tokenizer {
    dict: Arc<Dictionary>,
    max_grouping_len: Option<usize>,
}

impl Tokenizer {
    /// 新しいトークナイザーを作成します。
    ///
    /// 辞書はトークナイザーに所有権が移動します。複数のトークナイザー間で辞書を共有する
    /// 必要がある場合は、[`Tokenizer::from_shared_dictionary`]を使用してください。
    ///
    /// # 引数
    ///
    /// * `dict` - 形態素解析に使用する辞書
    pub fn new(dict: Dictionary) -> Self {
        Self::from_shared_dictionary(Arc::new(dict))
    }

    /// 共有された辞書から新しいトークナイザーを作成します。
    ///
    /// 複数のトークナイザーが同じ辞書データを共有する必要があるマルチスレッドシナリオで便利です。
    ///
    /// # 例
    ///
    /// ```
    /// use std::sync::Arc;
    /// use sumomo::{SystemDictionaryBuilder, Tokenizer};
    ///
    /// let dict = Arc::new(SystemDictionaryBuilder::from_readers(
    ///     "自然,0,0,1,名詞".as_bytes(),
    ///     "1 1\n0 0 0".as_bytes(),
    ///     "DEFAULT 0 1 0".as_bytes(),
    ///     "DEFAULT,0,0,100,名詞".as_bytes(),
    /// )?);
    /// let tokenizer1 = Tokenizer::from_shared_dictionary(dict.clone());
    /// let tokenizer2 = Tokenizer::from_shared_dictionary(dict);
    /// assert_eq!(tokenizer1.tokenize("自然"), tokenizer2.tokenize("自然"));
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    pub fn from_shared_dictionary(dict: Arc<Dictionary>) -> Self {
        Self {
            dict,
            max_grouping_len: Some(DEFAULT_MAX_GROUPING_LEN),
        }
    }

    /// 未知語の最大グルーピング長を指定します。
    ///
    /// 既定値は[`DEFAULT_MAX_GROUPING_LEN`]です。
    /// MeCabと同じ結果を得たい場合は、引数に`24`を指定してください。
    ///
    /// # 引数
    ///
    /// * `max_grouping_len` - 未知語の最大グルーピング長。0を指定すると無制限になります。
    pub const fn max_grouping_len(mut self, max_grouping_len: usize) -> Self {
        if max_grouping_len != 0 {
            self.max_grouping_len = Some(max_grouping_len);
        } else {
            self.max_grouping_len = None;
        }
        self
    }

    /// 辞書への参照を取得します。
    #[inline(always)]
    pub fn dictionary(&self) -> &Dictionary {
        &self.dict
    }

    /// 新しいワーカーを作成します。
    ///
    /// 各ワーカーは独立したラティス構造を保持するため、複数のワーカーを
    /// 並列に使用して同時に複数の文を解析できます。
    pub fn new_worker(&self) -> Worker {
        Worker::new(self.clone())
    }

    /// テキストを`、`と`。`で区切ります。
    ///
    /// 詳しくは[`sentence::split_by_punctuation`]を参照してください。
    #[inline(always)]
    pub fn split_by_punctuation<'a>(&self, text: &'a str) -> SplitByPunctuation<'a> {
        sentence::split_by_punctuation(text)
    }

    /// テキストをトークン化します。
    ///
    /// テキストを句読点で区切り、区切りごとにラティスを構築して最良パスを求めます。
    /// [`TokenBuf::word_position`]は入力全体の中での1始まりの文字位置です。
    ///
    /// # 例
    ///
    /// ```
    /// use sumomo::{SystemDictionaryBuilder, Tokenizer};
    ///
    /// let dict = SystemDictionaryBuilder::from_readers(
    ///     "自然,0,0,1,名詞\n言語,0,0,4,名詞".as_bytes(),
    ///     "1 1\n0 0 0".as_bytes(),
    ///     "DEFAULT 0 1 0".as_bytes(),
    ///     "DEFAULT,0,0,100,記号".as_bytes(),
    /// )?;
    /// let tokens = Tokenizer::new(dict).tokenize("自然。言語");
    /// let positions: Vec<_> = tokens.iter().map(|t| t.word_position).collect();
    /// assert_eq!(positions, vec![1, 3, 4]);
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    pub fn tokenize(&self, text: &str) -> Vec<TokenBuf> {
        let mut worker = self.new_worker();
        let mut tokens = vec![];
        let mut offset = 0;
        for chunk in self.split_by_punctuation(text) {
            worker.reset_sentence(chunk);
            worker.tokenize();
            tokens.extend(worker.token_iter().map(|t| t.to_buf(offset)));
            offset += worker.sent.len_char();
        }
        tokens
    }

    /// ラティス構造を構築します。
    ///
    /// 各開始位置で既知語と未知語のノードを挿入し、最後にEOSを挿入します。
    /// BOSから到達できない開始位置は読み飛ばします。
    ///
    /// # 引数
    ///
    /// * `sent` - 入力文
    /// * `lattice` - 構築するラティス構造
    pub(crate) fn build_lattice(&self, sent: &Sentence, lattice: &mut Lattice) {
        lattice.reset(sent.len_char());

        for start_char in 0..sent.len_char() {
            if !lattice.has_previous_node(start_char) {
                continue;
            }
            self.add_lattice_edges(sent, lattice, start_char);
        }

        lattice.insert_eos(self.dict.connection_matrix());
    }

    /// ラティスにエッジを追加します。
    ///
    /// 既知語が見つからなかった場合か、先頭文字のカテゴリが`invoke`の場合に未知語を生成します。
    fn add_lattice_edges(&self, sent: &Sentence, lattice: &mut Lattice, start_char: usize) {
        let dict = &*self.dict;
        let connector = dict.connection_matrix();
        let suffix = &sent.chars()[start_char..];

        let mut has_matched = false;
        for (word_id, end_char) in dict.word_map().common_prefix_iterator(suffix) {
            debug_assert!(start_char + end_char <= sent.len_char());
            has_matched = true;
            let word_idx = WordIdx::new(WordType::Known, word_id);
            let Some(word_param) = dict.word_param(word_idx) else {
                log::warn!("Skipped an unresolvable entry id {word_id}");
                continue;
            };
            lattice.insert_node(
                start_char,
                start_char + end_char,
                word_idx,
                word_param,
                connector,
            );
        }

        let char_table = dict.char_table();
        let class = char_table
            .class(sent.class_id(start_char))
            .unwrap_or_else(|| char_table.default_class());
        if has_matched && !class.invoke {
            return;
        }

        let mut grouping_len = if class.group {
            sent.groupable(start_char)
        } else {
            1
        };
        if let Some(max_grouping_len) = self.max_grouping_len {
            grouping_len = grouping_len.min(max_grouping_len);
        }

        for &word_id in dict.unknown().entry_ids(class.id) {
            let word_idx = WordIdx::new(WordType::Unknown, word_id);
            let Some(word_param) = dict.word_param(word_idx) else {
                log::warn!("Skipped an unresolvable unknown entry id {word_id}");
                continue;
            };
            lattice.insert_node(
                start_char,
                start_char + grouping_len,
                word_idx,
                word_param,
                connector,
            );
        }
    }
}
