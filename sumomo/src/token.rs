//! トークンの結果コンテナ
//!
//! このモジュールは、形態素解析の結果として得られるトークンを表現する型を提供します。
//! トークンは辞書内の単語への参照を保持し、表層形、品詞情報、位置情報などへの
//! アクセスを提供します。

use std::ops::Range;

use crate::dictionary::WordType;
use crate::dictionary::word_idx::WordIdx;
use crate::tokenizer::lattice::Node;
use crate::tokenizer::worker::Worker;
use crate::utils;

/// 形態素解析の結果トークン
///
/// このトークンは[`Worker`]への軽量な参照であり、実際のデータは
/// Workerが保持しています。トークンはWorkerが生存している間のみ有効です。
pub struct Token<'w> {
    worker: &'w Worker,
    index: usize,
}

impl<'w> Token<'w> {
    #[inline(always)]
    pub(crate) const fn new(worker: &'w Worker, index: usize) -> Self {
        Self { worker, index }
    }

    #[inline(always)]
    fn node(&self) -> &'w Node {
        &self.worker.top_nodes[self.index]
    }

    /// トークンの文字単位の位置範囲を取得します。
    #[inline(always)]
    pub fn range_char(&self) -> Range<usize> {
        let node = self.node();
        node.start_char..node.end_char
    }

    /// トークンのバイト単位の位置範囲を取得します。
    #[inline(always)]
    pub fn range_byte(&self) -> Range<usize> {
        let sent = &self.worker.sent;
        let node = self.node();
        sent.byte_position(node.start_char)..sent.byte_position(node.end_char)
    }

    /// トークンの表層形（元のテキスト中の文字列）を取得します。
    #[inline(always)]
    pub fn surface(&self) -> &'w str {
        let node = self.node();
        self.worker.sent.surface(node.start_char, node.end_char)
    }

    /// トークンの単語インデックスを取得します。
    #[inline(always)]
    pub fn word_idx(&self) -> WordIdx {
        // 最良パスにBOS/EOSは含まれない。
        self.node()
            .word_idx()
            .unwrap_or(WordIdx::new(WordType::Unknown, u32::MAX))
    }

    /// トークンの素性文字列`表層形,素性...`を取得します。
    ///
    /// 素性の形式は辞書によって異なります。
    #[inline(always)]
    pub fn feature(&self) -> &'w str {
        self.worker.tokenizer.dictionary().word_feature(self.word_idx())
    }

    /// トークンが既知語か未知語かを取得します。
    #[inline(always)]
    pub fn word_type(&self) -> WordType {
        self.word_idx().word_type
    }

    /// トークンノードの左文脈IDを取得します。
    #[inline(always)]
    pub fn left_id(&self) -> u16 {
        self.node().left_id
    }

    /// トークンノードの右文脈IDを取得します。
    #[inline(always)]
    pub fn right_id(&self) -> u16 {
        self.node().right_id
    }

    /// トークンノードの単語コストを取得します。
    ///
    /// 値が低いほど出現しやすい単語です。
    #[inline(always)]
    pub fn word_cost(&self) -> i16 {
        self.node().word_cost
    }

    /// 文頭からこのトークンノードまでの累積コストを取得します。
    #[inline(always)]
    pub fn total_cost(&self) -> i32 {
        self.node().total_cost
    }

    /// このトークンビューを所有型の[`TokenBuf`]に変換します。
    ///
    /// # 引数
    ///
    /// * `offset` - 入力全体の中でこの文が始まる文字位置。
    ///   [`TokenBuf::word_position`]はこの値を加えた1始まりの位置になります。
    pub fn to_buf(&self, offset: usize) -> TokenBuf {
        let word_type = self.word_type();
        let features = utils::parse_csv_row(self.feature());
        let field = |i: usize| features.get(i).cloned();
        let (reading, pronunciation) = match word_type {
            WordType::Known => (field(8), field(9)),
            WordType::Unknown => (None, None),
        };
        TokenBuf {
            surface_form: self.surface().to_string(),
            pos: field(1),
            pos_detail_1: field(2),
            pos_detail_2: field(3),
            pos_detail_3: field(4),
            conjugated_type: field(5),
            conjugated_form: field(6),
            basic_form: field(7),
            reading,
            pronunciation,
            word_id: self.word_idx().word_id,
            word_type,
            word_position: offset + self.range_char().start + 1,
        }
    }
}

impl std::fmt::Debug for Token<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Token")
            .field("surface", &self.surface())
            .field("range_char", &self.range_char())
            .field("range_byte", &self.range_byte())
            .field("feature", &self.feature())
            .field("word_type", &self.word_type())
            .field("word_id", &self.word_idx())
            .field("left_id", &self.left_id())
            .field("right_id", &self.right_id())
            .field("word_cost", &self.word_cost())
            .field("total_cost", &self.total_cost())
            .finish()
    }
}

/// トークンのイテレータ
///
/// 前方および後方からの走査をサポートしています（[`DoubleEndedIterator`]を実装）。
pub struct TokenIter<'w> {
    worker: &'w Worker,
    front: usize,
    back: usize,
}

impl<'w> TokenIter<'w> {
    #[inline(always)]
    pub(crate) fn new(worker: &'w Worker) -> Self {
        let num_tokens = worker.num_tokens();
        Self {
            worker,
            front: 0,
            back: num_tokens,
        }
    }
}

impl<'w> Iterator for TokenIter<'w> {
    type Item = Token<'w>;

    #[inline(always)]
    fn next(&mut self) -> Option<Self::Item> {
        if self.front < self.back {
            let t = self.worker.token(self.front);
            self.front += 1;
            Some(t)
        } else {
            None
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let n = self.back - self.front;
        (n, Some(n))
    }
}

impl<'w> DoubleEndedIterator for TokenIter<'w> {
    #[inline(always)]
    fn next_back(&mut self) -> Option<Self::Item> {
        if self.front < self.back {
            self.back -= 1;
            let t = self.worker.token(self.back);
            Some(t)
        } else {
            None
        }
    }
}

impl ExactSizeIterator for TokenIter<'_> {}

/// 所有型の自己完結したトークン
///
/// 素性はIPADICの列順に従って分解されます。
/// 辞書の素性文字列に含まれない列は`None`、空の列は`Some("")`です。
/// 未知語は読みと発音を持ちません。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenBuf {
    /// 表層形
    pub surface_form: String,
    /// 品詞
    pub pos: Option<String>,
    /// 品詞細分類1
    pub pos_detail_1: Option<String>,
    /// 品詞細分類2
    pub pos_detail_2: Option<String>,
    /// 品詞細分類3
    pub pos_detail_3: Option<String>,
    /// 活用型
    pub conjugated_type: Option<String>,
    /// 活用形
    pub conjugated_form: Option<String>,
    /// 原形
    pub basic_form: Option<String>,
    /// 読み
    pub reading: Option<String>,
    /// 発音
    pub pronunciation: Option<String>,
    /// エントリID
    pub word_id: u32,
    /// 既知語か未知語か
    pub word_type: WordType,
    /// 入力全体の中での1始まりの文字位置
    pub word_position: usize,
}

#[cfg(test)]
mod tests {
    use crate::dictionary::*;
    use crate::tokenizer::*;

    fn tokenizer() -> Tokenizer {
        let lexicon_csv = "自然,0,0,1,名詞,一般,*,*,*,*,自然,シゼン,シゼン
言語,0,0,4,名詞,一般,*,*,*,*,言語,ゲンゴ,ゲンゴ
処理,0,0,3,名詞,サ変接続,*,*,*,*,処理,ショリ,ショリ
自然言語,0,0,6,名詞,一般,*,*,*,*,自然言語,シゼンゲンゴ,シゼンゲンゴ
言語処理,0,0,5,名詞,一般,*,*,*,*,言語処理,ゲンゴショリ,ゲンゴショリ";
        let matrix_def = "1 1\n0 0 0";
        let char_def = "DEFAULT 0 1 0";
        let unk_def = "DEFAULT,0,0,100,名詞,一般,*,*,*,*,*";

        let dict = SystemDictionaryBuilder::from_readers(
            lexicon_csv.as_bytes(),
            matrix_def.as_bytes(),
            char_def.as_bytes(),
            unk_def.as_bytes(),
        )
        .unwrap();
        Tokenizer::new(dict)
    }

    #[test]
    fn test_iter() {
        let tokenizer = tokenizer();
        let mut worker = tokenizer.new_worker();
        worker.reset_sentence("自然言語処理");
        worker.tokenize();
        assert_eq!(worker.num_tokens(), 2);

        let mut it = worker.token_iter();
        assert_eq!(it.len(), 2);
        for i in 0..worker.num_tokens() {
            let lhs = worker.token(i);
            let rhs = it.next().unwrap();
            assert_eq!(lhs.surface(), rhs.surface());
        }
        assert!(it.next().is_none());

        let surfaces: Vec<_> = worker.token_iter().rev().map(|t| t.surface()).collect();
        assert_eq!(surfaces, vec!["言語処理", "自然"]);
    }

    #[test]
    fn test_token() {
        let tokenizer = tokenizer();
        let mut worker = tokenizer.new_worker();
        worker.reset_sentence("自然言語処理");
        worker.tokenize();

        let t = worker.token(0);
        assert_eq!(t.surface(), "自然");
        assert_eq!(t.range_char(), 0..2);
        assert_eq!(t.range_byte(), 0..6);
        assert_eq!(t.total_cost(), 1);

        let t = worker.token(1);
        assert_eq!(t.surface(), "言語処理");
        assert_eq!(t.range_char(), 2..6);
        assert_eq!(t.range_byte(), 6..18);
        assert_eq!(t.word_type(), WordType::Known);
        assert_eq!(t.word_cost(), 5);
        assert_eq!(t.total_cost(), 6);
        assert!(t.feature().starts_with("言語処理,名詞,一般"));
    }

    #[test]
    fn test_to_buf_known() {
        let tokenizer = tokenizer();
        let mut worker = tokenizer.new_worker();
        worker.reset_sentence("自然言語処理");
        worker.tokenize();

        let buf = worker.token(1).to_buf(10);
        assert_eq!(buf.surface_form, "言語処理");
        assert_eq!(buf.pos.as_deref(), Some("名詞"));
        assert_eq!(buf.pos_detail_1.as_deref(), Some("一般"));
        assert_eq!(buf.pos_detail_2.as_deref(), Some("*"));
        assert_eq!(buf.basic_form.as_deref(), Some("言語処理"));
        assert_eq!(buf.reading.as_deref(), Some("ゲンゴショリ"));
        assert_eq!(buf.pronunciation.as_deref(), Some("ゲンゴショリ"));
        assert_eq!(buf.word_type, WordType::Known);
        assert_eq!(buf.word_id, 40);
        assert_eq!(buf.word_position, 13);
    }

    #[test]
    fn test_to_buf_unknown() {
        let tokenizer = tokenizer();
        let mut worker = tokenizer.new_worker();
        worker.reset_sentence("abc");
        worker.tokenize();
        assert_eq!(worker.num_tokens(), 1);

        let buf = worker.token(0).to_buf(0);
        assert_eq!(buf.surface_form, "abc");
        assert_eq!(buf.pos.as_deref(), Some("名詞"));
        assert_eq!(buf.basic_form.as_deref(), Some("*"));
        assert_eq!(buf.reading, None);
        assert_eq!(buf.pronunciation, None);
        assert_eq!(buf.word_type, WordType::Unknown);
        assert_eq!(buf.word_position, 1);
    }
}
