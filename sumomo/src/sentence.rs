//! 入力テキストの内部表現を提供するモジュール
//!
//! 入力文字列を文字単位に分割し、各文字の主カテゴリIDやバイト位置のマッピング、
//! 同じカテゴリの文字が連続する長さを計算・保持します。
//! 句読点で文を区切るイテレータもここで提供します。

use crate::dictionary::character::CharacterCategoryTable;

/// 文の区切りとみなす句読点
pub const PUNCTUATIONS: [char; 2] = ['、', '。'];

/// 入力テキストの内部表現を保持する構造体
///
/// # フィールド
///
/// * `input` - 元の入力文字列
/// * `chars` - 入力文字列を文字単位に分割した配列
/// * `c2b` - 文字位置からバイト位置へのマッピング配列
/// * `class_ids` - 各文字の主カテゴリID
/// * `groupable` - 各文字位置から同じ主カテゴリが連続する文字数
#[derive(Default, Clone, Debug)]
pub struct Sentence {
    input: String,
    chars: Vec<char>,
    c2b: Vec<usize>,
    class_ids: Vec<u32>,
    groupable: Vec<usize>,
}

impl Sentence {
    /// 新しい空の `Sentence` インスタンスを生成します
    pub fn new() -> Self {
        Self::default()
    }

    /// 内部状態をクリアします
    #[inline(always)]
    pub fn clear(&mut self) {
        self.input.clear();
        self.chars.clear();
        self.c2b.clear();
        self.class_ids.clear();
        self.groupable.clear();
    }

    /// 入力文字列を設定します
    ///
    /// 既存の内部状態をクリアした後、新しい入力文字列を設定します。
    /// 解析を行うには [`compile`](Self::compile) を呼び出す必要があります。
    pub fn set_sentence<S>(&mut self, input: S)
    where
        S: AsRef<str>,
    {
        self.clear();
        self.input.push_str(input.as_ref());
    }

    /// 入力文字列を解析し、内部データ構造を構築します
    ///
    /// # 引数
    ///
    /// * `char_table` - 文字カテゴリ表
    pub fn compile(&mut self, char_table: &CharacterCategoryTable) {
        self.compute_basic();
        self.compute_categories(char_table);
        self.compute_groupable();
    }

    fn compute_basic(&mut self) {
        for (bi, ch) in self.input.char_indices() {
            self.chars.push(ch);
            self.c2b.push(bi);
        }
        self.c2b.push(self.input.len());
    }

    fn compute_categories(&mut self, char_table: &CharacterCategoryTable) {
        self.class_ids.reserve(self.chars.len());
        for &c in &self.chars {
            self.class_ids.push(char_table.category_id(c));
        }
    }

    /// 後ろから走査して、各位置から同じ主カテゴリが連続する文字数を求めます。
    fn compute_groupable(&mut self) {
        debug_assert_eq!(self.chars.len(), self.class_ids.len());

        self.groupable.resize(self.chars.len(), 1);
        for i in (1..self.chars.len()).rev() {
            if self.class_ids[i - 1] == self.class_ids[i] {
                self.groupable[i - 1] = self.groupable[i] + 1;
            }
        }
    }

    /// 元の入力文字列への参照を返します
    #[inline(always)]
    pub fn raw(&self) -> &str {
        &self.input
    }

    /// 文字配列への参照を返します
    #[inline(always)]
    pub fn chars(&self) -> &[char] {
        &self.chars
    }

    /// 文字数を返します
    #[inline(always)]
    pub fn len_char(&self) -> usize {
        self.chars.len()
    }

    /// 指定された文字位置(0始まり)に対応するバイト位置を返します
    #[inline(always)]
    pub fn byte_position(&self, pos_char: usize) -> usize {
        self.c2b[pos_char]
    }

    /// 文字位置の範囲に対応する部分文字列を返します
    #[inline(always)]
    pub fn surface(&self, start_char: usize, end_char: usize) -> &str {
        &self.input[self.byte_position(start_char)..self.byte_position(end_char)]
    }

    /// 指定された文字位置の主カテゴリIDを返します
    #[inline(always)]
    pub fn class_id(&self, pos_char: usize) -> u32 {
        self.class_ids[pos_char]
    }

    /// 指定された文字位置から、同じ主カテゴリの文字が連続している数を返します
    #[inline(always)]
    pub fn groupable(&self, pos_char: usize) -> usize {
        self.groupable[pos_char]
    }
}

/// 句読点で区切った部分文字列を順に返すイテレータ
///
/// 各部分文字列は末尾の句読点を含みます。最後の部分文字列は句読点で終わらないことがあります。
/// [`Clone`]すれば先頭から何度でも走査し直せます。
#[derive(Clone, Debug)]
pub struct SplitByPunctuation<'a> {
    rest: &'a str,
}

impl<'a> Iterator for SplitByPunctuation<'a> {
    type Item = &'a str;

    fn next(&mut self) -> Option<Self::Item> {
        if self.rest.is_empty() {
            return None;
        }
        let end = self
            .rest
            .char_indices()
            .find(|(_, c)| PUNCTUATIONS.contains(c))
            .map_or(self.rest.len(), |(i, c)| i + c.len_utf8());
        let (chunk, rest) = self.rest.split_at(end);
        self.rest = rest;
        Some(chunk)
    }
}

impl std::iter::FusedIterator for SplitByPunctuation<'_> {}

/// テキストを`、`と`。`で区切ります。
///
/// # 例
///
/// ```
/// use sumomo::sentence::split_by_punctuation;
///
/// let chunks: Vec<_> = split_by_punctuation("すもも。もも。").collect();
/// assert_eq!(chunks, vec!["すもも。", "もも。"]);
/// ```
pub fn split_by_punctuation(text: &str) -> SplitByPunctuation<'_> {
    SplitByPunctuation { rest: text }
}
