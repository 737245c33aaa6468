//! トークン化処理のためのルーチンを提供するモジュール。
//!
//! ワーカーは内部データ構造を保持し、再利用することで不要なメモリアロケーションを避けます。
use crate::sentence::Sentence;
use crate::token::{Token, TokenIter};
use crate::tokenizer::Tokenizer;
use crate::tokenizer::lattice::{Lattice, Node};

/// トークン化処理のためのルーチンを提供する構造体。
///
/// トークン化に使用される内部データ構造を保持し、それらを再利用することで
/// 不要なメモリ再割り当てを回避します。呼び出しをまたいで解析の状態は残りません。
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
///     "DEFAULT,0,0,100,名詞".as_bytes(),
/// )?;
/// let tokenizer = Tokenizer::new(dict);
/// let mut worker = tokenizer.new_worker();
/// worker.reset_sentence("自然言語");
/// worker.tokenize();
/// let surfaces: Vec<_> = worker.token_iter().map(|t| t.surface()).collect();
/// assert_eq!(surfaces, vec!["自然", "言語"]);
/// # Ok::<(), sumomo::errors::SumomoError>(())
/// ```
pub struct Worker {
    pub(crate) tokenizer: Tokenizer,
    pub(crate) sent: Sentence,
    pub(crate) lattice: Lattice,
    pub(crate) top_nodes: Vec<Node>,
}

impl Worker {
    /// 新しいインスタンスを作成します。
    pub(crate) fn new(tokenizer: Tokenizer) -> Self {
        Self {
            tokenizer,
            sent: Sentence::new(),
            lattice: Lattice::default(),
            top_nodes: vec![],
        }
    }

    /// トークン化する入力文をリセットします。
    ///
    /// 新しい文を設定し、以前の状態をクリアします。
    pub fn reset_sentence<S>(&mut self, input: S)
    where
        S: AsRef<str>,
    {
        self.sent.clear();
        self.top_nodes.clear();
        let input = input.as_ref();
        if !input.is_empty() {
            self.sent.set_sentence(input);
            self.sent.compile(self.tokenizer.dictionary().char_table());
        }
    }

    /// 設定された入力文をトークン化します。
    ///
    /// 結果は`token_iter()`や`token()`でアクセスできます。
    /// 空の文が設定されている場合は何も行いません。
    pub fn tokenize(&mut self) {
        if self.sent.chars().is_empty() {
            return;
        }
        self.tokenizer.build_lattice(&self.sent, &mut self.lattice);
        self.lattice.append_top_nodes(&mut self.top_nodes);
    }

    /// トークン化結果のトークン数を取得します。
    #[inline(always)]
    pub fn num_tokens(&self) -> usize {
        self.top_nodes.len()
    }

    /// `i`番目のトークンを取得します。
    ///
    /// # Panics
    ///
    /// `i`が[`num_tokens()`](Self::num_tokens)以上の場合にパニックします。
    #[inline(always)]
    pub fn token<'w>(&'w self, i: usize) -> Token<'w> {
        let index = self.num_tokens() - i - 1;
        Token::new(self, index)
    }

    /// トークン化結果のイテレータを作成します。
    #[inline(always)]
    pub fn token_iter<'w>(&'w self) -> TokenIter<'w> {
        TokenIter::new(self)
    }
}
