//! ラティス（格子）構造の実装モジュール。
//!
//! 形態素解析におけるViterbiアルゴリズムのためのラティス構造を提供します。
//! ノードは終了位置ごとにまとめて保持し、挿入時に最小コストの左ノードを決定します。
//! 開始位置の昇順に挿入されるため、左ノードはすべて挿入済みです。
use crate::dictionary::WordType;
use crate::dictionary::connector::ConnectorCost;
use crate::dictionary::lexicon::WordParam;
use crate::dictionary::word_idx::WordIdx;

/// BOS/EOSの接続ID
pub const BOS_EOS_CONNECTION_ID: u16 = 0;

const MAX_COST: i32 = i32::MAX;

/// ノードの種類。
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum NodeKind {
    /// 文頭。
    Bos,
    /// 文末。
    Eos,
    /// 既知語。
    Known { word_id: u32 },
    /// 未知語。
    Unknown { word_id: u32 },
}

/// ラティス内のノード。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Node {
    pub kind: NodeKind,
    /// 単語の開始位置（文字単位、0始まり）。
    pub start_char: usize,
    /// 単語の終了位置（文字単位）。
    pub end_char: usize,
    pub left_id: u16,
    pub right_id: u16,
    pub word_cost: i16,
    /// BOSからこのノードまでの最小コスト。
    pub total_cost: i32,
    /// 最小コストを持つ左ノードの、`ends[start_char]`内での添字。
    pub prev: Option<usize>,
}

impl Node {
    /// 単語インデックスを取得します。BOS/EOSの場合は`None`です。
    #[inline(always)]
    pub fn word_idx(&self) -> Option<WordIdx> {
        match self.kind {
            NodeKind::Known { word_id } => Some(WordIdx::new(WordType::Known, word_id)),
            NodeKind::Unknown { word_id } => Some(WordIdx::new(WordType::Unknown, word_id)),
            NodeKind::Bos | NodeKind::Eos => None,
        }
    }

    /// 単語の長さ（文字数）。
    #[inline(always)]
    pub fn length(&self) -> usize {
        self.end_char - self.start_char
    }

    /// このノードがBOSに接続されているかどうかを判定します。
    #[inline(always)]
    pub fn is_connected_to_bos(&self) -> bool {
        self.total_cost != MAX_COST
    }
}

/// 1-best解用のラティス構造体。
#[derive(Default)]
pub struct Lattice {
    ends: Vec<Vec<Node>>,
    eos: Option<Node>,
    len_char: usize,
}

impl Lattice {
    /// ラティスをリセットし、新しい文の処理を準備します。
    ///
    /// # 引数
    ///
    /// * `len_char` - 新しい文の文字数
    pub fn reset(&mut self, len_char: usize) {
        Self::reset_vec(&mut self.ends, len_char + 1);
        self.len_char = len_char;
        self.eos = None;
        self.insert_bos();
    }

    fn reset_vec<T>(data: &mut Vec<Vec<T>>, new_len: usize) {
        for v in data.iter_mut() {
            v.clear();
        }
        let cur_len = data.len();
        if cur_len <= new_len {
            data.reserve(new_len - cur_len);
            for _ in cur_len..new_len {
                data.push(Vec::with_capacity(16))
            }
        }
    }

    /// 設定された文の文字数を返します。
    #[inline(always)]
    pub const fn len_char(&self) -> usize {
        self.len_char
    }

    fn insert_bos(&mut self) {
        self.ends[0].push(Node {
            kind: NodeKind::Bos,
            start_char: 0,
            end_char: 0,
            left_id: BOS_EOS_CONNECTION_ID,
            right_id: BOS_EOS_CONNECTION_ID,
            word_cost: 0,
            total_cost: 0,
            prev: None,
        });
    }

    /// EOS（文末）ノードを挿入します。
    pub fn insert_eos<C>(&mut self, connector: &C)
    where
        C: ConnectorCost,
    {
        let start_char = self.len_char;
        let (prev, min_cost) = self.search_min_node(start_char, BOS_EOS_CONNECTION_ID, connector);
        self.eos = Some(Node {
            kind: NodeKind::Eos,
            start_char,
            end_char: start_char,
            left_id: BOS_EOS_CONNECTION_ID,
            right_id: BOS_EOS_CONNECTION_ID,
            word_cost: 0,
            total_cost: min_cost,
            prev,
        });
    }

    /// ラティスに新しいノードを挿入します。
    ///
    /// BOSから到達できないノードは挿入されません。
    ///
    /// # 引数
    ///
    /// * `start_char` - 単語の開始位置
    /// * `end_char` - 単語の終了位置
    /// * `word_idx` - 単語インデックス
    /// * `word_param` - 単語パラメータ（接続ID、コスト）
    /// * `connector` - 接続コスト計算用のコネクタ
    pub fn insert_node<C>(
        &mut self,
        start_char: usize,
        end_char: usize,
        word_idx: WordIdx,
        word_param: WordParam,
        connector: &C,
    ) where
        C: ConnectorCost,
    {
        debug_assert!(start_char < end_char);
        let (prev, min_cost) = self.search_min_node(start_char, word_param.left_id, connector);
        if prev.is_none() {
            return;
        }
        let kind = match word_idx.word_type {
            WordType::Known => NodeKind::Known {
                word_id: word_idx.word_id,
            },
            WordType::Unknown => NodeKind::Unknown {
                word_id: word_idx.word_id,
            },
        };
        self.ends[end_char].push(Node {
            kind,
            start_char,
            end_char,
            left_id: word_param.left_id,
            right_id: word_param.right_id,
            word_cost: word_param.word_cost,
            total_cost: min_cost.saturating_add(i32::from(word_param.word_cost)),
            prev,
        });
    }

    fn search_min_node<C>(
        &self,
        start_char: usize,
        left_id: u16,
        connector: &C,
    ) -> (Option<usize>, i32)
    where
        C: ConnectorCost,
    {
        let mut min_idx = None;
        let mut min_cost = MAX_COST;
        for (i, left_node) in self.ends[start_char].iter().enumerate() {
            if !left_node.is_connected_to_bos() {
                continue;
            }
            let conn_cost = connector.cost(left_node.right_id, left_id);
            let new_cost = left_node.total_cost.saturating_add(conn_cost);
            // 同じコストなら先に挿入された候補を優先する。
            if min_idx.is_none() || new_cost < min_cost {
                min_idx = Some(i);
                min_cost = new_cost;
            }
        }
        (min_idx, min_cost)
    }

    /// 指定位置で終わるノードが少なくとも1つ存在するかチェックします。
    #[inline(always)]
    pub fn has_previous_node(&self, i: usize) -> bool {
        self.ends.get(i).is_some_and(|d| !d.is_empty())
    }

    /// EOSノードを返します。
    #[inline(always)]
    pub fn eos(&self) -> Option<&Node> {
        self.eos.as_ref()
    }

    /// 最良パスのノードをベクトルに追加します。
    ///
    /// EOSから後方にたどるため、ノードは文末側から順に追加されます。BOS/EOSは含みません。
    ///
    /// # Panics
    ///
    /// EOSが挿入されていない場合や、EOSまでのパスが存在しない場合にパニックします。
    /// 未知語処理によってすべての位置に候補が生成されるため、通常は起こりません。
    pub fn append_top_nodes(&self, top_nodes: &mut Vec<Node>) {
        let eos = self.eos.as_ref();
        assert!(
            eos.is_some_and(|eos| eos.prev.is_some()),
            "no path reaches EOS in a lattice of {} chars",
            self.len_char
        );
        let Some(eos) = eos else { return };
        let mut node = eos;
        while let Some(prev) = node.prev {
            node = &self.ends[node.start_char][prev];
            if node.kind == NodeKind::Bos {
                break;
            }
            top_nodes.push(*node);
        }
    }

    /// BOSからEOSまでの最良パスを文頭側から返します。
    pub fn search(&self) -> Vec<Node> {
        let mut nodes = vec![];
        self.append_top_nodes(&mut nodes);
        nodes.reverse();
        nodes
    }
}

impl std::fmt::Debug for Lattice {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Lattice {{ eos: {:?}, ends: [", &self.eos)?;
        for (i, e) in self.ends[..=self.len_char()].iter().enumerate() {
            writeln!(f, "{i} => {e:?}")?;
        }
        writeln!(f, "]}}")
    }
}
