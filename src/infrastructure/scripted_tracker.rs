/// スクリプトトラッカーアダプタ
///
/// テスト・開発用のランドマークプロバイダ実装。
/// 事前に与えた観測列を1フレームにつき1つ順番に返し、
/// 尽きたあとは「手なし」を返し続ける。

use crate::domain::{DomainResult, Frame, HandObservation, HandTrackerPort};
use std::collections::VecDeque;

/// スクリプトトラッカーアダプタ
#[allow(dead_code)]
pub struct ScriptedTracker {
    script: VecDeque<Option<HandObservation>>,
}

#[allow(dead_code)]
impl ScriptedTracker {
    /// 新しいスクリプトトラッカーを作成
    pub fn new(script: Vec<Option<HandObservation>>) -> Self {
        Self {
            script: script.into(),
        }
    }

    /// 残りの観測数
    pub fn remaining(&self) -> usize {
        self.script.len()
    }
}

impl HandTrackerPort for ScriptedTracker {
    fn detect(&mut self, _frame: &Frame) -> DomainResult<Option<HandObservation>> {
        Ok(self.script.pop_front().flatten())
    }
}
