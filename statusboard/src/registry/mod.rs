//! 監視対象レジストリ
//!
//! 起動時に確定する静的なサービス一覧。実行中に追加・削除はしない。

use statusboard_common::config::validate_targets;
use statusboard_common::error::CommonResult;
use statusboard_common::types::ServiceTarget;
use std::sync::Arc;

/// 監視対象レジストリ
///
/// 内部は不変リストの共有なので、cloneは安価。
#[derive(Debug, Clone)]
pub struct ServiceRegistry {
    targets: Arc<[ServiceTarget]>,
}

impl ServiceRegistry {
    /// 監視対象一覧からレジストリを作成
    ///
    /// 空の名前・重複名は検証エラー。
    pub fn new(targets: Vec<ServiceTarget>) -> CommonResult<Self> {
        validate_targets(&targets)?;
        Ok(Self {
            targets: targets.into(),
        })
    }

    /// 設定順の監視対象一覧
    pub fn targets(&self) -> &[ServiceTarget] {
        &self.targets
    }

    /// 監視対象を順に列挙
    pub fn iter(&self) -> impl Iterator<Item = &ServiceTarget> {
        self.targets.iter()
    }

    /// 名前で監視対象を取得
    pub fn get(&self, name: &str) -> Option<&ServiceTarget> {
        self.targets.iter().find(|t| t.name == name)
    }

    /// 登録済みの名前か
    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// 監視対象数
    pub fn len(&self) -> usize {
        self.targets.len()
    }

    /// 監視対象が空か
    pub fn is_empty(&self) -> bool {
        self.targets.is_empty()
    }
}
