// ==========================================
// 项目资源负载优化引擎 - 优化结果缓存 / 运行锁
// ==========================================
// 职责: 推荐结果按 (项目, 团队, 窗口, 阈值) 缓存；同一 key 至多一个运行中的优化
// 红线: 由服务层显式注入,引擎本身不持有任何缓存状态
// ==========================================

use crate::domain::types::{ProjectId, TeamId};
use chrono::NaiveDate;
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::{Duration, Instant};
use tracing::{debug, trace, warn};

// ==========================================
// OptimizationKey - 缓存/锁键
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct OptimizationKey {
    pub project_id: Option<ProjectId>,
    pub team_id: Option<TeamId>,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub threshold_bits: u64, // f64::to_bits,保证可哈希
}

impl OptimizationKey {
    pub fn new(
        project_id: Option<ProjectId>,
        team_id: Option<TeamId>,
        start_date: NaiveDate,
        end_date: NaiveDate,
        threshold: f64,
    ) -> Self {
        Self {
            project_id,
            team_id,
            start_date,
            end_date,
            threshold_bits: threshold.to_bits(),
        }
    }

    pub fn threshold(&self) -> f64 {
        f64::from_bits(self.threshold_bits)
    }

    /// 该 key 的结果是否可能包含 project_id 下的任务
    pub fn covers_project(&self, project_id: Option<ProjectId>) -> bool {
        match (self.project_id, project_id) {
            (None, _) | (_, None) => true,
            (Some(own), Some(changed)) => own == changed,
        }
    }
}

// ==========================================
// RunGuard - 运行锁守卫
// ==========================================
/// Drop 时释放对应 key 的运行锁
#[must_use = "守卫释放即解锁"]
pub struct RunGuard {
    running: Option<Arc<Mutex<HashSet<OptimizationKey>>>>,
    key: OptimizationKey,
}

impl RunGuard {
    /// 不占用任何锁的守卫
    pub fn detached(key: OptimizationKey) -> Self {
        Self { running: None, key }
    }

    pub fn key(&self) -> &OptimizationKey {
        &self.key
    }
}

impl Drop for RunGuard {
    fn drop(&mut self) {
        if let Some(running) = self.running.take() {
            lock_or_recover(&running).remove(&self.key);
            trace!(key = ?self.key, "运行锁已释放");
        }
    }
}

// ==========================================
// OptimizationCache Trait
// ==========================================
pub trait OptimizationCache<V>: Send + Sync
where
    V: Clone + Send + Sync,
{
    /// 查询未过期的缓存
    fn get(&self, key: &OptimizationKey) -> Option<V>;

    fn set(&self, key: OptimizationKey, value: V);

    /// 清除可能包含该项目任务的缓存,返回清除条数
    ///
    /// 命中: 同项目的 key + 不限项目（project_id = None）的 key；
    /// project_id 为 None 时清空全部
    fn invalidate_project(&self, project_id: Option<ProjectId>) -> usize;

    /// 尝试获取运行锁；已有同 key 运行中时返回 None
    fn try_acquire(&self, key: &OptimizationKey) -> Option<RunGuard>;
}

// ==========================================
// InMemoryOptimizationCache - TTL 内存缓存
// ==========================================
struct CacheEntry<V> {
    value: V,
    expires_at: Instant,
}

impl<V> CacheEntry<V> {
    fn is_expired(&self) -> bool {
        Instant::now() >= self.expires_at
    }
}

pub struct InMemoryOptimizationCache<V> {
    entries: Mutex<HashMap<OptimizationKey, CacheEntry<V>>>,
    running: Arc<Mutex<HashSet<OptimizationKey>>>,
    ttl: Duration,
}

impl<V> InMemoryOptimizationCache<V> {
    pub fn new(ttl: Duration) -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            running: Arc::new(Mutex::new(HashSet::new())),
            ttl,
        }
    }

    pub fn with_ttl_secs(ttl_secs: u64) -> Self {
        Self::new(Duration::from_secs(ttl_secs))
    }

    pub fn len(&self) -> usize {
        lock_or_recover(&self.entries).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<V> OptimizationCache<V> for InMemoryOptimizationCache<V>
where
    V: Clone + Send + Sync,
{
    fn get(&self, key: &OptimizationKey) -> Option<V> {
        let mut entries = lock_or_recover(&self.entries);
        match entries.get(key) {
            Some(entry) if !entry.is_expired() => {
                trace!(key = ?key, "缓存命中");
                Some(entry.value.clone())
            }
            Some(_) => {
                entries.remove(key);
                trace!(key = ?key, "缓存已过期");
                None
            }
            None => None,
        }
    }

    fn set(&self, key: OptimizationKey, value: V) {
        let entry = CacheEntry {
            value,
            expires_at: Instant::now() + self.ttl,
        };
        lock_or_recover(&self.entries).insert(key, entry);
    }

    fn invalidate_project(&self, project_id: Option<ProjectId>) -> usize {
        let mut entries = lock_or_recover(&self.entries);
        let before = entries.len();
        entries.retain(|key, _| !key.covers_project(project_id));
        let removed = before - entries.len();
        debug!(?project_id, removed, "项目缓存已失效");
        removed
    }

    fn try_acquire(&self, key: &OptimizationKey) -> Option<RunGuard> {
        let mut running = lock_or_recover(&self.running);
        if !running.insert(*key) {
            return None;
        }
        Some(RunGuard {
            running: Some(Arc::clone(&self.running)),
            key: *key,
        })
    }
}

// ==========================================
// NoOpOptimizationCache - 不缓存、不加锁
// ==========================================
#[derive(Debug, Clone, Copy, Default)]
pub struct NoOpOptimizationCache;

impl<V> OptimizationCache<V> for NoOpOptimizationCache
where
    V: Clone + Send + Sync,
{
    fn get(&self, _key: &OptimizationKey) -> Option<V> {
        None
    }

    fn set(&self, _key: OptimizationKey, _value: V) {}

    fn invalidate_project(&self, _project_id: Option<ProjectId>) -> usize {
        0
    }

    fn try_acquire(&self, key: &OptimizationKey) -> Option<RunGuard> {
        Some(RunGuard::detached(*key))
    }
}

/// 锁中毒时沿用内部数据（缓存内容可丢弃,不影响正确性）
fn lock_or_recover<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| {
        warn!("缓存锁中毒，继续使用现有数据");
        poisoned.into_inner()
    })
}
