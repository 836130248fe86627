//! 进程内计数器，可直接读取，测试用

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, MutexGuard};

use crate::application::{OrderMetrics, Outcome};

type FetchedKey = (Outcome, Option<String>);

#[derive(Debug, Default)]
pub struct InMemoryOrderMetrics {
    created_success: AtomicU64,
    created_failed: AtomicU64,
    fetched: Mutex<HashMap<FetchedKey, u64>>,
}

impl InMemoryOrderMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    // 计数只做加法，锁中毒时数据仍然可用
    fn fetched_map(&self) -> MutexGuard<'_, HashMap<FetchedKey, u64>> {
        self.fetched.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub fn created(&self, outcome: Outcome) -> u64 {
        match outcome {
            Outcome::Success => self.created_success.load(Ordering::SeqCst),
            Outcome::Failed => self.created_failed.load(Ordering::SeqCst),
        }
    }

    /// 某一结果的合计，含不带订单 ID 的计数
    pub fn fetched(&self, outcome: Outcome) -> u64 {
        self.fetched_map()
            .iter()
            .filter(|((o, _), _)| *o == outcome)
            .map(|(_, n)| *n)
            .sum()
    }

    pub fn fetched_for(&self, outcome: Outcome, order_id: &str) -> u64 {
        self.fetched_map()
            .get(&(outcome, Some(order_id.to_string())))
            .copied()
            .unwrap_or(0)
    }

    /// 带 `order_id` 标签的不同订单数
    pub fn labelled_order_ids(&self) -> usize {
        let map = self.fetched_map();
        let mut ids: Vec<&String> = map.keys().filter_map(|(_, id)| id.as_ref()).collect();
        ids.sort();
        ids.dedup();
        ids.len()
    }
}

impl OrderMetrics for InMemoryOrderMetrics {
    fn order_created(&self, outcome: Outcome) {
        let counter = match outcome {
            Outcome::Success => &self.created_success,
            Outcome::Failed => &self.created_failed,
        };
        counter.fetch_add(1, Ordering::SeqCst);
    }

    fn order_fetched(&self, outcome: Outcome, order_id: Option<&str>) {
        *self
            .fetched_map()
            .entry((outcome, order_id.map(str::to_string)))
            .or_insert(0) += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn test_fetched_counts_per_order() {
        let metrics = InMemoryOrderMetrics::new();
        metrics.order_fetched(Outcome::Success, Some("a"));
        metrics.order_fetched(Outcome::Success, Some("a"));
        metrics.order_fetched(Outcome::Success, Some("b"));
        metrics.order_fetched(Outcome::Failed, Some("a"));
        metrics.order_fetched(Outcome::Failed, None);

        assert_eq!(metrics.fetched_for(Outcome::Success, "a"), 2);
        assert_eq!(metrics.fetched(Outcome::Success), 3);
        assert_eq!(metrics.fetched(Outcome::Failed), 2);
        assert_eq!(metrics.labelled_order_ids(), 2);
    }

    #[test]
    fn test_concurrent_increments_are_not_lost() {
        let metrics = Arc::new(InMemoryOrderMetrics::new());
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let metrics = metrics.clone();
                std::thread::spawn(move || {
                    for _ in 0..1000 {
                        metrics.order_created(Outcome::Success);
                        metrics.order_fetched(Outcome::Failed, Some("o"));
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(metrics.created(Outcome::Success), 8000);
        assert_eq!(metrics.fetched_for(Outcome::Failed, "o"), 8000);
    }

    #[test]
    fn test_increments_survive_poisoned_lock() {
        let metrics = Arc::new(InMemoryOrderMetrics::new());
        metrics.order_fetched(Outcome::Success, Some("o"));

        let poisoner = metrics.clone();
        let _ = std::thread::spawn(move || {
            let _guard = poisoner.fetched.lock().unwrap();
            panic!("poison the lock");
        })
        .join();
        assert!(metrics.fetched.is_poisoned());

        metrics.order_fetched(Outcome::Success, Some("o"));
        assert_eq!(metrics.fetched_for(Outcome::Success, "o"), 2);
    }
}
