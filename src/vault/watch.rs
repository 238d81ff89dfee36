//! Keyed recomputation of derived state.
//!
//! A [`KeyedEffect`] owns one value derived from a key. Setting an equal key
//! is a no-op and a different key restarts the computation, aborting the one
//! in flight. A refresh never preempts: while a computation runs it queues a
//! single rerun for the same key. Only the newest key's computation may
//! publish.

use super::balance::BalanceReader;
use crate::core::domain::SuiAddress;
use futures::future::{BoxFuture, FutureExt};
use parking_lot::Mutex;
use std::future::Future;
use std::sync::Arc;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::debug;

type Producer<K, V> = Arc<dyn Fn(K) -> BoxFuture<'static, V> + Send + Sync>;

struct EffectState<K> {
    key: Option<K>,
    /// Bumped on every key change; a task publishes only for its own.
    generation: u64,
    task: Option<JoinHandle<()>>,
    running: bool,
    rerun: bool,
}

pub struct KeyedEffect<K, V> {
    producer: Producer<K, V>,
    value: Arc<watch::Sender<V>>,
    state: Arc<Mutex<EffectState<K>>>,
}

impl<K, V> KeyedEffect<K, V>
where
    K: Clone + PartialEq + Send + 'static,
    V: Clone + Send + Sync + 'static,
{
    pub fn new<F, Fut>(initial: V, producer: F) -> Self
    where
        F: Fn(K) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = V> + Send + 'static,
    {
        let producer: Producer<K, V> = Arc::new(move |key| producer(key).boxed());
        let (value, _) = watch::channel(initial);
        Self {
            producer,
            value: Arc::new(value),
            state: Arc::new(Mutex::new(EffectState {
                key: None,
                generation: 0,
                task: None,
                running: false,
                rerun: false,
            })),
        }
    }

    /// Switch to `key`. Returns whether a recomputation was started.
    pub fn set_key(&self, key: K) -> bool {
        let mut state = self.state.lock();
        if state.key.as_ref() == Some(&key) {
            return false;
        }
        state.key = Some(key.clone());
        self.restart(&mut state, key);
        true
    }

    /// Recompute for the current key. A computation already in flight is
    /// left to finish and followed by one more run. Returns false when no
    /// key is set.
    pub fn refresh(&self) -> bool {
        let mut state = self.state.lock();
        let Some(key) = state.key.clone() else {
            return false;
        };
        if state.running {
            debug!(generation = state.generation, "computation in flight, queueing rerun");
            state.rerun = true;
        } else {
            self.restart(&mut state, key);
        }
        true
    }

    pub fn key(&self) -> Option<K> {
        self.state.lock().key.clone()
    }

    /// The last published value.
    pub fn current(&self) -> V {
        self.value.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<V> {
        self.value.subscribe()
    }

    fn restart(&self, state: &mut EffectState<K>, key: K) {
        if let Some(task) = state.task.take() {
            task.abort();
        }
        state.generation += 1;
        state.running = true;
        state.rerun = false;
        let generation = state.generation;
        debug!(generation, "recomputing keyed value");

        let producer = self.producer.clone();
        let value = self.value.clone();
        let shared = self.state.clone();
        state.task = Some(tokio::spawn(async move {
            loop {
                let computed = producer(key.clone()).await;
                let again = {
                    let mut state = shared.lock();
                    if state.generation != generation {
                        debug!(generation, "discarding stale value");
                        false
                    } else {
                        value.send_replace(computed);
                        let rerun = std::mem::take(&mut state.rerun);
                        state.running = rerun;
                        rerun
                    }
                };
                if !again {
                    return;
                }
                debug!(generation, "running queued refresh");
            }
        }));
    }
}

impl<K, V> Drop for KeyedEffect<K, V> {
    fn drop(&mut self) {
        if let Some(task) = self.state.lock().task.take() {
            task.abort();
        }
    }
}

/// The connected account's vault balance, kept current as the account
/// changes. Read failures publish 0.
pub struct BalanceWatch {
    effect: KeyedEffect<SuiAddress, u64>,
    address_zero: SuiAddress,
}

impl BalanceWatch {
    pub fn new(reader: Arc<BalanceReader>) -> Self {
        let address_zero = reader.objects().address_zero;
        let effect = KeyedEffect::new(0, move |address: SuiAddress| {
            let reader = reader.clone();
            async move { reader.read_or_zero(Some(&address)).await }
        });
        Self { effect, address_zero }
    }

    /// Track `address`, or the zero-address sentinel when disconnected.
    pub fn watch_address(&self, address: Option<SuiAddress>) -> bool {
        self.effect.set_key(address.unwrap_or(self.address_zero))
    }

    pub fn refresh(&self) -> bool {
        self.effect.refresh()
    }

    /// Balance in MIST; 0 until the first read lands.
    pub fn balance(&self) -> u64 {
        self.effect.current()
    }

    pub fn address(&self) -> Option<SuiAddress> {
        self.effect.key()
    }

    pub fn subscribe(&self) -> watch::Receiver<u64> {
        self.effect.subscribe()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::blockchain::sui::test_support::FakeNode;
    use crate::core::config::ObjectRecord;
    use crate::vault::{vault_target, ACCOUNT_DETAIL_FN};
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    fn counting_effect() -> (Arc<AtomicUsize>, KeyedEffect<u32, u32>) {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();
        let effect = KeyedEffect::new(0, move |key: u32| {
            counter.fetch_add(1, Ordering::SeqCst);
            async move { key * 10 }
        });
        (calls, effect)
    }

    #[tokio::test]
    async fn equal_key_does_not_recompute() {
        let (calls, effect) = counting_effect();
        let mut rx = effect.subscribe();

        assert!(effect.set_key(1));
        rx.changed().await.unwrap();
        assert_eq!(effect.current(), 10);

        assert!(!effect.set_key(1));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn key_change_recomputes() {
        let (calls, effect) = counting_effect();
        let mut rx = effect.subscribe();

        effect.set_key(1);
        rx.changed().await.unwrap();
        effect.set_key(2);
        rx.changed().await.unwrap();

        assert_eq!(*rx.borrow(), 20);
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn refresh_recomputes_same_key() {
        let (calls, effect) = counting_effect();
        assert!(!effect.refresh());

        let mut rx = effect.subscribe();
        effect.set_key(3);
        rx.changed().await.unwrap();
        assert!(effect.refresh());
        rx.changed().await.unwrap();

        assert_eq!(effect.current(), 30);
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn superseded_computation_never_publishes() {
        let effect = KeyedEffect::new(0u32, |key: u32| async move {
            if key == 1 {
                futures::future::pending::<()>().await;
            }
            key
        });
        let mut rx = effect.subscribe();

        effect.set_key(1);
        effect.set_key(2);
        rx.changed().await.unwrap();
        assert_eq!(*rx.borrow_and_update(), 2);

        let late = tokio::time::timeout(Duration::from_millis(50), rx.changed()).await;
        assert!(late.is_err());
        assert_eq!(effect.current(), 2);
    }

    #[tokio::test]
    async fn slow_old_key_loses_to_fast_new_key() {
        let effect = KeyedEffect::new(0u64, |key: u64| async move {
            tokio::time::sleep(Duration::from_millis(key)).await;
            key
        });
        let mut rx = effect.subscribe();

        effect.set_key(80);
        effect.set_key(5);
        rx.changed().await.unwrap();
        tokio::time::sleep(Duration::from_millis(120)).await;
        assert_eq!(effect.current(), 5);
    }

    #[tokio::test]
    async fn refresh_faster_than_producer_still_publishes() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();
        let effect = KeyedEffect::new(0u32, move |key: u32| {
            counter.fetch_add(1, Ordering::SeqCst);
            async move {
                tokio::time::sleep(Duration::from_millis(100)).await;
                key
            }
        });

        effect.set_key(7);
        for _ in 0..10 {
            tokio::time::sleep(Duration::from_millis(50)).await;
            assert!(effect.refresh());
        }
        assert_eq!(effect.current(), 7);
        // Ten refreshes over several slow reads coalesce into one rerun each.
        assert!(calls.load(Ordering::SeqCst) < 10);
    }

    #[tokio::test]
    async fn refresh_during_read_runs_once_more() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();
        let effect = KeyedEffect::new(0usize, move |_key: u32| {
            let n = counter.fetch_add(1, Ordering::SeqCst) + 1;
            async move {
                tokio::time::sleep(Duration::from_millis(20)).await;
                n
            }
        });
        let mut rx = effect.subscribe();

        effect.set_key(1);
        effect.refresh();
        effect.refresh();
        rx.changed().await.unwrap();
        assert_eq!(*rx.borrow_and_update(), 1);
        rx.changed().await.unwrap();
        assert_eq!(*rx.borrow_and_update(), 2);

        let extra = tokio::time::timeout(Duration::from_millis(60), rx.changed()).await;
        assert!(extra.is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn rapid_key_changes_across_threads_settle_on_last_key() {
        let effect = Arc::new(KeyedEffect::new(0u64, |key: u64| async move {
            tokio::task::yield_now().await;
            key
        }));

        for round in 0..50u64 {
            let switches: Vec<_> = (0..4u64)
                .map(|i| {
                    let effect = effect.clone();
                    tokio::spawn(async move { effect.set_key(round * 10 + i) })
                })
                .collect();
            for switch in switches {
                switch.await.unwrap();
            }
        }
        let last = effect.key().unwrap();
        effect.set_key(u64::MAX);
        effect.set_key(last);

        let mut rx = effect.subscribe();
        tokio::time::timeout(Duration::from_secs(5), async {
            while *rx.borrow_and_update() != last {
                rx.changed().await.unwrap();
            }
        })
        .await
        .unwrap();
        tokio::time::sleep(Duration::from_millis(50)).await;
        assert_eq!(effect.current(), last);
    }

    #[tokio::test]
    async fn balance_watch_follows_address() {
        let node = Arc::new(FakeNode::new());
        let storage = node.add_shared_object("0x5", 1);
        let objects = ObjectRecord {
            package_id: "0xa11ce".parse().unwrap(),
            balance_storage: storage,
            address_zero: SuiAddress::ZERO,
        };
        node.add_function(&vault_target(&objects, ACCOUNT_DETAIL_FN).unwrap(), &["Reference"]);
        node.set_dev_inspect(json!({
            "results": [{"returnValues": [[1_000_000_000u64.to_le_bytes().to_vec(), "u64"]]}]
        }));

        let watch = BalanceWatch::new(Arc::new(BalanceReader::new(node.clone(), objects)));
        let mut rx = watch.subscribe();
        assert_eq!(watch.balance(), 0);

        assert!(watch.watch_address(None));
        rx.changed().await.unwrap();
        assert_eq!(watch.balance(), 1_000_000_000);
        assert!(!watch.watch_address(Some(SuiAddress::ZERO)));

        let addr: SuiAddress = "0xbeef".parse().unwrap();
        assert!(watch.watch_address(Some(addr)));
        rx.changed().await.unwrap();
        assert_eq!(node.dev_inspect_senders(), vec![SuiAddress::ZERO, addr]);
    }

    #[tokio::test]
    async fn balance_watch_publishes_zero_on_failure() {
        let node = Arc::new(FakeNode::new());
        let storage = node.add_shared_object("0x5", 1);
        let objects = ObjectRecord {
            package_id: "0xa11ce".parse().unwrap(),
            balance_storage: storage,
            address_zero: SuiAddress::ZERO,
        };
        node.add_function(&vault_target(&objects, ACCOUNT_DETAIL_FN).unwrap(), &["Reference"]);
        node.fail_dev_inspect();

        let watch = BalanceWatch::new(Arc::new(BalanceReader::new(node, objects)));
        let mut rx = watch.subscribe();
        watch.watch_address(Some("0x1".parse().unwrap()));
        rx.changed().await.unwrap();
        assert_eq!(watch.balance(), 0);
    }
}
