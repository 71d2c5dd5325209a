//! 回调上下文注册表
//! Callback Context Registry
//!
//! 原生设施携带的不透明指针是这里的键，而非堆地址。蹦床函数按键查找并克隆
//! `Arc`：与释放竞争的触发要么拿到仍然存活的上下文（克隆使其在整次调用期间
//! 保持存活），要么什么都查不到而被抑制。因此不存在释放后使用的窗口。
//!
//! The opaque pointer carried by the native facility is a key into this map,
//! never a heap address. The trampoline looks the key up and clones the
//! `Arc`: a fire racing disposal either obtains a still-live context (kept
//! alive by the clone for the whole invocation) or finds nothing and is
//! suppressed. No use-after-free window exists by construction.

use std::sync::{Arc, LazyLock};
use std::sync::atomic::{AtomicUsize, Ordering};

use dashmap::DashMap;
use tracing::trace;

use super::context::CallbackContext;

static REGISTRY: LazyLock<DashMap<usize, Arc<CallbackContext>>> = LazyLock::new(DashMap::new);

/// Key 0 is reserved so a null opaque pointer never resolves.
/// 键0被保留，使空的不透明指针永远无法解析。
static NEXT_KEY: AtomicUsize = AtomicUsize::new(1);

/// Allocates a key and registers a fresh context under it.
/// 分配一个键并在其下注册一个新的上下文。
pub(crate) fn register(repeat: bool, callback: Box<dyn FnMut() + Send>) -> Arc<CallbackContext> {
    let key = NEXT_KEY.fetch_add(1, Ordering::Relaxed);
    let context = Arc::new(CallbackContext::new(key, repeat, callback));
    REGISTRY.insert(key, context.clone());
    context
}

pub(crate) fn remove(key: usize) {
    REGISTRY.remove(&key);
}

/// Trampoline entry: resolves the key and forwards one fire event.
/// 蹦床入口：解析键并转发一次触发事件。
pub(crate) fn dispatch(key: usize) {
    // Clone the Arc and let go of the shard guard before invoking, so the
    // callback may freely cancel (and thus unregister) its own timer.
    let context = match REGISTRY.get(&key) {
        Some(entry) => entry.value().clone(),
        None => {
            trace!(key, "fire after disposal suppressed");
            return;
        }
    };
    context.fire();
}

/// Whether a context is still registered; leak checks in tests.
/// 某个上下文是否仍在注册表中；用于测试中的泄漏检查。
#[cfg(test)]
pub(crate) fn contains(key: usize) -> bool {
    REGISTRY.contains_key(&key)
}
