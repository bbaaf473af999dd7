/*
[INPUT]:  Snapshot `watch` sender, the store's in-flight read counter
[OUTPUT]: `loading` flag that tracks outstanding reads, however they end
[POS]:    State layer helper shared by stores with a loading indicator
[UPDATE]: When a store gains a new kind of busy indicator
*/

use std::sync::atomic::{AtomicUsize, Ordering};

use tokio::sync::watch;

/// Keeps `loading` set while at least one guarded read is alive.
///
/// The flag clears when the last guard drops, including when the read's
/// future is dropped mid-request (poller teardown, timeouts).
pub(crate) struct LoadingGuard<'a, S> {
    state: &'a watch::Sender<S>,
    active: &'a AtomicUsize,
    flag: fn(&mut S) -> &mut bool,
}

impl<'a, S> LoadingGuard<'a, S> {
    pub(crate) fn begin(
        state: &'a watch::Sender<S>,
        active: &'a AtomicUsize,
        flag: fn(&mut S) -> &mut bool,
    ) -> Self {
        // counter moves under the watch lock so begin/drop cannot interleave
        state.send_if_modified(|s| {
            active.fetch_add(1, Ordering::SeqCst);
            let loading = flag(s);
            let changed = !*loading;
            *loading = true;
            changed
        });
        Self {
            state,
            active,
            flag,
        }
    }
}

impl<S> Drop for LoadingGuard<'_, S> {
    fn drop(&mut self) {
        let active = self.active;
        let flag = self.flag;
        self.state.send_if_modified(|s| {
            if active.fetch_sub(1, Ordering::SeqCst) != 1 {
                return false;
            }
            let loading = flag(s);
            let changed = *loading;
            *loading = false;
            changed
        });
    }
}
