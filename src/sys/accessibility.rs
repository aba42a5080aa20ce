//! Accessibility trust: checking it, prompting for it, and waiting for the
//! user to grant it.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

pub const POLL_INTERVAL: Duration = Duration::from_millis(250);

#[cfg(target_os = "macos")]
mod trust {
    use std::ffi::c_void;
    use std::ptr;

    use objc2::rc::autoreleasepool;
    use objc2::runtime::AnyObject;
    use objc2::{class, msg_send};

    #[link(name = "ApplicationServices", kind = "framework")]
    unsafe extern "C" {
        fn AXIsProcessTrustedWithOptions(options: *const c_void) -> bool;

        static kAXTrustedCheckOptionPrompt: *const c_void;
    }

    #[link(name = "CoreFoundation", kind = "framework")]
    unsafe extern "C" {
        static kCFBooleanTrue: *const c_void;
    }

    pub fn is_trusted() -> bool { unsafe { AXIsProcessTrustedWithOptions(ptr::null()) } }

    /// Asks the system to show its permission dialog. Returns the trust state
    /// at the time of asking.
    pub fn prompt() -> bool {
        autoreleasepool(|_| unsafe {
            let keys: [*mut AnyObject; 1] = [kAXTrustedCheckOptionPrompt as *mut AnyObject];
            let vals: [*mut AnyObject; 1] = [kCFBooleanTrue as *mut AnyObject];
            let dict: *mut AnyObject = msg_send![
                class!(NSDictionary),
                dictionaryWithObjects: vals.as_ptr(),
                forKeys:              keys.as_ptr(),
                count:                1usize
            ];
            AXIsProcessTrustedWithOptions(dict.cast())
        })
    }
}

#[cfg(target_os = "macos")]
pub use trust::{is_trusted, prompt};

/// Calls a check function at a fixed interval on its own thread until it
/// reports the permission as granted or the poller is stopped.
pub struct PermissionPoller {
    token: CancellationToken,
    granted: Arc<AtomicBool>,
    thread: Option<JoinHandle<()>>,
}

impl PermissionPoller {
    pub fn start<C, G>(interval: Duration, check: C, on_granted: G) -> std::io::Result<Self>
    where
        C: Fn() -> bool + Send + 'static,
        G: FnOnce() + Send + 'static,
    {
        let token = CancellationToken::new();
        let granted = Arc::new(AtomicBool::new(false));
        let thread = {
            let token = token.clone();
            let granted = granted.clone();
            thread::Builder::new().name("permission-poller".to_string()).spawn(move || {
                while !token.is_cancelled() {
                    if check() {
                        info!("accessibility permission granted");
                        granted.store(true, Ordering::SeqCst);
                        on_granted();
                        return;
                    }
                    thread::sleep(interval);
                }
                debug!("permission polling stopped");
            })?
        };
        Ok(PermissionPoller { token, granted, thread: Some(thread) })
    }

    /// Polls the system trust state.
    #[cfg(target_os = "macos")]
    pub fn for_accessibility<G>(on_granted: G) -> std::io::Result<Self>
    where G: FnOnce() + Send + 'static {
        Self::start(POLL_INTERVAL, is_trusted, on_granted)
    }

    pub fn is_granted(&self) -> bool { self.granted.load(Ordering::SeqCst) }

    pub fn is_running(&self) -> bool {
        self.thread.as_ref().is_some_and(|t| !t.is_finished())
    }

    /// Blocks until the poller has seen the permission granted or was
    /// stopped. Returns whether it was granted.
    pub fn wait(mut self) -> bool {
        if let Some(thread) = self.thread.take() {
            _ = thread.join();
        }
        self.is_granted()
    }

    /// Stops polling and waits for the thread to exit. Safe to call more
    /// than once.
    pub fn stop(&mut self) {
        self.token.cancel();
        if let Some(thread) = self.thread.take() {
            _ = thread.join();
        }
    }
}

impl Drop for PermissionPoller {
    fn drop(&mut self) { self.stop() }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::AtomicUsize;

    use test_log::test;

    use super::*;

    const FAST: Duration = Duration::from_millis(5);

    #[test]
    fn reports_the_grant_once() {
        let checks = Arc::new(AtomicUsize::new(0));
        let callbacks = Arc::new(AtomicUsize::new(0));
        let poller = {
            let checks = checks.clone();
            let callbacks = callbacks.clone();
            PermissionPoller::start(
                FAST,
                move || checks.fetch_add(1, Ordering::SeqCst) >= 2,
                move || {
                    callbacks.fetch_add(1, Ordering::SeqCst);
                },
            )
            .unwrap()
        };
        assert!(poller.wait());
        assert_eq!(checks.load(Ordering::SeqCst), 3);
        assert_eq!(callbacks.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn stopping_is_idempotent() {
        let called = Arc::new(AtomicBool::new(false));
        let mut poller = {
            let called = called.clone();
            PermissionPoller::start(FAST, || false, move || called.store(true, Ordering::SeqCst))
                .unwrap()
        };
        assert!(poller.is_running());
        poller.stop();
        poller.stop();
        assert!(!poller.is_running());
        assert!(!poller.is_granted());
        assert!(!called.load(Ordering::SeqCst));
    }
}
