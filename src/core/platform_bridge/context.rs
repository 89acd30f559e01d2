//=========================================================================
// Event Contexts
//=========================================================================
//
// Opaque context tokens handed to the producer, and their lifecycle.
//
// Architecture:
// ```text
//  Consumer                               Producer
//  ┌─────────────────────────┐           ┌───────────────────────┐
//  │ Subscription            │           │                       │
//  │  └─ Arc<ContextShared>  │           │  const void *context  │
//  │       └─ listener       │  weak     │        │              │
//  │            ▲            │◄──────────┼── ContextHandle       │
//  └────────────┼────────────┘           │     ├─ target (Weak)  │
//               │                        │     └─ open channels  │
//          notify calls ─────────────────┴───────────────────────┘
// ```
//
// A context is a boxed `ContextHandle` cast to `*const c_void`. It holds
// a weak reference to the listener plus a bitmask of channels still open.
// Each finish call clears one bit; the box is freed when the last bit
// clears. Dropping the `Subscription` makes every outstanding context
// inert: notify calls resolve to nothing and return.
//
// Contract violations that can be detected while the handle is still
// allocated (notify on a finished channel, finishing a channel twice
// while the other stays open) are logged and ignored. Using a context
// after its last channel was finished cannot be detected.
//
//=========================================================================

//=== External Dependencies ===============================================

use std::ffi::c_void;
use std::ptr::NonNull;
use std::sync::atomic::{AtomicU8, AtomicUsize, Ordering};
use std::sync::{Arc, Weak};

use log::{debug, trace, warn};

//=== Internal Dependencies ===============================================

use super::interface::InputListener;
use crate::core::input::event::{Channel, InputEvent};

//=== ChannelSet ==========================================================

const KEY_BIT: u8 = 0b01;
const MOUSE_BIT: u8 = 0b10;

fn channel_bit(channel: Channel) -> u8 {
    match channel {
        Channel::Key => KEY_BIT,
        Channel::Mouse => MOUSE_BIT,
    }
}

/// Channels a context is issued for.
///
/// A context issued for both channels must be finished on both, in any
/// order, once each.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ChannelSet(u8);

impl ChannelSet {
    pub const KEY: Self = Self(KEY_BIT);
    pub const MOUSE: Self = Self(MOUSE_BIT);
    pub const BOTH: Self = Self(KEY_BIT | MOUSE_BIT);

    pub fn contains(self, channel: Channel) -> bool {
        self.0 & channel_bit(channel) != 0
    }
}

//=== Shared State ========================================================

/// Consumer-owned target of every context issued by one subscription.
struct ContextShared {
    listener: Arc<dyn InputListener>,
    live: AtomicUsize,
}

/// The allocation behind a raw context pointer.
struct ContextHandle {
    target: Weak<ContextShared>,
    open: AtomicU8,
}

//=== RawContext ==========================================================

/// Opaque context as seen by the producer, together with the channels it
/// was issued for.
///
/// An owned token: not `Copy` or `Clone`, so a context issued by
/// [`Subscription::context`] can be handed to at most one
/// [`Producer`](super::producer::Producer). Dropping the token without
/// finishing its channels leaks the allocation.
///
/// ```compile_fail
/// use raw_input_bridge::prelude::*;
///
/// let subscription = Subscription::from_listener(|_: &InputEvent| {});
/// let ctx = subscription.context(ChannelSet::KEY);
/// let first = Producer::new(ctx);
/// let second = Producer::new(ctx);
/// ```
#[derive(Debug, PartialEq, Eq, Hash)]
pub struct RawContext {
    ptr: NonNull<c_void>,
    channels: ChannelSet,
}

// The handle it points to is only touched through atomics.
unsafe impl Send for RawContext {}
unsafe impl Sync for RawContext {}

impl RawContext {
    /// Pointer to pass across the boundary.
    pub fn as_ptr(&self) -> *const c_void {
        self.ptr.as_ptr()
    }

    /// Channels this context was issued for.
    pub fn channels(&self) -> ChannelSet {
        self.channels
    }

    /// Wraps a pointer received from foreign code. Returns `None` for null.
    ///
    /// # Safety
    ///
    /// A non-null `ptr` must come from [`Subscription::context`], must have
    /// been issued for `channels` with none of them finished yet, and no
    /// other token or driver may finish it.
    pub unsafe fn from_ptr(ptr: *const c_void, channels: ChannelSet) -> Option<Self> {
        NonNull::new(ptr as *mut c_void).map(|ptr| Self { ptr, channels })
    }
}

//=== Subscription ========================================================

/// Registration of a listener; issues contexts that route to it.
///
/// The subscription owns the listener. Contexts hold only weak references,
/// so dropping the subscription stops delivery even if the producer has
/// not finished its contexts yet (their allocations are still released by
/// the finish calls).
pub struct Subscription {
    shared: Arc<ContextShared>,
}

impl Subscription {
    /// Registers a shared listener.
    pub fn new(listener: Arc<dyn InputListener>) -> Self {
        Self {
            shared: Arc::new(ContextShared {
                listener,
                live: AtomicUsize::new(0),
            }),
        }
    }

    /// Registers an owned listener.
    pub fn from_listener<L: InputListener + 'static>(listener: L) -> Self {
        Self::new(Arc::new(listener))
    }

    /// Issues a fresh context for `channels`.
    ///
    /// The producer must finish every channel in `channels` exactly once.
    /// Each call returns a new token; tokens are never shared.
    pub fn context(&self, channels: ChannelSet) -> RawContext {
        let handle = Box::new(ContextHandle {
            target: Arc::downgrade(&self.shared),
            open: AtomicU8::new(channels.0),
        });
        self.shared.live.fetch_add(1, Ordering::Relaxed);

        let ptr = Box::into_raw(handle) as *mut c_void;
        debug!(target: "bridge::context", "Issued context {:p} for {:?}", ptr, channels);

        // Box::into_raw never returns null.
        RawContext {
            ptr: unsafe { NonNull::new_unchecked(ptr) },
            channels,
        }
    }

    /// Contexts issued by this subscription that still have an open channel.
    pub fn live_contexts(&self) -> usize {
        self.shared.live.load(Ordering::Relaxed)
    }

    /// The registered listener.
    pub fn listener(&self) -> &Arc<dyn InputListener> {
        &self.shared.listener
    }
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription")
            .field("live_contexts", &self.live_contexts())
            .finish_non_exhaustive()
    }
}

//=== Boundary Operations =================================================
//
// Called from the `extern "C"` entry points. Both take the raw pointer
// exactly as received.
//

/// Routes `event` to the listener behind `ctx`.
///
/// Null contexts, closed channels and dropped subscriptions are no-ops.
///
/// # Safety
///
/// `ctx` must be null or a pointer returned by [`Subscription::context`]
/// that still has at least one open channel.
pub(crate) unsafe fn deliver(ctx: *const c_void, event: &InputEvent) {
    let Some(handle) = (unsafe { (ctx as *const ContextHandle).as_ref() }) else {
        trace!(target: "bridge::context", "Dropping {} event on null context", event.channel());
        return;
    };

    let channel = event.channel();
    if handle.open.load(Ordering::Acquire) & channel_bit(channel) == 0 {
        warn!(
            target: "bridge::context",
            "Contract violation: {} event on context {:p} whose {} channel is not open",
            channel,
            ctx,
            channel
        );
        return;
    }

    match handle.target.upgrade() {
        Some(shared) => shared.listener.on_input(event),
        None => trace!(target: "bridge::context", "Listener for {:p} already dropped", ctx),
    }
}

/// Closes `channel` on `ctx`, freeing the context after its last channel.
///
/// # Safety
///
/// `ctx` must be null or a pointer returned by [`Subscription::context`]
/// that still has at least one open channel.
pub(crate) unsafe fn finish(ctx: *const c_void, channel: Channel) {
    if ctx.is_null() {
        debug!(target: "bridge::context", "Finish {} on null context ignored", channel);
        return;
    }

    let bit = channel_bit(channel);
    let previous = {
        let handle = unsafe { &*(ctx as *const ContextHandle) };
        handle.open.fetch_and(!bit, Ordering::AcqRel)
    };

    if previous & bit == 0 {
        warn!(
            target: "bridge::context",
            "Contract violation: {} channel of context {:p} finished while not open",
            channel,
            ctx
        );
        return;
    }

    debug!(target: "bridge::context", "Finished {} channel of context {:p}", channel, ctx);

    if previous == bit {
        // Last open channel: this call owns the allocation now.
        let handle = unsafe { Box::from_raw(ctx as *mut ContextHandle) };
        if let Some(shared) = handle.target.upgrade() {
            shared.live.fetch_sub(1, Ordering::Relaxed);
        }
        debug!(target: "bridge::context", "Released context {:p}", ctx);
    }
}

//=========================================================================
// Unit Tests
//=========================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::input::event::{KeyEvent, MouseScrollEvent};
    use std::sync::Mutex;

    fn recording() -> (Subscription, Arc<Mutex<Vec<InputEvent>>>) {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        let subscription = Subscription::from_listener(move |event: &InputEvent| {
            sink.lock().unwrap().push(*event)
        });
        (subscription, seen)
    }

    fn key(code: u16) -> InputEvent {
        InputEvent::Key(KeyEvent { window: None, key_code: code, pressed: true })
    }

    fn scroll() -> InputEvent {
        InputEvent::MouseScroll(MouseScrollEvent { window: None, delta_x: 0.0, delta_y: 1.0 })
    }

    #[test]
    fn channel_set_membership() {
        assert!(ChannelSet::KEY.contains(Channel::Key));
        assert!(!ChannelSet::KEY.contains(Channel::Mouse));
        assert!(ChannelSet::MOUSE.contains(Channel::Mouse));
        assert!(ChannelSet::BOTH.contains(Channel::Key));
        assert!(ChannelSet::BOTH.contains(Channel::Mouse));
    }

    #[test]
    fn deliver_routes_to_listener() {
        let (subscription, seen) = recording();
        let ctx = subscription.context(ChannelSet::BOTH);

        unsafe {
            deliver(ctx.as_ptr(), &key(3));
            deliver(ctx.as_ptr(), &scroll());
            finish(ctx.as_ptr(), Channel::Key);
            finish(ctx.as_ptr(), Channel::Mouse);
        }

        assert_eq!(*seen.lock().unwrap(), vec![key(3), scroll()]);
    }

    #[test]
    fn null_context_is_noop() {
        unsafe {
            deliver(std::ptr::null(), &key(1));
            finish(std::ptr::null(), Channel::Key);
            finish(std::ptr::null(), Channel::Mouse);
        }
    }

    #[test]
    fn live_count_tracks_last_finish() {
        let (subscription, _) = recording();
        let ctx = subscription.context(ChannelSet::BOTH);
        assert_eq!(subscription.live_contexts(), 1);

        unsafe { finish(ctx.as_ptr(), Channel::Mouse) };
        assert_eq!(subscription.live_contexts(), 1, "key channel still open");

        unsafe { finish(ctx.as_ptr(), Channel::Key) };
        assert_eq!(subscription.live_contexts(), 0);
    }

    #[test]
    fn finished_channel_stops_delivery_other_channel_continues() {
        let (subscription, seen) = recording();
        let ctx = subscription.context(ChannelSet::BOTH);

        unsafe {
            finish(ctx.as_ptr(), Channel::Key);
            deliver(ctx.as_ptr(), &key(9));
            deliver(ctx.as_ptr(), &scroll());
            finish(ctx.as_ptr(), Channel::Mouse);
        }

        assert_eq!(*seen.lock().unwrap(), vec![scroll()]);
    }

    #[test]
    fn event_on_unissued_channel_is_dropped() {
        let (subscription, seen) = recording();
        let ctx = subscription.context(ChannelSet::KEY);

        unsafe {
            deliver(ctx.as_ptr(), &scroll());
            // Not open: logged and ignored, allocation untouched.
            finish(ctx.as_ptr(), Channel::Mouse);
            deliver(ctx.as_ptr(), &key(2));
            finish(ctx.as_ptr(), Channel::Key);
        }

        assert_eq!(*seen.lock().unwrap(), vec![key(2)]);
        assert_eq!(subscription.live_contexts(), 0);
    }

    #[test]
    fn double_finish_while_other_open_is_ignored() {
        let (subscription, _) = recording();
        let ctx = subscription.context(ChannelSet::BOTH);

        unsafe {
            finish(ctx.as_ptr(), Channel::Key);
            finish(ctx.as_ptr(), Channel::Key);
        }
        assert_eq!(subscription.live_contexts(), 1);

        unsafe { finish(ctx.as_ptr(), Channel::Mouse) };
        assert_eq!(subscription.live_contexts(), 0);
    }

    #[test]
    fn dropped_subscription_makes_context_inert() {
        let (subscription, seen) = recording();
        let ctx = subscription.context(ChannelSet::KEY);
        drop(subscription);

        unsafe {
            deliver(ctx.as_ptr(), &key(4));
            finish(ctx.as_ptr(), Channel::Key);
        }

        assert!(seen.lock().unwrap().is_empty());
    }

    #[test]
    fn contexts_are_distinct_per_issue() {
        let (subscription, _) = recording();
        let a = subscription.context(ChannelSet::KEY);
        let b = subscription.context(ChannelSet::KEY);
        assert_ne!(a, b);
        assert_eq!(subscription.live_contexts(), 2);

        unsafe {
            finish(a.as_ptr(), Channel::Key);
            finish(b.as_ptr(), Channel::Key);
        }
        assert_eq!(subscription.live_contexts(), 0);
    }

    #[test]
    fn raw_context_round_trips_pointer() {
        let (subscription, _) = recording();
        let ctx = subscription.context(ChannelSet::MOUSE);
        assert_eq!(ctx.channels(), ChannelSet::MOUSE);

        let raw = ctx.as_ptr();
        drop(ctx);
        let ctx = unsafe { RawContext::from_ptr(raw, ChannelSet::MOUSE) }.unwrap();
        assert_eq!(ctx.as_ptr(), raw);
        assert_eq!(unsafe { RawContext::from_ptr(std::ptr::null(), ChannelSet::MOUSE) }, None);

        unsafe { finish(ctx.as_ptr(), Channel::Mouse) };
        assert_eq!(subscription.live_contexts(), 0);
    }
}
