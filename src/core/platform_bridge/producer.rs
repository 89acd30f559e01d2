//=========================================================================
// Producer Driver
//=========================================================================
//
// Safe Rust-side producer: owns one context and calls the bridge in the
// order it is asked to.
//
// The driver enforces the single-release discipline the C contract only
// states: once a channel is finished here, further calls on it are
// refused with `BridgeError::ContextFinished` and never reach the ABI.
// Dropping the driver finishes whatever is still open.
//
//=========================================================================

//=== External Dependencies ===============================================

use std::ffi::c_void;

use log::debug;

//=== Internal Dependencies ===============================================

use super::context::{ChannelSet, RawContext};
use super::ffi::BridgeFns;
use super::interface::BridgeError;
use crate::core::input::event::{Channel, WindowHandle};

//=== Producer ============================================================

/// Drives the six bridge calls for one context.
///
/// Not `Clone`: one driver per context, so the finish calls happen once.
#[derive(Debug)]
pub struct Producer {
    context: RawContext,
    fns: BridgeFns,
    issued: ChannelSet,
    key_open: bool,
    mouse_open: bool,
}

impl Producer {
    /// Takes ownership of `context` and drives the channels it was issued for.
    pub fn new(context: RawContext) -> Self {
        Self::with_fns(context, BridgeFns::native())
    }

    /// Like [`Producer::new`] but calls through `fns`.
    pub fn with_fns(context: RawContext, fns: BridgeFns) -> Self {
        let issued = context.channels();
        Self {
            context,
            fns,
            issued,
            key_open: issued.contains(Channel::Key),
            mouse_open: issued.contains(Channel::Mouse),
        }
    }

    /// Wraps a context pointer obtained from elsewhere (e.g. handed over
    /// by foreign code). Fails on null.
    ///
    /// # Safety
    ///
    /// Same contract as [`RawContext::from_ptr`]: `context` was issued for
    /// `channels`, none of them is finished yet, and nothing else will
    /// finish it.
    pub unsafe fn from_raw(
        context: *const c_void,
        channels: ChannelSet,
    ) -> Result<Self, BridgeError> {
        let context =
            unsafe { RawContext::from_ptr(context, channels) }.ok_or(BridgeError::NullContext)?;
        Ok(Self::new(context))
    }

    /// Whether `channel` can still carry notifications.
    pub fn is_open(&self, channel: Channel) -> bool {
        match channel {
            Channel::Key => self.key_open,
            Channel::Mouse => self.mouse_open,
        }
    }

    /// The context this driver owns.
    pub fn context(&self) -> &RawContext {
        &self.context
    }

    //--- Notifications ----------------------------------------------------

    /// Sends one key transition.
    pub fn key(
        &self,
        window: Option<WindowHandle>,
        key_code: u16,
        pressed: bool,
    ) -> Result<(), BridgeError> {
        self.ensure_open(Channel::Key)?;
        let ctx = self.context.as_ptr();
        unsafe { (self.fns.key_notify)(ctx, raw_window(window), key_code, pressed) };
        Ok(())
    }

    /// Sends one cursor move together with the window's current size.
    pub fn mouse_move(
        &self,
        window: Option<WindowHandle>,
        pos_x: f64,
        pos_y: f64,
        window_width: f64,
        window_height: f64,
    ) -> Result<(), BridgeError> {
        self.ensure_open(Channel::Mouse)?;
        unsafe {
            (self.fns.mouse_move)(
                self.context.as_ptr(),
                raw_window(window),
                pos_x,
                pos_y,
                window_width,
                window_height,
            )
        };
        Ok(())
    }

    /// Sends one mouse button transition.
    pub fn mouse_button(
        &self,
        window: Option<WindowHandle>,
        button: u8,
        down: bool,
    ) -> Result<(), BridgeError> {
        self.ensure_open(Channel::Mouse)?;
        let ctx = self.context.as_ptr();
        unsafe { (self.fns.mouse_button)(ctx, raw_window(window), button, down) };
        Ok(())
    }

    /// Sends one raw scroll delta.
    pub fn mouse_scroll(
        &self,
        window: Option<WindowHandle>,
        delta_x: f64,
        delta_y: f64,
    ) -> Result<(), BridgeError> {
        self.ensure_open(Channel::Mouse)?;
        unsafe {
            (self.fns.mouse_scroll)(self.context.as_ptr(), raw_window(window), delta_x, delta_y)
        };
        Ok(())
    }

    //--- Lifecycle --------------------------------------------------------

    /// Finishes the key channel.
    pub fn finish_key(&mut self) -> Result<(), BridgeError> {
        self.ensure_open(Channel::Key)?;
        self.key_open = false;
        unsafe { (self.fns.finish_key_event_context)(self.context.as_ptr()) };
        Ok(())
    }

    /// Finishes the mouse channel.
    pub fn finish_mouse(&mut self) -> Result<(), BridgeError> {
        self.ensure_open(Channel::Mouse)?;
        self.mouse_open = false;
        unsafe { (self.fns.finish_mouse_event_context)(self.context.as_ptr()) };
        Ok(())
    }

    /// Finishes every channel still open. Idempotent.
    pub fn finish_all(&mut self) {
        if self.key_open {
            let _ = self.finish_key();
        }
        if self.mouse_open {
            let _ = self.finish_mouse();
        }
    }

    //--- Internal Helpers -------------------------------------------------

    fn ensure_open(&self, channel: Channel) -> Result<(), BridgeError> {
        if !self.issued.contains(channel) {
            Err(BridgeError::ChannelNotOpen { channel })
        } else if !self.is_open(channel) {
            Err(BridgeError::ContextFinished { channel })
        } else {
            Ok(())
        }
    }
}

impl Drop for Producer {
    fn drop(&mut self) {
        if self.key_open || self.mouse_open {
            debug!(
                target: "bridge::context",
                "Producer dropped with open channels, finishing {:p}",
                self.context.as_ptr()
            );
        }
        self.finish_all();
    }
}

fn raw_window(window: Option<WindowHandle>) -> *mut c_void {
    window.map_or(std::ptr::null_mut(), WindowHandle::as_ptr)
}

//=========================================================================
// Unit Tests
//=========================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::input::event::InputEvent;
    use crate::core::platform_bridge::context::Subscription;
    use std::cell::RefCell;
    use std::sync::{Arc, Mutex};

    //--- Recording table ---------------------------------------------------
    //
    // Stand-ins for the six symbols that only log which entry was hit.
    // Thread-local so parallel tests keep separate logs.

    thread_local! {
        static CALLS: RefCell<Vec<&'static str>> = const { RefCell::new(Vec::new()) };
    }

    fn record(name: &'static str) {
        CALLS.with(|calls| calls.borrow_mut().push(name));
    }

    fn recorded() -> Vec<&'static str> {
        CALLS.with(|calls| calls.borrow().clone())
    }

    unsafe extern "C" fn fake_finish_key(_: *const c_void) {
        record("finish_key");
    }

    unsafe extern "C" fn fake_finish_mouse(_: *const c_void) {
        record("finish_mouse");
    }

    unsafe extern "C" fn fake_key(_: *const c_void, _: *mut c_void, _: u16, _: bool) {
        record("key");
    }

    unsafe extern "C" fn fake_move(
        _: *const c_void,
        _: *mut c_void,
        _: f64,
        _: f64,
        _: f64,
        _: f64,
    ) {
        record("mouse_move");
    }

    unsafe extern "C" fn fake_button(_: *const c_void, _: *mut c_void, _: u8, _: bool) {
        record("mouse_button");
    }

    unsafe extern "C" fn fake_scroll(_: *const c_void, _: *mut c_void, _: f64, _: f64) {
        record("mouse_scroll");
    }

    fn recording_fns() -> BridgeFns {
        BridgeFns {
            finish_key_event_context: fake_finish_key,
            finish_mouse_event_context: fake_finish_mouse,
            key_notify: fake_key,
            mouse_move: fake_move,
            mouse_button: fake_button,
            mouse_scroll: fake_scroll,
        }
    }

    fn recording() -> (Subscription, Arc<Mutex<Vec<InputEvent>>>) {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        let subscription = Subscription::from_listener(move |event: &InputEvent| {
            sink.lock().unwrap().push(*event)
        });
        (subscription, seen)
    }

    #[test]
    fn calls_reach_listener_in_order() {
        let (subscription, seen) = recording();
        let producer = Producer::new(subscription.context(ChannelSet::BOTH));

        producer.mouse_button(None, 0, true).unwrap();
        producer.mouse_move(None, 5.0, 5.0, 100.0, 100.0).unwrap();
        producer.key(None, 0x00, true).unwrap();
        producer.mouse_button(None, 0, false).unwrap();

        let channels: Vec<_> = seen.lock().unwrap().iter().map(InputEvent::channel).collect();
        assert_eq!(
            channels,
            vec![Channel::Mouse, Channel::Mouse, Channel::Key, Channel::Mouse]
        );
    }

    #[test]
    fn finished_channel_refuses_calls() {
        let (subscription, seen) = recording();
        let mut producer = Producer::new(subscription.context(ChannelSet::BOTH));

        producer.finish_key().unwrap();

        assert_eq!(
            producer.key(None, 1, true),
            Err(BridgeError::ContextFinished { channel: Channel::Key })
        );
        assert_eq!(
            producer.finish_key(),
            Err(BridgeError::ContextFinished { channel: Channel::Key })
        );
        producer.mouse_scroll(None, 0.0, 1.0).unwrap();

        assert_eq!(seen.lock().unwrap().len(), 1);
    }

    #[test]
    fn unissued_channel_is_closed_from_the_start() {
        let (subscription, _) = recording();
        let producer = Producer::new(subscription.context(ChannelSet::KEY));

        assert!(producer.is_open(Channel::Key));
        assert!(!producer.is_open(Channel::Mouse));
        assert_eq!(
            producer.mouse_button(None, 0, true),
            Err(BridgeError::ChannelNotOpen { channel: Channel::Mouse })
        );
    }

    #[test]
    fn from_raw_rejects_null() {
        let result = unsafe { Producer::from_raw(std::ptr::null(), ChannelSet::BOTH) };
        assert!(matches!(result, Err(BridgeError::NullContext)));

        let (subscription, _) = recording();
        let raw = subscription.context(ChannelSet::MOUSE).as_ptr();
        let producer = unsafe { Producer::from_raw(raw, ChannelSet::MOUSE) }.unwrap();
        assert_eq!(producer.context().as_ptr(), raw);
        assert!(producer.is_open(Channel::Mouse));
        assert!(!producer.is_open(Channel::Key));

        drop(producer);
        assert_eq!(subscription.live_contexts(), 0);
    }

    #[test]
    fn sequential_producers_release_only_their_own_context() {
        let (subscription, seen) = recording();

        let first = Producer::new(subscription.context(ChannelSet::KEY));
        drop(first);
        assert_eq!(subscription.live_contexts(), 0);

        let second = Producer::new(subscription.context(ChannelSet::KEY));
        assert_eq!(subscription.live_contexts(), 1);
        second.key(None, 0x0C, true).unwrap();

        let third = Producer::new(subscription.context(ChannelSet::KEY));
        drop(third);

        assert_eq!(subscription.live_contexts(), 1, "second context still live");
        second.key(None, 0x0C, false).unwrap();
        drop(second);

        assert_eq!(subscription.live_contexts(), 0);
        assert_eq!(seen.lock().unwrap().len(), 2);
    }

    #[test]
    fn drop_finishes_open_channels() {
        let (subscription, _) = recording();
        let producer = Producer::new(subscription.context(ChannelSet::BOTH));
        assert_eq!(subscription.live_contexts(), 1);

        drop(producer);

        assert_eq!(subscription.live_contexts(), 0);
    }

    #[test]
    fn finish_all_is_idempotent() {
        let (subscription, _) = recording();
        let mut producer = Producer::new(subscription.context(ChannelSet::BOTH));

        producer.finish_all();
        producer.finish_all();

        assert!(!producer.is_open(Channel::Key));
        assert!(!producer.is_open(Channel::Mouse));
        assert_eq!(subscription.live_contexts(), 0);
    }

    #[test]
    fn custom_table_sees_exactly_the_permitted_calls() {
        let (subscription, seen) = recording();
        // The recording table never frees, so this context leaks.
        let context = subscription.context(ChannelSet::BOTH);
        let mut producer = Producer::with_fns(context, recording_fns());

        producer.key(None, 0x00, true).unwrap();
        producer.mouse_move(None, 1.0, 2.0, 3.0, 4.0).unwrap();
        producer.finish_key().unwrap();
        assert!(producer.key(None, 0x00, false).is_err());
        assert!(producer.finish_key().is_err());
        producer.mouse_button(None, 1, true).unwrap();
        producer.mouse_scroll(None, 0.0, 1.0).unwrap();
        drop(producer);

        assert_eq!(
            recorded(),
            vec!["key", "mouse_move", "finish_key", "mouse_button", "mouse_scroll", "finish_mouse"]
        );
        assert!(seen.lock().unwrap().is_empty(), "native symbols never ran");
        assert_eq!(subscription.live_contexts(), 1);
    }

    #[test]
    fn window_handle_crosses_as_pointer() {
        let (subscription, seen) = recording();
        let producer = Producer::new(subscription.context(ChannelSet::KEY));
        let window = WindowHandle::from_id(0x77);

        producer.key(window, 0x31, false).unwrap();

        assert_eq!(seen.lock().unwrap()[0].window(), window);
    }
}
