//=========================================================================
// ABI Contract Tests
//=========================================================================
//
// Drives the six exported symbols the way a foreign producer would and
// checks what the consumer observes.
//
//=========================================================================

use std::ffi::c_void;
use std::sync::{Arc, Mutex};
use std::thread;

use raw_input_bridge::core::platform_bridge::ffi::{
    raw_input_finish_key_event_context, raw_input_finish_mouse_event_context,
    raw_input_key_notify_func, raw_input_mouse_button, raw_input_mouse_move,
    raw_input_mouse_scroll,
};
use raw_input_bridge::prelude::*;

//=== Helpers =============================================================

type Seen = Arc<Mutex<Vec<InputEvent>>>;

fn recording() -> (Subscription, Seen) {
    let seen: Seen = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&seen);
    let subscription =
        Subscription::from_listener(move |event: &InputEvent| sink.lock().unwrap().push(*event));
    (subscription, seen)
}

fn window(id: usize) -> *mut c_void {
    id as *mut c_void
}

fn key_payloads(seen: &Seen) -> Vec<(u16, bool)> {
    seen.lock()
        .unwrap()
        .iter()
        .filter_map(|event| match event {
            InputEvent::Key(k) => Some((k.key_code, k.pressed)),
            _ => None,
        })
        .collect()
}

//=== Symbol Linkage ======================================================

extern "C" {
    #[link_name = "raw_input_key_notify_func"]
    fn linked_key_notify(context: *const c_void, window: *mut c_void, key_code: u16, pressed: bool);

    #[link_name = "raw_input_finish_key_event_context"]
    fn linked_finish_key(context: *const c_void);
}

#[test]
fn symbols_resolve_by_unmangled_name() {
    let (subscription, seen) = recording();
    let ctx = subscription.context(ChannelSet::KEY).as_ptr();

    unsafe {
        linked_key_notify(ctx, window(0x1), 0x31, true);
        linked_finish_key(ctx);
    }

    assert_eq!(key_payloads(&seen), vec![(0x31, true)]);
    assert_eq!(subscription.live_contexts(), 0);
}

//=== Property 1: no use after finish =====================================

#[test]
fn producer_refuses_calls_after_finish() {
    let (subscription, seen) = recording();
    let mut producer = Producer::new(subscription.context(ChannelSet::BOTH));

    producer.key(None, 0x00, true).unwrap();
    producer.finish_key().unwrap();

    assert_eq!(
        producer.key(None, 0x00, false),
        Err(BridgeError::ContextFinished { channel: Channel::Key })
    );

    producer.finish_mouse().unwrap();
    assert_eq!(
        producer.mouse_scroll(None, 1.0, 1.0),
        Err(BridgeError::ContextFinished { channel: Channel::Mouse })
    );

    assert_eq!(seen.lock().unwrap().len(), 1);
    assert_eq!(subscription.live_contexts(), 0);
}

#[test]
fn producers_never_share_a_context() {
    let (subscription, seen) = recording();

    let first = Producer::new(subscription.context(ChannelSet::KEY));
    first.key(None, 0x01, true).unwrap();
    drop(first);

    let second = Producer::new(subscription.context(ChannelSet::KEY));
    assert_eq!(subscription.live_contexts(), 1);
    second.key(None, 0x01, false).unwrap();

    assert_eq!(key_payloads(&seen), vec![(0x01, true), (0x01, false)]);
    drop(second);
    assert_eq!(subscription.live_contexts(), 0);
}

#[test]
fn raw_producer_requires_a_pointer() {
    let result = unsafe { Producer::from_raw(std::ptr::null(), ChannelSet::BOTH) };
    assert_eq!(result.err(), Some(BridgeError::NullContext));
}

//=== Property 2: key transitions are never coalesced =====================

#[test]
fn key_transitions_arrive_one_for_one_in_order() {
    let (subscription, seen) = recording();
    let ctx = subscription.context(ChannelSet::KEY).as_ptr();
    let transitions: Vec<(u16, bool)> = vec![
        (0x00, true),
        (0x00, true),
        (0x00, false),
        (0x38, true),
        (0x00, true),
        (0x00, false),
        (0x38, false),
        (0x38, false),
    ];

    unsafe {
        for &(code, pressed) in &transitions {
            raw_input_key_notify_func(ctx, window(0x10), code, pressed);
        }
        raw_input_finish_key_event_context(ctx);
    }

    assert_eq!(key_payloads(&seen), transitions);
}

//=== Property 3: moves carry the current window size =====================

#[test]
fn mouse_moves_carry_size_given_at_each_call() {
    let (subscription, seen) = recording();
    let ctx = subscription.context(ChannelSet::MOUSE).as_ptr();

    unsafe {
        raw_input_mouse_move(ctx, window(0x10), 10.0, 10.0, 800.0, 600.0);
        raw_input_mouse_move(ctx, window(0x10), 10.0, 10.0, 1024.0, 768.0);
        raw_input_finish_mouse_event_context(ctx);
    }

    let sizes: Vec<(f64, f64)> = seen
        .lock()
        .unwrap()
        .iter()
        .filter_map(|event| match event {
            InputEvent::MouseMove(m) => Some((m.window_width, m.window_height)),
            _ => None,
        })
        .collect();
    assert_eq!(sizes, vec![(800.0, 600.0), (1024.0, 768.0)]);
}

//=== Property 4: zero scroll is delivered ================================

#[test]
fn zero_scroll_is_delivered() {
    let (subscription, seen) = recording();
    let ctx = subscription.context(ChannelSet::MOUSE).as_ptr();

    unsafe {
        raw_input_mouse_scroll(ctx, window(0x10), 0.0, 0.0);
        raw_input_mouse_scroll(ctx, window(0x10), 0.0, -2.5);
        raw_input_finish_mouse_event_context(ctx);
    }

    let deltas: Vec<(f64, f64)> = seen
        .lock()
        .unwrap()
        .iter()
        .filter_map(|event| match event {
            InputEvent::MouseScroll(s) => Some((s.delta_x, s.delta_y)),
            _ => None,
        })
        .collect();
    assert_eq!(deltas, vec![(0.0, 0.0), (0.0, -2.5)]);
}

//=== Property 5: channels finish independently ===========================

#[test]
fn finishing_key_keeps_mouse_alive() {
    let (subscription, seen) = recording();
    let ctx = subscription.context(ChannelSet::BOTH).as_ptr();

    unsafe {
        raw_input_finish_key_event_context(ctx);
        raw_input_mouse_button(ctx, window(0x10), MOUSE_BUTTON_LEFT, true);
        raw_input_mouse_button(ctx, window(0x10), MOUSE_BUTTON_LEFT, false);
    }
    assert_eq!(subscription.live_contexts(), 1);

    unsafe { raw_input_finish_mouse_event_context(ctx) };

    assert_eq!(seen.lock().unwrap().len(), 2);
    assert_eq!(subscription.live_contexts(), 0);
}

#[test]
fn finishing_mouse_keeps_key_alive() {
    let (subscription, seen) = recording();
    let ctx = subscription.context(ChannelSet::BOTH).as_ptr();

    unsafe {
        raw_input_finish_mouse_event_context(ctx);
        raw_input_key_notify_func(ctx, window(0x10), 0x24, true);
        raw_input_finish_key_event_context(ctx);
    }

    assert_eq!(key_payloads(&seen), vec![(0x24, true)]);
}

#[test]
fn separate_contexts_per_channel() {
    let (subscription, seen) = recording();
    let key_ctx = subscription.context(ChannelSet::KEY).as_ptr();
    let mouse_ctx = subscription.context(ChannelSet::MOUSE).as_ptr();
    assert_ne!(key_ctx, mouse_ctx);

    unsafe {
        raw_input_key_notify_func(key_ctx, window(0x10), 0x01, true);
        raw_input_finish_key_event_context(key_ctx);
        raw_input_mouse_scroll(mouse_ctx, window(0x10), 1.0, 0.0);
        raw_input_finish_mouse_event_context(mouse_ctx);
    }

    assert_eq!(seen.lock().unwrap().len(), 2);
    assert_eq!(subscription.live_contexts(), 0);
}

//=== Property 6: concurrent producers ====================================

#[test]
fn concurrent_threads_through_one_context_lose_nothing() {
    const N: u16 = 500;
    const M: u16 = 700;

    let (subscription, seen) = recording();
    let ctx = subscription.context(ChannelSet::BOTH);

    let send = |window_id: usize, count: u16| {
        let target = window(window_id);
        for seq in 0..count {
            unsafe {
                raw_input_key_notify_func(ctx.as_ptr(), target, seq, seq % 2 == 0);
                raw_input_mouse_move(ctx.as_ptr(), target, f64::from(seq), 0.0, 1.0, 1.0);
            }
        }
    };

    thread::scope(|scope| {
        scope.spawn(|| send(0xA0, N));
        scope.spawn(|| send(0xB0, M));
    });

    unsafe {
        raw_input_finish_key_event_context(ctx.as_ptr());
        raw_input_finish_mouse_event_context(ctx.as_ptr());
    }

    let events = seen.lock().unwrap();
    assert_eq!(events.len(), 2 * usize::from(N + M));

    for (window_id, count) in [(0xA0, N), (0xB0, M)] {
        let handle = WindowHandle::from_ptr(window(window_id));
        let keys: Vec<u16> = events
            .iter()
            .filter(|event| event.window() == handle)
            .filter_map(|event| match event {
                InputEvent::Key(k) => Some(k.key_code),
                _ => None,
            })
            .collect();

        // Each sequence number exactly once, in the order its thread sent it.
        assert_eq!(keys, (0..count).collect::<Vec<_>>());
    }
}

//=== Boundary robustness =================================================

#[test]
fn panicking_listener_does_not_unwind_into_caller() {
    let subscription = Subscription::from_listener(|_: &InputEvent| panic!("listener bug"));
    let ctx = subscription.context(ChannelSet::BOTH).as_ptr();

    unsafe {
        raw_input_key_notify_func(ctx, window(0x10), 0x00, true);
        raw_input_mouse_move(ctx, window(0x10), 0.0, 0.0, 1.0, 1.0);
        raw_input_mouse_button(ctx, window(0x10), 0, true);
        raw_input_mouse_scroll(ctx, window(0x10), 0.0, 1.0);
        raw_input_finish_key_event_context(ctx);
        raw_input_finish_mouse_event_context(ctx);
    }

    assert_eq!(subscription.live_contexts(), 0);
}

#[test]
fn null_context_is_a_defined_noop() {
    unsafe {
        raw_input_key_notify_func(std::ptr::null(), window(0x10), 0x00, true);
        raw_input_mouse_move(std::ptr::null(), window(0x10), 0.0, 0.0, 1.0, 1.0);
        raw_input_mouse_button(std::ptr::null(), window(0x10), 0, true);
        raw_input_mouse_scroll(std::ptr::null(), window(0x10), 0.0, 1.0);
        raw_input_finish_key_event_context(std::ptr::null());
        raw_input_finish_mouse_event_context(std::ptr::null());
    }
}

#[test]
fn dropped_subscription_leaves_context_inert_until_finished() {
    let (subscription, seen) = recording();
    let ctx = subscription.context(ChannelSet::BOTH).as_ptr();
    drop(subscription);

    unsafe {
        raw_input_key_notify_func(ctx, window(0x10), 0x00, true);
        raw_input_mouse_scroll(ctx, window(0x10), 0.0, 1.0);
        raw_input_finish_key_event_context(ctx);
        raw_input_finish_mouse_event_context(ctx);
    }

    assert!(seen.lock().unwrap().is_empty());
}
