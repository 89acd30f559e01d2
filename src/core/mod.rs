//=========================================================================
// Core
//
// Consumer-side systems: the bridge boundary, input state, and the
// fixed-rate logic loop that drains queued events.
//
// Responsibilities:
// - Export the C entry points and manage context lifecycles
// - Fold events into keyboard and mouse state
// - Hand each tick's queued events to application code at a fixed TPS
//
// Notes:
// The logic loop runs independently from the producer's thread.
// Communication happens only through the bounded queue filled by
// `QueueListener`, so a slow tick never stalls the producer.
//
//=========================================================================

//=== Submodules ==========================================================
pub mod input;
pub mod platform_bridge;

//=== Standard Library Imports ============================================
use std::thread;
use std::time::{Duration, Instant};

//=== External Crates =====================================================
use log::{info, trace};

//=== Internal Modules ====================================================
use input::event::InputEvent;
use platform_bridge::{EventCollector, TickControl};

//=== CoreLoop ============================================================
//
// Fixed-rate consumer of queued input. Owns the collector and a frame
// handler; ticks until the producer signals shutdown or goes away.
//
pub struct CoreLoop<F>
where
    F: FnMut(&[InputEvent]) + Send + 'static,
{
    collector: EventCollector,
    handler: F,
    frame_duration: Duration,
}

impl<F> CoreLoop<F>
where
    F: FnMut(&[InputEvent]) + Send + 'static,
{
    //--- Construction -----------------------------------------------------

    /// # Panics
    ///
    /// Panics if `tps <= 0.0`.
    pub fn new(collector: EventCollector, tps: f64, handler: F) -> Self {
        assert!(tps > 0.0, "TPS must be positive, got {}", tps);
        Self {
            collector,
            handler,
            frame_duration: Duration::from_secs_f64(1.0 / tps),
        }
    }

    //--- tick() -----------------------------------------------------------
    //
    // One frame: drain, then hand the batch to the handler. Events drained
    // before a shutdown signal are still delivered.
    //
    pub fn tick(&mut self) -> TickControl {
        let control = self.collector.collect_frame();

        let events = self.collector.events();
        if !events.is_empty() {
            trace!(target: "core", "Handling {} events", events.len());
            (self.handler)(events);
        }

        control
    }

    //--- spawn() ----------------------------------------------------------
    //
    // Runs `tick` on a new thread at a fixed rate.
    //
    // Each tick:
    //  1. Collects queued events (bounded per frame)
    //  2. Hands them to the frame handler
    //  3. Sleeps to maintain fixed pacing
    //  4. Exits cleanly when a shutdown signal is received
    //
    pub fn spawn(mut self) -> thread::JoinHandle<()> {
        thread::spawn(move || {
            info!(target: "core", "Core thread started");
            loop {
                let frame_start = Instant::now();

                if let TickControl::Exit = self.tick() {
                    info!(target: "core", "Core thread exiting.");
                    break;
                }

                let elapsed = frame_start.elapsed();
                if elapsed < self.frame_duration {
                    thread::sleep(self.frame_duration - elapsed);
                }
            }
        })
    }
}

//=========================================================================
// Unit Tests
//=========================================================================
