//=========================================================================
// Raw Input Bridge: Library Root
//
// Consumer side of a C ABI that carries raw keyboard and mouse events
// from a native window producer into Rust.
//
// Responsibilities:
// - Export the six `raw_input_*` symbols declared in `include/raw_input.h`
// - Route each notification through an opaque context to a listener
// - Provide coalesced keyboard and mouse state built on those events
// - Offer a Winit-backed reference host that drives the same ABI
//
// Typical usage:
// ```no_run
// use raw_input_bridge::HostBuilder;
//
// fn main() {
//     HostBuilder::new().build().run(|events| println!("{:?}", events)).unwrap();
// }
// ```
//
//=========================================================================

//--- Public Modules ------------------------------------------------------
//
// `core` contains the bridge itself (contexts, entry points, queueing)
// and the input types built on it. Embedders that own their own window
// use `core::platform_bridge` directly.
//
pub mod core;
pub mod prelude;

//--- Internal Modules ----------------------------------------------------
//
// `platform` is the Winit producer used by the host and is not part of
// the public API surface.
//
mod host;
mod platform;

//--- Public Exports ------------------------------------------------------

pub use host::{Host, HostBuilder};
pub use platform::PlatformError;
