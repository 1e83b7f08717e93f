//! # Events Module
//!
//! Progress reporting for whatever sits in front of the pipeline.
//!
//! ## Design
//! The core never draws anything. It emits events through a channel and a
//! presentation layer (the CLI, a GUI, a test) subscribes to them.
//!
//! ## Example
//! ```rust,ignore
//! let (sender, receiver) = EventChannel::new();
//!
//! std::thread::spawn(move || {
//!     for event in receiver.iter() {
//!         if let Some(p) = event.progress() {
//!             println!("{} {}/{} {}", p.phase, p.completed, p.total, p.current_item);
//!         }
//!     }
//! });
//!
//! let report = pipeline.run_with_events(&sender)?;
//! ```

mod channel;
mod types;

pub use channel::{null_sender, EventChannel, EventReceiver, EventSender};
pub use types::*;
