//! In-memory session manager for a turn-based pairing dojo.
//!
//! A [`DojoAssistant`] tracks an ordered roster of participants, rotates a
//! pilot/co-pilot pair each round, and runs a countdown per round with
//! pause/resume/skip controls. Everything lives in one process and one
//! instance; there is no networking or persistence. The countdown runs on a
//! spawned Tokio task, so round lifecycle calls need a runtime context.
//!
//! ```no_run
//! use dojo_assistant::DojoAssistant;
//!
//! # async fn demo() -> Result<(), dojo_assistant::DojoError> {
//! let mut dojo = DojoAssistant::new(300);
//! dojo.add_participant("John Doe")?;
//! dojo.add_participant("Jane Doe")?;
//! dojo.on_round_ended(|| println!("rotate!"));
//! dojo.start_round()?;
//! # Ok(())
//! # }
//! ```

mod clock;
mod dojo;
mod error;
mod roster;

pub use dojo::{DojoAssistant, DojoState};
pub use error::DojoError;
