//! Core types for the Gambit CMS client.
//!
//! The content API has returned records in two historically different
//! envelope shapes. Everything in this crate exists to absorb that
//! variability once, so the rest of the system only ever sees flat
//! [`ContentRecord`]s with absolute media URLs.

pub mod event;
pub mod media;
pub mod normalize;
pub mod record;

pub use event::Event;
pub use media::MediaResolver;
pub use normalize::{Normalized, normalize_response};
pub use record::{ContentRecord, RecordId};
