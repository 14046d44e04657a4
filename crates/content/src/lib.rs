//! Content records and the identity-indexed registry that owns them.
//!
//! Each [`Content`] lives behind an `Arc` held by the [`ContentRegistry`]. Other
//! components resolve records by [`ContentId`] through the [`ContentResolver`] seam and
//! keep only handles, so record state is never duplicated.

pub mod clock;
pub mod content;
pub mod error;
pub mod id;
pub mod registry;

pub use clock::{Clock, ManualClock, SystemClock};
pub use content::{Content, ContentSnapshot};
pub use error::RegistryError;
pub use id::ContentId;
pub use registry::{ContentRegistry, ContentResolver};
