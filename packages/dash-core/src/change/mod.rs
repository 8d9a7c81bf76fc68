//! Working copy edits and change detection against the baseline.

mod detector;
mod record;
mod working_copy;

pub use detector::diff;
pub use record::{ChangeRecord, FieldValue};
pub use working_copy::WorkingCopy;
