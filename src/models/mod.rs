pub mod enums;
pub mod consent;
pub mod patient;
pub mod record;
pub mod stats;
pub mod transaction;

pub use consent::*;
pub use enums::*;
pub use patient::*;
pub use record::*;
pub use stats::*;
pub use transaction::*;

use serde::{Deserialize, Deserializer};

/// Read an explicit `null` the same as a missing field.
pub(crate) fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Option::unwrap_or_default)
}
