//! Bar source port trait.

use crate::domain::bar::Bar;
use crate::domain::error::EngineError;

/// Supplies a finite, ordered bar sequence. Implementations must not reorder.
pub trait BarSource {
    fn fetch_bars(&self) -> Result<Vec<Bar>, EngineError>;

    /// Human-readable origin, recorded in the run capsule.
    fn describe(&self) -> String;
}
