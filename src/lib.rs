pub mod allocator;
pub mod error;
pub mod render;
pub mod types;

pub use allocator::{Allocator, pack};
pub use error::{AllocError, Result};
pub use types::{Allocation, ItemType, PlacedUnit, Residue, SheetAllocation, SheetSize, UnitGroup};
