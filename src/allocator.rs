use crate::error::{AllocError, Result};
use crate::types::{Allocation, ItemType, PlacedUnit, Residue, SheetAllocation, SheetSize};

/// Working copy of one catalog entry.
#[derive(Debug, Clone, Copy)]
struct Slot {
    index: usize,
    item: ItemType,
    remaining: u64,
}

/// Greedy largest-area-first allocator over a fixed sheet capacity.
#[derive(Debug, Clone, Copy)]
pub struct Allocator {
    capacity: f64,
}

impl Allocator {
    pub fn new(capacity: f64) -> Result<Self> {
        if !capacity.is_finite() || capacity <= 0.0 {
            return Err(AllocError::InvalidCapacity { capacity });
        }
        Ok(Self { capacity })
    }

    pub fn for_sheet(sheet: SheetSize) -> Result<Self> {
        Self::new(sheet.area())
    }

    pub fn capacity(&self) -> f64 {
        self.capacity
    }

    /// Packs `catalog` onto as many sheets as needed.
    ///
    /// Each sheet is filled by re-sorting the remaining item types by
    /// descending unit area (ties keep catalog order) and taking as many
    /// units of each as still fit. Packing stops when every item is placed
    /// or when a fresh sheet takes nothing; whatever is left is returned as
    /// residue. The caller's catalog is not modified.
    pub fn pack(&self, catalog: &[ItemType]) -> Result<Allocation> {
        let mut slots = Self::working_copy(catalog)?;
        let mut sheets = Vec::new();

        while slots.iter().any(|s| s.remaining > 0) {
            let sheet = self.fill_sheet(&mut slots);
            if sheet.units.is_empty() {
                break;
            }
            tracing::debug!(
                sheet = sheets.len() + 1,
                units = sheet.units.len(),
                filled_area = sheet.filled_area,
                "sheet closed"
            );
            sheets.push(sheet);
        }

        slots.sort_by_key(|s| s.index);
        let residue: Vec<Residue> = slots
            .iter()
            .filter(|s| s.remaining > 0)
            .map(|s| Residue {
                index: s.index,
                width: s.item.width,
                height: s.item.height,
                quantity: s.remaining,
            })
            .collect();

        for r in &residue {
            tracing::warn!(
                index = r.index,
                width = r.width,
                height = r.height,
                quantity = r.quantity,
                capacity = self.capacity,
                "item larger than a sheet left unplaced"
            );
        }

        let allocation = Allocation {
            capacity: self.capacity,
            sheets,
            residue,
        };
        tracing::info!(
            sheets = allocation.sheet_count(),
            placed = allocation.placed_count(),
            unplaced = allocation.residue_count(),
            "pack finished"
        );
        Ok(allocation)
    }

    fn working_copy(catalog: &[ItemType]) -> Result<Vec<Slot>> {
        catalog
            .iter()
            .enumerate()
            .map(|(index, item)| {
                let invalid = |reason: String| AllocError::InvalidItem { index, reason };
                if !item.width.is_finite() || item.width <= 0.0 {
                    return Err(invalid(format!("width must be positive, got {}", item.width)));
                }
                if !item.height.is_finite() || item.height <= 0.0 {
                    return Err(invalid(format!("height must be positive, got {}", item.height)));
                }
                let area = item.area();
                if !area.is_finite() || area <= 0.0 {
                    return Err(invalid(format!(
                        "area {}x{} is not representable",
                        item.width, item.height
                    )));
                }
                let remaining = u64::try_from(item.quantity).map_err(|_| {
                    invalid(format!("quantity must not be negative, got {}", item.quantity))
                })?;
                Ok(Slot {
                    index,
                    item: *item,
                    remaining,
                })
            })
            .collect()
    }

    fn fill_sheet(&self, slots: &mut [Slot]) -> SheetAllocation {
        slots.sort_by(|a, b| {
            b.item
                .area()
                .total_cmp(&a.item.area())
                .then(a.index.cmp(&b.index))
        });

        let mut units = Vec::new();
        let mut filled = 0.0_f64;

        for slot in slots.iter_mut() {
            let area = slot.item.area();
            while slot.remaining > 0 && area <= self.capacity - filled {
                // Float-to-int casts truncate toward zero.
                let max_fit = ((self.capacity - filled) / area).floor() as u64;
                let take = max_fit.min(slot.remaining);
                let unit = PlacedUnit::of(&slot.item);

                let mut placed = 0;
                while placed < take && filled + area <= self.capacity {
                    units.push(unit);
                    filled += area;
                    placed += 1;
                }
                if placed == 0 {
                    break;
                }
                slot.remaining -= placed;
            }
        }

        SheetAllocation {
            units,
            filled_area: filled,
        }
    }
}

/// Convenience wrapper for a one-off pack against a scalar capacity.
pub fn pack(catalog: &[ItemType], capacity: f64) -> Result<Allocation> {
    Allocator::new(capacity)?.pack(catalog)
}

/// Catalog used for demos and validation runs.
pub fn reference_catalog() -> Vec<ItemType> {
    vec![
        ItemType::new(5.0, 7.0, 50),
        ItemType::new(3.0, 4.5, 70),
        ItemType::new(9.0, 2.0, 50),
    ]
}

pub const REFERENCE_SHEET: SheetSize = SheetSize {
    width: 20.0,
    height: 40.0,
};
