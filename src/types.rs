use serde::{Deserialize, Deserializer, Serialize, de};

/// One catalog entry: an item kind and how many units of it are required.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ItemType {
    pub width: f64,
    pub height: f64,
    #[serde(deserialize_with = "deserialize_i64_from_number")]
    pub quantity: i64,
}

/// Accepts a count written as an integer or as an integral float (`2` or `2.0`).
pub fn deserialize_i64_from_number<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Number {
        Int(i64),
        Float(f64),
    }

    match Number::deserialize(deserializer)? {
        Number::Int(n) => Ok(n),
        Number::Float(f) => {
            if !f.is_finite() || f.fract() != 0.0 {
                return Err(de::Error::custom(format!("expected a whole number, got {f}")));
            }
            if f < i64::MIN as f64 || f >= i64::MAX as f64 {
                return Err(de::Error::custom(format!("{f} is out of range")));
            }
            Ok(f as i64)
        }
    }
}

impl ItemType {
    pub fn new(width: f64, height: f64, quantity: i64) -> Self {
        Self {
            width,
            height,
            quantity,
        }
    }

    pub fn area(&self) -> f64 {
        self.width * self.height
    }
}

impl std::fmt::Display for ItemType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}x{}:{}", self.width, self.height, self.quantity)
    }
}

/// Physical sheet size. Only its area is used for allocation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SheetSize {
    pub width: f64,
    pub height: f64,
}

impl SheetSize {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    pub fn area(&self) -> f64 {
        self.width * self.height
    }
}

impl std::fmt::Display for SheetSize {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PlacedUnit {
    pub width: f64,
    pub height: f64,
    pub area: f64,
}

impl PlacedUnit {
    pub fn of(item: &ItemType) -> Self {
        Self {
            width: item.width,
            height: item.height,
            area: item.area(),
        }
    }
}

impl std::fmt::Display for PlacedUnit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

/// Placed units of one `(width, height)` on a sheet.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct UnitGroup {
    pub width: f64,
    pub height: f64,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SheetAllocation {
    pub units: Vec<PlacedUnit>,
    pub filled_area: f64,
}

impl SheetAllocation {
    pub fn waste_area(&self, capacity: f64) -> f64 {
        capacity - self.filled_area
    }

    /// Groups units by dimensions, in order of first appearance.
    pub fn summary(&self) -> Vec<UnitGroup> {
        let mut groups: Vec<UnitGroup> = Vec::new();
        for u in &self.units {
            match groups
                .iter_mut()
                .find(|g| g.width == u.width && g.height == u.height)
            {
                Some(g) => g.count += 1,
                None => groups.push(UnitGroup {
                    width: u.width,
                    height: u.height,
                    count: 1,
                }),
            }
        }
        groups
    }
}

/// Quantity of a catalog entry that no sheet could take.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Residue {
    pub index: usize,
    pub width: f64,
    pub height: f64,
    pub quantity: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Allocation {
    pub capacity: f64,
    pub sheets: Vec<SheetAllocation>,
    pub residue: Vec<Residue>,
}

impl Allocation {
    pub fn sheet_count(&self) -> usize {
        self.sheets.len()
    }

    pub fn placed_count(&self) -> usize {
        self.sheets.iter().map(|s| s.units.len()).sum()
    }

    pub fn residue_count(&self) -> u64 {
        self.residue.iter().map(|r| r.quantity).sum()
    }

    pub fn total_waste_percent(&self) -> f64 {
        let total_capacity = self.capacity * self.sheets.len() as f64;
        if total_capacity == 0.0 {
            return 0.0;
        }
        let total_filled: f64 = self.sheets.iter().map(|s| s.filled_area).sum();
        (total_capacity - total_filled) / total_capacity * 100.0
    }
}
