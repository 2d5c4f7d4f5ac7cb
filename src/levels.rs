use crate::error::ConfigError;
use crate::model::PALETTE_SIZE;

pub const MAX_BOTTLES: usize = 12;
pub const DEFAULT_LEVEL_COUNT: u32 = 100;

/// Colour and bottle counts for one level. Only valid shapes can be built, so
/// generation never has to reject its input.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct LevelShape {
    colors: usize,
    bottles: usize,
}

impl LevelShape {
    pub fn new(colors: usize, bottles: usize) -> Result<Self, ConfigError> {
        if colors == 0 || colors > PALETTE_SIZE {
            return Err(ConfigError::ColorCount {
                colors,
                max: PALETTE_SIZE,
            });
        }
        if bottles <= colors || bottles > MAX_BOTTLES {
            return Err(ConfigError::BottleCount {
                colors,
                bottles,
                max: MAX_BOTTLES,
            });
        }
        Ok(Self { colors, bottles })
    }

    pub fn colors(&self) -> usize {
        self.colors
    }

    pub fn bottles(&self) -> usize {
        self.bottles
    }

    pub fn empty_bottles(&self) -> usize {
        self.bottles - self.colors
    }
}

/// Difficulty curve indexed by 1-based level number.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LevelTable {
    shapes: Vec<LevelShape>,
}

impl LevelTable {
    pub fn new(shapes: Vec<LevelShape>) -> Result<Self, ConfigError> {
        if shapes.is_empty() {
            return Err(ConfigError::EmptyLevelTable);
        }
        Ok(Self { shapes })
    }

    pub fn max_level(&self) -> u32 {
        self.shapes.len() as u32
    }

    /// Out-of-range levels clamp to the nearest defined one.
    pub fn shape_for(&self, level: u32) -> LevelShape {
        let index = (level.max(1) as usize - 1).min(self.shapes.len() - 1);
        self.shapes[index]
    }
}

impl Default for LevelTable {
    fn default() -> Self {
        let shapes = (1..=DEFAULT_LEVEL_COUNT)
            .map(|level| {
                let (colors, bottles) = match level {
                    1..=5 => (2, 3),
                    6..=10 => (2, 4),
                    11..=20 => (3, 4),
                    21..=35 => (3, 5),
                    36..=50 => (4, 5),
                    51..=70 => (4, 6),
                    71..=85 => (5, 6),
                    _ => (5, 7),
                };
                LevelShape { colors, bottles }
            })
            .collect();
        Self { shapes }
    }
}
