//! Static table of room archetypes.

use dungeon_snake_core::{Axis, RoomKind, WeightedTable};
use rand::Rng;

/// How a room archetype picks its dimensions.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SizeRule {
    /// Always the same dimensions.
    Fixed {
        /// Width in cells.
        width: u32,
        /// Height in cells.
        height: u32,
    },
    /// Width and height drawn independently from `min..=max`.
    Ranged {
        /// Smallest side.
        min: u32,
        /// Largest side.
        max: u32,
    },
    /// Long room elongated along the axis it grows on.
    Oriented {
        /// Range of the long side.
        long: (u32, u32),
        /// Range of the short side.
        short: (u32, u32),
    },
}

/// Catalog entry describing one archetype.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RoomTemplate {
    /// Archetype described by the entry.
    pub kind: RoomKind,
    /// Weight used when growing the dungeon. Zero means never grown.
    pub weight: u32,
    /// Dimension rule.
    pub size: SizeRule,
}

impl RoomTemplate {
    /// Rolls dimensions for a room growing along `axis`, or either axis when `None`.
    pub fn roll_size<R: Rng + ?Sized>(&self, axis: Option<Axis>, rng: &mut R) -> (u32, u32) {
        match self.size {
            SizeRule::Fixed { width, height } => (width, height),
            SizeRule::Ranged { min, max } => (rng.gen_range(min..=max), rng.gen_range(min..=max)),
            SizeRule::Oriented { long, short } => {
                let axis = axis.unwrap_or_else(|| {
                    if rng.gen_bool(0.5) {
                        Axis::Horizontal
                    } else {
                        Axis::Vertical
                    }
                });
                let long_side = rng.gen_range(long.0..=long.1);
                let short_side = rng.gen_range(short.0..=short.1);
                match axis {
                    Axis::Horizontal => (long_side, short_side),
                    Axis::Vertical => (short_side, long_side),
                }
            }
        }
    }
}

/// Table of every room archetype.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RoomCatalog {
    templates: Vec<RoomTemplate>,
}

impl Default for RoomCatalog {
    fn default() -> Self {
        let template = |kind: RoomKind, weight: u32, size: SizeRule| RoomTemplate {
            kind,
            weight,
            size,
        };
        Self {
            templates: vec![
                template(RoomKind::Start, 0, SizeRule::Fixed { width: 9, height: 9 }),
                template(RoomKind::Normal, 30, SizeRule::Ranged { min: 10, max: 14 }),
                template(RoomKind::Hall, 15, SizeRule::Ranged { min: 14, max: 18 }),
                template(
                    RoomKind::CorridorRoom,
                    10,
                    SizeRule::Oriented {
                        long: (20, 24),
                        short: (6, 8),
                    },
                ),
                template(RoomKind::Square, 12, SizeRule::Fixed { width: 10, height: 10 }),
                template(
                    RoomKind::ObstacleCourse,
                    8,
                    SizeRule::Fixed {
                        width: 12,
                        height: 12,
                    },
                ),
                template(RoomKind::Crossroads, 5, SizeRule::Fixed { width: 9, height: 9 }),
                template(RoomKind::Boss, 0, SizeRule::Ranged { min: 14, max: 16 }),
                template(RoomKind::Treasure, 0, SizeRule::Ranged { min: 10, max: 12 }),
                template(RoomKind::Secret, 0, SizeRule::Fixed { width: 8, height: 8 }),
            ],
        }
    }
}

impl RoomCatalog {
    /// Entry for an archetype.
    #[must_use]
    pub fn template(&self, kind: RoomKind) -> Option<&RoomTemplate> {
        self.templates.iter().find(|template| template.kind == kind)
    }

    /// Weighted table of growable archetypes. Preferred archetypes count double.
    #[must_use]
    pub fn growth_table(&self, preferred: &[RoomKind]) -> WeightedTable<RoomKind> {
        self.templates
            .iter()
            .map(|template| {
                let bias = if preferred.contains(&template.kind) {
                    2
                } else {
                    1
                };
                (template.kind, template.weight * bias)
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn assigned_archetypes_are_never_grown() {
        let table = RoomCatalog::default().growth_table(&[RoomKind::Boss]);
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        for _ in 0..500 {
            let picked = table.pick(&mut rng).copied();
            assert!(!matches!(
                picked,
                Some(RoomKind::Start | RoomKind::Boss | RoomKind::Treasure | RoomKind::Secret)
            ));
        }
    }

    #[test]
    fn preferred_archetypes_double_their_weight() {
        let catalog = RoomCatalog::default();
        let plain = catalog.growth_table(&[]).total();
        let biased = catalog.growth_table(&[RoomKind::Normal]).total();
        assert_eq!(biased, plain + 30);
    }

    #[test]
    fn corridor_rooms_stretch_along_growth_axis() {
        let catalog = RoomCatalog::default();
        let template = catalog.template(RoomKind::CorridorRoom).copied();
        let mut rng = ChaCha8Rng::seed_from_u64(11);
        let Some(template) = template else {
            panic!("corridor room missing from catalog");
        };
        let (width, height) = template.roll_size(Some(Axis::Horizontal), &mut rng);
        assert!((20..=24).contains(&width) && (6..=8).contains(&height));
        let (width, height) = template.roll_size(Some(Axis::Vertical), &mut rng);
        assert!((6..=8).contains(&width) && (20..=24).contains(&height));
    }

    #[test]
    fn ranged_sides_are_rolled_separately() {
        let template = RoomTemplate {
            kind: RoomKind::Normal,
            weight: 1,
            size: SizeRule::Ranged { min: 10, max: 14 },
        };
        let mut rng = ChaCha8Rng::seed_from_u64(21);
        let rolls: Vec<(u32, u32)> = (0..64)
            .map(|_| template.roll_size(None, &mut rng))
            .collect();
        assert!(rolls
            .iter()
            .all(|(width, height)| (10..=14).contains(width) && (10..=14).contains(height)));
        assert!(rolls.iter().any(|(width, height)| width != height));
    }
}
