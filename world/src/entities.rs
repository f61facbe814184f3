use std::collections::{BTreeMap, BTreeSet};

use rand::Rng;
use robot_game_core::{CellCoord, Direction, Drawable, EntityId, EntityKind, SpriteKey};

use crate::{TileMap, WorldError};

/// Number of sampling attempts allowed per map cell before placement gives up.
const PLACEMENT_ATTEMPTS_PER_CELL: u64 = 10;

/// Dynamic occupant of a single grid cell.
///
/// The occupied cell is the key under which the registry stores the entity, so
/// the entity itself only carries its identity and visual handle.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Entity {
    id: EntityId,
    sprite: SpriteKey,
}

impl Entity {
    /// Identifier that persists while the entity moves between cells.
    #[must_use]
    pub const fn id(&self) -> EntityId {
        self.id
    }

    /// Visual handle assigned to the entity.
    #[must_use]
    pub const fn sprite(&self) -> SpriteKey {
        self.sprite
    }
}

/// Entity paired with the cell it occupies.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PlacedEntity {
    /// Cell occupied by the entity.
    pub cell: CellCoord,
    /// Entity stored at the cell.
    pub entity: Entity,
}

impl Drawable for PlacedEntity {
    fn cell(&self) -> CellCoord {
        self.cell
    }

    fn sprite(&self) -> SpriteKey {
        self.entity.sprite
    }
}

/// Single committed monster relocation produced by a monster step.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MonsterMove {
    /// Identifier of the monster that moved.
    pub monster: EntityId,
    /// Cell the monster left.
    pub from: CellCoord,
    /// Cell the monster entered.
    pub to: CellCoord,
}

/// Coins and monsters keyed by the cell they occupy.
///
/// Both collections are ordered by cell so iteration, and therefore every
/// random decision made while iterating, is reproducible for a given seed.
#[derive(Clone, Debug, Default)]
pub struct EntityRegistry {
    coins: BTreeMap<CellCoord, Entity>,
    monsters: BTreeMap<CellCoord, Entity>,
    reserved: BTreeSet<CellCoord>,
    next_id: u32,
}

impl EntityRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Excludes a cell from random placement without occupying it.
    pub fn reserve(&mut self, cell: CellCoord) {
        let _ = self.reserved.insert(cell);
    }

    /// Places `count` entities of the provided kind on uniformly sampled free cells.
    ///
    /// Candidates are rejected when collidable, reserved, or occupied by any
    /// coin or monster. Sampling gives up with
    /// [`WorldError::PlacementExhausted`] after ten attempts per map cell;
    /// entities placed before that point remain in the registry.
    pub fn place_random<R>(
        &mut self,
        kind: EntityKind,
        count: usize,
        map: &TileMap,
        rng: &mut R,
    ) -> Result<Vec<CellCoord>, WorldError>
    where
        R: Rng + ?Sized,
    {
        let mut placed = Vec::with_capacity(count);
        if count == 0 {
            return Ok(placed);
        }

        let columns = i32::try_from(map.columns()).unwrap_or(i32::MAX);
        let rows = i32::try_from(map.rows()).unwrap_or(i32::MAX);
        let cell_count = u64::from(map.columns()) * u64::from(map.rows());
        let mut attempts_left = cell_count.saturating_mul(PLACEMENT_ATTEMPTS_PER_CELL);

        while placed.len() < count {
            if attempts_left == 0 || columns == 0 || rows == 0 {
                return Err(WorldError::PlacementExhausted {
                    kind,
                    placed: placed.len(),
                    requested: count,
                });
            }
            attempts_left -= 1;

            let cell = CellCoord::new(rng.gen_range(0..columns), rng.gen_range(0..rows));
            if map.is_collidable(cell) || self.reserved.contains(&cell) || self.is_occupied(cell)
            {
                continue;
            }

            let _ = self.spawn(kind, cell);
            placed.push(cell);
        }

        Ok(placed)
    }

    /// Places a single entity at an explicit cell.
    ///
    /// Fails with [`WorldError::InvalidPlacement`] when the cell is collidable,
    /// reserved, or already holds a coin or monster.
    pub fn insert(
        &mut self,
        kind: EntityKind,
        cell: CellCoord,
        map: &TileMap,
    ) -> Result<EntityId, WorldError> {
        if map.is_collidable(cell) || self.reserved.contains(&cell) || self.is_occupied(cell) {
            return Err(WorldError::InvalidPlacement { kind, cell });
        }

        Ok(self.spawn(kind, cell))
    }

    /// Reports whether a coin or monster occupies the cell.
    #[must_use]
    pub fn is_occupied(&self, cell: CellCoord) -> bool {
        self.coins.contains_key(&cell) || self.monsters.contains_key(&cell)
    }

    /// Moves every monster one random cardinal step where possible.
    ///
    /// Decisions are made against the pre-step snapshot: a monster may not
    /// enter a collidable tile, a coin, any cell a monster occupied before the
    /// step, or a cell already claimed by a monster earlier in this step.
    /// Rejected monsters stay put. The resulting layout replaces the old one in
    /// a single swap.
    pub fn step_monsters<R>(&mut self, map: &TileMap, rng: &mut R) -> Vec<MonsterMove>
    where
        R: Rng + ?Sized,
    {
        let previous = std::mem::take(&mut self.monsters);
        let mut next = BTreeMap::new();
        let mut moves = Vec::new();

        for (&from, &entity) in &previous {
            let direction = Direction::ALL[rng.gen_range(0..Direction::ALL.len())];
            let candidate = from.neighbor(direction);
            let accepted = !map.is_collidable(candidate)
                && !previous.contains_key(&candidate)
                && !next.contains_key(&candidate)
                && !self.coins.contains_key(&candidate);

            let destination = if accepted {
                moves.push(MonsterMove {
                    monster: entity.id,
                    from,
                    to: candidate,
                });
                candidate
            } else {
                from
            };
            let _ = next.insert(destination, entity);
        }

        debug_assert_eq!(previous.len(), next.len(), "monster step lost a monster");
        self.monsters = next;
        moves
    }

    /// Coin stored at the cell, if any.
    #[must_use]
    pub fn coin_at(&self, cell: CellCoord) -> Option<&Entity> {
        self.coins.get(&cell)
    }

    /// Monster stored at the cell, if any.
    #[must_use]
    pub fn monster_at(&self, cell: CellCoord) -> Option<&Entity> {
        self.monsters.get(&cell)
    }

    /// Removes the coin at the cell, returning whether one existed.
    pub fn remove_coin_at(&mut self, cell: CellCoord) -> bool {
        self.coins.remove(&cell).is_some()
    }

    /// Cells occupied by monsters in ascending cell order.
    #[must_use]
    pub fn monster_positions(&self) -> Vec<CellCoord> {
        self.monsters.keys().copied().collect()
    }

    /// Cells occupied by coins in ascending cell order.
    #[must_use]
    pub fn coin_positions(&self) -> Vec<CellCoord> {
        self.coins.keys().copied().collect()
    }

    /// Iterator over every coin and the cell it occupies.
    pub fn coins(&self) -> impl Iterator<Item = PlacedEntity> + '_ {
        placed(&self.coins)
    }

    /// Iterator over every monster and the cell it occupies.
    pub fn monsters(&self) -> impl Iterator<Item = PlacedEntity> + '_ {
        placed(&self.monsters)
    }

    /// Number of coins still on the map.
    #[must_use]
    pub fn coin_count(&self) -> usize {
        self.coins.len()
    }

    /// Number of monsters on the map.
    #[must_use]
    pub fn monster_count(&self) -> usize {
        self.monsters.len()
    }

    fn spawn(&mut self, kind: EntityKind, cell: CellCoord) -> EntityId {
        let id = EntityId::new(self.next_id);
        self.next_id = self.next_id.saturating_add(1);
        let entity = Entity {
            id,
            sprite: kind.sprite(),
        };
        let collection = match kind {
            EntityKind::Coin => &mut self.coins,
            EntityKind::Monster => &mut self.monsters,
        };
        let _ = collection.insert(cell, entity);
        id
    }
}

fn placed(collection: &BTreeMap<CellCoord, Entity>) -> impl Iterator<Item = PlacedEntity> + '_ {
    collection
        .iter()
        .map(|(&cell, &entity)| PlacedEntity { cell, entity })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn open_room(columns: usize, rows: usize) -> TileMap {
        let layout: Vec<Vec<u8>> = (0..rows)
            .map(|row| {
                (0..columns)
                    .map(|column| {
                        u8::from(row == 0 || row + 1 == rows || column == 0 || column + 1 == columns)
                    })
                    .collect()
            })
            .collect();
        TileMap::from_rows(&layout).expect("valid room")
    }

    #[test]
    fn explicit_placement_rejects_walls_and_occupied_cells() {
        let map = open_room(5, 5);
        let mut registry = EntityRegistry::new();

        let _ = registry
            .insert(EntityKind::Coin, CellCoord::new(2, 2), &map)
            .expect("floor cell");

        assert_eq!(
            registry.insert(EntityKind::Monster, CellCoord::new(2, 2), &map),
            Err(WorldError::InvalidPlacement {
                kind: EntityKind::Monster,
                cell: CellCoord::new(2, 2),
            })
        );
        assert_eq!(
            registry.insert(EntityKind::Coin, CellCoord::new(0, 2), &map),
            Err(WorldError::InvalidPlacement {
                kind: EntityKind::Coin,
                cell: CellCoord::new(0, 2),
            })
        );
    }

    #[test]
    fn random_placement_never_stacks_entities() {
        let map = open_room(6, 6);
        let mut registry = EntityRegistry::new();
        let mut rng = ChaCha8Rng::seed_from_u64(11);

        let coins = registry
            .place_random(EntityKind::Coin, 5, &map, &mut rng)
            .expect("room has space for coins");
        let monsters = registry
            .place_random(EntityKind::Monster, 5, &map, &mut rng)
            .expect("room has space for monsters");

        let mut all: Vec<_> = coins.iter().chain(monsters.iter()).copied().collect();
        all.sort();
        all.dedup();
        assert_eq!(all.len(), 10);
        assert!(all.iter().all(|cell| !map.is_collidable(*cell)));
    }

    #[test]
    fn random_placement_skips_reserved_cells() {
        let map = open_room(5, 5);
        let mut registry = EntityRegistry::new();
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        registry.reserve(CellCoord::new(2, 2));

        let coins = registry
            .place_random(EntityKind::Coin, 4, &map, &mut rng)
            .expect("eight free cells remain");

        assert!(!coins.contains(&CellCoord::new(2, 2)));
        assert!(registry.coin_at(CellCoord::new(2, 2)).is_none());
    }

    #[test]
    fn random_placement_reports_exhaustion() {
        let map = open_room(3, 3);
        let mut registry = EntityRegistry::new();
        let mut rng = ChaCha8Rng::seed_from_u64(5);

        let error = registry
            .place_random(EntityKind::Monster, 2, &map, &mut rng)
            .expect_err("only one open cell");

        assert_eq!(
            error,
            WorldError::PlacementExhausted {
                kind: EntityKind::Monster,
                placed: 1,
                requested: 2,
            }
        );
    }

    #[test]
    fn boxed_in_monster_never_moves() {
        let map = open_room(3, 3);
        let mut registry = EntityRegistry::new();
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let id = registry
            .insert(EntityKind::Monster, CellCoord::new(1, 1), &map)
            .expect("centre is floor");

        for _ in 0..32 {
            assert!(registry.step_monsters(&map, &mut rng).is_empty());
        }
        assert_eq!(registry.monster_positions(), vec![CellCoord::new(1, 1)]);
        assert_eq!(
            registry.monster_at(CellCoord::new(1, 1)).map(Entity::id),
            Some(id)
        );
    }

    #[test]
    fn monsters_never_enter_coins_or_swap() {
        let map = open_room(5, 3);
        let mut registry = EntityRegistry::new();
        let mut rng = ChaCha8Rng::seed_from_u64(9);
        let _ = registry
            .insert(EntityKind::Monster, CellCoord::new(1, 1), &map)
            .expect("floor");
        let _ = registry
            .insert(EntityKind::Monster, CellCoord::new(2, 1), &map)
            .expect("floor");
        let _ = registry
            .insert(EntityKind::Coin, CellCoord::new(3, 1), &map)
            .expect("floor");

        for _ in 0..64 {
            let moves = registry.step_monsters(&map, &mut rng);
            assert!(moves.is_empty(), "corridor is fully blocked: {moves:?}");
        }
        assert_eq!(
            registry.monster_positions(),
            vec![CellCoord::new(1, 1), CellCoord::new(2, 1)]
        );
        assert_eq!(registry.coin_positions(), vec![CellCoord::new(3, 1)]);
    }

    #[test]
    fn monster_identity_follows_its_moves() {
        let map = open_room(4, 3);
        let mut registry = EntityRegistry::new();
        let mut rng = ChaCha8Rng::seed_from_u64(21);
        let id = registry
            .insert(EntityKind::Monster, CellCoord::new(1, 1), &map)
            .expect("floor");

        let mut moved = Vec::new();
        for _ in 0..64 {
            moved.extend(registry.step_monsters(&map, &mut rng));
        }

        assert!(!moved.is_empty(), "a free neighbour exists");
        assert!(moved.iter().all(|step| step.monster == id));
        let cell = registry.monster_positions()[0];
        assert_eq!(registry.monster_at(cell).map(Entity::id), Some(id));
    }

    #[test]
    fn removing_a_coin_reports_presence() {
        let map = open_room(4, 4);
        let mut registry = EntityRegistry::new();
        let _ = registry
            .insert(EntityKind::Coin, CellCoord::new(2, 1), &map)
            .expect("floor");

        assert!(registry.remove_coin_at(CellCoord::new(2, 1)));
        assert!(!registry.remove_coin_at(CellCoord::new(2, 1)));
        assert_eq!(registry.coin_count(), 0);
    }
}
