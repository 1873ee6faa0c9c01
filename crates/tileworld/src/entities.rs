use tracing::debug;

use crate::geometry::Rect;
use crate::tile_index::{SpawnDescriptor, SpawnKind};

/// Ticks an enemy walks in one direction before the first reversal.
pub const ENEMY_PATROL_TICKS: i32 = 50;
pub const ENEMY_STEP: f32 = 1.0;
/// Extra height of a lava box beyond half a tile.
const HAZARD_EXTRA_HEIGHT: f32 = 5.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Enemy {
    pub rect: Rect,
    pub direction: f32,
    pub counter: i32,
}

impl Enemy {
    fn spawn(rect: Rect) -> Self {
        Self {
            rect,
            direction: 1.0,
            counter: 0,
        }
    }

    /// Time-bounded patrol: flips once the counter passes the patrol length,
    /// regardless of walls or ledges.
    pub fn tick(&mut self) {
        self.rect.x += self.direction * ENEMY_STEP;
        self.counter += 1;
        if self.counter.abs() > ENEMY_PATROL_TICKS {
            self.direction = -self.direction;
            self.counter = -self.counter;
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Hazard {
    pub rect: Rect,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Collectible {
    pub rect: Rect,
}

/// Live dynamic actors of the active level, one collection per kind.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EntityPool {
    enemies: Vec<Enemy>,
    hazards: Vec<Hazard>,
    collectibles: Vec<Collectible>,
}

impl EntityPool {
    pub fn from_spawns(spawns: &[SpawnDescriptor], tile_size: f32) -> Self {
        let mut pool = Self::default();
        pool.rebuild(spawns, tile_size);
        pool
    }

    pub fn rebuild(&mut self, spawns: &[SpawnDescriptor], tile_size: f32) {
        self.enemies.clear();
        self.hazards.clear();
        self.collectibles.clear();
        for spawn in spawns {
            match spawn.kind {
                SpawnKind::Enemy => self.enemies.push(Enemy::spawn(Rect::from_origin(
                    spawn.origin,
                    tile_size,
                    tile_size,
                ))),
                SpawnKind::Hazard => self.hazards.push(Hazard {
                    rect: hazard_rect(spawn, tile_size),
                }),
                SpawnKind::Collectible => self.collectibles.push(collectible_at(spawn, tile_size)),
                SpawnKind::Exit => {}
            }
        }
        debug!(
            enemies = self.enemies.len(),
            hazards = self.hazards.len(),
            collectibles = self.collectibles.len(),
            "entity_pool_rebuilt"
        );
    }

    /// Restores the coin collection only; enemies keep their patrol state.
    pub fn rebuild_collectibles(&mut self, spawns: &[SpawnDescriptor], tile_size: f32) {
        self.collectibles = spawns
            .iter()
            .filter(|spawn| spawn.kind == SpawnKind::Collectible)
            .map(|spawn| collectible_at(spawn, tile_size))
            .collect();
    }

    pub fn tick(&mut self) {
        for enemy in &mut self.enemies {
            enemy.tick();
        }
    }

    pub fn touches_deadly(&self, body: &Rect) -> bool {
        self.enemies.iter().any(|enemy| enemy.rect.overlaps(body))
            || self.hazards.iter().any(|hazard| hazard.rect.overlaps(body))
    }

    /// Removes every collectible overlapping `body` and returns how many.
    pub fn collect_overlapping(&mut self, body: &Rect) -> u32 {
        let before = self.collectibles.len();
        self.collectibles.retain(|coin| !coin.rect.overlaps(body));
        (before - self.collectibles.len()) as u32
    }

    pub fn enemies(&self) -> &[Enemy] {
        &self.enemies
    }

    pub fn hazards(&self) -> &[Hazard] {
        &self.hazards
    }

    pub fn collectibles(&self) -> &[Collectible] {
        &self.collectibles
    }
}

fn hazard_rect(spawn: &SpawnDescriptor, tile_size: f32) -> Rect {
    let half = (tile_size / 2.0).floor();
    Rect::new(
        spawn.origin.x,
        spawn.origin.y + half,
        tile_size,
        half + HAZARD_EXTRA_HEIGHT,
    )
}

fn collectible_at(spawn: &SpawnDescriptor, tile_size: f32) -> Collectible {
    Collectible {
        rect: Rect::from_origin(spawn.origin, tile_size, tile_size),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::GridDocument;
    use crate::tile_index::TileIndex;

    fn pool_for(rows: Vec<Vec<i32>>) -> (TileIndex, EntityPool) {
        let doc = GridDocument::from_rows(rows).expect("doc");
        let index = TileIndex::build(&doc, 35.0);
        let pool = EntityPool::from_spawns(index.spawns(), 35.0);
        (index, pool)
    }

    #[test]
    fn rebuild_creates_one_entity_per_spawn() {
        let (_, pool) = pool_for(vec![vec![3, 6, 7], vec![7, 8, 0]]);

        assert_eq!(pool.enemies().len(), 1);
        assert_eq!(pool.hazards().len(), 1);
        assert_eq!(pool.collectibles().len(), 2);
        assert_eq!(pool.hazards()[0].rect, Rect::new(35.0, 17.0, 35.0, 22.0));
        assert_eq!(pool.enemies()[0].rect, Rect::new(0.0, 0.0, 35.0, 35.0));
    }

    #[test]
    fn enemy_reverses_on_a_fixed_tick_period() {
        let mut enemy = Enemy::spawn(Rect::new(100.0, 0.0, 35.0, 35.0));

        for _ in 0..50 {
            enemy.tick();
        }
        assert_eq!(enemy.direction, 1.0);
        assert_eq!(enemy.rect.x, 150.0);

        enemy.tick();
        assert_eq!(enemy.direction, -1.0, "first reversal after 51 ticks");
        assert_eq!(enemy.rect.x, 151.0);

        for _ in 0..101 {
            enemy.tick();
        }
        assert_eq!(enemy.direction, -1.0);
        enemy.tick();
        assert_eq!(enemy.direction, 1.0, "second reversal 102 ticks later");
        assert_eq!(enemy.rect.x, 49.0);
    }

    #[test]
    fn collected_coins_stay_gone_until_rebuilt() {
        let (index, mut pool) = pool_for(vec![vec![7, 0, 7]]);
        let body = Rect::new(10.0, 10.0, 10.0, 10.0);

        assert_eq!(pool.collect_overlapping(&body), 1);
        assert_eq!(pool.collect_overlapping(&body), 0);
        assert_eq!(pool.collectibles().len(), 1);

        pool.rebuild_collectibles(index.spawns(), 35.0);
        assert_eq!(pool.collectibles().len(), 2);
    }

    #[test]
    fn rebuild_collectibles_leaves_enemies_alone() {
        let (index, mut pool) = pool_for(vec![vec![3, 7]]);
        pool.tick();
        pool.tick();

        pool.rebuild_collectibles(index.spawns(), 35.0);

        assert_eq!(pool.enemies()[0].rect.x, 2.0);
        assert_eq!(pool.enemies()[0].counter, 2);
    }

    #[test]
    fn deadly_overlap_covers_enemies_and_hazards() {
        let (_, pool) = pool_for(vec![vec![3, 0, 6]]);

        assert!(pool.touches_deadly(&Rect::new(30.0, 0.0, 10.0, 10.0)));
        assert!(pool.touches_deadly(&Rect::new(75.0, 20.0, 5.0, 5.0)));
        assert!(!pool.touches_deadly(&Rect::new(75.0, 0.0, 5.0, 10.0)));
        assert!(!pool.touches_deadly(&Rect::new(40.0, 0.0, 20.0, 35.0)));
    }
}
