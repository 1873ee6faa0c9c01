use crate::config::PlayerTuning;
use crate::geometry::{Rect, Vec2};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Facing {
    Left,
    Right,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayerState {
    Grounded,
    Airborne,
    Dead,
}

/// The run's single player body plus its counters.
///
/// `in_jump` is the jump lock: it is set by a jump or by a tile across the
/// top edge and cleared only by a downward landing, so walking off a ledge
/// leaves the player able to jump once mid-air.
#[derive(Debug, Clone, PartialEq)]
pub struct Player {
    pub(crate) body: Rect,
    pub(crate) vel_y: f32,
    pub(crate) tuning: PlayerTuning,
    pub(crate) facing: Facing,
    pub(crate) in_jump: bool,
    health: i32,
    coins: u32,
    overall_coins: u32,
    dead: bool,
}

impl Player {
    pub fn new(start: Vec2, tuning: PlayerTuning, health: i32) -> Self {
        Self {
            body: Rect::from_origin(start, tuning.width, tuning.height),
            vel_y: 0.0,
            tuning,
            facing: Facing::Right,
            in_jump: false,
            health,
            coins: 0,
            overall_coins: 0,
            dead: false,
        }
    }

    pub fn body(&self) -> Rect {
        self.body
    }

    pub fn position(&self) -> Vec2 {
        self.body.origin()
    }

    pub fn vel_y(&self) -> f32 {
        self.vel_y
    }

    pub fn tuning(&self) -> PlayerTuning {
        self.tuning
    }

    pub fn facing(&self) -> Facing {
        self.facing
    }

    pub fn health(&self) -> i32 {
        self.health
    }

    pub fn coins(&self) -> u32 {
        self.coins
    }

    pub fn overall_coins(&self) -> u32 {
        self.overall_coins
    }

    pub fn is_dead(&self) -> bool {
        self.dead
    }

    pub fn state(&self) -> PlayerState {
        if self.dead {
            PlayerState::Dead
        } else if self.in_jump {
            PlayerState::Airborne
        } else {
            PlayerState::Grounded
        }
    }

    pub fn mark_dead(&mut self) {
        self.dead = true;
    }

    pub(crate) fn add_coins(&mut self, count: u32) {
        self.coins += count;
    }

    /// Moves the level's coins into the run total.
    pub fn bank_coins(&mut self) {
        self.overall_coins += self.coins;
        self.coins = 0;
    }

    /// Puts the player back at `start` for a fresh attempt. Level coins are
    /// forfeited; health and the run total are untouched.
    pub fn respawn(&mut self, start: Vec2) {
        self.body = Rect::from_origin(start, self.tuning.width, self.tuning.height);
        self.vel_y = 0.0;
        self.in_jump = false;
        self.facing = Facing::Right;
        self.coins = 0;
        self.dead = false;
    }

    /// Places the player at the start of a new level, keeping every counter.
    /// A pending death carries over and is resolved at the new start.
    pub fn enter_level(&mut self, start: Vec2) {
        let coins = self.coins;
        let dead = self.dead;
        self.respawn(start);
        self.coins = coins;
        self.dead = dead;
    }

    /// Starts a new run at full `health`. The run total starts from zero, so
    /// coins banked in an earlier run are not carried into this one.
    pub fn reset_for_run(&mut self, start: Vec2, health: i32) {
        self.respawn(start);
        self.health = health;
        self.overall_coins = 0;
    }

    /// Takes one point of health; returns the remainder.
    pub(crate) fn lose_health(&mut self) -> i32 {
        self.health -= 1;
        self.health
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn player() -> Player {
        Player::new(
            Vec2::new(35.0, 70.0),
            PlayerTuning::for_display_width(700),
            5,
        )
    }

    #[test]
    fn new_player_is_grounded_at_start() {
        let player = player();

        assert_eq!(player.body(), Rect::new(35.0, 70.0, 28.0, 58.0));
        assert_eq!(player.state(), PlayerState::Grounded);
        assert_eq!(player.health(), 5);
    }

    #[test]
    fn state_follows_jump_lock_and_death() {
        let mut player = player();
        player.in_jump = true;
        assert_eq!(player.state(), PlayerState::Airborne);

        player.mark_dead();
        assert_eq!(player.state(), PlayerState::Dead);

        player.respawn(Vec2::new(0.0, 0.0));
        assert_eq!(player.state(), PlayerState::Grounded);
    }

    #[test]
    fn respawn_forfeits_level_coins_but_keeps_run_total() {
        let mut player = player();
        player.add_coins(2);
        player.bank_coins();
        player.add_coins(3);
        player.body = player.body.translated(100.0, 0.0);

        player.respawn(Vec2::new(35.0, 70.0));

        assert_eq!(player.coins(), 0);
        assert_eq!(player.overall_coins(), 2);
        assert_eq!(player.position(), Vec2::new(35.0, 70.0));
    }

    #[test]
    fn enter_level_keeps_coins_and_pending_death() {
        let mut player = player();
        player.add_coins(3);
        player.mark_dead();

        player.enter_level(Vec2::new(0.0, 35.0));

        assert_eq!(player.coins(), 3);
        assert!(player.is_dead());
        assert_eq!(player.position(), Vec2::new(0.0, 35.0));
    }

    #[test]
    fn reset_for_run_restores_health_and_clears_totals() {
        let mut player = player();
        player.add_coins(4);
        player.bank_coins();
        assert_eq!(player.lose_health(), 4);
        player.mark_dead();

        player.reset_for_run(Vec2::new(0.0, 0.0), 5);

        assert_eq!(player.health(), 5);
        assert_eq!(player.overall_coins(), 0);
        assert!(!player.is_dead());
    }
}
