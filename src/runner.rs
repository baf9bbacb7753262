//! Runner minigame: move across a small grid to reach the target.
//!
//! Every time the runner lands on the target the game reports it and both
//! positions are re-rolled. The quiz turns each hit into a time bonus.

use crate::constants::RUNNER_GRID_SIZE;
use rand::Rng;

/// Cardinal direction for runner movement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    /// Returns the (dx, dy) delta for this direction.
    pub fn delta(&self) -> (i16, i16) {
        match self {
            Self::Up => (0, -1),
            Self::Down => (0, 1),
            Self::Left => (-1, 0),
            Self::Right => (1, 0),
        }
    }
}

/// A position on the grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Position {
    pub x: i16,
    pub y: i16,
}

#[derive(Debug, Clone)]
pub struct RunnerGame {
    pub grid_size: i16,
    pub runner: Position,
    pub target: Position,
    /// Targets reached since the game was created
    pub hits: u32,
}

impl RunnerGame {
    pub fn new<R: Rng + ?Sized>(rng: &mut R) -> Self {
        let mut game = Self {
            grid_size: RUNNER_GRID_SIZE,
            runner: Position { x: 0, y: 0 },
            target: Position { x: 2, y: 2 },
            hits: 0,
        };
        game.respawn(rng);
        game
    }

    /// Re-roll the runner and target onto two distinct random cells.
    pub fn respawn<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        self.runner = random_cell(self.grid_size, rng);
        loop {
            let target = random_cell(self.grid_size, rng);
            if target != self.runner {
                self.target = target;
                return;
            }
        }
    }

    /// Move one cell, clamped at the grid edges. Returns true when the move
    /// lands on the target, after which both positions are re-rolled.
    pub fn step<R: Rng + ?Sized>(&mut self, direction: Direction, rng: &mut R) -> bool {
        let (dx, dy) = direction.delta();
        let max = self.grid_size - 1;
        self.runner = Position {
            x: (self.runner.x + dx).clamp(0, max),
            y: (self.runner.y + dy).clamp(0, max),
        };

        if self.runner == self.target {
            self.hits += 1;
            self.respawn(rng);
            true
        } else {
            false
        }
    }
}

fn random_cell<R: Rng + ?Sized>(grid_size: i16, rng: &mut R) -> Position {
    Position {
        x: rng.gen_range(0..grid_size),
        y: rng.gen_range(0..grid_size),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn in_bounds(game: &RunnerGame, pos: Position) -> bool {
        (0..game.grid_size).contains(&pos.x) && (0..game.grid_size).contains(&pos.y)
    }

    #[test]
    fn test_new_game_positions_distinct() {
        let mut rng = ChaCha8Rng::seed_from_u64(42);
        for _ in 0..100 {
            let game = RunnerGame::new(&mut rng);
            assert_eq!(game.grid_size, 5);
            assert_ne!(game.runner, game.target);
            assert!(in_bounds(&game, game.runner));
            assert!(in_bounds(&game, game.target));
            assert_eq!(game.hits, 0);
        }
    }

    #[test]
    fn test_direction_delta() {
        assert_eq!(Direction::Up.delta(), (0, -1));
        assert_eq!(Direction::Down.delta(), (0, 1));
        assert_eq!(Direction::Left.delta(), (-1, 0));
        assert_eq!(Direction::Right.delta(), (1, 0));
    }

    #[test]
    fn test_move_clamped_at_edges() {
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let mut game = RunnerGame::new(&mut rng);
        game.runner = Position { x: 0, y: 0 };
        game.target = Position { x: 4, y: 4 };

        assert!(!game.step(Direction::Up, &mut rng));
        assert_eq!(game.runner, Position { x: 0, y: 0 });
        assert!(!game.step(Direction::Left, &mut rng));
        assert_eq!(game.runner, Position { x: 0, y: 0 });

        game.runner = Position { x: 4, y: 3 };
        assert!(!game.step(Direction::Right, &mut rng));
        assert_eq!(game.runner, Position { x: 4, y: 3 });
    }

    #[test]
    fn test_reaching_target_reports_and_respawns() {
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        let mut game = RunnerGame::new(&mut rng);
        game.runner = Position { x: 1, y: 2 };
        game.target = Position { x: 2, y: 2 };

        assert!(game.step(Direction::Right, &mut rng));
        assert_eq!(game.hits, 1);
        assert_ne!(game.runner, game.target);
        assert!(in_bounds(&game, game.runner));
        assert!(in_bounds(&game, game.target));
    }

    #[test]
    fn test_walk_to_target_eventually_hits() {
        let mut rng = ChaCha8Rng::seed_from_u64(99);
        let mut game = RunnerGame::new(&mut rng);
        let target = game.target;
        let mut hit = false;
        for _ in 0..10 {
            let dir = if game.runner.x < target.x {
                Direction::Right
            } else if game.runner.x > target.x {
                Direction::Left
            } else if game.runner.y < target.y {
                Direction::Down
            } else {
                Direction::Up
            };
            if game.step(dir, &mut rng) {
                hit = true;
                break;
            }
        }
        assert!(hit);
    }
}
