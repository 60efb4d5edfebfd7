use serde::Serialize;
use std::time::{Duration, Instant};
use tracing::{info, warn};

use crate::board::{Board, BoardView, ClickOutcome};
use crate::config::GameConfig;
use crate::piece::Position;
use crate::stats::{StatsError, WinCounts, WinRecorder};

pub const DEFAULT_SQUARE_SIZE: u32 = 100;

/// Drives one board at a time on behalf of the frontend: feeds it clicks and
/// wall-clock time, and forwards each finished game to the win recorder.
pub struct Session {
    config: GameConfig,
    square_size: u32,
    board: Board,
    recorder: Box<dyn WinRecorder>,
    last_tick: Instant,
    games_started: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct SessionView {
    pub game: usize,
    pub board: BoardView,
    pub wins: WinCounts,
}

impl Session {
    pub fn new(config: GameConfig, recorder: Box<dyn WinRecorder>) -> Self {
        let board = Board::with_clock_seconds(config.clock_seconds);
        info!(clock_seconds = config.clock_seconds, "game 1 starting");

        Session {
            config,
            square_size: DEFAULT_SQUARE_SIZE,
            board,
            recorder,
            last_tick: Instant::now(),
            games_started: 1,
        }
    }

    pub fn with_square_size(mut self, square_size: u32) -> Self {
        self.square_size = square_size;
        self
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn games_started(&self) -> usize {
        self.games_started
    }

    pub fn click(&mut self, row: usize, col: usize) -> ClickOutcome {
        let outcome = self.board.handle_click(row, col);
        self.report_outcome();
        outcome
    }

    /// Click at a pointer location; anything off the board is ignored.
    pub fn click_pixel(&mut self, x: u32, y: u32) -> ClickOutcome {
        match Position::from_pixel(x, y, self.square_size) {
            Some(pos) => self.click(pos.row, pos.col),
            None => ClickOutcome::Ignored,
        }
    }

    pub fn toggle_pause(&mut self) -> bool {
        self.board.toggle_pause()
    }

    /// Advance the clocks by the wall time since the previous tick.
    pub fn tick(&mut self) {
        let now = Instant::now();
        let elapsed = now.duration_since(self.last_tick);
        self.last_tick = now;
        self.advance(elapsed);
    }

    pub fn advance(&mut self, elapsed: Duration) {
        self.board.tick(elapsed);
        self.report_outcome();
    }

    /// Throw away the current board and start over. Win counts carry over.
    pub fn new_game(&mut self) {
        self.board = Board::with_clock_seconds(self.config.clock_seconds);
        self.last_tick = Instant::now();
        self.games_started += 1;
        info!(game = self.games_started, "new game starting");
    }

    pub fn wins(&self) -> WinCounts {
        self.recorder.counts()
    }

    pub fn reset_wins(&mut self) -> Result<(), StatsError> {
        self.recorder.reset()?;
        info!("win counts reset");
        Ok(())
    }

    pub fn view(&self) -> SessionView {
        SessionView {
            game: self.games_started,
            board: self.board.view(),
            wins: self.wins(),
        }
    }

    fn report_outcome(&mut self) {
        if let Some(winner) = self.board.take_finished() {
            if let Err(e) = self.recorder.record_win(winner) {
                warn!(%winner, error = %e, "failed to record win");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::GameStatus;
    use crate::piece::Side;
    use crate::stats::MemoryRecorder;

    fn session(clock_seconds: f64) -> Session {
        Session::new(GameConfig { clock_seconds }, Box::new(MemoryRecorder::new()))
    }

    #[test]
    fn test_win_recorded_once() {
        let mut session = session(1.0);

        session.advance(Duration::from_secs(2));
        assert_eq!(session.board().status(), GameStatus::GameOver);
        assert_eq!(session.wins().get(Side::Pink), 1);

        session.advance(Duration::from_secs(2));
        session.click(5, 0);
        assert_eq!(session.wins().get(Side::Pink), 1);
        assert_eq!(session.wins().get(Side::Blue), 0);
    }

    #[test]
    fn test_new_game_keeps_wins() {
        let mut session = session(1.0);
        session.advance(Duration::from_secs(2));

        session.new_game();
        assert_eq!(session.board().status(), GameStatus::Playing);
        assert_eq!(session.board().winner(), None);
        assert_eq!(session.games_started(), 2);
        assert_eq!(session.wins().get(Side::Pink), 1);

        session.advance(Duration::from_secs(2));
        assert_eq!(session.wins().get(Side::Pink), 2);
    }

    #[test]
    fn test_reset_wins() {
        let mut session = session(1.0);
        session.advance(Duration::from_secs(2));
        session.reset_wins().unwrap();
        assert_eq!(session.wins(), WinCounts::default());
    }

    #[test]
    fn test_click_pixel_maps_to_square() {
        let mut session = session(300.0).with_square_size(100);

        assert_eq!(session.click_pixel(50, 550), ClickOutcome::Selected);
        assert_eq!(
            session.board().selected().map(|p| p.position()),
            Some(Position::new(5, 0))
        );
        assert_eq!(session.click_pixel(150, 450), ClickOutcome::Moved);
        assert_eq!(session.board().turn(), Side::Pink);

        // Side panel
        assert_eq!(session.click_pixel(950, 300), ClickOutcome::Ignored);
    }

    #[test]
    fn test_pause_blocks_clicks() {
        let mut session = session(300.0);
        assert!(session.toggle_pause());
        assert_eq!(session.click(5, 0), ClickOutcome::Ignored);
        assert!(!session.toggle_pause());
        assert_eq!(session.click(5, 0), ClickOutcome::Selected);
    }

    #[test]
    fn test_tick_uses_wall_clock() {
        let mut session = session(300.0);
        std::thread::sleep(Duration::from_millis(20));
        session.tick();

        let left = session.board().clock(Side::Blue).time_left();
        assert!(left < 300.0);
        assert!(left > 290.0);
        assert_eq!(session.board().clock(Side::Pink).time_left(), 300.0);
    }

    #[test]
    fn test_view_serializes() {
        let session = session(300.0);
        let json = serde_json::to_value(session.view()).unwrap();

        assert_eq!(json["game"], 1);
        assert_eq!(json["board"]["turn"], "Blue");
        assert_eq!(json["board"]["status"], "Playing");
        assert_eq!(json["wins"]["blue"], 0);
        assert_eq!(json["board"]["cells"].as_array().unwrap().len(), 8);
    }
}
