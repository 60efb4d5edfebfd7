use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, info};

use crate::clock::{DEFAULT_CLOCK_SECONDS, GameClock, PlayerClock};
use crate::movegen::{self, Grid, MoveMap};
use crate::piece::{
    BLUE_FIRST_ROW, COLUMNS, PINK_HOME_ROWS, Piece, PieceId, Position, ROWS, Rank, Side,
};
use crate::ranking::rank_captured;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameStatus {
    Playing,
    GameOver,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WinReason {
    /// The loser has no pieces left
    Elimination,
    /// The loser had no legal move on their turn
    NoMoves,
    /// The loser's clock ran out
    Timeout,
}

/// What a click did to the board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ClickOutcome {
    Moved,
    Selected,
    Cleared,
    Ignored,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PieceCounts {
    pub pawns: usize,
    pub kings: usize,
}

impl PieceCounts {
    pub fn total(&self) -> usize {
        self.pawns + self.kings
    }

    fn remove(&mut self, rank: Rank) {
        match rank {
            Rank::Pawn => self.pawns -= 1,
            Rank::King => self.kings -= 1,
        }
    }

    fn promote(&mut self) {
        self.pawns -= 1;
        self.kings += 1;
    }
}

/// A single game of checkers: the grid, whose turn it is, the current
/// selection, both clocks and the outcome once there is one.
///
/// A finished board never goes back to playing; start a new `Board` instead.
#[derive(Debug, Clone)]
pub struct Board {
    grid: Grid,
    status: GameStatus,
    winner: Option<Side>,
    reason: Option<WinReason>,
    turn: Side,
    selected: Option<Position>,
    valid_moves: MoveMap,
    /// Set while the selected piece is in the middle of a capture chain
    mid_capture: bool,
    captured: Vec<Piece>,
    blue_counts: PieceCounts,
    pink_counts: PieceCounts,
    paused: bool,
    blue_clock: PlayerClock,
    pink_clock: PlayerClock,
    game_clock: GameClock,
    outcome_reported: bool,
}

impl Board {
    pub fn new() -> Self {
        Self::with_clock_seconds(DEFAULT_CLOCK_SECONDS)
    }

    /// New game where each side gets `seconds` on its clock.
    pub fn with_clock_seconds(seconds: f64) -> Self {
        let mut board = Board {
            grid: [[None; COLUMNS]; ROWS],
            status: GameStatus::Playing,
            winner: None,
            reason: None,
            turn: Side::Blue,
            selected: None,
            valid_moves: MoveMap::new(),
            mid_capture: false,
            captured: Vec::new(),
            blue_counts: PieceCounts::default(),
            pink_counts: PieceCounts::default(),
            paused: false,
            blue_clock: PlayerClock::new(seconds),
            pink_clock: PlayerClock::new(seconds),
            game_clock: GameClock::new(),
            outcome_reported: false,
        };

        board.setup();
        board.blue_clock.set_active(true);

        board
    }

    fn setup(&mut self) {
        let mut next_id = 0u8;

        for row in 0..ROWS {
            for col in 0..COLUMNS {
                let pos = Position::new(row, col);
                if !pos.is_playable() {
                    continue;
                }

                let side = if row < PINK_HOME_ROWS {
                    Side::Pink
                } else if row >= BLUE_FIRST_ROW {
                    Side::Blue
                } else {
                    continue;
                };

                self.grid[row][col] = Some(Piece::pawn(PieceId(next_id), side, pos));
                next_id += 1;
            }
        }

        self.blue_counts = self.tally(Side::Blue);
        self.pink_counts = self.tally(Side::Pink);
    }

    fn tally(&self, side: Side) -> PieceCounts {
        let mut counts = PieceCounts::default();
        for piece in self.grid.iter().flatten().flatten() {
            if piece.side() == side {
                match piece.rank() {
                    Rank::Pawn => counts.pawns += 1,
                    Rank::King => counts.kings += 1,
                }
            }
        }
        counts
    }

    fn counts_mut(&mut self, side: Side) -> &mut PieceCounts {
        match side {
            Side::Blue => &mut self.blue_counts,
            Side::Pink => &mut self.pink_counts,
        }
    }

    fn clock_mut(&mut self, side: Side) -> &mut PlayerClock {
        match side {
            Side::Blue => &mut self.blue_clock,
            Side::Pink => &mut self.pink_clock,
        }
    }

    pub fn status(&self) -> GameStatus {
        self.status
    }

    pub fn is_game_over(&self) -> bool {
        self.status == GameStatus::GameOver
    }

    pub fn winner(&self) -> Option<Side> {
        self.winner
    }

    pub fn reason(&self) -> Option<WinReason> {
        self.reason
    }

    pub fn turn(&self) -> Side {
        self.turn
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    pub fn is_mid_capture(&self) -> bool {
        self.mid_capture
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    /// The piece on `(row, col)`; `None` for empty or off-board squares.
    pub fn get_piece(&self, row: usize, col: usize) -> Option<Piece> {
        movegen::piece_at(&self.grid, Position::new(row, col))
    }

    pub fn piece_at(&self, pos: Position) -> Option<Piece> {
        movegen::piece_at(&self.grid, pos)
    }

    pub fn selected(&self) -> Option<Piece> {
        self.selected.and_then(|pos| self.piece_at(pos))
    }

    pub fn valid_moves(&self) -> &MoveMap {
        &self.valid_moves
    }

    pub fn destinations(&self) -> Vec<Position> {
        self.valid_moves.keys().copied().collect()
    }

    pub fn valid_moves_for(&self, piece: &Piece) -> MoveMap {
        movegen::valid_moves(piece, &self.grid)
    }

    pub fn all_pieces(&self, side: Side) -> Vec<Piece> {
        self.grid
            .iter()
            .flatten()
            .flatten()
            .filter(|p| p.side() == side)
            .copied()
            .collect()
    }

    pub fn counts(&self, side: Side) -> PieceCounts {
        match side {
            Side::Blue => self.blue_counts,
            Side::Pink => self.pink_counts,
        }
    }

    pub fn pawns(&self, side: Side) -> usize {
        self.counts(side).pawns
    }

    pub fn kings(&self, side: Side) -> usize {
        self.counts(side).kings
    }

    pub fn piece_count(&self, side: Side) -> usize {
        self.counts(side).total()
    }

    pub fn clock(&self, side: Side) -> &PlayerClock {
        match side {
            Side::Blue => &self.blue_clock,
            Side::Pink => &self.pink_clock,
        }
    }

    pub fn game_clock(&self) -> &GameClock {
        &self.game_clock
    }

    /// Every captured piece in capture order.
    pub fn captured(&self) -> &[Piece] {
        &self.captured
    }

    /// Pieces `side` has taken from its opponent, kings first.
    pub fn captured_by(&self, side: Side) -> Vec<Piece> {
        let taken: Vec<Piece> = self
            .captured
            .iter()
            .filter(|p| p.side() == side.opponent())
            .copied()
            .collect();
        rank_captured(&taken)
    }

    /// Select the active side's piece on `(row, col)` and compute where it can
    /// go. Refused while a capture chain is in progress.
    pub fn select(&mut self, row: usize, col: usize) -> bool {
        if self.mid_capture {
            return false;
        }

        let Some(piece) = self.get_piece(row, col) else {
            return false;
        };
        if piece.side() != self.turn {
            return false;
        }

        self.selected = Some(piece.position());
        self.valid_moves = self.valid_moves_for(&piece);
        true
    }

    fn clear_selection(&mut self) {
        self.selected = None;
        self.valid_moves.clear();
        self.mid_capture = false;
    }

    /// Move the selected piece to `(row, col)` if that is one of its listed
    /// destinations. A capture that can be continued keeps the piece selected
    /// with only the further captures listed; the turn passes once no jump
    /// remains.
    pub fn move_to(&mut self, row: usize, col: usize) -> bool {
        let Some(from) = self.selected else {
            return false;
        };
        let to = Position::new(row, col);
        let Some(captures) = self.valid_moves.get(&to).cloned() else {
            return false;
        };
        let Some(mut piece) = self.piece_at(from) else {
            return false;
        };

        for jumped in &captures {
            let pos = jumped.position();
            let cell = &mut self.grid[pos.row][pos.col];
            if cell.is_some_and(|p| p.id() == jumped.id()) {
                if let Some(taken) = cell.take() {
                    self.counts_mut(taken.side()).remove(taken.rank());
                    self.captured.push(taken);
                }
            }
        }

        self.grid[from.row][from.col] = None;
        piece.relocate(to);

        if to.row == piece.side().promotion_row() && piece.promote() {
            self.counts_mut(piece.side()).promote();
            debug!(side = %piece.side(), square = %to, "pawn promoted");
        }

        self.grid[to.row][to.col] = Some(piece);
        self.selected = Some(to);
        debug!(side = %piece.side(), %from, %to, captured = captures.len(), "move");

        if !captures.is_empty() {
            let further = movegen::captures_only(self.valid_moves_for(&piece));
            if !further.is_empty() {
                debug!(square = %to, options = further.len(), "capture chain continues");
                self.valid_moves = further;
                self.mid_capture = true;
                return true;
            }
        }

        self.clear_selection();
        self.change_turn();
        true
    }

    /// Route a click on `(row, col)` to a move or a selection.
    pub fn handle_click(&mut self, row: usize, col: usize) -> ClickOutcome {
        if self.status != GameStatus::Playing || self.paused {
            return ClickOutcome::Ignored;
        }

        if self.selected.is_none() {
            return if self.select(row, col) {
                ClickOutcome::Selected
            } else {
                ClickOutcome::Ignored
            };
        }

        if self.move_to(row, col) {
            return ClickOutcome::Moved;
        }

        // The chaining piece stays selected until its jumps run out
        if self.mid_capture {
            return ClickOutcome::Ignored;
        }

        if self.select(row, col) {
            ClickOutcome::Selected
        } else {
            self.clear_selection();
            ClickOutcome::Cleared
        }
    }

    fn change_turn(&mut self) {
        let current = self.turn;
        self.clock_mut(current).set_active(false);
        self.clock_mut(current.opponent()).set_active(true);
        self.turn = current.opponent();

        self.check_winner();
    }

    fn check_winner(&mut self) {
        if self.piece_count(Side::Blue) == 0 {
            self.finish(Side::Pink, WinReason::Elimination);
            return;
        }
        if self.piece_count(Side::Pink) == 0 {
            self.finish(Side::Blue, WinReason::Elimination);
            return;
        }

        let to_move = self.turn;
        let stuck = self
            .all_pieces(to_move)
            .iter()
            .all(|piece| !movegen::has_any_move(piece, &self.grid));
        if stuck {
            self.finish(to_move.opponent(), WinReason::NoMoves);
        }
    }

    fn finish(&mut self, winner: Side, reason: WinReason) {
        self.status = GameStatus::GameOver;
        self.winner = Some(winner);
        self.reason = Some(reason);
        self.clear_selection();
        self.blue_clock.set_active(false);
        self.pink_clock.set_active(false);

        info!(%winner, ?reason, elapsed = %self.game_clock.format(), "game over");
    }

    /// Suspend or resume the side clocks; clicks are ignored while paused.
    /// Returns the new pause state. A finished game cannot be paused.
    pub fn toggle_pause(&mut self) -> bool {
        if self.is_game_over() {
            return self.paused;
        }

        self.paused = !self.paused;
        if self.paused {
            self.blue_clock.set_active(false);
            self.pink_clock.set_active(false);
        } else {
            let turn = self.turn;
            self.clock_mut(turn).set_active(true);
        }

        debug!(paused = self.paused, "pause toggled");
        self.paused
    }

    /// Advance the clocks by `elapsed` wall time. The overall clock keeps
    /// running through a pause; the side clocks do not. A side whose clock
    /// runs out loses.
    pub fn tick(&mut self, elapsed: Duration) {
        if self.is_game_over() {
            return;
        }

        self.game_clock.advance(elapsed);
        if self.paused {
            return;
        }

        self.blue_clock.update(elapsed);
        self.pink_clock.update(elapsed);

        if self.blue_clock.is_expired() {
            self.finish(Side::Pink, WinReason::Timeout);
        } else if self.pink_clock.is_expired() {
            self.finish(Side::Blue, WinReason::Timeout);
        }
    }

    /// The winner, handed out exactly once per finished game.
    pub fn take_finished(&mut self) -> Option<Side> {
        if self.is_game_over() && !self.outcome_reported {
            self.outcome_reported = true;
            self.winner
        } else {
            None
        }
    }

    /// Get a string representation of the board
    pub fn display_board(&self) -> String {
        let mut result = String::new();
        result.push_str("   ");
        for col in 0..COLUMNS {
            result.push_str(&format!("{:2} ", col));
        }
        result.push('\n');

        for row in 0..ROWS {
            result.push_str(&format!("{:2} ", row));
            for col in 0..COLUMNS {
                let c = match self.grid[row][col] {
                    Some(piece) => piece.symbol(),
                    None => '.',
                };
                result.push_str(&format!(" {} ", c));
            }
            result.push('\n');
        }

        result
    }

    /// Snapshot of everything a renderer needs.
    pub fn view(&self) -> BoardView {
        BoardView {
            cells: self.grid,
            turn: self.turn,
            status: self.status,
            winner: self.winner,
            reason: self.reason,
            paused: self.paused,
            selected: self.selected,
            destinations: self.destinations(),
            mid_capture: self.mid_capture,
            blue: SideView::of(self, Side::Blue),
            pink: SideView::of(self, Side::Pink),
            elapsed: self.game_clock.format(),
        }
    }
}

impl Default for Board {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct SideView {
    pub pawns: usize,
    pub kings: usize,
    pub clock: String,
    pub seconds_left: f64,
    pub clock_running: bool,
    /// Opponent pieces this side has taken, kings first
    pub captured: Vec<Piece>,
}

impl SideView {
    fn of(board: &Board, side: Side) -> Self {
        let clock = board.clock(side);
        SideView {
            pawns: board.pawns(side),
            kings: board.kings(side),
            clock: clock.format(),
            seconds_left: clock.time_left().max(0.0),
            clock_running: clock.is_active(),
            captured: board.captured_by(side),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct BoardView {
    pub cells: Grid,
    pub turn: Side,
    pub status: GameStatus,
    pub winner: Option<Side>,
    pub reason: Option<WinReason>,
    pub paused: bool,
    pub selected: Option<Position>,
    pub destinations: Vec<Position>,
    pub mid_capture: bool,
    pub blue: SideView,
    pub pink: SideView,
    pub elapsed: String,
}
