//! Move generation for checkers pieces.
//!
//! All functions here read a [`Grid`] snapshot and never mutate it. A move is
//! keyed by its destination; the value lists the pieces jumped on the way,
//! in jump order. An empty list marks a plain diagonal step.

use crate::piece::{COLUMNS, Piece, Position, ROWS, directions_for};
use std::collections::BTreeMap;

pub type Grid = [[Option<Piece>; COLUMNS]; ROWS];

/// Destination -> pieces captured on the way there.
pub type MoveMap = BTreeMap<Position, Vec<Piece>>;

pub fn piece_at(grid: &Grid, pos: Position) -> Option<Piece> {
    if pos.in_bounds() {
        grid[pos.row][pos.col]
    } else {
        None
    }
}

fn is_empty(grid: &Grid, pos: Position) -> bool {
    pos.in_bounds() && grid[pos.row][pos.col].is_none()
}

/// Single diagonal steps onto empty squares.
pub fn regular_moves(piece: &Piece, grid: &Grid) -> MoveMap {
    let mut moves = MoveMap::new();
    let from = piece.position();

    for &(dr, dc) in piece.directions() {
        if let Some(to) = from.offset(dr, dc) {
            if is_empty(grid, to) {
                moves.insert(to, Vec::new());
            }
        }
    }

    moves
}

/// Every landing square reachable by one or more jumps, including the
/// intermediate landings of longer chains.
pub fn capture_moves(piece: &Piece, grid: &Grid) -> MoveMap {
    let mut moves = MoveMap::new();
    let from = piece.position();

    for &(dr, dc) in piece.directions() {
        find_captures(piece, grid, from, (dr, dc), &[], &mut moves);
    }

    moves
}

/// Regular and capture moves together. Capturing is never forced: when a
/// jump exists the plain steps are still offered.
pub fn valid_moves(piece: &Piece, grid: &Grid) -> MoveMap {
    let mut moves = regular_moves(piece, grid);
    moves.extend(capture_moves(piece, grid));
    moves
}

/// Only the entries of `moves` that capture something.
pub fn captures_only(moves: MoveMap) -> MoveMap {
    moves
        .into_iter()
        .filter(|(_, captured)| !captured.is_empty())
        .collect()
}

pub fn has_any_move(piece: &Piece, grid: &Grid) -> bool {
    !regular_moves(piece, grid).is_empty() || !capture_moves(piece, grid).is_empty()
}

// Depth-first jump search. `captured` belongs to the current branch only;
// each successful jump hands a fresh extended copy to its children so that
// sibling branches never see each other's captures.
fn find_captures(
    mover: &Piece,
    grid: &Grid,
    from: Position,
    (dr, dc): (isize, isize),
    captured: &[Piece],
    moves: &mut MoveMap,
) {
    let Some(over) = from.offset(dr, dc) else {
        return;
    };
    let Some(enemy) = piece_at(grid, over) else {
        return;
    };
    if enemy.side() == mover.side() || captured.iter().any(|p| p.id() == enemy.id()) {
        return;
    }
    let Some(land) = over.offset(dr, dc) else {
        return;
    };
    if !is_empty(grid, land) {
        return;
    }

    let mut chain = captured.to_vec();
    chain.push(enemy);
    moves.insert(land, chain.clone());

    for &next in directions_for(mover.side(), mover.rank()) {
        find_captures(mover, grid, land, next, &chain, moves);
    }
}
