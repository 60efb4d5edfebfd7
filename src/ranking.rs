use crate::piece::Piece;
use std::cmp::Ordering;

/// Higher-valued pieces sort first.
pub fn compare_by_value(a: &Piece, b: &Piece) -> Ordering {
    b.value().cmp(&a.value())
}

/// Order captured pieces for display: kings before pawns, capture order kept
/// within each rank.
pub fn rank_captured(pieces: &[Piece]) -> Vec<Piece> {
    let mut ranked = pieces.to_vec();
    // `sort_by` is stable
    ranked.sort_by(compare_by_value);
    ranked
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::piece::{PieceId, Position, Rank, Side};

    fn piece(id: u8, rank: Rank) -> Piece {
        Piece::new(PieceId(id), Side::Pink, rank, Position::new(0, 1))
    }

    #[test]
    fn test_kings_first_stable() {
        let captured = vec![
            piece(0, Rank::Pawn),
            piece(1, Rank::King),
            piece(2, Rank::Pawn),
            piece(3, Rank::King),
        ];

        let ranked = rank_captured(&captured);
        let order: Vec<u8> = ranked.iter().map(|p| p.id().0).collect();
        assert_eq!(order, vec![1, 3, 0, 2]);
    }

    #[test]
    fn test_empty_and_single() {
        assert!(rank_captured(&[]).is_empty());

        let one = [piece(9, Rank::Pawn)];
        assert_eq!(rank_captured(&one), one.to_vec());
    }

    #[test]
    fn test_input_left_untouched() {
        let captured = vec![piece(0, Rank::Pawn), piece(1, Rank::King)];
        let _ = rank_captured(&captured);
        assert_eq!(captured[0].id(), PieceId(0));
    }
}
