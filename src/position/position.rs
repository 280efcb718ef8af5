use crate::position::Board;
use crate::utils::Color;

/// A parsed chess position. Holds everything a FEN record carries; only the
/// piece placement participates in tensor encoding.
#[derive(Eq, PartialEq, Clone, Debug)]
pub struct Position {
    pub board: Board,
    pub side_to_move: Color,
    pub castling_rights: u8,
    pub double_pawn_push: i8,
    pub halfmove_clock: u16,
    pub fullmove: u16,
}

impl Position {
    pub fn blank() -> Position {
        Position {
            board: Board::blank(),
            side_to_move: Color::White,
            castling_rights: 0b00000000,
            double_pawn_push: -1,
            halfmove_clock: 0,
            fullmove: 1,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_position() {
        let position = Position::blank();
        assert_eq!(position.side_to_move, Color::White);
        assert_eq!(position.castling_rights, 0);
        assert_eq!(position.double_pawn_push, -1);
        assert_eq!(position.board.piece_count(), 0);
    }
}
