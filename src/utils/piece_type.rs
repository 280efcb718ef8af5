use crate::utils::{Color, ColoredPiece};

#[repr(u8)]
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum PieceType {
    NoPieceType=0,
    Pawn=1,
    Knight=2,
    Bishop=3,
    Rook=4,
    Queen=5,
    King=6
}

const ALL_PIECES: [PieceType; 6] = [
    PieceType::Pawn,
    PieceType::Knight,
    PieceType::Bishop,
    PieceType::Rook,
    PieceType::Queen,
    PieceType::King
];

impl PieceType {
    pub const LIMIT: u8 = 7;
    pub const AllPieceTypes: PieceType = PieceType::NoPieceType;

    pub const unsafe fn from(piece_type_number: u8) -> PieceType {
        assert!(piece_type_number < PieceType::LIMIT, "Piece type number out of bounds");
        std::mem::transmute::<u8, PieceType>(piece_type_number)
    }

    pub const fn to_char(&self) -> char {
        ColoredPiece::from(Color::White, *self).to_char()
    }

    pub fn iter_pieces() -> impl Iterator<Item = PieceType> {
        ALL_PIECES.into_iter()
    }
}
