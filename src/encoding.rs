//! Bit-plane encoding of chess positions into the (12, 8, 8) input tensor
//! consumed by the evaluation network.
//!
//! Plane order is fixed: planes 0-5 hold the black pawn, knight, bishop,
//! rook, queen and king occupancies, planes 6-11 the white ones in the same
//! piece order. Cell `[plane][row][file]` corresponds to square index
//! `row * 8 + file` with a8 = 0 and h1 = 63.

use tch::Tensor;
use crate::position::{FenParseError, Position};
use crate::utils::{get_squares_from_mask_iter, Bitboard, Color, PieceType};

pub const NUM_PLANES: usize = 12;
pub const PLANE_AREA: usize = 64;
pub const NUM_FEATURES: usize = NUM_PLANES * PLANE_AREA;

const fn plane_base(color: Color) -> usize {
    match color {
        Color::Black => 0,
        Color::White => 6,
    }
}

/// Extracts the 12 occupancy masks of a position in the fixed plane order.
pub fn bit_planes(position: &Position) -> [Bitboard; NUM_PLANES] {
    let mut planes = [0; NUM_PLANES];
    for color in Color::iter() {
        let base = plane_base(color);
        for piece_type in PieceType::iter_pieces() {
            planes[base + piece_type as usize - PieceType::Pawn as usize] =
                position.board.piece_mask(color, piece_type);
        }
    }
    planes
}

/// Expands 12 occupancy masks into a flat 768-cell 0/1 buffer. Works a word
/// at a time: only the set bits of each mask are visited, so the cost scales
/// with the number of pieces rather than 12 x 64 per-square checks.
pub fn unpack_bit_planes(planes: &[Bitboard; NUM_PLANES]) -> [u8; NUM_FEATURES] {
    let mut cells = [0u8; NUM_FEATURES];
    for (plane_index, &mask) in planes.iter().enumerate() {
        let offset = plane_index * PLANE_AREA;
        for square in get_squares_from_mask_iter(mask) {
            cells[offset + square as usize] = 1;
        }
    }
    cells
}

/// Encodes one position into a (12, 8, 8) tensor of 0/1 cells.
pub fn position_to_tensor(position: &Position) -> Tensor {
    let cells = unpack_bit_planes(&bit_planes(position));
    Tensor::from_slice(&cells).view([NUM_PLANES as i64, 8, 8])
}

/// Encodes a batch of positions into a single (N, 12, 8, 8) tensor.
pub fn positions_to_tensor(positions: &[Position]) -> Tensor {
    let mut cells = Vec::with_capacity(positions.len() * NUM_FEATURES);
    for position in positions {
        cells.extend_from_slice(&unpack_bit_planes(&bit_planes(position)));
    }
    Tensor::from_slice(&cells).view([positions.len() as i64, NUM_PLANES as i64, 8, 8])
}

pub fn fen_to_tensor(fen: &str) -> Result<Tensor, FenParseError> {
    let position = Position::from_fen(fen)?;
    Ok(position_to_tensor(&position))
}
