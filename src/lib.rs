//! Crate root module declarations for the Plum Arbiter chess referee.
//!
//! Exposes the rule engine (board model, move generation, game-end
//! detection), FEN and UCI notation, the move-suggestion collaborator layer
//! and the interactive game session.

pub mod errors;

pub mod game_state {
    pub mod chess_rules;
    pub mod chess_types;
    pub mod game_state;
    pub mod undo_state;
}

pub mod moves {
    pub mod bishop_moves;
    pub mod king_moves;
    pub mod knight_moves;
    pub mod move_descriptions;
    pub mod pawn_moves;
    pub mod queen_moves;
    pub mod rook_moves;
}

pub mod move_generation {
    pub mod game_end;
    pub mod legal_move_apply;
    pub mod legal_move_checks;
    pub mod legal_move_generator;
    pub mod legal_move_shared;
    pub mod move_generator;
    pub mod perft;
}

pub mod uci {
    pub mod collaborator;
    pub mod process_collaborator;
    pub mod simulated_collaborator;
    pub mod uci_protocol;
}

pub mod engines {
    pub mod engine_backed;
    pub mod engine_heuristic;
    pub mod engine_trait;
    pub mod selection_strategy;
}

pub mod session {
    pub mod game_session;
}

pub mod utils {
    pub mod algebraic;
    pub mod fen_generator;
    pub mod fen_parser;
    pub mod long_algebraic;
    pub mod render_game_state;
}
