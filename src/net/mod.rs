pub mod delta;
pub mod framing;
pub mod game_session;
pub mod protocol;
