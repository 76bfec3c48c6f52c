pub mod abilities;
pub mod constants;
pub mod intake;
pub mod simulation;
pub mod state;
pub mod systems;
