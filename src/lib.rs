pub mod advance;
pub mod collision;
pub mod config;
pub mod game_state;
pub mod growth;
pub mod mesh;
pub mod simulation;
pub mod spline;
pub mod trail;
pub mod wall;
