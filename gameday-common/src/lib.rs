pub mod board;
pub mod card;
pub mod config;
pub mod game;
pub mod predict;
pub mod roster;
pub mod teams;

#[cfg(test)]
pub(crate) mod test_util;
