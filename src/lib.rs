//! gauntlet - round-robin tournaments between game-playing agents
//!
//! The runner steps through a locked game plan one episode at a time while
//! an external play loop does the actual playing. Rankings come from three
//! independent signals: a weighted win/tie/loss score, Elo on two scales
//! updated after every game, and Glicko-2 applied once per tournament as a
//! single rating period.

pub mod agent;
pub mod config;
pub mod driver;
pub mod game;
pub mod gameplan;
pub mod games;
pub mod rating;
pub mod report;
pub mod runner;
pub mod store;
pub mod timing;
