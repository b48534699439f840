//! Error types for the headless driver

use vizij_spring_core::BridgeError;

#[derive(thiserror::Error, Debug)]
pub enum HeadlessError {
    /// Springs were still moving (or tokens outstanding) after the frame budget ran out
    #[error("engine did not go idle within {frames} frames")]
    DidNotSettle { frames: usize },

    #[error(transparent)]
    Bridge(#[from] BridgeError),
}

pub type Result<T> = std::result::Result<T, HeadlessError>;
