pub mod flow;

pub use flow::{FlowState, OAuthFlow};
