//! JSON log sink for native hosts and test rigs.
//!
//! Browsers route `tracing` output through whatever subscriber the embedding
//! application installs; native harnesses call [`init_json`] once.

use tracing_subscriber::EnvFilter;

use crate::error::InteractionError;

/// Install a global JSON `tracing` subscriber filtered by `directives`
/// (e.g. `"vitrine_widgets=debug"`).
pub fn init_json(directives: &str) -> Result<(), InteractionError> {
    let filter =
        EnvFilter::try_new(directives).map_err(|e| InteractionError::Config(e.to_string()))?;
    tracing_subscriber::fmt()
        .json()
        .with_env_filter(filter)
        .try_init()
        .map_err(|e| InteractionError::Config(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn second_install_is_rejected() {
        let _ = init_json("vitrine_core=debug");
        assert!(matches!(init_json("info"), Err(InteractionError::Config(_))));
    }
}
