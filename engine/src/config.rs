//! Engine configuration.
//!
//! Destructive bulk operations are gated by an explicit flag handed to
//! the services at construction time, not read from ambient process
//! state.

/// Configuration shared by the engine services.
#[derive(Debug, Clone, Copy, Default)]
pub struct EngineConfig {
    /// Allow the remove-all-lines operations on carts and orders.
    ///
    /// Default: `false`. Production deployments typically leave these
    /// endpoints disabled.
    pub allow_bulk_line_removal: bool,
}

impl EngineConfig {
    /// Create a configuration with defaults.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            allow_bulk_line_removal: false,
        }
    }

    /// Enable or disable bulk line removal.
    #[must_use]
    pub const fn with_bulk_line_removal(mut self, allow: bool) -> Self {
        self.allow_bulk_line_removal = allow;
        self
    }
}
