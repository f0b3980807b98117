/*!
Items related to [logging](log).

The library only emits records through the [log] facade: block growth at
`debug`, pool slot reuse at `trace`, arena resets at `info`, fatal violations at `error`.
Nothing is logged per application.

No log implementation is provided by the library; the `lambdacalc` binary
installs [env_logger](https://docs.rs/env_logger), so `RUST_LOG=arena=debug`
shows arena block growth, for example.
*/

/// Targets to be used within a [log]! macro.
pub mod targets {
    /// Logs related to the [arena](crate::memory::arena)
    pub const ARENA: &str = "arena";

    /// Logs related to the [pool](crate::memory::pool)
    pub const POOL: &str = "pool";

    /// Logs related to [shared ownership](crate::memory::shared)
    pub const REFCOUNT: &str = "refcount";

    /// Logs related to the [evaluator](crate::interpreter::engine)
    pub const EVALUATOR: &str = "evaluator";

    /// Logs related to the [demo](crate::demo) driver
    pub const DEMO: &str = "demo";
}
