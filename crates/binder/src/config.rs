/// Knobs of the resolution pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolveConfig {
    /// Leave unresolvable `!(loc.X)`/`!(wix.X)` references in place instead of
    /// failing the build.
    pub allow_unresolved_variables: bool,

    /// Collect `!(bind.X)` references as delayed fields instead of failing.
    pub support_delayed_resolution: bool,
}

impl ResolveConfig {
    pub fn strict() -> Self {
        Self {
            allow_unresolved_variables: false,
            support_delayed_resolution: true,
        }
    }

    pub fn permissive() -> Self {
        Self {
            allow_unresolved_variables: true,
            support_delayed_resolution: true,
        }
    }
}

impl Default for ResolveConfig {
    fn default() -> Self {
        Self::strict()
    }
}
