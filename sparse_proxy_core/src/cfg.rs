#[derive(Clone, Debug)]
pub struct ProxyCfg {
    /// Ask the poll context for the latest known slot when a flush finds
    /// nothing discovered yet.
    pub fallback_lookup: bool,
}

impl Default for ProxyCfg {
    fn default() -> Self {
        Self {
            fallback_lookup: true,
        }
    }
}
