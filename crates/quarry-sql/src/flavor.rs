use quarry_core::driver::Capability;

/// The database flavor handles the differences between SQL dialects and
/// supported features.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flavor {
    Postgresql,
    Sqlite,
}

impl Flavor {
    pub fn capability(self) -> &'static Capability {
        match self {
            Self::Postgresql => &Capability::POSTGRESQL,
            Self::Sqlite => &Capability::SQLITE,
        }
    }

    pub fn is_sqlite(self) -> bool {
        matches!(self, Self::Sqlite)
    }
}
