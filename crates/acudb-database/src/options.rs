use std::path::PathBuf;

#[derive(Debug, Clone, Default)]
pub struct LoadOptions {
    /// Directory the `<model><file>` path is resolved against. Defaults to
    /// the working directory, or the database file's directory for
    /// [`crate::PointDatabase::load_file`].
    pub base_dir: Option<PathBuf>,
    /// Moves every point onto a random vertex of the model. Placeholder
    /// data for demos and tests; never saved back deliberately.
    pub random_placement_for_testing: bool,
    /// Seed for the random placement. `None` draws from OS entropy.
    pub seed: Option<u64>,
}
