// Rating constants
pub const DEFAULT_MU: f64 = 25.0;
pub const DEFAULT_SIGMA: f64 = DEFAULT_MU / 3.0;
pub const BETA: f64 = DEFAULT_SIGMA / 2.0;
pub const KAPPA: f64 = 0.0001;
/// Number of standard deviations subtracted from mu for the ranking score
pub const EXPOSURE_SIGMAS: f64 = 3.0;
// Match placements fed to the model (lower is better)
pub const WINNER_PLACEMENT: usize = 1;
pub const LOSER_PLACEMENT: usize = 2;
