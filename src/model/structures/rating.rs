use crate::model::{
    constants::{DEFAULT_MU, DEFAULT_SIGMA, EXPOSURE_SIGMAS},
    error::ValidationError
};
use serde::{Deserialize, Serialize};

/// A player's skill estimate in one region, stored as the (mu, sigma) pair
/// produced by the rating library.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rating {
    #[serde(default = "default_mu")]
    pub mu: f64,
    #[serde(default = "default_sigma")]
    pub sigma: f64
}

fn default_mu() -> f64 {
    DEFAULT_MU
}

fn default_sigma() -> f64 {
    DEFAULT_SIGMA
}

impl Default for Rating {
    fn default() -> Self {
        Rating {
            mu: DEFAULT_MU,
            sigma: DEFAULT_SIGMA
        }
    }
}

impl Rating {
    pub fn new(mu: f64, sigma: f64) -> Result<Rating, ValidationError> {
        let rating = Rating { mu, sigma };
        rating.validate()?;

        Ok(rating)
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if !self.mu.is_finite() {
            return Err(ValidationError::invalid("Rating", "mu", format!("{} is not finite", self.mu)));
        }

        if !(self.sigma.is_finite() && self.sigma > 0.0) {
            return Err(ValidationError::invalid(
                "Rating",
                "sigma",
                format!("{} must be positive", self.sigma)
            ));
        }

        Ok(())
    }

    pub fn to_external(&self) -> openskill::rating::Rating {
        openskill::rating::Rating {
            mu: self.mu,
            sigma: self.sigma
        }
    }

    pub fn from_external(rating: &openskill::rating::Rating) -> Rating {
        Rating {
            mu: rating.mu,
            sigma: rating.sigma
        }
    }

    /// Conservative skill estimate, the score rankings are sorted by.
    pub fn exposure(&self) -> f64 {
        self.mu - EXPOSURE_SIGMAS * self.sigma
    }
}

impl From<openskill::rating::Rating> for Rating {
    fn from(rating: openskill::rating::Rating) -> Self {
        Rating::from_external(&rating)
    }
}

impl From<Rating> for openskill::rating::Rating {
    fn from(rating: Rating) -> Self {
        rating.to_external()
    }
}
