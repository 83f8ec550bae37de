use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumIter, EnumString};

/// Where a tournament's bracket data was scraped from.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, EnumString, Display)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum SourceType {
    Tio,
    Challonge,
    Smashgg,
    Other
}
