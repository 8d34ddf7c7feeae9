pub mod connection;
pub mod dating_style;
pub mod life_vision;

use serde::{Deserialize, Serialize};
use sqlx::Type;
use strum_macros::{Display, EnumString};
use ts_rs::TS;

/// Lifecycle of an assessment or session. Rows are created `active` and
/// flipped to `completed` exactly once; there is no rollback.
#[derive(Debug, Clone, Copy, Type, Serialize, Deserialize, PartialEq, Eq, TS, EnumString, Display, Default)]
#[sqlx(rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum AssessmentStatus {
    #[default]
    Active,
    Completed,
}
