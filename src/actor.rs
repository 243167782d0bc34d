//! Identity of the authenticated caller performing an attributed mutation.

use std::fmt;
use std::num::NonZeroU64;

use serde::Serialize;

use crate::error::{AppError, AppResult};

/// A validated, non-zero actor id.
///
/// Handlers pass the raw id they extracted from the request; `0` stands for
/// "no authenticated caller". Repositories only ever receive an `ActorId`,
/// so attribution can never be zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct ActorId(NonZeroU64);

impl ActorId {
    /// Validates a raw actor id, failing with `InvalidActor` on zero.
    pub fn require(raw: u64) -> AppResult<Self> {
        NonZeroU64::new(raw).map(Self).ok_or(AppError::InvalidActor)
    }

    pub fn get(self) -> u64 {
        self.0.get()
    }
}

impl TryFrom<Option<u64>> for ActorId {
    type Error = AppError;

    fn try_from(raw: Option<u64>) -> Result<Self, Self::Error> {
        raw.map_or(Err(AppError::InvalidActor), Self::require)
    }
}

impl fmt::Display for ActorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_is_rejected() {
        assert!(matches!(ActorId::require(0), Err(AppError::InvalidActor)));
    }

    #[test]
    fn test_absent_is_rejected() {
        assert!(matches!(ActorId::try_from(None), Err(AppError::InvalidActor)));
    }

    #[test]
    fn test_valid_actor() {
        let actor = ActorId::require(7).unwrap();
        assert_eq!(actor.get(), 7);
        assert_eq!(actor.to_string(), "7");
        assert_eq!(ActorId::try_from(Some(7)).unwrap(), actor);
    }
}
