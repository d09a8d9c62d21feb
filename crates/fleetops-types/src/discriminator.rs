//! Category discriminators
//!
//! A discriminator selects which validation ruleset and workflow branch
//! applies to a record. R.O. is the only kind with a multi-valued one: six
//! occurrence types, each with its own field requirements.

use crate::WorkflowError;
use serde::{Deserialize, Serialize};

/// R.O. occurrence type codes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum RoOccurrenceType {
    Delay = 1,
    Cancellation = 2,
    Deviation = 3,
    TransmissionFailure = 4,
    NonOccurrence = 5,
    DeviationByLine = 6,
}

impl RoOccurrenceType {
    pub const fn code(self) -> u8 {
        self as u8
    }

    pub fn from_code(code: u8) -> Result<Self, WorkflowError> {
        match code {
            1 => Ok(Self::Delay),
            2 => Ok(Self::Cancellation),
            3 => Ok(Self::Deviation),
            4 => Ok(Self::TransmissionFailure),
            5 => Ok(Self::NonOccurrence),
            6 => Ok(Self::DeviationByLine),
            other => Err(WorkflowError::UnknownDiscriminator(other)),
        }
    }

    /// Deviation-by-line reports carry no vehicle fields at all.
    pub fn involves_vehicle(self) -> bool {
        self != Self::DeviationByLine
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_code() {
        assert_eq!(
            RoOccurrenceType::from_code(6).unwrap(),
            RoOccurrenceType::DeviationByLine
        );
        assert!(matches!(
            RoOccurrenceType::from_code(7),
            Err(WorkflowError::UnknownDiscriminator(7))
        ));
    }

    #[test]
    fn test_vehicle_involvement() {
        assert!(RoOccurrenceType::Delay.involves_vehicle());
        assert!(!RoOccurrenceType::DeviationByLine.involves_vehicle());
    }
}
