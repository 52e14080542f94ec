//! Physics Error Types
//!
//! World edits that can be rejected (capacity, unknown ids, bad constraints)
//! and executor hand-off failures return `Result<T, PhysicsError>`. A rejected
//! edit always leaves the world exactly as it was.

use core::fmt;

/// Unified error type for physics operations.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PhysicsError {
    /// A fixed-capacity store is full.
    CapacityExceeded {
        /// What resource was exhausted
        resource: &'static str,
        /// The capacity of that resource
        limit: usize,
    },
    /// No body with this id is present in the world.
    UnknownBody {
        /// Raw id that was looked up
        id: u32,
    },
    /// A constraint could not be created.
    InvalidConstraint {
        /// Human-readable description of the problem
        reason: &'static str,
    },
    /// Invalid configuration parameter.
    InvalidConfiguration {
        /// Description of the invalid configuration
        reason: &'static str,
    },
    /// The executor is still holding a frame from an earlier `run`.
    ExecutorBusy,
    /// A step frame buffer had the wrong size or alignment.
    MalformedFrame {
        /// Length of the buffer that was provided
        len: usize,
        /// Length a frame requires
        expected: usize,
    },
}

impl fmt::Display for PhysicsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::CapacityExceeded { resource, limit } => {
                write!(f, "{resource} capacity exceeded (limit={limit})")
            }
            Self::UnknownBody { id } => write!(f, "no body with id #{id}"),
            Self::InvalidConstraint { reason } => {
                write!(f, "invalid constraint: {reason}")
            }
            Self::InvalidConfiguration { reason } => {
                write!(f, "invalid configuration: {reason}")
            }
            Self::ExecutorBusy => write!(f, "executor busy: previous frame not collected"),
            Self::MalformedFrame { len, expected } => {
                write!(f, "malformed step frame: {len} bytes (expected {expected})")
            }
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for PhysicsError {}

// ============================================================================
// Tests
// ============================================================================

#[cfg(all(test, feature = "std"))]
mod tests {
    use super::*;

    #[test]
    fn test_capacity_exceeded() {
        let e = PhysicsError::CapacityExceeded {
            resource: "bodies",
            limit: 64,
        };
        let s = format!("{}", e);
        assert!(s.contains("bodies"));
        assert!(s.contains("64"));
    }

    #[test]
    fn test_unknown_body() {
        let s = format!("{}", PhysicsError::UnknownBody { id: 17 });
        assert!(s.contains("#17"));
    }

    #[test]
    fn test_malformed_frame() {
        let e = PhysicsError::MalformedFrame {
            len: 12,
            expected: 4656,
        };
        let s = format!("{}", e);
        assert!(s.contains("12"));
        assert!(s.contains("4656"));
    }

    #[test]
    fn test_error_variants() {
        let e1 = PhysicsError::ExecutorBusy;
        let e2 = PhysicsError::InvalidConstraint {
            reason: "endpoints must differ",
        };
        let e3 = PhysicsError::InvalidConfiguration {
            reason: "percent must be in (0, 1]",
        };
        assert_ne!(e1, e2);
        assert!(format!("{:?}", e1).contains("ExecutorBusy"));
        assert!(format!("{}", e3).contains("percent"));
    }

    #[test]
    fn test_is_std_error() {
        fn takes_error(_: &dyn std::error::Error) {}
        takes_error(&PhysicsError::ExecutorBusy);
    }
}
