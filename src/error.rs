//! Error types for adaptive softmax operations.
//!
//! Every failure is a usage error: invalid construction parameters, a
//! batch whose shape does not fit the layer, or a target index that names
//! no class. None of them is recoverable by retrying.

use std::fmt;

/// Common prefix of every cutoff validation message.
pub const CUTOFFS_MESSAGE: &str = "cutoffs should be a sequence of unique, positive integers \
     sorted in an increasing order, where each value is between 1 and n_classes-1";

/// The specific rule a cutoff list broke.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CutoffViolation {
    /// No cutoffs were given; at least one cluster is required.
    Empty,
    /// A cutoff was zero, leaving the shortlist (or a cluster) empty.
    NonPositive {
        /// Position in the cutoff list
        index: usize,
    },
    /// A cutoff repeats the value before it.
    Duplicate {
        /// Position in the cutoff list
        index: usize,
        /// The repeated value
        value: usize,
    },
    /// A cutoff is smaller than the value before it.
    NotIncreasing {
        /// Position in the cutoff list
        index: usize,
        /// Preceding cutoff
        previous: usize,
        /// Offending cutoff
        value: usize,
    },
    /// A cutoff leaves no class for the last cluster (`value > n_classes - 1`).
    OutOfRange {
        /// Position in the cutoff list
        index: usize,
        /// Offending cutoff
        value: usize,
    },
}

impl fmt::Display for CutoffViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CutoffViolation::Empty => write!(f, "no cutoffs given"),
            CutoffViolation::NonPositive { index } => {
                write!(f, "cutoffs[{index}] must be positive")
            }
            CutoffViolation::Duplicate { index, value } => {
                write!(f, "cutoffs[{index}] = {value} is a duplicate")
            }
            CutoffViolation::NotIncreasing {
                index,
                previous,
                value,
            } => write!(
                f,
                "cutoffs[{index}] = {value} is not greater than the previous cutoff {previous}"
            ),
            CutoffViolation::OutOfRange { index, value } => {
                write!(f, "cutoffs[{index}] = {value} exceeds n_classes - 1")
            }
        }
    }
}

/// Main error type for adaptive softmax operations.
///
/// # Examples
///
/// ```
/// use adaptive_softmax::error::AdaptiveSoftmaxError;
///
/// let err = AdaptiveSoftmaxError::ShapeMismatch {
///     expected: "batch=2".to_string(),
///     actual: "3".to_string(),
/// };
/// assert!(err.is_shape_mismatch());
/// assert!(err.to_string().contains("batch=2"));
/// ```
#[derive(Debug, Clone, PartialEq)]
pub enum AdaptiveSoftmaxError {
    /// Cutoff list is not unique, sorted, and inside `(0, n_classes)`.
    InvalidCutoffs {
        /// Cutoffs as provided
        cutoffs: Vec<usize>,
        /// Number of classes of the layer
        n_classes: usize,
        /// First rule that was broken
        violation: CutoffViolation,
    },

    /// Invalid hyperparameter value provided.
    InvalidHyperparameter {
        /// Parameter name
        param: String,
        /// Provided value
        value: String,
        /// Constraint description
        constraint: String,
    },

    /// Input and target shapes don't fit each other or the layer.
    ShapeMismatch {
        /// Expected shape description
        expected: String,
        /// Actual shape found
        actual: String,
    },

    /// A target index names no class.
    TargetOutOfRange {
        /// Number of classes of the layer
        n_classes: usize,
        /// Smallest target in the batch
        min: usize,
        /// Largest target in the batch
        max: usize,
    },
}

impl fmt::Display for AdaptiveSoftmaxError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AdaptiveSoftmaxError::InvalidCutoffs {
                cutoffs,
                n_classes,
                violation,
            } => write!(
                f,
                "{CUTOFFS_MESSAGE} (got {cutoffs:?} for n_classes = {n_classes}: {violation})"
            ),
            AdaptiveSoftmaxError::InvalidHyperparameter {
                param,
                value,
                constraint,
            } => write!(
                f,
                "Invalid hyperparameter: {param} = {value}, expected {constraint}"
            ),
            AdaptiveSoftmaxError::ShapeMismatch { expected, actual } => {
                write!(f, "Shape mismatch: expected {expected}, got {actual}")
            }
            AdaptiveSoftmaxError::TargetOutOfRange {
                n_classes,
                min,
                max,
            } => write!(
                f,
                "Target values should be in [0, {}], but values in range [{min}, {max}] were found.",
                n_classes.saturating_sub(1)
            ),
        }
    }
}

impl std::error::Error for AdaptiveSoftmaxError {}

impl AdaptiveSoftmaxError {
    /// Create a shape mismatch error with descriptive context
    #[must_use]
    pub fn shape_mismatch(context: &str, expected: usize, actual: usize) -> Self {
        Self::ShapeMismatch {
            expected: format!("{context}={expected}"),
            actual: format!("{actual}"),
        }
    }

    /// Create an invalid hyperparameter error
    #[must_use]
    pub fn invalid_hyperparameter(param: &str, value: impl fmt::Display, constraint: &str) -> Self {
        Self::InvalidHyperparameter {
            param: param.to_string(),
            value: value.to_string(),
            constraint: constraint.to_string(),
        }
    }

    /// Invalid cutoffs or hyperparameters given at construction.
    #[must_use]
    pub fn is_configuration_error(&self) -> bool {
        matches!(
            self,
            Self::InvalidCutoffs { .. } | Self::InvalidHyperparameter { .. }
        )
    }

    /// Input/target shapes rejected by `forward`, `log_prob` or `predict`.
    #[must_use]
    pub fn is_shape_mismatch(&self) -> bool {
        matches!(self, Self::ShapeMismatch { .. })
    }

    /// Target index outside `[0, n_classes)`.
    #[must_use]
    pub fn is_range_error(&self) -> bool {
        matches!(self, Self::TargetOutOfRange { .. })
    }

    /// The cutoff rule that failed, if this is a cutoff error.
    #[must_use]
    pub fn cutoff_violation(&self) -> Option<CutoffViolation> {
        match self {
            Self::InvalidCutoffs { violation, .. } => Some(*violation),
            _ => None,
        }
    }
}

/// Convenience type alias for Results.
pub type Result<T> = std::result::Result<T, AdaptiveSoftmaxError>;
