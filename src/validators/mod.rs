pub mod coins_validator;

pub use coins_validator::{
    CoinsValidator, ValidationOutcome, Violation, ViolationCategory, ViolationKind,
};
