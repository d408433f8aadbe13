//! Runtime-selectable precondition validation.
//!
//! Precondition checks (shape agreement in the permute engine, bounds in
//! view construction) run only in [`Validation::Checked`] mode. With
//! [`Validation::Unchecked`] misuse produces wrong results or a bounds panic
//! from slice indexing; it never reads or writes outside the borrowed
//! storage.
//!
//! The process-wide default is seeded on first use from the
//! `STRIDED_VALIDATE` environment variable (`0`, `off`, `false` or `no`
//! select `Unchecked`; anything else, or unset, selects `Checked`) and can be
//! overridden with [`set_default_validation`].

use std::sync::atomic::{AtomicU8, Ordering};

/// Environment variable that seeds the default validation mode.
pub const VALIDATE_ENV: &str = "STRIDED_VALIDATE";

/// Whether precondition checks run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Validation {
    /// Validate every precondition before touching data.
    #[default]
    Checked,
    /// Skip precondition checks.
    Unchecked,
}

impl Validation {
    #[inline]
    pub fn is_checked(self) -> bool {
        matches!(self, Validation::Checked)
    }

    /// Parse a `STRIDED_VALIDATE` value.
    pub fn from_env_value(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "0" | "off" | "false" | "no" => Validation::Unchecked,
            _ => Validation::Checked,
        }
    }

    fn to_bits(self) -> u8 {
        match self {
            Validation::Checked => CHECKED,
            Validation::Unchecked => UNCHECKED,
        }
    }
}

const UNSET: u8 = 0;
const CHECKED: u8 = 1;
const UNCHECKED: u8 = 2;

static DEFAULT: AtomicU8 = AtomicU8::new(UNSET);

/// Current process-wide validation mode.
pub fn default_validation() -> Validation {
    match DEFAULT.load(Ordering::Relaxed) {
        CHECKED => Validation::Checked,
        UNCHECKED => Validation::Unchecked,
        _ => {
            let seeded = std::env::var(VALIDATE_ENV)
                .map(|v| Validation::from_env_value(&v))
                .unwrap_or_default();
            // An explicit `set_default_validation` racing with seeding wins.
            match DEFAULT.compare_exchange(
                UNSET,
                seeded.to_bits(),
                Ordering::Relaxed,
                Ordering::Relaxed,
            ) {
                Ok(_) => seeded,
                Err(UNCHECKED) => Validation::Unchecked,
                Err(_) => Validation::Checked,
            }
        }
    }
}

/// Override the process-wide validation mode.
pub fn set_default_validation(validation: Validation) {
    tracing::debug!(?validation, "default validation mode set");
    DEFAULT.store(validation.to_bits(), Ordering::Relaxed);
}
