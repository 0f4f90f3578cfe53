//! Ошибки симуляции
//!
//! Ни одна ошибка не фатальна: API компонентов возвращают `Result`,
//! системы логируют `Err` и продолжают тик.

use std::fmt;

use crate::logger::{log, log_error, log_warning};

#[derive(Debug, Clone, PartialEq)]
pub enum SimulationError {
    /// Не хватает обязательной ссылки (prefab, weapon data, payload).
    /// Фича отключается, остальная симуляция работает.
    Configuration(String),
    /// Операция в текущем состоянии невозможна (reload во время reload,
    /// эффект при полном списке, выстрел под silence).
    InvalidOperation(String),
    /// Мёртвый/несуществующий target передан в мутирующее API.
    StateViolation(String),
}

impl SimulationError {
    pub fn configuration(msg: impl Into<String>) -> Self {
        SimulationError::Configuration(msg.into())
    }

    pub fn invalid(msg: impl Into<String>) -> Self {
        SimulationError::InvalidOperation(msg.into())
    }

    pub fn state(msg: impl Into<String>) -> Self {
        SimulationError::StateViolation(msg.into())
    }

    pub fn is_configuration(&self) -> bool {
        matches!(self, SimulationError::Configuration(_))
    }

    pub fn is_invalid_operation(&self) -> bool {
        matches!(self, SimulationError::InvalidOperation(_))
    }

    pub fn is_state_violation(&self) -> bool {
        matches!(self, SimulationError::StateViolation(_))
    }

    /// Логирует ошибку с уровнем по таксономии:
    /// configuration → error, state violation → warning, invalid operation → debug.
    pub fn log(&self, context: &str) {
        match self {
            SimulationError::Configuration(_) => log_error(&format!("❌ {}: {}", context, self)),
            SimulationError::StateViolation(_) => log_warning(&format!("⚠️ {}: {}", context, self)),
            SimulationError::InvalidOperation(_) => log(&format!("🚫 {}: {}", context, self)),
        }
    }
}

impl fmt::Display for SimulationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SimulationError::Configuration(msg) => write!(f, "configuration error: {}", msg),
            SimulationError::InvalidOperation(msg) => write!(f, "invalid operation: {}", msg),
            SimulationError::StateViolation(msg) => write!(f, "state violation: {}", msg),
        }
    }
}

impl std::error::Error for SimulationError {}

impl From<ron::error::SpannedError> for SimulationError {
    fn from(e: ron::error::SpannedError) -> Self {
        SimulationError::Configuration(format!("RON parse failed: {}", e))
    }
}

pub type SimResult<T> = Result<T, SimulationError>;
