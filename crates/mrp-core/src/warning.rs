//! 計算警告

use serde::{Deserialize, Serialize};

/// MRP 警告
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MrpWarning {
    pub component_id: String,
    pub message: String,
    pub severity: WarningSeverity,
}

impl MrpWarning {
    pub fn new(component_id: impl Into<String>, message: impl Into<String>, severity: WarningSeverity) -> Self {
        Self {
            component_id: component_id.into(),
            message: message.into(),
            severity,
        }
    }

    pub fn info(component_id: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(component_id, message, WarningSeverity::Info)
    }

    pub fn warning(component_id: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(component_id, message, WarningSeverity::Warning)
    }

    pub fn error(component_id: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(component_id, message, WarningSeverity::Error)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WarningSeverity {
    Info,
    Warning,
    Error,
}
