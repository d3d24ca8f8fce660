//! 物料模型

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::MrpError;

/// 物料類型
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum MaterialType {
    /// 成品
    Finished,
    /// 半成品
    SemiFinished,
    /// 基礎原料
    Raw,
    /// 孤立節點，無法判定
    Unknown,
}

impl MaterialType {
    pub fn label(&self) -> &'static str {
        match self {
            MaterialType::Finished => "Finished",
            MaterialType::SemiFinished => "SemiFinished",
            MaterialType::Raw => "Raw",
            MaterialType::Unknown => "Unknown",
        }
    }
}

impl fmt::Display for MaterialType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for MaterialType {
    type Err = MrpError;

    /// 同時接受英文名稱與舊系統的中文標籤
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "Finished" | "finished" | "成品" => Ok(MaterialType::Finished),
            "SemiFinished" | "semifinished" | "semi_finished" | "半成品" => {
                Ok(MaterialType::SemiFinished)
            }
            "Raw" | "raw" | "基础原料" | "基礎原料" => Ok(MaterialType::Raw),
            "Unknown" | "unknown" | "未知" => Ok(MaterialType::Unknown),
            other => Err(MrpError::Validation(format!("無法識別的物料類型: {other}"))),
        }
    }
}

/// 物料
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Material {
    /// 物料ID
    pub id: String,

    /// 物料類型
    pub material_type: MaterialType,

    /// 描述
    pub description: Option<String>,
}

impl Material {
    pub fn new(id: impl Into<String>, material_type: MaterialType) -> Self {
        Self {
            id: id.into(),
            material_type,
            description: None,
        }
    }

    /// 建構器模式：設置描述
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}
