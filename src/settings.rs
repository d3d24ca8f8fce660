//! 參數檔載入

use mrp_core::{MrpError, MrpParameters};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// 參數檔錯誤
#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("無法讀取參數檔 {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("參數檔內容無效: {0}")]
    Invalid(#[from] MrpError),
}

/// 從 JSON 檔載入並驗證 MRP 參數；未列出的欄位使用預設值
pub fn load_parameters(path: impl AsRef<Path>) -> Result<MrpParameters, SettingsError> {
    let path = path.as_ref();
    let json = std::fs::read_to_string(path).map_err(|source| SettingsError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    let params = MrpParameters::from_json_str(&json)?;
    tracing::info!("已載入 MRP 參數: {}", path.display());
    Ok(params)
}
