//! 同步配置解析
//!
//! 将 TOML / JSON 文本反序列化为 `SyncBlueprint`，不做语义校验。

use contracts::{ContractError, SyncBlueprint};

/// 同步配置的文本格式
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    Toml,
    Json,
}

impl ConfigFormat {
    /// 按扩展名识别格式，大小写不敏感
    pub fn from_extension(ext: &str) -> Option<Self> {
        [Self::Toml, Self::Json]
            .into_iter()
            .find(|format| ext.eq_ignore_ascii_case(format.extension()))
    }

    pub fn extension(self) -> &'static str {
        match self {
            Self::Toml => "toml",
            Self::Json => "json",
        }
    }
}

/// 反序列化一份 blueprint，错误信息带上格式名
pub fn parse(content: &str, format: ConfigFormat) -> Result<SyncBlueprint, ContractError> {
    fn wrap<E>(format: ConfigFormat, e: E) -> ContractError
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        ContractError::ConfigParse {
            message: format!("invalid {} blueprint: {e}", format.extension()),
            source: Some(Box::new(e)),
        }
    }

    match format {
        ConfigFormat::Toml => toml::from_str(content).map_err(|e| wrap(format, e)),
        ConfigFormat::Json => serde_json::from_str(content).map_err(|e| wrap(format, e)),
    }
}
