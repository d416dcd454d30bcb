//! 配置校验模块
//!
//! 校验规则：
//! - 字段范围 (validator derive)：name 非空、history_window >= 0、sub_streams >= 1、dimension >= 1
//! - 至少一路 stream
//! - stream name 唯一
//! - min_interval 模式下 min_interval >= 1
//! - master_slave 模式下至少一路 master
//! - valid_window / predict_window >= 0

use std::collections::HashSet;

use contracts::{Attribute, ContractError, PivotStrategy, SyncBlueprint};
use validator::{Validate, ValidationErrors, ValidationErrorsKind};

/// 校验 SyncBlueprint 配置
///
/// 返回第一个遇到的错误，或 Ok(())。
pub fn validate(blueprint: &SyncBlueprint) -> Result<(), ContractError> {
    validate_fields(blueprint)?;
    validate_streams_present(blueprint)?;
    validate_stream_names(blueprint)?;
    validate_windows(blueprint)?;
    validate_synchronizer(blueprint)?;
    Ok(())
}

/// 字段级校验 (derive)
fn validate_fields(blueprint: &SyncBlueprint) -> Result<(), ContractError> {
    blueprint.validate().map_err(|errors| {
        let (field, message) = first_field_error(&errors, "")
            .unwrap_or_else(|| ("blueprint".to_string(), errors.to_string()));
        ContractError::config_validation(field, message)
    })
}

/// 展开嵌套错误，返回第一个字段路径 (如 `streams[1].sub_streams`) 及其错误码
fn first_field_error(errors: &ValidationErrors, prefix: &str) -> Option<(String, String)> {
    errors.errors().iter().find_map(|(field, kind)| {
        let path = if prefix.is_empty() {
            field.to_string()
        } else {
            format!("{prefix}.{field}")
        };
        match kind {
            ValidationErrorsKind::Field(errs) => errs
                .first()
                .map(|e| (path.clone(), format!("invalid value ({})", e.code))),
            ValidationErrorsKind::Struct(inner) => first_field_error(inner, &path),
            ValidationErrorsKind::List(items) => items
                .iter()
                .find_map(|(idx, inner)| first_field_error(inner, &format!("{path}[{idx}]"))),
        }
    })
}

fn validate_streams_present(blueprint: &SyncBlueprint) -> Result<(), ContractError> {
    if blueprint.streams.is_empty() {
        return Err(ContractError::config_validation(
            "streams",
            "at least one stream is required",
        ));
    }
    Ok(())
}

/// 校验 stream name 唯一性
fn validate_stream_names(blueprint: &SyncBlueprint) -> Result<(), ContractError> {
    let mut seen = HashSet::new();
    for stream in &blueprint.streams {
        if !seen.insert(stream.name.as_str()) {
            return Err(ContractError::config_validation(
                format!("streams[name={}]", stream.name),
                "duplicate stream name",
            ));
        }
    }
    Ok(())
}

/// 校验策略窗口
fn validate_windows(blueprint: &SyncBlueprint) -> Result<(), ContractError> {
    for stream in &blueprint.streams {
        if let Some(window) = stream.retrieval.window() {
            if window < 0 {
                return Err(ContractError::config_validation(
                    format!("streams[{}].{}", stream.name, stream.retrieval.name()),
                    format!("window must be >= 0, got {window}"),
                ));
            }
        }
    }
    Ok(())
}

/// 校验同步模式
fn validate_synchronizer(blueprint: &SyncBlueprint) -> Result<(), ContractError> {
    match blueprint.synchronizer {
        PivotStrategy::MinInterval { min_interval } if min_interval < 1 => {
            Err(ContractError::config_validation(
                "synchronizer.min_interval",
                format!("min_interval must be >= 1, got {min_interval}"),
            ))
        }
        PivotStrategy::MasterSlave
            if !blueprint
                .streams
                .iter()
                .any(|s| s.attribute == Attribute::Master) =>
        {
            Err(ContractError::config_validation(
                "synchronizer.mode",
                "master_slave mode requires at least one stream with attribute = \"master\"",
            ))
        }
        _ => Ok(()),
    }
}
