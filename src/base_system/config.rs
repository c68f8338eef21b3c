//! 配置文件读写：缺省时生成带注释的 `config.yml`，存在时与默认值合并。

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_yaml::{Mapping, Value};
use thiserror::Error;
use tracing::{debug, info};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("io error at {path}: {source}")]
    Io { path: PathBuf, source: io::Error },
    #[error("invalid yaml at {path}: {source}")]
    Parse {
        path: PathBuf,
        source: serde_yaml::Error,
    },
    #[error("validation error: {0}")]
    Validation(String),
}

#[derive(Debug, Clone, Copy)]
pub struct FieldMeta {
    pub name: &'static str,
    pub description: &'static str,
}

pub trait ConfigSpec: Serialize + DeserializeOwned + Default {
    const FILE_NAME: &'static str;
    fn fields() -> &'static [FieldMeta];
}

/// 读取配置；`base_dir` 为 `None` 时使用当前目录。
///
/// 文件不存在时写出默认配置；用户文件缺少字段时以默认值补齐并回写。
pub fn load_or_create<T: ConfigSpec>(base_dir: Option<&Path>) -> Result<T, ConfigError> {
    let path = base_dir
        .map(|dir| dir.join(T::FILE_NAME))
        .unwrap_or_else(|| PathBuf::from(T::FILE_NAME));
    load_or_create_at::<T>(&path)
}

pub fn load_or_create_at<T: ConfigSpec>(path: &Path) -> Result<T, ConfigError> {
    if !path.exists() {
        let default_config = T::default();
        write_with_comments(&default_config, path)?;
        info!("已生成默认配置文件: {}", path.display());
        return Ok(default_config);
    }

    let raw = fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let user_yaml: Value = serde_yaml::from_str(&raw).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })?;
    let missing = missing_fields::<T>(&user_yaml);

    let mut merged = serde_yaml::to_value(T::default())
        .map_err(|err| ConfigError::Validation(err.to_string()))?;
    merge_values(&mut merged, user_yaml);
    let config: T =
        serde_yaml::from_value(merged).map_err(|err| ConfigError::Validation(err.to_string()))?;

    if !missing.is_empty() {
        debug!("配置缺少字段 {:?}，以默认值补齐", missing);
        write_with_comments(&config, path)?;
    }

    Ok(config)
}

pub fn write_with_comments<T: ConfigSpec>(config: &T, path: &Path) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|source| ConfigError::Io {
            path: parent.to_path_buf(),
            source,
        })?;
    }
    let yaml = generate_yaml_with_comments(config)?;
    fs::write(path, yaml).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })
}

pub fn generate_yaml_with_comments<T: ConfigSpec>(config: &T) -> Result<String, ConfigError> {
    let Value::Mapping(mapping) =
        serde_yaml::to_value(config).map_err(|err| ConfigError::Validation(err.to_string()))?
    else {
        return Err(ConfigError::Validation(
            "config must serialize to a mapping".to_string(),
        ));
    };

    let mut lines = Vec::new();
    for field in T::fields() {
        if !field.description.is_empty() {
            lines.push(format!("# {}", field.description.replace('\n', "\n# ")));
        }
        let key = Value::String(field.name.to_string());
        let val = mapping.get(&key).cloned().unwrap_or(Value::Null);
        let yaml_line = serde_yaml::to_string(&Mapping::from_iter([(key, val)]))
            .map_err(|err| ConfigError::Validation(err.to_string()))?;
        lines.push(yaml_line.trim().to_string());
    }

    Ok(lines.join("\n") + "\n")
}

fn missing_fields<T: ConfigSpec>(user_yaml: &Value) -> Vec<&'static str> {
    let Value::Mapping(map) = user_yaml else {
        return T::fields().iter().map(|f| f.name).collect();
    };
    T::fields()
        .iter()
        .filter(|f| !map.contains_key(Value::String(f.name.to_string())))
        .map(|f| f.name)
        .collect()
}

fn merge_values(default: &mut Value, user: Value) {
    match (default, user) {
        (Value::Mapping(dest), Value::Mapping(src)) => {
            for (key, user_val) in src {
                if let Some(dest_val) = dest.get_mut(&key) {
                    merge_values(dest_val, user_val);
                } else {
                    dest.insert(key, user_val);
                }
            }
        }
        // 用户写了空值（例如 `save_path:`）时保留默认值
        (_, Value::Null) => {}
        (dest, other) => {
            *dest = other;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::base_system::context::Config;

    #[test]
    fn creates_commented_default_when_missing() {
        let dir = tempfile::tempdir().unwrap();
        let cfg: Config = load_or_create(Some(dir.path())).unwrap();
        assert_eq!(cfg.model, "qwen-mt-plus");

        let written = fs::read_to_string(dir.path().join("config.yml")).unwrap();
        assert!(written.contains("# 翻译模型"));
        assert!(written.contains("max_chunk_chars: 4000"));
    }

    #[test]
    fn merges_user_values_and_backfills_missing_fields() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.yml");
        fs::write(&path, "model: qwen-turbo-latest\nchapter_delay: 0\n").unwrap();

        let cfg: Config = load_or_create_at(&path).unwrap();
        assert_eq!(cfg.model, "qwen-turbo-latest");
        assert_eq!(cfg.chapter_delay, 0);
        assert_eq!(cfg.translate_max_attempts, 3);

        let rewritten = fs::read_to_string(&path).unwrap();
        assert!(rewritten.contains("model: qwen-turbo-latest"));
        assert!(rewritten.contains("translate_retry_delay: 5"));
    }

    #[test]
    fn reports_invalid_yaml() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.yml");
        fs::write(&path, "model: [unclosed\n").unwrap();

        let err = load_or_create_at::<Config>(&path).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }

    #[test]
    fn wrong_value_type_is_a_validation_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.yml");
        fs::write(&path, "translate_max_attempts: many\n").unwrap();

        let err = load_or_create_at::<Config>(&path).unwrap_err();
        assert!(matches!(err, ConfigError::Validation(_)));
    }
}
