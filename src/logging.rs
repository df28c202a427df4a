// ============================================================================
// 日志系统模块
// ============================================================================
// 本模块基于 tracing 框架提供结构化日志：
// - 控制台与按日轮转的文件双路输出，可分别开关
// - RUST_LOG 环境变量优先，否则使用配置级别
// - 过期日志文件自动清理
// - 敏感信息过滤，避免宿主应用传入的凭据落盘
//
// 引擎内部统一使用 tracing 宏记录结构化日志：
// ```rust
// use tracing::{debug, info, warn};
//
// info!(cohort = "cs-2024-a", seed = 42, "单班级生成开始");
// warn!(entry = "cs-2024-a:PH201-lab@2-3", "被挤占条目无法重排");
// ```
// ============================================================================

use std::path::PathBuf;

use tracing::Level;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
    EnvFilter,
};

/// 日志配置
#[derive(Debug, Clone)]
pub struct LogConfig {
    /// 日志级别
    pub level: Level,
    /// 日志目录
    pub log_dir: PathBuf,
    /// 是否输出到控制台
    pub console_output: bool,
    /// 是否输出到文件
    pub file_output: bool,
    /// 日志文件名前缀
    pub file_prefix: String,
    /// 是否包含目标模块
    pub with_target: bool,
    /// 是否包含文件和行号
    pub with_location: bool,
    /// 日志文件保留天数（0 表示不自动清理）
    pub retention_days: u32,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: if cfg!(debug_assertions) {
                Level::DEBUG
            } else {
                Level::INFO
            },
            log_dir: PathBuf::from("logs"),
            console_output: true,
            file_output: true,
            file_prefix: "timetable-engine".to_string(),
            with_target: true,
            with_location: true,
            retention_days: 30,
        }
    }
}

impl LogConfig {
    /// 开发环境配置：调试级别，双路输出，保留 7 天
    pub fn development() -> Self {
        Self {
            level: Level::DEBUG,
            retention_days: 7,
            ..Default::default()
        }
    }

    /// 生产环境配置：信息级别，仅文件输出
    pub fn production() -> Self {
        Self {
            level: Level::INFO,
            console_output: false,
            ..Default::default()
        }
    }

    /// 测试环境配置：仅控制台，不落盘
    pub fn test() -> Self {
        Self {
            level: Level::DEBUG,
            file_output: false,
            retention_days: 0,
            ..Default::default()
        }
    }
}

/// 初始化日志系统
///
/// 根据配置安装 tracing 订阅器。环境变量 RUST_LOG 存在时优先。
///
/// # 参数
/// - `config`: 日志配置
///
/// # 错误
/// 日志目录创建失败或文件滚动器构建失败时返回错误
pub fn init_logging(config: LogConfig) -> Result<(), Box<dyn std::error::Error>> {
    if config.file_output {
        std::fs::create_dir_all(&config.log_dir)?;
        if config.retention_days > 0 {
            cleanup_old_logs(&config.log_dir, &config.file_prefix, config.retention_days)?;
        }
    }

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!(
            "{}={}",
            env!("CARGO_PKG_NAME").replace('-', "_"),
            config.level
        ))
    });

    let console_layer = if config.console_output {
        Some(
            fmt::layer()
                .with_target(config.with_target)
                .with_file(config.with_location)
                .with_line_number(config.with_location)
                .with_span_events(FmtSpan::CLOSE)
                .with_ansi(true)
                .pretty(),
        )
    } else {
        None
    };

    let file_layer = if config.file_output {
        let appender = RollingFileAppender::builder()
            .rotation(Rotation::DAILY)
            .filename_prefix(&config.file_prefix)
            .filename_suffix("log")
            .build(&config.log_dir)?;
        Some(
            fmt::layer()
                .with_writer(appender)
                .with_target(config.with_target)
                .with_file(config.with_location)
                .with_line_number(config.with_location)
                .with_span_events(FmtSpan::CLOSE)
                .with_ansi(false)
                .json(),
        )
    } else {
        None
    };

    tracing_subscriber::registry()
        .with(env_filter)
        .with(console_layer)
        .with(file_layer)
        .init();

    Ok(())
}

/// 快速初始化日志系统
///
/// debug 构建使用开发环境配置，release 构建使用生产环境配置。
/// 初始化失败只打印到标准错误，不阻断引擎使用。
pub fn init_default_logging() {
    let config = if cfg!(debug_assertions) {
        LogConfig::development()
    } else {
        LogConfig::production()
    };

    if let Err(e) = init_logging(config) {
        eprintln!("日志系统初始化失败: {}", e);
    }
}

/// 敏感信息过滤器
///
/// 宿主应用的配置或请求上下文可能混入凭据字段；写入日志前
/// 统一打码。匹配 key=value 与 JSON 两种形态。
pub fn sanitize_sensitive_data(data: &str) -> String {
    let sensitive_keys = ["password", "secret", "token", "api_key", "authorization"];

    let mut result = data.to_string();
    for key in &sensitive_keys {
        let kv = regex::Regex::new(&format!(r"(?i){}=[^&\s]*", key)).unwrap();
        result = kv.replace_all(&result, format!("{}=***", key)).to_string();

        let json = regex::Regex::new(&format!(r#"(?i)"{}"\s*:\s*"[^"]*""#, key)).unwrap();
        result = json
            .replace_all(&result, format!(r#""{}": "***""#, key))
            .to_string();
    }
    result
}

/// 清理超过保留期限的日志文件
///
/// 只处理文件名匹配 `前缀*.log` 的普通文件，按修改时间判断。
pub fn cleanup_old_logs(
    log_dir: &PathBuf,
    file_prefix: &str,
    retention_days: u32,
) -> Result<(), Box<dyn std::error::Error>> {
    use std::time::{SystemTime, UNIX_EPOCH};

    let now = SystemTime::now().duration_since(UNIX_EPOCH)?.as_secs();
    let cutoff = now.saturating_sub(retention_days as u64 * 24 * 60 * 60);

    for entry in std::fs::read_dir(log_dir)? {
        let entry = entry?;
        let path = entry.path();
        if !path.is_file() {
            continue;
        }

        let file_name = path.file_name().and_then(|n| n.to_str()).unwrap_or("");
        if !file_name.starts_with(file_prefix) || !file_name.ends_with(".log") {
            continue;
        }

        let modified = entry
            .metadata()
            .and_then(|m| m.modified())
            .ok()
            .and_then(|m| m.duration_since(UNIX_EPOCH).ok())
            .map(|d| d.as_secs());

        if let Some(modified_secs) = modified {
            if modified_secs < cutoff {
                if let Err(e) = std::fs::remove_file(&path) {
                    eprintln!("删除过期日志文件失败 {:?}: {}", path, e);
                }
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_config_default() {
        let config = LogConfig::default();
        assert!(config.console_output);
        assert!(config.file_output);
        assert_eq!(config.file_prefix, "timetable-engine");
    }

    #[test]
    fn test_log_config_profiles() {
        let dev = LogConfig::development();
        assert_eq!(dev.level, Level::DEBUG);
        assert_eq!(dev.retention_days, 7);

        let prod = LogConfig::production();
        assert_eq!(prod.level, Level::INFO);
        assert!(!prod.console_output);
        assert_eq!(prod.retention_days, 30);

        let test = LogConfig::test();
        assert!(!test.file_output);
        assert_eq!(test.retention_days, 0);
    }

    #[test]
    fn test_sanitize_key_value_form() {
        let data = "user=admin&password=secret123&token=abc";
        let sanitized = sanitize_sensitive_data(data);
        assert!(sanitized.contains("password=***"));
        assert!(sanitized.contains("token=***"));
        assert!(sanitized.contains("user=admin"));
    }

    #[test]
    fn test_sanitize_json_form() {
        let data = r#"{"user": "admin", "password": "secret123", "api_key": "abc"}"#;
        let sanitized = sanitize_sensitive_data(data);
        assert!(sanitized.contains(r#""password": "***""#));
        assert!(sanitized.contains(r#""api_key": "***""#));
        assert!(sanitized.contains(r#""user": "admin""#));
    }

    #[test]
    fn test_cleanup_skips_unrelated_files() {
        use std::fs::File;
        use std::io::Write;
        use tempfile::TempDir;

        let temp_dir = TempDir::new().expect("创建临时目录失败");
        let log_dir = temp_dir.path().to_path_buf();

        let unrelated = log_dir.join("notes.txt");
        File::create(&unrelated)
            .expect("创建文件失败")
            .write_all(b"keep me")
            .expect("写入失败");

        let fresh = log_dir.join("timetable-engine.2026-08-01.log");
        File::create(&fresh)
            .expect("创建日志文件失败")
            .write_all(b"fresh log")
            .expect("写入失败");

        cleanup_old_logs(&log_dir, "timetable-engine", 30).expect("清理执行失败");

        // 新文件与无关文件都不应被删除
        assert!(unrelated.exists());
        assert!(fresh.exists());
    }
}
