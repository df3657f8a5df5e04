//! 日志模块
//!
//! 基于 log + env_logger 的全局日志初始化。
//! 日志级别优先使用 RUST_LOG 环境变量，未设置时回退到配置文件中的级别。

use once_cell::sync::OnceCell;

use crate::utils::config::LoggingConfig;

/// 初始化标记，保证进程内只初始化一次
static LOGGER_INITIALIZED: OnceCell<()> = OnceCell::new();

/// 初始化全局日志系统
///
/// 重复调用是无害的，后续调用直接返回。
/// `console_output` 关闭时不安装 logger，所有日志宏都是空操作。
pub fn init_logging(config: &LoggingConfig) {
    LOGGER_INITIALIZED.get_or_init(|| {
        if !config.console_output {
            return;
        }

        let env = env_logger::Env::default().default_filter_or(config.log_level.as_str());
        let result = env_logger::Builder::from_env(env)
            .format_timestamp_millis()
            .try_init();

        // 测试场景下可能已有其他 logger，初始化失败时静默跳过
        if result.is_ok() {
            log::info!("日志系统初始化完成, 日志级别: {}", config.log_level);
        }
    });
}

/// 日志系统是否已经初始化
pub fn is_initialized() -> bool {
    LOGGER_INITIALIZED.get().is_some()
}
