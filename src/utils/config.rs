//! # 配置管理模块
//!
//! 配置加载顺序：内置默认值 -> JSON配置文件 -> `BT_`前缀环境变量。
//! 配置文件允许只写与默认值不同的项；文件不存在时写出一份默认配置，
//! 方便部署后直接修改。

use crate::utils::error::{AppError, AppResult};
use once_cell::sync::OnceCell;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

/// 应用程序主配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// 应用基本信息
    pub app_settings: AppSettings,
    /// 数据存储位置
    pub persistence_config: PersistenceConfig,
    /// CSV报告输出位置
    pub report_config: ReportConfig,
    /// 日志行为
    pub logging_config: LoggingConfig,
}

/// 应用基本信息
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppSettings {
    /// 应用名称，出现在日志和默认文件名中
    pub app_name: String,
    /// 运行环境: development / testing / production
    pub environment: String,
    /// 调试模式开关
    pub debug_mode: bool,
}

/// 数据存储位置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PersistenceConfig {
    /// SQLite数据库文件路径；None时在工作目录下使用默认文件名
    pub database_path: Option<PathBuf>,
}

/// CSV报告输出位置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportConfig {
    /// 报告文件输出目录，不存在时导出前自动创建
    pub reports_dir: PathBuf,
}

/// 日志行为
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// 默认日志级别: debug / info / warn / error
    pub log_level: String,
    /// 是否输出到控制台；关闭后日志宏全部为空操作
    pub console_output: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            app_settings: AppSettings::default(),
            persistence_config: PersistenceConfig::default(),
            report_config: ReportConfig::default(),
            logging_config: LoggingConfig::default(),
        }
    }
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            app_name: "BatteryTest".to_string(),
            environment: "development".to_string(),
            debug_mode: true,
        }
    }
}

impl Default for PersistenceConfig {
    fn default() -> Self {
        Self {
            database_path: None,
        }
    }
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            reports_dir: PathBuf::from("reports"),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            console_output: true,
        }
    }
}

/// 把配置写到指定路径，目录不存在时先创建
async fn write_config_file(config: &AppConfig, path: &Path) -> AppResult<()> {
    if let Some(parent) = path.parent() {
        tokio::fs::create_dir_all(parent).await.map_err(|e| {
            AppError::io_error(format!("创建配置目录失败: {}", e), e.kind().to_string())
        })?;
    }

    let content = serde_json::to_string_pretty(config)?;
    tokio::fs::write(path, content).await.map_err(|e| {
        AppError::io_error(format!("写入配置文件失败: {}", e), e.kind().to_string())
    })
}

/// 配置管理器
///
/// 持有当前配置和它对应的文件路径，负责加载、校验和落盘
pub struct ConfigManager {
    config: AppConfig,
    config_file_path: PathBuf,
}

impl ConfigManager {
    /// 以默认配置创建管理器，不访问文件系统
    pub fn new(config_file_path: PathBuf) -> Self {
        Self {
            config: AppConfig::default(),
            config_file_path,
        }
    }

    /// 从配置文件加载
    ///
    /// 默认值作为底层，再叠加配置文件，文件里缺失的项保持默认。
    /// 配置文件不存在时落一份默认配置并直接返回。
    pub async fn load_from_file(&mut self) -> AppResult<()> {
        if !self.config_file_path.exists() {
            return self.save_to_file().await;
        }

        let defaults = config::Config::try_from(&AppConfig::default())
            .map_err(|e| AppError::configuration_error(format!("构造默认配置失败: {}", e)))?;

        let layered = config::Config::builder()
            .add_source(defaults)
            .add_source(config::File::from(self.config_file_path.clone()))
            .build()
            .map_err(|e| AppError::configuration_error(format!("读取配置文件失败: {}", e)))?;

        self.config = layered
            .try_deserialize()
            .map_err(|e| AppError::configuration_error(format!("解析配置文件失败: {}", e)))?;

        Ok(())
    }

    /// 把当前配置写回配置文件
    pub async fn save_to_file(&self) -> AppResult<()> {
        write_config_file(&self.config, &self.config_file_path).await
    }

    /// 用`BT_`前缀的环境变量覆盖对应配置项
    pub fn override_from_env(&mut self) {
        if let Ok(environment) = std::env::var("BT_ENVIRONMENT") {
            self.config.app_settings.environment = environment;
        }
        if let Ok(debug) = std::env::var("BT_DEBUG_MODE") {
            self.config.app_settings.debug_mode = debug.eq_ignore_ascii_case("true");
        }
        if let Ok(log_level) = std::env::var("BT_LOG_LEVEL") {
            self.config.logging_config.log_level = log_level;
        }
        if let Ok(database_path) = std::env::var("BT_DATABASE_PATH") {
            self.config.persistence_config.database_path = Some(PathBuf::from(database_path));
        }
        if let Ok(reports_dir) = std::env::var("BT_REPORTS_DIR") {
            self.config.report_config.reports_dir = PathBuf::from(reports_dir);
        }
    }

    /// 当前配置的只读引用
    pub fn get_config(&self) -> &AppConfig {
        &self.config
    }

    /// 当前配置的可变引用
    pub fn get_config_mut(&mut self) -> &mut AppConfig {
        &mut self.config
    }

    /// 配置文件路径
    pub fn config_file_path(&self) -> &Path {
        &self.config_file_path
    }

    /// 校验配置取值
    pub fn validate_config(&self) -> AppResult<()> {
        validate_app_config(&self.config)
    }

    /// 丢弃当前配置，恢复为默认值
    pub fn reset_to_default(&mut self) {
        self.config = AppConfig::default();
    }
}

/// 配置取值校验
fn validate_app_config(config: &AppConfig) -> AppResult<()> {
    const VALID_ENVIRONMENTS: [&str; 3] = ["development", "testing", "production"];
    if !VALID_ENVIRONMENTS.contains(&config.app_settings.environment.as_str()) {
        return Err(AppError::configuration_error(format!(
            "无效的运行环境: {}, 有效值: {:?}",
            config.app_settings.environment, VALID_ENVIRONMENTS
        )));
    }

    const VALID_LOG_LEVELS: [&str; 4] = ["debug", "info", "warn", "error"];
    if !VALID_LOG_LEVELS.contains(&config.logging_config.log_level.as_str()) {
        return Err(AppError::configuration_error(format!(
            "无效的日志级别: {}, 有效值: {:?}",
            config.logging_config.log_level, VALID_LOG_LEVELS
        )));
    }

    if config.report_config.reports_dir.as_os_str().is_empty() {
        return Err(AppError::configuration_error("报告输出目录不能为空"));
    }

    Ok(())
}

/// 进程级全局配置，init_global_config成功后可在任意位置读取
static GLOBAL_CONFIG: OnceCell<Mutex<ConfigManager>> = OnceCell::new();

/// 默认配置文件路径
const DEFAULT_CONFIG_FILE: &str = "config/battery_test_config.json";

/// 初始化全局配置：加载 -> 环境变量覆盖 -> 校验 -> 注册为全局实例
///
/// 只允许调用一次，重复初始化返回配置错误
pub async fn init_global_config(config_path: Option<PathBuf>) -> AppResult<()> {
    let config_path = config_path.unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILE));

    let mut manager = ConfigManager::new(config_path);
    manager.load_from_file().await?;
    manager.override_from_env();
    manager.validate_config()?;

    GLOBAL_CONFIG
        .set(Mutex::new(manager))
        .map_err(|_| AppError::configuration_error("全局配置重复初始化"))
}

/// 读取全局配置的快照
pub fn get_global_config() -> AppResult<AppConfig> {
    let manager = GLOBAL_CONFIG
        .get()
        .ok_or_else(|| AppError::configuration_error("全局配置尚未初始化"))?
        .lock()
        .map_err(|_| AppError::concurrency_error("全局配置锁已中毒"))?;

    Ok(manager.get_config().clone())
}

/// 修改全局配置并持久化
///
/// 先在配置副本上应用修改并校验，校验失败时内存中的配置保持原样。
/// 文件写入在锁外进行，避免IO期间占用锁。
pub async fn update_global_config<F>(updater: F) -> AppResult<()>
where
    F: FnOnce(&mut AppConfig),
{
    let handle = GLOBAL_CONFIG
        .get()
        .ok_or_else(|| AppError::configuration_error("全局配置尚未初始化"))?;

    let (snapshot, path) = {
        let mut manager = handle
            .lock()
            .map_err(|_| AppError::concurrency_error("全局配置锁已中毒"))?;

        let mut candidate = manager.get_config().clone();
        updater(&mut candidate);
        validate_app_config(&candidate)?;

        *manager.get_config_mut() = candidate.clone();
        (candidate, manager.config_file_path().to_path_buf())
    };

    write_config_file(&snapshot, &path).await
}
