// ==========================================
// 表格数据入库工具 - 核心库
// ==========================================
// 一次性批量转换: Excel 工作簿 / 分隔文本 → SQLite 数据表
// 流程: 读取器 → {表名, 行集} → 类型推断 → 建表写入
// ==========================================

// ==========================================
// 模块声明
// ==========================================

// 领域层 - 核心数据模型
pub mod domain;

// 标识符规范化
pub mod identifier;

// 文件读取器
pub mod reader;

// 数据落库层
pub mod sink;

// 入库编排器
pub mod orchestrator;

// 日志系统
pub mod logging;

// 统一错误类型
pub mod error;

// ==========================================
// 重导出核心类型
// ==========================================

pub use domain::{ColumnType, NamedTable, Record, SourceKind};
pub use error::{IngestError, IngestResult};
pub use identifier::{normalize_identifier, normalize_name};
pub use orchestrator::{classify, classify_paths, IngestionOrchestrator, RunConfig};
pub use reader::{read_delimited, read_workbook};
pub use sink::{SqliteSink, TableSink};

// ==========================================
// 常量定义
// ==========================================

// 系统版本
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// 工具名称
pub const APP_NAME: &str = "表格数据入库工具";
