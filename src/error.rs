// ==========================================
// 表格数据入库工具 - 统一错误类型
// ==========================================
// 工具: thiserror 派生宏
// 策略: 所有错误在发生点不可恢复，向上传播到管道边界
// ==========================================

use thiserror::Error;

/// 入库流程错误类型
#[derive(Error, Debug)]
pub enum IngestError {
    // ===== 标识符/配置错误 =====
    #[error("无法推导合法标识符: {0}")]
    InvalidPath(String),

    // ===== 文件相关错误 =====
    #[error("文件不存在: {0}")]
    FileNotFound(String),

    #[error("文件读取失败: {0}")]
    ReadError(String),

    #[error("分隔文本解析失败 ({path}): {message}")]
    ParseError { path: String, message: String },

    // ===== 建表/写库错误 =====
    #[error("列结构推断失败 (表 {table}): {message}")]
    SchemaError { table: String, message: String },

    #[error("数据库写入失败: {0}")]
    WriteError(String),

    #[error("数据库创建失败: {0}")]
    ProvisionError(String),

    // ===== 通用错误 =====
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

// 实现 From<std::io::Error>
impl From<std::io::Error> for IngestError {
    fn from(err: std::io::Error) -> Self {
        match err.kind() {
            std::io::ErrorKind::NotFound => IngestError::FileNotFound(err.to_string()),
            _ => IngestError::ReadError(err.to_string()),
        }
    }
}

// 实现 From<rusqlite::Error>
impl From<rusqlite::Error> for IngestError {
    fn from(err: rusqlite::Error) -> Self {
        IngestError::WriteError(err.to_string())
    }
}

// 实现 From<calamine::XlsxError>
impl From<calamine::XlsxError> for IngestError {
    fn from(err: calamine::XlsxError) -> Self {
        IngestError::ReadError(err.to_string())
    }
}

/// Result 类型别名
pub type IngestResult<T> = Result<T, IngestError>;
