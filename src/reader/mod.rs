// ==========================================
// 表格数据入库工具 - 文件读取器
// ==========================================
// delimited: 分隔文本 → 单表（异步, I/O 密集）
// workbook:  Excel 工作簿 → 多表（同步, CPU 密集）
// ==========================================

pub mod delimited;
pub mod workbook;

pub use delimited::read_delimited;
pub use workbook::read_workbook;
