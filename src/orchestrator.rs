// ==========================================
// 表格数据入库工具 - 入库编排器
// ==========================================
// 三阶段: Classify → Provision → Ingest
// - Classify: 输入路径划分为工作簿集 / 分隔文本集（保持输入顺序）
// - Provision: 确定库名并建库，失败则整次运行终止
// - Ingest: 两条管道并发，管道内部严格顺序执行
// ==========================================

use crate::domain::SourceKind;
use crate::error::{IngestError, IngestResult};
use crate::identifier::{normalize_identifier, normalize_name};
use crate::reader::{read_delimited, read_workbook};
use crate::sink::TableSink;
use std::path::{Path, PathBuf};

/// 一次运行的完整配置（不依赖任何全局状态）
#[derive(Debug, Clone, Default)]
pub struct RunConfig {
    /// 目标数据库名；缺省时由首个工作簿路径推导
    pub database: Option<String>,
    /// --excel 指定的工作簿路径
    pub excel: Option<PathBuf>,
    /// --sv 指定的分隔文本路径（可重复）
    pub sv: Vec<PathBuf>,
    /// 其余位置参数，按扩展名分类
    pub paths: Vec<PathBuf>,
}

/// 按扩展名对单个路径分类（与管道逻辑隔离，规则可独立替换）
pub fn classify(path: &Path) -> SourceKind {
    match path.extension().and_then(|e| e.to_str()) {
        Some(ext) if ext.eq_ignore_ascii_case("xlsx") => SourceKind::Workbook,
        _ => SourceKind::Delimited,
    }
}

/// 划分输入路径为 (工作簿集, 分隔文本集)，各自保持输入顺序
pub fn classify_paths(config: &RunConfig) -> (Vec<PathBuf>, Vec<PathBuf>) {
    let mut workbooks: Vec<PathBuf> = config.excel.iter().cloned().collect();
    let mut delimited: Vec<PathBuf> = config.sv.clone();

    for path in &config.paths {
        match classify(path) {
            SourceKind::Workbook => workbooks.push(path.clone()),
            SourceKind::Delimited => delimited.push(path.clone()),
        }
    }
    (workbooks, delimited)
}

/// 入库编排器: 对一组输入文件执行一次完整转换
pub struct IngestionOrchestrator<S: TableSink> {
    sink: S,
    config: RunConfig,
}

impl<S: TableSink> IngestionOrchestrator<S> {
    pub fn new(sink: S, config: RunConfig) -> Self {
        Self { sink, config }
    }

    /// 执行 Classify → Provision → Ingest
    ///
    /// 两条管道并发推进；任一管道出错即整次运行判为失败，
    /// 但另一条管道不被强制取消，自然跑完后才汇总上报。
    /// 已写入的表不回滚（无跨表事务）。
    pub async fn run(&self) -> IngestResult<()> {
        let (workbooks, delimited) = classify_paths(&self.config);
        tracing::debug!(
            "输入分类: {} 个工作簿, {} 个分隔文本",
            workbooks.len(),
            delimited.len()
        );

        let database = self.resolve_database(&workbooks)?;
        tracing::info!("目标数据库: {database}");

        // 建库必须先于任何建表完成
        self.sink.ensure_database(&database).await?;

        let workbook_pipeline = async {
            for path in &workbooks {
                let tables = read_workbook(path)?;
                // 同一工作簿内按工作表顺序落库，再处理下一个路径
                for table in tables {
                    self.sink.create_table(&database, &table).await?;
                }
            }
            Ok::<(), IngestError>(())
        };

        let delimited_pipeline = async {
            for path in &delimited {
                let table = read_delimited(path).await?;
                self.sink.create_table(&database, &table).await?;
            }
            Ok::<(), IngestError>(())
        };

        let (workbook_result, delimited_result) =
            futures::join!(workbook_pipeline, delimited_pipeline);
        workbook_result.and(delimited_result)
    }

    /// 确定目标库名: 显式指定优先，否则取首个工作簿路径的规范化结果
    ///
    /// 显式名称按名称规则规范化（不剥离扩展名），路径按路径规则规范化。
    fn resolve_database(&self, workbooks: &[PathBuf]) -> IngestResult<String> {
        if let Some(name) = &self.config.database {
            return normalize_name(name);
        }
        match workbooks.first() {
            Some(path) => normalize_identifier(&path.to_string_lossy()),
            None => Err(IngestError::InvalidPath(
                "未指定数据库名，且无工作簿路径可供推导".to_string(),
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_by_suffix() {
        assert_eq!(classify(Path::new("a.xlsx")), SourceKind::Workbook);
        assert_eq!(classify(Path::new("a.XLSX")), SourceKind::Workbook);
        assert_eq!(classify(Path::new("a.csv")), SourceKind::Delimited);
        assert_eq!(classify(Path::new("a.tsv")), SourceKind::Delimited);
        assert_eq!(classify(Path::new("noext")), SourceKind::Delimited);
    }

    #[test]
    fn test_classify_paths_preserves_input_order() {
        let config = RunConfig {
            excel: Some(PathBuf::from("main.xlsx")),
            sv: vec![PathBuf::from("first.csv")],
            paths: vec![
                PathBuf::from("extra.xlsx"),
                PathBuf::from("second.tsv"),
                PathBuf::from("third.txt"),
            ],
            ..Default::default()
        };

        let (workbooks, delimited) = classify_paths(&config);
        assert_eq!(
            workbooks,
            vec![PathBuf::from("main.xlsx"), PathBuf::from("extra.xlsx")]
        );
        assert_eq!(
            delimited,
            vec![
                PathBuf::from("first.csv"),
                PathBuf::from("second.tsv"),
                PathBuf::from("third.txt"),
            ]
        );
    }
}
