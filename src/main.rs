// ==========================================
// 表格数据入库工具 - 命令行入口
// ==========================================
// 用法: to-sql --excel MySpreadsheet.xlsx
// 退出码: 0 = 全部成功, 1 = 任一阶段失败
// ==========================================

use clap::Parser;
use std::path::PathBuf;
use to_sql::{logging, IngestionOrchestrator, RunConfig, SqliteSink};

/// 将 Excel 工作簿 / 分隔文本批量转换为 SQLite 数据表
#[derive(Parser, Debug)]
#[command(name = "to-sql", version, about)]
struct Cli {
    /// 目标数据库名（缺省时由首个工作簿路径推导）
    #[arg(long)]
    database: Option<String>,

    /// Excel 工作簿路径，每个工作表一张表
    #[arg(long)]
    excel: Option<PathBuf>,

    /// 分隔文本文件路径，每个文件一张表（可重复）
    #[arg(long)]
    sv: Vec<PathBuf>,

    /// 其余输入文件，按扩展名自动分类（.xlsx 为工作簿，其余为分隔文本）
    paths: Vec<PathBuf>,

    /// 输出更详细的日志
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    logging::init(cli.verbose);

    tracing::info!("{} v{}", to_sql::APP_NAME, to_sql::VERSION);

    let config = RunConfig {
        database: cli.database,
        excel: cli.excel,
        sv: cli.sv,
        paths: cli.paths,
    };

    let root = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
    let sink = SqliteSink::new(root);
    let orchestrator = IngestionOrchestrator::new(sink, config);

    match orchestrator.run().await {
        Ok(()) => {
            tracing::info!("DONE");
        }
        Err(err) => {
            tracing::error!("ERROR: {err}");
            std::process::exit(1);
        }
    }
}
