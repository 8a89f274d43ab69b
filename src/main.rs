use std::io::IsTerminal;
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Result;
use clap::Parser;
use exam_score_rank::orchestrator::require_ticket_dir;
use exam_score_rank::utils::logging;
use exam_score_rank::{App, AppError, Config, DirectoryError};
use tracing::debug;

/// 查询 1+X 考试成绩并按分数排名
#[derive(Parser, Debug)]
#[command(version)]
struct Cli {
    /// 存放准考证 PDF 文件的文件夹
    dir: Option<PathBuf>,
}

const INVALID_DIR_MESSAGE: &str = "请指定正确的准考证目录";

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    // 加载配置
    let config = Config::from_env();

    // 初始化日志
    logging::init(config.verbose_logging);

    let dir = match require_ticket_dir(cli.dir) {
        Ok(dir) => dir,
        Err(e) => return Ok(reject_dir(&e)),
    };

    let app = App::initialize(config)?;

    match app.run(&dir).await {
        Ok(report) => {
            print!("{}", report.render(std::io::stdout().is_terminal()));
            Ok(ExitCode::SUCCESS)
        }
        Err(AppError::Directory(e)) => Ok(reject_dir(&e)),
        Err(e) => Err(e.into()),
    }
}

/// 目录缺省或无效时统一提示并以失败状态退出
fn reject_dir(e: &DirectoryError) -> ExitCode {
    debug!("{}", e);
    eprintln!("{}", INVALID_DIR_MESSAGE);
    ExitCode::FAILURE
}
