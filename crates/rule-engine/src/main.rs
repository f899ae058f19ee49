//! 规则引擎命令行入口
//!
//! 加载配置、初始化日志，然后用内置示例规则评估输入。

use anyhow::Result;
use clap::Parser;
use rule_engine::AppConfig;
use rule_engine::cli::runner::CheckOptions;
use rule_engine::cli::{Cli, CommandRunner, Commands};
use rule_engine_shared::observability;

const SERVICE_NAME: &str = "rule-engine";

fn main() -> Result<()> {
    let cli = Cli::parse();

    // 配置加载失败时使用默认值继续运行
    let config = AppConfig::load(SERVICE_NAME).unwrap_or_else(|e| {
        eprintln!("Failed to load config, using defaults: {}", e);
        AppConfig::default()
    });

    let mut obs_config = config.observability.clone().with_service_name(SERVICE_NAME);
    if let Some(level) = cli.log_level {
        obs_config.log_level = level;
    }
    if cli.json_logs {
        obs_config.json_logs = true;
    }
    observability::init(&obs_config)?;

    let runner = CommandRunner::new(config.engine);

    match cli.command {
        Commands::Check {
            input,
            all,
            parallel,
            workers,
            stop_on_any_failure,
            per_operand_messages,
            args,
        } => {
            let options = CheckOptions {
                all,
                parallel,
                workers,
                stop_on_any_failure,
                per_operand_messages,
                args,
            };
            let code = runner.run_check(&input, &options)?;
            std::process::exit(code);
        }
        Commands::Rules => runner.run_rules()?,
    }

    Ok(())
}
