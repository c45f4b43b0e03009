use clap::Parser;
use sales_analysis::core::ConfigProvider;
use sales_analysis::utils::error::{ErrorSeverity, SalesError};
use sales_analysis::utils::{logger, validation::Validate};
use sales_analysis::{AnalysisEngine, CliConfig, LocalStorage, SalesPipeline, TomlConfig};

fn main() {
    let cli = CliConfig::parse();

    // 設定檔先載入，log_level 才能套用到日誌
    let toml_config = cli.config.as_deref().map(TomlConfig::from_file);
    let log_level = toml_config
        .as_ref()
        .and_then(|loaded| loaded.as_ref().ok())
        .and_then(|config| config.log_level())
        .map(str::to_string);

    // 初始化日誌
    if cli.log_json {
        logger::init_json_logger(cli.verbose, log_level.as_deref());
    } else {
        logger::init_cli_logger(cli.verbose, log_level.as_deref());
    }

    tracing::info!("Starting sales-analysis");
    if cli.verbose {
        tracing::debug!("CLI config: {:?}", cli);
    }

    let result = match toml_config {
        Some(loaded) => {
            if let Some(path) = &cli.config {
                tracing::info!("📋 Loading configuration from: {}", path);
            }
            loaded.and_then(|config| {
                let monitor = cli.monitor || config.monitoring_enabled();
                run(config, monitor)
            })
        }
        None => {
            let monitor = cli.monitor;
            run(cli, monitor)
        }
    };

    if let Err(e) = result {
        exit_with(e);
    }
}

fn run<C: ConfigProvider + Validate>(config: C, monitor: bool) -> sales_analysis::Result<()> {
    // 驗證配置
    config.validate()?;

    if monitor {
        tracing::info!("🔍 System monitoring enabled");
    }

    let storage = LocalStorage::new(".");
    let pipeline = SalesPipeline::new(storage, config);
    let mut engine = AnalysisEngine::new_with_monitoring(pipeline, monitor);

    let summary = engine.run()?;

    tracing::info!("✅ Analysis completed successfully!");
    println!("✅ Analysis completed successfully!");
    println!("📄 Report saved to: {}", summary.report_path);
    for chart in summary.charts.iter().filter(|c| !c.is_written()) {
        println!("⚠️  {}: {:?}", chart.chart.title(), chart.status);
    }
    for output in &summary.extra_outputs {
        println!("📁 Also written: {}", output);
    }

    Ok(())
}

fn exit_with(e: SalesError) -> ! {
    tracing::error!(
        "❌ Analysis failed: {} (Category: {:?}, Severity: {:?})",
        e,
        e.category(),
        e.severity()
    );
    tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());

    eprintln!("❌ {}", e.user_friendly_message());
    if e.is_load_failure() {
        eprintln!("Analysis stopped due to data loading error.");
    }
    eprintln!("💡 建議: {}", e.recovery_suggestion());

    // 根據錯誤嚴重程度決定退出碼
    let exit_code = match e.severity() {
        ErrorSeverity::Low => 0,
        ErrorSeverity::Medium => 2,
        ErrorSeverity::High => 1,
        ErrorSeverity::Critical => 3,
    };
    std::process::exit(exit_code);
}
