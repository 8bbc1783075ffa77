use clap::Parser;
use swarm_deployer::utils::{logger, validation::Validate};
use swarm_deployer::{
    CallContext, CliConfig, Command, DeployError, Deployer, DockerClient, ProjectConfig,
};

fn exit_with(e: &DeployError) -> ! {
    tracing::error!("❌ {} (Category: {:?})", e, e.category());
    tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());

    eprintln!("❌ {}", e.user_friendly_message());
    eprintln!("💡 {}", e.recovery_suggestion());
    std::process::exit(e.exit_code());
}

#[tokio::main]
async fn main() {
    let config = CliConfig::parse();

    // 初始化日誌
    if config.json_logs {
        logger::init_json_logger();
    } else {
        logger::init_cli_logger(config.verbose);
    }

    tracing::info!("🚀 Starting swarm-deployer");
    if config.verbose {
        tracing::debug!("CLI config: {:?}", config);
    }

    if let Err(e) = config.validate() {
        exit_with(&e);
    }

    // 載入專案
    tracing::info!("📁 Loading project from: {}", config.file);
    let mut project = match ProjectConfig::from_file(&config.file) {
        Ok(project) => project,
        Err(e) => {
            tracing::error!("Failed to load project file '{}'", config.file);
            exit_with(&e)
        }
    };

    if let Some(name) = &config.project {
        tracing::info!("🔧 Project name overridden to: {}", name);
        project.project.name = name.clone();
    }

    if let Err(e) = project.validate() {
        exit_with(&e);
    }

    let client = match DockerClient::connect(config.host.as_deref(), config.api_version.as_deref())
    {
        Ok(client) => client,
        Err(e) => exit_with(&e),
    };
    let deployer = match Deployer::from_project(&project, client) {
        Ok(deployer) => deployer,
        Err(e) => exit_with(&e),
    };

    // Ctrl-C 取消所有進行中的呼叫
    let ctx = CallContext::with_timeout(config.timeout());
    let interrupt = ctx.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("Interrupted, cancelling remaining calls");
            interrupt.cancel();
        }
    });

    let result = match config.command {
        Command::Up => deployer.up(&ctx).await,
        Command::Down => deployer.down(&ctx).await,
    };

    match result {
        Ok(report) => {
            tracing::info!("✅ {:?} completed for project {}", config.command, report.project);
            println!("{}", report);
        }
        Err(e) => exit_with(&e),
    }
}
