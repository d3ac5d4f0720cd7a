use std::process::ExitCode;

use armsdk::{
    cli::{
        args::{CliArgs, Command},
        command_handlers::{do_check, do_install, do_restore, do_status},
    },
    config::ArmsdkConfig,
    SdkManagerBuilder,
};
use clap::Parser;

#[tokio::main]
async fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    match run().await {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            log::error!("{}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run() -> anyhow::Result<bool> {
    let cli_args: CliArgs = CliArgs::parse();
    let config = ArmsdkConfig::load()?;

    let mut builder = SdkManagerBuilder::from_config(config);
    if let Some(sdk_path) = cli_args.sdk_path {
        builder = builder.sdk_path(sdk_path);
    }
    if let Some(project_dir) = cli_args.project_dir {
        builder = builder.project_dir(project_dir);
    }
    if let Some(git) = cli_args.git {
        builder = builder.git_program(git);
    }
    let manager = builder.build();

    match cli_args.cmd {
        Command::Install | Command::Update => do_install(&manager).await,
        Command::Restore => do_restore(&manager),
        Command::Status => do_status(&manager).map(|_| true),
        Command::Check => Ok(do_check(&manager)),
    }
}
