//! `iam-permissions`: report the IAM permission grants of one or all users.
//!
//! For each selected user the tool enumerates attached managed policies,
//! inline policies, and group memberships (with each group's policies), and
//! emits the fetched documents as JSON to the console or a per-user file.

use anyhow::Result;
use clap::{Args, Parser};
use iam_permissions_core::{IamPermissionsService, OutputMode, OutputSink};
use log::info;

#[derive(Parser)]
#[command(
    name = "iam-permissions",
    about = "List IAM permission grants (managed, inline, and group policies) as JSON",
    version
)]
struct Cli {
    #[command(flatten)]
    selection: UserSelection,

    /// 1 = statements-only file, 2 = full-record file, anything else prints to console
    #[arg(short = 'o', long = "outputmode", value_name = "MODE")]
    outputmode: String,
}

#[derive(Args)]
#[group(required = true, multiple = false)]
struct UserSelection {
    /// IAM user name (not ARN)
    #[arg(short = 'u', long = "username", value_name = "NAME")]
    username: Option<String>,

    /// Iterate all IAM users in the account
    #[arg(short = 'a', long = "allusers")]
    allusers: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    let mode = OutputMode::from_flag(&cli.outputmode);
    let today = chrono::Local::now().date_naive();

    let mut service = IamPermissionsService::new().await?;

    if cli.selection.allusers {
        // Strictly sequential: one user fully reported before the next begins.
        for user in service.all_users().await? {
            info!("looking at IAM user '{}'", user);
            let sink = OutputSink::for_user(mode, &user, today);
            service.report_user(&user, &sink).await?;
        }
    } else if let Some(user) = cli.selection.username.as_deref() {
        let sink = OutputSink::for_user(mode, user, today);
        service.report_user(user, &sink).await?;
    }

    Ok(())
}
