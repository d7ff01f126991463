//! `social-admin`: operator CLI over the identity and social graph services.
#![cfg_attr(not(any(test, doctest)), deny(clippy::unwrap_used))]
#![cfg_attr(not(any(test, doctest)), deny(clippy::expect_used))]

use std::ffi::OsString;
use std::io::{self, BufRead};
use std::sync::Arc;

use clap::{Parser, Subcommand};
use color_eyre::eyre::{Context, Result, eyre};
use mockable::{Clock, DefaultClock};
use ortho_config::OrthoConfig;
use serde::Serialize;
use tokio::runtime::Builder;
use zeroize::Zeroizing;

use social_backend::config::SocialSettings;
use social_backend::domain::ports::{FeedQuery, IdentityStore, RelationshipGraph};
use social_backend::domain::{
    AccountId, FeedService, IdentityService, LoginCredentials, RegistrationRequest,
    RelationshipService,
};
use social_backend::outbound::persistence::{
    DbPool, DieselAccountRepository, DieselPostRepository, DieselRelationshipRepository,
    run_pending_migrations,
};
use social_backend::telemetry::{LogFormat, init_tracing};

/// `social-admin` command arguments.
#[derive(Debug, Parser)]
#[command(
    name = "social-admin",
    about = "Manage accounts, follow edges, and feeds",
    version
)]
struct Cli {
    /// Log encoding written to stderr.
    #[arg(long, value_enum, default_value_t = LogFormat::Json)]
    log_format: LogFormat,
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Apply pending schema migrations.
    Migrate,
    /// Register an account. Reads the password and its confirmation from
    /// the first two lines of stdin.
    Register {
        #[arg(long)]
        name: String,
        #[arg(long)]
        email: String,
    },
    /// Check credentials. Reads the password from the first line of stdin.
    Authenticate {
        #[arg(long)]
        email: String,
    },
    /// Make `follower` follow `followee`.
    Follow { follower: AccountId, followee: AccountId },
    /// Remove the `follower -> followee` edge.
    Unfollow { follower: AccountId, followee: AccountId },
    /// List accounts following `account`.
    Followers { account: AccountId },
    /// List accounts `account` follows.
    Followees { account: AccountId },
    /// Show the feed of `account`.
    Feed { account: AccountId },
    /// List posts written by `account`.
    Posts { account: AccountId },
    /// Grant or revoke administrator status.
    SetAdmin {
        account: AccountId,
        #[arg(long, action = clap::ArgAction::Set, default_value_t = true)]
        admin: bool,
    },
    /// Remove an account with its posts and follow edges.
    Destroy { account: AccountId },
}

type Identity =
    IdentityService<DieselAccountRepository, DieselRelationshipRepository, DieselPostRepository>;
type Graph = RelationshipService<DieselAccountRepository, DieselRelationshipRepository>;
type Feed = FeedService<DieselRelationshipRepository, DieselPostRepository>;

struct Services {
    identity: Identity,
    graph: Graph,
    feed: Feed,
}

fn main() -> Result<()> {
    color_eyre::install()?;
    let cli = Cli::parse();
    init_tracing(cli.log_format);

    let settings = SocialSettings::load_from_iter([OsString::from("social-admin")])
        .map_err(|err| eyre!("failed to load settings: {err}"))?;

    if matches!(cli.command, Command::Migrate) {
        for version in run_pending_migrations(settings.database_url()?)? {
            println!("applied={version}");
        }
        return Ok(());
    }

    let runtime = Builder::new_multi_thread()
        .enable_all()
        .build()
        .wrap_err("failed to build Tokio runtime")?;
    runtime.block_on(async_main(cli.command, settings))
}

async fn async_main(command: Command, settings: SocialSettings) -> Result<()> {
    let services = build_services(&settings).await?;

    match command {
        Command::Migrate => {}
        Command::Register { name, email } => {
            let password = read_secret_line()?;
            let confirmation = read_secret_line()?;
            let request = RegistrationRequest::new(
                name,
                email,
                password.as_str(),
                confirmation.as_str(),
            );
            print_json(&services.identity.register(request).await?)?;
        }
        Command::Authenticate { email } => {
            let password = read_secret_line()?;
            let credentials = LoginCredentials::new(email, password.as_str());
            match services.identity.authenticate(&credentials).await? {
                Some(account) => print_json(&account)?,
                None => return Err(eyre!("invalid email or password")),
            }
        }
        Command::Follow { follower, followee } => {
            services.graph.follow(&follower, &followee).await?;
            println!("following=true");
        }
        Command::Unfollow { follower, followee } => {
            services.graph.unfollow(&follower, &followee).await?;
            println!("following=false");
        }
        Command::Followers { account } => {
            print_json(&services.graph.followers(&account).await?)?;
        }
        Command::Followees { account } => {
            print_json(&services.graph.followees(&account).await?)?;
        }
        Command::Feed { account } => print_json(&services.feed.feed(&account).await?)?,
        Command::Posts { account } => {
            print_json(&services.feed.authored_posts(&account).await?)?;
        }
        Command::SetAdmin { account, admin } => {
            services.identity.set_admin(&account, admin).await?;
            println!("admin={admin}");
        }
        Command::Destroy { account } => {
            services.identity.destroy(&account).await?;
            println!("destroyed={account}");
        }
    }
    Ok(())
}

async fn build_services(settings: &SocialSettings) -> Result<Services> {
    let deadline = settings.storage_deadline()?;
    let pool = DbPool::new(settings.pool_config()?)
        .await
        .wrap_err("failed to create database pool")?;
    let accounts = Arc::new(DieselAccountRepository::new(pool.clone()));
    let relationships = Arc::new(DieselRelationshipRepository::new(pool.clone()));
    let posts = Arc::new(DieselPostRepository::new(pool));
    let clock: Arc<dyn Clock> = Arc::new(DefaultClock);

    Ok(Services {
        identity: IdentityService::new(
            Arc::clone(&accounts),
            Arc::clone(&relationships),
            Arc::clone(&posts),
            settings.authenticator()?,
            Arc::clone(&clock),
        )
        .with_deadline(deadline),
        graph: RelationshipService::new(accounts, Arc::clone(&relationships), clock)
            .with_deadline(deadline),
        feed: FeedService::new(relationships, posts).with_deadline(deadline),
    })
}

fn read_secret_line() -> Result<Zeroizing<String>> {
    let mut line = Zeroizing::new(String::new());
    io::stdin()
        .lock()
        .read_line(&mut line)
        .wrap_err("failed to read password from stdin")?;
    let trimmed = line.trim_end_matches(['\r', '\n']).len();
    line.truncate(trimmed);
    Ok(line)
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    let rendered = serde_json::to_string_pretty(value).wrap_err("failed to render output")?;
    println!("{rendered}");
    Ok(())
}
