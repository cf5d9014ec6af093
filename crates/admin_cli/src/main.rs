use std::error::Error;

use clap::{Args, Parser, Subcommand, ValueEnum};
use engine::{DetailKind, Engine, EngineError, ReceivablePolicy, UserBalance};
use migration::MigratorTrait;
use sea_orm::{Database, DatabaseConnection};

#[derive(Parser, Debug)]
#[command(name = "sharesplit_admin")]
#[command(about = "Admin utilities for Sharesplit (bootstrap users/categories, balance report)")]
struct Cli {
    /// Database connection string (also read from `DATABASE_URL`).
    #[arg(
        long,
        env = "DATABASE_URL",
        default_value = "sqlite:./sharesplit.db?mode=rwc"
    )]
    database_url: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    User(User),
    Category(Category),
    /// Print the balance report of every user.
    Balances(BalancesArgs),
}

#[derive(Args, Debug)]
struct User {
    #[command(subcommand)]
    command: UserCommand,
}

#[derive(Subcommand, Debug)]
enum UserCommand {
    Create(UserCreateArgs),
    List,
}

#[derive(Args, Debug)]
struct UserCreateArgs {
    #[arg(long)]
    name: String,
}

#[derive(Args, Debug)]
struct Category {
    #[command(subcommand)]
    command: CategoryCommand,
}

#[derive(Subcommand, Debug)]
enum CategoryCommand {
    /// Create the default categories if none exists yet.
    InitDefaults,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum Receivables {
    Full,
    Proportional,
}

#[derive(Args, Debug)]
struct BalancesArgs {
    /// Print the report as JSON.
    #[arg(long)]
    json: bool,
    #[arg(long, value_enum, default_value = "full")]
    receivables: Receivables,
}

async fn connect_db(
    database_url: &str,
) -> Result<DatabaseConnection, Box<dyn Error + Send + Sync>> {
    let db = Database::connect(database_url).await?;
    migration::Migrator::up(&db, None).await?;
    Ok(db)
}

fn print_report(report: &[UserBalance]) {
    for entry in report {
        println!(
            "{}: paid {} owed {} balance {}",
            entry.user_name, entry.total_paid, entry.total_owed, entry.balance
        );
        for detail in &entry.details {
            let direction = match detail.kind {
                DetailKind::ShouldReceive => "from",
                DetailKind::Owed => "to",
            };
            println!(
                "  {:<14} {:>10} {direction} {}",
                detail.kind.as_str(),
                detail.amount.to_string(),
                detail.related_user
            );
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error + Send + Sync>> {
    let cli = Cli::parse();

    let db = connect_db(&cli.database_url).await?;

    match cli.command {
        Command::User(User {
            command: UserCommand::Create(args),
        }) => {
            let engine = Engine::builder().database(db).build().await?;
            match engine.create_user(&args.name).await {
                Ok(user) => println!("created user: {} ({})", user.name, user.id),
                Err(EngineError::ExistingKey(name)) => {
                    eprintln!("user already exists: {name}");
                    std::process::exit(1);
                }
                Err(err) => return Err(err.into()),
            }
        }
        Command::User(User {
            command: UserCommand::List,
        }) => {
            let engine = Engine::builder().database(db).build().await?;
            for user in engine.list_users().await? {
                println!("{}\t{}", user.id, user.name);
            }
        }
        Command::Category(Category {
            command: CategoryCommand::InitDefaults,
        }) => {
            let engine = Engine::builder().database(db).build().await?;
            let created = engine.init_default_categories().await?;
            if created == 0 {
                println!("categories already present, nothing created");
            } else {
                println!("created {created} default categories");
            }
        }
        Command::Balances(args) => {
            let policy = match args.receivables {
                Receivables::Full => ReceivablePolicy::Full,
                Receivables::Proportional => ReceivablePolicy::Proportional,
            };
            let engine = Engine::builder()
                .database(db)
                .receivable_policy(policy)
                .build()
                .await?;
            let report = engine.balances().await?;
            if args.json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                print_report(&report);
            }
        }
    }

    Ok(())
}
