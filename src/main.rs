//! PolyJudge - Command line entry point

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use serde_json::{Map, Value};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use uuid::Uuid;

use polyjudge::{
    codegen::{HarnessGenerator, TypeRegistry},
    config::CONFIG,
    db::{
        self, load_problem_directory,
        repositories::{ProblemRepository, SubmissionRepository},
        MemoryProblemStore, MemorySubmissionStore, PostgresStore, ProblemStore, SubmissionStore,
    },
    models::{CustomInput, Language, ProblemDefinition, RunRequest, SubmitRequest},
    sandbox::{CodeExecutor, Judge0Client},
    JudgingService,
};

#[derive(Parser, Debug)]
#[command(name = "polyjudge", version, about = "Judge function-level solutions in a remote sandbox")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Judge a solution against every test case of a problem
    Submit {
        #[arg(long, short)]
        problem: String,

        #[arg(long, short)]
        language: String,

        #[arg(long, short, default_value = "cli")]
        user: String,

        /// Source file with the solution
        file: PathBuf,
    },
    /// Run a solution once without recording it
    Run {
        #[arg(long, short)]
        problem: String,

        #[arg(long, short)]
        language: String,

        /// Arguments as a JSON object keyed by parameter name
        #[arg(long, conflicts_with = "stdin")]
        args: Option<String>,

        /// Raw stdin; the source is then run without a harness
        #[arg(long)]
        stdin: Option<String>,

        /// Source file with the solution
        file: PathBuf,
    },
    /// Check that every problem can be generated in every language
    CheckTypes {
        /// Only check this problem
        #[arg(long, short)]
        problem: Option<String>,
    },
    /// Load problem documents from the problems directory into PostgreSQL
    Seed,
    /// Print a recorded submission
    Show {
        submission_id: Uuid,
    },
}

/// Problem sources the binary can work against
enum Stores {
    Memory(Arc<MemoryProblemStore>),
    Postgres(PostgresStore),
}

impl Stores {
    async fn open() -> anyhow::Result<Self> {
        match &CONFIG.storage.database_url {
            Some(url) => {
                tracing::info!("Connecting to database...");
                let pool = db::create_pool(url, CONFIG.storage.max_connections)
                    .await
                    .context("Failed to connect to database")?;
                db::test_connection(&pool)
                    .await
                    .context("Database is not answering")?;
                db::run_migrations(&pool)
                    .await
                    .context("Failed to run migrations")?;
                Ok(Self::Postgres(PostgresStore::new(pool)))
            }
            None => {
                let store = load_problem_directory(&CONFIG.storage.problems_path).await?;
                Ok(Self::Memory(Arc::new(store)))
            }
        }
    }

    fn problems(&self) -> Arc<dyn ProblemStore> {
        match self {
            Self::Memory(store) => store.clone(),
            Self::Postgres(store) => Arc::new(store.clone()),
        }
    }

    fn submissions(&self) -> Arc<dyn SubmissionStore> {
        match self {
            Self::Memory(_) => {
                tracing::warn!("No DATABASE_URL set, submissions are kept in memory only");
                Arc::new(MemorySubmissionStore::new())
            }
            Self::Postgres(store) => Arc::new(store.clone()),
        }
    }

    async fn all_problems(&self) -> anyhow::Result<Vec<ProblemDefinition>> {
        match self {
            Self::Memory(store) => Ok(store.list().await),
            Self::Postgres(store) => {
                let mut problems = Vec::new();
                for id in ProblemRepository::list_ids(store.pool()).await? {
                    problems.push(store.get_problem(&id).await?);
                }
                Ok(problems)
            }
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize tracing
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| CONFIG.logging.rust_log.clone().into());
    if CONFIG.logging.json {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    }

    let registry = Arc::new(TypeRegistry::builtin());
    registry.validate().context("Type registry is incomplete")?;
    let generator = HarnessGenerator::new(registry);

    match cli.command {
        Commands::Submit {
            problem,
            language,
            user,
            file,
        } => {
            let code = read_source(&file).await?;
            let stores = Stores::open().await?;
            let service = judging_service(generator, &stores)?;

            let outcome = service
                .submit(&SubmitRequest::new(problem, user, code, language))
                .await?;
            println!("{}", serde_json::to_string_pretty(&outcome)?);
        }
        Commands::Run {
            problem,
            language,
            args,
            stdin,
            file,
        } => {
            let code = read_source(&file).await?;
            let custom_input = match (args, stdin) {
                (Some(raw), _) => {
                    let arguments: Map<String, Value> =
                        serde_json::from_str(&raw).context("--args must be a JSON object")?;
                    CustomInput::Arguments(arguments)
                }
                (None, Some(stdin)) => CustomInput::Stdin(stdin),
                (None, None) => CustomInput::None,
            };
            let stores = Stores::open().await?;
            let service = judging_service(generator, &stores)?;

            let result = service
                .run_single(&RunRequest::new(problem, code, language, custom_input))
                .await?;
            println!("status: {}", result.status.label());
            if !result.message.is_empty() {
                println!("message: {}", result.message.trim());
            }
            if !result.compile_output.is_empty() {
                println!("compile output:\n{}", result.compile_output);
            }
            if !result.stderr.is_empty() {
                println!("stderr:\n{}", result.stderr);
            }
            println!("stdout:\n{}", result.stdout);
        }
        Commands::CheckTypes { problem } => {
            let stores = Stores::open().await?;
            let problems = match problem {
                Some(id) => vec![stores.problems().get_problem(&id).await?],
                None => stores.all_problems().await?,
            };

            let mut failures = 0;
            for problem in &problems {
                for language in Language::ALL {
                    if let Err(e) = generator.generate_all("", language, problem) {
                        failures += 1;
                        println!("{} [{}]: {}", problem.id, language, e);
                    }
                }
            }
            println!(
                "checked {} problems in {} languages, {} failures",
                problems.len(),
                Language::ALL.len(),
                failures
            );
            if failures > 0 {
                bail!("{} problem/language pairs cannot be generated", failures);
            }
        }
        Commands::Seed => {
            let Stores::Postgres(store) = Stores::open().await? else {
                bail!("DATABASE_URL must be set to seed problems");
            };
            let catalog = load_problem_directory(&CONFIG.storage.problems_path).await?;
            let problems = catalog.list().await;
            for problem in &problems {
                ProblemRepository::upsert(store.pool(), problem).await?;
            }
            tracing::info!(count = problems.len(), "Problems seeded");
        }
        Commands::Show { submission_id } => {
            let Stores::Postgres(store) = Stores::open().await? else {
                bail!("DATABASE_URL must be set to read submissions");
            };
            let Some(submission) = SubmissionRepository::find_by_id(store.pool(), &submission_id).await? else {
                bail!("Submission {} not found", submission_id);
            };
            println!("{}", serde_json::to_string_pretty(&submission)?);
        }
    }

    Ok(())
}

fn judging_service(generator: HarnessGenerator, stores: &Stores) -> anyhow::Result<JudgingService> {
    let executor: Arc<dyn CodeExecutor> =
        Arc::new(Judge0Client::new(&CONFIG.sandbox).context("Failed to build sandbox client")?);

    Ok(JudgingService::new(
        generator,
        executor,
        stores.problems(),
        stores.submissions(),
        &CONFIG.judge,
    ))
}

async fn read_source(path: &Path) -> anyhow::Result<String> {
    tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read {}", path.display()))
}
