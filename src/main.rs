use account_import::{
    config::{EntityKind, ExistingPolicy, FieldMapping, ImportConfig, TextEncoding, Verbosity},
    contact::CreateContactRequest,
    engine::{delete_unused_contacts, Importer},
    error::{ConfigError, ImportError},
    progress::ProgressReporter,
    read_header,
    service::HttpAccountService,
    value::CreateValueRequest,
};

use anyhow::Context;
use clap::{Parser, Subcommand};
use env_logger::Env;
use log::{debug, error, info};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

#[derive(Parser, Debug)]
#[command(
    name = "account-import",
    version,
    about = "Import contacts and values from CSV files into the account service"
)]
struct Cli {
    /// How to handle objects that already exist remotely.
    #[arg(long, global = true, default_value = "skip")]
    already_exists: ExistingPolicy,

    /// Validate the file without making any changes.
    #[arg(long, global = true)]
    dry_run: bool,

    #[arg(short, long, global = true, conflicts_with = "quiet")]
    verbose: bool,

    /// Only print warnings and errors.
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Text encoding of the CSV file: ascii, latin1, ucs2, utf16le or utf8.
    #[arg(long, global = true, default_value = "utf8")]
    encoding: TextEncoding,

    #[arg(long, global = true, env = "ACCOUNT_API_KEY", hide_env_values = true)]
    api_key: Option<String>,

    #[arg(
        long,
        global = true,
        env = "ACCOUNT_API_URL",
        default_value = "http://localhost:8080"
    )]
    api_url: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Import contacts.
    Contacts {
        file: PathBuf,
        /// Column holding the contact ID.
        #[arg(long)]
        id: String,
        #[arg(long)]
        email: Option<String>,
        #[arg(long)]
        first_name: Option<String>,
        #[arg(long)]
        last_name: Option<String>,
    },
    /// Import values.
    Values {
        file: PathBuf,
        /// Column holding the value ID.
        #[arg(long)]
        id: String,
        #[arg(long)]
        code: Option<String>,
        #[arg(long)]
        balance: Option<String>,
        #[arg(long)]
        contact_id: Option<String>,
        /// Column holding the currency.
        #[arg(long, required_unless_present = "fixed_currency")]
        currency_column: Option<String>,
        /// Currency to use for every value.
        #[arg(long, conflicts_with = "currency_column")]
        fixed_currency: Option<String>,
    },
    /// Delete all contacts not used in a transaction.
    DeleteContacts,
    /// Show the columns and first row of a CSV file.
    Preview { file: PathBuf },
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let default_filter = if cli.verbose {
        "debug"
    } else if cli.quiet {
        "warn"
    } else {
        "info"
    };
    env_logger::Builder::from_env(Env::default().default_filter_or(default_filter))
        .format_timestamp(None)
        .init();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            // The exit policy has already logged the conflict.
            if !matches!(
                e.downcast_ref::<ImportError>(),
                Some(ImportError::ExistsExit { .. })
            ) {
                error!("{:#}", e);
            }
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let verbosity = if cli.verbose {
        Verbosity::Debug
    } else if cli.quiet {
        Verbosity::Quiet
    } else {
        Verbosity::Info
    };

    let connect = || -> anyhow::Result<HttpAccountService> {
        let api_key = match (&cli.api_key, cli.dry_run) {
            (Some(key), _) => key.clone(),
            (None, true) => String::new(),
            (None, false) => return Err(ConfigError::MissingApiKey.into()),
        };
        Ok(HttpAccountService::new(&cli.api_url, api_key)?)
    };

    if cli.dry_run {
        info!("Dry run is on. Changes *will not* be made.");
    }

    let config = match &cli.command {
        Command::Preview { file } => return preview(file, cli.encoding),
        Command::DeleteContacts => {
            let report = delete_unused_contacts(&connect()?, cli.dry_run).await?;
            debug!("delete report={:?}", report);
            return Ok(());
        }
        Command::Contacts {
            file,
            id,
            email,
            first_name,
            last_name,
        } => {
            let fields = FieldMapping {
                id: Some(id.clone()),
                email: email.clone(),
                first_name: first_name.clone(),
                last_name: last_name.clone(),
                ..Default::default()
            };
            ImportConfig::new(EntityKind::Contact, file, fields)
        }
        Command::Values {
            file,
            id,
            code,
            balance,
            contact_id,
            currency_column,
            fixed_currency,
        } => {
            let fields = FieldMapping {
                id: Some(id.clone()),
                code: code.clone(),
                balance: balance.clone(),
                currency: currency_column.clone(),
                contact_id: contact_id.clone(),
                ..Default::default()
            };
            let mut config = ImportConfig::new(EntityKind::Value, file, fields);
            config.fixed_currency = fixed_currency.clone();
            config
        }
    };

    let config = ImportConfig {
        dry_run: cli.dry_run,
        existing: cli.already_exists,
        encoding: cli.encoding,
        verbosity,
        ..config
    };
    config.validate()?;
    show_example(&config)?;

    let service = connect()?;
    let mut importer = Importer::new(&service, &config, ProgressReporter::stdout(verbosity));
    let report = importer
        .run()
        .await
        .with_context(|| format!("Import of {} stopped", config.source_file.display()))?;
    debug!("import report={:?}", report);

    Ok(())
}

/// Logs the create request the first data row maps to.
fn show_example(config: &ImportConfig) -> anyhow::Result<()> {
    let header = read_header(&config.source_file, config.encoding)
        .with_context(|| format!("Unable to read {}", config.source_file.display()))?;
    let Some(row) = header.first_row else {
        info!("{} has no data rows.", config.source_file.display());
        return Ok(());
    };

    let example = match config.kind {
        EntityKind::Contact => {
            serde_json::to_string(&CreateContactRequest::from_row(&row, &config.fields))?
        }
        EntityKind::Value => serde_json::to_string(&CreateValueRequest::from_row(
            &row,
            &config.fields,
            config.fixed_currency.as_deref(),
        ))?,
    };
    info!("Imported rows will look like {}", example);
    Ok(())
}

fn preview(file: &Path, encoding: TextEncoding) -> anyhow::Result<()> {
    let header = read_header(file, encoding)
        .with_context(|| format!("Unable to read {}", file.display()))?;
    info!("Columns: {}", header.columns.join(", "));
    if let Some(row) = header.first_row {
        info!("First row: {}", serde_json::to_string(&row)?);
    }
    Ok(())
}
