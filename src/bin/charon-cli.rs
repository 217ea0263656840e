use anyhow::{Context, Result};
use charon_client::{
    API_TOKEN_VAR, BASE_URL_VAR, Config, LibprepFields, ProjectFields, Response, SampleFields, Session,
};
use clap::{Args, Parser, Subcommand};
use serde_json::Value;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(
    name = "charon-cli",
    version,
    about = "Small CLI for the Charon project/sample tracking API"
)]
struct Cli {
    /// Base URL of the Charon service.
    #[arg(long, env = BASE_URL_VAR)]
    base_url: Option<String>,

    /// API token sent in the X-Charon-API-token header.
    #[arg(long, env = API_TOKEN_VAR, hide_env_values = true)]
    api_token: Option<String>,

    /// Emit compact JSON instead of pretty-printed output.
    #[arg(long)]
    compact: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Manage projects.
    #[command(subcommand)]
    Project(ProjectCommand),
    /// Manage samples of a project.
    #[command(subcommand)]
    Sample(SampleCommand),
    /// Manage library preparations of a sample.
    #[command(subcommand)]
    Libprep(LibprepCommand),
}

#[derive(Debug, Subcommand)]
enum ProjectCommand {
    /// Create a project.
    Create {
        projectid: String,
        #[command(flatten)]
        fields: ProjectArgs,
    },
    /// Show one project.
    Get { projectid: String },
    /// Overwrite a project's fields.
    Update {
        projectid: String,
        #[command(flatten)]
        fields: ProjectArgs,
    },
    /// List all projects.
    List,
    /// Delete a project.
    Delete { projectid: String },
}

#[derive(Debug, Subcommand)]
enum SampleCommand {
    /// Create a sample under a project.
    Create {
        projectid: String,
        sampleid: String,
        #[command(flatten)]
        fields: SampleArgs,
    },
    /// Show one sample.
    Get { projectid: String, sampleid: String },
    /// Overwrite a sample's fields.
    Update {
        projectid: String,
        sampleid: String,
        #[command(flatten)]
        fields: SampleArgs,
    },
    /// List the samples of a project.
    List { projectid: String },
}

#[derive(Debug, Subcommand)]
enum LibprepCommand {
    /// Create a library preparation under a sample.
    Create {
        projectid: String,
        sampleid: String,
        libprepid: String,
        #[command(flatten)]
        fields: LibprepArgs,
    },
    /// Show one library preparation.
    Get {
        projectid: String,
        sampleid: String,
        libprepid: String,
    },
    /// Overwrite a library preparation's fields.
    Update {
        projectid: String,
        sampleid: String,
        libprepid: String,
        #[command(flatten)]
        fields: LibprepArgs,
    },
    /// List the library preparations of a sample.
    List { projectid: String, sampleid: String },
}

#[derive(Debug, Args)]
struct ProjectArgs {
    #[arg(long)]
    name: Option<String>,
    #[arg(long)]
    status: Option<String>,
    #[arg(long)]
    pipeline: Option<String>,
    #[arg(long)]
    bpa: Option<String>,
}

#[derive(Debug, Args)]
struct SampleArgs {
    #[arg(long)]
    status: Option<String>,
    #[arg(long)]
    received: Option<String>,
    #[arg(long)]
    qc_status: Option<String>,
    #[arg(long)]
    genotyping_status: Option<String>,
    #[arg(long)]
    genotyping_concordance: Option<f64>,
    #[arg(long)]
    lims_initial_qc: Option<String>,
    #[arg(long)]
    total_autosomal_coverage: Option<f64>,
}

#[derive(Debug, Args)]
struct LibprepArgs {
    #[arg(long)]
    limsid: Option<String>,
    #[arg(long)]
    status: Option<String>,
}

impl From<&ProjectArgs> for ProjectFields {
    fn from(args: &ProjectArgs) -> Self {
        Self {
            name: args.name.clone(),
            status: args.status.clone(),
            pipeline: args.pipeline.clone(),
            bpa: args.bpa.clone(),
        }
    }
}

impl From<&SampleArgs> for SampleFields {
    fn from(args: &SampleArgs) -> Self {
        Self {
            status: args.status.clone(),
            received: args.received.clone(),
            qc_status: args.qc_status.clone(),
            genotyping_status: args.genotyping_status.clone(),
            genotyping_concordance: args.genotyping_concordance,
            lims_initial_qc: args.lims_initial_qc.clone(),
            total_autosomal_coverage: args.total_autosomal_coverage,
        }
    }
}

impl From<&LibprepArgs> for LibprepFields {
    fn from(args: &LibprepArgs) -> Self {
        Self {
            limsid: args.limsid.clone(),
            status: args.status.clone(),
        }
    }
}

/// Entry point for the CLI.
///
/// Resolves the connection config, runs one resource operation and prints the
/// response body.
fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let config = Config::resolve(cli.api_token.clone(), cli.base_url.clone())
        .context("failed to resolve Charon connection settings")?;
    let session = Session::new(config);

    let response = run(&session, &cli.command)?;
    print_body(&response, cli.compact).context("failed to print response body")?;
    Ok(())
}

fn run(session: &Session, command: &Command) -> Result<Response> {
    let response = match command {
        Command::Project(command) => match command {
            ProjectCommand::Create { projectid, fields } => session
                .project_create(projectid, &fields.into())
                .with_context(|| format!("failed to create project '{projectid}'"))?,
            ProjectCommand::Get { projectid } => session
                .project_get(projectid)
                .with_context(|| format!("failed to get project '{projectid}'"))?,
            ProjectCommand::Update { projectid, fields } => session
                .project_update(projectid, &fields.into())
                .with_context(|| format!("failed to update project '{projectid}'"))?,
            ProjectCommand::List => session.projects_get_all().context("failed to list projects")?,
            ProjectCommand::Delete { projectid } => session
                .project_delete(projectid)
                .with_context(|| format!("failed to delete project '{projectid}'"))?,
        },
        Command::Sample(command) => match command {
            SampleCommand::Create {
                projectid,
                sampleid,
                fields,
            } => session
                .sample_create(projectid, sampleid, &fields.into())
                .with_context(|| format!("failed to create sample '{projectid}/{sampleid}'"))?,
            SampleCommand::Get { projectid, sampleid } => session
                .sample_get(projectid, sampleid)
                .with_context(|| format!("failed to get sample '{projectid}/{sampleid}'"))?,
            SampleCommand::Update {
                projectid,
                sampleid,
                fields,
            } => session
                .sample_update(projectid, sampleid, &fields.into())
                .with_context(|| format!("failed to update sample '{projectid}/{sampleid}'"))?,
            SampleCommand::List { projectid } => session
                .samples_get_all(projectid)
                .with_context(|| format!("failed to list samples of project '{projectid}'"))?,
        },
        Command::Libprep(command) => match command {
            LibprepCommand::Create {
                projectid,
                sampleid,
                libprepid,
                fields,
            } => session
                .libprep_create(projectid, sampleid, libprepid, &fields.into())
                .with_context(|| {
                    format!("failed to create libprep '{projectid}/{sampleid}/{libprepid}'")
                })?,
            LibprepCommand::Get {
                projectid,
                sampleid,
                libprepid,
            } => session
                .libprep_get(projectid, sampleid, libprepid)
                .with_context(|| {
                    format!("failed to get libprep '{projectid}/{sampleid}/{libprepid}'")
                })?,
            LibprepCommand::Update {
                projectid,
                sampleid,
                libprepid,
                fields,
            } => session
                .libprep_update(projectid, sampleid, libprepid, &fields.into())
                .with_context(|| {
                    format!("failed to update libprep '{projectid}/{sampleid}/{libprepid}'")
                })?,
            LibprepCommand::List { projectid, sampleid } => session
                .libpreps_get_all(projectid, sampleid)
                .with_context(|| format!("failed to list libpreps of sample '{projectid}/{sampleid}'"))?,
        },
    };
    Ok(response)
}

/// Prints the response body, reformatting it when it is JSON.
fn print_body(response: &Response, compact: bool) -> Result<()> {
    if response.body.trim().is_empty() {
        return Ok(());
    }

    let Ok(value) = serde_json::from_str::<Value>(&response.body) else {
        println!("{}", response.body);
        return Ok(());
    };

    if compact {
        println!(
            "{}",
            serde_json::to_string(&value).context("Failed to render JSON")?
        );
    } else {
        println!(
            "{}",
            serde_json::to_string_pretty(&value).context("Failed to render JSON")?
        );
    }
    Ok(())
}
