use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand, ValueEnum};
use pickle_rick::resolver::{EnvHandler, LambdaHandler};
use pickle_rick::{Node, ResolverRegistry, Source, TreeBuilder, Value, storage};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "rick", about = "Query and convert YAML/JSON documents")]
struct Cli {
    /// Path to a YAML/JSON file, inline YAML/JSON text, or `-` for stdin
    source: String,

    /// Internalize mappings found inside lists
    #[arg(long, env = "RICK_DEEP")]
    deep: bool,

    /// Resolve `type: env` and `type: lambda` placeholders
    #[arg(long)]
    resolve: bool,

    /// Run `type: lambda` placeholders as shell commands (implies --resolve)
    #[arg(long, env = "RICK_LOAD_LAMBDA")]
    load_lambda: bool,

    /// Fail when an `env` placeholder names an unset variable with no default
    #[arg(long)]
    strict_env: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    Get {
        key: String,
    },
    Has {
        key: String,
        #[arg(long)]
        deep: bool,
    },
    Keys,
    Dump {
        #[arg(long, value_enum, default_value_t = Format::Yaml)]
        format: Format,
        #[arg(long)]
        output: Option<String>,
        /// Overwrite an existing output file
        #[arg(long)]
        force: bool,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum Format {
    Yaml,
    Json,
}

fn build(cli: &Cli) -> Result<Node> {
    let mut builder = TreeBuilder::new().deep(cli.deep);
    if cli.resolve || cli.load_lambda || cli.strict_env {
        let env = if cli.strict_env {
            EnvHandler::strict()
        } else {
            EnvHandler::new()
        };
        builder = builder.resolver(
            ResolverRegistry::new()
                .with(env)
                .with(LambdaHandler::new(cli.load_lambda)),
        );
    }

    let source = if cli.source == "-" {
        Source::reader(std::io::stdin())
    } else {
        Source::from(cli.source.as_str())
    };
    builder
        .build(source)
        .with_context(|| format!("Failed to load: {}", cli.source))
}

fn render(value: &Value) -> Result<String> {
    Ok(match value {
        Value::Null => "null".to_string(),
        Value::Bool(v) => v.to_string(),
        Value::Int(v) => v.to_string(),
        Value::Float(v) => v.to_string(),
        Value::Str(v) => v.clone(),
        other => serde_yaml::to_string(other)?.trim_end().to_string(),
    })
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let node = build(&cli)?;

    match cli.command {
        Commands::Get { key } => match node.get(&key) {
            Some(value) => println!("{}", render(value)?),
            None => bail!("Key not found: {}", key),
        },
        Commands::Has { key, deep } => {
            println!("{}", node.has(&key, deep));
        }
        Commands::Keys => {
            for key in node.keys() {
                println!("{}", key);
            }
        }
        Commands::Dump {
            format,
            output,
            force,
        } => match output {
            Some(path) => {
                if storage::exists(&path) && !force {
                    bail!("File already exists: {} (use --force to overwrite)", path);
                }
                let written = match format {
                    Format::Yaml => storage::save_yaml(&path, &node),
                    Format::Json => storage::save_json(&path, &node),
                };
                written.with_context(|| format!("Failed to write to file: {}", path))?;
                println!("Wrote {}", path);
            }
            None => {
                let text = match format {
                    Format::Yaml => node.to_yaml_string()?,
                    Format::Json => node.to_json_string_pretty()?,
                };
                println!("{}", text.trim_end());
            }
        },
    }

    Ok(())
}
