use clap::Parser;
use log::LevelFilter;
use rdfpub_render::{config, output, walk};
use simplelog::{ColorChoice, Config, TermLogger, TerminalMode};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "rdfpub-render")]
#[command(about = "Render SPARQL query results and Handlebars templates into localized HTML")]
#[command(long_about = "\
Render SPARQL query results and Handlebars templates into localized HTML

Every directory under INPUT is a resource. Its files are named
<name>[@<language>].<extension> and are used as follows:

  input/
  ├── index@en.html        # Page template for English
  ├── index@fr.md          # Page template for French (rendered, then markdown)
  ├── header.html          # Partial: {{> header}}, this directory only
  ├── people@en.rq         # SPARQL JSON results: {{people.name}}, {{#each people}}
  └── team/                # Nested resource, served at BASE/team
      └── index@en.html

Each resource writes OUTPUT/<path>/index@<language>.html for every language
it has an index template for. Templates also see {{$resource}} (the
resource's address) and {{$language}}.

Helpers: any, all, equals, markdown, relative.")]
#[command(version)]
struct Cli {
    /// Input directory
    input: PathBuf,

    /// Output directory
    output: PathBuf,

    /// Base address the output root is served at (http or https)
    base: String,

    /// Language for files without an @language suffix
    #[arg(default_value = config::DEFAULT_LANGUAGE)]
    default_language: String,

    /// More log output (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Only log warnings and errors
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    init_logging(&cli);

    let config = config::RenderConfig::new(
        &cli.input,
        &cli.output,
        &cli.base,
        &cli.default_language,
    )?;
    log::info!("Input directory is {}", config.input_dir.display());
    log::info!("Output directory is {}", config.output_dir.display());
    log::info!("Base address is <{}>", config.base);

    let report = walk::render_tree(&config)?;
    output::print_report(&report, &config.input_dir, &config.output_dir);

    Ok(())
}

fn init_logging(cli: &Cli) {
    let level = if cli.quiet {
        LevelFilter::Warn
    } else {
        match cli.verbose {
            0 => LevelFilter::Info,
            1 => LevelFilter::Debug,
            _ => LevelFilter::Trace,
        }
    };
    // Only fails if a logger is already installed.
    TermLogger::init(
        level,
        Config::default(),
        TerminalMode::Stderr,
        ColorChoice::Auto,
    )
    .ok();
}
