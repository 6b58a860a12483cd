use std::io::{self, Read, Write};

use anyhow::{anyhow, bail, Context, Result};
use clap::{Args, Parser as ClapParser, Subcommand};
use log::{info, warn};

use subline::format::srt;
use subline::{validate, Format, FormatStyle, UndoableStore};

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match run(cli) {
        Ok(()) => (),
        Err(err) => {
            eprintln!("An error occurred: {}", err);
            for cause in err.chain().skip(1) {
                eprintln!("    {}", cause);
            }
            std::process::exit(1);
        }
    }
}

#[derive(ClapParser)]
#[command(about = "Convert, check and inspect subtitle files")]
struct Cli {
    #[arg(short, long, action = clap::ArgAction::Count, global = true, help = "Log more; repeat for more detail.")]
    verbose: u8,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Convert subtitles from one format to another.
    Convert(ConvertArgs),
    /// Report entries that overlap, have no duration or have no text.
    Check(InputArgs),
    /// Print the index of the entry active at a playback time.
    Locate {
        #[command(flatten)]
        input: InputArgs,
        #[arg(short, long, value_name = "SECONDS", help = "Playback time in seconds.")]
        time: f64,
    },
}

#[derive(Args)]
struct InputArgs {
    #[arg(
        short,
        long,
        value_name = "FILE",
        help = "The file to read from. If not supplied, the subtitles will be read from standard input.",
        default_value = "-"
    )]
    input: String,
    #[arg(
        long,
        value_name = "FORMAT",
        help = "Input format (srt, vtt, ass, json, subtitle). Inferred from the file extension if omitted."
    )]
    from: Option<Format>,
}

#[derive(Args)]
struct ConvertArgs {
    #[command(flatten)]
    input: InputArgs,
    #[arg(
        short,
        long,
        value_name = "FILE",
        help = "The file to write to. If not supplied, the subtitles will be written to standard output.",
        default_value = "-"
    )]
    output: String,
    #[arg(
        long,
        value_name = "FORMAT",
        help = "Output format (srt, vtt, ass, txt, json). Inferred from the file extension if omitted."
    )]
    to: Option<Format>,
    #[arg(
        long,
        value_name = "FILE",
        help = "Also write an SRT file containing only the translations."
    )]
    translation_output: Option<String>,
    #[arg(
        short,
        long,
        value_name = "FILE",
        help = "Write a backup of the original input to the specified file."
    )]
    backup: Option<String>,
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp(None)
        .init();
}

fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Command::Convert(args) => convert(args),
        Command::Check(args) => check(args),
        Command::Locate { input, time } => locate(input, time),
    }
}

fn convert(args: ConvertArgs) -> Result<()> {
    let data = read_input(&args.input.input)?;
    if let Some(backup_path) = &args.backup {
        std::fs::write(backup_path, &data)
            .context(format!("Failed to write backup file: '{}'", backup_path))?;
    }
    let store = import(&args.input, &data)?;

    let to = resolve_format(args.to, &args.output, "--to")?;
    let illegal = validate::illegal_indices(store.entries());
    if !illegal.is_empty() {
        warn!("{} entries are illegal; run `check` for details", illegal.len());
    }
    let text = to
        .encode(store.entries())
        .context(format!("Failed to encode subtitles as {}", to))?;
    write_output(&args.output, &text)?;

    if let Some(path) = &args.translation_output {
        let text = srt::encode_translation(store.entries())
            .context("Failed to encode translation subtitles")?;
        if text.trim().is_empty() {
            info!("No translations present, not writing '{}'", path);
        } else {
            write_output(path, &text)?;
        }
    }
    Ok(())
}

fn check(args: InputArgs) -> Result<()> {
    let data = read_input(&args.input)?;
    let store = import(&args, &data)?;
    let entries = store.entries();

    let illegal = validate::illegal_indices(entries);
    for &index in &illegal {
        let entry = &entries[index];
        let reasons: Vec<String> = validate::issues_at(entries, index)
            .iter()
            .map(ToString::to_string)
            .collect();
        println!(
            "#{} {} --> {}: {}",
            index + 1,
            subline::seconds_to_timestamp(entry.start_time.max(0.0), FormatStyle::Srt)?,
            subline::seconds_to_timestamp(entry.end_time.max(0.0), FormatStyle::Srt)?,
            reasons.join(", ")
        );
    }
    if illegal.is_empty() {
        info!("All {} entries are legal", entries.len());
        Ok(())
    } else {
        Err(anyhow!(
            "{} of {} entries are illegal",
            illegal.len(),
            entries.len()
        ))
    }
}

fn locate(args: InputArgs, time: f64) -> Result<()> {
    let data = read_input(&args.input)?;
    let store = import(&args, &data)?;
    match store.locate(time) {
        Some(index) => println!("{}", index),
        None => println!("none"),
    }
    Ok(())
}

fn import(args: &InputArgs, data: &str) -> Result<UndoableStore> {
    let from = resolve_format(args.from, &args.input, "--from")?;
    if !from.can_decode() {
        bail!("{} files cannot be imported", from);
    }
    let entries = from
        .decode(data)
        .context(format!("Failed to parse {} file: '{}'", from, args.input))?;
    if entries.is_empty() {
        warn!("You appear to have supplied an empty file.");
    }
    let mut store = UndoableStore::new();
    store.replace_all(entries);
    Ok(store)
}

fn resolve_format(explicit: Option<Format>, path: &str, flag: &str) -> Result<Format> {
    explicit
        .or_else(|| Format::from_path(path))
        .ok_or_else(|| anyhow!("Cannot infer the format of '{}'; pass {}", path, flag))
}

fn read_input(path: &str) -> Result<String> {
    if path == "-" {
        let mut buffer = String::new();
        io::stdin()
            .read_to_string(&mut buffer)
            .context("Failed to read from stdin")?;
        Ok(buffer)
    } else {
        std::fs::read_to_string(path).context(format!("Failed to open input file: '{}'", path))
    }
}

fn write_output(path: &str, text: &str) -> Result<()> {
    if path == "-" {
        let mut stdout = io::stdout().lock();
        stdout
            .write_all(text.as_bytes())
            .and_then(|_| stdout.flush())
            .context("Failed to write to stdout")
    } else {
        std::fs::write(path, text).context(format!("Failed to write output file: '{}'", path))
    }
}
