use battle_core::weather::Weather;
use battle_core::{run, CliOptions};
use std::env;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

fn usage() -> ! {
    eprintln!(
        "Usage: battle-sim --a NAME --b NAME [--roster roster.json] [--options options.json] [--battles N] \
[--seed SEED] [--weather none|rain|sun]"
    );
    std::process::exit(1);
}

fn parse_args() -> anyhow::Result<CliOptions> {
    let mut roster_path = PathBuf::from("roster.json");
    let mut side_a = None;
    let mut side_b = None;
    let mut options_path = None;
    let mut battles = 1usize;
    let mut seed = None;
    let mut weather = None;

    let mut args = env::args().skip(1);
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--roster" => {
                roster_path = args.next().map(PathBuf::from).ok_or_else(|| {
                    anyhow::anyhow!("--roster requires a path (e.g. --roster roster.json)")
                })?;
            }
            "--a" => {
                side_a = Some(args.next().ok_or_else(|| anyhow::anyhow!("--a requires a combatant name"))?);
            }
            "--b" => {
                side_b = Some(args.next().ok_or_else(|| anyhow::anyhow!("--b requires a combatant name"))?);
            }
            "--options" => {
                options_path = Some(args.next().map(PathBuf::from).ok_or_else(|| {
                    anyhow::anyhow!("--options requires a path (e.g. --options options.json)")
                })?);
            }
            "--battles" => {
                let val = args
                    .next()
                    .ok_or_else(|| anyhow::anyhow!("--battles requires a number"))?;
                battles = val.parse()?;
            }
            "--seed" => {
                let val = args
                    .next()
                    .ok_or_else(|| anyhow::anyhow!("--seed requires a number"))?;
                seed = Some(val.parse()?);
            }
            "--weather" => {
                let val = args
                    .next()
                    .ok_or_else(|| anyhow::anyhow!("--weather requires none, rain or sun"))?;
                weather = Some(
                    Weather::parse(&val)
                        .ok_or_else(|| anyhow::anyhow!("Unknown weather {val} (use none, rain or sun)"))?,
                );
            }
            "--help" | "-h" => usage(),
            other => return Err(anyhow::anyhow!("Unknown argument {other}")),
        }
    }

    let (Some(side_a), Some(side_b)) = (side_a, side_b) else {
        usage();
    };
    Ok(CliOptions {
        roster_path,
        side_a,
        side_b,
        options_path,
        battles,
        seed,
        weather,
    })
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();
    let opts = parse_args()?;
    run(opts)
}
