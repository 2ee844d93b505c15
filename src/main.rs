use std::env;
use std::io::{self, BufRead};
use std::path::PathBuf;
use std::sync::mpsc;
use std::thread;

use tracing::warn;
use tracing_subscriber::EnvFilter;
use twin_panel::{app, PanelCommand, PanelConfig};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // Parse --seed N, --font PATH and --title T from the command line
    let mut seed = None;
    let mut font_path = None;
    let mut title = None;
    let mut args = env::args().skip(1);
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--seed" => seed = args.next().and_then(|s| s.parse::<u64>().ok()),
            "--font" => font_path = args.next().map(PathBuf::from),
            "--title" => title = args.next(),
            other => warn!(argument = other, "Ignoring unknown argument"),
        }
    }

    let mut config = PanelConfig::builder()
        .maybe_seed(seed)
        .maybe_font_path(font_path)
        .build();
    if let Some(title) = title {
        config.window.title = title;
    }

    // Setpoint and edit commands arrive one per line on stdin
    let (sender, receiver) = mpsc::channel();
    thread::spawn(move || {
        let stdin = io::stdin();
        for line in stdin.lock().lines() {
            let Ok(line) = line else { break };
            if line.trim().is_empty() {
                continue;
            }
            match line.parse::<PanelCommand>() {
                Ok(command) => {
                    if sender.send(command).is_err() {
                        break;
                    }
                }
                Err(err) => warn!(error = %err, "Skipping input line"),
            }
        }
    });

    app::run(config, Some(receiver))
}
