//! `watch` subcommand — poll on an interval, print the line when it changes.

use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use budsline_lib::gateway::CommandGateway;
use budsline_lib::watch::{StatusWatcher, WatchAction};

use super::{BudsController, RUNNING, Result, build_controller, load_config, print_line};

/// Granularity of the Ctrl+C check while sleeping between polls.
const SLEEP_SLICE: Duration = Duration::from_millis(100);

/// One poll cycle. Returns whether a line was printed.
fn watch_tick<G: CommandGateway>(
    controller: &BudsController<G>,
    watcher: &mut StatusWatcher,
    json: bool,
) -> Result<bool> {
    match watcher.update(controller.refresh()) {
        WatchAction::Redraw(result) => {
            print_line(&result, json)?;
            Ok(true)
        }
        WatchAction::NoChange | WatchAction::Keep => Ok(false),
    }
}

/// Sleep for `total`, waking early once `running` is cleared (Ctrl+C).
fn interruptible_sleep(total: Duration, running: &AtomicBool) {
    let deadline = Instant::now() + total;
    while running.load(Ordering::SeqCst) {
        let now = Instant::now();
        if now >= deadline {
            break;
        }
        std::thread::sleep(SLEEP_SLICE.min(deadline - now));
    }
}

pub(super) fn cmd_watch(interval: Option<u64>, json: bool, config_path: Option<&Path>) -> Result<()> {
    let config = load_config(config_path);
    let controller = build_controller(&config)?;
    let interval = Duration::from_secs(interval.unwrap_or(config.interval_secs).max(1));
    log::debug!("watching every {interval:?}");

    let mut watcher = StatusWatcher::new();
    while RUNNING.load(Ordering::SeqCst) {
        watch_tick(&controller, &mut watcher, json)?;
        interruptible_sleep(interval, &RUNNING);
    }
    Ok(())
}
