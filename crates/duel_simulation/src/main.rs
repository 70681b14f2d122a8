//! Headless поединок
//!
//! Запускает матч без рендера со случайным вводом (seed 42).
//! Первый аргумент (опционально): путь к TOML-конфигу.

use std::process::ExitCode;
use std::time::Duration;

use duel_simulation::{log_error, log_info, set_log_level, DuelConfig, DuelMatch, MatchOutcome, RandomInputSource};

const SEED: u64 = 42;
const TICK: Duration = Duration::from_micros(16_667);
const MAX_MATCH_TIME: Duration = Duration::from_secs(60);

fn main() -> ExitCode {
    duel_simulation::init_logger();

    let config = match std::env::args().nth(1) {
        Some(path) => match DuelConfig::load(&path) {
            Ok(config) => config,
            Err(err) => {
                log_error(&format!("Failed to load {}: {}", path, err));
                return ExitCode::FAILURE;
            }
        },
        None => DuelConfig::default(),
    };
    set_log_level(config.log_level());

    let mut duel = match DuelMatch::new(config) {
        Ok(duel) => duel,
        Err(err) => {
            log_error(&format!("Invalid config: {}", err));
            return ExitCode::FAILURE;
        }
    };

    log_info(&format!("Starting headless duel (seed: {})", SEED));
    let mut inputs = RandomInputSource::new(SEED);

    while duel.now() < MAX_MATCH_TIME {
        let report = duel.tick(TICK, inputs.next_pair());

        if report.tick % 600 == 0 {
            let status: Vec<String> = duel
                .snapshots()
                .iter()
                .map(|s| format!("P{} hp {:.0} st {:.0} [{}]", s.id.number(), s.health, s.stamina, s.state))
                .collect();
            log_info(&format!("Tick {}: {}", report.tick, status.join(" | ")));
        }

        if let Some(outcome) = report.round_ended {
            match outcome {
                MatchOutcome::Winner(id) => log_info(&format!("Player {} wins after {} ticks", id.number(), report.tick)),
                MatchOutcome::Draw => log_info(&format!("Draw after {} ticks", report.tick)),
            }
            return ExitCode::SUCCESS;
        }
    }

    log_info("Time limit reached, no knockout");
    ExitCode::SUCCESS
}
