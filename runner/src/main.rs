// ═══════════════════════════════════════════════════════════════════════
// Runner — CLI entry point for demo matches and batch simulations
// ═══════════════════════════════════════════════════════════════════════

use clap::{Parser, Subcommand};

use war_agents::{Agent, HeuristicAgent, RandomAgent};
use war_service::simulate::{run_batch, run_match, DEFAULT_MAX_DECISIONS};
use war_service::{Repository, SqliteRepository};

#[derive(Parser)]
#[command(name = "war-runner", about = "War match engine driver")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a single bot-vs-bot match and print the result
    Play {
        #[arg(short, long, default_value_t = 42)]
        seed: u64,
        #[arg(short, long, default_value_t = 4)]
        players: u8,
        /// Agent mix: "random", "heuristic", or "mixed"
        #[arg(short, long, default_value = "mixed")]
        agent: String,
    },
    /// Run N seeded matches in parallel and record results
    Simulate {
        #[arg(short, long, default_value_t = 100)]
        matches: u32,
        #[arg(short, long, default_value_t = 42)]
        seed: u64,
        #[arg(short, long, default_value_t = 4)]
        players: u8,
        #[arg(short, long, default_value = "results.db")]
        db: String,
        /// Agent mix: "random", "heuristic", or "mixed"
        #[arg(short, long, default_value = "mixed")]
        agent: String,
    },
    /// Show the win-rate leaderboard from a results database
    Leaderboard {
        #[arg(short, long, default_value = "results.db")]
        db: String,
    },
}

fn main() {
    let cli = Cli::parse();

    match cli.command {
        Commands::Play {
            seed,
            players,
            agent,
        } => cmd_play(seed, players, &agent),
        Commands::Simulate {
            matches,
            seed,
            players,
            db,
            agent,
        } => cmd_simulate(matches, seed, players, &db, &agent),
        Commands::Leaderboard { db } => cmd_leaderboard(&db),
    }
}

fn cmd_play(seed: u64, players: u8, agent_mix: &str) {
    println!("=== War Match Engine ===\n");
    println!(
        "Running single match: seed={}, players={}, agents={}\n",
        seed, players, agent_mix
    );

    let outcome = run_match(seed, make_roster(seed, players, agent_mix), DEFAULT_MAX_DECISIONS);
    match &outcome.winner {
        Some(winner) => {
            println!("Match finished!");
            println!("  Winner: {}", winner);
            if let Some(condition) = outcome.condition {
                println!("  Condition: {:?}", condition);
            }
        }
        None => println!("No winner within the decision budget (stalemate)."),
    }
    println!("  Turns: {}", outcome.turns);
    println!("  Decisions: {}", outcome.decisions);
    println!("\n  Roster:");
    for p in &outcome.players {
        let marker = if p.won { " <- winner" } else { "" };
        println!("    {:10} [{}]{}", p.username, p.agent, marker);
    }
}

fn cmd_simulate(matches: u32, base_seed: u64, players: u8, db_path: &str, agent_mix: &str) {
    println!(
        "=== Simulation: {} matches, {} players, agents={} ===\n",
        matches, players, agent_mix
    );

    let repo = match SqliteRepository::open(db_path) {
        Ok(repo) => repo,
        Err(e) => {
            eprintln!("Cannot open {}: {}", db_path, e);
            return;
        }
    };
    let mix = agent_mix.to_string();
    let outcomes = match run_batch(matches, base_seed, DEFAULT_MAX_DECISIONS, &repo, |seed| {
        make_roster(seed, players, &mix)
    }) {
        Ok(outcomes) => outcomes,
        Err(e) => {
            eprintln!("Simulation error: {}", e);
            return;
        }
    };

    let finished = outcomes.iter().filter(|o| o.finished()).count();
    let stalemates = outcomes.len() - finished;
    let avg_turns: f64 = if finished > 0 {
        outcomes
            .iter()
            .filter(|o| o.finished())
            .map(|o| f64::from(o.turns))
            .sum::<f64>()
            / finished as f64
    } else {
        0.0
    };

    println!(
        "--- Summary ({} matches, {} finished, {} stalemates) ---",
        outcomes.len(),
        finished,
        stalemates
    );
    println!("  Average turns to a verdict: {:.1}", avg_turns);
    println!("\nResults saved to: {}", db_path);
    print_board(&repo);
}

fn cmd_leaderboard(db_path: &str) {
    match SqliteRepository::open(db_path) {
        Ok(repo) => print_board(&repo),
        Err(e) => eprintln!("Cannot open {}: {}", db_path, e),
    }
}

fn print_board(repo: &dyn Repository) {
    let board = match repo.leaderboard() {
        Ok(board) => board,
        Err(e) => {
            eprintln!("Leaderboard error: {}", e);
            return;
        }
    };
    if board.is_empty() {
        println!("No results yet. Run some simulations first.");
        return;
    }
    println!("\n=== Leaderboard ===\n");
    println!("{:<16} {:>8} {:>8} {:>10}", "Player", "Played", "Wins", "Win rate");
    println!("{}", "-".repeat(46));
    for row in &board {
        println!(
            "{:<16} {:>8} {:>8} {:>9.1}%",
            row.username,
            row.played,
            row.wins,
            row.win_rate() * 100.0
        );
    }
}

fn make_roster(seed: u64, players: u8, agent_mix: &str) -> Vec<(String, Box<dyn Agent>)> {
    (0..players)
        .map(|i| {
            let agent: Box<dyn Agent> = match agent_mix {
                "heuristic" => Box::new(HeuristicAgent),
                "random" => Box::new(RandomAgent::new(seed + u64::from(i))),
                _ => {
                    if i % 2 == 0 {
                        Box::new(HeuristicAgent)
                    } else {
                        Box::new(RandomAgent::new(seed + u64::from(i)))
                    }
                }
            };
            (format!("bot-{i}"), agent)
        })
        .collect()
}
