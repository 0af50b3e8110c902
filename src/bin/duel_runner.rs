//! Headless Duel Runner
//!
//! Runs AI vs AI duels (the player side on autopilot) and prints the
//! reported result as JSON or text.

use bird_arena::battle::{
    load_personality, AiOpponent, AiPersonality, BattleObserver, BattleResult, BattleSession,
};
use bird_arena::combat::{Archetype, ArchetypeTable};
use bird_arena::core::error::Result;
use bird_arena::core::types::Side;
use bird_arena::core::BattleConfig;
use clap::Parser;
use tracing_subscriber::EnvFilter;

/// Headless Duel Runner - scripted bird duels for balance checks
#[derive(Parser, Debug)]
#[command(name = "duel_runner")]
#[command(about = "Run AI vs AI bird duels and report the outcome")]
struct Args {
    /// Player archetype: balanced, speed, power, trickster, tank
    #[arg(long, default_value = "balanced")]
    player: String,

    /// Opponent archetype
    #[arg(long, default_value = "power")]
    opponent: String,

    /// Autopilot personality for the player side (data/ai_personalities/)
    #[arg(long, default_value = "default")]
    player_ai: String,

    /// Personality for the opponent side
    #[arg(long, default_value = "default")]
    opponent_ai: String,

    /// Battle config TOML (defaults to built-in values)
    #[arg(long)]
    config: Option<String>,

    /// Archetype stats TOML (defaults to built-in table)
    #[arg(long)]
    archetypes: Option<String>,

    /// Simulated seconds per tick
    #[arg(long, default_value_t = 1.0 / 60.0)]
    dt: f32,

    /// Give up after this many simulated seconds
    #[arg(long, default_value_t = 300.0)]
    max_seconds: f32,

    /// Training mode: the opponent never acts
    #[arg(long)]
    training: bool,

    /// Random seed for reproducible runs
    #[arg(long)]
    seed: Option<u64>,

    /// Output format: json or text
    #[arg(long, default_value = "json")]
    format: String,

    /// Print every battle event to stderr
    #[arg(long, short = 'v')]
    verbose: bool,
}

/// Collects the result and optionally echoes events
struct RunnerObserver {
    verbose: bool,
    result: Option<BattleResult>,
}

impl BattleObserver for RunnerObserver {
    fn on_event(&mut self, event: &bird_arena::battle::BattleEvent) {
        if self.verbose {
            eprintln!("  [{:6.2}s] {}", event.time, event.description);
        }
    }

    fn on_battle_ended(&mut self, result: &BattleResult) {
        self.result = Some(result.clone());
    }
}

fn parse_archetype(tag: &str) -> Archetype {
    Archetype::from_tag(tag).unwrap_or_else(|| {
        tracing::warn!("Unknown archetype '{}', using balanced", tag);
        Archetype::Balanced
    })
}

fn personality_or_default(name: &str) -> AiPersonality {
    load_personality(name).unwrap_or_else(|e| {
        tracing::warn!("Failed to load personality '{}': {} - using default", name, e);
        AiPersonality::default()
    })
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("bird_arena=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => BattleConfig::load(path)?,
        None => BattleConfig::default(),
    };
    if args.training {
        config.training_mode = true;
    }

    let table = match &args.archetypes {
        Some(path) => ArchetypeTable::load(path)?,
        None => ArchetypeTable::builtin(),
    };

    let seed = args.seed.unwrap_or_else(rand::random);
    let player = parse_archetype(&args.player);
    let opponent = parse_archetype(&args.opponent);

    let mut session = BattleSession::new(player, opponent, &table, config)?.with_seed(seed);
    session.set_player_ai(Some(Box::new(AiOpponent::new(personality_or_default(
        &args.player_ai,
    )))));
    session.set_opponent_ai(Some(Box::new(AiOpponent::new(personality_or_default(
        &args.opponent_ai,
    )))));

    let mut observer = RunnerObserver {
        verbose: args.verbose,
        result: None,
    };

    let dt = args.dt.max(0.001);
    let mut simulated = 0.0;
    while !session.result_reported() && simulated < args.max_seconds {
        session.tick(dt, &mut observer);
        simulated += dt;
    }

    let Some(result) = observer.result else {
        tracing::warn!("Duel hit the {:.0}s limit without a winner", args.max_seconds);
        let p = session.combatant(Side::Player);
        let o = session.combatant(Side::Opponent);
        eprintln!(
            "Timeout: player {:.1}/{:.1} hp, opponent {:.1}/{:.1} hp",
            p.current_health, p.max_health, o.current_health, o.max_health
        );
        return Ok(());
    };

    match args.format.as_str() {
        "text" => {
            println!(
                "{} ({}) vs {} ({}): {}",
                player.bird_name(),
                args.player,
                opponent.bird_name(),
                args.opponent,
                if result.player_won { "player wins" } else { "opponent wins" }
            );
            println!("  duration:        {:.2}s", result.elapsed);
            println!("  damage dealt:    {:.1}", result.damage_dealt);
            println!("  damage received: {:.1}", result.damage_received);
            println!("  seed:            {}", seed);
        }
        _ => println!("{}", serde_json::to_string_pretty(&result)?),
    }

    Ok(())
}
