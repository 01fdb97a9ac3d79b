// ABOUTME: Command-line interface for the dprcalc calculator.
// ABOUTME: Evaluates formulas, hit/crit odds, damage per round, spells and whole sheet exports.

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use dprcalc::{
    AttackProfile, DprBreakdown, EvalOptions, RerollSpec, RollMode, Rounding, Sheet, SpellProfile,
};
use serde::de::DeserializeOwned;
use std::path::{Path, PathBuf};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "dprcalc")]
#[command(about = "Expected damage per round for TTRPG attacks and spells")]
#[command(version)]
struct Cli {
    /// Log intermediate figures to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Expected value of a damage formula
    Damage {
        /// Damage formula (e.g., "1d8 + 4", "2d6 fire + 1d4 hex")
        formula: String,

        /// Treat the roll as a critical hit
        #[arg(long)]
        crit: bool,

        #[command(flatten)]
        dice: DiceArgs,
    },
    /// Chance to score a critical hit
    Crit {
        #[command(flatten)]
        roll: RollArgs,
    },
    /// Chance to hit without a critical
    Hit {
        /// Attack bonus
        #[arg(allow_hyphen_values = true)]
        to_hit: f64,

        /// Target armor class
        ac: f64,

        #[command(flatten)]
        roll: RollArgs,
    },
    /// Expected damage per round of weapon attacks
    Dpr {
        /// Read the attack profile from a JSON file instead of flags
        #[arg(long, conflicts_with = "damage")]
        profile: Option<PathBuf>,

        #[command(flatten)]
        attack: AttackArgs,

        /// Print the full breakdown as JSON
        #[arg(long)]
        json: bool,
    },
    /// Expected damage of a saving-throw spell
    Spell {
        /// Read the spell profile from a JSON file instead of flags
        #[arg(long, conflicts_with = "damage")]
        profile: Option<PathBuf>,

        #[command(flatten)]
        spell: SpellArgs,
    },
    /// Damage per round for every row of a JSON sheet export
    Sheet {
        /// Sheet file: {"headers": [...], "rows": [[...], ...]}
        path: PathBuf,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

#[derive(Args)]
struct RollArgs {
    #[arg(long)]
    advantage: bool,

    #[arg(long)]
    disadvantage: bool,

    /// Roll three dice with advantage
    #[arg(long)]
    elven: bool,

    /// Lowest d20 face that crits
    #[arg(long, default_value_t = 20)]
    min_crit: u32,
}

impl RollArgs {
    fn mode(&self) -> RollMode {
        RollMode::from_flags(self.advantage, self.disadvantage, self.elven)
    }
}

#[derive(Args)]
struct DiceArgs {
    /// Every die rolls a 1
    #[arg(long)]
    min: bool,

    /// Every die rolls its highest face
    #[arg(long)]
    max: bool,

    /// Extra damage dice on a critical hit
    #[arg(long, default_value_t = 0)]
    extra_crits: u64,

    /// Number of damage dice that may be rerolled
    #[arg(long, default_value_t = 0)]
    reroll_count: u64,

    /// Highest face that is rerolled (default: half the die)
    #[arg(long)]
    reroll_find: Option<f64>,

    /// Fixed value used instead of the reroll
    #[arg(long)]
    reroll_replace: Option<f64>,
}

impl DiceArgs {
    fn rounding(&self) -> Rounding {
        Rounding::from_flags(self.min, self.max)
    }

    fn reroll(&self) -> Option<RerollSpec> {
        (self.reroll_count > 0).then_some(RerollSpec {
            count: self.reroll_count,
            find_value: self.reroll_find,
            replace_value: self.reroll_replace,
        })
    }
}

#[derive(Args)]
struct AttackArgs {
    /// Weapon damage formula
    #[arg(long)]
    damage: Option<String>,

    #[arg(long, default_value_t = 1, allow_hyphen_values = true)]
    attacks: i64,

    #[arg(long, default_value_t = 0.0, allow_hyphen_values = true)]
    to_hit: f64,

    /// Damage added to every attack
    #[arg(long, default_value = "")]
    per_hit: String,

    /// Damage added once per turn
    #[arg(long, default_value = "")]
    per_turn: String,

    /// Attack bonus formula added to every attack
    #[arg(long, default_value = "")]
    per_hit_to_hit: String,

    /// Attack bonus formula added to the first attack only
    #[arg(long, default_value = "")]
    per_turn_to_hit: String,

    /// Target armor class
    #[arg(long, default_value = "0")]
    ac: String,

    /// Damage dealt on a miss
    #[arg(long, default_value_t = 0.0)]
    miss_damage: f64,

    #[command(flatten)]
    roll: RollArgs,

    #[command(flatten)]
    dice: DiceArgs,
}

impl AttackArgs {
    fn profile(self) -> AttackProfile {
        AttackProfile {
            num_attacks: self.attacks,
            to_hit: self.to_hit,
            damage: self.damage.unwrap_or_default(),
            per_hit_damage: self.per_hit,
            per_turn_damage: self.per_turn,
            per_hit_to_hit: self.per_hit_to_hit,
            per_turn_to_hit: self.per_turn_to_hit,
            armor_class: self.ac,
            rounding: self.dice.rounding(),
            roll_mode: self.roll.mode(),
            min_crit: self.roll.min_crit,
            extra_criticals: self.dice.extra_crits,
            reroll: self.dice.reroll(),
            miss_damage: self.miss_damage,
        }
    }
}

#[derive(Args)]
struct SpellArgs {
    /// Spell damage formula
    #[arg(long)]
    damage: Option<String>,

    #[arg(long, default_value_t = 10.0)]
    dc: f64,

    /// Extra damage formula
    #[arg(long, default_value = "")]
    per_hit: String,

    /// Extra once-per-turn damage formula
    #[arg(long, default_value = "")]
    per_turn: String,

    /// A successful save takes no damage
    #[arg(long)]
    no_damage_on_save: bool,

    /// The targets' saving throw bonus
    #[arg(long, default_value_t = 0.0, allow_hyphen_values = true)]
    save: f64,

    #[arg(long, default_value_t = 1)]
    targets: u32,
}

impl SpellArgs {
    fn profile(self) -> SpellProfile {
        SpellProfile {
            save_dc: self.dc,
            damage: self.damage.unwrap_or_default(),
            per_hit_damage: self.per_hit,
            per_turn_damage: self.per_turn,
            no_damage_on_save: self.no_damage_on_save,
            expected_save: self.save,
            targets: self.targets,
        }
    }
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if let Err(e) = run(cli.command) {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}

fn init_tracing(verbose: bool) {
    let default_filter = if verbose { "dprcalc=debug" } else { "warn" };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn run(command: Commands) -> Result<()> {
    match command {
        Commands::Damage {
            formula,
            crit,
            dice,
        } => {
            let options = EvalOptions::new()
                .critical(crit)
                .rounding(dice.rounding())
                .extra_criticals(dice.extra_crits)
                .reroll(dice.reroll());
            println!("{}", dprcalc::evaluate_damage_formula(&formula, &options));
        }
        Commands::Crit { roll } => {
            println!("{}", dprcalc::calculate_crit_chance(roll.mode(), roll.min_crit));
        }
        Commands::Hit { to_hit, ac, roll } => {
            let odds = dprcalc::AttackOdds::new(to_hit, ac, roll.mode(), roll.min_crit);
            println!("hit: {:.4}, crit: {:.4}, miss: {:.4}", odds.hit, odds.crit, odds.miss);
        }
        Commands::Dpr {
            profile,
            attack,
            json,
        } => {
            let profile = match profile {
                Some(path) => read_json::<AttackProfile>(&path)?,
                None => attack.profile(),
            };
            let breakdown = dprcalc::dpr_breakdown(&profile);
            if json {
                print_json(&breakdown)?;
            } else {
                println!("{:.4}", breakdown.total);
            }
        }
        Commands::Spell { profile, spell } => {
            let profile = match profile {
                Some(path) => read_json::<SpellProfile>(&path)?,
                None => spell.profile(),
            };
            println!("{:.4}", dprcalc::calculate_spell_damage(&profile));
        }
        Commands::Sheet { path, json } => {
            let sheet = read_json::<Sheet>(&path)?;
            tracing::debug!(path = %path.display(), rows = sheet.len(), "loaded sheet");
            print_sheet(&sheet, json)?;
        }
    }
    Ok(())
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("reading {}", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("parsing {}", path.display()))
}

fn print_json(value: &impl serde::Serialize) -> Result<()> {
    let output = serde_json::to_string_pretty(value)?;
    println!("{}", output);
    Ok(())
}

fn sheet_breakdowns(sheet: &Sheet) -> Result<Vec<DprBreakdown>> {
    (0..sheet.len())
        .map(|row| {
            sheet
                .attack_profile(row)
                .map(|profile| dprcalc::dpr_breakdown(&profile))
                .with_context(|| format!("row {}", row + 1))
        })
        .collect()
}

fn print_sheet(sheet: &Sheet, json: bool) -> Result<()> {
    let results = sheet_breakdowns(sheet)?;

    if json {
        return print_json(&results);
    }

    for (row, breakdown) in results.iter().enumerate() {
        println!(
            "{:>4}: {:8.3}  (hit {:.3}, crit {:.3})",
            row + 1,
            breakdown.total,
            breakdown.first_hit_chance,
            breakdown.crit_chance
        );
    }
    Ok(())
}
