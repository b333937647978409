use bore_sim_core::core_types::units::{CubicMeters, Kilograms, Meters, MetersPerSecond, Pascals};
use bore_sim_core::simulation::{ChargeResult, SearchReport, SensitivityResult};
use bore_sim_core::{
    ladder, parametric_search, sensitivity, simulate, BarrelParams, BulletParams, ChamberParams,
    ChargeParams, LoadInputs, PropellantCatalog, SearchRequest, SimulationConfig,
    SimulationResult,
};
use clap::{Args, Parser, Subcommand};
use serde_json::json;
use std::error::Error;
use tracing_subscriber::EnvFilter;

/// Interior ballistics demo for handloading
#[derive(Parser, Debug)]
#[command(name = "bore-sim-demo")]
#[command(about = "Interior ballistics simulation demo", long_about = None)]
struct Cli {
    /// Print JSON instead of tables
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Simulate a single load
    Run {
        #[command(flatten)]
        load: LoadArgs,

        /// Print every Nth curve sample (0 = no curve table)
        #[arg(long, default_value_t = 20)]
        every: usize,
    },

    /// Step the charge from START to END
    Ladder {
        #[command(flatten)]
        load: LoadArgs,

        /// First charge (grains)
        #[arg(long)]
        start: f64,

        /// Last charge (grains)
        #[arg(long)]
        end: f64,

        /// Increment (grains)
        #[arg(long, default_value_t = 0.5)]
        step: f64,
    },

    /// Run the charge and ±DELTA around it
    Sensitivity {
        #[command(flatten)]
        load: LoadArgs,

        /// Charge offset (grains)
        #[arg(long, default_value_t = 0.5)]
        delta: f64,
    },

    /// Find the best safe charge of every catalog powder
    Search {
        #[command(flatten)]
        load: LoadArgs,

        /// Lowest charge as a fraction of the estimated maximum
        #[arg(long, default_value_t = 0.70)]
        min_fraction: f64,

        /// Highest charge as a fraction of the estimated maximum
        #[arg(long, default_value_t = 1.0)]
        max_fraction: f64,

        /// Charges per powder
        #[arg(long, default_value_t = 5)]
        steps: usize,
    },

    /// List the built-in powders and their aliases
    Powders,
}

/// Load definition shared by every subcommand (defaults: .308 Win reference load)
#[derive(Args, Debug)]
struct LoadArgs {
    /// Powder name or alias from the built-in catalog
    #[arg(short, long, default_value = "Varget-like")]
    powder: String,

    /// Charge weight (grains)
    #[arg(short, long, default_value_t = 44.0)]
    charge: f64,

    /// Bullet weight (grains)
    #[arg(short, long, default_value_t = 168.0)]
    bullet: f64,

    /// Bullet diameter (mm)
    #[arg(long, default_value_t = 7.82)]
    bullet_diameter: f64,

    /// Barrel length (mm)
    #[arg(long, default_value_t = 610.0)]
    barrel: f64,

    /// Usable case volume (cm³)
    #[arg(long, default_value_t = 3.63)]
    case_volume: f64,

    /// Bore diameter (mm)
    #[arg(long, default_value_t = 7.62)]
    bore: f64,

    /// Rated maximum pressure (psi)
    #[arg(long, default_value_t = 62_000.0)]
    max_pressure: f64,

    /// Twist rate (inches per turn)
    #[arg(long, default_value_t = 10.0)]
    twist: f64,

    /// Rifle mass (kg)
    #[arg(long, default_value_t = 3.5)]
    rifle_mass: f64,
}

impl LoadArgs {
    fn to_inputs(&self, catalog: &PropellantCatalog) -> Result<LoadInputs, Box<dyn Error>> {
        let propellant = catalog
            .get(&self.powder)
            .ok_or_else(|| format!("Unknown powder '{}' (try the `powders` command)", self.powder))?
            .clone();

        Ok(LoadInputs {
            propellant,
            bullet: BulletParams::from_grains(self.bullet, self.bullet_diameter),
            chamber: ChamberParams {
                max_pressure: Pascals::from_psi(self.max_pressure),
                chamber_volume: CubicMeters::from_cm3(self.case_volume),
                bore_diameter: Meters::from_mm(self.bore),
            },
            barrel: BarrelParams {
                barrel_length: Meters::from_mm(self.barrel),
                twist: Meters::from_inches(self.twist),
                rifle_mass: Kilograms::new(self.rifle_mass),
            },
            charge: ChargeParams::from_grains(self.charge),
        })
    }
}

fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let catalog = PropellantCatalog::builtin();
    let config = SimulationConfig::default();
    tracing::debug!("Loaded {} propellants", catalog.iter().count());

    match &cli.command {
        Commands::Run { load, every } => {
            let inputs = load.to_inputs(&catalog)?;
            let result = simulate(&inputs, &config)?;
            if !result.is_safe {
                tracing::warn!(
                    "{} at {:.1} gr flagged unsafe",
                    inputs.propellant.name,
                    inputs.charge.mass.to_grains()
                );
            }
            if cli.json {
                println!("{}", serde_json::to_string_pretty(&result)?);
            } else {
                print_run(&inputs, &result, *every);
            }
        }
        Commands::Ladder {
            load,
            start,
            end,
            step,
        } => {
            let inputs = load.to_inputs(&catalog)?;
            let steps = ladder(
                &inputs,
                &config,
                Kilograms::from_grains(*start),
                Kilograms::from_grains(*end),
                Kilograms::from_grains(*step),
            )?;
            if cli.json {
                let rows: Vec<_> = steps.iter().map(charge_json).collect();
                println!("{}", serde_json::to_string_pretty(&rows)?);
            } else {
                println!("=== Ladder: {} ===\n", inputs.propellant.name);
                print_charge_header();
                for step in &steps {
                    print_charge_row(step);
                }
            }
        }
        Commands::Sensitivity { load, delta } => {
            let inputs = load.to_inputs(&catalog)?;
            let report = sensitivity(&inputs, &config, Kilograms::from_grains(*delta));
            if cli.json {
                let out = json!({
                    "lower": charge_json(&report.lower),
                    "center": charge_json(&report.center),
                    "upper": charge_json(&report.upper),
                });
                println!("{}", serde_json::to_string_pretty(&out)?);
            } else {
                print_sensitivity(&inputs, &report);
            }
        }
        Commands::Search {
            load,
            min_fraction,
            max_fraction,
            steps,
        } => {
            let inputs = load.to_inputs(&catalog)?;
            let request = SearchRequest {
                min_fraction: *min_fraction,
                max_fraction: *max_fraction,
                steps: *steps,
            };
            let report = parametric_search(
                &catalog,
                &inputs,
                inputs.chamber.chamber_volume,
                &request,
                &config,
            )?;
            if cli.json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                print_search(&report);
            }
        }
        Commands::Powders => {
            if cli.json {
                let rows: Vec<_> = catalog
                    .iter()
                    .map(|p| {
                        json!({
                            "name": p.name,
                            "alias_group": catalog.alias_group(&p.name),
                            "curve": p.curve.mode_name(),
                            "burn_rate_coeff": p.burn_rate_coeff,
                        })
                    })
                    .collect();
                println!("{}", serde_json::to_string_pretty(&rows)?);
            } else {
                println!("{:<16} {:<16} {:<10} {:>12}", "Powder", "Alias group", "Curve", "a (Vieille)");
                for p in catalog.iter() {
                    println!(
                        "{:<16} {:<16} {:<10} {:>12.3e}",
                        p.name,
                        catalog.alias_group(&p.name).unwrap_or("-"),
                        p.curve.mode_name(),
                        p.burn_rate_coeff
                    );
                }
            }
        }
    }

    Ok(())
}

fn print_run(inputs: &LoadInputs, r: &SimulationResult, every: usize) {
    println!("=== Interior Ballistics ===\n");
    println!(
        "Load: {:.1} gr {} under a {:.0} gr bullet, {:.0} mm barrel",
        inputs.charge.mass.to_grains(),
        inputs.propellant.name,
        inputs.bullet.mass.to_grains(),
        inputs.barrel.barrel_length.to_mm()
    );
    println!();
    println!(
        "Peak pressure:    {:>8.0} psi at {:.3} ms ({:.1}% of rated max)",
        r.peak_pressure.to_psi(),
        r.peak_pressure_time.to_ms(),
        r.peak_pressure / inputs.chamber.max_pressure * 100.0
    );
    println!("Muzzle velocity:  {:>8.0} fps", r.muzzle_velocity.to_fps());
    println!("Muzzle energy:    {:>8.0} ft-lbs", r.muzzle_energy.to_ft_lbs());
    println!("Barrel time:      {:>8.3} ms", r.barrel_time.to_ms());
    println!("Spin rate:        {:>8.0} rpm", r.spin_rate * 60.0);
    println!("Peak gas temp:    {:>8.0} K", *r.peak_gas_temperature);
    println!("Case hoop stress: {:>8.0} psi", r.hoop_stress.to_psi());
    println!("Erosion per shot: {:>8.3e} m", *r.erosion_per_shot);
    println!(
        "Barrel frequency: {:>8.1} Hz (OBT match: {})",
        *r.barrel_frequency,
        if r.obt_match { "yes" } else { "no" }
    );
    println!(
        "Free recoil:      {:>8.2} ft-lbs at {:.2} fps",
        r.recoil_energy.to_ft_lbs(),
        r.recoil_velocity.to_fps()
    );
    println!(
        "Solver:           {} accepted, {} rejected, {} RHS evaluations",
        r.solver_stats.accepted_steps, r.solver_stats.rejected_steps, r.solver_stats.rhs_evals
    );
    println!();
    println!("Verdict: {}", if r.is_safe { "SAFE" } else { "UNSAFE" });
    for w in &r.warnings {
        println!("  - {w}");
    }

    if every == 0 || r.curves.is_empty() {
        return;
    }
    println!();
    println!("{:>9} {:>10} {:>9} {:>9} {:>7} {:>8}", "t (ms)", "P (psi)", "v (fps)", "x (mm)", "psi", "T (K)");
    let c = &r.curves;
    let last = c.len() - 1;
    for i in (0..c.len()).filter(|i| i % every == 0 || *i == last) {
        println!(
            "{:>9.4} {:>10.0} {:>9.0} {:>9.1} {:>7.3} {:>8.0}",
            c.breech_pressure[i].time * 1e3,
            Pascals::new(c.breech_pressure[i].value).to_psi(),
            MetersPerSecond::new(c.velocity[i].value).to_fps(),
            c.travel[i].value * 1e3,
            c.burn_fraction[i].value,
            c.gas_temperature[i].value
        );
    }
}

fn print_charge_header() {
    println!(
        "{:>8} {:>10} {:>9} {:>9} {:>6} {:>9}",
        "Charge", "P (psi)", "v (fps)", "t (ms)", "Safe", "Warnings"
    );
}

fn print_charge_row(item: &ChargeResult) {
    match &item.result {
        Ok(r) => println!(
            "{:>8.1} {:>10.0} {:>9.0} {:>9.3} {:>6} {:>9}",
            item.charge.to_grains(),
            r.peak_pressure.to_psi(),
            r.muzzle_velocity.to_fps(),
            r.barrel_time.to_ms(),
            if r.is_safe { "yes" } else { "NO" },
            r.warnings.len()
        ),
        Err(e) => println!("{:>8.1} error: {e}", item.charge.to_grains()),
    }
}

fn charge_json(item: &ChargeResult) -> serde_json::Value {
    match &item.result {
        Ok(r) => json!({
            "charge_gr": item.charge.to_grains(),
            "peak_pressure_psi": r.peak_pressure.to_psi(),
            "muzzle_velocity_fps": r.muzzle_velocity.to_fps(),
            "barrel_time_ms": r.barrel_time.to_ms(),
            "is_safe": r.is_safe,
            "warnings": r.warnings,
        }),
        Err(e) => json!({
            "charge_gr": item.charge.to_grains(),
            "error": e.to_string(),
        }),
    }
}

fn print_sensitivity(inputs: &LoadInputs, report: &SensitivityResult) {
    println!("=== Charge sensitivity: {} ===\n", inputs.propellant.name);
    print_charge_header();
    for item in [&report.lower, &report.center, &report.upper] {
        print_charge_row(item);
    }

    if let (Ok(lo), Ok(hi)) = (&report.lower.result, &report.upper.result) {
        let span = (report.upper.charge - report.lower.charge).to_grains();
        if span > 0.0 {
            println!();
            println!(
                "{:.0} psi/gr, {:.0} fps/gr",
                (hi.peak_pressure - lo.peak_pressure).to_psi() / span,
                (hi.muzzle_velocity - lo.muzzle_velocity).to_fps() / span
            );
        }
    }
}

fn print_search(report: &SearchReport) {
    println!(
        "=== Parametric search: {} of {} powders viable ===\n",
        report.viable, report.total_tested
    );
    println!(
        "{:<16} {:>8} {:>10} {:>7} {:>9} {:>11}",
        "Powder", "Charge", "P (psi)", "% max", "v (fps)", "ft-lbs/gr"
    );
    for r in &report.results {
        match (&r.error, r.optimal_charge) {
            (Some(e), _) => println!("{:<16} error: {e}", r.propellant),
            (None, Some(charge)) => println!(
                "{:<16} {:>8.1} {:>10.0} {:>7.1} {:>9.0} {:>11.1}",
                r.propellant,
                charge.to_grains(),
                r.peak_pressure.to_psi(),
                r.pressure_percent,
                r.muzzle_velocity.to_fps(),
                r.efficiency
            ),
            (None, None) => println!("{:<16} no safe charge in range", r.propellant),
        }
    }
}
