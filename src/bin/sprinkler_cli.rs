use clap::{Parser, Subcommand, ValueEnum};
use serde::Serialize;
use sprinkler_engine::{
    CoverageSummary, CoverageSweep, HoseModel, JetParams, ObstacleMesh, Point3D, SimulatedActuator, SprayPoint,
    SprinklerConfig, SprinklerController, SprinklerSystem, SweepOptions, WaterJet, DEFAULT_SPRAY_DURATION_S,
};
use std::error::Error;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "sprinkler")]
#[command(version)]
#[command(about = "Garden sprinkler trajectory and lawn coverage calculator", long_about = None)]
struct Cli {
    /// Log debug output to stderr (RUST_LOG overrides)
    #[arg(long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Sweep the angle grid and list every safe aim
    Sweep {
        /// Configuration file (JSON)
        #[arg(short = 'c', long)]
        config: PathBuf,

        /// Obstacle mesh file (JSON)
        #[arg(short = 'm', long)]
        mesh: Option<PathBuf>,

        /// Evaluate angle pairs in parallel
        #[arg(long)]
        parallel: bool,

        /// Also test every flight sample, not only the landing point
        #[arg(long)]
        check_trajectory: bool,

        /// Samples per jet when testing the flight path
        #[arg(long, default_value = "20")]
        segments: usize,

        /// Output format
        #[arg(short = 'o', long, default_value = "table")]
        output: OutputFormat,
    },

    /// Sample a single jet from the configured sprinkler head
    Trajectory {
        /// Configuration file (JSON)
        #[arg(short = 'c', long)]
        config: PathBuf,

        /// Horizontal angle (degrees)
        #[arg(long, allow_hyphen_values = true)]
        horizontal: f64,

        /// Vertical angle (degrees)
        #[arg(long, allow_hyphen_values = true)]
        vertical: f64,

        /// Number of segments
        #[arg(long, default_value = "20")]
        segments: usize,

        /// Sample the Bezier approximation instead of the parabola
        #[arg(long)]
        bezier: bool,

        /// Output format
        #[arg(short = 'o', long, default_value = "table")]
        output: OutputFormat,
    },

    /// Pressure driven water jet
    Jet {
        /// Water pressure at the nozzle (bar)
        #[arg(short = 'p', long)]
        pressure: f64,

        /// Nozzle diameter (mm)
        #[arg(short = 'n', long, default_value = "6.0")]
        nozzle: f64,

        /// Horizontal angle (degrees)
        #[arg(long, default_value = "0.0", allow_hyphen_values = true)]
        horizontal: f64,

        /// Vertical angle (degrees)
        #[arg(long, default_value = "45.0")]
        vertical: f64,

        /// Nozzle position x (m)
        #[arg(long, default_value = "0.0", allow_hyphen_values = true)]
        x: f64,

        /// Nozzle position y (m)
        #[arg(long, default_value = "0.0", allow_hyphen_values = true)]
        y: f64,

        /// Nozzle position z (m)
        #[arg(long, default_value = "0.0")]
        z: f64,

        /// Number of segments
        #[arg(long, default_value = "20")]
        segments: usize,

        /// Output format
        #[arg(short = 'o', long, default_value = "table")]
        output: OutputFormat,
    },

    /// Show the hose model and derived hydraulics
    Hose {
        /// Configuration file (JSON)
        #[arg(short = 'c', long)]
        config: PathBuf,
    },

    /// Drive the simulated actuator over the coverage sweep
    Simulate {
        /// Configuration file (JSON)
        #[arg(short = 'c', long)]
        config: PathBuf,

        /// Obstacle mesh file (JSON)
        #[arg(short = 'm', long)]
        mesh: Option<PathBuf>,

        /// Spray time per aim (seconds)
        #[arg(short = 'd', long, default_value_t = DEFAULT_SPRAY_DURATION_S)]
        duration: f64,

        /// Output format
        #[arg(short = 'o', long, default_value = "table")]
        output: OutputFormat,
    },

    /// Display engine information
    Info,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum OutputFormat {
    Json,
    Csv,
    Table,
}

#[derive(Debug, Serialize)]
struct SweepReport<'a> {
    summary: CoverageSummary,
    spray_points: &'a [SprayPoint],
}

#[derive(Debug, Serialize)]
struct TrajectoryReport {
    initial_velocity: f64,
    flight_time: f64,
    range: f64,
    apex_height: f64,
    points: Vec<Point3D>,
}

fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn load_mesh(path: Option<&Path>) -> Result<Option<ObstacleMesh>, Box<dyn Error>> {
    Ok(path.map(ObstacleMesh::from_file).transpose()?)
}

fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Commands::Sweep {
            config, mesh, parallel, check_trajectory, segments, output
        } => {
            let config = SprinklerConfig::from_file(&config)?;
            let mesh = load_mesh(mesh.as_deref())?;
            let options = SweepOptions {
                segments,
                check_trajectory,
                ..Default::default()
            };

            let sweep = CoverageSweep::new(&config)
                .with_mesh(mesh.as_ref())
                .with_options(options);
            let points = if parallel { sweep.run_parallel()? } else { sweep.run()? };
            let summary = CoverageSummary::from_points(&points, sweep.angle_grid().len());

            display_sweep(&points, summary, output)?;
        },

        Commands::Trajectory {
            config, horizontal, vertical, segments, bezier, output
        } => {
            let system = SprinklerSystem::new(SprinklerConfig::from_file(&config)?)?;
            let jet = system.parabolic(horizontal, vertical)?;
            let points = if bezier {
                jet.bezier().sample(segments)
            } else {
                jet.calculate_trajectory(segments)
            };

            let report = TrajectoryReport {
                initial_velocity: jet.initial_velocity,
                flight_time: jet.flight_time(),
                range: jet.range(),
                apex_height: jet.apex_height(),
                points,
            };
            display_trajectory(&report, output)?;
        },

        Commands::Jet {
            pressure, nozzle, horizontal, vertical, x, y, z, segments, output
        } => {
            let jet = WaterJet::new(JetParams {
                start_position: Point3D::new(x, y, z),
                horizontal_angle: horizontal,
                vertical_angle: vertical,
                pressure,
                nozzle_diameter: nozzle,
                ..Default::default()
            });
            let parabolic = jet.parabolic()?;
            let spline = jet.calculate_jet()?;

            match output {
                OutputFormat::Json => {
                    #[derive(Serialize)]
                    struct JetReport {
                        initial_velocity: f64,
                        flow_rate_lpm: f64,
                        range: f64,
                        apex_height: f64,
                        spline: sprinkler_engine::JetSpline,
                        points: Vec<Point3D>,
                    }
                    let report = JetReport {
                        initial_velocity: parabolic.initial_velocity,
                        flow_rate_lpm: jet.flow_rate_lpm()?,
                        range: parabolic.range(),
                        apex_height: parabolic.apex_height(),
                        spline,
                        points: spline.sample(segments),
                    };
                    println!("{}", serde_json::to_string_pretty(&report)?);
                },
                OutputFormat::Csv => {
                    println!("x,y,z");
                    for p in spline.sample(segments) {
                        println!("{:.3},{:.3},{:.3}", p.x, p.y, p.z);
                    }
                },
                OutputFormat::Table => {
                    println!("╔════════════════════════════════════════╗");
                    println!("║            WATER JET                   ║");
                    println!("╠════════════════════════════════════════╣");
                    println!("║ Pressure:          {:>8.2} bar        ║", pressure);
                    println!("║ Nozzle:            {:>8.2} mm         ║", nozzle);
                    println!("║ Velocity:          {:>8.2} m/s        ║", parabolic.initial_velocity);
                    println!("║ Flow Rate:         {:>8.2} L/min      ║", jet.flow_rate_lpm()?);
                    println!("║ Range:             {:>8.2} m          ║", parabolic.range());
                    println!("║ Apex Height:       {:>8.2} m          ║", parabolic.apex_height());
                    println!("╚════════════════════════════════════════╝");
                    print_points(&spline.sample(segments));
                },
            }
        },

        Commands::Hose { config } => {
            let config = SprinklerConfig::from_file(&config)?;
            let velocity = config.hose.initial_velocity()?;

            println!("Hose model: {}", config.hose.name());
            match &config.hose {
                HoseModel::Calibration(hose) => {
                    println!();
                    println!("{}", hose.specs()?);
                },
                HoseModel::Performance(_) | HoseModel::Pressure(_) => {
                    println!("Initial velocity: {:.3} m/s", velocity);
                    println!("Lawn area: {:.2} m²", config.lawn.area());
                },
            }
        },

        Commands::Simulate {
            config, mesh, duration, output
        } => {
            let config = SprinklerConfig::from_file(&config)?;
            let motors = config.motors;
            let mut system = SprinklerSystem::new(config)?;
            if let Some(mesh) = load_mesh(mesh.as_deref())? {
                system.set_mesh(mesh);
            }

            let mut controller = SprinklerController::new(SimulatedActuator::new()).with_motors(motors);
            let movements = controller.run(system.spray_points()?, duration)?;
            let actuator = controller.into_actuator();

            match output {
                OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&movements)?),
                OutputFormat::Csv => {
                    println!("h_angle,v_angle,spray_duration");
                    for m in &movements {
                        println!("{:.2},{:.2},{:.3}", m.h_angle, m.v_angle, m.spray_duration);
                    }
                },
                OutputFormat::Table => {
                    println!("╔════════════════════════════════════════╗");
                    println!("║         SIMULATED RUN                  ║");
                    println!("╠════════════════════════════════════════╣");
                    println!("║ Movements:         {:>8}            ║", movements.len());
                    println!("║ Total Spray Time:  {:>8.2} s          ║", actuator.total_spray_s);
                    println!("╚════════════════════════════════════════╝");
                },
            }
        },

        Commands::Info => {
            println!("╔════════════════════════════════════════╗");
            println!("║      SPRINKLER ENGINE v{:<8}        ║", env!("CARGO_PKG_VERSION"));
            println!("╠════════════════════════════════════════╣");
            println!("║ Trajectory and coverage engine for a   ║");
            println!("║ two-axis garden sprinkler.             ║");
            println!("╠════════════════════════════════════════╣");
            println!("║ Features:                              ║");
            println!("║ • Hose calibration and pressure models ║");
            println!("║ • Parabolic and Bezier jets            ║");
            println!("║ • Lawn edge and obstacle mesh checks   ║");
            println!("║ • Coverage sweep over the angle grid   ║");
            println!("╚════════════════════════════════════════╝");
        }
    }

    Ok(())
}

fn print_points(points: &[Point3D]) {
    println!("┌──────────┬──────────┬──────────┐");
    println!("│  X (m)   │  Y (m)   │  Z (m)   │");
    println!("├──────────┼──────────┼──────────┤");
    for p in points {
        println!("│ {:>8.2} │ {:>8.2} │ {:>8.2} │", p.x, p.y, p.z);
    }
    println!("└──────────┴──────────┴──────────┘");
}

fn display_sweep(points: &[SprayPoint], summary: CoverageSummary, format: OutputFormat) -> Result<(), Box<dyn Error>> {
    match format {
        OutputFormat::Json => {
            let report = SweepReport { summary, spray_points: points };
            println!("{}", serde_json::to_string_pretty(&report)?);
        },

        OutputFormat::Csv => {
            println!("h_angle,v_angle,distance,x,y,z");
            for p in points {
                println!("{:.2},{:.2},{:.3},{:.3},{:.3},{:.3}",
                    p.h_angle, p.v_angle, p.distance, p.end_point.x, p.end_point.y, p.end_point.z);
            }
        },

        OutputFormat::Table => {
            println!("╔════════════════════════════════════════╗");
            println!("║         COVERAGE SWEEP                 ║");
            println!("╠════════════════════════════════════════╣");
            println!("║ Angle Pairs:       {:>8}            ║", summary.evaluated);
            println!("║ Accepted:          {:>8}            ║", summary.accepted);
            println!("║ Min Distance:      {:>8.2} m          ║", summary.min_distance.unwrap_or(0.0));
            println!("║ Max Distance:      {:>8.2} m          ║", summary.max_distance.unwrap_or(0.0));
            println!("║ Horizontal Span:   {:>8.1} °          ║", summary.horizontal_span());
            println!("╚════════════════════════════════════════╝");

            if points.is_empty() {
                println!("\nNo safe aim found.");
                return Ok(());
            }

            println!("\nSpray Points:");
            println!("┌──────────┬──────────┬──────────┬──────────┬──────────┐");
            println!("│  H (°)   │  V (°)   │ Dist (m) │  X (m)   │  Y (m)   │");
            println!("├──────────┼──────────┼──────────┼──────────┼──────────┤");
            for p in points {
                println!("│ {:>8.1} │ {:>8.1} │ {:>8.2} │ {:>8.2} │ {:>8.2} │",
                    p.h_angle, p.v_angle, p.distance, p.end_point.x, p.end_point.y);
            }
            println!("└──────────┴──────────┴──────────┴──────────┴──────────┘");
        },
    }

    Ok(())
}

fn display_trajectory(report: &TrajectoryReport, format: OutputFormat) -> Result<(), Box<dyn Error>> {
    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(report)?);
        },

        OutputFormat::Csv => {
            println!("x,y,z");
            for p in &report.points {
                println!("{:.3},{:.3},{:.3}", p.x, p.y, p.z);
            }
        },

        OutputFormat::Table => {
            println!("╔════════════════════════════════════════╗");
            println!("║         TRAJECTORY RESULTS             ║");
            println!("╠════════════════════════════════════════╣");
            println!("║ Initial Velocity:  {:>8.2} m/s        ║", report.initial_velocity);
            println!("║ Time of Flight:    {:>8.3} s          ║", report.flight_time);
            println!("║ Range:             {:>8.2} m          ║", report.range);
            println!("║ Apex Height:       {:>8.2} m          ║", report.apex_height);
            println!("╚════════════════════════════════════════╝");
            print_points(&report.points);
        },
    }

    Ok(())
}
