use anyhow::Context;
use clap::{Parser, Subcommand};
use robolink::{init_logging, Config, Device, MoveType, OperationOutcome, Pose, PositionPoint};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "robolink", version, about = "Drive configured robots and tools")]
struct Cli {
    /// Configuration file (JSON or TOML)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List configured devices
    Devices,
    /// Connect to a device, print its output, then disconnect
    Connect { device: String },
    /// Move a device's pointer
    Move {
        device: String,
        #[arg(allow_negative_numbers = true)]
        x: f64,
        #[arg(allow_negative_numbers = true)]
        y: f64,
        #[arg(allow_negative_numbers = true)]
        z: f64,
        #[arg(default_value_t = 0.0, allow_negative_numbers = true)]
        r: f64,
        #[arg(default_value_t = 0.0, allow_negative_numbers = true)]
        p: f64,
        #[arg(default_value_t = 0.0, allow_negative_numbers = true)]
        w: f64,
        /// Move speed in model units per second
        #[arg(short, long, default_value_t = 100.0)]
        speed: f64,
        /// Exact stop at the target
        #[arg(long)]
        fine: bool,
    },
    /// Fetch charts and states once and print them as JSON
    Telemetry { device: String },
    /// Send `reset_device`
    Reset { device: String },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_logging()?;
    tracing::debug!("robolink {} built {}", robolink::VERSION, robolink::BUILD_DATE);

    let cli = Cli::parse();
    let path = match cli.config {
        Some(path) => path,
        None => robolink_settings::default_config_path()?,
    };
    let config = Config::load_or_default(&path)
        .with_context(|| format!("loading {}", path.display()))?;

    match cli.command {
        Command::Devices => {
            if config.devices.is_empty() {
                println!("no devices configured in {}", path.display());
            }
            for device in &config.devices {
                println!("{}\t{}\t{}", device.name, device.kind, device.transport);
            }
        }
        Command::Connect { device } => {
            let device = assemble(&config, &device)?;
            connect(&device).await;
            print_output(&device);
            device.connector().disconnect().wait().await;
        }
        Command::Move {
            device,
            x,
            y,
            z,
            r,
            p,
            w,
            speed,
            fine,
        } => {
            let device = assemble(&config, &device)?;
            if device.settings().update_model {
                connect(&device).await;
            }

            let move_type = if fine { MoveType::Fine } else { MoveType::Linear };
            let point = PositionPoint::new(Pose::new(x, y, z, r, p, w), move_type, speed);
            let handle = device.controller().move_to(point).await;

            let result = tokio::select! {
                result = handle.wait() => result,
                _ = tokio::signal::ctrl_c() => {
                    device.controller().stop_and_wait().await;
                    handle.result()
                }
            };
            println!("{:?}", result);
            println!("pointer: {}", device.controller().pointer());
            print_output(&device);

            device.shutdown().await;
            device.connector().disconnect().wait().await;
        }
        Command::Telemetry { device } => {
            let device = assemble(&config, &device)?;
            connect(&device).await;
            if !device.telemetry().fetch_initial().await {
                tracing::warn!("{}: no telemetry", device.name());
            }
            println!(
                "{}",
                serde_json::to_string_pretty(&device.telemetry().snapshot())?
            );
            device.connector().disconnect().wait().await;
        }
        Command::Reset { device } => {
            let device = assemble(&config, &device)?;
            connect(&device).await;
            let reset = device.connector().reset_device().await;
            print_output(&device);
            device.connector().disconnect().wait().await;
            if !reset {
                anyhow::bail!("{}: reset failed", device.name());
            }
        }
    }

    Ok(())
}

fn assemble(config: &Config, name: &str) -> anyhow::Result<Device> {
    let settings = config.device(name)?;
    Device::from_settings(settings)
}

async fn connect(device: &Device) {
    match device.connector().connect().wait().await {
        OperationOutcome::Completed(true) => tracing::info!("{}: connected", device.name()),
        outcome => tracing::warn!("{}: not connected ({:?})", device.name(), outcome),
    }
}

fn print_output(device: &Device) {
    for line in device.output().lines() {
        println!("{}", line);
    }
}
