use log::{info, LevelFilter};
use log4rs::{
    append::console::ConsoleAppender,
    config::{Appender, Config, Root},
    encode::pattern::PatternEncoder,
};
use nalgebra::{Vector2, Vector3};
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg64;
use snake_tube::{
    advance::{HeadPose, Steering},
    config::SnakeConfig,
    game_state::GameState,
    growth::GrowthController,
    mesh::BodyMesh,
    simulation::{Simulation, SimulationConfig},
    trail::Trail,
};
use std::{error::Error, path::PathBuf};
use structopt::StructOpt;

const LOGGER_CONFIG: &str = "config/logger.yaml";

// Fraction of the wall radius past which the driver steers back to the center.
const HOME_RADIUS: f32 = 0.7;

#[derive(StructOpt, Debug)]
struct Options {
    /// YAML snake config. Missing fields keep their defaults.
    #[structopt(long, parse(from_os_str))]
    config: Option<PathBuf>,
    #[structopt(long, parse(from_os_str))]
    log_config: Option<PathBuf>,
    #[structopt(long, default_value = "600")]
    ticks: u64,
    #[structopt(long, default_value = "0.016")]
    time_delta: f32,
    /// Ticks between food events.
    #[structopt(long, default_value = "90")]
    food_every: u64,
    #[structopt(long)]
    seed: Option<u64>,
    #[structopt(long)]
    realtime: bool,
}

fn logger_setup(logger_config_path: Option<PathBuf>) -> Result<(), Box<dyn Error>> {
    let is_user_specified = logger_config_path.is_some();
    let logger_config_path = logger_config_path.unwrap_or_else(|| PathBuf::from(LOGGER_CONFIG));

    if logger_config_path.exists() {
        log4rs::init_file(&logger_config_path, Default::default())?;
        return Ok(());
    }
    if is_user_specified {
        return Err(format!(
            "Failed to read logger configuration file: `{}`.",
            logger_config_path.display()
        )
        .into());
    }

    let stdout = ConsoleAppender::builder()
        .encoder(Box::new(PatternEncoder::new(
            "{d(%H:%M:%S%.3f)} {h({l:<5})} {t} - {m}{n}",
        )))
        .build();
    let config = Config::builder()
        .appender(Appender::builder().build("stdout", Box::new(stdout)))
        .build(Root::builder().appender("stdout").build(LevelFilter::Info))?;
    log4rs::init_config(config)?;
    Ok(())
}

// Wanders, turning back when close to the wall, with the occasional jump.
fn steer(rng: &mut Pcg64, pose: &HeadPose, config: &SnakeConfig, steering: &mut Steering) {
    let planar = Vector2::new(pose.position.x, pose.position.z);
    if planar.norm() > config.wall_radius * HOME_RADIUS {
        let forward = pose.forward();
        let to_center = -planar;
        // Positive when the center lies to the right of the heading.
        let side = forward.z * to_center.x - forward.x * to_center.y;
        steering.turn = if side >= 0.0 { 1.0 } else { -1.0 };
    } else if rng.gen_bool(0.05) {
        steering.turn = rng.gen_range(-1.0..1.0);
    }
    if rng.gen_bool(0.01) {
        steering.jump = true;
    }
}

pub fn main() -> Result<(), Box<dyn Error>> {
    let options = Options::from_args();
    logger_setup(options.log_config.clone())?;

    let config = match &options.config {
        Some(path) => SnakeConfig::load(path)?,
        None => SnakeConfig::default(),
    };
    let mut rng = match options.seed {
        Some(seed) => Pcg64::seed_from_u64(seed),
        None => Pcg64::new(0xcafef00dd15ea5e5, 0xa02bdbf7bb3c0a7ac28fa16a64abf96),
    };

    let mut simulation = Simulation::new(
        config.clone(),
        SimulationConfig {
            time_delta: options.time_delta,
            realtime: options.realtime,
        },
        HeadPose::new(Vector3::zeros(), 0.0),
    );

    for tick in 0..options.ticks {
        {
            let resources = simulation.resources_mut();
            let pose = *resources.get::<HeadPose>().ok_or("missing head pose")?;
            if let Some(mut steering) = resources.get_mut::<Steering>() {
                steer(&mut rng, &pose, &config, &mut steering);
            }
            if options.food_every > 0 && tick > 0 && tick % options.food_every == 0 {
                if let Some(mut growth) = resources.get_mut::<GrowthController>() {
                    growth.food_eaten();
                }
            }
        }

        simulation.advance();

        if simulation.is_game_over() {
            break;
        }
    }

    let resources = simulation.resources();
    let length = resources.get::<Trail>().map_or(0, |trail| trail.len());
    let (vertices, triangles, revision) = resources.get::<BodyMesh>().map_or((0, 0, 0), |body| {
        let revision = body.revision();
        body.current().map_or((0, 0, revision), |mesh| {
            (mesh.vertex_count(), mesh.triangle_count(), revision)
        })
    });
    let cause = resources.get::<GameState>().and_then(|state| state.cause());
    info!(
        "Stopped after {} ticks: {} samples, {} vertices, {} triangles, {} rebuilds, game over: {:?}",
        simulation.tick(),
        length,
        vertices,
        triangles,
        revision,
        cause
    );
    Ok(())
}
