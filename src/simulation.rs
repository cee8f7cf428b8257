use crate::{
    advance::{advance_head_system, HeadMotion, HeadPose, Steering},
    collision::{check_collisions_system, Boundaries, CollisionDetector},
    config::SnakeConfig,
    game_state::GameState,
    growth::{apply_growth_system, GrowthController},
    mesh::{rebuild_body_system, BodyMesh, TubeMeshBuilder},
    trail::{update_trail_system, Trail},
    wall::RingWall,
};
use legion::*;
use log::{debug, info};
use std::time::{Duration, Instant};

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SimulationData {
    pub tick: u64,
    pub time: f64,
    pub last_simulated: Option<Instant>,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SimulationConfig {
    pub time_delta: f32,
    /// Sleep so ticks are at least `time_delta` apart in wall time.
    pub realtime: bool,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            time_delta: 1.0 / 60.0,
            realtime: false,
        }
    }
}

/// Wires every collaborator the tick systems read as a resource. The head
/// is placed on the base plane and the trail laid out behind it.
pub fn init_simulation(
    resources: &mut Resources,
    config: SnakeConfig,
    simulation_config: SimulationConfig,
    spawn: HeadPose,
) {
    let config = config.sanitized();
    let mut spawn = spawn;
    spawn.position.y = config.snake_base_y;
    let trail = Trail::new(spawn.position, spawn.forward(), &config);
    info!(
        "Spawned snake at {:?} with {} samples",
        spawn.position,
        trail.len()
    );

    resources.insert(SimulationData {
        tick: 0,
        time: 0.0,
        last_simulated: None,
    });
    resources.insert(simulation_config);
    resources.insert(spawn);
    resources.insert(HeadMotion::default());
    resources.insert(Steering::default());
    resources.insert(trail);
    resources.insert(GrowthController::new(&config));
    resources.insert(CollisionDetector::new(&config));
    resources.insert(Boundaries::new(RingWall::new(&config)));
    resources.insert(TubeMeshBuilder::new(&config));
    resources.insert(BodyMesh::default());
    resources.insert(GameState::default());
    resources.insert(config);
}

/// One tick: head, growth, trail, collisions, body, clock.
pub fn build_schedule() -> Schedule {
    Schedule::builder()
        .add_system(advance_head_system())
        .add_system(apply_growth_system())
        .add_system(update_trail_system())
        .add_system(check_collisions_system())
        .add_system(rebuild_body_system())
        .add_system(advance_time_system())
        .build()
}

#[system]
pub fn advance_time(
    #[resource] simulation_data: &mut SimulationData,
    #[resource] simulation_config: &SimulationConfig,
) {
    simulation_data.tick += 1;
    simulation_data.time += f64::from(simulation_config.time_delta);
    if simulation_config.realtime {
        let frame = Duration::from_secs_f32(simulation_config.time_delta.max(0.0));
        if let Some(last) = simulation_data.last_simulated {
            let elapsed = last.elapsed();
            debug!("Frame time: {:?}", elapsed);
            if elapsed < frame {
                std::thread::sleep(frame - elapsed);
            }
        }
        simulation_data.last_simulated = Some(Instant::now());
    }
}

/// World, resources and schedule for a single snake.
pub struct Simulation {
    world: World,
    resources: Resources,
    schedule: Schedule,
}

impl Simulation {
    pub fn new(config: SnakeConfig, simulation_config: SimulationConfig, spawn: HeadPose) -> Self {
        let mut resources = Resources::default();
        init_simulation(&mut resources, config, simulation_config, spawn);
        Self {
            world: World::default(),
            resources,
            schedule: build_schedule(),
        }
    }

    /// Runs one tick.
    pub fn advance(&mut self) {
        self.schedule.execute(&mut self.world, &mut self.resources);
    }

    pub fn resources(&self) -> &Resources {
        &self.resources
    }

    pub fn resources_mut(&mut self) -> &mut Resources {
        &mut self.resources
    }

    pub fn is_game_over(&self) -> bool {
        self.resources
            .get::<GameState>()
            .map_or(false, |state| state.is_game_over())
    }

    pub fn tick(&self) -> u64 {
        self.resources
            .get::<SimulationData>()
            .map_or(0, |data| data.tick)
    }
}
