//! Collision demo application
//!
//! Builds a rolling terrain hierarchy and drops a sphere, a tilted box and a
//! lying capsule onto it, logging contacts, cost totals and traversal
//! statistics for each query.
//!
//! Usage: `collision_demo [config.toml | config.ron]`

use narrow_phase::foundation::logging;
use narrow_phase::prelude::*;

const GRID_CELLS: usize = 32;

fn terrain_height(x: f32, z: f32) -> f32 {
    0.6 * (x * 0.35).sin() + 0.4 * (z * 0.25).cos()
}

fn build_terrain() -> Vec<Triangle> {
    let vertex = |i: usize, j: usize| {
        let (x, z) = (i as f32, j as f32);
        Vec3::new(x, terrain_height(x, z), z)
    };

    let mut triangles = Vec::with_capacity(GRID_CELLS * GRID_CELLS * 2);
    for i in 0..GRID_CELLS {
        for j in 0..GRID_CELLS {
            triangles.push(Triangle::new(vertex(i, j), vertex(i + 1, j), vertex(i, j + 1)));
            triangles.push(Triangle::new(vertex(i + 1, j), vertex(i + 1, j + 1), vertex(i, j + 1)));
        }
    }
    triangles
}

fn load_config() -> Result<TraversalConfig, Box<dyn std::error::Error>> {
    match std::env::args().nth(1) {
        Some(path) => {
            log::info!("Loading configuration from {path}");
            Ok(TraversalConfig::load_from_file(&path)?)
        }
        None => {
            log::info!("No configuration file given, using defaults");
            Ok(TraversalConfig::default())
        }
    }
}

fn run_queries<S: ConvexShape>(
    model: &BvhModel<Aabb>,
    shape: &PosedShape<S>,
    config: &TraversalConfig,
) -> Result<(), CollisionError> {
    let kind = shape.shape().kind();

    let mut node = ShapeCollisionNode::bind(model, shape, config.collect_statistics)?;
    let mut contacts: Vec<Contact> = Vec::new();
    let outcome = collide(&mut node, &CollisionQuery::from_config(config), &mut contacts)?;
    log::info!(
        "{kind}: {} contact(s){}",
        outcome.contacts_added,
        if outcome.stopped_early { " (stopped early)" } else { "" }
    );
    if let Some(first) = contacts.first() {
        log::info!(
            "{kind}: first contact on triangle {} at ({:.3}, {:.3}, {:.3})",
            first.primitive,
            first.point.x,
            first.point.y,
            first.point.z
        );
    }

    let report = accumulate_cost(&mut node, &CostQuery::from_config(&config.cost))?;
    log::info!(
        "{kind}: cost {:.4} over {} region(s){}",
        report.total_cost,
        report.regions_counted,
        if report.budget_reached { " (budget reached)" } else { "" }
    );
    if let Some(heaviest) = report.sources.first() {
        log::info!(
            "{kind}: heaviest region {:.4} from {:?} to {:?}",
            heaviest.total_cost(),
            heaviest.aabb_min(),
            heaviest.aabb_max()
        );
    }

    if node.statistics_enabled() {
        let stats = node.statistics();
        log::info!(
            "{kind}: {} BV test(s), {} leaf test(s), {:.3} ms",
            stats.bv_tests,
            stats.leaf_tests,
            stats.query_seconds * 1000.0
        );
    }
    Ok(())
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    logging::init()?;
    log::info!("Starting collision demo...");

    let config = load_config()?;

    let mut stopwatch = Stopwatch::start_new();
    let model: BvhModel<Aabb> = BvhBuilder::new().with_max_leaf_primitives(2).build(build_terrain())?;
    stopwatch.stop();
    log::info!(
        "Terrain: {} triangles, {} nodes, height {} (built in {:.3} ms)",
        model.triangles().len(),
        model.node_count(),
        model.height(),
        stopwatch.elapsed_seconds() * 1000.0
    );

    let center = GRID_CELLS as f32 * 0.5;

    let sphere = PosedShape::new(
        Sphere::new(1.2),
        math::translation(Vec3::new(center, terrain_height(center, center) + 0.5, center)),
    );
    run_queries(&model, &sphere, &config)?;

    let tilted = Quat::from_euler_angles(0.3, 0.7, 0.1);
    let cuboid = PosedShape::new(
        Cuboid::new(Vec3::new(1.5, 0.5, 1.0)),
        math::pose(Vec3::new(8.0, terrain_height(8.0, 20.0), 20.0), tilted),
    )
    .with_cost_density(2.0);
    run_queries(&model, &cuboid, &config)?;

    let lying = Quat::from_axis_angle(&Vec3::z_axis(), std::f32::consts::FRAC_PI_2);
    let mut capsule = PosedShape::new(
        Capsule::new(0.4, 2.0),
        math::pose(Vec3::new(24.0, terrain_height(24.0, 6.0) + 3.0, 6.0), lying),
    );
    run_queries(&model, &capsule, &config)?;

    // Let the capsule settle onto the terrain and query again
    capsule.set_pose(math::pose(Vec3::new(24.0, terrain_height(24.0, 6.0) + 0.2, 6.0), lying));
    run_queries(&model, &capsule, &config)?;

    log::info!("Collision demo finished");
    Ok(())
}
