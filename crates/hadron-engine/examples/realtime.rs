//! Hadron realtime: a pinned anchor dragging a chain through a viscous medium.
//!
//! Demonstrates:
//!   1. Building a particle buffer and link topology
//!   2. Starting an Engine with a background worker
//!   3. Moving a fixed particle from the host while the worker integrates
//!   4. Reading results and run statistics through sync()
//!   5. Stopping and reading the StopReport
//!
//! Run with:
//!   RUST_LOG=info cargo run --example realtime

use std::thread;
use std::time::Duration;

use hadron_core::{Link, Parameters, Particle, ParticleInfo, StateLayout, Vector};
use hadron_engine::{Engine, EngineConfig};

// ─── System ─────────────────────────────────────────────────────

const CHAIN: usize = 8;
const SPACING: f64 = 1.0;

type L = StateLayout<2>;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let particles: Vec<Particle<2>> = (0..CHAIN)
        .map(|i| Particle::at([i as f64 * SPACING, 0.0]))
        .collect();
    let mut data = L::pack(&particles);
    let mut infos = vec![ParticleInfo::default(); CHAIN];
    infos[0].fixed = true;
    let links: Vec<Link> = (1..CHAIN).map(|i| Link::new(i - 1, i)).collect();

    let mut params = Parameters::default();
    params.input.gravity = -2.0;

    let mut engine = Engine::<2>::new(EngineConfig::default())?;
    engine.start(&params, &data, &infos, &links)?;

    // ─── Host loop: sweep the anchor in a circle ────────────────

    for frame in 0..40 {
        let angle = frame as f64 * 0.15;
        L::set_position(&mut data, 0, Vector::new([angle.cos(), angle.sin()]));
        engine.sync(&mut params, &mut data, &infos)?;

        if frame % 10 == 0 {
            let tail = L::position(&data, CHAIN - 1);
            println!(
                "frame {frame:2}: steps {:6}  real-time scale {:.3}  tail ({:+.3}, {:+.3})",
                params.output.step_count,
                params.output.real_time_scale,
                tail[0],
                tail[1],
            );
        }
        thread::sleep(Duration::from_millis(25));
    }

    let report = engine.stop()?;
    println!(
        "stopped after {} steps in {}ms (worker joined: {})",
        report.step_count, report.total_ms, report.worker_joined
    );
    Ok(())
}
