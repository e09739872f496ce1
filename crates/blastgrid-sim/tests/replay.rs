//! Replaying each tick's changes onto the previous snapshot must
//! reproduce the engine's own snapshot, whatever happens in the match.

use std::time::Duration;

use blastgrid_protocol::{Direction, PlayerId};
use blastgrid_sim::{Change, SimConfig, Simulation, Snapshot, Tile};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

const DT: Duration = Duration::from_nanos(16_666_667);

fn roster() -> Vec<(PlayerId, String)> {
    ["ada", "bob", "cy", "dee"]
        .iter()
        .enumerate()
        .map(|(i, name)| (PlayerId(i as u64 + 1), (*name).to_owned()))
        .collect()
}

/// Random but reproducible inputs for every player.
fn drive(sim: &mut Simulation, script: &mut StdRng) {
    for id in 1..=4 {
        let id = PlayerId(id);
        match script.random_range(0..20) {
            0 => sim.place_bomb(id).unwrap(),
            1..=3 => {
                let dir = Direction::ALL[script.random_range(0..4)];
                sim.start_moving(id, dir).unwrap();
            }
            4 => {
                let dir = Direction::ALL[script.random_range(0..4)];
                sim.stop_moving(id, dir).unwrap();
            }
            _ => {}
        }
    }
}

fn play(seed: u64, config: SimConfig, ticks: usize) -> (Snapshot, Vec<Change>) {
    let mut sim = Simulation::new(config, &roster(), StdRng::seed_from_u64(seed)).unwrap();
    let mut script = StdRng::seed_from_u64(seed ^ 0xB0B);
    let mut client = sim.snapshot();
    let mut history = Vec::new();

    for tick in 0..ticks {
        drive(&mut sim, &mut script);
        sim.step(DT);
        let changes = sim.drain_changes();
        client.apply_all(&changes);
        assert_eq!(client, sim.snapshot(), "replay diverged at tick {tick} (seed {seed})");
        history.extend(changes);
    }
    (client, history)
}

#[test]
fn test_replay_matches_engine_on_standard_map() {
    for seed in 0..4 {
        play(seed, SimConfig::default(), 1_800);
    }
}

#[test]
fn test_replay_matches_with_frequent_power_ups() {
    let config = SimConfig {
        powerup_chance: 1.0,
        block_density: 0.4,
        ..SimConfig::default()
    };
    let (_, history) = play(99, config, 2_400);
    assert!(
        history.iter().any(|c| matches!(c, Change::BlockDestroyed(_))),
        "the script should blow up at least one block"
    );
}

#[test]
fn test_destroyed_cells_never_revert() {
    let mut sim =
        Simulation::new(SimConfig::default(), &roster(), StdRng::seed_from_u64(5)).unwrap();
    let mut script = StdRng::seed_from_u64(6);
    let mut destroyed = Vec::new();

    for _ in 0..2_400 {
        drive(&mut sim, &mut script);
        sim.step(DT);
        for change in sim.drain_changes() {
            if let Change::BlockDestroyed(pos) = change {
                destroyed.push(pos);
            }
        }
        for pos in &destroyed {
            assert_eq!(sim.grid().get(*pos), Some(Tile::Empty));
        }
    }
    assert_eq!(
        sim.grid().count(Tile::Block) + destroyed.len(),
        sim.initial_blocks()
    );
}
