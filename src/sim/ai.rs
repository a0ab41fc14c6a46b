//! Enemy behavior state machine
//!
//! Each tick an enemy first reacts to what it can see (`TargetSeen` /
//! `TargetLost`), then acts for its current state, which may raise a second
//! stimulus (`TimerExpired`, `Arrived`, `Blocked`). Every state change goes
//! through [`transition`], so the table below is the whole story:
//!
//! | kind     | from       | stimulus          | to     |
//! |----------|------------|-------------------|--------|
//! | any      | not Attack | TargetSeen        | Attack |
//! | any      | not Attack | Hit               | Search |
//! | any      | Attack     | TargetLost        | Search |
//! | Walker   | Search     | TimerExpired      | Patrol |
//! | Guardian | Search     | TimerExpired      | Idle   |
//! | Walker   | Idle       | TimerExpired      | Patrol |
//! | Walker   | Patrol     | Arrived / Blocked | Idle   |

use glam::Vec2;
use rand::Rng;

use super::collision::resolve_move;
use super::perception::can_see;
use super::pool::{Handle, Pool};
use super::state::{Abilities, Agent, AiKind, Behavior, BehaviorKind, Door, Level, Projectile};
use crate::consts::{PATROL_ARRIVE_DIST, PROJECTILE_RADIUS, SEARCH_ARRIVE_DIST};
use crate::settings::AiTuning;
use crate::{bearing_deg, heading_vec, turn_toward, wrap_degrees};

/// Something that can take newly fired projectiles
pub trait ProjectileSink {
    fn spawn(&mut self, projectile: Projectile);
}

impl ProjectileSink for Vec<Projectile> {
    fn spawn(&mut self, projectile: Projectile) {
        self.push(projectile);
    }
}

impl ProjectileSink for Pool<Projectile> {
    fn spawn(&mut self, projectile: Projectile) {
        self.insert(projectile);
    }
}

/// Inputs to the transition table
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stimulus {
    TargetSeen,
    TargetLost,
    /// Struck by something while not fighting
    Hit,
    TimerExpired,
    Arrived,
    Blocked,
}

/// Shared, read-only inputs for one enemy update
#[derive(Debug, Clone, Copy)]
pub struct AiEnv<'a> {
    pub level: &'a Level,
    pub tuning: &'a AiTuning,
    pub dt: f32,
}

/// The transition table. `None` means "stay put".
pub fn transition(kind: AiKind, from: BehaviorKind, stimulus: Stimulus) -> Option<BehaviorKind> {
    use BehaviorKind::*;

    match (kind, from, stimulus) {
        (AiKind::None, _, _) => None,
        (_, Attack, Stimulus::TargetSeen | Stimulus::Hit) => None,
        (_, _, Stimulus::TargetSeen) => Some(Attack),
        (_, _, Stimulus::Hit) => Some(Search),
        (_, Attack, Stimulus::TargetLost) => Some(Search),
        (AiKind::Walker, Search, Stimulus::TimerExpired) => Some(Patrol),
        (AiKind::Guardian, Search, Stimulus::TimerExpired) => Some(Idle),
        (AiKind::Walker, Idle, Stimulus::TimerExpired) => Some(Patrol),
        (AiKind::Walker, Patrol, Stimulus::Arrived | Stimulus::Blocked) => Some(Idle),
        _ => None,
    }
}

/// Feed a stimulus through the table, running the entry action on a change.
///
/// Returns true if the state changed.
pub fn apply_stimulus<R: Rng + ?Sized>(
    agent: &mut Agent,
    stimulus: Stimulus,
    target: Vec2,
    tuning: &AiTuning,
    rng: &mut R,
) -> bool {
    let from = agent.behavior.kind();
    let Some(next) = transition(agent.ai, from, stimulus) else {
        return false;
    };

    agent.behavior = match next {
        BehaviorKind::Idle => Behavior::Idle {
            wait: random_wait(tuning, rng),
        },
        BehaviorKind::Patrol => Behavior::Patrol {
            goal: random_patrol_goal(agent.pos, tuning.patrol_radius, rng),
        },
        BehaviorKind::Attack => {
            agent.last_known_target = target;
            Behavior::Attack {
                reaction: tuning.reaction_time,
            }
        }
        BehaviorKind::Search => Behavior::Search {
            timer: agent.search_duration,
            arrived: false,
        },
    };
    log::debug!("{:?} {:?} -> {:?} on {:?}", agent.ai, from, next, stimulus);
    true
}

fn random_wait<R: Rng + ?Sized>(tuning: &AiTuning, rng: &mut R) -> f32 {
    let lo = tuning.idle_wait_min.min(tuning.idle_wait_max).max(0.0);
    let hi = tuning.idle_wait_min.max(tuning.idle_wait_max).max(lo);
    rng.random_range(lo..=hi)
}

/// A random point within `radius` of `origin`
pub fn random_patrol_goal<R: Rng + ?Sized>(origin: Vec2, radius: f32, rng: &mut R) -> Vec2 {
    let heading = rng.random_range(0.0f32..360.0);
    let dist = rng.random_range(0.0f32..=radius.max(0.0));
    origin + heading_vec(heading) * dist
}

/// Nearest door to `pos`, by door center
pub fn nearest_door(pos: Vec2, level: &Level) -> Option<&Door> {
    level.doors.iter().min_by(|a, b| {
        pos.distance_squared(a.rect.center())
            .total_cmp(&pos.distance_squared(b.rect.center()))
    })
}

/// What a state's per-tick step produced
#[derive(Debug, Default)]
struct StepOutcome {
    stimulus: Option<Stimulus>,
    fired: bool,
}

impl StepOutcome {
    fn raise(stimulus: Stimulus) -> Self {
        Self {
            stimulus: Some(stimulus),
            fired: false,
        }
    }
}

/// Advance one enemy by one tick.
///
/// `owner` tags any projectile fired so it never hits its shooter. Returns
/// true if a shot was fired. Inactive, restrained and non-AI agents are left
/// untouched.
pub fn update_enemy<S, R>(
    agent: &mut Agent,
    owner: Option<Handle>,
    target: Vec2,
    env: &AiEnv<'_>,
    sink: &mut S,
    rng: &mut R,
) -> bool
where
    S: ProjectileSink + ?Sized,
    R: Rng + ?Sized,
{
    if !agent.is_thinking() {
        return false;
    }

    agent.shoot_cooldown = (agent.shoot_cooldown - env.dt).max(0.0);

    let sees = can_see(agent, target, env.level);
    let seen_stimulus = match (sees, agent.behavior.kind()) {
        (true, BehaviorKind::Attack) => None,
        (true, _) => Some(Stimulus::TargetSeen),
        (false, BehaviorKind::Attack) => Some(Stimulus::TargetLost),
        (false, _) => None,
    };
    if let Some(stimulus) = seen_stimulus {
        apply_stimulus(agent, stimulus, target, env.tuning, rng);
    }
    if sees {
        agent.last_known_target = target;
    }

    let outcome = match agent.behavior {
        Behavior::Attack { .. } => attack(agent, owner, target, env, sink, rng),
        Behavior::Search { .. } => search(agent, env),
        Behavior::Patrol { .. } => patrol(agent, env),
        Behavior::Idle { .. } => idle(agent, env, rng),
    };
    if let Some(stimulus) = outcome.stimulus {
        apply_stimulus(agent, stimulus, target, env.tuning, rng);
    }
    outcome.fired
}

/// Something struck `agent` from `source`: go looking unless already fighting.
///
/// Returns true if the agent started searching.
pub fn notify_hit<R: Rng + ?Sized>(
    agent: &mut Agent,
    source: Vec2,
    tuning: &AiTuning,
    rng: &mut R,
) -> bool {
    if !agent.is_thinking() {
        return false;
    }
    let changed = apply_stimulus(agent, Stimulus::Hit, source, tuning, rng);
    if changed {
        agent.last_known_target = source;
    }
    changed
}

fn attack<S, R>(
    agent: &mut Agent,
    owner: Option<Handle>,
    target: Vec2,
    env: &AiEnv<'_>,
    sink: &mut S,
    rng: &mut R,
) -> StepOutcome
where
    S: ProjectileSink + ?Sized,
    R: Rng + ?Sized,
{
    let tuning = env.tuning;
    let ready = match &mut agent.behavior {
        Behavior::Attack { reaction } => {
            *reaction = (*reaction - env.dt).max(0.0);
            *reaction <= 0.0
        }
        _ => return StepOutcome::default(),
    };

    let bearing = bearing_deg(agent.pos, target);
    agent.rotation = turn_toward(agent.rotation, bearing, tuning.attack_turn_rate * env.dt);

    if agent.ai == AiKind::Walker {
        let to_target = target - agent.pos;
        let dist = to_target.length();
        if dist > tuning.standoff_range {
            let step = (dist - tuning.standoff_range).min(agent.identity.speed * env.dt);
            let (pos, _) = resolve_move(agent, to_target.normalize_or_zero() * step, env.level);
            agent.pos = pos;
        }
    }

    let armed = agent.identity.abilities.contains(Abilities::ARMED);
    if !(ready && armed && agent.shoot_cooldown <= 0.0) {
        return StepOutcome::default();
    }

    let inaccuracy = tuning.inaccuracy.abs();
    let spread = if inaccuracy > 0.0 && inaccuracy.is_finite() {
        rng.random_range(-inaccuracy..=inaccuracy)
    } else {
        0.0
    };
    let heading = wrap_degrees(agent.rotation + spread);
    let muzzle = agent.pos + heading_vec(heading) * (agent.radius + PROJECTILE_RADIUS + 1.0);
    sink.spawn(Projectile::new(muzzle, heading, owner));
    agent.shoot_cooldown = tuning.fire_cooldown;

    StepOutcome {
        stimulus: None,
        fired: true,
    }
}

fn search(agent: &mut Agent, env: &AiEnv<'_>) -> StepOutcome {
    let tuning = env.tuning;
    let Behavior::Search {
        mut timer,
        mut arrived,
    } = agent.behavior
    else {
        return StepOutcome::default();
    };
    let goal = agent.last_known_target;

    match agent.ai {
        AiKind::Walker if !arrived => {
            let to_goal = goal - agent.pos;
            let dist = to_goal.length();
            if dist <= SEARCH_ARRIVE_DIST {
                arrived = true;
            } else {
                agent.rotation = turn_toward(
                    agent.rotation,
                    bearing_deg(agent.pos, goal),
                    tuning.search_turn_rate * env.dt,
                );
                let step = to_goal / dist * (agent.identity.speed * env.dt).min(dist);
                let (pos, blocked) = resolve_move(agent, step, env.level);
                agent.pos = pos;
                // A bump ends the chase; look around from here
                arrived = blocked || agent.pos.distance(goal) <= SEARCH_ARRIVE_DIST;
            }
        }
        // The look-around clock only runs once there
        AiKind::Walker => {
            agent.rotation = wrap_degrees(agent.rotation + tuning.spin_rate * env.dt);
            timer = (timer - env.dt).max(0.0);
        }
        AiKind::Guardian => {
            agent.rotation = turn_toward(
                agent.rotation,
                bearing_deg(agent.pos, goal),
                tuning.search_turn_rate * env.dt,
            );
            timer = (timer - env.dt).max(0.0);
        }
        AiKind::None => {}
    }

    agent.behavior = Behavior::Search { timer, arrived };

    let done = timer <= 0.0 && (arrived || agent.ai != AiKind::Walker);
    if done {
        StepOutcome::raise(Stimulus::TimerExpired)
    } else {
        StepOutcome::default()
    }
}

fn patrol(agent: &mut Agent, env: &AiEnv<'_>) -> StepOutcome {
    let Behavior::Patrol { goal } = agent.behavior else {
        return StepOutcome::default();
    };
    if agent.ai != AiKind::Walker {
        return StepOutcome::default();
    }

    let to_goal = goal - agent.pos;
    let dist = to_goal.length();
    if dist <= PATROL_ARRIVE_DIST {
        return StepOutcome::raise(Stimulus::Arrived);
    }

    agent.rotation = turn_toward(
        agent.rotation,
        bearing_deg(agent.pos, goal),
        env.tuning.patrol_turn_rate * env.dt,
    );
    let speed = agent.identity.speed * env.tuning.patrol_speed_factor;
    let step = to_goal / dist * (speed * env.dt).min(dist);
    let (pos, blocked) = resolve_move(agent, step, env.level);
    agent.pos = pos;

    if blocked {
        StepOutcome::raise(Stimulus::Blocked)
    } else if agent.pos.distance(goal) <= PATROL_ARRIVE_DIST {
        StepOutcome::raise(Stimulus::Arrived)
    } else {
        StepOutcome::default()
    }
}

fn idle<R: Rng + ?Sized>(agent: &mut Agent, env: &AiEnv<'_>, rng: &mut R) -> StepOutcome {
    let tuning = env.tuning;
    match agent.ai {
        AiKind::Walker => {
            let Behavior::Idle { wait } = &mut agent.behavior else {
                return StepOutcome::default();
            };
            *wait = (*wait - env.dt).max(0.0);
            if *wait <= 0.0 {
                return StepOutcome::raise(Stimulus::TimerExpired);
            }
        }
        AiKind::Guardian => {
            let amplitude = tuning.jitter_amplitude.abs();
            let nudge = rng.random_range(-1.0f32..=1.0) * tuning.jitter_rate * env.dt;
            agent.jitter = (agent.jitter + nudge).clamp(-amplitude, amplitude);
            if let Some(door) = nearest_door(agent.pos, env.level) {
                let facing = bearing_deg(agent.pos, door.rect.center()) + agent.jitter;
                agent.rotation = turn_toward(
                    agent.rotation,
                    facing,
                    tuning.guardian_turn_rate * env.dt,
                );
            }
        }
        AiKind::None => {}
    }
    StepOutcome::default()
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    use super::*;
    use crate::sim::geometry::Rect;
    use crate::sim::state::{Identity, PermissionLevel, Wall};

    const DT: f32 = 0.1;
    const FAR_AWAY: Vec2 = Vec2::new(5000.0, 5000.0);

    fn walker() -> Agent {
        Agent::enemy(AiKind::Walker, Vec2::ZERO, 0.0, Identity::guard())
            .with_sight(100.0, 120.0)
            .with_search_duration(2.0)
    }

    fn guardian() -> Agent {
        Agent::enemy(AiKind::Guardian, Vec2::ZERO, 0.0, Identity::guard())
            .with_sight(100.0, 120.0)
            .with_search_duration(1.0)
    }

    fn step(
        agent: &mut Agent,
        target: Vec2,
        level: &Level,
        shots: &mut Vec<Projectile>,
        rng: &mut Pcg32,
    ) -> bool {
        let tuning = AiTuning::default();
        let env = AiEnv {
            level,
            tuning: &tuning,
            dt: DT,
        };
        update_enemy(agent, None, target, &env, shots, rng)
    }

    #[test]
    fn test_transition_table() {
        use BehaviorKind::*;
        use Stimulus::*;

        for kind in [AiKind::Walker, AiKind::Guardian] {
            for from in [Idle, Patrol, Search] {
                assert_eq!(transition(kind, from, TargetSeen), Some(Attack));
                assert_eq!(transition(kind, from, Hit), Some(Search));
            }
            assert_eq!(transition(kind, Attack, TargetSeen), None);
            assert_eq!(transition(kind, Attack, Hit), None);
            assert_eq!(transition(kind, Attack, TargetLost), Some(Search));
        }
        assert_eq!(transition(AiKind::Walker, Search, TimerExpired), Some(Patrol));
        assert_eq!(transition(AiKind::Guardian, Search, TimerExpired), Some(Idle));
        assert_eq!(transition(AiKind::Walker, Idle, TimerExpired), Some(Patrol));
        assert_eq!(transition(AiKind::Guardian, Idle, TimerExpired), None);
        assert_eq!(transition(AiKind::Walker, Patrol, Blocked), Some(Idle));
        assert_eq!(transition(AiKind::Walker, Patrol, Arrived), Some(Idle));
        assert_eq!(transition(AiKind::None, Idle, TargetSeen), None);
    }

    #[test]
    fn test_spotting_enters_attack_and_caches_target() {
        let mut rng = Pcg32::seed_from_u64(1);
        let mut shots = Vec::new();
        let mut a = walker();
        let target = Vec2::new(50.0, 0.0);
        step(&mut a, target, &Level::default(), &mut shots, &mut rng);
        assert_eq!(a.behavior.kind(), BehaviorKind::Attack);
        assert_eq!(a.last_known_target, target);
    }

    #[test]
    fn test_lost_target_search_then_patrol() {
        let mut rng = Pcg32::seed_from_u64(7);
        let mut shots = Vec::new();
        let level = Level::default();
        let mut a = walker();

        step(&mut a, Vec2::new(50.0, 0.0), &level, &mut shots, &mut rng);
        assert_eq!(a.behavior.kind(), BehaviorKind::Attack);

        // Target vanishes
        step(&mut a, FAR_AWAY, &level, &mut shots, &mut rng);
        match a.behavior {
            Behavior::Search { timer, .. } => {
                assert!(timer <= a.search_duration && timer >= a.search_duration - DT - 1e-4)
            }
            other => panic!("expected Search, got {other:?}"),
        }
        assert_eq!(a.last_known_target, Vec2::new(50.0, 0.0));

        let mut ticks = 1;
        while a.behavior.kind() == BehaviorKind::Search && ticks < 100 {
            step(&mut a, FAR_AWAY, &level, &mut shots, &mut rng);
            ticks += 1;
        }
        assert_eq!(a.behavior.kind(), BehaviorKind::Patrol);
        // 3 ticks walking over, then the full 2.0s look-around
        assert!((23..=24).contains(&ticks), "searched for {ticks} ticks");
        // Walked over to look
        assert!(a.pos.distance(Vec2::new(50.0, 0.0)) <= SEARCH_ARRIVE_DIST + 1e-3);
    }

    #[test]
    fn test_guardian_search_never_moves_and_goes_idle() {
        let mut rng = Pcg32::seed_from_u64(3);
        let mut shots = Vec::new();
        let level = Level::default();
        let mut g = guardian();

        step(&mut g, Vec2::new(0.0, 50.0), &level, &mut shots, &mut rng);
        // 90° off-axis: outside a 120° cone, so nothing seen yet
        assert_eq!(g.behavior.kind(), BehaviorKind::Idle);

        step(&mut g, Vec2::new(50.0, 10.0), &level, &mut shots, &mut rng);
        assert_eq!(g.behavior.kind(), BehaviorKind::Attack);

        for _ in 0..12 {
            step(&mut g, FAR_AWAY, &level, &mut shots, &mut rng);
        }
        assert_eq!(g.behavior.kind(), BehaviorKind::Idle);
        assert_eq!(g.pos, Vec2::ZERO);
    }

    #[test]
    fn test_guardian_search_turns_toward_last_known() {
        let mut rng = Pcg32::seed_from_u64(12);
        let mut shots = Vec::new();
        let level = Level::default();
        let mut g = guardian();
        g.last_known_target = Vec2::new(0.0, 50.0);
        g.behavior = Behavior::Search {
            timer: g.search_duration,
            arrived: false,
        };
        let bearing = bearing_deg(g.pos, g.last_known_target);
        let step_max = AiTuning::default().search_turn_rate * DT;

        let mut prev_gap = wrap_degrees(bearing - g.rotation).abs();
        for _ in 0..6 {
            step(&mut g, FAR_AWAY, &level, &mut shots, &mut rng);
            assert_eq!(g.behavior.kind(), BehaviorKind::Search);
            let gap = wrap_degrees(bearing - g.rotation).abs();
            assert!(gap <= prev_gap && prev_gap - gap <= step_max + 1e-3);
            prev_gap = gap;
        }
        assert!(prev_gap < 1e-3, "still {prev_gap}° off the last-known bearing");
        assert_eq!(g.pos, Vec2::ZERO);
    }

    #[test]
    fn test_walker_spins_in_place_after_arriving() {
        let mut rng = Pcg32::seed_from_u64(13);
        let mut shots = Vec::new();
        let level = Level::default();
        let mut a = walker();
        a.last_known_target = Vec2::new(5.0, 0.0);
        a.behavior = Behavior::Search {
            timer: a.search_duration,
            arrived: true,
        };
        let spin = AiTuning::default().spin_rate * DT;

        for _ in 0..5 {
            let before = a.rotation;
            step(&mut a, FAR_AWAY, &level, &mut shots, &mut rng);
            assert_eq!(a.pos, Vec2::ZERO);
            assert!((wrap_degrees(a.rotation - before) - spin).abs() < 1e-3);
        }
        match a.behavior {
            Behavior::Search { timer, arrived } => {
                assert!(arrived);
                assert!((timer - (a.search_duration - 5.0 * DT)).abs() < 1e-4);
            }
            other => panic!("expected Search, got {other:?}"),
        }
    }

    #[test]
    fn test_walker_search_clock_waits_for_arrival() {
        let mut rng = Pcg32::seed_from_u64(14);
        let mut shots = Vec::new();
        let level = Level::default();
        let mut a = walker().with_search_duration(1.0);
        let tuning = AiTuning::default();
        assert!(notify_hit(&mut a, Vec2::new(900.0, 0.0), &tuning, &mut rng));

        let mut travel = 0;
        while let Behavior::Search { arrived: false, timer } = a.behavior {
            assert_eq!(timer, 1.0);
            step(&mut a, FAR_AWAY, &level, &mut shots, &mut rng);
            travel += 1;
            assert!(travel < 200, "never arrived");
        }
        let before = a.rotation;
        let mut spins = 0;
        while a.behavior.kind() == BehaviorKind::Search {
            step(&mut a, FAR_AWAY, &level, &mut shots, &mut rng);
            spins += 1;
        }
        // Full look-around after a long walk
        assert!((10..=11).contains(&spins), "looked around for {spins} ticks");
        assert_ne!(a.rotation, before);
        assert_eq!(a.behavior.kind(), BehaviorKind::Patrol);
    }

    #[test]
    fn test_negative_turn_rate_does_not_panic() {
        let mut rng = Pcg32::seed_from_u64(15);
        let mut shots = Vec::new();
        let level = Level::default();
        let tuning = AiTuning {
            attack_turn_rate: -90.0,
            inaccuracy: -4.0,
            ..AiTuning::default()
        };
        let env = AiEnv {
            level: &level,
            tuning: &tuning,
            dt: DT,
        };
        let mut a = walker();
        let target = Vec2::new(50.0, 20.0);
        update_enemy(&mut a, None, target, &env, &mut shots, &mut rng);
        assert_eq!(a.behavior.kind(), BehaviorKind::Attack);
        // Turned toward the target by the rate's magnitude
        assert!((a.rotation - 9.0).abs() < 1e-3);
        for _ in 0..10 {
            update_enemy(&mut a, None, target, &env, &mut shots, &mut rng);
        }
        assert!(!shots.is_empty());
    }

    #[test]
    fn test_attack_fires_on_cooldown() {
        let mut rng = Pcg32::seed_from_u64(11);
        let mut shots = Vec::new();
        let level = Level::default();
        let mut g = guardian();
        let target = Vec2::new(50.0, 0.0);

        let fired = (0..10)
            .filter(|_| step(&mut g, target, &level, &mut shots, &mut rng))
            .count();
        assert_eq!(fired, 2);
        assert_eq!(shots.len(), 2);
        for shot in &shots {
            assert!(shot.vel.x > 0.0);
            // Within inaccuracy of dead ahead
            let heading = shot.vel.y.atan2(shot.vel.x).to_degrees();
            assert!(heading.abs() <= AiTuning::default().inaccuracy + 1e-3);
        }
    }

    #[test]
    fn test_unarmed_identity_never_fires() {
        let mut rng = Pcg32::seed_from_u64(11);
        let mut shots = Vec::new();
        let mut g = guardian();
        g.identity = Identity::staff();
        for _ in 0..20 {
            step(&mut g, Vec2::new(50.0, 0.0), &Level::default(), &mut shots, &mut rng);
        }
        assert!(shots.is_empty());
    }

    #[test]
    fn test_walker_closes_to_standoff() {
        let mut rng = Pcg32::seed_from_u64(5);
        let mut shots = Vec::new();
        let mut a = walker().with_sight(300.0, 120.0);
        let target = Vec2::new(200.0, 0.0);
        for _ in 0..20 {
            step(&mut a, target, &Level::default(), &mut shots, &mut rng);
        }
        let standoff = AiTuning::default().standoff_range;
        assert!((a.pos.distance(target) - standoff).abs() < 0.01);
    }

    #[test]
    fn test_patrol_abandons_on_bump() {
        let mut rng = Pcg32::seed_from_u64(9);
        let mut shots = Vec::new();
        let level = Level {
            walls: vec![Wall::new(Rect::new(15.0, -50.0, 10.0, 100.0), 0.0)],
            ..Default::default()
        };
        let mut a = walker();
        a.behavior = Behavior::Patrol {
            goal: Vec2::new(100.0, 0.0),
        };
        step(&mut a, FAR_AWAY, &level, &mut shots, &mut rng);
        assert_eq!(a.behavior.kind(), BehaviorKind::Idle);
        assert_eq!(a.pos, Vec2::ZERO);
    }

    #[test]
    fn test_patrol_arrival() {
        let mut rng = Pcg32::seed_from_u64(9);
        let mut shots = Vec::new();
        let mut a = walker();
        a.behavior = Behavior::Patrol {
            goal: Vec2::new(5.0, 0.0),
        };
        step(&mut a, FAR_AWAY, &Level::default(), &mut shots, &mut rng);
        assert_eq!(a.behavior.kind(), BehaviorKind::Idle);
    }

    #[test]
    fn test_idle_walker_picks_patrol_goal_nearby() {
        let mut rng = Pcg32::seed_from_u64(21);
        let mut shots = Vec::new();
        let mut a = walker();
        a.behavior = Behavior::Idle { wait: 0.05 };
        step(&mut a, FAR_AWAY, &Level::default(), &mut shots, &mut rng);
        match a.behavior {
            Behavior::Patrol { goal } => {
                assert!(goal.distance(a.pos) <= AiTuning::default().patrol_radius + 1e-3)
            }
            other => panic!("expected Patrol, got {other:?}"),
        }
    }

    #[test]
    fn test_guardian_idle_faces_nearest_door() {
        let mut rng = Pcg32::seed_from_u64(2);
        let mut shots = Vec::new();
        let level = Level {
            doors: vec![
                crate::sim::state::Door::new(
                    Rect::centered(Vec2::new(0.0, 100.0), Vec2::new(30.0, 8.0)),
                    PermissionLevel::Guard,
                ),
                crate::sim::state::Door::new(
                    Rect::centered(Vec2::new(-400.0, 0.0), Vec2::new(8.0, 30.0)),
                    PermissionLevel::Guard,
                ),
            ],
            ..Default::default()
        };
        let mut g = guardian();
        for _ in 0..60 {
            step(&mut g, FAR_AWAY, &level, &mut shots, &mut rng);
        }
        let amplitude = AiTuning::default().jitter_amplitude;
        assert!(g.jitter.abs() <= amplitude);
        assert!((wrap_degrees(g.rotation - 90.0)).abs() <= amplitude + 1e-3);
        assert_eq!(g.pos, Vec2::ZERO);
    }

    #[test]
    fn test_restrained_does_not_advance() {
        let mut rng = Pcg32::seed_from_u64(4);
        let mut shots = Vec::new();
        let mut a = walker();
        a.restrained = true;
        let before = a.clone();
        assert!(!step(&mut a, Vec2::new(50.0, 0.0), &Level::default(), &mut shots, &mut rng));
        assert_eq!(a.behavior, before.behavior);
        assert_eq!(a.pos, before.pos);

        a.restrained = false;
        a.active = false;
        step(&mut a, Vec2::new(50.0, 0.0), &Level::default(), &mut shots, &mut rng);
        assert_eq!(a.behavior, before.behavior);
    }

    #[test]
    fn test_notify_hit_starts_search() {
        let mut rng = Pcg32::seed_from_u64(8);
        let tuning = AiTuning::default();
        let mut a = walker();
        let source = Vec2::new(-40.0, 0.0);
        assert!(notify_hit(&mut a, source, &tuning, &mut rng));
        assert_eq!(
            a.behavior,
            Behavior::Search {
                timer: a.search_duration,
                arrived: false
            }
        );
        assert_eq!(a.last_known_target, source);

        // Already fighting: ignored
        a.behavior = Behavior::Attack { reaction: 0.0 };
        assert!(!notify_hit(&mut a, Vec2::new(40.0, 0.0), &tuning, &mut rng));
        assert_eq!(a.last_known_target, source);
    }

    #[test]
    fn test_attack_turns_across_seam() {
        let mut rng = Pcg32::seed_from_u64(6);
        let mut shots = Vec::new();
        let mut g = guardian().with_sight(100.0, 360.0);
        g.rotation = 170.0;
        // Target at bearing -170°: 20° away through the seam
        let target = heading_vec(-170.0) * 50.0;
        step(&mut g, target, &Level::default(), &mut shots, &mut rng);
        assert!((g.rotation - (-170.0)).abs() < 1e-3);
    }
}
