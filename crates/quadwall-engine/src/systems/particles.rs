//! Particle fields: per-system position/velocity buffers advanced every tick.
//!
//! A [`ParticleField`] is created once when its scene mounts and owns all of
//! its continuous state. Nothing else writes to it. Hidden layers skip the
//! advance but keep the buffers, so a layer that is shown again resumes.

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::assets::scene_def::ParticleSystemDefinition;
use crate::modifiers::{Bindings, ModifierState, ParticleAttr};

use super::rng::Rng;

/// Parked position of a shooting star that is waiting to launch.
pub const OFFSCREEN_SENTINEL: Vec3 = Vec3::new(100_000.0, 100_000.0, 0.0);

/// Motion model of a particle system.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ParticleKind {
    Fog,
    Rain,
    Snow,
    Leaves,
    Fireflies,
    Stars,
    ShootingStar,
    /// Any other authored type: isotropic random drift.
    Other(String),
}

impl From<String> for ParticleKind {
    fn from(s: String) -> Self {
        match s.as_str() {
            "fog" => Self::Fog,
            "rain" => Self::Rain,
            "snow" => Self::Snow,
            "leaves" => Self::Leaves,
            "fireflies" => Self::Fireflies,
            "stars" => Self::Stars,
            "shooting-star" => Self::ShootingStar,
            _ => Self::Other(s),
        }
    }
}

impl From<ParticleKind> for String {
    fn from(kind: ParticleKind) -> Self {
        match kind {
            ParticleKind::Fog => "fog".into(),
            ParticleKind::Rain => "rain".into(),
            ParticleKind::Snow => "snow".into(),
            ParticleKind::Leaves => "leaves".into(),
            ParticleKind::Fireflies => "fireflies".into(),
            ParticleKind::Stars => "stars".into(),
            ParticleKind::ShootingStar => "shooting-star".into(),
            ParticleKind::Other(s) => s,
        }
    }
}

impl ParticleKind {
    /// Stars are static and shooting stars respawn instead of wrapping.
    pub fn wraps(&self) -> bool {
        !matches!(self, Self::Stars | Self::ShootingStar)
    }
}

/// Window that shooting stars live in.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ShootingStarBounds {
    /// A star leaving `±exit` on X or Y is respawned.
    pub exit: f32,
    /// Respawned stars start uniformly inside `±respawn` on X and Y, at Z = 0.
    pub respawn: f32,
}

impl Default for ShootingStarBounds {
    fn default() -> Self {
        Self {
            exit: 1000.0,
            respawn: 200.0,
        }
    }
}

/// Continuous simulation state for one particle system.
#[derive(Debug, Clone)]
pub struct ParticleField {
    kind: ParticleKind,
    center: Vec3,
    half_area: Vec3,
    speed: f32,
    positions: Vec<Vec3>,
    velocities: Vec<Vec3>,
    /// Only present for shooting stars.
    cooldowns: Option<Vec<f32>>,
    bounds: ShootingStarBounds,
    rng: Rng,
}

impl ParticleField {
    /// Seed every particle uniformly inside `position ± area/2`.
    pub fn new(def: &ParticleSystemDefinition, bounds: ShootingStarBounds, mut rng: Rng) -> Self {
        let center: Vec3 = def.position.into();
        let area: Vec3 = def.area.into();
        let count = def.count;

        let mut positions = Vec::with_capacity(count);
        let mut velocities = Vec::with_capacity(count);
        let mut cooldowns =
            (def.kind == ParticleKind::ShootingStar).then(|| Vec::with_capacity(count));

        for _ in 0..count {
            let offset =
                Vec3::new(rng.centered(area.x), rng.centered(area.y), rng.centered(area.z));
            positions.push(center + offset);
            velocities.push(initial_velocity(&def.kind, def.speed, &mut rng));
            if let Some(c) = cooldowns.as_mut() {
                c.push(rng.range(0.0, 5.0));
            }
        }

        Self {
            kind: def.kind.clone(),
            center,
            half_area: area * 0.5,
            speed: def.speed,
            positions,
            velocities,
            cooldowns,
            bounds,
            rng,
        }
    }

    pub fn kind(&self) -> &ParticleKind {
        &self.kind
    }

    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    pub fn positions(&self) -> &[Vec3] {
        &self.positions
    }

    pub fn velocities(&self) -> &[Vec3] {
        &self.velocities
    }

    /// Remaining launch delay of a shooting star; `None` for other kinds.
    pub fn cooldown(&self, index: usize) -> Option<f32> {
        self.cooldowns.as_ref().and_then(|c| c.get(index).copied())
    }

    /// Advance the first `active` particles by `dt` seconds.
    pub fn advance(&mut self, active: usize, dt: f32) {
        let active = active.min(self.positions.len());
        if self.kind == ParticleKind::ShootingStar {
            for i in 0..active {
                self.advance_shooting_star(i, dt);
            }
            return;
        }

        let min = self.center - self.half_area;
        let max = self.center + self.half_area;
        let wraps = self.kind.wraps();
        for (pos, vel) in self.positions[..active].iter_mut().zip(&self.velocities[..active]) {
            *pos += *vel * dt;
            if wraps {
                *pos = wrap(*pos, min, max);
            }
        }
    }

    fn advance_shooting_star(&mut self, i: usize, dt: f32) {
        let Some(cooldowns) = self.cooldowns.as_mut() else {
            return;
        };
        if cooldowns[i] > 0.0 {
            cooldowns[i] = (cooldowns[i] - dt).max(0.0);
            return;
        }

        self.positions[i] += self.velocities[i] * dt;
        let p = self.positions[i];
        let exit = self.bounds.exit;
        if p.x < -exit || p.x > exit || p.y < -exit || p.y > exit {
            let respawn = self.bounds.respawn * 2.0;
            self.positions[i] =
                Vec3::new(self.rng.centered(respawn), self.rng.centered(respawn), 0.0);
            self.velocities[i] = shooting_star_velocity(self.speed, &mut self.rng);
            cooldowns[i] = self.rng.range(1.0, 5.0);
        }
    }

    /// Position handed to the renderer: cooling shooting stars are parked off-screen.
    pub fn rendered_position(&self, index: usize) -> Vec3 {
        match self.cooldown(index) {
            Some(c) if c > 0.0 => OFFSCREEN_SENTINEL,
            _ => self.positions[index],
        }
    }

    /// One point per active particle.
    pub fn points(&self, active: usize) -> Vec<Vec3> {
        (0..active.min(self.len())).map(|i| self.rendered_position(i)).collect()
    }

    /// Two points per active particle: the head, then a tail `trail` seconds
    /// back along the velocity.
    pub fn segments(&self, active: usize, trail: f32) -> Vec<Vec3> {
        let mut out = Vec::with_capacity(active.min(self.len()) * 2);
        for i in 0..active.min(self.len()) {
            let head = self.rendered_position(i);
            out.push(head);
            out.push(head - self.velocities[i] * trail);
        }
        out
    }

    fn noise(&mut self) -> f32 {
        self.rng.next_f32()
    }
}

fn wrap(p: Vec3, min: Vec3, max: Vec3) -> Vec3 {
    let axis = |v: f32, lo: f32, hi: f32| {
        if v > hi {
            lo
        } else if v < lo {
            hi
        } else {
            v
        }
    };
    Vec3::new(axis(p.x, min.x, max.x), axis(p.y, min.y, max.y), axis(p.z, min.z, max.z))
}

fn initial_velocity(kind: &ParticleKind, speed: f32, rng: &mut Rng) -> Vec3 {
    match kind {
        ParticleKind::Fog => Vec3::new(rng.centered(0.1), rng.next_f32() * 0.05, rng.centered(0.1)),
        ParticleKind::Rain => Vec3::new(
            rng.centered(0.1),
            -speed - rng.next_f32() * 2.0,
            rng.centered(0.1),
        ),
        ParticleKind::Snow => Vec3::new(
            rng.centered(0.2),
            -speed * 0.3 - rng.next_f32() * 0.5,
            rng.centered(0.2),
        ),
        ParticleKind::Leaves => Vec3::new(
            rng.centered(0.5),
            -speed * 0.5 - rng.next_f32() * 0.3,
            rng.centered(0.5),
        ),
        ParticleKind::Fireflies => {
            Vec3::new(rng.centered(0.3), rng.centered(0.2), rng.centered(0.3))
        }
        ParticleKind::Stars => Vec3::ZERO,
        ParticleKind::ShootingStar => shooting_star_velocity(speed, rng),
        ParticleKind::Other(_) => {
            Vec3::new(rng.centered(speed), rng.centered(speed), rng.centered(speed))
        }
    }
}

/// Pick one of four direction bands: top-right→bottom-left,
/// top-left→bottom-right, left→right, right→left.
fn shooting_star_velocity(speed: f32, rng: &mut Rng) -> Vec3 {
    let base = speed * 0.3;
    let band = rng.next_f32();
    let (vx, vy) = if band < 0.25 {
        (-base * rng.range(0.8, 1.2), -base * rng.range(0.6, 1.0))
    } else if band < 0.5 {
        (base * rng.range(0.8, 1.2), -base * rng.range(0.6, 1.0))
    } else if band < 0.75 {
        (base * rng.range(1.0, 1.5), -base * rng.range(0.2, 0.5))
    } else {
        (-base * rng.range(1.0, 1.5), -base * rng.range(0.2, 0.5))
    };
    Vec3::new(vx, vy, 0.0)
}

/// Effective count, size and opacity after modifiers.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParticleParams {
    pub count: usize,
    pub size: f32,
    pub opacity: f32,
}

impl ParticleParams {
    /// `{id}_count` is clamped to `[0, declared]`; `{id}_opacity` replaces
    /// `opacity × layerOpacity` and is clamped to `[0, 1]`.
    pub fn resolve(
        def: &ParticleSystemDefinition,
        bindings: &Bindings<ParticleAttr>,
        state: &ModifierState,
        layer_opacity: f32,
    ) -> Self {
        let count = match bindings.number(&ParticleAttr::Count, state) {
            Some(n) => n.max(0.0).floor().min(def.count as f32) as usize,
            None => def.count,
        };
        let size = bindings.number_or(&ParticleAttr::Size, state, def.size);
        let opacity = bindings
            .number_or(&ParticleAttr::Opacity, state, def.opacity * layer_opacity)
            .clamp(0.0, 1.0);
        Self { count, size, opacity }
    }
}

/// Material the drawing capability should use for a particle system.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ParticleMaterial {
    pub color: [f32; 3],
    pub size: f32,
    pub opacity: f32,
    pub additive: bool,
}

/// Warm yellow, `#fff8cc`.
const FIREFLY_COLOR: [f32; 3] = [1.0, 248.0 / 255.0, 204.0 / 255.0];

/// Geometry of one particle system for one frame.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", content = "vertices", rename_all = "camelCase")]
pub enum ParticleGeometry {
    Points(Vec<Vec3>),
    /// Consecutive pairs form one segment.
    Segments(Vec<Vec3>),
}

impl ParticleGeometry {
    pub fn vertices(&self) -> &[Vec3] {
        match self {
            Self::Points(v) | Self::Segments(v) => v,
        }
    }

    /// Flat `x, y, z` floats for the host.
    pub fn as_floats(&self) -> &[f32] {
        bytemuck::cast_slice(self.vertices())
    }
}

/// Per-frame render output of one particle system.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ParticleRender {
    pub id: String,
    pub active: usize,
    pub material: ParticleMaterial,
    pub geometry: ParticleGeometry,
}

/// A mounted particle system: definition, modifier bindings and field state.
#[derive(Debug, Clone)]
pub struct ParticleSystem {
    pub def: ParticleSystemDefinition,
    bindings: Bindings<ParticleAttr>,
    field: ParticleField,
}

impl ParticleSystem {
    pub fn new(
        def: ParticleSystemDefinition,
        bindings: Bindings<ParticleAttr>,
        bounds: ShootingStarBounds,
        rng: Rng,
    ) -> Self {
        let field = ParticleField::new(&def, bounds, rng);
        if def.kind == ParticleKind::ShootingStar {
            log::debug!("shooting stars '{}': {} streaks", def.id, def.count);
        }
        Self { def, bindings, field }
    }

    pub fn field(&self) -> &ParticleField {
        &self.field
    }

    /// Advance the field and build this frame's render output.
    pub fn tick(
        &mut self,
        state: &ModifierState,
        layer_opacity: f32,
        time: f32,
        dt: f32,
        trail: f32,
    ) -> ParticleRender {
        let params = ParticleParams::resolve(&self.def, &self.bindings, state, layer_opacity);
        self.field.advance(params.count, dt);

        let material = self.material(&params, time);
        let geometry = match self.def.kind {
            ParticleKind::ShootingStar => {
                ParticleGeometry::Segments(self.field.segments(params.count, trail))
            }
            _ => ParticleGeometry::Points(self.field.points(params.count)),
        };

        ParticleRender {
            id: self.def.id.clone(),
            active: params.count,
            material,
            geometry,
        }
    }

    fn material(&mut self, params: &ParticleParams, time: f32) -> ParticleMaterial {
        let color = self.def.color.to_array();
        match self.def.kind {
            ParticleKind::Fog => ParticleMaterial {
                color,
                size: params.size * 3.0,
                opacity: params.opacity * 0.3,
                additive: true,
            },
            ParticleKind::Fireflies => {
                let pulse = 0.5 + (time * 2.0 + self.field.noise() * 10.0).sin() * 0.5;
                ParticleMaterial {
                    color: FIREFLY_COLOR,
                    size: params.size * 0.5,
                    opacity: params.opacity * pulse,
                    additive: true,
                }
            }
            ParticleKind::ShootingStar => ParticleMaterial {
                color: [1.0, 1.0, 1.0],
                size: params.size * 2.5,
                opacity: params.opacity,
                additive: true,
            },
            _ => ParticleMaterial {
                color,
                size: params.size,
                opacity: params.opacity,
                additive: false,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assets::scene_def::{Color, ModifierDeclaration, Vector3};
    use crate::modifiers::{ModifierKind, ModifierValue, RuntimeModifierOverrides};

    fn def(kind: &str, count: usize) -> ParticleSystemDefinition {
        ParticleSystemDefinition {
            id: "snow".into(),
            kind: ParticleKind::from(kind.to_string()),
            count,
            position: Vector3::new(0.0, 5.0, 0.0),
            area: Vector3::new(20.0, 10.0, 20.0),
            speed: 2.0,
            color: Color::WHITE,
            opacity: 0.8,
            size: 0.1,
        }
    }

    fn field(kind: &str, count: usize) -> ParticleField {
        ParticleField::new(&def(kind, count), ShootingStarBounds::default(), Rng::new(42))
    }

    fn in_box(p: Vec3) -> bool {
        p.x >= -10.0 && p.x <= 10.0 && p.y >= 0.0 && p.y <= 10.0 && p.z >= -10.0 && p.z <= 10.0
    }

    fn number_decl(id: &str, default: f32) -> ModifierDeclaration {
        ModifierDeclaration {
            id: id.into(),
            name: id.into(),
            description: String::new(),
            kind: ModifierKind::Number,
            default: ModifierValue::Number(default),
            min: None,
            max: None,
            step: None,
            options: None,
            affects: Vec::new(),
        }
    }

    #[test]
    fn kind_round_trips_through_strings() {
        let names = [
            "fog", "rain", "snow", "leaves", "fireflies", "stars", "shooting-star", "bubbles",
        ];
        for name in names {
            let kind = ParticleKind::from(name.to_string());
            assert_eq!(String::from(kind), name);
        }
        assert_eq!(
            ParticleKind::from("bubbles".to_string()),
            ParticleKind::Other("bubbles".into())
        );
    }

    #[test]
    fn spawns_inside_authored_box() {
        let f = field("snow", 500);
        assert_eq!(f.len(), 500);
        assert!(f.positions().iter().all(|p| in_box(*p)));
    }

    #[test]
    fn falling_kinds_fall() {
        for kind in ["rain", "snow", "leaves"] {
            let f = field(kind, 200);
            assert!(f.velocities().iter().all(|v| v.y < 0.0), "{} should fall", kind);
        }
        let fog = field("fog", 200);
        assert!(fog.velocities().iter().all(|v| v.y >= 0.0 && v.x.abs() <= 0.05));
    }

    #[test]
    fn snow_is_slower_than_rain() {
        let rain = field("rain", 200);
        let snow = field("snow", 200);
        let mean =
            |f: &ParticleField| f.velocities().iter().map(|v| v.y).sum::<f32>() / f.len() as f32;
        assert!(mean(&snow) > mean(&rain));
    }

    #[test]
    fn stars_never_move() {
        let mut f = field("stars", 50);
        let before = f.positions().to_vec();
        for _ in 0..100 {
            f.advance(50, 0.1);
        }
        assert_eq!(f.positions(), &before[..]);
    }

    #[test]
    fn wrapping_keeps_particles_in_box() {
        for kind in ["fog", "rain", "snow", "leaves", "fireflies", "bubbles"] {
            let mut f = field(kind, 100);
            for step in 0..500 {
                f.advance(100, if step % 50 == 0 { 3.0 } else { 1.0 / 60.0 });
                let inside = f.positions().iter().all(|p| in_box(*p));
                assert!(inside, "{} escaped at step {}", kind, step);
            }
        }
    }

    #[test]
    fn only_active_particles_advance() {
        let mut f = field("rain", 10);
        let before = f.positions().to_vec();
        f.advance(3, 0.01);
        assert_ne!(f.positions()[0], before[0]);
        assert_eq!(&f.positions()[3..], &before[3..]);
    }

    #[test]
    fn shooting_star_cooldown_parks_then_launches() {
        let mut f = field("shooting-star", 20);
        for i in 0..20 {
            let c = f.cooldown(i).unwrap();
            assert!((0.0..=5.0).contains(&c));
        }

        let dt = 1.0 / 30.0;
        let mut launched = vec![false; 20];
        for _ in 0..200 {
            let before = f.positions().to_vec();
            let cooling: Vec<bool> = (0..20).map(|i| f.cooldown(i).unwrap() > 0.0).collect();
            f.advance(20, dt);
            for i in 0..20 {
                let c = f.cooldown(i).unwrap();
                assert!(c >= 0.0);
                if c > 0.0 {
                    assert_eq!(f.rendered_position(i), OFFSCREEN_SENTINEL);
                }
                if !cooling[i] && f.cooldown(i).unwrap() == 0.0 {
                    assert_ne!(f.positions()[i], before[i], "star {} should move", i);
                    launched[i] = true;
                }
            }
        }
        assert!(launched.iter().all(|l| *l), "every star launches within 6.6s");
    }

    #[test]
    fn shooting_star_respawns_with_new_cooldown() {
        let mut d = def("shooting-star", 1);
        d.speed = 10_000.0;
        let mut f = ParticleField::new(&d, ShootingStarBounds::default(), Rng::new(3));
        // Burn the initial cooldown.
        f.advance(1, 5.0);
        assert_eq!(f.cooldown(0), Some(0.0));
        f.advance(1, 1.0);
        let c = f.cooldown(0).unwrap();
        assert!((1.0..=5.0).contains(&c), "cooldown {}", c);
        let p = f.positions()[0];
        assert!(p.x.abs() <= 200.0 && p.y.abs() <= 200.0 && p.z == 0.0);
    }

    #[test]
    fn shooting_star_velocity_has_no_depth() {
        let f = field("shooting-star", 100);
        assert!(f.velocities().iter().all(|v| v.z == 0.0 && v.y < 0.0));
    }

    #[test]
    fn segments_trail_behind_the_head() {
        let mut f = field("shooting-star", 4);
        f.advance(4, 5.0);
        let segs = f.segments(4, 0.15);
        assert_eq!(segs.len(), 8);
        for i in 0..4 {
            assert_eq!(segs[i * 2], f.rendered_position(i));
            assert_eq!(segs[i * 2 + 1], segs[i * 2] - f.velocities()[i] * 0.15);
        }
    }

    #[test]
    fn params_clamp_count_and_opacity() {
        let d = def("snow", 100);
        let decls = vec![number_decl("snow_count", 100.0), number_decl("snow_opacity", 1.0)];
        let bindings = Bindings::build("snow", &decls);
        let resolve = |count: &str, opacity: &str| {
            let pairs = [("snow_count", count), ("snow_opacity", opacity)];
            let overrides: RuntimeModifierOverrides = pairs
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect();
            let state = ModifierState::resolve(&decls, &overrides);
            ParticleParams::resolve(&d, &bindings, &state, 1.0)
        };

        let p = resolve("10", "5");
        assert_eq!(p.count, 10);
        assert_eq!(p.opacity, 1.0);

        let p = resolve("500", "-3");
        assert_eq!(p.count, 100);
        assert_eq!(p.opacity, 0.0);

        let p = resolve("-4", "0.25");
        assert_eq!(p.count, 0);
        assert_eq!(p.opacity, 0.25);
    }

    #[test]
    fn unbound_params_use_layer_opacity() {
        let d = def("snow", 100);
        let p = ParticleParams::resolve(&d, &Bindings::default(), &ModifierState::default(), 0.5);
        assert_eq!(p.count, 100);
        assert_eq!(p.size, 0.1);
        assert!((p.opacity - 0.4).abs() < 1e-6);
    }

    #[test]
    fn system_tick_emits_active_points_only() {
        let decls = vec![number_decl("snow_count", 10.0)];
        let state = ModifierState::resolve(&decls, &RuntimeModifierOverrides::new());
        let mut sys = ParticleSystem::new(
            def("snow", 100),
            Bindings::build("snow", &decls),
            ShootingStarBounds::default(),
            Rng::new(1),
        );
        let out = sys.tick(&state, 1.0, 0.0, 0.016, 0.15);
        assert_eq!(out.active, 10);
        assert!(matches!(out.geometry, ParticleGeometry::Points(ref v) if v.len() == 10));
        assert_eq!(out.geometry.as_floats().len(), 30);
        assert!(!out.material.additive);
    }

    #[test]
    fn fog_material_is_soft_and_additive() {
        let mut sys = ParticleSystem::new(
            def("fog", 5),
            Bindings::default(),
            ShootingStarBounds::default(),
            Rng::new(1),
        );
        let out = sys.tick(&ModifierState::default(), 1.0, 0.0, 0.016, 0.15);
        assert!(out.material.additive);
        assert!((out.material.size - 0.3).abs() < 1e-6);
        assert!((out.material.opacity - 0.24).abs() < 1e-6);
    }

    #[test]
    fn shooting_stars_render_as_segments() {
        let mut sys = ParticleSystem::new(
            def("shooting-star", 6),
            Bindings::default(),
            ShootingStarBounds::default(),
            Rng::new(1),
        );
        let out = sys.tick(&ModifierState::default(), 1.0, 0.0, 0.016, 0.15);
        assert!(matches!(out.geometry, ParticleGeometry::Segments(ref v) if v.len() == 12));
    }
}
