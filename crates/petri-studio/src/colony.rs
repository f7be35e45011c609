//! Bacteria colony living on the surface of the field sphere.

use petri_engine::glam::Vec3;
use petri_engine::mesh::{point_on_sphere, GridPos, SphereLayout};

/// Golden angle in degrees; spreads members evenly over the sphere.
const GOLDEN_ANGLE_DEG: f32 = 137.507_76;

/// Colony tuning, editable before `Colony::new`.
#[derive(Debug, Clone, PartialEq)]
pub struct ColonySettings {
    pub count: usize,
    /// Radius gained per second while growing.
    pub grow_rate: f32,
    pub max_radius: f32,
    /// Member `i` starts growing `i * growth_start_delay_s` seconds in.
    pub growth_start_delay_s: f32,
    /// Seconds for a fully grown member to vanish once poisoned.
    pub poison_lifetime_s: f32,
}

impl Default for ColonySettings {
    fn default() -> Self {
        Self {
            count: 5,
            grow_rate: 0.03,
            max_radius: 0.1,
            growth_start_delay_s: 1.0,
            poison_lifetime_s: 0.7,
        }
    }
}

/// Per-member update rule.
#[derive(Debug, Copy, Clone, PartialEq)]
pub enum Behavior {
    Grow { rate: f32, max_radius: f32, start_at: f32 },
    Shrink { rate: f32 },
    Static,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Member {
    /// Polar angle on the field sphere, degrees from +Y.
    pub lat_deg: f32,
    /// Azimuth on the field sphere, degrees.
    pub long_deg: f32,
    pub radius: f32,
    pub behavior: Behavior,
}

impl Member {
    fn update(&mut self, elapsed: f32, dt: f32) {
        match self.behavior {
            Behavior::Grow { rate, max_radius, start_at } => {
                if elapsed >= start_at {
                    self.radius = (self.radius + rate * dt).min(max_radius);
                }
            }
            Behavior::Shrink { rate } => {
                self.radius = (self.radius - rate * dt).max(0.0);
                if self.radius == 0.0 {
                    self.behavior = Behavior::Static;
                }
            }
            Behavior::Static => {}
        }
    }

    #[inline]
    pub fn is_visible(&self) -> bool {
        self.radius > 0.0
    }

    pub fn is_grown(&self) -> bool {
        matches!(self.behavior, Behavior::Grow { max_radius, .. } if self.radius >= max_radius)
    }

    /// Centre on a field sphere of `radius` around `origin`.
    pub fn center(&self, origin: Vec3, radius: f32) -> Vec3 {
        point_on_sphere(origin, radius, self.lat_deg, self.long_deg)
    }

    /// Nearest tessellation vertex of a field sphere with `layout`'s resolution.
    pub fn grid_pos(&self, layout: SphereLayout) -> GridPos {
        let lat_step = 180.0 / (layout.lat_steps + 1) as f32;
        let long_step = 360.0 / layout.long_steps as f32;

        let lat = (self.lat_deg / lat_step).round().clamp(1.0, layout.lat_steps as f32) as u32;
        let long = (self.long_deg.rem_euclid(360.0) / long_step).round() as u32 % layout.long_steps;
        GridPos { lat, long }
    }
}

/// Counts reported by `TechnicalStats`.
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq)]
pub struct ColonyCensus {
    pub growing: usize,
    pub grown: usize,
    pub shrinking: usize,
    pub dead: usize,
}

#[derive(Debug, Clone)]
pub struct Colony {
    settings: ColonySettings,
    members: Vec<Member>,
    elapsed: f32,
    running: bool,
    poisoned: bool,
}

impl Colony {
    pub fn new(settings: ColonySettings) -> Self {
        let members = spawn(&settings);
        Self { settings, members, elapsed: 0.0, running: true, poisoned: false }
    }

    #[inline]
    pub fn members(&self) -> &[Member] {
        &self.members
    }

    pub fn visible(&self) -> impl Iterator<Item = &Member> {
        self.members.iter().filter(|m| m.is_visible())
    }

    #[inline]
    pub fn is_running(&self) -> bool {
        self.running
    }

    #[inline]
    pub fn is_poisoned(&self) -> bool {
        self.poisoned
    }

    pub fn toggle_running(&mut self) {
        self.running = !self.running;
    }

    /// Respawns every member and restarts the growth schedule.
    pub fn reset(&mut self) {
        self.members = spawn(&self.settings);
        self.elapsed = 0.0;
        self.poisoned = false;
    }

    /// Every living member starts shrinking at a rate that empties a fully grown one
    /// in `poison_lifetime_s`.
    pub fn poison(&mut self) {
        let rate = self.settings.max_radius / self.settings.poison_lifetime_s.max(f32::EPSILON);
        for m in &mut self.members {
            if m.is_visible() {
                m.behavior = Behavior::Shrink { rate };
            } else {
                m.behavior = Behavior::Static;
            }
        }
        self.poisoned = true;
    }

    pub fn update(&mut self, dt: f32) {
        if !self.running {
            return;
        }
        self.elapsed += dt;
        for m in &mut self.members {
            m.update(self.elapsed, dt);
        }
    }

    /// Largest visible member, used to place the field marker.
    pub fn largest(&self) -> Option<&Member> {
        self.visible().max_by(|a, b| a.radius.total_cmp(&b.radius))
    }

    pub fn census(&self) -> ColonyCensus {
        let mut c = ColonyCensus::default();
        for m in &self.members {
            match m.behavior {
                _ if m.is_grown() => c.grown += 1,
                Behavior::Grow { .. } => c.growing += 1,
                Behavior::Shrink { .. } => c.shrinking += 1,
                Behavior::Static => c.dead += 1,
            }
        }
        c
    }
}

fn spawn(settings: &ColonySettings) -> Vec<Member> {
    let n = settings.count.max(1) as f32;
    (0..settings.count)
        .map(|i| {
            let t = 1.0 - 2.0 * (i as f32 + 0.5) / n;
            Member {
                lat_deg: t.clamp(-1.0, 1.0).acos().to_degrees(),
                long_deg: (i as f32 * GOLDEN_ANGLE_DEG) % 360.0,
                radius: 0.0,
                behavior: Behavior::Grow {
                    rate: settings.grow_rate,
                    max_radius: settings.max_radius,
                    start_at: i as f32 * settings.growth_start_delay_s,
                },
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f32 = 1e-5;

    fn run(colony: &mut Colony, seconds: f32) {
        let steps = (seconds / 0.01).round() as usize;
        for _ in 0..steps {
            colony.update(0.01);
        }
    }

    #[test]
    fn growth_is_staggered_by_index() {
        let mut colony = Colony::new(ColonySettings::default());
        run(&mut colony, 0.5);
        let r: Vec<f32> = colony.members().iter().map(|m| m.radius).collect();
        assert!(r[0] > 0.0);
        assert!(r[1..].iter().all(|&x| x == 0.0));

        run(&mut colony, 1.0);
        assert!(colony.members()[1].radius > 0.0);
        assert_eq!(colony.members()[2].radius, 0.0);
    }

    #[test]
    fn growth_caps_at_max_radius() {
        let mut colony = Colony::new(ColonySettings { count: 1, ..Default::default() });
        run(&mut colony, 10.0);
        let m = &colony.members()[0];
        assert!((m.radius - 0.1).abs() < EPS);
        assert!(m.is_grown());
        assert_eq!(colony.census().grown, 1);
    }

    #[test]
    fn poison_shrinks_to_nothing() {
        let mut colony = Colony::new(ColonySettings { count: 2, ..Default::default() });
        run(&mut colony, 5.0);
        colony.poison();
        assert_eq!(colony.census().shrinking, 2);

        run(&mut colony, 1.0);
        assert_eq!(colony.visible().count(), 0);
        assert_eq!(colony.census().dead, 2);
    }

    #[test]
    fn paused_colony_does_not_change() {
        let mut colony = Colony::new(ColonySettings::default());
        colony.toggle_running();
        run(&mut colony, 3.0);
        assert!(colony.members().iter().all(|m| m.radius == 0.0));
    }

    #[test]
    fn members_spread_over_sphere() {
        let colony = Colony::new(ColonySettings { count: 8, ..Default::default() });
        for m in colony.members() {
            let c = m.center(Vec3::ZERO, 1.0);
            assert!((c.length() - 1.0).abs() < 1e-4);
        }
        let first = colony.members()[0].lat_deg;
        let last = colony.members()[7].lat_deg;
        assert!(first < 90.0 && last > 90.0);
    }

    #[test]
    fn grid_pos_snaps_to_ring_vertex() {
        let layout = SphereLayout { lat_steps: 2, long_steps: 4, max_spheres: 1 };
        let m = Member { lat_deg: 62.0, long_deg: 355.0, radius: 0.0, behavior: Behavior::Static };
        assert_eq!(m.grid_pos(layout), GridPos { lat: 1, long: 0 });

        let pole = Member { lat_deg: 0.0, ..m };
        assert_eq!(pole.grid_pos(layout).lat, 1);
    }

    #[test]
    fn reset_restarts_schedule() {
        let mut colony = Colony::new(ColonySettings::default());
        run(&mut colony, 2.0);
        colony.poison();
        colony.reset();
        assert!(!colony.is_poisoned());
        assert!(colony.members().iter().all(|m| m.radius == 0.0));
    }
}
