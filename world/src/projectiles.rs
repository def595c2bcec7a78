//! Projectiles in flight and the registry that owns them.

use std::collections::{BTreeMap, BTreeSet};

use dungeon_crawler_core::{
    EnemyId, ProjectileId, ProjectileKind, ProjectileSnapshot, ProjectileTuning, Rect, Side,
};
use glam::Vec2;

#[derive(Clone, Debug)]
pub(crate) struct Projectile {
    pub(crate) id: ProjectileId,
    pub(crate) kind: ProjectileKind,
    pub(crate) position: Vec2,
    pub(crate) direction: Vec2,
    speed: f32,
    size: f32,
    pub(crate) damage: f32,
    /// Enemies already damaged during this flight.
    pub(crate) hits: BTreeSet<EnemyId>,
}

impl Projectile {
    pub(crate) fn rect(&self) -> Rect {
        Rect::square(self.position, self.size)
    }

    /// Moves the projectile one step along its direction.
    pub(crate) fn advance(&mut self) {
        self.position += self.direction * self.speed;
    }

    fn snapshot(&self) -> ProjectileSnapshot {
        ProjectileSnapshot {
            id: self.id,
            kind: self.kind,
            position: self.position,
            size: self.size,
            direction: self.direction,
        }
    }
}

#[derive(Debug)]
pub(crate) struct ProjectileRegistry {
    entries: BTreeMap<ProjectileId, Projectile>,
    next_projectile_id: ProjectileId,
}

impl ProjectileRegistry {
    pub(crate) fn new() -> Self {
        Self {
            entries: BTreeMap::new(),
            next_projectile_id: ProjectileId::new(0),
        }
    }

    /// Creates a projectile whose hitbox is centred on `center`.
    pub(crate) fn launch(
        &mut self,
        kind: ProjectileKind,
        center: Vec2,
        direction: Vec2,
        tuning: &ProjectileTuning,
    ) -> &Projectile {
        let id = self.next_projectile_id;
        self.next_projectile_id = ProjectileId::new(id.get().wrapping_add(1));
        let projectile = Projectile {
            id,
            kind,
            position: center - Vec2::splat(tuning.size * 0.5),
            direction,
            speed: tuning.speed,
            size: tuning.size,
            damage: tuning.damage,
            hits: BTreeSet::new(),
        };
        self.entries.entry(id).or_insert(projectile)
    }

    pub(crate) fn get_mut(&mut self, id: ProjectileId) -> Option<&mut Projectile> {
        self.entries.get_mut(&id)
    }

    pub(crate) fn remove(&mut self, id: ProjectileId) -> Option<Projectile> {
        self.entries.remove(&id)
    }

    pub(crate) fn clear(&mut self) {
        self.entries.clear();
    }

    /// Identifiers of the projectiles owned by `owner`, in ascending order.
    pub(crate) fn ids_owned_by(&self, owner: Side) -> Vec<ProjectileId> {
        self.entries
            .values()
            .filter(|projectile| projectile.kind.owner() == owner)
            .map(|projectile| projectile.id)
            .collect()
    }

    pub(crate) fn snapshots(&self) -> Vec<ProjectileSnapshot> {
        self.entries.values().map(Projectile::snapshot).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn launch_centres_the_hitbox() {
        let mut registry = ProjectileRegistry::new();
        let tuning = ProjectileTuning::default();

        let projectile =
            registry.launch(ProjectileKind::Bolt, Vec2::new(50.0, 50.0), Vec2::X, &tuning);

        assert_eq!(projectile.rect().center(), Vec2::new(50.0, 50.0));
        assert_eq!(projectile.id, ProjectileId::new(0));
    }

    #[test]
    fn ownership_filters_by_side() {
        let mut registry = ProjectileRegistry::new();
        let tuning = ProjectileTuning::default();
        let _ = registry.launch(ProjectileKind::Bolt, Vec2::ZERO, Vec2::X, &tuning);
        let _ = registry.launch(ProjectileKind::EnemyBolt, Vec2::ZERO, Vec2::X, &tuning);
        let _ = registry.launch(ProjectileKind::Fireball, Vec2::ZERO, Vec2::X, &tuning);

        assert_eq!(
            registry.ids_owned_by(Side::Player),
            vec![ProjectileId::new(0), ProjectileId::new(2)]
        );
        assert_eq!(registry.ids_owned_by(Side::Enemy), vec![ProjectileId::new(1)]);
    }

    #[test]
    fn advance_moves_by_speed() {
        let mut registry = ProjectileRegistry::new();
        let tuning = ProjectileTuning::default();
        let id = registry
            .launch(ProjectileKind::Bolt, Vec2::new(10.0, 10.0), Vec2::Y, &tuning)
            .id;

        let projectile = registry.get_mut(id).expect("projectile exists");
        projectile.advance();

        assert_eq!(projectile.rect().center(), Vec2::new(10.0, 15.0));
    }
}
