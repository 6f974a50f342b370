//! Ticks animators and copies their frame into the sprite.

use crate::core::scene::Scene;

/// Advance every active entity's animator and update its sprite cell.
/// The runner calls this once per fixed tick.
pub fn tick_animations(scene: &mut Scene, dt: f32) {
    for entity in scene.iter_mut() {
        if !entity.active {
            continue;
        }
        let Some(anim) = entity.animation.as_mut() else {
            continue;
        };
        anim.tick(dt);
        if let (Some((col, row)), Some(sprite)) = (anim.current_frame(), entity.sprite.as_mut()) {
            sprite.col = col;
            sprite.row = row;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::types::EntityId;
    use crate::components::animation::{AnimationClip, Animator};
    use crate::components::entity::Entity;
    use crate::components::sprite::SpriteComponent;

    #[test]
    fn tick_updates_sprite_frame() {
        let mut scene = Scene::new();
        let anim = Animator::new("walk", AnimationClip::strip(2.0, 0.0, 4, 10.0));
        scene.spawn(
            Entity::new(EntityId(1))
                .with_sprite(SpriteComponent::default())
                .with_animation(anim),
        );

        tick_animations(&mut scene, 0.15);

        let sprite = scene.get(EntityId(1)).unwrap().sprite.as_ref().unwrap();
        assert_eq!((sprite.col, sprite.row), (1.0, 2.0));
    }

    #[test]
    fn inactive_entities_are_not_animated() {
        let mut scene = Scene::new();
        let anim = Animator::new("walk", AnimationClip::strip(0.0, 0.0, 4, 10.0));
        scene.spawn(
            Entity::new(EntityId(1))
                .with_sprite(SpriteComponent::default())
                .with_animation(anim)
                .dormant(),
        );

        tick_animations(&mut scene, 0.15);

        let entity = scene.get(EntityId(1)).unwrap();
        assert_eq!(entity.animation.as_ref().unwrap().frame_index(), 0);
    }
}
