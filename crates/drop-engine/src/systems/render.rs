use crate::components::entity::Entity;
use crate::renderer::instance::{RenderBuffer, RenderInstance};

/// Build the render buffer from a set of entities, in scene order.
/// Entities that are inactive, hidden, or have no sprite are skipped.
/// Returns the number of shown entities that did not fit.
pub fn build_render_buffer<'a>(
    entities: impl Iterator<Item = &'a Entity>,
    buffer: &mut RenderBuffer,
) -> usize {
    buffer.clear();
    let mut dropped = 0;

    for entity in entities {
        if !entity.is_shown() {
            continue;
        }
        let Some(sprite) = &entity.sprite else {
            continue;
        };

        let [r, g, b] = sprite.tint;
        let pushed = buffer.push(RenderInstance {
            x: entity.pos.x,
            y: entity.pos.y,
            rotation: entity.rotation,
            width: entity.scale.x,
            height: entity.scale.y,
            col: sprite.col,
            row: sprite.row,
            atlas: sprite.atlas.0 as f32,
            alpha: sprite.alpha,
            r,
            g,
            b,
        });
        if !pushed {
            dropped += 1;
        }
    }

    if dropped > 0 {
        log::warn!("render buffer full, {dropped} sprites dropped");
    }
    dropped
}
