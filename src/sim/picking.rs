//! Pointer picking and tile highlight

use glam::Vec2;

use super::tiles::TileSet;
use crate::scene::{Camera, Color, SceneGraph};

/// Reset every tile to its base colour, then highlight the tile under the
/// pointer. Returns the index of the highlighted tile.
///
/// Groups are tested as a whole through their root's pick sphere; only the
/// nearest hit is highlighted.
pub fn pick_and_highlight(
    tiles: &TileSet,
    graph: &mut SceneGraph,
    camera: &Camera,
    pointer_ndc: Vec2,
    highlight: Color,
) -> Option<usize> {
    for tile in &tiles.tiles {
        tile.paint(graph, tile.base_color);
    }

    let ray = camera.ray_from_ndc(pointer_ndc);
    let targets = tiles.pick_targets();
    let nearest = graph.intersect(&ray, &targets).into_iter().next()?;
    let index = targets.iter().position(|&node| node == nearest.node)?;

    tiles.tiles[index].paint(graph, highlight);
    Some(index)
}
